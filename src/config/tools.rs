//! `[tools]` section: preview server port and image encoder quality.
//!
//! Quality settings follow a permissive-fallback policy: the raw TOML values
//! are kept untyped and resolved once, up front, into a fully-defaulted
//! [`ImageQuality`]. A malformed value silently becomes the default instead
//! of failing the build.
//!
//! # Example
//!
//! ```toml
//! [tools]
//! port = 5000
//!
//! [tools.imagemin]
//! png = [0.7, 0.7]
//! jpeg = 70
//! ```

use serde::{Deserialize, Serialize};

/// Default preview server port.
pub const DEFAULT_PORT: u16 = 5000;

/// Default PNG quality ratio pair (min, max).
pub const DEFAULT_PNG_QUALITY: (f32, f32) = (0.7, 0.7);

/// Default JPEG quality percentage.
pub const DEFAULT_JPEG_QUALITY: u8 = 70;

/// Tool options from `[tools]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Tools {
    /// Preview server port.
    pub port: u16,

    /// Raw image quality settings, resolved via [`Tools::image_quality`].
    pub imagemin: ImageminTools,
}

impl Default for Tools {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            imagemin: ImageminTools::default(),
        }
    }
}

impl Tools {
    /// Resolve the raw quality settings into effective values.
    ///
    /// Runs once at workflow start so tasks only ever see validated values.
    pub fn image_quality(&self) -> ImageQuality {
        self.imagemin.resolve()
    }
}

/// Raw `[tools.imagemin]` values, deliberately untyped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageminTools {
    pub png: Option<toml::Value>,
    pub jpeg: Option<toml::Value>,
}

/// Effective, fully-defaulted image encoder quality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageQuality {
    /// PNG quality ratio pair (min, max), each in `0.0..=1.0`.
    pub png: (f32, f32),
    /// JPEG quality percentage, `0..=100`.
    pub jpeg: u8,
}

impl Default for ImageQuality {
    fn default() -> Self {
        Self {
            png: DEFAULT_PNG_QUALITY,
            jpeg: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl ImageminTools {
    /// Type-check the raw values, substituting defaults on any mismatch.
    ///
    /// PNG must be a two-element array of numbers in `0.0..=1.0`; JPEG must
    /// be a whole number in `0..=100`. Anything else falls back silently.
    pub fn resolve(&self) -> ImageQuality {
        ImageQuality {
            png: self.png.as_ref().and_then(png_pair).unwrap_or(DEFAULT_PNG_QUALITY),
            jpeg: self
                .jpeg
                .as_ref()
                .and_then(jpeg_percent)
                .unwrap_or(DEFAULT_JPEG_QUALITY),
        }
    }
}

fn png_pair(value: &toml::Value) -> Option<(f32, f32)> {
    let array = value.as_array()?;
    if array.len() != 2 {
        return None;
    }
    let min = ratio(&array[0])?;
    let max = ratio(&array[1])?;
    Some((min, max))
}

fn ratio(value: &toml::Value) -> Option<f32> {
    let n = match value {
        toml::Value::Float(f) => *f,
        toml::Value::Integer(i) => *i as f64,
        _ => return None,
    };
    (0.0..=1.0).contains(&n).then_some(n as f32)
}

fn jpeg_percent(value: &toml::Value) -> Option<u8> {
    let n = value.as_integer()?;
    (0..=100).contains(&n).then_some(n as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Tools {
        toml::from_str(toml).unwrap()
    }

    #[test]
    fn test_defaults() {
        let tools = parse("");
        assert_eq!(tools.port, 5000);
        assert_eq!(tools.image_quality(), ImageQuality::default());
    }

    #[test]
    fn test_valid_quality_kept() {
        let tools = parse("[imagemin]\npng = [0.5, 0.9]\njpeg = 85");
        let quality = tools.image_quality();
        assert_eq!(quality.png, (0.5, 0.9));
        assert_eq!(quality.jpeg, 85);
    }

    #[test]
    fn test_png_not_a_pair_falls_back() {
        for bad in ["png = 0.7", "png = [0.7]", "png = [0.1, 0.2, 0.3]", "png = \"high\""] {
            let tools = parse(&format!("[imagemin]\n{bad}"));
            assert_eq!(tools.image_quality().png, DEFAULT_PNG_QUALITY, "{bad}");
        }
    }

    #[test]
    fn test_png_out_of_range_falls_back() {
        let tools = parse("[imagemin]\npng = [0.5, 1.5]");
        assert_eq!(tools.image_quality().png, DEFAULT_PNG_QUALITY);
    }

    #[test]
    fn test_png_integer_endpoints_accepted() {
        let tools = parse("[imagemin]\npng = [0, 1]");
        assert_eq!(tools.image_quality().png, (0.0, 1.0));
    }

    #[test]
    fn test_jpeg_not_whole_number_falls_back() {
        for bad in ["jpeg = 70.5", "jpeg = \"70\"", "jpeg = [70]", "jpeg = 101", "jpeg = -1"] {
            let tools = parse(&format!("[imagemin]\n{bad}"));
            assert_eq!(tools.image_quality().jpeg, DEFAULT_JPEG_QUALITY, "{bad}");
        }
    }

    #[test]
    fn test_port_override() {
        let tools = parse("port = 8080");
        assert_eq!(tools.port, 8080);
    }
}
