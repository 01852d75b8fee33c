//! Images transformer: verbatim copy in development, recompression in
//! production.
//!
//! Production re-encodes PNG and JPEG files with the configured quality;
//! every other format is copied through unchanged. A file that fails to
//! decode or encode is reported and skipped so one corrupt asset cannot
//! sink the rest of the build.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Result, anyhow};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::ImageFormat;

use crate::config::{ImageQuality, PipelineConfig};
use crate::core::Mode;
use crate::{debug, log};

use super::{collect_files, copy_file, copy_tree, dest_for, has_extension, write_file};

pub fn run(config: &PipelineConfig, mode: Mode, quality: ImageQuality) -> Result<()> {
    let src_root = &config.paths.src.images;
    let dest_root = &mode.target(&config.paths).images;

    if !mode.is_prod() {
        let copied = copy_tree(src_root, dest_root)?;
        debug!("images"; "{copied} image(s) copied (dev)");
        return Ok(());
    }

    let files = collect_files(src_root, |_| true);
    let mut written = 0usize;
    for file in &files {
        let dest = dest_for(file, src_root, dest_root)?;
        let rel = file.strip_prefix(src_root).unwrap_or(file);

        if has_extension(file, &["png"]) {
            match recompress(file, ImageFormat::Png, quality) {
                Ok(bytes) => write_file(&dest, &bytes)?,
                Err(e) => {
                    log!("images"; "failed to recompress {}: {e}", rel.display());
                    continue;
                }
            }
        } else if has_extension(file, &["jpg", "jpeg"]) {
            match recompress(file, ImageFormat::Jpeg, quality) {
                Ok(bytes) => write_file(&dest, &bytes)?,
                Err(e) => {
                    log!("images"; "failed to recompress {}: {e}", rel.display());
                    continue;
                }
            }
        } else {
            copy_file(file, &dest)?;
        }
        written += 1;
    }

    debug!("images"; "{written}/{} image(s) written (prod)", files.len());
    Ok(())
}

/// Decode `file` and re-encode it with the configured quality.
fn recompress(file: &Path, format: ImageFormat, quality: ImageQuality) -> Result<Vec<u8>> {
    let img = image::open(file).map_err(|e| anyhow!("{e}"))?;
    let mut out = Cursor::new(Vec::new());

    match format {
        ImageFormat::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut out, png_compression(quality.png), FilterType::Adaptive);
            img.write_with_encoder(encoder).map_err(|e| anyhow!("{e}"))?;
        }
        ImageFormat::Jpeg => {
            // JPEG carries no alpha channel
            let rgb = img.to_rgb8();
            let encoder = JpegEncoder::new_with_quality(&mut out, quality.jpeg);
            rgb.write_with_encoder(encoder).map_err(|e| anyhow!("{e}"))?;
        }
        _ => return Err(anyhow!("unsupported recompression format {format:?}")),
    }

    Ok(out.into_inner())
}

/// Map the configured PNG quality pair onto the encoder's compression levels.
/// High-quality settings favour encode speed; anything lower takes the
/// smallest output the encoder offers.
fn png_compression(quality: (f32, f32)) -> CompressionType {
    let average = (quality.0 + quality.1) / 2.0;
    if average >= 0.9 {
        CompressionType::Default
    } else {
        CompressionType::Best
    }
}
