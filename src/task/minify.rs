//! Asset minification and CSS post-processing.
//!
//! Uses oxc for JavaScript and lightningcss for CSS (vendor prefixing in
//! both modes, structural minification in production).

use anyhow::{Result, anyhow, bail};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use lightningcss::targets::{Browsers, Targets};
use oxc::allocator::Allocator;
use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
use oxc::mangler::MangleOptions;
use oxc::minifier::{CompressOptions, Minifier, MinifierOptions};
use oxc::parser::Parser;
use oxc::span::SourceType;

/// Minify JavaScript source code.
///
/// Sources are treated as classic scripts, not modules: site scripts are
/// loaded through plain `<script>` tags and may rely on top-level `this`
/// and sloppy-mode semantics. Parse failures surface the parser's
/// diagnostics in the error.
pub fn minify_js(source: &str) -> Result<String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();
    if !parsed.errors.is_empty() {
        let diagnostics: Vec<String> = parsed.errors.iter().map(|e| e.to_string()).collect();
        bail!("parse failed: {}", diagnostics.join("; "));
    }

    let mut program = parsed.program;
    let minified = Minifier::new(MinifierOptions {
        mangle: Some(MangleOptions::default()),
        compress: Some(CompressOptions::smallest()),
    })
    .minify(&allocator, &mut program);

    let code = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: CommentOptions::disabled(),
            ..CodegenOptions::default()
        })
        .with_scoping(minified.scoping)
        .build(&program)
        .code;
    Ok(code)
}

/// Post-process compiled CSS: apply vendor prefixes for the browser targets
/// and, when `minify` is set, structural minification.
pub fn process_css(source: &str, filename: &str, minify: bool) -> Result<String> {
    let mut stylesheet = StyleSheet::parse(
        source,
        ParserOptions {
            filename: filename.to_string(),
            ..ParserOptions::default()
        },
    )
    .map_err(|e| anyhow!("{e}"))?;

    let targets = browser_targets();
    stylesheet
        .minify(MinifyOptions {
            targets,
            ..MinifyOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    let result = stylesheet
        .to_css(PrinterOptions {
            minify,
            targets,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("{e}"))?;

    Ok(result.code)
}

/// Browser targets driving vendor prefixing.
///
/// Versions are encoded as `major << 16 | minor << 8 | patch`. Wide enough
/// to keep `-webkit-`/`-moz-` prefixes for still-common engines.
fn browser_targets() -> Targets {
    Targets::from(Browsers {
        chrome: Some(90 << 16),
        edge: Some(90 << 16),
        firefox: Some(88 << 16),
        safari: Some(14 << 16),
        ios_saf: Some(14 << 16),
        ..Browsers::default()
    })
}
