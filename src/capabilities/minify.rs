//! Asset minification
//!
//! Uses lightningcss for stylesheets and oxc for scripts. Minification never
//! fails a conversion: whatever goes wrong, the original bytes are kept.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MinifyError {
    #[error("no minifier for {0}")]
    Unsupported(String),

    #[error("{0}")]
    Failed(String),
}

pub trait Minifier: Send + Sync {
    /// `media_type` is the primary MIME token, without parameters
    fn minify(&self, media_type: &str, data: &[u8]) -> Result<Vec<u8>, MinifyError>;
}

/// Minifies `data`, falling back to the input on any failure
pub fn minify_or_keep(minifier: &dyn Minifier, media_type: &str, data: Vec<u8>) -> Vec<u8> {
    match minifier.minify(media_type, &data) {
        Ok(minified) => minified,
        Err(e) => {
            tracing::debug!("keeping {} as-is: {}", media_type, e);
            data
        }
    }
}

/// The minifier used when minification is requested
pub fn default_minifier() -> Option<Box<dyn Minifier>> {
    #[cfg(feature = "minify")]
    {
        Some(Box::new(ResourceMinifier))
    }

    #[cfg(not(feature = "minify"))]
    {
        tracing::warn!("minification requested, but this build has no minifier");
        None
    }
}

/// Minifies CSS with lightningcss
#[cfg(feature = "minify")]
#[derive(Clone, Copy, Debug, Default)]
pub struct StylesheetMinifier;

#[cfg(feature = "minify")]
impl Minifier for StylesheetMinifier {
    fn minify(&self, media_type: &str, data: &[u8]) -> Result<Vec<u8>, MinifyError> {
        use lightningcss::stylesheet::{ParserOptions, PrinterOptions, StyleSheet};

        if media_type != "text/css" {
            return Err(MinifyError::Unsupported(media_type.to_string()));
        }

        let source =
            std::str::from_utf8(data).map_err(|e| MinifyError::Failed(e.to_string()))?;
        let stylesheet = StyleSheet::parse(source, ParserOptions::default())
            .map_err(|e| MinifyError::Failed(e.to_string()))?;
        let result = stylesheet
            .to_css(PrinterOptions {
                minify: true,
                ..PrinterOptions::default()
            })
            .map_err(|e| MinifyError::Failed(e.to_string()))?;

        Ok(result.code.into_bytes())
    }
}

/// Script media types, all minified as classic scripts
pub const SCRIPT_MEDIA_TYPES: [&str; 5] = [
    "application/javascript",
    "application/x-javascript",
    "application/ecmascript",
    "text/javascript",
    "text/ecmascript",
];

/// Minifies JavaScript with oxc
///
/// Page scripts share one global scope, so the source is parsed as a classic
/// script and top-level names are never mangled.
#[cfg(feature = "minify")]
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptMinifier;

#[cfg(feature = "minify")]
impl Minifier for ScriptMinifier {
    fn minify(&self, media_type: &str, data: &[u8]) -> Result<Vec<u8>, MinifyError> {
        use oxc::allocator::Allocator;
        use oxc::codegen::{Codegen, CodegenOptions, CommentOptions};
        use oxc::mangler::MangleOptions;
        use oxc::minifier::{CompressOptions, Minifier as OxcMinifier, MinifierOptions};
        use oxc::parser::Parser;
        use oxc::span::SourceType;

        if !SCRIPT_MEDIA_TYPES.contains(&media_type) {
            return Err(MinifyError::Unsupported(media_type.to_string()));
        }

        let source =
            std::str::from_utf8(data).map_err(|e| MinifyError::Failed(e.to_string()))?;

        let allocator = Allocator::default();
        let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();
        if let Some(error) = parsed.errors.first() {
            return Err(MinifyError::Failed(error.to_string()));
        }

        let mut program = parsed.program;
        let options = MinifierOptions {
            mangle: Some(MangleOptions::default()),
            compress: Some(CompressOptions::default()),
        };
        let minified = OxcMinifier::new(options).minify(&allocator, &mut program);
        let code = Codegen::new()
            .with_options(CodegenOptions {
                minify: true,
                comments: CommentOptions::disabled(),
                ..CodegenOptions::default()
            })
            .with_scoping(minified.scoping)
            .build(&program)
            .code;

        Ok(code.into_bytes())
    }
}

/// 按媒体类型分派：CSS 交给 lightningcss，脚本交给 oxc
#[cfg(feature = "minify")]
#[derive(Clone, Copy, Debug, Default)]
pub struct ResourceMinifier;

#[cfg(feature = "minify")]
impl Minifier for ResourceMinifier {
    fn minify(&self, media_type: &str, data: &[u8]) -> Result<Vec<u8>, MinifyError> {
        if media_type == "text/css" {
            StylesheetMinifier.minify(media_type, data)
        } else if SCRIPT_MEDIA_TYPES.contains(&media_type) {
            ScriptMinifier.minify(media_type, data)
        } else {
            Err(MinifyError::Unsupported(media_type.to_string()))
        }
    }
}
