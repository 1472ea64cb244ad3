//! Quire Parser Library
//!
//! Document converters that turn marked-up text into HTML fragments.

pub mod markdown;
pub mod pandoc;

pub use markdown::MarkdownConverter;
pub use pandoc::PandocConverter;
use thiserror::Error;

/// Conversion errors.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The external converter could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The external converter exited unsuccessfully.
    #[error("{program} failed to convert {format} (exit status {status}): {stderr}")]
    Failed {
        program: String,
        format: String,
        status: String,
        stderr: String,
    },

    /// IO error while talking to the converter.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Converter output was not valid UTF-8.
    #[error("converter produced invalid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// No converter handles this format.
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;

/// Converts raw marked-up text of a given format tag into HTML.
pub trait DocumentConverter: Send + Sync {
    /// Convert `text` written in `format` (e.g. `org`, `md`) to HTML.
    fn convert(&self, text: &str, format: &str) -> Result<String>;
}

/// Registry dispatching Markdown in-process and everything else to pandoc.
#[derive(Debug)]
pub struct ConverterRegistry {
    markdown: MarkdownConverter,
    pandoc: PandocConverter,
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new(PandocConverter::default())
    }
}

impl ConverterRegistry {
    /// Create a registry using the given pandoc converter for non-Markdown formats.
    pub fn new(pandoc: PandocConverter) -> Self {
        Self {
            markdown: MarkdownConverter::new(),
            pandoc,
        }
    }
}

impl DocumentConverter for ConverterRegistry {
    fn convert(&self, text: &str, format: &str) -> Result<String> {
        if MarkdownConverter::handles(format) {
            self.markdown.convert(text, format)
        } else {
            self.pandoc.convert(text, format)
        }
    }
}
