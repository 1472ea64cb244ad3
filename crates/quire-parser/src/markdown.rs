//! Markdown conversion using pulldown-cmark.

use pulldown_cmark::{Options, Parser, html};

use crate::{ConvertError, DocumentConverter, Result};

/// Format tags handled in-process.
const MARKDOWN_FORMATS: [&str; 3] = ["md", "markdown", "commonmark"];

/// In-process Markdown to HTML converter.
#[derive(Debug, Clone)]
pub struct MarkdownConverter {
    options: Options,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkdownConverter {
    /// Create a new converter with GFM-style extensions enabled.
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);

        Self { options }
    }

    /// Whether `format` is a Markdown tag.
    pub fn handles(format: &str) -> bool {
        MARKDOWN_FORMATS
            .iter()
            .any(|f| f.eq_ignore_ascii_case(format))
    }

    /// Render Markdown text to an HTML fragment.
    pub fn render(&self, text: &str) -> String {
        let parser = Parser::new_ext(text, self.options);
        let mut output = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut output, parser);
        output
    }
}

impl DocumentConverter for MarkdownConverter {
    fn convert(&self, text: &str, format: &str) -> Result<String> {
        if !Self::handles(format) {
            return Err(ConvertError::UnsupportedFormat(format.to_string()));
        }
        Ok(self.render(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_heading_and_paragraph() {
        let converter = MarkdownConverter::new();
        let html = converter.convert("# Title\n\nSome *text*.", "md").unwrap();

        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>Some <em>text</em>.</p>"));
    }

    #[test]
    fn test_tables_enabled() {
        let converter = MarkdownConverter::new();
        let html = converter.render("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
    }

    #[test]
    fn test_rejects_other_formats() {
        let converter = MarkdownConverter::new();
        let err = converter.convert("* heading", "org").unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(f) if f == "org"));
    }

    #[test]
    fn test_handles_is_case_insensitive() {
        assert!(MarkdownConverter::handles("Markdown"));
        assert!(MarkdownConverter::handles("MD"));
        assert!(!MarkdownConverter::handles("rst"));
    }
}
