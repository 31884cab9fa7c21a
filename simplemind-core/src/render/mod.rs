//! Markup renderers, one per registered extension.

pub mod markdown;
pub mod textile;

use crate::pipeline::PipelineOptions;

pub use markdown::MarkdownProcessor;

/// Markdown to HTML
pub fn markdown(text: &str, _options: &PipelineOptions) -> String {
    MarkdownProcessor::new().convert(text)
}

/// Plain text: escape `&<>` and turn newlines into line breaks.
///
/// The output is safe for element content only, not for attribute values.
pub fn text(text: &str, _options: &PipelineOptions) -> String {
    escape_text(text).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Raw HTML, passed through unmodified.
///
/// No sanitization happens here; content authors are trusted.
pub fn html(text: &str, _options: &PipelineOptions) -> String {
    text.to_string()
}

/// Textile to HTML
pub fn textile(text: &str, _options: &PipelineOptions) -> String {
    textile::convert(text)
}

/// Slim templates are evaluated by the view layer; hand the source back as is
pub fn slim(text: &str, _options: &PipelineOptions) -> String {
    text.to_string()
}

pub(crate) fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
