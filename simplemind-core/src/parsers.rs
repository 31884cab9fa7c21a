//! Metadata parsers: pipeline stages over (metadata, text).
//!
//! A parser may rewrite the content and enrich the metadata. Malformed
//! headers never fail; they just yield no metadata.

use crate::pipeline::PipelineOptions;
use simplemind_types::Metadata;

/// Separate a leading `key: value` header block from the body.
///
/// The header block ends at the first blank line. It is only treated as a
/// header if a colon shows up before that blank line (past the first line
/// when there is more than one), so a lone markdown or textile title line
/// is left in the body. Extracted values win over `base`.
///
/// # Example
///
/// ```
/// use simplemind_core::parsers::split_metadata_and_content;
/// use simplemind_core::pipeline::PipelineOptions;
/// use simplemind_core::Metadata;
///
/// let (md, body) = split_metadata_and_content(
///     Metadata::new(),
///     "title: Hello\n\nBody text".to_string(),
///     &PipelineOptions::default(),
/// );
/// assert_eq!(md.get("title"), Some("Hello"));
/// assert_eq!(body, "\n\nBody text");
/// ```
pub fn split_metadata_and_content(
    base: Metadata,
    text: String,
    options: &PipelineOptions,
) -> (Metadata, String) {
    let Some(delim) = text.find("\n\n") else {
        return (base, text);
    };
    if delim == 0 {
        return (base, text);
    }

    // text[delim] is a newline, so this always finds one at or before delim
    let first_newline = text[..=delim].find('\n').unwrap_or(delim);
    let probe = if first_newline < delim {
        &text[first_newline..delim]
    } else {
        &text[..delim]
    };
    if !probe.contains(':') {
        tracing::debug!("Leading block has no colon, keeping it as content");
        return (base, text);
    }

    let mut metadata = base;
    metadata.merge(parse_header_block(&text[..delim]));

    let content = if options.trim_content_delimiter {
        text[delim..].trim_start_matches('\n').to_string()
    } else {
        text[delim..].to_string()
    };
    (metadata, content)
}

fn parse_header_block(block: &str) -> Metadata {
    let mut metadata = Metadata::new();
    for line in block.lines() {
        let Some((key, value)) = line.split_once(':') else {
            tracing::warn!("Ignoring header line without a colon: {:?}", line);
            continue;
        };
        let key = key.trim();
        if key.is_empty() {
            continue;
        }
        metadata.insert(key.to_lowercase(), value.trim());
    }
    metadata
}

/// Pull an implicit title out of a leading `# Heading` or `h1. Heading`.
///
/// A title declared in the header block takes precedence; the heading line
/// is removed from the body either way.
pub fn extract_title(
    metadata: Metadata,
    text: String,
    _options: &PipelineOptions,
) -> (Metadata, String) {
    let trimmed = text.trim_start();
    let (first_line, rest) = trimmed.split_once('\n').unwrap_or((trimmed, ""));
    let line = first_line.trim();

    let title = if let Some(title) = line.strip_prefix("h1.") {
        title.trim()
    } else if line.starts_with('#') {
        strip_closing_hashes(line.trim_start_matches('#').trim())
    } else {
        return (metadata, text);
    };

    if title.is_empty() {
        return (metadata, text);
    }

    let mut metadata = metadata;
    if !metadata.contains_key("title") {
        metadata.insert("title", title);
    }
    let content = rest.trim().to_string();
    (metadata, content)
}

/// `Title ##` -> `Title`, but `C#` stays `C#`
fn strip_closing_hashes(title: &str) -> &str {
    let stripped = title.trim_end_matches('#');
    if stripped.len() == title.len() {
        return title;
    }
    if stripped.is_empty() || stripped.ends_with(char::is_whitespace) {
        stripped.trim_end()
    } else {
        title
    }
}
