//! Content filters: HTML-to-HTML stages run after the renderer.

use crate::pipeline::PipelineOptions;
use regex::{Captures, Regex};
use std::sync::OnceLock;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::{SyntaxReference, SyntaxSet};

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();
static THEME_SET: OnceLock<ThemeSet> = OnceLock::new();
static CODE_BLOCK_REGEX: OnceLock<Regex> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

fn theme(name: &str) -> Option<&'static Theme> {
    let theme_set = THEME_SET.get_or_init(ThemeSet::load_defaults);
    theme_set
        .themes
        .get(name)
        .or_else(|| theme_set.themes.get("base16-ocean.light"))
        .or_else(|| theme_set.themes.values().next())
}

fn find_syntax(lang: &str) -> Option<&'static SyntaxReference> {
    let ss = syntax_set();
    ss.find_syntax_by_token(lang)
        .or_else(|| ss.find_syntax_by_extension(lang))
}

/// `<pre><code class="language-X">...</code></pre>` as emitted by the markdown renderer
fn code_block_regex() -> &'static Regex {
    CODE_BLOCK_REGEX.get_or_init(|| {
        Regex::new(r#"(?s)<pre><code class="language-([^"\s]+)">(.*?)</code></pre>"#).unwrap()
    })
}

/// Undo the entity escaping applied to code block text
fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Highlight rendered code blocks whose language the syntax set knows.
///
/// Each `<pre><code class="language-X">` block is re-lexed and replaced by a
/// `<pre class="highlight">` block. Blocks with an unknown language, and any
/// output without language-tagged code blocks (plain text, textile), pass
/// through unchanged.
pub fn highlight_source_code(html: String, options: &PipelineOptions) -> String {
    let regex = code_block_regex();
    if !regex.is_match(&html) {
        return html;
    }

    regex
        .replace_all(&html, |caps: &Captures| {
            let lang = unescape_html(&caps[1]);
            let code = unescape_html(&caps[2]);
            highlight_block(&lang, &code, options).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

fn highlight_block(lang: &str, code: &str, options: &PipelineOptions) -> Option<String> {
    let Some(syntax) = find_syntax(lang) else {
        tracing::debug!("No syntax for language {:?}, leaving code block as is", lang);
        return None;
    };
    let theme = theme(&options.highlight_theme)?;

    match highlighted_html_for_string(code, syntax_set(), syntax, theme) {
        Ok(html) => Some(
            html.trim_end_matches('\n')
                .replacen("<pre ", "<pre class=\"highlight\" ", 1),
        ),
        Err(e) => {
            tracing::warn!("Highlighting {} failed: {}", lang, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn highlight(html: &str) -> String {
        highlight_source_code(html.to_string(), &PipelineOptions::default())
    }

    const RUST_BLOCK: &str =
        "<p>Intro</p>\n<pre><code class=\"language-rust\">fn main() {}\n</code></pre>\n<p>Outro</p>\n";

    #[test]
    fn test_highlights_known_language() {
        let out = highlight(RUST_BLOCK);
        assert!(out.starts_with("<p>Intro</p>\n<pre class=\"highlight\" style="));
        assert!(out.contains("<span style="));
        assert!(!out.contains("<code"));
        assert!(out.ends_with("</pre>\n<p>Outro</p>\n"));
    }

    #[test]
    fn test_code_is_unescaped_before_lexing() {
        let out = highlight(
            "<pre><code class=\"language-rust\">if a &lt; b &amp;&amp; c {}\n</code></pre>",
        );
        assert!(out.contains("&lt;"));
        assert!(!out.contains("&amp;lt;"));
        assert!(!out.contains("&amp;amp;"));
    }

    #[test]
    fn test_every_block_is_highlighted() {
        let html = format!("{RUST_BLOCK}<pre><code class=\"language-python\">print('hi')\n</code></pre>\n");
        let out = highlight(&html);
        assert_eq!(out.matches("<pre class=\"highlight\"").count(), 2);
    }

    #[test]
    fn test_unknown_language_passes_through() {
        let html = "<pre><code class=\"language-nosuchlanguage\">some code\n</code></pre>\n";
        assert_eq!(highlight(html), html);
    }

    #[test]
    fn test_untagged_blocks_pass_through() {
        let html = "<pre><code>plain\n</code></pre>\n";
        assert_eq!(highlight(html), html);
    }

    #[test]
    fn test_escaped_markup_is_not_touched() {
        let text = "Intro<br><br>```rust<br>let x = 1;<br>```";
        assert_eq!(highlight(text), text);

        let escaped = "&lt;pre&gt;&lt;code class=\"language-rust\"&gt;x&lt;/code&gt;&lt;/pre&gt;";
        assert_eq!(highlight(escaped), escaped);
    }

    #[test]
    fn test_unknown_theme_falls_back() {
        let options = PipelineOptions {
            highlight_theme: "does-not-exist".to_string(),
            ..PipelineOptions::default()
        };
        let out = highlight_source_code(RUST_BLOCK.to_string(), &options);
        assert!(out.contains("<pre class=\"highlight\""));
    }
}
