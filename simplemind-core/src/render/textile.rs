//! A compact Textile renderer.
//!
//! Block signatures: `h1.`-`h6.`, `p.`, `bq.`, `bc.`, `*` and `#` lists.
//! Inline phrases: `*strong*`, `_em_`, `-del-`, `+ins+`, `^sup^`, `~sub~`,
//! `@code@` and `"text":url` links. Blocks are separated by blank lines.

use super::escape_text;
use regex::Regex;
use std::sync::OnceLock;

struct InlineRules {
    code: Regex,
    link: Regex,
    phrases: Vec<(Regex, &'static str)>,
}

static INLINE_RULES: OnceLock<InlineRules> = OnceLock::new();

fn phrase(marker: &str) -> Regex {
    let m = regex::escape(marker);
    Regex::new(&format!(
        r"(^|[\s(>]){m}([^{m}\s](?:[^{m}]*[^{m}\s])?){m}"
    ))
    .unwrap()
}

fn inline_rules() -> &'static InlineRules {
    INLINE_RULES.get_or_init(|| InlineRules {
        code: Regex::new(r"@([^@\n]+)@").unwrap(),
        link: Regex::new(r#""([^"\n]+)":([^\s"<]*[^\s"<.,;:!?)])"#).unwrap(),
        phrases: vec![
            (phrase("*"), "strong"),
            (phrase("_"), "em"),
            (phrase("-"), "del"),
            (phrase("+"), "ins"),
            (phrase("^"), "sup"),
            (phrase("~"), "sub"),
        ],
    })
}

/// Convert Textile markup to HTML
pub fn convert(source: &str) -> String {
    let source = source.replace("\r\n", "\n");
    split_blocks(&source)
        .iter()
        .map(|block| render_block(block))
        .collect::<Vec<_>>()
        .join("\n")
}

fn split_blocks(source: &str) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in source.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(current.join("\n"));
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current.join("\n"));
    }
    blocks
}

fn render_block(block: &str) -> String {
    if let Some((level, rest)) = heading(block) {
        return format!("<h{level}>{}</h{level}>", inline(rest.trim()));
    }
    if let Some(rest) = block.strip_prefix("bq. ") {
        return format!("<blockquote>\n<p>{}</p>\n</blockquote>", lines(rest.trim()));
    }
    if let Some(rest) = block.strip_prefix("bc. ") {
        return format!("<pre><code>{}</code></pre>", escape_text(rest));
    }
    if let Some(rest) = block.strip_prefix("p. ") {
        return format!("<p>{}</p>", lines(rest.trim()));
    }
    if let Some(list) = list(block, "* ", "ul").or_else(|| list(block, "# ", "ol")) {
        return list;
    }
    format!("<p>{}</p>", lines(block.trim()))
}

fn heading(block: &str) -> Option<(u8, &str)> {
    let rest = block.strip_prefix('h')?;
    let level = rest.chars().next()?.to_digit(10)?;
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = rest[1..].strip_prefix(". ")?;
    Some((level as u8, rest))
}

fn list(block: &str, marker: &str, tag: &str) -> Option<String> {
    let items: Option<Vec<&str>> = block.lines().map(|l| l.strip_prefix(marker)).collect();
    let items = items?;
    let body: String = items
        .iter()
        .map(|item| format!("\t<li>{}</li>\n", inline(item.trim())))
        .collect();
    Some(format!("<{tag}>\n{body}</{tag}>"))
}

fn lines(text: &str) -> String {
    text.lines().map(inline).collect::<Vec<_>>().join("<br />\n")
}

/// Inline markup; `@code@` spans are emitted verbatim and shielded from
/// the link and phrase rules
fn inline(text: &str) -> String {
    let rules = inline_rules();
    let escaped = escape_text(text);
    let mut html = String::with_capacity(escaped.len());
    let mut last = 0;

    for code in rules.code.find_iter(&escaped) {
        html.push_str(&phrases(&escaped[last..code.start()]));
        let inner = &code.as_str()[1..code.len() - 1];
        html.push_str(&format!("<code>{inner}</code>"));
        last = code.end();
    }
    html.push_str(&phrases(&escaped[last..]));
    html
}

fn phrases(text: &str) -> String {
    let rules = inline_rules();
    let mut html = rules
        .link
        .replace_all(text, r#"<a href="$2">$1</a>"#)
        .into_owned();
    for (regex, tag) in &rules.phrases {
        html = regex
            .replace_all(&html, format!("${{1}}<{tag}>${{2}}</{tag}>").as_str())
            .into_owned();
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_and_paragraph() {
        let html = convert("h1. Welcome\n\nA *bold* and _quiet_ start.");
        insta::assert_snapshot!(html, @r"
        <h1>Welcome</h1>
        <p>A <strong>bold</strong> and <em>quiet</em> start.</p>
        ");
    }

    #[test]
    fn test_line_breaks_within_paragraph() {
        assert_eq!(convert("one\ntwo"), "<p>one<br />\ntwo</p>");
    }

    #[test]
    fn test_lists() {
        let html = convert("* first\n* second\n\n# one\n# two");
        assert_eq!(
            html,
            "<ul>\n\t<li>first</li>\n\t<li>second</li>\n</ul>\n<ol>\n\t<li>one</li>\n\t<li>two</li>\n</ol>"
        );
    }

    #[test]
    fn test_block_signatures() {
        assert_eq!(
            convert("bq. Quoted words"),
            "<blockquote>\n<p>Quoted words</p>\n</blockquote>"
        );
        assert_eq!(
            convert("bc. if a < b { *x* }"),
            "<pre><code>if a &lt; b { *x* }</code></pre>"
        );
        assert_eq!(convert("h3. Third"), "<h3>Third</h3>");
        assert_eq!(convert("h7. Not a heading"), "<p>h7. Not a heading</p>");
    }

    #[test]
    fn test_inline_phrases() {
        assert_eq!(
            convert("-gone- +new+ x^2^ H~2~O @code@"),
            "<p><del>gone</del> <ins>new</ins> x^2^ H~2~O <code>code</code></p>"
        );
        assert_eq!(convert("well-known-thing"), "<p>well-known-thing</p>");
    }

    #[test]
    fn test_code_spans_are_literal() {
        assert_eq!(
            convert("@*x*@ and *y*"),
            "<p><code>*x*</code> and <strong>y</strong></p>"
        );
        assert_eq!(
            convert(r#"call @"a":b@ now"#),
            r#"<p>call <code>"a":b</code> now</p>"#
        );
    }

    #[test]
    fn test_links() {
        assert_eq!(
            convert(r#"See "the docs":https://example.com/docs."#),
            r#"<p>See <a href="https://example.com/docs">the docs</a>.</p>"#
        );
    }

    #[test]
    fn test_escapes_html() {
        assert_eq!(convert("<script>"), "<p>&lt;script&gt;</p>");
    }
}
