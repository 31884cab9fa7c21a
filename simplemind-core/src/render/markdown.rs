//! Markdown rendering with the extensions CommonMark leaves out.
//!
//! pulldown-cmark handles tables, footnotes, strikethrough and superscript.
//! Event transformers then add underline (`_x_`), highlight marks
//! (`==x==`) and bare-URL autolinks, suppress intraword `*` emphasis and
//! render indented blocks as ordinary paragraphs instead of code.

use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, LinkType, Options, Parser, Tag, TagEnd};
use regex::Regex;
use std::ops::Range;
use std::sync::OnceLock;

static URL_REGEX: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>]+").unwrap())
}

/// Markdown processor with custom extensions
pub struct MarkdownProcessor {
    options: Options,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_SUPERSCRIPT);
        // Note: ENABLE_SMART_PUNCTUATION stays off, quotes are left alone

        Self { options }
    }

    /// Convert markdown to HTML
    pub fn convert(&self, markdown: &str) -> String {
        let events = self.block_events(markdown);
        let events = MarkTransformer.transform(events);
        let events = AutolinkTransformer.transform(events);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events.into_iter());
        html_output
    }

    /// Parse and apply the transforms that need source offsets
    fn block_events<'a>(&self, markdown: &'a str) -> Vec<Event<'a>> {
        let parser = Parser::new_ext(markdown, self.options).into_offset_iter();
        let events = EmphasisTransformer::new(markdown).transform(parser);
        self.flatten_indented_code(events)
    }

    /// Re-parse indented code blocks as regular markdown
    fn flatten_indented_code<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut result = Vec::with_capacity(events.len());
        let mut indented: Option<String> = None;

        for event in events {
            if let Some(buffer) = indented.as_mut() {
                match event {
                    Event::Text(text) => buffer.push_str(&text),
                    Event::End(TagEnd::CodeBlock) => {
                        let source = std::mem::take(buffer);
                        indented = None;
                        for nested in self.block_events(&source) {
                            result.push(nested.into_static());
                        }
                    }
                    _ => {}
                }
                continue;
            }

            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Indented)) => {
                    indented = Some(String::new());
                }
                other => result.push(other),
            }
        }

        result
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

enum EmphasisAction {
    Keep,
    Underline,
    Literal(String),
}

/// Rewrites emphasis using the source text behind each event.
///
/// `*` and `**` runs glued to a letter or digit on either side are turned
/// back into literal text; single `_` emphasis becomes `<u>`.
struct EmphasisTransformer<'s> {
    source: &'s str,
}

impl<'s> EmphasisTransformer<'s> {
    fn new(source: &'s str) -> Self {
        Self { source }
    }

    fn transform<'a>(
        &self,
        events: impl Iterator<Item = (Event<'a>, Range<usize>)>,
    ) -> Vec<Event<'a>> {
        let mut result = Vec::new();
        let mut stack: Vec<EmphasisAction> = Vec::new();

        for (event, range) in events {
            match event {
                Event::Start(Tag::Emphasis) | Event::Start(Tag::Strong) => {
                    let width = if matches!(event, Event::Start(Tag::Strong)) { 2 } else { 1 };
                    let action = self.classify(&range, width);
                    match &action {
                        EmphasisAction::Keep => result.push(event),
                        EmphasisAction::Underline => result.push(Event::InlineHtml("<u>".into())),
                        EmphasisAction::Literal(marker) => {
                            result.push(Event::Text(CowStr::from(marker.clone())))
                        }
                    }
                    stack.push(action);
                }
                Event::End(TagEnd::Emphasis) | Event::End(TagEnd::Strong) => match stack.pop() {
                    Some(EmphasisAction::Underline) => {
                        result.push(Event::InlineHtml("</u>".into()))
                    }
                    Some(EmphasisAction::Literal(marker)) => {
                        result.push(Event::Text(CowStr::from(marker)))
                    }
                    _ => result.push(event),
                },
                other => result.push(other),
            }
        }

        result
    }

    fn classify(&self, range: &Range<usize>, width: usize) -> EmphasisAction {
        let end = (range.start + width).min(range.end);
        let Some(marker) = self.source.get(range.start..end) else {
            return EmphasisAction::Keep;
        };

        if marker.starts_with('*') {
            let before = self.source[..range.start].chars().next_back();
            let after = self.source.get(range.end..).and_then(|s| s.chars().next());
            let glued = |c: Option<char>| c.is_some_and(char::is_alphanumeric);
            if glued(before) || glued(after) {
                return EmphasisAction::Literal(marker.to_string());
            }
            EmphasisAction::Keep
        } else if width == 1 && marker == "_" {
            EmphasisAction::Underline
        } else {
            EmphasisAction::Keep
        }
    }
}

/// Merge runs of adjacent text events outside code blocks, links and images, then
/// hand each merged run to `rewrite`.
fn rewrite_text<'a>(
    events: Vec<Event<'a>>,
    mut rewrite: impl FnMut(String, &mut Vec<Event<'a>>),
) -> Vec<Event<'a>> {
    let mut result = Vec::with_capacity(events.len());
    let mut pending = String::new();
    let mut opaque_depth = 0usize;

    for event in events {
        if let Event::Text(text) = &event {
            if opaque_depth == 0 {
                pending.push_str(text);
                continue;
            }
        }

        if !pending.is_empty() {
            rewrite(std::mem::take(&mut pending), &mut result);
        }

        match &event {
            Event::Start(Tag::CodeBlock(_))
            | Event::Start(Tag::Link { .. })
            | Event::Start(Tag::Image { .. }) => opaque_depth += 1,
            Event::End(TagEnd::CodeBlock) | Event::End(TagEnd::Link) | Event::End(TagEnd::Image) => {
                opaque_depth = opaque_depth.saturating_sub(1)
            }
            _ => {}
        }
        result.push(event);
    }

    if !pending.is_empty() {
        rewrite(pending, &mut result);
    }
    result
}

/// `==text==` to `<mark>text</mark>`
struct MarkTransformer;

impl MarkTransformer {
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        rewrite_text(events, |text, out| {
            let mut remaining = text.as_str();

            while let Some(start) = remaining.find("==") {
                let inner_start = start + 2;
                let Some(len) = remaining[inner_start..].find("==") else {
                    break;
                };
                let inner = &remaining[inner_start..inner_start + len];
                if inner.is_empty() || inner.starts_with(' ') || inner.ends_with(' ') {
                    out.push(Event::Text(remaining[..inner_start].to_string().into()));
                    remaining = &remaining[inner_start..];
                    continue;
                }

                if start > 0 {
                    out.push(Event::Text(remaining[..start].to_string().into()));
                }
                out.push(Event::InlineHtml("<mark>".into()));
                out.push(Event::Text(inner.to_string().into()));
                out.push(Event::InlineHtml("</mark>".into()));
                remaining = &remaining[inner_start + len + 2..];
            }

            if !remaining.is_empty() {
                out.push(Event::Text(remaining.to_string().into()));
            }
        })
    }
}

/// Bare `http://`, `https://` and `www.` URLs to links
struct AutolinkTransformer;

impl AutolinkTransformer {
    fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        rewrite_text(events, |text, out| {
            let mut last = 0;

            for found in url_regex().find_iter(&text) {
                let url = found
                    .as_str()
                    .trim_end_matches(['.', ',', ';', ':', '!', '?', ')', '\'', '"']);
                if url.is_empty() {
                    continue;
                }

                if found.start() > last {
                    out.push(Event::Text(text[last..found.start()].to_string().into()));
                }
                let href = if url.to_lowercase().starts_with("www.") {
                    format!("http://{url}")
                } else {
                    url.to_string()
                };
                out.push(Event::Start(Tag::Link {
                    link_type: LinkType::Autolink,
                    dest_url: href.into(),
                    title: CowStr::Borrowed(""),
                    id: CowStr::Borrowed(""),
                }));
                out.push(Event::Text(url.to_string().into()));
                out.push(Event::End(TagEnd::Link));
                last = found.start() + url.len();
            }

            if last < text.len() {
                out.push(Event::Text(text[last..].to_string().into()));
            }
        })
    }
}
