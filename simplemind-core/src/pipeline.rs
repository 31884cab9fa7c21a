//! Rendering pipeline: parsers, then the renderer, then filters.
//!
//! Flow: ContentFile → parsers (metadata, text) → renderer chosen by
//!       extension → filters (html) → PipelineResult
//!
//! Every stage is a pure function looked up in the shared [`Registry`],
//! so a pipeline is cheap to build per request and holds no mutable state.

use crate::config::{default_highlight_theme, Config};
use crate::error::{Error, Result};
use crate::locate::{extension_of, ContentFile};
use crate::registry::{FilterKind, ParserKind, Registry, RendererKind};
use serde::Serialize;
use simplemind_types::Metadata;
use std::path::Path;

/// Options handed to every stage
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// syntect theme used by the highlighting filter
    pub highlight_theme: String,
    /// Drop the blank line left at the top of the body by the splitter
    pub trim_content_delimiter: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            highlight_theme: default_highlight_theme(),
            trim_content_delimiter: false,
        }
    }
}

impl From<&Config> for PipelineOptions {
    fn from(config: &Config) -> Self {
        Self {
            highlight_theme: config.highlight_theme.clone(),
            trim_content_delimiter: config.trim_content_delimiter,
        }
    }
}

/// Ordered parser and filter stages; the renderer comes from the extension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSpec {
    pub parsers: Vec<ParserKind>,
    pub filters: Vec<FilterKind>,
}

impl PipelineSpec {
    /// Validate stage names, failing on the first unknown one
    pub fn parse<P, F>(parsers: &[P], filters: &[F]) -> Result<Self>
    where
        P: AsRef<str>,
        F: AsRef<str>,
    {
        Ok(Self {
            parsers: parsers
                .iter()
                .map(|name| name.as_ref().parse())
                .collect::<Result<_>>()?,
            filters: filters
                .iter()
                .map(|name| name.as_ref().parse())
                .collect::<Result<_>>()?,
        })
    }
}

/// Final metadata and rendered body for one file
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub metadata: Metadata,
    pub html: String,
    /// True when the body is template source for the view layer
    pub is_template: bool,
}

impl PipelineResult {
    /// Metadata as `key: value` lines, in header order
    pub fn metadata_text(&self) -> String {
        self.metadata
            .iter()
            .map(|(key, value)| format!("{key}: {value}\n"))
            .collect()
    }
}

/// A configured pipeline over the shared registry
#[derive(Clone)]
pub struct Pipeline {
    spec: PipelineSpec,
    options: PipelineOptions,
    registry: &'static Registry,
}

impl Pipeline {
    /// Build from configuration; unknown stage names are rejected here
    pub fn new(config: &Config) -> Result<Self> {
        Ok(Self::with_spec(
            config.pipeline_spec()?,
            PipelineOptions::from(config),
        ))
    }

    pub fn with_spec(spec: PipelineSpec, options: PipelineOptions) -> Self {
        Self {
            spec,
            options,
            registry: Registry::global(),
        }
    }

    pub fn spec(&self) -> &PipelineSpec {
        &self.spec
    }

    /// Render one file starting from empty metadata
    pub fn render(&self, file: &ContentFile) -> Result<PipelineResult> {
        self.render_with_metadata(file, Metadata::new())
    }

    /// Render one file, merging extracted metadata over `base`
    pub fn render_with_metadata(
        &self,
        file: &ContentFile,
        base: Metadata,
    ) -> Result<PipelineResult> {
        self.render_text(&file.path, file.text().into_owned(), base)
    }

    /// Run the stages over `text` as if it were read from `path`
    pub fn render_text(&self, path: &Path, text: String, base: Metadata) -> Result<PipelineResult> {
        if path.as_os_str().is_empty() {
            return Err(Error::EmptyFilePath);
        }
        let extension =
            extension_of(path).ok_or_else(|| Error::MissingExtension(path.to_path_buf()))?;
        let renderer_kind = self.registry.renderer_kind(&extension)?;
        let renderer = self.registry.renderer(renderer_kind)?;

        let mut metadata = base;
        let mut text = text;
        for kind in &self.spec.parsers {
            let parser = self.registry.parser(*kind)?;
            (metadata, text) = parser(metadata, text, &self.options);
            tracing::debug!("Parser {} done: {} metadata field(s)", kind.as_str(), metadata.len());
        }

        let mut html = renderer(&text, &self.options);
        tracing::debug!("Rendered {:?} with {} renderer", path, renderer_kind.as_str());

        for kind in &self.spec.filters {
            let filter = self.registry.filter(*kind)?;
            html = filter(html, &self.options);
            tracing::debug!("Filter {} done", kind.as_str());
        }

        Ok(PipelineResult {
            metadata,
            html,
            is_template: renderer_kind == RendererKind::Slim,
        })
    }
}

/// Render a file with the named stages and default options
///
/// # Example
///
/// ```
/// use simplemind_core::{pipeline::render, ContentFile};
///
/// let file = ContentFile::from_parts("notes/hello.md", "# Hello\nWorld");
/// let result = render(&file, &["extract_title"], &[] as &[&str]).unwrap();
/// assert_eq!(result.metadata.get("title"), Some("Hello"));
/// assert_eq!(result.html, "<p>World</p>\n");
/// ```
pub fn render<P, F>(file: &ContentFile, parsers: &[P], filters: &[F]) -> Result<PipelineResult>
where
    P: AsRef<str>,
    F: AsRef<str>,
{
    let spec = PipelineSpec::parse(parsers, filters)?;
    Pipeline::with_spec(spec, PipelineOptions::default()).render(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PARSERS: &[&str] = &["split_metadata_and_content", "extract_title"];
    const NO_FILTERS: &[&str] = &[];

    const FENCED: &str = "title: Code\n\nSome code:\n\n```rust\nfn main() {}\n```\n";

    #[test]
    fn test_markdown_with_headers_and_title() {
        let file = ContentFile::from_parts(
            "content/articles/trip.md",
            "author: me\n\n# The Trip\n\nWe **went**.",
        );
        let result = render(&file, ALL_PARSERS, NO_FILTERS).unwrap();

        assert_eq!(result.metadata.get("author"), Some("me"));
        assert_eq!(result.metadata.get("title"), Some("The Trip"));
        assert_eq!(result.html, "<p>We <strong>went</strong>.</p>\n");
        assert!(!result.is_template);
    }

    #[test]
    fn test_highlight_filter_on_markdown() {
        let file = ContentFile::from_parts("code.md", FENCED);

        let highlighted = render(&file, ALL_PARSERS, &["highlight_source_code"]).unwrap();
        assert!(highlighted.html.contains("<pre class=\"highlight\""));
        assert!(highlighted.html.contains("<span style="));

        let plain = render(&file, ALL_PARSERS, NO_FILTERS).unwrap();
        assert!(plain.html.contains("<pre><code class=\"language-rust\">fn main() {}"));
        assert!(!plain.html.contains("<span"));
    }

    #[test]
    fn test_default_pipeline_leaves_fences_in_text_files_alone() {
        let pipeline = Pipeline::new(&Config::new("content")).unwrap();
        let fenced = "Intro\n\n```rust\nlet x = 1;\n```";

        let text = pipeline
            .render(&ContentFile::from_parts("notes/a.txt", fenced))
            .unwrap();
        assert_eq!(text.html, "Intro<br><br>```rust<br>let x = 1;<br>```");

        let textile = pipeline
            .render(&ContentFile::from_parts("notes/a.textile", fenced))
            .unwrap();
        assert!(!textile.html.contains("&lt;pre"));
        assert!(!textile.html.contains("highlight"));
        assert!(textile.html.contains("let x = 1;"));
    }

    #[test]
    fn test_default_pipeline_highlights_markdown_and_tagged_html() {
        let pipeline = Pipeline::new(&Config::new("content")).unwrap();

        let markdown = pipeline
            .render(&ContentFile::from_parts("a.md", "```rust\nif a < b {}\n```\n"))
            .unwrap();
        assert!(markdown.html.starts_with("<pre class=\"highlight\""));
        assert!(!markdown.html.contains("&amp;lt;"));

        let html = pipeline
            .render(&ContentFile::from_parts(
                "a.html",
                "<pre><code class=\"language-rust\">let x = 1;</code></pre>",
            ))
            .unwrap();
        assert!(html.html.contains("<pre class=\"highlight\""));
    }

    #[test]
    fn test_unknown_extension() {
        let file = ContentFile::from_parts("content/paper.pdf", "%PDF");
        assert!(matches!(
            render(&file, ALL_PARSERS, NO_FILTERS),
            Err(Error::UnknownRenderer(ext)) if ext == "pdf"
        ));
    }

    #[test]
    fn test_unknown_stage_names() {
        let file = ContentFile::from_parts("a.md", "x");
        assert!(matches!(
            render(&file, ALL_PARSERS, &["sparkle"]),
            Err(Error::UnknownFilter(name)) if name == "sparkle"
        ));
        assert!(matches!(
            render(&file, &["yaml_frontmatter"], NO_FILTERS),
            Err(Error::UnknownParser(_))
        ));
    }

    #[test]
    fn test_missing_extension_and_path() {
        let file = ContentFile::from_parts("content/README", "x");
        assert!(matches!(
            render(&file, ALL_PARSERS, NO_FILTERS),
            Err(Error::MissingExtension(_))
        ));

        let file = ContentFile::from_parts("", "x");
        assert!(matches!(
            render(&file, ALL_PARSERS, NO_FILTERS),
            Err(Error::EmptyFilePath)
        ));
    }

    #[test]
    fn test_text_renderer_with_metadata() {
        let file = ContentFile::from_parts("notes/todo.txt", "due: friday\n\n<b>buy milk</b>\nand eggs");
        let result = render(&file, &["split_metadata_and_content"], NO_FILTERS).unwrap();
        assert_eq!(result.metadata.get("due"), Some("friday"));
        assert_eq!(result.html, "<br><br>&lt;b&gt;buy milk&lt;/b&gt;<br>and eggs");
        assert_eq!(result.metadata_text(), "due: friday\n");
    }

    #[test]
    fn test_slim_is_template() {
        let file = ContentFile::from_parts("views/page.slim", "h1 Hello");
        let result = render(&file, NO_FILTERS, NO_FILTERS).unwrap();
        assert!(result.is_template);
        assert_eq!(result.html, "h1 Hello");
    }

    #[test]
    fn test_trim_option_applies() {
        let spec = PipelineSpec::parse(&["split_metadata_and_content"], NO_FILTERS).unwrap();
        let options = PipelineOptions {
            trim_content_delimiter: true,
            ..PipelineOptions::default()
        };
        let pipeline = Pipeline::with_spec(spec, options);
        let file = ContentFile::from_parts("n.txt", "a: b\n\nbody");
        assert_eq!(pipeline.render(&file).unwrap().html, "body");
    }

    #[test]
    fn test_base_metadata_is_merged() {
        let pipeline = Pipeline::new(&Config::new("content")).unwrap();
        let base: Metadata = [("layout", "main"), ("title", "Fallback")].into_iter().collect();
        let file = ContentFile::from_parts("a.md", "title: Real\n\nbody");
        let result = pipeline.render_with_metadata(&file, base).unwrap();
        assert_eq!(result.metadata.get("title"), Some("Real"));
        assert_eq!(result.metadata.get("layout"), Some("main"));
    }
}
