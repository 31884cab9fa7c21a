//! The process-wide table of parsers, filters and renderers.
//!
//! Every stage is named by an enum variant and mapped to a plain function.
//! The table is built once on first use and never mutated, so lookups need
//! no locking.

use crate::error::{Error, Result};
use crate::pipeline::PipelineOptions;
use crate::{filters, parsers, render};
use simplemind_types::Metadata;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::OnceLock;

pub type ParserFn = fn(Metadata, String, &PipelineOptions) -> (Metadata, String);
pub type FilterFn = fn(String, &PipelineOptions) -> String;
pub type RendererFn = fn(&str, &PipelineOptions) -> String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserKind {
    SplitMetadataAndContent,
    ExtractTitle,
}

impl ParserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParserKind::SplitMetadataAndContent => "split_metadata_and_content",
            ParserKind::ExtractTitle => "extract_title",
        }
    }
}

impl FromStr for ParserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "split_metadata_and_content" => Ok(ParserKind::SplitMetadataAndContent),
            "extract_title" => Ok(ParserKind::ExtractTitle),
            _ => Err(Error::UnknownParser(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    HighlightSourceCode,
}

impl FilterKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FilterKind::HighlightSourceCode => "highlight_source_code",
        }
    }
}

impl FromStr for FilterKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "highlight_source_code" | "source_code" => Ok(FilterKind::HighlightSourceCode),
            _ => Err(Error::UnknownFilter(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RendererKind {
    Markdown,
    Text,
    Html,
    Textile,
    /// Template markup evaluated by the view layer
    Slim,
}

impl RendererKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RendererKind::Markdown => "markdown",
            RendererKind::Text => "text",
            RendererKind::Html => "html",
            RendererKind::Textile => "textile",
            RendererKind::Slim => "slim",
        }
    }
}

const PARSERS: &[(ParserKind, ParserFn)] = &[
    (
        ParserKind::SplitMetadataAndContent,
        parsers::split_metadata_and_content,
    ),
    (ParserKind::ExtractTitle, parsers::extract_title),
];

const FILTERS: &[(FilterKind, FilterFn)] = &[(
    FilterKind::HighlightSourceCode,
    filters::highlight_source_code,
)];

const RENDERERS: &[(RendererKind, RendererFn)] = &[
    (RendererKind::Markdown, render::markdown),
    (RendererKind::Text, render::text),
    (RendererKind::Html, render::html),
    (RendererKind::Textile, render::textile),
    (RendererKind::Slim, render::slim),
];

const EXTENSIONS: &[(&str, RendererKind)] = &[
    ("md", RendererKind::Markdown),
    ("markdown", RendererKind::Markdown),
    ("mkd", RendererKind::Markdown),
    ("txt", RendererKind::Text),
    ("text", RendererKind::Text),
    ("html", RendererKind::Html),
    ("htm", RendererKind::Html),
    ("textile", RendererKind::Textile),
    ("slim", RendererKind::Slim),
];

/// Immutable stage table
pub struct Registry {
    parsers: HashMap<ParserKind, ParserFn>,
    filters: HashMap<FilterKind, FilterFn>,
    renderers: HashMap<RendererKind, RendererFn>,
    extensions: HashMap<&'static str, RendererKind>,
}

static REGISTRY: OnceLock<Registry> = OnceLock::new();

impl Registry {
    /// The shared table, built on first use
    pub fn global() -> &'static Registry {
        REGISTRY.get_or_init(Registry::build)
    }

    fn build() -> Self {
        tracing::debug!(
            "Building stage registry: {} parsers, {} filters, {} extensions",
            PARSERS.len(),
            FILTERS.len(),
            EXTENSIONS.len()
        );
        Self {
            parsers: PARSERS.iter().copied().collect(),
            filters: FILTERS.iter().copied().collect(),
            renderers: RENDERERS.iter().copied().collect(),
            extensions: EXTENSIONS.iter().copied().collect(),
        }
    }

    pub fn parser(&self, kind: ParserKind) -> Result<ParserFn> {
        self.parsers
            .get(&kind)
            .copied()
            .ok_or_else(|| Error::UnknownParser(kind.as_str().to_string()))
    }

    pub fn filter(&self, kind: FilterKind) -> Result<FilterFn> {
        self.filters
            .get(&kind)
            .copied()
            .ok_or_else(|| Error::UnknownFilter(kind.as_str().to_string()))
    }

    /// Renderer kind registered for a file extension (case-insensitive)
    pub fn renderer_kind(&self, extension: &str) -> Result<RendererKind> {
        self.extensions
            .get(extension.to_lowercase().as_str())
            .copied()
            .ok_or_else(|| Error::UnknownRenderer(extension.to_string()))
    }

    pub fn renderer(&self, kind: RendererKind) -> Result<RendererFn> {
        self.renderers
            .get(&kind)
            .copied()
            .ok_or_else(|| Error::UnknownRenderer(kind.as_str().to_string()))
    }

    /// Registered extensions, sorted
    pub fn extensions(&self) -> Vec<&'static str> {
        let mut exts: Vec<_> = self.extensions.keys().copied().collect();
        exts.sort_unstable();
        exts
    }
}
