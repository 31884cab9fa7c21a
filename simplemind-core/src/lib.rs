//! # simplemind-core
//!
//! Core library for simplemind.
//!
//! Resolves content identifiers to files in a file-system backed content
//! store and renders them through a pipeline of metadata parsers, content
//! filters and an extension-selected markup renderer.

pub mod config;
pub mod error;
pub mod filters;
pub mod locate;
pub mod parsers;
pub mod pipeline;
pub mod registry;
pub mod render;
pub mod resolve;
pub mod site;

pub use config::Config;
pub use error::{Error, Result};
pub use locate::{ContentFile, Located, Locator};
pub use pipeline::{Pipeline, PipelineResult, PipelineSpec};
pub use registry::{FilterKind, ParserKind, Registry, RendererKind};
pub use resolve::{file_path_to_uri, path_to_article_name, resolve, Resolver};
pub use site::{ListingEntry, Page, Site};

pub use simplemind_types::{
    EntryKind, Identifier, LookupMode, Metadata, MetadataKey, ResolvedPath,
};
