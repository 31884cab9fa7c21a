//! Request-level orchestration: resolve, locate, then render.

use crate::{
    config::Config,
    error::{Error, Result},
    locate::{Candidate, ContentFile, Locator},
    pipeline::{Pipeline, PipelineResult},
    resolve::Resolver,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use simplemind_types::{Identifier, LookupMode};
use std::path::PathBuf;

/// A rendered content file
#[derive(Debug, Clone, Serialize)]
pub struct Page {
    /// Display identifier derived from the file path
    pub uri: Identifier,
    pub name: String,
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
    #[serde(flatten)]
    pub result: PipelineResult,
}

/// One line of a listing (home page or section)
#[derive(Debug, Clone, Serialize)]
pub struct ListingEntry {
    pub uri: Identifier,
    pub name: String,
    pub path: PathBuf,
    pub modified: DateTime<Utc>,
}

/// Content store bound to one configuration
pub struct Site {
    config: Config,
    resolver: Resolver,
    locator: Locator,
    pipeline: Pipeline,
}

impl Site {
    /// Validates the configured pipeline up front
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            resolver: Resolver::new(&config),
            locator: Locator::new(&config),
            pipeline: Pipeline::new(&config)?,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Render the first file matching `uri`
    pub fn article(&self, uri: &str) -> Result<Page> {
        let path = self.resolver.resolve(uri)?;
        let mut located = self.locator.locate(&path, LookupMode::Article);

        let file = located
            .next()
            .ok_or_else(|| Error::FileNotFound(path.to_string()))??;
        if located.len() > 1 {
            tracing::debug!("{} candidates for {}, rendering the first", located.len(), path);
        }

        tracing::info!("Rendering article {} from {:?}", path, file.path);
        self.page(file)
    }

    /// Render every entry of a journal feed, in feed order
    pub fn journal(&self, uri: &str) -> Result<Vec<Page>> {
        let path = self.resolver.resolve(uri)?;
        let located = self.locator.locate(&path, LookupMode::Journal);
        if located.is_empty() {
            return Err(Error::FileNotFound(path.to_string()));
        }

        tracing::info!("Rendering journal {} with {} entries", path, located.len());
        located.map(|file| self.page(file?)).collect()
    }

    /// Sub-categories below `uri`
    pub fn section(&self, uri: &str) -> Result<Vec<ListingEntry>> {
        let path = self.resolver.resolve(uri)?;
        let located = self.locator.locate(&path, LookupMode::Section);
        if located.is_empty() {
            return Err(Error::FileNotFound(path.to_string()));
        }

        Ok(located
            .candidates()
            .iter()
            .map(|c| self.listing_entry(c))
            .collect())
    }

    /// Every file in the store, newest first
    pub fn listing(&self) -> Vec<ListingEntry> {
        let located = self.locator.recent();
        tracing::info!("Listing {} files", located.len());
        located
            .candidates()
            .iter()
            .map(|c| self.listing_entry(c))
            .collect()
    }

    /// Run the pipeline over an already located file
    pub fn page(&self, file: ContentFile) -> Result<Page> {
        let result = self.pipeline.render(&file)?;
        Ok(Page {
            uri: self.resolver.file_path_to_uri(&file.path),
            name: self.resolver.article_name(&file.path),
            modified: DateTime::<Utc>::from(file.modified),
            path: file.path,
            result,
        })
    }

    fn listing_entry(&self, candidate: &Candidate) -> ListingEntry {
        ListingEntry {
            uri: self.resolver.file_path_to_uri(&candidate.path),
            name: self.resolver.article_name(&candidate.path),
            path: candidate.path.clone(),
            modified: DateTime::<Utc>::from(candidate.modified),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_article_not_found() {
        let dir = tempdir().unwrap();
        let site = Site::new(Config::new(dir.path())).unwrap();
        let err = site.article("article/missing").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_invalid_pipeline_rejected_at_construction() {
        let mut config = Config::new("content");
        config.parsers.push("nope".to_string());
        assert!(matches!(Site::new(config), Err(Error::UnknownParser(_))));
    }

    #[test]
    fn test_article_renders_first_candidate() {
        let dir = tempdir().unwrap();
        let articles = dir.path().join("articles/rust");
        fs::create_dir_all(&articles).unwrap();
        fs::write(articles.join("a.md"), "# First\nbody a").unwrap();
        fs::write(articles.join("b.md"), "# Second\nbody b").unwrap();

        let site = Site::new(Config::new(dir.path())).unwrap();
        let page = site.article("article/rust").unwrap();
        assert_eq!(page.result.metadata.get("title"), Some("First"));
        assert_eq!(page.uri.as_str(), "article/rust/a");
        assert_eq!(page.name, "articles / rust / a");
    }
}
