//! Content lookup over the file-system backed store.
//!
//! Three lookup modes are supported: a single article (exact match, falling
//! back to a recursive search), a section (directory listing) and a journal
//! (flattened, date-partitioned feed). Absence of content is never an
//! error here; the result is simply empty.

use crate::config::Config;
use crate::error::{Error, Result};
use simplemind_types::{EntryKind, LookupMode, ResolvedPath};
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use walkdir::{DirEntry, WalkDir};

/// A file (or, for section listings, a directory) under the content root
#[derive(Debug, Clone)]
pub struct ContentFile {
    pub path: PathBuf,
    pub kind: EntryKind,
    /// Lower-cased extension without the dot
    pub extension: Option<String>,
    pub modified: SystemTime,
    /// Raw bytes; empty for directories
    pub content: Vec<u8>,
}

impl ContentFile {
    /// Read a file from disk
    pub fn read(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let meta = fs::metadata(&path).map_err(|e| Error::io(&path, e))?;
        let content = fs::read(&path).map_err(|e| Error::io(&path, e))?;
        let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);

        Ok(Self {
            extension: extension_of(&path),
            path,
            kind: EntryKind::File,
            modified,
            content,
        })
    }

    /// In-memory file, mostly useful for rendering text that is not on disk
    pub fn from_parts(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        let path = path.into();
        Self {
            extension: extension_of(&path),
            path,
            kind: EntryKind::File,
            modified: SystemTime::UNIX_EPOCH,
            content: content.into(),
        }
    }

    fn directory(candidate: Candidate) -> Self {
        Self {
            path: candidate.path,
            kind: EntryKind::Directory,
            extension: None,
            modified: candidate.modified,
            content: Vec::new(),
        }
    }

    /// Content decoded as UTF-8, invalid sequences replaced
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }
}

pub(crate) fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .filter(|ext| !ext.is_empty())
}

/// An entry found by the locator, not yet read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub path: PathBuf,
    pub kind: EntryKind,
    pub modified: SystemTime,
}

impl Candidate {
    fn from_entry(entry: &DirEntry) -> Self {
        let kind = if entry.file_type().is_dir() {
            EntryKind::Directory
        } else {
            EntryKind::File
        };
        let modified = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        Self {
            path: entry.path().to_path_buf(),
            kind,
            modified,
        }
    }
}

/// Lazy, finite sequence of located entries.
///
/// Candidates are enumerated up front in a deterministic order; file
/// contents are read only as the iterator advances.
#[derive(Debug, Default)]
pub struct Located {
    candidates: Vec<Candidate>,
    next: usize,
}

impl Located {
    fn new(candidates: Vec<Candidate>) -> Self {
        Self {
            candidates,
            next: 0,
        }
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }
}

impl Iterator for Located {
    type Item = Result<ContentFile>;

    fn next(&mut self) -> Option<Self::Item> {
        let candidate = self.candidates.get(self.next)?.clone();
        self.next += 1;
        Some(match candidate.kind {
            EntryKind::Directory => Ok(ContentFile::directory(candidate)),
            EntryKind::File => ContentFile::read(candidate.path),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.candidates.len() - self.next;
        (remaining, Some(remaining))
    }
}

/// Locator bound to one content root
#[derive(Debug, Clone)]
pub struct Locator {
    content_root: PathBuf,
}

impl Locator {
    pub fn new(config: &Config) -> Self {
        Self {
            content_root: config.content_dir(),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn locate(&self, path: &ResolvedPath, mode: LookupMode) -> Located {
        match mode {
            LookupMode::Article => self.article(path),
            LookupMode::Section => self.section(path),
            LookupMode::Journal => self.journal(path),
        }
    }

    /// `p.*` directly under the content root, else every file below `p/`.
    /// An exact match shadows the recursive search.
    pub fn article(&self, path: &ResolvedPath) -> Located {
        let exact = self.exact_matches(path.segments());
        if !exact.is_empty() {
            tracing::debug!("Exact match for {}: {} file(s)", path, exact.len());
            return Located::new(exact);
        }

        let dir = self.join(path.segments());
        tracing::debug!("No exact match for {}, searching {:?}", path, dir);
        Located::new(self.walk(&dir, EntryKind::File))
    }

    /// Directories below `p/`, recursively
    pub fn section(&self, path: &ResolvedPath) -> Located {
        let dir = self.join(path.segments());
        Located::new(self.walk(&dir, EntryKind::Directory))
    }

    /// Entries of the feed rooted at the first two segments of `p`.
    ///
    /// Nested date partitions are flattened into one list. A file named
    /// `p.ext` is taken as an already flattened journal. Segments past the
    /// second narrow the feed to entries below them.
    pub fn journal(&self, path: &ResolvedPath) -> Located {
        let exact = self.exact_matches(path.segments());
        if !exact.is_empty() {
            tracing::debug!("Journal {} is a single flattened file", path);
            return Located::new(exact);
        }

        let split = path.segments().len().min(2);
        let (feed, filter) = path.segments().split_at(split);
        let feed_root = self.join(feed);
        let prefix: PathBuf = filter.iter().collect();

        let entries = self
            .walk(&feed_root, EntryKind::File)
            .into_iter()
            .filter(|c| {
                c.path
                    .strip_prefix(&feed_root)
                    .map(|rel| rel.starts_with(&prefix))
                    .unwrap_or(false)
            })
            .collect();
        Located::new(entries)
    }

    /// Every file in the store, newest first (ties broken by path)
    pub fn recent(&self) -> Located {
        let mut files = self.walk(&self.content_root, EntryKind::File);
        files.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.path.cmp(&b.path)));
        Located::new(files)
    }

    fn join(&self, segments: &[String]) -> PathBuf {
        segments
            .iter()
            .fold(self.content_root.clone(), |acc, s| acc.join(s))
    }

    /// Files named `<last segment>.<ext>` with exactly one extension
    fn exact_matches(&self, segments: &[String]) -> Vec<Candidate> {
        let Some((name, parents)) = segments.split_last() else {
            return Vec::new();
        };
        let dir = self.join(parents);
        let Ok(entries) = fs::read_dir(&dir) else {
            return Vec::new();
        };

        let mut found = Vec::new();
        for entry in entries.filter_map(|e| e.ok()) {
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let is_match = file_name
                .strip_prefix(name.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .is_some_and(|ext| !ext.is_empty() && !ext.contains('.'));
            if !is_match {
                continue;
            }

            let Ok(meta) = fs::metadata(entry.path()) else {
                continue;
            };
            if meta.is_file() {
                found.push(Candidate {
                    path: entry.path(),
                    kind: EntryKind::File,
                    modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                });
            }
        }
        found.sort_by(|a, b| a.path.cmp(&b.path));
        found
    }

    /// Entries of one kind strictly below `dir`, sorted by path
    fn walk(&self, dir: &Path, kind: EntryKind) -> Vec<Candidate> {
        if !dir.is_dir() {
            return Vec::new();
        }

        let mut found: Vec<Candidate> = WalkDir::new(dir)
            .min_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| match e {
                Ok(entry) => Some(entry),
                Err(err) => {
                    tracing::warn!("Skipping unreadable entry under {:?}: {}", dir, err);
                    None
                }
            })
            .filter(|e| match kind {
                EntryKind::File => e.file_type().is_file(),
                EntryKind::Directory => e.file_type().is_dir(),
            })
            .map(|e| Candidate::from_entry(&e))
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        found
    }
}
