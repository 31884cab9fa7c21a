//! Identifier resolution: logical URIs to canonical store paths and back.

mod inflect;

pub use inflect::{pluralize, singularize};

use crate::config::Config;
use crate::error::{Error, Result};
use simplemind_types::{is_segment_char, Identifier, ResolvedPath};
use std::path::{Path, PathBuf};

/// Best-effort ASCII transliteration; unmappable characters are dropped
fn transliterate(input: &str) -> String {
    deunicode::deunicode_with_tofu(input, "")
}

fn sanitize_segment(segment: &str) -> String {
    segment.chars().filter(|c| is_segment_char(*c)).collect()
}

/// Resolve a caller-supplied identifier into a canonical store path.
///
/// The leading model segment is lower-cased and pluralized; every segment is
/// reduced to `[A-Za-z0-9_-]`, so traversal sequences such as `..` vanish.
///
/// # Example
///
/// ```
/// use simplemind_core::resolve;
///
/// let path = resolve("Article/Über-Rust").unwrap();
/// assert_eq!(path.to_string(), "articles/Uber-Rust");
/// ```
pub fn resolve(uri: &str) -> Result<ResolvedPath> {
    if uri.trim().is_empty() {
        return Err(Error::EmptyIdentifier);
    }

    let ascii = transliterate(uri);
    let mut segments: Vec<String> = ascii
        .split('/')
        .map(sanitize_segment)
        .filter(|s| !s.is_empty())
        .collect();

    let Some(model) = segments.first_mut() else {
        return Err(Error::EmptyIdentifier);
    };
    *model = pluralize(&model.to_lowercase());

    ResolvedPath::from_segments(segments).ok_or(Error::EmptyIdentifier)
}

fn strip_extension(segment: &str) -> &str {
    match segment.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => segment,
    }
}

/// Derive a display identifier from a file under the content root.
///
/// Approximate inverse of [`resolve`]: extensions are stripped, the content
/// root is dropped and the model segment is singularized. Irregular nouns
/// outside the exception table may not round-trip.
pub fn file_path_to_uri(path: &Path, content_root: &Path) -> Identifier {
    let relative = path.strip_prefix(content_root).unwrap_or(path);
    let ascii = transliterate(&relative.to_string_lossy());

    let mut segments: Vec<String> = ascii
        .split(['/', '\\'])
        .map(|s| sanitize_segment(strip_extension(s)))
        .filter(|s| !s.is_empty())
        .collect();

    if let Some(model) = segments.first_mut() {
        *model = singularize(&model.to_lowercase());
    }

    Identifier::new(segments.join("/"))
}

/// Human readable name for listings: `journals / 2024 / trip`
pub fn path_to_article_name(path: &Path, content_root: &Path) -> String {
    let relative = path.strip_prefix(content_root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .map(|s| strip_extension(&s).to_string())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// Resolver bound to one content root
#[derive(Debug, Clone)]
pub struct Resolver {
    content_root: PathBuf,
}

impl Resolver {
    pub fn new(config: &Config) -> Self {
        Self {
            content_root: config.content_dir(),
        }
    }

    pub fn content_root(&self) -> &Path {
        &self.content_root
    }

    pub fn resolve(&self, uri: &str) -> Result<ResolvedPath> {
        resolve(uri)
    }

    /// Absolute location of a resolved path inside the content root
    pub fn to_store_path(&self, path: &ResolvedPath) -> PathBuf {
        path.segments()
            .iter()
            .fold(self.content_root.clone(), |acc, s| acc.join(s))
    }

    pub fn file_path_to_uri(&self, path: &Path) -> Identifier {
        file_path_to_uri(path, &self.content_root)
    }

    pub fn article_name(&self, path: &Path) -> String {
        path_to_article_name(path, &self.content_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_pluralizes_model() {
        assert_eq!(resolve("article").unwrap().to_string(), "articles");
        assert_eq!(
            resolve("world/fonts/sans").unwrap().to_string(),
            "worlds/fonts/sans"
        );
        assert_eq!(resolve("Category/Rust").unwrap().to_string(), "categories/Rust");
    }

    #[test]
    fn test_resolve_rejects_empty() {
        assert!(matches!(resolve(""), Err(Error::EmptyIdentifier)));
        assert!(matches!(resolve("   \t"), Err(Error::EmptyIdentifier)));
        assert!(matches!(resolve("///"), Err(Error::EmptyIdentifier)));
        assert!(matches!(resolve("!!/??"), Err(Error::EmptyIdentifier)));
    }

    #[test]
    fn test_resolve_neutralizes_traversal() {
        let path = resolve("../../etc/passwd").unwrap();
        let rendered = path.to_string();
        assert!(!rendered.contains('.'));
        assert!(path.segments().iter().all(|s| s != ".."));
        assert_eq!(rendered, "etcs/passwd");
    }

    #[test]
    fn test_resolve_transliterates() {
        assert_eq!(resolve("article/café").unwrap().to_string(), "articles/cafe");
        assert_eq!(
            resolve("article/hello world!").unwrap().to_string(),
            "articles/helloworld"
        );
    }

    #[test]
    fn test_file_path_to_uri() {
        let root = Path::new("content");
        assert_eq!(
            file_path_to_uri(Path::new("content/articles/rust-notes.md"), root).as_str(),
            "article/rust-notes"
        );
        assert_eq!(
            file_path_to_uri(Path::new("content/journals/2024/05/trip.txt"), root).as_str(),
            "journal/2024/05/trip"
        );
        assert_eq!(
            file_path_to_uri(Path::new("content/people/alice.md"), root).as_str(),
            "person/alice"
        );
    }

    /// One model per suffix class the inflection rules handle
    const MODELS: &[&str] = &[
        "article", "note", "size", "prize", "house", "case", "pie", "tie", "axe", "bus",
        "status", "city", "category", "day", "key", "class", "box", "buzz", "waltz", "church",
        "wish", "person", "menu",
    ];

    #[test]
    fn test_round_trip_regular_identifiers() {
        let root = Path::new("/srv/content");
        for model in MODELS {
            for uri in [model.to_string(), format!("{model}/x"), format!("{model}/berlin/mitte")] {
                let resolved = resolve(&uri).unwrap();
                let file = resolved
                    .segments()
                    .iter()
                    .fold(root.to_path_buf(), |acc, s| acc.join(s))
                    .with_extension("md");
                assert_eq!(file_path_to_uri(&file, root).as_str(), uri, "via {file:?}");
            }
        }
    }

    #[test]
    fn test_round_trip_through_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let resolver = Resolver::new(&Config::new(dir.path()));

        for model in MODELS {
            let uri = format!("{model}/x");
            let file = resolver
                .to_store_path(&resolver.resolve(&uri).unwrap())
                .with_extension("md");
            std::fs::create_dir_all(file.parent().unwrap()).unwrap();
            std::fs::write(&file, "# x").unwrap();

            let found = std::fs::read_dir(file.parent().unwrap())
                .unwrap()
                .map(|entry| entry.unwrap().path())
                .find(|path| path.extension().is_some_and(|ext| ext == "md"))
                .unwrap();
            assert_eq!(resolver.file_path_to_uri(&found).as_str(), uri);
        }
    }

    #[test]
    fn test_article_name() {
        assert_eq!(
            path_to_article_name(Path::new("content/journals/2024/trip.md"), Path::new("content")),
            "journals / 2024 / trip"
        );
    }

    #[test]
    fn test_store_path() {
        let resolver = Resolver::new(&Config::new("/srv/content"));
        let path = resolver.resolve("article/rust").unwrap();
        assert_eq!(
            resolver.to_store_path(&path),
            PathBuf::from("/srv/content/articles/rust")
        );
    }
}
