//! Registry of post files, built once per process (or per build)

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::ContentError;

/// A post file and the slug derived from its name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub slug: String,
    pub path: PathBuf,
}

/// Read-only map from slugs to post files.
///
/// The content directory is walked once in [`PostIndex::scan`]; later edits
/// on disk are not seen until a new index is built.
#[derive(Debug, Clone, Default)]
pub struct PostIndex {
    root: PathBuf,
    entries: Vec<IndexEntry>,
}

impl PostIndex {
    /// Walk `root` for `.md` / `.mdx` files. A missing directory is an empty corpus.
    pub fn scan<P: AsRef<Path>>(root: P) -> Result<Self, ContentError> {
        let root = root.as_ref().to_path_buf();
        if !root.exists() {
            tracing::warn!("Content directory {:?} does not exist", root);
            return Ok(Self {
                root,
                entries: Vec::new(),
            });
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(&root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e.file_name()))
        {
            let entry = entry.map_err(|e| ContentError::Io {
                path: e.path().map(Path::to_path_buf).unwrap_or_else(|| root.clone()),
                source: e.into(),
            })?;
            let path = entry.path();
            if !entry.file_type().is_file() {
                continue;
            }
            if let Some(slug) = post_slug(path) {
                tracing::debug!("Indexed {} -> {:?}", slug, path);
                entries.push(IndexEntry {
                    slug,
                    path: path.to_path_buf(),
                });
            }
        }

        tracing::info!("Indexed {} post files under {:?}", entries.len(), root);
        Ok(Self { root, entries })
    }

    /// Directory the index was built from
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    /// Every slug in the corpus, sorted and without duplicates
    pub fn slugs(&self) -> Vec<&str> {
        let mut slugs: Vec<&str> = self.entries.iter().map(|e| e.slug.as_str()).collect();
        slugs.sort_unstable();
        slugs.dedup();
        slugs
    }

    /// Find the one file a slug refers to.
    ///
    /// A file whose name is exactly the slug wins. Failing that, the slug may
    /// be a fragment of exactly one file name. Anything else is an error.
    pub fn resolve(&self, slug: &str) -> Result<&Path, ContentError> {
        if slug.is_empty() {
            return Err(ContentError::NotFound(slug.to_string()));
        }

        let exact: Vec<&IndexEntry> = self.entries.iter().filter(|e| e.slug == slug).collect();
        let candidates = if exact.is_empty() {
            self.entries
                .iter()
                .filter(|e| e.slug.contains(slug))
                .collect()
        } else {
            exact
        };

        match candidates.as_slice() {
            [] => Err(ContentError::NotFound(slug.to_string())),
            [only] => Ok(only.path.as_path()),
            many => Err(ContentError::Ambiguous {
                slug: slug.to_string(),
                candidates: many.iter().map(|e| e.path.clone()).collect(),
            }),
        }
    }
}

/// Slug for a post file: its name without the `.md` / `.mdx` extension
pub fn post_slug(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !matches!(ext, "md" | "mdx" | "markdown") {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    (!stem.is_empty()).then(|| stem.to_string())
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_str().map(|s| s.starts_with('.')).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn corpus(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).unwrap();
            }
            fs::write(path, "# post\n").unwrap();
        }
        dir
    }

    #[test]
    fn test_enumerates_slugs() {
        let dir = corpus(&["y.mdx", "x.mdx", "notes.txt", "image.png"]);
        let index = PostIndex::scan(dir.path()).unwrap();
        assert_eq!(index.slugs(), vec!["x", "y"]);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_resolve_exact() {
        let dir = corpus(&["x.mdx", "y.mdx"]);
        let index = PostIndex::scan(dir.path()).unwrap();
        assert_eq!(index.resolve("x").unwrap(), dir.path().join("x.mdx"));
    }

    #[test]
    fn test_resolve_missing() {
        let dir = corpus(&["x.mdx", "y.mdx"]);
        let index = PostIndex::scan(dir.path()).unwrap();
        let err = index.resolve("z").unwrap_err();
        assert!(err.is_not_found());
        assert!(index.resolve("").unwrap_err().is_not_found());
    }

    #[test]
    fn test_resolve_fragment() {
        let dir = corpus(&["2023-webgl-fingerprinting.mdx", "hello.md"]);
        let index = PostIndex::scan(dir.path()).unwrap();
        assert_eq!(
            index.resolve("webgl").unwrap(),
            dir.path().join("2023-webgl-fingerprinting.mdx")
        );
    }

    #[test]
    fn test_exact_match_beats_fragment() {
        let dir = corpus(&["rust.mdx", "rust-async.mdx"]);
        let index = PostIndex::scan(dir.path()).unwrap();
        assert_eq!(index.resolve("rust").unwrap(), dir.path().join("rust.mdx"));
    }

    #[test]
    fn test_ambiguous_fragment() {
        let dir = corpus(&["rust-async.mdx", "rust-macros.mdx"]);
        let index = PostIndex::scan(dir.path()).unwrap();
        match index.resolve("rust") {
            Err(ContentError::Ambiguous { candidates, .. }) => assert_eq!(candidates.len(), 2),
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_same_stem_twice_is_ambiguous() {
        let dir = corpus(&["x.md", "x.mdx"]);
        let index = PostIndex::scan(dir.path()).unwrap();
        assert_eq!(index.slugs(), vec!["x"]);
        assert!(matches!(
            index.resolve("x"),
            Err(ContentError::Ambiguous { .. })
        ));
    }

    #[test]
    fn test_nested_and_hidden() {
        let dir = corpus(&["2024/deep.mdx", ".drafts/secret.mdx", ".swp.md"]);
        let index = PostIndex::scan(dir.path()).unwrap();
        assert_eq!(index.slugs(), vec!["deep"]);
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let index = PostIndex::scan(dir.path().join("nope")).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn test_snapshot_is_not_refreshed() {
        let dir = corpus(&["x.mdx"]);
        let index = PostIndex::scan(dir.path()).unwrap();
        fs::write(dir.path().join("later.mdx"), "# later\n").unwrap();
        assert!(index.resolve("later").unwrap_err().is_not_found());
        let rescanned = PostIndex::scan(dir.path()).unwrap();
        assert_eq!(rescanned.slugs(), vec!["later", "x"]);
    }
}
