//! Content pipeline errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating or reading posts
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("no post matches slug `{0}`")]
    NotFound(String),

    #[error("slug `{slug}` matches {} files: {}", .candidates.len(), display_paths(.candidates))]
    Ambiguous {
        slug: String,
        candidates: Vec<PathBuf>,
    },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to compile {path}: {source}")]
    Compile {
        path: PathBuf,
        #[source]
        source: CompileError,
    },
}

impl ContentError {
    /// Whether this error should surface as a plain "not found"
    pub fn is_not_found(&self) -> bool {
        matches!(self, ContentError::NotFound(_))
    }
}

/// Errors raised by the document compiler
#[derive(Debug, Error)]
pub enum CompileError {
    #[error("malformed front-matter: {0}")]
    FrontMatter(#[from] serde_yaml::Error),

    #[error("front-matter block is not a key/value mapping")]
    FrontMatterShape,

    #[error("unknown component <{0}>")]
    UnknownComponent(String),
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
