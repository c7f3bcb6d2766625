//! Corpus discovery
//!
//! Walks a search root recursively and collects every regular file whose
//! name ends with the configured suffix. Items are identified by their
//! path relative to the canonical root, with forward-slash separators on
//! every platform, so identifiers stay comparable across machines and
//! across runs that supply the root as a different absolute path or via a
//! symlink.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Errors raised while discovering the corpus. All of these are fatal to
/// the run: no partial corpus is usable.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The search root does not exist.
    #[error("search directory not found: {0}")]
    NotFound(PathBuf),

    /// The search root exists but is not a directory.
    #[error("search path is not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The search root could not be resolved to a canonical path.
    #[error("failed to resolve search directory {path}: {source}")]
    Resolve {
        /// The root as supplied by the operator.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The directory walk itself failed (e.g. a permission error).
    #[error("failed to walk {root}: {source}")]
    Walk {
        /// The canonical search root.
        root: PathBuf,
        /// Underlying walk error.
        source: walkdir::Error,
    },
}

/// One discovered input file, identified by its root-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WorkItem {
    id: String,
}

impl WorkItem {
    /// The forward-slash-normalized identifier relative to the search root.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The final path segment (file name) of this item.
    pub fn base_name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }

    /// Reconstruct the absolute path of this item under `root`.
    pub fn absolute_in(&self, root: &Path) -> PathBuf {
        let mut path = root.to_path_buf();
        for segment in self.id.split('/') {
            path.push(segment);
        }
        path
    }
}

/// The discovered corpus: a canonical root plus its work items in
/// deterministic (lexicographic) order.
#[derive(Debug, Clone)]
pub struct Corpus {
    root: PathBuf,
    items: Vec<WorkItem>,
}

impl Corpus {
    /// The canonical search root all identifiers are relative to.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The work items in discovery order.
    pub fn items(&self) -> &[WorkItem] {
        &self.items
    }

    /// Number of discovered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the corpus is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Discover every regular file beneath `root` whose name ends with
/// `suffix`.
///
/// The root is canonicalized once; identifiers are computed relative to
/// the canonical root. `walkdir` order depends on the filesystem, so the
/// identifiers are sorted lexicographically to make discovery
/// deterministic for a fixed directory snapshot.
pub fn discover(root: &Path, suffix: &str) -> Result<Corpus, CorpusError> {
    if !root.exists() {
        return Err(CorpusError::NotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(CorpusError::NotADirectory(root.to_path_buf()));
    }
    let canonical = fs::canonicalize(root).map_err(|source| CorpusError::Resolve {
        path: root.to_path_buf(),
        source,
    })?;

    let mut ids = Vec::new();
    for entry in WalkDir::new(&canonical) {
        let entry = entry.map_err(|source| CorpusError::Walk {
            root: canonical.clone(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        if !entry.file_name().to_string_lossy().ends_with(suffix) {
            continue;
        }
        match entry.path().strip_prefix(&canonical) {
            Ok(relative) => ids.push(normalize_identifier(relative)),
            // Entries come from walking the canonical root, so this is not
            // expected to happen; skip rather than abort if it does.
            Err(_) => warn!(path = %entry.path().display(), "could not relativize path, skipping"),
        }
    }
    ids.sort();

    info!(count = ids.len(), root = %canonical.display(), suffix, "discovered corpus");

    Ok(Corpus {
        root: canonical,
        items: ids.into_iter().map(|id| WorkItem { id }).collect(),
    })
}

/// Join path components with forward slashes regardless of platform.
fn normalize_identifier(relative: &Path) -> String {
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
