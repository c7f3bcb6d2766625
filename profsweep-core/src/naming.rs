//! Profiler artifact naming
//!
//! Artifacts are named after the item's base name. When two items in the
//! corpus share a base name, the item's 1-based corpus position is
//! prefixed, zero-padded to the decimal width of the corpus size, so every
//! artifact name within one run is unique. Names are only meaningful
//! relative to that run's corpus ordering; artifacts are per-run
//! disposables, never resumed.

use std::collections::HashMap;

use crate::corpus::{Corpus, WorkItem};

/// Run-scoped table of base-name occurrence counts.
#[derive(Debug)]
pub struct NamingTable {
    counts: HashMap<String, usize>,
    pad_width: usize,
}

impl NamingTable {
    /// Count base-name occurrences across the full corpus.
    pub fn build(corpus: &Corpus) -> Self {
        let mut counts: HashMap<String, usize> = HashMap::new();
        for item in corpus.items() {
            *counts.entry(item.base_name().to_string()).or_default() += 1;
        }
        let pad_width = corpus.len().to_string().len();
        Self { counts, pad_width }
    }

    /// Whether this item's base name occurs more than once in the corpus.
    pub fn collides(&self, item: &WorkItem) -> bool {
        self.counts.get(item.base_name()).copied().unwrap_or(0) > 1
    }

    /// The artifact file name for `item` at corpus position `sequence`
    /// (1-based), using `extension` as the artifact suffix.
    pub fn artifact_name(&self, sequence: u64, item: &WorkItem, extension: &str) -> String {
        let base = item.base_name();
        if self.collides(item) {
            format!(
                "{sequence:0width$}.{base}.{extension}",
                width = self.pad_width
            )
        } else {
            format!("{base}.{extension}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::discover;
    use std::fs::{self, File};
    use std::path::Path;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        File::create(path).unwrap();
    }

    #[test]
    fn unique_base_names_stay_plain() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.sif"));
        touch(&dir.path().join("b.sif"));

        let corpus = discover(dir.path(), ".sif").unwrap();
        let table = NamingTable::build(&corpus);

        assert_eq!(
            table.artifact_name(1, &corpus.items()[0], "callgrind"),
            "a.sif.callgrind"
        );
        assert_eq!(
            table.artifact_name(2, &corpus.items()[1], "callgrind"),
            "b.sif.callgrind"
        );
    }

    #[test]
    fn colliding_base_names_get_distinct_prefixes() {
        let dir = tempfile::tempdir().unwrap();
        touch(&dir.path().join("a.sif"));
        touch(&dir.path().join("b.sif"));
        touch(&dir.path().join("sub/a.sif"));

        let corpus = discover(dir.path(), ".sif").unwrap();
        let table = NamingTable::build(&corpus);

        // Sorted ids: a.sif (1), b.sif (2), sub/a.sif (3).
        let names: Vec<String> = corpus
            .items()
            .iter()
            .enumerate()
            .map(|(idx, item)| table.artifact_name(idx as u64 + 1, item, "callgrind"))
            .collect();

        assert_eq!(names[0], "1.a.sif.callgrind");
        assert_eq!(names[1], "b.sif.callgrind");
        assert_eq!(names[2], "3.a.sif.callgrind");
        assert_ne!(names[0], names[2]);
    }

    #[test]
    fn prefixes_are_padded_to_corpus_width() {
        let dir = tempfile::tempdir().unwrap();
        for i in 0..12 {
            touch(&dir.path().join(format!("d{i:02}/x.sif")));
        }

        let corpus = discover(dir.path(), ".sif").unwrap();
        let table = NamingTable::build(&corpus);

        assert_eq!(
            table.artifact_name(1, &corpus.items()[0], "callgrind"),
            "01.x.sif.callgrind"
        );
        assert_eq!(
            table.artifact_name(12, &corpus.items()[11], "callgrind"),
            "12.x.sif.callgrind"
        );
    }
}
