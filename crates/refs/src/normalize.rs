//! Reference fact normalization
//!
//! Filters and normalizes a batch of raw reference facts before they enter
//! the index. Exclusion is silent filtering, never an error: malformed
//! facts, definition sites, vendored files, and references to one
//! hard-coded standard-library namespace are dropped; facts without an
//! explicit definition origin are assumed local to the indexed unit.

use refindex_core::{DefKey, NormalizedRef, RefBatch};

/// Classifies whether a file path is vendored/third-party code
pub trait PathClassifier: Send + Sync {
    fn is_vendored(&self, path: &str) -> bool;
}

/// Default vendored-path rule: any path segment naming a well-known
/// vendoring directory marks the file as third-party.
pub struct VendorDirClassifier {
    dirs: Vec<String>,
}

impl VendorDirClassifier {
    pub fn new(dirs: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for VendorDirClassifier {
    fn default() -> Self {
        Self::new(["vendor", "Godeps", "node_modules", "third_party", "bower_components"])
    }
}

impl PathClassifier for VendorDirClassifier {
    fn is_vendored(&self, path: &str) -> bool {
        path.split('/')
            .any(|segment| self.dirs.iter().any(|d| d == segment))
    }
}

/// References into this namespace are excluded from the index.
///
/// Built-in definitions of the Go standard library (string, int, bool, ...)
/// have extreme fan-in: indexing them adds little value while dominating
/// index size and query cost. Kept as a named, overridable value so it can
/// be tested and reconfigured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinExclusion {
    pub unit_type: String,
    pub repo: String,
    pub unit: String,
}

impl Default for BuiltinExclusion {
    fn default() -> Self {
        Self {
            unit_type: "GoPackage".to_string(),
            repo: "github.com/golang/go".to_string(),
            unit: "builtin".to_string(),
        }
    }
}

impl BuiltinExclusion {
    fn matches(&self, def: &DefKey) -> bool {
        def.unit_type == self.unit_type && def.repo == self.repo && def.unit == self.unit
    }
}

/// Normalize a batch of raw reference facts into countable entries.
///
/// Each returned entry is worth exactly one unit of count. Exclusions are
/// applied in order: empty definition path, definition sites, vendored
/// files, then (after defaulting empty origin fields from the owning
/// batch) the built-in namespace exclusion.
pub fn normalize_batch(
    batch: &RefBatch,
    classifier: &dyn PathClassifier,
    exclusion: &BuiltinExclusion,
) -> Vec<NormalizedRef> {
    let mut out = Vec::with_capacity(batch.refs.len());

    for raw in &batch.refs {
        if raw.def_path.is_empty() {
            continue;
        }
        if raw.is_def {
            continue;
        }
        if classifier.is_vendored(&raw.file) {
            continue;
        }

        let def = DefKey {
            repo: if raw.def_repo.is_empty() {
                batch.repo.clone()
            } else {
                raw.def_repo.clone()
            },
            unit_type: if raw.def_unit_type.is_empty() {
                batch.unit_type.clone()
            } else {
                raw.def_unit_type.clone()
            },
            unit: if raw.def_unit.is_empty() {
                batch.unit_name.clone()
            } else {
                raw.def_unit.clone()
            },
            path: raw.def_path.clone(),
        };

        if exclusion.matches(&def) {
            continue;
        }

        out.push(NormalizedRef {
            def,
            file: raw.file.clone(),
        });
    }

    out
}
