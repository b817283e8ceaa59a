//! Domain types for the global cross-repository reference index
//!
//! A *definition* is identified by a four-part key supplied by the
//! extraction pipeline; the index never validates that the definition
//! exists. A *reference fact* is one observed usage of a definition from a
//! specific file at a specific commit.

use serde::{Deserialize, Serialize};

/// Default number of file-level rows returned per lookup page
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Hard ceiling on the per-page row count a caller may request
pub const MAX_PAGE_SIZE: i64 = 1000;

/// Four-part identity of a code definition
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DefKey {
    /// Repository the definition originates from
    pub repo: String,
    /// Source-unit type (e.g. "GoPackage")
    pub unit_type: String,
    /// Source-unit name
    pub unit: String,
    /// Path of the definition within its unit
    pub path: String,
}

impl DefKey {
    pub fn new(
        repo: impl Into<String>,
        unit_type: impl Into<String>,
        unit: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            repo: repo.into(),
            unit_type: unit_type.into(),
            unit: unit.into(),
            path: path.into(),
        }
    }
}

/// One raw reference fact emitted by the extraction pipeline
///
/// Empty `def_repo`/`def_unit`/`def_unit_type` fields mean the definition is
/// local to the unit the batch was extracted from; the normalizer fills them
/// in from the owning batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawRef {
    #[serde(default)]
    pub def_repo: String,
    #[serde(default)]
    pub def_unit_type: String,
    #[serde(default)]
    pub def_unit: String,
    pub def_path: String,
    /// Referencing file, relative to the repository root
    pub file: String,
    /// True when the fact describes the definition site itself
    #[serde(default)]
    pub is_def: bool,
}

/// A batch of raw reference facts for one (repository, commit, source-unit)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefBatch {
    pub repo: String,
    pub commit_id: String,
    pub unit_name: String,
    pub unit_type: String,
    pub refs: Vec<RawRef>,
}

/// A normalized reference fact, worth exactly one unit of count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRef {
    pub def: DefKey,
    pub file: String,
}

/// Reference count for a single file within a [`RepoRefSummary`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRefCount {
    pub path: String,
    pub count: i64,
}

/// All references to a definition from one repository
///
/// Constructed fresh per lookup; never persisted. `count` is the sum of
/// `count` across every file of the repository referencing the definition
/// within the current page's window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoRefSummary {
    pub repo: String,
    pub count: i64,
    /// Referencing files in descending-count order
    pub files: Vec<FileRefCount>,
}

/// Options for a ranked reference-locations lookup
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RefLocationsOptions {
    /// Restrict results to these candidate repositories (empty = no filter)
    #[serde(default)]
    pub repos: Vec<String>,
    /// Page size over file-level rows; clamped to [1, MAX_PAGE_SIZE]
    #[serde(default)]
    pub page_size: Option<i64>,
    /// Offset over file-level rows
    #[serde(default)]
    pub offset: i64,
}

impl RefLocationsOptions {
    /// Requested page size, defaulted and clamped
    pub fn page_size_or_default(&self) -> i64 {
        self.page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// Result of a ranked reference-locations lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefLocationsPage {
    /// Ranked, access-filtered referencing repositories
    pub repo_refs: Vec<RepoRefSummary>,
    /// Distinct repositories referencing the definition, unfiltered;
    /// zero when the stats computation timed out
    pub total_repos: i64,
}

/// Caller identity consumed by the access policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub login: String,
}

impl Actor {
    pub fn new(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
        }
    }
}
