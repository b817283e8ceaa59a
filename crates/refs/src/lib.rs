//! Global cross-repository reference index engine
//!
//! [`GlobalRefs`] records, for every code definition known to the system,
//! every location that refers to it, and answers ranked, paginated,
//! access-filtered "who references this definition" queries.
//!
//! The write path ([`GlobalRefs::update`]) normalizes a batch of raw
//! reference facts from the extraction pipeline and atomically reconciles
//! them against the persisted index. The read path ([`GlobalRefs::get`])
//! runs the ranked page query and a distinct-repository count concurrently,
//! pins the definition's own repository to the front, truncates the
//! candidate list, and filters it through the caller's read authorization.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod access;
pub mod normalize;

mod lookup;
mod writer;

pub use access::{AccessPolicy, StaticAccessPolicy};
pub use normalize::{normalize_batch, BuiltinExclusion, PathClassifier, VendorDirClassifier};

use refindex_storage::RefStore;
use std::sync::Arc;
use std::time::Duration;

/// Hard cap on repositories surfaced per lookup; bounds the authorization
/// fan-out of the access filter.
pub const MAX_REPOS_PER_QUERY: usize = 100;

/// Maximum authorization checks in flight at once
pub const MAX_CONCURRENT_ACCESS_CHECKS: usize = 30;

/// Wall-time budget for the distinct-repository count
pub const STATS_TIMEOUT: Duration = Duration::from_millis(200);

/// The global reference index service
pub struct GlobalRefs {
    store: Arc<dyn RefStore>,
    policy: Arc<dyn AccessPolicy>,
    classifier: Arc<dyn PathClassifier>,
    builtin_exclusion: BuiltinExclusion,
}

impl GlobalRefs {
    /// Create an engine with the default vendored-path classifier and
    /// built-in definition exclusion.
    pub fn new(store: Arc<dyn RefStore>, policy: Arc<dyn AccessPolicy>) -> Self {
        Self {
            store,
            policy,
            classifier: Arc::new(VendorDirClassifier::default()),
            builtin_exclusion: BuiltinExclusion::default(),
        }
    }

    /// Override the vendored-path classification rule
    pub fn with_classifier(mut self, classifier: Arc<dyn PathClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Override the built-in definition exclusion
    pub fn with_builtin_exclusion(mut self, exclusion: BuiltinExclusion) -> Self {
        self.builtin_exclusion = exclusion;
        self
    }
}
