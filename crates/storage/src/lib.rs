//! Persisted storage for the global reference index
//!
//! The index is one logical table keyed by the seven-tuple
//! `(def_repo, def_unit_type, def_unit, def_path, repo, commit_id, file)`,
//! each row carrying an aggregated reference count and a last-updated
//! timestamp. [`RefStore`] is the seam between the reference engine and the
//! backend: [`PostgresRefStore`] is the production implementation,
//! [`MockRefStore`] mirrors its semantics in memory for tests.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod error;
mod factory;
mod mock;
mod postgres;

pub use factory::create_ref_store;
pub use mock::MockRefStore;
pub use postgres::PostgresRefStore;

use async_trait::async_trait;
use refindex_core::{DefKey, Error, NormalizedRef};

/// One file-level row of a ranked reference-locations query
///
/// `repo_count` is the window aggregate `SUM(count) OVER (PARTITION BY
/// repo)` computed over the full (unpaginated) matching set, so every row of
/// a repository carries the same value regardless of which page it lands on.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct RefLocationRow {
    pub repo: String,
    pub repo_count: i64,
    pub file: String,
    pub count: i64,
}

/// Durable store for cross-repository reference records
#[async_trait]
pub trait RefStore: Send + Sync {
    /// Atomically reconcile the normalized facts for `(repo, commit_id)`
    /// against the persisted index.
    ///
    /// Only files present in `refs` lose their previously indexed rows;
    /// rows for other files of the same commit are left untouched. Within
    /// one call the delete and the aggregated insert are a single
    /// transaction, so readers never observe a partially reconciled state.
    /// Re-running with an identical batch persists identical counts.
    async fn replace_file_refs(
        &self,
        repo: &str,
        commit_id: &str,
        refs: &[NormalizedRef],
    ) -> Result<(), Error>;

    /// Ranked file-level reference rows for a definition.
    ///
    /// Rows are ordered by `(repo_count DESC, count DESC, repo ASC, file
    /// ASC)` with `limit`/`offset` applied after ordering. An empty `repos`
    /// slice means no repository restriction.
    async fn ref_locations(
        &self,
        def: &DefKey,
        repos: &[String],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RefLocationRow>, Error>;

    /// Count of distinct repositories with at least one reference to the
    /// definition, independent of any pagination window.
    async fn count_referencing_repos(&self, def: &DefKey) -> Result<i64, Error>;

    /// Run schema migrations. Explicit startup step; no load-time schema
    /// side effects anywhere in the crate.
    async fn run_migrations(&self) -> Result<(), Error>;
}
