//! PostgreSQL-backed reference store
//!
//! Reconciliation uses an aggregate-and-swap protocol inside one
//! transaction: raw facts are bulk-loaded into a temp staging table, stale
//! rows for the staged files are deleted, and the aggregated counts are
//! inserted in their place. The staging table is `ON COMMIT DROP`, so it
//! never outlives the transaction.

use crate::error::StorageError;
use crate::{RefLocationRow, RefStore};
use async_trait::async_trait;
use refindex_core::{DefKey, Error, NormalizedRef, StorageConfig};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use tracing::{debug, info};

const CREATE_STAGING_SQL: &str = "\
CREATE TEMPORARY TABLE global_refs_staging (
    def_repo TEXT NOT NULL,
    def_unit_type TEXT NOT NULL,
    def_unit TEXT NOT NULL,
    def_path TEXT NOT NULL,
    file TEXT NOT NULL
) ON COMMIT DROP";

const STAGE_INSERT_SQL: &str = "\
INSERT INTO global_refs_staging (def_repo, def_unit_type, def_unit, def_path, file)
SELECT * FROM UNNEST($1::text[], $2::text[], $3::text[], $4::text[], $5::text[])";

// Only files present in the staged batch lose their old rows.
const STALE_DELETE_SQL: &str = "\
DELETE FROM global_refs
WHERE repo = $1 AND commit_id = $2
  AND file IN (SELECT DISTINCT file FROM global_refs_staging)";

const AGGREGATE_INSERT_SQL: &str = "\
INSERT INTO global_refs (def_repo, def_unit_type, def_unit, def_path, repo, commit_id, file, count, updated_at)
SELECT def_repo, def_unit_type, def_unit, def_path, $1, $2, file, COUNT(*), NOW()
FROM global_refs_staging
GROUP BY def_repo, def_unit_type, def_unit, def_path, file";

const REF_LOCATIONS_SQL: &str = "\
SELECT repo, repo_count, file, count FROM (
    SELECT repo,
           SUM(count) OVER (PARTITION BY repo) AS repo_count,
           file,
           count::bigint AS count
    FROM global_refs
    WHERE def_repo = $1 AND def_unit_type = $2 AND def_unit = $3 AND def_path = $4
      AND ($5::text[] IS NULL OR repo = ANY($5))
) ranked
ORDER BY repo_count DESC, count DESC, repo ASC, file ASC
LIMIT $6 OFFSET $7";

const DISTINCT_REPOS_SQL: &str = "\
SELECT COUNT(DISTINCT repo) FROM global_refs
WHERE def_repo = $1 AND def_unit_type = $2 AND def_unit = $3 AND def_path = $4";

/// Production [`RefStore`] backed by PostgreSQL
pub struct PostgresRefStore {
    pool: PgPool,
}

impl PostgresRefStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a pooled client from storage configuration
    pub async fn connect(config: &StorageConfig) -> Result<Self, Error> {
        let options = PgConnectOptions::new()
            .host(&config.postgres_host)
            .port(config.postgres_port)
            .database(&config.postgres_database)
            .username(&config.postgres_user)
            .password(&config.postgres_password);

        let pool = PgPoolOptions::new()
            .max_connections(config.postgres_pool_size)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::ConnectionFailed(e.to_string()))?;

        Ok(Self::new(pool))
    }
}

#[async_trait]
impl RefStore for PostgresRefStore {
    async fn replace_file_refs(
        &self,
        repo: &str,
        commit_id: &str,
        refs: &[NormalizedRef],
    ) -> Result<(), Error> {
        if refs.is_empty() {
            return Ok(());
        }

        let def_repos: Vec<&str> = refs.iter().map(|r| r.def.repo.as_str()).collect();
        let def_unit_types: Vec<&str> = refs.iter().map(|r| r.def.unit_type.as_str()).collect();
        let def_units: Vec<&str> = refs.iter().map(|r| r.def.unit.as_str()).collect();
        let def_paths: Vec<&str> = refs.iter().map(|r| r.def.path.as_str()).collect();
        let files: Vec<&str> = refs.iter().map(|r| r.file.as_str()).collect();

        let mut tx = self.pool.begin().await.map_err(|e| {
            StorageError::TransactionFailed(format!("Failed to begin transaction: {e}"))
        })?;

        sqlx::query(CREATE_STAGING_SQL)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StorageError::TransactionFailed(format!("Failed to create staging table: {e}"))
            })?;

        // Raw rows, one unit of count each; aggregation happens at insert.
        sqlx::query(STAGE_INSERT_SQL)
            .bind(&def_repos)
            .bind(&def_unit_types)
            .bind(&def_units)
            .bind(&def_paths)
            .bind(&files)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StorageError::TransactionFailed(format!("Failed to stage refs: {e}"))
            })?;

        sqlx::query(STALE_DELETE_SQL)
            .bind(repo)
            .bind(commit_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StorageError::TransactionFailed(format!("Failed to delete stale refs: {e}"))
            })?;

        sqlx::query(AGGREGATE_INSERT_SQL)
            .bind(repo)
            .bind(commit_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                StorageError::TransactionFailed(format!("Failed to insert aggregated refs: {e}"))
            })?;

        tx.commit().await.map_err(|e| {
            StorageError::TransactionFailed(format!("Failed to commit transaction: {e}"))
        })?;

        debug!(repo, commit_id, staged = refs.len(), "reconciled global refs");
        Ok(())
    }

    async fn ref_locations(
        &self,
        def: &DefKey,
        repos: &[String],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RefLocationRow>, Error> {
        let repo_filter: Option<&[String]> = if repos.is_empty() { None } else { Some(repos) };

        let rows = sqlx::query_as::<_, RefLocationRow>(REF_LOCATIONS_SQL)
            .bind(&def.repo)
            .bind(&def.unit_type)
            .bind(&def.unit)
            .bind(&def.path)
            .bind(repo_filter)
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Ref locations query failed: {e}")))?;

        Ok(rows)
    }

    async fn count_referencing_repos(&self, def: &DefKey) -> Result<i64, Error> {
        let count: i64 = sqlx::query_scalar(DISTINCT_REPOS_SQL)
            .bind(&def.repo)
            .bind(&def.unit_type)
            .bind(&def.unit)
            .bind(&def.path)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::QueryFailed(format!("Repo count query failed: {e}")))?;

        Ok(count)
    }

    async fn run_migrations(&self) -> Result<(), Error> {
        info!("Running refindex storage migrations");
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(())
    }
}
