//! In-memory reference store for testing
//!
//! Mirrors the PostgreSQL reconciliation and ranking semantics exactly:
//! staged files replace their old rows, counts aggregate per seven-tuple,
//! and the ranked query computes its repo totals over the unpaginated
//! matching set. Stats latency and failure are injectable so callers can
//! exercise the lookup timeout race.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use crate::{RefLocationRow, RefStore};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use refindex_core::{DefKey, Error, NormalizedRef};
use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct RecordKey {
    def: DefKey,
    repo: String,
    commit_id: String,
    file: String,
}

#[derive(Debug, Default)]
struct MockData {
    records: HashMap<RecordKey, (i64, DateTime<Utc>)>,
    stats_delay: Option<Duration>,
    stats_error: Option<String>,
}

/// In-memory [`RefStore`] for tests
#[derive(Default)]
pub struct MockRefStore {
    data: Mutex<MockData>,
}

impl MockRefStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted records
    pub fn record_count(&self) -> usize {
        self.data.lock().unwrap().records.len()
    }

    /// Persisted count for one seven-tuple, if present
    pub fn count_for(&self, def: &DefKey, repo: &str, commit_id: &str, file: &str) -> Option<i64> {
        let key = RecordKey {
            def: def.clone(),
            repo: repo.to_string(),
            commit_id: commit_id.to_string(),
            file: file.to_string(),
        };
        self.data.lock().unwrap().records.get(&key).map(|&(c, _)| c)
    }

    /// Delay every subsequent `count_referencing_repos` call
    pub fn set_stats_delay(&self, delay: Duration) {
        self.data.lock().unwrap().stats_delay = Some(delay);
    }

    /// Fail every subsequent `count_referencing_repos` call
    pub fn fail_stats(&self, message: impl Into<String>) {
        self.data.lock().unwrap().stats_error = Some(message.into());
    }
}

#[async_trait]
impl RefStore for MockRefStore {
    async fn replace_file_refs(
        &self,
        repo: &str,
        commit_id: &str,
        refs: &[NormalizedRef],
    ) -> Result<(), Error> {
        if refs.is_empty() {
            return Ok(());
        }

        let staged_files: HashSet<&str> = refs.iter().map(|r| r.file.as_str()).collect();

        let mut data = self.data.lock().unwrap();

        // Purge old rows only for files present in the staged batch.
        data.records.retain(|key, _| {
            !(key.repo == repo
                && key.commit_id == commit_id
                && staged_files.contains(key.file.as_str()))
        });

        let now = Utc::now();
        for r in refs {
            let key = RecordKey {
                def: r.def.clone(),
                repo: repo.to_string(),
                commit_id: commit_id.to_string(),
                file: r.file.clone(),
            };
            let entry = data.records.entry(key).or_insert((0, now));
            entry.0 += 1;
            entry.1 = now;
        }

        Ok(())
    }

    async fn ref_locations(
        &self,
        def: &DefKey,
        repos: &[String],
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RefLocationRow>, Error> {
        let data = self.data.lock().unwrap();

        let mut rows: Vec<(String, String, i64)> = data
            .records
            .iter()
            .filter(|(key, _)| {
                key.def == *def && (repos.is_empty() || repos.contains(&key.repo))
            })
            .map(|(key, &(count, _))| (key.repo.clone(), key.file.clone(), count))
            .collect();

        // Repo totals over the full matching set, not the page.
        let mut totals: HashMap<&str, i64> = HashMap::new();
        for (repo, _, count) in &rows {
            *totals.entry(repo.as_str()).or_default() += count;
        }
        let totals: HashMap<String, i64> = totals
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

        rows.sort_by(|a, b| {
            (Reverse(totals[&a.0]), Reverse(a.2), &a.0, &a.1)
                .cmp(&(Reverse(totals[&b.0]), Reverse(b.2), &b.0, &b.1))
        });

        Ok(rows
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .map(|(repo, file, count)| RefLocationRow {
                repo_count: totals[&repo],
                repo,
                file,
                count,
            })
            .collect())
    }

    async fn count_referencing_repos(&self, def: &DefKey) -> Result<i64, Error> {
        let (delay, error) = {
            let data = self.data.lock().unwrap();
            (data.stats_delay, data.stats_error.clone())
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(message) = error {
            return Err(Error::storage(message));
        }

        let data = self.data.lock().unwrap();
        let repos: HashSet<&str> = data
            .records
            .keys()
            .filter(|key| key.def == *def)
            .map(|key| key.repo.as_str())
            .collect();
        Ok(repos.len() as i64)
    }

    async fn run_migrations(&self) -> Result<(), Error> {
        // In-memory store has no schema.
        Ok(())
    }
}
