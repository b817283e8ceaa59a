//! Ranked reference-locations lookup
//!
//! The distinct-repository total is fetched in parallel with the ranked
//! page. Joining the two halves is deliberately asymmetric: a slow stats
//! query degrades the total to zero, while a failed stats query fails the
//! whole lookup and discards the already-computed page.

use crate::{access, GlobalRefs, MAX_REPOS_PER_QUERY, STATS_TIMEOUT};
use refindex_core::{
    Actor, DefKey, Error, FileRefCount, RefLocationsOptions, RefLocationsPage, RepoRefSummary,
    Result,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::warn;

impl GlobalRefs {
    /// Ranked, paginated, access-filtered reference locations for a
    /// definition, plus the unfiltered distinct-repository total.
    ///
    /// Repositories are ordered by aggregate reference count, files within
    /// each repository by per-file count; the definition's own repository,
    /// when present, is pinned to the front. At most
    /// [`MAX_REPOS_PER_QUERY`] repositories enter the access filter, and
    /// only those the caller can read survive, in unchanged relative order.
    pub async fn get(
        &self,
        actor: &Actor,
        def: &DefKey,
        options: &RefLocationsOptions,
    ) -> Result<RefLocationsPage> {
        // Fetch ref stats in parallel to fetching ref locations.
        let mut stats_task = tokio::spawn({
            let store = Arc::clone(&self.store);
            let def = def.clone();
            async move { store.count_referencing_repos(&def).await }
        });

        let rows = self
            .store
            .ref_locations(
                def,
                &options.repos,
                options.page_size_or_default(),
                options.offset,
            )
            .await?;

        // Group the page's rows by repository, preserving first-seen order.
        let mut summaries: Vec<RepoRefSummary> = Vec::new();
        let mut index_by_repo: HashMap<String, usize> = HashMap::new();
        let mut own_repo_idx: Option<usize> = None;

        for row in rows {
            let idx = match index_by_repo.get(&row.repo) {
                Some(&idx) => idx,
                None => {
                    let idx = summaries.len();
                    if row.repo == def.repo {
                        own_repo_idx = Some(idx);
                    }
                    index_by_repo.insert(row.repo.clone(), idx);
                    summaries.push(RepoRefSummary {
                        repo: row.repo.clone(),
                        count: row.repo_count,
                        files: Vec::new(),
                    });
                    idx
                }
            };
            if !row.file.is_empty() && row.count != 0 {
                summaries[idx].files.push(FileRefCount {
                    path: row.file,
                    count: row.count,
                });
            }
        }

        // Place the definition's own repository at the head of the list.
        if let Some(idx) = own_repo_idx {
            if idx > 0 {
                summaries.swap(0, idx);
            }
        }

        // Bound the authorization fan-out below.
        summaries.truncate(MAX_REPOS_PER_QUERY);

        let repos: Vec<String> = summaries.iter().map(|s| s.repo.clone()).collect();
        let mask = access::read_access_mask(&self.policy, actor, &repos).await?;
        let repo_refs: Vec<RepoRefSummary> = summaries
            .into_iter()
            .zip(mask)
            .filter_map(|(summary, allowed)| allowed.then_some(summary))
            .collect();

        // Join the stats task kicked off above: a finished value wins, the
        // timer degrades the total to zero, and a stats failure replaces
        // the entire result. The in-flight task is abandoned on timeout,
        // never cancelled.
        let total_repos = tokio::select! {
            joined = &mut stats_task => match joined {
                Ok(Ok(count)) => count,
                Ok(Err(e)) => return Err(e),
                Err(e) => return Err(Error::storage(format!("Repo count task failed: {e}"))),
            },
            _ = sleep(STATS_TIMEOUT) => {
                warn!(
                    def_repo = %def.repo,
                    def_path = %def.path,
                    "repo count timed out, returning zero total"
                );
                0
            }
        };

        Ok(RefLocationsPage {
            repo_refs,
            total_repos,
        })
    }
}
