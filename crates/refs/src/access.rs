//! Repository access policy and the bounded-concurrency read filter
//!
//! Denial is a boolean outcome, not an error: only an internal failure of
//! the checking mechanism itself aborts a filter pass.

use crate::MAX_CONCURRENT_ACCESS_CHECKS;
use async_trait::async_trait;
use refindex_core::{Actor, Error, Result};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Authorization decisions for repository access
#[async_trait]
pub trait AccessPolicy: Send + Sync {
    async fn can_read(&self, actor: &Actor, repo: &str) -> Result<bool>;
    async fn can_write(&self, actor: &Actor, repo: &str) -> Result<bool>;
}

/// Deny-list backed policy
///
/// Suitable for single-tenant deployments and as a test double: every
/// repository is accessible unless explicitly denied.
#[derive(Debug, Default)]
pub struct StaticAccessPolicy {
    read_denied: HashSet<String>,
    write_denied: HashSet<String>,
}

impl StaticAccessPolicy {
    /// Policy that grants everything
    pub fn allow_all() -> Self {
        Self::default()
    }

    /// Deny read access to the given repositories
    pub fn deny_read(mut self, repos: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.read_denied.extend(repos.into_iter().map(Into::into));
        self
    }

    /// Deny write access to the given repositories
    pub fn deny_write(mut self, repos: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.write_denied.extend(repos.into_iter().map(Into::into));
        self
    }
}

#[async_trait]
impl AccessPolicy for StaticAccessPolicy {
    async fn can_read(&self, _actor: &Actor, repo: &str) -> Result<bool> {
        Ok(!self.read_denied.contains(repo))
    }

    async fn can_write(&self, _actor: &Actor, repo: &str) -> Result<bool> {
        Ok(!self.write_denied.contains(repo))
    }
}

/// Compute a read-authorization mask for an ordered repository list.
///
/// Checks run concurrently, at most [`MAX_CONCURRENT_ACCESS_CHECKS`] in
/// flight; each task writes only its own index-addressed slot, so the mask
/// order matches the input order regardless of completion order. A denial
/// is recorded as `false`; an internal policy error aborts the whole pass.
pub(crate) async fn read_access_mask(
    policy: &Arc<dyn AccessPolicy>,
    actor: &Actor,
    repos: &[String],
) -> Result<Vec<bool>> {
    let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT_ACCESS_CHECKS));
    let mut checks: JoinSet<Result<(usize, bool)>> = JoinSet::new();

    for (idx, repo) in repos.iter().enumerate() {
        let policy = Arc::clone(policy);
        let semaphore = Arc::clone(&semaphore);
        let actor = actor.clone();
        let repo = repo.clone();

        checks.spawn(async move {
            let _permit = semaphore
                .acquire_owned()
                .await
                .map_err(|e| Error::storage(format!("Access check semaphore closed: {e}")))?;
            let allowed = policy.can_read(&actor, &repo).await?;
            Ok((idx, allowed))
        });
    }

    let mut mask = vec![false; repos.len()];
    while let Some(joined) = checks.join_next().await {
        let (idx, allowed) =
            joined.map_err(|e| Error::storage(format!("Access check task failed: {e}")))??;
        mask[idx] = allowed;
    }

    Ok(mask)
}
