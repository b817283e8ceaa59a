//! Index write path: authorization, normalization, atomic reconciliation

use crate::normalize::normalize_batch;
use crate::GlobalRefs;
use refindex_core::{Actor, Error, RefBatch, Result};
use tracing::debug;

impl GlobalRefs {
    /// Reconcile one extraction batch against the persisted index.
    ///
    /// Requires write access to the batch's repository; denial surfaces as
    /// [`Error::PermissionDenied`] before any mutation. A batch whose facts
    /// are all excluded by normalization is a no-op success. Otherwise the
    /// store replaces, in one transaction, the previously indexed rows of
    /// exactly the files present in the batch — the protocol is idempotent,
    /// so callers may blindly retry a failed batch.
    pub async fn update(&self, actor: &Actor, batch: &RefBatch) -> Result<()> {
        if !self.policy.can_write(actor, &batch.repo).await? {
            return Err(Error::permission_denied(format!(
                "{} cannot update refs of {}",
                actor.login, batch.repo
            )));
        }

        let normalized = normalize_batch(batch, self.classifier.as_ref(), &self.builtin_exclusion);
        if normalized.is_empty() {
            debug!(
                repo = %batch.repo,
                commit_id = %batch.commit_id,
                raw = batch.refs.len(),
                "no indexable refs in batch, skipping"
            );
            return Ok(());
        }

        debug!(
            repo = %batch.repo,
            commit_id = %batch.commit_id,
            raw = batch.refs.len(),
            normalized = normalized.len(),
            "updating global refs"
        );

        self.store
            .replace_file_refs(&batch.repo, &batch.commit_id, &normalized)
            .await
    }
}
