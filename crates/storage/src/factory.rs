use crate::{MockRefStore, PostgresRefStore, RefStore};
use refindex_core::{Error, StorageConfig};
use std::sync::Arc;
use tracing::warn;

/// Creates a reference store from configuration.
///
/// Returns a trait object so the engine stays agnostic of the backend.
/// The `"postgres"` provider connects a pooled client; any other provider
/// falls back to the in-memory mock, which is only suitable for tests.
///
/// Schema setup is a separate explicit step: call
/// [`RefStore::run_migrations`] once during startup before serving traffic.
pub async fn create_ref_store(config: &StorageConfig) -> Result<Arc<dyn RefStore>, Error> {
    match config.provider.as_str() {
        "postgres" => {
            let store = PostgresRefStore::connect(config).await?;
            Ok(Arc::new(store) as Arc<dyn RefStore>)
        }
        provider => {
            warn!(provider, "unknown storage provider, using in-memory mock");
            Ok(Arc::new(MockRefStore::new()) as Arc<dyn RefStore>)
        }
    }
}
