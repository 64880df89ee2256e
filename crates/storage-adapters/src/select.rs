//! Picks the `ComplaintStore` the configuration asks for.

use std::sync::Arc;

use configs::{StorageBackend, StorageConfig};
use domains::{ComplaintStore, StoreError};
use tracing::info;

use crate::InMemoryComplaintStore;

/// Opens the configured backend. SQLite databases are migrated before use.
pub async fn open_store(config: &StorageConfig) -> Result<Arc<dyn ComplaintStore>, StoreError> {
    match config.backend {
        StorageBackend::Memory => {
            info!("using in-memory complaint store");
            Ok(Arc::new(InMemoryComplaintStore::new()))
        }
        #[cfg(feature = "db-sqlite")]
        StorageBackend::Sqlite => {
            use secrecy::ExposeSecret;

            let store =
                crate::SqliteComplaintStore::connect(config.database_url.expose_secret()).await?;
            store.migrate().await?;
            info!("using sqlite complaint store");
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "db-sqlite"))]
        StorageBackend::Sqlite => Err(StoreError::backend(
            "sqlite backend requested but built without the db-sqlite feature",
        )),
    }
}
