pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod query_builder;
pub mod repository;

pub use manager::{DatabaseError, DatabaseManager};
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use repository::{CourseStore, EnrollmentStore, MemoStore, RecordStore, ReviewStore, UserStore};

use std::sync::Arc;

use crate::config::{DatabaseConfig, StorageBackend};

/// Open the configured record store
pub async fn open_store(config: &DatabaseConfig) -> Result<Arc<dyn RecordStore>, DatabaseError> {
    match config.backend {
        StorageBackend::Postgres => {
            let pool = DatabaseManager::connect(config).await?;
            Ok(Arc::new(PgStore::new(pool)))
        }
        StorageBackend::Memory => {
            tracing::warn!("Using the in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryStore::development().await))
        }
    }
}
