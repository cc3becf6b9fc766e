//! Repository Module - storage access for patient records
//!
//! Two backends implement [`PatientRepository`]: an in-memory map and a
//! SQLite table. Both honor the same paging and ordering contract.

pub mod memory;
pub mod page;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::error::Result;
use crate::patient::Patient;

pub use memory::InMemoryPatientRepository;
pub use page::{Direction, Page, PageRequest, Sort, SortField};
pub use sqlite::SqlitePatientRepository;

/// Storage contract for patient records
#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>>;

    /// Every record, ordered by id
    async fn find_all_unpaged(&self) -> Result<Vec<Patient>>;

    async fn find_all(&self, request: &PageRequest) -> Result<Page<Patient>>;

    /// Insert when `id` is `None` (assigning a fresh id), otherwise update in place.
    /// Updating an id that no longer exists fails with `NotFound`.
    async fn save(&self, patient: Patient) -> Result<Patient>;

    /// Remove by identity; `NotFound` if the record is already gone
    async fn delete(&self, patient: &Patient) -> Result<()>;

    async fn count(&self) -> Result<u64>;

    /// Case-insensitive substring match on first OR last name
    async fn search_by_name(&self, term: &str, request: &PageRequest) -> Result<Page<Patient>>;
}

/// Build the repository selected by the storage configuration
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn PatientRepository>> {
    match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory patient store");
            Ok(Arc::new(InMemoryPatientRepository::new()))
        }
        StorageBackend::Sqlite => {
            let repo = SqlitePatientRepository::connect(&config.database_url, config.max_connections).await?;
            repo.migrate().await?;
            info!("Using SQLite patient store at {}", config.database_url);
            Ok(Arc::new(repo))
        }
    }
}
