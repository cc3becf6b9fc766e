//! Service Module - patient operations over a repository

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{Result, ServiceError};
use crate::patient::{Patient, PatientDto};
use crate::repository::{Page, PageRequest, PatientRepository};

/// Patient operations; holds the repository it delegates to
#[derive(Clone)]
pub struct PatientService {
    repo: Arc<dyn PatientRepository>,
}

impl PatientService {
    pub fn new(repo: Arc<dyn PatientRepository>) -> Self {
        Self { repo }
    }

    /// Every record, unpaginated
    pub async fn find_all(&self) -> Result<Vec<Patient>> {
        self.repo.find_all_unpaged().await
    }

    pub async fn get_all_patients(&self, request: &PageRequest) -> Result<Page<PatientDto>> {
        let page = self.repo.find_all(request).await?;
        Ok(page.map(PatientDto::from))
    }

    pub async fn search_patients(&self, term: &str, request: &PageRequest) -> Result<Page<PatientDto>> {
        debug!("Searching patients for '{}'", term);
        let page = self.repo.search_by_name(term, request).await?;
        Ok(page.map(PatientDto::from))
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Patient> {
        match self.repo.find_by_id(id).await? {
            Some(patient) => Ok(patient),
            None => {
                warn!("Patient {} not found", id);
                Err(ServiceError::NotFound(id))
            }
        }
    }

    /// Save a new record; any client-supplied id is discarded
    pub async fn create(&self, mut patient: Patient) -> Result<Patient> {
        patient.id = None;
        let created = self.repo.save(patient).await?;
        info!("Created patient {:?}", created.id);
        Ok(created)
    }

    /// Full replace of every mutable field; fields missing from `incoming` are cleared
    pub async fn update(&self, id: i64, incoming: Patient) -> Result<Patient> {
        let mut existing = self.find_by_id(id).await?;
        existing.replace_fields(incoming);
        let updated = self.repo.save(existing).await?;
        info!("Updated patient {}", id);
        Ok(updated)
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let existing = self.find_by_id(id).await?;
        self.repo.delete(&existing).await?;
        info!("Deleted patient {}", id);
        Ok(())
    }

    pub async fn count_all_patients(&self) -> Result<u64> {
        self.repo.count().await
    }
}
