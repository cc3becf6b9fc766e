//! In-memory patient store

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::page::{Page, PageRequest};
use super::PatientRepository;
use crate::error::{Result, ServiceError};
use crate::patient::Patient;

/// Map-backed repository; ids come from a sequence that never goes back
pub struct InMemoryPatientRepository {
    rows: RwLock<BTreeMap<i64, Patient>>,
    next_id: AtomicI64,
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn paginate(mut rows: Vec<Patient>, request: &PageRequest) -> Page<Patient> {
        let total = rows.len() as u64;
        rows.sort_by(|a, b| request.sort.compare(a, b));

        let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
        let content = rows
            .into_iter()
            .skip(offset)
            .take(request.size as usize)
            .collect();
        Page::new(content, request, total)
    }
}

impl Default for InMemoryPatientRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>> {
        Ok(self.rows.read().await.get(&id).cloned())
    }

    async fn find_all_unpaged(&self) -> Result<Vec<Patient>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }

    async fn find_all(&self, request: &PageRequest) -> Result<Page<Patient>> {
        let rows: Vec<Patient> = self.rows.read().await.values().cloned().collect();
        Ok(Self::paginate(rows, request))
    }

    async fn save(&self, mut patient: Patient) -> Result<Patient> {
        let mut rows = self.rows.write().await;
        match patient.id {
            None => {
                let id = self.next_id.fetch_add(1, Ordering::SeqCst);
                patient.id = Some(id);
                rows.insert(id, patient.clone());
            }
            Some(id) => match rows.get_mut(&id) {
                Some(existing) => *existing = patient.clone(),
                None => return Err(ServiceError::NotFound(id)),
            },
        }
        Ok(patient)
    }

    async fn delete(&self, patient: &Patient) -> Result<()> {
        let id = patient.id.ok_or_else(|| ServiceError::Storage("Cannot delete an unsaved patient".to_string()))?;
        match self.rows.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(ServiceError::NotFound(id)),
        }
    }

    async fn count(&self) -> Result<u64> {
        Ok(self.rows.read().await.len() as u64)
    }

    async fn search_by_name(&self, term: &str, request: &PageRequest) -> Result<Page<Patient>> {
        let needle = term.to_lowercase();
        let rows: Vec<Patient> = self
            .rows
            .read()
            .await
            .values()
            .filter(|p| contains_ignore_case(&p.first_name, &needle) || contains_ignore_case(&p.last_name, &needle))
            .cloned()
            .collect();
        Ok(Self::paginate(rows, request))
    }
}
