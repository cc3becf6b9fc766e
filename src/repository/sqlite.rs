//! SQLite patient store

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

use super::page::{Page, PageRequest};
use super::PatientRepository;
use crate::error::{Result, ServiceError};
use crate::patient::Patient;

const COLUMNS: &str = "id, first_name, last_name, address, city, state, zip_code, phone_number, email";

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    first_name_lc TEXT NOT NULL,
    last_name_lc TEXT NOT NULL,
    address TEXT CHECK (address IS NULL OR length(address) <= 500),
    city TEXT,
    state TEXT,
    zip_code TEXT,
    phone_number TEXT,
    email TEXT
)
"#;

/// Repository over a `patients` table
///
/// `AUTOINCREMENT` keeps SQLite from handing out the id of a deleted row again.
/// `first_name_lc`/`last_name_lc` hold the names lowercased by Rust, since
/// SQLite's `lower()` only folds ASCII.
#[derive(Clone)]
pub struct SqlitePatientRepository {
    pool: SqlitePool,
}

impl SqlitePatientRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool for `url`, creating the database file if needed.
    ///
    /// In-memory databases live per connection, so callers pass
    /// `max_connections = 1` for `sqlite::memory:`.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Ok(Self::new(pool))
    }

    /// Create the `patients` table if it does not exist
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        Ok(())
    }

    async fn fetch_page(
        &self,
        filter: Option<&str>,
        pattern: Option<&str>,
        request: &PageRequest,
    ) -> Result<Page<Patient>> {
        let where_clause = filter.map(|f| format!(" WHERE {}", f)).unwrap_or_default();

        // Sort column comes from the SortField whitelist, never from user text
        let collate = if request.sort.field.is_text() { " COLLATE NOCASE" } else { "" };
        let sql = format!(
            "SELECT {} FROM patients{} ORDER BY {}{} {}, id ASC LIMIT ? OFFSET ?",
            COLUMNS,
            where_clause,
            request.sort.field.column(),
            collate,
            request.sort.direction.as_sql(),
        );
        let count_sql = format!("SELECT COUNT(*) FROM patients{}", where_clause);

        let mut rows_query = sqlx::query_as::<_, Patient>(&sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(pattern) = pattern {
            rows_query = rows_query.bind(pattern).bind(pattern);
            count_query = count_query.bind(pattern).bind(pattern);
        }

        let offset = i64::try_from(request.offset()).unwrap_or(i64::MAX);
        let content = rows_query
            .bind(request.size as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        let total = count_query.fetch_one(&self.pool).await?;

        debug!(page = request.page, size = request.size, total, "Fetched patient page");
        Ok(Page::new(content, request, total as u64))
    }
}

/// Escape LIKE wildcards so the term matches literally
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl PatientRepository for SqlitePatientRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Patient>> {
        let sql = format!("SELECT {} FROM patients WHERE id = ?", COLUMNS);
        let patient = sqlx::query_as::<_, Patient>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(patient)
    }

    async fn find_all_unpaged(&self) -> Result<Vec<Patient>> {
        let sql = format!("SELECT {} FROM patients ORDER BY id ASC", COLUMNS);
        let rows = sqlx::query_as::<_, Patient>(&sql).fetch_all(&self.pool).await?;
        Ok(rows)
    }

    async fn find_all(&self, request: &PageRequest) -> Result<Page<Patient>> {
        self.fetch_page(None, None, request).await
    }

    async fn save(&self, mut patient: Patient) -> Result<Patient> {
        match patient.id {
            None => {
                let result = sqlx::query(
                    "INSERT INTO patients (first_name, last_name, first_name_lc, last_name_lc,
                                           address, city, state, zip_code, phone_number, email)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                )
                .bind(&patient.first_name)
                .bind(&patient.last_name)
                .bind(patient.first_name.to_lowercase())
                .bind(patient.last_name.to_lowercase())
                .bind(&patient.address)
                .bind(&patient.city)
                .bind(&patient.state)
                .bind(&patient.zip_code)
                .bind(&patient.phone_number)
                .bind(&patient.email)
                .execute(&self.pool)
                .await?;
                patient.id = Some(result.last_insert_rowid());
            }
            Some(id) => {
                let result = sqlx::query(
                    "UPDATE patients
                     SET first_name = ?, last_name = ?, first_name_lc = ?, last_name_lc = ?,
                         address = ?, city = ?, state = ?, zip_code = ?, phone_number = ?, email = ?
                     WHERE id = ?",
                )
                .bind(&patient.first_name)
                .bind(&patient.last_name)
                .bind(patient.first_name.to_lowercase())
                .bind(patient.last_name.to_lowercase())
                .bind(&patient.address)
                .bind(&patient.city)
                .bind(&patient.state)
                .bind(&patient.zip_code)
                .bind(&patient.phone_number)
                .bind(&patient.email)
                .bind(id)
                .execute(&self.pool)
                .await?;
                if result.rows_affected() == 0 {
                    return Err(ServiceError::NotFound(id));
                }
            }
        }
        Ok(patient)
    }

    async fn delete(&self, patient: &Patient) -> Result<()> {
        let id = patient.id.ok_or_else(|| ServiceError::Storage("Cannot delete an unsaved patient".to_string()))?;
        let result = sqlx::query("DELETE FROM patients WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(ServiceError::NotFound(id));
        }
        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as u64)
    }

    async fn search_by_name(&self, term: &str, request: &PageRequest) -> Result<Page<Patient>> {
        let pattern = like_pattern(term);
        self.fetch_page(
            Some(r"first_name_lc LIKE ? ESCAPE '\' OR last_name_lc LIKE ? ESCAPE '\'"),
            Some(&pattern),
            request,
        )
        .await
    }
}
