//! Patient REST endpoints rooted at `/patient`

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Extension, Json, Path, Query,
    },
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::error::{Result, ServiceError};
use crate::patient::{Patient, PatientDto};
use crate::repository::{PageRequest, Sort};
use crate::service::PatientService;
use crate::validation::validate_patient;

pub fn routes(service: PatientService) -> Router {
    Router::new()
        .route("/patient", get(list_patients).post(create_patient))
        .route("/patient/all", get(list_all_patients))
        .route("/patient/count", get(count_patients))
        .route(
            "/patient/:id",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .layer(Extension(service))
}

/// Listing parameters; `sort` is `field,direction`
#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
    #[serde(default = "default_sort")]
    pub sort: String,
    #[serde(default)]
    pub search: String,
}

fn default_size() -> u32 { 10 }
fn default_sort() -> String { "id,asc".to_string() }

impl ListParams {
    pub fn page_request(&self) -> Result<PageRequest> {
        PageRequest::new(self.page, self.size, Sort::parse(&self.sort)?)
    }
}

fn path_id(id: std::result::Result<Path<i64>, PathRejection>) -> Result<i64> {
    id.map(|Path(id)| id)
        .map_err(|e| ServiceError::invalid("id", "type", &e.body_text()))
}

/// Validate the raw body, then build the record from it
fn patient_from_body(body: std::result::Result<Json<Value>, JsonRejection>) -> Result<Patient> {
    let Json(body) = body.map_err(|e| ServiceError::invalid("body", "json", &e.body_text()))?;

    if let Err(errors) = validate_patient(&body).into_result() {
        warn!("Rejected patient payload: {} field error(s)", errors.len());
        return Err(ServiceError::Validation(errors));
    }

    let dto: PatientDto =
        serde_json::from_value(body).map_err(|e| ServiceError::invalid("body", "json", &e.to_string()))?;
    Ok(dto.into())
}

async fn list_patients(
    Extension(service): Extension<PatientService>,
    params: std::result::Result<Query<ListParams>, QueryRejection>,
) -> Result<impl IntoResponse> {
    let Query(params) = params.map_err(|e| ServiceError::invalid("query", "type", &e.body_text()))?;
    let request = params.page_request()?;

    let page = if params.search.is_empty() {
        service.get_all_patients(&request).await?
    } else {
        service.search_patients(&params.search, &request).await?
    };
    Ok(Json(page))
}

async fn list_all_patients(Extension(service): Extension<PatientService>) -> Result<impl IntoResponse> {
    Ok(Json(service.find_all().await?))
}

async fn count_patients(Extension(service): Extension<PatientService>) -> Result<impl IntoResponse> {
    let count = service.count_all_patients().await?;
    Ok(Json(json!({ "count": count })))
}

async fn get_patient(
    Extension(service): Extension<PatientService>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<impl IntoResponse> {
    let id = path_id(id)?;
    Ok(Json(service.find_by_id(id).await?))
}

async fn create_patient(
    Extension(service): Extension<PatientService>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let patient = patient_from_body(body)?;
    let created = service.create(patient).await?;

    let location = format!("/patient/{}", created.id.unwrap_or_default());
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

async fn update_patient(
    Extension(service): Extension<PatientService>,
    id: std::result::Result<Path<i64>, PathRejection>,
    body: std::result::Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse> {
    let id = path_id(id)?;
    let patient = patient_from_body(body)?;
    Ok(Json(service.update(id, patient).await?))
}

async fn delete_patient(
    Extension(service): Extension<PatientService>,
    id: std::result::Result<Path<i64>, PathRejection>,
) -> Result<StatusCode> {
    let id = path_id(id)?;
    service.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
