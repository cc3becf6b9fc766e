//! API Layer - REST endpoints for patient records

pub mod middleware;
pub mod patient;

use std::time::Duration;

use axum::{
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, warn};

use crate::config::Config;
use crate::error::ServiceError;
use crate::service::PatientService;
use crate::validation::ValidationError;

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
            ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::Storage(e) => {
                error!("Storage failure: {}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorResponse {
            error: self.kind().to_string(),
            details: Some(self.to_string()),
            errors: match self {
                ServiceError::Validation(errors) => errors,
                _ => vec![],
            },
        };
        (status, Json(body)).into_response()
    }
}

/// Create the main API router
pub fn router(service: PatientService, config: &Config) -> Router {
    let timeout = Duration::from_millis(config.server.request_timeout_ms);

    Router::new()
        .route("/health", get(health_check))
        .merge(patient::routes(service))
        .layer(axum::middleware::from_fn_with_state(timeout, middleware::timeout_middleware))
        .layer(axum::middleware::from_fn(middleware::request_id_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config.cors.allowed_origins))
}

/// CORS for the configured development origins
fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .expose_headers([header::LOCATION]);

    // A list containing "*" is rejected by tower-http, so wildcard is handled apart
    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match o.parse::<HeaderValue>() {
            Ok(v) => Some(v),
            Err(_) => {
                warn!("Ignoring invalid CORS origin: {}", o);
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

async fn health_check() -> &'static str {
    "OK"
}
