//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::ModuleSetupError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize)]
pub struct Problem {
    /// A URI reference that identifies the problem type
    #[serde(rename = "type")]
    pub type_uri: String,

    /// A short, human-readable summary of the problem type
    pub title: String,

    /// The HTTP status code
    pub status: u16,

    /// A human-readable explanation specific to this occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: ModuleSetupError) -> Problem {
    match &error {
        ModuleSetupError::ConfigurationNotFound { resource, .. } => {
            Problem::new(StatusCode::NOT_FOUND, format!("{} Not Found", resource)).with_detail(error.to_string())
        }

        ModuleSetupError::EntryDoesNotExist { .. } => {
            Problem::new(StatusCode::NOT_FOUND, "Setting Not Found").with_detail(error.to_string())
        }

        ModuleSetupError::ControllerDuplication { .. } => {
            Problem::new(StatusCode::CONFLICT, "Controller Duplication").with_detail(error.to_string())
        }

        ModuleSetupError::InvalidClassExtensionNamespace { .. } => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid Class Extension",
        )
        .with_detail(error.to_string()),

        ModuleSetupError::UnsupportedMetadataKey { .. }
        | ModuleSetupError::UnsupportedMetadataValueType { .. }
        | ModuleSetupError::ModuleIdNotValid => {
            Problem::new(StatusCode::BAD_REQUEST, "Invalid Module Metadata").with_detail(error.to_string())
        }

        ModuleSetupError::Internal { .. } => Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
        .with_detail("An unexpected error occurred"),
    }
}
