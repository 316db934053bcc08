//! HTTP error mapping to RFC-9457 Problem Details

use super::auth::LoginRedirect;
use crate::contract::CausasError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;

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

    /// A URI reference that identifies the specific occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// Field errors, present on validation problems
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, Vec<String>>>,
}

impl Problem {
    /// Create a new Problem Details response
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            title: title.into(),
            status: status.as_u16(),
            detail: None,
            instance: None,
            errors: None,
        }
    }

    /// Add detail message
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Add instance URI
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_errors(mut self, errors: BTreeMap<String, Vec<String>>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request").with_detail(detail)
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Map domain errors to HTTP Problem Details
///
/// `Unauthenticated` maps to 401 here; handlers holding a principal turn it into
/// a login redirect instead (see [`ApiError`]).
pub fn map_domain_error(error: CausasError) -> Problem {
    match error {
        CausasError::Validation { errors } => Problem::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Validation Error",
        )
        .with_detail(errors.to_string())
        .with_errors(errors.as_map().clone()),

        CausasError::NotFound { resource, id } => Problem::new(
            StatusCode::NOT_FOUND,
            format!("{} Not Found", resource),
        )
        .with_detail(format!("{} with id '{}' was not found", resource, id)),

        CausasError::Conflict { reason } => {
            Problem::new(StatusCode::CONFLICT, "Conflict").with_detail(reason)
        }

        CausasError::Protected {
            resource,
            id,
            referenced_by,
        } => Problem::new(StatusCode::CONFLICT, "Protected")
            .with_detail(format!(
                "{} '{}' cannot be deleted while {} records reference it",
                resource, id, referenced_by
            )),

        CausasError::Unauthenticated => Problem::new(
            StatusCode::UNAUTHORIZED,
            "Authentication Required",
        ),

        CausasError::Internal => Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
        .with_detail("An unexpected error occurred"),
    }
}

/// Helper to convert anyhow errors to Problem Details
pub fn map_anyhow_error(error: anyhow::Error) -> Problem {
    tracing::error!("Internal error: {:?}", error);
    Problem::new(
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal Server Error",
    )
    .with_detail("An unexpected error occurred")
}

/// Error outcome of a page handler
#[derive(Debug)]
pub enum ApiError {
    Problem(Problem),
    Login(LoginRedirect),
}

impl From<Problem> for ApiError {
    fn from(problem: Problem) -> Self {
        Self::Problem(problem)
    }
}

impl From<LoginRedirect> for ApiError {
    fn from(redirect: LoginRedirect) -> Self {
        Self::Login(redirect)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Problem(problem) => problem.into_response(),
            Self::Login(redirect) => redirect.into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::contract::FieldErrors;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (CausasError::field("rol", "Este campo es obligatorio."), 422),
            (CausasError::not_found("causa", 9), 404),
            (CausasError::Conflict { reason: "dup".into() }, 409),
            (CausasError::protected("etapa", 1, "etapa_causa"), 409),
            (CausasError::Unauthenticated, 401),
            (CausasError::Internal, 500),
        ];
        for (error, status) in cases {
            assert_eq!(map_domain_error(error).status, status);
        }
    }

    #[test]
    fn test_validation_problem_carries_field_errors() {
        let problem = map_domain_error(CausasError::Validation {
            errors: FieldErrors::single("fecha", "Este campo es obligatorio."),
        });
        let errors = problem.errors.unwrap();
        assert_eq!(errors["fecha"], vec!["Este campo es obligatorio.".to_string()]);
    }
}
