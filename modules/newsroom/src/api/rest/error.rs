//! HTTP error mapping to RFC-9457 Problem Details

use crate::contract::{FieldError, NewsroomError};
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// One rejected request field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldProblem {
    pub field: String,
    pub message: String,
}

impl From<FieldError> for FieldProblem {
    fn from(e: FieldError) -> Self {
        Self {
            field: e.field,
            message: e.message,
        }
    }
}

/// RFC-9457 Problem Details for HTTP API errors
#[derive(Debug, Serialize, ToSchema)]
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

    /// Same text as `detail`, or the title when there is none
    pub error: String,

    /// Field-level validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<FieldProblem>,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            type_uri: format!("https://httpstatuses.io/{}", status.as_u16()),
            error: title.clone(),
            title,
            status: status.as_u16(),
            detail: None,
            details: Vec::new(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        self.error = detail.clone();
        self.detail = Some(detail);
        self
    }

    pub fn with_fields(mut self, details: Vec<FieldProblem>) -> Self {
        self.details = details;
        self
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Problem::new(StatusCode::BAD_REQUEST, "Bad Request").with_detail(detail)
    }

    pub fn unauthorized() -> Self {
        Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized").with_detail("Authentication required")
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

/// Map domain errors to HTTP Problem Details
pub fn map_domain_error(error: NewsroomError) -> Problem {
    match error {
        NewsroomError::NotFound { resource, id } => Problem::new(
            StatusCode::NOT_FOUND,
            format!("{} Not Found", resource),
        )
        .with_detail(format!("{} with id '{}' was not found", resource, id)),

        NewsroomError::Unauthorized { reason } => {
            Problem::new(StatusCode::UNAUTHORIZED, "Unauthorized").with_detail(reason)
        }

        NewsroomError::Forbidden { reason } => {
            Problem::new(StatusCode::FORBIDDEN, "Forbidden").with_detail(reason)
        }

        NewsroomError::Validation { message, details } => {
            Problem::new(StatusCode::BAD_REQUEST, "Validation Error")
                .with_detail(message)
                .with_fields(details.into_iter().map(FieldProblem::from).collect())
        }

        NewsroomError::Conflict { reason } => {
            Problem::new(StatusCode::CONFLICT, "Conflict").with_detail(reason)
        }

        NewsroomError::InvalidTransition { from, to } => {
            Problem::new(StatusCode::CONFLICT, "Invalid Status Transition")
                .with_detail(format!("Cannot move from {} to {}", from, to))
        }

        NewsroomError::Delivery { reason } => {
            Problem::new(StatusCode::BAD_GATEWAY, "Delivery Failed").with_detail(reason)
        }

        NewsroomError::Internal => Problem::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "Internal Server Error",
        )
        .with_detail("An internal error occurred"),
    }
}

impl From<NewsroomError> for Problem {
    fn from(error: NewsroomError) -> Self {
        map_domain_error(error)
    }
}

impl From<ValidationErrors> for Problem {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields: Vec<FieldProblem> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| FieldProblem {
                    field: field.to_string(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("invalid ({})", e.code)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        let summary = fields
            .iter()
            .map(|f| format!("{}: {}", f.field, f.message))
            .collect::<Vec<_>>()
            .join("; ");
        Problem::new(StatusCode::BAD_REQUEST, "Validation Error")
            .with_detail(summary)
            .with_fields(fields)
    }
}

impl From<JsonRejection> for Problem {
    fn from(rejection: JsonRejection) -> Self {
        Problem::bad_request(rejection.body_text())
    }
}

impl From<QueryRejection> for Problem {
    fn from(rejection: QueryRejection) -> Self {
        Problem::bad_request(rejection.body_text())
    }
}

impl From<PathRejection> for Problem {
    fn from(rejection: PathRejection) -> Self {
        Problem::bad_request(rejection.body_text())
    }
}

impl From<MultipartRejection> for Problem {
    fn from(rejection: MultipartRejection) -> Self {
        Problem::bad_request(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_status_codes() {
        let cases = [
            (NewsroomError::not_found("Story", "x"), 404),
            (NewsroomError::unauthorized("no"), 401),
            (NewsroomError::forbidden("no"), 403),
            (NewsroomError::validation("bad"), 400),
            (NewsroomError::conflict("dup"), 409),
            (
                NewsroomError::InvalidTransition {
                    from: "DRAFT".into(),
                    to: "PUBLISHED".into(),
                },
                409,
            ),
            (NewsroomError::delivery("smtp down"), 502),
            (NewsroomError::Internal, 500),
        ];
        for (error, status) in cases {
            assert_eq!(map_domain_error(error).status, status);
        }
    }

    #[test]
    fn validation_problem_carries_field_details() {
        let problem = map_domain_error(NewsroomError::invalid_field("email", "invalid email address"));
        let body = serde_json::to_value(&problem).unwrap();
        assert_eq!(body["type"], "https://httpstatuses.io/400");
        assert_eq!(body["error"], "email: invalid email address");
        assert_eq!(body["details"][0]["field"], "email");
    }

    #[test]
    fn internal_errors_hide_the_cause() {
        let body = serde_json::to_value(map_domain_error(NewsroomError::Internal)).unwrap();
        assert_eq!(body["error"], "An internal error occurred");
        assert!(body.get("details").is_none());
    }
}
