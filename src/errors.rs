use std::sync::Arc;

use axum::{
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::{config, db};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    // validation
    #[error("validation")]
    Validation(Vec<FieldError>),
    #[error("json_validation")]
    JsonValidation(String),
    #[error("path_validation")]
    PathValidation(String),

    // auth
    #[error("unauthorized")]
    Unauthorized(String),
    #[error("forbidden")]
    Forbidden(String),

    #[error("not_found")]
    NotFound(String),
    #[error("conflict")]
    Conflict(String),
    #[error("unavailable")]
    Unavailable,

    #[error(transparent)]
    DB(db::Error),
    #[error("unexpected")]
    Unexpected(String),
}

/// A single failed input field, reported back to the caller.
#[derive(Debug, Serialize, Clone)]
pub struct FieldError {
    pub field: &'static str,
    pub message: &'static str,
}

impl FieldError {
    pub fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl From<db::Error> for Error {
    fn from(error: db::Error) -> Self {
        match error {
            db::Error::NotFound(msg) => Self::NotFound(msg),
            db::Error::Constraint(_) => Self::Conflict("Resource already exists".into()),
            db::Error::Timeout => Self::Unavailable,
            error => Self::DB(error),
        }
    }
}

// Response

#[derive(Debug, Serialize, Default)]
pub struct ErrorResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldError>>,
    /// Developer diagnostic, only present outside production.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Error::Validation(_) | Error::JsonValidation(_) | Error::PathValidation(_) | Error::Conflict(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
            Error::DB(_) | Error::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<&Error> for ErrorResponse {
    fn from(error: &Error) -> Self {
        match error {
            Error::Validation(errors) => Self {
                message: "Validation failed".into(),
                errors: Some(errors.clone()),
                ..Default::default()
            },
            Error::JsonValidation(message) | Error::PathValidation(message) => Self {
                message: message.clone(),
                ..Default::default()
            },
            Error::Unauthorized(message)
            | Error::Forbidden(message)
            | Error::NotFound(message)
            | Error::Conflict(message) => Self {
                message: message.clone(),
                ..Default::default()
            },
            Error::Unavailable => Self {
                message: "Storage temporarily unavailable".into(),
                ..Default::default()
            },
            Error::DB(_) | Error::Unexpected(_) => Self {
                message: "Server error".into(),
                error: (!config().is_production()).then(|| format!("{error:?}")),
                ..Default::default()
            },
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();

        let mut res = axum::Json(ErrorResponse::from(&self)).into_response();
        res.extensions_mut().insert(Arc::new(self));

        *res.status_mut() = status;
        res
    }
}

pub async fn on_error(request: Request, next: Next) -> Response {
    let response = next.run(request).await;

    if let Some(error) = response.extensions().get::<Arc<Error>>() {
        tracing::error!("{:?}", error);
    }

    response
}
