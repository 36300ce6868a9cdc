//! HTTP presentation of the ib-core error taxonomy.
//!
//! The core decides what went wrong; this wrapper only decides the status
//! code and the JSON shape. Nothing is remapped or swallowed.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use ib_core::AppError;
use std::fmt;

#[derive(Debug)]
pub struct ApiError(pub AppError);

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError(err)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.0 {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_, _) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let AppError::Internal(reason) = &self.0 {
            log::error!("internal error served as 500: {reason}");
        }
        HttpResponse::build(self.status_code())
            .json(serde_json::json!({ "error": self.0.to_string() }))
    }
}

pub(crate) fn bad_request(msg: impl Into<String>) -> ApiError {
    ApiError(AppError::Validation(msg.into()))
}
