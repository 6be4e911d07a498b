use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use crate::flash::{Flash, FlashRedirect};

pub const LANDING_PAGE: &str = "/";

#[derive(Debug, Error)]
pub enum AppError {
    /// Bad or missing credentials.
    #[error("{0}")]
    AuthenticationFailure(String),

    /// Wrong role, missing session, or acting on someone else's resource.
    #[error("{0}")]
    AuthorizationDenied(String),

    #[error("{message}")]
    Validation { message: String, redirect_to: String },

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            redirect_to: LANDING_PAGE.into(),
        }
    }

    pub fn denied(message: impl Into<String>) -> Self {
        AppError::AuthorizationDenied(message.into())
    }

    /// Sends validation failures back to the page the form was posted from.
    pub fn back_to(self, page: impl Into<String>) -> Self {
        match self {
            AppError::Validation { message, .. } => AppError::Validation {
                message,
                redirect_to: page.into(),
            },
            other => other,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::AuthenticationFailure(message) | AppError::AuthorizationDenied(message) => {
                FlashRedirect::new(LANDING_PAGE, Flash::error(message)).into_response()
            }
            AppError::Validation { message, redirect_to } => {
                warn!(%message, %redirect_to, "validation failed");
                FlashRedirect::new(redirect_to, Flash::error(message)).into_response()
            }
            AppError::NotFound(what) => {
                (StatusCode::NOT_FOUND, format!("{what} not found")).into_response()
            }
            AppError::Internal(e) => {
                error!(error = %e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}
