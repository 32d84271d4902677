use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    pages::{ErrorPage, NotFoundPage},
    preload::PreloadError,
};

/// AppError
///
/// Failures a page handler can end in. None of them crash the request: each
/// renders either the not-found page or the generic error page.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("page not found")]
    NotFound,

    #[error(transparent)]
    Preload(#[from] PreloadError),

    #[error("preloaded data could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("template rendering failed: {0}")]
    Render(#[from] askama::Error),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Preload(err) if err.upstream_status() == Some(404) => StatusCode::NOT_FOUND,
            AppError::Preload(_) => StatusCode::BAD_GATEWAY,
            AppError::Decode(_) | AppError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let rendered = if status == StatusCode::NOT_FOUND {
            tracing::debug!(error = %self, "rendering not-found page");
            NotFoundPage::new().render()
        } else {
            tracing::error!(error = %self, "page rendering failed");
            ErrorPage::new().render()
        };

        match rendered {
            Ok(body) => (status, Html(body)).into_response(),
            Err(err) => {
                tracing::error!(error = %err, "error page could not be rendered");
                (status, "Something went wrong").into_response()
            }
        }
    }
}
