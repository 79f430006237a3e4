use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use todo_api::v1::ErrorBody;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("The id is invalid")]
    InvalidId,

    #[error("Invalid request body")]
    InvalidBody(#[from] JsonRejection),

    #[error("Title is required")]
    MissingTitle,

    #[error("Todo not found")]
    NotFound,

    #[error("{context}")]
    Storage {
        context: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Failed rendering page")]
    Render(#[from] handlebars::RenderError),
}

impl ApiError {
    /// Wraps a storage failure with the message shown to the client.
    pub fn storage(context: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| match source {
            StoreError::NotFound => Self::NotFound,
            source => Self::Storage { context, source },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidId | Self::InvalidBody(_) | Self::MissingTitle => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Storage { .. } | Self::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Option<String> {
        match self {
            Self::InvalidBody(rejection) => Some(rejection.body_text()),
            Self::Storage { source, .. } => Some(source.to_string()),
            Self::Render(err) => Some(err.to_string()),
            _ => None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorBody {
            message: self.to_string(),
            error: self.detail(),
        };

        if status.is_server_error() {
            tracing::error!(error = ?body.error, "{}", body.message);
        } else {
            tracing::debug!(status = %status, "{}", body.message);
        }

        (status, Json(body)).into_response()
    }
}
