use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use chess_server_core::{Error, SelectError};

/// Core error on its way to an HTTP client
#[derive(Debug)]
pub struct ApiError(pub Error);

#[derive(Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}

impl ErrorBody {
    pub fn from_error(error: &Error) -> Self {
        Self {
            success: false,
            error: error.to_string(),
            code: error.code(),
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            Error::GameNotFound(_) | Error::Select(SelectError::NotFound) => StatusCode::NOT_FOUND,
            Error::Select(_) | Error::Move(_) | Error::MalformedInput(_) => StatusCode::BAD_REQUEST,
            Error::Conflict(_) => StatusCode::CONFLICT,
            Error::Database(_) | Error::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<E: Into<Error>> From<E> for ApiError {
    fn from(error: E) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        (status, Json(ErrorBody::from_error(&self.0))).into_response()
    }
}
