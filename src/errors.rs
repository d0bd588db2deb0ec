use axum::http::StatusCode;

/// Failures raised by the calendar, the store and its persistence backend.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("sleep hours must be a finite number, got {0}")]
    InvalidHours(f64),
    #[error("stored value under '{key}' is corrupt: {source}")]
    CorruptState {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("habit '{0}' not found")]
    NotFound(String),
    #[error("storage failure for '{key}': {source}")]
    Storage {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type TrackerResult<T> = Result<T, TrackerError>;

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn internal(err: impl std::error::Error) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: err.to_string(),
        }
    }
}

impl From<TrackerError> for AppError {
    fn from(err: TrackerError) -> Self {
        match err {
            TrackerError::InvalidDate(_) | TrackerError::InvalidHours(_) => {
                Self::bad_request(err.to_string())
            }
            TrackerError::NotFound(_) => Self::not_found(err.to_string()),
            other => Self::internal(other),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
