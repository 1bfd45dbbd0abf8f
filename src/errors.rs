use axum::http::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChecklistError {
    #[error("{0}")]
    Validation(String),
    #[error("no item with id '{0}' in this day's list")]
    ItemNotFound(String),
    #[error("{0}")]
    UnknownDay(String),
    #[error("storage failure: {0}")]
    Storage(String),
}

impl ChecklistError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<std::io::Error> for ChecklistError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ChecklistError {
    fn from(err: serde_json::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

pub type ChecklistResult<T> = Result<T, ChecklistError>;

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

impl From<ChecklistError> for AppError {
    fn from(err: ChecklistError) -> Self {
        match err {
            ChecklistError::Validation(_) => Self::bad_request(err.to_string()),
            ChecklistError::ItemNotFound(_) | ChecklistError::UnknownDay(_) => {
                Self::not_found(err.to_string())
            }
            ChecklistError::Storage(_) => Self::internal(err),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
