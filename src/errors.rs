use axum::http::StatusCode;
use std::fmt;

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

    pub fn loading() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "dashboard data is still loading".to_string(),
        }
    }

    pub fn load_failed(reason: impl fmt::Display) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: format!("failed to load dashboard data: {reason}"),
        }
    }
}

impl From<crate::view::UnknownView> for AppError {
    fn from(err: crate::view::UnknownView) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}

/// Why the one upstream fetch produced no snapshot.
#[derive(Debug)]
pub enum LoadError {
    Request(reqwest::Error),
    Status(reqwest::StatusCode),
    Decode(serde_json::Error),
    Rejected(String),
    MissingData,
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Request(err) => write!(f, "request failed: {err}"),
            LoadError::Status(status) => write!(f, "upstream answered {status}"),
            LoadError::Decode(err) => write!(f, "invalid payload: {err}"),
            LoadError::Rejected(status) => write!(f, "upstream reported status '{status}'"),
            LoadError::MissingData => f.write_str("payload has no data"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Request(err) => Some(err),
            LoadError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for LoadError {
    fn from(err: reqwest::Error) -> Self {
        Self::Request(err)
    }
}

impl From<serde_json::Error> for LoadError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err)
    }
}
