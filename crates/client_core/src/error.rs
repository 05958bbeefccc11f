use shared::error::{ApiError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("no active session; sign in first")]
    Unauthenticated,
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server returned {status} for {url}: {message}")]
    Status {
        url: String,
        status: u16,
        code: ErrorCode,
        message: String,
    },
    #[error("malformed response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("invalid api url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    pub(crate) fn from_status(url: impl Into<String>, status: u16, body: &str) -> Self {
        let ApiError { code, message } = ApiError::from_response(status, body);
        Self::Status {
            url: url.into(),
            status,
            code,
            message,
        }
    }

    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::Unauthenticated => Some(ErrorCode::Unauthorized),
            Self::Status { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == Some(ErrorCode::NotFound)
    }

    /// The session is missing or was rejected and the user has to sign in again.
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self.code(),
            Some(ErrorCode::Unauthorized) | Some(ErrorCode::Forbidden)
        )
    }
}
