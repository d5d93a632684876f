use reqwest::StatusCode;
use serde_json::Value;

#[derive(Debug)]
pub enum ApiError {
    Http(HttpError),
    Transport(reqwest::Error),
    Decode(serde_json::Error),
}

impl ApiError {
    /// HTTP status of a non-2xx response. `None` for transport and decode failures.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Http(e) => Some(e.status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        ApiError::Transport(value)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(value: serde_json::Error) -> Self {
        ApiError::Decode(value)
    }
}

impl From<HttpError> for ApiError {
    fn from(value: HttpError) -> Self {
        ApiError::Http(value)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http(e) => e.fmt(f),
            ApiError::Transport(e) => write!(f, "Request failed: {}", e),
            ApiError::Decode(e) => write!(f, "Invalid response body: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

/// A non-2xx response from the Banger backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    pub status: StatusCode,
    pub error: String,
    pub message: Option<String>,
    pub code: Option<String>,
}

impl HttpError {
    /// Build an error from the status and the (possibly missing) JSON body.
    pub fn from_body(status: StatusCode, body: Option<&Value>) -> Self {
        let field = |name: &str| {
            body.and_then(|b| b.get(name))
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        let error = field("error")
            .filter(|e| !e.is_empty())
            .or_else(|| status.canonical_reason().map(str::to_string))
            .unwrap_or_else(|| "Request failed".to_string());

        Self {
            status,
            error,
            message: field("message"),
            code: field("code"),
        }
    }
}

impl std::fmt::Display for HttpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or(&self.error))
    }
}

impl std::error::Error for HttpError {}
