use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Upstream error: {message}")]
    UpstreamError {
        message: String,
        /// Raw error payload returned by the provider, when there was one.
        details: Option<Value>,
    },
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Serialization error: {0}")]
    SerializationError(String),
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl GatewayError {
    pub fn upstream(message: impl Into<String>) -> Self {
        GatewayError::UpstreamError {
            message: message.into(),
            details: None,
        }
    }

    pub fn upstream_with_details(message: impl Into<String>, details: Value) -> Self {
        GatewayError::UpstreamError {
            message: message.into(),
            details: Some(details),
        }
    }

    /// Machine-readable category used in JSON error bodies.
    pub fn category(&self) -> &'static str {
        match self {
            GatewayError::ValidationError(_) => "validation",
            GatewayError::UpstreamError { .. } => "upstream",
            GatewayError::ConfigError(_) => "config",
            GatewayError::SerializationError(_) | GatewayError::InternalError(_) => "internal",
        }
    }

    pub fn details(&self) -> Option<&Value> {
        match self {
            GatewayError::UpstreamError { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    /// Turns a non-success provider response into an `UpstreamError`, keeping
    /// the body as JSON when it parses and as a plain string otherwise.
    pub(crate) async fn from_response(provider: &str, response: reqwest::Response) -> Self {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = format!("{} returned {}", provider, status);

        if body.trim().is_empty() {
            return GatewayError::upstream(message);
        }

        let details = serde_json::from_str::<Value>(&body).unwrap_or(Value::String(body));
        GatewayError::upstream_with_details(message, details)
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        GatewayError::upstream(err.to_string())
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
