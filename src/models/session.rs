use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GatewayError, Result};

/// Customer ids arrive either as JSON numbers or strings.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum CustomerRef {
    Number(u64),
    Text(String),
}

impl CustomerRef {
    /// The id as a path segment, when it is a plain decimal number.
    pub fn numeric(&self) -> Option<String> {
        match self {
            CustomerRef::Number(id) => Some(id.to_string()),
            CustomerRef::Text(id) => numeric_customer_id(id),
        }
    }
}

/// Accepts only ids made of ASCII digits, trimmed of surrounding whitespace.
pub fn numeric_customer_id(raw: &str) -> Option<String> {
    let raw = raw.trim();
    raw.parse::<u64>()
        .ok()
        .filter(|_| raw.bytes().all(|b| b.is_ascii_digit()))
        .map(|id| id.to_string())
}

impl fmt::Display for CustomerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerRef::Number(id) => write!(f, "{}", id),
            CustomerRef::Text(id) => write!(f, "{}", id),
        }
    }
}

/// The document persisted for a shopper's in-progress design.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignSession {
    pub designs: Vec<Value>,
    pub ai_prompt: String,
    pub ai_images: Vec<Value>,
    pub selected_image: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncPreviewRequest {
    #[serde(default)]
    pub customer_id: Option<CustomerRef>,
    #[serde(default)]
    pub my_designs: Option<Value>,
    #[serde(default)]
    pub ai_prompt: Option<String>,
    #[serde(default)]
    pub ai_images: Option<Vec<Value>>,
    #[serde(default)]
    pub selected_image: Option<String>,
}

impl SyncPreviewRequest {
    /// Splits the request into the customer id and the session document.
    pub fn into_session(self) -> Result<(String, DesignSession)> {
        let customer_id = self.customer_id.as_ref().and_then(CustomerRef::numeric);

        let designs = match self.my_designs {
            None => Vec::new(),
            Some(Value::Array(designs)) => designs,
            Some(_) => return Err(invalid_request()),
        };

        let customer_id = customer_id.ok_or_else(invalid_request)?;

        Ok((
            customer_id,
            DesignSession {
                designs,
                ai_prompt: self.ai_prompt.unwrap_or_default(),
                ai_images: self.ai_images.unwrap_or_default(),
                selected_image: self.selected_image.unwrap_or_default(),
            },
        ))
    }
}

fn invalid_request() -> GatewayError {
    GatewayError::ValidationError("Missing customerId or invalid myDesigns".into())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Created,
    Updated,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub status: SyncStatus,
    pub metafield: Value,
}
