use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Template product structure plus the shop currency, as served to the
/// storefront's design editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateVariants {
    pub variants: Value,
    pub options: Value,
    #[serde(rename = "storeCurrency")]
    pub store_currency: String,
}

/// Product creation payload. Absent fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metafield {
    pub id: u64,
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetafieldList {
    #[serde(default)]
    pub metafields: Vec<Metafield>,
}

/// Body of a metafield create or update call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetafieldInput {
    pub namespace: String,
    pub key: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub value: String,
}
