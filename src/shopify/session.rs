use serde_json::{json, Value};

use crate::{
    error::Result,
    models::commerce::{Metafield, MetafieldInput},
    models::session::{SyncOutcome, SyncStatus},
    shopify::client::ShopifyClient,
};

pub const DESIGN_NAMESPACE: &str = "custom_preview";
pub const DESIGN_KEY: &str = "design_list";

/// Per-customer design-session documents, kept in a customer metafield.
#[derive(Clone)]
pub struct DesignSessionStore {
    client: ShopifyClient,
}

impl DesignSessionStore {
    pub fn new(client: ShopifyClient) -> Self {
        Self { client }
    }

    async fn find(&self, customer_id: &str) -> Result<Option<Metafield>> {
        let metafields = self.client.customer_metafields(customer_id).await?;
        Ok(metafields
            .into_iter()
            .find(|mf| mf.namespace == DESIGN_NAMESPACE && mf.key == DESIGN_KEY))
    }

    /// The stored document, or `{}` when nothing usable is stored.
    pub async fn fetch(&self, customer_id: &str) -> Result<Value> {
        let metafield = self.find(customer_id).await?;
        Ok(metafield.map(decode_document).unwrap_or_else(empty_document))
    }

    /// Updates the customer's design metafield, creating it on first sync.
    pub async fn sync(&self, customer_id: &str, document: &Value) -> Result<SyncOutcome> {
        let input = MetafieldInput {
            namespace: DESIGN_NAMESPACE.to_string(),
            key: DESIGN_KEY.to_string(),
            kind: "json".to_string(),
            value: serde_json::to_string(document)?,
        };

        match self.find(customer_id).await? {
            Some(existing) => {
                let metafield = self.client.update_metafield(existing.id, &input).await?;
                log::info!("Updated design session for customer {}", customer_id);
                Ok(SyncOutcome {
                    status: SyncStatus::Updated,
                    metafield,
                })
            }
            None => {
                let metafield = self
                    .client
                    .create_customer_metafield(customer_id, &input)
                    .await?;
                log::info!("Created design session for customer {}", customer_id);
                Ok(SyncOutcome {
                    status: SyncStatus::Created,
                    metafield,
                })
            }
        }
    }
}

fn empty_document() -> Value {
    json!({})
}

/// `json` metafields hold an encoded document; undecodable ones read as `{}`.
pub fn decode_document(metafield: Metafield) -> Value {
    let value = if metafield.kind.as_deref() == Some("json") {
        match metafield.value {
            Value::String(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                log::warn!("Design metafield {} holds malformed JSON: {}", metafield.id, e);
                empty_document()
            }),
            other => other,
        }
    } else {
        metafield.value
    };

    match value {
        Value::Null => empty_document(),
        Value::String(ref s) if s.is_empty() => empty_document(),
        other => other,
    }
}
