use reqwest::{Client, Method};
use serde::Serialize;
use serde_json::{json, Value};

use crate::{
    config::ShopifyConfig,
    error::{GatewayError, Result},
    models::commerce::{Metafield, MetafieldInput, MetafieldList, ProductDraft, TemplateVariants},
};

const PROVIDER: &str = "Shopify";

/// Which access token a call is made with.
#[derive(Debug, Clone, Copy)]
enum Scope {
    Products,
    Customers,
}

#[derive(Clone)]
pub struct ShopifyClient {
    client: Client,
    admin_url: String,
    product_token: String,
    customer_token: String,
    template_product_id: String,
}

impl ShopifyClient {
    pub fn new(config: ShopifyConfig) -> Result<Self> {
        let origin = config
            .origin()
            .ok_or_else(|| GatewayError::ConfigError("Shopify store domain is required".into()))?;

        let product_token = config.product_token.ok_or_else(|| {
            GatewayError::ConfigError("Shopify product access token is required".into())
        })?;

        let customer_token = config.customer_token.ok_or_else(|| {
            GatewayError::ConfigError("Shopify customer access token is required".into())
        })?;

        let template_product_id = config.template_product_id.ok_or_else(|| {
            GatewayError::ConfigError("Template product id is required".into())
        })?;

        Ok(Self {
            client: Client::new(),
            admin_url: format!(
                "{}/admin/api/{}",
                origin.trim_end_matches('/'),
                config.api_version
            ),
            product_token,
            customer_token,
            template_product_id,
        })
    }

    fn token(&self, scope: Scope) -> &str {
        match scope {
            Scope::Products => &self.product_token,
            Scope::Customers => &self.customer_token,
        }
    }

    async fn call<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        scope: Scope,
        body: Option<&B>,
    ) -> Result<Value> {
        let url = format!("{}/{}", self.admin_url, path);
        log::debug!("Shopify {} {}", method, path);

        let mut request = self
            .client
            .request(method, &url)
            .header("X-Shopify-Access-Token", self.token(scope));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let err = GatewayError::from_response(PROVIDER, response).await;
            log::error!("Shopify call {} failed: {}", path, err);
            return Err(err);
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| GatewayError::upstream(format!("Failed to parse Shopify response: {}", e)))
    }

    async fn get(&self, path: &str, scope: Scope) -> Result<Value> {
        self.call::<Value>(Method::GET, path, scope, None).await
    }

    /// Variants and options of the template product, plus the shop currency.
    pub async fn template_variants(&self) -> Result<TemplateVariants> {
        let product = self
            .get(
                &format!("products/{}.json", self.template_product_id),
                Scope::Products,
            )
            .await?;

        let variants = product["product"]["variants"].clone();
        let options = product["product"]["options"].clone();
        if variants.is_null() || options.is_null() {
            return Err(GatewayError::upstream_with_details(
                "Template product response is missing variants or options",
                product,
            ));
        }

        let shop = self.get("shop.json", Scope::Products).await?;
        let store_currency = shop["shop"]["currency"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| {
                GatewayError::upstream_with_details("Shop response has no currency", shop.clone())
            })?;

        Ok(TemplateVariants {
            variants,
            options,
            store_currency,
        })
    }

    /// Creates a product and returns the platform's response body untouched.
    pub async fn create_product(&self, draft: &ProductDraft) -> Result<Value> {
        let created = self
            .call(
                Method::POST,
                "products.json",
                Scope::Products,
                Some(&json!({ "product": draft })),
            )
            .await?;

        if let Some(id) = created["product"]["id"].as_u64() {
            log::info!("Created product {}", id);
        }
        Ok(created)
    }

    pub async fn customer_metafields(&self, customer_id: &str) -> Result<Vec<Metafield>> {
        let body = self
            .get(
                &format!("customers/{}/metafields.json", customer_id),
                Scope::Customers,
            )
            .await?;

        let list: MetafieldList = serde_json::from_value(body).map_err(|e| {
            GatewayError::upstream(format!("Failed to parse metafield list: {}", e))
        })?;
        Ok(list.metafields)
    }

    pub async fn create_customer_metafield(
        &self,
        customer_id: &str,
        metafield: &MetafieldInput,
    ) -> Result<Value> {
        self.call(
            Method::POST,
            &format!("customers/{}/metafields.json", customer_id),
            Scope::Customers,
            Some(&json!({ "metafield": metafield })),
        )
        .await
    }

    pub async fn update_metafield(&self, metafield_id: u64, metafield: &MetafieldInput) -> Result<Value> {
        self.call(
            Method::PUT,
            &format!("metafields/{}.json", metafield_id),
            Scope::Customers,
            Some(&json!({ "metafield": metafield })),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> ShopifyClient {
        ShopifyClient::new(
            ShopifyConfig::new()
                .with_base_url(server.uri())
                .with_tokens("product-token", "customer-token")
                .with_template_product("777"),
        )
        .unwrap()
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let err = ShopifyClient::new(
            ShopifyConfig::new()
                .with_store("shirts.myshopify.com")
                .with_template_product("1"),
        )
        .err()
        .unwrap();
        assert!(matches!(err, GatewayError::ConfigError(_)));
    }

    #[tokio::test]
    async fn template_variants_combines_product_and_shop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2025-04/products/777.json"))
            .and(header("X-Shopify-Access-Token", "product-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "product": {
                    "id": 777,
                    "variants": [{"id": 1, "option1": "S"}, {"id": 2, "option1": "M"}],
                    "options": [{"name": "Size", "values": ["S", "M"]}]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2025-04/shop.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"shop": {"currency": "GBP"}})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let template = client_for(&server).template_variants().await.unwrap();
        assert_eq!(template.store_currency, "GBP");
        assert_eq!(template.variants.as_array().unwrap().len(), 2);
        assert_eq!(template.options[0]["name"], json!("Size"));
    }

    #[tokio::test]
    async fn create_product_wraps_draft_and_returns_body() {
        let server = MockServer::start().await;
        let created = json!({"product": {"id": 9001, "title": "Wolf tee"}});
        Mock::given(method("POST"))
            .and(path("/admin/api/2025-04/products.json"))
            .and(body_json(json!({"product": {"title": "Wolf tee", "vendor": "Studio"}})))
            .respond_with(ResponseTemplate::new(201).set_body_json(created.clone()))
            .expect(1)
            .mount(&server)
            .await;

        let draft = ProductDraft {
            title: Some("Wolf tee".into()),
            vendor: Some("Studio".into()),
            ..Default::default()
        };
        assert_eq!(client_for(&server).create_product(&draft).await.unwrap(), created);
    }

    #[tokio::test]
    async fn platform_errors_are_forwarded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/admin/api/2025-04/products.json"))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "errors": {"title": ["can't be blank"]}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_product(&ProductDraft::default())
            .await
            .unwrap_err();
        assert_eq!(
            err.details(),
            Some(&json!({"errors": {"title": ["can't be blank"]}}))
        );
    }

    #[tokio::test]
    async fn metafields_use_the_customer_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/api/2025-04/customers/55/metafields.json"))
            .and(header("X-Shopify-Access-Token", "customer-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "metafields": [{
                    "id": 3, "namespace": "custom_preview", "key": "design_list",
                    "type": "json", "value": "{\"designs\":[]}"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let metafields = client_for(&server).customer_metafields("55").await.unwrap();
        assert_eq!(metafields.len(), 1);
        assert_eq!(metafields[0].id, 3);
        assert_eq!(metafields[0].kind.as_deref(), Some("json"));
    }
}
