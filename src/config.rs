use std::env;

use crate::error::{GatewayError, Result};
use crate::generation::ProfileKind;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_LEONARDO_URL: &str = "https://cloud.leonardo.ai/api/rest/v1";
pub const DEFAULT_SHOPIFY_API_VERSION: &str = "2025-04";
pub const DEFAULT_BUCKET: &str = "t-shirt-website";
pub const DEFAULT_KEY_PREFIX: &str = "uploads";

#[derive(Debug, Clone)]
pub struct LeonardoConfig {
    pub api_key: Option<String>,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct ShopifyConfig {
    /// Store domain, e.g. `my-shop.myshopify.com`.
    pub store: Option<String>,
    /// Token used for product and shop reads/writes.
    pub product_token: Option<String>,
    /// Token used for customer metafields.
    pub customer_token: Option<String>,
    pub template_product_id: Option<String>,
    pub api_version: String,
    /// Overrides `https://{store}` as the API origin.
    pub base_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket: String,
    pub region: Option<String>,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub endpoint: Option<String>,
    pub key_prefix: String,
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub port: u16,
    pub generation_profile: ProfileKind,
    pub leonardo: LeonardoConfig,
    pub shopify: ShopifyConfig,
    pub storage: StorageConfig,
}

impl Default for LeonardoConfig {
    fn default() -> Self {
        LeonardoConfig {
            api_key: None,
            base_url: DEFAULT_LEONARDO_URL.to_string(),
        }
    }
}

impl LeonardoConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        let api_key = env::var("LEONARDO_API_KEY").ok();
        let base_url =
            env::var("LEONARDO_BASE_URL").unwrap_or_else(|_| DEFAULT_LEONARDO_URL.to_string());

        LeonardoConfig { api_key, base_url }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

impl Default for ShopifyConfig {
    fn default() -> Self {
        ShopifyConfig {
            store: None,
            product_token: None,
            customer_token: None,
            template_product_id: None,
            api_version: DEFAULT_SHOPIFY_API_VERSION.to_string(),
            base_url: None,
        }
    }
}

impl ShopifyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        ShopifyConfig {
            store: env::var("SHOPIFY_STORE").ok(),
            product_token: env::var("ACCESS_TOKEN_1").ok(),
            customer_token: env::var("ACCESS_TOKEN_2").ok(),
            template_product_id: env::var("TEMPLATE_PRODUCT_ID").ok(),
            api_version: env::var("SHOPIFY_API_VERSION")
                .unwrap_or_else(|_| DEFAULT_SHOPIFY_API_VERSION.to_string()),
            base_url: None,
        }
    }

    pub fn with_store(mut self, store: impl Into<String>) -> Self {
        self.store = Some(store.into());
        self
    }

    pub fn with_tokens(
        mut self,
        product_token: impl Into<String>,
        customer_token: impl Into<String>,
    ) -> Self {
        self.product_token = Some(product_token.into());
        self.customer_token = Some(customer_token.into());
        self
    }

    pub fn with_template_product(mut self, product_id: impl Into<String>) -> Self {
        self.template_product_id = Some(product_id.into());
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Origin of the Admin API: the explicit override, else `https://{store}`.
    pub fn origin(&self) -> Option<String> {
        self.base_url
            .clone()
            .or_else(|| self.store.as_ref().map(|store| format!("https://{}", store)))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            bucket: DEFAULT_BUCKET.to_string(),
            region: None,
            access_key: None,
            secret_key: None,
            endpoint: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

impl StorageConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Self {
        StorageConfig {
            bucket: env::var("S3_BUCKET").unwrap_or_else(|_| DEFAULT_BUCKET.to_string()),
            region: env::var("AWS_REGION").ok(),
            access_key: env::var("AWS_ACCESS_KEY_ID").ok(),
            secret_key: env::var("AWS_SECRET_ACCESS_KEY").ok(),
            endpoint: env::var("S3_ENDPOINT").ok(),
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn with_bucket(mut self, bucket: impl Into<String>) -> Self {
        self.bucket = bucket.into();
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        GatewayConfig {
            port: DEFAULT_PORT,
            generation_profile: ProfileKind::default(),
            leonardo: LeonardoConfig::default(),
            shopify: ShopifyConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_env() -> Result<Self> {
        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse()
                .map_err(|_| GatewayError::ConfigError(format!("PORT is not a number: {}", raw)))?,
            Err(_) => DEFAULT_PORT,
        };

        let generation_profile = match env::var("GENERATION_PROFILE") {
            Ok(raw) => raw.parse()?,
            Err(_) => ProfileKind::default(),
        };

        Ok(GatewayConfig {
            port,
            generation_profile,
            leonardo: LeonardoConfig::from_env(),
            shopify: ShopifyConfig::from_env(),
            storage: StorageConfig::from_env(),
        })
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_profile(mut self, profile: ProfileKind) -> Self {
        self.generation_profile = profile;
        self
    }

    pub fn with_leonardo(mut self, config: LeonardoConfig) -> Self {
        self.leonardo = config;
        self
    }

    pub fn with_shopify(mut self, config: ShopifyConfig) -> Self {
        self.shopify = config;
        self
    }

    pub fn with_storage(mut self, config: StorageConfig) -> Self {
        self.storage = config;
        self
    }

    /// Reports the first missing required setting.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("LEONARDO_API_KEY", self.leonardo.api_key.is_some()),
            (
                "SHOPIFY_STORE",
                self.shopify.store.is_some() || self.shopify.base_url.is_some(),
            ),
            ("ACCESS_TOKEN_1", self.shopify.product_token.is_some()),
            ("ACCESS_TOKEN_2", self.shopify.customer_token.is_some()),
            (
                "TEMPLATE_PRODUCT_ID",
                self.shopify.template_product_id.is_some(),
            ),
        ];

        match required.iter().find(|(_, present)| !present) {
            Some((name, _)) => Err(GatewayError::ConfigError(format!("{} is not set", name))),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> GatewayConfig {
        GatewayConfig::new()
            .with_leonardo(LeonardoConfig::new().with_api_key("leo-key"))
            .with_shopify(
                ShopifyConfig::new()
                    .with_store("shirts.myshopify.com")
                    .with_tokens("product-token", "customer-token")
                    .with_template_product("42"),
            )
    }

    #[test]
    fn defaults_match_the_storefront_deployment() {
        let config = GatewayConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.storage.bucket, "t-shirt-website");
        assert_eq!(config.storage.key_prefix, "uploads");
        assert_eq!(config.shopify.api_version, "2025-04");
        assert_eq!(config.leonardo.base_url, DEFAULT_LEONARDO_URL);
        assert_eq!(config.generation_profile, ProfileKind::AlbedoXl);
    }

    #[test]
    fn validate_accepts_complete_config() {
        assert!(complete().validate().is_ok());
    }

    #[test]
    fn validate_names_the_missing_setting() {
        let mut config = complete();
        config.shopify.customer_token = None;

        let err = config.validate().unwrap_err();
        assert!(matches!(err, GatewayError::ConfigError(ref msg) if msg.contains("ACCESS_TOKEN_2")));
    }

    #[test]
    fn origin_prefers_explicit_base_url() {
        let shopify = ShopifyConfig::new().with_store("shirts.myshopify.com");
        assert_eq!(
            shopify.origin().as_deref(),
            Some("https://shirts.myshopify.com")
        );

        let shopify = shopify.with_base_url("http://127.0.0.1:9000");
        assert_eq!(shopify.origin().as_deref(), Some("http://127.0.0.1:9000"));
    }
}
