use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::LeonardoConfig,
    error::{GatewayError, Result},
    generation::provider::ImageProvider,
    models::generation::{StatusResponse, SubmissionPayload, SubmissionResponse},
};

const PROVIDER: &str = "Leonardo";

#[derive(Clone)]
pub struct LeonardoClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LeonardoClient {
    pub fn new(config: LeonardoConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .ok_or_else(|| GatewayError::ConfigError("Leonardo API key is required".into()))?;

        Ok(Self {
            client: Client::new(),
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl ImageProvider for LeonardoClient {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionResponse> {
        let response = self
            .client
            .post(format!("{}/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::from_response(PROVIDER, response).await);
        }

        response.json::<SubmissionResponse>().await.map_err(|e| {
            GatewayError::upstream(format!("Failed to parse generation response: {}", e))
        })
    }

    async fn status(&self, job_id: &str) -> Result<Vec<String>> {
        let response = self
            .client
            .get(format!("{}/generations/{}", self.base_url, job_id))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::from_response(PROVIDER, response).await);
        }

        let status: StatusResponse = response.json().await.map_err(|e| {
            GatewayError::upstream(format!("Failed to parse generation status: {}", e))
        })?;

        Ok(status.image_urls())
    }
}
