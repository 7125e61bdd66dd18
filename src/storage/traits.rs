use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Stores `body` under `key` and returns its public location.
    async fn put(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String>;

    /// Public location an object stored under `key` is served from.
    fn location(&self, key: &str) -> String;
}
