pub mod config;
pub mod error;
pub mod generation;
pub mod logger;
pub mod models;
#[cfg(feature = "server")]
pub mod server;
pub mod shopify;
pub mod storage;

pub use config::{GatewayConfig, LeonardoConfig, ShopifyConfig, StorageConfig};
pub use error::{GatewayError, Result};
pub use generation::{
    GenerationOrchestrator, GenerationProfile, ImageProvider, LeonardoClient, PollPolicy,
    ProfileKind,
};
pub use models::*;
pub use shopify::{DesignSessionStore, ShopifyClient};
pub use storage::{MemoryObjectStore, ObjectStore, S3ObjectStore, UploadManager};
