pub mod handlers;
pub mod response;

use std::sync::Arc;

use actix_web::{middleware, web, App, HttpServer};

use crate::{
    config::GatewayConfig,
    error::{GatewayError, Result},
    generation::{GenerationOrchestrator, ImageProvider, LeonardoClient},
    shopify::{DesignSessionStore, ShopifyClient},
    storage::UploadManager,
};

/// Shared, read-only clients handed to every request.
pub struct AppState {
    pub generator: GenerationOrchestrator<Arc<dyn ImageProvider>>,
    pub commerce: ShopifyClient,
    pub sessions: DesignSessionStore,
    pub uploads: UploadManager,
}

impl AppState {
    pub fn new(
        generator: GenerationOrchestrator<Arc<dyn ImageProvider>>,
        commerce: ShopifyClient,
        uploads: UploadManager,
    ) -> Self {
        Self {
            generator,
            sessions: DesignSessionStore::new(commerce.clone()),
            commerce,
            uploads,
        }
    }

    pub async fn from_config(config: &GatewayConfig) -> Result<Self> {
        config.validate()?;

        let provider: Arc<dyn ImageProvider> =
            Arc::new(LeonardoClient::new(config.leonardo.clone())?);
        let generator =
            GenerationOrchestrator::new(provider, config.generation_profile.profile());
        let commerce = ShopifyClient::new(config.shopify.clone())?;
        let uploads = UploadManager::new(config.storage.clone()).await?;

        Ok(Self::new(generator, commerce, uploads))
    }
}

/// Registers every endpoint plus a JSON error handler for malformed bodies.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        GatewayError::ValidationError(err.to_string()).into()
    }))
    .route("/upload", web::post().to(handlers::upload))
    .route("/generate-image", web::post().to(handlers::generate_image))
    .route(
        "/template-product-variants",
        web::get().to(handlers::template_product_variants),
    )
    .route("/create-product", web::post().to(handlers::create_product))
    .route("/sync-preview", web::post().to(handlers::sync_preview))
    .route(
        "/fetch-preview/{customer_id}",
        web::get().to(handlers::fetch_preview),
    );
}

pub async fn run(config: GatewayConfig) -> Result<()> {
    let port = config.port;
    let state = web::Data::new(AppState::from_config(&config).await?);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(configure)
    })
    .bind(("0.0.0.0", port))
    .map_err(|e| GatewayError::ConfigError(format!("Cannot bind port {}: {}", port, e)))?
    .run()
    .await
    .map_err(|e| GatewayError::InternalError(format!("Server stopped: {}", e)))
}
