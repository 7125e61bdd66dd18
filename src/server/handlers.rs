use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use futures::StreamExt;
use serde_json::json;

use crate::{
    error::{GatewayError, Result},
    models::{
        commerce::ProductDraft,
        generation::{GenerationOutcome, GenerationRequest},
        session::{numeric_customer_id, SyncPreviewRequest},
        upload::UploadedFile,
    },
    server::{response, AppState},
};

const FILE_FIELD: &str = "file";

fn malformed_upload(err: impl std::fmt::Display) -> GatewayError {
    GatewayError::ValidationError(format!("Malformed multipart body: {}", err))
}

/// Reads the `file` part of a multipart body. Other parts are skipped.
async fn read_file_part(mut payload: Multipart) -> Result<Option<UploadedFile>> {
    let mut file = None;

    while let Some(field) = payload.next().await {
        let mut field = field.map_err(malformed_upload)?;

        let disposition = field.content_disposition();
        let is_file = disposition.and_then(|cd| cd.get_name()) == Some(FILE_FIELD);
        let file_name = disposition
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        let content_type = field
            .content_type()
            .map(|mime| mime.to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let mut content = Vec::new();
        while let Some(chunk) = field.next().await {
            content.extend_from_slice(&chunk.map_err(malformed_upload)?);
        }

        if is_file && file.is_none() {
            file = Some(UploadedFile {
                file_name,
                content_type,
                content,
            });
        }
    }

    Ok(file)
}

pub async fn upload(state: web::Data<AppState>, payload: Multipart) -> Result<HttpResponse> {
    let file = read_file_part(payload)
        .await?
        .ok_or_else(|| GatewayError::ValidationError("A file field is required.".into()))?;

    let receipt = state.uploads.upload(file).await?;
    Ok(HttpResponse::Ok().json(receipt))
}

pub async fn generate_image(
    state: web::Data<AppState>,
    request: web::Json<GenerationRequest>,
) -> Result<HttpResponse> {
    match state.generator.generate_images(request.into_inner()).await? {
        GenerationOutcome::Completed(result) => Ok(HttpResponse::Ok().json(result)),
        GenerationOutcome::InProgress => Ok(response::in_progress()),
    }
}

pub async fn template_product_variants(state: web::Data<AppState>) -> Result<HttpResponse> {
    let template = state.commerce.template_variants().await?;
    Ok(HttpResponse::Ok().json(template))
}

pub async fn create_product(
    state: web::Data<AppState>,
    draft: web::Json<ProductDraft>,
) -> Result<HttpResponse> {
    let created = state.commerce.create_product(&draft).await?;
    Ok(HttpResponse::Ok().json(created))
}

pub async fn sync_preview(
    state: web::Data<AppState>,
    request: web::Json<SyncPreviewRequest>,
) -> Result<HttpResponse> {
    let (customer_id, session) = request.into_inner().into_session()?;
    log::debug!(
        "Syncing design session for customer {} ({} design(s))",
        customer_id,
        session.designs.len()
    );

    let document = serde_json::to_value(&session)?;
    let outcome = state.sessions.sync(&customer_id, &document).await?;
    Ok(HttpResponse::Ok().json(outcome))
}

pub async fn fetch_preview(
    state: web::Data<AppState>,
    customer_id: web::Path<String>,
) -> Result<HttpResponse> {
    let raw = customer_id.into_inner();
    if raw.trim().is_empty() {
        return Ok(HttpResponse::Ok().json(json!({})));
    }
    let customer_id = numeric_customer_id(&raw).ok_or_else(|| {
        GatewayError::ValidationError(format!("Invalid customer id: {}", raw))
    })?;

    let document = state.sessions.fetch(&customer_id).await?;
    Ok(HttpResponse::Ok().json(document))
}
