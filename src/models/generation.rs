use serde::{Deserialize, Serialize};

pub const DEFAULT_IMAGE_COUNT: u32 = 8;

/// Caller-facing generation request, as posted to `/generate-image`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default, rename = "numImages")]
    pub image_count: Option<u32>,
    #[serde(default, rename = "transparency")]
    pub transparency_requested: Option<bool>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
            ..Default::default()
        }
    }

    pub fn with_image_count(mut self, count: u32) -> Self {
        self.image_count = Some(count);
        self
    }

    pub fn with_transparency(mut self, requested: bool) -> Self {
        self.transparency_requested = Some(requested);
        self
    }
}

/// Body sent to the provider's submission endpoint.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SubmissionPayload {
    pub prompt: String,
    pub width: u32,
    pub height: u32,
    pub num_images: u32,
    pub guidance_scale: u32,
    pub num_inference_steps: u32,
    #[serde(rename = "modelId", skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transparency: Option<String>,
    #[serde(rename = "promptMagic", skip_serializing_if = "Option::is_none")]
    pub prompt_magic: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    #[serde(default)]
    pub sd_generation_job: Option<SdGenerationJob>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SdGenerationJob {
    #[serde(default)]
    pub generation_id: Option<String>,
}

impl SubmissionResponse {
    pub fn job_id(&self) -> Option<&str> {
        self.sd_generation_job
            .as_ref()
            .and_then(|job| job.generation_id.as_deref())
            .filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusResponse {
    #[serde(default)]
    pub generations_by_pk: Option<GenerationStatus>,
}

/// Pending jobs may report `generated_images` as `null` or omit it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationStatus {
    #[serde(default)]
    pub generated_images: Option<Vec<GeneratedImage>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedImage {
    #[serde(default)]
    pub url: Option<String>,
}

impl StatusResponse {
    pub fn image_urls(self) -> Vec<String> {
        self.generations_by_pk
            .and_then(|status| status.generated_images)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|image| image.url)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    #[serde(rename = "imageUrls")]
    pub image_urls: Vec<String>,
}

/// Either the finished images or a signal that the poll budget ran out.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed(GenerationResult),
    InProgress,
}
