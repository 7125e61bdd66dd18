use std::sync::Arc;

use async_trait::async_trait;

use crate::{
    error::Result,
    models::generation::{SubmissionPayload, SubmissionResponse},
};

/// Remote image-generation service: one submission call and a status call per job.
#[async_trait]
pub trait ImageProvider: Send + Sync {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionResponse>;

    /// Image locators reported for the job so far; empty while it is still running.
    async fn status(&self, job_id: &str) -> Result<Vec<String>>;
}

#[async_trait]
impl<P: ImageProvider + ?Sized> ImageProvider for Arc<P> {
    async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionResponse> {
        (**self).submit(payload).await
    }

    async fn status(&self, job_id: &str) -> Result<Vec<String>> {
        (**self).status(job_id).await
    }
}
