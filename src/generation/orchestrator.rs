use crate::{
    error::{GatewayError, Result},
    generation::{
        profile::{GenerationProfile, PollPolicy, TransparencyDirective, FOREGROUND_ONLY},
        provider::ImageProvider,
    },
    logger,
    models::generation::{
        GenerationOutcome, GenerationRequest, GenerationResult, SubmissionPayload,
        DEFAULT_IMAGE_COUNT,
    },
};

/// Submits a generation job and polls it until images show up or the poll
/// budget is spent. Holds no per-request state, so one instance serves any
/// number of concurrent calls.
pub struct GenerationOrchestrator<P> {
    provider: P,
    profile: GenerationProfile,
    poll: PollPolicy,
}

impl<P: ImageProvider> GenerationOrchestrator<P> {
    pub fn new(provider: P, profile: GenerationProfile) -> Self {
        Self {
            provider,
            profile,
            poll: PollPolicy::default(),
        }
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn profile(&self) -> &GenerationProfile {
        &self.profile
    }

    pub fn poll_policy(&self) -> PollPolicy {
        self.poll
    }

    pub fn build_payload(
        &self,
        prompt: &str,
        image_count: u32,
        transparency_requested: bool,
    ) -> SubmissionPayload {
        let mut payload = SubmissionPayload {
            prompt: prompt.to_string(),
            width: self.profile.width,
            height: self.profile.height,
            num_images: image_count,
            guidance_scale: self.profile.guidance_scale,
            num_inference_steps: self.profile.inference_steps,
            model_id: self.profile.model_id.clone(),
            transparency: None,
            prompt_magic: None,
        };

        if transparency_requested {
            match self.profile.transparency {
                TransparencyDirective::ForegroundOnly => {
                    payload.transparency = Some(FOREGROUND_ONLY.to_string())
                }
                TransparencyDirective::PromptMagic => payload.prompt_magic = Some(true),
            }
        }

        payload
    }

    pub async fn generate_images(&self, request: GenerationRequest) -> Result<GenerationOutcome> {
        let prompt = request
            .prompt
            .as_deref()
            .filter(|prompt| !prompt.trim().is_empty())
            .ok_or_else(|| GatewayError::ValidationError("Prompt is required.".into()))?;

        let image_count = request.image_count.unwrap_or(DEFAULT_IMAGE_COUNT);
        if image_count == 0 {
            return Err(GatewayError::ValidationError(
                "numImages must be a positive integer".into(),
            ));
        }

        let payload = self.build_payload(
            prompt,
            image_count,
            request.transparency_requested.unwrap_or(false),
        );

        let _timer = logger::timer("image generation");
        log::info!(
            "Submitting generation: {} image(s) at {}x{}",
            payload.num_images,
            payload.width,
            payload.height
        );

        let submission = self.provider.submit(&payload).await.map_err(|e| {
            log::error!("Generation submission failed: {}", e);
            e
        })?;

        let job_id = match submission.job_id() {
            Some(id) => id.to_string(),
            None => {
                log::error!("Provider accepted the submission but returned no generation id");
                return Err(GatewayError::upstream("no job id"));
            }
        };
        log::info!("Generation job {} submitted", job_id);

        for attempt in 1..=self.poll.attempts {
            tokio::time::sleep(self.poll.interval).await;

            let image_urls = self.provider.status(&job_id).await.map_err(|e| {
                log::error!("Polling job {} failed on attempt {}: {}", job_id, attempt, e);
                e
            })?;

            if !image_urls.is_empty() {
                log::info!(
                    "Job {} finished with {} image(s) after {} poll(s)",
                    job_id,
                    image_urls.len(),
                    attempt
                );
                return Ok(GenerationOutcome::Completed(GenerationResult { image_urls }));
            }

            log::debug!(
                "Job {} not ready (attempt {}/{})",
                job_id,
                attempt,
                self.poll.attempts
            );
        }

        log::warn!(
            "Job {} still running after {} polls, reporting in progress",
            job_id,
            self.poll.attempts
        );
        Ok(GenerationOutcome::InProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LeonardoConfig;
    use crate::generation::leonardo::LeonardoClient;
    use crate::generation::profile::POLL_INTERVAL;
    use crate::models::generation::SubmissionResponse;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    /// Provider that reports images from a fixed attempt onwards.
    struct ScriptedProvider {
        job_id: Option<&'static str>,
        ready_on: Option<usize>,
        fail_on: Option<usize>,
        images: Vec<String>,
        submissions: Mutex<Vec<SubmissionPayload>>,
        submitted_at: Mutex<Option<Instant>>,
        polls: Mutex<Vec<Duration>>,
    }

    impl ScriptedProvider {
        fn new(ready_on: Option<usize>) -> Self {
            Self {
                job_id: Some("job-1"),
                ready_on,
                fail_on: None,
                images: vec!["https://cdn/1.png".into(), "https://cdn/2.png".into()],
                submissions: Mutex::new(Vec::new()),
                submitted_at: Mutex::new(None),
                polls: Mutex::new(Vec::new()),
            }
        }

        fn poll_times(&self) -> Vec<Duration> {
            self.polls.lock().unwrap().clone()
        }

        fn submission_count(&self) -> usize {
            self.submissions.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ImageProvider for ScriptedProvider {
        async fn submit(&self, payload: &SubmissionPayload) -> Result<SubmissionResponse> {
            self.submissions.lock().unwrap().push(payload.clone());
            *self.submitted_at.lock().unwrap() = Some(Instant::now());

            let body = match self.job_id {
                Some(id) => json!({"sdGenerationJob": {"generationId": id}}),
                None => json!({"sdGenerationJob": {}}),
            };
            Ok(serde_json::from_value(body).unwrap())
        }

        async fn status(&self, job_id: &str) -> Result<Vec<String>> {
            assert_eq!(Some(job_id), self.job_id);
            let started = self.submitted_at.lock().unwrap().unwrap();
            let attempt = {
                let mut polls = self.polls.lock().unwrap();
                polls.push(started.elapsed());
                polls.len()
            };

            if self.fail_on == Some(attempt) {
                return Err(GatewayError::upstream_with_details(
                    "Leonardo returned 503 Service Unavailable",
                    json!({"error": "overloaded"}),
                ));
            }

            match self.ready_on {
                Some(ready) if attempt >= ready => Ok(self.images.clone()),
                _ => Ok(Vec::new()),
            }
        }
    }

    fn orchestrator(provider: ScriptedProvider) -> GenerationOrchestrator<ScriptedProvider> {
        GenerationOrchestrator::new(provider, GenerationProfile::albedo_xl())
    }

    #[tokio::test(start_paused = true)]
    async fn missing_prompt_never_reaches_the_provider() {
        let orchestrator = orchestrator(ScriptedProvider::new(Some(1)));

        for request in [
            GenerationRequest::default(),
            GenerationRequest::new(""),
            GenerationRequest::new("   "),
        ] {
            let err = orchestrator.generate_images(request).await.unwrap_err();
            assert!(matches!(err, GatewayError::ValidationError(_)));
        }

        assert_eq!(orchestrator.provider.submission_count(), 0);
        assert!(orchestrator.provider.poll_times().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_images_is_a_validation_error() {
        let orchestrator = orchestrator(ScriptedProvider::new(Some(1)));
        let err = orchestrator
            .generate_images(GenerationRequest::new("mug").with_image_count(0))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::ValidationError(_)));
        assert_eq!(orchestrator.provider.submission_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stops_polling_on_the_first_ready_attempt() {
        for ready_on in [1usize, 4, 10] {
            let orchestrator = orchestrator(ScriptedProvider::new(Some(ready_on)));
            let outcome = orchestrator
                .generate_images(GenerationRequest::new("a wolf howling"))
                .await
                .unwrap();

            assert_eq!(
                outcome,
                GenerationOutcome::Completed(GenerationResult {
                    image_urls: vec!["https://cdn/1.png".into(), "https://cdn/2.png".into()]
                })
            );
            assert_eq!(orchestrator.provider.submission_count(), 1);

            let polls = orchestrator.provider.poll_times();
            assert_eq!(polls.len(), ready_on);
            for (index, elapsed) in polls.iter().enumerate() {
                assert_eq!(*elapsed, POLL_INTERVAL * (index as u32 + 1));
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn first_check_waits_for_the_interval() {
        let orchestrator = orchestrator(ScriptedProvider::new(Some(1)));
        orchestrator
            .generate_images(GenerationRequest::new("cat"))
            .await
            .unwrap();

        assert_eq!(orchestrator.provider.poll_times(), vec![Duration::from_secs(2)]);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_budget_reports_in_progress() {
        let orchestrator = orchestrator(ScriptedProvider::new(None));
        let started = Instant::now();

        let outcome = orchestrator
            .generate_images(GenerationRequest::new("cat"))
            .await
            .unwrap();

        assert_eq!(outcome, GenerationOutcome::InProgress);
        assert_eq!(orchestrator.provider.poll_times().len(), 10);
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_job_id_skips_polling() {
        let mut provider = ScriptedProvider::new(Some(1));
        provider.job_id = None;
        let orchestrator = orchestrator(provider);

        let err = orchestrator
            .generate_images(GenerationRequest::new("cat"))
            .await
            .unwrap_err();

        assert!(matches!(err, GatewayError::UpstreamError { ref message, .. } if message == "no job id"));
        assert!(orchestrator.provider.poll_times().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn poll_failure_aborts_without_resubmitting() {
        let mut provider = ScriptedProvider::new(Some(5));
        provider.fail_on = Some(2);
        let orchestrator = orchestrator(provider);

        let err = orchestrator
            .generate_images(GenerationRequest::new("cat"))
            .await
            .unwrap_err();

        assert_eq!(err.details(), Some(&json!({"error": "overloaded"})));
        assert_eq!(orchestrator.provider.poll_times().len(), 2);
        assert_eq!(orchestrator.provider.submission_count(), 1);
    }

    #[test]
    fn transparency_directive_only_when_requested() {
        let orchestrator = orchestrator(ScriptedProvider::new(None));

        let plain = serde_json::to_value(orchestrator.build_payload("mug", 8, false)).unwrap();
        assert!(plain.get("transparency").is_none());
        assert!(plain.get("promptMagic").is_none());

        let transparent = serde_json::to_value(orchestrator.build_payload("mug", 8, true)).unwrap();
        assert_eq!(transparent["transparency"], json!("foreground_only"));
    }

    #[test]
    fn payload_carries_profile_constants() {
        let orchestrator = orchestrator(ScriptedProvider::new(None));
        let payload = serde_json::to_value(orchestrator.build_payload("mug", 3, false)).unwrap();

        assert_eq!(
            payload,
            json!({
                "prompt": "mug",
                "width": 1024,
                "height": 1024,
                "num_images": 3,
                "guidance_scale": 7,
                "num_inference_steps": 20,
                "modelId": "2067ae52-33fd-4a82-bb92-c2c55e7d2786"
            })
        );
    }

    #[test]
    fn prompt_magic_profile_uses_its_own_directive() {
        let orchestrator = GenerationOrchestrator::new(
            ScriptedProvider::new(None),
            GenerationProfile::prompt_magic(),
        );

        let payload = serde_json::to_value(orchestrator.build_payload("mug", 8, true)).unwrap();
        assert_eq!(payload["promptMagic"], json!(true));
        assert_eq!(payload["width"], json!(512));
        assert!(payload.get("transparency").is_none());
        assert!(payload.get("modelId").is_none());

        let plain = serde_json::to_value(orchestrator.build_payload("mug", 8, false)).unwrap();
        assert!(plain.get("promptMagic").is_none());
    }

    #[test]
    fn defaults_to_ten_polls_two_seconds_apart() {
        let orchestrator = orchestrator(ScriptedProvider::new(None));
        assert_eq!(orchestrator.profile(), &GenerationProfile::albedo_xl());
        assert_eq!(orchestrator.poll_policy(), PollPolicy::new(10, POLL_INTERVAL));

        let fast = orchestrator.with_poll_policy(PollPolicy::new(3, Duration::from_millis(5)));
        assert_eq!(fast.poll_policy().attempts, 3);
        assert_eq!(fast.poll_policy().interval, Duration::from_millis(5));
    }

    #[tokio::test(start_paused = true)]
    async fn default_image_count_is_eight() {
        let orchestrator = orchestrator(ScriptedProvider::new(Some(1)));
        orchestrator
            .generate_images(GenerationRequest::new("cat"))
            .await
            .unwrap();

        let submissions = orchestrator.provider.submissions.lock().unwrap();
        assert_eq!(submissions[0].num_images, 8);
    }

    #[tokio::test]
    async fn red_mug_scenario_against_http_provider() {
        use wiremock::matchers::{method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "sdGenerationJob": {"generationId": "mug-job"}
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/generations/mug-job"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "generations_by_pk": {"generated_images": []}
            })))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/generations/mug-job"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "generations_by_pk": {"generated_images": [
                    {"url": "https://cdn/mug-1.png"},
                    {"url": "https://cdn/mug-2.png"}
                ]}
            })))
            .mount(&server)
            .await;

        let client = LeonardoClient::new(
            LeonardoConfig::new()
                .with_api_key("leo-test-key")
                .with_base_url(server.uri()),
        )
        .unwrap();
        let orchestrator = GenerationOrchestrator::new(client, GenerationProfile::albedo_xl())
            .with_poll_policy(PollPolicy::new(10, Duration::from_millis(10)));

        let outcome = orchestrator
            .generate_images(
                GenerationRequest::new("a red mug")
                    .with_image_count(2)
                    .with_transparency(false),
            )
            .await
            .unwrap();

        assert_eq!(
            outcome,
            GenerationOutcome::Completed(GenerationResult {
                image_urls: vec!["https://cdn/mug-1.png".into(), "https://cdn/mug-2.png".into()]
            })
        );

        let requests = server.received_requests().await.unwrap();
        let submission: serde_json::Value = requests
            .iter()
            .find(|request| request.method.as_str() == "POST")
            .map(|request| serde_json::from_slice(&request.body).unwrap())
            .unwrap();
        assert_eq!(submission["num_images"], json!(2));
        assert!(submission.get("transparency").is_none());

        let polls = requests
            .iter()
            .filter(|request| request.method.as_str() == "GET")
            .count();
        assert_eq!(polls, 3);
    }
}
