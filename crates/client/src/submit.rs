//! Job submission with cheap local preconditions.
//!
//! [`JobSubmitter::submit`] validates the prompt and model key against
//! the registry before touching the network, so a bad form never
//! wastes a round-trip or quota. An HTTP-level rejection from the
//! generate endpoints is an admission decision and is reported as
//! [`CoreError::Admission`] with the server's message verbatim. It is
//! never retried automatically; the caller decides whether to re-offer
//! submission once the limit monitor shows free capacity.

use std::sync::Arc;

use pixora_core::error::{CoreError, CoreResult};
use pixora_core::job::{Job, JobKind};
use pixora_core::models;

use crate::api::ApiClient;

/// Issues generation requests on behalf of the session.
pub struct JobSubmitter {
    api: Arc<ApiClient>,
}

impl JobSubmitter {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    /// Submit a generation request.
    ///
    /// `extra_params` must be a JSON object (or `Null`); its fields are
    /// merged into the request body alongside `prompt` and
    /// `model_key`. Image-conditioned kinds require an `image_url`
    /// entry there.
    ///
    /// On success the returned [`Job`] carries the server-issued id
    /// and is normally in `pending` status, ready to hand to a poller.
    pub async fn submit(
        &self,
        kind: JobKind,
        prompt: &str,
        model_key: &str,
        extra_params: serde_json::Value,
    ) -> CoreResult<Job> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(CoreError::Validation("prompt must not be empty".into()));
        }

        let model = models::model_for(kind, model_key).ok_or_else(|| {
            CoreError::Validation(format!("unknown model '{model_key}' for kind {kind}"))
        })?;

        let mut body = serde_json::Map::new();
        body.insert("prompt".into(), prompt.into());
        body.insert("model_key".into(), model_key.into());
        match extra_params {
            serde_json::Value::Null => {}
            serde_json::Value::Object(extra) => body.extend(extra),
            _ => {
                return Err(CoreError::Validation(
                    "extra_params must be a JSON object".into(),
                ));
            }
        }

        if kind.requires_source_image() && !body.contains_key("image_url") {
            return Err(CoreError::Validation(format!(
                "{kind} requires an image_url parameter"
            )));
        }
        let body = serde_json::Value::Object(body);

        let response = match self.api.submit_generation(kind, &body).await {
            Ok(response) => response,
            // Non-auth rejections from the generate endpoints are
            // admission decisions; pass the detail through verbatim.
            Err(CoreError::Server { detail, .. }) => {
                return Err(CoreError::Admission(detail));
            }
            Err(other) => return Err(other),
        };

        tracing::info!(
            job_id = %response.job_id,
            kind = %kind,
            model = model.key,
            "Job submitted",
        );

        let mut job = Job::new(response.job_id, kind, response.status, model.cost);
        job.result_url = response.image_url.or(response.video_url);
        Ok(job)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
