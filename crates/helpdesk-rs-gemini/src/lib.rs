//! Gemini REST implementation of [`GenerativeProvider`].
//!
//! Content, image and video requests map onto `generateContent`, `predict`
//! and `predictLongRunning`; video jobs are polled through the operations
//! endpoint. Authentication uses the `x-goog-api-key` header.

mod wire;

use async_trait::async_trait;
use helpdesk_rs_protocol::{
    ContentRequest, ContentResponse, GenerativeProvider, ImageRequest, InlineData, ProviderError,
    VideoOperation, VideoRequest,
};
use log::{debug, warn};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use wire::{
    ErrorEnvelope, GenerateContentBody, GenerateContentResponse, Operation, PredictImagesBody,
    PredictImagesResponse, PredictVideoBody,
};

/// Public Gemini API root.
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

/// HTTP client for the Gemini API.
#[derive(Debug, Clone)]
pub struct GeminiProvider {
    client: Client,
    endpoint: String,
}

impl GeminiProvider {
    /// Build a client for `endpoint`. `timeout` bounds each HTTP request,
    /// not the overall video job.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|_| ProviderError::InvalidRequest("API key is not a valid header".into()))?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
        })
    }

    fn model_url(&self, model: &str, method: &str) -> String {
        let model = model.strip_prefix("models/").unwrap_or(model);
        format!("{}/models/{}:{}", self.endpoint, model, method)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        label: &str,
    ) -> Result<T, ProviderError> {
        let response = request.send().await.map_err(|err| {
            warn!("gemini request failed (call={}, error={})", label, err);
            ProviderError::Transport(err.to_string())
        })?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let error = api_error(status, &body);
            warn!("gemini returned error (call={}, error={})", label, error);
            return Err(error);
        }
        let body = response
            .text()
            .await
            .map_err(|err| ProviderError::Transport(err.to_string()))?;
        debug!(
            "gemini response received (call={}, status={}, bytes={})",
            label,
            status.as_u16(),
            body.len()
        );
        serde_json::from_str(&body).map_err(|err| ProviderError::Decode(err.to_string()))
    }
}

/// Decode the `{ "error": { ... } }` envelope, falling back to the raw body.
fn api_error(status: StatusCode, body: &str) -> ProviderError {
    let message = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ if !body.trim().is_empty() => body.trim().to_string(),
        _ => status
            .canonical_reason()
            .unwrap_or("request failed")
            .to_string(),
    };
    ProviderError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl GenerativeProvider for GeminiProvider {
    async fn generate_content(
        &self,
        request: ContentRequest,
    ) -> Result<ContentResponse, ProviderError> {
        let url = self.model_url(&request.model, "generateContent");
        debug!(
            "gemini generateContent (model={}, parts={}, search={}, thinking={:?})",
            request.model,
            request.parts.len(),
            request.google_search,
            request.thinking_budget
        );
        let body = GenerateContentBody::from(&request);
        let response: GenerateContentResponse = self
            .send(self.client.post(url).json(&body), "generateContent")
            .await?;
        if let Some(reason) = response.block_reason() {
            warn!("gemini blocked prompt (model={}, reason={})", request.model, reason);
        }
        Ok(response.into_response())
    }

    async fn generate_images(
        &self,
        request: ImageRequest,
    ) -> Result<Vec<InlineData>, ProviderError> {
        let url = self.model_url(&request.model, "predict");
        debug!(
            "gemini predict (model={}, aspect_ratio={}, count={})",
            request.model, request.aspect_ratio, request.number_of_images
        );
        let body = PredictImagesBody::from(&request);
        let response: PredictImagesResponse =
            self.send(self.client.post(url).json(&body), "predict").await?;
        Ok(response.into_images())
    }

    async fn start_video(&self, request: VideoRequest) -> Result<VideoOperation, ProviderError> {
        let url = self.model_url(&request.model, "predictLongRunning");
        debug!(
            "gemini predictLongRunning (model={}, seed_image={}, resolution={})",
            request.model,
            request.seed_image.is_some(),
            request.resolution
        );
        let body = PredictVideoBody::from(&request);
        let operation: Operation = self
            .send(self.client.post(url).json(&body), "predictLongRunning")
            .await?;
        let operation = operation.into_operation("");
        if operation.name.is_empty() && !operation.done {
            return Err(ProviderError::Decode(
                "video operation has no name".to_string(),
            ));
        }
        Ok(operation)
    }

    async fn poll_video(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, ProviderError> {
        let url = format!("{}/{}", self.endpoint, operation.name.trim_start_matches('/'));
        let polled: Operation = self.send(self.client.get(url), "operations.get").await?;
        Ok(polled.into_operation(&operation.name))
    }
}
