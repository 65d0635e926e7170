use async_trait::async_trait;
use helpdesk_rs_protocol::{
    ContentRequest, ContentResponse, GenerativeProvider, ImageRequest, InlineData, ProviderError,
    VideoOperation, VideoRequest,
};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One recorded provider invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCall {
    Content(ContentRequest),
    Images(ImageRequest),
    StartVideo(VideoRequest),
    PollVideo(String),
}

/// Provider that replays queued results and records every call.
///
/// Empty queues fall back to: a fixed text answer, no images, and a video job
/// that never finishes.
#[derive(Debug, Default)]
pub struct ScriptedProvider {
    content: Mutex<VecDeque<Result<ContentResponse, ProviderError>>>,
    images: Mutex<VecDeque<Result<Vec<InlineData>, ProviderError>>>,
    video_start: Mutex<VecDeque<Result<VideoOperation, ProviderError>>>,
    video_polls: Mutex<VecDeque<Result<VideoOperation, ProviderError>>>,
    delay: Option<Duration>,
    calls: Arc<Mutex<Vec<ProviderCall>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(self, response: Result<ContentResponse, ProviderError>) -> Self {
        self.content.lock().push_back(response);
        self
    }

    pub fn with_text(self, text: impl Into<String>) -> Self {
        self.with_content(Ok(ContentResponse::text_only(text)))
    }

    pub fn with_images(self, images: Result<Vec<InlineData>, ProviderError>) -> Self {
        self.images.lock().push_back(images);
        self
    }

    pub fn with_video_start(self, operation: Result<VideoOperation, ProviderError>) -> Self {
        self.video_start.lock().push_back(operation);
        self
    }

    pub fn with_video_poll(self, operation: Result<VideoOperation, ProviderError>) -> Self {
        self.video_polls.lock().push_back(operation);
        self
    }

    /// Sleep before answering `generate_content`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Shared handle to the call log, usable after the provider is moved.
    pub fn call_log(&self) -> Arc<Mutex<Vec<ProviderCall>>> {
        self.calls.clone()
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Content requests only, in call order.
    pub fn content_requests(&self) -> Vec<ContentRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                ProviderCall::Content(request) => Some(request.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: ProviderCall) {
        self.calls.lock().push(call);
    }
}

#[async_trait]
impl GenerativeProvider for ScriptedProvider {
    async fn generate_content(
        &self,
        request: ContentRequest,
    ) -> Result<ContentResponse, ProviderError> {
        self.record(ProviderCall::Content(request));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.content.lock().pop_front();
        next.unwrap_or_else(|| Ok(ContentResponse::text_only("scripted response")))
    }

    async fn generate_images(
        &self,
        request: ImageRequest,
    ) -> Result<Vec<InlineData>, ProviderError> {
        self.record(ProviderCall::Images(request));
        let next = self.images.lock().pop_front();
        next.unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn start_video(&self, request: VideoRequest) -> Result<VideoOperation, ProviderError> {
        self.record(ProviderCall::StartVideo(request));
        let next = self.video_start.lock().pop_front();
        next.unwrap_or_else(|| Ok(VideoOperation::running("operations/scripted")))
    }

    async fn poll_video(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, ProviderError> {
        self.record(ProviderCall::PollVideo(operation.name.clone()));
        let next = self.video_polls.lock().pop_front();
        next.unwrap_or_else(|| Ok(VideoOperation::running(operation.name.clone())))
    }
}

/// Provider that answers every content call with a fixed text and keeps the
/// requests it saw.
#[derive(Debug, Clone)]
pub struct RecordingProvider {
    response: String,
    seen: Arc<Mutex<Vec<ContentRequest>>>,
}

impl RecordingProvider {
    pub fn new(response: impl Into<String>) -> (Self, Arc<Mutex<Vec<ContentRequest>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                response: response.into(),
                seen: seen.clone(),
            },
            seen,
        )
    }
}

#[async_trait]
impl GenerativeProvider for RecordingProvider {
    async fn generate_content(
        &self,
        request: ContentRequest,
    ) -> Result<ContentResponse, ProviderError> {
        self.seen.lock().push(request);
        Ok(ContentResponse::text_only(self.response.clone()))
    }

    async fn generate_images(
        &self,
        _request: ImageRequest,
    ) -> Result<Vec<InlineData>, ProviderError> {
        Ok(Vec::new())
    }

    async fn start_video(&self, _request: VideoRequest) -> Result<VideoOperation, ProviderError> {
        Ok(VideoOperation::completed("operations/recorded", "https://video.invalid/recorded.mp4"))
    }

    async fn poll_video(
        &self,
        operation: &VideoOperation,
    ) -> Result<VideoOperation, ProviderError> {
        Ok(operation.clone())
    }
}

/// Provider whose every call fails with the same error.
#[derive(Debug, Clone)]
pub struct FailingProvider {
    error: ProviderError,
    calls: Arc<Mutex<usize>>,
}

impl FailingProvider {
    pub fn new(error: ProviderError) -> Self {
        Self {
            error,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock()
    }

    fn fail<T>(&self) -> Result<T, ProviderError> {
        *self.calls.lock() += 1;
        Err(self.error.clone())
    }
}

#[async_trait]
impl GenerativeProvider for FailingProvider {
    async fn generate_content(
        &self,
        _request: ContentRequest,
    ) -> Result<ContentResponse, ProviderError> {
        self.fail()
    }

    async fn generate_images(
        &self,
        _request: ImageRequest,
    ) -> Result<Vec<InlineData>, ProviderError> {
        self.fail()
    }

    async fn start_video(&self, _request: VideoRequest) -> Result<VideoOperation, ProviderError> {
        self.fail()
    }

    async fn poll_video(
        &self,
        _operation: &VideoOperation,
    ) -> Result<VideoOperation, ProviderError> {
        self.fail()
    }
}
