//! Turn dispatcher.
//!
//! Maps a tool's [`ToolKind`] onto exactly one provider call sequence and
//! normalizes the result into a [`TurnOutcome`]. Provider failures never
//! escape: they become `Failed("Error: ...")` outcomes.

use crate::catalog::{ToolDefinition, ToolKind};
use helpdesk_rs_config::{DispatchConfig, HelpDeskConfig, ModelsConfig};
use helpdesk_rs_protocol::{
    AspectRatio, Attachment, ContentRequest, ContentResponse, GenerativeProvider, GroundingSource,
    ImageRequest, Modality, Part, ProviderError, VideoRequest,
};
use log::{debug, info, warn};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Shown when a transcription is requested without audio.
pub const TRANSCRIBE_NEEDS_AUDIO: &str = "Please upload an audio file to transcribe.";
/// Fixed instruction part sent alongside the audio.
pub const TRANSCRIBE_PROMPT: &str = "Transcribe this audio verbatim.";
/// Shown when a research turn carries no question.
pub const RESEARCH_NEEDS_QUESTION: &str = "Please enter a research question.";
pub const NO_RESPONSE: &str = "No response was generated.";
pub const NO_IMAGE: &str = "No image was produced.";
pub const NO_VIDEO: &str = "No video was produced.";

/// Floor for the video poll interval; a zero interval would busy-poll.
const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Everything needed to dispatch one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnRequest {
    pub tool: ToolDefinition,
    pub text: String,
    pub attachment: Option<Attachment>,
    pub aspect_ratio: AspectRatio,
}

/// Normalized result of a successful turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TurnResult {
    pub text: String,
    /// Generated image as a data URI.
    pub image: Option<String>,
    /// Generated video URI.
    pub video: Option<String>,
}

impl TurnResult {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// How a dispatched turn ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Provider answered; soft failures carry explanatory text.
    Completed(TurnResult),
    /// Input validation failed before any provider call.
    Rejected(String),
    /// Provider call failed; text is user-facing.
    Failed(String),
    /// The turn was abandoned before it settled.
    Cancelled,
}

/// Early exit from a dispatch branch.
enum Abort {
    Rejected(String),
    Failed(String),
}

impl From<ProviderError> for Abort {
    fn from(err: ProviderError) -> Self {
        Abort::Failed(format!("Error: {err}"))
    }
}

/// Routes turns to the provider.
#[derive(Clone)]
pub struct Dispatcher {
    provider: Arc<dyn GenerativeProvider>,
    models: ModelsConfig,
    settings: DispatchConfig,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("models", &self.models)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Dispatcher {
    pub fn new(
        provider: Arc<dyn GenerativeProvider>,
        models: ModelsConfig,
        settings: DispatchConfig,
    ) -> Self {
        Self {
            provider,
            models,
            settings,
        }
    }

    /// Dispatcher using the model and dispatch sections of `config`.
    pub fn from_config(provider: Arc<dyn GenerativeProvider>, config: &HelpDeskConfig) -> Self {
        Self::new(provider, config.models.clone(), config.dispatch.clone())
    }

    pub fn settings(&self) -> &DispatchConfig {
        &self.settings
    }

    /// Run one turn. The whole call sequence, video polling included, is
    /// raced against `cancel`; a fired token drops the in-flight request.
    pub async fn dispatch(&self, request: TurnRequest, cancel: &CancellationToken) -> TurnOutcome {
        let tool_id = request.tool.id.clone();
        let kind = request.tool.kind;
        if cancel.is_cancelled() {
            debug!("turn cancelled before dispatch (tool={})", tool_id);
            return TurnOutcome::Cancelled;
        }
        info!(
            "dispatching turn (tool={}, kind={}, attachment={})",
            tool_id,
            kind.as_str(),
            request.attachment.is_some()
        );

        let routed = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!("turn cancelled (tool={})", tool_id);
                return TurnOutcome::Cancelled;
            }
            routed = self.route(&request) => routed,
        };

        match routed {
            Ok(result) => {
                info!(
                    "turn completed (tool={}, text_len={}, image={}, video={})",
                    tool_id,
                    result.text.len(),
                    result.image.is_some(),
                    result.video.is_some()
                );
                TurnOutcome::Completed(result)
            }
            Err(Abort::Rejected(message)) => {
                debug!("turn rejected (tool={}, reason={})", tool_id, message);
                TurnOutcome::Rejected(message)
            }
            Err(Abort::Failed(message)) => {
                warn!("turn failed (tool={}, error={})", tool_id, message);
                TurnOutcome::Failed(message)
            }
        }
    }

    async fn route(&self, request: &TurnRequest) -> Result<TurnResult, Abort> {
        match request.tool.kind {
            ToolKind::Text => self.text(request, None).await,
            ToolKind::Strategy => {
                self.text(request, Some(self.settings.thinking_budget))
                    .await
            }
            ToolKind::Image => self.image(request).await,
            ToolKind::Video => self.video(request).await,
            ToolKind::Transcribe => self.transcribe(request).await,
            ToolKind::Research => self.research(request).await,
        }
    }

    fn text_model(&self, tool: &ToolDefinition, fallback: &str) -> String {
        tool.model_override
            .clone()
            .unwrap_or_else(|| fallback.to_string())
    }

    async fn text(
        &self,
        request: &TurnRequest,
        thinking_budget: Option<u32>,
    ) -> Result<TurnResult, Abort> {
        let mut parts = Vec::new();
        if let Some(attachment) = &request.attachment {
            parts.push(Part::Inline(attachment.inline.clone()));
        }
        if !request.text.trim().is_empty() {
            parts.push(Part::Text(request.text.clone()));
        }
        let response = self
            .provider
            .generate_content(ContentRequest {
                model: self.text_model(&request.tool, &self.models.text),
                system_instruction: Some(request.tool.instruction.clone()),
                parts,
                thinking_budget,
                ..ContentRequest::default()
            })
            .await?;
        Ok(TurnResult::text(or_no_response(response.text())))
    }

    async fn image(&self, request: &TurnRequest) -> Result<TurnResult, Abort> {
        let Some(source) = request.attachment.as_ref().filter(|file| file.is_image()) else {
            if let Some(attachment) = &request.attachment {
                debug!(
                    "ignoring non-image attachment for image generation (file={})",
                    attachment.file_name
                );
            }
            return self.generate_image(request).await;
        };

        let mut parts = vec![Part::Inline(source.inline.clone())];
        if !request.text.trim().is_empty() {
            parts.push(Part::Text(request.text.clone()));
        }
        let response = self
            .provider
            .generate_content(ContentRequest {
                model: self.models.image_edit.clone(),
                system_instruction: Some(request.tool.instruction.clone()),
                parts,
                response_modalities: vec![Modality::Image, Modality::Text],
                ..ContentRequest::default()
            })
            .await?;
        Ok(image_result(&response))
    }

    async fn generate_image(&self, request: &TurnRequest) -> Result<TurnResult, Abort> {
        let images = self
            .provider
            .generate_images(ImageRequest {
                model: self.models.image_generation.clone(),
                prompt: image_prompt(&request.tool.instruction, &request.text),
                aspect_ratio: request.aspect_ratio,
                number_of_images: 1,
            })
            .await?;
        Ok(match images.first() {
            Some(image) => TurnResult {
                image: Some(image.data_uri()),
                ..TurnResult::default()
            },
            None => TurnResult::text(NO_IMAGE),
        })
    }

    async fn video(&self, request: &TurnRequest) -> Result<TurnResult, Abort> {
        let seed_image = request
            .attachment
            .as_ref()
            .filter(|file| file.is_image())
            .map(|file| file.inline.clone());
        let interval = self.settings.video_poll_interval().max(MIN_POLL_INTERVAL);
        let max_wait = self.settings.video_max_wait();
        let deadline = Instant::now() + max_wait;

        let mut operation = self
            .provider
            .start_video(VideoRequest {
                model: self.models.video.clone(),
                prompt: request.text.clone(),
                seed_image,
                aspect_ratio: self.settings.video_aspect_ratio,
                resolution: self.settings.video_resolution.clone(),
            })
            .await?;
        info!("video job started (operation={})", operation.name);

        let mut polls = 0u32;
        while !operation.done {
            if Instant::now() + interval > deadline {
                warn!(
                    "video job exceeded deadline (operation={}, polls={})",
                    operation.name, polls
                );
                return Err(Abort::Failed(format!(
                    "Error: video generation timed out after {}",
                    format_duration(max_wait)
                )));
            }
            tokio::time::sleep(interval).await;
            polls += 1;
            operation = self.provider.poll_video(&operation).await?;
            debug!(
                "video job polled (operation={}, polls={}, done={})",
                operation.name, polls, operation.done
            );
        }

        if let Some(message) = operation.error {
            return Err(Abort::Failed(format!("Error: {message}")));
        }
        Ok(match operation.video_uri {
            Some(uri) => TurnResult {
                video: Some(uri),
                ..TurnResult::default()
            },
            None => TurnResult::text(NO_VIDEO),
        })
    }

    async fn transcribe(&self, request: &TurnRequest) -> Result<TurnResult, Abort> {
        let Some(audio) = request.attachment.as_ref().filter(|file| file.is_audio()) else {
            return Err(Abort::Rejected(TRANSCRIBE_NEEDS_AUDIO.to_string()));
        };
        let mut parts = vec![
            Part::Inline(audio.inline.clone()),
            Part::Text(TRANSCRIBE_PROMPT.to_string()),
        ];
        if !request.text.trim().is_empty() {
            parts.push(Part::Text(format!("Note from the user: {}", request.text.trim())));
        }
        let response = self
            .provider
            .generate_content(ContentRequest {
                model: self.text_model(&request.tool, &self.models.transcription),
                system_instruction: Some(request.tool.instruction.clone()),
                parts,
                ..ContentRequest::default()
            })
            .await?;
        Ok(TurnResult::text(or_no_response(response.text())))
    }

    async fn research(&self, request: &TurnRequest) -> Result<TurnResult, Abort> {
        let question = request.text.trim();
        if question.is_empty() {
            return Err(Abort::Rejected(RESEARCH_NEEDS_QUESTION.to_string()));
        }
        if let Some(attachment) = &request.attachment {
            debug!(
                "research ignores attachments (file={})",
                attachment.file_name
            );
        }
        let response = self
            .provider
            .generate_content(ContentRequest {
                model: self.text_model(&request.tool, &self.models.text),
                system_instruction: Some(request.tool.instruction.clone()),
                parts: vec![Part::Text(question.to_string())],
                google_search: true,
                ..ContentRequest::default()
            })
            .await?;
        let mut text = or_no_response(response.text());
        text.push_str(&format_sources(&response.sources));
        Ok(TurnResult::text(text))
    }
}

fn or_no_response(text: String) -> String {
    if text.trim().is_empty() {
        NO_RESPONSE.to_string()
    } else {
        text
    }
}

fn image_result(response: &ContentResponse) -> TurnResult {
    let text = response.text();
    match response.first_image() {
        Some(image) => TurnResult {
            text,
            image: Some(image.data_uri()),
            video: None,
        },
        None if text.trim().is_empty() => TurnResult::text(NO_IMAGE),
        None => TurnResult::text(format!("{text}\n\n{NO_IMAGE}")),
    }
}

/// Image models take no system instruction; the tool style leads the prompt.
fn image_prompt(instruction: &str, text: &str) -> String {
    match (instruction.trim(), text.trim()) {
        ("", text) => text.to_string(),
        (instruction, "") => instruction.to_string(),
        (instruction, text) => format!("{instruction}\n\n{text}"),
    }
}

/// Markdown source list, one line per distinct URI in first-seen order.
fn format_sources(sources: &[GroundingSource]) -> String {
    let mut seen = HashSet::new();
    let lines: Vec<String> = sources
        .iter()
        .filter(|source| seen.insert(source.uri.as_str()))
        .map(|source| {
            let title = if source.title.trim().is_empty() {
                source.uri.as_str()
            } else {
                source.title.as_str()
            };
            format!("- [{}]({})", title, source.uri)
        })
        .collect();
    if lines.is_empty() {
        return String::new();
    }
    format!("\n\n**Sources:**\n{}", lines.join("\n"))
}

fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs >= 60 && secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_rs_protocol::InlineData;
    use pretty_assertions::assert_eq;

    #[test]
    fn sources_are_deduplicated_by_uri() {
        let sources = vec![
            GroundingSource {
                title: "UN".to_string(),
                uri: "https://un.org".to_string(),
            },
            GroundingSource {
                title: "UN again".to_string(),
                uri: "https://un.org".to_string(),
            },
            GroundingSource {
                title: String::new(),
                uri: "https://who.int".to_string(),
            },
        ];
        assert_eq!(
            format_sources(&sources),
            "\n\n**Sources:**\n- [UN](https://un.org)\n- [https://who.int](https://who.int)"
        );
        assert_eq!(format_sources(&[]), "");
    }

    #[test]
    fn image_result_reports_missing_image_after_text() {
        let response = ContentResponse::text_only("I can't edit faces.");
        assert_eq!(
            image_result(&response).text,
            "I can't edit faces.\n\nNo image was produced."
        );
        assert_eq!(
            image_result(&ContentResponse::default()).text,
            "No image was produced."
        );

        let with_image = ContentResponse {
            parts: vec![Part::Inline(InlineData::from_bytes("image/png", b"x"))],
            sources: Vec::new(),
        };
        let result = image_result(&with_image);
        assert_eq!(result.text, "");
        assert!(result.image.expect("image").starts_with("data:image/png;base64,"));
    }

    #[test]
    fn image_prompt_prefixes_instruction() {
        assert_eq!(image_prompt("Style", "a tree"), "Style\n\na tree");
        assert_eq!(image_prompt("", "a tree"), "a tree");
        assert_eq!(image_prompt("Style", "  "), "Style");
    }

    #[test]
    fn durations_render_in_minutes_when_whole() {
        assert_eq!(format_duration(Duration::from_secs(600)), "10 min");
        assert_eq!(format_duration(Duration::from_secs(45)), "45s");
    }
}
