//! Provider-neutral request/response shapes and the provider interface.

use crate::error::ProviderError;
use crate::media::{AspectRatio, InlineData};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One piece of multimodal content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Part {
    /// Plain text.
    Text(String),
    /// Inline media bytes.
    Inline(InlineData),
}

/// Output modality requested from a content model.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Modality {
    Text,
    Image,
}

/// Single-shot content generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentRequest {
    /// Model identifier.
    pub model: String,
    /// System instruction sent alongside the user turn.
    pub system_instruction: Option<String>,
    /// User turn parts, in order.
    pub parts: Vec<Part>,
    /// Enable provider-side web search grounding.
    pub google_search: bool,
    /// Reasoning budget in tokens, when elevated.
    pub thinking_budget: Option<u32>,
    /// Requested output modalities; empty means provider default.
    pub response_modalities: Vec<Modality>,
}

/// Web source cited by a grounded response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GroundingSource {
    pub title: String,
    pub uri: String,
}

/// Normalized content generation response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentResponse {
    /// Parts of the first candidate.
    pub parts: Vec<Part>,
    /// Grounding sources reported by the provider.
    pub sources: Vec<GroundingSource>,
}

impl ContentResponse {
    /// Build a text-only response.
    pub fn text_only(text: impl Into<String>) -> Self {
        Self {
            parts: vec![Part::Text(text.into())],
            sources: Vec::new(),
        }
    }

    /// Concatenated text of all text parts.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                Part::Inline(_) => None,
            })
            .collect()
    }

    /// First inline image part, if any.
    pub fn first_image(&self) -> Option<&InlineData> {
        self.parts.iter().find_map(|part| match part {
            Part::Inline(data) if data.is_image() => Some(data),
            _ => None,
        })
    }
}

/// Text-to-image generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub model: String,
    pub prompt: String,
    pub aspect_ratio: AspectRatio,
    pub number_of_images: u32,
}

/// Long-running video generation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRequest {
    pub model: String,
    pub prompt: String,
    /// Optional first frame.
    pub seed_image: Option<InlineData>,
    pub aspect_ratio: AspectRatio,
    /// Output resolution label (e.g. `720p`).
    pub resolution: String,
}

/// Status snapshot of a video generation job.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoOperation {
    /// Provider operation name used for polling.
    pub name: String,
    /// Whether the job has finished (successfully or not).
    pub done: bool,
    /// URI of the first generated video once done.
    pub video_uri: Option<String>,
    /// Error reported by the job, if it failed.
    pub error: Option<String>,
}

impl VideoOperation {
    /// A freshly submitted, unfinished operation.
    pub fn running(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A finished operation carrying a video URI.
    pub fn completed(name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            done: true,
            video_uri: Some(uri.into()),
            error: None,
        }
    }
}

/// Generative AI provider interface used by the dispatcher.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Single-shot text or multimodal generation.
    async fn generate_content(
        &self,
        request: ContentRequest,
    ) -> Result<ContentResponse, ProviderError>;

    /// Text-to-image generation; returns images in provider order.
    async fn generate_images(&self, request: ImageRequest)
    -> Result<Vec<InlineData>, ProviderError>;

    /// Submit a video generation job.
    async fn start_video(&self, request: VideoRequest) -> Result<VideoOperation, ProviderError>;

    /// Refresh the status of a video generation job.
    async fn poll_video(&self, operation: &VideoOperation)
    -> Result<VideoOperation, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::{ContentResponse, Part};
    use crate::media::InlineData;
    use pretty_assertions::assert_eq;

    #[test]
    fn response_text_skips_inline_parts() {
        let response = ContentResponse {
            parts: vec![
                Part::Text("Here is ".to_string()),
                Part::Inline(InlineData::from_bytes("image/png", b"img")),
                Part::Text("your logo.".to_string()),
            ],
            sources: Vec::new(),
        };
        assert_eq!(response.text(), "Here is your logo.");
        assert_eq!(
            response.first_image().map(|data| data.mime_type.as_str()),
            Some("image/png")
        );
    }

    #[test]
    fn first_image_ignores_non_image_inline_parts() {
        let response = ContentResponse {
            parts: vec![Part::Inline(InlineData::from_bytes("audio/wav", b"a"))],
            sources: Vec::new(),
        };
        assert_eq!(response.first_image(), None);
    }
}
