//! Gemini REST wire types (camelCase JSON).

use helpdesk_rs_protocol::{
    ContentRequest, ContentResponse, GroundingSource, ImageRequest, InlineData, Modality, Part,
    VideoOperation, VideoRequest,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentBody {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Tool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl From<&ContentRequest> for GenerateContentBody {
    fn from(request: &ContentRequest) -> Self {
        let system_instruction = request
            .system_instruction
            .as_ref()
            .filter(|text| !text.trim().is_empty())
            .map(|text| Content {
                role: None,
                parts: vec![WirePart::text(text.clone())],
            });
        let tools = if request.google_search {
            vec![Tool {
                google_search: GoogleSearch {},
            }]
        } else {
            Vec::new()
        };
        let generation_config = (request.thinking_budget.is_some()
            || !request.response_modalities.is_empty())
        .then(|| GenerationConfig {
            thinking_config: request
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
            response_modalities: request.response_modalities.clone(),
        });
        Self {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: request.parts.iter().map(WirePart::from).collect(),
            }],
            system_instruction,
            tools,
            generation_config,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<WirePart>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct WirePart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    inline_data: Option<Blob>,
    /// Reasoning summary parts; never shown to the user.
    #[serde(default, skip_serializing)]
    thought: Option<bool>,
}

impl WirePart {
    fn text(text: String) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    fn into_part(self) -> Option<Part> {
        if self.thought == Some(true) {
            return None;
        }
        match (self.text, self.inline_data) {
            (_, Some(blob)) => Some(Part::Inline(InlineData {
                mime_type: blob.mime_type,
                data: blob.data,
            })),
            (Some(text), None) => Some(Part::Text(text)),
            (None, None) => None,
        }
    }
}

impl From<&Part> for WirePart {
    fn from(part: &Part) -> Self {
        match part {
            Part::Text(text) => WirePart::text(text.clone()),
            Part::Inline(data) => WirePart {
                inline_data: Some(Blob {
                    mime_type: data.mime_type.clone(),
                    data: data.data.clone(),
                }),
                ..WirePart::default()
            },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    thinking_config: Option<ThinkingConfig>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    response_modalities: Vec<Modality>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

impl GenerateContentResponse {
    /// Reason the prompt was blocked, when no candidate came back.
    pub(crate) fn block_reason(&self) -> Option<&str> {
        if !self.candidates.is_empty() {
            return None;
        }
        self.prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
    }

    /// Normalize the first candidate.
    pub(crate) fn into_response(self) -> ContentResponse {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return ContentResponse::default();
        };
        let parts = candidate
            .content
            .map(|content| content.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(WirePart::into_part)
            .collect();
        let sources = candidate
            .grounding_metadata
            .map(|metadata| metadata.grounding_chunks)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|chunk| chunk.web)
            .filter_map(|web| {
                let uri = web.uri?;
                Some(GroundingSource {
                    title: web.title.unwrap_or_default(),
                    uri,
                })
            })
            .collect();
        ContentResponse { parts, sources }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<Content>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// `:predict` body for Imagen.
#[derive(Debug, Serialize)]
pub(crate) struct PredictImagesBody {
    instances: Vec<PromptInstance>,
    parameters: ImageParameters,
}

impl From<&ImageRequest> for PredictImagesBody {
    fn from(request: &ImageRequest) -> Self {
        Self {
            instances: vec![PromptInstance {
                prompt: request.prompt.clone(),
                image: None,
            }],
            parameters: ImageParameters {
                sample_count: request.number_of_images,
                aspect_ratio: request.aspect_ratio.as_str().to_string(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PromptInstance {
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<EncodedImage>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EncodedImage {
    bytes_base64_encoded: String,
    mime_type: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ImageParameters {
    sample_count: u32,
    aspect_ratio: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PredictImagesResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

impl PredictImagesResponse {
    pub(crate) fn into_images(self) -> Vec<InlineData> {
        self.predictions
            .into_iter()
            .filter_map(|prediction| {
                let data = prediction.bytes_base64_encoded?;
                Some(InlineData {
                    mime_type: prediction
                        .mime_type
                        .unwrap_or_else(|| "image/png".to_string()),
                    data,
                })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
}

/// `:predictLongRunning` body for Veo.
#[derive(Debug, Serialize)]
pub(crate) struct PredictVideoBody {
    instances: Vec<PromptInstance>,
    parameters: VideoParameters,
}

impl From<&VideoRequest> for PredictVideoBody {
    fn from(request: &VideoRequest) -> Self {
        Self {
            instances: vec![PromptInstance {
                prompt: request.prompt.clone(),
                image: request.seed_image.as_ref().map(|image| EncodedImage {
                    bytes_base64_encoded: image.data.clone(),
                    mime_type: image.mime_type.clone(),
                }),
            }],
            parameters: VideoParameters {
                aspect_ratio: request.aspect_ratio.as_str().to_string(),
                resolution: request.resolution.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoParameters {
    aspect_ratio: String,
    resolution: String,
}

/// Long-running operation resource.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Operation {
    #[serde(default)]
    name: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    response: Option<OperationResponse>,
    #[serde(default)]
    error: Option<Status>,
}

impl Operation {
    pub(crate) fn into_operation(self, fallback_name: &str) -> VideoOperation {
        let name = if self.name.is_empty() {
            fallback_name.to_string()
        } else {
            self.name
        };
        let generated = self
            .response
            .and_then(|response| response.generate_video_response);
        let (video_uri, filtered) = match generated {
            Some(generated) => (
                generated
                    .generated_samples
                    .into_iter()
                    .find_map(|sample| sample.video.and_then(|video| video.uri)),
                generated.rai_media_filtered_reasons,
            ),
            None => (None, Vec::new()),
        };
        let error = self.error.map(|status| status.message).or_else(|| {
            (self.done && video_uri.is_none() && !filtered.is_empty())
                .then(|| filtered.join("; "))
        });
        VideoOperation {
            name,
            done: self.done,
            video_uri,
            error,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    #[serde(default)]
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
    #[serde(default)]
    rai_media_filtered_reasons: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    #[serde(default)]
    video: Option<VideoRef>,
}

#[derive(Debug, Deserialize)]
struct VideoRef {
    #[serde(default)]
    uri: Option<String>,
}

/// `google.rpc.Status` as embedded in operations and error envelopes.
#[derive(Debug, Deserialize)]
pub(crate) struct Status {
    #[serde(default)]
    pub(crate) message: String,
}

/// Body returned with non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorEnvelope {
    pub(crate) error: Status,
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_rs_protocol::AspectRatio;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn content_body_carries_search_thinking_and_modalities() {
        let request = ContentRequest {
            model: "gemini-2.5-pro".to_string(),
            system_instruction: Some("Be brief.".to_string()),
            parts: vec![
                Part::Inline(InlineData {
                    mime_type: "image/png".to_string(),
                    data: "AAAA".to_string(),
                }),
                Part::Text("Describe".to_string()),
            ],
            google_search: true,
            thinking_budget: Some(32_768),
            response_modalities: vec![Modality::Image, Modality::Text],
        };
        let body = serde_json::to_value(GenerateContentBody::from(&request)).expect("json");
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "AAAA" } },
                        { "text": "Describe" }
                    ]
                }],
                "systemInstruction": { "parts": [{ "text": "Be brief." }] },
                "tools": [{ "googleSearch": {} }],
                "generationConfig": {
                    "thinkingConfig": { "thinkingBudget": 32768 },
                    "responseModalities": ["IMAGE", "TEXT"]
                }
            })
        );
    }

    #[test]
    fn plain_text_body_omits_optional_sections() {
        let request = ContentRequest {
            model: "gemini-2.5-flash".to_string(),
            parts: vec![Part::Text("hi".to_string())],
            ..ContentRequest::default()
        };
        let body = serde_json::to_value(GenerateContentBody::from(&request)).expect("json");
        assert_eq!(
            body,
            json!({ "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }] })
        );
    }

    #[test]
    fn response_skips_thought_parts_and_collects_sources() {
        let raw = json!({
            "candidates": [{
                "content": { "role": "model", "parts": [
                    { "text": "thinking...", "thought": true },
                    { "text": "Answer" }
                ]},
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://a.org", "title": "A" } },
                    { "retrievedContext": {} }
                ]}
            }]
        });
        let parsed: GenerateContentResponse = serde_json::from_value(raw).expect("parse");
        let response = parsed.into_response();
        assert_eq!(response.text(), "Answer");
        assert_eq!(
            response.sources,
            vec![GroundingSource {
                title: "A".to_string(),
                uri: "https://a.org".to_string()
            }]
        );
    }

    #[test]
    fn video_body_includes_seed_image() {
        let request = VideoRequest {
            model: "veo".to_string(),
            prompt: "trees".to_string(),
            seed_image: Some(InlineData {
                mime_type: "image/jpeg".to_string(),
                data: "BBBB".to_string(),
            }),
            aspect_ratio: AspectRatio::Wide,
            resolution: "720p".to_string(),
        };
        let body = serde_json::to_value(PredictVideoBody::from(&request)).expect("json");
        assert_eq!(
            body,
            json!({
                "instances": [{
                    "prompt": "trees",
                    "image": { "bytesBase64Encoded": "BBBB", "mimeType": "image/jpeg" }
                }],
                "parameters": { "aspectRatio": "16:9", "resolution": "720p" }
            })
        );
    }

    #[test]
    fn filtered_videos_surface_as_errors() {
        let raw = json!({
            "name": "operations/x",
            "done": true,
            "response": { "generateVideoResponse": {
                "raiMediaFilteredReasons": ["contains a public figure"]
            }}
        });
        let operation: Operation = serde_json::from_value(raw).expect("parse");
        let operation = operation.into_operation("operations/x");
        assert!(operation.done);
        assert_eq!(operation.video_uri, None);
        assert_eq!(operation.error.as_deref(), Some("contains a public figure"));
    }
}
