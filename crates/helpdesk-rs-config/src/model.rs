//! Configuration schema for the help desk.

use crate::ConfigError;
use helpdesk_rs_protocol::AspectRatio;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Root config for the help desk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct HelpDeskConfig {
    #[serde(default, rename = "$schema")]
    pub schema: Option<String>,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub models: ModelsConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl HelpDeskConfig {
    /// Start building a config programmatically with defaults applied.
    pub fn builder() -> HelpDeskConfigBuilder {
        HelpDeskConfigBuilder::new()
    }
}

/// Builder for assembling a `HelpDeskConfig` in code.
#[derive(Debug, Default, Clone)]
pub struct HelpDeskConfigBuilder {
    config: HelpDeskConfig,
}

impl HelpDeskConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: HelpDeskConfig::default(),
        }
    }

    /// Replace the provider connection settings.
    pub fn provider(mut self, provider: ProviderConfig) -> Self {
        self.config.provider = provider;
        self
    }

    /// Replace the per-shape model selection.
    pub fn models(mut self, models: ModelsConfig) -> Self {
        self.config.models = models;
        self
    }

    /// Replace the dispatcher tuning.
    pub fn dispatch(mut self, dispatch: DispatchConfig) -> Self {
        self.config.dispatch = dispatch;
        self
    }

    /// Override the model used by a single tool.
    pub fn tool_model(mut self, tool_id: impl Into<String>, model: impl Into<String>) -> Self {
        self.config.tools.overrides.insert(
            tool_id.into(),
            ToolOverrideConfig {
                model: Some(model.into()),
            },
        );
        self
    }

    pub fn build(self) -> HelpDeskConfig {
        self.config
    }
}

/// Connection settings for the generative AI provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key_env: default_api_key_env(),
            api_key: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl ProviderConfig {
    /// Resolve the API key from config, falling back to the configured env var.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = self.api_key.as_ref().filter(|key| !key.trim().is_empty()) {
            return Ok(key.clone());
        }
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingApiKey(self.api_key_env.clone()))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// Model identifiers used by each request shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfig {
    /// Default model for text tools without an override.
    #[serde(default = "default_text_model")]
    pub text: String,
    /// Text-to-image model.
    #[serde(default = "default_image_generation_model")]
    pub image_generation: String,
    /// Multimodal image edit model.
    #[serde(default = "default_image_edit_model")]
    pub image_edit: String,
    /// Long-running video model.
    #[serde(default = "default_video_model")]
    pub video: String,
    /// Audio transcription model.
    #[serde(default = "default_transcription_model")]
    pub transcription: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self {
            text: default_text_model(),
            image_generation: default_image_generation_model(),
            image_edit: default_image_edit_model(),
            video: default_video_model(),
            transcription: default_transcription_model(),
        }
    }
}

fn default_text_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_image_generation_model() -> String {
    "imagen-4.0-generate-001".to_string()
}

fn default_image_edit_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_video_model() -> String {
    "veo-3.1-fast-generate-preview".to_string()
}

fn default_transcription_model() -> String {
    "gemini-2.5-flash".to_string()
}

/// Tuning for the request dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Reasoning budget for high-effort tools.
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,
    /// Delay between video job status polls.
    #[serde(default = "default_video_poll_interval_secs")]
    pub video_poll_interval_secs: u64,
    /// Upper bound on total time spent waiting for a video job.
    #[serde(default = "default_video_max_wait_secs")]
    pub video_max_wait_secs: u64,
    #[serde(default = "default_video_resolution")]
    pub video_resolution: String,
    #[serde(default = "default_video_aspect_ratio")]
    pub video_aspect_ratio: AspectRatio,
    /// Largest file accepted as an inline attachment.
    #[serde(default = "default_max_attachment_bytes")]
    pub max_attachment_bytes: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            thinking_budget: default_thinking_budget(),
            video_poll_interval_secs: default_video_poll_interval_secs(),
            video_max_wait_secs: default_video_max_wait_secs(),
            video_resolution: default_video_resolution(),
            video_aspect_ratio: default_video_aspect_ratio(),
            max_attachment_bytes: default_max_attachment_bytes(),
        }
    }
}

impl DispatchConfig {
    pub fn video_poll_interval(&self) -> Duration {
        Duration::from_secs(self.video_poll_interval_secs)
    }

    pub fn video_max_wait(&self) -> Duration {
        Duration::from_secs(self.video_max_wait_secs)
    }
}

fn default_thinking_budget() -> u32 {
    32_768
}

fn default_video_poll_interval_secs() -> u64 {
    5
}

fn default_video_max_wait_secs() -> u64 {
    600
}

fn default_video_resolution() -> String {
    "720p".to_string()
}

fn default_video_aspect_ratio() -> AspectRatio {
    AspectRatio::Wide
}

/// Inline data ceiling accepted by the provider (20 MiB).
fn default_max_attachment_bytes() -> u64 {
    20 * 1024 * 1024
}

/// Per-tool settings keyed by tool id.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolsConfig {
    #[serde(default)]
    pub overrides: HashMap<String, ToolOverrideConfig>,
}

/// Override applied to a single catalog tool at startup.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ToolOverrideConfig {
    #[serde(default)]
    pub model: Option<String>,
}

/// Front-end preferences.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    /// Tool selected when the console opens.
    #[serde(default)]
    pub initial_tool: Option<String>,
}
