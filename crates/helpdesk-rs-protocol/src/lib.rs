//! Shared types for the help desk: conversation messages, attachments, and the
//! generative provider boundary.

mod error;
mod media;
mod provider;

pub use error::ProviderError;
pub use media::{AspectRatio, Attachment, InlineData};
pub use provider::{
    ContentRequest, ContentResponse, GenerativeProvider, GroundingSource, ImageRequest, Modality,
    Part, VideoOperation, VideoRequest,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a dispatched turn.
pub type TurnId = Uuid;

/// Speaker role for a conversation message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User-authored message.
    User,
    /// Model-authored message.
    Model,
}

impl Role {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// Message shown in the help desk transcript.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationMessage {
    /// Role that produced the message.
    pub role: Role,
    /// Text content; may be empty.
    pub text: String,
    /// Image as a data URI (user upload or generated image).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Generated video URI (model turns only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    /// Name of a non-image file attached to a user turn.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    /// Placeholder for a long-running model turn.
    #[serde(default)]
    pub pending: bool,
    /// Timestamp for the message.
    pub created_at: DateTime<Utc>,
}

impl ConversationMessage {
    fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            image: None,
            video: None,
            file_name: None,
            pending: false,
            created_at: Utc::now(),
        }
    }

    /// User-authored message.
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Model-authored message.
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Pending model placeholder.
    pub fn pending(text: impl Into<String>) -> Self {
        Self {
            pending: true,
            ..Self::new(Role::Model, text)
        }
    }

    pub fn with_image(mut self, image: Option<String>) -> Self {
        self.image = image;
        self
    }

    pub fn with_video(mut self, video: Option<String>) -> Self {
        self.video = video;
        self
    }

    pub fn with_file_name(mut self, file_name: Option<String>) -> Self {
        self.file_name = file_name;
        self
    }
}
