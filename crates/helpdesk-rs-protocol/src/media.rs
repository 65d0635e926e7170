//! Inline media payloads and user attachments.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Base64-encoded bytes tagged with a MIME type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InlineData {
    /// MIME type of the payload (e.g. `image/png`).
    pub mime_type: String,
    /// Standard base64 encoding of the payload bytes.
    pub data: String,
}

impl InlineData {
    /// Encode raw bytes.
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }

    /// Render the payload as a `data:` URI.
    pub fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.data)
    }

    /// Decode the payload back into raw bytes.
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.data.as_bytes())
    }

    /// Parse a `data:<mime>;base64,<payload>` URI.
    pub fn from_data_uri(uri: &str) -> Option<Self> {
        let rest = uri.strip_prefix("data:")?;
        let (meta, data) = rest.split_once(',')?;
        let mime_type = meta.strip_suffix(";base64")?;
        Some(Self {
            mime_type: mime_type.to_string(),
            data: data.to_string(),
        })
    }

    /// Whether the MIME type is an image type.
    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// A single local file attached to a user turn.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    /// File name shown in the transcript.
    pub file_name: String,
    /// Encoded contents sent to the provider.
    pub inline: InlineData,
    /// Size of the original file in bytes.
    pub size_bytes: u64,
}

impl Attachment {
    /// Build an attachment from raw file bytes.
    pub fn from_bytes(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        Self {
            file_name: file_name.into(),
            inline: InlineData::from_bytes(mime_type, bytes),
            size_bytes: bytes.len() as u64,
        }
    }

    pub fn mime_type(&self) -> &str {
        &self.inline.mime_type
    }

    pub fn is_image(&self) -> bool {
        self.inline.is_image()
    }

    pub fn is_audio(&self) -> bool {
        self.inline.mime_type.starts_with("audio/")
    }

    pub fn is_video(&self) -> bool {
        self.inline.mime_type.starts_with("video/")
    }

    /// Data URI used for inline image previews.
    pub fn data_uri(&self) -> String {
        self.inline.data_uri()
    }
}

/// Output aspect ratio for generated images and videos.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AspectRatio {
    #[default]
    #[serde(rename = "1:1")]
    Square,
    #[serde(rename = "3:4")]
    Portrait,
    #[serde(rename = "4:3")]
    Landscape,
    #[serde(rename = "9:16")]
    Tall,
    #[serde(rename = "16:9")]
    Wide,
}

impl AspectRatio {
    /// All supported ratios in display order.
    pub const ALL: [AspectRatio; 5] = [
        AspectRatio::Square,
        AspectRatio::Portrait,
        AspectRatio::Landscape,
        AspectRatio::Tall,
        AspectRatio::Wide,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectRatio::Square => "1:1",
            AspectRatio::Portrait => "3:4",
            AspectRatio::Landscape => "4:3",
            AspectRatio::Tall => "9:16",
            AspectRatio::Wide => "16:9",
        }
    }
}

impl fmt::Display for AspectRatio {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AspectRatio {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        AspectRatio::ALL
            .into_iter()
            .find(|ratio| ratio.as_str() == value)
            .ok_or_else(|| {
                let supported = AspectRatio::ALL
                    .iter()
                    .map(AspectRatio::as_str)
                    .collect::<Vec<_>>()
                    .join(", ");
                format!("unsupported aspect ratio `{value}` (expected one of {supported})")
            })
    }
}
