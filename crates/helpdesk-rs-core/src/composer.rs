//! Pending user input: text, one attachment, and the media aspect ratio.

use crate::error::AttachmentError;
use helpdesk_rs_protocol::{AspectRatio, Attachment};
use log::{debug, info};
use std::fs;
use std::path::Path;

/// Input being composed for the next turn.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Composer {
    pub input: String,
    pub attachment: Option<Attachment>,
    pub aspect_ratio: AspectRatio,
}

impl Composer {
    pub fn new(aspect_ratio: AspectRatio) -> Self {
        Self {
            aspect_ratio,
            ..Self::default()
        }
    }

    /// Nothing worth sending: blank text and no attachment.
    pub fn is_empty(&self) -> bool {
        self.input.trim().is_empty() && self.attachment.is_none()
    }

    /// Drain text and attachment, keeping the aspect ratio.
    pub fn take(&mut self) -> (String, Option<Attachment>) {
        (std::mem::take(&mut self.input), self.attachment.take())
    }
}

/// Read a local file into an attachment, guessing its MIME type from the
/// extension. Files over `max_bytes` are rejected before they are read.
pub fn load_attachment(path: &Path, max_bytes: u64) -> Result<Attachment, AttachmentError> {
    let io_err = |source| AttachmentError::Io {
        path: path.to_path_buf(),
        source,
    };
    let metadata = fs::metadata(path).map_err(io_err)?;
    if !metadata.is_file() {
        return Err(AttachmentError::NotAFile(path.to_path_buf()));
    }
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());
    if metadata.len() > max_bytes {
        return Err(AttachmentError::TooLarge {
            file_name,
            size_bytes: metadata.len(),
            max_bytes,
        });
    }

    let bytes = fs::read(path).map_err(io_err)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    debug!(
        "attachment read (file={}, mime={}, bytes={})",
        file_name,
        mime.essence_str(),
        bytes.len()
    );
    info!("attached file (file={})", file_name);
    Ok(Attachment::from_bytes(file_name, mime.essence_str(), &bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn load_attachment_guesses_mime_from_extension() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("interview.mp3");
        fs::write(&path, b"ID3fake").expect("write");

        let attachment = load_attachment(&path, 1024).expect("attachment");
        assert_eq!(attachment.file_name, "interview.mp3");
        assert_eq!(attachment.mime_type(), "audio/mpeg");
        assert_eq!(attachment.size_bytes, 7);
        assert!(attachment.is_audio());
    }

    #[test]
    fn unknown_extensions_fall_back_to_octet_stream() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("blob.zzunknown");
        fs::write(&path, b"??").expect("write");
        let attachment = load_attachment(&path, 1024).expect("attachment");
        assert_eq!(attachment.mime_type(), "application/octet-stream");
    }

    #[test]
    fn oversized_files_are_rejected() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("scan.pdf");
        fs::write(&path, vec![0u8; 64]).expect("write");
        let err = load_attachment(&path, 16).unwrap_err();
        assert!(matches!(
            err,
            AttachmentError::TooLarge { size_bytes: 64, max_bytes: 16, .. }
        ));
    }

    #[test]
    fn directories_and_missing_paths_are_rejected() {
        let temp = tempdir().expect("tempdir");
        assert!(matches!(
            load_attachment(temp.path(), 16),
            Err(AttachmentError::NotAFile(_))
        ));
        assert!(matches!(
            load_attachment(&temp.path().join("missing.txt"), 16),
            Err(AttachmentError::Io { .. })
        ));
    }

    #[test]
    fn take_keeps_the_aspect_ratio() {
        let mut composer = Composer::new(AspectRatio::Landscape);
        composer.input = "hello".to_string();
        let (text, attachment) = composer.take();
        assert_eq!(text, "hello");
        assert!(attachment.is_none());
        assert!(composer.is_empty());
        assert_eq!(composer.aspect_ratio, AspectRatio::Landscape);
    }
}
