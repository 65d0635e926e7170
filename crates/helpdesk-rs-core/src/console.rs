//! Help desk console: one state struct driving selection, composition and
//! the single in-flight turn.

use crate::catalog::{ToolCatalog, ToolDefinition, ToolKind};
use crate::composer::{Composer, load_attachment};
use crate::conversation::Conversation;
use crate::dispatch::{Dispatcher, TurnOutcome, TurnRequest};
use crate::error::{AttachmentError, HelpDeskError};
use crate::selector::ToolSelector;
use helpdesk_rs_protocol::{AspectRatio, Attachment, ConversationMessage, TurnId};
use log::{debug, info};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Placeholder text shown while a video job runs.
pub const VIDEO_PENDING_TEXT: &str = "Generating video... this can take a few minutes.";

/// Where the console is in its per-tool lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Empty transcript and nothing typed.
    Idle,
    /// Input or attachment pending.
    Composing,
    /// A turn is in flight; submission is locked.
    Sending,
    /// Transcript has messages and the composer is empty.
    Settled,
}

/// Turn handed to the caller for dispatch.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub id: TurnId,
    pub request: TurnRequest,
    /// Fired when the turn is abandoned (tool switch or reset).
    pub cancel: CancellationToken,
}

#[derive(Debug)]
struct InFlight {
    id: TurnId,
    cancel: CancellationToken,
    placeholder: Option<usize>,
}

/// Console state for one user session.
#[derive(Debug)]
pub struct HelpDesk {
    catalog: ToolCatalog,
    selector: ToolSelector,
    active: ToolDefinition,
    composer: Composer,
    conversation: Conversation,
    in_flight: Option<InFlight>,
}

impl HelpDesk {
    /// Open the console with `initial_tool` active.
    pub fn new(catalog: ToolCatalog, initial_tool: &str) -> Result<Self, HelpDeskError> {
        let active = catalog.find_tool(initial_tool)?.clone();
        info!("help desk opened (tool={}, tools={})", active.id, catalog.len());
        Ok(Self {
            selector: ToolSelector::new(&active),
            composer: Composer::new(active.default_aspect_ratio),
            active,
            catalog,
            conversation: Conversation::new(),
            in_flight: None,
        })
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn selector(&self) -> &ToolSelector {
        &self.selector
    }

    /// Browsing state (expansion, search, overlay) has no effect on turns.
    pub fn selector_mut(&mut self) -> &mut ToolSelector {
        &mut self.selector
    }

    pub fn active_tool(&self) -> &ToolDefinition {
        &self.active
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.is_loading() {
            Phase::Sending
        } else if !self.composer.is_empty() {
            Phase::Composing
        } else if self.conversation.is_empty() {
            Phase::Idle
        } else {
            Phase::Settled
        }
    }

    /// Switch tools. Always resets the transcript and composer and abandons
    /// any in-flight turn, even when `id` is already active.
    pub fn select_tool(&mut self, id: &str) -> Result<(), HelpDeskError> {
        let tool = self.catalog.find_tool(id)?.clone();
        info!("switching tool (from={}, to={})", self.active.id, tool.id);
        self.selector.select(&tool);
        self.active = tool;
        self.reset();
        Ok(())
    }

    /// Back to `Idle` on the current tool.
    pub fn reset(&mut self) {
        self.abandon_in_flight();
        self.conversation.clear();
        self.composer = Composer::new(self.active.default_aspect_ratio);
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.composer.input = text.into();
    }

    pub fn attach(&mut self, attachment: Attachment) {
        debug!(
            "attachment set (file={}, mime={})",
            attachment.file_name,
            attachment.mime_type()
        );
        self.composer.attachment = Some(attachment);
    }

    /// Read `path` and attach it. On error the current attachment is kept.
    pub fn attach_path(&mut self, path: &Path, max_bytes: u64) -> Result<(), AttachmentError> {
        let attachment = load_attachment(path, max_bytes)?;
        self.attach(attachment);
        Ok(())
    }

    pub fn clear_attachment(&mut self) {
        self.composer.attachment = None;
    }

    pub fn set_aspect_ratio(&mut self, ratio: AspectRatio) {
        self.composer.aspect_ratio = ratio;
    }

    /// Start a turn from the composer. Returns `None` while loading or when
    /// there is nothing to send.
    pub fn begin_turn(&mut self) -> Option<PendingTurn> {
        if self.is_loading() {
            debug!("submit ignored while a turn is in flight");
            return None;
        }
        if self.composer.is_empty() {
            return None;
        }

        let (text, attachment) = self.composer.take();
        let user = match &attachment {
            Some(file) if file.is_image() => {
                ConversationMessage::user(text.clone()).with_image(Some(file.data_uri()))
            }
            Some(file) => {
                ConversationMessage::user(text.clone()).with_file_name(Some(file.file_name.clone()))
            }
            None => ConversationMessage::user(text.clone()),
        };
        self.conversation.push_user(user);

        let placeholder = (self.active.kind == ToolKind::Video)
            .then(|| self.conversation.push_pending(VIDEO_PENDING_TEXT));
        let id = Uuid::new_v4();
        let cancel = CancellationToken::new();
        self.in_flight = Some(InFlight {
            id,
            cancel: cancel.clone(),
            placeholder,
        });
        info!("turn started (turn_id={}, tool={})", id, self.active.id);

        Some(PendingTurn {
            id,
            request: TurnRequest {
                tool: self.active.clone(),
                text,
                attachment,
                aspect_ratio: self.composer.aspect_ratio,
            },
            cancel,
        })
    }

    /// Apply a dispatch outcome. Returns `false` when the outcome belongs to
    /// an abandoned turn or was cancelled, leaving state untouched.
    pub fn settle(&mut self, turn_id: TurnId, outcome: TurnOutcome) -> bool {
        let current = self.in_flight.as_ref().map(|turn| turn.id);
        if current != Some(turn_id) {
            debug!("dropping stale outcome (turn_id={})", turn_id);
            return false;
        }
        let message = match outcome {
            TurnOutcome::Cancelled => {
                debug!("dropping cancelled outcome (turn_id={})", turn_id);
                return false;
            }
            TurnOutcome::Completed(result) => ConversationMessage::model(result.text)
                .with_image(result.image)
                .with_video(result.video),
            TurnOutcome::Rejected(text) | TurnOutcome::Failed(text) => {
                ConversationMessage::model(text)
            }
        };

        let Some(turn) = self.in_flight.take() else {
            return false;
        };
        match turn.placeholder {
            Some(index) => self.conversation.resolve_pending(index, message),
            None => self.conversation.push_model(message),
        }
        info!("turn settled (turn_id={})", turn_id);
        true
    }

    /// Begin, dispatch and settle in one call. Returns whether a model
    /// message was appended.
    pub async fn send(&mut self, dispatcher: &Dispatcher) -> bool {
        let Some(turn) = self.begin_turn() else {
            return false;
        };
        let outcome = dispatcher.dispatch(turn.request, &turn.cancel).await;
        self.settle(turn.id, outcome)
    }

    fn abandon_in_flight(&mut self) {
        if let Some(turn) = self.in_flight.take() {
            info!("abandoning in-flight turn (turn_id={})", turn.id);
            turn.cancel.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::TurnResult;
    use helpdesk_rs_protocol::Role;
    use pretty_assertions::assert_eq;

    fn desk(tool: &str) -> HelpDesk {
        HelpDesk::new(ToolCatalog::builtin(), tool).expect("help desk")
    }

    #[test]
    fn phases_follow_the_turn_lifecycle() {
        let mut desk = desk("translator");
        assert_eq!(desk.phase(), Phase::Idle);
        desk.set_input("hola");
        assert_eq!(desk.phase(), Phase::Composing);
        let turn = desk.begin_turn().expect("turn");
        assert_eq!(desk.phase(), Phase::Sending);
        assert!(desk.is_loading());
        assert!(desk.settle(
            turn.id,
            TurnOutcome::Completed(TurnResult::text("hello"))
        ));
        assert_eq!(desk.phase(), Phase::Settled);
        assert!(!desk.is_loading());
    }

    #[test]
    fn blank_input_without_attachment_is_a_no_op() {
        let mut desk = desk("translator");
        desk.set_input("   ");
        assert!(desk.begin_turn().is_none());
        assert!(desk.conversation().is_empty());
        assert!(!desk.is_loading());
    }

    #[test]
    fn second_submit_while_loading_is_ignored() {
        let mut desk = desk("translator");
        desk.set_input("one");
        let first = desk.begin_turn().expect("turn");
        desk.set_input("two");
        assert!(desk.begin_turn().is_none());
        assert_eq!(desk.conversation().len(), 1);
        assert_eq!(desk.composer().input, "two");
        assert!(desk.settle(first.id, TurnOutcome::Failed("Error: boom".to_string())));
        assert_eq!(desk.conversation().len(), 2);
    }

    #[test]
    fn image_attachments_become_previews_and_other_files_names() {
        let mut desk = desk("proposal-writer");
        desk.attach(Attachment::from_bytes("logo.png", "image/png", b"png"));
        let turn = desk.begin_turn().expect("turn");
        let first = &desk.conversation().messages()[0];
        assert!(first.image.as_deref().is_some_and(|uri| uri.starts_with("data:image/png")));
        assert_eq!(first.file_name, None);
        desk.settle(turn.id, TurnOutcome::Completed(TurnResult::text("ok")));

        desk.attach(Attachment::from_bytes("budget.pdf", "application/pdf", b"%PDF"));
        desk.begin_turn().expect("turn");
        let third = &desk.conversation().messages()[2];
        assert_eq!(third.file_name.as_deref(), Some("budget.pdf"));
        assert_eq!(third.image, None);
        assert!(desk.composer().attachment.is_none());
    }

    #[test]
    fn select_tool_resets_everything_and_resets_aspect_ratio() {
        let mut desk = desk("visual");
        desk.set_aspect_ratio(AspectRatio::Tall);
        desk.set_input("a poster");
        desk.begin_turn().expect("turn");
        desk.attach(Attachment::from_bytes("photo.jpg", "image/jpeg", b"jpg"));
        desk.selector_mut().open_overlay();

        desk.select_tool("certificate-design").expect("select");
        assert!(desk.conversation().is_empty());
        assert!(desk.composer().attachment.is_none());
        assert_eq!(desk.composer().input, "");
        assert_eq!(desk.composer().aspect_ratio, AspectRatio::Landscape);
        assert!(!desk.selector().overlay_open());
        assert!(!desk.is_loading());
        assert_eq!(desk.phase(), Phase::Idle);
    }

    #[test]
    fn late_outcome_after_tool_switch_is_discarded() {
        let mut desk = desk("translator");
        desk.set_input("bonjour");
        let turn = desk.begin_turn().expect("turn");
        desk.select_tool("grant-writer").expect("select");
        assert!(turn.cancel.is_cancelled());
        assert!(!desk.settle(
            turn.id,
            TurnOutcome::Completed(TurnResult::text("late"))
        ));
        assert!(desk.conversation().is_empty());
    }

    #[test]
    fn cancelled_outcome_leaves_turn_in_flight() {
        let mut desk = desk("translator");
        desk.set_input("bonjour");
        let turn = desk.begin_turn().expect("turn");
        assert!(!desk.settle(turn.id, TurnOutcome::Cancelled));
        assert!(desk.is_loading());
    }

    #[test]
    fn video_turn_replaces_its_placeholder() {
        let mut desk = desk("video");
        desk.set_input("children planting trees");
        let turn = desk.begin_turn().expect("turn");
        let messages = desk.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert!(messages[1].pending);
        assert_eq!(messages[1].text, VIDEO_PENDING_TEXT);

        let result = TurnResult {
            video: Some("https://example.com/v.mp4".to_string()),
            ..TurnResult::default()
        };
        assert!(desk.settle(turn.id, TurnOutcome::Completed(result)));
        let messages = desk.conversation().messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].role, Role::Model);
        assert!(!messages[1].pending);
        assert_eq!(messages[1].video.as_deref(), Some("https://example.com/v.mp4"));
    }

    #[test]
    fn unknown_initial_tool_is_rejected() {
        let err = HelpDesk::new(ToolCatalog::builtin(), "missing").unwrap_err();
        assert!(matches!(err, HelpDeskError::UnknownTool(_)));
    }
}
