//! Ordered transcript for the active tool.

use helpdesk_rs_protocol::ConversationMessage;
use log::debug;

/// Append-only message list. The only in-place edit is resolving a pending
/// placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Conversation {
    messages: Vec<ConversationMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&ConversationMessage> {
        self.messages.last()
    }

    pub fn push_user(&mut self, message: ConversationMessage) {
        self.push(message);
    }

    pub fn push_model(&mut self, message: ConversationMessage) {
        self.push(message);
    }

    /// Append a pending placeholder and return its index.
    pub fn push_pending(&mut self, text: impl Into<String>) -> usize {
        self.push(ConversationMessage::pending(text));
        self.messages.len() - 1
    }

    /// Replace the pending placeholder at `index`. Falls back to appending
    /// when the slot no longer holds a placeholder.
    pub fn resolve_pending(&mut self, index: usize, message: ConversationMessage) {
        match self.messages.get_mut(index) {
            Some(slot) if slot.pending => {
                debug!("resolving pending message (index={})", index);
                *slot = message;
            }
            _ => self.push(message),
        }
    }

    pub fn clear(&mut self) {
        debug!("conversation cleared (messages={})", self.messages.len());
        self.messages.clear();
    }

    fn push(&mut self, message: ConversationMessage) {
        debug!(
            "appending message (role={}, text_len={}, pending={})",
            message.role.as_str(),
            message.text.len(),
            message.pending
        );
        self.messages.push(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helpdesk_rs_protocol::Role;
    use pretty_assertions::assert_eq;

    #[test]
    fn resolve_pending_replaces_in_place() {
        let mut conversation = Conversation::new();
        conversation.push_user(ConversationMessage::user("make a clip"));
        let index = conversation.push_pending("Generating video...");
        conversation.resolve_pending(
            index,
            ConversationMessage::model("").with_video(Some("https://video".to_string())),
        );
        assert_eq!(conversation.len(), 2);
        let last = conversation.last().expect("message");
        assert_eq!(last.role, Role::Model);
        assert!(!last.pending);
        assert_eq!(last.video.as_deref(), Some("https://video"));
    }

    #[test]
    fn resolve_pending_appends_when_slot_is_not_pending() {
        let mut conversation = Conversation::new();
        conversation.push_user(ConversationMessage::user("hi"));
        conversation.resolve_pending(0, ConversationMessage::model("hello"));
        conversation.resolve_pending(9, ConversationMessage::model("again"));
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.messages()[0].text, "hi");
    }
}
