//! Core help desk primitives.
//!
//! This crate owns the tool catalog, selector and composer state, the
//! conversation transcript, the turn dispatcher, and the console state
//! machine that ties them together.

mod builtin;
pub mod catalog;
pub mod composer;
pub mod console;
pub mod conversation;
pub mod dispatch;
pub mod error;
pub mod selector;

pub use catalog::{
    CategoryGroup, DEFAULT_TOOL_ID, ToolCatalog, ToolCategory, ToolDefinition, ToolFlags, ToolKind,
};
pub use composer::{Composer, load_attachment};
pub use console::{HelpDesk, PendingTurn, Phase, VIDEO_PENDING_TEXT};
pub use conversation::Conversation;
pub use dispatch::{Dispatcher, TurnOutcome, TurnRequest, TurnResult};
pub use error::{AttachmentError, HelpDeskError};
/// Cancellation handle carried by every pending turn.
pub use tokio_util::sync::CancellationToken;
