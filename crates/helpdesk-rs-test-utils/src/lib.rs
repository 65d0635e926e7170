//! Test helpers shared across help desk crates.

pub mod provider;

pub use provider::{FailingProvider, ProviderCall, RecordingProvider, ScriptedProvider};
