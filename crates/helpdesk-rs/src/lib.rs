//! Public SDK surface for the help desk.
//!
//! Re-exports the building blocks and wires a loaded [`HelpDeskConfig`] into
//! a ready console and dispatcher backed by the Gemini client.

/// Re-export for convenience.
pub use helpdesk_rs_config as config;
pub use helpdesk_rs_core as core;
/// Re-export for convenience.
pub use helpdesk_rs_gemini as gemini;
/// Re-export for convenience.
pub use helpdesk_rs_protocol as protocol;

use helpdesk_rs_config::{ConfigError, HelpDeskConfig};
use helpdesk_rs_core::{DEFAULT_TOOL_ID, Dispatcher, HelpDesk, HelpDeskError, ToolCatalog};
use helpdesk_rs_gemini::GeminiProvider;
use helpdesk_rs_protocol::ProviderError;
use log::info;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while assembling the console from config.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Config was missing a value, such as the API key.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The HTTP client could not be built.
    #[error("failed to build provider: {0}")]
    Provider(#[from] ProviderError),
    /// Tool overrides or the initial tool did not match the catalog.
    #[error(transparent)]
    Catalog(#[from] HelpDeskError),
}

#[inline]
/// Initialize logging using env_logger if the "logging" feature is enabled.
///
/// This is a no-op if the feature is not enabled. Binaries are still expected
/// to call this early in startup to ensure log output is wired up.
pub fn init_logging() {
    #[cfg(feature = "logging")]
    {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }
}

/// Build a dispatcher talking to the configured Gemini endpoint.
///
/// Configs built in code skip the loader, so they are validated here.
pub fn build_dispatcher(config: &HelpDeskConfig) -> Result<Dispatcher, SetupError> {
    config.validate()?;
    let api_key = config.provider.resolve_api_key()?;
    let provider = GeminiProvider::new(
        config.provider.endpoint.clone(),
        &api_key,
        config.provider.request_timeout(),
    )?;
    info!(
        "dispatcher ready (endpoint={}, text_model={})",
        config.provider.endpoint, config.models.text
    );
    Ok(Dispatcher::from_config(Arc::new(provider), config))
}

/// Build the built-in catalog with configured overrides applied.
pub fn build_catalog(config: &HelpDeskConfig) -> Result<ToolCatalog, SetupError> {
    Ok(ToolCatalog::builtin().with_overrides(&config.tools.overrides)?)
}

/// Open a console on `initial_tool`, falling back to `ui.initial_tool` and
/// then the default tool.
pub fn build_help_desk(
    config: &HelpDeskConfig,
    initial_tool: Option<&str>,
) -> Result<HelpDesk, SetupError> {
    let catalog = build_catalog(config)?;
    let tool = initial_tool
        .or(config.ui.initial_tool.as_deref())
        .unwrap_or(DEFAULT_TOOL_ID);
    Ok(HelpDesk::new(catalog, tool)?)
}
