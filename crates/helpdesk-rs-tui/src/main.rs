//! Terminal front-end for the help desk.

use anyhow::Context;
use clap::Parser;
use helpdesk_rs::config::HelpDeskConfig;
use helpdesk_rs_tui::{TuiConfig, run};
use log::{debug, info};
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options for the help desk.
#[derive(Parser)]
#[command(name = "helpdesk", version)]
struct Cli {
    /// Optional path to a helpdesk.json5 config file
    #[arg(long)]
    config: Option<PathBuf>,
    /// Tool to open with (for example `grant-writer`)
    #[arg(long)]
    tool: Option<String>,
    /// Environment variable holding the API key
    #[arg(long)]
    api_key_env: Option<String>,
}

/// Entry point for the help desk TUI.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stderr shares the terminal with the alternate screen, so logging is
    // only wired up on request.
    if std::env::var_os("RUST_LOG").is_some() {
        let _ = env_logger::builder()
            .format_timestamp_millis()
            .parse_default_env()
            .try_init();
    }

    let cli = Cli::parse();
    info!(
        "starting help desk (config_set={}, tool_set={}, api_key_env_set={})",
        cli.config.is_some(),
        cli.tool.is_some(),
        cli.api_key_env.is_some()
    );
    let mut config = if let Some(path) = cli.config.as_ref() {
        HelpDeskConfig::load_from_path(path).context("failed to load config")?
    } else {
        let cwd = std::env::current_dir().context("cwd")?;
        info!("loading layered config from cwd: {}", cwd.display());
        let layered =
            HelpDeskConfig::load_layered(&cwd).context("failed to load layered config")?;
        debug!("layered config loaded (layers={})", layered.layers.len());
        layered.config
    };
    if let Some(env) = cli.api_key_env {
        config.provider.api_key_env = env;
    }

    let desk = helpdesk_rs::build_help_desk(&config, cli.tool.as_deref())
        .context("failed to open help desk")?;
    let dispatcher =
        helpdesk_rs::build_dispatcher(&config).context("failed to build dispatcher")?;

    run(
        desk,
        Arc::new(dispatcher),
        TuiConfig {
            max_attachment_bytes: config.dispatch.max_attachment_bytes,
        },
    )
    .await
}
