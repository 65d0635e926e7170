//! Layered configuration loader.
//!
//! Discovers config layers (system, user, project, cwd, runtime), validates each
//! against the schema, merges them under optional organisation-wide
//! requirements, and produces the effective `HelpDeskConfig`.

mod layer_io;
mod merge;
mod schema;
mod utils;


use crate::{ConfigError, HelpDeskConfig};
use log::{debug, info};
use serde_json::Value;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Config filename looked up in every local layer.
const DEFAULT_CONFIG_FILE: &str = "helpdesk.json5";
/// Per-user config directory under the home directory.
const DEFAULT_CONFIG_DIR: &str = ".helpdesk";
/// Marker entries that identify a project root.
const DEFAULT_PROJECT_ROOT_MARKERS: &[&str] = &[".git"];

#[cfg(unix)]
const SYSTEM_CONFIG_PATH: &str = "/etc/helpdesk/helpdesk.json5";
#[cfg(unix)]
const SYSTEM_REQUIREMENTS_PATH: &str = "/etc/helpdesk/requirements.json5";
#[cfg(windows)]
const SYSTEM_CONFIG_PATH: &str = "C:\\ProgramData\\helpdesk\\helpdesk.json5";
#[cfg(windows)]
const SYSTEM_REQUIREMENTS_PATH: &str = "C:\\ProgramData\\helpdesk\\requirements.json5";

/// Effective config plus metadata about which layers were loaded.
#[derive(Debug, Clone)]
pub struct LayeredConfig {
    /// The merged, validated config.
    pub config: HelpDeskConfig,
    /// Layers that contributed, lowest precedence first.
    pub layers: Vec<ConfigLayer>,
}

/// Origin for a single config layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigLayerSource {
    /// Locked settings that later layers cannot change.
    Requirements,
    System,
    User,
    /// Nearest ancestor directory holding a project marker.
    Project,
    Cwd,
    /// Explicit paths passed at startup (highest precedence).
    Runtime,
}

impl ConfigLayerSource {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            ConfigLayerSource::Requirements => "requirements",
            ConfigLayerSource::System => "system",
            ConfigLayerSource::User => "user",
            ConfigLayerSource::Project => "project",
            ConfigLayerSource::Cwd => "cwd",
            ConfigLayerSource::Runtime => "runtime",
        }
    }
}

/// Metadata about a loaded config layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigLayer {
    pub source: ConfigLayerSource,
    pub path: PathBuf,
}

/// Options controlling layered config discovery.
#[derive(Debug, Clone)]
pub struct LayeredConfigOptions {
    /// Working directory used to find the cwd and project layers.
    pub cwd: PathBuf,
    pub system_config_path: Option<PathBuf>,
    pub user_config_path: Option<PathBuf>,
    pub requirements_path: Option<PathBuf>,
    /// Runtime override paths, applied last in order.
    pub runtime_paths: Vec<PathBuf>,
    pub project_root_markers: Vec<String>,
}

impl LayeredConfigOptions {
    /// Options with the default layer locations for `cwd`.
    pub fn new(cwd: impl AsRef<Path>) -> Self {
        Self {
            cwd: cwd.as_ref().to_path_buf(),
            system_config_path: layer_io::default_system_config_path(),
            user_config_path: layer_io::default_user_config_path(),
            requirements_path: layer_io::default_requirements_path(),
            runtime_paths: Vec::new(),
            project_root_markers: DEFAULT_PROJECT_ROOT_MARKERS
                .iter()
                .map(|marker| marker.to_string())
                .collect(),
        }
    }

    /// Add a runtime override path.
    pub fn with_runtime_path(mut self, path: impl AsRef<Path>) -> Self {
        self.runtime_paths.push(path.as_ref().to_path_buf());
        self
    }
}

impl HelpDeskConfig {
    /// Load a single config file (no layering).
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        info!("loading config from path: {}", path.as_ref().display());
        let contents = fs::read_to_string(path)?;
        Self::load_from_str(&contents)
    }

    /// Load a single config from JSON5 contents (no layering).
    pub fn load_from_str(contents: &str) -> Result<Self, ConfigError> {
        debug!("loading config from raw contents (len={})", contents.len());
        let value: Value = json5::from_str(contents)?;
        config_from_value(value, "config")
    }

    /// Load the layered config stack from the default locations.
    pub fn load_layered(cwd: impl AsRef<Path>) -> Result<LayeredConfig, ConfigError> {
        Self::load_layered_with_options(LayeredConfigOptions::new(cwd))
    }

    /// Load the layered config stack.
    ///
    /// Precedence (low -> high): system, user, project, cwd, runtime. Keys set
    /// in the requirements layer are locked and ignore every other layer.
    pub fn load_layered_with_options(
        options: LayeredConfigOptions,
    ) -> Result<LayeredConfig, ConfigError> {
        let cwd = utils::normalize_path(&options.cwd)?;
        let mut candidates: Vec<(ConfigLayerSource, PathBuf)> = Vec::new();
        if let Some(path) = options.system_config_path.clone() {
            candidates.push((ConfigLayerSource::System, path));
        }
        if let Some(path) = options.user_config_path.clone() {
            candidates.push((ConfigLayerSource::User, path));
        }
        match utils::find_project_root(&cwd, &options.project_root_markers) {
            Some(root) => {
                debug!("resolved project root: {}", root.display());
                candidates.push((ConfigLayerSource::Project, root.join(DEFAULT_CONFIG_FILE)));
            }
            None => debug!("project root not found; skipping project layer"),
        }
        candidates.push((ConfigLayerSource::Cwd, cwd.join(DEFAULT_CONFIG_FILE)));

        let requirements = match options.requirements_path.as_deref() {
            Some(path) => layer_io::load_optional_layer(ConfigLayerSource::Requirements, path)?,
            None => None,
        };

        let mut layers = Vec::new();
        let mut loaded = Vec::new();
        let mut seen = HashSet::new();
        if let Some(layer) = requirements.as_ref() {
            layers.push(layer.meta.clone());
        }
        for (source, path) in candidates {
            // Project and cwd often resolve to the same file.
            if !seen.insert(utils::unique_path(&path)) {
                debug!("skipping duplicate layer ({}: {})", source.label(), path.display());
                continue;
            }
            if let Some(layer) = layer_io::load_optional_layer(source, &path)? {
                layers.push(layer.meta.clone());
                loaded.push(layer);
            }
        }
        for path in &options.runtime_paths {
            let layer = layer_io::load_required_layer(ConfigLayerSource::Runtime, path)?;
            layers.push(layer.meta.clone());
            loaded.push(layer);
        }

        let locked = requirements.map(|layer| layer.value);
        let mut merged = locked
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        for layer in loaded {
            merge::merge_layer(&mut merged, &layer.value, locked.as_ref());
        }

        let config = config_from_value(merged, "effective")?;
        info!("layered config loaded (layers={})", layers.len());
        Ok(LayeredConfig { config, layers })
    }

    /// Validate invariants that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let dispatch = &self.dispatch;
        if dispatch.video_poll_interval_secs == 0 {
            return Err(invalid("dispatch.video_poll_interval_secs", "must be at least 1"));
        }
        if dispatch.video_max_wait_secs < dispatch.video_poll_interval_secs {
            return Err(invalid(
                "dispatch.video_max_wait_secs",
                "must not be shorter than video_poll_interval_secs",
            ));
        }
        if dispatch.max_attachment_bytes == 0 {
            return Err(invalid("dispatch.max_attachment_bytes", "must be at least 1"));
        }
        if self.provider.request_timeout_secs == 0 {
            return Err(invalid("provider.request_timeout_secs", "must be at least 1"));
        }
        if self.provider.endpoint.trim().is_empty() {
            return Err(invalid("provider.endpoint", "must not be empty"));
        }

        let models = [
            ("models.text", &self.models.text),
            ("models.image_generation", &self.models.image_generation),
            ("models.image_edit", &self.models.image_edit),
            ("models.video", &self.models.video),
            ("models.transcription", &self.models.transcription),
        ];
        for (path, model) in models {
            if model.trim().is_empty() {
                return Err(invalid(path, "model name must not be empty"));
            }
        }
        for (tool_id, tool) in &self.tools.overrides {
            if tool.model.as_deref().is_some_and(|model| model.trim().is_empty()) {
                return Err(invalid(
                    &format!("tools.overrides.{tool_id}.model"),
                    "model name must not be empty",
                ));
            }
        }
        Ok(())
    }
}

/// A config layer read from disk.
#[derive(Debug, Clone)]
struct LoadedLayer {
    meta: ConfigLayer,
    value: Value,
}

fn config_from_value(value: Value, label: &str) -> Result<HelpDeskConfig, ConfigError> {
    schema::validate_layer_schema(&value, label)?;
    let config: HelpDeskConfig = serde_json::from_value(value)?;
    config.validate()?;
    Ok(config)
}

fn invalid(path: &str, message: &str) -> ConfigError {
    ConfigError::InvalidField {
        path: path.to_string(),
        message: message.to_string(),
    }
}
