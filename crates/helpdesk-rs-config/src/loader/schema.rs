//! Schema validation for `helpdesk.json5` layers.
//!
//! Runs before serde so that typos and wrong types surface with the layer
//! and the dotted path that caused them.

use crate::ConfigError;
use helpdesk_rs_protocol::AspectRatio;
use serde_json::{Map, Value};

const MODEL_KEYS: &[&str] = &[
    "text",
    "image_generation",
    "image_edit",
    "video",
    "transcription",
];
const VIDEO_RESOLUTIONS: &[&str] = &["720p", "1080p"];

/// Validate a single config layer against the schema.
pub(super) fn validate_layer_schema(value: &Value, layer: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, "")?;
    ensure_allowed_keys(
        map,
        &["$schema", "provider", "models", "dispatch", "tools", "ui"],
        layer,
        "",
    )?;

    if let Some(value) = map.get("$schema") {
        expect_string(value, layer, "$schema")?;
    }
    if let Some(value) = map.get("provider") {
        validate_provider(value, layer, "provider")?;
    }
    if let Some(value) = map.get("models") {
        validate_models(value, layer, "models")?;
    }
    if let Some(value) = map.get("dispatch") {
        validate_dispatch(value, layer, "dispatch")?;
    }
    if let Some(value) = map.get("tools") {
        validate_tools(value, layer, "tools")?;
    }
    if let Some(value) = map.get("ui") {
        let ui = expect_object(value, layer, "ui")?;
        ensure_allowed_keys(ui, &["initial_tool"], layer, "ui")?;
        if let Some(value) = ui.get("initial_tool") {
            expect_string(value, layer, "ui.initial_tool")?;
        }
    }
    Ok(())
}

fn validate_provider(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(
        map,
        &["endpoint", "api_key_env", "api_key", "request_timeout_secs"],
        layer,
        path,
    )?;
    for key in ["endpoint", "api_key_env", "api_key"] {
        if let Some(value) = map.get(key) {
            expect_string(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("request_timeout_secs") {
        expect_u64(value, layer, &join_path(path, "request_timeout_secs"))?;
    }
    Ok(())
}

fn validate_models(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, MODEL_KEYS, layer, path)?;
    for (key, value) in map {
        expect_string(value, layer, &join_path(path, key))?;
    }
    Ok(())
}

fn validate_dispatch(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    let integer_keys = [
        "thinking_budget",
        "video_poll_interval_secs",
        "video_max_wait_secs",
        "max_attachment_bytes",
    ];
    let mut allowed = integer_keys.to_vec();
    allowed.extend(["video_resolution", "video_aspect_ratio"]);
    ensure_allowed_keys(map, &allowed, layer, path)?;

    for key in integer_keys {
        if let Some(value) = map.get(key) {
            expect_u64(value, layer, &join_path(path, key))?;
        }
    }
    if let Some(value) = map.get("video_resolution") {
        let field = join_path(path, "video_resolution");
        expect_one_of(value, VIDEO_RESOLUTIONS, layer, &field)?;
    }
    if let Some(value) = map.get("video_aspect_ratio") {
        let field = join_path(path, "video_aspect_ratio");
        let ratio = value
            .as_str()
            .ok_or_else(|| invalid_field(layer, &field, "expected string"))?;
        ratio
            .parse::<AspectRatio>()
            .map_err(|message| invalid_field(layer, &field, &message))?;
    }
    Ok(())
}

fn validate_tools(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    let map = expect_object(value, layer, path)?;
    ensure_allowed_keys(map, &["overrides"], layer, path)?;
    let Some(overrides) = map.get("overrides") else {
        return Ok(());
    };
    let overrides_path = join_path(path, "overrides");
    for (tool_id, entry) in expect_object(overrides, layer, &overrides_path)? {
        let entry_path = join_path(&overrides_path, tool_id);
        let entry = expect_object(entry, layer, &entry_path)?;
        ensure_allowed_keys(entry, &["model"], layer, &entry_path)?;
        if let Some(value) = entry.get("model") {
            expect_string(value, layer, &join_path(&entry_path, "model"))?;
        }
    }
    Ok(())
}

fn expect_object<'a>(
    value: &'a Value,
    layer: &str,
    path: &str,
) -> Result<&'a Map<String, Value>, ConfigError> {
    value
        .as_object()
        .ok_or_else(|| invalid_field(layer, path, "expected object"))
}

fn expect_string(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    match value {
        Value::String(_) => Ok(()),
        _ => Err(invalid_field(layer, path, "expected string")),
    }
}

fn expect_u64(value: &Value, layer: &str, path: &str) -> Result<(), ConfigError> {
    if value.is_u64() {
        Ok(())
    } else {
        Err(invalid_field(layer, path, "expected non-negative integer"))
    }
}

fn expect_one_of(
    value: &Value,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match value.as_str() {
        Some(text) if allowed.contains(&text) => Ok(()),
        _ => Err(invalid_field(
            layer,
            path,
            &format!("expected one of {}", allowed.join(", ")),
        )),
    }
}

fn ensure_allowed_keys(
    map: &Map<String, Value>,
    allowed: &[&str],
    layer: &str,
    path: &str,
) -> Result<(), ConfigError> {
    match map.keys().find(|key| !allowed.contains(&key.as_str())) {
        Some(key) => Err(invalid_field(layer, &join_path(path, key), "unknown key")),
        None => Ok(()),
    }
}

fn join_path(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn invalid_field(layer: &str, path: &str, message: &str) -> ConfigError {
    let path = if path.is_empty() { "root" } else { path };
    ConfigError::InvalidField {
        path: format!("{layer}:{path}"),
        message: message.to_string(),
    }
}
