//! Healing configuration loading
//!
//! Defaults, then an optional YAML file, then `TAPMEND__SECTION__KEY` environment
//! variables, then validation.

use std::env;
use std::fs;
use std::path::Path;

use heal_orchestrator::HealingConfig;
use serde_json::{Map, Value};
use tapmend_core_types::TapmendError;
use thiserror::Error;
use tracing::debug;

const ENV_PREFIX: &str = "TAPMEND__";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("unsupported config path: {0}")]
    UnsupportedPath(String),
    #[error("invalid value for {path}: {message}")]
    InvalidValue { path: String, message: String },
}

impl From<ConfigError> for TapmendError {
    fn from(value: ConfigError) -> Self {
        TapmendError::new(value.to_string())
    }
}

/// Load from `path` (when given and present) and the environment.
pub fn load_config(path: Option<&Path>) -> Result<HealingConfig, ConfigError> {
    let mut value = serde_json::to_value(HealingConfig::default())
        .map_err(|err| ConfigError::Invalid(err.to_string()))?;

    if let Some(path) = path.filter(|p| p.exists()) {
        for (key, overlay) in overlays_from_file(path)? {
            apply_overlay(&mut value, &key, overlay)?;
        }
    }
    for (key, overlay) in overlays_from_env() {
        apply_overlay(&mut value, &key, overlay)?;
    }

    let config: HealingConfig =
        serde_json::from_value(value).map_err(|err| ConfigError::Invalid(err.to_string()))?;
    validate(&config)?;
    debug!(
        min_confidence = config.min_confidence,
        workers = config.workers,
        "healing config loaded"
    );
    Ok(config)
}

pub fn validate(config: &HealingConfig) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&config.min_confidence) {
        return Err(ConfigError::InvalidValue {
            path: "min_confidence".into(),
            message: format!("{} is outside [0, 1]", config.min_confidence),
        });
    }
    if config.workers == 0 {
        return Err(ConfigError::InvalidValue {
            path: "workers".into(),
            message: "at least one worker is required".into(),
        });
    }
    Ok(())
}

fn overlays_from_file(path: &Path) -> Result<Vec<(String, Value)>, ConfigError> {
    let content = fs::read_to_string(path).map_err(|err| ConfigError::Io(err.to_string()))?;
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(&content).map_err(|err| ConfigError::Invalid(err.to_string()))?;
    let json = serde_json::to_value(yaml).map_err(|err| ConfigError::Invalid(err.to_string()))?;
    let mut overlays = Vec::new();
    flatten_value(json, None, &mut overlays);
    Ok(overlays)
}

fn overlays_from_env() -> Vec<(String, Value)> {
    let mut overlays: Vec<(String, Value)> = env::vars()
        .filter_map(|(key, raw)| {
            let stripped = key.strip_prefix(ENV_PREFIX)?;
            let path = stripped
                .split("__")
                .filter(|segment| !segment.is_empty())
                .map(|segment| segment.to_ascii_lowercase())
                .collect::<Vec<_>>()
                .join(".");
            (!path.is_empty()).then(|| (path, parse_env_value(&raw)))
        })
        .collect();
    overlays.sort_by(|a, b| a.0.cmp(&b.0));
    overlays
}

fn parse_env_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Null;
    }
    if let Ok(parsed) = serde_json::from_str::<Value>(raw) {
        return parsed;
    }
    if let Ok(boolean) = raw.parse::<bool>() {
        return Value::Bool(boolean);
    }
    if let Ok(int_val) = raw.parse::<i64>() {
        return Value::Number(int_val.into());
    }
    Value::String(raw.to_string())
}

/// Nested maps become dotted keys; any other value is a leaf.
fn flatten_value(value: Value, prefix: Option<String>, out: &mut Vec<(String, Value)>) {
    match value {
        Value::Object(map) => {
            for (key, value) in map {
                let segment = key.trim().to_ascii_lowercase();
                let next = match &prefix {
                    Some(prefix) => format!("{prefix}.{segment}"),
                    None => segment,
                };
                flatten_value(value, Some(next), out);
            }
        }
        other => {
            if let Some(prefix) = prefix {
                out.push((prefix, other));
            }
        }
    }
}

/// Set a dotted key inside the config tree. Only keys the config already has are accepted.
fn apply_overlay(root: &mut Value, path: &str, value: Value) -> Result<(), ConfigError> {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return Err(ConfigError::UnsupportedPath(path.to_string()));
    };

    let mut node = root;
    for segment in parents {
        node = object_mut(node, path)?
            .get_mut(*segment)
            .ok_or_else(|| ConfigError::UnsupportedPath(path.to_string()))?;
    }
    let object = object_mut(node, path)?;
    if !object.contains_key(*last) {
        return Err(ConfigError::UnsupportedPath(path.to_string()));
    }
    object.insert((*last).to_string(), value);
    Ok(())
}

fn object_mut<'a>(node: &'a mut Value, path: &str) -> Result<&'a mut Map<String, Value>, ConfigError> {
    node.as_object_mut()
        .ok_or_else(|| ConfigError::UnsupportedPath(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested_yaml_keys() {
        let json = serde_json::json!({"discovery": {"Max_Depth": 12}, "workers": 2});
        let mut out = Vec::new();
        flatten_value(json, None, &mut out);
        out.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            out,
            vec![
                ("discovery.max_depth".to_string(), Value::from(12)),
                ("workers".to_string(), Value::from(2)),
            ]
        );
    }

    #[test]
    fn test_parse_env_value() {
        assert_eq!(parse_env_value("0.85"), Value::from(0.85));
        assert_eq!(parse_env_value("true"), Value::Bool(true));
        assert_eq!(parse_env_value("flat"), Value::String("flat".into()));
        assert_eq!(parse_env_value(""), Value::Null);
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let mut value = serde_json::to_value(HealingConfig::default()).unwrap();
        let err = apply_overlay(&mut value, "discovery.max_nodes", Value::from(1)).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedPath(_)));
        apply_overlay(&mut value, "commit.branch", Value::from("heal")).unwrap();
        assert_eq!(value["commit"]["branch"], Value::from("heal"));
    }

    #[test]
    fn test_validation() {
        let mut config = HealingConfig::default();
        config.min_confidence = 1.5;
        assert!(validate(&config).is_err());
        config.min_confidence = 0.5;
        config.workers = 0;
        assert!(validate(&config).is_err());
    }
}
