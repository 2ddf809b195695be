//! Config file upkeep: detect keys missing from an older config file and
//! fill them in with defaults, without touching values the user already set.

use crate::config::Config;
use crate::errors::{AppError, AppResult};
use serde_yaml::Value;
use std::fs;

/// Keys a complete config file carries, with their default YAML values.
fn expected_keys() -> Vec<(&'static str, Value)> {
    let defaults = Config::default();
    vec![
        ("database", Value::String(defaults.database)),
        ("host", Value::String(defaults.host)),
        ("port", Value::Number((defaults.port as u64).into())),
        ("amap_key", Value::String(String::new())),
        ("tencent_key", Value::String(String::new())),
        (
            "tencent_daily_limit",
            Value::Number((defaults.tencent_daily_limit as u64).into()),
        ),
        (
            "search_cache_cap",
            Value::Number((defaults.search_cache_cap as u64).into()),
        ),
        (
            "brands",
            Value::Sequence(defaults.brands.into_iter().map(Value::String).collect()),
        ),
        (
            "departments",
            Value::Sequence(
                defaults
                    .departments
                    .into_iter()
                    .map(Value::String)
                    .collect(),
            ),
        ),
    ]
}

/// Report config keys that are missing from the file on disk.
pub fn missing_keys() -> AppResult<Vec<String>> {
    let path = Config::config_file();
    if !path.exists() {
        return Err(AppError::ConfigLoad);
    }

    let content = fs::read_to_string(&path)?;
    let yaml: Value = serde_yaml::from_str(&content).map_err(|_| AppError::ConfigLoad)?;

    let mut missing = Vec::new();
    if let Some(map) = yaml.as_mapping() {
        for (key, _) in expected_keys() {
            if !map.contains_key(&Value::String(key.to_string())) {
                missing.push(key.to_string());
            }
        }
    }

    Ok(missing)
}

/// Add any missing keys to the config file, preserving existing values.
/// Returns the keys that were added.
pub fn fill_missing_keys() -> AppResult<Vec<String>> {
    let path = Config::config_file();
    if !path.exists() {
        return Err(AppError::ConfigLoad);
    }

    let content = fs::read_to_string(&path)?;
    let mut yaml: Value = serde_yaml::from_str(&content).map_err(|_| AppError::ConfigLoad)?;

    let mut added = Vec::new();

    if let Some(map) = yaml.as_mapping_mut() {
        for (key, default) in expected_keys() {
            let k = Value::String(key.to_string());
            if !map.contains_key(&k) {
                map.insert(k, default);
                added.push(key.to_string());
            }
        }
    }

    if !added.is_empty() {
        let serialized = serde_yaml::to_string(&yaml).map_err(|_| AppError::ConfigSave)?;
        fs::write(&path, serialized)?;
    }

    Ok(added)
}
