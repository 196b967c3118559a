use std::io;
use std::path::Path;
use std::path::PathBuf;

use toml::Value as TomlValue;

use crate::config::ConfigError;

pub(crate) const CONFIG_TOML_FILE: &str = "config.toml";
pub(crate) const SYSTEM_CONFIG_PATH: &str = "/etc/dieroll/config.toml";

/// Reads the user's `config.toml` and overlays the system-wide config on top,
/// so keys set in `system_config` win. Missing files are not an error;
/// unreadable or malformed ones are.
pub(crate) fn load_config_as_toml(
    dieroll_home: &Path,
    system_config: &Path,
) -> Result<TomlValue, ConfigError> {
    load_layers(&[
        (dieroll_home.join(CONFIG_TOML_FILE), true),
        (system_config.to_path_buf(), false),
    ])
}

fn load_layers(layers: &[(PathBuf, bool)]) -> Result<TomlValue, ConfigError> {
    let mut merged = default_empty_table();
    for (path, log_missing_as_info) in layers {
        if let Some(layer) = read_config_from_path(path, *log_missing_as_info)? {
            merge_toml_values(&mut merged, &layer);
        }
    }
    Ok(merged)
}

fn default_empty_table() -> TomlValue {
    TomlValue::Table(Default::default())
}

fn read_config_from_path(
    path: &Path,
    log_missing_as_info: bool,
) -> Result<Option<TomlValue>, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(contents) => match toml::from_str::<TomlValue>(&contents) {
            Ok(value) => Ok(Some(value)),
            Err(err) => {
                tracing::error!("Failed to parse {}: {err}", path.display());
                Err(ConfigError::Parse {
                    path: path.to_path_buf(),
                    source: err,
                })
            }
        },
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            if log_missing_as_info {
                tracing::info!("{} not found, using defaults", path.display());
            } else {
                tracing::debug!("{} not found", path.display());
            }
            Ok(None)
        }
        Err(err) => {
            tracing::error!("Failed to read {}: {err}", path.display());
            Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: err,
            })
        }
    }
}

/// Deep-merges `overlay` into `base`: tables merge key by key, anything else
/// is replaced wholesale.
pub(crate) fn merge_toml_values(base: &mut TomlValue, overlay: &TomlValue) {
    if let TomlValue::Table(overlay_table) = overlay
        && let TomlValue::Table(base_table) = base
    {
        for (key, value) in overlay_table {
            if let Some(existing) = base_table.get_mut(key) {
                merge_toml_values(existing, value);
            } else {
                base_table.insert(key.clone(), value.clone());
            }
        }
        return;
    }

    *base = overlay.clone();
}
