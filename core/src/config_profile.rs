use serde::Deserialize;

use crate::config::HapticsToml;
use crate::config::RollToml;

/// Collection of common configuration options that a user can define as a unit
/// in `config.toml`. Fields left unset fall back to the top-level values.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigProfile {
    pub title: Option<String>,
    pub roll: Option<RollToml>,
    pub haptics: Option<HapticsToml>,
}
