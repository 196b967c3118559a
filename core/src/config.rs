use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use toml::Value as TomlValue;

use crate::config_loader::SYSTEM_CONFIG_PATH;
use crate::config_loader::load_config_as_toml;
use crate::config_profile::ConfigProfile;
use crate::haptics::HapticOptions;
use crate::haptics::HapticRequest;
use crate::haptics::ImpactStyle;
use crate::timing::InvalidTiming;
use crate::timing::RollTiming;

pub const DEFAULT_TITLE: &str = "🎲 Roll the Dice!";
const DIEROLL_HOME_ENV_VAR: &str = "DIEROLL_HOME";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine the home directory")]
    NoHomeDir,

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(#[from] toml::de::Error),

    #[error("config profile `{0}` not found")]
    UnknownProfile(String),

    #[error("invalid roll timing: {0}")]
    Timing(#[from] InvalidTiming),
}

/// Application configuration loaded from disk and merged with overrides.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub dieroll_home: PathBuf,
    pub active_profile: Option<String>,
    pub title: String,
    pub timing: RollTiming,
    /// Seed for reproducible rolls; thread randomness when unset.
    pub seed: Option<u64>,
    pub haptics: HapticsConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HapticsConfig {
    /// Master switch; honoured unless the request ignores system settings.
    pub enabled: bool,
    pub request: HapticRequest,
}

impl Default for HapticsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            request: HapticRequest::default(),
        }
    }
}

/// Base config deserialized from `config.toml`.
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigToml {
    /// Profile to apply when none is selected on the command line.
    pub profile: Option<String>,
    pub title: Option<String>,
    #[serde(default)]
    pub roll: RollToml,
    #[serde(default)]
    pub haptics: HapticsToml,
    #[serde(default)]
    pub profiles: HashMap<String, ConfigProfile>,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RollToml {
    pub duration_ms: Option<u64>,
    pub shuffle_interval_ms: Option<u64>,
    pub spin_cycles: Option<u32>,
    pub spin_cycle_ms: Option<u64>,
    pub frame_interval_ms: Option<u64>,
    pub seed: Option<u64>,
}

impl RollToml {
    /// Fields set in `overlay` replace ours.
    pub(crate) fn overlay(&mut self, overlay: &RollToml) {
        let RollToml {
            duration_ms,
            shuffle_interval_ms,
            spin_cycles,
            spin_cycle_ms,
            frame_interval_ms,
            seed,
        } = overlay;
        self.duration_ms = duration_ms.or(self.duration_ms);
        self.shuffle_interval_ms = shuffle_interval_ms.or(self.shuffle_interval_ms);
        self.spin_cycles = spin_cycles.or(self.spin_cycles);
        self.spin_cycle_ms = spin_cycle_ms.or(self.spin_cycle_ms);
        self.frame_interval_ms = frame_interval_ms.or(self.frame_interval_ms);
        self.seed = seed.or(self.seed);
    }

    fn timing(&self) -> RollTiming {
        let defaults = RollTiming::default();
        let millis = |value: Option<u64>, default: Duration| {
            value.map(Duration::from_millis).unwrap_or(default)
        };
        RollTiming {
            duration: millis(self.duration_ms, defaults.duration),
            shuffle_interval: millis(self.shuffle_interval_ms, defaults.shuffle_interval),
            spin_cycles: self.spin_cycles.unwrap_or(defaults.spin_cycles),
            spin_cycle: millis(self.spin_cycle_ms, defaults.spin_cycle),
            frame_interval: millis(self.frame_interval_ms, defaults.frame_interval),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HapticsToml {
    pub enabled: Option<bool>,
    pub impact: Option<ImpactStyle>,
    pub enable_vibrate_fallback: Option<bool>,
    pub ignore_system_settings: Option<bool>,
}

impl HapticsToml {
    pub(crate) fn overlay(&mut self, overlay: &HapticsToml) {
        let HapticsToml {
            enabled,
            impact,
            enable_vibrate_fallback,
            ignore_system_settings,
        } = overlay;
        self.enabled = enabled.or(self.enabled);
        self.impact = impact.or(self.impact);
        self.enable_vibrate_fallback = enable_vibrate_fallback.or(self.enable_vibrate_fallback);
        self.ignore_system_settings = ignore_system_settings.or(self.ignore_system_settings);
    }

    fn config(&self) -> HapticsConfig {
        let defaults = HapticOptions::default();
        HapticsConfig {
            enabled: self.enabled.unwrap_or(true),
            request: HapticRequest {
                style: self.impact.unwrap_or_default(),
                options: HapticOptions {
                    enable_vibrate_fallback: self
                        .enable_vibrate_fallback
                        .unwrap_or(defaults.enable_vibrate_fallback),
                    ignore_system_settings: self
                        .ignore_system_settings
                        .unwrap_or(defaults.ignore_system_settings),
                },
            },
        }
    }
}

/// Optional overrides for user configuration (e.g., from CLI flags).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub config_profile: Option<String>,
    pub seed: Option<u64>,
}

impl Config {
    /// Loads `config.toml` from the dieroll home with the system-wide config
    /// laid over it, applies `-c key=value` overrides on top, then the
    /// selected profile, then `overrides`.
    pub fn load_with_cli_overrides(
        cli_overrides: Vec<(String, TomlValue)>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let dieroll_home = find_dieroll_home()?;
        Self::load_from_home(
            dieroll_home,
            Path::new(SYSTEM_CONFIG_PATH),
            cli_overrides,
            overrides,
        )
    }

    pub fn load_from_home(
        dieroll_home: PathBuf,
        system_config: &Path,
        cli_overrides: Vec<(String, TomlValue)>,
        overrides: ConfigOverrides,
    ) -> Result<Self, ConfigError> {
        let mut root_value = load_config_as_toml(&dieroll_home, system_config)?;
        for (path, value) in cli_overrides {
            apply_toml_override(&mut root_value, &path, value);
        }
        let cfg: ConfigToml = root_value.try_into()?;
        Self::load_from_base_config_with_overrides(cfg, overrides, dieroll_home)
    }

    pub fn load_from_base_config_with_overrides(
        cfg: ConfigToml,
        overrides: ConfigOverrides,
        dieroll_home: PathBuf,
    ) -> Result<Self, ConfigError> {
        let ConfigOverrides {
            config_profile,
            seed,
        } = overrides;

        let active_profile = config_profile.or(cfg.profile);
        let mut roll = cfg.roll;
        let mut haptics = cfg.haptics;
        let mut title = cfg.title;
        if let Some(name) = &active_profile {
            let profile = cfg
                .profiles
                .get(name)
                .ok_or_else(|| ConfigError::UnknownProfile(name.clone()))?;
            if let Some(profile_roll) = &profile.roll {
                roll.overlay(profile_roll);
            }
            if let Some(profile_haptics) = &profile.haptics {
                haptics.overlay(profile_haptics);
            }
            if profile.title.is_some() {
                title.clone_from(&profile.title);
            }
        }

        let timing = roll.timing();
        timing.validate()?;

        Ok(Self {
            dieroll_home,
            active_profile,
            title: title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            timing,
            seed: seed.or(roll.seed),
            haptics: haptics.config(),
        })
    }

    /// Defaults only, no files read. Useful for tests and embedders.
    pub fn with_defaults(dieroll_home: PathBuf) -> Self {
        Self {
            dieroll_home,
            active_profile: None,
            title: DEFAULT_TITLE.to_string(),
            timing: RollTiming::default(),
            seed: None,
            haptics: HapticsConfig::default(),
        }
    }

    pub fn log_dir(&self) -> PathBuf {
        log_dir(&self.dieroll_home)
    }
}

pub fn log_dir(dieroll_home: &Path) -> PathBuf {
    dieroll_home.join("log")
}

/// Sets `value` at a dotted `path` (e.g. `roll.duration_ms`), creating
/// intermediate tables and replacing non-table values along the way.
pub fn apply_toml_override(root: &mut TomlValue, path: &str, value: TomlValue) {
    let mut current = root;
    let mut segments = path.split('.').peekable();

    while let Some(segment) = segments.next() {
        let is_last = segments.peek().is_none();

        if is_last {
            match current {
                TomlValue::Table(table) => {
                    table.insert(segment.to_string(), value);
                }
                _ => {
                    let mut table = toml::map::Map::new();
                    table.insert(segment.to_string(), value);
                    *current = TomlValue::Table(table);
                }
            }
            return;
        }

        if !current.is_table() {
            *current = TomlValue::Table(toml::map::Map::new());
        }
        let TomlValue::Table(table) = current else {
            return;
        };
        current = table
            .entry(segment.to_string())
            .or_insert_with(|| TomlValue::Table(toml::map::Map::new()));
    }
}

/// Returns the path to the dieroll configuration directory, which can be
/// specified by the `DIEROLL_HOME` environment variable. If not set, defaults
/// to `~/.dieroll`.
///
/// - If `DIEROLL_HOME` is set, the value will be canonicalized and this
///   function will Err if the path does not exist.
/// - If `DIEROLL_HOME` is not set, this function does not verify that the
///   directory exists.
pub fn find_dieroll_home() -> Result<PathBuf, ConfigError> {
    if let Ok(val) = std::env::var(DIEROLL_HOME_ENV_VAR)
        && !val.is_empty()
    {
        let path = PathBuf::from(&val);
        return path
            .canonicalize()
            .map_err(|source| ConfigError::Io { path, source });
    }

    let mut p = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
    p.push(".dieroll");
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use tempfile::TempDir;

    fn parse(toml: &str) -> ConfigToml {
        toml::from_str(toml).unwrap_or_else(|err| panic!("bad test toml: {err}"))
    }

    #[test]
    fn empty_config_uses_roll_defaults() -> anyhow::Result<()> {
        let home = TempDir::new()?;
        let config = Config::load_from_base_config_with_overrides(
            ConfigToml::default(),
            ConfigOverrides::default(),
            home.path().to_path_buf(),
        )?;

        assert_eq!(config, Config::with_defaults(home.path().to_path_buf()));
        assert_eq!(config.timing.duration, Duration::from_millis(1_200));
        assert_eq!(config.haptics.request.style, ImpactStyle::ImpactHeavy);
        Ok(())
    }

    #[test]
    fn profile_fields_override_the_base() -> anyhow::Result<()> {
        let cfg = parse(
            r#"
title = "Dice"

[roll]
duration_ms = 1500
seed = 9

[haptics]
impact = "impact-light"

[profiles.slow.roll]
duration_ms = 3000
spin_cycle_ms = 500

[profiles.slow.haptics]
enabled = false
"#,
        );
        let config = Config::load_from_base_config_with_overrides(
            cfg,
            ConfigOverrides {
                config_profile: Some("slow".to_string()),
                seed: None,
            },
            PathBuf::from("/tmp/dieroll"),
        )?;

        assert_eq!(config.active_profile.as_deref(), Some("slow"));
        assert_eq!(config.title, "Dice");
        assert_eq!(config.timing.duration, Duration::from_millis(3_000));
        assert_eq!(config.timing.spin_cycle, Duration::from_millis(500));
        assert_eq!(config.timing.shuffle_interval, Duration::from_millis(100));
        assert_eq!(config.seed, Some(9));
        assert!(!config.haptics.enabled);
        assert_eq!(config.haptics.request.style, ImpactStyle::ImpactLight);
        Ok(())
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let cfg = parse("profile = \"turbo\"\n");
        let err = Config::load_from_base_config_with_overrides(
            cfg,
            ConfigOverrides::default(),
            PathBuf::from("/tmp/dieroll"),
        );
        assert_matches!(err, Err(ConfigError::UnknownProfile(name)) if name == "turbo");
    }

    #[test]
    fn zero_duration_is_rejected() {
        let cfg = parse("[roll]\nduration_ms = 0\n");
        let err = Config::load_from_base_config_with_overrides(
            cfg,
            ConfigOverrides::default(),
            PathBuf::from("/tmp/dieroll"),
        );
        assert_matches!(err, Err(ConfigError::Timing(InvalidTiming::ZeroDuration(_))));
    }

    #[test]
    fn cli_overrides_beat_the_config_file() -> anyhow::Result<()> {
        let home = TempDir::new()?;
        std::fs::write(
            home.path().join("config.toml"),
            "[roll]\nduration_ms = 2000\nspin_cycles = 2\n",
        )?;

        let config = Config::load_from_home(
            home.path().to_path_buf(),
            &home.path().join("etc-config.toml"),
            vec![
                ("roll.duration_ms".to_string(), TomlValue::Integer(900)),
                ("haptics.enabled".to_string(), TomlValue::Boolean(false)),
            ],
            ConfigOverrides {
                config_profile: None,
                seed: Some(5),
            },
        )?;

        assert_eq!(config.timing.duration, Duration::from_millis(900));
        assert_eq!(config.timing.spin_cycles, 2);
        assert!(!config.haptics.enabled);
        assert_eq!(config.seed, Some(5));
        Ok(())
    }

    #[test]
    fn system_config_beats_home_but_not_cli_overrides() -> anyhow::Result<()> {
        let home = TempDir::new()?;
        let system = home.path().join("etc-config.toml");
        std::fs::write(
            home.path().join("config.toml"),
            "[roll]\nduration_ms = 900\nspin_cycles = 2\n",
        )?;
        std::fs::write(&system, "[roll]\nduration_ms = 2000\nspin_cycles = 6\n")?;

        let config = Config::load_from_home(
            home.path().to_path_buf(),
            &system,
            vec![("roll.spin_cycles".to_string(), TomlValue::Integer(3))],
            ConfigOverrides::default(),
        )?;

        assert_eq!(config.timing.duration, Duration::from_millis(2000));
        assert_eq!(config.timing.spin_cycles, 3);
        Ok(())
    }

    #[test]
    fn unknown_keys_are_rejected() -> anyhow::Result<()> {
        let home = TempDir::new()?;
        std::fs::write(home.path().join("config.toml"), "[roll]\ndice = 3\n")?;

        let err = Config::load_from_home(
            home.path().to_path_buf(),
            &home.path().join("etc-config.toml"),
            Vec::new(),
            ConfigOverrides::default(),
        );
        assert_matches!(err, Err(ConfigError::Invalid(_)));
        Ok(())
    }

    #[test]
    fn overrides_create_missing_tables() {
        let mut root = TomlValue::Table(Default::default());
        apply_toml_override(&mut root, "roll.seed", TomlValue::Integer(3));
        apply_toml_override(&mut root, "title", TomlValue::String("hi".to_string()));

        let expected: TomlValue = toml::from_str("title = \"hi\"\n[roll]\nseed = 3\n")
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(root, expected);
    }

    #[test]
    #[serial]
    fn dieroll_home_honours_the_environment() -> anyhow::Result<()> {
        let home = TempDir::new()?;
        // SAFETY: serialized with the other tests that touch the environment.
        unsafe { std::env::set_var(DIEROLL_HOME_ENV_VAR, home.path()) };
        let found = find_dieroll_home();
        unsafe { std::env::remove_var(DIEROLL_HOME_ENV_VAR) };

        assert_eq!(found?, home.path().canonicalize()?);
        Ok(())
    }

    #[test]
    #[serial]
    fn missing_dieroll_home_is_an_error() {
        unsafe { std::env::set_var(DIEROLL_HOME_ENV_VAR, "/definitely/not/a/dieroll/home") };
        let found = find_dieroll_home();
        unsafe { std::env::remove_var(DIEROLL_HOME_ENV_VAR) };

        assert_matches!(found, Err(ConfigError::Io { .. }));
    }
}
