//! Support for `-c key=value` overrides shared across dieroll CLI tools.
//!
//! This module provides a [`CliConfigOverrides`] struct that can be embedded
//! into a `clap`-derived CLI struct using `#[clap(flatten)]`. Each occurrence
//! of `-c key=value` (or `--config key=value`) will be collected as a raw
//! string. Helper methods are provided to convert the raw strings into
//! key/value pairs.

use clap::ArgAction;
use clap::Parser;
use serde::de::Error as SerdeError;
use toml::Value;

/// CLI option that captures arbitrary configuration overrides specified as
/// `-c key=value`. It intentionally keeps both halves **unparsed** so that the
/// calling code can decide how to interpret the right-hand side.
#[derive(Parser, Debug, Default, Clone)]
pub struct CliConfigOverrides {
    /// Override a configuration value that would otherwise be loaded from
    /// `~/.dieroll/config.toml`. Use a dotted path (`roll.duration_ms`) to
    /// override nested values. The `value` portion is parsed as TOML. If it
    /// fails to parse as TOML, the raw string is used as a literal.
    ///
    /// Examples:
    ///   - `-c roll.duration_ms=2000`
    ///   - `-c haptics.impact="impact-light"`
    ///   - `-c title=Dice`
    #[arg(
        short = 'c',
        long = "config",
        value_name = "key=value",
        action = ArgAction::Append,
        global = true,
    )]
    pub raw_overrides: Vec<String>,
}

impl CliConfigOverrides {
    /// Parse the raw strings captured from the CLI into a list of `(path,
    /// value)` tuples where `value` is a `toml::Value`.
    pub fn parse_overrides(&self) -> Result<Vec<(String, Value)>, String> {
        self.raw_overrides
            .iter()
            .map(|s| {
                // Only split on the *first* '=' so values are free to contain
                // the character.
                let mut parts = s.splitn(2, '=');
                let key = match parts.next() {
                    Some(k) => k.trim(),
                    None => return Err("Override missing key".to_string()),
                };
                let value_str = parts
                    .next()
                    .ok_or_else(|| format!("Invalid override (missing '='): {s}"))?
                    .trim();

                if key.is_empty() {
                    return Err(format!("Empty key in override: {s}"));
                }

                // Attempt to parse as TOML. If that fails, treat it as a raw
                // string. This allows convenient usage such as
                // `-c title=Dice` without quotes.
                let value: Value = match parse_toml_value(value_str) {
                    Ok(v) => v,
                    Err(_) => {
                        // Strip leading/trailing quotes if present
                        let trimmed = value_str.trim().trim_matches(|c| c == '"' || c == '\'');
                        Value::String(trimmed.to_string())
                    }
                };

                Ok((key.to_string(), value))
            })
            .collect()
    }
}

/// Parse a single TOML value by wrapping it in a throwaway key.
fn parse_toml_value(raw: &str) -> Result<Value, toml::de::Error> {
    let wrapped = format!("_x_ = {raw}");
    let table: toml::Table = toml::from_str(&wrapped)?;
    table
        .get("_x_")
        .cloned()
        .ok_or_else(|| SerdeError::custom("missing sentinel key"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn overrides(raw: &[&str]) -> CliConfigOverrides {
        CliConfigOverrides {
            raw_overrides: raw.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    #[test]
    fn parses_basic_scalar() {
        let v = parse_toml_value("42").unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(v.as_integer(), Some(42));
    }

    #[test]
    fn values_fall_back_to_strings() {
        let parsed = overrides(&["title=Dice night", "haptics.impact=\"rigid\""])
            .parse_overrides()
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(
            parsed,
            vec![
                ("title".to_string(), Value::String("Dice night".to_string())),
                ("haptics.impact".to_string(), Value::String("rigid".to_string())),
            ]
        );
    }

    #[test]
    fn typed_values_survive() {
        let parsed = overrides(&["roll.duration_ms = 2000", "haptics.enabled=false"])
            .parse_overrides()
            .unwrap_or_else(|err| panic!("{err}"));
        assert_eq!(parsed[0], ("roll.duration_ms".to_string(), Value::Integer(2000)));
        assert_eq!(parsed[1], ("haptics.enabled".to_string(), Value::Boolean(false)));
    }

    #[test]
    fn rejects_missing_equals_and_empty_keys() {
        assert!(overrides(&["roll.duration_ms"]).parse_overrides().is_err());
        assert!(overrides(&["=3"]).parse_overrides().is_err());
    }
}
