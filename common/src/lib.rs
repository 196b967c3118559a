#[cfg(feature = "cli")]
mod config_override;

#[cfg(feature = "cli")]
pub use config_override::CliConfigOverrides;

mod config_summary;

pub use config_summary::create_config_summary_entries;
