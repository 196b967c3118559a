use clap::Parser;
use dieroll_common::CliConfigOverrides;

#[derive(Parser, Debug, Default)]
pub struct Cli {
    /// Configuration profile from config.toml to use.
    #[arg(long = "profile", short = 'p')]
    pub config_profile: Option<String>,

    /// Seed the face generator so a session replays the same rolls.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    #[clap(skip)]
    pub config_overrides: CliConfigOverrides,
}
