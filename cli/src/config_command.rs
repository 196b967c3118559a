use dieroll_common::CliConfigOverrides;
use dieroll_common::create_config_summary_entries;
use dieroll_core::config::Config;
use dieroll_core::config::ConfigOverrides;

const EXIT_CODE_INVALID_CONFIG: i32 = 3;

/// Validate the effective configuration and print a summary of it.
#[derive(Debug, Default, clap::Parser)]
pub struct ConfigCommand {
    #[clap(skip)]
    pub config_overrides: CliConfigOverrides,

    /// Validate with this profile from config.toml applied.
    #[arg(long = "profile", short = 'p')]
    pub config_profile: Option<String>,

    /// Seed to report in the summary.
    #[arg(long = "seed")]
    pub seed: Option<u64>,

    /// Only check the configuration; print nothing on success.
    #[arg(long = "check")]
    pub check: bool,
}

pub fn validate_config(cmd: ConfigCommand) {
    let ConfigCommand {
        config_overrides,
        config_profile,
        seed,
        check,
    } = cmd;
    let should_print = !check;

    let cli_overrides = match config_overrides.parse_overrides() {
        Ok(overrides) => overrides,
        Err(err) => {
            eprintln!("Error parsing -c overrides: {err}");
            std::process::exit(EXIT_CODE_INVALID_CONFIG);
        }
    };

    let overrides = ConfigOverrides {
        config_profile,
        seed,
    };
    match Config::load_with_cli_overrides(cli_overrides, overrides) {
        Ok(config) => {
            if should_print {
                println!("Current default config settings:");
                println!("--------------------------------");
                for (key, value) in create_config_summary_entries(&config) {
                    println!("{key}: {value}");
                }
                println!("--------------------------------");
                println!("* `-c key=value` and `--profile` change these per run. *");
            }
        }
        Err(err) => {
            eprintln!("Config validation error: {err}");
            std::process::exit(EXIT_CODE_INVALID_CONFIG);
        }
    }
}
