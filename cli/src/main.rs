use clap::Parser;
use dieroll_cli::config_command::ConfigCommand;
use dieroll_cli::config_command::validate_config;
use dieroll_cli::roll_command::RollCommand;
use dieroll_cli::roll_command::run_roll;
use dieroll_common::CliConfigOverrides;
use dieroll_tui::Cli as TuiCli;

/// Dieroll CLI
///
/// If no subcommand is specified, options will be forwarded to the interactive CLI.
#[derive(Debug, Parser)]
#[clap(
    author,
    version,
    // If a sub‑command is given, ignore requirements of the default args.
    subcommand_negates_reqs = true,
    // The executable is sometimes invoked via a platform‑specific name like
    // `dieroll-x86_64-unknown-linux-musl`, but the help output should always use
    // the generic `dieroll` command name that users run.
    bin_name = "dieroll"
)]
struct MultitoolCli {
    #[clap(flatten)]
    pub config_overrides: CliConfigOverrides,

    #[clap(flatten)]
    interactive: TuiCli,

    #[clap(subcommand)]
    subcommand: Option<Subcommand>,
}

#[derive(Debug, clap::Subcommand)]
enum Subcommand {
    /// Roll the die headlessly and print the result.
    Roll(RollCommand),

    /// Validate config.toml and print the effective settings.
    Config(ConfigCommand),
}

fn main() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(cli_main())
}

async fn cli_main() -> anyhow::Result<()> {
    let MultitoolCli {
        config_overrides: root_config_overrides,
        mut interactive,
        subcommand,
    } = MultitoolCli::parse();

    match subcommand {
        None => {
            prepend_config_flags(&mut interactive.config_overrides, root_config_overrides);
            dieroll_tui::run_main(interactive).await?;
        }
        Some(mut subcommand) => {
            forward_root_options(&mut subcommand, root_config_overrides, interactive);
            match subcommand {
                Subcommand::Roll(roll_cli) => run_roll(roll_cli).await?,
                Subcommand::Config(config_cli) => validate_config(config_cli),
            }
        }
    }

    Ok(())
}

/// Hand root-level `-c`, `--profile` and `--seed` to the subcommand. Values
/// given after the subcommand take precedence.
fn forward_root_options(
    subcommand: &mut Subcommand,
    root_config_overrides: CliConfigOverrides,
    root: TuiCli,
) {
    match subcommand {
        Subcommand::Roll(roll_cli) => {
            prepend_config_flags(&mut roll_cli.config_overrides, root_config_overrides);
            roll_cli.config_profile = roll_cli.config_profile.take().or(root.config_profile);
            roll_cli.seed = roll_cli.seed.or(root.seed);
        }
        Subcommand::Config(config_cli) => {
            prepend_config_flags(&mut config_cli.config_overrides, root_config_overrides);
            config_cli.config_profile = config_cli.config_profile.take().or(root.config_profile);
            config_cli.seed = config_cli.seed.or(root.seed);
        }
    }
}

/// Prepend root-level overrides so they have lower precedence than
/// CLI-specific ones specified after the subcommand (if any).
fn prepend_config_flags(
    subcommand_config_overrides: &mut CliConfigOverrides,
    cli_config_overrides: CliConfigOverrides,
) {
    subcommand_config_overrides
        .raw_overrides
        .splice(0..0, cli_config_overrides.raw_overrides);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn root_overrides_reach_the_roll_subcommand() {
        let cli = MultitoolCli::try_parse_from([
            "dieroll",
            "-c",
            "roll.duration_ms=600",
            "roll",
            "--count",
            "2",
        ])
        .unwrap();
        let Some(mut subcommand) = cli.subcommand else {
            panic!("expected a subcommand");
        };
        forward_root_options(&mut subcommand, cli.config_overrides, cli.interactive);
        let Subcommand::Roll(roll) = subcommand else {
            panic!("expected the roll subcommand");
        };
        assert_eq!(
            roll.config_overrides.raw_overrides,
            vec!["roll.duration_ms=600"]
        );
        assert_eq!(roll.count, 2);
        assert!(!roll.quiet);
    }

    #[test]
    fn root_profile_and_seed_reach_the_roll_subcommand() {
        let cli =
            MultitoolCli::try_parse_from(["dieroll", "-p", "slow", "--seed", "3", "roll"]).unwrap();
        let mut subcommand = cli.subcommand.unwrap();
        forward_root_options(&mut subcommand, cli.config_overrides, cli.interactive);
        let Subcommand::Roll(roll) = subcommand else {
            panic!("expected the roll subcommand");
        };
        assert_eq!(roll.config_profile.as_deref(), Some("slow"));
        assert_eq!(roll.seed, Some(3));
    }

    #[test]
    fn subcommand_options_beat_root_options() {
        let cli = MultitoolCli::try_parse_from([
            "dieroll", "-p", "slow", "--seed", "3", "config", "-p", "fast", "--seed", "9",
        ])
        .unwrap();
        let mut subcommand = cli.subcommand.unwrap();
        forward_root_options(&mut subcommand, cli.config_overrides, cli.interactive);
        let Subcommand::Config(config) = subcommand else {
            panic!("expected the config subcommand");
        };
        assert_eq!(config.config_profile.as_deref(), Some("fast"));
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn zero_rolls_is_rejected() {
        assert!(MultitoolCli::try_parse_from(["dieroll", "roll", "--count", "0"]).is_err());
    }
}
