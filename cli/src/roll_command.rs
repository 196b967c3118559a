use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use dieroll_common::CliConfigOverrides;
use dieroll_core::FaceId;
use dieroll_core::RollOutcome;
use dieroll_core::RollSequencer;
use dieroll_core::config::Config;
use dieroll_core::config::ConfigOverrides;
use dieroll_core::haptics::NoopHaptics;
use owo_colors::OwoColorize;
use owo_colors::Stream;
use tokio::select;
use tracing_subscriber::EnvFilter;

/// Roll the die without the interactive screen.
#[derive(Debug, Default, clap::Parser)]
pub struct RollCommand {
    #[clap(skip)]
    pub config_overrides: CliConfigOverrides,

    /// Number of rolls, performed one after the other.
    #[arg(long = "count", short = 'n', default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..))]
    pub count: u32,

    /// Print only the settled face of each roll.
    #[arg(long = "quiet", short = 'q')]
    pub quiet: bool,

    /// Configuration profile from config.toml to use.
    #[arg(long = "profile", short = 'p')]
    pub config_profile: Option<String>,

    /// Seed the face generator for a reproducible sequence.
    #[arg(long = "seed")]
    pub seed: Option<u64>,
}

pub async fn run_roll(cmd: RollCommand) -> anyhow::Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(env_filter)
        .try_init();

    let RollCommand {
        config_overrides,
        count,
        quiet,
        config_profile,
        seed,
    } = cmd;
    let cli_overrides = config_overrides
        .parse_overrides()
        .map_err(anyhow::Error::msg)?;
    let config = Config::load_with_cli_overrides(
        cli_overrides,
        ConfigOverrides {
            config_profile,
            seed,
        },
    )
    .context("failed to load configuration")?;

    let sequencer = RollSequencer::from_config(&config, Arc::new(NoopHaptics));
    let mut out = std::io::stdout();
    for _ in 0..count {
        let outcome = roll_once(&sequencer, quiet, &mut out).await?;
        tracing::info!(
            roll_id = outcome.roll_id,
            face = outcome.face.value(),
            "roll settled"
        );
        if quiet {
            writeln!(out, "{}", outcome.face)?;
        } else {
            writeln!(
                out,
                "rolled {}",
                outcome
                    .face
                    .if_supports_color(Stream::Stdout, |face| face.bold())
            )?;
        }
    }
    Ok(())
}

/// Start one roll and wait for it to settle, echoing every face the shuffle
/// shows unless `quiet`. The face left over from the previous roll is not
/// part of the shuffle and is never echoed.
async fn roll_once(
    sequencer: &RollSequencer,
    quiet: bool,
    out: &mut impl Write,
) -> anyhow::Result<RollOutcome> {
    let mut state_rx = sequencer.subscribe();
    let mut outcome_rx = sequencer.subscribe_outcomes();
    let mut last_face: FaceId = state_rx.borrow_and_update().current_face;
    sequencer.start();

    let mut echoed_any = false;
    loop {
        select! {
            biased;

            outcome = outcome_rx.recv() => {
                let outcome = outcome?;
                if echoed_any {
                    writeln!(out)?;
                }
                return Ok(outcome);
            }
            changed = state_rx.changed() => {
                changed?;
                let state = *state_rx.borrow_and_update();
                if quiet || !state.is_rolling() || state.current_face == last_face {
                    continue;
                }
                if echoed_any {
                    write!(out, " ")?;
                }
                write!(out, "{}", state.current_face)?;
                out.flush()?;
                last_face = state.current_face;
                echoed_any = true;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dieroll_core::RollState;
    use dieroll_core::haptics::HapticRequest;
    use dieroll_core::random::RandomSource;
    use dieroll_core::timing::RollTiming;
    use pretty_assertions::assert_eq;

    struct ConstantRandom(f64);

    impl RandomSource for ConstantRandom {
        fn sample(&mut self) -> f64 {
            self.0
        }
    }

    fn sequencer_showing(face: FaceId, sample: f64) -> RollSequencer {
        RollSequencer::with_initial_state(
            RollTiming::default(),
            Arc::new(NoopHaptics),
            HapticRequest::default(),
            Box::new(ConstantRandom(sample)),
            RollState::with_face(face),
        )
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn shuffle_echo_starts_with_a_drawn_face() -> anyhow::Result<()> {
        let sequencer = sequencer_showing(FaceId::SIX, 0.0);
        let mut out = Vec::new();

        let outcome = roll_once(&sequencer, false, &mut out).await?;

        assert_eq!(outcome.face, FaceId::ONE);
        assert_eq!(String::from_utf8(out)?, "1\n");
        Ok(())
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn previous_face_is_not_echoed() -> anyhow::Result<()> {
        let sequencer = sequencer_showing(FaceId::SIX, 0.99);
        let mut out = Vec::new();

        let outcome = roll_once(&sequencer, false, &mut out).await?;

        assert_eq!(outcome.face, FaceId::SIX);
        assert!(out.is_empty());
        Ok(())
    }

    #[tokio::test(flavor = "current_thread", start_paused = true)]
    async fn quiet_rolls_echo_nothing() -> anyhow::Result<()> {
        let sequencer = sequencer_showing(FaceId::SIX, 0.0);
        let mut out = Vec::new();

        roll_once(&sequencer, true, &mut out).await?;

        assert!(out.is_empty());
        Ok(())
    }
}
