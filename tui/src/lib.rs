// Forbid accidental stdout/stderr writes in the *library* portion of the TUI.
// Stdout belongs to the alternate screen once the app is running.
#![deny(clippy::print_stdout, clippy::print_stderr)]
use std::fs::OpenOptions;

use dieroll_core::config::Config;
use dieroll_core::config::ConfigOverrides;
use tracing_appender::non_blocking;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod app;
mod app_event;
mod app_event_sender;
mod cli;
mod dice_widget;
mod faces;
mod haptics;
mod roll_screen;
mod style;
mod tui;

pub use cli::Cli;

const LOG_FILE_NAME: &str = "dieroll-tui.log";
const DEFAULT_LOG_FILTER: &str = "dieroll_core=info,dieroll_tui=info";

pub async fn run_main(cli: Cli) -> std::io::Result<()> {
    let overrides = ConfigOverrides {
        config_profile: cli.config_profile.clone(),
        seed: cli.seed,
    };

    // Parse `-c` overrides from the CLI.
    let cli_kv_overrides = match cli.config_overrides.parse_overrides() {
        Ok(v) => v,
        #[allow(clippy::print_stderr)]
        Err(e) => {
            eprintln!("Error parsing -c overrides: {e}");
            std::process::exit(1);
        }
    };

    let config = match Config::load_with_cli_overrides(cli_kv_overrides, overrides) {
        Ok(config) => config,
        #[allow(clippy::print_stderr)]
        Err(err) => {
            eprintln!("Error loading configuration: {err}");
            std::process::exit(1);
        }
    };

    let log_dir = config.log_dir();
    std::fs::create_dir_all(&log_dir)?;
    // Open (or create) your log file, appending to it.
    let mut log_file_opts = OpenOptions::new();
    log_file_opts.create(true).append(true);

    // Ensure the file is only readable and writable by the current user.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        log_file_opts.mode(0o600);
    }

    let log_file = log_file_opts.open(log_dir.join(LOG_FILE_NAME))?;

    // Wrap file in non‑blocking writer.
    let (non_blocking, _guard) = non_blocking(log_file);

    // use RUST_LOG env var, default to info for dieroll crates.
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_target(false)
        .with_ansi(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(file_layer).try_init();

    tracing::info!(
        profile = config.active_profile.as_deref().unwrap_or("(none)"),
        seed = ?config.seed,
        "starting dieroll-tui"
    );

    run_ratatui_app(config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))
}

async fn run_ratatui_app(config: Config) -> color_eyre::Result<()> {
    color_eyre::install()?;

    let terminal = tui::init()?;
    let mut tui = tui::Tui::new(terminal);
    let result = app::App::run(&mut tui, config).await;
    tui::restore()?;
    result
}
