use clap::Parser;
use dieroll_common::CliConfigOverrides;
use dieroll_tui::Cli;
use dieroll_tui::run_main;

#[derive(Parser, Debug)]
#[command(version)]
struct TopCli {
    #[clap(flatten)]
    config_overrides: CliConfigOverrides,

    #[clap(flatten)]
    inner: Cli,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let top_cli = TopCli::parse();
    let mut inner = top_cli.inner;
    inner
        .config_overrides
        .raw_overrides
        .splice(0..0, top_cli.config_overrides.raw_overrides);
    run_main(inner).await?;
    Ok(())
}
