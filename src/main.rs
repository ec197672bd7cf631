use anyhow::Result;
use clap::Parser;
use szcontext::Config;
use szcontext::cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load_or_init()?;
    config.apply_env_overrides();
    szcontext::observability::init(&config.observability.log_level);

    szcontext::app::dispatch::dispatch(cli, config).await
}
