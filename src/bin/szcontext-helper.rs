use anyhow::Result;
use clap::Parser;
use szcontext::Config;
use szcontext::cli::HelperCli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = HelperCli::parse();
    let mut config = Config::load_or_init()?;
    config.apply_env_overrides();
    szcontext::observability::init(&config.observability.log_level);

    szcontext::app::dispatch::dispatch_helper(cli, config).await
}
