use anyhow::{Context, Result};
use clap::Parser;
use heart::cmd::{self, Cli};
use heart::config::Config;
use heart::logging;

fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command();

    let config = Config::from_env(command.sections()).context("failed to load configuration")?;
    logging::init(config.log_level);

    let workers = config.http.as_ref().map_or(1, |http| http.worker);
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(workers)
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    runtime.block_on(cmd::run(command, config))
}
