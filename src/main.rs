use std::process::ExitCode;

use clap::Parser;
use seqtrack_rs::config::{Cli, RunConfig, USAGE};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match RunConfig::from_tokens(cli.tokens.as_slice()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{} failed: {e}", e.stage());
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };
    log::info!("data directory = {}", config.data_dir.display());

    match seqtrack_rs::session::run(&config) {
        Ok(report) => {
            log::info!(
                "wrote {} regions to {}",
                report.frames,
                config.output_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{} failed: {e}", e.stage());
            ExitCode::FAILURE
        }
    }
}
