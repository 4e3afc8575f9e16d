mod app;
mod busy;
mod cli;
mod config;
mod delivery;
mod domain;
mod export;
mod localize;
mod render;
mod store;

use std::process::ExitCode;

use clap::Parser;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();
    localize::localize();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(err) => {
            log::error!("Failed to start runtime: {}", err);
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(app::run(cli)) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("planmark: {err:#}");
            ExitCode::FAILURE
        }
    }
}
