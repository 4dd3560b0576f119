mod app;
mod config;
mod logging;
mod services;

use crate::config::AppConfig;
use anyhow::{anyhow, Result};
use std::panic;
use std::process::ExitCode;

fn main() -> ExitCode {
    panic::set_hook(Box::new(|info| {
        eprintln!("dashboard-backup panic: {info}");
        if let Some(location) = info.location() {
            eprintln!(
                "  at {}:{}",
                location.file(),
                location.line()
            );
        }
    }));

    logging::init();

    match backup() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn backup() -> Result<()> {
    let settings = AppConfig::load()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| anyhow!("failed to start async runtime: {err}"))?;

    runtime.block_on(app::run(&settings))?;
    Ok(())
}
