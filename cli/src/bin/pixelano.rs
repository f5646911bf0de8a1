use std::ffi::OsString;

use clap::{CommandFactory, Parser};
use color_eyre::eyre::{Result, eyre};
use pixelano_cli::{Cli, normalize_args, run};
use tracing::info;
use tracing_subscriber::{self, EnvFilter};

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let args: Vec<OsString> = std::env::args_os().collect();
    if args.len() < 2 {
        Cli::command().print_help()?;
        return Ok(());
    }

    let cli = Cli::parse_from(normalize_args(args));
    let Some(plan) = cli.into_plan()? else {
        return Ok(());
    };

    let report = run(&plan)?;
    info!("✅ {} annotations written to {}", report.processed.len(), plan.output.display());

    if !report.is_success() {
        return Err(eyre!(
            "{} of {} inputs failed",
            report.failed.len(),
            report.failed.len() + report.processed.len()
        ));
    }

    Ok(())
}
