use std::process::ExitCode;

use anyhow::{Context, Result};
use emojivur::app::App;
use emojivur::cli::{self, Cli};
use emojivur::error::{EXIT_FAILURE, EmojivurError};
use emojivur::logging;

fn main() -> ExitCode {
    // Process CLI arguments first (before logging init for cleaner output)
    let cli = match cli::process_cli() {
        cli::CliResult::Exit(code) => return ExitCode::from(code),
        cli::CliResult::Continue(cli) => cli,
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = e
                .downcast_ref::<EmojivurError>()
                .map(EmojivurError::exit_code)
                .unwrap_or(EXIT_FAILURE);
            eprintln!("[ERROR] {e:#} ({code})");
            ExitCode::from(code)
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = cli
        .load_config()
        .map_err(EmojivurError::from)
        .context("Failed to load configuration")?;
    logging::init(logging::effective_level(cli.log_level, config.log_level));

    log::info!("Starting emojivur v{}", emojivur::VERSION);
    let options = cli.into_options(&config);
    log::debug!("Run options: {:?}", options);

    App::new(options).run()?;

    log::info!("Done");
    Ok(())
}
