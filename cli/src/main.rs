//! `qrdash` - manage QR codes against a record service.

use std::process::ExitCode;

use clap::Parser;
use qrdash::cli::Cli;
use qrdash::{init_logging, App, Config, StdinConfirm};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbosity());

    let config = match Config::load_from(cli.config.clone()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let app = App::new(config);
    match app.execute(cli.command, &StdinConfirm).await {
        Ok(output) => {
            print!("{output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
