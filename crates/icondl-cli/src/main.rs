use clap::Parser;
use icondl_core::finalize::EXIT_FAILURE;
use icondl_core::logging;

mod cli;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // --debug logs to stderr; otherwise to the state-dir log file, falling
    // back to stderr (warnings only) if that cannot be opened.
    if cli.debug {
        logging::init_logging_stderr(true);
    } else if logging::init_logging().is_err() {
        logging::init_logging_stderr(false);
    }

    match cli.run().await {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("icondl error: {:#}", err);
            std::process::exit(EXIT_FAILURE);
        }
    }
}
