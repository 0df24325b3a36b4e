use mdrop_core::logging;

mod cli;

use clap::Parser;

use crate::cli::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging before anything else can emit events.
    if cli.log_stderr {
        logging::init_logging_stderr();
    } else {
        logging::init_logging_or_stderr();
    }

    if let Err(err) = cli.run().await {
        eprintln!("mdrop error: {:#}", err);
        std::process::exit(1);
    }
}
