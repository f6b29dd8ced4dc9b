use demsync_core::logging;

mod cli;

use crate::cli::CliCommand;

// Every entry is a future on the main task; one thread is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Initialize logging as early as possible; fall back to stderr if the log file is unavailable.
    if let Err(err) = logging::init_logging() {
        logging::init_logging_stderr();
        tracing::warn!("file logging unavailable, using stderr: {:#}", err);
    }

    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("demsync error: {:#}", err);
        std::process::exit(1);
    }
}
