use std::process::ExitCode;

use clap::Parser;
use flow_chat::logging::setup_logging;
use flow_chat::{run, Args};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    setup_logging(args.verbose);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("Error: {}", error.user_message());
            ExitCode::FAILURE
        }
    }
}
