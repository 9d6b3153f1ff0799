use std::process::ExitCode;

use clap::Parser;
use publish::{
    chain::HttpChain,
    cli::{Cli, Command},
    errors::ScriptError,
    utils::init_logging,
};

#[tokio::main]
async fn main() -> ExitCode {
    let Cli { log_level, command } = Cli::parse();
    init_logging(&log_level);

    match run(command).await {
        Ok(report) => {
            println!("{report}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Runs the command, returning the rendered report
async fn run(command: Command) -> Result<String, ScriptError> {
    let chain = HttpChain::new(command.rpc_url().clone())?;
    command.run(&chain).await?.to_json_pretty()
}
