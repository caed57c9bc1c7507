use std::process::ExitCode;

use clap::Parser;
use workout_tracker_lib::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
  let cli = Cli::parse();
  workout_tracker_lib::init_tracing();

  match workout_tracker_lib::run(cli).await {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      tracing::error!("{}", e);
      ExitCode::FAILURE
    }
  }
}
