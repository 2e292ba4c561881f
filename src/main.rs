use clap::Parser;

use specmock::cli::{self, Args};
use specmock::status::ExitStatus;
use specmock::telemetry;

#[tokio::main]
async fn main() -> ExitStatus {
    let args = Args::parse();

    let level = if args.verbose { "info,specmock=debug" } else { "info" };
    if let Err(e) = telemetry::init(args.log_format.unwrap_or_default(), level) {
        eprintln!("specmock: {}", e);
        return ExitStatus::Error;
    }

    cli::run(args).await
}
