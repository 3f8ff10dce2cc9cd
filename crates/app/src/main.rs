//! QR Rewards administration CLI

use std::process::ExitCode;

use clap::Parser;

mod cli;

#[tokio::main]
pub async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    match cli::Cli::parse().run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            #[expect(clippy::print_stderr, reason = "CLI reports failures on stderr")]
            {
                eprintln!("{error}");
            }

            ExitCode::FAILURE
        }
    }
}
