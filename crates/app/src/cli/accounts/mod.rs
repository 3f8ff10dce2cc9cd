use clap::{Args, Subcommand};

mod sweep;

#[derive(Debug, Args)]
pub(crate) struct AccountsCommand {
    #[command(subcommand)]
    command: AccountsSubcommand,
}

#[derive(Debug, Subcommand)]
enum AccountsSubcommand {
    /// Delete accounts whose deletion grace period has run out
    Sweep(sweep::SweepArgs),
}

pub(crate) async fn run(command: AccountsCommand) -> Result<(), String> {
    match command.command {
        AccountsSubcommand::Sweep(args) => sweep::run(args).await,
    }
}
