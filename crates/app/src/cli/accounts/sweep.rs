use std::{path::PathBuf, sync::Arc};

use clap::Args;
use jiff::{SignedDuration, Timestamp};
use qrewards_app::{
    database::{self, Db},
    domain::users::{PgUsersService, UsersService},
    media::FsMediaStore,
};

#[derive(Debug, Args)]
pub(crate) struct SweepArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Directory uploaded documents are stored in
    #[arg(long, env = "MEDIA_ROOT", default_value = "media")]
    media_root: PathBuf,

    /// Public URL prefix the media directory is served under
    #[arg(long, env = "MEDIA_PUBLIC_URL", default_value = "http://localhost:8698/media")]
    media_public_url: String,
}

#[expect(clippy::print_stdout, reason = "CLI output is the command result")]
pub(crate) async fn run(args: SweepArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let media = Arc::new(FsMediaStore::new(args.media_root, &args.media_public_url));

    // The grace period only matters when scheduling, never when sweeping.
    let service = PgUsersService::new(Db::new(pool), media, SignedDuration::ZERO);

    let deleted = service
        .sweep_deletions(Timestamp::now())
        .await
        .map_err(|error| format!("failed to sweep accounts: {error}"))?;

    println!("deleted_accounts: {deleted}");

    Ok(())
}
