//! Database Config

use clap::Args;

/// Database settings.
#[derive(Debug, Args)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Apply pending migrations before serving
    #[arg(long, env = "DATABASE_MIGRATE_ON_START", default_value_t = false)]
    pub migrate_on_start: bool,
}
