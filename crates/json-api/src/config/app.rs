//! Application Config

use std::path::PathBuf;

use clap::Args;
use jiff::SignedDuration;
use qrewards_app::config::{AppConfig, Secret};

const SECONDS_PER_HOUR: i64 = 60 * 60;

const SECONDS_PER_DAY: i64 = 24 * SECONDS_PER_HOUR;

/// Settings handed to the rewards services.
#[derive(Debug, Args)]
pub struct ApplicationConfig {
    /// Administrator login email
    #[arg(long, env = "ADMIN_EMAIL")]
    pub admin_email: String,

    /// Administrator login password
    #[arg(long, env = "ADMIN_PASSWORD", hide_env_values = true)]
    pub admin_password: String,

    /// Secret mixed into issued QR payload hashes
    #[arg(long, env = "QR_SECRET", hide_env_values = true)]
    pub qr_secret: String,

    /// Lifetime of a login session in hours
    #[arg(long, env = "SESSION_TTL_HOURS", default_value_t = 24 * 30)]
    pub session_ttl_hours: u32,

    /// Days between a deletion request and the account being removed
    #[arg(long, env = "ACCOUNT_DELETION_GRACE_DAYS", default_value_t = 7)]
    pub account_deletion_grace_days: u32,

    /// Directory uploaded media is written to
    #[arg(long, env = "MEDIA_ROOT", default_value = "media")]
    pub media_root: PathBuf,

    /// Public URL prefix the media directory is served under
    #[arg(
        long,
        env = "MEDIA_PUBLIC_URL",
        default_value = "http://localhost:8698/media"
    )]
    pub media_public_url: String,

    /// Largest accepted request body in bytes, base64 image uploads included
    #[arg(long, env = "MAX_UPLOAD_BYTES", default_value_t = 16 * 1024 * 1024)]
    pub max_upload_bytes: usize,

    /// Seconds between account deletion sweeps
    #[arg(long, env = "DELETION_SWEEP_INTERVAL_SECS", default_value_t = 3_600)]
    pub deletion_sweep_interval_secs: u64,
}

impl ApplicationConfig {
    /// Build the explicit configuration the app services take.
    #[must_use]
    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            admin_email: self.admin_email.clone(),
            admin_password: Secret::new(self.admin_password.clone()),
            qr_secret: Secret::new(self.qr_secret.clone()),
            session_ttl: SignedDuration::from_secs(
                i64::from(self.session_ttl_hours) * SECONDS_PER_HOUR,
            ),
            deletion_grace_period: SignedDuration::from_secs(
                i64::from(self.account_deletion_grace_days) * SECONDS_PER_DAY,
            ),
            media_root: self.media_root.clone(),
            media_public_url: self.media_public_url.clone(),
        }
    }
}
