//! Application Config

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::PathBuf,
};

use jiff::SignedDuration;
use zeroize::Zeroize;

/// Settings the domain services need at runtime.
///
/// Built once by the binary that owns the process and passed down by reference;
/// services never consult the environment themselves.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Admin login email.
    pub admin_email: String,

    /// Admin login password.
    pub admin_password: Secret,

    /// Shared secret mixed into the QR payload hash.
    pub qr_secret: Secret,

    /// How long an issued session token stays valid.
    pub session_ttl: SignedDuration,

    /// Delay between a deletion request and the account being swept.
    pub deletion_grace_period: SignedDuration,

    /// Directory uploaded media is written to.
    pub media_root: PathBuf,

    /// Public URL prefix the media directory is served under.
    pub media_public_url: String,
}

/// Configuration string that is redacted in debug output and wiped on drop.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for Secret {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str("Secret(**redacted**)")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}
