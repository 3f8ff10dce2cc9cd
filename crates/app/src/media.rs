//! Media storage for uploaded and generated images.

use std::{io, path::PathBuf};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use mockall::automock;
use thiserror::Error;
use tokio::fs;
use tracing::warn;
use uuid::Uuid;

/// Folders media is grouped into.
pub mod folders {
    pub const CATEGORIES: &str = "categories";
    pub const DOCUMENTS: &str = "documents";
    pub const PRODUCTS: &str = "products";
    pub const PROMOTIONS: &str = "promotions";
    pub const QR_CODES: &str = "qr-codes";
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("media payload is not valid base64")]
    InvalidEncoding(#[source] base64::DecodeError),

    #[error("media payload is empty")]
    Empty,

    #[error("media storage failure")]
    Io(#[from] io::Error),
}

/// Image kinds the store accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Png,
    Jpeg,
    Webp,
    Svg,
}

impl MediaKind {
    /// Parse a MIME content type.
    ///
    /// # Errors
    ///
    /// Returns [`MediaError::UnsupportedContentType`] for anything other than the
    /// supported image types.
    pub fn from_content_type(content_type: &str) -> Result<Self, MediaError> {
        match content_type.trim().to_ascii_lowercase().as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/webp" => Ok(Self::Webp),
            "image/svg+xml" => Ok(Self::Svg),
            _ => Err(MediaError::UnsupportedContentType(content_type.to_string())),
        }
    }

    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Svg => "svg",
        }
    }
}

/// A decoded upload, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub kind: MediaKind,
    pub bytes: Vec<u8>,
}

impl MediaUpload {
    /// Decode a base64 upload body.
    ///
    /// # Errors
    ///
    /// Returns an error for unsupported content types, bad base64 or an empty body.
    pub fn from_base64(content_type: &str, data: &str) -> Result<Self, MediaError> {
        let kind = MediaKind::from_content_type(content_type)?;

        let bytes = BASE64
            .decode(data.trim())
            .map_err(MediaError::InvalidEncoding)?;

        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }

        Ok(Self { kind, bytes })
    }

    #[must_use]
    pub fn svg(document: String) -> Self {
        Self {
            kind: MediaKind::Svg,
            bytes: document.into_bytes(),
        }
    }
}

#[automock]
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store an upload under `folder`, returning its public URL.
    async fn put(&self, folder: &'static str, upload: MediaUpload) -> Result<String, MediaError>;

    /// Release a previously stored file. Failures are logged and swallowed.
    async fn remove(&self, url: &str);
}

/// Stores media on the local filesystem.
#[derive(Debug, Clone)]
pub struct FsMediaStore {
    root: PathBuf,
    public_url: String,
}

impl FsMediaStore {
    #[must_use]
    pub fn new(root: PathBuf, public_url: &str) -> Self {
        Self {
            root,
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    fn path_for_url(&self, url: &str) -> Option<PathBuf> {
        let relative = url.strip_prefix(&self.public_url)?.trim_start_matches('/');

        let mut segments = relative.split('/');
        let folder = segments.next()?;
        let file = segments.next()?;

        let safe = |segment: &str| {
            !segment.is_empty()
                && segment
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
                && !segment.starts_with('.')
        };

        if segments.next().is_some() || !safe(folder) || !safe(file) {
            return None;
        }

        Some(self.root.join(folder).join(file))
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn put(&self, folder: &'static str, upload: MediaUpload) -> Result<String, MediaError> {
        let directory = self.root.join(folder);

        fs::create_dir_all(&directory).await?;

        let file_name = format!("{}.{}", Uuid::now_v7().simple(), upload.kind.extension());

        fs::write(directory.join(&file_name), &upload.bytes).await?;

        Ok(format!("{}/{folder}/{file_name}", self.public_url))
    }

    async fn remove(&self, url: &str) {
        let Some(path) = self.path_for_url(url) else {
            warn!(url, "refusing to remove media outside the store");

            return;
        };

        if let Err(source) = fs::remove_file(&path).await
            && source.kind() != io::ErrorKind::NotFound
        {
            warn!(url, "failed to remove media: {source}");
        }
    }
}
