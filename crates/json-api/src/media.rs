//! Base64 image bodies.

use salvo::{
    Request, handler,
    http::StatusError,
    oapi::ToSchema,
    prelude::{Depot, FlowCtrl, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

use qrewards_app::media::{MediaError, MediaUpload};

use crate::extensions::*;

/// An uploaded image, base64 encoded.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MediaBody {
    /// `image/png`, `image/jpeg`, `image/webp` or `image/svg+xml`
    pub content_type: String,

    /// Base64 encoded image bytes
    pub data: String,
}

impl MediaBody {
    pub(crate) fn into_upload(self) -> Result<MediaUpload, StatusError> {
        MediaUpload::from_base64(&self.content_type, &self.data).or_400("invalid image")
    }
}

/// Raises the request body limit so base64 image bodies fit.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UploadLimit {
    max_bytes: usize,
}

impl UploadLimit {
    pub(crate) fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }
}

#[handler]
impl UploadLimit {
    async fn handle(
        &self,
        req: &mut Request,
        depot: &mut Depot,
        res: &mut Response,
        ctrl: &mut FlowCtrl,
    ) {
        req.set_secure_max_size(self.max_bytes);
        ctrl.call_next(req, depot, res).await;
    }
}

/// Decode an optional image field.
pub(crate) fn optional_upload(body: Option<MediaBody>) -> Result<Option<MediaUpload>, StatusError> {
    body.map(MediaBody::into_upload).transpose()
}

pub(crate) fn into_status_error(error: MediaError) -> StatusError {
    match error {
        MediaError::Io(source) => {
            error!("failed to store media: {source}");

            StatusError::internal_server_error()
        }
        rejected @ (MediaError::UnsupportedContentType(_)
        | MediaError::InvalidEncoding(_)
        | MediaError::Empty) => {
            StatusError::bad_request().brief(format!("invalid image: {rejected}"))
        }
    }
}
