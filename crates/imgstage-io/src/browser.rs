//! Blob URL previews for the browser.
//!
//! Checks the selected file's header, wraps its bytes in a `Blob` with
//! the sniffed MIME type and hands out an object URL for it. The body is
//! never decoded here; the `<img>` decodes it.
//!
//! Object URLs pin the blob in memory until revoked, so
//! [`BlobUrlReader::release`] revokes them as soon as the stager stops
//! showing a preview.
//!
//! All browser calls require a `wasm32-unknown-unknown` target.

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use imgstage_core::{ReadError, StagedFile, StagerConfig, preview};
use wasm_bindgen::JsValue;
use web_sys::BlobPropertyBag;

use crate::reader::FileReader;

/// Reads selected files into revocable `blob:` URLs.
#[derive(Debug, Clone, Default)]
pub struct BlobUrlReader {
    config: StagerConfig,
}

impl BlobUrlReader {
    /// Create a reader accepting the formats in `config`.
    #[must_use]
    pub const fn new(config: StagerConfig) -> Self {
        Self { config }
    }

    fn object_url(&self, file: &StagedFile) -> Result<String, ReadError> {
        let format = preview::sniff(file.bytes(), &self.config)?;

        let uint8_array = js_sys::Uint8Array::from(file.bytes());
        let parts = js_sys::Array::new();
        parts.push(&uint8_array);

        let opts = BlobPropertyBag::new();
        opts.set_type(format.mime_type());
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &opts)
            .map_err(js_read_error)?;

        web_sys::Url::create_object_url_with_blob(&blob).map_err(js_read_error)
    }
}

impl FileReader for BlobUrlReader {
    fn read<'a>(&'a self, file: &'a StagedFile) -> LocalBoxFuture<'a, Result<String, ReadError>> {
        future::ready(self.object_url(file)).boxed_local()
    }

    /// Best-effort: only `blob:` URLs are revoked, and failures are
    /// ignored since the URL may already be gone.
    fn release(&self, preview_url: &str) {
        if preview_url.starts_with("blob:") {
            let _ = web_sys::Url::revoke_object_url(preview_url);
        }
    }
}

fn js_read_error(value: JsValue) -> ReadError {
    web_sys::console::warn_1(&value);
    ReadError::Unreadable {
        detail: format!("{value:?}"),
    }
}
