//! Upload transport seam.

use std::rc::Rc;

use futures::future::LocalBoxFuture;
use imgstage_core::{ImageReference, StagedFile};

/// Errors reported by an upload transport.
///
/// The `Display` output is shown to the user verbatim, so transports
/// should put a human-readable message in it.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The remote end rejected or failed the upload.
    #[error("{0}")]
    Transport(String),

    /// A local I/O failure while storing or sending the file.
    #[error("upload failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Persists a staged file and returns where it now lives.
///
/// Each call creates an independent reference, so retrying after a
/// failure is safe; references that are never committed are simply
/// not bound to the form.
pub trait UploadTransport {
    /// Upload `file`.
    fn upload<'a>(
        &'a self,
        file: &'a StagedFile,
    ) -> LocalBoxFuture<'a, Result<ImageReference, UploadError>>;
}

impl<T: UploadTransport + ?Sized> UploadTransport for Rc<T> {
    fn upload<'a>(
        &'a self,
        file: &'a StagedFile,
    ) -> LocalBoxFuture<'a, Result<ImageReference, UploadError>> {
        (**self).upload(file)
    }
}
