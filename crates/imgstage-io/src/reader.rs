//! File reader adapters: turn a selected file into a local preview URL.

use std::rc::Rc;

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use imgstage_core::{ReadError, StagedFile, StagerConfig, preview};

/// Produces short-lived preview URLs for selected files.
///
/// Reads are asynchronous and may complete out of order; the stager
/// discards outcomes for superseded selections, so implementations need
/// no ordering of their own.
pub trait FileReader {
    /// Read `file` and return a URL an `<img>` can render.
    fn read<'a>(&'a self, file: &'a StagedFile) -> LocalBoxFuture<'a, Result<String, ReadError>>;

    /// A preview previously returned by [`read`](Self::read) is no
    /// longer displayed.
    fn release(&self, _preview_url: &str) {}
}

impl<R: FileReader + ?Sized> FileReader for Rc<R> {
    fn read<'a>(&'a self, file: &'a StagedFile) -> LocalBoxFuture<'a, Result<String, ReadError>> {
        (**self).read(file)
    }

    fn release(&self, preview_url: &str) {
        (**self).release(preview_url);
    }
}

/// Renders previews as base64 `data:` URIs.
///
/// Works on every target and needs no cleanup, at the cost of holding
/// the encoded image in the URL string.
#[derive(Debug, Clone, Default)]
pub struct DataUriReader {
    config: StagerConfig,
}

impl DataUriReader {
    /// Create a reader accepting the formats in `config`.
    #[must_use]
    pub const fn new(config: StagerConfig) -> Self {
        Self { config }
    }
}

impl FileReader for DataUriReader {
    fn read<'a>(&'a self, file: &'a StagedFile) -> LocalBoxFuture<'a, Result<String, ReadError>> {
        future::ready(preview::data_uri(file, &self.config)).boxed_local()
    }
}
