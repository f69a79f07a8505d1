//! imgstage-io: Async adapters and Dioxus components for imgstage.
//!
//! Performs the effects requested by the `imgstage-core` reducer:
//! reading selected files into preview URLs, uploading confirmed files
//! through a pluggable transport, and writing committed keys into a
//! bound form field. [`ImageUploadStager`] drives the reducer headlessly
//! on any single-threaded executor; [`EditPageHeaderImage`] is the
//! browser component.

pub mod browser;
pub mod components;
pub mod field;
pub mod reader;
pub mod stager;
pub mod transport;

pub use browser::BlobUrlReader;
pub use components::{EditPageHeaderImage, Notice, TransportHandle};
pub use field::{FieldBinder, FieldRule, Form, FormField, SubmitError};
pub use reader::{DataUriReader, FileReader};
pub use stager::ImageUploadStager;
pub use transport::{UploadError, UploadTransport};
