//! Shared types for the upload staging workflow.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::messages;

/// A persisted image returned by the upload transport.
///
/// `key` is what the enclosing form stores; `url` is publicly fetchable
/// and is what gets displayed once the upload is committed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageReference {
    /// Stable server-side identifier, bound to the form field.
    pub key: String,
    /// Publicly fetchable URL of the full-size image.
    #[serde(alias = "full_url")]
    pub url: String,
}

impl ImageReference {
    /// Create a new reference.
    #[must_use]
    pub fn new(key: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            url: url.into(),
        }
    }
}

/// The image a stager starts out with, before any user interaction.
///
/// Either half may be missing: a page can have a header image to show
/// without the form knowing its key, and vice versa.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialImage {
    /// Preview URL to display initially.
    pub url: Option<String>,
    /// Initial value of the bound form field.
    pub key: Option<String>,
}

impl InitialImage {
    /// No initial image at all.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            url: None,
            key: None,
        }
    }

    /// Start from an existing committed reference.
    #[must_use]
    pub fn from_reference(reference: ImageReference) -> Self {
        Self {
            url: Some(reference.url),
            key: Some(reference.key),
        }
    }

    /// The full reference, when both key and URL are known.
    #[must_use]
    pub fn reference(&self) -> Option<ImageReference> {
        match (&self.key, &self.url) {
            (Some(key), Some(url)) => Some(ImageReference::new(key.clone(), url.clone())),
            _ => None,
        }
    }
}

/// A local file chosen by the user.
///
/// The bytes are shared, so cloning a staged file for an upload attempt
/// or a retry does not copy the image data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    name: String,
    #[serde(skip)]
    bytes: Arc<[u8]>,
    size: usize,
}

impl StagedFile {
    /// Wrap a file name and its raw bytes.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            size: bytes.len(),
            bytes,
        }
    }

    /// File name as reported by the picker.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw file contents.
    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` for a zero-byte file.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }
}

/// Identifies one file selection.
///
/// Tokens increase monotonically per stager. A read outcome is applied
/// only if it carries the latest token; anything older is stale.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SelectionToken(u64);

impl SelectionToken {
    /// The token that follows this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Status of the most recent upload attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadStatus {
    /// No attempt since the last selection or cancel.
    #[default]
    Idle,
    /// An attempt is running; further confirms are ignored.
    InFlight,
    /// The last attempt committed its reference.
    Succeeded,
    /// The last attempt failed; the file is still staged for retry.
    Failed,
}

/// User-facing phase of the stager, derived from its state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing to show and nothing staged.
    Empty,
    /// A local preview is staged, awaiting confirm or cancel.
    Previewing,
    /// The staged file is being uploaded.
    Uploading,
    /// Showing a committed (or initial) image.
    Committed,
    /// The last selection could not be read; nothing is staged.
    Error,
}

/// A selected file could not be turned into a preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReadError {
    /// The file has no contents.
    #[error("{}", messages::COULDNT_READ_FILE)]
    Empty,

    /// The contents are not a decodable image.
    #[error("{}", messages::COULDNT_READ_FILE)]
    Unreadable {
        /// Decoder or platform detail, kept for logs.
        detail: String,
    },

    /// The contents are an image, but not in an accepted format.
    #[error("{} ({format})", messages::UNSUPPORTED_IMAGE)]
    UnsupportedFormat {
        /// Detected format name.
        format: String,
    },
}

impl From<image::ImageError> for ReadError {
    fn from(err: image::ImageError) -> Self {
        Self::Unreadable {
            detail: err.to_string(),
        }
    }
}

/// An action was dispatched in a state where it is not allowed.
///
/// These are contract violations by the front end, not user-facing
/// errors: a UI that only offers confirm/cancel while a file is staged
/// never produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TransitionError {
    /// Confirm or cancel with no staged file.
    #[error("{}", messages::NO_VALID_FILE)]
    NothingStaged,

    /// Cancel while the staged file is being uploaded.
    #[error("{}", messages::UPLOAD_IN_PROGRESS)]
    UploadInFlight,
}

/// The bound field blocks form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error, Serialize, Deserialize)]
pub enum ValidationError {
    /// A file is staged but was neither confirmed nor cancelled.
    #[error("{}", messages::UPLOAD_PENDING_ERROR)]
    UploadPending,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn initial_reference_needs_both_halves() {
        let only_url = InitialImage {
            url: Some("https://x/orig.png".into()),
            key: None,
        };
        assert_eq!(only_url.reference(), None);

        let full = InitialImage::from_reference(ImageReference::new("orig", "https://x/orig.png"));
        assert_eq!(
            full.reference(),
            Some(ImageReference::new("orig", "https://x/orig.png"))
        );
    }

    #[test]
    fn selection_tokens_increase() {
        let first = SelectionToken::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.get(), first.get() + 1);
    }

    #[test]
    fn staged_file_clone_shares_bytes() {
        let file = StagedFile::new("a.png", vec![1, 2, 3]);
        let copy = file.clone();
        assert_eq!(copy.bytes().as_ptr(), file.bytes().as_ptr());
        assert_eq!(copy.len(), 3);
        assert!(!copy.is_empty());
    }

    #[test]
    fn reference_accepts_full_url_field() {
        let json = r#"{"key":"abc","full_url":"https://x/abc.png"}"#;
        let reference: ImageReference = serde_json::from_str(json).unwrap();
        assert_eq!(reference, ImageReference::new("abc", "https://x/abc.png"));
    }

    #[test]
    fn read_errors_show_user_message() {
        let err = ReadError::Unreadable {
            detail: "bad magic".into(),
        };
        assert_eq!(err.to_string(), messages::COULDNT_READ_FILE);
        assert_eq!(ReadError::Empty.to_string(), messages::COULDNT_READ_FILE);
    }
}
