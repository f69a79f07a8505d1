//! The state owned by one upload stager.

use serde::Serialize;

use crate::types::{
    ImageReference, InitialImage, Phase, ReadError, SelectionToken, StagedFile, UploadStatus,
    ValidationError,
};

/// A file whose read succeeded, staged for confirm or cancel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Staged {
    /// The selection that produced this file.
    pub token: SelectionToken,
    /// The file itself.
    pub file: StagedFile,
    /// Local preview produced by the file reader.
    pub preview_url: String,
}

/// Everything an upload stager knows.
///
/// Fields are private; mutate only through [`crate::reduce`] so the
/// invariants below hold after every transition:
///
/// - While a file is staged, `preview_url` is that file's local preview.
/// - With nothing staged, `preview_url` is the committed URL, or the
///   initial URL if nothing was ever committed.
/// - The bound field's value is [`field_value`](Self::field_value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadStageState {
    pub(crate) initial: InitialImage,
    pub(crate) committed: Option<ImageReference>,
    pub(crate) staged: Option<Staged>,
    pub(crate) preview_url: Option<String>,
    pub(crate) upload_status: UploadStatus,
    pub(crate) read_error: Option<ReadError>,
    pub(crate) upload_error: Option<String>,
    /// Latest selection intent. Cancel also advances it.
    pub(crate) selection: SelectionToken,
    /// Selection whose read is still outstanding.
    pub(crate) reading: Option<SelectionToken>,
    /// Upload attempt counter; only the current attempt may settle.
    pub(crate) attempt: u64,
    /// Selection whose file the current attempt is uploading.
    pub(crate) uploading: Option<SelectionToken>,
}

impl UploadStageState {
    /// Fresh state for a newly mounted stager.
    ///
    /// When the initial image has both a key and a URL it counts as the
    /// committed reference.
    #[must_use]
    pub fn new(initial: InitialImage) -> Self {
        Self {
            committed: initial.reference(),
            preview_url: initial.url.clone(),
            initial,
            staged: None,
            upload_status: UploadStatus::Idle,
            read_error: None,
            upload_error: None,
            selection: SelectionToken::default(),
            reading: None,
            attempt: 0,
            uploading: None,
        }
    }

    /// The image the stager started with.
    #[must_use]
    pub const fn initial(&self) -> &InitialImage {
        &self.initial
    }

    /// The last committed reference, or the initial one.
    #[must_use]
    pub const fn committed(&self) -> Option<&ImageReference> {
        self.committed.as_ref()
    }

    /// The staged file with its preview, if any.
    #[must_use]
    pub const fn staged(&self) -> Option<&Staged> {
        self.staged.as_ref()
    }

    /// The staged file, if any.
    #[must_use]
    pub fn pending_file(&self) -> Option<&StagedFile> {
        self.staged.as_ref().map(|s| &s.file)
    }

    /// URL currently shown: a local preview or a committed URL.
    #[must_use]
    pub fn preview_url(&self) -> Option<&str> {
        self.preview_url.as_deref()
    }

    /// URL to render, falling back to `placeholder` when there is none.
    #[must_use]
    pub fn display_url<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.preview_url().unwrap_or(placeholder)
    }

    /// Whether the shown image is a local, unconfirmed preview.
    #[must_use]
    pub const fn is_local_preview(&self) -> bool {
        self.staged.is_some()
    }

    /// Status of the latest upload attempt.
    #[must_use]
    pub const fn upload_status(&self) -> UploadStatus {
        self.upload_status
    }

    /// Why the latest selection could not be read.
    #[must_use]
    pub const fn read_error(&self) -> Option<&ReadError> {
        self.read_error.as_ref()
    }

    /// The transport's message from the latest failed attempt.
    #[must_use]
    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    /// Latest selection token.
    #[must_use]
    pub const fn selection(&self) -> SelectionToken {
        self.selection
    }

    /// Whether a file read is outstanding.
    #[must_use]
    pub const fn is_reading(&self) -> bool {
        self.reading.is_some()
    }

    /// Number of upload attempts started so far.
    #[must_use]
    pub const fn attempts(&self) -> u64 {
        self.attempt
    }

    /// Value the bound form field must hold.
    ///
    /// The committed key, else the initial field value, else empty.
    #[must_use]
    pub fn field_value(&self) -> String {
        self.committed
            .as_ref()
            .map(|r| r.key.clone())
            .or_else(|| self.initial.key.clone())
            .unwrap_or_default()
    }

    /// URL shown once nothing is staged.
    pub(crate) fn fallback_url(&self) -> Option<String> {
        self.committed
            .as_ref()
            .map(|r| r.url.clone())
            .or_else(|| self.initial.url.clone())
    }

    /// A staged file can be confirmed right now.
    #[must_use]
    pub const fn can_confirm(&self) -> bool {
        self.staged.is_some() && !matches!(self.upload_status, UploadStatus::InFlight)
    }

    /// The staged file is the one the running upload is sending.
    #[must_use]
    pub const fn staged_is_uploading(&self) -> bool {
        match (&self.staged, self.uploading) {
            (Some(staged), Some(uploading)) => staged.token.get() == uploading.get(),
            _ => false,
        }
    }

    /// The staged file can be discarded right now.
    ///
    /// A file selected while an earlier one uploads can be; the file
    /// being uploaded cannot.
    #[must_use]
    pub const fn can_cancel(&self) -> bool {
        self.staged.is_some() && !self.staged_is_uploading()
    }

    /// Derived user-facing phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        if matches!(self.upload_status, UploadStatus::InFlight) {
            Phase::Uploading
        } else if self.staged.is_some() {
            Phase::Previewing
        } else if self.read_error.is_some() {
            Phase::Error
        } else if self.preview_url.is_some() || self.committed.is_some() {
            Phase::Committed
        } else {
            Phase::Empty
        }
    }

    /// Validation rule for the enclosing form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UploadPending`] while a file is staged
    /// but neither confirmed nor cancelled, including while it uploads.
    pub const fn validate(&self) -> Result<(), ValidationError> {
        if self.staged.is_some() {
            Err(ValidationError::UploadPending)
        } else {
            Ok(())
        }
    }
}

impl Default for UploadStageState {
    fn default() -> Self {
        Self::new(InitialImage::none())
    }
}
