//! Pure transition function for the upload stager.
//!
//! [`reduce`] applies one [`Action`] to an [`UploadStageState`] and
//! returns the [`Effect`]s the front end must perform. The two
//! asynchronous boundaries, reading a file and uploading it, are
//! requested as [`Effect::Read`] and [`Effect::Upload`]; their outcomes
//! come back as actions carrying the token or attempt they were issued
//! with, and outcomes that are no longer current are discarded.
//!
//! ```rust
//! # use imgstage_core::{reduce, Action, Effect, ImageReference, StagedFile, UploadStageState};
//! let mut state = UploadStageState::default();
//! let file = StagedFile::new("a.png", vec![0u8; 4]);
//!
//! let effects = reduce(&mut state, Action::Select(Some(file.clone()))).unwrap();
//! let Some(Effect::Read { token, .. }) = effects.into_iter().next() else { unreachable!() };
//! reduce(&mut state, Action::ReadSucceeded { token, file, preview_url: "data:a".into() }).unwrap();
//! assert_eq!(state.preview_url(), Some("data:a"));
//! ```

use crate::state::{Staged, UploadStageState};
use crate::types::{
    ImageReference, ReadError, SelectionToken, StagedFile, TransitionError, UploadStatus,
};

/// Something that happened to the stager: user intent or an I/O outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The user picked a file, or cleared the picker with `None`.
    Select(Option<StagedFile>),

    /// The user picked a file, but its contents could not be obtained
    /// at all (e.g. the platform failed to hand over the bytes).
    SelectFailed(ReadError),

    /// A preview was produced for the selection `token`.
    ReadSucceeded {
        /// Token from the originating [`Effect::Read`].
        token: SelectionToken,
        /// The file that was read.
        file: StagedFile,
        /// Local preview URL.
        preview_url: String,
    },

    /// The selection `token` could not be read.
    ReadFailed {
        /// Token from the originating [`Effect::Read`].
        token: SelectionToken,
        /// Why the read failed.
        error: ReadError,
    },

    /// Upload the staged file.
    Confirm,

    /// The upload for `attempt` persisted the file.
    UploadSucceeded {
        /// Attempt from the originating [`Effect::Upload`].
        attempt: u64,
        /// Where the file now lives.
        reference: ImageReference,
    },

    /// The upload for `attempt` failed.
    UploadFailed {
        /// Attempt from the originating [`Effect::Upload`].
        attempt: u64,
        /// Human-readable transport message.
        message: String,
    },

    /// Discard the staged file and revert to the committed image.
    Cancel,

    /// Hide the read error notice.
    DismissReadError,

    /// Hide the upload error notice.
    DismissUploadError,
}

/// Work the front end must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Produce a local preview of `file` and report back with `token`.
    Read {
        /// Selection this read belongs to.
        token: SelectionToken,
        /// File to read.
        file: StagedFile,
    },

    /// Upload `file` and report back with `attempt`.
    Upload {
        /// Attempt number this upload belongs to.
        attempt: u64,
        /// File to upload.
        file: StagedFile,
    },

    /// Set the bound form field to this value.
    SetField(String),

    /// A local preview is no longer shown and may be released.
    Release(String),

    /// An upload was committed; notify the host.
    Committed(ImageReference),
}

impl Effect {
    /// Whether performing this effect suspends.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Upload { .. })
    }
}

/// Apply `action` to `state`.
///
/// Outcomes for superseded selections or upload attempts leave the
/// state untouched (a stale preview is returned as [`Effect::Release`]
/// so it can be freed).
///
/// # Errors
///
/// Returns [`TransitionError::NothingStaged`] for [`Action::Confirm`] or
/// [`Action::Cancel`] with no staged file, and
/// [`TransitionError::UploadInFlight`] for [`Action::Cancel`] while the
/// staged file is uploading. The state is unchanged on error.
pub fn reduce(
    state: &mut UploadStageState,
    action: Action,
) -> Result<Vec<Effect>, TransitionError> {
    match action {
        Action::Select(Some(file)) => Ok(select(state, file)),
        Action::Select(None) => Ok(clear_selection(state)),
        Action::SelectFailed(error) => {
            supersede_reads(state);
            state.read_error = Some(error);
            Ok(Vec::new())
        }
        Action::ReadSucceeded {
            token,
            file,
            preview_url,
        } => Ok(read_succeeded(state, token, file, preview_url)),
        Action::ReadFailed { token, error } => {
            if state.selection == token {
                state.reading = None;
                state.read_error = Some(error);
            }
            Ok(Vec::new())
        }
        Action::Confirm => confirm(state),
        Action::UploadSucceeded { attempt, reference } => {
            Ok(upload_succeeded(state, attempt, reference))
        }
        Action::UploadFailed { attempt, message } => {
            if is_current_attempt(state, attempt) {
                state.upload_status = UploadStatus::Failed;
                state.upload_error = Some(message);
                state.uploading = None;
            }
            Ok(Vec::new())
        }
        Action::Cancel => cancel(state),
        Action::DismissReadError => {
            state.read_error = None;
            Ok(Vec::new())
        }
        Action::DismissUploadError => {
            state.upload_error = None;
            Ok(Vec::new())
        }
    }
}

/// Start a new selection; any read still outstanding becomes stale.
fn select(state: &mut UploadStageState, file: StagedFile) -> Vec<Effect> {
    let token = state.selection.next();
    state.selection = token;
    state.reading = Some(token);
    vec![Effect::Read { token, file }]
}

fn supersede_reads(state: &mut UploadStageState) {
    state.selection = state.selection.next();
    state.reading = None;
}

/// The picker was cleared: drop outstanding reads and, unless the staged
/// file is uploading, the staged file too.
fn clear_selection(state: &mut UploadStageState) -> Vec<Effect> {
    if state.can_cancel() {
        return revert(state);
    }
    supersede_reads(state);
    state.read_error = None;
    Vec::new()
}

fn read_succeeded(
    state: &mut UploadStageState,
    token: SelectionToken,
    file: StagedFile,
    preview_url: String,
) -> Vec<Effect> {
    if state.selection != token {
        return vec![Effect::Release(preview_url)];
    }

    let mut effects = Vec::new();
    if let Some(previous) = state.staged.take() {
        effects.push(Effect::Release(previous.preview_url));
    }
    state.reading = None;
    state.preview_url = Some(preview_url.clone());
    state.staged = Some(Staged {
        token,
        file,
        preview_url,
    });
    state.read_error = None;
    state.upload_error = None;
    if state.upload_status != UploadStatus::InFlight {
        state.upload_status = UploadStatus::Idle;
    }
    effects
}

fn confirm(state: &mut UploadStageState) -> Result<Vec<Effect>, TransitionError> {
    if state.upload_status == UploadStatus::InFlight {
        return Ok(Vec::new());
    }
    let staged = state.staged.as_ref().ok_or(TransitionError::NothingStaged)?;
    let file = staged.file.clone();
    state.uploading = Some(staged.token);
    state.attempt += 1;
    state.upload_status = UploadStatus::InFlight;
    state.upload_error = None;
    Ok(vec![Effect::Upload {
        attempt: state.attempt,
        file,
    }])
}

fn is_current_attempt(state: &UploadStageState, attempt: u64) -> bool {
    state.upload_status == UploadStatus::InFlight && state.attempt == attempt
}

fn upload_succeeded(
    state: &mut UploadStageState,
    attempt: u64,
    reference: ImageReference,
) -> Vec<Effect> {
    if !is_current_attempt(state, attempt) {
        return Vec::new();
    }

    let mut effects = vec![Effect::SetField(reference.key.clone())];
    let uploaded = state.uploading.take();

    // A newer selection made during the upload stays staged and shown.
    if let Some(staged) = state
        .staged
        .take_if(|s| Some(s.token) == uploaded)
    {
        effects.push(Effect::Release(staged.preview_url));
        state.read_error = None;
    }
    if state.staged.is_none() {
        state.preview_url = Some(reference.url.clone());
    }

    state.committed = Some(reference.clone());
    state.upload_status = UploadStatus::Succeeded;
    state.upload_error = None;
    effects.push(Effect::Committed(reference));
    effects
}

fn cancel(state: &mut UploadStageState) -> Result<Vec<Effect>, TransitionError> {
    if state.staged.is_none() {
        return Err(TransitionError::NothingStaged);
    }
    if state.staged_is_uploading() {
        return Err(TransitionError::UploadInFlight);
    }
    Ok(revert(state))
}

/// Drop the staged file and restore the committed (or initial) image.
///
/// An upload still running for an earlier file is left to settle.
fn revert(state: &mut UploadStageState) -> Vec<Effect> {
    supersede_reads(state);

    let mut effects = Vec::new();
    if let Some(staged) = state.staged.take() {
        effects.push(Effect::Release(staged.preview_url));
    }
    state.preview_url = state.fallback_url();
    state.read_error = None;
    if state.upload_status != UploadStatus::InFlight {
        state.upload_error = None;
        state.upload_status = UploadStatus::Idle;
    }
    effects.push(Effect::SetField(state.field_value()));
    effects
}
