//! Headless async driver for the upload staging reducer.
//!
//! [`ImageUploadStager`] owns one [`UploadStageState`] and performs the
//! reducer's effects against a [`FileReader`], an [`UploadTransport`],
//! and a [`FieldBinder`]. It is single-threaded: operations take
//! `&self`, may be polled concurrently on one executor, and never hold
//! a state borrow across an `.await`.

use std::cell::RefCell;
use std::collections::VecDeque;

use imgstage_core::{
    Action, Effect, ImageReference, InitialImage, Phase, StagedFile, TransitionError,
    UploadStageState, UploadStatus, ValidationError, reduce,
};

use crate::field::{FieldBinder, FieldRule};
use crate::reader::FileReader;
use crate::transport::UploadTransport;

type SuccessCallback = Box<dyn Fn(&ImageReference)>;

/// Lets a user preview an image, then upload or discard it, keeping a
/// bound form field in sync with the last committed reference.
pub struct ImageUploadStager<R, T, F> {
    reader: R,
    transport: T,
    field: RefCell<F>,
    state: RefCell<UploadStageState>,
    on_success: Option<SuccessCallback>,
}

impl<R, T, F> ImageUploadStager<R, T, F>
where
    R: FileReader,
    T: UploadTransport,
    F: FieldBinder,
{
    /// Mount a stager for one form field.
    ///
    /// If `initial` names a key, the field is set to it so the bound
    /// value matches the state from the start. Otherwise the field's
    /// current value is taken as the initial key.
    pub fn new(reader: R, transport: T, mut field: F, mut initial: InitialImage) -> Self {
        match &initial.key {
            Some(key) => field.on_change(key.clone()),
            None => {
                let current = field.value();
                if !current.is_empty() {
                    initial.key = Some(current);
                }
            }
        }
        Self {
            reader,
            transport,
            field: RefCell::new(field),
            state: RefCell::new(UploadStageState::new(initial)),
            on_success: None,
        }
    }

    /// Call `callback` each time an upload is committed.
    #[must_use]
    pub fn with_on_success(mut self, callback: impl Fn(&ImageReference) + 'static) -> Self {
        self.on_success = Some(Box::new(callback));
        self
    }

    /// Select a file (or clear the selection with `None`).
    ///
    /// Resolves once this selection's read has settled. If a later
    /// selection was made in the meantime, this read's outcome is
    /// discarded.
    pub async fn select_file(&self, file: Option<StagedFile>) {
        match self.dispatch(Action::Select(file)) {
            Ok(effects) => self.run(effects).await,
            Err(e) => tracing::warn!("select rejected: {e}"),
        }
    }

    /// Upload the staged file.
    ///
    /// A call while an upload is already in flight returns immediately
    /// without starting another. Upload failures are not errors here:
    /// they are recorded in the state for the user to retry or cancel.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NothingStaged`] if no file is staged.
    pub async fn confirm_upload(&self) -> Result<(), TransitionError> {
        let effects = self.dispatch(Action::Confirm)?;
        self.run(effects).await;
        Ok(())
    }

    /// Discard the staged file and restore the last committed image.
    ///
    /// # Errors
    ///
    /// Returns [`TransitionError::NothingStaged`] if no file is staged
    /// and [`TransitionError::UploadInFlight`] while it is uploading.
    pub fn cancel(&self) -> Result<(), TransitionError> {
        self.dispatch_now(Action::Cancel)
    }

    /// Hide the read error notice.
    pub fn dismiss_read_error(&self) {
        if let Err(e) = self.dispatch_now(Action::DismissReadError) {
            tracing::warn!("dismiss rejected: {e}");
        }
    }

    /// Hide the upload error notice.
    pub fn dismiss_upload_error(&self) {
        if let Err(e) = self.dispatch_now(Action::DismissUploadError) {
            tracing::warn!("dismiss rejected: {e}");
        }
    }

    /// Validation rule for the enclosing form.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::UploadPending`] while a file is staged.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.state.borrow().validate()
    }

    /// A copy of the current state.
    #[must_use]
    pub fn snapshot(&self) -> UploadStageState {
        self.state.borrow().clone()
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.borrow().phase()
    }

    /// Status of the latest upload attempt.
    #[must_use]
    pub fn upload_status(&self) -> UploadStatus {
        self.state.borrow().upload_status()
    }

    /// URL currently shown, if any.
    #[must_use]
    pub fn preview_url(&self) -> Option<String> {
        self.state.borrow().preview_url().map(str::to_owned)
    }

    /// Current value of the bound field.
    #[must_use]
    pub fn field_value(&self) -> String {
        self.field.borrow().value()
    }

    /// Unmount, returning the field binder.
    ///
    /// A local preview still staged is released.
    pub fn into_field(self) -> F {
        if let Some(staged) = self.state.borrow().staged() {
            self.reader.release(&staged.preview_url);
        }
        self.field.into_inner()
    }

    fn dispatch(&self, action: Action) -> Result<Vec<Effect>, TransitionError> {
        reduce(&mut self.state.borrow_mut(), action)
    }

    /// Dispatch an action whose effects never suspend.
    fn dispatch_now(&self, action: Action) -> Result<(), TransitionError> {
        for effect in self.dispatch(action)? {
            self.apply(effect);
        }
        Ok(())
    }

    /// Perform `effects`, feeding I/O outcomes back into the reducer.
    async fn run(&self, effects: Vec<Effect>) {
        let mut queue = VecDeque::from(effects);
        while let Some(effect) = queue.pop_front() {
            let outcome = match effect {
                Effect::Read { token, file } => {
                    let read = self.reader.read(&file).await;
                    if self.state.borrow().selection() != token {
                        tracing::debug!(file = file.name(), "discarding superseded read");
                    }
                    match read {
                        Ok(preview_url) => Action::ReadSucceeded {
                            token,
                            file,
                            preview_url,
                        },
                        Err(error) => {
                            tracing::debug!(file = file.name(), "read failed: {error:?}");
                            Action::ReadFailed { token, error }
                        }
                    }
                }
                Effect::Upload { attempt, file } => {
                    tracing::debug!(attempt, file = file.name(), bytes = file.len(), "uploading");
                    match self.transport.upload(&file).await {
                        Ok(reference) => Action::UploadSucceeded { attempt, reference },
                        Err(e) => {
                            tracing::warn!(attempt, "upload failed: {e}");
                            Action::UploadFailed {
                                attempt,
                                message: e.to_string(),
                            }
                        }
                    }
                }
                other => {
                    self.apply(other);
                    continue;
                }
            };
            match self.dispatch(outcome) {
                Ok(follow_up) => queue.extend(follow_up),
                Err(e) => tracing::warn!("outcome rejected: {e}"),
            }
        }
    }

    /// Perform an effect that does not suspend.
    fn apply(&self, effect: Effect) {
        match effect {
            Effect::SetField(value) => self.field.borrow_mut().on_change(value),
            Effect::Release(preview_url) => self.reader.release(&preview_url),
            Effect::Committed(reference) => {
                tracing::info!(key = %reference.key, "upload committed");
                if let Some(callback) = &self.on_success {
                    callback(&reference);
                }
            }
            Effect::Read { .. } | Effect::Upload { .. } => {
                tracing::warn!("asynchronous effect outside of run: {effect:?}");
            }
        }
    }
}

impl<R, T, F> FieldRule for ImageUploadStager<R, T, F>
where
    R: FileReader,
    T: UploadTransport,
    F: FieldBinder,
{
    fn validate(&self) -> Result<(), ValidationError> {
        Self::validate(self)
    }
}
