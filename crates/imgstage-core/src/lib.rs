//! imgstage-core: Upload staging state machine (sans-IO).
//!
//! Models a "preview before commit" image field: the user selects a
//! local file, sees a preview immediately, then explicitly confirms
//! (uploads) or cancels it. A bound form field always holds the key of
//! the last committed image.
//!
//! This crate has **no I/O or async dependencies** -- it is a pure
//! reducer over [`UploadStageState`] that emits [`Effect`]s for the
//! caller to perform. File reading, uploading, and form binding live in
//! `imgstage-io`.

pub mod config;
pub mod messages;
pub mod placeholder;
pub mod preview;
pub mod reducer;
pub mod state;
pub mod types;

pub use config::{AcceptedFormat, ConfigError, StagerConfig};
pub use reducer::{Action, Effect, reduce};
pub use state::{Staged, UploadStageState};
pub use types::{
    ImageReference, InitialImage, Phase, ReadError, SelectionToken, StagedFile, TransitionError,
    UploadStatus, ValidationError,
};
