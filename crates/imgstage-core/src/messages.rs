//! User-facing strings shown by the upload stager.
//!
//! Kept in one place so every front end (Dioxus component, CLI) reports
//! the same wording.

/// A selected file could not be decoded into a preview.
pub const COULDNT_READ_FILE: &str = "Couldn't read the file, please try another image";

/// A selected file decoded, but its format is not accepted.
pub const UNSUPPORTED_IMAGE: &str = "This image format isn't supported";

/// Confirm was requested with nothing staged.
pub const NO_VALID_FILE: &str = "No valid file was selected";

/// Cancel was requested while an upload is running.
pub const UPLOAD_IN_PROGRESS: &str = "An upload is already in progress";

/// The enclosing form was submitted with a staged, unconfirmed image.
pub const UPLOAD_PENDING_ERROR: &str = "Please confirm or cancel the image upload first";

/// Accessible label for the file picker.
pub const SELECT_AN_IMAGE: &str = "Select an image";

/// Accessible label for the confirm button.
pub const CONFIRM_UPLOAD: &str = "Confirm upload";

/// Accessible label for the cancel button.
pub const CANCEL_UPLOAD: &str = "Cancel upload";

/// Confirm button text.
pub const UPLOAD: &str = "Upload";

/// Cancel button text.
pub const CANCEL: &str = "Cancel";
