//! Dioxus UI components for imgstage.
//!
//! Provides the header image field for edit pages and the
//! self-dismissing notice it uses to report read and upload errors.

mod header_image;
mod notice;

pub use header_image::{EditPageHeaderImage, TransportHandle};
pub use notice::Notice;
