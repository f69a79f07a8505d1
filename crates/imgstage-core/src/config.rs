//! Stager configuration.

use serde::{Deserialize, Serialize};

/// An image format the stager accepts for upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcceptedFormat {
    /// JPEG (`image/jpeg`).
    Jpeg,
    /// PNG (`image/png`).
    Png,
    /// GIF (`image/gif`).
    Gif,
    /// BMP (`image/bmp`).
    Bmp,
    /// WebP (`image/webp`).
    Webp,
}

impl AcceptedFormat {
    /// Every format the stager knows how to sniff.
    pub const ALL: [Self; 5] = [Self::Jpeg, Self::Png, Self::Gif, Self::Bmp, Self::Webp];

    /// MIME type used for previews and the picker's `accept` attribute.
    #[must_use]
    pub const fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::Bmp => "image/bmp",
            Self::Webp => "image/webp",
        }
    }

    /// Canonical file extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
            Self::Bmp => "bmp",
            Self::Webp => "webp",
        }
    }

    /// Map a sniffed `image` format onto an accepted one.
    ///
    /// Returns `None` for formats the stager never accepts.
    #[must_use]
    pub const fn from_image_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(Self::Jpeg),
            image::ImageFormat::Png => Some(Self::Png),
            image::ImageFormat::Gif => Some(Self::Gif),
            image::ImageFormat::Bmp => Some(Self::Bmp),
            image::ImageFormat::WebP => Some(Self::Webp),
            _ => None,
        }
    }

    /// The matching `image` format, used to decode with a fixed format.
    #[must_use]
    pub const fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
            Self::Gif => image::ImageFormat::Gif,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Webp => image::ImageFormat::WebP,
        }
    }
}

/// Configuration for an upload stager.
///
/// Missing fields fall back to their defaults when deserialized, so a
/// config file only needs to name what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StagerConfig {
    /// Formats a selected file may be in. Anything else fails to read.
    pub accepted_formats: Vec<AcceptedFormat>,

    /// Image shown when there is neither a preview nor a committed
    /// reference. `None` uses the built-in placeholder.
    pub placeholder_url: Option<String>,

    /// How long error notices stay visible before dismissing
    /// themselves, in milliseconds.
    pub notice_timeout_ms: u32,
}

impl StagerConfig {
    /// Formats accepted by default: the ones browsers render everywhere.
    pub const DEFAULT_ACCEPTED_FORMATS: [AcceptedFormat; 3] =
        [AcceptedFormat::Jpeg, AcceptedFormat::Png, AcceptedFormat::Gif];

    /// Default [`notice_timeout_ms`](Self::notice_timeout_ms).
    pub const DEFAULT_NOTICE_TIMEOUT_MS: u32 = 6_000;

    /// Whether files in `format` may be staged.
    #[must_use]
    pub fn accepts(&self, format: AcceptedFormat) -> bool {
        self.accepted_formats.contains(&format)
    }

    /// Comma-separated MIME list for a file input's `accept` attribute.
    #[must_use]
    pub fn accept_attribute(&self) -> String {
        self.accepted_formats
            .iter()
            .map(|f| f.mime_type())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The image to show when nothing else is available.
    #[must_use]
    pub fn placeholder(&self) -> &str {
        self.placeholder_url
            .as_deref()
            .unwrap_or(crate::placeholder::default_placeholder())
    }

    /// Check invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NoAcceptedFormats`] if the format list is
    /// empty, and [`ConfigError::ZeroNoticeTimeout`] if notices would
    /// vanish immediately.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.accepted_formats.is_empty() {
            return Err(ConfigError::NoAcceptedFormats);
        }
        if self.notice_timeout_ms == 0 {
            return Err(ConfigError::ZeroNoticeTimeout);
        }
        Ok(())
    }
}

impl Default for StagerConfig {
    fn default() -> Self {
        Self {
            accepted_formats: Self::DEFAULT_ACCEPTED_FORMATS.to_vec(),
            placeholder_url: None,
            notice_timeout_ms: Self::DEFAULT_NOTICE_TIMEOUT_MS,
        }
    }
}

/// A [`StagerConfig`] violates an invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// `accepted_formats` is empty, so no file could ever be staged.
    #[error("at least one accepted format is required")]
    NoAcceptedFormats,

    /// `notice_timeout_ms` is zero.
    #[error("notice timeout must be greater than zero")]
    ZeroNoticeTimeout,
}
