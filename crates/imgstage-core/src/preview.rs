//! Local preview generation.
//!
//! Checks that a selected file is a decodable image in an accepted
//! format and renders it as a `data:` URI. This is the portable
//! preview path. Browser front ends use Blob URLs instead and check
//! only the header with [`sniff`], leaving decoding to the renderer.

use std::io::Cursor;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::config::{AcceptedFormat, StagerConfig};
use crate::types::{ReadError, StagedFile};

/// Sniff and fully decode `bytes`, returning the detected format.
///
/// Decoding the whole image (not just the header) catches truncated
/// files, which would otherwise preview as a broken image.
///
/// # Errors
///
/// Returns [`ReadError::Empty`] for empty input,
/// [`ReadError::Unreadable`] if the format is unrecognized or the data
/// is corrupt, and [`ReadError::UnsupportedFormat`] if the image is not
/// in one of `config.accepted_formats`.
pub fn inspect(bytes: &[u8], config: &StagerConfig) -> Result<AcceptedFormat, ReadError> {
    let format = accepted_format(bytes, config)?;
    image::load_from_memory_with_format(bytes, format.image_format())?;
    Ok(format)
}

/// Like [`inspect`], but only parses the image header.
///
/// Cheap enough to run on a UI thread for large photos. Corruption past
/// the header goes unnoticed, so the renderer must cope with it.
///
/// # Errors
///
/// As [`inspect`], except that a corrupt body is not reported.
pub fn sniff(bytes: &[u8], config: &StagerConfig) -> Result<AcceptedFormat, ReadError> {
    let format = accepted_format(bytes, config)?;
    image::ImageReader::with_format(Cursor::new(bytes), format.image_format())
        .into_dimensions()?;
    Ok(format)
}

fn accepted_format(bytes: &[u8], config: &StagerConfig) -> Result<AcceptedFormat, ReadError> {
    if bytes.is_empty() {
        return Err(ReadError::Empty);
    }

    let sniffed = image::guess_format(bytes)?;
    AcceptedFormat::from_image_format(sniffed)
        .filter(|f| config.accepts(*f))
        .ok_or_else(|| ReadError::UnsupportedFormat {
            format: format!("{sniffed:?}").to_lowercase(),
        })
}

/// Render a staged file as a base64 `data:` URI preview.
///
/// # Errors
///
/// Propagates any [`ReadError`] from [`inspect`].
pub fn data_uri(file: &StagedFile, config: &StagerConfig) -> Result<String, ReadError> {
    let format = inspect(file.bytes(), config)?;
    Ok(format!(
        "data:{};base64,{}",
        format.mime_type(),
        STANDARD.encode(file.bytes())
    ))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{bmp_bytes, png_bytes};

    #[test]
    fn png_becomes_data_uri() {
        let file = StagedFile::new("header.png", png_bytes(4, 2));
        let uri = data_uri(&file, &StagerConfig::default()).unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
    }

    #[test]
    fn empty_file_is_rejected() {
        let file = StagedFile::new("empty.png", Vec::new());
        assert_eq!(
            data_uri(&file, &StagerConfig::default()),
            Err(ReadError::Empty)
        );
    }

    #[test]
    fn corrupt_bytes_are_unreadable() {
        let result = inspect(&[0xFF, 0xFE, 0x00, 0x01], &StagerConfig::default());
        assert!(matches!(result, Err(ReadError::Unreadable { .. })));
    }

    #[test]
    fn truncated_png_is_unreadable() {
        let mut bytes = png_bytes(16, 16);
        bytes.truncate(bytes.len() / 2);
        let result = inspect(&bytes, &StagerConfig::default());
        assert!(matches!(result, Err(ReadError::Unreadable { .. })));
    }

    #[test]
    fn format_outside_config_is_unsupported() {
        let result = inspect(&bmp_bytes(2, 2), &StagerConfig::default());
        assert_eq!(
            result,
            Err(ReadError::UnsupportedFormat {
                format: "bmp".into()
            })
        );

        let permissive = StagerConfig {
            accepted_formats: AcceptedFormat::ALL.to_vec(),
            ..StagerConfig::default()
        };
        assert_eq!(
            inspect(&bmp_bytes(2, 2), &permissive),
            Ok(AcceptedFormat::Bmp)
        );
    }

    #[test]
    fn sniff_reads_only_the_header() {
        let config = StagerConfig::default();
        let mut bytes = png_bytes(16, 16);
        assert_eq!(sniff(&bytes, &config), Ok(AcceptedFormat::Png));

        // Break the zlib stream of the first IDAT chunk.
        let idat = bytes.windows(4).position(|w| w == b"IDAT").unwrap();
        bytes[idat + 4] = 0;
        bytes[idat + 5] = 0;
        assert_eq!(sniff(&bytes, &config), Ok(AcceptedFormat::Png));
        assert!(matches!(
            inspect(&bytes, &config),
            Err(ReadError::Unreadable { .. })
        ));
    }

    #[test]
    fn sniff_rejects_what_the_header_rules_out() {
        let config = StagerConfig::default();
        assert_eq!(sniff(&[], &config), Err(ReadError::Empty));
        assert!(matches!(
            sniff(b"not an image", &config),
            Err(ReadError::Unreadable { .. })
        ));
        assert_eq!(
            sniff(&bmp_bytes(2, 2), &config),
            Err(ReadError::UnsupportedFormat {
                format: "bmp".into()
            })
        );
    }
}
