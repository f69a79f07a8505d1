//! Integration test: drive the reducer through full select/confirm/cancel
//! workflows, performing read effects with the data-URI preview reader.

#![allow(clippy::unwrap_used, clippy::panic)]

use image::ImageEncoder;
use imgstage_core::{
    Action, Effect, ImageReference, InitialImage, Phase, StagedFile, StagerConfig,
    UploadStageState, UploadStatus, preview, reduce,
};

/// Create a small PNG in memory.
///
/// NOTE: duplicated from the crate's internal test fixtures, which are
/// not visible to integration tests.
fn png_bytes() -> Vec<u8> {
    let img = image::RgbaImage::from_fn(8, 4, |x, _| image::Rgba([x as u8 * 30, 0, 0, 255]));
    let mut buf = Vec::new();
    image::codecs::png::PngEncoder::new(&mut buf)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
    buf
}

/// Apply `action` and perform every read effect synchronously,
/// collecting the field values that were set along the way.
fn step(state: &mut UploadStageState, action: Action, field: &mut String) -> Vec<Effect> {
    let config = StagerConfig::default();
    let mut pending = reduce(state, action).unwrap();
    let mut uploads = Vec::new();
    while let Some(effect) = pending.pop() {
        match effect {
            Effect::Read { token, file } => {
                let follow_up = match preview::data_uri(&file, &config) {
                    Ok(preview_url) => Action::ReadSucceeded {
                        token,
                        file,
                        preview_url,
                    },
                    Err(error) => Action::ReadFailed { token, error },
                };
                pending.extend(reduce(state, follow_up).unwrap());
            }
            Effect::SetField(value) => *field = value,
            other => uploads.push(other),
        }
    }
    uploads
}

#[test]
fn fresh_field_upload_commits_key_and_url() {
    let mut state = UploadStageState::new(InitialImage::none());
    let mut field = String::new();

    step(
        &mut state,
        Action::Select(Some(StagedFile::new("header.png", png_bytes()))),
        &mut field,
    );
    assert_eq!(state.phase(), Phase::Previewing);
    assert!(
        state
            .preview_url()
            .is_some_and(|u| u.starts_with("data:image/png;base64,"))
    );

    let effects = step(&mut state, Action::Confirm, &mut field);
    let attempt = match effects.as_slice() {
        [Effect::Upload { attempt, .. }] => *attempt,
        other => panic!("expected an upload, got {other:?}"),
    };

    step(
        &mut state,
        Action::UploadSucceeded {
            attempt,
            reference: ImageReference::new("abc", "https://x/abc.png"),
        },
        &mut field,
    );

    assert_eq!(field, "abc");
    assert_eq!(state.field_value(), field);
    assert_eq!(state.preview_url(), Some("https://x/abc.png"));
    assert_eq!(state.pending_file(), None);
    assert_eq!(state.upload_status(), UploadStatus::Succeeded);
}

#[test]
fn cancel_reverts_to_original_reference() {
    let mut state = UploadStageState::new(InitialImage::from_reference(ImageReference::new(
        "orig",
        "https://x/orig.png",
    )));
    let mut field = String::from("orig");

    step(
        &mut state,
        Action::Select(Some(StagedFile::new("header.png", png_bytes()))),
        &mut field,
    );
    assert_ne!(state.preview_url(), Some("https://x/orig.png"));

    step(&mut state, Action::Cancel, &mut field);
    assert_eq!(field, "orig");
    assert_eq!(state.preview_url(), Some("https://x/orig.png"));
    assert_eq!(state.pending_file(), None);
}

#[test]
fn corrupt_file_sets_read_error_only() {
    let mut state = UploadStageState::new(InitialImage::from_reference(ImageReference::new(
        "orig",
        "https://x/orig.png",
    )));
    let before_url = state.preview_url().map(str::to_owned);
    let mut field = String::from("orig");

    step(
        &mut state,
        Action::Select(Some(StagedFile::new("broken.png", vec![0x89, b'P', b'N', b'G']))),
        &mut field,
    );

    assert!(state.read_error().is_some());
    assert_eq!(state.pending_file(), None);
    assert_eq!(state.preview_url().map(str::to_owned), before_url);
    assert_eq!(field, "orig");
    assert_eq!(state.phase(), Phase::Error);
}

#[test]
fn state_snapshot_serializes_without_file_bytes() {
    let mut state = UploadStageState::new(InitialImage::none());
    let mut field = String::new();
    step(
        &mut state,
        Action::Select(Some(StagedFile::new("header.png", png_bytes()))),
        &mut field,
    );

    let json = serde_json::to_value(&state).unwrap();
    assert_eq!(json["staged"]["file"]["name"], "header.png");
    assert!(json["staged"]["file"].get("bytes").is_none());
    assert_eq!(json["upload_status"], "idle");
}
