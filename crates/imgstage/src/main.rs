//! imgstage: stage images and commit them to a local directory store.
//!
//! Drives the same upload stager the web component uses, with a
//! directory in place of the remote upload endpoint. Each image given
//! on the command line is selected and previewed, then confirmed (or
//! cancelled with `--cancel`). The final state is printed as JSON.
//!
//! # Usage
//!
//! ```text
//! cargo run --bin imgstage -- --store ./uploads [OPTIONS] <IMAGES>...
//! ```
//!
//! Set `RUST_LOG=imgstage=debug` to see each transition.

#![allow(clippy::print_stdout, clippy::print_stderr)]

mod store;

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use futures::executor::block_on;
use imgstage_core::{
    AcceptedFormat, InitialImage, Phase, StagedFile, StagerConfig, UploadStageState,
};
use imgstage_io::{DataUriReader, Form, FormField, ImageUploadStager, SubmitError};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::store::DirectoryTransport;

/// Name of the form field the stager is bound to.
const FIELD: &str = "header_image";

/// Stage images and commit them to a directory.
#[derive(Parser)]
#[command(name = "imgstage", version)]
struct Cli {
    /// Images to select, in order.
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Directory uploads are written to.
    #[arg(long)]
    store: PathBuf,

    /// URL prefix under which the store directory is served.
    #[arg(long, default_value = "file:///uploads")]
    base_url: String,

    /// Key of the image already bound to the field.
    #[arg(long)]
    initial_key: Option<String>,

    /// URL of the image already bound to the field.
    #[arg(long)]
    initial_url: Option<String>,

    /// Cancel each staged image instead of confirming it.
    #[arg(long)]
    cancel: bool,

    /// Stager config as a JSON file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Accepted formats by extension (e.g. `png,jpg`). Overrides the
    /// config file.
    #[arg(long, value_delimiter = ',', value_parser = parse_format)]
    accept: Vec<AcceptedFormat>,
}

/// Parse a format from its extension or name.
fn parse_format(s: &str) -> Result<AcceptedFormat, String> {
    let lower = s.trim().to_ascii_lowercase();
    let ext = if lower == "jpeg" { "jpg" } else { lower.as_str() };
    AcceptedFormat::ALL
        .into_iter()
        .find(|f| f.extension() == ext)
        .ok_or_else(|| {
            let known: Vec<_> = AcceptedFormat::ALL.iter().map(|f| f.extension()).collect();
            format!("unknown format {ext:?}, expected one of {}", known.join(", "))
        })
}

/// What happened to one image.
#[derive(Serialize)]
struct Step {
    file: String,
    phase: Phase,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Printed on exit.
#[derive(Serialize)]
struct Report {
    field: String,
    submitted: bool,
    steps: Vec<Step>,
    state: UploadStageState,
}

/// Load the config file, if any, then apply flag overrides.
fn config_from_cli(cli: &Cli) -> Result<StagerConfig, String> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
            serde_json::from_str(&text)
                .map_err(|e| format!("Error parsing {}: {e}", path.display()))?
        }
        None => StagerConfig::default(),
    };
    if !cli.accept.is_empty() {
        config.accepted_formats.clone_from(&cli.accept);
    }
    config
        .validate()
        .map_err(|e| format!("Invalid config: {e}"))?;
    Ok(config)
}

type Stager = ImageUploadStager<DataUriReader, DirectoryTransport, FormField>;

/// Select `path`, then confirm or cancel it.
fn stage(stager: &Stager, path: &Path, cancel: bool) -> Step {
    let file = path.display().to_string();
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            return Step {
                file,
                phase: stager.phase(),
                error: Some(format!("Error reading {}: {e}", path.display())),
            };
        }
    };
    let name = path
        .file_name()
        .map_or_else(|| file.clone(), |n| n.to_string_lossy().into_owned());

    block_on(stager.select_file(Some(StagedFile::new(name, bytes))));
    if let Some(e) = stager.snapshot().read_error() {
        tracing::warn!(%file, "{e}");
        return Step {
            file,
            phase: stager.phase(),
            error: Some(e.to_string()),
        };
    }

    let outcome = if cancel {
        stager.cancel()
    } else {
        block_on(stager.confirm_upload())
    };
    let error = match outcome {
        Ok(()) => stager.snapshot().upload_error().map(str::to_owned),
        Err(e) => Some(e.to_string()),
    };
    Step {
        file,
        phase: stager.phase(),
        error,
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "imgstage=info,imgstage_io=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let transport = match DirectoryTransport::new(&cli.store, &cli.base_url) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Error creating {}: {e}", cli.store.display());
            return ExitCode::FAILURE;
        }
    };

    let form = Rc::new(RefCell::new(Form::new()));
    let initial = InitialImage {
        url: cli.initial_url.clone(),
        key: cli.initial_key.clone(),
    };
    let stager = ImageUploadStager::new(
        DataUriReader::new(config),
        transport,
        Form::field(&form, FIELD),
        initial,
    )
    .with_on_success(|reference| {
        tracing::info!(key = %reference.key, url = %reference.url, "committed");
    });

    let steps: Vec<Step> = cli
        .images
        .iter()
        .map(|path| stage(&stager, path, cli.cancel))
        .collect();

    let submitted = match form.borrow().submit(&[(FIELD, &stager)]) {
        Ok(_) => true,
        Err(SubmitError::Invalid { field, source }) => {
            tracing::warn!(%field, "{source}");
            false
        }
    };

    let report = Report {
        field: stager.field_value(),
        submitted,
        steps,
        state: stager.snapshot(),
    };

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Error serializing report: {e}");
            return ExitCode::FAILURE;
        }
    }

    if report.steps.iter().any(|s| s.error.is_some()) {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn formats_parse_by_extension_or_name() {
        assert_eq!(parse_format("png"), Ok(AcceptedFormat::Png));
        assert_eq!(parse_format(" JPEG "), Ok(AcceptedFormat::Jpeg));
        assert_eq!(parse_format("jpg"), Ok(AcceptedFormat::Jpeg));
        assert!(parse_format("tiff").unwrap_err().contains("webp"));
    }

    #[test]
    fn accept_flag_overrides_default_formats() {
        let cli = Cli::parse_from(["imgstage", "--store", "out", "--accept", "png,webp", "a.png"]);
        let config = config_from_cli(&cli).unwrap();
        assert_eq!(
            config.accepted_formats,
            vec![AcceptedFormat::Png, AcceptedFormat::Webp]
        );
    }

    #[test]
    fn unreadable_inputs_are_reported_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let transport = DirectoryTransport::new(dir.path(), "https://cdn.test").unwrap();
        let form = Rc::new(RefCell::new(Form::new()));
        let stager = ImageUploadStager::new(
            DataUriReader::new(StagerConfig::default()),
            transport,
            Form::field(&form, FIELD),
            InitialImage::none(),
        );

        let missing = stage(&stager, &dir.path().join("missing.png"), false);
        assert!(missing.error.is_some());
        assert_eq!(missing.phase, Phase::Empty);

        let corrupt = dir.path().join("corrupt.png");
        std::fs::write(&corrupt, b"not a png").unwrap();
        let step = stage(&stager, &corrupt, false);
        assert_eq!(step.phase, Phase::Error);
        assert_eq!(stager.field_value(), "");
        assert!(form.borrow().submit(&[(FIELD, &stager)]).is_ok());
    }
}
