//! Directory-backed upload transport.

use std::cell::Cell;
use std::hash::Hasher;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use futures::FutureExt;
use futures::future::{self, LocalBoxFuture};
use imgstage_core::{ImageReference, StagedFile};
use imgstage_io::{UploadError, UploadTransport};
use siphasher::sip::SipHasher13;

/// Stores uploads as files in one directory.
///
/// Each upload gets a fresh key, so re-uploading the same file never
/// overwrites an earlier reference.
#[derive(Debug)]
pub struct DirectoryTransport {
    root: PathBuf,
    base_url: String,
    uploads: Cell<u64>,
}

impl DirectoryTransport {
    /// Store into `root` (created if missing), serving files under
    /// `base_url`.
    ///
    /// # Errors
    ///
    /// Returns any error from creating `root`.
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            uploads: Cell::new(0),
        })
    }

    /// Directory the files land in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn next_key(&self, file: &StagedFile) -> String {
        let n = self.uploads.get();
        self.uploads.set(n + 1);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_nanos());

        let mut hasher = SipHasher13::new();
        hasher.write(file.name().as_bytes());
        hasher.write(file.bytes());
        hasher.write_u64(n);
        hasher.write_u128(nanos);
        format!("{:016x}", hasher.finish())
    }

    fn store(&self, file: &StagedFile) -> Result<ImageReference, UploadError> {
        let key = self.next_key(file);
        let name = match extension(file.name()) {
            Some(ext) => format!("{key}.{ext}"),
            None => key.clone(),
        };
        let path = self.root.join(&name);
        std::fs::write(&path, file.bytes())?;
        tracing::debug!(path = %path.display(), bytes = file.len(), "stored upload");
        Ok(ImageReference::new(key, format!("{}/{name}", self.base_url)))
    }
}

impl UploadTransport for DirectoryTransport {
    fn upload<'a>(
        &'a self,
        file: &'a StagedFile,
    ) -> LocalBoxFuture<'a, Result<ImageReference, UploadError>> {
        future::ready(self.store(file)).boxed_local()
    }
}

/// Lowercased extension of `name`, if it has a plain alphanumeric one.
fn extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?;
    ext.chars()
        .all(|c| c.is_ascii_alphanumeric())
        .then(|| ext.to_ascii_lowercase())
}
