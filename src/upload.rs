//! PDF upload storage
//!
//! Accepted uploads are written into a flat directory under generated names
//! of the form `{field}-{millis}-{random}{ext}`. Only that name is kept in the
//! employee row; the directory itself is served back under `/uploads`.

use crate::employee::{DocumentField, DocumentSet};
use crate::{Error, Result};
use rand::Rng;
use std::path::{Path, PathBuf};

/// The only content type accepted for employee documents
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// A file received in a request, validated but not yet written to disk
#[derive(Debug, Clone)]
pub struct PendingUpload {
    pub field: DocumentField,
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Directory holding uploaded documents
#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the directory if needed and check that a file can be written
    /// into it. The check file is removed again when it drops.
    pub fn ensure(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        tempfile::Builder::new()
            .prefix(".write-check-")
            .tempfile_in(&self.root)
            .map_err(|e| {
                Error::Io(std::io::Error::new(
                    e.kind(),
                    format!("upload directory is not writable: {}: {}", self.root.display(), e),
                ))
            })?;
        Ok(())
    }

    /// Write every pending upload and return the generated filenames by slot.
    ///
    /// If any write fails, files already written by this call are removed.
    pub async fn save_all(&self, uploads: &[PendingUpload]) -> Result<DocumentSet> {
        let mut documents = DocumentSet::default();
        let mut written: Vec<String> = Vec::new();

        for upload in uploads {
            match self.save(upload).await {
                Ok(filename) => {
                    documents.set(upload.field, filename.clone());
                    written.push(filename);
                }
                Err(e) => {
                    self.remove_all(&written).await;
                    return Err(e);
                }
            }
        }

        Ok(documents)
    }

    /// Write one upload under a freshly generated name
    pub async fn save(&self, upload: &PendingUpload) -> Result<String> {
        let filename = generate_filename(upload.field, &upload.original_name);
        let path = self.root.join(&filename);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await?;
        tokio::io::AsyncWriteExt::write_all(&mut file, &upload.bytes).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;

        tracing::info!(
            field = %upload.field,
            original_name = %upload.original_name,
            size = upload.bytes.len(),
            "Saved upload as {}",
            filename
        );
        Ok(filename)
    }

    /// Best-effort removal of files written during a request that later failed
    pub async fn remove_all(&self, filenames: &[String]) {
        for filename in filenames {
            if let Err(e) = tokio::fs::remove_file(self.root.join(filename)).await {
                tracing::error!("Failed to remove orphaned upload {}: {}", filename, e);
            }
        }
    }
}

/// `{field}-{millis}-{random}{ext}`, where `ext` keeps the leading dot of the
/// original extension and is empty when the original has none.
pub fn generate_filename(field: DocumentField, original_name: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let random: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    let extension = Path::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    format!("{}-{}-{}{}", field.as_str(), millis, random, extension)
}

/// Whether a declared content type is a PDF (parameters are ignored)
pub fn is_pdf(content_type: Option<&str>) -> bool {
    content_type
        .and_then(|ct| ct.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case(PDF_CONTENT_TYPE))
        .unwrap_or(false)
}
