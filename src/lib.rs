//! # Kepegawaian - Employee Records Service
//!
//! Personnel records for a government office, with up to four PDF documents
//! attached to each employee.
//!
//! Kepegawaian provides:
//! - SQLite-backed record store with additive schema migration
//! - HTTP API for listing, creating, updating and deleting employees
//! - PDF upload handling with generated, collision-free filenames
//! - Dashboard aggregates (category counts, per-division distribution)

pub mod employee;
pub mod storage;
pub mod upload;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use employee::{Category, DocumentField, Employee, EmployeeFilter, EmployeeForm};
pub use storage::EmployeeStore;
pub use upload::UploadDir;

/// Result type alias for Kepegawaian operations
pub type Result<T> = std::result::Result<T, Error>;

/// Message shown to users when a NIP is already taken
pub const DUPLICATE_NIP_MESSAGE: &str =
    "NIP sudah terdaftar. Silakan gunakan NIP lain atau kosongkan jika tidak ada.";

/// Message shown to users when an upload is not a PDF
pub const PDF_ONLY_MESSAGE: &str = "Hanya file PDF yang diperbolehkan!";

/// Error types for Kepegawaian operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validation(String),

    #[error("{}", DUPLICATE_NIP_MESSAGE)]
    DuplicateNip,

    #[error("{}", PDF_ONLY_MESSAGE)]
    UnsupportedMediaType { field: String, content_type: String },

    #[error("Upload error: {0}")]
    Upload(String),

    #[error("Pegawai tidak ditemukan: {0}")]
    EmployeeNotFound(i64),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
