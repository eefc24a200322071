//! Storage Layer - SQLite-backed persistence
//!
//! System of record is a single SQLite table:
//! - employees(id, name, nip, position, category, division, education, religion,
//!   phone, email, doc_ktp, doc_sk_pangkat, doc_sk_berkala, doc_sk_jabatan, created_at)

pub mod schema;
pub mod sqlite;

pub use sqlite::{EmployeeStats, EmployeeStore};
