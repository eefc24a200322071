//! Employee records
//!
//! An employee row carries identity, placement and contact fields plus up to
//! four document references. Documents are stored on disk; the row only keeps
//! the generated filename of each one.

use crate::{Error, Result};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

/// Employment category used for classification and dashboard counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Aparatur Sipil Negara - civil servant
    #[serde(rename = "ASN")]
    Asn,
    /// Pegawai Pemerintah dengan Perjanjian Kerja - contract government employee
    #[serde(rename = "P3K")]
    P3k,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Asn => "ASN",
            Category::P3k => "P3K",
        }
    }

    pub fn all() -> &'static [Category] {
        &[Category::Asn, Category::P3k]
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_uppercase().as_str() {
            "ASN" => Ok(Category::Asn),
            "P3K" => Ok(Category::P3k),
            _ => Err(Error::Validation(format!("Kategori tidak dikenal: {}", s))),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four document slots an employee can have a PDF for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentField {
    /// Identity card
    Ktp,
    /// Rank decree
    SkPangkat,
    /// Periodic salary increase decree
    SkBerkala,
    /// Position decree
    SkJabatan,
}

impl DocumentField {
    /// Form field name, which is also the column name
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentField::Ktp => "doc_ktp",
            DocumentField::SkPangkat => "doc_sk_pangkat",
            DocumentField::SkBerkala => "doc_sk_berkala",
            DocumentField::SkJabatan => "doc_sk_jabatan",
        }
    }

    pub fn all() -> &'static [DocumentField] {
        &[
            DocumentField::Ktp,
            DocumentField::SkPangkat,
            DocumentField::SkBerkala,
            DocumentField::SkJabatan,
        ]
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|f| f.as_str() == name)
    }
}

impl std::fmt::Display for DocumentField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Generated filenames of an employee's documents, one per slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSet {
    pub doc_ktp: Option<String>,
    pub doc_sk_pangkat: Option<String>,
    pub doc_sk_berkala: Option<String>,
    pub doc_sk_jabatan: Option<String>,
}

impl DocumentSet {
    pub fn get(&self, field: DocumentField) -> Option<&str> {
        match field {
            DocumentField::Ktp => self.doc_ktp.as_deref(),
            DocumentField::SkPangkat => self.doc_sk_pangkat.as_deref(),
            DocumentField::SkBerkala => self.doc_sk_berkala.as_deref(),
            DocumentField::SkJabatan => self.doc_sk_jabatan.as_deref(),
        }
    }

    pub fn set(&mut self, field: DocumentField, filename: impl Into<String>) {
        let slot = match field {
            DocumentField::Ktp => &mut self.doc_ktp,
            DocumentField::SkPangkat => &mut self.doc_sk_pangkat,
            DocumentField::SkBerkala => &mut self.doc_sk_berkala,
            DocumentField::SkJabatan => &mut self.doc_sk_jabatan,
        };
        *slot = Some(filename.into());
    }

    /// Newly uploaded documents win; slots left empty keep the previous filename.
    pub fn merged_over(&self, previous: &DocumentSet) -> DocumentSet {
        DocumentSet {
            doc_ktp: self.doc_ktp.clone().or_else(|| previous.doc_ktp.clone()),
            doc_sk_pangkat: self.doc_sk_pangkat.clone().or_else(|| previous.doc_sk_pangkat.clone()),
            doc_sk_berkala: self.doc_sk_berkala.clone().or_else(|| previous.doc_sk_berkala.clone()),
            doc_sk_jabatan: self.doc_sk_jabatan.clone().or_else(|| previous.doc_sk_jabatan.clone()),
        }
    }

    /// Filenames currently referenced, in slot order
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        DocumentField::all().iter().filter_map(move |f| self.get(*f))
    }

    pub fn is_empty(&self) -> bool {
        self.filenames().next().is_none()
    }
}

/// A stored employee row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    /// Official identification number, unique when present
    pub nip: Option<String>,
    pub position: String,
    /// Stored category code. Rows written by older clients may hold codes
    /// other than ASN/P3K, so this is kept as text.
    pub category: String,
    pub division: String,
    pub education: Option<String>,
    pub religion: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    #[serde(flatten)]
    pub documents: DocumentSet,
    pub created_at: NaiveDateTime,
}

/// Every non-document field of an employee, as submitted by a create or
/// update request. Update overwrites all of these, so callers resupply them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmployeeForm {
    pub name: String,
    pub nip: Option<String>,
    pub position: String,
    pub category: Category,
    pub division: String,
    pub education: Option<String>,
    pub religion: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl EmployeeForm {
    /// Create a form with the required fields; optional fields start absent
    pub fn new(
        name: impl Into<String>,
        position: impl Into<String>,
        category: Category,
        division: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            nip: None,
            position: position.into(),
            category,
            division: division.into(),
            education: None,
            religion: None,
            phone: None,
            email: None,
        }
    }

    /// Set the NIP; an empty string means no NIP
    pub fn with_nip(mut self, nip: impl Into<String>) -> Self {
        self.nip = normalize_nip(Some(nip.into()));
        self
    }

    pub fn with_contact(mut self, phone: impl Into<String>, email: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self.email = Some(email.into());
        self
    }

    pub fn with_background(mut self, education: impl Into<String>, religion: impl Into<String>) -> Self {
        self.education = Some(education.into());
        self.religion = Some(religion.into());
        self
    }

    /// Build a form from the text fields of a submitted request.
    ///
    /// Required fields must be present and non-blank, and the category must be
    /// ASN or P3K. Unknown keys are ignored.
    pub fn from_fields(fields: &HashMap<String, String>) -> Result<Self> {
        let required = |key: &str| -> Result<String> {
            match fields.get(key) {
                Some(v) if !v.trim().is_empty() => Ok(v.clone()),
                _ => Err(Error::Validation(format!("Kolom wajib diisi: {}", key))),
            }
        };
        let optional = |key: &str| fields.get(key).cloned();

        Ok(Self {
            name: required("name")?,
            nip: normalize_nip(optional("nip")),
            position: required("position")?,
            category: required("category")?.parse()?,
            division: required("division")?,
            education: optional("education"),
            religion: optional("religion"),
            phone: optional("phone"),
            email: optional("email"),
        })
    }
}

/// An empty NIP is stored as absent, never as `""`.
pub fn normalize_nip(nip: Option<String>) -> Option<String> {
    nip.filter(|n| !n.is_empty())
}

/// Search and category filter applied to the employee list.
#[derive(Debug, Clone, Default)]
pub struct EmployeeFilter {
    pub search: Option<String>,
    pub category: Option<Category>,
}

impl EmployeeFilter {
    /// Name and position match case-insensitively; NIP matches verbatim.
    pub fn matches(&self, employee: &Employee) -> bool {
        if let Some(category) = self.category {
            if employee.category != category.as_str() {
                return false;
            }
        }

        let Some(term) = self.search.as_deref().filter(|t| !t.is_empty()) else {
            return true;
        };
        let needle = term.to_lowercase();

        employee.name.to_lowercase().contains(&needle)
            || employee.nip.as_deref().is_some_and(|nip| nip.contains(term))
            || employee.position.to_lowercase().contains(&needle)
    }

    pub fn apply(&self, employees: Vec<Employee>) -> Vec<Employee> {
        employees.into_iter().filter(|e| self.matches(e)).collect()
    }
}

/// Divisions of the office shown on the dashboard
pub const DIVISIONS: &[&str] = &[
    "Sekretariat",
    "Bidang Ideologi & Wawasan Kebangsaan",
    "Bidang Politik Dalam Negeri",
    "Bidang Ketahanan Ekonomi, Sosial & Budaya",
    "Bidang Kewaspadaan Nasional",
];

/// Headcount of one division relative to all employees.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DivisionShare {
    pub division: String,
    pub count: usize,
    pub percentage: f64,
}

/// Distribution over the known divisions. Divisions with no employees are
/// still listed; employees in other divisions only count toward `total`.
pub fn division_breakdown(counts: &HashMap<String, usize>, total: usize) -> Vec<DivisionShare> {
    DIVISIONS
        .iter()
        .map(|division| {
            let count = counts.get(*division).copied().unwrap_or(0);
            let percentage = if total > 0 {
                count as f64 / total as f64 * 100.0
            } else {
                0.0
            };
            DivisionShare {
                division: division.to_string(),
                count,
                percentage,
            }
        })
        .collect()
}
