//! Database schema definitions

/// SQL to create the employees table
pub const CREATE_EMPLOYEES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS employees (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    nip TEXT UNIQUE,
    position TEXT NOT NULL,
    category TEXT NOT NULL,
    division TEXT NOT NULL,
    education TEXT,
    religion TEXT,
    phone TEXT,
    email TEXT,
    doc_ktp TEXT,
    doc_sk_pangkat TEXT,
    doc_sk_berkala TEXT,
    doc_sk_jabatan TEXT,
    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_employees_created_at ON employees(created_at)",
    "CREATE INDEX IF NOT EXISTS idx_employees_category ON employees(category)",
];

/// Columns added after the first release. Tables created by older versions
/// get them through `ALTER TABLE ... ADD COLUMN`; nothing is ever dropped.
pub const MIGRATED_COLUMNS: &[(&str, &str)] = &[
    ("education", "TEXT"),
    ("religion", "TEXT"),
    ("doc_ktp", "TEXT"),
    ("doc_sk_pangkat", "TEXT"),
    ("doc_sk_berkala", "TEXT"),
    ("doc_sk_jabatan", "TEXT"),
];

/// Column list shared by every employee SELECT
pub const EMPLOYEE_COLUMNS: &str = "id, name, nip, position, category, division, education, religion, \
     phone, email, doc_ktp, doc_sk_pangkat, doc_sk_berkala, doc_sk_jabatan, created_at";

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_EMPLOYEES_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

pub fn add_column_statement(name: &str, sql_type: &str) -> String {
    format!("ALTER TABLE employees ADD COLUMN {} {}", name, sql_type)
}
