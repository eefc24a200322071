//! SQLite storage implementation

use std::collections::HashMap;
use std::path::Path;
use chrono::{NaiveDateTime, Utc};
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use serde::Serialize;
use crate::{Result, Error};
use crate::employee::{Category, DocumentSet, Employee, EmployeeFilter, EmployeeForm, normalize_nip};
use super::schema;

/// SQLite-backed storage for employee records
pub struct EmployeeStore {
    conn: Connection,
}

impl EmployeeStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema and bring older tables up to date
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        self.migrate()?;
        Ok(())
    }

    /// Add every expected column the table is missing. Returns the names of
    /// the columns that were added; an up-to-date table yields nothing.
    pub fn migrate(&self) -> Result<Vec<String>> {
        let existing = self.column_names()?;
        let mut added = Vec::new();

        for (name, sql_type) in schema::MIGRATED_COLUMNS {
            if existing.iter().any(|c| c == name) {
                continue;
            }
            self.conn.execute(&schema::add_column_statement(name, sql_type), [])?;
            tracing::info!("Added missing column: {}", name);
            added.push(name.to_string());
        }

        Ok(added)
    }

    /// Column names of the employees table, in table order
    pub fn column_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("PRAGMA table_info(employees)")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(1))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(names)
    }

    /// Cheap connectivity probe for health checks
    pub fn ping(&self) -> Result<()> {
        self.conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
    }

    // ========== Employee Operations ==========

    /// All employees, newest first
    pub fn list_all(&self) -> Result<Vec<Employee>> {
        let sql = format!(
            "SELECT {} FROM employees ORDER BY created_at DESC, id DESC",
            schema::EMPLOYEE_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;

        let employees = stmt
            .query_map([], |row| self.row_to_employee(row))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(employees)
    }

    /// Employees matching a search/category filter, newest first
    pub fn list(&self, filter: &EmployeeFilter) -> Result<Vec<Employee>> {
        Ok(filter.apply(self.list_all()?))
    }

    /// Get an employee by id
    pub fn get(&self, id: i64) -> Result<Option<Employee>> {
        let sql = format!("SELECT {} FROM employees WHERE id = ?1", schema::EMPLOYEE_COLUMNS);
        self.conn
            .query_row(&sql, [id], |row| self.row_to_employee(row))
            .optional()
            .map_err(Into::into)
    }

    /// Insert a new employee and return its id
    pub fn create(&self, form: &EmployeeForm, documents: &DocumentSet) -> Result<i64> {
        self.conn
            .execute(
                r#"
                INSERT INTO employees (name, nip, position, category, division, education, religion,
                                       phone, email, doc_ktp, doc_sk_pangkat, doc_sk_berkala, doc_sk_jabatan,
                                       created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
                params![
                    form.name,
                    normalize_nip(form.nip.clone()),
                    form.position,
                    form.category.as_str(),
                    form.division,
                    form.education,
                    form.religion,
                    form.phone,
                    form.email,
                    documents.doc_ktp,
                    documents.doc_sk_pangkat,
                    documents.doc_sk_berkala,
                    documents.doc_sk_jabatan,
                    Utc::now().naive_utc(),
                ],
            )
            .map_err(translate_write_error)?;

        Ok(self.conn.last_insert_rowid())
    }

    /// Overwrite every field of an existing employee.
    ///
    /// Document slots missing from `uploaded` keep their stored filename. The
    /// read and the write share one transaction.
    pub fn update(&self, id: i64, form: &EmployeeForm, uploaded: &DocumentSet) -> Result<Employee> {
        let tx = self.conn.unchecked_transaction()?;

        let existing = self.get(id)?.ok_or(Error::EmployeeNotFound(id))?;
        let documents = uploaded.merged_over(&existing.documents);

        tx.execute(
            r#"
            UPDATE employees
            SET name = ?1, nip = ?2, position = ?3, category = ?4, division = ?5, education = ?6,
                religion = ?7, phone = ?8, email = ?9, doc_ktp = ?10, doc_sk_pangkat = ?11,
                doc_sk_berkala = ?12, doc_sk_jabatan = ?13
            WHERE id = ?14
            "#,
            params![
                form.name,
                normalize_nip(form.nip.clone()),
                form.position,
                form.category.as_str(),
                form.division,
                form.education,
                form.religion,
                form.phone,
                form.email,
                documents.doc_ktp,
                documents.doc_sk_pangkat,
                documents.doc_sk_berkala,
                documents.doc_sk_jabatan,
                id,
            ],
        )
        .map_err(translate_write_error)?;

        tx.commit()?;

        Ok(Employee {
            id,
            name: form.name.clone(),
            nip: normalize_nip(form.nip.clone()),
            position: form.position.clone(),
            category: form.category.to_string(),
            division: form.division.clone(),
            education: form.education.clone(),
            religion: form.religion.clone(),
            phone: form.phone.clone(),
            email: form.email.clone(),
            documents,
            created_at: existing.created_at,
        })
    }

    /// Delete an employee by id. Deleting a missing id is not an error;
    /// the return value tells whether a row was removed.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let removed = self.conn.execute("DELETE FROM employees WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    /// Count all employees
    pub fn count_employees(&self) -> Result<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Count employees in one category
    pub fn count_by_category(&self, category: Category) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM employees WHERE category = ?1",
            [category.as_str()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    /// Get dashboard statistics
    pub fn stats(&self) -> Result<EmployeeStats> {
        Ok(EmployeeStats {
            total: self.count_employees()?,
            asn: self.count_by_category(Category::Asn)?,
            p3k: self.count_by_category(Category::P3k)?,
        })
    }

    /// Headcount per division, for every division that has employees
    pub fn division_counts(&self) -> Result<HashMap<String, usize>> {
        let mut stmt = self.conn.prepare("SELECT division, COUNT(*) FROM employees GROUP BY division")?;

        let counts = stmt
            .query_map([], |row| {
                let division: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((division, count as usize))
            })?
            .collect::<rusqlite::Result<HashMap<_, _>>>()?;

        Ok(counts)
    }

    /// Helper to convert a row to an Employee
    fn row_to_employee(&self, row: &rusqlite::Row) -> rusqlite::Result<Employee> {
        let created_at: NaiveDateTime = row.get(14)?;

        Ok(Employee {
            id: row.get(0)?,
            name: row.get(1)?,
            nip: row.get(2)?,
            position: row.get(3)?,
            category: row.get(4)?,
            division: row.get(5)?,
            education: row.get(6)?,
            religion: row.get(7)?,
            phone: row.get(8)?,
            email: row.get(9)?,
            documents: DocumentSet {
                doc_ktp: row.get(10)?,
                doc_sk_pangkat: row.get(11)?,
                doc_sk_berkala: row.get(12)?,
                doc_sk_jabatan: row.get(13)?,
            },
            created_at,
        })
    }
}

/// Map constraint failures on insert/update to the errors callers act on
fn translate_write_error(err: rusqlite::Error) -> Error {
    if let rusqlite::Error::SqliteFailure(failure, Some(message)) = &err {
        if failure.code == ErrorCode::ConstraintViolation {
            if message.contains("UNIQUE constraint failed: employees.nip") {
                return Error::DuplicateNip;
            }
            if message.contains("NOT NULL constraint failed") {
                return Error::Validation(message.clone());
            }
        }
    }
    Error::Storage(err)
}

/// Dashboard statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmployeeStats {
    pub total: usize,
    pub asn: usize,
    pub p3k: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::employee::DocumentField;

    fn sample_form(name: &str, nip: &str, category: Category) -> EmployeeForm {
        EmployeeForm::new(name, "Staf Pelaksana", category, "Sekretariat").with_nip(nip)
    }

    #[test]
    fn test_employee_crud() {
        let store = EmployeeStore::open_in_memory().unwrap();

        let form = sample_form("Budi Santoso", "198501012010011001", Category::Asn)
            .with_contact("08123456789", "budi@example.go.id")
            .with_background("D4/S1", "Islam");
        let id = store.create(&form, &DocumentSet::default()).unwrap();

        let retrieved = store.get(id).unwrap().unwrap();
        assert_eq!(retrieved.name, "Budi Santoso");
        assert_eq!(retrieved.nip.as_deref(), Some("198501012010011001"));
        assert_eq!(retrieved.category, "ASN");
        assert_eq!(retrieved.phone.as_deref(), Some("08123456789"));
        assert_eq!(retrieved.education.as_deref(), Some("D4/S1"));
        assert!(retrieved.documents.is_empty());

        assert!(store.delete(id).unwrap());
        assert!(store.get(id).unwrap().is_none());
    }

    #[test]
    fn test_empty_nip_stored_as_null() {
        let store = EmployeeStore::open_in_memory().unwrap();

        let mut form = sample_form("Siti", "", Category::P3k);
        form.nip = Some(String::new());
        let id = store.create(&form, &DocumentSet::default()).unwrap();

        let raw: Option<String> = store
            .conn
            .query_row("SELECT nip FROM employees WHERE id = ?1", [id], |row| row.get(0))
            .unwrap();
        assert_eq!(raw, None);
        assert_eq!(store.get(id).unwrap().unwrap().nip, None);

        // Several employees without NIP do not collide
        store.create(&form, &DocumentSet::default()).unwrap();
        assert_eq!(store.count_employees().unwrap(), 2);
    }

    #[test]
    fn test_duplicate_nip_rejected() {
        let store = EmployeeStore::open_in_memory().unwrap();

        let first = store.create(&sample_form("Budi", "123", Category::Asn), &DocumentSet::default()).unwrap();
        let err = store
            .create(&sample_form("Andi", "123", Category::P3k), &DocumentSet::default())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateNip));

        let kept = store.get(first).unwrap().unwrap();
        assert_eq!(kept.name, "Budi");
        assert_eq!(store.count_employees().unwrap(), 1);
    }

    #[test]
    fn test_update_duplicate_nip_rejected() {
        let store = EmployeeStore::open_in_memory().unwrap();

        store.create(&sample_form("Budi", "123", Category::Asn), &DocumentSet::default()).unwrap();
        let id = store.create(&sample_form("Andi", "456", Category::Asn), &DocumentSet::default()).unwrap();

        let err = store
            .update(id, &sample_form("Andi", "123", Category::Asn), &DocumentSet::default())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateNip));
        assert_eq!(store.get(id).unwrap().unwrap().nip.as_deref(), Some("456"));
    }

    #[test]
    fn test_update_keeps_documents_not_reuploaded() {
        let store = EmployeeStore::open_in_memory().unwrap();

        let mut docs = DocumentSet::default();
        docs.set(DocumentField::Ktp, "doc_ktp-1700000000000-42.pdf");
        docs.set(DocumentField::SkJabatan, "doc_sk_jabatan-1700000000000-7.pdf");
        let id = store.create(&sample_form("Budi", "123", Category::Asn), &docs).unwrap();

        let form = sample_form("Budi Santoso", "", Category::P3k);
        let updated = store.update(id, &form, &DocumentSet::default()).unwrap();
        assert_eq!(updated.documents.doc_ktp.as_deref(), Some("doc_ktp-1700000000000-42.pdf"));

        let mut replacement = DocumentSet::default();
        replacement.set(DocumentField::Ktp, "doc_ktp-1800000000000-9.pdf");
        store.update(id, &form, &replacement).unwrap();

        let stored = store.get(id).unwrap().unwrap();
        assert_eq!(stored.name, "Budi Santoso");
        assert_eq!(stored.nip, None);
        assert_eq!(stored.category, "P3K");
        assert_eq!(stored.documents.doc_ktp.as_deref(), Some("doc_ktp-1800000000000-9.pdf"));
        assert_eq!(stored.documents.doc_sk_jabatan.as_deref(), Some("doc_sk_jabatan-1700000000000-7.pdf"));
    }

    #[test]
    fn test_update_missing_employee() {
        let store = EmployeeStore::open_in_memory().unwrap();

        let err = store
            .update(99, &sample_form("Budi", "", Category::Asn), &DocumentSet::default())
            .unwrap_err();
        assert!(matches!(err, Error::EmployeeNotFound(99)));
        assert_eq!(store.count_employees().unwrap(), 0);
    }

    #[test]
    fn test_delete_missing_is_idempotent() {
        let store = EmployeeStore::open_in_memory().unwrap();
        store.create(&sample_form("Budi", "", Category::Asn), &DocumentSet::default()).unwrap();

        assert!(!store.delete(12345).unwrap());
        assert_eq!(store.count_employees().unwrap(), 1);
    }

    #[test]
    fn test_stats_counts() {
        let store = EmployeeStore::open_in_memory().unwrap();
        for (name, category) in [("A", Category::Asn), ("B", Category::Asn), ("C", Category::P3k)] {
            store.create(&sample_form(name, "", category), &DocumentSet::default()).unwrap();
        }

        let stats = store.stats().unwrap();
        assert_eq!(stats, EmployeeStats { total: 3, asn: 2, p3k: 1 });
        assert_eq!(stats.asn + stats.p3k, stats.total);
    }

    #[test]
    fn test_list_newest_first() {
        let store = EmployeeStore::open_in_memory().unwrap();

        let stamps = ["2024-01-01 08:00:00", "2024-03-01 08:00:00", "2024-02-01 08:00:00"];
        let mut ids = Vec::new();
        for (i, stamp) in stamps.iter().enumerate() {
            let id = store
                .create(&sample_form(&format!("Pegawai {}", i), "", Category::Asn), &DocumentSet::default())
                .unwrap();
            store
                .conn
                .execute("UPDATE employees SET created_at = ?1 WHERE id = ?2", params![stamp, id])
                .unwrap();
            ids.push(id);
        }

        let listed: Vec<i64> = store.list_all().unwrap().iter().map(|e| e.id).collect();
        assert_eq!(listed, vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_list_with_filter() {
        let store = EmployeeStore::open_in_memory().unwrap();
        store.create(&sample_form("Budi", "111", Category::Asn), &DocumentSet::default()).unwrap();
        store.create(&sample_form("Siti", "222", Category::P3k), &DocumentSet::default()).unwrap();

        let filter = EmployeeFilter { search: None, category: Some(Category::P3k) };
        let found = store.list(&filter).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Siti");
    }

    #[test]
    fn test_division_counts() {
        let store = EmployeeStore::open_in_memory().unwrap();
        store.create(&sample_form("A", "", Category::Asn), &DocumentSet::default()).unwrap();
        store
            .create(
                &EmployeeForm::new("B", "Analis", Category::Asn, "Bidang Politik Dalam Negeri"),
                &DocumentSet::default(),
            )
            .unwrap();
        store.create(&sample_form("C", "", Category::P3k), &DocumentSet::default()).unwrap();

        let counts = store.division_counts().unwrap();
        assert_eq!(counts.get("Sekretariat"), Some(&2));
        assert_eq!(counts.get("Bidang Politik Dalam Negeri"), Some(&1));
    }

    #[test]
    fn test_schema_bootstrap_twice() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kepegawaian.db");

        let first = EmployeeStore::open(&path).unwrap();
        let columns = first.column_names().unwrap();
        drop(first);

        let second = EmployeeStore::open(&path).unwrap();
        assert_eq!(second.column_names().unwrap(), columns);
        assert!(second.migrate().unwrap().is_empty());
    }

    #[test]
    fn test_legacy_table_gains_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.db");

        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                r#"
                CREATE TABLE employees (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL,
                    nip TEXT UNIQUE,
                    position TEXT NOT NULL,
                    category TEXT NOT NULL,
                    division TEXT NOT NULL,
                    phone TEXT,
                    email TEXT,
                    created_at DATETIME DEFAULT CURRENT_TIMESTAMP
                );
                INSERT INTO employees (name, nip, position, category, division, created_at)
                VALUES ('Lama', '999', 'Staf', 'ASN', 'Sekretariat', '2020-01-01 08:00:00');
                INSERT INTO employees (name, nip, position, category, division, created_at)
                VALUES ('Honor', NULL, 'Pramubakti', 'Honorer', 'Sekretariat', '2021-01-01 08:00:00');
                "#,
            )
            .unwrap();
        }

        let store = EmployeeStore::open(&path).unwrap();
        let columns = store.column_names().unwrap();
        for (name, _) in schema::MIGRATED_COLUMNS {
            assert_eq!(columns.iter().filter(|c| c == name).count(), 1, "column {}", name);
        }

        let employees = store.list_all().unwrap();
        assert_eq!(employees.len(), 2);
        assert_eq!(employees[0].name, "Honor");
        assert_eq!(employees[0].category, "Honorer");
        assert_eq!(employees[1].name, "Lama");
        assert_eq!(employees[1].education, None);
        assert!(employees[1].documents.is_empty());

        let stats = store.stats().unwrap();
        assert_eq!(stats, EmployeeStats { total: 2, asn: 1, p3k: 0 });

        let asn_only = store.list(&EmployeeFilter { search: None, category: Some(Category::Asn) }).unwrap();
        assert_eq!(asn_only.len(), 1);
        assert_eq!(asn_only[0].name, "Lama");
    }

    #[test]
    fn test_ping() {
        let store = EmployeeStore::open_in_memory().unwrap();
        store.ping().unwrap();
    }
}
