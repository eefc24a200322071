use tabled::{settings::Style, Table, Tabled};
use crate::employee::{DivisionShare, Employee};
use crate::storage::EmployeeStats;

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

/// One line of the employee listing
#[derive(Tabled)]
pub struct EmployeeRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Nama")]
    pub name: String,
    #[tabled(rename = "NIP")]
    pub nip: String,
    #[tabled(rename = "Jabatan")]
    pub position: String,
    #[tabled(rename = "Kategori")]
    pub category: String,
    #[tabled(rename = "Bidang")]
    pub division: String,
    #[tabled(rename = "Dokumen")]
    pub documents: String,
}

impl From<&Employee> for EmployeeRow {
    fn from(employee: &Employee) -> Self {
        Self {
            id: employee.id,
            name: employee.name.clone(),
            nip: employee.nip.clone().unwrap_or_else(|| "-".to_string()),
            position: employee.position.clone(),
            category: employee.category.clone(),
            division: employee.division.clone(),
            documents: format!("{}/4", employee.documents.filenames().count()),
        }
    }
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &EmployeeStats, divisions: &[DivisionShare]) -> String {
    let mut builder = TableBuilder::new();
    builder.add_row("Total Pegawai", &stats.total.to_string());
    builder.add_row("ASN", &stats.asn.to_string());
    builder.add_row("P3K", &stats.p3k.to_string());
    for share in divisions {
        builder.add_row(&share.division, &format!("{} ({:.1}%)", share.count, share.percentage));
    }
    builder.build()
}

pub fn employee_table(employees: &[Employee]) -> String {
    let rows: Vec<EmployeeRow> = employees.iter().map(EmployeeRow::from).collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
