//! Export encoders
//!
//! Every encoder consumes the same `ExportTable`: column titles in selection
//! order plus one projected cell per column for each row. Bytes are built
//! fully in memory and only then written, so a failed encode leaves no file.

pub mod delimited;
pub mod pdf;
pub mod xlsx;

use crate::model::dialog::ExportFormat;
use crate::model::field::SelectionEntry;
use crate::model::report::ReportDefinition;
use crate::model::row::{CellValue, Row};
use crate::services::client::DocumentStore;
use crate::services::error::ExportError;
use crate::services::fetcher;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Rows projected onto the selected columns
#[derive(Debug, Clone, PartialEq)]
pub struct ExportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl ExportTable {
    /// Project `rows` onto `selection`, in selection order
    ///
    /// Columns are matched by position, so two entries sharing a title
    /// still read their own backend field.
    pub fn project(title: &str, selection: &[SelectionEntry], rows: &[Row]) -> Self {
        let headers = selection.iter().map(|e| e.title.clone()).collect();
        let rows = rows
            .iter()
            .map(|row| {
                selection
                    .iter()
                    .map(|entry| row.get(&entry.key).clone())
                    .collect()
            })
            .collect();
        Self {
            title: title.to_string(),
            headers,
            rows,
        }
    }

    pub fn column_count(&self) -> usize {
        self.headers.len()
    }
}

/// `<Report>_<YYYY-MM-DD>.<ext>` with path-hostile characters replaced
pub fn export_file_name(report_name: &str, date: NaiveDate, format: ExportFormat) -> String {
    let stem: String = report_name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let stem = if stem.is_empty() { "export".to_string() } else { stem };
    format!(
        "{}_{}.{}",
        stem,
        date.format("%Y-%m-%d"),
        format.extension()
    )
}

/// Encode `table` in `format`
pub fn encode(
    format: ExportFormat,
    table: &ExportTable,
    generated_at: NaiveDateTime,
) -> Result<Vec<u8>, ExportError> {
    if table.headers.is_empty() {
        return Err(ExportError::EmptySelection);
    }
    match format {
        ExportFormat::Xlsx => xlsx::encode(table),
        ExportFormat::Pdf => pdf::encode(table, generated_at),
        ExportFormat::Csv => delimited::encode(table),
    }
}

/// Encode and write into `dir`, returning the written path
///
/// The file is written under a temporary name and renamed into place.
pub fn write_export(
    format: ExportFormat,
    table: &ExportTable,
    dir: &Path,
    generated_at: NaiveDateTime,
) -> Result<PathBuf, ExportError> {
    let bytes = encode(format, table, generated_at)?;

    fs::create_dir_all(dir)?;
    let path = dir.join(export_file_name(&table.title, generated_at.date(), format));
    let partial = path.with_extension(format!("{}.part", format.extension()));
    if let Err(err) = fs::write(&partial, &bytes) {
        let _ = fs::remove_file(&partial);
        return Err(err.into());
    }
    fs::rename(&partial, &path)?;

    info!(
        format = format.extension(),
        columns = table.column_count(),
        rows = table.rows.len(),
        path = %path.display(),
        "export written"
    );
    Ok(path)
}

/// Fetch rows for `selection` and export them
///
/// An empty selection is refused before any request is made.
pub fn run_export(
    store: &dyn DocumentStore,
    report: &ReportDefinition,
    selection: &[SelectionEntry],
    format: ExportFormat,
    dir: &Path,
) -> Result<PathBuf, ExportError> {
    if selection.is_empty() {
        warn!(report = %report.name, "export refused: no columns selected");
        return Err(ExportError::EmptySelection);
    }
    let rows = fetcher::fetch_rows(store, report, selection)?;
    let table = ExportTable::project(&report.name, selection, &rows);
    write_export(format, &table, dir, Local::now().naive_local())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::fake::MemoryStore;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn sample_rows() -> Vec<Row> {
        vec![
            Row::from_pairs([("name", text("A")), ("dept", text("X"))]),
            Row::from_pairs([("name", text("B")), ("dept", text("Y"))]),
        ]
    }

    fn selection() -> Vec<SelectionEntry> {
        vec![
            SelectionEntry::new("name", "Name"),
            SelectionEntry::new("dept", "Department"),
        ]
    }

    fn generated_at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 17)
            .unwrap()
            .and_hms_opt(14, 30, 0)
            .unwrap()
    }

    #[test]
    fn test_project_follows_selection_order() {
        let table = ExportTable::project("Employees", &selection(), &sample_rows());
        assert_eq!(table.headers, vec!["Name", "Department"]);
        assert_eq!(table.rows[0], vec![text("A"), text("X")]);
        assert_eq!(table.rows[1], vec![text("B"), text("Y")]);

        let reversed: Vec<SelectionEntry> = selection().into_iter().rev().collect();
        let table = ExportTable::project("Employees", &reversed, &sample_rows());
        assert_eq!(table.headers, vec!["Department", "Name"]);
        assert_eq!(table.rows[0], vec![text("X"), text("A")]);
    }

    #[test]
    fn test_missing_cells_are_null() {
        let rows = vec![Row::from_pairs([("name", text("A"))])];
        let table = ExportTable::project("Employees", &selection(), &rows);
        assert_eq!(table.rows[0][1], CellValue::Null);
    }

    #[test]
    fn test_duplicate_titles_keep_their_own_keys() {
        let selection = vec![
            SelectionEntry::new("name", "Name"),
            SelectionEntry::new("dept", "Name"),
        ];
        let table = ExportTable::project("Employees", &selection, &sample_rows());
        assert_eq!(table.rows[0], vec![text("A"), text("X")]);
    }

    #[test]
    fn test_export_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
        assert_eq!(
            export_file_name("Employee Report", date, ExportFormat::Xlsx),
            "Employee Report_2024-01-09.xlsx"
        );
        assert_eq!(
            export_file_name("Payroll/Q1: draft", date, ExportFormat::Pdf),
            "Payroll_Q1_ draft_2024-01-09.pdf"
        );
        assert_eq!(
            export_file_name("  ", date, ExportFormat::Csv),
            "export_2024-01-09.csv"
        );
    }

    #[test]
    fn test_write_export_creates_named_file() {
        let dir = tempfile::tempdir().unwrap();
        let table = ExportTable::project("Employees", &selection(), &sample_rows());
        let path = write_export(ExportFormat::Csv, &table, dir.path(), generated_at()).unwrap();

        assert_eq!(
            path.file_name().unwrap().to_string_lossy(),
            "Employees_2024-05-17.csv"
        );
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "Name,Department\nA,X\nB,Y\n");
        // No temporary file left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn test_empty_selection_makes_no_request_and_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::with_rows("Employee", sample_rows());
        let report = ReportDefinition::dynamic("Employees", "Employee");

        let result = run_export(&store, &report, &[], ExportFormat::Xlsx, dir.path());
        assert!(matches!(result, Err(ExportError::EmptySelection)));
        assert!(store.calls().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_fetch_failure_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::failing("timeout");
        let report = ReportDefinition::dynamic("Employees", "Employee");

        let result = run_export(&store, &report, &selection(), ExportFormat::Pdf, dir.path());
        assert!(matches!(result, Err(ExportError::Fetch(_))));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_run_export_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::with_rows("Employee", sample_rows());
        let report = ReportDefinition::dynamic("Employees", "Employee");

        let path = run_export(&store, &report, &selection(), ExportFormat::Xlsx, dir.path()).unwrap();
        assert_eq!(path.extension().unwrap(), "xlsx");
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }
}
