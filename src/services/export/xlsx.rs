//! Spreadsheet encoder

use super::ExportTable;
use crate::model::row::CellValue;
use crate::services::error::ExportError;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook};

/// Width applied to every column
pub const COLUMN_WIDTH: f64 = 20.0;

const HEADER_FILL: u32 = 0x4472C4;

/// Excel limits sheet names to 31 characters and forbids a few symbols
pub fn sheet_name(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim().trim_matches('\'').trim();
    let name: String = cleaned.chars().take(31).collect();
    if name.is_empty() {
        "Sheet1".to_string()
    } else {
        name
    }
}

pub fn encode(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let header_format = Format::new()
        .set_bold()
        .set_font_color(Color::White)
        .set_background_color(Color::RGB(HEADER_FILL))
        .set_border(FormatBorder::Thin);

    let sheet = workbook.add_worksheet();
    sheet.set_name(&sheet_name(&table.title))?;

    for (col, title) in table.headers.iter().enumerate() {
        let col = col as u16;
        sheet.set_column_width(col, COLUMN_WIDTH)?;
        sheet.write_string_with_format(0, col, title, &header_format)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let row_num = (idx + 1) as u32;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Null => {}
                CellValue::Bool(b) => {
                    sheet.write_boolean(row_num, col, *b)?;
                }
                CellValue::Number(n) => {
                    sheet.write_number(row_num, col, *n)?;
                }
                other => {
                    sheet.write_string(row_num, col, &other.export_text())?;
                }
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::field::SelectionEntry;
    use crate::model::row::Row;
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    /// Workbook unpacked far enough to read cell values back
    struct Sheet {
        xml: String,
        shared: Vec<String>,
    }

    impl Sheet {
        fn read(bytes: Vec<u8>) -> Self {
            let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
            let mut part = |name: &str| {
                let mut text = String::new();
                archive.by_name(name).unwrap().read_to_string(&mut text).unwrap();
                text
            };
            let xml = part("xl/worksheets/sheet1.xml");
            let strings = part("xl/sharedStrings.xml");
            let shared = strings
                .split("<si>")
                .skip(1)
                .map(|si| {
                    let start = si.find("<t").and_then(|t| si[t..].find('>').map(|g| t + g + 1));
                    let end = si.find("</t>");
                    match (start, end) {
                        (Some(start), Some(end)) => si[start..end].to_string(),
                        _ => String::new(),
                    }
                })
                .collect();
            Self { xml, shared }
        }

        /// The `<c>` element at `cell`, if one was written
        fn element(&self, cell: &str) -> Option<&str> {
            let start = self.xml.find(&format!("<c r=\"{}\"", cell))?;
            let rest = &self.xml[start..];
            let end = [rest.find("</c>").map(|e| e + 4), rest.find("/>").map(|e| e + 2)]
                .into_iter()
                .flatten()
                .min()?;
            Some(&rest[..end])
        }

        fn value(&self, cell: &str) -> Option<String> {
            let element = self.element(cell)?;
            let start = element.find("<v>")? + 3;
            let end = element.find("</v>")?;
            let raw = &element[start..end];
            if element.contains("t=\"s\"") {
                let idx: usize = raw.parse().ok()?;
                self.shared.get(idx).cloned()
            } else {
                Some(raw.to_string())
            }
        }
    }

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    #[test]
    fn test_sheet_name_rules() {
        assert_eq!(sheet_name("Employee Report"), "Employee Report");
        assert_eq!(sheet_name("Q1/Q2 [draft]"), "Q1_Q2 _draft_");
        assert_eq!(sheet_name("'quoted'"), "quoted");
        assert_eq!(sheet_name(""), "Sheet1");
        assert_eq!(sheet_name(&"x".repeat(40)).len(), 31);
    }

    #[test]
    fn test_encode_produces_workbook() {
        let table = ExportTable {
            title: "Employees".to_string(),
            headers: vec!["Name".to_string(), "Active".to_string(), "Salary".to_string()],
            rows: vec![vec![
                CellValue::Text("A".to_string()),
                CellValue::Bool(true),
                CellValue::Number(1200.0),
            ]],
        };
        let bytes = encode(&table).unwrap();
        assert!(bytes.starts_with(b"PK"));
    }

    #[test]
    fn test_sheet_reads_back_selection() {
        let selection = vec![
            SelectionEntry::new("name", "Name"),
            SelectionEntry::new("dept", "Department"),
        ];
        let rows = vec![
            Row::from_pairs([("name", text("A")), ("dept", text("X"))]),
            Row::from_pairs([("name", text("B")), ("dept", text("Y"))]),
        ];
        let table = ExportTable::project("Employee Report", &selection, &rows);

        let sheet = Sheet::read(encode(&table).unwrap());
        let grid: Vec<Vec<Option<String>>> = (1..=3)
            .map(|row| ["A", "B"].iter().map(|col| sheet.value(&format!("{}{}", col, row))).collect())
            .collect();
        let expected = [["Name", "Department"], ["A", "X"], ["B", "Y"]];
        for (got, want) in grid.iter().zip(expected) {
            let want: Vec<Option<String>> = want.iter().map(|s| Some(s.to_string())).collect();
            assert_eq!(got, &want);
        }
        assert!(sheet.element("A4").is_none());
    }

    #[test]
    fn test_typed_cells_and_blank_missing_values() {
        let selection = vec![
            SelectionEntry::new("name", "Name"),
            SelectionEntry::new("active", "Active"),
            SelectionEntry::new("gross_pay", "Gross Pay"),
        ];
        let rows = vec![
            Row::from_pairs([
                ("name", text("A")),
                ("active", CellValue::Bool(true)),
                ("gross_pay", CellValue::Number(1200.0)),
            ]),
            Row::from_pairs([("name", text("B")), ("gross_pay", CellValue::Number(950.5))]),
        ];
        let table = ExportTable::project("Salary Slip", &selection, &rows);

        let sheet = Sheet::read(encode(&table).unwrap());
        assert_eq!(sheet.value("C1").as_deref(), Some("Gross Pay"));

        let pay = sheet.element("C2").unwrap();
        assert!(!pay.contains("t=\"s\""));
        assert_eq!(sheet.value("C2").as_deref(), Some("1200"));
        assert_eq!(sheet.value("C3").as_deref(), Some("950.5"));

        assert!(sheet.element("B2").unwrap().contains("t=\"b\""));
        assert_eq!(sheet.value("B2").as_deref(), Some("1"));

        // No value for the missing key, the cell stays empty
        assert!(sheet.element("B3").is_none());
        assert_eq!(sheet.value("A3").as_deref(), Some("B"));
    }
}
