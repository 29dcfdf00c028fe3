//! CSV encoder

use super::ExportTable;
use crate::services::error::ExportError;

/// Header row of titles, then one record per row; nulls become empty fields
pub fn encode(table: &ExportTable) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|cell| cell.export_text()))?;
    }
    writer
        .into_inner()
        .map_err(|e| ExportError::Encode(e.to_string()))
}
