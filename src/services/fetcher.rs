//! Data fetcher - retrieves rows for the current selection

use crate::model::field::SelectionEntry;
use crate::model::report::ReportDefinition;
use crate::model::row::{Row, IDENTITY_FIELD};
use crate::services::client::DocumentStore;
use crate::services::error::ApiError;
use tracing::info;

/// Backend fields to request: selection keys in order, then the identity field
/// unless the user already picked it
pub fn requested_fields(selection: &[SelectionEntry]) -> Vec<String> {
    let mut fields: Vec<String> = Vec::with_capacity(selection.len() + 1);
    for entry in selection {
        if !fields.contains(&entry.key) {
            fields.push(entry.key.clone());
        }
    }
    if !fields.iter().any(|f| f == IDENTITY_FIELD) {
        fields.push(IDENTITY_FIELD.to_string());
    }
    fields
}

/// One request for every matching row; pagination happens client-side
pub fn fetch_rows(
    store: &dyn DocumentStore,
    report: &ReportDefinition,
    selection: &[SelectionEntry],
) -> Result<Vec<Row>, ApiError> {
    let fields = requested_fields(selection);
    let rows = store.list(&report.entity, &fields, &report.filters)?;
    info!(
        entity = %report.entity,
        fields = fields.len(),
        rows = rows.len(),
        "rows fetched"
    );
    Ok(rows)
}
