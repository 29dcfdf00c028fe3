//! Schema source adapter - turns a report definition into the field tree roots

use crate::model::field::{FieldDef, FieldNode};
use crate::model::report::{ReportDefinition, SchemaSource, StaticField};
use crate::services::client::DocumentStore;
use crate::services::error::ApiError;
use tracing::{debug, info};

/// Title used for fields that appear before any section break, or under an
/// unlabeled one
pub const FALLBACK_SECTION_TITLE: &str = "Other Details";

const SECTION_BREAK: &str = "Section Break";

/// Layout and non-tabular field types that never become export columns
const SKIPPED_FIELD_TYPES: &[&str] = &[
    "Column Break",
    "Tab Break",
    "Button",
    "HTML",
    "Heading",
    "Fold",
    "Image",
    "Attach",
    "Attach Image",
    "Rating",
    "Barcode",
    "Table",
    "Table MultiSelect",
];

fn is_skipped(fieldtype: &str) -> bool {
    SKIPPED_FIELD_TYPES.contains(&fieldtype)
}

/// Group ordered field definitions into sections
///
/// A "Section Break" starts a new section titled with its label. Sections
/// left without leaves are dropped.
pub fn build_sections(defs: &[FieldDef]) -> Vec<FieldNode> {
    fn flush(title: &str, leaves: &mut Vec<FieldNode>, sections: &mut Vec<FieldNode>) {
        if !leaves.is_empty() {
            let key = format!("section-{}", sections.len());
            sections.push(FieldNode::section(&key, title, std::mem::take(leaves)));
        }
    }

    let mut sections = Vec::new();
    let mut title = FALLBACK_SECTION_TITLE.to_string();
    let mut leaves: Vec<FieldNode> = Vec::new();

    for def in defs {
        if def.fieldtype == SECTION_BREAK {
            flush(&title, &mut leaves, &mut sections);
            title = match def.label.as_deref().map(str::trim) {
                Some(label) if !label.is_empty() => label.to_string(),
                _ => FALLBACK_SECTION_TITLE.to_string(),
            };
            continue;
        }
        if is_skipped(&def.fieldtype) || def.fieldname.is_empty() {
            continue;
        }
        leaves.push(FieldNode::leaf(&def.fieldname, &def.display_label()));
    }
    flush(&title, &mut leaves, &mut sections);

    sections
}

/// Flat leaves for a caller-supplied column list
pub fn static_fields(fields: &[StaticField]) -> Vec<FieldNode> {
    fields
        .iter()
        .map(|f| FieldNode::leaf(&f.key(), &f.title))
        .collect()
}

/// Exportable fields for `report`
///
/// Static reports never touch the network.
pub fn fetch_fields(
    store: &dyn DocumentStore,
    report: &ReportDefinition,
) -> Result<Vec<FieldNode>, ApiError> {
    match &report.source {
        SchemaSource::Static { fields } => {
            debug!(report = %report.name, count = fields.len(), "using static field list");
            Ok(static_fields(fields))
        }
        SchemaSource::Dynamic => {
            let defs = store.meta(&report.entity)?;
            let sections = build_sections(&defs);
            info!(
                entity = %report.entity,
                definitions = defs.len(),
                sections = sections.len(),
                "field metadata loaded"
            );
            Ok(sections)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::client::fake::MemoryStore;

    fn def(fieldname: &str, label: &str, fieldtype: &str) -> FieldDef {
        FieldDef {
            fieldname: fieldname.to_string(),
            label: if label.is_empty() {
                None
            } else {
                Some(label.to_string())
            },
            fieldtype: fieldtype.to_string(),
        }
    }

    #[test]
    fn test_build_sections_groups_and_skips() {
        let defs = vec![
            def("employee_name", "Full Name", "Data"),
            def("sb1", "Personal", "Section Break"),
            def("first_name", "First Name", "Data"),
            def("cb1", "", "Column Break"),
            def("photo", "Photo", "Attach Image"),
            def("date_of_birth", "Date of Birth", "Date"),
            def("sb2", "Empty Section", "Section Break"),
            def("html1", "", "HTML"),
            def("sb3", "", "Section Break"),
            def("ctc", "", "Currency"),
        ];

        let sections = build_sections(&defs);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Other Details", "Personal", "Other Details"]);

        let personal: Vec<&str> = sections[1].children.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(personal, vec!["first_name", "date_of_birth"]);

        // Unlabeled fields fall back to their fieldname
        assert_eq!(sections[2].children[0].title, "ctc");

        // Synthetic keys stay unique
        assert_ne!(sections[0].key, sections[2].key);
    }

    #[test]
    fn test_static_fields_are_flat() {
        let fields = vec![
            StaticField::new("Employee ID", "name"),
            StaticField {
                title: "Date of Joining".to_string(),
                fieldname: None,
            },
        ];
        let nodes = static_fields(&fields);
        assert_eq!(nodes.len(), 2);
        assert!(nodes.iter().all(|n| !n.is_section()));
        assert_eq!(nodes[1].key, "date_of_joining");
    }

    #[test]
    fn test_fetch_fields_dynamic_and_failure() {
        let mut store = MemoryStore::default();
        store.meta.insert(
            "Employee".to_string(),
            vec![def("sb", "Basics", "Section Break"), def("name", "ID", "Data")],
        );
        let report = ReportDefinition::dynamic("Employees", "Employee");
        let fields = fetch_fields(&store, &report).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].title, "Basics");

        let missing = ReportDefinition::dynamic("Ghosts", "Ghost");
        assert!(matches!(
            fetch_fields(&store, &missing),
            Err(ApiError::NotFound(_))
        ));
    }

    #[test]
    fn test_static_report_skips_network() {
        let store = MemoryStore::failing("offline");
        let report = ReportDefinition::builtin()
            .into_iter()
            .find(|r| r.source_label() == "static")
            .unwrap();
        let fields = fetch_fields(&store, &report).unwrap();
        assert!(!fields.is_empty());
    }
}
