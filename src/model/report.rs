//! Report definitions - which entity to export and where its fields come from

use serde::{Deserialize, Serialize};

/// A fixed export column supplied by the report author
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticField {
    pub title: String,
    /// Backend field name; derived from the title when omitted
    #[serde(default)]
    pub fieldname: Option<String>,
}

impl StaticField {
    pub fn new(title: &str, fieldname: &str) -> Self {
        Self {
            title: title.to_string(),
            fieldname: Some(fieldname.to_string()),
        }
    }

    /// The backend field this column reads
    ///
    /// Without an explicit fieldname the title is snake-cased, so
    /// "Date of Joining" reads `date_of_joining`.
    pub fn key(&self) -> String {
        match &self.fieldname {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            _ => snake_case(&self.title),
        }
    }
}

/// Where a report's exportable fields come from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaSource {
    /// Introspect the entity's DocType metadata
    #[default]
    Dynamic,
    /// Use a caller-supplied list of columns, no grouping
    Static { fields: Vec<StaticField> },
}

/// Comparison used by a server-side filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    #[default]
    Equals,
    Like,
}

impl FilterOp {
    pub fn operator(&self) -> &'static str {
        match self {
            FilterOp::Equals => "=",
            FilterOp::Like => "like",
        }
    }
}

/// One server-side filter condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub field: String,
    #[serde(default)]
    pub op: FilterOp,
    pub value: String,
}

impl FilterCondition {
    pub fn equals(field: &str, value: &str) -> Self {
        Self {
            field: field.to_string(),
            op: FilterOp::Equals,
            value: value.to_string(),
        }
    }

    /// Value as sent to the backend (`like` is a substring match)
    pub fn wire_value(&self) -> String {
        match self.op {
            FilterOp::Equals => self.value.clone(),
            FilterOp::Like => format!("%{}%", self.value),
        }
    }
}

/// A named export over one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportDefinition {
    pub name: String,
    pub entity: String,
    #[serde(default)]
    pub source: SchemaSource,
    #[serde(default)]
    pub filters: Vec<FilterCondition>,
}

impl ReportDefinition {
    pub fn dynamic(name: &str, entity: &str) -> Self {
        Self {
            name: name.to_string(),
            entity: entity.to_string(),
            source: SchemaSource::Dynamic,
            filters: Vec::new(),
        }
    }

    pub fn source_label(&self) -> &'static str {
        match self.source {
            SchemaSource::Dynamic => "dynamic",
            SchemaSource::Static { .. } => "static",
        }
    }

    /// Reports offered when the catalogue is empty
    pub fn builtin() -> Vec<ReportDefinition> {
        vec![
            ReportDefinition::dynamic("Employee Report", "Employee"),
            ReportDefinition {
                name: "Employee Summary".to_string(),
                entity: "Employee".to_string(),
                source: SchemaSource::Static {
                    fields: vec![
                        StaticField::new("Employee ID", "name"),
                        StaticField::new("Employee Name", "employee_name"),
                        StaticField::new("Department", "department"),
                        StaticField::new("Designation", "designation"),
                        StaticField::new("Date of Joining", "date_of_joining"),
                        StaticField::new("Status", "status"),
                    ],
                },
                filters: Vec::new(),
            },
        ]
    }
}

fn snake_case(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    for word in title
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        if !out.is_empty() {
            out.push('_');
        }
        out.push_str(&word.to_lowercase());
    }
    out
}
