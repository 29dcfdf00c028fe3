//! Row data returned by the document store

use chrono::{Locale, NaiveDate, NaiveDateTime};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::env;
use std::sync::LazyLock;

/// Field every fetched row carries so it stays individually addressable
pub const IDENTITY_FIELD: &str = "name";

static NULL_CELL: CellValue = CellValue::Null;

/// Locale for preview dates, from `LC_ALL`, `LC_TIME` or `LANG`
static DISPLAY_LOCALE: LazyLock<Locale> = LazyLock::new(|| {
    ["LC_ALL", "LC_TIME", "LANG"]
        .iter()
        .filter_map(|var| env::var(var).ok())
        .find_map(|value| parse_locale(&value))
        .unwrap_or(Locale::POSIX)
});

/// `de_DE.UTF-8@euro` → `de_DE`; `None` for unknown or empty names
pub fn parse_locale(value: &str) -> Option<Locale> {
    let name = value.split(['.', '@']).next()?.trim();
    if name.is_empty() {
        return None;
    }
    Locale::try_from(name).ok()
}

/// A scalar cell value, typed at the API boundary
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Number(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Text(String),
}

impl CellValue {
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => CellValue::Null,
            Value::Bool(b) => CellValue::Bool(*b),
            Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Null),
            Value::String(s) => Self::from_text(s),
            other => CellValue::Text(other.to_string()),
        }
    }

    /// Recognise the backend's date and datetime string forms
    fn from_text(s: &str) -> Self {
        if s.len() == 10 {
            if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                return CellValue::Date(date);
            }
        }
        if s.len() >= 19 {
            for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"] {
                if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                    return CellValue::DateTime(dt);
                }
            }
        }
        CellValue::Text(s.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text shown in the preview grid
    pub fn display(&self) -> String {
        self.display_in(*DISPLAY_LOCALE)
    }

    /// Preview text with dates in `locale`'s date format
    pub fn display_in(&self, locale: Locale) -> String {
        match self {
            CellValue::Null => "-".to_string(),
            CellValue::Bool(true) => "Yes".to_string(),
            CellValue::Bool(false) => "No".to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Date(d) => d.format_localized("%x", locale).to_string(),
            CellValue::DateTime(dt) => format!(
                "{} {}",
                dt.date().format_localized("%x", locale),
                dt.format("%H:%M")
            ),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Plain value text used by the file encoders; empty for nulls
    pub fn export_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Number(n) => format_number(*n),
            CellValue::Date(d) => d.format("%Y-%m-%d").to_string(),
            CellValue::DateTime(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            CellValue::Text(s) => s.clone(),
        }
    }

    /// Stringified form used when sorting mixed values
    pub fn sort_text(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            other => other.export_text().to_lowercase(),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

/// One entity instance: backend field name -> value
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    cells: HashMap<String, CellValue>,
}

impl Row {
    pub fn from_json_map(map: &Map<String, Value>) -> Self {
        let cells = map
            .iter()
            .map(|(k, v)| (k.clone(), CellValue::from_json(v)))
            .collect();
        Self { cells }
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, CellValue)>,
        K: Into<String>,
    {
        Self {
            cells: pairs.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Cell for `key`, `Null` when the row lacks the field
    pub fn get(&self, key: &str) -> &CellValue {
        self.cells.get(key).unwrap_or(&NULL_CELL)
    }

    pub fn identity(&self) -> Option<&str> {
        match self.cells.get(IDENTITY_FIELD) {
            Some(CellValue::Text(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cell_types_from_json() {
        assert_eq!(CellValue::from_json(&json!(null)), CellValue::Null);
        assert_eq!(CellValue::from_json(&json!(true)), CellValue::Bool(true));
        assert_eq!(CellValue::from_json(&json!(42)), CellValue::Number(42.0));
        assert_eq!(
            CellValue::from_json(&json!("2024-03-01")),
            CellValue::Date(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
        );
        assert!(matches!(
            CellValue::from_json(&json!("2024-03-01 09:15:00.250000")),
            CellValue::DateTime(_)
        ));
        assert_eq!(
            CellValue::from_json(&json!("HR-EMP-0001")),
            CellValue::Text("HR-EMP-0001".to_string())
        );
    }

    #[test]
    fn test_display_placeholders() {
        assert_eq!(CellValue::Null.display(), "-");
        assert_eq!(CellValue::Bool(true).display(), "Yes");
        assert_eq!(CellValue::Bool(false).display(), "No");
        assert_eq!(CellValue::Number(1500.0).display(), "1500");
        assert_eq!(CellValue::Number(2.5).display(), "2.5");
    }

    #[test]
    fn test_dates_follow_locale() {
        let date = CellValue::Date(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap());
        assert_eq!(date.display_in(Locale::de_DE), "17.05.2024");
        assert_eq!(date.display_in(Locale::en_US), "05/17/2024");
        // export text stays ISO whatever the locale
        assert_eq!(date.export_text(), "2024-05-17");
    }

    #[test]
    fn test_parse_locale_names() {
        assert!(matches!(parse_locale("de_DE.UTF-8"), Some(Locale::de_DE)));
        assert!(matches!(parse_locale("en_US"), Some(Locale::en_US)));
        assert!(matches!(parse_locale("fr_FR@euro"), Some(Locale::fr_FR)));
        assert!(parse_locale("").is_none());
        assert!(parse_locale("xx_NOPE").is_none());
    }

    #[test]
    fn test_export_text_is_empty_for_null() {
        assert_eq!(CellValue::Null.export_text(), "");
        let date = CellValue::Date(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(date.export_text(), "2023-12-31");
    }

    #[test]
    fn test_row_lookup_and_identity() {
        let map = json!({"name": "EMP-1", "department": "Sales"});
        let row = Row::from_json_map(map.as_object().unwrap());
        assert_eq!(row.identity(), Some("EMP-1"));
        assert_eq!(row.get("department"), &CellValue::Text("Sales".to_string()));
        assert!(row.get("missing").is_null());
        assert_eq!(row.len(), 2);
    }
}
