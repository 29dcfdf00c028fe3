//! Model layer - centralized state management
//!
//! This module contains all state-related types:
//! - Report definitions, field nodes and the searchable field tree
//! - `SelectionList` - the ordered export columns
//! - Rows, preview grid state and the export dialog state machine
//! - `Notifications` and the `ModalStack`

pub mod dialog;
pub mod field;
pub mod field_tree;
pub mod modal;
pub mod notification;
pub mod preview;
pub mod report;
pub mod row;
pub mod selection;
pub mod ui;

// Re-export commonly used types
pub use dialog::{Blocked, DialogPhase, DialogRequest, ExportDialog, ExportFormat, SchemaStatus};
pub use field::{FieldDef, FieldNode, SelectionEntry};
pub use report::ReportDefinition;
pub use row::{CellValue, Row};
pub use selection::SelectionList;
