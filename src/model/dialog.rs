//! Export dialog state machine
//!
//! ```text
//! Closed -> Open -> {Previewing | Exporting} -> Open -> ... -> Closed
//! ```
//!
//! Each `open` starts a new session. Background results carry the session
//! they were started for and are dropped once that session is over.

use super::field::FieldNode;
use super::field_tree::FieldTree;
use super::preview::PreviewGrid;
use super::report::ReportDefinition;
use super::row::Row;
use super::selection::SelectionList;

/// Output file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExportFormat {
    Xlsx,
    Pdf,
    Csv,
}

impl ExportFormat {
    pub fn all() -> [ExportFormat; 3] {
        [ExportFormat::Xlsx, ExportFormat::Pdf, ExportFormat::Csv]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "Excel",
            ExportFormat::Pdf => "PDF",
            ExportFormat::Csv => "CSV",
        }
    }

    pub fn parse(s: &str) -> Option<ExportFormat> {
        match s.to_ascii_lowercase().as_str() {
            "xlsx" | "excel" => Some(ExportFormat::Xlsx),
            "pdf" => Some(ExportFormat::Pdf),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogPhase {
    Closed,
    Open,
    Previewing,
    Exporting(ExportFormat),
}

/// Loading state of the field list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SchemaStatus {
    #[default]
    Loading,
    Ready,
    Failed(String),
}

/// What the user asked the dialog to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogRequest {
    Preview,
    Export(ExportFormat),
}

/// Why a request was refused without touching the network
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Blocked {
    Closed,
    EmptySelection,
    Busy,
    /// A field list request is still pending
    Loading,
}

impl Blocked {
    pub fn message(&self) -> &'static str {
        match self {
            Blocked::Closed => "The export dialog is not open",
            Blocked::EmptySelection => "Select at least one column first",
            Blocked::Busy => "A request is already running",
            Blocked::Loading => "Fields are still loading",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ExportDialog {
    pub phase: DialogPhase,
    session: u64,
    pub report: Option<ReportDefinition>,
    pub tree: FieldTree,
    pub selection: SelectionList,
    pub schema_status: SchemaStatus,
    /// Rows of the last successful preview; kept when a later fetch fails
    pub preview_rows: Option<Vec<Row>>,
    pub grid: PreviewGrid,
    default_page_size: usize,
}

impl Default for ExportDialog {
    fn default() -> Self {
        Self::new(super::preview::DEFAULT_PAGE_SIZE)
    }
}

impl ExportDialog {
    pub fn new(default_page_size: usize) -> Self {
        Self {
            phase: DialogPhase::Closed,
            session: 0,
            report: None,
            tree: FieldTree::default(),
            selection: SelectionList::new(),
            schema_status: SchemaStatus::Loading,
            preview_rows: None,
            grid: PreviewGrid::new(default_page_size),
            default_page_size,
        }
    }

    /// Open for `report` with an empty selection; returns the new session id
    pub fn open(&mut self, report: ReportDefinition) -> u64 {
        self.session += 1;
        self.phase = DialogPhase::Open;
        self.report = Some(report);
        self.tree = FieldTree::default();
        self.selection = SelectionList::new();
        self.schema_status = SchemaStatus::Loading;
        self.preview_rows = None;
        self.grid = PreviewGrid::new(self.default_page_size);
        self.session
    }

    /// Close and forget everything; in-flight results become stale
    pub fn close(&mut self) {
        self.session += 1;
        self.phase = DialogPhase::Closed;
        self.report = None;
        self.tree = FieldTree::default();
        self.selection.clear();
        self.preview_rows = None;
    }

    pub fn session(&self) -> u64 {
        self.session
    }

    pub fn is_open(&self) -> bool {
        self.phase != DialogPhase::Closed
    }

    /// Whether a result tagged with `session` may still be applied
    pub fn accepts(&self, session: u64) -> bool {
        self.is_open() && session == self.session
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.phase, DialogPhase::Previewing | DialogPhase::Exporting(_))
    }

    /// Whether preview/export triggers should be enabled
    pub fn can_request(&self) -> bool {
        self.phase == DialogPhase::Open && !self.selection.is_empty()
    }

    /// Whether the field list may be requested again
    pub fn can_reload(&self) -> bool {
        self.is_open() && self.schema_status != SchemaStatus::Loading
    }

    /// Mark the field list as loading again; refused while a load is pending
    pub fn begin_reload(&mut self) -> Result<u64, Blocked> {
        if !self.is_open() {
            return Err(Blocked::Closed);
        }
        if self.schema_status == SchemaStatus::Loading {
            return Err(Blocked::Loading);
        }
        self.schema_status = SchemaStatus::Loading;
        Ok(self.session)
    }

    pub fn set_fields(&mut self, fields: Vec<FieldNode>) {
        self.tree = FieldTree::new(fields);
        self.schema_status = SchemaStatus::Ready;
    }

    pub fn set_schema_failed(&mut self, message: String) {
        self.tree = FieldTree::default();
        self.schema_status = SchemaStatus::Failed(message);
    }

    /// Enter `Previewing`/`Exporting`, or say why not
    pub fn begin(&mut self, request: DialogRequest) -> Result<u64, Blocked> {
        match self.phase {
            DialogPhase::Closed => return Err(Blocked::Closed),
            DialogPhase::Previewing | DialogPhase::Exporting(_) => return Err(Blocked::Busy),
            DialogPhase::Open => {}
        }
        if self.selection.is_empty() {
            return Err(Blocked::EmptySelection);
        }
        self.phase = match request {
            DialogRequest::Preview => DialogPhase::Previewing,
            DialogRequest::Export(format) => DialogPhase::Exporting(format),
        };
        Ok(self.session)
    }

    /// Return to `Open` after a request settles, whatever its outcome
    pub fn settle(&mut self) {
        if self.is_open() {
            self.phase = DialogPhase::Open;
        }
    }

    pub fn set_preview_rows(&mut self, rows: Vec<Row>) {
        self.preview_rows = Some(rows);
        self.grid.page = 0;
        self.grid.column_offset = 0;
        self.grid.focused_column = 0;
        self.grid.sort = None;
    }
}
