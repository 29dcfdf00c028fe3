//! UI state - presentation state separate from domain data

/// Main application mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Setup,
    Running,
}

/// Focused pane inside the export dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DialogPane {
    #[default]
    Tree,
    Selection,
}

impl DialogPane {
    pub fn toggle(self) -> Self {
        match self {
            DialogPane::Tree => DialogPane::Selection,
            DialogPane::Selection => DialogPane::Tree,
        }
    }
}
