//! Action enum - All possible application actions
//!
//! Actions are discrete operations that the application can perform.
//! Components emit Actions in response to events, and the App processes
//! them to update state.

use crate::model::dialog::ExportFormat;
use crate::model::field::FieldNode;
use std::fmt;

/// All possible actions in the application
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    // ─────────────────────────────────────────────────────────────────────────
    // App Lifecycle
    // ─────────────────────────────────────────────────────────────────────────
    /// Regular tick: poll background jobs, expire notifications
    Tick,
    /// Terminal was resized
    Resize(u16, u16),
    /// Force quit without confirmation
    ForceQuit,

    // ─────────────────────────────────────────────────────────────────────────
    // Report List
    // ─────────────────────────────────────────────────────────────────────────
    NextItem,
    PrevItem,
    FirstItem,
    LastItem,
    /// Open the export dialog for the highlighted report
    OpenReport,

    // ─────────────────────────────────────────────────────────────────────────
    // Modals
    // ─────────────────────────────────────────────────────────────────────────
    OpenQuitDialog,
    OpenHelp,
    /// Close the current modal
    CloseModal,
    /// Confirm the current modal action
    ConfirmModal,
    ModalUp,
    ModalDown,

    // ─────────────────────────────────────────────────────────────────────────
    // Field Tree
    // ─────────────────────────────────────────────────────────────────────────
    EnterSearchMode,
    ExitSearchMode,
    SearchInput(char),
    SearchBackspace,
    /// Expand or collapse a section
    SetSectionExpanded { key: String, expanded: bool },
    /// Fetch the field list again after a failure
    ReloadFields,

    // ─────────────────────────────────────────────────────────────────────────
    // Selection List
    // ─────────────────────────────────────────────────────────────────────────
    /// Add a leaf, or every leaf of a section
    AddField(FieldNode),
    RemoveField(String),
    MoveField { from: usize, to: usize },
    ClearSelection,

    // ─────────────────────────────────────────────────────────────────────────
    // Preview & Export
    // ─────────────────────────────────────────────────────────────────────────
    RequestPreview,
    RequestExport(ExportFormat),
    NextPage,
    PrevPage,
    CyclePageSize,
    /// Sort by the focused preview column
    SortFocusedColumn,
    FocusNextColumn,
    FocusPrevColumn,

    // ─────────────────────────────────────────────────────────────────────────
    // Notifications
    // ─────────────────────────────────────────────────────────────────────────
    DismissNotification,

    // ─────────────────────────────────────────────────────────────────────────
    // Setup Wizard
    // ─────────────────────────────────────────────────────────────────────────
    /// Confirm connection settings
    SetupConfirm,
    /// Re-run the connection wizard
    OpenSetup,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Tick => write!(f, "Tick"),
            Action::Resize(w, h) => write!(f, "Resize({}, {})", w, h),
            Action::ForceQuit => write!(f, "ForceQuit"),
            Action::NextItem => write!(f, "NextItem"),
            Action::PrevItem => write!(f, "PrevItem"),
            Action::FirstItem => write!(f, "FirstItem"),
            Action::LastItem => write!(f, "LastItem"),
            Action::OpenReport => write!(f, "OpenReport"),
            Action::OpenQuitDialog => write!(f, "OpenQuitDialog"),
            Action::OpenHelp => write!(f, "OpenHelp"),
            Action::CloseModal => write!(f, "CloseModal"),
            Action::ConfirmModal => write!(f, "ConfirmModal"),
            Action::ModalUp => write!(f, "ModalUp"),
            Action::ModalDown => write!(f, "ModalDown"),
            Action::EnterSearchMode => write!(f, "EnterSearchMode"),
            Action::ExitSearchMode => write!(f, "ExitSearchMode"),
            Action::SearchInput(c) => write!(f, "SearchInput('{}')", c),
            Action::SearchBackspace => write!(f, "SearchBackspace"),
            Action::SetSectionExpanded { key, expanded } => {
                write!(f, "SetSectionExpanded({}, {})", key, expanded)
            }
            Action::ReloadFields => write!(f, "ReloadFields"),
            Action::AddField(node) => write!(f, "AddField({})", node.key),
            Action::RemoveField(key) => write!(f, "RemoveField({})", key),
            Action::MoveField { from, to } => write!(f, "MoveField({} -> {})", from, to),
            Action::ClearSelection => write!(f, "ClearSelection"),
            Action::RequestPreview => write!(f, "RequestPreview"),
            Action::RequestExport(format) => write!(f, "RequestExport({})", format.extension()),
            Action::NextPage => write!(f, "NextPage"),
            Action::PrevPage => write!(f, "PrevPage"),
            Action::CyclePageSize => write!(f, "CyclePageSize"),
            Action::SortFocusedColumn => write!(f, "SortFocusedColumn"),
            Action::FocusNextColumn => write!(f, "FocusNextColumn"),
            Action::FocusPrevColumn => write!(f, "FocusPrevColumn"),
            Action::DismissNotification => write!(f, "DismissNotification"),
            Action::SetupConfirm => write!(f, "SetupConfirm"),
            Action::OpenSetup => write!(f, "OpenSetup"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_compact() {
        assert_eq!(
            Action::AddField(FieldNode::leaf("department", "Department")).to_string(),
            "AddField(department)"
        );
        assert_eq!(Action::MoveField { from: 0, to: 2 }.to_string(), "MoveField(0 -> 2)");
        assert_eq!(
            Action::RequestExport(ExportFormat::Pdf).to_string(),
            "RequestExport(pdf)"
        );
    }
}
