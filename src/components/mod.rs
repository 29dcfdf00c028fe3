//! UI Components
//!
//! Each component encapsulates its own state, event handling, and rendering logic.
//! Components communicate through Actions rather than direct state mutation.

pub mod export_dialog;
pub mod help_dialog;
pub mod layout;
pub mod notification_bar;
pub mod preview_dialog;
pub mod quit_dialog;
pub mod report_list;
pub mod setup;
pub mod table;

pub use export_dialog::ExportDialogComponent;
pub use help_dialog::HelpDialog;
pub use layout::{
    calculate_dialog_layout, calculate_main_layout, centered_popup, contains, percent_popup,
};
pub use notification_bar::{draw_notification, overlay_area};
pub use preview_dialog::PreviewDialog;
pub use quit_dialog::QuitDialog;
pub use report_list::{draw_report_screen, key_hint, ReportListComponent, ReportScreenContext};
pub use setup::SetupComponent;
