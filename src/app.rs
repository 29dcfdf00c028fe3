//! Root application component
//!
//! The App struct implements the Component trait, acting as the root component
//! that delegates event handling and rendering to child components.
//! It owns the export dialog state and the job runner, and applies
//! background results to the dialog session they were started for.

use crate::action::Action;
use crate::component::Component;
use crate::components::{
    draw_notification, draw_report_screen, overlay_area, ExportDialogComponent, HelpDialog,
    PreviewDialog, QuitDialog, ReportListComponent, ReportScreenContext, SetupComponent,
};
use crate::config::Config;
use crate::model::dialog::{DialogRequest, ExportDialog};
use crate::model::modal::{Modal, ModalStack};
use crate::model::notification::{Level, Notifications, EXTENDED_TTL};
use crate::model::report::ReportDefinition;
use crate::model::selection::SelectionDropTarget;
use crate::model::ui::AppMode;
use crate::services::{
    ApiError, DocumentStore, ExportError, HttpDocumentStore, JobKind, JobMessage, JobOutcome,
    JobRunner, UnconfiguredStore,
};
use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

// ═══════════════════════════════════════════════════════════════════════════════
// App Struct
// ═══════════════════════════════════════════════════════════════════════════════

/// Main application state - coordinates between components
pub struct App {
    /// Current application mode
    pub mode: AppMode,

    /// Connection settings and configured reports
    pub config: Config,

    /// Where the setup wizard saves to; `None` means the default location
    pub config_path: Option<PathBuf>,

    /// Reports loaded from `--reports`, kept to rebuild the catalogue
    extra_reports: Vec<ReportDefinition>,

    /// Report catalogue shown on the main screen
    pub reports: Vec<ReportDefinition>,

    /// Modal overlay stack
    pub modals: ModalStack,

    /// Export dialog state (field tree, selection, preview rows)
    pub dialog: ExportDialog,

    pub notifications: Notifications,

    /// Background job runner
    pub job_runner: JobRunner,

    /// Flag to indicate the app should quit
    pub should_quit: bool,

    // ─────────────────────────────────────────────────────────────────────────
    // Child Components
    // ─────────────────────────────────────────────────────────────────────────
    pub report_list: ReportListComponent,
    pub export_dialog: ExportDialogComponent,
    pub preview_dialog: PreviewDialog,
    pub quit_dialog: QuitDialog,
    pub help_dialog: HelpDialog,
    pub setup: SetupComponent,
}

/// Build the HTTP store for `config`
pub fn connect(config: &Config) -> Result<Arc<dyn DocumentStore>, ApiError> {
    let store = HttpDocumentStore::new(&config.base_url, config.credentials())?;
    Ok(Arc::new(store))
}

impl App {
    /// Create the app; without a config the setup wizard runs first
    pub fn new(
        config: Option<Config>,
        config_path: Option<PathBuf>,
        extra_reports: Vec<ReportDefinition>,
    ) -> App {
        let Some(config) = config else {
            info!("No configuration found, starting setup");
            let mut app = Self::with_store(
                Config::default(),
                config_path.clone(),
                extra_reports,
                Arc::new(UnconfiguredStore),
            );
            app.mode = AppMode::Setup;
            app.setup = SetupComponent::new(Config::default(), config_path, false);
            return app;
        };

        match connect(&config) {
            Ok(store) => Self::with_store(config, config_path, extra_reports, store),
            Err(err) => {
                error!(error = %err, "Could not create backend client");
                let mut app = Self::with_store(
                    config.clone(),
                    config_path.clone(),
                    extra_reports,
                    Arc::new(UnconfiguredStore),
                );
                app.mode = AppMode::Setup;
                app.setup = SetupComponent::new(config, config_path, false);
                app.setup.error = Some(err.to_string());
                app
            }
        }
    }

    /// Create a running app over an existing store
    pub fn with_store(
        config: Config,
        config_path: Option<PathBuf>,
        extra_reports: Vec<ReportDefinition>,
        store: Arc<dyn DocumentStore>,
    ) -> App {
        let reports = config.catalogue(&extra_reports);
        let dialog = ExportDialog::new(config.default_page_size);
        let setup = SetupComponent::new(config.clone(), config_path.clone(), true);
        App {
            mode: AppMode::Running,
            config,
            config_path,
            extra_reports,
            reports,
            modals: ModalStack::new(),
            dialog,
            notifications: Notifications::new(),
            job_runner: JobRunner::new(store),
            should_quit: false,
            report_list: ReportListComponent::new(),
            export_dialog: ExportDialogComponent::new(),
            preview_dialog: PreviewDialog,
            quit_dialog: QuitDialog::default(),
            help_dialog: HelpDialog::default(),
            setup,
        }
    }

    /// Open the export dialog for the highlighted report
    fn open_report(&mut self) {
        let Some(report) = self.report_list.selected_report(&self.reports).cloned() else {
            return;
        };
        info!(report = %report.name, entity = %report.entity, "Opening export dialog");
        self.export_dialog.reset();
        let session = self.dialog.open(report.clone());
        self.job_runner.spawn_schema(session, report);
        self.modals.push(Modal::ExportDialog);
    }

    fn reload_fields(&mut self) {
        let Some(report) = self.dialog.report.clone() else {
            return;
        };
        match self.dialog.begin_reload() {
            Ok(session) => self.job_runner.spawn_schema(session, report),
            Err(blocked) => {
                warn!(?blocked, "Reload rejected");
                self.notifications.warning("Cannot reload", blocked.message());
            }
        }
    }

    /// Start a preview or export, or explain why it cannot start
    fn request(&mut self, request: DialogRequest) {
        match self.dialog.begin(request) {
            Ok(session) => {
                let Some(report) = self.dialog.report.clone() else {
                    return;
                };
                let selection = self.dialog.selection.entries().to_vec();
                debug!(?request, columns = selection.len(), "Starting request");
                match request {
                    DialogRequest::Preview => {
                        self.job_runner.spawn_preview(session, report, selection)
                    }
                    DialogRequest::Export(format) => self.job_runner.spawn_export(
                        session,
                        report,
                        selection,
                        format,
                        self.config.export_dir.clone(),
                    ),
                }
            }
            Err(blocked) => {
                warn!(?request, ?blocked, "Request rejected");
                self.notifications.warning("Cannot continue", blocked.message());
            }
        }
    }

    /// Apply finished background jobs
    fn apply_job_results(&mut self) {
        for message in self.job_runner.poll() {
            if !self.dialog.accepts(message.session) {
                debug!(
                    session = message.session,
                    kind = ?message.kind,
                    "Dropping result for a closed dialog"
                );
                continue;
            }
            self.apply_job_result(message);
        }
    }

    fn apply_job_result(&mut self, message: JobMessage) {
        let elapsed = message.started.elapsed();
        match message.outcome {
            JobOutcome::Fields(Ok(fields)) => {
                debug!(sections = fields.len(), ?elapsed, "Fields loaded");
                self.dialog.set_fields(fields);
            }
            JobOutcome::Fields(Err(err)) => {
                error!(error = %err, "Field list request failed");
                self.dialog.set_schema_failed(err.user_message());
                self.notify_api_error("Could not load fields", &err);
            }
            JobOutcome::Rows(Ok(rows)) => {
                info!(rows = rows.len(), ?elapsed, "Preview rows loaded");
                self.dialog.set_preview_rows(rows);
                if self.modals.top() != Some(&Modal::Preview) {
                    self.modals.push(Modal::Preview);
                }
            }
            JobOutcome::Rows(Err(err)) => {
                error!(error = %err, "Preview request failed");
                self.notify_api_error("Preview failed", &err);
            }
            JobOutcome::Exported(Ok(path)) => {
                info!(path = %path.display(), ?elapsed, "Export written");
                self.notifications
                    .success("Export complete", format!("Saved {}", path.display()));
            }
            JobOutcome::Exported(Err(err)) => {
                error!(error = %err, "Export failed");
                self.notify_export_error(&err);
            }
        }
        if matches!(message.kind, JobKind::Preview | JobKind::Export(_)) {
            self.dialog.settle();
        }
    }

    fn notify_api_error(&mut self, title: &str, err: &ApiError) {
        if err.is_server_message() {
            self.notifications
                .push_with_ttl(Level::Error, title, err.user_message(), EXTENDED_TTL);
        } else {
            self.notifications.error(title, err.user_message());
        }
    }

    fn notify_export_error(&mut self, err: &ExportError) {
        match err {
            ExportError::EmptySelection => {
                self.notifications.warning("Export Error", err.user_message())
            }
            ExportError::Fetch(api) => self.notify_api_error("Export Error", api),
            ExportError::Io(_) => self.notifications.push_with_ttl(
                Level::Error,
                "Export Error",
                err.user_message(),
                EXTENDED_TTL,
            ),
            ExportError::Encode(_) => self.notifications.error("Export Error", err.user_message()),
        }
    }

    fn close_modal(&mut self) {
        if self.mode == AppMode::Setup {
            self.mode = AppMode::Running;
            return;
        }
        match self.modals.top() {
            Some(Modal::ExportDialog) => {
                debug!(session = self.dialog.session(), "Closing export dialog");
                self.dialog.close();
                self.modals.pop_through(&Modal::ExportDialog);
            }
            Some(_) => {
                self.modals.pop();
            }
            None => {}
        }
    }

    /// Apply the settings confirmed in the setup wizard
    fn apply_setup(&mut self) {
        let Some(config) = self.setup.get_config().cloned() else {
            return;
        };
        match connect(&config) {
            Ok(store) => {
                self.job_runner.set_store(store);
                self.reports = config.catalogue(&self.extra_reports);
                self.report_list.select_first(self.reports.len());
                info!(base_url = %config.base_url, "Connection settings applied");
                self.notifications.success("Settings saved", config.base_url.clone());
                self.config = config;
                self.mode = AppMode::Running;
            }
            Err(err) => {
                error!(error = %err, "Could not create backend client");
                self.setup.error = Some(err.to_string());
            }
        }
    }

    fn handle_modal_key_event(&mut self, modal: &Modal, key: KeyEvent) -> Result<Option<Action>> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.handle_key_event(key),
            Modal::ExportDialog => self.export_dialog.handle_key_event(key),
            Modal::Preview => self.preview_dialog.handle_key_event(key),
            Modal::Help => self.help_dialog.handle_key_event(key),
        }
    }

    fn draw_modal(&mut self, frame: &mut Frame, area: Rect, modal: &Modal) -> Result<()> {
        match modal {
            Modal::QuitConfirm => self.quit_dialog.draw(frame, area),
            Modal::ExportDialog => {
                self.export_dialog.sync(&self.dialog);
                self.export_dialog.draw_with_dialog(frame, area, &self.dialog)
            }
            Modal::Preview => self
                .preview_dialog
                .draw_with_dialog(frame, area, &mut self.dialog),
            Modal::Help => self.help_dialog.draw(frame, area),
        }
    }
}

impl Component for App {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.mode {
            AppMode::Setup => self.setup.handle_key_event(key),
            AppMode::Running => {
                if let Some(modal) = self.modals.top().cloned() {
                    self.handle_modal_key_event(&modal, key)
                } else {
                    self.report_list.handle_key_event(key)
                }
            }
        }
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        if self.mode != AppMode::Running {
            return Ok(None);
        }
        match self.modals.top() {
            Some(Modal::ExportDialog) => self.export_dialog.handle_mouse_event(mouse),
            Some(Modal::Preview) => self.preview_dialog.handle_mouse_event(mouse),
            _ => Ok(None),
        }
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            // ─────────────────────────────────────────────────────────────────
            // App Lifecycle
            // ─────────────────────────────────────────────────────────────────
            Action::Tick => {
                self.apply_job_results();
                self.notifications.prune(Instant::now());
            }
            Action::ForceQuit => {
                self.should_quit = true;
            }
            Action::Resize(_, _) => {}

            // ─────────────────────────────────────────────────────────────────
            // Report List
            // ─────────────────────────────────────────────────────────────────
            Action::NextItem => self.report_list.next(self.reports.len()),
            Action::PrevItem => self.report_list.previous(self.reports.len()),
            Action::FirstItem => self.report_list.select_first(self.reports.len()),
            Action::LastItem => self.report_list.select_last(self.reports.len()),
            Action::OpenReport => self.open_report(),

            // ─────────────────────────────────────────────────────────────────
            // Modals
            // ─────────────────────────────────────────────────────────────────
            Action::OpenQuitDialog => {
                self.quit_dialog.pending_jobs = self.job_runner.in_flight();
                self.modals.push(Modal::QuitConfirm);
            }
            Action::OpenHelp => {
                self.help_dialog.scroll_offset = 0;
                self.modals.push(Modal::Help);
            }
            Action::CloseModal => self.close_modal(),
            Action::ConfirmModal | Action::ModalUp | Action::ModalDown => {}

            // ─────────────────────────────────────────────────────────────────
            // Field Tree
            // ─────────────────────────────────────────────────────────────────
            Action::EnterSearchMode | Action::ExitSearchMode => {
                self.export_dialog.update(action)?;
            }
            Action::SearchInput(c) => {
                self.dialog.tree.search_text.push(c);
                self.export_dialog.update(action)?;
            }
            Action::SearchBackspace => {
                self.dialog.tree.search_text.pop();
                self.export_dialog.update(action)?;
            }
            Action::SetSectionExpanded { key, expanded } => {
                self.dialog.tree.set_expanded(&key, expanded);
            }
            Action::ReloadFields => self.reload_fields(),

            // ─────────────────────────────────────────────────────────────────
            // Selection List
            // ─────────────────────────────────────────────────────────────────
            Action::AddField(node) => {
                let added = self.dialog.selection.on_drop_into_selection(&node);
                debug!(key = %node.key, added, "Added to selection");
            }
            Action::RemoveField(key) => {
                self.dialog.selection.remove_field(&key);
            }
            Action::MoveField { from, to } => {
                self.dialog.selection.on_reorder(from, to);
            }
            Action::ClearSelection => self.dialog.selection.clear(),

            // ─────────────────────────────────────────────────────────────────
            // Preview & Export
            // ─────────────────────────────────────────────────────────────────
            Action::RequestPreview => self.request(DialogRequest::Preview),
            Action::RequestExport(format) => self.request(DialogRequest::Export(format)),
            Action::NextPage => {
                let total = self.dialog.preview_rows.as_ref().map_or(0, Vec::len);
                self.dialog.grid.next_page(total);
            }
            Action::PrevPage => self.dialog.grid.prev_page(),
            Action::CyclePageSize => self.dialog.grid.cycle_page_size(),
            Action::SortFocusedColumn => {
                let column = self.dialog.grid.focused_column;
                if column < self.dialog.selection.len() {
                    self.dialog.grid.toggle_sort(column);
                }
            }
            Action::FocusNextColumn => {
                let count = self.dialog.selection.len();
                self.dialog.grid.focus_next_column(count);
            }
            Action::FocusPrevColumn => self.dialog.grid.focus_prev_column(),

            // ─────────────────────────────────────────────────────────────────
            // Notifications
            // ─────────────────────────────────────────────────────────────────
            Action::DismissNotification => {
                self.notifications.dismiss_latest();
            }

            // ─────────────────────────────────────────────────────────────────
            // Setup Wizard
            // ─────────────────────────────────────────────────────────────────
            Action::OpenSetup => {
                self.setup =
                    SetupComponent::new(self.config.clone(), self.config_path.clone(), true);
                self.mode = AppMode::Setup;
            }
            Action::SetupConfirm => self.apply_setup(),
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        match self.mode {
            AppMode::Setup => self.setup.draw(frame, area)?,
            AppMode::Running => {
                let ctx = ReportScreenContext {
                    reports: &self.reports,
                    base_url: &self.config.base_url,
                    notifications: &self.notifications,
                    pending_jobs: self.job_runner.in_flight(),
                };
                draw_report_screen(frame, area, &mut self.report_list, &ctx);

                // The dialog stays visible under the preview and help overlays
                if self.modals.contains(&Modal::ExportDialog)
                    && self.modals.top() != Some(&Modal::ExportDialog)
                {
                    self.draw_modal(frame, area, &Modal::ExportDialog)?;
                }
                if let Some(modal) = self.modals.top().cloned() {
                    self.draw_modal(frame, area, &modal)?;
                    if let Some(notification) = self.notifications.latest() {
                        draw_notification(
                            frame,
                            overlay_area(area),
                            notification,
                            self.notifications.len(),
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
