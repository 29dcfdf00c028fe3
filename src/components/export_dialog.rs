//! Export dialog component
//!
//! Field tree on the left, ordered selection on the right, preview and
//! export buttons underneath. The component keeps only cursor, focus and
//! drag state; the tree and selection themselves live in `ExportDialog`
//! and reach this component as snapshots through `sync`.
//!
//! Mouse gestures:
//! - drag a tree row and release it over the selection pane to add it
//! - drag a selection row to reorder; every new slot hovered emits a move
//! - click `✕` on a selection row to remove it

use crate::action::Action;
use crate::component::Component;
use crate::components::table::fit_cell;
use crate::components::{calculate_dialog_layout, contains, key_hint, percent_popup};
use crate::model::dialog::{DialogPhase, ExportDialog, ExportFormat, SchemaStatus};
use crate::model::field::{FieldNode, SelectionEntry};
use crate::model::field_tree::TreeRow;
use crate::model::ui::DialogPane;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Margin, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Columns reserved at the right edge of a selection row for the remove marker
const REMOVE_MARKER_WIDTH: u16 = 3;

#[derive(Debug, Clone, PartialEq)]
enum Drag {
    /// A tree node picked up; dropped on release over the selection pane
    FromTree { node: FieldNode, over_selection: bool },
    /// A selection entry being reordered; `index` follows the entry
    InSelection { index: usize },
}

#[derive(Debug, Clone, PartialEq)]
struct Button {
    area: Rect,
    action: Action,
    enabled: bool,
}

#[derive(Default)]
pub struct ExportDialogComponent {
    pub focus: DialogPane,
    pub search_mode: bool,
    pub tree_state: ListState,
    pub selection_state: ListState,

    rows: Vec<TreeRow>,
    entries: Vec<SelectionEntry>,
    can_request: bool,
    can_reload: bool,

    // Hit-testing areas, refreshed on every draw
    tree_inner: Rect,
    selection_inner: Rect,
    buttons: Vec<Button>,

    drag: Option<Drag>,
}

impl ExportDialogComponent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh cursors and focus for a newly opened dialog
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Snapshot the tree rows and selection the next events refer to
    pub fn sync(&mut self, dialog: &ExportDialog) {
        self.rows = dialog.tree.visible_rows();
        self.entries = dialog.selection.entries().to_vec();
        self.can_request = dialog.can_request();
        self.can_reload = dialog.can_reload();
        clamp_cursor(&mut self.tree_state, self.rows.len());
        clamp_cursor(&mut self.selection_state, self.entries.len());
    }

    /// Dimmed while the field list is loading, when `r` is refused
    fn reload_hint_color(&self) -> Color {
        if self.can_reload {
            Color::Cyan
        } else {
            Color::DarkGray
        }
    }

    pub fn highlighted_row(&self) -> Option<&TreeRow> {
        self.tree_state.selected().and_then(|i| self.rows.get(i))
    }

    pub fn highlighted_entry(&self) -> Option<(usize, &SelectionEntry)> {
        let i = self.selection_state.selected()?;
        self.entries.get(i).map(|e| (i, e))
    }

    fn move_cursor(&mut self, down: bool) {
        let (state, len) = match self.focus {
            DialogPane::Tree => (&mut self.tree_state, self.rows.len()),
            DialogPane::Selection => (&mut self.selection_state, self.entries.len()),
        };
        if len == 0 {
            state.select(None);
            return;
        }
        let i = match state.selected() {
            Some(i) if down => (i + 1).min(len - 1),
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        state.select(Some(i));
    }

    fn tree_key(&mut self, key: KeyEvent) -> Option<Action> {
        let row = self.highlighted_row()?;
        match key.code {
            KeyCode::Enter | KeyCode::Char(' ') => Some(Action::AddField(row.node.clone())),
            KeyCode::Left | KeyCode::Char('h') if row.node.is_section() && row.expanded => {
                Some(Action::SetSectionExpanded {
                    key: row.node.key.clone(),
                    expanded: false,
                })
            }
            KeyCode::Right | KeyCode::Char('l') if row.node.is_section() && !row.expanded => {
                Some(Action::SetSectionExpanded {
                    key: row.node.key.clone(),
                    expanded: true,
                })
            }
            _ => None,
        }
    }

    fn selection_key(&mut self, key: KeyEvent) -> Option<Action> {
        let (index, entry_key) = self
            .highlighted_entry()
            .map(|(i, e)| (i, e.key.clone()))?;
        let last = self.entries.len() - 1;
        match key.code {
            KeyCode::Char('d') | KeyCode::Delete | KeyCode::Backspace => {
                Some(Action::RemoveField(entry_key))
            }
            KeyCode::Char('J') if index < last => Some(self.shift_entry(index, index + 1)),
            KeyCode::Char('K') if index > 0 => Some(self.shift_entry(index, index - 1)),
            _ => None,
        }
    }

    /// Move the snapshot entry and the cursor with it, returning the model action
    fn shift_entry(&mut self, from: usize, to: usize) -> Action {
        let entry = self.entries.remove(from);
        self.entries.insert(to, entry);
        self.selection_state.select(Some(to));
        Action::MoveField { from, to }
    }

    fn search_key(&mut self, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Esc | KeyCode::Enter => Some(Action::ExitSearchMode),
            KeyCode::Backspace => Some(Action::SearchBackspace),
            KeyCode::Char(c) => Some(Action::SearchInput(c)),
            _ => None,
        }
    }

    /// Row index under the pointer in a list drawn into `inner`
    fn row_at(inner: Rect, state: &ListState, len: usize, row: u16) -> Option<usize> {
        if row < inner.y || row >= inner.y + inner.height {
            return None;
        }
        let index = state.offset() + (row - inner.y) as usize;
        (index < len).then_some(index)
    }

    /// Slot a dragged selection entry would land in; below the last row
    /// counts as the last slot
    fn selection_slot(&self, row: u16) -> Option<usize> {
        if self.entries.is_empty() {
            return None;
        }
        let inner = self.selection_inner;
        if row < inner.y {
            return Some(self.selection_state.offset());
        }
        let index = self.selection_state.offset() + (row - inner.y) as usize;
        Some(index.min(self.entries.len() - 1))
    }

    fn mouse_down(&mut self, column: u16, row: u16) -> Option<Action> {
        if let Some(button) = self.buttons.iter().find(|b| contains(b.area, column, row)) {
            return button.enabled.then(|| button.action.clone());
        }

        if contains(self.tree_inner, column, row) {
            self.focus = DialogPane::Tree;
            let index = Self::row_at(self.tree_inner, &self.tree_state, self.rows.len(), row)?;
            self.tree_state.select(Some(index));
            self.drag = Some(Drag::FromTree {
                node: self.rows[index].node.clone(),
                over_selection: false,
            });
            return None;
        }

        if contains(self.selection_inner, column, row) {
            self.focus = DialogPane::Selection;
            let index =
                Self::row_at(self.selection_inner, &self.selection_state, self.entries.len(), row)?;
            let marker_start = self.selection_inner.right().saturating_sub(REMOVE_MARKER_WIDTH);
            if column >= marker_start {
                return Some(Action::RemoveField(self.entries[index].key.clone()));
            }
            self.selection_state.select(Some(index));
            self.drag = Some(Drag::InSelection { index });
        }
        None
    }

    fn mouse_drag(&mut self, column: u16, row: u16) -> Option<Action> {
        let over_selection = contains(self.selection_inner, column, row);
        let slot = self.selection_slot(row);
        let from = match self.drag.as_mut()? {
            Drag::FromTree {
                over_selection: hover,
                ..
            } => {
                *hover = over_selection;
                return None;
            }
            Drag::InSelection { index } => {
                let from = *index;
                match slot {
                    Some(to) if to != from => *index = to,
                    _ => return None,
                }
                from
            }
        };
        // keep the snapshot in step until the next sync
        let to = slot?;
        Some(self.shift_entry(from, to))
    }

    fn mouse_up(&mut self, column: u16, row: u16) -> Option<Action> {
        match self.drag.take()? {
            Drag::FromTree { node, .. } if contains(self.selection_inner, column, row) => {
                Some(Action::AddField(node))
            }
            _ => None,
        }
    }
}

fn clamp_cursor(state: &mut ListState, len: usize) {
    match state.selected() {
        _ if len == 0 => state.select(None),
        Some(i) if i >= len => state.select(Some(len - 1)),
        None => state.select(Some(0)),
        _ => {}
    }
}

impl Component for ExportDialogComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.search_mode {
            return Ok(self.search_key(key));
        }

        let action = match key.code {
            KeyCode::Esc => Some(Action::CloseModal),
            KeyCode::Tab | KeyCode::BackTab => {
                self.focus = self.focus.toggle();
                None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.move_cursor(true);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.move_cursor(false);
                None
            }
            KeyCode::Char('/') => Some(Action::EnterSearchMode),
            KeyCode::Char('p') => Some(Action::RequestPreview),
            KeyCode::Char('e') => Some(Action::RequestExport(ExportFormat::Xlsx)),
            KeyCode::Char('f') => Some(Action::RequestExport(ExportFormat::Pdf)),
            KeyCode::Char('c') => Some(Action::RequestExport(ExportFormat::Csv)),
            KeyCode::Char('C') => Some(Action::ClearSelection),
            KeyCode::Char('r') => Some(Action::ReloadFields),
            KeyCode::Char('x') => Some(Action::DismissNotification),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            _ => match self.focus {
                DialogPane::Tree => self.tree_key(key),
                DialogPane::Selection => self.selection_key(key),
            },
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let (column, row) = (mouse.column, mouse.row);
        let action = match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.mouse_down(column, row),
            MouseEventKind::Drag(MouseButton::Left) => self.mouse_drag(column, row),
            MouseEventKind::Up(MouseButton::Left) => self.mouse_up(column, row),
            MouseEventKind::ScrollDown | MouseEventKind::ScrollUp => {
                if contains(self.selection_inner, column, row) {
                    self.focus = DialogPane::Selection;
                } else if contains(self.tree_inner, column, row) {
                    self.focus = DialogPane::Tree;
                }
                self.move_cursor(mouse.kind == MouseEventKind::ScrollDown);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::EnterSearchMode => {
                self.search_mode = true;
                self.focus = DialogPane::Tree;
            }
            Action::ExitSearchMode => self.search_mode = false,
            Action::SearchInput(_) | Action::SearchBackspace => {
                self.tree_state.select(Some(0));
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the dialog state; see `draw_with_dialog`
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering
// ═══════════════════════════════════════════════════════════════════════════════

impl ExportDialogComponent {
    pub fn draw_with_dialog(&mut self, frame: &mut Frame, area: Rect, dialog: &ExportDialog) -> Result<()> {
        self.sync(dialog);

        let popup = percent_popup(area, 90, 90);
        frame.render_widget(Clear, popup);

        let title = dialog
            .report
            .as_ref()
            .map(|r| format!(" Export: {} ", r.name))
            .unwrap_or_else(|| " Export ".to_string());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let layout = calculate_dialog_layout(inner);
        self.render_search(frame, layout.search, dialog);
        self.render_tree(frame, layout.tree, dialog);
        self.render_selection(frame, layout.selection);
        render_status(frame, layout.status, dialog);
        self.render_buttons(frame, layout.buttons, dialog);
        Ok(())
    }

    fn pane_border(&self, pane: DialogPane) -> Style {
        let dropping = matches!(
            self.drag,
            Some(Drag::FromTree {
                over_selection: true,
                ..
            })
        );
        if pane == DialogPane::Selection && dropping {
            Style::default().fg(Color::Green)
        } else if self.focus == pane && !self.search_mode {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        }
    }

    fn render_search(&self, frame: &mut Frame, area: Rect, dialog: &ExportDialog) {
        let text = &dialog.tree.search_text;
        let line = if self.search_mode {
            Line::from(vec![
                Span::styled("/ ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{}_", text),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ])
        } else if text.is_empty() {
            Line::from(Span::styled(
                "Press / to search fields",
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            Line::from(vec![
                Span::styled("/ ", Style::default().fg(Color::DarkGray)),
                Span::styled(text.clone(), Style::default().fg(Color::Cyan)),
            ])
        };

        let border = if self.search_mode {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let paragraph = Paragraph::new(line).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Search ")
                .border_style(border),
        );
        frame.render_widget(paragraph, area);
    }

    fn render_tree(&mut self, frame: &mut Frame, area: Rect, dialog: &ExportDialog) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Fields ({}) ", dialog.tree.leaf_count()))
            .border_style(self.pane_border(DialogPane::Tree));
        self.tree_inner = block.inner(area);

        let message = match &dialog.schema_status {
            SchemaStatus::Loading => Some(Line::from(Span::styled(
                "⟳ Loading fields…",
                Style::default().fg(Color::Yellow),
            ))),
            SchemaStatus::Failed(err) => Some(Line::from(vec![
                Span::styled(err.clone(), Style::default().fg(Color::Red)),
                Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray)),
            ])),
            SchemaStatus::Ready if self.rows.is_empty() => {
                let text = if dialog.tree.search_text.trim().is_empty() {
                    "No exportable fields"
                } else {
                    "No fields match the search"
                };
                Some(Line::from(Span::styled(text, Style::default().fg(Color::DarkGray))))
            }
            SchemaStatus::Ready => None,
        };
        if let Some(line) = message {
            let paragraph = Paragraph::new(line).block(block).wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = self
            .rows
            .iter()
            .map(|row| {
                let indent = "  ".repeat(row.depth);
                if row.node.is_section() {
                    let arrow = if row.expanded { "▼" } else { "▶" };
                    ListItem::new(Line::from(vec![
                        Span::raw(indent),
                        Span::styled(format!("{} ", arrow), Style::default().fg(Color::DarkGray)),
                        Span::styled(
                            row.node.title.clone(),
                            Style::default()
                                .fg(Color::Yellow)
                                .add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(
                            format!(" ({})", row.node.leaves().len()),
                            Style::default().fg(Color::DarkGray),
                        ),
                    ]))
                } else {
                    let chosen = dialog.selection.contains(&row.node.key);
                    let (marker, style) = if chosen {
                        ("✓ ", Style::default().fg(Color::Green))
                    } else {
                        ("  ", Style::default().fg(Color::White))
                    };
                    ListItem::new(Line::from(vec![
                        Span::raw(indent),
                        Span::styled(marker, Style::default().fg(Color::Green)),
                        Span::styled(row.node.title.clone(), style),
                    ]))
                }
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.tree_state);
    }

    fn render_selection(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Selected Columns ({}) ", self.entries.len()))
            .border_style(self.pane_border(DialogPane::Selection));
        self.selection_inner = block.inner(area);

        if self.entries.is_empty() {
            let paragraph = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Drag fields here or press Enter on a field",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(paragraph, area);
            return;
        }

        // highlight symbol + number + title + remove marker
        let width = self.selection_inner.width as usize;
        let items: Vec<ListItem> = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, entry)| {
                let number = format!("{:>2}. ", i + 1);
                let used = 2 + number.width() + REMOVE_MARKER_WIDTH as usize;
                let title = fit_cell(&entry.title, width.saturating_sub(used));
                ListItem::new(Line::from(vec![
                    Span::styled(number, Style::default().fg(Color::DarkGray)),
                    Span::styled(title, Style::default().fg(Color::White)),
                    Span::styled(" ✕ ", Style::default().fg(Color::Red)),
                ]))
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::Blue)
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");
        frame.render_stateful_widget(list, area, &mut self.selection_state);
    }

    fn render_buttons(&mut self, frame: &mut Frame, area: Rect, dialog: &ExportDialog) {
        let specs = [
            ("Preview", Action::RequestPreview, DialogPhase::Previewing),
            (
                "Export Excel",
                Action::RequestExport(ExportFormat::Xlsx),
                DialogPhase::Exporting(ExportFormat::Xlsx),
            ),
            (
                "Export PDF",
                Action::RequestExport(ExportFormat::Pdf),
                DialogPhase::Exporting(ExportFormat::Pdf),
            ),
            (
                "Export CSV",
                Action::RequestExport(ExportFormat::Csv),
                DialogPhase::Exporting(ExportFormat::Csv),
            ),
        ];

        self.buttons.clear();
        let mut x = area.x;
        for (label, action, busy_phase) in specs {
            let busy = dialog.phase == busy_phase;
            let text = if busy {
                format!("⟳ {}", label)
            } else {
                label.to_string()
            };
            let width = (text.width() as u16 + 4).min(area.right().saturating_sub(x));
            if width == 0 {
                break;
            }
            let rect = Rect::new(x, area.y, width, area.height);
            x += width + 1;

            let enabled = self.can_request;
            let style = if busy {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else if enabled {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let button = Paragraph::new(Span::styled(text, style))
                .alignment(Alignment::Center)
                .block(Block::default().borders(Borders::ALL).border_style(style));
            frame.render_widget(button, rect);
            self.buttons.push(Button {
                area: rect,
                action,
                enabled,
            });
        }

        // Key hints after the buttons
        if x < area.right() {
            let hints: Vec<Span> = [
                key_hint("Tab", "Pane", Color::Cyan),
                key_hint("J/K", "Move", Color::Cyan),
                key_hint("d", "Remove", Color::Red),
                key_hint("r", "Reload", self.reload_hint_color()),
                key_hint("Esc", "Close", Color::Yellow),
            ]
            .into_iter()
            .flatten()
            .collect();
            let hint_area = Rect::new(x, area.y, area.right() - x, area.height)
                .inner(Margin::new(0, 1));
            frame.render_widget(Paragraph::new(Line::from(hints)), hint_area);
        }
    }
}

fn render_status(frame: &mut Frame, area: Rect, dialog: &ExportDialog) {
    let line = match dialog.phase {
        DialogPhase::Previewing => Line::from(Span::styled(
            "⟳ Loading preview…",
            Style::default().fg(Color::Yellow),
        )),
        DialogPhase::Exporting(format) => Line::from(Span::styled(
            format!("⟳ Exporting {}…", format.label()),
            Style::default().fg(Color::Yellow),
        )),
        _ if dialog.schema_status == SchemaStatus::Loading => Line::from(Span::styled(
            "⟳ Loading fields…",
            Style::default().fg(Color::Yellow),
        )),
        _ if dialog.selection.is_empty() => Line::from(Span::styled(
            "Select at least one column to preview or export",
            Style::default().fg(Color::DarkGray),
        )),
        _ => Line::from(Span::styled(
            format!("{} column(s) selected", dialog.selection.len()),
            Style::default().fg(Color::Cyan),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}
