//! Help dialog component
//!
//! Keyboard and mouse reference for the report list and export dialog.

use crate::action::Action;
use crate::component::Component;
use crate::components::percent_popup;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

/// Help dialog showing all keyboard shortcuts
#[derive(Default)]
pub struct HelpDialog {
    pub scroll_offset: usize,
}

impl Component for HelpDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => Some(Action::CloseModal),
            KeyCode::Char('j') | KeyCode::Down => {
                self.scroll_offset = self.scroll_offset.saturating_add(1);
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.scroll_offset = self.scroll_offset.saturating_sub(1);
                None
            }
            KeyCode::PageDown => {
                self.scroll_offset = self.scroll_offset.saturating_add(10);
                None
            }
            KeyCode::PageUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(10);
                None
            }
            _ => None,
        };
        Ok(action)
    }

    fn update(&mut self, _action: Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        let dialog_area = percent_popup(area, 70, 85);
        frame.render_widget(Clear, dialog_area);

        let content = build_help_content();
        let total = content.len();
        let visible_height = dialog_area.height.saturating_sub(2) as usize;

        // Clamp scroll offset
        let max_scroll = total.saturating_sub(visible_height);
        if self.scroll_offset > max_scroll {
            self.scroll_offset = max_scroll;
        }

        let paragraph = Paragraph::new(content.clone())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Keyboard Shortcuts ")
                    .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
                    .border_style(Style::default().fg(Color::Cyan)),
            )
            .scroll((self.scroll_offset as u16, 0));

        frame.render_widget(paragraph, dialog_area);

        // Render scrollbar if content exceeds visible area
        if total > visible_height {
            let mut scrollbar_state =
                ScrollbarState::new(total.saturating_sub(visible_height)).position(self.scroll_offset);

            frame.render_stateful_widget(
                Scrollbar::new(ScrollbarOrientation::VerticalRight)
                    .begin_symbol(Some("↑"))
                    .end_symbol(Some("↓")),
                dialog_area.inner(ratatui::layout::Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }

        Ok(())
    }
}

fn build_help_content() -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    // Yellow title with an underline
    let add_section = |lines: &mut Vec<Line<'static>>, title: &str| {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("  {} ", title),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(Span::styled(
            format!("  {}", "─".repeat(title.len() + 2)),
            Style::default().fg(Color::DarkGray),
        )));
    };

    // Key column padded to 12
    let add_shortcut = |lines: &mut Vec<Line<'static>>, key: &str, description: &str| {
        lines.push(Line::from(vec![
            Span::styled(
                format!("  {:12}", key),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::styled(description.to_string(), Style::default().fg(Color::White)),
        ]));
    };

    add_section(&mut lines, "Report List");
    add_shortcut(&mut lines, "j / ↓", "Move to next report");
    add_shortcut(&mut lines, "k / ↑", "Move to previous report");
    add_shortcut(&mut lines, "g / G", "Jump to first / last report");
    add_shortcut(&mut lines, "Enter", "Open the export dialog");
    add_shortcut(&mut lines, "s", "Edit connection settings");

    add_section(&mut lines, "Export Dialog");
    add_shortcut(&mut lines, "Tab", "Switch between field tree and selection");
    add_shortcut(&mut lines, "/", "Search fields by title");
    add_shortcut(&mut lines, "← / →", "Collapse / expand section");
    add_shortcut(&mut lines, "Enter/Space", "Add field or whole section");
    add_shortcut(&mut lines, "d", "Remove selected column");
    add_shortcut(&mut lines, "J / K", "Move selected column down / up");
    add_shortcut(&mut lines, "C", "Clear all columns");
    add_shortcut(&mut lines, "r", "Reload fields");
    add_shortcut(&mut lines, "Esc", "Close dialog");

    add_section(&mut lines, "Mouse");
    add_shortcut(&mut lines, "Drag →", "Drop a tree field onto the selection");
    add_shortcut(&mut lines, "Drag ↕", "Reorder columns live");
    add_shortcut(&mut lines, "Click ✕", "Remove a column");

    add_section(&mut lines, "Preview & Export");
    add_shortcut(&mut lines, "p", "Preview rows for the selection");
    add_shortcut(&mut lines, "e", "Export Excel (.xlsx)");
    add_shortcut(&mut lines, "f", "Export PDF");
    add_shortcut(&mut lines, "c", "Export CSV");
    add_shortcut(&mut lines, "n / N", "Next / previous preview page");
    add_shortcut(&mut lines, "z", "Cycle page size");
    add_shortcut(&mut lines, "← / →", "Focus preview column");
    add_shortcut(&mut lines, "s", "Sort by focused column");

    add_section(&mut lines, "General");
    add_shortcut(&mut lines, "x", "Dismiss notification");
    add_shortcut(&mut lines, "?", "Show this help");
    add_shortcut(&mut lines, "q", "Quit");

    // Footer
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  Press q, Esc, or ? to close",
        Style::default().fg(Color::DarkGray),
    )));

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn test_scroll_keys_adjust_offset() {
        let mut dialog = HelpDialog::default();
        dialog
            .handle_key_event(KeyEvent::new(KeyCode::PageDown, KeyModifiers::NONE))
            .unwrap();
        assert_eq!(dialog.scroll_offset, 10);
        dialog
            .handle_key_event(KeyEvent::new(KeyCode::Char('k'), KeyModifiers::NONE))
            .unwrap();
        assert_eq!(dialog.scroll_offset, 9);
        let action = dialog
            .handle_key_event(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::NONE))
            .unwrap();
        assert_eq!(action, Some(Action::CloseModal));
    }

    #[test]
    fn test_content_lists_export_keys() {
        let text: String = build_help_content()
            .iter()
            .flat_map(|l| l.spans.iter().map(|s| s.content.to_string()))
            .collect();
        assert!(text.contains("Export Excel"));
        assert!(text.contains("Reorder columns live"));
    }
}
