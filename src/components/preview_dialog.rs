//! Preview dialog component
//!
//! Sorted, paginated table of the rows fetched for the current selection.
//! Columns follow selection order; wide tables scroll horizontally with
//! the focused column.

use crate::action::Action;
use crate::component::Component;
use crate::components::table::{build_table_lines, column_widths, visible_columns, HeaderCell};
use crate::components::{key_hint, percent_popup};
use crate::model::dialog::{ExportDialog, ExportFormat};
use crate::model::field::SelectionEntry;
use crate::model::preview::{PreviewGrid, SortDirection};
use crate::model::row::Row;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, MouseEvent, MouseEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

#[derive(Default)]
pub struct PreviewDialog;

impl Component for PreviewDialog {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Esc | KeyCode::Char('q') => Some(Action::CloseModal),
            KeyCode::Char('n') | KeyCode::PageDown => Some(Action::NextPage),
            KeyCode::Char('N') | KeyCode::PageUp => Some(Action::PrevPage),
            KeyCode::Char('z') => Some(Action::CyclePageSize),
            KeyCode::Char('s') => Some(Action::SortFocusedColumn),
            KeyCode::Right | KeyCode::Char('l') => Some(Action::FocusNextColumn),
            KeyCode::Left | KeyCode::Char('h') => Some(Action::FocusPrevColumn),
            KeyCode::Char('e') => Some(Action::RequestExport(ExportFormat::Xlsx)),
            KeyCode::Char('f') => Some(Action::RequestExport(ExportFormat::Pdf)),
            KeyCode::Char('c') => Some(Action::RequestExport(ExportFormat::Csv)),
            KeyCode::Char('x') => Some(Action::DismissNotification),
            _ => None,
        };
        Ok(action)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let action = match mouse.kind {
            MouseEventKind::ScrollDown => Some(Action::NextPage),
            MouseEventKind::ScrollUp => Some(Action::PrevPage),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the fetched rows; see `draw_with_dialog`
        Ok(())
    }
}

/// Display strings for the current page, in sort order
pub fn page_cells(rows: &[Row], columns: &[SelectionEntry], grid: &PreviewGrid) -> Vec<Vec<String>> {
    let order = grid.ordered_indices(rows, columns);
    let (start, end) = grid.page_range(order.len());
    order[start..end]
        .iter()
        .map(|&i| columns.iter().map(|c| rows[i].get(&c.key).display()).collect())
        .collect()
}

/// Move `grid.column_offset` so the focused column is inside the window
fn scroll_to_focus(grid: &mut PreviewGrid, widths: &[usize], max_width: usize) {
    if widths.is_empty() {
        grid.column_offset = 0;
        return;
    }
    grid.focused_column = grid.focused_column.min(widths.len() - 1);
    if grid.focused_column < grid.column_offset {
        grid.column_offset = grid.focused_column;
    }
    while grid.column_offset < grid.focused_column
        && !visible_columns(widths, grid.column_offset, max_width).contains(&grid.focused_column)
    {
        grid.column_offset += 1;
    }
}

fn sort_marker(grid: &PreviewGrid, column: usize) -> Option<&'static str> {
    match grid.sort {
        Some(sort) if sort.column == column => Some(match sort.direction {
            SortDirection::Ascending => "▲",
            SortDirection::Descending => "▼",
        }),
        _ => None,
    }
}

impl PreviewDialog {
    pub fn draw_with_dialog(&mut self, frame: &mut Frame, area: Rect, dialog: &mut ExportDialog) -> Result<()> {
        let popup = percent_popup(area, 95, 85);
        frame.render_widget(Clear, popup);

        let title = dialog
            .report
            .as_ref()
            .map(|r| format!(" Preview: {} ", r.name))
            .unwrap_or_else(|| " Preview ".to_string());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(popup);
        frame.render_widget(block, popup);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1), Constraint::Length(1)])
            .split(inner);

        let rows: &[Row] = dialog.preview_rows.as_deref().unwrap_or(&[]);
        let columns = dialog.selection.entries();
        let total = rows.len();

        if total == 0 {
            let empty = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "No rows matched",
                    Style::default().fg(Color::DarkGray),
                )),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(empty, chunks[0]);
        } else {
            let grid = &mut dialog.grid;
            let cells = page_cells(rows, columns, grid);
            let titles: Vec<String> = columns.iter().map(|c| c.title.clone()).collect();
            let mut widths = column_widths(&titles, &cells);
            // leave room for the sort arrow
            for (i, width) in widths.iter_mut().enumerate() {
                if sort_marker(grid, i).is_some() {
                    *width = (*width).max(titles[i].width() + 2);
                }
            }
            scroll_to_focus(grid, &widths, chunks[0].width as usize);
            let window = visible_columns(&widths, grid.column_offset, chunks[0].width as usize);

            let headers: Vec<HeaderCell> = titles
                .into_iter()
                .enumerate()
                .map(|(i, title)| HeaderCell {
                    title,
                    focused: i == grid.focused_column,
                    sort_marker: sort_marker(grid, i),
                })
                .collect();
            let lines = build_table_lines(&headers, &cells, &widths, &window);
            frame.render_widget(Paragraph::new(lines), chunks[0]);
        }

        let grid = &dialog.grid;
        let mut footer = vec![
            Span::styled(grid.footer(total), Style::default().fg(Color::Yellow)),
            Span::styled(
                format!(
                    "  ·  Page {}/{}  ·  {} per page",
                    grid.page.min(grid.page_count(total) - 1) + 1,
                    grid.page_count(total),
                    grid.page_size
                ),
                Style::default().fg(Color::DarkGray),
            ),
        ];
        if columns.len() > 1 {
            footer.push(Span::styled(
                format!("  ·  Column {}/{}", grid.focused_column + 1, columns.len()),
                Style::default().fg(Color::DarkGray),
            ));
        }
        frame.render_widget(Paragraph::new(Line::from(footer)), chunks[1]);

        let hints: Vec<Span> = [
            key_hint("n/N", "Page", Color::Cyan),
            key_hint("z", "Page size", Color::Cyan),
            key_hint("←/→", "Column", Color::Cyan),
            key_hint("s", "Sort", Color::Green),
            key_hint("e/f/c", "Export", Color::Green),
            key_hint("Esc", "Back", Color::Yellow),
        ]
        .into_iter()
        .flatten()
        .collect();
        frame.render_widget(Paragraph::new(Line::from(hints)), chunks[2]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::row::CellValue;

    fn rows() -> Vec<Row> {
        [("E-3", "Cara", 30), ("E-1", "ann", 41), ("E-2", "Bob", 25)]
            .iter()
            .map(|(id, name, age)| {
                Row::from_pairs([
                    ("name", CellValue::Text(id.to_string())),
                    ("employee_name", CellValue::Text(name.to_string())),
                    ("age", CellValue::Number(*age as f64)),
                ])
            })
            .collect()
    }

    fn columns() -> Vec<SelectionEntry> {
        vec![
            SelectionEntry::new("employee_name", "Employee Name"),
            SelectionEntry::new("age", "Age"),
        ]
    }

    #[test]
    fn test_page_cells_follow_selection_order() {
        let grid = PreviewGrid::new(10);
        let cells = page_cells(&rows(), &columns(), &grid);
        assert_eq!(cells[0], vec!["Cara".to_string(), "30".to_string()]);
        assert_eq!(cells.len(), 3);
    }

    #[test]
    fn test_page_cells_sorted_and_paged() {
        let mut grid = PreviewGrid::new(2);
        grid.toggle_sort(0);
        let first: Vec<String> = page_cells(&rows(), &columns(), &grid)
            .into_iter()
            .map(|r| r[0].clone())
            .collect();
        assert_eq!(first, vec!["ann", "Bob"]);

        grid.next_page(3);
        let second = page_cells(&rows(), &columns(), &grid);
        assert_eq!(second, vec![vec!["Cara".to_string(), "30".to_string()]]);
    }

    #[test]
    fn test_numeric_sort_descending() {
        let mut grid = PreviewGrid::new(10);
        grid.toggle_sort(1);
        grid.toggle_sort(1);
        let ages: Vec<String> = page_cells(&rows(), &columns(), &grid)
            .into_iter()
            .map(|r| r[1].clone())
            .collect();
        assert_eq!(ages, vec!["41", "30", "25"]);
        assert_eq!(sort_marker(&grid, 1), Some("▼"));
        assert_eq!(sort_marker(&grid, 0), None);
    }

    #[test]
    fn test_scroll_to_focus_follows_cursor() {
        let mut grid = PreviewGrid::new(10);
        let widths = vec![10, 10, 10, 10];
        grid.focused_column = 3;
        scroll_to_focus(&mut grid, &widths, 23);
        assert_eq!(grid.column_offset, 2);
        grid.focused_column = 0;
        scroll_to_focus(&mut grid, &widths, 23);
        assert_eq!(grid.column_offset, 0);
    }

    #[test]
    fn test_keys() {
        let mut dialog = PreviewDialog;
        let key = |c| KeyEvent::new(c, crossterm::event::KeyModifiers::NONE);
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Char('s'))).unwrap(),
            Some(Action::SortFocusedColumn)
        );
        assert_eq!(
            dialog.handle_key_event(key(KeyCode::Esc)).unwrap(),
            Some(Action::CloseModal)
        );
    }
}
