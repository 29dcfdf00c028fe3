//! Layout calculations for the UI

use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

/// Report catalogue screen areas
pub struct MainLayout {
    pub header: Rect,
    pub list: Rect,
    pub detail: Rect,
    pub notification: Option<Rect>,
    pub help: Rect,
}

/// Areas inside the export dialog popup
pub struct DialogLayout {
    pub search: Rect,
    pub tree: Rect,
    pub selection: Rect,
    pub status: Rect,
    pub buttons: Rect,
}

/// Calculate centered popup area
pub fn centered_popup(area: Rect, width: u16, height: u16) -> Rect {
    let popup_x = area.x + (area.width.saturating_sub(width)) / 2;
    let popup_y = area.y + (area.height.saturating_sub(height)) / 2;

    Rect::new(
        popup_x,
        popup_y,
        width.min(area.width),
        height.min(area.height),
    )
}

/// Centered popup sized as a percentage of `area`
pub fn percent_popup(area: Rect, percent_x: u16, percent_y: u16) -> Rect {
    let width = area.width.saturating_mul(percent_x.min(100)) / 100;
    let height = area.height.saturating_mul(percent_y.min(100)) / 100;
    centered_popup(area, width, height)
}

/// Whether the terminal cell at (`column`, `row`) lies inside `rect`
pub fn contains(rect: Rect, column: u16, row: u16) -> bool {
    rect.contains(Position::new(column, row))
}

/// Calculate the report catalogue layout
pub fn calculate_main_layout(area: Rect, has_notification: bool) -> MainLayout {
    // header + content + (optional notification) + help bar
    let main_chunks = if has_notification {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
                Constraint::Length(3),
            ])
            .split(area)
    } else {
        Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(area)
    };

    let content = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(main_chunks[1]);

    let (notification, help) = if has_notification {
        (Some(main_chunks[2]), main_chunks[3])
    } else {
        (None, main_chunks[2])
    };

    MainLayout {
        header: main_chunks[0],
        list: content[0],
        detail: content[1],
        notification,
        help,
    }
}

/// Split the inside of the export dialog border
pub fn calculate_dialog_layout(inner: Rect) -> DialogLayout {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(inner);

    let panes = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    DialogLayout {
        search: rows[0],
        tree: panes[0],
        selection: panes[1],
        status: rows[2],
        buttons: rows[3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_popup_respects_origin() {
        let area = Rect::new(10, 5, 100, 40);
        let popup = centered_popup(area, 40, 10);
        assert_eq!(popup, Rect::new(40, 20, 40, 10));
    }

    #[test]
    fn test_centered_popup_clamps_to_area() {
        let popup = centered_popup(Rect::new(0, 0, 20, 5), 40, 10);
        assert_eq!(popup.width, 20);
        assert_eq!(popup.height, 5);
    }

    #[test]
    fn test_percent_popup() {
        let popup = percent_popup(Rect::new(0, 0, 100, 50), 80, 60);
        assert_eq!((popup.width, popup.height), (80, 30));
        assert_eq!((popup.x, popup.y), (10, 10));
    }

    #[test]
    fn test_main_layout_with_notification() {
        let layout = calculate_main_layout(Rect::new(0, 0, 100, 40), true);
        assert!(layout.notification.is_some());
        assert_eq!(layout.help.height, 3);
        assert_eq!(layout.list.y, 3);
    }

    #[test]
    fn test_dialog_panes_side_by_side() {
        let layout = calculate_dialog_layout(Rect::new(1, 1, 80, 30));
        assert_eq!(layout.tree.y, layout.selection.y);
        assert!(layout.tree.x < layout.selection.x);
        assert!(contains(layout.selection, layout.selection.x, layout.selection.y));
        assert!(!contains(layout.selection, layout.tree.x, layout.tree.y));
    }
}
