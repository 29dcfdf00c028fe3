//! Notification bar - shows the newest notification above the help bar

use crate::model::notification::{Level, Notification};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Border color and icon for a level
pub fn level_style(level: Level) -> (Color, &'static str) {
    match level {
        Level::Info => (Color::Cyan, "ℹ"),
        Level::Success => (Color::Green, "✓"),
        Level::Warning => (Color::Yellow, "⚠"),
        Level::Error => (Color::Red, "✗"),
    }
}

/// Render `notification` into `area`, with a count of older ones still queued
pub fn draw_notification(frame: &mut Frame, area: Rect, notification: &Notification, queued: usize) {
    let (color, icon) = level_style(notification.level);

    let mut title = format!(" {} {} ", icon, notification.title);
    if queued > 1 {
        title = format!("{}(+{}) ", title, queued - 1);
    }

    let line = Line::from(vec![
        Span::styled(
            notification.message.clone(),
            Style::default().fg(Color::White),
        ),
        Span::styled("   x ", Style::default().fg(color).add_modifier(Modifier::BOLD)),
        Span::styled("dismiss", Style::default().fg(Color::DarkGray)),
    ]);

    let paragraph = Paragraph::new(line)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(color))
                .title(title)
                .title_style(Style::default().fg(color).add_modifier(Modifier::BOLD)),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

/// Bottom strip of `area` for a notification drawn over a modal
pub fn overlay_area(area: Rect) -> Rect {
    let height = 3.min(area.height);
    Rect::new(
        area.x,
        area.y + area.height.saturating_sub(height),
        area.width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_red() {
        assert_eq!(level_style(Level::Error).0, Color::Red);
        assert_eq!(level_style(Level::Warning).0, Color::Yellow);
    }

    #[test]
    fn test_overlay_area_hugs_bottom() {
        let area = overlay_area(Rect::new(0, 0, 80, 24));
        assert_eq!(area, Rect::new(0, 21, 80, 3));
        assert_eq!(overlay_area(Rect::new(0, 0, 80, 2)).height, 2);
    }
}
