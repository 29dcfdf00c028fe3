//! Text table rendering for the preview grid
//!
//! Columns are padded by display width so wide characters line up.

use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Widest a single column may grow
pub const MAX_COLUMN_WIDTH: usize = 40;

const SEPARATOR: &str = " │ ";

/// Per-column widths from headers and cells, capped at `MAX_COLUMN_WIDTH`
pub fn column_widths(headers: &[String], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.width());
            }
        }
    }
    for width in &mut widths {
        *width = (*width).clamp(1, MAX_COLUMN_WIDTH);
    }
    widths
}

/// Pad or truncate `text` to exactly `width` display columns
pub fn fit_cell(text: &str, width: usize) -> String {
    let text_width = text.width();
    if text_width <= width {
        return format!("{}{}", text, " ".repeat(width - text_width));
    }
    if width <= 3 {
        return ".".repeat(width);
    }

    let budget = width - 3;
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push_str("...");
    used += 3;
    out.push_str(&" ".repeat(width.saturating_sub(used)));
    out
}

/// Visible column window starting at `offset` that fits in `max_width`
///
/// Always yields at least one column when any exist past `offset`.
pub fn visible_columns(widths: &[usize], offset: usize, max_width: usize) -> Vec<usize> {
    let mut cols = Vec::new();
    let mut used = 0;
    for (i, width) in widths.iter().enumerate().skip(offset) {
        let needed = if cols.is_empty() {
            *width
        } else {
            width + SEPARATOR.width()
        };
        if !cols.is_empty() && used + needed > max_width {
            break;
        }
        used += needed;
        cols.push(i);
    }
    cols
}

/// Header marker for a column
pub struct HeaderCell {
    pub title: String,
    pub focused: bool,
    /// Arrow shown after the title when the grid is sorted on this column
    pub sort_marker: Option<&'static str>,
}

/// Build table lines for the given window of columns
pub fn build_table_lines(
    headers: &[HeaderCell],
    rows: &[Vec<String>],
    widths: &[usize],
    columns: &[usize],
) -> Vec<Line<'static>> {
    let mut lines = Vec::new();

    let header_spans: Vec<Span> = columns
        .iter()
        .enumerate()
        .flat_map(|(pos, &i)| {
            let header = &headers[i];
            let title = match header.sort_marker {
                Some(marker) => format!("{} {}", header.title, marker),
                None => header.title.clone(),
            };
            let mut style = Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD);
            if header.focused {
                style = style.add_modifier(Modifier::REVERSED);
            }
            let mut spans = Vec::with_capacity(2);
            if pos > 0 {
                spans.push(Span::raw(SEPARATOR));
            }
            spans.push(Span::styled(fit_cell(&title, widths[i]), style));
            spans
        })
        .collect();
    lines.push(Line::from(header_spans));

    let separator: String = columns
        .iter()
        .map(|&i| "─".repeat(widths[i]))
        .collect::<Vec<_>>()
        .join("─┼─");
    lines.push(Line::from(Span::styled(
        separator,
        Style::default().fg(Color::DarkGray),
    )));

    for row in rows {
        let row_spans: Vec<Span> = columns
            .iter()
            .enumerate()
            .flat_map(|(pos, &i)| {
                let cell = row.get(i).map(String::as_str).unwrap_or("");
                let mut spans = Vec::with_capacity(2);
                if pos > 0 {
                    spans.push(Span::raw(SEPARATOR));
                }
                spans.push(Span::styled(
                    fit_cell(cell, widths[i]),
                    Style::default().fg(Color::White),
                ));
                spans
            })
            .collect();
        lines.push(Line::from(row_spans));
    }

    lines
}
