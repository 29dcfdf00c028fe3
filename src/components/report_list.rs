//! Report list component - the main screen
//!
//! Lists the report catalogue and shows what the highlighted report
//! exports. Enter opens the export dialog for it.

use crate::action::Action;
use crate::component::Component;
use crate::components::{calculate_main_layout, draw_notification};
use crate::model::notification::Notifications;
use crate::model::report::{FilterCondition, ReportDefinition, SchemaSource};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

#[derive(Default)]
pub struct ReportListComponent {
    pub list_state: ListState,
}

impl ReportListComponent {
    pub fn new() -> Self {
        let mut list_state = ListState::default();
        list_state.select(Some(0));
        Self { list_state }
    }

    pub fn selected(&self) -> Option<usize> {
        self.list_state.selected()
    }

    pub fn selected_report<'a>(&self, reports: &'a [ReportDefinition]) -> Option<&'a ReportDefinition> {
        self.list_state.selected().and_then(|i| reports.get(i))
    }

    pub fn next(&mut self, count: usize) {
        if count == 0 {
            self.list_state.select(None);
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) if i + 1 < count => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn previous(&mut self, count: usize) {
        if count == 0 {
            self.list_state.select(None);
            return;
        }
        let i = self.list_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self, count: usize) {
        self.list_state.select(if count == 0 { None } else { Some(0) });
    }

    pub fn select_last(&mut self, count: usize) {
        self.list_state.select(count.checked_sub(1));
    }
}

impl Component for ReportListComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('j') | KeyCode::Down => Some(Action::NextItem),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::PrevItem),
            KeyCode::Char('g') | KeyCode::Home => Some(Action::FirstItem),
            KeyCode::Char('G') | KeyCode::End => Some(Action::LastItem),
            KeyCode::Enter => Some(Action::OpenReport),
            KeyCode::Char('s') => Some(Action::OpenSetup),
            KeyCode::Char('x') => Some(Action::DismissNotification),
            KeyCode::Char('?') => Some(Action::OpenHelp),
            KeyCode::Char('q') | KeyCode::Esc => Some(Action::OpenQuitDialog),
            _ => None,
        };
        Ok(action)
    }

    fn draw(&mut self, _frame: &mut Frame, _area: Rect) -> Result<()> {
        // Needs the catalogue; see `draw_report_screen`
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Rendering Functions
// ═══════════════════════════════════════════════════════════════════════════════

/// Context needed for rendering the report screen
pub struct ReportScreenContext<'a> {
    pub reports: &'a [ReportDefinition],
    pub base_url: &'a str,
    pub notifications: &'a Notifications,
    pub pending_jobs: usize,
}

/// Draw the report catalogue screen
pub fn draw_report_screen(
    frame: &mut Frame,
    area: Rect,
    list: &mut ReportListComponent,
    ctx: &ReportScreenContext,
) {
    let latest = ctx.notifications.latest();
    let layout = calculate_main_layout(area, latest.is_some());

    render_header(frame, layout.header, ctx);
    render_report_list(frame, layout.list, list, ctx.reports);
    render_report_detail(frame, layout.detail, list.selected_report(ctx.reports));
    if let (Some(notification_area), Some(notification)) = (layout.notification, latest) {
        draw_notification(frame, notification_area, notification, ctx.notifications.len());
    }
    render_help_bar(frame, layout.help);
}

fn render_header(frame: &mut Frame, area: Rect, ctx: &ReportScreenContext) {
    let mut spans = vec![
        Span::styled(
            " Report Export ",
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(ctx.base_url.to_string(), Style::default().fg(Color::DarkGray)),
    ];
    if ctx.pending_jobs > 0 {
        spans.push(Span::styled(
            format!("  ⟳ {} running", ctx.pending_jobs),
            Style::default().fg(Color::Yellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}

fn render_report_list(
    frame: &mut Frame,
    area: Rect,
    list: &mut ReportListComponent,
    reports: &[ReportDefinition],
) {
    let items: Vec<ListItem> = reports
        .iter()
        .map(|report| {
            ListItem::new(Line::from(vec![
                Span::styled(
                    report.name.clone(),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  {} · {}", report.entity, report.source_label()),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();

    let list_widget = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Reports ({}) ", reports.len()))
                .border_style(Style::default().fg(Color::DarkGray)),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list_widget, area, &mut list.list_state);
}

fn render_report_detail(frame: &mut Frame, area: Rect, report: Option<&ReportDefinition>) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Details ")
        .border_style(Style::default().fg(Color::DarkGray));

    let Some(report) = report else {
        let empty = Paragraph::new("No reports configured")
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(empty, area);
        return;
    };

    let label = Style::default().fg(Color::Cyan);
    let mut lines = vec![
        Line::from(Span::styled(
            report.name.clone(),
            Style::default()
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("Entity:  ", label),
            Span::raw(report.entity.clone()),
        ]),
        Line::from(vec![
            Span::styled("Fields:  ", label),
            Span::raw(report.source_label()),
        ]),
    ];

    if let SchemaSource::Static { fields } = &report.source {
        for field in fields {
            lines.push(Line::from(Span::styled(
                format!("  • {}", field.title),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    if !report.filters.is_empty() {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Filters:", label)));
        for filter in &report.filters {
            lines.push(Line::from(Span::styled(
                format!("  {}", describe_filter(filter)),
                Style::default().fg(Color::Gray),
            )));
        }
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Press Enter to choose columns",
        Style::default().fg(Color::Yellow),
    )));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

fn describe_filter(filter: &FilterCondition) -> String {
    format!("{} {} {}", filter.field, filter.op.operator(), filter.value)
}

/// Key + label pair for the help bars
pub fn key_hint(key: &str, label: &str, color: Color) -> [Span<'static>; 2] {
    [
        Span::styled(
            format!(" {} ", key),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("{} ", label)),
    ]
}

fn render_help_bar(frame: &mut Frame, area: Rect) {
    let spans: Vec<Span> = [
        key_hint("q", "Quit", Color::Yellow),
        key_hint("Enter", "Open", Color::Green),
        key_hint("j/k", "Move", Color::Cyan),
        key_hint("s", "Settings", Color::Cyan),
        key_hint("x", "Dismiss", Color::Magenta),
        key_hint("?", "Help", Color::White),
    ]
    .into_iter()
    .flatten()
    .collect();

    let paragraph = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(paragraph, area);
}
