//! Setup wizard component
//!
//! Collects the server URL and optional API credentials, then writes the
//! config file. Runs on first start and again from the report list (`s`).

use crate::action::Action;
use crate::component::Component;
use crate::config::{validate_base_url, Config};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use std::path::PathBuf;

/// Setup wizard step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    Welcome,
    ServerUrl,
    ApiKey,
    ApiSecret,
    Confirm,
}

impl SetupStep {
    fn next(&self) -> Option<SetupStep> {
        match self {
            SetupStep::Welcome => Some(SetupStep::ServerUrl),
            SetupStep::ServerUrl => Some(SetupStep::ApiKey),
            SetupStep::ApiKey => Some(SetupStep::ApiSecret),
            SetupStep::ApiSecret => Some(SetupStep::Confirm),
            SetupStep::Confirm => None,
        }
    }

    fn prev(&self) -> Option<SetupStep> {
        match self {
            SetupStep::Welcome => None,
            SetupStep::ServerUrl => Some(SetupStep::Welcome),
            SetupStep::ApiKey => Some(SetupStep::ServerUrl),
            SetupStep::ApiSecret => Some(SetupStep::ApiKey),
            SetupStep::Confirm => Some(SetupStep::ApiSecret),
        }
    }

    fn title(&self) -> &str {
        match self {
            SetupStep::Welcome => "Welcome",
            SetupStep::ServerUrl => "Server URL",
            SetupStep::ApiKey => "API Key",
            SetupStep::ApiSecret => "API Secret",
            SetupStep::Confirm => "Confirm",
        }
    }

    fn step_number(&self) -> usize {
        match self {
            SetupStep::Welcome => 1,
            SetupStep::ServerUrl => 2,
            SetupStep::ApiKey => 3,
            SetupStep::ApiSecret => 4,
            SetupStep::Confirm => 5,
        }
    }
}

/// Setup wizard component
pub struct SetupComponent {
    pub step: SetupStep,
    /// Config being built; starts from the existing one when re-running
    pub config: Config,
    /// Where `save` writes; `None` uses the default location
    pub config_path: Option<PathBuf>,
    pub input: String,
    pub error: Option<String>,
    pub complete: bool,
    /// Esc on the first step returns to the report list instead of quitting
    pub cancellable: bool,
}

impl Default for SetupComponent {
    fn default() -> Self {
        Self::new(Config::default(), None, false)
    }
}

impl SetupComponent {
    pub fn new(config: Config, config_path: Option<PathBuf>, cancellable: bool) -> Self {
        Self {
            step: SetupStep::Welcome,
            config,
            config_path,
            input: String::new(),
            error: None,
            complete: false,
            cancellable,
        }
    }

    /// Get the saved config if setup completed successfully
    pub fn get_config(&self) -> Option<&Config> {
        if self.complete {
            Some(&self.config)
        } else {
            None
        }
    }

    fn stored_value(&self, step: SetupStep) -> String {
        match step {
            SetupStep::ServerUrl => self.config.base_url.clone(),
            SetupStep::ApiKey => self.config.api_key.clone().unwrap_or_default(),
            SetupStep::ApiSecret => self.config.api_secret.clone().unwrap_or_default(),
            SetupStep::Welcome | SetupStep::Confirm => String::new(),
        }
    }

    fn validate_current_step(&mut self) -> bool {
        self.error = None;
        let value = self.input.trim().to_string();

        match self.step {
            SetupStep::Welcome | SetupStep::Confirm => true,
            SetupStep::ServerUrl => match validate_base_url(&value) {
                Ok(()) => {
                    self.config.base_url = value.trim_end_matches('/').to_string();
                    true
                }
                Err(e) => {
                    self.error = Some(e);
                    false
                }
            },
            SetupStep::ApiKey => {
                self.config.api_key = (!value.is_empty()).then_some(value);
                true
            }
            SetupStep::ApiSecret => {
                if self.config.api_key.is_some() && value.is_empty() {
                    self.error = Some("API secret is required when an API key is set".to_string());
                    return false;
                }
                self.config.api_secret = (!value.is_empty()).then_some(value);
                true
            }
        }
    }

    fn advance_step(&mut self) {
        if !self.validate_current_step() {
            return;
        }
        if let Some(next) = self.step.next() {
            self.step = next;
            self.input = self.stored_value(next);
        }
    }

    fn go_back(&mut self) {
        if let Some(prev) = self.step.prev() {
            self.step = prev;
            self.error = None;
            self.input = self.stored_value(prev);
        }
    }

    fn save_config(&mut self) {
        let result = match &self.config_path {
            Some(path) => self.config.save_to(path),
            None => self.config.save(),
        };
        match result {
            Ok(()) => {
                self.complete = true;
            }
            Err(e) => {
                self.error = Some(format!("Failed to save config: {:#}", e));
            }
        }
    }

    fn config_location(&self) -> String {
        self.config_path
            .clone()
            .or_else(Config::default_path)
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "~/.report-export-tui/config.json".to_string())
    }
}

impl Component for SetupComponent {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        match self.step {
            SetupStep::Welcome => match key.code {
                KeyCode::Enter => {
                    self.advance_step();
                    Ok(None)
                }
                KeyCode::Esc if self.cancellable => Ok(Some(Action::CloseModal)),
                KeyCode::Esc => Ok(Some(Action::ForceQuit)),
                _ => Ok(None),
            },
            SetupStep::ServerUrl | SetupStep::ApiKey | SetupStep::ApiSecret => match key.code {
                KeyCode::Enter => {
                    self.advance_step();
                    Ok(None)
                }
                KeyCode::Esc => {
                    self.go_back();
                    Ok(None)
                }
                KeyCode::Backspace => {
                    self.input.pop();
                    self.error = None;
                    Ok(None)
                }
                KeyCode::Char(c) => {
                    self.input.push(c);
                    self.error = None;
                    Ok(None)
                }
                _ => Ok(None),
            },
            SetupStep::Confirm => match key.code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.save_config();
                    if self.complete {
                        Ok(Some(Action::SetupConfirm))
                    } else {
                        Ok(None)
                    }
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Backspace => {
                    self.go_back();
                    Ok(None)
                }
                _ => Ok(None),
            },
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()> {
        frame.render_widget(Clear, area);

        let margin = 4;
        let content_area = Rect::new(
            area.x + margin,
            area.y + margin,
            area.width.saturating_sub(margin * 2),
            area.height.saturating_sub(margin * 2),
        );

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(2), // Progress
                Constraint::Min(10),   // Content
                Constraint::Length(3), // Help
            ])
            .split(content_area);

        let title = Paragraph::new(Line::from(vec![Span::styled(
            " Report Export Setup ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(title, chunks[0]);

        let progress = format!(
            "Step {} of 5: {}",
            self.step.step_number(),
            self.step.title()
        );
        frame.render_widget(
            Paragraph::new(Span::styled(progress, Style::default().fg(Color::DarkGray))),
            chunks[1],
        );

        self.draw_step_content(frame, chunks[2]);

        let help_text = match self.step {
            SetupStep::Welcome if self.cancellable => " Enter  Continue   Esc  Cancel",
            SetupStep::Welcome => " Enter  Continue   Esc  Quit",
            SetupStep::ServerUrl | SetupStep::ApiKey | SetupStep::ApiSecret => {
                " Enter  Continue   Esc  Back   Type to edit"
            }
            SetupStep::Confirm => " Enter/y  Save & Continue   Esc/n  Go Back",
        };
        let help = Paragraph::new(Span::styled(help_text, Style::default().fg(Color::DarkGray)))
            .block(Block::default().borders(Borders::ALL));
        frame.render_widget(help, chunks[3]);

        Ok(())
    }
}

impl SetupComponent {
    fn draw_step_content(&self, frame: &mut Frame, area: Rect) {
        let (title, mut lines, color) = match self.step {
            SetupStep::Welcome => (" Welcome ", self.welcome_lines(), Color::Green),
            SetupStep::ServerUrl => (
                " Server URL ",
                self.input_lines(
                    "Enter the address of the HR server:",
                    "(e.g. https://hr.example.com)",
                    false,
                ),
                Color::Cyan,
            ),
            SetupStep::ApiKey => (
                " API Key ",
                self.input_lines(
                    "Enter your API key:",
                    "(leave empty to connect without authentication)",
                    false,
                ),
                Color::Cyan,
            ),
            SetupStep::ApiSecret => (
                " API Secret ",
                self.input_lines("Enter your API secret:", "(input is hidden)", true),
                Color::Cyan,
            ),
            SetupStep::Confirm => (" Confirm Configuration ", self.confirm_lines(), Color::Green),
        };

        if let Some(ref error) = self.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("Error: {}", error),
                Style::default().fg(Color::Red),
            )));
        }

        let paragraph = Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(Style::default().fg(color)),
        );
        frame.render_widget(paragraph, area);
    }

    fn welcome_lines(&self) -> Vec<Line<'static>> {
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Welcome to Report Export!",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from("Pick columns from your HR records, preview them and export to"),
            Line::from("Excel, PDF or CSV."),
            Line::from(""),
            Line::from("You will need:"),
            Line::from(Span::styled(
                "  1. The server URL",
                Style::default().fg(Color::Cyan),
            )),
            Line::from(Span::styled(
                "  2. An API key and secret (optional)",
                Style::default().fg(Color::Cyan),
            )),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to begin...",
                Style::default().fg(Color::Yellow),
            )),
        ]
    }

    fn input_lines(&self, prompt: &str, hint: &str, masked: bool) -> Vec<Line<'static>> {
        let shown = if masked {
            "*".repeat(self.input.chars().count())
        } else {
            self.input.clone()
        };
        vec![
            Line::from(""),
            Line::from(prompt.to_string()),
            Line::from(Span::styled(hint.to_string(), Style::default().fg(Color::DarkGray))),
            Line::from(""),
            Line::from(vec![
                Span::styled("> ", Style::default().fg(Color::Cyan)),
                Span::styled(
                    format!("{}_", shown),
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD),
                ),
            ]),
        ]
    }

    fn confirm_lines(&self) -> Vec<Line<'static>> {
        let auth = match (&self.config.api_key, &self.config.api_secret) {
            (Some(key), Some(_)) => format!("token {}:********", key),
            _ => "none".to_string(),
        };
        vec![
            Line::from(""),
            Line::from(Span::styled(
                "Review your configuration:",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("Server URL:     ", Style::default().fg(Color::Cyan)),
                Span::raw(self.config.base_url.clone()),
            ]),
            Line::from(vec![
                Span::styled("Authentication: ", Style::default().fg(Color::Cyan)),
                Span::raw(auth),
            ]),
            Line::from(vec![
                Span::styled("Export folder:  ", Style::default().fg(Color::Cyan)),
                Span::raw(self.config.export_dir.display().to_string()),
            ]),
            Line::from(""),
            Line::from(vec![
                Span::styled("Config will be saved to: ", Style::default().fg(Color::DarkGray)),
                Span::raw(self.config_location()),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter or 'y' to save and continue...",
                Style::default().fg(Color::Yellow),
            )),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(setup: &mut SetupComponent, code: KeyCode) -> Option<Action> {
        setup
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    fn type_text(setup: &mut SetupComponent, text: &str) {
        for c in text.chars() {
            press(setup, KeyCode::Char(c));
        }
    }

    #[test]
    fn test_invalid_url_stays_on_step() {
        let mut setup = SetupComponent::default();
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.step, SetupStep::ServerUrl);
        type_text(&mut setup, "ftp://example.com");
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.step, SetupStep::ServerUrl);
        assert!(setup.error.is_some());
    }

    #[test]
    fn test_secret_required_with_key() {
        let mut setup = SetupComponent::default();
        press(&mut setup, KeyCode::Enter);
        type_text(&mut setup, "https://hr.example.com/");
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.config.base_url, "https://hr.example.com");
        type_text(&mut setup, "abc");
        press(&mut setup, KeyCode::Enter);
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.step, SetupStep::ApiSecret);
        assert!(setup.error.is_some());
    }

    #[test]
    fn test_full_run_saves_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let mut setup = SetupComponent::new(Config::default(), Some(path.clone()), false);

        press(&mut setup, KeyCode::Enter);
        type_text(&mut setup, "http://localhost:8000");
        press(&mut setup, KeyCode::Enter);
        type_text(&mut setup, "key");
        press(&mut setup, KeyCode::Enter);
        type_text(&mut setup, "secret");
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.step, SetupStep::Confirm);

        assert_eq!(press(&mut setup, KeyCode::Enter), Some(Action::SetupConfirm));
        let saved = Config::load_from(&path).unwrap();
        assert_eq!(saved.base_url, "http://localhost:8000");
        assert_eq!(saved.api_key.as_deref(), Some("key"));
        assert_eq!(saved.api_secret.as_deref(), Some("secret"));
        assert_eq!(setup.get_config(), Some(&saved));
    }

    #[test]
    fn test_back_restores_previous_value() {
        let mut config = Config::default();
        config.base_url = "https://hr.example.com".to_string();
        let mut setup = SetupComponent::new(config, None, true);
        press(&mut setup, KeyCode::Enter);
        assert_eq!(setup.input, "https://hr.example.com");
        press(&mut setup, KeyCode::Enter);
        press(&mut setup, KeyCode::Esc);
        assert_eq!(setup.step, SetupStep::ServerUrl);
        assert_eq!(setup.input, "https://hr.example.com");
    }

    #[test]
    fn test_escape_on_welcome() {
        let mut first_run = SetupComponent::default();
        assert_eq!(press(&mut first_run, KeyCode::Esc), Some(Action::ForceQuit));
        let mut rerun = SetupComponent::new(Config::default(), None, true);
        assert_eq!(press(&mut rerun, KeyCode::Esc), Some(Action::CloseModal));
    }
}
