//! Component trait - Interface for UI components

use crate::action::Action;
use anyhow::Result;
use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::{layout::Rect, Frame};

/// A self-contained piece of the interface
///
/// Events become Actions in `handle_key_event` / `handle_mouse_event`;
/// state changes happen in `update`; `draw` only renders. Components that
/// render shared model state take it through their own `draw_with_*`
/// methods and keep `draw` for the standalone case.
pub trait Component {
    fn init(&mut self) -> Result<()> {
        Ok(())
    }

    /// Translate a key press into an Action
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    /// Translate a mouse event into an Action
    ///
    /// Drag gestures may emit an Action on every move event.
    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let _ = mouse;
        Ok(None)
    }

    /// Apply an Action, optionally producing a follow-up Action
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect) -> Result<()>;
}
