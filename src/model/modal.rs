//! Modal stack for overlays
//!
//! Only the top modal receives input. The export dialog sits below the
//! preview so closing the preview lands back in the dialog.

#[derive(Debug, Clone, PartialEq)]
pub enum Modal {
    /// Quit confirmation dialog
    QuitConfirm,
    /// Field picker + selection list for one report
    ExportDialog,
    /// Sorted, paginated preview of fetched rows
    Preview,
    /// Keyboard shortcut reference
    Help,
}

#[derive(Debug, Default)]
pub struct ModalStack {
    stack: Vec<Modal>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self { stack: Vec::new() }
    }

    pub fn push(&mut self, modal: Modal) {
        self.stack.push(modal);
    }

    pub fn pop(&mut self) -> Option<Modal> {
        self.stack.pop()
    }

    pub fn top(&self) -> Option<&Modal> {
        self.stack.last()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    pub fn contains(&self, modal: &Modal) -> bool {
        self.stack.iter().any(|m| m == modal)
    }

    /// Pop modals until `modal` has been removed
    pub fn pop_through(&mut self, modal: &Modal) {
        if !self.contains(modal) {
            return;
        }
        while let Some(top) = self.stack.pop() {
            if &top == modal {
                break;
            }
        }
    }
}
