//! View state: which renderer is active and which theme is shown.

use crate::charts::RendererKind;
use crate::theme::Theme;

/// The two independent axes of the view. Every combination is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ViewState {
    pub renderer: RendererKind,
    pub theme: Theme,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_renderer(&mut self, kind: RendererKind) {
        self.renderer = kind;
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
    }

    /// Selector buttons in display order, with exactly the active one marked.
    pub fn selector_entries(&self) -> [(RendererKind, bool); 3] {
        RendererKind::ALL.map(|kind| (kind, kind == self.renderer))
    }
}
