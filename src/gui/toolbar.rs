//! Toolbar Widget
//! Theme toggle, page heading and the renderer selector buttons.

use crate::charts::RendererKind;
use crate::gui::ViewState;
use egui::RichText;

pub const HEADING: &str = "Chart Library Comparison";

/// Label of the theme button for the current theme.
pub fn theme_button_label(state: &ViewState) -> &'static str {
    if state.theme.is_dark() {
        "Switch to light mode"
    } else {
        "Switch to dark mode"
    }
}

/// Top bar with the view controls.
#[derive(Default)]
pub struct Toolbar;

impl Toolbar {
    pub fn new() -> Self {
        Self
    }

    /// Draw the toolbar
    pub fn show(&mut self, ui: &mut egui::Ui, state: &ViewState) -> ToolbarAction {
        let mut action = ToolbarAction::None;

        ui.add_space(8.0);
        if ui
            .button(RichText::new(theme_button_label(state)).size(14.0))
            .clicked()
        {
            action = ToolbarAction::ToggleTheme;
        }

        ui.add_space(8.0);
        ui.heading(RichText::new(HEADING).size(26.0).strong());
        ui.add_space(8.0);

        ui.horizontal(|ui| {
            for (kind, active) in state.selector_entries() {
                let button = egui::Button::new(RichText::new(kind.name()).size(15.0))
                    .selected(active)
                    .min_size(egui::vec2(110.0, 30.0));
                if ui.add(button).clicked() && !active {
                    action = ToolbarAction::SelectRenderer(kind);
                }
            }
        });

        ui.add_space(10.0);
        ui.separator();

        action
    }
}

/// Actions triggered by the toolbar
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolbarAction {
    None,
    ToggleTheme,
    SelectRenderer(RendererKind),
}
