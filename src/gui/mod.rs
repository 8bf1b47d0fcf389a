//! GUI module - User interface components

mod app;
mod chart_viewer;
pub mod fonts;
mod toolbar;
mod view_state;

pub use app::GraphSwitcherApp;
pub use chart_viewer::ChartViewer;
pub use toolbar::{theme_button_label, Toolbar, ToolbarAction, HEADING};
pub use view_state::ViewState;
