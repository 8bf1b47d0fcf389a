//! Graph Switcher - one monthly dataset drawn by three rendering paths
//!
//! The same quantity/price table is shown as a composite chart (bars on the
//! left axis, a line on the right axis) by a hand-built painter scene, a
//! plotters bitmap, or an egui_plot composition, with a light/dark theme.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod theme;

pub use charts::{ChartConfig, ChartRenderer, RendererKind};
pub use config::AppConfig;
pub use gui::{GraphSwitcherApp, ViewState};
pub use theme::{Palette, Theme};
