//! Charts module - Shared chart configuration and the three renderers

mod canvas;
mod composed;
mod config;
mod scene;

pub use canvas::{use_plot_font, CanvasOptions, CanvasRenderer, ScaleOptions};
pub use composed::{ComposedRenderer, PriceMapping};
pub use config::ChartConfig;
pub use scene::{Primitive, Scene, SceneRenderer};

use crate::data::AxisRange;
use egui::{Pos2, Rect};
use thiserror::Error;

/// Fixed size of the chart region, in points.
pub const CHART_SIZE: egui::Vec2 = egui::vec2(800.0, 400.0);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("Plotting failed: {0}")]
    Plot(String),
    #[error("Chart size {0}x{1} is empty")]
    EmptySurface(u32, u32),
    #[error("Invalid chart font: {0}")]
    Font(String),
}

/// Which rendering path draws the chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RendererKind {
    /// Hand-built scene of shapes painted through the egui painter
    #[default]
    Painter,
    /// Retained chart object rasterized with plotters
    Plotters,
    /// egui_plot composition
    EguiPlot,
}

impl RendererKind {
    pub const ALL: [RendererKind; 3] = [
        RendererKind::Painter,
        RendererKind::Plotters,
        RendererKind::EguiPlot,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RendererKind::Painter => "Painter",
            RendererKind::Plotters => "Plotters",
            RendererKind::EguiPlot => "egui_plot",
        }
    }

    pub fn index(self) -> usize {
        match self {
            RendererKind::Painter => 0,
            RendererKind::Plotters => 1,
            RendererKind::EguiPlot => 2,
        }
    }
}

/// A rendering path for the composite quantity/price chart.
///
/// `prepare` is called on every state transition; it must free whatever the
/// previous layout allocated before allocating anything new. `paint` runs every
/// frame and may only draw what `prepare` laid out.
pub trait ChartRenderer {
    fn kind(&self) -> RendererKind;

    /// Lay the chart out for `config`.
    fn prepare(&mut self, config: &ChartConfig);

    /// Draw into a region of [`CHART_SIZE`].
    fn paint(&mut self, ui: &mut egui::Ui, config: &ChartConfig);

    /// Drop every drawing resource held by the current layout.
    fn release(&mut self);

    /// Range of the secondary (price) axis in the current layout.
    fn price_axis(&self) -> Option<AxisRange>;
}

/// Where the categories sit inside a painted chart, in chart-local points.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryLayout {
    /// Plot area; hovering outside it shows nothing
    pub plot: Rect,
    /// Horizontal center of each category, in dataset order
    pub centers: Vec<f32>,
}

impl CategoryLayout {
    /// Category under `pos`, matched on x only: the nearest center wins anywhere
    /// inside the plot area.
    pub fn index_at(&self, pos: Pos2) -> Option<usize> {
        if !self.plot.contains(pos) {
            return None;
        }
        self.centers
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| (pos.x - **a).abs().total_cmp(&(pos.x - **b).abs()))
            .map(|(i, _)| i)
    }
}

/// Show the hovered record's month, quantity and price next to the pointer.
pub fn show_record_tooltip(response: egui::Response, config: &ChartConfig, layout: &CategoryLayout) {
    let Some(pointer) = response.hover_pos() else {
        return;
    };
    let local = pointer - response.rect.min.to_vec2();
    if let Some(summary) = layout.index_at(local).and_then(|i| config.record_summary(i)) {
        response.on_hover_ui_at_pointer(|ui| {
            ui.label(summary);
        });
    }
}

/// One renderer of each kind, in [`RendererKind::ALL`] order.
pub fn all_renderers() -> Vec<Box<dyn ChartRenderer>> {
    vec![
        Box::new(SceneRenderer::new()),
        Box::new(CanvasRenderer::new()),
        Box::new(ComposedRenderer::new()),
    ]
}
