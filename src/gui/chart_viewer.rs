//! Chart Viewer Widget
//! Fixed-size framed region that hosts whichever renderer is active.

use crate::charts::{all_renderers, ChartConfig, ChartRenderer, RendererKind, CHART_SIZE};
use crate::data::DataError;
use egui::{Color32, RichText};
use tracing::debug;

/// Owns one renderer per kind and shows the active one.
pub struct ChartViewer {
    renderers: Vec<Box<dyn ChartRenderer>>,
}

impl Default for ChartViewer {
    fn default() -> Self {
        Self {
            renderers: all_renderers(),
        }
    }
}

impl ChartViewer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renderer(&self, kind: RendererKind) -> &dyn ChartRenderer {
        self.renderers[kind.index()].as_ref()
    }

    /// Re-lay out `kind` for `config`.
    pub fn prepare(&mut self, kind: RendererKind, config: &ChartConfig) {
        self.renderers[kind.index()].prepare(config);
        debug!(renderer = kind.name(), "renderer prepared");
    }

    pub fn release(&mut self, kind: RendererKind) {
        self.renderers[kind.index()].release();
        debug!(renderer = kind.name(), "renderer released");
    }

    pub fn release_all(&mut self) {
        for renderer in &mut self.renderers {
            renderer.release();
        }
    }

    /// Draw the chart card for `kind`
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        kind: RendererKind,
        config: Result<&ChartConfig, &DataError>,
    ) {
        ui.label(
            RichText::new(format!("{} composite chart", kind.name()))
                .size(18.0)
                .strong(),
        );
        ui.add_space(8.0);

        egui::Frame::none()
            .rounding(8.0)
            .stroke(egui::Stroke::new(1.0, ui.visuals().widgets.noninteractive.bg_stroke.color))
            .inner_margin(12.0)
            .show(ui, |ui| {
                ui.set_min_size(CHART_SIZE);
                match config {
                    Ok(config) => self.renderers[kind.index()].paint(ui, config),
                    Err(e) => {
                        ui.label(
                            RichText::new(format!("Error: {}", e))
                                .color(Color32::from_rgb(220, 53, 69)),
                        );
                    }
                }
            });
    }
}
