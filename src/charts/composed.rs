//! Composed Renderer
//! Builds the chart from egui_plot components: a bar chart, a line with points,
//! a legend and two custom y axes.
//!
//! egui_plot has a single y coordinate, so prices are drawn in quantity space.
//! The y grid carries round quantity marks and round price marks mapped into
//! quantity space; each axis only labels its own marks.

use super::{ChartConfig, ChartRenderer, RendererKind, CHART_SIZE};
use crate::data::{nice_step, AxisRange};
use egui::{RichText, Vec2};
use egui_plot::{
    AxisHints, Bar, BarChart, Corner, GridMark, HLine, HPlacement, Legend, Line, Plot, PlotPoints,
    Points,
};
use tracing::debug;

const PLOT_ID: &str = "composed_chart";
const BAR_WIDTH: f64 = 0.6;
const TITLE_HEIGHT: f32 = 28.0;
const TARGET_TICKS: usize = 5;

/// Linear map between the price axis and the plot's (quantity) y coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceMapping {
    pub price: AxisRange,
    pub quantity: AxisRange,
}

impl PriceMapping {
    pub fn to_plot(&self, price: f64) -> f64 {
        self.quantity.at_fraction(self.price.fraction(price))
    }

    pub fn to_price(&self, y: f64) -> f64 {
        self.price.at_fraction(self.quantity.fraction(y))
    }

    /// Plot positions of the round price ticks.
    pub fn price_marks(&self) -> Vec<f64> {
        self.price
            .ticks(TARGET_TICKS)
            .into_iter()
            .map(|p| self.to_plot(p))
            .collect()
    }
}

/// Y grid for both axes: quantity ticks followed by mapped price ticks.
fn y_marks(mapping: &PriceMapping) -> Vec<GridMark> {
    let quantity_step = nice_step(mapping.quantity.span(), TARGET_TICKS);
    let price_step = nice_step(mapping.price.span(), TARGET_TICKS) * mapping.quantity.span()
        / mapping.price.span();
    mapping
        .quantity
        .ticks(TARGET_TICKS)
        .into_iter()
        .map(|value| GridMark {
            value,
            step_size: quantity_step,
        })
        .chain(mapping.price_marks().into_iter().map(|value| GridMark {
            value,
            step_size: price_step,
        }))
        .collect()
}

fn is_mark(marks: &[f64], value: f64) -> bool {
    marks.iter().any(|m| (m - value).abs() < 1e-6)
}

/// Record under plot x coordinate `x`, nearest category first.
fn category_index(x: f64, n: usize) -> Option<usize> {
    let idx = x.round();
    (idx >= 0.0 && (idx as usize) < n).then_some(idx as usize)
}

/// Component-based renderer backed by egui_plot.
#[derive(Default)]
pub struct ComposedRenderer {
    mapping: Option<PriceMapping>,
    reset_bounds: bool,
}

impl ComposedRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mapping(&self) -> Option<PriceMapping> {
        self.mapping
    }
}

fn category_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}

impl ChartRenderer for ComposedRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::EguiPlot
    }

    fn prepare(&mut self, config: &ChartConfig) {
        self.mapping = Some(PriceMapping {
            price: config.price_axis,
            quantity: config.quantity_axis,
        });
        // Stored plot bounds belong to the previous layout
        self.reset_bounds = true;
    }

    fn paint(&mut self, ui: &mut egui::Ui, config: &ChartConfig) {
        let Some(mapping) = self.mapping else {
            return;
        };

        let n = config.len();
        let labels = config.labels.clone();
        let palette = config.palette;

        ui.allocate_ui(CHART_SIZE, |ui| {
            ui.vertical_centered(|ui| {
                ui.label(
                    RichText::new(config.title)
                        .size(18.0)
                        .color(palette.foreground),
                );
            });

            let quantity_marks = mapping.quantity.ticks(TARGET_TICKS);
            let price_marks = mapping.price_marks();
            let quantity_labels = quantity_marks.clone();
            let quantity_axis = AxisHints::new_y()
                .label(config.quantity_caption)
                .formatter(move |mark, _range| {
                    if is_mark(&quantity_labels, mark.value) {
                        format!("{:.0}", mark.value)
                    } else {
                        String::new()
                    }
                });
            let price_axis = AxisHints::new_y()
                .label(config.price_caption)
                .placement(HPlacement::Right)
                .formatter(move |mark, _range| {
                    if is_mark(&price_marks, mark.value) {
                        format!("{:.0}", mapping.to_price(mark.value))
                    } else {
                        String::new()
                    }
                });

            let summaries: Vec<String> = (0..n).filter_map(|i| config.record_summary(i)).collect();

            let mut plot = Plot::new(PLOT_ID)
                .width(CHART_SIZE.x)
                .height(CHART_SIZE.y - TITLE_HEIGHT)
                .legend(Legend::default().position(Corner::RightTop))
                .allow_zoom(false)
                .allow_drag(false)
                .allow_scroll(false)
                .allow_boxed_zoom(false)
                .allow_double_click_reset(false)
                // Quantity gridlines are drawn as items; price marks get none
                .show_grid([false, false])
                .set_margin_fraction(Vec2::ZERO)
                .include_x(-0.5)
                .include_x(n as f64 - 0.5)
                .include_y(mapping.quantity.min)
                .include_y(mapping.quantity.max)
                .x_axis_label(config.month_caption)
                .x_axis_formatter(move |mark, _range| category_label(&labels, mark.value))
                .x_grid_spacer(move |_input| {
                    (0..n)
                        .map(|i| GridMark {
                            value: i as f64,
                            step_size: 1.0,
                        })
                        .collect()
                })
                .y_grid_spacer(move |_input| y_marks(&mapping))
                .label_formatter(move |_name, point| {
                    category_index(point.x, n)
                        .and_then(|i| summaries.get(i).cloned())
                        .unwrap_or_default()
                })
                .custom_y_axes(vec![quantity_axis, price_axis]);

            if std::mem::take(&mut self.reset_bounds) {
                plot = plot.reset();
                debug!("composed plot bounds reset");
            }

            plot.show(ui, |plot_ui| {
                for &value in &quantity_marks {
                    plot_ui.hline(HLine::new(value).color(palette.gridline).width(1.0));
                }

                let bars: Vec<Bar> = config
                    .quantities
                    .iter()
                    .zip(&config.labels)
                    .enumerate()
                    .map(|(i, (&q, label))| Bar::new(i as f64, q).width(BAR_WIDTH).name(label))
                    .collect();
                plot_ui.bar_chart(
                    BarChart::new(bars)
                        .color(config.bar_color)
                        .name(config.quantity_series),
                );

                let points: Vec<[f64; 2]> = config
                    .prices
                    .iter()
                    .enumerate()
                    .map(|(i, &p)| [i as f64, mapping.to_plot(p)])
                    .collect();
                plot_ui.line(
                    Line::new(PlotPoints::from_iter(points.iter().copied()))
                        .color(config.line_color)
                        .width(2.0)
                        .name(config.price_series),
                );
                plot_ui.points(
                    Points::new(PlotPoints::from_iter(points.iter().copied()))
                        .radius(4.0)
                        .color(config.line_color)
                        .name(config.price_series),
                );
            });
        });
    }

    fn release(&mut self) {
        self.mapping = None;
        self.reset_bounds = false;
    }

    fn price_axis(&self) -> Option<AxisRange> {
        self.mapping.map(|m| m.price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{monthly_sales, Locale};
    use crate::theme::Theme;
    use approx::assert_relative_eq;

    fn config() -> ChartConfig {
        ChartConfig::build(&monthly_sales(), Theme::Light, Locale::En).unwrap()
    }

    #[test]
    fn test_mapping_places_price_extremes_on_plot_extremes() {
        let config = config();
        let mapping = PriceMapping {
            price: config.price_axis,
            quantity: config.quantity_axis,
        };
        assert_relative_eq!(mapping.to_plot(config.price_axis.min), config.quantity_axis.min);
        assert_relative_eq!(mapping.to_plot(config.price_axis.max), config.quantity_axis.max);
        assert_relative_eq!(mapping.to_price(mapping.to_plot(515.0)), 515.0, epsilon = 1e-9);
    }

    #[test]
    fn test_category_labels_only_on_integers() {
        let labels = vec!["Jan".to_string(), "Feb".to_string()];
        assert_eq!(category_label(&labels, 0.0), "Jan");
        assert_eq!(category_label(&labels, 1.0), "Feb");
        assert_eq!(category_label(&labels, 0.5), "");
        assert_eq!(category_label(&labels, -1.0), "");
        assert_eq!(category_label(&labels, 2.0), "");
    }

    #[test]
    fn test_price_marks_label_round_prices() {
        let config = config();
        let mapping = PriceMapping {
            price: config.price_axis,
            quantity: config.quantity_axis,
        };
        let prices: Vec<f64> = mapping
            .price_marks()
            .into_iter()
            .map(|y| mapping.to_price(y))
            .collect();
        assert_eq!(prices.len(), 4);
        for (price, expected) in prices.iter().zip([450.0, 500.0, 550.0, 600.0]) {
            assert_relative_eq!(*price, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_y_marks_cover_both_axes() {
        let config = config();
        let mapping = PriceMapping {
            price: config.price_axis,
            quantity: config.quantity_axis,
        };
        let marks = y_marks(&mapping);
        // 0..200 by 50, then 450..600 by 50 in plot space
        assert_eq!(marks.len(), 5 + 4);
        assert!(marks.iter().all(|m| m.step_size > 0.0));
        assert!(is_mark(&mapping.quantity.ticks(TARGET_TICKS), marks[1].value));
        assert!(is_mark(&mapping.price_marks(), marks[5].value));
    }

    #[test]
    fn test_hover_index_rounds_to_category() {
        assert_eq!(category_index(0.2, 12), Some(0));
        assert_eq!(category_index(2.6, 12), Some(3));
        assert_eq!(category_index(11.4, 12), Some(11));
        assert_eq!(category_index(-0.7, 12), None);
        assert_eq!(category_index(11.6, 12), None);
    }

    #[test]
    fn test_prepare_requests_bounds_reset() {
        let mut renderer = ComposedRenderer::new();
        renderer.prepare(&config());
        assert!(renderer.reset_bounds);
        assert_eq!(renderer.price_axis(), Some(config().price_axis));
        renderer.release();
        assert!(renderer.price_axis().is_none());
    }

    #[test]
    fn test_paints_headless() {
        let config = config();
        let mut renderer = ComposedRenderer::new();
        renderer.prepare(&config);

        let ctx = egui::Context::default();
        for _ in 0..2 {
            let _ = ctx.run(egui::RawInput::default(), |ctx| {
                egui::CentralPanel::default().show(ctx, |ui| {
                    renderer.paint(ui, &config);
                });
            });
        }
        assert!(!renderer.reset_bounds);
    }
}
