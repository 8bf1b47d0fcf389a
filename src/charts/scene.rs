//! Scene Renderer
//! Builds the composite chart from scales and primitive shapes, then paints them
//! with the egui painter.
//!
//! Layout (chart-local coordinates, origin top-left):
//! 1. Title centered above the plot
//! 2. Legend in the top right corner
//! 3. Plot area: quantity gridlines, bars, price line with dots
//! 4. Axes: month (bottom), quantity (left), price (right) with rotated captions

use super::{
    show_record_tooltip, CategoryLayout, ChartConfig, ChartRenderer, RendererKind, CHART_SIZE,
};
use crate::data::AxisRange;
use egui::emath::Rot2;
use egui::epaint::TextShape;
use egui::{pos2, vec2, Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Vec2};
use std::f32::consts::FRAC_PI_2;
use tracing::debug;

const MARGIN_TOP: f32 = 60.0;
const MARGIN_RIGHT: f32 = 80.0;
const MARGIN_BOTTOM: f32 = 60.0;
const MARGIN_LEFT: f32 = 70.0;

const BAND_PADDING: f32 = 0.3;
const TICK_LEN: f32 = 6.0;
const DOT_RADIUS: f32 = 4.0;
const TARGET_TICKS: usize = 5;

const TITLE_SIZE: f32 = 18.0;
const CAPTION_SIZE: f32 = 14.0;
const TICK_SIZE: f32 = 12.0;

/// A single drawing instruction in chart-local coordinates.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Rect {
        rect: Rect,
        fill: Color32,
    },
    Segment {
        from: Pos2,
        to: Pos2,
        stroke: Stroke,
    },
    Polyline {
        points: Vec<Pos2>,
        stroke: Stroke,
    },
    Circle {
        center: Pos2,
        radius: f32,
        fill: Color32,
        stroke: Stroke,
    },
    /// Text placed by `anchor`; rotated text is always centered on `pos`.
    Text {
        pos: Pos2,
        text: String,
        anchor: Align2,
        size: f32,
        color: Color32,
        angle: f32,
    },
}

/// Ordered list of primitives making up one rendering of the chart.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub size: Vec2,
    primitives: Vec<Primitive>,
}

impl Scene {
    pub fn new(size: Vec2) -> Self {
        Self {
            size,
            primitives: Vec::new(),
        }
    }

    pub fn clear(&mut self) {
        self.primitives.clear();
    }

    pub fn push(&mut self, primitive: Primitive) {
        self.primitives.push(primitive);
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    /// All text in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn text(&mut self, pos: Pos2, text: impl Into<String>, anchor: Align2, size: f32, color: Color32) {
        self.push(Primitive::Text {
            pos,
            text: text.into(),
            anchor,
            size,
            color,
            angle: 0.0,
        });
    }

    fn rotated_text(&mut self, center: Pos2, text: impl Into<String>, angle: f32, color: Color32) {
        self.push(Primitive::Text {
            pos: center,
            text: text.into(),
            anchor: Align2::CENTER_CENTER,
            size: CAPTION_SIZE,
            color,
            angle,
        });
    }

    fn segment(&mut self, from: Pos2, to: Pos2, stroke: Stroke) {
        self.push(Primitive::Segment { from, to, stroke });
    }
}

/// Evenly spaced bands with padding between and around them.
#[derive(Debug, Clone, Copy)]
struct BandScale {
    count: usize,
    start: f32,
    end: f32,
    padding: f32,
}

impl BandScale {
    fn step(&self) -> f32 {
        (self.end - self.start) / (self.count as f32 + self.padding).max(1.0)
    }

    fn bandwidth(&self) -> f32 {
        self.step() * (1.0 - self.padding)
    }

    /// Left edge of band `i`.
    fn position(&self, i: usize) -> f32 {
        let step = self.step();
        let used = step * (self.count as f32 - self.padding);
        let offset = (self.end - self.start - used) / 2.0;
        self.start + offset + step * i as f32
    }

    fn center(&self, i: usize) -> f32 {
        self.position(i) + self.bandwidth() / 2.0
    }
}

/// Linear map from a value domain onto a pixel range.
#[derive(Debug, Clone, Copy)]
struct LinearScale {
    domain: AxisRange,
    bottom: f32,
    top: f32,
}

impl LinearScale {
    fn map(&self, value: f64) -> f32 {
        let t = self.domain.fraction(value) as f32;
        self.bottom + t * (self.top - self.bottom)
    }

    fn ticks(&self) -> Vec<f64> {
        self.domain.ticks(TARGET_TICKS)
    }
}

fn format_tick(value: f64) -> String {
    format!("{:.0}", value)
}

/// Lay out the full chart into `scene`, replacing whatever it held. Returns where
/// the categories landed, for hover lookup.
pub fn build_scene(scene: &mut Scene, config: &ChartConfig) -> CategoryLayout {
    scene.clear();

    let palette = config.palette;
    let fg = palette.foreground;
    let axis_stroke = Stroke::new(1.0, fg);

    let plot = Rect::from_min_max(
        pos2(MARGIN_LEFT, MARGIN_TOP),
        pos2(scene.size.x - MARGIN_RIGHT, scene.size.y - MARGIN_BOTTOM),
    );

    let x = BandScale {
        count: config.len(),
        start: plot.left(),
        end: plot.right(),
        padding: BAND_PADDING,
    };
    let y_quantity = LinearScale {
        domain: config.quantity_axis,
        bottom: plot.bottom(),
        top: plot.top(),
    };
    let y_price = LinearScale {
        domain: config.price_axis,
        bottom: plot.bottom(),
        top: plot.top(),
    };

    // Background
    scene.push(Primitive::Rect {
        rect: Rect::from_min_size(Pos2::ZERO, scene.size),
        fill: palette.background,
    });

    // Title
    scene.text(
        pos2(scene.size.x / 2.0, MARGIN_TOP / 2.0),
        config.title,
        Align2::CENTER_CENTER,
        TITLE_SIZE,
        fg,
    );

    // Quantity gridlines only; the price axis draws none
    let quantity_ticks = y_quantity.ticks();
    for &tick in &quantity_ticks {
        let y = y_quantity.map(tick);
        scene.segment(
            pos2(plot.left(), y),
            pos2(plot.right(), y),
            Stroke::new(1.0, palette.gridline),
        );
    }

    // Bars
    for (i, &quantity) in config.quantities.iter().enumerate() {
        let left = x.position(i);
        scene.push(Primitive::Rect {
            rect: Rect::from_min_max(
                pos2(left, y_quantity.map(quantity)),
                pos2(left + x.bandwidth(), y_quantity.map(0.0)),
            ),
            fill: config.bar_color,
        });
    }

    // Price line and dots
    let line_points: Vec<Pos2> = config
        .prices
        .iter()
        .enumerate()
        .map(|(i, &price)| pos2(x.center(i), y_price.map(price)))
        .collect();
    scene.push(Primitive::Polyline {
        points: line_points.clone(),
        stroke: Stroke::new(2.0, config.line_color),
    });
    for center in line_points {
        scene.push(Primitive::Circle {
            center,
            radius: DOT_RADIUS,
            fill: config.line_color,
            stroke: Stroke::new(1.5, palette.background),
        });
    }

    // Month axis
    scene.segment(plot.left_bottom(), plot.right_bottom(), axis_stroke);
    for (i, label) in config.labels.iter().enumerate() {
        let cx = x.center(i);
        scene.segment(
            pos2(cx, plot.bottom()),
            pos2(cx, plot.bottom() + TICK_LEN),
            axis_stroke,
        );
        scene.text(
            pos2(cx, plot.bottom() + TICK_LEN + 2.0),
            label.clone(),
            Align2::CENTER_TOP,
            TICK_SIZE,
            fg,
        );
    }
    scene.text(
        pos2(plot.center().x, scene.size.y - 14.0),
        config.month_caption,
        Align2::CENTER_CENTER,
        CAPTION_SIZE,
        fg,
    );

    // Quantity axis (left)
    scene.segment(plot.left_top(), plot.left_bottom(), axis_stroke);
    for &tick in &quantity_ticks {
        let y = y_quantity.map(tick);
        scene.segment(pos2(plot.left() - TICK_LEN, y), pos2(plot.left(), y), axis_stroke);
        scene.text(
            pos2(plot.left() - TICK_LEN - 3.0, y),
            format_tick(tick),
            Align2::RIGHT_CENTER,
            TICK_SIZE,
            fg,
        );
    }
    scene.rotated_text(
        pos2(16.0, plot.center().y),
        config.quantity_caption,
        -FRAC_PI_2,
        fg,
    );

    // Price axis (right)
    scene.segment(plot.right_top(), plot.right_bottom(), axis_stroke);
    for tick in y_price.ticks() {
        let y = y_price.map(tick);
        scene.segment(pos2(plot.right(), y), pos2(plot.right() + TICK_LEN, y), axis_stroke);
        scene.text(
            pos2(plot.right() + TICK_LEN + 3.0, y),
            format_tick(tick),
            Align2::LEFT_CENTER,
            TICK_SIZE,
            fg,
        );
    }
    scene.rotated_text(
        pos2(scene.size.x - 16.0, plot.center().y),
        config.price_caption,
        FRAC_PI_2,
        fg,
    );

    // Legend
    let legend_x = plot.right() - 120.0;
    for (row, (name, color)) in [
        (config.quantity_series, config.bar_color),
        (config.price_series, config.line_color),
    ]
    .into_iter()
    .enumerate()
    {
        let top = 8.0 + row as f32 * 22.0;
        scene.push(Primitive::Rect {
            rect: Rect::from_min_size(pos2(legend_x, top), vec2(16.0, 16.0)),
            fill: color,
        });
        scene.text(
            pos2(legend_x + 22.0, top + 8.0),
            name,
            Align2::LEFT_CENTER,
            TICK_SIZE,
            fg,
        );
    }

    CategoryLayout {
        plot,
        centers: (0..config.len()).map(|i| x.center(i)).collect(),
    }
}

/// Paint `scene` with its top-left corner at `origin`.
pub fn paint_scene(painter: &egui::Painter, scene: &Scene, origin: Pos2) {
    let offset = origin.to_vec2();

    for primitive in scene.primitives() {
        match primitive {
            Primitive::Rect { rect, fill } => {
                painter.rect_filled(rect.translate(offset), 0.0, *fill);
            }
            Primitive::Segment { from, to, stroke } => {
                painter.line_segment([*from + offset, *to + offset], *stroke);
            }
            Primitive::Polyline { points, stroke } => {
                let points: Vec<Pos2> = points.iter().map(|p| *p + offset).collect();
                painter.add(Shape::line(points, *stroke));
            }
            Primitive::Circle {
                center,
                radius,
                fill,
                stroke,
            } => {
                painter.circle(*center + offset, *radius, *fill, *stroke);
            }
            Primitive::Text {
                pos,
                text,
                anchor,
                size,
                color,
                angle,
            } => {
                let font = FontId::proportional(*size);
                if *angle == 0.0 {
                    painter.text(*pos + offset, *anchor, text, font, *color);
                } else {
                    let galley = painter.layout_no_wrap(text.clone(), font, *color);
                    let half = galley.size() / 2.0;
                    let top_left = *pos + offset - Rot2::from_angle(*angle) * half;
                    painter.add(Shape::Text(
                        TextShape::new(top_left, galley, *color).with_angle(*angle),
                    ));
                }
            }
        }
    }
}

/// Declarative renderer: scales plus primitive shapes, cleared and rebuilt on every change.
pub struct SceneRenderer {
    scene: Scene,
    layout: Option<CategoryLayout>,
    price_domain: Option<AxisRange>,
}

impl Default for SceneRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneRenderer {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(CHART_SIZE),
            layout: None,
            price_domain: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn layout(&self) -> Option<&CategoryLayout> {
        self.layout.as_ref()
    }
}

impl ChartRenderer for SceneRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Painter
    }

    fn prepare(&mut self, config: &ChartConfig) {
        self.layout = Some(build_scene(&mut self.scene, config));
        self.price_domain = Some(config.price_axis);
        debug!(primitives = self.scene.len(), "scene rebuilt");
    }

    fn paint(&mut self, ui: &mut egui::Ui, config: &ChartConfig) {
        let (response, painter) = ui.allocate_painter(self.scene.size, Sense::hover());
        paint_scene(&painter, &self.scene, response.rect.min);
        if let Some(layout) = &self.layout {
            show_record_tooltip(response, config, layout);
        }
    }

    fn release(&mut self) {
        self.scene.clear();
        self.layout = None;
        self.price_domain = None;
    }

    fn price_axis(&self) -> Option<AxisRange> {
        self.price_domain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{monthly_sales, Locale};
    use crate::theme::Theme;
    use approx::assert_relative_eq;

    fn config(theme: Theme) -> ChartConfig {
        ChartConfig::build(&monthly_sales(), theme, Locale::Ja).unwrap()
    }

    #[test]
    fn test_band_scale_is_symmetric() {
        let band = BandScale {
            count: 12,
            start: 0.0,
            end: 650.0,
            padding: 0.3,
        };
        let left_gap = band.position(0);
        let right_gap = 650.0 - (band.position(11) + band.bandwidth());
        assert_relative_eq!(left_gap, right_gap, epsilon = 1e-3);
        assert!(band.center(0) < band.center(1));
    }

    #[test]
    fn test_linear_scale_maps_domain_ends() {
        let scale = LinearScale {
            domain: AxisRange { min: 432.0, max: 638.0 },
            bottom: 340.0,
            top: 60.0,
        };
        assert_relative_eq!(scale.map(432.0), 340.0);
        assert_relative_eq!(scale.map(638.0), 60.0);
        assert!(scale.ticks().iter().all(|t| (432.0..=638.0).contains(t)));
    }

    #[test]
    fn test_rebuild_does_not_accumulate() {
        let mut renderer = SceneRenderer::new();
        renderer.prepare(&config(Theme::Light));
        let first = renderer.scene().len();
        renderer.prepare(&config(Theme::Light));
        assert_eq!(renderer.scene().len(), first);
        renderer.prepare(&config(Theme::Dark));
        assert_eq!(renderer.scene().len(), first);
    }

    #[test]
    fn test_scene_has_captions_and_labels_in_order() {
        let mut renderer = SceneRenderer::new();
        renderer.prepare(&config(Theme::Light));
        let texts: Vec<&str> = renderer.scene().texts().collect();
        for caption in ["Monthly Quantity and Price", "Month", "Quantity", "Price"] {
            assert!(texts.contains(&caption), "missing {caption}");
        }
        let months: Vec<&str> = texts.iter().copied().filter(|t| t.ends_with('月')).collect();
        assert_eq!(months.len(), 12);
        assert_eq!(months[0], "1月");
        assert_eq!(months[11], "12月");
    }

    #[test]
    fn test_one_bar_and_dot_per_record() {
        let mut renderer = SceneRenderer::new();
        let config = config(Theme::Dark);
        renderer.prepare(&config);
        let bars = renderer
            .scene()
            .primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::Rect { fill, .. } if *fill == config.bar_color))
            .count();
        let dots = renderer
            .scene()
            .primitives()
            .iter()
            .filter(|p| matches!(p, Primitive::Circle { .. }))
            .count();
        // The legend swatch shares the bar color
        assert_eq!(bars, 12 + 1);
        assert_eq!(dots, 12);
    }

    #[test]
    fn test_gridlines_use_quantity_ticks_only() {
        let mut renderer = SceneRenderer::new();
        let config = config(Theme::Light);
        renderer.prepare(&config);
        let gridlines = renderer
            .scene()
            .primitives()
            .iter()
            .filter(|p| {
                matches!(p, Primitive::Segment { stroke, .. } if stroke.color == config.palette.gridline)
            })
            .count();
        // 0, 50, 100, 150, 200 on a 0..220 axis
        assert_eq!(gridlines, 5);
    }

    #[test]
    fn test_layout_centers_sit_on_bars() {
        let mut renderer = SceneRenderer::new();
        let config = config(Theme::Light);
        renderer.prepare(&config);
        let layout = renderer.layout().cloned().unwrap();
        assert_eq!(layout.centers.len(), 12);

        let bars: Vec<Rect> = renderer
            .scene()
            .primitives()
            .iter()
            .filter_map(|p| match p {
                Primitive::Rect { rect, fill } if *fill == config.bar_color => Some(*rect),
                _ => None,
            })
            .take(12)
            .collect();
        for (i, bar) in bars.iter().enumerate() {
            assert_eq!(layout.index_at(bar.center()), Some(i));
        }
        assert_eq!(layout.index_at(pos2(5.0, 5.0)), None);
    }

    #[test]
    fn test_release_clears_scene() {
        let mut renderer = SceneRenderer::new();
        renderer.prepare(&config(Theme::Light));
        assert!(renderer.price_axis().is_some());
        renderer.release();
        assert!(renderer.scene().is_empty());
        assert!(renderer.layout().is_none());
        assert!(renderer.price_axis().is_none());
    }

    #[test]
    fn test_paints_headless() {
        let mut renderer = SceneRenderer::new();
        let config = config(Theme::Light);
        renderer.prepare(&config);
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            egui::CentralPanel::default().show(ctx, |ui| {
                renderer.paint(ui, &config);
            });
        });
    }
}
