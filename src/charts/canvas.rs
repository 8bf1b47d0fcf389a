//! Canvas Renderer
//! A retained chart object whose options are set up once per state change and
//! rasterized with plotters into a bitmap, which is shown as an egui texture.
//!
//! Plotters draws text through ab_glyph, which only knows registered faces. egui's
//! bundled Latin face is registered on first use unless the app already handed
//! over a face covering the month labels.

use super::{
    show_record_tooltip, CategoryLayout, ChartConfig, ChartRenderer, RenderError, RendererKind,
    CHART_SIZE,
};
use crate::data::AxisRange;
use crate::theme::Palette;
use ab_glyph::FontRef;
use egui::{pos2, Color32, ColorImage, Rect, RichText, Sense, TextureHandle, TextureOptions};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle};
use std::borrow::Cow;
use std::error::Error;
use std::sync::Once;
use tracing::{debug, error, warn};

type PlotError = Box<dyn Error + Send + Sync>;

const TEXTURE_NAME: &str = "canvas-chart";
const SANS: &str = "sans-serif";
const BUNDLED_FONT: &str = "Ubuntu-Light";

static PLOT_FONT: Once = Once::new();

fn bundled_sans() -> Option<&'static [u8]> {
    let fonts = egui::FontDefinitions::default();
    let data = fonts.font_data.get(BUNDLED_FONT)?;
    match &data.font {
        Cow::Borrowed(bytes) => Some(*bytes),
        Cow::Owned(bytes) => Some(Box::leak(bytes.clone().into_boxed_slice())),
    }
}

fn ensure_plot_font() {
    PLOT_FONT.call_once(|| match bundled_sans() {
        Some(bytes) => {
            if register_font(SANS, FontStyle::Normal, bytes).is_err() {
                warn!("Bundled font rejected by plotters");
            }
        }
        None => warn!("No bundled font available for plotters"),
    });
}

/// Make `bytes` the face plotters draws every chart string with.
pub fn use_plot_font(bytes: &'static [u8]) -> Result<(), RenderError> {
    FontRef::try_from_slice(bytes).map_err(|e| RenderError::Font(e.to_string()))?;
    // Claim the slot so the bundled face never replaces this one
    PLOT_FONT.call_once(|| {});
    register_font(SANS, FontStyle::Normal, bytes)
        .map_err(|_| RenderError::Font("font rejected by plotters".to_string()))
}

/// Which side of the plot a value axis sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    Left,
    Right,
}

/// Options for one linear value axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleOptions {
    pub title: &'static str,
    pub range: AxisRange,
    pub side: AxisSide,
    pub draw_grid: bool,
}

/// Everything the canvas chart draws, mirrored from the shared configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasOptions {
    pub title: &'static str,
    pub x_title: &'static str,
    pub labels: Vec<String>,
    pub quantities: Vec<f64>,
    pub prices: Vec<f64>,
    pub quantity_series: &'static str,
    pub price_series: &'static str,
    pub quantity_scale: ScaleOptions,
    pub price_scale: ScaleOptions,
    pub palette: Palette,
    pub bar_color: Color32,
    pub line_color: Color32,
}

impl CanvasOptions {
    pub fn from_config(config: &ChartConfig) -> Self {
        Self {
            title: config.title,
            x_title: config.month_caption,
            labels: config.labels.clone(),
            quantities: config.quantities.clone(),
            prices: config.prices.clone(),
            quantity_series: config.quantity_series,
            price_series: config.price_series,
            quantity_scale: ScaleOptions {
                title: config.quantity_caption,
                range: config.quantity_axis,
                side: AxisSide::Left,
                draw_grid: true,
            },
            price_scale: ScaleOptions {
                title: config.price_caption,
                range: config.price_axis,
                side: AxisSide::Right,
                draw_grid: false,
            },
            palette: config.palette,
            bar_color: config.bar_color,
            line_color: config.line_color,
        }
    }
}

fn rgb(color: Color32) -> RGBColor {
    RGBColor(color.r(), color.g(), color.b())
}

/// Rasterize the chart into an RGB buffer of `width * height * 3` bytes, along
/// with the pixel positions of its categories.
pub fn rasterize(
    options: &CanvasOptions,
    width: u32,
    height: u32,
) -> Result<(Vec<u8>, CategoryLayout), RenderError> {
    if width == 0 || height == 0 {
        return Err(RenderError::EmptySurface(width, height));
    }
    ensure_plot_font();

    let mut buffer = vec![0u8; (width * height * 3) as usize];
    let layout = {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        let layout = draw_chart(&root, options).map_err(|e| RenderError::Plot(e.to_string()))?;
        root.present()
            .map_err(|e| RenderError::Plot(format!("Failed to present chart: {e}")))?;
        layout
    };

    Ok((buffer, layout))
}

fn draw_chart(
    root: &DrawingArea<BitMapBackend, Shift>,
    options: &CanvasOptions,
) -> Result<CategoryLayout, PlotError> {
    let bg = rgb(options.palette.background);
    let fg = rgb(options.palette.foreground);
    let grid = rgb(options.palette.gridline);
    let bar = rgb(options.bar_color);
    let line = rgb(options.line_color);

    root.fill(&bg)?;

    let n = options.labels.len() as i32;
    let quantity = options.quantity_scale.range;
    let price = options.price_scale.range;

    let mut chart = ChartBuilder::on(root)
        .caption(options.title, ("sans-serif", 22).into_font().color(&fg))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .right_y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), quantity.min..quantity.max)?
        .set_secondary_coord((0..n).into_segmented(), price.min..price.max);

    let labels = &options.labels;
    let x_label_formatter = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    };

    let mut mesh = chart.configure_mesh();
    mesh.disable_x_mesh()
        .bold_line_style(grid)
        .light_line_style(TRANSPARENT)
        .axis_style(fg)
        .x_labels(labels.len())
        .x_label_formatter(&x_label_formatter)
        .x_desc(options.x_title)
        .y_desc(options.quantity_scale.title)
        .label_style(("sans-serif", 14).into_font().color(&fg))
        .axis_desc_style(("sans-serif", 15).into_font().color(&fg));
    if !options.quantity_scale.draw_grid {
        mesh.disable_y_mesh();
    }
    mesh.draw()?;

    // Secondary axes never draw a mesh, so the price scale adds no gridlines
    chart
        .configure_secondary_axes()
        .x_label_formatter(&x_label_formatter)
        .axis_style(fg)
        .y_desc(options.price_scale.title)
        .label_style(("sans-serif", 14).into_font().color(&fg))
        .axis_desc_style(("sans-serif", 15).into_font().color(&fg))
        .draw()?;

    let bars = Histogram::vertical(&*chart)
        .style(bar.filled())
        .margin(10)
        .data(
            options
                .quantities
                .iter()
                .enumerate()
                .map(|(i, q)| (i as i32, *q)),
        );
    chart
        .draw_series(bars)?
        .label(options.quantity_series)
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 12, y + 5)], bar.filled()));

    chart
        .draw_secondary_series(LineSeries::new(
            options
                .prices
                .iter()
                .enumerate()
                .map(|(i, p)| (SegmentValue::CenterOf(i as i32), *p)),
            line.stroke_width(2),
        ))?
        .label(options.price_series)
        .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], line.stroke_width(2)));

    chart.draw_secondary_series(
        options
            .prices
            .iter()
            .enumerate()
            .map(|(i, p)| Circle::new((SegmentValue::CenterOf(i as i32), *p), 4, line.filled())),
    )?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(bg.mix(0.8))
        .border_style(fg)
        .label_font(("sans-serif", 13).into_font().color(&fg))
        .draw()?;

    let (x_px, y_px) = chart.plotting_area().get_pixel_range();
    let centers = (0..n)
        .map(|i| chart.backend_coord(&(SegmentValue::CenterOf(i), quantity.min)).0 as f32)
        .collect();

    Ok(CategoryLayout {
        plot: Rect::from_min_max(
            pos2(x_px.start as f32, y_px.start as f32),
            pos2(x_px.end as f32, y_px.end as f32),
        ),
        centers,
    })
}

/// The retained chart object: options plus the texture holding its last rasterization.
struct CanvasChart {
    options: CanvasOptions,
    texture: Option<TextureHandle>,
    layout: Option<CategoryLayout>,
}

impl CanvasChart {
    fn new(config: &ChartConfig) -> Self {
        Self {
            options: CanvasOptions::from_config(config),
            texture: None,
            layout: None,
        }
    }

    /// Replace the texture, freeing the previous one first.
    fn upload(&mut self, ctx: &egui::Context, image: ColorImage) -> &TextureHandle {
        self.texture = None;
        self.texture
            .insert(ctx.load_texture(TEXTURE_NAME, image, TextureOptions::LINEAR))
    }
}

/// Imperative renderer backed by plotters.
#[derive(Default)]
pub struct CanvasRenderer {
    chart: Option<CanvasChart>,
    error: Option<RenderError>,
}

impl CanvasRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn options(&self) -> Option<&CanvasOptions> {
        self.chart.as_ref().map(|c| &c.options)
    }

    pub fn has_texture(&self) -> bool {
        self.chart.as_ref().is_some_and(|c| c.texture.is_some())
    }
}

impl ChartRenderer for CanvasRenderer {
    fn kind(&self) -> RendererKind {
        RendererKind::Plotters
    }

    fn prepare(&mut self, config: &ChartConfig) {
        // Destroy the old chart (and its texture) before creating a new one
        self.release();
        self.chart = Some(CanvasChart::new(config));
    }

    fn paint(&mut self, ui: &mut egui::Ui, config: &ChartConfig) {
        let Some(chart) = self.chart.as_mut() else {
            return;
        };

        if chart.texture.is_none() && self.error.is_none() {
            let (width, height) = (CHART_SIZE.x as u32, CHART_SIZE.y as u32);
            match rasterize(&chart.options, width, height) {
                Ok((buffer, layout)) => {
                    let image = ColorImage::from_rgb([width as usize, height as usize], &buffer);
                    chart.upload(ui.ctx(), image);
                    chart.layout = Some(layout);
                    debug!(width, height, "canvas chart rasterized");
                }
                Err(e) => {
                    error!("Canvas chart failed: {}", e);
                    self.error = Some(e);
                }
            }
        }

        if let Some(e) = &self.error {
            ui.allocate_ui(CHART_SIZE, |ui| {
                ui.label(
                    RichText::new(format!("Error: {}", e)).color(Color32::from_rgb(220, 53, 69)),
                );
            });
        } else if let Some(texture) = &chart.texture {
            let response = ui.add(
                egui::Image::new(texture)
                    .fit_to_exact_size(CHART_SIZE)
                    .sense(Sense::hover()),
            );
            if let Some(layout) = &chart.layout {
                show_record_tooltip(response, config, layout);
            }
        }
    }

    fn release(&mut self) {
        if self.chart.take().is_some() {
            debug!("canvas chart destroyed");
        }
        self.error = None;
    }

    fn price_axis(&self) -> Option<AxisRange> {
        self.options().map(|o| o.price_scale.range)
    }
}
