//! Graph Switcher Main Application
//! Main window with the toolbar on top and the active chart below.

use crate::charts::{use_plot_font, ChartConfig, RendererKind};
use crate::config::AppConfig;
use crate::data::{monthly_sales, DataError, Locale, Record};
use crate::gui::fonts::{candidate_font_paths, effective_locale, install_cjk_font};
use crate::gui::{ChartViewer, Toolbar, ToolbarAction, ViewState};
use egui::TopBottomPanel;
use tracing::{info, warn};

/// Main application window.
pub struct GraphSwitcherApp {
    state: ViewState,
    locale: Locale,
    records: Vec<Record>,
    chart_config: Result<ChartConfig, DataError>,
    toolbar: Toolbar,
    chart_viewer: ChartViewer,
    /// Toolbar click waiting for the start of the next frame
    pending: ToolbarAction,
    /// Visuals must be re-applied before the next panel is drawn
    visuals_dirty: bool,
}

impl GraphSwitcherApp {
    /// Set up fonts from the creation context, then build the app.
    pub fn new(cc: &eframe::CreationContext<'_>, config: &AppConfig) -> Self {
        let candidates = candidate_font_paths(&config.cjk_font_paths);
        let font = if config.locale == Locale::Ja {
            install_cjk_font(&cc.egui_ctx, &candidates)
        } else {
            None
        };
        if let Some(font) = &font {
            if let Err(e) = use_plot_font(font.bytes) {
                warn!("Plotters keeps its bundled font: {}", e);
            }
        }
        let locale = effective_locale(config.locale, font.as_ref().map(|f| f.path.as_path()));

        let app = Self::with_records(monthly_sales(), locale);
        cc.egui_ctx.set_visuals(app.state.theme.visuals());
        app
    }

    /// App over `records`, in the initial state with the first renderer prepared.
    pub fn with_records(records: Vec<Record>, locale: Locale) -> Self {
        let state = ViewState::new();
        let mut app = Self {
            state,
            locale,
            chart_config: ChartConfig::build(&records, state.theme, locale),
            records,
            toolbar: Toolbar::new(),
            chart_viewer: ChartViewer::new(),
            pending: ToolbarAction::None,
            visuals_dirty: true,
        };
        app.rebuild();
        info!(
            renderer = app.state.renderer.name(),
            theme = ?app.state.theme,
            "graph switcher ready"
        );
        app
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn chart_config(&self) -> Result<&ChartConfig, &DataError> {
        self.chart_config.as_ref()
    }

    pub fn chart_viewer(&self) -> &ChartViewer {
        &self.chart_viewer
    }

    /// Apply a toolbar action and synchronously re-render the active chart.
    pub fn apply(&mut self, action: ToolbarAction) {
        let previous = self.state;
        match action {
            ToolbarAction::None => return,
            ToolbarAction::ToggleTheme => self.state.toggle_theme(),
            ToolbarAction::SelectRenderer(kind) => self.state.select_renderer(kind),
        }

        info!(
            renderer = self.state.renderer.name(),
            theme = ?self.state.theme,
            "view changed"
        );

        if previous.renderer != self.state.renderer {
            self.chart_viewer.release(previous.renderer);
        }
        self.rebuild();
    }

    pub fn select_renderer(&mut self, kind: RendererKind) {
        self.apply(ToolbarAction::SelectRenderer(kind));
    }

    pub fn toggle_theme(&mut self) {
        self.apply(ToolbarAction::ToggleTheme);
    }

    fn rebuild(&mut self) {
        self.chart_config = ChartConfig::build(&self.records, self.state.theme, self.locale);
        match &self.chart_config {
            Ok(config) => self.chart_viewer.prepare(self.state.renderer, config),
            Err(e) => {
                warn!("Chart not rendered: {}", e);
                self.chart_viewer.release_all();
            }
        }
        self.visuals_dirty = true;
    }
}

impl GraphSwitcherApp {
    /// Draw one frame.
    ///
    /// A toolbar click is applied at the start of the following frame, before any
    /// panel is drawn, so every surface changes theme in the same frame.
    pub fn show(&mut self, ctx: &egui::Context) {
        let action = std::mem::replace(&mut self.pending, ToolbarAction::None);
        self.apply(action);
        if std::mem::take(&mut self.visuals_dirty) {
            ctx.set_visuals(self.state.theme.visuals());
        }

        // Top panel - Toolbar
        TopBottomPanel::top("toolbar").show(ctx, |ui| {
            self.pending = self.toolbar.show(ui, &self.state);
        });
        if self.pending != ToolbarAction::None {
            ctx.request_repaint();
        }

        // Central panel - Chart Viewer
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::both().show(ui, |ui| {
                self.chart_viewer
                    .show(ui, self.state.renderer, self.chart_config.as_ref());
            });
        });
    }
}

impl eframe::App for GraphSwitcherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.show(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::Theme;
    use egui::epaint::Shape;
    use egui::{pos2, Color32, Event, PointerButton, Pos2, RawInput, Rect};

    const SCREEN: Rect = Rect::from_min_max(pos2(0.0, 0.0), pos2(1000.0, 800.0));

    fn input(events: Vec<Event>) -> RawInput {
        RawInput {
            screen_rect: Some(SCREEN),
            events,
            ..Default::default()
        }
    }

    fn press(pos: Pos2, pressed: bool) -> Event {
        Event::PointerButton {
            pos,
            button: PointerButton::Primary,
            pressed,
            modifiers: Default::default(),
        }
    }

    fn collect_shapes<'a>(shape: &'a Shape, out: &mut Vec<&'a Shape>) {
        match shape {
            Shape::Vec(shapes) => shapes.iter().for_each(|s| collect_shapes(s, out)),
            other => out.push(other),
        }
    }

    /// Run one frame; returns the fills of full-width panels and the rect of `text`.
    fn frame(
        ctx: &egui::Context,
        app: &mut GraphSwitcherApp,
        events: Vec<Event>,
        text: &str,
    ) -> (Vec<Color32>, Option<Rect>) {
        let output = ctx.run(input(events), |ctx| app.show(ctx));
        let mut shapes = Vec::new();
        for clipped in &output.shapes {
            collect_shapes(&clipped.shape, &mut shapes);
        }

        let mut fills = Vec::new();
        let mut found = None;
        for shape in shapes {
            match shape {
                Shape::Rect(rect) if rect.rect.width() >= SCREEN.width() - 1.0 => {
                    fills.push(rect.fill);
                }
                Shape::Text(t) if t.galley.text() == text => {
                    found = Some(Rect::from_min_size(t.pos, t.galley.size()));
                }
                _ => {}
            }
        }
        (fills, found)
    }

    #[test]
    fn test_starts_with_first_renderer_prepared() {
        let app = GraphSwitcherApp::with_records(monthly_sales(), Locale::Ja);
        assert_eq!(app.state(), ViewState::new());
        let viewer = app.chart_viewer();
        assert!(viewer.renderer(RendererKind::Painter).price_axis().is_some());
        assert!(viewer.renderer(RendererKind::Plotters).price_axis().is_none());
        assert!(viewer.renderer(RendererKind::EguiPlot).price_axis().is_none());
    }

    #[test]
    fn test_switch_releases_previous_renderer() {
        let mut app = GraphSwitcherApp::with_records(monthly_sales(), Locale::Ja);
        app.select_renderer(RendererKind::Plotters);
        let viewer = app.chart_viewer();
        assert!(viewer.renderer(RendererKind::Painter).price_axis().is_none());
        assert!(viewer.renderer(RendererKind::Plotters).price_axis().is_some());
    }

    #[test]
    fn test_toggle_theme_rebuilds_config() {
        let mut app = GraphSwitcherApp::with_records(monthly_sales(), Locale::Ja);
        app.toggle_theme();
        assert_eq!(app.state().theme, Theme::Dark);
        assert_eq!(
            app.chart_config().map(|c| c.palette).ok(),
            Some(Theme::Dark.palette())
        );
    }

    #[test]
    fn test_none_action_is_ignored() {
        let mut app = GraphSwitcherApp::with_records(monthly_sales(), Locale::Ja);
        app.visuals_dirty = false;
        app.apply(ToolbarAction::None);
        assert!(!app.visuals_dirty);
    }

    #[test]
    fn test_empty_dataset_reported() {
        let app = GraphSwitcherApp::with_records(Vec::new(), Locale::En);
        assert_eq!(app.chart_config().err(), Some(&DataError::EmptyDataset));
        assert!(app
            .chart_viewer()
            .renderer(RendererKind::Painter)
            .price_axis()
            .is_none());
    }

    #[test]
    fn test_theme_click_switches_every_panel_together() {
        let ctx = egui::Context::default();
        let mut app = GraphSwitcherApp::with_records(monthly_sales(), Locale::En);
        let light = Theme::Light.palette().background;
        let dark = Theme::Dark.palette().background;

        let (fills, button) = frame(&ctx, &mut app, Vec::new(), "Switch to dark mode");
        assert!(fills.len() >= 2);
        assert!(fills.iter().all(|c| *c == light));
        let target = button.unwrap().center();

        let _ = frame(&ctx, &mut app, vec![Event::PointerMoved(target), press(target, true)], "");
        let (click_fills, _) = frame(&ctx, &mut app, vec![press(target, false)], "");
        assert!(click_fills.len() >= 2);
        assert!(click_fills.iter().all(|c| *c == click_fills[0]));

        let (next_fills, label) = frame(&ctx, &mut app, Vec::new(), "Switch to light mode");
        assert_eq!(app.state().theme, Theme::Dark);
        assert!(label.is_some());
        assert!(next_fills.len() >= 2);
        assert!(next_fills.iter().all(|c| *c == dark));
    }
}
