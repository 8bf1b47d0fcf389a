//! Theme resolver
//! Maps the light/dark flag to the palette used by the page and every chart.

use egui::{Color32, Visuals};

/// Page and chart theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// Colors shared by the page chrome and the chart renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: Color32,
    pub foreground: Color32,
    pub gridline: Color32,
}

const LIGHT: Palette = Palette {
    background: Color32::from_rgb(0xff, 0xff, 0xff),
    foreground: Color32::from_rgb(0x22, 0x22, 0x22),
    gridline: Color32::from_rgb(0xdd, 0xdd, 0xdd),
};

const DARK: Palette = Palette {
    background: Color32::from_rgb(0x22, 0x22, 0x22),
    foreground: Color32::from_rgb(0xee, 0xee, 0xee),
    gridline: Color32::from_rgb(0x44, 0x44, 0x44),
};

impl Theme {
    pub fn palette(self) -> Palette {
        match self {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Theme::Dark
    }

    /// egui visuals for the page chrome, derived from the same palette as the charts.
    pub fn visuals(self) -> Visuals {
        let palette = self.palette();
        let mut visuals = if self.is_dark() {
            Visuals::dark()
        } else {
            Visuals::light()
        };
        visuals.panel_fill = palette.background;
        visuals.window_fill = palette.background;
        visuals.extreme_bg_color = palette.background;
        visuals.override_text_color = Some(palette.foreground);
        visuals
    }
}
