//! Shared Chart Configuration
//! Every literal a renderer needs lives here so the three charts cannot drift apart.

use crate::data::{
    month_label, price_axis_range, quantity_axis_range, AxisRange, DataError, Locale, Record,
};
use crate::theme::{Palette, Theme};
use egui::Color32;

pub const TITLE: &str = "Monthly Quantity and Price";
pub const MONTH_CAPTION: &str = "Month";
pub const QUANTITY_CAPTION: &str = "Quantity";
pub const PRICE_CAPTION: &str = "Price";

/// Bar fill for the quantity series
pub const BAR_COLOR: Color32 = Color32::from_rgb(54, 162, 235);
/// Stroke for the price series
pub const LINE_COLOR: Color32 = Color32::from_rgb(255, 159, 64);

/// Everything needed to draw the composite chart, derived once per state change.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartConfig {
    pub title: &'static str,
    pub month_caption: &'static str,
    pub quantity_caption: &'static str,
    pub price_caption: &'static str,
    pub quantity_series: &'static str,
    pub price_series: &'static str,
    /// One category label per record, in dataset order
    pub labels: Vec<String>,
    pub quantities: Vec<f64>,
    pub prices: Vec<f64>,
    pub quantity_axis: AxisRange,
    pub price_axis: AxisRange,
    pub theme: Theme,
    pub palette: Palette,
    pub bar_color: Color32,
    pub line_color: Color32,
}

impl ChartConfig {
    /// Derive the chart configuration. Fails only on an empty dataset.
    pub fn build(records: &[Record], theme: Theme, locale: Locale) -> Result<Self, DataError> {
        let prices: Vec<f64> = records.iter().map(|r| r.price).collect();
        let raw_quantities: Vec<u32> = records.iter().map(|r| r.quantity).collect();

        let price_axis = price_axis_range(&prices)?;
        let quantity_axis = quantity_axis_range(&raw_quantities)?;

        Ok(Self {
            title: TITLE,
            month_caption: MONTH_CAPTION,
            quantity_caption: QUANTITY_CAPTION,
            price_caption: PRICE_CAPTION,
            quantity_series: QUANTITY_CAPTION,
            price_series: PRICE_CAPTION,
            labels: records
                .iter()
                .map(|r| month_label(r.date, locale))
                .collect(),
            quantities: raw_quantities.iter().map(|&q| q as f64).collect(),
            prices,
            quantity_axis,
            price_axis,
            theme,
            palette: theme.palette(),
            bar_color: BAR_COLOR,
            line_color: LINE_COLOR,
        })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Tooltip text for record `index`: month, then both series values.
    pub fn record_summary(&self, index: usize) -> Option<String> {
        let label = self.labels.get(index)?;
        let quantity = self.quantities.get(index)?;
        let price = self.prices.get(index)?;
        Some(format!(
            "{}\n{}: {:.0}\n{}: {:.0}",
            label, self.quantity_series, quantity, self.price_series, price
        ))
    }
}
