//! Derived Values Module
//! Month labels and axis ranges computed from the dataset.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lower padding factor applied to the smallest price.
pub const PRICE_PAD_LOW: f64 = 0.9;
/// Upper padding factor applied to the largest price (and largest quantity).
pub const PAD_HIGH: f64 = 1.1;

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataError {
    #[error("Dataset is empty, cannot derive an axis range")]
    EmptyDataset,
}

/// Locale used for category labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// Japanese short month form, e.g. "1月"
    #[default]
    Ja,
    /// English short month form, e.g. "Jan"
    En,
}

/// Display range of a value axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisRange {
    pub min: f64,
    pub max: f64,
}

impl AxisRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Position of `value` inside the range, 0.0 at `min` and 1.0 at `max`.
    pub fn fraction(&self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }

    /// Inverse of [`AxisRange::fraction`].
    pub fn at_fraction(&self, t: f64) -> f64 {
        self.min + t * self.span()
    }

    /// Round tick values inside the range, about `target` steps apart.
    pub fn ticks(&self, target: usize) -> Vec<f64> {
        let step = nice_step(self.span(), target);
        if !(step.is_finite() && step > 0.0) {
            return vec![self.min, self.max];
        }

        let mut ticks = Vec::new();
        let mut value = (self.min / step).ceil() * step;
        while value <= self.max + step * 1e-9 {
            ticks.push(value);
            value += step;
        }
        ticks
    }
}

/// Round a raw step up to 1, 2, 5 or 10 times a power of ten.
pub fn nice_step(range: f64, target_steps: usize) -> f64 {
    let raw_step = range / target_steps.max(1) as f64;
    let magnitude = 10f64.powf(raw_step.log10().floor());
    let normalized = raw_step / magnitude;

    let nice = if normalized <= 1.0 {
        1.0
    } else if normalized <= 2.0 {
        2.0
    } else if normalized <= 5.0 {
        5.0
    } else {
        10.0
    };

    nice * magnitude
}

/// Short month label for a record date.
pub fn month_label(date: NaiveDate, locale: Locale) -> String {
    let month = date.month();
    match locale {
        Locale::Ja => format!("{}月", month),
        Locale::En => EN_MONTHS[date.month0() as usize].to_string(),
    }
}

/// Price axis range: smallest price * 0.9 to largest price * 1.1.
pub fn price_axis_range(prices: &[f64]) -> Result<AxisRange, DataError> {
    if prices.is_empty() {
        return Err(DataError::EmptyDataset);
    }

    let min = prices.iter().copied().fold(f64::INFINITY, f64::min);
    let max = prices.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Ok(AxisRange {
        min: min * PRICE_PAD_LOW,
        max: max * PAD_HIGH,
    })
}

/// Quantity axis range: zero to largest quantity * 1.1.
pub fn quantity_axis_range(quantities: &[u32]) -> Result<AxisRange, DataError> {
    let max = quantities.iter().copied().max().ok_or(DataError::EmptyDataset)?;

    // An all-zero column still needs a non-empty span
    let top = (max as f64 * PAD_HIGH).max(1.0);
    Ok(AxisRange { min: 0.0, max: top })
}
