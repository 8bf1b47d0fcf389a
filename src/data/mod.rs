//! Data module - fixed dataset and the values derived from it

mod dataset;
mod derive;

pub use dataset::{monthly_sales, Record};
pub use derive::{
    month_label, nice_step, price_axis_range, quantity_axis_range, AxisRange, DataError, Locale,
};
