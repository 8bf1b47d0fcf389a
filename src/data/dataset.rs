//! Monthly Sales Dataset
//! Twelve monthly records shared by every chart renderer.

use chrono::NaiveDate;

/// One month of sales: units sold and the unit price.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub quantity: u32,
    pub price: f64,
}

/// (month, quantity, price) for 2024.
const ROWS: [(u32, u32, f64); 12] = [
    (1, 120, 500.0),
    (2, 150, 520.0),
    (3, 100, 480.0),
    (4, 180, 550.0),
    (5, 130, 510.0),
    (6, 160, 530.0),
    (7, 110, 490.0),
    (8, 170, 540.0),
    (9, 140, 515.0),
    (10, 190, 560.0),
    (11, 125, 505.0),
    (12, 200, 580.0),
];

const YEAR: i32 = 2024;

/// The fixed monthly dataset, ordered by date.
pub fn monthly_sales() -> Vec<Record> {
    let records: Vec<Record> = ROWS
        .iter()
        .filter_map(|&(month, quantity, price)| {
            NaiveDate::from_ymd_opt(YEAR, month, 1).map(|date| Record {
                date,
                quantity,
                price,
            })
        })
        .collect();
    debug_assert_eq!(records.len(), ROWS.len(), "every row has a valid date");
    records
}
