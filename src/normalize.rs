//! Type Normalizer: coerces classified columns to their semantic types.
//!
//! Date-named columns become calendar dates and price-like text becomes
//! numbers. Coercion failures are per cell: an unparseable value turns into
//! a missing cell and the rest of the column is kept.

use chrono::{Datelike, NaiveDate};
use log::{debug, info, warn};

use crate::{
    data::{format_number, parse_naive_date, parse_price},
    frame::{ColumnData, Frame},
};

pub const DATE_COLUMN: &str = "date";
pub const YEAR_COLUMN: &str = "year";
pub const MONTH_COLUMN: &str = "month";
pub const MONTH_NAME_COLUMN: &str = "month_name";
pub const QUARTER_COLUMN: &str = "quarter";

const PRICE_KEYWORDS: &[&str] = &["price", "sale"];

pub fn normalize_types(frame: &Frame) -> Frame {
    let mut normalized = frame.clone();

    for idx in 0..normalized.width() {
        let Some(column) = normalized.column_at_mut(idx) else {
            continue;
        };
        if !column.lowered_name().contains("date") {
            continue;
        }
        if let Some(parsed) = parse_date_column(&column.data) {
            let failed = parsed.missing_count() - column.data.missing_count();
            info!(
                "Parsed '{}' as date ({failed} unparseable cell(s))",
                column.name
            );
            column.data = parsed;
        }
    }

    derive_calendar_fields(&mut normalized);

    for idx in 0..normalized.width() {
        let Some(column) = normalized.column_at_mut(idx) else {
            continue;
        };
        let lowered = column.lowered_name();
        if !PRICE_KEYWORDS.iter().any(|keyword| lowered.contains(keyword)) {
            continue;
        }
        let Some(values) = column.data.as_text() else {
            continue;
        };
        let coerced = values
            .iter()
            .map(|cell| cell.as_deref().and_then(parse_price))
            .collect::<Vec<_>>();
        info!("Converted '{}' to numeric (price column)", column.name);
        column.data = ColumnData::Number(coerced);
    }

    normalized
}

/// Returns `None` when the column already holds dates.
fn parse_date_column(data: &ColumnData) -> Option<ColumnData> {
    let parsed = match data {
        ColumnData::Date(_) => return None,
        ColumnData::Text(values) => values
            .iter()
            .map(|cell| cell.as_deref().and_then(|raw| parse_naive_date(raw).ok()))
            .collect(),
        ColumnData::Number(values) => values
            .iter()
            .map(|cell| {
                cell.filter(|n| n.fract() == 0.0)
                    .and_then(|n| parse_naive_date(&format_number(n)).ok())
            })
            .collect(),
    };
    Some(ColumnData::Date(parsed))
}

fn derive_calendar_fields(frame: &mut Frame) {
    let Some(dates) = frame
        .column(DATE_COLUMN)
        .and_then(|column| column.data.as_dates())
        .map(<[Option<NaiveDate>]>::to_vec)
    else {
        return;
    };

    let number_of = |f: fn(&NaiveDate) -> f64| {
        ColumnData::Number(dates.iter().map(|d| d.as_ref().map(f)).collect())
    };
    let derived = [
        (YEAR_COLUMN, number_of(|d| f64::from(d.year()))),
        (MONTH_COLUMN, number_of(|d| f64::from(d.month()))),
        (
            MONTH_NAME_COLUMN,
            ColumnData::Text(
                dates
                    .iter()
                    .map(|d| d.map(|d| d.format("%B").to_string()))
                    .collect(),
            ),
        ),
        (QUARTER_COLUMN, number_of(|d| f64::from(d.month0() / 3 + 1))),
    ];
    for (name, data) in derived {
        if let Err(err) = frame.set_column(name, data) {
            warn!("Skipping derived column '{name}': {err}");
        }
    }
    debug!("Derived year, month, month_name, and quarter from '{DATE_COLUMN}'");
}
