//! Cleaner: null-token normalization, missing-value policy, and row dedup.
//!
//! Missing values are handled per value class:
//!
//! - monetary numeric columns (name contains `price`, `sale`, `value`, or
//!   `amount`) keep their gaps so later sums are not inflated by guesses;
//! - other numeric columns are filled by [`numeric_fill`], which always
//!   lands on a value: median, else mean when the median is absent or zero,
//!   else `0`;
//! - text columns are filled with their most frequent value, or `"Unknown"`
//!   when nothing is present at all.
//!
//! Date columns are left as they are.

use std::sync::LazyLock;

use log::{debug, info};
use regex::Regex;
use serde::Serialize;

use crate::{
    data::{Value, format_number},
    frame::{ColumnData, Frame},
    frequency, stats,
};

pub const MONETARY_KEYWORDS: &[&str] = &["price", "sale", "value", "amount"];
pub const UNKNOWN_SENTINEL: &str = "Unknown";

static NULL_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*-*\s*$").expect("null token pattern is valid"));

pub fn is_null_token(value: &str) -> bool {
    value == "N/A" || NULL_TOKEN.is_match(value)
}

pub fn is_monetary(column_name: &str) -> bool {
    let lowered = column_name.to_lowercase();
    MONETARY_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    Median,
    Mean,
    Zero,
    Mode,
    Sentinel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Imputation {
    pub column: String,
    pub strategy: FillStrategy,
    pub fill: Value,
    pub cells: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CleaningReport {
    pub null_tokens_replaced: usize,
    pub preserved_missing: Vec<(String, usize)>,
    pub imputations: Vec<Imputation>,
    pub duplicates_removed: usize,
}

#[derive(Debug, Clone)]
pub struct Cleaned {
    pub frame: Frame,
    pub report: CleaningReport,
}

/// Fill value for a numeric column: median, else mean, else zero.
pub fn numeric_fill(values: &[f64]) -> (FillStrategy, f64) {
    match stats::median(values) {
        Some(median) if median != 0.0 => (FillStrategy::Median, median),
        _ => match stats::mean(values) {
            Some(mean) => (FillStrategy::Mean, mean),
            None => (FillStrategy::Zero, 0.0),
        },
    }
}

/// Fill value for a text column: its mode, else the `"Unknown"` sentinel.
pub fn text_fill(values: &[Option<String>]) -> (FillStrategy, String) {
    match frequency::text_mode(values) {
        Some(mode) => (FillStrategy::Mode, mode),
        None => (FillStrategy::Sentinel, UNKNOWN_SENTINEL.to_string()),
    }
}

pub fn clean_frame(frame: &Frame) -> Cleaned {
    debug!(
        "Starting data cleaning: {} row(s) x {} column(s)",
        frame.height(),
        frame.width()
    );
    let mut cleaned = frame.clone();
    let mut report = CleaningReport::default();

    for idx in 0..cleaned.width() {
        let Some(column) = cleaned.column_at_mut(idx) else {
            continue;
        };
        if let ColumnData::Text(values) = &mut column.data {
            for cell in values.iter_mut() {
                if cell.as_deref().is_some_and(is_null_token) {
                    *cell = None;
                    report.null_tokens_replaced += 1;
                }
            }
        }
    }

    for idx in 0..cleaned.width() {
        let Some(column) = cleaned.column_at_mut(idx) else {
            continue;
        };
        let missing = column.data.missing_count();
        if missing == 0 {
            continue;
        }
        let name = column.name.clone();
        match &mut column.data {
            ColumnData::Number(values) => {
                if is_monetary(&name) {
                    info!("Keeping {missing} missing value(s) in '{name}' for accurate totals");
                    report.preserved_missing.push((name, missing));
                    continue;
                }
                let (strategy, fill) = numeric_fill(&stats::present(values));
                for cell in values.iter_mut().filter(|cell| cell.is_none()) {
                    *cell = Some(fill);
                }
                info!(
                    "Filled {missing} missing value(s) in '{name}' with {strategy:?}: {}",
                    format_number(fill)
                );
                report.imputations.push(Imputation {
                    column: name,
                    strategy,
                    fill: Value::Number(fill),
                    cells: missing,
                });
            }
            ColumnData::Text(values) => {
                let (strategy, fill) = text_fill(values);
                for cell in values.iter_mut().filter(|cell| cell.is_none()) {
                    *cell = Some(fill.clone());
                }
                info!("Filled {missing} missing value(s) in '{name}' with {strategy:?}: {fill}");
                report.imputations.push(Imputation {
                    column: name,
                    strategy,
                    fill: Value::String(fill),
                    cells: missing,
                });
            }
            ColumnData::Date(_) => {}
        }
    }

    let (deduped, removed) = cleaned.drop_duplicate_rows();
    report.duplicates_removed = removed;
    info!(
        "Removed {removed} duplicate row(s); cleaned shape {} x {}",
        deduped.height(),
        deduped.width()
    );

    Cleaned {
        frame: deduped,
        report,
    }
}
