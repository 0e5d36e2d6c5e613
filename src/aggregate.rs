//! Aggregator: grouped summaries over a single chosen value column.
//!
//! Only the *valid subset* (rows whose value is present and strictly
//! positive) feeds any sum, count, or mean. Rows outside it stay in the
//! cleaned table and are reported as `excluded_invalid` in the summary.

use std::collections::HashMap;

use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::Serialize;

use crate::{
    frame::{Column, Frame},
    normalize::{DATE_COLUMN, MONTH_NAME_COLUMN},
};

pub const PRICE_KEYWORDS: &[&str] = &["price", "value", "amount", "cost"];
pub const REVENUE_KEYWORDS: &[&str] = &["sales", "revenue", "income"];
pub const EXCLUDED_KEYWORDS: &[&str] = &[
    "units", "quantity", "count", "id", "year", "month", "block", "lot",
];
pub const PRODUCT_KEYWORDS: &[&str] = &["product", "item"];
pub const REGION_KEYWORDS: &[&str] = &["region", "location", "area"];
pub const DEFAULT_TOP_PRODUCTS: usize = 20;

pub const MONTHLY_HEADERS: [&str; 4] = ["Month", "Total_Sales", "Transaction_Count", "Average_Sale"];
pub const PRODUCT_HEADERS: [&str; 4] = ["Product", "Total_Sales", "Units_Sold", "Average_Price"];
pub const REGIONAL_HEADERS: [&str; 4] =
    ["Region", "Total_Sales", "Transaction_Count", "Average_Sale"];

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Which selection rule picked the value column, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueColumnRule {
    PriceLike,
    RevenueLike,
    Meaningful,
    AnyNumeric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueColumn {
    pub name: String,
    pub rule: ValueColumnRule,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRow {
    pub key: String,
    pub total: f64,
    pub count: usize,
    pub mean: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupedView {
    pub group_column: String,
    pub headers: [&'static str; 4],
    pub rows: Vec<GroupRow>,
}

impl GroupedView {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Rows rendered for tabular output, matching [`GroupedView::headers`].
    pub fn display_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                vec![
                    row.key.clone(),
                    format!("{:.2}", row.total),
                    row.count.to_string(),
                    format!("{:.2}", row.mean),
                ]
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_records: usize,
    pub date_range: Option<String>,
    pub total_sales: Option<f64>,
    pub average_sale: Option<f64>,
    pub valid_transactions: Option<usize>,
    pub excluded_invalid: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AggregationSet {
    pub value_column: Option<ValueColumn>,
    pub monthly: Option<GroupedView>,
    pub product: Option<GroupedView>,
    pub regional: Option<GroupedView>,
    pub summary: SummaryStats,
}

pub fn select_value_column(frame: &Frame) -> Option<ValueColumn> {
    let numeric = frame.numeric_columns().collect::<Vec<_>>();
    let first_matching = |keywords: &[&str]| {
        numeric
            .iter()
            .find(|column| contains_any(&column.lowered_name(), keywords))
            .map(|column| column.name.clone())
    };

    let chosen = first_matching(PRICE_KEYWORDS)
        .map(|name| (name, ValueColumnRule::PriceLike))
        .or_else(|| {
            first_matching(REVENUE_KEYWORDS).map(|name| (name, ValueColumnRule::RevenueLike))
        })
        .or_else(|| {
            numeric
                .iter()
                .find(|column| !contains_any(&column.lowered_name(), EXCLUDED_KEYWORDS))
                .map(|column| (column.name.clone(), ValueColumnRule::Meaningful))
        })
        .or_else(|| {
            numeric
                .first()
                .map(|column| (column.name.clone(), ValueColumnRule::AnyNumeric))
        });

    chosen.map(|(name, rule)| ValueColumn { name, rule })
}

/// Row indices whose value is present and strictly positive.
pub fn valid_rows(values: &[Option<f64>]) -> Vec<usize> {
    values
        .iter()
        .enumerate()
        .filter(|(_, value)| value.is_some_and(|v| v > 0.0))
        .map(|(idx, _)| idx)
        .collect()
}

pub fn aggregate(frame: &Frame, top_products: usize) -> AggregationSet {
    let mut aggregations = AggregationSet {
        summary: SummaryStats {
            total_records: frame.height(),
            date_range: date_range(frame),
            ..SummaryStats::default()
        },
        ..AggregationSet::default()
    };

    let Some(value_column) = select_value_column(frame) else {
        info!("No numeric value column found; producing summary only");
        return aggregations;
    };
    let Some(values) = frame
        .column(&value_column.name)
        .and_then(|column| column.data.as_numbers())
    else {
        return aggregations;
    };
    info!(
        "Using '{}' as value column ({:?})",
        value_column.name, value_column.rule
    );

    let valid = valid_rows(values);
    let excluded = frame.height() - valid.len();
    info!(
        "Using {} valid record(s) out of {} total; {} excluded",
        valid.len(),
        frame.height(),
        excluded
    );
    aggregations.summary.valid_transactions = Some(valid.len());
    aggregations.summary.excluded_invalid = Some(excluded);

    if !valid.is_empty() {
        let valid_values = valid.iter().filter_map(|idx| values[*idx]).collect::<Vec<_>>();
        let total = valid_values.iter().sum::<f64>();
        aggregations.summary.total_sales = Some(total);
        aggregations.summary.average_sale = Some(total / valid_values.len() as f64);

        aggregations.monthly = frame.column(MONTH_NAME_COLUMN).map(|column| {
            let mut rows = group_values(column, values, &valid);
            rows.sort_by_key(|row| month_position(&row.key));
            grouped_view(column, MONTHLY_HEADERS, rows)
        });

        aggregations.product = frame.find_column(PRODUCT_KEYWORDS).map(|column| {
            let mut rows = group_values(column, values, &valid);
            sort_descending(&mut rows);
            rows.truncate(top_products);
            grouped_view(column, PRODUCT_HEADERS, rows)
        });

        aggregations.regional = frame.find_column(REGION_KEYWORDS).map(|column| {
            let mut rows = group_values(column, values, &valid);
            sort_descending(&mut rows);
            grouped_view(column, REGIONAL_HEADERS, rows)
        });
    }

    debug!(
        "Generated aggregations: monthly={}, product={}, regional={}",
        aggregations.monthly.is_some(),
        aggregations.product.is_some(),
        aggregations.regional.is_some()
    );
    aggregations.value_column = Some(value_column);
    aggregations
}

fn contains_any(name: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| name.contains(keyword))
}

/// Sums, counts, and averages `values` per distinct key of `column` over the
/// `valid` rows. Groups come out in order of first appearance; rows with a
/// missing key are skipped.
fn group_values(column: &Column, values: &[Option<f64>], valid: &[usize]) -> Vec<GroupRow> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    for &row in valid {
        let (Some(key), Some(value)) = (column.data.get(row), values[row]) else {
            continue;
        };
        let key = key.as_display();
        match positions.get(&key) {
            Some(&idx) => {
                groups[idx].1 += value;
                groups[idx].2 += 1;
            }
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push((key, value, 1));
            }
        }
    }
    groups
        .into_iter()
        .map(|(key, total, count)| GroupRow {
            key,
            total: round2(total),
            count,
            mean: round2(total / count as f64),
        })
        .collect()
}

fn grouped_view(column: &Column, headers: [&'static str; 4], rows: Vec<GroupRow>) -> GroupedView {
    GroupedView {
        group_column: column.name.clone(),
        headers,
        rows,
    }
}

/// Stable, so equal totals keep their first-appearance order.
fn sort_descending(rows: &mut [GroupRow]) {
    rows.sort_by(|a, b| b.total.total_cmp(&a.total));
}

/// Calendar position of a month name; unknown labels sort after December.
fn month_position(name: &str) -> usize {
    MONTH_NAMES
        .iter()
        .position(|month| month.eq_ignore_ascii_case(name))
        .unwrap_or(MONTH_NAMES.len())
}

fn round2(value: f64) -> f64 {
    Decimal::from_f64(value)
        .map(|decimal| decimal.round_dp(2))
        .and_then(|decimal| decimal.to_f64())
        .unwrap_or(value)
}

fn date_range(frame: &Frame) -> Option<String> {
    let dates = frame.column(DATE_COLUMN)?.data.as_dates()?;
    let present = dates.iter().flatten().copied().collect::<Vec<NaiveDate>>();
    let min = present.iter().min()?;
    let max = present.iter().max()?;
    Some(format!(
        "{} to {}",
        min.format("%Y-%m-%d"),
        max.format("%Y-%m-%d")
    ))
}
