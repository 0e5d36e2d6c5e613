//! Insight Engine: short narrative facts derived from the cleaned table.
//!
//! Each [`DomainKind`] maps to an [`InsightStrategy`]. Domain facts come
//! first, followed by the generic statistical checks every dataset gets.
//! Correlation and outlier analysis are exposed separately and are not part
//! of the default sequence. A missing aggregate or column simply means the
//! matching fact is not produced.

use heck::ToTitleCase;
use itertools::Itertools;
use serde::Serialize;

use crate::{
    aggregate::{AggregationSet, GroupRow},
    clean::UNKNOWN_SENTINEL,
    data::{Value, format_grouped},
    domain::{DomainInfo, DomainKind},
    frame::Frame,
    frequency, stats,
};

const BOROUGH_NAMES: [(i64, &str); 5] = [
    (1, "Manhattan"),
    (2, "Bronx"),
    (3, "Brooklyn"),
    (4, "Queens"),
    (5, "Staten Island"),
];

const STRONG_CORRELATION: f64 = 0.7;
const TREND_WINDOW: usize = 3;
const SKEW_ANALYSIS_COLUMNS: usize = 3;

pub trait InsightStrategy {
    fn domain_insights(&self, frame: &Frame, aggregations: &AggregationSet) -> Vec<String>;
}

pub struct SalesInsights;
pub struct RealEstateInsights;
pub struct FinancialInsights;
/// Domains without dedicated narrative logic.
pub struct NoDomainInsights;

pub fn strategy_for(domain: DomainKind) -> &'static dyn InsightStrategy {
    match domain {
        DomainKind::Sales => &SalesInsights,
        DomainKind::RealEstate => &RealEstateInsights,
        DomainKind::Financial => &FinancialInsights,
        DomainKind::Hr | DomainKind::Marketing | DomainKind::Inventory | DomainKind::General => {
            &NoDomainInsights
        }
    }
}

pub fn generate_insights(
    frame: &Frame,
    aggregations: &AggregationSet,
    domain: &DomainInfo,
) -> Vec<String> {
    let mut insights = strategy_for(domain.domain).domain_insights(frame, aggregations);
    insights.extend(statistical_insights(frame));
    insights
}

impl InsightStrategy for SalesInsights {
    fn domain_insights(&self, _frame: &Frame, aggregations: &AggregationSet) -> Vec<String> {
        let mut insights = Vec::new();

        if let Some(monthly) = aggregations.monthly.as_ref().filter(|m| m.len() > 1) {
            if let (Some(best), Some(worst)) = (extreme(&monthly.rows, true), extreme(&monthly.rows, false)) {
                insights.push(format!("Peak sales month: {}", best.key));
                insights.push(format!("Lowest sales month: {}", worst.key));
            }
            if monthly.len() >= TREND_WINDOW {
                let totals = monthly.rows.iter().map(|row| row.total).collect::<Vec<_>>();
                let earlier = stats::mean(&totals[..TREND_WINDOW]);
                let recent = stats::mean(&totals[totals.len() - TREND_WINDOW..]);
                if let (Some(earlier), Some(recent)) = (earlier, recent) {
                    if recent >= earlier * 1.1 {
                        insights.push("Sales show strong growth trend in recent months".to_string());
                    } else if recent <= earlier * 0.9 {
                        insights.push("Sales show declining trend - attention needed".to_string());
                    }
                }
            }
        }

        if let Some(products) = &aggregations.product
            && let Some(top) = products.rows.first()
        {
            insights.push(format!(
                "Star product '{}' generates ${}",
                top.key,
                format_grouped(top.total, 2)
            ));
            if products.len() > 5 {
                let top_five = products.rows.iter().take(5).map(|r| r.total).sum::<f64>();
                let total = products.rows.iter().map(|r| r.total).sum::<f64>();
                if total > 0.0 {
                    insights.push(format!(
                        "Top 5 products account for {:.1}% of total revenue",
                        top_five / total * 100.0
                    ));
                }
            }
        }

        insights
    }
}

impl InsightStrategy for RealEstateInsights {
    fn domain_insights(&self, frame: &Frame, aggregations: &AggregationSet) -> Vec<String> {
        let mut insights = Vec::new();
        let price_column = frame.column("sale_price").or_else(|| {
            aggregations
                .value_column
                .as_ref()
                .and_then(|value| frame.column(&value.name))
        });
        let price_values = price_column.and_then(|column| column.data.as_numbers());

        if let Some(values) = price_values {
            let prices = values
                .iter()
                .flatten()
                .copied()
                .filter(|price| *price > 0.0)
                .collect::<Vec<_>>();
            if let (Some(median), Some(mean)) = (stats::median(&prices), stats::mean(&prices)) {
                insights.push(format!(
                    "Median property price: ${}",
                    format_grouped(median, 0)
                ));
                if mean > median * 1.3 {
                    insights.push("High-end properties significantly skew average prices".to_string());
                }
            }
        }

        if let Some(top) = aggregations
            .regional
            .as_ref()
            .and_then(|regions| regions.rows.first())
            && is_informative(&top.key)
        {
            insights.push(format!("Most active market area: {}", top.key));
        }

        let building_class = frame.columns().iter().find(|column| {
            let lowered = column.lowered_name();
            lowered.contains("building") && lowered.contains("class")
        });
        if let Some((value, _)) = building_class.and_then(|c| frequency::top_value(&c.data))
            && is_informative(&value.as_display())
        {
            insights.push(format!("Most common property type: {value}"));
        }

        let neighborhood = frame.columns().iter().find(|column| {
            let lowered = column.lowered_name();
            lowered.contains("neighborhood") || lowered.contains("area")
        });
        if let Some((value, _)) = neighborhood.and_then(|c| frequency::top_value(&c.data))
            && value.as_display() != UNKNOWN_SENTINEL
        {
            insights.push(format!("Most active neighborhood: {value}"));
        }

        let borough = frame
            .columns()
            .iter()
            .find(|column| column.lowered_name() == "borough");
        if let Some((value, _)) = borough.and_then(|c| frequency::top_value(&c.data)) {
            insights.push(format!("Most active borough: {}", borough_name(&value)));
        }

        if let Some(values) = price_values
            && frame.height() > 0
        {
            let valid = values.iter().flatten().count();
            if valid > 0 {
                insights.push(format!(
                    "{} valid property transactions analyzed",
                    format_grouped(valid as f64, 0)
                ));
                if (valid as f64) < frame.height() as f64 * 0.5 {
                    insights.push("Note: Many transactions have missing price data".to_string());
                }
            }
        }

        insights
    }
}

impl InsightStrategy for FinancialInsights {
    fn domain_insights(&self, _frame: &Frame, aggregations: &AggregationSet) -> Vec<String> {
        let mut insights = vec!["Financial data analysis completed".to_string()];
        let summary = &aggregations.summary;
        if let (Some(value), Some(valid)) = (&aggregations.value_column, summary.valid_transactions)
        {
            insights.push(format!(
                "{} of {} records have a positive {} value",
                format_grouped(valid as f64, 0),
                format_grouped(summary.total_records as f64, 0),
                value.name
            ));
        }
        insights
    }
}

impl InsightStrategy for NoDomainInsights {
    fn domain_insights(&self, _frame: &Frame, _aggregations: &AggregationSet) -> Vec<String> {
        Vec::new()
    }
}

/// Data-quality and distribution checks applied to every dataset.
pub fn statistical_insights(frame: &Frame) -> Vec<String> {
    let mut insights = Vec::new();

    let cells = frame.height() * frame.width();
    if cells > 0 {
        let missing_percent = frame.missing_cells() as f64 / cells as f64 * 100.0;
        if missing_percent < 5.0 {
            insights.push("Excellent data quality - minimal missing values".to_string());
        } else if missing_percent > 20.0 {
            insights.push("Data quality concern - significant missing values detected".to_string());
        }
    }

    for column in frame.numeric_columns().take(SKEW_ANALYSIS_COLUMNS) {
        let Some(values) = column.data.as_numbers() else {
            continue;
        };
        let Some(skew) = stats::skewness(&stats::present(values)) else {
            continue;
        };
        if skew.abs() > 2.0 {
            let distribution = if skew.abs() > 3.0 {
                "heavily skewed"
            } else {
                "moderately skewed"
            };
            insights.push(format!(
                "{} data is {distribution} - consider log transformation",
                column.name.to_title_case()
            ));
        }
    }

    insights
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationFinding {
    pub column1: String,
    pub column2: String,
    pub correlation: f64,
    pub description: String,
}

/// Pairs of numeric columns whose absolute Pearson correlation exceeds 0.7.
pub fn analyze_correlations(frame: &Frame) -> Vec<CorrelationFinding> {
    let numeric = frame.numeric_columns().collect::<Vec<_>>();
    numeric
        .iter()
        .tuple_combinations()
        .filter_map(|(left, right)| {
            let correlation = stats::pearson(left.data.as_numbers()?, right.data.as_numbers()?)?;
            if correlation.abs() <= STRONG_CORRELATION {
                return None;
            }
            let direction = if correlation > 0.0 {
                "positively"
            } else {
                "negatively"
            };
            Some(CorrelationFinding {
                column1: left.name.clone(),
                column2: right.name.clone(),
                correlation,
                description: format!(
                    "{} and {} are strongly {direction} correlated ({correlation:.3})",
                    left.name, right.name
                ),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub column: String,
    pub count: usize,
    pub percentage: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
}

/// IQR fences per numeric column: values outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
/// Columns with no present values are skipped.
pub fn detect_outliers(frame: &Frame) -> Vec<OutlierReport> {
    frame
        .numeric_columns()
        .filter_map(|column| {
            let values = stats::present(column.data.as_numbers()?);
            let q1 = stats::quantile(&values, 0.25)?;
            let q3 = stats::quantile(&values, 0.75)?;
            let iqr = q3 - q1;
            let lower_bound = q1 - 1.5 * iqr;
            let upper_bound = q3 + 1.5 * iqr;
            let count = values
                .iter()
                .filter(|v| **v < lower_bound || **v > upper_bound)
                .count();
            Some(OutlierReport {
                column: column.name.clone(),
                count,
                percentage: count as f64 / frame.height().max(1) as f64 * 100.0,
                lower_bound,
                upper_bound,
            })
        })
        .collect()
}

/// First row holding the maximum (or minimum) total.
fn extreme(rows: &[GroupRow], maximum: bool) -> Option<&GroupRow> {
    rows.iter().fold(None, |best: Option<&GroupRow>, row| match best {
        Some(current)
            if (maximum && current.total >= row.total)
                || (!maximum && current.total <= row.total) =>
        {
            Some(current)
        }
        _ => Some(row),
    })
}

fn is_informative(label: &str) -> bool {
    label != UNKNOWN_SENTINEL && !label.eq_ignore_ascii_case("nan")
}

/// Borough names for the five numeric borough codes; other values pass through.
pub fn borough_name(value: &Value) -> String {
    let code = match value {
        Value::Number(n) if n.fract() == 0.0 => Some(*n as i64),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    code.and_then(|code| {
        BOROUGH_NAMES
            .iter()
            .find(|(known, _)| *known == code)
            .map(|(_, name)| name.to_string())
    })
    .unwrap_or_else(|| value.as_display())
}
