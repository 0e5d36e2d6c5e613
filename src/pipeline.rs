//! End-to-end processing of one raw table into a [`ReportBundle`].
//!
//! Stage order is fixed: domain detection on the raw header, then Column
//! Classifier, Type Normalizer, Cleaner, Aggregator, and Insight Engine.
//! Every stage borrows its input and returns a new table.

use chrono::Local;
use log::{debug, info};
use serde::Serialize;

use crate::{
    aggregate::{self, AggregationSet},
    clean::{self, CleaningReport},
    columns::{self, RoleAssignment},
    config::ReportConfig,
    domain::{self, DomainInfo},
    error::PipelineError,
    frame::Frame,
    insights, normalize,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Serialize)]
pub struct ReportBundle {
    /// Cleaned table; written separately as the raw-data artifact.
    #[serde(skip)]
    pub data: Frame,
    pub assignments: Vec<RoleAssignment>,
    pub cleaning: CleaningReport,
    pub aggregations: AggregationSet,
    pub domain: DomainInfo,
    pub insights: Vec<String>,
    pub processed_at: String,
}

pub fn process(raw: &Frame, config: &ReportConfig) -> Result<ReportBundle, PipelineError> {
    let required = config.min_records.max(1);
    if raw.height() < required {
        return Err(PipelineError::EmptyDataset {
            rows: raw.height(),
            required,
        });
    }

    let domain = domain::detect_domain(&raw.column_names());
    info!(
        "Detected domain: {} (confidence {:.1}%)",
        domain.domain, domain.confidence
    );

    let standardized = columns::standardize_columns(raw);
    let normalized = normalize::normalize_types(&standardized.frame);
    let cleaned = clean::clean_frame(&normalized);
    let aggregations = aggregate::aggregate(&cleaned.frame, config.top_products);
    let insights = insights::generate_insights(&cleaned.frame, &aggregations, &domain);
    debug!("Generated {} insight(s)", insights.len());

    Ok(ReportBundle {
        data: cleaned.frame,
        assignments: standardized.assignments,
        cleaning: cleaned.report,
        aggregations,
        domain,
        insights,
        processed_at: Local::now().format(TIMESTAMP_FORMAT).to_string(),
    })
}
