//! Column Classifier: maps arbitrary header names onto canonical roles.
//!
//! Headers are normalized first (lowercase, trimmed, spaces to underscores);
//! a header that collides with an earlier one gets a `_2`, `_3`, ... suffix.
//! Roles are then resolved in the fixed order of [`ColumnRole::PRIORITY`];
//! for each role the left-most column whose name contains one of the role's
//! keywords is renamed to the canonical name. A canonical name is claimed at
//! most once and a column that already carries a canonical name is never
//! renamed again.

use std::collections::HashSet;

use log::{debug, info};
use serde::Serialize;

use crate::{data::normalize_column_name, frame::Frame};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Date,
    Sales,
    Product,
    Region,
    Month,
    Quantity,
    Unclassified,
}

impl ColumnRole {
    pub const PRIORITY: [ColumnRole; 6] = [
        ColumnRole::Date,
        ColumnRole::Sales,
        ColumnRole::Product,
        ColumnRole::Region,
        ColumnRole::Month,
        ColumnRole::Quantity,
    ];

    pub fn canonical_name(&self) -> Option<&'static str> {
        match self {
            ColumnRole::Date => Some("date"),
            ColumnRole::Sales => Some("sales"),
            ColumnRole::Product => Some("product"),
            ColumnRole::Region => Some("region"),
            ColumnRole::Month => Some("month"),
            ColumnRole::Quantity => Some("quantity"),
            ColumnRole::Unclassified => None,
        }
    }

    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ColumnRole::Date => &["date", "order_date", "transaction_date", "sale_date"],
            ColumnRole::Sales => &["sales", "amount", "revenue", "total", "value", "sale_price"],
            ColumnRole::Product => &[
                "product",
                "item",
                "product_name",
                "item_name",
                "building_class_at_present",
            ],
            ColumnRole::Region => &["region", "location", "area", "territory", "zip_code"],
            ColumnRole::Month => &["month", "month_name", "sale_date"],
            ColumnRole::Quantity => &["quantity", "qty", "units", "count", "total_units"],
            ColumnRole::Unclassified => &[],
        }
    }

    pub fn matches(&self, column_name: &str) -> bool {
        let lowered = column_name.to_lowercase();
        self.keywords()
            .iter()
            .any(|keyword| lowered.contains(keyword))
    }

    /// Role owning `column_name` when it is a canonical name.
    pub fn for_canonical(column_name: &str) -> ColumnRole {
        Self::PRIORITY
            .into_iter()
            .find(|role| role.canonical_name() == Some(column_name))
            .unwrap_or(ColumnRole::Unclassified)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoleAssignment {
    pub role: ColumnRole,
    pub source: String,
    pub canonical: String,
}

#[derive(Debug, Clone)]
pub struct Standardized {
    pub frame: Frame,
    pub assignments: Vec<RoleAssignment>,
}

pub fn standardize_columns(frame: &Frame) -> Standardized {
    let mut standardized = frame.clone();
    let mut taken = HashSet::new();
    for idx in 0..standardized.width() {
        let normalized = normalize_column_name(&standardized.columns()[idx].name);
        let mut unique = normalized.clone();
        let mut suffix = 2;
        while !taken.insert(unique.clone()) {
            unique = format!("{normalized}_{suffix}");
            suffix += 1;
        }
        if unique != normalized {
            debug!("Column '{normalized}' repeats an earlier header; renamed to '{unique}'");
        }
        standardized.rename_column(idx, unique);
    }

    let mut assignments = Vec::new();
    for role in ColumnRole::PRIORITY {
        let Some(canonical) = role.canonical_name() else {
            continue;
        };
        if standardized.column_index(canonical).is_some() {
            debug!("Canonical column '{canonical}' already present; skipping role {role:?}");
            continue;
        }
        let candidate = standardized.columns().iter().position(|column| {
            ColumnRole::for_canonical(&column.name) == ColumnRole::Unclassified
                && role.matches(&column.name)
        });
        if let Some(idx) = candidate {
            let source = standardized.columns()[idx].name.clone();
            info!("Standardized column '{source}' to '{canonical}'");
            standardized.rename_column(idx, canonical);
            assignments.push(RoleAssignment {
                role,
                source,
                canonical: canonical.to_string(),
            });
        }
    }

    Standardized {
        frame: standardized,
        assignments,
    }
}
