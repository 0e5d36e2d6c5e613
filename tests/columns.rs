mod common;

use std::collections::HashMap;

use csv_report::columns::{ColumnRole, standardize_columns};
use proptest::prelude::*;

use common::{frame, number_column};

fn header_frame(names: &[&str]) -> csv_report::frame::Frame {
    frame(
        names
            .iter()
            .map(|name| number_column(name, &[Some(1.0)]))
            .collect(),
    )
}

#[test]
fn renames_first_matching_column_per_role() {
    let standardized =
        standardize_columns(&header_frame(&["Order Date", "Product Name", "Sales Amount", "Region"]));
    assert_eq!(
        standardized.frame.column_names(),
        vec!["date", "product", "sales", "region"]
    );
    let roles = standardized
        .assignments
        .iter()
        .map(|a| (a.role, a.source.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        roles,
        vec![
            (ColumnRole::Date, "order_date"),
            (ColumnRole::Sales, "sales_amount"),
            (ColumnRole::Product, "product_name"),
        ]
    );
}

#[test]
fn existing_canonical_name_blocks_the_role() {
    let standardized = standardize_columns(&header_frame(&["date", "sale_date", "units"]));
    // `date` is taken, so `sale_date` falls through to the month role.
    assert_eq!(
        standardized.frame.column_names(),
        vec!["date", "month", "quantity"]
    );
}

#[test]
fn real_estate_headers_map_onto_canonical_roles() {
    let standardized = standardize_columns(&header_frame(&[
        "BOROUGH",
        "NEIGHBORHOOD",
        "BUILDING CLASS CATEGORY",
        "BUILDING CLASS AT PRESENT",
        "ZIP CODE",
        "SALE PRICE",
        "SALE DATE",
    ]));
    assert_eq!(
        standardized.frame.column_names(),
        vec![
            "borough",
            "neighborhood",
            "building_class_category",
            "product",
            "region",
            "sales",
            "date",
        ]
    );
}

#[test]
fn colliding_headers_get_numbered_suffixes() {
    let standardized = standardize_columns(&header_frame(&["Sales", "sales ", "SALES", "Item"]));
    assert_eq!(
        standardized.frame.column_names(),
        vec!["sales", "sales_2", "sales_3", "product"]
    );
    let roles = standardized
        .assignments
        .iter()
        .map(|a| (a.role, a.source.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(roles, vec![(ColumnRole::Product, "item")]);
}

#[test]
fn unmatched_columns_keep_normalized_names() {
    let standardized = standardize_columns(&header_frame(&[" Customer Name ", "Notes"]));
    assert_eq!(standardized.frame.column_names(), vec!["customer_name", "notes"]);
    assert!(standardized.assignments.is_empty());
}

const HEADER_POOL: &[&str] = &[
    "order_date",
    "date",
    "sales",
    "amount",
    "revenue",
    "product_name",
    "item",
    "region",
    "area",
    "zip_code",
    "month",
    "month_name",
    "qty",
    "units",
    "customer",
    "notes",
    "sale_price",
    "total",
];

proptest! {
    #[test]
    fn canonical_names_are_claimed_at_most_once(
        headers in proptest::sample::subsequence(HEADER_POOL.to_vec(), 0..=HEADER_POOL.len())
            .prop_shuffle()
    ) {
        let standardized = standardize_columns(&header_frame(&headers));
        let mut seen: HashMap<&str, usize> = HashMap::new();
        for name in standardized.frame.column_names() {
            *seen.entry(name).or_default() += 1;
        }
        for role in ColumnRole::PRIORITY {
            let canonical = role.canonical_name().unwrap();
            prop_assert!(seen.get(canonical).copied().unwrap_or(0) <= 1);
        }
        prop_assert!(standardized.assignments.len() <= ColumnRole::PRIORITY.len());
        prop_assert_eq!(standardized.frame.width(), headers.len());
    }
}
