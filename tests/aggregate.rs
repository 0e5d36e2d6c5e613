mod common;

use csv_report::{
    aggregate::{ValueColumnRule, aggregate, select_value_column},
    clean::clean_frame,
    columns::standardize_columns,
    normalize::normalize_types,
};
use proptest::prelude::*;

use common::{WIDGET_SALES, frame, frame_from_csv, number_column, text_column};

fn prepared(csv: &str) -> csv_report::frame::Frame {
    let standardized = standardize_columns(&frame_from_csv(csv));
    clean_frame(&normalize_types(&standardized.frame)).frame
}

#[test]
fn widget_scenario_excludes_the_dash_row() {
    let aggregations = aggregate(&prepared(WIDGET_SALES), 20);

    let value = aggregations.value_column.as_ref().unwrap();
    assert_eq!(value.name, "sales");
    assert_eq!(value.rule, ValueColumnRule::RevenueLike);

    let summary = &aggregations.summary;
    assert_eq!(summary.total_records, 3);
    assert_eq!(summary.valid_transactions, Some(2));
    assert_eq!(summary.excluded_invalid, Some(1));
    assert_eq!(summary.total_sales, Some(2000.0));
    assert_eq!(summary.average_sale, Some(1000.0));
    assert_eq!(
        summary.date_range.as_deref(),
        Some("2024-01-05 to 2024-02-15")
    );

    let monthly = aggregations.monthly.as_ref().unwrap();
    let months = monthly
        .rows
        .iter()
        .map(|row| (row.key.as_str(), row.total, row.count))
        .collect::<Vec<_>>();
    assert_eq!(months, vec![("January", 1200.0, 1), ("February", 800.0, 1)]);

    let product = aggregations.product.as_ref().unwrap();
    assert_eq!(product.len(), 1);
    assert_eq!(product.rows[0].key, "Widget");
    assert_eq!(product.rows[0].total, 2000.0);
    assert_eq!(product.rows[0].mean, 1000.0);
    assert_eq!(
        product.display_rows(),
        vec![vec!["Widget", "2000.00", "2", "1000.00"]]
    );
    assert!(aggregations.regional.is_none());
}

#[test]
fn unparseable_dates_leave_no_range_and_one_unknown_month() {
    let aggregations = aggregate(
        &prepared("Order Date,Product,Sales\nxx,A,\"$1,200.50\"\nyy,B,300\nzz,A,-\n"),
        20,
    );

    let summary = &aggregations.summary;
    assert_eq!(summary.date_range, None);
    assert_eq!(summary.total_sales, Some(1500.5));
    assert_eq!(
        summary.valid_transactions.unwrap() + summary.excluded_invalid.unwrap(),
        summary.total_records
    );
    assert_eq!(summary.excluded_invalid, Some(1));

    let monthly = aggregations.monthly.as_ref().unwrap();
    let months = monthly
        .rows
        .iter()
        .map(|row| (row.key.as_str(), row.total, row.count))
        .collect::<Vec<_>>();
    assert_eq!(months, vec![("Unknown", 1500.5, 2)]);
}

#[test]
fn missing_date_column_has_no_range() {
    let aggregations = aggregate(&prepared("product,sales\nA,5\nB,7\n"), 20);
    assert_eq!(aggregations.summary.date_range, None);
    assert!(aggregations.monthly.is_none());
}

#[test]
fn value_column_priority_prefers_price_over_revenue() {
    let table = frame(vec![
        number_column("revenue", &[Some(1.0)]),
        number_column("unit_price", &[Some(2.0)]),
    ]);
    let chosen = select_value_column(&table).unwrap();
    assert_eq!(chosen.name, "unit_price");
    assert_eq!(chosen.rule, ValueColumnRule::PriceLike);
}

#[test]
fn value_column_skips_identifier_like_columns() {
    let table = frame(vec![
        number_column("order_id", &[Some(1.0)]),
        number_column("weight", &[Some(2.0)]),
    ]);
    let chosen = select_value_column(&table).unwrap();
    assert_eq!(chosen.name, "weight");
    assert_eq!(chosen.rule, ValueColumnRule::Meaningful);

    let only_ids = frame(vec![number_column("order_id", &[Some(1.0)])]);
    assert_eq!(
        select_value_column(&only_ids).unwrap().rule,
        ValueColumnRule::AnyNumeric
    );
}

#[test]
fn no_numeric_column_yields_summary_only() {
    let table = frame(vec![text_column("customer", &[Some("a"), Some("b")])]);
    let aggregations = aggregate(&table, 20);
    assert_eq!(aggregations.summary.total_records, 2);
    assert!(aggregations.value_column.is_none());
    assert!(aggregations.monthly.is_none());
    assert!(aggregations.product.is_none());
    assert!(aggregations.regional.is_none());
    assert_eq!(aggregations.summary.valid_transactions, None);
    assert_eq!(aggregations.summary.total_sales, None);
}

#[test]
fn product_view_is_capped_and_regional_ties_keep_first_seen_order() {
    let products = (0..25).map(|i| format!("P{i:02}")).collect::<Vec<_>>();
    let regions = (0..25)
        .map(|i| if i % 2 == 0 { "East" } else { "West" })
        .collect::<Vec<_>>();
    let amounts = (0..25).map(|i| Some(f64::from(i + 1))).collect::<Vec<_>>();
    let table = frame(vec![
        text_column(
            "product",
            &products.iter().map(|p| Some(p.as_str())).collect::<Vec<_>>(),
        ),
        text_column("region", &regions.iter().map(|r| Some(*r)).collect::<Vec<_>>()),
        number_column("amount", &amounts),
    ]);
    let aggregations = aggregate(&table, 20);

    let product = aggregations.product.unwrap();
    assert_eq!(product.len(), 20);
    assert_eq!(product.rows[0].key, "P24");
    assert_eq!(product.rows[19].key, "P05");

    let tied = frame(vec![
        text_column("region", &[Some("North"), Some("South"), Some("East")]),
        number_column("amount", &[Some(5.0), Some(5.0), Some(9.0)]),
    ]);
    let regional = aggregate(&tied, 20).regional.unwrap();
    let keys = regional.rows.iter().map(|r| r.key.as_str()).collect::<Vec<_>>();
    assert_eq!(keys, vec!["East", "North", "South"]);
}

#[test]
fn totals_are_rounded_to_cents() {
    let table = frame(vec![
        text_column("product", &[Some("A"), Some("A"), Some("A")]),
        number_column("amount", &[Some(0.1), Some(0.2), Some(0.333)]),
    ]);
    let product = aggregate(&table, 20).product.unwrap();
    assert_eq!(product.rows[0].total, 0.63);
    assert_eq!(product.rows[0].mean, 0.21);
}

proptest! {
    #[test]
    fn valid_and_excluded_partition_the_records(
        rows in proptest::collection::vec(
            (proptest::option::of(-50.0f64..500.0), 0usize..6, 0usize..4),
            1..60,
        )
    ) {
        let products = rows.iter().map(|(_, p, _)| format!("item-{p}")).collect::<Vec<_>>();
        let regions = rows.iter().map(|(_, _, r)| format!("zone-{r}")).collect::<Vec<_>>();
        let amounts = rows.iter().map(|(a, _, _)| *a).collect::<Vec<_>>();
        let table = frame(vec![
            text_column("product", &products.iter().map(|p| Some(p.as_str())).collect::<Vec<_>>()),
            text_column("area", &regions.iter().map(|r| Some(r.as_str())).collect::<Vec<_>>()),
            number_column("amount", &amounts),
        ]);

        let aggregations = aggregate(&table, 20);
        let summary = &aggregations.summary;
        let valid = summary.valid_transactions.unwrap();
        prop_assert_eq!(valid + summary.excluded_invalid.unwrap(), summary.total_records);
        prop_assert_eq!(valid, amounts.iter().filter(|a| a.is_some_and(|v| v > 0.0)).count());

        for view in [&aggregations.product, &aggregations.regional].into_iter().flatten() {
            prop_assert!(view.rows.windows(2).all(|pair| pair[0].total >= pair[1].total));
            let counted = view.rows.iter().map(|row| row.count).sum::<usize>();
            prop_assert_eq!(counted, valid);
        }
    }
}
