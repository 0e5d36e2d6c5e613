mod common;

use csv_report::{
    aggregate::{AggregationSet, GroupRow, GroupedView, MONTHLY_HEADERS, PRODUCT_HEADERS, aggregate},
    data::Value,
    domain::{DomainInfo, DomainKind, detect_domain},
    insights::{
        analyze_correlations, borough_name, detect_outliers, generate_insights,
        statistical_insights, strategy_for,
    },
};

use common::{frame, number_column, text_column};

fn domain(kind: DomainKind) -> DomainInfo {
    DomainInfo {
        domain: kind,
        confidence: 50.0,
        scores: Vec::new(),
    }
}

fn rows(totals: &[(&str, f64)]) -> Vec<GroupRow> {
    totals
        .iter()
        .map(|(key, total)| GroupRow {
            key: key.to_string(),
            total: *total,
            count: 1,
            mean: *total,
        })
        .collect()
}

#[test]
fn borough_codes_map_to_names() {
    let table = frame(vec![
        number_column("borough", &[Some(1.0), Some(3.0), Some(3.0), Some(4.0)]),
        number_column("sale_price", &[Some(500_000.0), Some(650_000.0), Some(700_000.0), Some(800_000.0)]),
    ]);
    let aggregations = aggregate(&table, 20);
    let insights = strategy_for(DomainKind::RealEstate).domain_insights(&table, &aggregations);
    assert!(insights.contains(&"Most active borough: Brooklyn".to_string()));
    assert!(insights.contains(&"Median property price: $675,000".to_string()));
    assert!(insights.contains(&"4 valid property transactions analyzed".to_string()));
}

#[test]
fn unmapped_borough_codes_pass_through() {
    assert_eq!(borough_name(&Value::Number(5.0)), "Staten Island");
    assert_eq!(borough_name(&Value::Number(9.0)), "9");
    assert_eq!(borough_name(&Value::String(" 2 ".into())), "Bronx");
    assert_eq!(borough_name(&Value::String("Queens".into())), "Queens");
}

#[test]
fn real_estate_flags_skew_and_sparse_prices() {
    let table = frame(vec![
        text_column(
            "neighborhood",
            &[Some("Harlem"), Some("Soho"), Some("Soho"), Some("Chelsea"), Some("Soho")],
        ),
        number_column(
            "sale_price",
            &[Some(100.0), Some(110.0), Some(5_000.0), None, None],
        ),
    ]);
    let insights =
        strategy_for(DomainKind::RealEstate).domain_insights(&table, &AggregationSet::default());
    assert_eq!(
        insights,
        vec![
            "Median property price: $110",
            "High-end properties significantly skew average prices",
            "Most active neighborhood: Soho",
            "3 valid property transactions analyzed",
        ]
    );

    let sparse = frame(vec![number_column(
        "sale_price",
        &[Some(100.0), None, None, None],
    )]);
    let insights =
        strategy_for(DomainKind::RealEstate).domain_insights(&sparse, &AggregationSet::default());
    assert_eq!(
        insights.last().map(String::as_str),
        Some("Note: Many transactions have missing price data")
    );
}

#[test]
fn sales_strategy_reports_extremes_trend_and_top_products() {
    let aggregations = AggregationSet {
        monthly: Some(GroupedView {
            group_column: "month_name".into(),
            headers: MONTHLY_HEADERS,
            rows: rows(&[
                ("January", 100.0),
                ("February", 100.0),
                ("March", 100.0),
                ("April", 150.0),
                ("May", 150.0),
                ("June", 150.0),
            ]),
        }),
        product: Some(GroupedView {
            group_column: "product".into(),
            headers: PRODUCT_HEADERS,
            rows: rows(&[
                ("Widget", 1234.5),
                ("Gizmo", 165.5),
                ("B", 100.0),
                ("C", 100.0),
                ("D", 100.0),
                ("E", 100.0),
            ]),
        }),
        ..AggregationSet::default()
    };
    let table = frame(vec![number_column("sales", &[Some(1.0)])]);
    let insights = strategy_for(DomainKind::Sales).domain_insights(&table, &aggregations);
    assert_eq!(
        insights,
        vec![
            "Peak sales month: April",
            "Lowest sales month: January",
            "Sales show strong growth trend in recent months",
            "Star product 'Widget' generates $1,234.50",
            "Top 5 products account for 94.4% of total revenue",
        ]
    );
}

#[test]
fn declining_sales_are_flagged() {
    let aggregations = AggregationSet {
        monthly: Some(GroupedView {
            group_column: "month_name".into(),
            headers: MONTHLY_HEADERS,
            rows: rows(&[("January", 300.0), ("February", 200.0), ("March", 100.0)]),
        }),
        ..AggregationSet::default()
    };
    let table = frame(vec![number_column("sales", &[Some(1.0)])]);
    let insights = strategy_for(DomainKind::Sales).domain_insights(&table, &aggregations);
    // A three-month window compares the series with itself.
    assert!(!insights.iter().any(|i| i.contains("trend")));

    let aggregations = AggregationSet {
        monthly: Some(GroupedView {
            group_column: "month_name".into(),
            headers: MONTHLY_HEADERS,
            rows: rows(&[
                ("January", 300.0),
                ("February", 300.0),
                ("March", 300.0),
                ("April", 100.0),
                ("May", 100.0),
                ("June", 100.0),
            ]),
        }),
        ..AggregationSet::default()
    };
    let insights = strategy_for(DomainKind::Sales).domain_insights(&table, &aggregations);
    assert!(insights.contains(&"Sales show declining trend - attention needed".to_string()));
}

#[test]
fn domains_without_strategies_only_get_statistical_insights() {
    let table = frame(vec![number_column("x", &[Some(1.0), Some(2.0)])]);
    for kind in [DomainKind::Hr, DomainKind::Marketing, DomainKind::Inventory, DomainKind::General] {
        let insights = generate_insights(&table, &AggregationSet::default(), &domain(kind));
        assert_eq!(insights, vec!["Excellent data quality - minimal missing values"]);
    }
}

#[test]
fn financial_strategy_always_reports_completion() {
    let table = frame(vec![number_column("balance", &[Some(10.0), Some(-4.0)])]);
    let aggregations = aggregate(&table, 20);
    let insights = generate_insights(&table, &aggregations, &detect_domain(&["balance"]));
    assert_eq!(insights[0], "Financial data analysis completed");
    assert_eq!(insights[1], "1 of 2 records have a positive balance value");
}

#[test]
fn missing_data_and_skew_are_classified() {
    let sparse = frame(vec![
        number_column("a", &[Some(1.0), None, None, Some(4.0)]),
        text_column("b", &[Some("x"), None, Some("y"), Some("z")]),
    ]);
    assert_eq!(
        statistical_insights(&sparse),
        vec!["Data quality concern - significant missing values detected"]
    );

    let mut heavy = vec![Some(1.0); 30];
    heavy.push(Some(1_000.0));
    let skewed = frame(vec![number_column("order_value", &heavy)]);
    assert_eq!(
        statistical_insights(&skewed),
        vec![
            "Excellent data quality - minimal missing values",
            "Order Value data is heavily skewed - consider log transformation",
        ]
    );
}

#[test]
fn strong_correlations_are_described_with_sign() {
    let table = frame(vec![
        number_column("ad_spend", &[Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
        number_column("revenue", &[Some(10.0), Some(21.0), Some(29.0), Some(41.0)]),
        number_column("returns", &[Some(8.0), Some(6.0), Some(4.0), Some(1.0)]),
        number_column("noise", &[Some(5.0), Some(1.0), Some(5.0), Some(1.0)]),
    ]);
    let findings = analyze_correlations(&table);
    let pairs = findings
        .iter()
        .map(|f| (f.column1.as_str(), f.column2.as_str()))
        .collect::<Vec<_>>();
    assert_eq!(
        pairs,
        vec![
            ("ad_spend", "revenue"),
            ("ad_spend", "returns"),
            ("revenue", "returns"),
        ]
    );
    assert!(findings[0].description.starts_with("ad_spend and revenue are strongly positively correlated ("));
    assert!(findings[1].description.contains("negatively"));
}

#[test]
fn iqr_outliers_are_counted_per_column() {
    let table = frame(vec![
        number_column(
            "amount",
            &[Some(10.0), Some(11.0), Some(12.0), Some(13.0), Some(100.0), None],
        ),
        text_column("label", &[Some("a"); 6]),
    ]);
    let reports = detect_outliers(&table);
    assert_eq!(reports.len(), 1);
    let report = &reports[0];
    assert_eq!(report.column, "amount");
    assert_eq!(report.count, 1);
    // Q1 = 11, Q3 = 13, IQR = 2
    assert_eq!(report.lower_bound, 8.0);
    assert_eq!(report.upper_bound, 16.0);
    assert!((report.percentage - 100.0 / 6.0).abs() < 1e-9);
}
