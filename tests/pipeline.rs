use std::collections::BTreeSet;
use std::io::Write;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;

use rusty_dash::chart::series::{resolve, Marks};
use rusty_dash::chart::{build_chart, ChartKind, ChartRequest, ChartSpec};
use rusty_dash::data::aggregate::{aggregate, AggMode, AggregateOrder, AggregationSpec};
use rusty_dash::data::filter::{
    apply_filters, filter_options, init_filter_state, DateRange, FilterState, FilterWidget,
    MAX_FILTER_CARDINALITY,
};
use rusty_dash::data::load_table;
use rusty_dash::data::model::{CellValue, ColumnKind, Table};
use rusty_dash::ConfigError;

const COSTS: &str = "id,provider,cost,date\n\
                     1,A,10,2023-01-01\n\
                     2,A,20,2023-01-02\n\
                     3,B,5,2023-01-03\n";

fn write_temp(suffix: &str, contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn load(suffix: &str, contents: &str) -> Table {
    let file = write_temp(suffix, contents);
    load_table(file.path()).unwrap()
}

fn text(s: &str) -> CellValue {
    CellValue::Text(s.to_string())
}

fn ids(table: &Table) -> Vec<CellValue> {
    table.column("id").unwrap().values.clone()
}

#[test]
fn columns_are_classified_on_load() {
    let table = load(".csv", COSTS);
    let kinds: Vec<_> = table.columns().iter().map(|c| (c.name.as_str(), c.kind)).collect();
    assert_eq!(
        kinds,
        vec![
            ("id", ColumnKind::Numeric),
            ("provider", ColumnKind::Categorical),
            ("cost", ColumnKind::Numeric),
            ("date", ColumnKind::Datetime),
        ]
    );
}

#[test]
fn summed_cost_by_provider_largest_first() {
    let table = load(".csv", COSTS);
    let filters = init_filter_state(&table, MAX_FILTER_CARDINALITY);
    let filtered = apply_filters(&table, &filters);

    let spec = AggregationSpec::new("provider", Some("cost"), AggMode::Sum)
        .with_order(AggregateOrder::Descending);
    let summed = aggregate(&filtered, &spec).unwrap();

    assert_eq!(summed.column_names(), vec!["provider".to_string(), "value".to_string()]);
    assert_eq!(summed.row(0), vec![&text("A"), &CellValue::Float(30.0)]);
    assert_eq!(summed.row(1), vec![&text("B"), &CellValue::Float(5.0)]);
}

#[test]
fn date_range_keeps_inclusive_days() {
    let table = load(".csv", COSTS);
    let filters = FilterState {
        date_range: Some(DateRange::from_inputs("date", "2023-01-02", "2023-01-03")),
        ..init_filter_state(&table, MAX_FILTER_CARDINALITY)
    };
    let filtered = apply_filters(&table, &filters);
    assert_eq!(ids(&filtered), vec![CellValue::Integer(2), CellValue::Integer(3)]);
}

#[test]
fn full_range_and_full_allow_lists_keep_every_row() {
    let table = load(".csv", "id,provider,date\n1,A,2023-01-01\n2,,2023-01-05\n3,B,\n");
    let filters = FilterState {
        date_range: DateRange::full(&table, "date"),
        ..init_filter_state(&table, MAX_FILTER_CARDINALITY)
    };
    // Row 3 has no date, so only the range can exclude it.
    assert_eq!(
        ids(&apply_filters(&table, &filters)),
        vec![CellValue::Integer(1), CellValue::Integer(2)]
    );

    let no_range = init_filter_state(&table, MAX_FILTER_CARDINALITY);
    assert_eq!(apply_filters(&table, &no_range), table);
}

#[test]
fn high_cardinality_columns_get_no_allow_list() {
    let mut csv = String::from("id,label\n");
    for i in 0..60 {
        csv.push_str(&format!("{i},item-{i}\n"));
    }
    let table = load(".csv", &csv);

    let options = filter_options(&table, MAX_FILTER_CARDINALITY);
    assert!(options
        .iter()
        .all(|opt| matches!(opt.widget, FilterWidget::Skipped { distinct: 60 })));

    // An allow-list supplied anyway has no effect.
    let mut filters = init_filter_state(&table, MAX_FILTER_CARDINALITY);
    assert!(filters.allow_lists.is_empty());
    filters.allow_lists.insert("label".into(), BTreeSet::new());
    assert_eq!(apply_filters(&table, &filters).len(), 60);
}

#[test]
fn reapplying_allow_lists_changes_nothing() {
    let table = load(".csv", COSTS);
    let mut filters = init_filter_state(&table, MAX_FILTER_CARDINALITY);
    filters
        .allow_lists
        .insert("provider".into(), [text("A")].into());
    let once = apply_filters(&table, &filters);
    let twice = apply_filters(&once, &filters);
    assert_eq!(once, twice);
    assert_eq!(once.len(), 2);
}

#[test]
fn counts_include_a_missing_group() {
    let table = load(".csv", "provider,n\nA,1\nB,2\n,3\nA,4\nNA,5\n");
    let counted = aggregate(
        &table,
        &AggregationSpec::new("provider", None, AggMode::Count),
    )
    .unwrap();
    assert_eq!(counted.len(), 3);
    assert_eq!(
        counted.column("count").unwrap().values,
        vec![
            CellValue::Integer(2),
            CellValue::Integer(1),
            CellValue::Integer(2)
        ]
    );
    let total: i64 = counted
        .column("count")
        .unwrap()
        .values
        .iter()
        .filter_map(|v| v.as_f64())
        .map(|v| v as i64)
        .sum();
    assert_eq!(total, 5);
}

#[test]
fn group_of_missing_values_has_missing_mean() {
    let table = load(".csv", "provider,cost\nA,1\nB,\nA,3\nB,NaN\n");
    let mean = aggregate(
        &table,
        &AggregationSpec::new("provider", Some("cost"), AggMode::Mean),
    )
    .unwrap();
    assert_eq!(mean.row(0), vec![&text("A"), &CellValue::Float(2.0)]);
    assert_eq!(mean.row(1), vec![&text("B"), &CellValue::Null]);
}

#[test]
fn incompatible_selections_are_config_errors() {
    let table = load(".csv", COSTS);

    let pie = ChartRequest {
        kind: ChartKind::Pie,
        x: Some("provider".into()),
        y: None,
        aggregation: AggMode::None,
    };
    assert_eq!(build_chart(&pie, &table), Err(ConfigError::PieNeedsValues));

    let line = ChartRequest {
        kind: ChartKind::Line,
        x: Some("provider".into()),
        y: Some("cost".into()),
        aggregation: AggMode::Count,
    };
    assert_eq!(
        build_chart(&line, &table),
        Err(ConfigError::CountUnsupported(ChartKind::Line))
    );

    for values in ["provider", "date"] {
        let pie = ChartRequest {
            kind: ChartKind::Pie,
            x: Some("provider".into()),
            y: Some(values.into()),
            aggregation: AggMode::None,
        };
        assert_eq!(
            build_chart(&pie, &table),
            Err(ConfigError::NotNumeric(values.into()))
        );
    }
}

#[test]
fn bar_chart_over_filtered_rows() {
    let table = load(".csv", COSTS);
    let mut filters = init_filter_state(&table, MAX_FILTER_CARDINALITY);
    filters.date_range = Some(DateRange::from_inputs("date", "2023-01-02", ""));
    let filtered = apply_filters(&table, &filters);

    let request = ChartRequest {
        kind: ChartKind::Bar,
        x: Some("provider".into()),
        y: Some("cost".into()),
        aggregation: AggMode::Sum,
    };
    let spec = build_chart(&request, &filtered).unwrap();
    assert_eq!(spec.title(), "Sum of cost by provider");

    let data = resolve(&spec, &filtered, 20).unwrap();
    match data.marks {
        Marks::Bars { bars, .. } => assert_eq!(bars, vec![[0.0, 20.0], [1.0, 5.0]]),
        other => panic!("expected bars, got {other:?}"),
    }
}

#[test]
fn chart_spec_survives_json() {
    let table = load(".csv", COSTS);
    let request = ChartRequest {
        kind: ChartKind::Pie,
        x: Some("provider".into()),
        y: Some("cost".into()),
        aggregation: AggMode::Mean,
    };
    let spec = build_chart(&request, &table).unwrap();
    let json = serde_json::to_string(&spec).unwrap();
    let back: ChartSpec = serde_json::from_str(&json).unwrap();
    assert_eq!(back, spec);
}

#[test]
fn malformed_file_is_a_load_error() {
    let file = write_temp(".csv", "a,b\n1,2\n3,4,5\n");
    let err = load_table(file.path()).unwrap_err();
    assert_eq!(err.path, file.path());
    assert!(err.to_string().contains("failed to load"));

    let unsupported = write_temp(".xlsx", "whatever");
    assert!(load_table(unsupported.path()).is_err());
}

#[test]
fn json_records_load_like_csv() {
    let table = load(
        ".json",
        r#"[
            {"provider": "A", "cost": 10, "date": "2023-01-01"},
            {"provider": "B", "cost": null, "date": "2023-01-02"},
            {"provider": "A", "date": "2023-01-03"}
        ]"#,
    );
    assert_eq!(table.len(), 3);
    assert_eq!(table.column("cost").unwrap().kind, ColumnKind::Numeric);
    assert_eq!(table.column("cost").unwrap().null_count(), 2);
    assert_eq!(table.column("date").unwrap().kind, ColumnKind::Datetime);
}

#[test]
fn tab_separated_files_use_tabs() {
    let table = load(".tsv", "provider\tcost\nA\t1.5\nB\t2\n");
    assert_eq!(table.column_names(), vec!["provider".to_string(), "cost".to_string()]);
    assert_eq!(table.column("cost").unwrap().kind, ColumnKind::Numeric);
}
