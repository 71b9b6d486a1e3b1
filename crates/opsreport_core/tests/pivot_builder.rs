use opsreport_core::pivot::aggregate::aggregate_deltas;
use opsreport_core::{
    attach_deltas, build, AggFn, AnnotatedObservation, AnnotatedValue, Cell, ColumnKey,
    ConfigurationError, DimValue, Dimension, Direction, GridKey, Observation, PivotError,
    PivotQuery, PriorityTable, Ratio, RawValue, ValueField,
};

fn obs(category: &str, content: &str, week: u32, value: f64) -> Observation {
    Observation::new(category, content, 2025, 1, week, Some(value))
}

fn label(value: &str) -> DimValue {
    DimValue::Label(value.to_string())
}

fn row(labels: &[&str]) -> GridKey {
    GridKey(labels.iter().map(|value| label(value)).collect())
}

fn week(number: i64) -> ColumnKey {
    ColumnKey::Values(GridKey(vec![DimValue::Int(number)]))
}

fn annotated(observations: &[Observation]) -> Vec<AnnotatedObservation> {
    attach_deltas(observations)
}

fn weekly_query(row_dims: Vec<Dimension>) -> PivotQuery {
    PivotQuery::new(row_dims, vec![Dimension::Week])
}

#[test]
fn weekly_content_pivot_merges_deltas() {
    let observations = vec![
        obs("A", "X", 1, 100.0),
        obs("A", "X", 2, 150.0),
        obs("A", "X", 3, 0.0),
        obs("A", "X", 4, 30.0),
    ];
    let query = weekly_query(vec![Dimension::Content]).with_delta(true);
    let pivot = build(&annotated(&observations), &query, PriorityTable::builtin()).unwrap();

    assert_eq!(
        pivot.columns(),
        &[week(1), week(2), week(3), week(4), ColumnKey::Total]
    );
    let cells = pivot.row_cells(0).unwrap();
    assert_eq!(cells[0], Cell::Value(100.0));
    assert_eq!(
        cells[1],
        Cell::Annotated(AnnotatedValue::new(150.0, Ratio::Finite(50.0), Some(50.0)))
    );
    assert_eq!(
        cells[2],
        Cell::Annotated(AnnotatedValue::new(0.0, Ratio::Finite(-100.0), Some(-150.0)))
    );
    assert_eq!(
        cells[3],
        Cell::Annotated(AnnotatedValue::new(30.0, Ratio::Infinite, Some(30.0)))
    );
    assert_eq!(cells[4], Cell::Value(280.0));

    let directions: Vec<Option<Direction>> = cells
        .iter()
        .map(|cell| cell.annotation().map(|value| value.direction))
        .collect();
    assert_eq!(
        directions,
        vec![
            None,
            Some(Direction::Increase),
            Some(Direction::Decrease),
            Some(Direction::Increase),
            None,
        ]
    );
}

#[test]
fn total_is_last_column_and_no_total_row_exists() {
    let observations = vec![
        obs("A", "X", 1, 1.0),
        obs("A", "Y", 1, 2.0),
        obs("A", "Y", 2, 3.0),
    ];
    let query = weekly_query(vec![Dimension::Content]);
    let pivot = build(&annotated(&observations), &query, PriorityTable::builtin()).unwrap();

    assert_eq!(pivot.rows().len(), 2);
    assert_eq!(pivot.columns().last(), Some(&ColumnKey::Total));
    assert_eq!(
        pivot.columns().iter().filter(|column| column.is_total()).count(),
        1
    );
    assert!(pivot
        .rows()
        .iter()
        .all(|key| key.values().iter().all(|value| value.as_label() != Some("Total"))));
    assert_eq!(pivot.total(&row(&["X"])), Some(1.0));
    assert_eq!(pivot.total(&row(&["Y"])), Some(5.0));
}

#[test]
fn absent_pairing_is_zero_magnitude_but_null_delta() {
    let observations = vec![
        obs("A", "X", 1, 10.0),
        obs("A", "X", 3, 20.0),
        obs("A", "Y", 2, 5.0),
    ];
    let query = weekly_query(vec![Dimension::Content]).with_delta(true);
    let annotated = annotated(&observations);
    let pivot = build(&annotated, &query, PriorityTable::builtin()).unwrap();

    assert_eq!(pivot.cell(&row(&["X"]), &week(2)), Some(&Cell::Value(0.0)));

    let deltas = aggregate_deltas(&annotated, &[Dimension::Content], &[Dimension::Week]);
    let week_two = GridKey(vec![DimValue::Int(2)]);
    assert!(deltas.get(&row(&["X"]), &week_two).is_none());
    let week_three = GridKey(vec![DimValue::Int(3)]);
    assert_eq!(
        deltas.get(&row(&["X"]), &week_three).map(|cell| cell.ratio),
        Some(Ratio::Finite(100.0))
    );
}

#[test]
fn duplicate_contributors_average_their_ratios() {
    let observations = vec![
        obs("A", "X", 1, 100.0),
        obs("A", "X", 2, 150.0),
        obs("A", "Y", 1, 10.0),
        obs("A", "Y", 2, 20.0),
    ];
    let query = weekly_query(vec![Dimension::Category]).with_delta(true);
    let pivot = build(&annotated(&observations), &query, PriorityTable::builtin()).unwrap();

    let cell = pivot.cell(&row(&["A"]), &week(2)).unwrap();
    assert_eq!(
        cell,
        &Cell::Annotated(AnnotatedValue::new(170.0, Ratio::Finite(75.0), Some(30.0)))
    );
}

#[test]
fn infinite_contributor_dominates_the_mean() {
    let observations = vec![
        obs("A", "X", 1, 0.0),
        obs("A", "X", 2, 5.0),
        obs("A", "Y", 1, 10.0),
        obs("A", "Y", 2, 20.0),
    ];
    let query = weekly_query(vec![Dimension::Category]).with_delta(true);
    let pivot = build(&annotated(&observations), &query, PriorityTable::builtin()).unwrap();

    let cell = pivot.cell(&row(&["A"]), &week(2)).unwrap();
    assert_eq!(cell.annotation().map(|value| value.ratio), Some(Ratio::Infinite));
    assert_eq!(cell.magnitude(), 25.0);
}

#[test]
fn delta_disabled_leaves_plain_values() {
    let observations = vec![obs("A", "X", 1, 1.0), obs("A", "X", 2, 2.0)];
    let query = weekly_query(vec![Dimension::Content]);
    let pivot = build(&annotated(&observations), &query, PriorityTable::builtin()).unwrap();

    assert!(pivot
        .row_cells(0)
        .unwrap()
        .iter()
        .all(|cell| cell.annotation().is_none()));
}

#[test]
fn invalid_dimension_selections_are_rejected() {
    let observations = annotated(&[obs("A", "X", 1, 1.0)]);
    let table = PriorityTable::builtin();

    let none = build(&observations, &PivotQuery::new(vec![], vec![]), table).unwrap_err();
    assert_eq!(
        none,
        PivotError::Configuration(ConfigurationError::NoDimensions)
    );

    let overlap = PivotQuery::new(
        vec![Dimension::Category, Dimension::Week],
        vec![Dimension::Week],
    );
    assert_eq!(
        build(&observations, &overlap, table).unwrap_err(),
        PivotError::Configuration(ConfigurationError::OverlappingDimension(Dimension::Week))
    );

    let repeated = PivotQuery::new(vec![Dimension::Content, Dimension::Content], vec![]);
    assert_eq!(
        build(&observations, &repeated, table).unwrap_err(),
        PivotError::Configuration(ConfigurationError::RepeatedDimension(Dimension::Content))
    );
}

#[test]
fn configuration_is_checked_before_data() {
    let broken = vec![obs("A", "X", 1, 1.0).with_raw_value(Some(RawValue::Text("n/a".into())))];
    let err = build(
        &annotated(&broken),
        &PivotQuery::new(vec![], vec![]),
        PriorityTable::builtin(),
    )
    .unwrap_err();

    assert!(matches!(err, PivotError::Configuration(_)));
}

#[test]
fn non_numeric_value_fails_the_whole_build() {
    let observations = vec![
        obs("A", "X", 1, 1.0),
        obs("A", "X", 2, 0.0).with_raw_value(Some(RawValue::Text("twelve".into()))),
    ];
    let err = build(
        &annotated(&observations),
        &weekly_query(vec![Dimension::Content]),
        PriorityTable::builtin(),
    )
    .unwrap_err();

    assert_eq!(
        err,
        PivotError::DataType {
            category: "A".to_string(),
            content: "X".to_string(),
            raw: "twelve".to_string(),
        }
    );
}

#[test]
fn empty_input_yields_empty_result() {
    let pivot = build(
        &[],
        &weekly_query(vec![Dimension::Content]).with_delta(true),
        PriorityTable::builtin(),
    )
    .unwrap();

    assert!(pivot.is_empty());
    assert!(pivot.columns().is_empty());
}

#[test]
fn aggregation_functions_reduce_each_cell() {
    let observations = vec![
        obs("A", "X", 1, 2.0),
        obs("A", "X", 1, 6.0),
        obs("A", "X", 1, 4.0),
    ];
    let annotated = annotated(&observations);
    let table = PriorityTable::builtin();
    let cell_for = |agg_fn: AggFn| {
        let query = weekly_query(vec![Dimension::Content]).with_agg(agg_fn);
        build(&annotated, &query, table)
            .unwrap()
            .cell(&row(&["X"]), &week(1))
            .map(Cell::magnitude)
    };

    assert_eq!(cell_for(AggFn::Sum), Some(12.0));
    assert_eq!(cell_for(AggFn::Mean), Some(4.0));
    assert_eq!(cell_for(AggFn::Count), Some(3.0));
    assert_eq!(cell_for(AggFn::Min), Some(2.0));
    assert_eq!(cell_for(AggFn::Max), Some(6.0));
}

#[test]
fn null_values_are_skipped_by_aggregation() {
    let observations = vec![
        obs("A", "X", 1, 3.0),
        Observation::new("A", "X", 2025, 1, 1, None),
        Observation::new("A", "X", 2025, 1, 2, None),
    ];
    let annotated = annotated(&observations);
    let table = PriorityTable::builtin();

    let count = build(
        &annotated,
        &weekly_query(vec![Dimension::Content]).with_agg(AggFn::Count),
        table,
    )
    .unwrap();
    assert_eq!(count.cell(&row(&["X"]), &week(1)).map(Cell::magnitude), Some(1.0));
    assert_eq!(count.cell(&row(&["X"]), &week(2)).map(Cell::magnitude), Some(0.0));

    let mean = build(
        &annotated,
        &weekly_query(vec![Dimension::Content]).with_agg(AggFn::Mean),
        table,
    )
    .unwrap();
    assert_eq!(mean.cell(&row(&["X"]), &week(1)).map(Cell::magnitude), Some(3.0));
    assert_eq!(mean.cell(&row(&["X"]), &week(2)).map(Cell::magnitude), Some(0.0));
}

#[test]
fn absolute_change_can_be_aggregated() {
    let observations = vec![
        obs("A", "X", 1, 10.0),
        obs("A", "X", 2, 25.0),
        obs("A", "X", 3, 20.0),
    ];
    let query =
        weekly_query(vec![Dimension::Content]).with_value_field(ValueField::AbsoluteChange);
    let pivot = build(&annotated(&observations), &query, PriorityTable::builtin()).unwrap();

    let magnitudes: Vec<f64> = pivot.row_cells(0).unwrap().iter().map(Cell::magnitude).collect();
    assert_eq!(magnitudes, vec![0.0, 15.0, -5.0, 10.0]);
}

#[test]
fn rows_follow_priority_and_columns_follow_time() {
    let observations = vec![
        obs("Bãi giữ xe", "Lượt xe", 10, 1.0),
        obs("Unlisted desk", "Calls", 2, 1.0),
        obs("Văn bản đến", "Văn bản đi", 2, 1.0),
        obs("Lễ tân", "Lượt khách", 1, 1.0),
    ];
    let pivot = build(
        &annotated(&observations),
        &weekly_query(vec![Dimension::Category]),
        PriorityTable::builtin(),
    )
    .unwrap();

    let categories: Vec<String> = pivot.rows().iter().map(ToString::to_string).collect();
    assert_eq!(
        categories,
        vec!["Văn bản đến", "Lễ tân", "Bãi giữ xe", "Unlisted desk"]
    );
    assert_eq!(
        pivot.columns(),
        &[week(1), week(2), week(10), ColumnKey::Total]
    );
}

#[test]
fn empty_column_dimensions_yield_one_value_column() {
    let observations = vec![obs("A", "X", 1, 4.0), obs("A", "X", 2, 6.0)];
    let query = PivotQuery::new(vec![Dimension::Content], vec![]);
    let pivot = build(&annotated(&observations), &query, PriorityTable::builtin()).unwrap();

    assert_eq!(
        pivot.columns(),
        &[ColumnKey::Values(GridKey(Vec::new())), ColumnKey::Total]
    );
    assert_eq!(pivot.total(&row(&["X"])), Some(10.0));
}

#[test]
fn quarter_columns_are_derived_from_month() {
    let observations = vec![
        Observation::new("A", "X", 2025, 2, 6, Some(1.0)),
        Observation::new("A", "X", 2025, 5, 20, Some(2.0)),
        Observation::new("A", "X", 2025, 3, 11, Some(3.0)),
    ];
    let query = PivotQuery::new(vec![Dimension::Content], vec![Dimension::Quarter]);
    let pivot = build(&annotated(&observations), &query, PriorityTable::builtin()).unwrap();

    let quarter = |number: i64| ColumnKey::Values(GridKey(vec![DimValue::Int(number)]));
    assert_eq!(pivot.cell(&row(&["X"]), &quarter(1)).map(Cell::magnitude), Some(4.0));
    assert_eq!(pivot.cell(&row(&["X"]), &quarter(2)).map(Cell::magnitude), Some(2.0));
}
