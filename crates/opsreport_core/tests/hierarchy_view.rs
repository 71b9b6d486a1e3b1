use opsreport_core::{
    attach_deltas, build, group_by_category, Cell, Dimension, Observation, PivotQuery,
    PivotResult, PivotView, PriorityTable,
};

fn obs(category: &str, content: &str, week: u32, value: f64) -> Observation {
    Observation::new(category, content, 2025, 1, week, Some(value))
}

fn weekly_pivot(observations: &[Observation], row_dims: Vec<Dimension>) -> PivotResult {
    let query = PivotQuery::new(row_dims, vec![Dimension::Week]).with_delta(true);
    build(&attach_deltas(observations), &query, PriorityTable::builtin()).unwrap()
}

#[test]
fn groups_follow_category_then_content_priority() {
    let observations = vec![
        obs("Tổ xe", "Số chuyến xe", 1, 3.0),
        obs("Văn bản đến", "Xử lý trễ hạn", 1, 2.0),
        obs("Văn bản đến", "Tổng số văn bản đến, trong đó:", 1, 9.0),
        obs("Văn bản đến", "Xử lý đúng hạn", 2, 7.0),
    ];
    let pivot = weekly_pivot(&observations, vec![Dimension::Category, Dimension::Content]);
    let view = group_by_category(&pivot, PriorityTable::builtin());
    let grouped = view.as_grouped().unwrap();

    let categories: Vec<&str> = grouped.groups.iter().map(|group| group.category).collect();
    assert_eq!(categories, vec!["Văn bản đến", "Tổ xe"]);

    let contents: Vec<Option<&str>> = grouped.groups[0]
        .rows
        .iter()
        .map(|row| row.content)
        .collect();
    assert_eq!(
        contents,
        vec![
            Some("Tổng số văn bản đến, trong đó:"),
            Some("Xử lý đúng hạn"),
            Some("Xử lý trễ hạn"),
        ]
    );
}

#[test]
fn grouping_reuses_pivot_cells_without_recomputing() {
    let observations = vec![
        obs("Lễ tân", "Lượt khách", 1, 4.0),
        obs("Lễ tân", "Lượt khách", 2, 6.0),
        obs("Sự kiện", "Số sự kiện", 1, 1.0),
    ];
    let pivot = weekly_pivot(&observations, vec![Dimension::Category, Dimension::Content]);
    let view = group_by_category(&pivot, PriorityTable::builtin());
    let grouped = view.as_grouped().unwrap();

    assert_eq!(grouped.columns, pivot.columns());
    for group in &grouped.groups {
        for row in &group.rows {
            let index = pivot.row_index(row.key).unwrap();
            assert_eq!(row.cells, pivot.row_cells(index).unwrap());
            assert_eq!(row.total(), pivot.total(row.key));
        }
    }

    let reception = &grouped.groups[0].rows[0];
    assert_eq!(reception.total(), Some(10.0));
    assert!(matches!(reception.cells[1], Cell::Annotated(_)));
}

#[test]
fn category_only_rows_form_single_row_groups() {
    let observations = vec![obs("Tổ xe", "A", 1, 1.0), obs("Tổ xe", "B", 1, 2.0)];
    let pivot = weekly_pivot(&observations, vec![Dimension::Category]);
    let view = group_by_category(&pivot, PriorityTable::builtin());
    let grouped = view.as_grouped().unwrap();

    assert_eq!(grouped.groups.len(), 1);
    assert_eq!(grouped.groups[0].rows.len(), 1);
    assert_eq!(grouped.groups[0].rows[0].content, None);
    assert_eq!(grouped.groups[0].rows[0].total(), Some(3.0));
}

#[test]
fn pivots_without_category_rows_stay_flat() {
    let observations = vec![obs("Tổ xe", "A", 1, 1.0)];
    let pivot = weekly_pivot(&observations, vec![Dimension::Content]);

    let view = group_by_category(&pivot, PriorityTable::builtin());
    assert!(!view.is_grouped());
    assert_eq!(view, PivotView::Flat(&pivot));
}
