//! Plain-text rendering of reports.

use opsreport_core::{
    Cell, ColumnKey, Dimension, GridKey, PivotResult, PivotView, PriorityTable, Report,
};

const SEPARATOR: &str = " | ";

/// Renders the pivot as an aligned text table, grouped when possible.
pub fn render_report(report: &Report, table: &PriorityTable) -> String {
    let pivot = &report.pivot;
    if pivot.is_empty() {
        return "no observations matched the query\n".to_string();
    }

    let mut lines: Vec<Line> = vec![Line::Cells(header(pivot))];
    match report.view(table) {
        PivotView::Flat(pivot) => {
            for (index, key) in pivot.rows().iter().enumerate() {
                let cells = pivot.row_cells(index).unwrap_or_default();
                lines.push(Line::Cells(row_line(key.to_string(), cells)));
            }
        }
        PivotView::Grouped(grouped) => {
            for group in &grouped.groups {
                lines.push(Line::Heading(group.category.to_string()));
                for row in &group.rows {
                    let label = match row.content {
                        Some(content) => format!("  {content}"),
                        None => format!("  {}", row.key),
                    };
                    lines.push(Line::Cells(row_line(label, row.cells)));
                }
            }
        }
    }

    let mut rendered = align(&lines);
    rendered.push_str(&format!(
        "delta coverage: {}/{} observations\n",
        report.coverage.with_ratio, report.coverage.total
    ));
    rendered
}

enum Line {
    Heading(String),
    Cells(Vec<String>),
}

fn header(pivot: &PivotResult) -> Vec<String> {
    let rows_label = if pivot.row_dims().is_empty() {
        String::new()
    } else {
        join_dims(pivot.row_dims())
    };
    let mut header = vec![rows_label];
    header.extend(
        pivot
            .columns()
            .iter()
            .map(|column| column_label(pivot.col_dims(), column)),
    );
    header
}

fn column_label(col_dims: &[Dimension], column: &ColumnKey) -> String {
    match column {
        ColumnKey::Total => column.to_string(),
        ColumnKey::Values(key) if key.is_empty() => "Value".to_string(),
        ColumnKey::Values(key) => labelled_key(col_dims, key),
    }
}

fn labelled_key(dims: &[Dimension], key: &GridKey) -> String {
    dims.iter()
        .zip(key.values())
        .map(|(dim, value)| format!("{dim} {value}"))
        .collect::<Vec<_>>()
        .join(" / ")
}

fn join_dims(dims: &[Dimension]) -> String {
    dims.iter()
        .map(|dim| dim.as_str())
        .collect::<Vec<_>>()
        .join(" / ")
}

fn row_line(label: String, cells: &[Cell]) -> Vec<String> {
    let mut line = vec![label];
    line.extend(cells.iter().map(ToString::to_string));
    line
}

fn align(lines: &[Line]) -> String {
    let mut widths: Vec<usize> = Vec::new();
    for line in lines {
        if let Line::Cells(cells) = line {
            for (index, cell) in cells.iter().enumerate() {
                let width = cell.chars().count();
                match widths.get_mut(index) {
                    Some(current) => *current = (*current).max(width),
                    None => widths.push(width),
                }
            }
        }
    }

    let mut out = String::new();
    for line in lines {
        match line {
            Line::Heading(text) => {
                out.push_str(&format!("[{text}]\n"));
            }
            Line::Cells(cells) => {
                let padded: Vec<String> = cells
                    .iter()
                    .zip(&widths)
                    .enumerate()
                    .map(|(index, (cell, width))| {
                        if index == 0 {
                            format!("{cell:<width$}")
                        } else {
                            format!("{cell:>width$}")
                        }
                    })
                    .collect();
                out.push_str(padded.join(SEPARATOR).trim_end());
                out.push('\n');
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::render_report;
    use opsreport_core::{
        Dimension, Observation, PivotQuery, PriorityTable, ReportQuery, ReportService,
    };

    fn weekly_report(row_dims: Vec<Dimension>) -> String {
        let observations = vec![
            Observation::new("A", "X", 2025, 1, 1, Some(100.0)),
            Observation::new("A", "X", 2025, 1, 2, Some(150.0)),
        ];
        let table = PriorityTable::builtin();
        let query = ReportQuery::new(PivotQuery::new(row_dims, vec![Dimension::Week]).with_delta(true));
        let report = ReportService::new(table).run(&observations, &query).unwrap();
        render_report(&report, table)
    }

    #[test]
    fn flat_report_lists_rows_with_inline_change() {
        let rendered = weekly_report(vec![Dimension::Content]);
        let lines: Vec<&str> = rendered.lines().collect();

        assert_eq!(lines[0], "Content | Week 1 |       Week 2 | Total");
        assert_eq!(lines[1], "X       |    100 | 150 (↑50.0%) |   250");
        assert_eq!(lines[2], "delta coverage: 1/2 observations");
    }

    #[test]
    fn grouped_report_prints_category_headings() {
        let rendered = weekly_report(vec![Dimension::Category, Dimension::Content]);
        assert!(rendered.contains("[A]\n"));
        assert!(rendered.contains("  X"));
    }
}
