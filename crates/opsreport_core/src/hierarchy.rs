//! Hierarchical presentation grouping.
//!
//! # Responsibility
//! - Reshape a built pivot into category sections holding their content rows.
//!
//! # Invariants
//! - Pure view: cells and totals are borrowed, never recomputed.
//! - Pivots whose rows lack a category pass through unchanged.

use crate::model::pivot::{Cell, ColumnKey, GridKey, PivotResult};
use crate::model::dimension::Dimension;
use crate::priority::table::PriorityTable;
use std::cmp::Ordering;

/// Presentation of a pivot, flat or grouped by category.
#[derive(Debug, Clone, PartialEq)]
pub enum PivotView<'a> {
    Flat(&'a PivotResult),
    Grouped(GroupedPivot<'a>),
}

/// Pivot partitioned into ordered category sections.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedPivot<'a> {
    pub columns: &'a [ColumnKey],
    pub groups: Vec<CategoryGroup<'a>>,
}

/// One category section.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup<'a> {
    pub category: &'a str,
    pub rows: Vec<GroupedRow<'a>>,
}

/// One row inside a category section.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupedRow<'a> {
    pub key: &'a GridKey,
    /// Content label when the row key carries one.
    pub content: Option<&'a str>,
    /// Cells aligned with [`GroupedPivot::columns`], `Total` last.
    pub cells: &'a [Cell],
}

impl GroupedRow<'_> {
    pub fn total(&self) -> Option<f64> {
        self.cells.last().map(Cell::magnitude)
    }
}

impl<'a> PivotView<'a> {
    pub fn is_grouped(&self) -> bool {
        matches!(self, Self::Grouped(_))
    }

    pub fn as_grouped(&self) -> Option<&GroupedPivot<'a>> {
        match self {
            Self::Grouped(grouped) => Some(grouped),
            Self::Flat(_) => None,
        }
    }
}

/// Groups pivot rows by category in priority order.
///
/// Inside a category, rows follow content priority; rows that tie on content
/// keep their pivot order.
pub fn group_by_category<'a>(pivot: &'a PivotResult, table: &PriorityTable) -> PivotView<'a> {
    let Some(category_at) = pivot.row_dim_position(Dimension::Category) else {
        return PivotView::Flat(pivot);
    };
    let content_at = pivot.row_dim_position(Dimension::Content);

    let mut groups: Vec<CategoryGroup<'a>> = Vec::new();
    for (index, key) in pivot.rows().iter().enumerate() {
        let Some(category) = key.values().get(category_at).and_then(|value| value.as_label())
        else {
            continue;
        };
        let Some(cells) = pivot.row_cells(index) else {
            continue;
        };
        let row = GroupedRow {
            key,
            content: content_at
                .and_then(|at| key.values().get(at))
                .and_then(|value| value.as_label()),
            cells,
        };

        match groups.iter_mut().find(|group| group.category == category) {
            Some(group) => group.rows.push(row),
            None => groups.push(CategoryGroup {
                category,
                rows: vec![row],
            }),
        }
    }

    groups.sort_by(|left, right| table.compare_categories(left.category, right.category));
    for group in &mut groups {
        group.rows.sort_by(|left, right| match (left.content, right.content) {
            (Some(l), Some(r)) => table.compare_contents(l, r),
            _ => Ordering::Equal,
        });
    }

    PivotView::Grouped(GroupedPivot {
        columns: pivot.columns(),
        groups,
    })
}
