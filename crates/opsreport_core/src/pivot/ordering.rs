//! Display order of grid keys.

use crate::model::dimension::{DimValue, Dimension};
use crate::model::pivot::GridKey;
use crate::priority::table::PriorityTable;
use std::cmp::Ordering;

/// Compares grid keys built over a fixed dimension list.
///
/// Category and content components compare first, by priority rank then
/// label; temporal components follow from coarsest to finest, ascending.
pub struct KeyOrdering<'t> {
    table: &'t PriorityTable,
    positions: Vec<(usize, Dimension)>,
}

impl<'t> KeyOrdering<'t> {
    pub fn new(table: &'t PriorityTable, dims: &[Dimension]) -> Self {
        let mut positions: Vec<(usize, Dimension)> = dims.iter().copied().enumerate().collect();
        positions.sort_by_key(|(_, dim)| precedence(*dim));
        Self { table, positions }
    }

    pub fn compare(&self, left: &GridKey, right: &GridKey) -> Ordering {
        for (position, dim) in &self.positions {
            let ordering = match (left.values().get(*position), right.values().get(*position)) {
                (Some(l), Some(r)) => self.compare_component(*dim, l, r),
                (l, r) => l.is_some().cmp(&r.is_some()),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }

    /// Sorts keys in place.
    pub fn sort(&self, keys: &mut [GridKey]) {
        keys.sort_by(|left, right| self.compare(left, right));
    }

    fn compare_component(&self, dim: Dimension, left: &DimValue, right: &DimValue) -> Ordering {
        match (dim, left, right) {
            (Dimension::Category, DimValue::Label(l), DimValue::Label(r)) => {
                self.table.compare_categories(l, r)
            }
            (Dimension::Content, DimValue::Label(l), DimValue::Label(r)) => {
                self.table.compare_contents(l, r)
            }
            (_, DimValue::Int(l), DimValue::Int(r)) => l.cmp(r),
            (_, DimValue::Int(_), DimValue::Label(_)) => Ordering::Less,
            (_, DimValue::Label(_), DimValue::Int(_)) => Ordering::Greater,
            (_, DimValue::Label(l), DimValue::Label(r)) => l.cmp(r),
        }
    }
}

fn precedence(dim: Dimension) -> u8 {
    match dim {
        Dimension::Category => 0,
        Dimension::Content => 1,
        Dimension::Year => 2,
        Dimension::Quarter => 3,
        Dimension::Month => 4,
        Dimension::Week => 5,
    }
}

#[cfg(test)]
mod tests {
    use super::KeyOrdering;
    use crate::model::dimension::{DimValue, Dimension};
    use crate::model::pivot::GridKey;
    use crate::priority::table::PriorityTable;

    fn key(week: i64, category: &str) -> GridKey {
        GridKey(vec![DimValue::Int(week), DimValue::Label(category.to_string())])
    }

    #[test]
    fn taxonomy_outranks_time_regardless_of_position() {
        let table = PriorityTable::builtin();
        let ordering = KeyOrdering::new(table, &[Dimension::Week, Dimension::Category]);
        let mut keys = vec![
            key(1, "Tổ xe"),
            key(2, "Văn bản đến"),
            key(1, "Văn bản đến"),
        ];
        ordering.sort(&mut keys);

        assert_eq!(
            keys,
            vec![key(1, "Văn bản đến"), key(2, "Văn bản đến"), key(1, "Tổ xe")]
        );
    }
}
