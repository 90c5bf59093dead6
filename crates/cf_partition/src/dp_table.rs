//! A square table of `DPCell`s over circular intervals (i, j).
//!
//! Both indices wrap modulo N, so `table[(i + 1, j + n - 1)]` is valid for
//! any i, j. The cell at (i, j) describes the interval from i forward to j.

use std::ops::Index;

use ndarray::Array2;

use crate::CellRef;
use crate::DPCell;
use crate::TableId;

#[derive(Debug, Clone)]
pub struct DPTable {
    id: TableId,
    cells: Array2<DPCell>,
}

impl DPTable {
    /// A zeroed N x N table with `diag` on the diagonal. With `track`, every
    /// cell identifies itself in provenance records.
    pub fn new(id: TableId, n: usize, diag: f64, track: bool) -> Self {
        let cells = Array2::from_shape_fn((n, n), |(i, j)| {
            let q = if i == j { diag } else { 0.0 };
            if track {
                DPCell::tagged(q, CellRef { table: id, i, j })
            } else {
                DPCell::new(q)
            }
        });
        Self { id, cells }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn len(&self) -> usize {
        self.cells.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    fn wrap(&self, i: usize, j: usize) -> (usize, usize) {
        let n = self.len();
        (i % n, j % n)
    }

    pub fn get(&self, i: usize, j: usize) -> &DPCell {
        &self.cells[self.wrap(i, j)]
    }

    #[inline]
    pub fn val(&self, i: usize, j: usize) -> f64 {
        self.get(i, j).q()
    }

    /// The cell at (i, j) as a factor in another cell's recursion.
    #[inline]
    pub fn term(&self, i: usize, j: usize) -> DPCell {
        self.get(i, j).source()
    }

    /// Add a computed value into the cell at (i, j).
    pub(crate) fn absorb(&mut self, i: usize, j: usize, value: DPCell) {
        let idx = self.wrap(i, j);
        self.cells[idx].absorb(value);
    }

    /// Zero the seed of an empty interval (i, i).
    pub(crate) fn clear_diagonal(&mut self, i: usize) {
        let idx = self.wrap(i, i);
        let cell = &mut self.cells[idx];
        let q = cell.q();
        cell.add_value(-q);
    }

    /// Cell values as a plain matrix.
    pub fn values(&self) -> Array2<f64> {
        self.cells.map(|c| c.q())
    }
}

impl Index<(usize, usize)> for DPTable {
    type Output = DPCell;

    fn index(&self, (i, j): (usize, usize)) -> &DPCell {
        self.get(i, j)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagonal_and_wrap() {
        let mut t = DPTable::new(TableId::CEff, 4, 2.5, false);
        assert_eq!(t.len(), 4);
        assert_eq!(t.val(1, 1), 2.5);
        assert_eq!(t.val(5, 9), 2.5);
        assert_eq!(t.val(0, 3), 0.0);

        t.absorb(3, 6, DPCell::new(1.0));
        assert_eq!(t.val(3, 2), 1.0);
        assert_eq!(t[(7, 2)].q(), 1.0);
        assert_eq!(t.values()[(3, 2)], 1.0);

        t.clear_diagonal(5);
        assert_eq!(t.val(1, 1), 0.0);
        assert_eq!(t.val(2, 2), 2.5);
    }

    #[test]
    fn test_tracked_cells() {
        let mut t = DPTable::new(TableId::ZLinear, 3, 1.0, true);
        let expected = CellRef { table: TableId::ZLinear, i: 0, j: 2 };
        assert_eq!(t.term(3, 5).info(), &[expected]);

        let mut value = DPCell::default();
        value += DPCell::tagged(0.5, CellRef { table: TableId::ZBP, i: 0, j: 2 });
        t.absorb(0, 2, value);
        assert_eq!(t[(0, 2)].contributions().len(), 1);
        assert_eq!(t[(0, 2)].info(), &[expected]);
        assert!(t.term(0, 2).contributions().is_empty());
    }
}
