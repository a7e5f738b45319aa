use glam::Vec2;
use std::collections::HashMap;

/// A 2D cell coordinate on the ground plane (X and Z world axes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellCoord {
    pub x: i32,
    pub z: i32,
}

impl CellCoord {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }
}

/// Most cells one collider may occupy before it is kept out of the grid.
pub(crate) const MAX_CELLS_PER_COLLIDER: i64 = 256;

/// Fixed-size grid over the ground plane mapping cells to collider slots.
///
/// A collider is registered in every cell its expanded footprint touches, so
/// a point query only needs the point's own cell. Colliders whose footprint
/// spans more than [`MAX_CELLS_PER_COLLIDER`] cells are listed separately
/// and checked by every query.
#[derive(Debug, Clone)]
pub(crate) struct GridIndex {
    cell_size: f32,
    cells: HashMap<CellCoord, Vec<usize>>,
    oversized: Vec<usize>,
}

impl GridIndex {
    /// `cell_size` must be finite and positive.
    pub(crate) fn new(cell_size: f32) -> Self {
        debug_assert!(cell_size.is_finite() && cell_size > 0.0);
        Self {
            cell_size,
            cells: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    pub(crate) fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub(crate) fn cell_of(&self, point: Vec2) -> CellCoord {
        CellCoord {
            x: (point.x / self.cell_size).floor() as i32,
            z: (point.y / self.cell_size).floor() as i32,
        }
    }

    /// Register `slot` in every cell overlapped by the square of half-size
    /// `reach` around `center`.
    pub(crate) fn insert(&mut self, slot: usize, center: Vec2, reach: f32) {
        let min = self.cell_of(center - Vec2::splat(reach));
        let max = self.cell_of(center + Vec2::splat(reach));
        let span_x = i64::from(max.x) - i64::from(min.x) + 1;
        let span_z = i64::from(max.z) - i64::from(min.z) + 1;
        let span = span_x * span_z;
        if span > MAX_CELLS_PER_COLLIDER {
            self.oversized.push(slot);
            return;
        }
        for x in min.x..=max.x {
            for z in min.z..=max.z {
                self.cells.entry(CellCoord::new(x, z)).or_default().push(slot);
            }
        }
    }

    /// Collider slots that may cover `point`: those registered in its cell
    /// plus every oversized one.
    pub(crate) fn candidates(&self, point: Vec2) -> impl Iterator<Item = usize> + '_ {
        self.cells
            .get(&self.cell_of(point))
            .into_iter()
            .flatten()
            .chain(&self.oversized)
            .copied()
    }

    #[cfg(test)]
    pub(crate) fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[cfg(test)]
    pub(crate) fn oversized_count(&self) -> usize {
        self.oversized.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_of_floors_negative_coordinates() {
        let grid = GridIndex::new(16.0);
        assert_eq!(grid.cell_of(Vec2::new(10.0, 10.0)), CellCoord::new(0, 0));
        assert_eq!(grid.cell_of(Vec2::new(20.0, -5.0)), CellCoord::new(1, -1));
    }

    #[test]
    fn footprint_spans_neighbouring_cells() {
        let mut grid = GridIndex::new(4.0);
        grid.insert(0, Vec2::new(3.5, 0.5), 1.0);
        // x spans [2.5, 4.5] and z spans [-0.5, 1.5]: two cells on each axis.
        assert_eq!(grid.cell_count(), 4);
        assert_eq!(grid.candidates(Vec2::new(4.2, 0.0)).collect::<Vec<_>>(), vec![0]);
        assert_eq!(grid.candidates(Vec2::new(9.0, 9.0)).count(), 0);
    }

    #[test]
    fn wide_footprint_skips_the_cells() {
        let mut grid = GridIndex::new(1.0);
        grid.insert(0, Vec2::splat(0.5), 0.4);
        grid.insert(1, Vec2::ZERO, 1.0e6);
        assert_eq!(grid.cell_count(), 1);
        assert_eq!(grid.oversized_count(), 1);
        assert_eq!(grid.candidates(Vec2::splat(0.5)).collect::<Vec<_>>(), vec![0, 1]);
        assert_eq!(grid.candidates(Vec2::new(-5000.0, 7.0)).collect::<Vec<_>>(), vec![1]);
    }
}
