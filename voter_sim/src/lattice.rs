//! NxN opinion lattice with periodic boundaries.
//!
//! Cells are stored flat in row-major order (`index = row * N + column`).
//! Bounded accessors reject coordinates outside `[0, N)`; neighbor queries
//! wrap toroidally so the lattice has no edges.

use crate::error::SimError;
use crate::opinion::Opinion;
use rand::Rng;

/// The four von Neumann neighbors of a cell, in fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Neighbors {
    pub up: Opinion,
    pub down: Opinion,
    pub left: Opinion,
    pub right: Opinion,
}

impl Neighbors {
    /// Returns the neighbors as `[up, down, left, right]`.
    pub fn to_array(self) -> [Opinion; 4] {
        [self.up, self.down, self.left, self.right]
    }

    /// Signed sum of the four encodings, in `[-4, 4]`.
    pub fn sum(self) -> i32 {
        self.to_array().iter().map(|o| i32::from(o.value())).sum()
    }
}

/// Square grid of opinions owned by exactly one simulation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lattice {
    size: usize,
    cells: Vec<Opinion>,
}

impl Lattice {
    /// Creates an NxN lattice with every cell drawn from an unbiased coin.
    ///
    /// Draws are taken in row-major order, one per cell.
    pub fn random<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Result<Self, SimError> {
        let len = Self::cell_count(size)?;
        let cells = (0..len).map(|_| rng.gen::<Opinion>()).collect();
        Ok(Self { size, cells })
    }

    /// Creates an NxN lattice where every cell holds `opinion`.
    pub fn uniform(size: usize, opinion: Opinion) -> Result<Self, SimError> {
        let len = Self::cell_count(size)?;
        Ok(Self {
            size,
            cells: vec![opinion; len],
        })
    }

    /// Creates a lattice from row-major cells.
    pub fn from_cells(size: usize, cells: Vec<Opinion>) -> Result<Self, SimError> {
        let len = Self::cell_count(size)?;
        if cells.len() != len {
            return Err(SimError::invalid(format!(
                "expected {len} cells for a {size}x{size} lattice, got {}",
                cells.len()
            )));
        }
        Ok(Self { size, cells })
    }

    /// N², rejecting `N == 0` and sizes whose cell count overflows.
    fn cell_count(size: usize) -> Result<usize, SimError> {
        if size == 0 {
            return Err(SimError::invalid("grid size must be greater than 0"));
        }
        size.checked_mul(size)
            .ok_or_else(|| SimError::invalid(format!("grid size {size} overflows")))
    }

    /// Side length N.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of cells, N².
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Always false: a lattice holds at least one cell.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn index(&self, column: usize, row: usize) -> Result<usize, SimError> {
        if column >= self.size || row >= self.size {
            tracing::error!(column, row, size = self.size, "lattice index out of bounds");
            return Err(SimError::OutOfBounds {
                column,
                row,
                size: self.size,
            });
        }
        Ok(row * self.size + column)
    }

    /// Returns the opinion at a bounded position.
    pub fn get(&self, column: usize, row: usize) -> Result<Opinion, SimError> {
        let idx = self.index(column, row)?;
        Ok(self.cells[idx])
    }

    /// Overwrites the opinion at a bounded position.
    pub fn set(&mut self, column: usize, row: usize, opinion: Opinion) -> Result<(), SimError> {
        let idx = self.index(column, row)?;
        self.cells[idx] = opinion;
        Ok(())
    }

    /// Returns the von Neumann neighbors of a cell with toroidal wraparound.
    ///
    /// Only the queried cell is bounds-checked; its neighbors wrap to the
    /// opposite edge (`-1 -> N-1`, `N -> 0`).
    pub fn neighbors(&self, column: usize, row: usize) -> Result<Neighbors, SimError> {
        self.index(column, row)?;
        let n = self.size;
        let up = (row + n - 1) % n;
        let down = (row + 1) % n;
        let left = (column + n - 1) % n;
        let right = (column + 1) % n;

        Ok(Neighbors {
            up: self.cells[up * n + column],
            down: self.cells[down * n + column],
            left: self.cells[row * n + left],
            right: self.cells[row * n + right],
        })
    }

    /// Signed sum of every cell, in `[-N², N²]`.
    pub fn sum(&self) -> i64 {
        self.cells.iter().sum()
    }

    /// Number of cells holding `opinion`.
    pub fn count(&self, opinion: Opinion) -> usize {
        self.cells.iter().filter(|&&c| c == opinion).count()
    }

    /// `|sum| / N²`, in `[0, 1]`.
    pub fn magnetization(&self) -> f64 {
        self.sum().unsigned_abs() as f64 / self.cells.len() as f64
    }

    /// Row-major traversal yielding each cell exactly once.
    pub fn iter(&self) -> impl Iterator<Item = Opinion> + '_ {
        self.cells.iter().copied()
    }
}
