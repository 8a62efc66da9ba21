use crate::config::GridSize;
use crate::snake::Position;

/// Grid geometry and occupancy queries.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Board {
    size: GridSize,
}

impl Board {
    #[must_use]
    pub fn new(size: GridSize) -> Self {
        Self { size }
    }

    /// Returns true when `position` is a cell of this board.
    #[must_use]
    pub fn contains(self, position: Position) -> bool {
        position.is_within_bounds(self.size)
    }

    #[must_use]
    pub fn total_cells(self) -> usize {
        self.size.total_cells()
    }

    /// Iterates over every cell in row-major order.
    pub fn cells(self) -> impl Iterator<Item = Position> {
        let width = i32::from(self.size.width);
        let height = i32::from(self.size.height);
        (0..height).flat_map(move |y| (0..width).map(move |x| Position { x, y }))
    }

    /// Collects the cells for which `is_occupied` returns false.
    pub fn free_cells<F>(self, mut is_occupied: F) -> Vec<Position>
    where
        F: FnMut(Position) -> bool,
    {
        self.cells().filter(|cell| !is_occupied(*cell)).collect()
    }
}
