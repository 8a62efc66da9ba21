use rand::Rng;

use crate::board::Board;
use crate::snake::{Position, Snake};

/// Picks a cell uniformly at random among those the snake does not occupy.
///
/// Returns `None` when the snake covers the whole board; callers treat that
/// as the terminal board-filled condition instead of retrying forever.
#[must_use]
pub fn spawn_food<R: Rng + ?Sized>(rng: &mut R, board: Board, snake: &Snake) -> Option<Position> {
    let candidates = board.free_cells(|cell| snake.occupies(cell));
    if candidates.is_empty() {
        return None;
    }

    let index = rng.gen_range(0..candidates.len());
    Some(candidates[index])
}
