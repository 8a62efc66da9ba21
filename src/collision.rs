use std::fmt;

use serde::Serialize;

use crate::board::Board;
use crate::snake::Snake;

/// Kind of collision that ends a game.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize)]
pub enum Collision {
    Wall,
    SelfCollision,
}

impl fmt::Display for Collision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wall => f.write_str("wall"),
            Self::SelfCollision => f.write_str("self"),
        }
    }
}

/// Checks the snake's current head against the walls and its own body.
///
/// Runs after the move, so a growing tick compares the new head against a
/// body that still holds its old tail.
#[must_use]
pub fn detect(snake: &Snake, board: Board) -> Option<Collision> {
    if !board.contains(snake.head()) {
        return Some(Collision::Wall);
    }

    if snake.head_overlaps_body() {
        return Some(Collision::SelfCollision);
    }

    None
}
