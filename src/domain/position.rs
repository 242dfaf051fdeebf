use std::fmt;
use std::ops::{Add, Sub};

/// A grid cell as a (row, col) pair. Row 0 is the top row of the level.
///
/// Directions use negative row deltas for north, so the components are
/// signed even though reachable cells always have non-negative coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub row: i16,
    pub col: i16,
}

impl Position {
    pub const fn new(row: i16, col: i16) -> Self {
        Self { row, col }
    }

    pub fn manhattan_distance(&self, other: &Position) -> u32 {
        self.row.abs_diff(other.row) as u32 + self.col.abs_diff(other.col) as u32
    }
}

impl Add for Position {
    type Output = Position;

    fn add(self, other: Position) -> Position {
        Position::new(self.row + other.row, self.col + other.col)
    }
}

impl Sub for Position {
    type Output = Position;

    fn sub(self, other: Position) -> Position {
        Position::new(self.row - other.row, self.col - other.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// The four cardinal directions agents and boxes can move in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    /// The position delta of moving one cell in this direction.
    pub const fn delta(&self) -> Position {
        match self {
            Direction::North => Position::new(-1, 0),
            Direction::South => Position::new(1, 0),
            Direction::East => Position::new(0, 1),
            Direction::West => Position::new(0, -1),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Direction::North => 'N',
            Direction::South => 'S',
            Direction::East => 'E',
            Direction::West => 'W',
        };
        write!(f, "{letter}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_wise_arithmetic() {
        let pos = Position::new(3, 4);
        assert_eq!(pos + Direction::North.delta(), Position::new(2, 4));
        assert_eq!(pos + Direction::East.delta(), Position::new(3, 5));
        assert_eq!(pos - Direction::South.delta(), Position::new(2, 4));
    }

    #[test]
    fn positions_sort_row_major() {
        let mut positions = vec![
            Position::new(2, 1),
            Position::new(1, 5),
            Position::new(1, 2),
        ];
        positions.sort();
        assert_eq!(
            positions,
            vec![
                Position::new(1, 2),
                Position::new(1, 5),
                Position::new(2, 1),
            ]
        );
    }
}
