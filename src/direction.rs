use core::fmt;
use std::ops::BitOr;

use crate::PathfinderError;

/// A set of compass directions stored as a bit mask. Single flags describe a movement
/// direction, combined flags are used for directional conditions on tiles.
///
/// The bit layout runs clockwise starting at the top:
/// ```text
/// TOP_LEFT (128) | TOP (1)    | TOP_RIGHT (2)
/// LEFT (64)      | STOP (0)   | RIGHT (4)
/// BOTTOM_LEFT(32)| BOTTOM(16) | BOTTOM_RIGHT (8)
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Direction(u8);

impl Direction {
    pub const STOP: Direction = Direction(0);
    pub const TOP: Direction = Direction(1);
    pub const TOP_RIGHT: Direction = Direction(2);
    pub const RIGHT: Direction = Direction(4);
    pub const BOTTOM_RIGHT: Direction = Direction(8);
    pub const BOTTOM: Direction = Direction(16);
    pub const BOTTOM_LEFT: Direction = Direction(32);
    pub const LEFT: Direction = Direction(64);
    pub const TOP_LEFT: Direction = Direction(128);

    /// All eight movement directions, clockwise from the top.
    pub const ALL: [Direction; 8] = [
        Direction::TOP,
        Direction::TOP_RIGHT,
        Direction::RIGHT,
        Direction::BOTTOM_RIGHT,
        Direction::BOTTOM,
        Direction::BOTTOM_LEFT,
        Direction::LEFT,
        Direction::TOP_LEFT,
    ];

    pub const fn bits(self) -> u8 {
        self.0
    }
    pub const fn is_stop(self) -> bool {
        self.0 == 0
    }
    /// True if every flag of `other` is also set in `self`.
    pub const fn contains(self, other: Direction) -> bool {
        self.0 & other.0 == other.0
    }
    /// True if `self` and `other` share at least one flag.
    pub const fn intersects(self, other: Direction) -> bool {
        self.0 & other.0 != 0
    }
    /// The unit step `(dx, dy)` of a single flag, with y growing downwards.
    pub fn delta(self) -> Option<(i32, i32)> {
        match self {
            Direction::TOP => Some((0, -1)),
            Direction::TOP_RIGHT => Some((1, -1)),
            Direction::RIGHT => Some((1, 0)),
            Direction::BOTTOM_RIGHT => Some((1, 1)),
            Direction::BOTTOM => Some((0, 1)),
            Direction::BOTTOM_LEFT => Some((-1, 1)),
            Direction::LEFT => Some((-1, 0)),
            Direction::TOP_LEFT => Some((-1, -1)),
            _ => None,
        }
    }
}

impl BitOr for Direction {
    type Output = Direction;
    fn bitor(self, rhs: Direction) -> Direction {
        Direction(self.0 | rhs.0)
    }
}

impl FromIterator<Direction> for Direction {
    fn from_iter<I: IntoIterator<Item = Direction>>(iter: I) -> Direction {
        iter.into_iter().fold(Direction::STOP, |mask, d| mask | d)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        const NAMES: [&str; 8] = [
            "TOP",
            "TOP_RIGHT",
            "RIGHT",
            "BOTTOM_RIGHT",
            "BOTTOM",
            "BOTTOM_LEFT",
            "LEFT",
            "TOP_LEFT",
        ];
        if self.is_stop() {
            return write!(f, "STOP");
        }
        let mut first = true;
        for (d, name) in Direction::ALL.iter().zip(NAMES) {
            if self.contains(*d) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{}", name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Maps a coordinate delta to the direction it points in.
/// ```text
/// -1, -1 | 0, -1  | 1, -1
/// -1,  0 | SOURCE | 1,  0
/// -1,  1 | 0,  1  | 1,  1
/// ```
/// With `torus` enabled a delta of `-(width - 1)` (or `-(height - 1)`) counts as a step of
/// `+1` across the wrapped edge, and vice versa.
pub fn calculate_direction(
    width: usize,
    height: usize,
    dx: i32,
    dy: i32,
    torus: bool,
) -> Result<Direction, PathfinderError> {
    let matches = |unit: i32, limit: usize, diff: i32| {
        unit == diff || (torus && (1 - limit as i32) * unit == diff)
    };
    Direction::ALL
        .into_iter()
        .find(|d| match d.delta() {
            Some((ux, uy)) => matches(ux, width, dx) && matches(uy, height, dy),
            None => false,
        })
        .ok_or(PathfinderError::InvalidDirection { dx, dy })
}
