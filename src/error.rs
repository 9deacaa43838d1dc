use grid_util::point::Point;
use thiserror::Error;

/// Errors reported by the pathfinder. Unreachable goals are not errors, they are reported
/// as a `None` path.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum PathfinderError {
    /// [find_path](crate::Pathfinder::find_path) was called before a grid was installed.
    #[error("a path cannot be requested before a grid has been set")]
    GridNotSet,

    /// [find_path](crate::Pathfinder::find_path) was called before any acceptable tiles were set.
    #[error("a path cannot be requested before acceptable tiles have been set")]
    AcceptableTilesNotSet,

    /// The start or end point lies outside the grid, or the grid has no tiles.
    #[error(
        "start ({}, {}) or end ({}, {}) lies outside the grid",
        .start.x, .start.y, .end.x, .end.y
    )]
    OutOfBounds { start: Point, end: Point },

    /// A grid could not be built from the given rows.
    #[error("invalid grid: {reason}")]
    InvalidGrid { reason: String },

    /// A coordinate delta that is not one of the eight unit steps.
    #[error("({dx}, {dy}) is not a valid direction delta")]
    InvalidDirection { dx: i32, dy: i32 },
}
