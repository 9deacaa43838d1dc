//! # sliced_pathfinding
//!
//! Incremental [A*](https://en.wikipedia.org/wiki/A*_search_algorithm) pathfinding on tile
//! grids. Searches are queued with [Pathfinder::find_path] and advanced a bounded number of
//! steps per [Pathfinder::calculate] call, so that pathfinding can be spread over the frames of
//! a game loop. Supports weighted tiles, per-point costs and exclusions, directional entry
//! conditions, diagonal movement with optional corner cutting, turn penalties and wrapping
//! (torus) grids. Paths can be post-processed with [compress_path], [expand_path] and
//! [smoothen_path].
mod direction;
mod error;
pub mod heap;
pub mod heuristics;
mod instance;
mod node;
mod path;
mod pathfinder;
mod tile_grid;

pub use direction::{calculate_direction, Direction};
pub use error::PathfinderError;
pub use grid_util::point::Point;
pub use heuristics::Heuristic;
pub use instance::{InstanceId, PathHandle, PathResult, SearchProgress};
pub use path::{compress_path, expand_path, interpolate, smoothen_path};
pub use pathfinder::{AcceptableTiles, Pathfinder, Settings};
pub use tile_grid::TileGrid;

/// Base cost of an orthogonal move.
pub const STRAIGHT_COST: f64 = 1.0;
/// Base cost of a diagonal move.
pub const DIAGONAL_COST: f64 = std::f64::consts::SQRT_2;

const N_SMALLVEC_SIZE: usize = 8;
