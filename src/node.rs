use grid_util::point::Point;

use crate::Direction;

/// Which list a node currently belongs to within its search instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeList {
    Unvisited,
    Open,
    Closed,
}

/// The search record of a single tile. The parent is an index into the node arena of the
/// instance that owns this node, [None] for the start node.
#[derive(Clone, Debug)]
pub struct SearchNode {
    pub parent: Option<usize>,
    pub point: Point,
    pub cost_so_far: f64,
    pub heuristic: f64,
    pub direction: Direction,
    pub list: NodeList,
}

impl SearchNode {
    pub fn new(
        parent: Option<usize>,
        point: Point,
        cost_so_far: f64,
        heuristic: f64,
        direction: Direction,
    ) -> SearchNode {
        SearchNode {
            parent,
            point,
            cost_so_far,
            heuristic,
            direction,
            list: NodeList::Unvisited,
        }
    }

    /// Best guess of the total cost of a path running through this node.
    pub fn best_guess_distance(&self) -> f64 {
        self.cost_so_far + self.heuristic
    }
}
