use fxhash::{FxHashMap, FxHashSet};
use grid_util::point::Point;
use log::{debug, info, trace, warn};
use smallvec::SmallVec;
use std::collections::VecDeque;

use crate::heuristics::{self, Heuristic};
use crate::instance::{
    InstanceId, OpenEntry, PathHandle, PathResult, ResultSink, SearchInstance, SearchProgress,
};
use crate::node::{NodeList, SearchNode};
use crate::{
    calculate_direction, Direction, PathfinderError, TileGrid, DIAGONAL_COST, N_SMALLVEC_SIZE,
    STRAIGHT_COST,
};

/// Neighbour offsets in expansion order: the four orthogonal moves followed by the four
/// diagonal ones.
const NEIGHBOUR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),
    (1, 0),
    (0, 1),
    (-1, 0),
    (-1, -1),
    (1, 1),
    (1, -1),
    (-1, 1),
];

/// The tile types a search may cross. Converts from a list of types or from a single type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AcceptableTiles(Vec<i32>);

impl AcceptableTiles {
    pub fn contains(&self, tile: i32) -> bool {
        self.0.contains(&tile)
    }
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

impl From<Vec<i32>> for AcceptableTiles {
    fn from(tiles: Vec<i32>) -> Self {
        AcceptableTiles(tiles)
    }
}

impl From<&[i32]> for AcceptableTiles {
    fn from(tiles: &[i32]) -> Self {
        AcceptableTiles(tiles.to_vec())
    }
}

impl<const N: usize> From<[i32; N]> for AcceptableTiles {
    fn from(tiles: [i32; N]) -> Self {
        AcceptableTiles(tiles.to_vec())
    }
}

impl From<i32> for AcceptableTiles {
    fn from(tile: i32) -> Self {
        AcceptableTiles(vec![tile])
    }
}

/// Search settings of a [Pathfinder]. Every field has a matching setter on the pathfinder;
/// a complete set can also be supplied up front with [Pathfinder::with_settings].
#[derive(Clone, Debug)]
pub struct Settings {
    /// Deliver results inline and resolve every queued search within one
    /// [calculate](Pathfinder::calculate) call.
    pub sync: bool,
    pub allow_diagonal_move: bool,
    /// Allow diagonal moves past blocked orthogonal neighbours.
    pub allow_corner_cutting: bool,
    /// Treat the grid as wrapping around at its edges.
    pub torus: bool,
    /// Upper bound on search steps per [calculate](Pathfinder::calculate) call.
    pub iterations_per_calculation: usize,
    pub orthogonal_heuristic: Heuristic,
    pub diagonal_heuristic: Heuristic,
    /// Multiplier on the heuristic. Values above 1 give weighted A*.
    pub heuristics_factor: f64,
    /// Cost added whenever the direction of travel changes.
    pub turn_penalty: f64,
    /// Multiplier per movement direction, indexed `[1 + dy][1 + dx]`.
    pub direction_costs: [[f64; 3]; 3],
}

impl Default for Settings {
    fn default() -> Settings {
        Settings {
            sync: false,
            allow_diagonal_move: false,
            allow_corner_cutting: true,
            torus: false,
            iterations_per_calculation: usize::MAX,
            orthogonal_heuristic: heuristics::manhattan,
            diagonal_heuristic: heuristics::octile,
            heuristics_factor: 1.0,
            turn_penalty: 0.0,
            direction_costs: [[1.0, 1.0, 1.0], [1.0, 0.0, 1.0], [1.0, 1.0, 1.0]],
        }
    }
}

/// Result of advancing a search by one step.
enum StepOutcome {
    Expanded,
    Finished(PathResult),
}

/// Read-only view on everything that decides how a search moves over the grid.
struct SearchRules<'a> {
    grid: &'a TileGrid,
    acceptable: &'a AcceptableTiles,
    settings: &'a Settings,
    tile_costs: &'a FxHashMap<i32, f64>,
    point_costs: &'a FxHashMap<Point, f64>,
    avoid_points: &'a FxHashSet<Point>,
    directional_conditions: &'a FxHashMap<Point, Direction>,
}

impl SearchRules<'_> {
    fn normalize(&self, p: Point) -> Point {
        normalize(self.grid, self.settings.torus, p)
    }

    fn direction(&self, dx: i32, dy: i32) -> Result<Direction, PathfinderError> {
        calculate_direction(
            self.grid.width(),
            self.grid.height(),
            dx,
            dy,
            self.settings.torus,
        )
    }

    /// Whether `target` may be entered from the adjacent `source`. A directional condition on
    /// the target replaces the tile type check.
    fn is_walkable(&self, target: Point, source: Point) -> Result<bool, PathfinderError> {
        let target = self.normalize(target);
        if let Some(condition) = self.directional_conditions.get(&target) {
            let from = self.direction(source.x - target.x, source.y - target.y)?;
            return Ok(from.intersects(*condition));
        }
        Ok(self
            .grid
            .get_point(target)
            .map_or(false, |tile| self.acceptable.contains(tile)))
    }

    fn tile_cost(&self, p: Point) -> f64 {
        if let Some(cost) = self.point_costs.get(&p) {
            return *cost;
        }
        self.grid
            .get_point(p)
            .and_then(|tile| self.tile_costs.get(&tile))
            .copied()
            .unwrap_or(1.0)
    }

    fn direction_cost(&self, dx: i32, dy: i32) -> f64 {
        self.settings.direction_costs[(1 + dy) as usize][(1 + dx) as usize]
    }

    /// Estimated cost from `p` to `goal`, measuring across the wrapped edges on a torus.
    fn heuristic(&self, p: Point, goal: Point) -> f64 {
        let mut dx = (p.x - goal.x).abs();
        let mut dy = (p.y - goal.y).abs();
        if self.settings.torus {
            let w = self.grid.width() as i32;
            let h = self.grid.height() as i32;
            dx = dx.min(p.x - goal.x + w).min(goal.x - p.x + w);
            dy = dy.min(p.y - goal.y + h).min(goal.y - p.y + h);
        }
        let estimate = if self.settings.allow_diagonal_move {
            self.settings.diagonal_heuristic
        } else {
            self.settings.orthogonal_heuristic
        };
        self.settings.heuristics_factor * estimate(dx as f64, dy as f64)
    }

    /// The moves available from `p`, with their base cost, before walkability is checked.
    fn candidate_moves(&self, p: Point) -> SmallVec<[(i32, i32, f64); N_SMALLVEC_SIZE]> {
        let count = if self.settings.allow_diagonal_move { 8 } else { 4 };
        NEIGHBOUR_OFFSETS[..count]
            .iter()
            .filter(|(dx, dy)| self.settings.torus || self.grid.in_bounds(p.x + dx, p.y + dy))
            .map(|&(dx, dy)| {
                let base = if dx != 0 && dy != 0 {
                    DIAGONAL_COST
                } else {
                    STRAIGHT_COST
                };
                (dx, dy, base)
            })
            .collect()
    }

    /// Advances the search by popping and expanding its most promising node.
    fn step(&self, instance: &mut SearchInstance) -> Result<StepOutcome, PathfinderError> {
        let Some(OpenEntry { index, .. }) = instance.open.pop() else {
            warn!(
                "Open set exhausted, {} is not reachable from {}",
                instance.end, instance.start
            );
            return Ok(StepOutcome::Finished(None));
        };
        let (point, cost_so_far, direction) = match instance.node_mut(index) {
            Some(node) => {
                node.list = NodeList::Closed;
                (node.point, node.cost_so_far, node.direction)
            }
            None => return Ok(StepOutcome::Expanded),
        };
        if point == instance.end {
            return Ok(StepOutcome::Finished(Some(instance.reconstruct_path(index))));
        }
        trace!("Expanding {} at cost {}", point, cost_so_far);
        for (dx, dy, base) in self.candidate_moves(point) {
            if dx != 0 && dy != 0 && !self.settings.allow_corner_cutting {
                let vertical = Point::new(point.x, point.y + dy);
                let horizontal = Point::new(point.x + dx, point.y);
                if !self.is_walkable(vertical, point)? || !self.is_walkable(horizontal, point)? {
                    continue;
                }
            }
            let target = self.normalize(Point::new(point.x + dx, point.y + dy));
            // Only happens on a torus that is a single tile wide or high.
            if target == point {
                continue;
            }
            if self.avoid_points.contains(&target) || !self.is_walkable(target, point)? {
                continue;
            }
            let move_direction = self.direction(target.x - point.x, target.y - point.y)?;
            let turn_cost = if move_direction != direction {
                self.settings.turn_penalty
            } else {
                0.0
            };
            let edge_cost = base * self.direction_cost(dx, dy) * self.tile_cost(target);
            let tentative = cost_so_far + edge_cost + turn_cost;
            self.relax(instance, index, target, tentative, move_direction);
        }
        Ok(StepOutcome::Expanded)
    }

    /// Records a route to `target` through the node at `parent`. New nodes are opened, open
    /// nodes are updated if the route is cheaper and closed nodes stay untouched.
    fn relax(
        &self,
        instance: &mut SearchInstance,
        parent: usize,
        target: Point,
        tentative: f64,
        direction: Direction,
    ) {
        match instance.nodes.get_index_of(&target) {
            None => {
                let heuristic = self.heuristic(target, instance.end);
                let node = SearchNode::new(Some(parent), target, tentative, heuristic, direction);
                let (index, _) = instance.insert_node(node);
                instance.open_node(index);
            }
            Some(index) => {
                let Some(node) = instance.node_mut(index) else {
                    return;
                };
                if node.list != NodeList::Open || tentative >= node.cost_so_far {
                    return;
                }
                node.cost_so_far = tentative;
                node.parent = Some(parent);
                node.direction = direction;
                let estimate = node.best_guess_distance();
                instance.open.update_item(OpenEntry { index, estimate });
            }
        }
    }
}

/// Wraps `p` into the grid on a torus. Empty grids have nothing to wrap into.
fn normalize(grid: &TileGrid, torus: bool, p: Point) -> Point {
    if torus && !grid.is_empty() {
        Point::new(
            p.x.rem_euclid(grid.width() as i32),
            p.y.rem_euclid(grid.height() as i32),
        )
    } else {
        p
    }
}

/// An A* pathfinder that spreads its work over many calls. Paths are requested with
/// [find_path](Self::find_path) and computed by repeatedly calling
/// [calculate](Self::calculate), typically once per frame, each call performing at most
/// [iterations_per_calculation](Settings::iterations_per_calculation) search steps.
///
/// ```
/// use sliced_pathfinding::{Pathfinder, Point, TileGrid};
///
/// let mut pathfinder = Pathfinder::new();
/// pathfinder.set_grid(TileGrid::from_rows(vec![vec![0, 0, 0], vec![1, 1, 0], vec![0, 0, 0]]).unwrap());
/// pathfinder.set_acceptable_tiles(0);
/// let handle = pathfinder.find_path_handle(Point::new(0, 0), Point::new(0, 2)).unwrap();
/// while !handle.is_ready() {
///     pathfinder.calculate().unwrap();
/// }
/// ```
pub struct Pathfinder {
    settings: Settings,
    grid: Option<TileGrid>,
    acceptable_tiles: Option<AcceptableTiles>,
    tile_costs: FxHashMap<i32, f64>,
    point_costs: FxHashMap<Point, f64>,
    avoid_points: FxHashSet<Point>,
    directional_conditions: FxHashMap<Point, Direction>,
    instances: FxHashMap<InstanceId, SearchInstance>,
    queue: VecDeque<InstanceId>,
    next_id: u64,
    deferred: Vec<(ResultSink, PathResult)>,
}

impl Default for Pathfinder {
    fn default() -> Pathfinder {
        Pathfinder::with_settings(Settings::default())
    }
}

impl Pathfinder {
    pub fn new() -> Pathfinder {
        Pathfinder::default()
    }

    pub fn with_settings(settings: Settings) -> Pathfinder {
        Pathfinder {
            settings,
            grid: None,
            acceptable_tiles: None,
            tile_costs: FxHashMap::default(),
            point_costs: FxHashMap::default(),
            avoid_points: FxHashSet::default(),
            directional_conditions: FxHashMap::default(),
            instances: FxHashMap::default(),
            queue: VecDeque::new(),
            next_id: 1,
            deferred: Vec::new(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }
    pub fn is_sync(&self) -> bool {
        self.settings.sync
    }
    pub fn diagonals_enabled(&self) -> bool {
        self.settings.allow_diagonal_move
    }
    pub fn torus_enabled(&self) -> bool {
        self.settings.torus
    }
    pub fn corner_cutting_enabled(&self) -> bool {
        self.settings.allow_corner_cutting
    }
    pub fn iterations_per_calculation(&self) -> usize {
        self.settings.iterations_per_calculation
    }

    /// Sets the tile types that can be walked on, either a list or a single type.
    pub fn set_acceptable_tiles<T: Into<AcceptableTiles>>(&mut self, tiles: T) {
        self.acceptable_tiles = Some(tiles.into());
    }

    pub fn acceptable_tiles(&self) -> Option<&[i32]> {
        self.acceptable_tiles.as_ref().map(AcceptableTiles::as_slice)
    }

    pub fn enable_sync(&mut self) {
        self.settings.sync = true;
    }
    pub fn disable_sync(&mut self) {
        self.settings.sync = false;
    }
    pub fn enable_diagonals(&mut self) {
        self.settings.allow_diagonal_move = true;
    }
    pub fn disable_diagonals(&mut self) {
        self.settings.allow_diagonal_move = false;
    }
    pub fn enable_torus(&mut self) {
        self.settings.torus = true;
    }
    pub fn disable_torus(&mut self) {
        self.settings.torus = false;
    }
    pub fn enable_corner_cutting(&mut self) {
        self.settings.allow_corner_cutting = true;
    }
    pub fn disable_corner_cutting(&mut self) {
        self.settings.allow_corner_cutting = false;
    }

    /// Installs the grid to search on. Tile types without a configured cost get cost 1.
    pub fn set_grid(&mut self, grid: TileGrid) {
        info!("Installing {}x{} grid", grid.width(), grid.height());
        for tile in grid.tile_types() {
            self.tile_costs.entry(tile).or_insert(1.0);
        }
        self.grid = Some(grid);
    }

    pub fn grid(&self) -> Option<&TileGrid> {
        self.grid.as_ref()
    }

    /// Sets the cost multiplier of moving onto tiles of the given type.
    pub fn set_tile_cost(&mut self, tile: i32, cost: f64) {
        self.tile_costs.insert(tile, cost);
    }

    /// Sets the cost multiplier of moving onto `(x, y)`, overriding the cost of its tile type.
    pub fn set_additional_point_cost(&mut self, x: i32, y: i32, cost: f64) {
        self.point_costs.insert(Point::new(x, y), cost);
    }
    pub fn remove_additional_point_cost(&mut self, x: i32, y: i32) {
        self.point_costs.remove(&Point::new(x, y));
    }
    pub fn remove_all_additional_point_costs(&mut self) {
        self.point_costs.clear();
    }

    /// Excludes `(x, y)` from every search regardless of its tile type.
    pub fn avoid_additional_point(&mut self, x: i32, y: i32) {
        self.avoid_points.insert(Point::new(x, y));
    }
    pub fn stop_avoiding_additional_point(&mut self, x: i32, y: i32) {
        self.avoid_points.remove(&Point::new(x, y));
    }
    pub fn stop_avoiding_all_additional_points(&mut self) {
        self.avoid_points.clear();
    }

    /// Restricts entering `(x, y)` to moves coming from the given directions, e.g.
    /// [Direction::TOP] only allows stepping down onto the tile from the one above it.
    /// The condition replaces the tile type check for that tile.
    pub fn set_directional_condition<I>(&mut self, x: i32, y: i32, directions: I)
    where
        I: IntoIterator<Item = Direction>,
    {
        let mask: Direction = directions.into_iter().collect();
        self.directional_conditions.insert(Point::new(x, y), mask);
    }
    pub fn remove_directional_condition(&mut self, x: i32, y: i32) {
        self.directional_conditions.remove(&Point::new(x, y));
    }
    pub fn remove_all_directional_conditions(&mut self) {
        self.directional_conditions.clear();
    }

    pub fn set_iterations_per_calculation(&mut self, iterations: usize) {
        self.settings.iterations_per_calculation = iterations;
    }

    /// Sets the heuristics used without and with diagonal movement. Missing ones fall back to
    /// [manhattan](heuristics::manhattan) and [octile](heuristics::octile).
    pub fn set_heuristics(&mut self, orthogonal: Option<Heuristic>, diagonal: Option<Heuristic>) {
        self.settings.orthogonal_heuristic = orthogonal.unwrap_or(heuristics::manhattan);
        self.settings.diagonal_heuristic = diagonal.unwrap_or(heuristics::octile);
    }

    /// Sets the cost multiplier per direction, indexed `[1 + dy][1 + dx]`; the centre is unused.
    pub fn set_direction_costs(&mut self, costs: [[f64; 3]; 3]) {
        self.settings.direction_costs = costs;
    }

    pub fn set_heuristics_factor(&mut self, factor: f64) {
        self.settings.heuristics_factor = factor;
    }

    /// Sets the cost added for every change of direction. Higher values give straighter paths.
    pub fn set_turn_penalty(&mut self, penalty: f64) {
        self.settings.turn_penalty = penalty;
    }

    /// Requests a path from `start` to `end`. The callback receives the path (start and end
    /// included) or [None] if the end cannot be reached. It is called exactly once, unless the
    /// search is cancelled: inline in sync mode, otherwise at the end of the next
    /// [calculate](Self::calculate) call.
    ///
    /// Returns the id of the queued search, or [None] if the request was answered without
    /// searching: an empty path if start and end coincide, no path if the end tile is not
    /// acceptable.
    pub fn find_path<F>(
        &mut self,
        start: Point,
        end: Point,
        callback: F,
    ) -> Result<Option<InstanceId>, PathfinderError>
    where
        F: FnOnce(PathResult) + 'static,
    {
        self.request(start, end, ResultSink::Callback(Box::new(callback)))
    }

    /// Like [find_path](Self::find_path), but the result is collected through the returned
    /// [PathHandle].
    pub fn find_path_handle(
        &mut self,
        start: Point,
        end: Point,
    ) -> Result<PathHandle, PathfinderError> {
        let handle = PathHandle::new();
        let id = self.request(start, end, ResultSink::Handle(handle.clone()))?;
        Ok(handle.with_id(id))
    }

    fn request(
        &mut self,
        start: Point,
        end: Point,
        sink: ResultSink,
    ) -> Result<Option<InstanceId>, PathfinderError> {
        let acceptable = self
            .acceptable_tiles
            .as_ref()
            .ok_or(PathfinderError::AcceptableTilesNotSet)?;
        let grid = self.grid.as_ref().ok_or(PathfinderError::GridNotSet)?;
        if grid.is_empty() {
            return Err(PathfinderError::OutOfBounds { start, end });
        }
        let start = normalize(grid, self.settings.torus, start);
        let end = normalize(grid, self.settings.torus, end);
        if !grid.point_in_bounds(start) || !grid.point_in_bounds(end) {
            return Err(PathfinderError::OutOfBounds { start, end });
        }
        if start == end {
            self.dispatch(sink, Some(Vec::new()));
            return Ok(None);
        }
        let end_acceptable = grid
            .get_point(end)
            .map_or(false, |tile| acceptable.contains(tile));
        if !end_acceptable {
            debug!("End tile {} is not acceptable", end);
            self.dispatch(sink, None);
            return Ok(None);
        }

        let mut instance = SearchInstance::new(start, end, sink);
        let (index, _) =
            instance.insert_node(SearchNode::new(None, start, 0.0, 0.0, Direction::STOP));
        instance.open_node(index);

        let id = InstanceId(self.next_id);
        self.next_id += 1;
        debug!("Queued search {} from {} to {}", id, start, end);
        self.instances.insert(id, instance);
        self.queue.push_back(id);
        Ok(Some(id))
    }

    /// Cancels a pending search. Its callback will never be called. Returns whether the search
    /// was still pending.
    pub fn cancel_path(&mut self, id: InstanceId) -> bool {
        // The queue entry is skipped once it reaches the front.
        let cancelled = self.instances.remove(&id).is_some();
        if cancelled {
            debug!("Cancelled search {}", id);
        }
        cancelled
    }

    pub fn is_pending(&self, id: InstanceId) -> bool {
        self.instances.contains_key(&id)
    }

    /// Number of searches that have not finished or been cancelled.
    pub fn pending_count(&self) -> usize {
        self.instances.len()
    }

    /// How far a pending search has come, [None] if it is not pending.
    pub fn progress(&self, id: InstanceId) -> Option<SearchProgress> {
        self.instances.get(&id).map(SearchInstance::progress)
    }

    /// Performs up to [iterations_per_calculation](Settings::iterations_per_calculation) search
    /// steps, always working on the oldest pending search, then delivers the results that are
    /// due. In sync mode all pending searches are resolved.
    pub fn calculate(&mut self) -> Result<(), PathfinderError> {
        let result = self.run_iterations();
        for (sink, path) in std::mem::take(&mut self.deferred) {
            sink.deliver(path);
        }
        result
    }

    fn run_iterations(&mut self) -> Result<(), PathfinderError> {
        if self.queue.is_empty() {
            return Ok(());
        }
        let (Some(grid), Some(acceptable)) = (self.grid.as_ref(), self.acceptable_tiles.as_ref())
        else {
            return Ok(());
        };
        let rules = SearchRules {
            grid,
            acceptable,
            settings: &self.settings,
            tile_costs: &self.tile_costs,
            point_costs: &self.point_costs,
            avoid_points: &self.avoid_points,
            directional_conditions: &self.directional_conditions,
        };
        // Sync mode ignores the budget and drains the queue.
        let mut iterations = 0;
        while self.settings.sync || iterations < self.settings.iterations_per_calculation {
            let Some(&id) = self.queue.front() else {
                break;
            };
            iterations += 1;
            let Some(instance) = self.instances.get_mut(&id) else {
                trace!("Dropping cancelled search {}", id);
                self.queue.pop_front();
                continue;
            };
            if let StepOutcome::Finished(path) = rules.step(instance)? {
                self.queue.pop_front();
                if let Some(instance) = self.instances.remove(&id) {
                    debug!(
                        "Search {} finished after discovering {} nodes, path found: {}",
                        id,
                        instance.nodes.len(),
                        path.is_some()
                    );
                    Self::route(&mut self.deferred, self.settings.sync, instance.sink, path);
                }
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, sink: ResultSink, path: PathResult) {
        Self::route(&mut self.deferred, self.settings.sync, sink, path);
    }

    /// Delivers inline in sync mode, otherwise holds the result back until the end of the
    /// next [calculate](Self::calculate).
    fn route(
        deferred: &mut Vec<(ResultSink, PathResult)>,
        sync: bool,
        sink: ResultSink,
        path: PathResult,
    ) {
        if sync {
            sink.deliver(path);
        } else {
            deferred.push((sink, path));
        }
    }
}
