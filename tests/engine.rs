use sliced_pathfinding::*;
use std::cell::RefCell;
use std::rc::Rc;
use std::task::Poll;

fn grid(rows: &[&[i32]]) -> TileGrid {
    TileGrid::from_rows(rows.iter().map(|row| row.to_vec()).collect()).unwrap()
}

fn points(coords: &[(i32, i32)]) -> Vec<Point> {
    coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

fn walled_map() -> TileGrid {
    grid(&[
        &[1, 1, 0, 1, 1],
        &[1, 1, 0, 1, 1],
        &[1, 1, 0, 1, 1],
        &[1, 1, 1, 1, 1],
        &[1, 1, 1, 1, 1],
    ])
}

fn diagonal_map() -> TileGrid {
    let mut grid = TileGrid::new(5, 5, 0);
    for i in 0..5 {
        grid.set(i, i, 1);
    }
    grid
}

fn pathfinder(grid: TileGrid, acceptable: impl Into<AcceptableTiles>) -> Pathfinder {
    let mut pathfinder = Pathfinder::new();
    pathfinder.set_grid(grid);
    pathfinder.set_acceptable_tiles(acceptable);
    pathfinder
}

/// Requests a path and runs calculate until it is delivered.
fn solve(pathfinder: &mut Pathfinder, start: (i32, i32), end: (i32, i32)) -> PathResult {
    let handle = pathfinder
        .find_path_handle(Point::new(start.0, start.1), Point::new(end.0, end.1))
        .unwrap();
    for _ in 0..10_000 {
        pathfinder.calculate().unwrap();
        if let Poll::Ready(result) = handle.poll() {
            return result;
        }
    }
    panic!("search from {:?} to {:?} did not finish", start, end);
}

type Captured = Rc<RefCell<Vec<PathResult>>>;

fn capture() -> (Captured, impl FnOnce(PathResult) + 'static) {
    let captured: Captured = Rc::new(RefCell::new(Vec::new()));
    let sink = captured.clone();
    (captured, move |path| sink.borrow_mut().push(path))
}

#[test]
fn finds_path_with_corner_cutting() {
    let mut pathfinder = pathfinder(diagonal_map(), 1);
    pathfinder.enable_diagonals();
    pathfinder.enable_corner_cutting();
    let path = solve(&mut pathfinder, (0, 0), (4, 4)).unwrap();
    assert_eq!(path.len(), 5);
    assert_eq!(path[0], Point::new(0, 0));
    assert_eq!(path[3], Point::new(3, 3));
}

#[test]
fn no_path_without_corner_cutting() {
    let mut pathfinder = pathfinder(diagonal_map(), [1]);
    pathfinder.enable_diagonals();
    pathfinder.disable_corner_cutting();
    assert_eq!(solve(&mut pathfinder, (0, 0), (4, 4)), None);
}

#[test]
fn finds_path_around_wall() {
    let mut pathfinder = pathfinder(walled_map(), vec![1]);
    let path = solve(&mut pathfinder, (1, 2), (3, 2)).unwrap();
    assert_eq!(path, points(&[(1, 2), (1, 3), (2, 3), (3, 3), (3, 2)]));
}

#[test]
fn avoids_additional_point() {
    let mut pathfinder = pathfinder(walled_map(), 1);
    pathfinder.avoid_additional_point(2, 3);
    let path = solve(&mut pathfinder, (1, 2), (3, 2)).unwrap();
    assert_eq!(path.len(), 7);
    assert_eq!(path[2], Point::new(1, 4));
    pathfinder.stop_avoiding_additional_point(2, 3);
    assert_eq!(solve(&mut pathfinder, (1, 2), (3, 2)).unwrap().len(), 5);
    pathfinder.avoid_additional_point(2, 3);
    pathfinder.avoid_additional_point(2, 4);
    assert_eq!(solve(&mut pathfinder, (1, 2), (3, 2)), None);
    pathfinder.stop_avoiding_all_additional_points();
    assert_eq!(solve(&mut pathfinder, (1, 2), (3, 2)).unwrap().len(), 5);
}

#[test]
fn walks_diagonal_on_open_grid() {
    let mut pathfinder = pathfinder(TileGrid::new(5, 5, 1), 1);
    pathfinder.enable_diagonals();
    let path = solve(&mut pathfinder, (0, 0), (4, 4)).unwrap();
    assert_eq!(path, points(&[(0, 0), (1, 1), (2, 2), (3, 3), (4, 4)]));
}

#[test]
fn moves_in_straight_line_with_diagonals() {
    let mut map = TileGrid::new(10, 10, 1);
    map.set(2, 1, 0);
    map.set(7, 1, 0);
    let mut pathfinder = pathfinder(map, 1);
    pathfinder.enable_diagonals();
    let path = solve(&mut pathfinder, (0, 0), (9, 0)).unwrap();
    assert_eq!(path.len(), 10);
    assert!(path.iter().all(|p| p.y == 0));
}

#[test]
fn same_start_and_end_gives_empty_path() {
    let mut pathfinder = pathfinder(walled_map(), 1);
    let (captured, callback) = capture();
    let id = pathfinder
        .find_path(Point::new(1, 2), Point::new(1, 2), callback)
        .unwrap();
    assert_eq!(id, None);
    pathfinder.calculate().unwrap();
    assert_eq!(*captured.borrow(), vec![Some(vec![])]);
}

#[test]
fn unacceptable_end_gives_no_path() {
    let mut pathfinder = pathfinder(walled_map(), 1);
    let handle = pathfinder
        .find_path_handle(Point::new(0, 0), Point::new(2, 0))
        .unwrap();
    assert_eq!(handle.id(), None);
    assert_eq!(pathfinder.pending_count(), 0);
    pathfinder.calculate().unwrap();
    assert_eq!(handle.poll(), Poll::Ready(None));
}

#[test]
fn unreachable_end_gives_no_path() {
    let map = grid(&[&[0, 1, 0], &[0, 1, 0], &[0, 1, 0]]);
    let mut pathfinder = pathfinder(map, 0);
    assert_eq!(solve(&mut pathfinder, (0, 0), (2, 2)), None);
    assert_eq!(pathfinder.pending_count(), 0);
}

#[test]
fn prefers_straight_paths() {
    let mut pathfinder = pathfinder(TileGrid::new(3, 3, 0), 0);
    pathfinder.enable_diagonals();
    let path = solve(&mut pathfinder, (0, 1), (2, 1)).unwrap();
    assert_eq!(path[1], Point::new(1, 1));
}

#[test]
fn prefers_diagonals_when_faster() {
    let mut pathfinder = pathfinder(TileGrid::new(20, 20, 0), 0);
    pathfinder.enable_diagonals();
    let path = solve(&mut pathfinder, (4, 4), (2, 2)).unwrap();
    assert_eq!(path.len(), 3);
    assert_eq!(path[1], Point::new(3, 3));
}

#[test]
fn follows_directional_conditions() {
    let mut pathfinder = pathfinder(grid(&[&[0, 1, 0], &[0, 0, 0], &[0, 0, 0]]), 0);
    pathfinder.enable_diagonals();
    pathfinder.set_directional_condition(2, 1, [Direction::TOP]);
    pathfinder.set_directional_condition(1, 2, [Direction::TOP_RIGHT]);
    pathfinder.set_directional_condition(2, 2, [Direction::LEFT]);
    pathfinder.set_directional_condition(1, 1, [Direction::BOTTOM_RIGHT]);
    pathfinder.set_directional_condition(0, 1, [Direction::RIGHT]);
    pathfinder.set_directional_condition(0, 0, [Direction::BOTTOM]);
    let path = solve(&mut pathfinder, (2, 0), (0, 0)).unwrap();
    assert_eq!(path.len(), 7);
    assert_eq!(path[3], Point::new(2, 2));

    pathfinder.remove_all_directional_conditions();
    let path = solve(&mut pathfinder, (2, 0), (0, 0)).unwrap();
    assert_eq!(path, points(&[(2, 0), (1, 1), (0, 0)]));
}

#[test]
fn follows_directional_conditions_without_corner_cutting() {
    let mut pathfinder = pathfinder(grid(&[&[0, 1, 0], &[0, 0, 0], &[0, 0, 0]]), 0);
    pathfinder.disable_corner_cutting();
    pathfinder.enable_diagonals();
    pathfinder.set_directional_condition(2, 1, [Direction::TOP]);
    pathfinder.set_directional_condition(1, 1, [Direction::RIGHT]);
    pathfinder.set_directional_condition(0, 1, [Direction::RIGHT]);
    pathfinder.set_directional_condition(0, 0, [Direction::BOTTOM]);
    let path = solve(&mut pathfinder, (2, 0), (0, 0)).unwrap();
    assert_eq!(path.len(), 5);
    assert_eq!(path[2], Point::new(1, 1));
}

#[test]
fn ids_are_distinct_and_positive() {
    let mut pathfinder = pathfinder(walled_map(), 1);
    let first = pathfinder
        .find_path(Point::new(1, 2), Point::new(3, 2), |_| {})
        .unwrap()
        .unwrap();
    let second = pathfinder
        .find_path(Point::new(3, 2), Point::new(1, 2), |_| {})
        .unwrap()
        .unwrap();
    assert!(first.get() > 0);
    assert!(second.get() > 0);
    assert_ne!(first, second);
}

#[test]
fn cancelled_search_never_calls_back() {
    let mut pathfinder = pathfinder(walled_map(), 1);
    let (cancelled, callback) = capture();
    let id = pathfinder
        .find_path(Point::new(1, 2), Point::new(3, 2), callback)
        .unwrap()
        .unwrap();
    let (kept, callback) = capture();
    pathfinder
        .find_path(Point::new(3, 2), Point::new(1, 2), callback)
        .unwrap();
    assert!(pathfinder.cancel_path(id));
    assert!(!pathfinder.cancel_path(id));
    assert!(!pathfinder.is_pending(id));
    pathfinder.calculate().unwrap();
    pathfinder.calculate().unwrap();
    assert!(cancelled.borrow().is_empty());
    assert_eq!(kept.borrow().len(), 1);
    assert_eq!(kept.borrow()[0].as_ref().map(Vec::len), Some(5));
}

#[test]
fn async_callbacks_wait_for_calculate() {
    let mut pathfinder = pathfinder(walled_map(), 1);
    let (captured, callback) = capture();
    pathfinder
        .find_path(Point::new(1, 2), Point::new(3, 2), callback)
        .unwrap();
    assert!(captured.borrow().is_empty());
    pathfinder.calculate().unwrap();
    assert_eq!(captured.borrow().len(), 1);
}

#[test]
fn sync_mode_delivers_inline() {
    let mut pathfinder = pathfinder(walled_map(), 1);
    pathfinder.enable_sync();
    assert!(pathfinder.is_sync());

    let (immediate, callback) = capture();
    pathfinder
        .find_path(Point::new(0, 0), Point::new(0, 0), callback)
        .unwrap();
    assert_eq!(*immediate.borrow(), vec![Some(vec![])]);

    // A budget of one step per call does not limit sync mode.
    pathfinder.set_iterations_per_calculation(1);
    let (searched, callback) = capture();
    pathfinder
        .find_path(Point::new(1, 2), Point::new(3, 2), callback)
        .unwrap();
    let (second, callback) = capture();
    pathfinder
        .find_path(Point::new(0, 0), Point::new(4, 4), callback)
        .unwrap();
    assert!(searched.borrow().is_empty());
    pathfinder.calculate().unwrap();
    assert_eq!(searched.borrow().len(), 1);
    assert_eq!(second.borrow().len(), 1);
    assert_eq!(pathfinder.pending_count(), 0);
}

/// Splitting a search over many calls does not change its outcome.
#[test]
fn sliced_search_matches_unlimited_search() {
    let map = grid(&[
        &[0, 0, 0, 0, 0, 0, 0],
        &[0, 1, 1, 1, 1, 1, 0],
        &[0, 0, 0, 0, 0, 1, 0],
        &[1, 1, 1, 1, 0, 1, 0],
        &[0, 0, 0, 0, 0, 1, 0],
        &[0, 1, 1, 1, 1, 1, 0],
        &[0, 0, 0, 0, 0, 0, 0],
    ]);
    let mut unlimited = pathfinder(map.clone(), 0);
    unlimited.enable_diagonals();
    let expected = solve(&mut unlimited, (0, 2), (0, 4));
    assert!(expected.is_some());

    let mut sliced = pathfinder(map, 0);
    sliced.enable_diagonals();
    sliced.set_iterations_per_calculation(1);
    let handle = sliced
        .find_path_handle(Point::new(0, 2), Point::new(0, 4))
        .unwrap();
    let mut calls = 0;
    let result = loop {
        sliced.calculate().unwrap();
        calls += 1;
        if let Poll::Ready(result) = handle.poll() {
            break result;
        }
    };
    assert!(calls > 1);
    assert_eq!(result, expected);
}

/// Searches are served one at a time in request order.
#[test]
fn queue_is_served_in_order() {
    let mut pathfinder = pathfinder(TileGrid::new(6, 6, 0), 0);
    pathfinder.set_iterations_per_calculation(2);
    let first = pathfinder
        .find_path_handle(Point::new(0, 0), Point::new(5, 5))
        .unwrap();
    let second = pathfinder
        .find_path_handle(Point::new(5, 5), Point::new(0, 0))
        .unwrap();
    let second_id = second.id().unwrap();
    pathfinder.calculate().unwrap();
    assert_eq!(pathfinder.progress(second_id).map(|p| p.closed), Some(0));
    while !first.is_ready() {
        pathfinder.calculate().unwrap();
    }
    assert!(pathfinder.is_pending(second_id));
    while !second.is_ready() {
        pathfinder.calculate().unwrap();
    }
    assert_eq!(pathfinder.pending_count(), 0);
}

#[test]
fn torus_wraps_around_edges() {
    let mut pathfinder = pathfinder(TileGrid::new(6, 4, 0), 0);
    pathfinder.enable_torus();
    assert_eq!(
        solve(&mut pathfinder, (0, 0), (5, 0)),
        Some(points(&[(0, 0), (5, 0)]))
    );
    assert_eq!(
        solve(&mut pathfinder, (0, 0), (0, 3)),
        Some(points(&[(0, 0), (0, 3)]))
    );
    pathfinder.enable_diagonals();
    assert_eq!(
        solve(&mut pathfinder, (0, 0), (5, 3)),
        Some(points(&[(0, 0), (5, 3)]))
    );
    // Coordinates outside the grid are wrapped before searching.
    assert_eq!(
        solve(&mut pathfinder, (-6, 4), (-1, 0)),
        Some(points(&[(0, 0), (5, 0)]))
    );
}

#[test]
fn turn_penalty_straightens_path() {
    let mut pathfinder = pathfinder(TileGrid::new(7, 7, 0), 0);
    let turns = |path: &[Point]| {
        path.windows(3)
            .filter(|w| (w[1].x - w[0].x, w[1].y - w[0].y) != (w[2].x - w[1].x, w[2].y - w[1].y))
            .count()
    };
    let free = solve(&mut pathfinder, (0, 0), (4, 3)).unwrap();
    assert_eq!(turns(&free), 3);
    pathfinder.set_turn_penalty(5.0);
    let penalised = solve(&mut pathfinder, (0, 0), (4, 3)).unwrap();
    assert_eq!(penalised.len(), free.len());
    assert_eq!(turns(&penalised), 1);
}

#[test]
fn tile_and_point_costs_steer_path() {
    let map = grid(&[&[0, 0, 0, 0, 0], &[0, 2, 2, 2, 0], &[0, 0, 0, 0, 0]]);
    let mut pathfinder = pathfinder(map, [0, 2]);
    assert_eq!(
        solve(&mut pathfinder, (0, 1), (4, 1)),
        Some(points(&[(0, 1), (1, 1), (2, 1), (3, 1), (4, 1)]))
    );
    pathfinder.set_tile_cost(2, 10.0);
    assert_eq!(
        solve(&mut pathfinder, (0, 1), (4, 1)).map(|p| p[1]),
        Some(Point::new(0, 0))
    );
    for x in 1..4 {
        pathfinder.set_additional_point_cost(x, 0, 10.0);
    }
    assert_eq!(
        solve(&mut pathfinder, (0, 1), (4, 1)).map(|p| p[1]),
        Some(Point::new(0, 2))
    );
    pathfinder.remove_all_additional_point_costs();
    assert_eq!(
        solve(&mut pathfinder, (0, 1), (4, 1)).map(|p| p[1]),
        Some(Point::new(0, 0))
    );
}

#[test]
fn direction_costs_discourage_moves() {
    let mut pathfinder = pathfinder(TileGrid::new(7, 7, 0), 0);
    pathfinder.enable_diagonals();
    pathfinder.set_direction_costs([[1.0, 1.0, 1.0], [1.0, 0.0, 5.0], [1.0, 1.0, 1.0]]);
    let path = solve(&mut pathfinder, (0, 1), (4, 1)).unwrap();
    assert_eq!(path.len(), 5);
    assert!(path.windows(2).all(|w| w[1].y != w[0].y));
}

#[test]
fn heuristic_choice_keeps_paths_optimal() {
    let mut pathfinder = pathfinder(walled_map(), 1);
    for name in heuristics::NAMES {
        let heuristic = heuristics::by_name(name).unwrap();
        pathfinder.set_heuristics(Some(heuristic), None);
        assert_eq!(solve(&mut pathfinder, (1, 2), (3, 2)).unwrap().len(), 5);
    }
}

#[test]
fn requests_are_validated() {
    let mut pathfinder = Pathfinder::new();
    let start = Point::new(0, 0);
    assert_eq!(
        pathfinder.find_path(start, start, |_| {}).unwrap_err(),
        PathfinderError::AcceptableTilesNotSet
    );
    pathfinder.set_acceptable_tiles(0);
    assert_eq!(
        pathfinder.find_path_handle(start, start).err(),
        Some(PathfinderError::GridNotSet)
    );
    pathfinder.set_grid(TileGrid::new(3, 3, 0));
    let end = Point::new(3, 1);
    assert_eq!(
        pathfinder.find_path(start, end, |_| {}).unwrap_err(),
        PathfinderError::OutOfBounds { start, end }
    );
    assert_eq!(pathfinder.pending_count(), 0);
}

#[test]
fn defaults() {
    let pathfinder = Pathfinder::new();
    assert!(!pathfinder.is_sync());
    assert!(!pathfinder.diagonals_enabled());
    assert!(!pathfinder.torus_enabled());
    assert!(pathfinder.corner_cutting_enabled());
    assert_eq!(pathfinder.iterations_per_calculation(), usize::MAX);
    assert!(pathfinder.grid().is_none());
    assert!(pathfinder.acceptable_tiles().is_none());
}

/// Paths from the engine can be fed straight into the post-processing helpers.
#[test]
fn post_processes_found_path() {
    let mut pathfinder = pathfinder(TileGrid::new(8, 8, 0), 0);
    let path = solve(&mut pathfinder, (0, 0), (5, 0)).unwrap();
    let compressed = compress_path(&path);
    assert_eq!(compressed, points(&[(0, 0), (5, 0)]));
    assert_eq!(expand_path(&compressed), path);
}

/// A single sync calculate resolves a search that needs many steps, whatever the budget.
#[test]
fn sync_mode_ignores_iteration_budget() {
    for budget in [0, 1, 3] {
        let mut pathfinder = pathfinder(TileGrid::new(5, 5, 0), 0);
        pathfinder.enable_sync();
        pathfinder.set_iterations_per_calculation(budget);
        let handle = pathfinder
            .find_path_handle(Point::new(0, 0), Point::new(4, 4))
            .unwrap();
        pathfinder.calculate().unwrap();
        assert!(handle.is_ready());
        assert_eq!(pathfinder.pending_count(), 0);
        assert_eq!(handle.poll().map(|path| path.map(|p| p.len())), Poll::Ready(Some(9)));
    }
}

/// Zero-sized grids reject every request instead of wrapping coordinates into nothing.
#[test]
fn empty_grid_rejects_requests() {
    let mut pathfinder = pathfinder(TileGrid::new(0, 3, 0), 0);
    pathfinder.enable_torus();
    let (start, end) = (Point::new(0, 0), Point::new(0, 1));
    assert_eq!(
        pathfinder.find_path(start, end, |_| {}).unwrap_err(),
        PathfinderError::OutOfBounds { start, end }
    );
    assert_eq!(pathfinder.pending_count(), 0);

    // A search queued before the grid is emptied ends without a path.
    pathfinder.set_grid(TileGrid::new(3, 3, 0));
    let handle = pathfinder.find_path_handle(start, end).unwrap();
    pathfinder.set_grid(TileGrid::new(3, 0, 0));
    pathfinder.calculate().unwrap();
    assert_eq!(handle.poll(), Poll::Ready(None));
}
