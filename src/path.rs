//! Post-processing of paths: rasterizing lines, expanding waypoints into step-by-step paths,
//! dropping redundant waypoints and straightening detours.
use grid_util::point::Point;
use itertools::Itertools;

use crate::TileGrid;

/// All grid cells on the line from `(x0, y0)` to `(x1, y1)`, both ends included, following
/// [Bresenham's algorithm](https://en.wikipedia.org/wiki/Bresenham%27s_line_algorithm#All_cases).
/// Consecutive cells are 8-connected neighbours.
pub fn interpolate(x0: i32, y0: i32, x1: i32, y1: i32) -> Vec<Point> {
    let dx = (x1 - x0).abs();
    let dy = (y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx - dy;
    let (mut x, mut y) = (x0, y0);
    let mut line = Vec::with_capacity((dx.max(dy) + 1) as usize);
    loop {
        line.push(Point::new(x, y));
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 > -dy {
            err -= dy;
            x += sx;
        }
        if e2 < dx {
            err += dx;
            y += sy;
        }
    }
    line
}

/// Turns waypoints into a path on the grid which can be followed step by step, by
/// interpolating between every pair of consecutive waypoints. Paths with fewer than two points
/// expand to nothing.
pub fn expand_path(path: &[Point]) -> Vec<Point> {
    let mut expanded = Vec::new();
    if path.len() < 2 {
        return expanded;
    }
    for (a, b) in path.iter().tuple_windows() {
        let line = interpolate(a.x, a.y, b.x, b.y);
        // The end of each segment is the start of the next one.
        if let Some((_, init)) = line.split_last() {
            expanded.extend_from_slice(init);
        }
    }
    expanded.extend(path.last());
    expanded
}

fn unit_direction(from: &Point, to: &Point) -> (f64, f64) {
    let dx = (to.x - from.x) as f64;
    let dy = (to.y - from.y) as f64;
    let len = (dx * dx + dy * dy).sqrt();
    (dx / len, dy / len)
}

/// Removes the points at which the path keeps its direction, leaving the start, the end and
/// every point where it turns. Paths of fewer than three points are returned as they are.
pub fn compress_path(path: &[Point]) -> Vec<Point> {
    if path.len() < 3 {
        return path.to_vec();
    }
    let mut compressed = vec![path[0]];
    for (a, b, c) in path.iter().tuple_windows() {
        if unit_direction(a, b) != unit_direction(b, c) {
            compressed.push(*b);
        }
    }
    compressed.extend(path.last());
    compressed
}

/// Straightens a step-by-step path without changing its length. For every point the
/// direction of travel is extended by one step; if a later point can be reached from there
/// by a straight or diagonal line that crosses exactly as many walkable cells as the path
/// currently spends between them, that stretch of the path is replaced by the line.
///
/// `grid` is indexed as `(x, y)` and `walkable` lists the tile types that may be crossed.
/// The input is left untouched.
pub fn smoothen_path(grid: &TileGrid, path: &[Point], walkable: &[i32]) -> Vec<Point> {
    let mut smoothed = path.to_vec();
    let is_walkable = |p: &Point| {
        grid.get_point(*p)
            .map_or(false, |tile| walkable.contains(&tile))
    };
    let mut i = 1;
    while i + 1 < smoothed.len() {
        let prev = smoothed[i - 1];
        let cur = smoothed[i];
        let (dx, dy) = (cur.x - prev.x, cur.y - prev.y);
        let test = Point::new(cur.x + dx, cur.y + dy);
        let trend = (dx * dy).signum();
        for j in i + 2..smoothed.len() {
            let target = smoothed[j];
            let (cur_dx, cur_dy) = (test.x - target.x, test.y - target.y);
            let on_line = test.x == target.x || test.y == target.y || cur_dx.abs() == cur_dy.abs();
            let line_trend = (cur_dx * cur_dy).signum();
            if !on_line || trend * line_trend == -1 || (trend == 0 && line_trend == 0) {
                continue;
            }
            let line = interpolate(test.x, test.y, target.x, target.y);
            if line.len() == j - i && line.iter().all(|p| is_walkable(p)) {
                smoothed.splice(i + 1..=j, line);
                break;
            }
        }
        i += 1;
    }
    smoothed
}
