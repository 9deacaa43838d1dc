use sliced_pathfinding::{compress_path, expand_path, smoothen_path, Pathfinder, Point, TileGrid};
use std::task::Poll;

/// This example illustrates the path helpers. A path is found on an open 8x8 grid, reduced to
/// its turning points with [compress_path], expanded back into single steps with [expand_path]
/// and finally straightened with [smoothen_path].
fn main() {
    let mut grid = TileGrid::new(8, 8, 0);
    grid.set(3, 3, 1);
    let mut pathfinder = Pathfinder::new();
    pathfinder.set_grid(grid.clone());
    pathfinder.set_acceptable_tiles(0);
    pathfinder.enable_diagonals();

    let handle = pathfinder
        .find_path_handle(Point::new(0, 0), Point::new(7, 4))
        .unwrap();
    while !handle.is_ready() {
        pathfinder.calculate().unwrap();
    }
    let Poll::Ready(Some(path)) = handle.poll() else {
        println!("No path exists");
        return;
    };
    println!("Found path: {:?}", path);
    let waypoints = compress_path(&path);
    println!("Waypoints: {:?}", waypoints);
    println!("Expanded: {:?}", expand_path(&waypoints));
    println!("Smoothed: {:?}", smoothen_path(&grid, &path, &[0]));
}
