use sliced_pathfinding::{Pathfinder, Point, TileGrid};

// In this example a path is found on a grid with shape
// #####
// #S  #
// # # #
// #  E#
// #####
// S marks the start
// E marks the end
// Tile type 1 marks walls, 0 marks floor.
fn main() {
    let mut grid = TileGrid::new(5, 5, 1);
    grid.set_rect(1, 1, 3, 3, 0);
    grid.set(2, 2, 1);
    println!("{}", grid);

    let mut pathfinder = Pathfinder::new();
    pathfinder.set_grid(grid);
    pathfinder.set_acceptable_tiles(0);
    pathfinder.enable_sync();

    let start = Point::new(1, 1);
    let end = Point::new(3, 3);
    pathfinder
        .find_path(start, end, |path| match path {
            Some(path) => {
                println!("A path has been found:");
                for p in path {
                    println!("{:?}", p);
                }
            }
            None => println!("No path exists"),
        })
        .unwrap();
    pathfinder.calculate().unwrap();
}
