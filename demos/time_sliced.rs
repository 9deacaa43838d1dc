use sliced_pathfinding::{Pathfinder, Point, TileGrid};
use std::task::Poll;

// Several searches on a 64x64 grid with a long wall are spread over "frames", each frame
// allowing the pathfinder a fixed number of search steps.
fn main() {
    const ITERATIONS_PER_FRAME: usize = 50;
    let mut grid = TileGrid::new(64, 64, 0);
    grid.set_rect(32, 0, 1, 60, 1);

    let mut pathfinder = Pathfinder::new();
    pathfinder.set_grid(grid);
    pathfinder.set_acceptable_tiles(0);
    pathfinder.enable_diagonals();
    pathfinder.set_iterations_per_calculation(ITERATIONS_PER_FRAME);

    let goals = [Point::new(63, 0), Point::new(40, 10), Point::new(10, 63)];
    let mut handles = goals
        .iter()
        .map(|goal| pathfinder.find_path_handle(Point::new(0, 0), *goal).unwrap())
        .collect::<Vec<_>>();

    let mut frame = 0;
    while !handles.is_empty() {
        frame += 1;
        pathfinder.calculate().unwrap();
        handles.retain(|handle| match handle.poll() {
            Poll::Ready(path) => {
                let id = handle.id().map_or("-".to_owned(), |id| id.to_string());
                match path {
                    Some(path) => println!(
                        "frame {}: search {} done, {} steps to {:?}",
                        frame,
                        id,
                        path.len() - 1,
                        path.last()
                    ),
                    None => println!("frame {}: search {} found no path", frame, id),
                }
                false
            }
            Poll::Pending => true,
        });
    }
}
