use core::fmt;
use grid_util::point::Point;

use crate::PathfinderError;

/// A rectangular grid of tile types, stored row-major. Tile types are plain integers whose
/// walkability and cost are configured on the [Pathfinder](crate::Pathfinder).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<i32>,
}

impl TileGrid {
    pub fn new(width: usize, height: usize, default_tile: i32) -> TileGrid {
        TileGrid {
            width,
            height,
            tiles: vec![default_tile; width * height],
        }
    }

    /// Builds a grid from rows, `rows[y][x]` being the tile at `(x, y)`. All rows must have the
    /// same, non-zero length.
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<TileGrid, PathfinderError> {
        let height = rows.len();
        let width = rows.first().map_or(0, |row| row.len());
        if width == 0 {
            return Err(PathfinderError::InvalidGrid {
                reason: "grid has no tiles".to_owned(),
            });
        }
        if let Some((y, row)) = rows.iter().enumerate().find(|(_, row)| row.len() != width) {
            return Err(PathfinderError::InvalidGrid {
                reason: format!("row {} has {} tiles, expected {}", y, row.len(), width),
            });
        }
        Ok(TileGrid {
            width,
            height,
            tiles: rows.into_iter().flatten().collect(),
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    /// True if the grid has no tiles, i.e. a width or height of 0.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }
    pub fn point_in_bounds(&self, p: Point) -> bool {
        self.in_bounds(p.x, p.y)
    }
    fn ix(&self, x: i32, y: i32) -> Option<usize> {
        self.in_bounds(x, y)
            .then(|| y as usize * self.width + x as usize)
    }
    /// The tile at `(x, y)`, [None] outside the grid.
    pub fn get(&self, x: i32, y: i32) -> Option<i32> {
        self.ix(x, y).map(|ix| self.tiles[ix])
    }
    pub fn get_point(&self, p: Point) -> Option<i32> {
        self.get(p.x, p.y)
    }
    /// Sets the tile at `(x, y)`; positions outside the grid are ignored.
    pub fn set(&mut self, x: i32, y: i32, tile: i32) {
        if let Some(ix) = self.ix(x, y) {
            self.tiles[ix] = tile;
        }
    }
    pub fn set_point(&mut self, p: Point, tile: i32) {
        self.set(p.x, p.y, tile);
    }
    /// Sets every tile of the `w` by `h` rectangle with top-left corner `(x, y)`.
    pub fn set_rect(&mut self, x: i32, y: i32, w: i32, h: i32, tile: i32) {
        for ry in y..y + h {
            for rx in x..x + w {
                self.set(rx, ry, tile);
            }
        }
    }
    /// Iterates over all tile types in row-major order.
    pub fn tile_types(&self) -> impl Iterator<Item = i32> + '_ {
        self.tiles.iter().copied()
    }
}

impl fmt::Display for TileGrid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for row in self.tiles.chunks(self.width.max(1)) {
            writeln!(f, "{:?}", row)?;
        }
        Ok(())
    }
}
