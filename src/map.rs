use anyhow::{anyhow, bail, Context};
use rand::prelude::*;
use std::fs;

use crate::algorithm::WalkabilityOracle;
use crate::common::{Cell, SearchSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tile {
    passable: bool,
}

impl Tile {
    pub fn is_passable(&self) -> bool {
        self.passable
    }
}

/// Rectangular grid of walkable and blocked tiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Map {
    pub height: usize,
    pub width: usize,
    pub grid: Vec<Vec<Tile>>,
}

impl Map {
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path).with_context(|| format!("failed to read map {path}"))?;
        Self::parse(&text).with_context(|| format!("error with map file: {path}"))
    }

    /// Parse a MovingAI style map (`type`, `height`, `width`, `map` header
    /// followed by rows) or a bare block of rows.
    ///
    /// `.`, `G` and `S` are walkable, every other character is an obstacle.
    pub fn parse(text: &str) -> anyhow::Result<Self> {
        let mut lines = text.lines().map(str::trim_end).peekable();
        let mut declared = (None, None);

        if lines.peek().is_some_and(|line| line.starts_with("type")) {
            let _type = lines.next();
            for line in lines.by_ref() {
                let mut parts = line.split_whitespace();
                match (parts.next(), parts.next()) {
                    (Some("map"), None) => break,
                    (Some("height"), Some(value)) => {
                        declared.0 = Some(value.parse::<usize>().context("bad height")?)
                    }
                    (Some("width"), Some(value)) => {
                        declared.1 = Some(value.parse::<usize>().context("bad width")?)
                    }
                    _ => bail!("unexpected map header line: {line:?}"),
                }
            }
        }

        let grid: Vec<Vec<Tile>> = lines
            .filter(|line| !line.is_empty())
            .map(|line| {
                line.chars()
                    .map(|ch| Tile {
                        passable: matches!(ch, '.' | 'G' | 'S'),
                    })
                    .collect()
            })
            .collect();

        let height = grid.len();
        let width = grid.first().map_or(0, Vec::len);
        if height == 0 || width == 0 {
            bail!("map has no cells");
        }
        if let Some(row) = grid.iter().position(|row| row.len() != width) {
            bail!("row {row} has width {}, expected {width}", grid[row].len());
        }
        if declared.0.is_some_and(|h| h != height) || declared.1.is_some_and(|w| w != width) {
            return Err(anyhow!(
                "header declares {:?}x{:?} but map body is {height}x{width}",
                declared.0,
                declared.1
            ));
        }

        Ok(Map {
            height,
            width,
            grid,
        })
    }

    /// Every cell is an obstacle with probability `obstacle_chance`.
    pub fn random<R: Rng + ?Sized>(
        height: usize,
        width: usize,
        obstacle_chance: f64,
        rng: &mut R,
    ) -> anyhow::Result<Self> {
        if !(0.0..=1.0).contains(&obstacle_chance) {
            bail!("obstacle chance {obstacle_chance} is not a probability");
        }
        let grid = (0..height)
            .map(|_| {
                (0..width)
                    .map(|_| Tile {
                        passable: !rng.gen_bool(obstacle_chance),
                    })
                    .collect()
            })
            .collect();
        Ok(Map {
            height,
            width,
            grid,
        })
    }

    /// Cells outside the grid are never passable.
    pub fn is_passable(&self, row: usize, col: usize) -> bool {
        self.tile(row, col).is_some_and(Tile::is_passable)
    }

    pub fn set_passable(&mut self, row: usize, col: usize, passable: bool) -> anyhow::Result<()> {
        let (height, width) = (self.height, self.width);
        let tile = self
            .grid
            .get_mut(row)
            .and_then(|tiles| tiles.get_mut(col))
            .ok_or_else(|| anyhow!("cell ({row}, {col}) is outside the {height}x{width} map"))?;
        tile.passable = passable;
        Ok(())
    }

    fn tile(&self, row: usize, col: usize) -> Option<&Tile> {
        self.grid.get(row)?.get(col)
    }

    pub fn walkable_cells(&self) -> Vec<Cell> {
        (0..self.height)
            .flat_map(|row| (0..self.width).map(move |col| (row, col)))
            .filter(|&(row, col)| self.is_passable(row, col))
            .collect()
    }

    /// Two distinct walkable cells, or `None` if the map has fewer than two.
    pub fn random_endpoints<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<(Cell, Cell)> {
        let cells = self.walkable_cells();
        if cells.len() < 2 {
            return None;
        }
        let mut picked = cells.choose_multiple(rng, 2);
        Some((*picked.next()?, *picked.next()?))
    }

    /// ASCII frame of the grid with search state and path overlaid.
    pub fn render(
        &self,
        endpoints: (Cell, Cell),
        snapshot: Option<&SearchSnapshot>,
        path: Option<&[Cell]>,
    ) -> String {
        let mut canvas: Vec<Vec<char>> = self
            .grid
            .iter()
            .map(|row| {
                row.iter()
                    .map(|tile| if tile.is_passable() { '.' } else { '@' })
                    .collect()
            })
            .collect();

        let mut paint = |cells: &[Cell], ch: char| {
            for &(row, col) in cells {
                if row < self.height && col < self.width {
                    canvas[row][col] = ch;
                }
            }
        };
        if let Some(snapshot) = snapshot {
            paint(snapshot.open(), 'o');
            paint(snapshot.closed(), 'x');
        }
        if let Some(path) = path {
            paint(path, '*');
        }
        paint(&[endpoints.0], 'S');
        paint(&[endpoints.1], 'E');

        canvas
            .into_iter()
            .map(|row| row.into_iter().collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl WalkabilityOracle for Map {
    fn is_walkable(&self, row: usize, col: usize) -> bool {
        self.is_passable(row, col)
    }

    fn bounds(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::PathResult;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_read_map() {
        let map = Map::from_file("map_file/test/test.map").unwrap();

        assert_eq!(map.height, 3);
        assert_eq!(map.width, 3);
        assert_eq!(map.bounds(), (3, 3));

        assert!(map.is_passable(0, 0));
        assert!(!map.is_passable(1, 1));
        assert!(!map.is_walkable(1, 1));
        assert!(!map.is_walkable(3, 0));
        assert!(!map.is_walkable(0, 3));
        assert_eq!(map.walkable_cells().len(), 8);
    }

    #[test]
    fn test_parse_rejects_bad_maps() {
        assert!(Map::parse("").is_err());
        assert!(Map::parse("...\n..").is_err());
        assert!(Map::parse("type octile\nheight 2\nwidth 3\nmap\n...").is_err());
        assert!(Map::parse("type octile\ndepth 2\nmap\n...").is_err());
        assert!(Map::from_file("map_file/test/missing.map").is_err());
    }

    #[test]
    fn test_parse_terrain_characters() {
        let map = Map::parse("S.T\nG@W").unwrap();
        assert_eq!(
            map.walkable_cells(),
            vec![(0, 0), (0, 1), (1, 0)]
        );
    }

    #[test]
    fn test_random_map() {
        let mut rng = StdRng::seed_from_u64(0);
        let map = Map::random(10, 20, 0.3, &mut rng).unwrap();
        assert_eq!(map.bounds(), (10, 20));
        let walkable = map.walkable_cells().len();
        assert!(walkable > 100 && walkable < 200);

        let empty = Map::random(4, 4, 0.0, &mut rng).unwrap();
        assert_eq!(empty.walkable_cells().len(), 16);
        let full = Map::random(4, 4, 1.0, &mut rng).unwrap();
        assert!(full.walkable_cells().is_empty());

        let (start, end) = map.random_endpoints(&mut rng).unwrap();
        assert_ne!(start, end);
        assert!(map.is_walkable(start.0, start.1));
        assert!(map.is_walkable(end.0, end.1));
    }

    #[test]
    fn test_random_endpoints_needs_two_cells() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut map = Map::parse("@@\n@.").unwrap();
        assert!(map.random_endpoints(&mut rng).is_none());
        map.set_passable(0, 0, true).unwrap();
        assert_eq!(map.random_endpoints(&mut rng).map(|(s, e)| s != e), Some(true));
    }

    #[test]
    fn test_random_map_rejects_bad_chance() {
        let mut rng = StdRng::seed_from_u64(2);
        for chance in [-0.1, 1.5, f64::NAN] {
            assert!(Map::random(3, 3, chance, &mut rng).is_err(), "{chance}");
        }
    }

    #[test]
    fn test_out_of_bounds_cells() {
        let mut map = Map::parse("..\n..").unwrap();
        assert!(!map.is_passable(2, 0));
        assert!(!map.is_passable(0, 2));
        assert!(!map.is_passable(usize::MAX, usize::MAX));

        assert!(map.set_passable(2, 0, false).is_err());
        assert!(map.set_passable(0, 5, false).is_err());
        assert_eq!(map.walkable_cells().len(), 4);

        map.set_passable(1, 1, false).unwrap();
        assert!(!map.is_walkable(1, 1));
    }

    #[test]
    fn test_render() {
        let map = Map::parse("...\n.@.\n...").unwrap();
        let snapshot = SearchSnapshot::Finished {
            result: PathResult::NotFound,
            open: vec![(0, 2)],
            closed: vec![(0, 0), (0, 1)],
        };
        let frame = map.render(((0, 0), (2, 2)), Some(&snapshot), Some(&[(0, 1), (1, 2)]));
        assert_eq!(frame, "S*o\n.@*\n..E");
    }
}
