use std::fs;
use std::path::Path;

use rand::Rng;

use crate::error::GridError;
use crate::game::types::{Cell, CellKind, Coord, Orientation, Owner};

const EMPTY_CHAR: char = '_';
const WALL_CHAR: char = 'W';
const SELF_CHAR: char = 'X';
const OPPONENT_CHAR: char = 'O';
const BATTERY_CHAR: char = 'B';
const LASER_CHAR: char = 'L';

/// Rectangular cell array that wraps at both edges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<Cell>>,
}

impl Grid {
    /// An all-empty grid.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            cells: vec![vec![Cell::EMPTY; width]; height],
        }
    }

    /// Generate a grid with an optional border and `walls` random straight segments.
    pub fn random<R: Rng + ?Sized>(
        width: usize,
        height: usize,
        walls: usize,
        enclosed: bool,
        rng: &mut R,
    ) -> Self {
        let mut grid = Grid::new(width, height);
        if width == 0 || height == 0 {
            return grid;
        }
        let cells = &mut grid.cells;

        if enclosed {
            for x in 0..width {
                cells[0][x] = Cell::WALL;
                cells[height - 1][x] = Cell::WALL;
            }
            for row in cells.iter_mut().take(height - 1).skip(1) {
                row[0] = Cell::WALL;
                row[width - 1] = Cell::WALL;
            }
        }

        for _ in 0..walls {
            if rng.random_bool(0.5) {
                // horizontal
                if width / 2 == 0 {
                    continue;
                }
                let length = rng.random_range(0..width / 2);
                let start = rng.random_range(0..width - length);
                let y = rng.random_range(0..height);
                for x in start..start + length {
                    cells[y][x] = Cell::WALL;
                }
            } else {
                // vertical
                if height / 2 == 0 {
                    continue;
                }
                let length = rng.random_range(0..height / 2);
                let start = rng.random_range(0..height - length);
                let x = rng.random_range(0..width);
                for row in cells.iter_mut().skip(start).take(length) {
                    row[x] = Cell::WALL;
                }
            }
        }
        grid
    }

    /// Parse a fixed layout: `_` for empty, `W` for wall, one row per line.
    /// Blank lines are skipped.
    pub fn parse(layout: &str) -> Result<Self, GridError> {
        let mut cells: Vec<Vec<Cell>> = Vec::new();
        let mut width = 0;

        for (index, line) in layout.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            let line_no = index + 1;
            let found = line.chars().count();
            if cells.is_empty() {
                width = found;
            } else if found != width {
                return Err(GridError::RaggedRow {
                    line: line_no,
                    expected: width,
                    found,
                });
            }

            let row = line
                .chars()
                .map(|ch| match ch {
                    EMPTY_CHAR => Ok(Cell::EMPTY),
                    WALL_CHAR => Ok(Cell::WALL),
                    _ => Err(GridError::UnexpectedChar { ch, line: line_no }),
                })
                .collect::<Result<Vec<_>, _>>()?;
            cells.push(row);
        }

        if cells.is_empty() {
            return Err(GridError::EmptyLayout);
        }
        Ok(Self { cells })
    }

    pub fn load_from_file(path: &Path) -> Result<Self, GridError> {
        let layout = fs::read_to_string(path)?;
        Self::parse(&layout)
    }

    pub fn width(&self) -> usize {
        self.cells.first().map_or(0, Vec::len)
    }

    pub fn height(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, coord: Coord) -> bool {
        coord.x < self.width() && coord.y < self.height()
    }

    /// Read a cell. Out-of-range coordinates are an error, never a default cell.
    pub fn cell_at(&self, coord: Coord) -> Result<Cell, GridError> {
        self.cells
            .get(coord.y)
            .and_then(|row| row.get(coord.x))
            .copied()
            .ok_or(GridError::OutOfBounds(coord))
    }

    /// Overwrite a cell. Out-of-range writes are ignored.
    pub fn set_cell(&mut self, coord: Coord, cell: Cell) {
        if let Some(slot) = self.cells.get_mut(coord.y).and_then(|row| row.get_mut(coord.x)) {
            *slot = cell;
        }
    }

    /// Flag or unflag an explosion. Out-of-range writes are ignored.
    pub fn set_exploding(&mut self, coord: Coord, exploding: bool) {
        if let Some(slot) = self.cells.get_mut(coord.y).and_then(|row| row.get_mut(coord.x)) {
            slot.exploding = exploding;
        }
    }

    /// Reset every non-wall cell to empty and drop all explosion flags.
    pub fn clear_objects(&mut self) {
        for cell in self.cells.iter_mut().flatten() {
            *cell = if cell.is_wall() { Cell::WALL } else { Cell::EMPTY };
        }
    }

    pub fn cells(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    /// The neighbouring coordinate in `orientation`, wrapping at the edges.
    pub fn relative_to(&self, coord: Coord, orientation: Orientation) -> Coord {
        let (dx, dy) = orientation.delta();
        Coord {
            x: wrap(coord.x, dx, self.width()),
            y: wrap(coord.y, dy, self.height()),
        }
    }

    /// The neighbouring coordinate and the cell found there.
    ///
    /// Panics when `coord` lies outside the grid; callers only pass coordinates
    /// of entities already on it.
    pub fn cell_relative_to(&self, coord: Coord, orientation: Orientation) -> (Cell, Coord) {
        let target = self.relative_to(coord, orientation);
        (self.cells[target.y][target.x], target)
    }

    /// Render the grid as seen by `owner`: `X` for its own player, `O` for any other.
    pub fn serialize_for(&self, owner: Owner) -> String {
        let mut out = String::with_capacity((self.width() + 1) * self.height());
        for row in &self.cells {
            for cell in row {
                let ch = match cell.kind {
                    CellKind::Empty => EMPTY_CHAR,
                    CellKind::Wall => WALL_CHAR,
                    CellKind::Player if cell.owner == owner => SELF_CHAR,
                    CellKind::Player => OPPONENT_CHAR,
                    CellKind::Battery => BATTERY_CHAR,
                    CellKind::Laser => LASER_CHAR,
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }

    /// Terrain only, in the layout format accepted by [`Grid::parse`].
    pub fn layout(&self) -> String {
        let mut out = String::new();
        for row in &self.cells {
            for cell in row {
                out.push(if cell.is_wall() { WALL_CHAR } else { EMPTY_CHAR });
            }
            out.push('\n');
        }
        out
    }
}

fn wrap(value: usize, delta: isize, size: usize) -> usize {
    if size == 0 {
        return value;
    }
    (value as isize + delta).rem_euclid(size as isize) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::arbitrary::any;
    use proptest::{prop_assert, prop_assert_eq, proptest};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn wraps_north_and_west() {
        let grid = Grid::new(5, 4);
        assert_eq!(grid.relative_to(Coord::new(2, 0), Orientation::North), Coord::new(2, 3));
        assert_eq!(grid.relative_to(Coord::new(0, 1), Orientation::West), Coord::new(4, 1));
        assert_eq!(grid.relative_to(Coord::new(4, 1), Orientation::East), Coord::new(0, 1));
        assert_eq!(grid.relative_to(Coord::new(2, 3), Orientation::South), Coord::new(2, 0));
    }

    #[test]
    fn out_of_range_reads_fail_and_writes_are_ignored() {
        let mut grid = Grid::new(3, 2);
        let outside = Coord::new(3, 0);
        assert!(matches!(grid.cell_at(outside), Err(GridError::OutOfBounds(c)) if c == outside));
        let before = grid.clone();
        grid.set_cell(outside, Cell::WALL);
        grid.set_exploding(Coord::new(0, 9), true);
        assert_eq!(grid, before);
        assert_eq!(grid.cell_at(Coord::new(2, 1)).unwrap(), Cell::EMPTY);
    }

    #[test]
    fn parses_layout() {
        let grid = Grid::parse("WWW\nW_W\n\nWWW\n").unwrap();
        assert_eq!((grid.width(), grid.height()), (3, 3));
        assert!(grid.cell_at(Coord::new(0, 0)).unwrap().is_wall());
        assert_eq!(grid.cell_at(Coord::new(1, 1)).unwrap(), Cell::EMPTY);
        assert_eq!(grid.layout(), "WWW\nW_W\nWWW\n");
    }

    #[test]
    fn rejects_bad_layouts() {
        assert!(matches!(
            Grid::parse("___\n__\n"),
            Err(GridError::RaggedRow { line: 2, expected: 3, found: 2 })
        ));
        assert!(matches!(
            Grid::parse("_x_\n"),
            Err(GridError::UnexpectedChar { ch: 'x', line: 1 })
        ));
        assert!(matches!(Grid::parse("\n\n"), Err(GridError::EmptyLayout)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = Grid::load_from_file(Path::new("/nonexistent/arena.grid")).unwrap_err();
        assert!(matches!(err, GridError::Io(_)));
    }

    #[test]
    fn enclosed_random_grid_has_border() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let grid = Grid::random(6, 5, 0, true, &mut rng);
        for x in 0..6 {
            assert!(grid.cell_at(Coord::new(x, 0)).unwrap().is_wall());
            assert!(grid.cell_at(Coord::new(x, 4)).unwrap().is_wall());
        }
        for y in 0..5 {
            assert!(grid.cell_at(Coord::new(0, y)).unwrap().is_wall());
            assert!(grid.cell_at(Coord::new(5, y)).unwrap().is_wall());
        }
        assert_eq!(grid.cell_at(Coord::new(2, 2)).unwrap(), Cell::EMPTY);
    }

    #[test]
    fn random_grid_is_reproducible() {
        let a = Grid::random(24, 16, 8, false, &mut ChaCha8Rng::seed_from_u64(11));
        let b = Grid::random(24, 16, 8, false, &mut ChaCha8Rng::seed_from_u64(11));
        assert_eq!(a, b);
        assert_eq!((a.width(), a.height()), (24, 16));
    }

    #[test]
    fn tiny_random_grid_does_not_panic() {
        let grid = Grid::random(1, 1, 20, false, &mut ChaCha8Rng::seed_from_u64(0));
        assert_eq!((grid.width(), grid.height()), (1, 1));
    }

    #[test]
    fn serializes_markers() {
        let mut grid = Grid::parse("W__\n___\n").unwrap();
        let me = Owner(1);
        let other = Owner(2);
        grid.set_cell(Coord::new(1, 0), Cell { kind: CellKind::Player, owner: me, ..Cell::EMPTY });
        grid.set_cell(Coord::new(2, 0), Cell { kind: CellKind::Player, owner: other, ..Cell::EMPTY });
        grid.set_cell(Coord::new(0, 1), Cell { kind: CellKind::Battery, ..Cell::EMPTY });
        grid.set_cell(Coord::new(1, 1), Cell { kind: CellKind::Laser, owner: other, ..Cell::EMPTY });
        assert_eq!(grid.serialize_for(me), "WXO\nBL_\n");
        assert_eq!(grid.serialize_for(other), "WOX\nBL_\n");
    }

    #[test]
    fn clear_objects_keeps_walls() {
        let mut grid = Grid::parse("W_\n").unwrap();
        grid.set_cell(Coord::new(1, 0), Cell { kind: CellKind::Battery, ..Cell::EMPTY });
        grid.set_exploding(Coord::new(0, 0), true);
        grid.clear_objects();
        assert_eq!(grid.cells()[0], vec![Cell::WALL, Cell::EMPTY]);
    }

    proptest! {
        #[test]
        fn stepping_forth_and_back_returns(
            w in 1usize..40, h in 1usize..40, x in 0usize..40, y in 0usize..40, dir in 0usize..4,
        ) {
            let grid = Grid::new(w, h);
            let start = Coord::new(x % w, y % h);
            let o = [Orientation::North, Orientation::East, Orientation::South, Orientation::West][dir];
            let there = grid.relative_to(start, o);
            prop_assert!(grid.contains(there));
            prop_assert_eq!(grid.relative_to(there, o.opposite()), start);
        }

        #[test]
        fn own_marker_only_on_own_cell(w in 2usize..12, h in 1usize..12, seed in any::<u64>()) {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let mut grid = Grid::new(w, h);
            let mine = Coord::new(rng.random_range(0..w), rng.random_range(0..h));
            grid.set_cell(mine, Cell { kind: CellKind::Player, owner: Owner(1), ..Cell::EMPTY });
            for n in 2..5u8 {
                let c = Coord::new(rng.random_range(0..w), rng.random_range(0..h));
                if c != mine {
                    grid.set_cell(c, Cell { kind: CellKind::Player, owner: Owner(n), ..Cell::EMPTY });
                }
            }
            let text = grid.serialize_for(Owner(1));
            let rows: Vec<&str> = text.lines().collect();
            prop_assert_eq!(rows.len(), h);
            for (y, row) in rows.iter().enumerate() {
                for (x, ch) in row.chars().enumerate() {
                    prop_assert_eq!(ch == 'X', Coord::new(x, y) == mine);
                }
            }
        }
    }
}
