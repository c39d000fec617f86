//! CPU Game of Life - reference implementation of the simulation shader.
//!
//! Same rule as the compute shader: B3/S23 over the 8-cell Moore
//! neighbourhood with toroidal wrap. Used to validate GPU readback and to
//! run the simulation without an adapter.

use serde::Serialize;

#[cfg(not(target_arch = "wasm32"))]
use rayon::prelude::*;

use crate::schema::{LifeConfig, Seed};

/// Square grid of cell states, row-major, one `u32` (0 or 1) per cell.
#[derive(Debug, Clone)]
pub struct LifeGrid {
    size: u32,
    cells: Vec<u32>,
    /// Scratch buffer for the next generation (swapped in after each step).
    next: Vec<u32>,
    step: u64,
}

// `next` is scratch space and takes no part in equality.
impl PartialEq for LifeGrid {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.step == other.step && self.cells == other.cells
    }
}

impl Eq for LifeGrid {}

impl LifeGrid {
    /// Create an all-dead grid.
    pub fn new(size: u32) -> Self {
        let len = (size as usize) * (size as usize);
        Self {
            size,
            cells: vec![0; len],
            next: vec![0; len],
            step: 0,
        }
    }

    /// Create a grid from explicit cell states. Non-zero entries count as alive.
    ///
    /// # Panics
    /// Panics if `cells.len() != size * size`.
    pub fn from_cells(size: u32, cells: Vec<u32>) -> Self {
        let len = (size as usize) * (size as usize);
        assert_eq!(cells.len(), len, "cell count must equal size squared");
        Self {
            size,
            cells: cells.into_iter().map(|c| u32::from(c != 0)).collect(),
            next: vec![0; len],
            step: 0,
        }
    }

    /// Create a grid from a seed pattern.
    pub fn from_seed(seed: &Seed, size: u32) -> Self {
        Self::from_cells(size, seed.generate(size))
    }

    /// Create a grid from a full configuration.
    pub fn from_config(config: &LifeConfig) -> Self {
        Self::from_seed(&config.seed, config.grid_size)
    }

    #[inline]
    pub fn size(&self) -> u32 {
        self.size
    }

    #[inline]
    pub fn cells(&self) -> &[u32] {
        &self.cells
    }

    /// Generations computed so far.
    #[inline]
    pub fn step_count(&self) -> u64 {
        self.step
    }

    #[inline]
    pub fn idx(&self, x: u32, y: u32) -> usize {
        y as usize * self.size as usize + x as usize
    }

    #[inline]
    pub fn is_alive(&self, x: u32, y: u32) -> bool {
        self.cells[self.idx(x, y)] != 0
    }

    pub fn set(&mut self, x: u32, y: u32, alive: bool) {
        let i = self.idx(x, y);
        self.cells[i] = u32::from(alive);
    }

    /// Live neighbours of (x, y), wrapping at the edges.
    pub fn live_neighbors(&self, x: u32, y: u32) -> u32 {
        live_neighbors(&self.cells, self.size, x, y)
    }

    /// Advance one generation.
    pub fn step(&mut self) {
        let size = self.size;
        if size == 0 {
            self.step += 1;
            return;
        }
        let cells = &self.cells;
        let row_len = size as usize;

        #[cfg(not(target_arch = "wasm32"))]
        self.next
            .par_chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| next_row(cells, size, y as u32, row));

        #[cfg(target_arch = "wasm32")]
        self.next
            .chunks_mut(row_len)
            .enumerate()
            .for_each(|(y, row)| next_row(cells, size, y as u32, row));

        std::mem::swap(&mut self.cells, &mut self.next);
        self.step += 1;
    }

    /// Advance `steps` generations.
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.cells.iter().filter(|&&c| c != 0).count()
    }

    pub fn stats(&self) -> LifeStats {
        LifeStats::from_cells(&self.cells, self.step)
    }
}

#[inline]
fn live_neighbors(cells: &[u32], size: u32, x: u32, y: u32) -> u32 {
    let left = (x + size - 1) % size;
    let right = (x + 1) % size;
    let up = (y + size - 1) % size;
    let down = (y + 1) % size;
    let at = |cx: u32, cy: u32| cells[cy as usize * size as usize + cx as usize];

    at(left, up)
        + at(x, up)
        + at(right, up)
        + at(left, y)
        + at(right, y)
        + at(left, down)
        + at(x, down)
        + at(right, down)
}

fn next_row(cells: &[u32], size: u32, y: u32, row: &mut [u32]) {
    for (x, out) in row.iter_mut().enumerate() {
        let x = x as u32;
        let alive = cells[y as usize * size as usize + x as usize] != 0;
        *out = match (alive, live_neighbors(cells, size, x, y)) {
            (true, 2) | (_, 3) => 1,
            _ => 0,
        };
    }
}

/// Summary statistics for a cell-state grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LifeStats {
    /// Generation the statistics were taken at.
    pub step: u64,
    /// Number of live cells.
    pub population: usize,
    /// Live fraction of the grid.
    pub density: f64,
}

impl LifeStats {
    pub fn from_cells(cells: &[u32], step: u64) -> Self {
        let population = cells.iter().filter(|&&c| c != 0).count();
        let density = if cells.is_empty() {
            0.0
        } else {
            population as f64 / cells.len() as f64
        };
        Self {
            step,
            population,
            density,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Pattern;

    fn grid_with(size: u32, live: &[(u32, u32)]) -> LifeGrid {
        let mut grid = LifeGrid::new(size);
        for &(x, y) in live {
            grid.set(x, y, true);
        }
        grid
    }

    fn live_cells(grid: &LifeGrid) -> Vec<(u32, u32)> {
        let mut out = Vec::new();
        for y in 0..grid.size() {
            for x in 0..grid.size() {
                if grid.is_alive(x, y) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn test_blinker_oscillates() {
        let mut grid = grid_with(5, &[(1, 2), (2, 2), (3, 2)]);
        grid.step();
        assert_eq!(live_cells(&grid), vec![(2, 1), (2, 2), (2, 3)]);
        grid.step();
        assert_eq!(live_cells(&grid), vec![(1, 2), (2, 2), (3, 2)]);
        assert_eq!(grid.step_count(), 2);
    }

    #[test]
    fn test_block_is_still_life() {
        let mut grid = grid_with(6, &[(2, 2), (3, 2), (2, 3), (3, 3)]);
        let before = grid.cells().to_vec();
        grid.run(10);
        assert_eq!(grid.cells(), before.as_slice());
    }

    #[test]
    fn test_lonely_cell_dies() {
        let mut grid = grid_with(4, &[(1, 1)]);
        grid.step();
        assert_eq!(grid.population(), 0);
    }

    #[test]
    fn test_neighbors_wrap_around_edges() {
        let grid = grid_with(4, &[(3, 3), (0, 3), (3, 0)]);
        assert_eq!(grid.live_neighbors(0, 0), 3);
    }

    #[test]
    fn test_glider_returns_translated_after_four_steps() {
        let size = 10;
        let mut grid = LifeGrid::from_seed(
            &Seed {
                pattern: Pattern::Glider { x: 1, y: 1 },
            },
            size,
        );
        let start = live_cells(&grid);
        grid.run(4);
        let moved: Vec<(u32, u32)> = start.iter().map(|&(x, y)| (x + 1, y + 1)).collect();
        let mut end = live_cells(&grid);
        end.sort_by_key(|&(x, y)| (y, x));
        assert_eq!(end, moved);
    }

    #[test]
    fn test_glider_wraps_torus() {
        let size = 8;
        let mut grid = LifeGrid::from_seed(
            &Seed {
                pattern: Pattern::Glider { x: 0, y: 0 },
            },
            size,
        );
        let start = grid.cells().to_vec();
        // A glider moves one cell diagonally every 4 generations.
        grid.run(4 * size as u64);
        assert_eq!(grid.cells(), start.as_slice());
        assert_eq!(grid.population(), 5);
    }

    #[test]
    fn test_equality_ignores_previous_generation() {
        let mut a = grid_with(8, &[(1, 2), (2, 2), (3, 2)]);
        let mut b = grid_with(8, &[(1, 2), (2, 2), (3, 2), (6, 6)]);
        assert_ne!(a, b);
        a.step();
        b.step();
        assert_eq!(a.cells(), b.cells());
        assert_eq!(a, b);
    }

    #[test]
    fn test_from_cells_normalises() {
        let grid = LifeGrid::from_cells(2, vec![0, 7, 1, 0]);
        assert_eq!(grid.cells(), &[0, 1, 1, 0]);
    }

    #[test]
    fn test_stats() {
        let grid = grid_with(4, &[(0, 0), (1, 1)]);
        let stats = grid.stats();
        assert_eq!(stats.population, 2);
        assert_eq!(stats.step, 0);
        assert!((stats.density - 0.125).abs() < 1e-12);
    }
}
