//! Seed types for initializing the cell-state grid.

use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Threshold above which a uniform sample makes a cell alive.
pub const DEFAULT_LIVE_THRESHOLD: f64 = 0.6;

/// Complete seed specification for grid initialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seed {
    /// Pattern to use for seeding.
    pub pattern: Pattern,
}

impl Default for Seed {
    fn default() -> Self {
        Self {
            pattern: Pattern::Random {
                threshold: DEFAULT_LIVE_THRESHOLD,
                seed: None,
            },
        }
    }
}

/// Predefined patterns for initialization.
///
/// Shapes are stamped with toroidal wrap, matching the simulation's
/// wrapping neighbourhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Pattern {
    /// Each cell independently alive when a uniform sample exceeds `threshold`.
    Random {
        /// Sample threshold in [0, 1].
        threshold: f64,
        /// Fixed RNG seed for reproducible grids. `None` draws from entropy.
        seed: Option<u64>,
    },
    /// A single glider with its bounding box anchored at (x, y).
    Glider { x: u32, y: u32 },
    /// A horizontal period-2 blinker starting at (x, y).
    Blinker { x: u32, y: u32 },
    /// Explicit list of live cells.
    Custom { cells: Vec<(u32, u32)> },
    /// All cells dead.
    Empty,
}

const GLIDER: [(u32, u32); 5] = [(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)];
const BLINKER: [(u32, u32); 3] = [(0, 0), (1, 0), (2, 0)];

impl Seed {
    /// Check the pattern fits a grid of the given edge length.
    pub fn validate(&self, grid_size: u32) -> Result<(), ConfigError> {
        let in_bounds = |x: u32, y: u32| {
            if x < grid_size && y < grid_size {
                Ok(())
            } else {
                Err(ConfigError::CellOutOfBounds {
                    x,
                    y,
                    size: grid_size,
                })
            }
        };

        match &self.pattern {
            Pattern::Random { threshold, .. } => {
                if !(0.0..=1.0).contains(threshold) {
                    return Err(ConfigError::InvalidThreshold(*threshold));
                }
                Ok(())
            }
            Pattern::Glider { x, y } | Pattern::Blinker { x, y } => in_bounds(*x, *y),
            Pattern::Custom { cells } => cells.iter().try_for_each(|&(x, y)| in_bounds(x, y)),
            Pattern::Empty => Ok(()),
        }
    }

    /// Generate the initial cell states, row-major, one `u32` (0 or 1) per cell.
    pub fn generate(&self, grid_size: u32) -> Vec<u32> {
        let size = grid_size as usize;
        let mut cells = vec![0u32; size * size];
        if size == 0 {
            return cells;
        }

        match &self.pattern {
            Pattern::Random { threshold, seed } => match seed {
                Some(seed) => {
                    let mut rng = StdRng::seed_from_u64(*seed);
                    fill_random(&mut cells, *threshold, &mut rng);
                }
                None => fill_random(&mut cells, *threshold, &mut rand::thread_rng()),
            },
            Pattern::Glider { x, y } => stamp(&mut cells, grid_size, *x, *y, &GLIDER),
            Pattern::Blinker { x, y } => stamp(&mut cells, grid_size, *x, *y, &BLINKER),
            Pattern::Custom { cells: live } => {
                for &(x, y) in live {
                    if x < grid_size && y < grid_size {
                        cells[y as usize * size + x as usize] = 1;
                    }
                }
            }
            Pattern::Empty => {}
        }

        cells
    }
}

fn fill_random<R: Rng + ?Sized>(cells: &mut [u32], threshold: f64, rng: &mut R) {
    for cell in cells.iter_mut() {
        *cell = u32::from(rng.r#gen::<f64>() > threshold);
    }
}

fn stamp(cells: &mut [u32], grid_size: u32, x: u32, y: u32, shape: &[(u32, u32)]) {
    let size = grid_size as usize;
    for &(dx, dy) in shape {
        let cx = (x % grid_size + dx) % grid_size;
        let cy = (y % grid_size + dy) % grid_size;
        cells[cy as usize * size + cx as usize] = 1;
    }
}
