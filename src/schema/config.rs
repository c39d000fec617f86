//! Configuration types for the Life and Cube demos.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::Seed;

/// Compute shader workgroup edge length. The simulation shader is compiled
/// with this value, so host dispatch math and the shader always agree.
pub const DEFAULT_WORKGROUP_SIZE: u32 = 8;

fn default_workgroup_size() -> u32 {
    DEFAULT_WORKGROUP_SIZE
}

fn default_life_clear_color() -> [f64; 4] {
    [0.1, 0.2, 0.3, 1.0]
}

/// Game of Life simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LifeConfig {
    /// Grid edge length in cells. The grid is square.
    pub grid_size: u32,
    /// Milliseconds between simulation ticks.
    pub update_interval_ms: u64,
    /// Workgroup edge length for the compute dispatch.
    #[serde(default = "default_workgroup_size")]
    pub workgroup_size: u32,
    /// Initial population.
    pub seed: Seed,
    /// Background colour behind the cells (RGBA).
    #[serde(default = "default_life_clear_color")]
    pub clear_color: [f64; 4],
}

impl Default for LifeConfig {
    fn default() -> Self {
        Self {
            grid_size: 100,
            update_interval_ms: 100,
            workgroup_size: DEFAULT_WORKGROUP_SIZE,
            seed: Seed::default(),
            clear_color: default_life_clear_color(),
        }
    }
}

impl LifeConfig {
    /// The larger, slower variant: 512x512 cells ticking every 200 ms.
    pub fn large() -> Self {
        Self {
            grid_size: 512,
            update_interval_ms: 200,
            ..Self::default()
        }
    }

    /// Total number of cells (grid_size squared).
    #[inline]
    pub fn cell_count(&self) -> usize {
        (self.grid_size as usize) * (self.grid_size as usize)
    }

    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 {
            return Err(ConfigError::InvalidGridSize);
        }
        if self.workgroup_size == 0 {
            return Err(ConfigError::InvalidWorkgroupSize);
        }
        if self.update_interval_ms == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        self.seed.validate(self.grid_size)?;
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }
}

fn default_cube_clear_color() -> [f64; 4] {
    [0.5, 0.5, 0.5, 1.0]
}

/// Rotating cube configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CubeConfig {
    /// Image applied to every face. A checkerboard is generated when absent.
    pub texture_path: Option<PathBuf>,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
    /// Distance from the camera to the cube centre.
    pub camera_distance: f32,
    /// Background colour (RGBA).
    #[serde(default = "default_cube_clear_color")]
    pub clear_color: [f64; 4],
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            texture_path: None,
            fov_y: 2.0 * std::f32::consts::PI / 5.0,
            near: 1.0,
            far: 100.0,
            camera_distance: 4.0,
            clear_color: default_cube_clear_color(),
        }
    }
}

impl CubeConfig {
    /// Validate configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_y > 0.0 && self.fov_y < std::f32::consts::PI) {
            return Err(ConfigError::InvalidFieldOfView(self.fov_y));
        }
        if !(self.near > 0.0 && self.far > self.near) {
            return Err(ConfigError::InvalidClipPlanes {
                near: self.near,
                far: self.far,
            });
        }
        Ok(())
    }

    /// Load and validate a configuration from a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let config: Self = read_json(path.as_ref())?;
        config.validate()?;
        Ok(config)
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Grid size must be non-zero")]
    InvalidGridSize,
    #[error("Workgroup size must be non-zero")]
    InvalidWorkgroupSize,
    #[error("Update interval must be non-zero")]
    InvalidInterval,
    #[error("Live threshold {0} must lie in [0, 1]")]
    InvalidThreshold(f64),
    #[error("Pattern cell ({x}, {y}) lies outside a {size}x{size} grid")]
    CellOutOfBounds { x: u32, y: u32, size: u32 },
    #[error("Field of view {0} must lie in (0, pi)")]
    InvalidFieldOfView(f32),
    #[error("Clip planes must satisfy 0 < near < far (near={near}, far={far})")]
    InvalidClipPlanes { near: f32, far: f32 },
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Pattern;
    use std::io::Write;

    #[test]
    fn test_defaults_match_small_variant() {
        let config = LifeConfig::default();
        assert_eq!(config.grid_size, 100);
        assert_eq!(config.update_interval_ms, 100);
        assert_eq!(config.workgroup_size, 8);
        assert_eq!(config.cell_count(), 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_large_variant() {
        let config = LifeConfig::large();
        assert_eq!(config.grid_size, 512);
        assert_eq!(config.update_interval_ms, 200);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_values() {
        let config = LifeConfig {
            grid_size: 0,
            ..LifeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidGridSize)));

        let config = LifeConfig {
            workgroup_size: 0,
            ..LifeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidWorkgroupSize)
        ));

        let config = LifeConfig {
            update_interval_ms: 0,
            ..LifeConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidInterval)));
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let config = LifeConfig {
            seed: Seed {
                pattern: Pattern::Random {
                    threshold: 1.5,
                    seed: None,
                },
            },
            ..LifeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidThreshold(_))
        ));
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: LifeConfig = serde_json::from_str(r#"{ "grid_size": 32 }"#).unwrap();
        assert_eq!(config.grid_size, 32);
        assert_eq!(config.update_interval_ms, 100);
        assert_eq!(config.clear_color, [0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn test_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "grid_size": 64, "update_interval_ms": 50, "seed": {{ "pattern": {{ "type": "Glider", "x": 1, "y": 1 }} }} }}"#
        )
        .unwrap();

        let config = LifeConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.grid_size, 64);
        assert_eq!(config.update_interval_ms, 50);
        assert_eq!(config.seed.pattern, Pattern::Glider { x: 1, y: 1 });
    }

    #[test]
    fn test_from_json_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = LifeConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_from_json_file_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "grid_size": 0 }}"#).unwrap();
        let result = LifeConfig::from_json_file(file.path());
        assert!(matches!(result, Err(ConfigError::InvalidGridSize)));
    }

    #[test]
    fn test_cube_defaults() {
        let config = CubeConfig::default();
        assert!((config.fov_y - 1.256_637).abs() < 1e-5);
        assert_eq!(config.clear_color, [0.5, 0.5, 0.5, 1.0]);
        assert!(config.texture_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cube_rejects_bad_planes() {
        let config = CubeConfig {
            near: 10.0,
            far: 1.0,
            ..CubeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidClipPlanes { .. })
        ));

        let config = CubeConfig {
            fov_y: 0.0,
            ..CubeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidFieldOfView(_))
        ));
    }

    #[test]
    fn test_cube_json_texture_path() {
        let config: CubeConfig =
            serde_json::from_str(r#"{ "texture_path": "assets/face.png" }"#).unwrap();
        assert_eq!(config.texture_path, Some(PathBuf::from("assets/face.png")));
        assert_eq!(config.far, 100.0);
    }
}
