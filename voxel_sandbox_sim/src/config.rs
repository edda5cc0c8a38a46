// Data-driven sandbox configuration.
//
// All tunable placement parameters live here in `SandboxConfig`, loaded
// from JSON at startup. The engine never uses magic numbers; it reads grid
// extent, unit size, occupancy tolerance and the face-axis threshold from
// the config. Missing fields fall back to the shipped defaults
// (`#[serde(default)]`), so a config file only needs the values it changes.
//
// The occupancy tolerance is stored as a fraction of `unit_size` rather than
// an absolute distance, so it scales if the unit size is changed. At the
// default unit size of 1 the effective tolerance is 0.1.
//
// See also: `spatial_index.rs` (bounds and occupancy checks),
// `placement.rs` (face-axis threshold), `palette.rs` (palette entries).

use crate::error::ConfigError;
use crate::types::{Color, GridColumn};
use serde::{Deserialize, Serialize};

/// A named palette swatch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    pub name: String,
    pub color: Color,
}

/// Top-level sandbox configuration. Loaded from JSON, never mutated at
/// runtime.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Edge length of the square ground grid, in cells. Valid columns are
    /// `[-grid_size/2, grid_size/2)` on both axes, evaluated in floating
    /// point (an odd size gives a half-integer extent).
    pub grid_size: i32,

    /// Edge length of every cube, in world units.
    pub unit_size: f32,

    /// Two cubes in one column whose centers are closer than
    /// `occupancy_tolerance_fraction * unit_size` occupy the same cell.
    pub occupancy_tolerance_fraction: f32,

    /// A face-normal component must exceed this magnitude for its axis to
    /// count as the face direction.
    pub face_axis_threshold: f32,

    /// Palette color selected at startup.
    pub default_color: Color,

    /// Named swatches offered by the palette UI.
    pub palette: Vec<PaletteEntry>,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        let swatch = |name: &str, hex: u32| PaletteEntry {
            name: name.to_string(),
            color: Color(hex),
        };
        Self {
            grid_size: 20,
            unit_size: 1.0,
            occupancy_tolerance_fraction: 0.1,
            face_axis_threshold: 0.7,
            default_color: Color(0xff6b6b),
            palette: vec![
                swatch("coral", 0xff6b6b),
                swatch("teal", 0x4ecdc4),
                swatch("sky", 0x45b7d1),
                swatch("sand", 0xf9ca24),
                swatch("moss", 0x6ab04c),
                swatch("stone", 0x95a5a6),
                swatch("plum", 0x9b59b6),
                swatch("slate", 0x2c3e50),
            ],
        }
    }
}

impl SandboxConfig {
    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configs the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size <= 0 {
            return Err(ConfigError::Invalid(format!(
                "grid_size must be positive, got {}",
                self.grid_size
            )));
        }
        if !(self.unit_size.is_finite() && self.unit_size > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "unit_size must be finite and positive, got {}",
                self.unit_size
            )));
        }
        if !(self.occupancy_tolerance_fraction > 0.0 && self.occupancy_tolerance_fraction < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "occupancy_tolerance_fraction must be in (0, 1), got {}",
                self.occupancy_tolerance_fraction
            )));
        }
        if !(self.face_axis_threshold > 0.0 && self.face_axis_threshold < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "face_axis_threshold must be in (0, 1), got {}",
                self.face_axis_threshold
            )));
        }
        Ok(())
    }

    /// Half the grid edge length, in cells.
    pub fn half_extent(&self) -> f64 {
        f64::from(self.grid_size) / 2.0
    }

    /// Whether a column lies within `[-half, half)` on both axes.
    pub fn in_bounds(&self, column: GridColumn) -> bool {
        let half = self.half_extent();
        let inside = |v: i32| {
            let v = f64::from(v);
            v >= -half && v < half
        };
        inside(column.x) && inside(column.z)
    }

    /// Absolute center-height tolerance for occupancy checks.
    pub fn occupancy_tolerance(&self) -> f32 {
        self.occupancy_tolerance_fraction * self.unit_size
    }
}
