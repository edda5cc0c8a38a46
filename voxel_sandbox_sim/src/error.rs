// Rejection and error types.
//
// `PlacementRejection` is the routine "nothing happened" outcome of a
// placement: clicking past the grid edge or onto an already occupied cell.
// It is returned, never raised, and the host normally ignores it (the
// click simply misses). `ConfigError` covers loading and validating
// `SandboxConfig`.
//
// See also: `spatial_index.rs` which produces rejections, `config.rs`.

use crate::types::GridColumn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a placement did not commit a cube.
#[derive(Clone, Copy, Debug, PartialEq, Error, Serialize, Deserialize)]
pub enum PlacementRejection {
    /// The target column lies outside `[-grid_size/2, grid_size/2)` on
    /// either axis, or the input coordinates were not finite.
    #[error("target column is outside the grid")]
    OutOfBounds,
    /// A cube already sits in the target column at the target center
    /// height (within the occupancy tolerance).
    #[error("column {column} is already occupied at height {center}")]
    Occupied { column: GridColumn, center: f32 },
}

/// Failure to load or validate a `SandboxConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
