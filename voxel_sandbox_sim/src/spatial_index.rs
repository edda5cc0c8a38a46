// Authoritative index of placed cubes.
//
// `SpatialIndex` owns every `Cube` record in the sandbox. Cubes are stored
// twice, once per access pattern:
//
// - `cubes: BTreeMap<CubeId, Cube>`: the record store. `CubeId`s are
//   allocated monotonically, so iterating this map yields cubes in insertion
//   order. The host uses this order for its ray-cast target list.
// - `columns: BTreeMap<GridColumn, Column>`: for each occupied (x, z)
//   column, the ids of its cubes ordered by center height, bottom to top.
//   Used for stack-height and occupancy queries.
//
// Invariants, enforced on every mutation path:
// - Both maps describe exactly the same set of cubes.
// - No column entry is ever empty. A column is created on its first insert
//   and removed in the same operation that takes out its last cube
//   (`detach_from_column`); no caller can observe an empty column.
// - Every cube's column is within `[-grid_size/2, grid_size/2)`.
// - Within a column no two cube centers are closer than the occupancy
//   tolerance (top-stacking can never conflict; `place_at_height` checks).
//
// Rejections are return values (`PlacementRejection`), not errors in the
// exceptional sense: clicking past the grid edge is routine.
//
// The index does not own renderable resources. `remove()` and `clear()`
// hand back the removed `Cube` records so the host can release whatever it
// built for them.
//
// See also: `placement.rs` which decides which of the two placement calls
// to make, `sandbox.rs` which owns the index, `config.rs` for bounds and
// tolerance.

use crate::config::SandboxConfig;
use crate::error::{ConfigError, PlacementRejection};
use crate::types::{Color, Cube, CubeId, GridColumn};
use log::{debug, info, trace};
use smallvec::SmallVec;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

/// Cube ids of one column, ordered by center height ascending. Most columns
/// are short stacks, so they stay inline.
type Column = SmallVec<[CubeId; 8]>;

/// The set of placed cubes, keyed by id and by grid column.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    config: SandboxConfig,
    cubes: BTreeMap<CubeId, Cube>,
    columns: BTreeMap<GridColumn, Column>,
    next_id: u64,
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::with_valid_config(SandboxConfig::default())
    }
}

impl SpatialIndex {
    /// Build an empty index. Fails if the config does not validate: a zero
    /// tolerance or a non-finite unit size would let duplicate or NaN-height
    /// cubes in.
    pub fn new(config: SandboxConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: SandboxConfig) -> Self {
        Self {
            config,
            cubes: BTreeMap::new(),
            columns: BTreeMap::new(),
            next_id: 0,
        }
    }

    pub fn config(&self) -> &SandboxConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Placement
    // -----------------------------------------------------------------------

    /// Place a cube on top of the column's current stack.
    ///
    /// The new cube's bottom sits on the top face of the highest cube in the
    /// column (or on the ground for an empty column). Only the bounds check
    /// can reject; there is never an occupancy conflict at the top.
    pub fn place_on_top(
        &mut self,
        column: GridColumn,
        color: Color,
    ) -> Result<Cube, PlacementRejection> {
        if !self.config.in_bounds(column) {
            trace!("place_on_top rejected: {column} out of bounds");
            return Err(PlacementRejection::OutOfBounds);
        }
        let center = self.stack_top(column) + self.config.unit_size / 2.0;
        Ok(self.insert(column, center, color))
    }

    /// Place a cube whose bottom face sits at `elevation`.
    ///
    /// Rejects with `Occupied` if a cube in the column already has its
    /// center within the occupancy tolerance of the new center. A
    /// non-finite elevation fails the range check like an out-of-grid
    /// column.
    pub fn place_at_height(
        &mut self,
        column: GridColumn,
        elevation: f32,
        color: Color,
    ) -> Result<Cube, PlacementRejection> {
        if !elevation.is_finite() || !self.config.in_bounds(column) {
            trace!("place_at_height rejected: {column} @ {elevation} out of bounds");
            return Err(PlacementRejection::OutOfBounds);
        }
        let center = elevation + self.config.unit_size / 2.0;
        if self.is_occupied(column, center) {
            trace!("place_at_height rejected: {column} occupied at {center}");
            return Err(PlacementRejection::Occupied { column, center });
        }
        Ok(self.insert(column, center, color))
    }

    /// Commit a new cube. Callers have already checked bounds and occupancy.
    fn insert(&mut self, column: GridColumn, center: f32, color: Color) -> Cube {
        let id = CubeId(self.next_id);
        self.next_id += 1;

        let cubes = &self.cubes;
        let stack = self.columns.entry(column).or_default();
        let stack_index = stack.len() as u32;
        let position = stack
            .iter()
            .position(|other| cubes.get(other).is_some_and(|c| c.height > center))
            .unwrap_or(stack.len());
        stack.insert(position, id);

        let cube = Cube {
            id,
            column,
            height: center,
            stack_index,
            color,
        };
        self.cubes.insert(id, cube);
        debug!("placed {id} at {column} height {center} ({color})");
        cube
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove a cube. Returns the removed record so the host can release its
    /// renderable, or `None` if the cube is not (or no longer) indexed.
    pub fn remove(&mut self, id: CubeId) -> Option<Cube> {
        let cube = self.cubes.remove(&id)?;
        self.detach_from_column(&cube);
        debug!("removed {id} from {}", cube.column);
        Some(cube)
    }

    /// Take a cube out of its column, deleting the column entry in the same
    /// step if it becomes empty.
    fn detach_from_column(&mut self, cube: &Cube) {
        if let Entry::Occupied(mut entry) = self.columns.entry(cube.column) {
            let stack = entry.get_mut();
            if let Some(pos) = stack.iter().position(|&other| other == cube.id) {
                stack.remove(pos);
            }
            if stack.is_empty() {
                entry.remove();
            }
        }
    }

    /// Remove every cube at once. Returns the full prior list in insertion
    /// order; calling it on an empty index returns an empty list.
    pub fn clear(&mut self) -> Vec<Cube> {
        let removed: Vec<Cube> = std::mem::take(&mut self.cubes).into_values().collect();
        self.columns.clear();
        if !removed.is_empty() {
            info!("cleared {} cubes", removed.len());
        }
        removed
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// All placed cubes in insertion order.
    pub fn all_placed(&self) -> impl Iterator<Item = &Cube> {
        self.cubes.values()
    }

    pub fn get(&self, id: CubeId) -> Option<&Cube> {
        self.cubes.get(&id)
    }

    pub fn len(&self) -> usize {
        self.cubes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty()
    }

    /// Number of non-empty columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn has_column(&self, column: GridColumn) -> bool {
        self.columns.contains_key(&column)
    }

    /// Cubes of one column, bottom to top. Empty for an unoccupied column.
    pub fn column(&self, column: GridColumn) -> impl Iterator<Item = &Cube> {
        self.columns
            .get(&column)
            .into_iter()
            .flat_map(|stack| stack.iter())
            .filter_map(|id| self.cubes.get(id))
    }

    /// Elevation of the top face of the column's highest cube, or 0 for an
    /// unoccupied column.
    pub fn stack_top(&self, column: GridColumn) -> f32 {
        let unit = self.config.unit_size;
        self.column(column).last().map_or(0.0, |c| c.top(unit))
    }

    /// Whether a cube in `column` has its center within the occupancy
    /// tolerance of `center`.
    pub fn is_occupied(&self, column: GridColumn, center: f32) -> bool {
        let tolerance = self.config.occupancy_tolerance();
        self.column(column)
            .any(|c| (c.height - center).abs() < tolerance)
    }
}
