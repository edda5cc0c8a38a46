// Placement resolution: turning a ray-cast hit into one index call.
//
// Two entry points mirror the two things a primary click can hit:
//
// - `resolve_from_empty_grid(point)`: the ground plane. The hit point is
//   snapped to the nearest column and the cube is stacked on top of that
//   column (which, for an empty column, means on the ground).
// - `resolve_from_cube_face(cube, normal)`: a face of an existing cube.
//   The face normal picks the neighboring cell:
//     top/bottom face -> stack on top of the clicked cube's column;
//     side face       -> the horizontally adjacent column, with the new
//                        cube's bottom flush with the clicked cube's bottom.
//
// Face classification is an ordered rule list (`FACE_RULES`): the first
// axis whose normal component exceeds `face_axis_threshold` wins. The order
// is Y, then X, then Z, so a near-45 degree side normal where both
// horizontal components clear the threshold resolves along X. A normal
// that clears no threshold (or is NaN) is `Unresolved` and falls back to
// stacking.
//
// The resolver never mutates anything itself; it computes a
// `PlacementTarget` and hands it to `SpatialIndex`. `target_for_face` is
// pure so the adjacency geometry can be tested without an index.
//
// See also: `spatial_index.rs` for the two placement operations,
// `raycast.rs` for where hits come from, `sandbox.rs` for the caller.

use crate::config::SandboxConfig;
use crate::error::PlacementRejection;
use crate::spatial_index::SpatialIndex;
use crate::types::{Color, Cube, GridColumn, Vec3};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Face classification
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

/// Axes in the order they are tested. Earlier entries win ties.
const FACE_RULES: [Axis; 3] = [Axis::Y, Axis::X, Axis::Z];

/// Which face of a cube a normal points out of.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FaceDirection {
    Top,
    Bottom,
    PosX,
    NegX,
    PosZ,
    NegZ,
    /// No component cleared the threshold.
    Unresolved,
}

impl FaceDirection {
    /// Classify a face normal against the dominant-axis threshold.
    pub fn classify(normal: Vec3, threshold: f32) -> Self {
        for axis in FACE_RULES {
            let component = match axis {
                Axis::X => normal.x,
                Axis::Y => normal.y,
                Axis::Z => normal.z,
            };
            if component.abs() > threshold {
                let positive = component > 0.0;
                return match (axis, positive) {
                    (Axis::Y, true) => Self::Top,
                    (Axis::Y, false) => Self::Bottom,
                    (Axis::X, true) => Self::PosX,
                    (Axis::X, false) => Self::NegX,
                    (Axis::Z, true) => Self::PosZ,
                    (Axis::Z, false) => Self::NegZ,
                };
            }
        }
        Self::Unresolved
    }

    /// Column offset `(dx, dz)` for side faces; `None` for faces that stack.
    pub fn side_offset(self) -> Option<(i32, i32)> {
        match self {
            Self::PosX => Some((1, 0)),
            Self::NegX => Some((-1, 0)),
            Self::PosZ => Some((0, 1)),
            Self::NegZ => Some((0, -1)),
            Self::Top | Self::Bottom | Self::Unresolved => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Where a new cube should go, before the index validates it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum PlacementTarget {
    /// Stack on top of the column.
    OnTop { column: GridColumn },
    /// Place with the cube's bottom face at `elevation`.
    AtHeight { column: GridColumn, elevation: f32 },
}

/// Computes placement targets from ray-cast hits and commits them.
#[derive(Clone, Copy, Debug)]
pub struct PlacementResolver {
    face_axis_threshold: f32,
    unit_size: f32,
}

impl PlacementResolver {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            face_axis_threshold: config.face_axis_threshold,
            unit_size: config.unit_size,
        }
    }

    /// Target for a click on the empty grid: the snapped column, stacked.
    /// `None` if the point cannot be snapped (non-finite coordinates).
    pub fn target_for_grid(&self, point: Vec3) -> Option<PlacementTarget> {
        GridColumn::snap(point.x, point.z).map(|column| PlacementTarget::OnTop { column })
    }

    /// Target for a click on a face of `hit`.
    pub fn target_for_face(&self, hit: &Cube, normal: Vec3) -> PlacementTarget {
        let face = FaceDirection::classify(normal, self.face_axis_threshold);
        match face.side_offset() {
            Some((dx, dz)) => PlacementTarget::AtHeight {
                column: hit.column.offset(dx, dz),
                elevation: hit.bottom(self.unit_size),
            },
            None => PlacementTarget::OnTop { column: hit.column },
        }
    }

    /// Snap a ground-plane hit to its column and stack a cube there.
    pub fn resolve_from_empty_grid(
        &self,
        index: &mut SpatialIndex,
        point: Vec3,
        color: Color,
    ) -> Result<Cube, PlacementRejection> {
        let target = self
            .target_for_grid(point)
            .ok_or(PlacementRejection::OutOfBounds)?;
        Self::commit(index, target, color)
    }

    /// Place a cube against the clicked face of `hit`.
    pub fn resolve_from_cube_face(
        &self,
        index: &mut SpatialIndex,
        hit: &Cube,
        normal: Vec3,
        color: Color,
    ) -> Result<Cube, PlacementRejection> {
        let target = self.target_for_face(hit, normal);
        Self::commit(index, target, color)
    }

    /// Hand a target to the index.
    pub fn commit(
        index: &mut SpatialIndex,
        target: PlacementTarget,
        color: Color,
    ) -> Result<Cube, PlacementRejection> {
        match target {
            PlacementTarget::OnTop { column } => index.place_on_top(column, color),
            PlacementTarget::AtHeight { column, elevation } => {
                index.place_at_height(column, elevation, color)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Color = Color(0xff0000);
    const BLUE: Color = Color(0x0000ff);

    fn resolver() -> PlacementResolver {
        PlacementResolver::new(&SandboxConfig::default())
    }

    #[test]
    fn classify_axis_aligned_normals() {
        let t = 0.7;
        assert_eq!(FaceDirection::classify(Vec3::new(0.0, 1.0, 0.0), t), FaceDirection::Top);
        assert_eq!(FaceDirection::classify(Vec3::new(0.0, -1.0, 0.0), t), FaceDirection::Bottom);
        assert_eq!(FaceDirection::classify(Vec3::new(1.0, 0.0, 0.0), t), FaceDirection::PosX);
        assert_eq!(FaceDirection::classify(Vec3::new(-1.0, 0.0, 0.0), t), FaceDirection::NegX);
        assert_eq!(FaceDirection::classify(Vec3::new(0.0, 0.0, 1.0), t), FaceDirection::PosZ);
        assert_eq!(FaceDirection::classify(Vec3::new(0.0, 0.0, -1.0), t), FaceDirection::NegZ);
    }

    #[test]
    fn classify_prefers_x_over_z_on_diagonal() {
        let d = std::f32::consts::FRAC_1_SQRT_2;
        assert_eq!(FaceDirection::classify(Vec3::new(d, 0.0, d), 0.7), FaceDirection::PosX);
        assert_eq!(FaceDirection::classify(Vec3::new(-d, 0.0, -d), 0.7), FaceDirection::NegX);
    }

    #[test]
    fn classify_prefers_vertical_over_horizontal() {
        let d = std::f32::consts::FRAC_1_SQRT_2;
        assert_eq!(FaceDirection::classify(Vec3::new(d, d, 0.0), 0.7), FaceDirection::Top);
    }

    #[test]
    fn classify_weak_or_nan_normal_is_unresolved() {
        let weak = Vec3::new(0.6, 0.5, 0.6);
        assert_eq!(FaceDirection::classify(weak, 0.7), FaceDirection::Unresolved);
        let nan = Vec3::new(f32::NAN, f32::NAN, f32::NAN);
        assert_eq!(FaceDirection::classify(nan, 0.7), FaceDirection::Unresolved);
    }

    #[test]
    fn face_targets_match_adjacent_cells() {
        let mut index = SpatialIndex::default();
        let cube = index.place_on_top(GridColumn::new(2, 2), RED).unwrap();
        assert_eq!(cube.height, 0.5);
        let r = resolver();

        assert_eq!(
            r.target_for_face(&cube, Vec3::new(0.0, 1.0, 0.0)),
            PlacementTarget::OnTop { column: GridColumn::new(2, 2) }
        );
        assert_eq!(
            r.target_for_face(&cube, Vec3::new(1.0, 0.0, 0.0)),
            PlacementTarget::AtHeight { column: GridColumn::new(3, 2), elevation: 0.0 }
        );
        assert_eq!(
            r.target_for_face(&cube, Vec3::new(0.0, 0.0, -1.0)),
            PlacementTarget::AtHeight { column: GridColumn::new(2, 1), elevation: 0.0 }
        );
    }

    #[test]
    fn bottom_face_and_unresolved_stack_on_top() {
        let mut index = SpatialIndex::default();
        let column = GridColumn::new(0, 0);
        let cube = index.place_on_top(column, RED).unwrap();
        let r = resolver();
        assert_eq!(
            r.target_for_face(&cube, Vec3::new(0.0, -1.0, 0.0)),
            PlacementTarget::OnTop { column }
        );
        assert_eq!(
            r.target_for_face(&cube, Vec3::new(0.5, 0.5, 0.5)),
            PlacementTarget::OnTop { column }
        );
    }

    #[test]
    fn side_attach_aligns_with_clicked_cube_base() {
        let mut index = SpatialIndex::default();
        let r = resolver();
        let column = GridColumn::new(0, 0);
        index.place_on_top(column, RED).unwrap();
        let second = index.place_on_top(column, RED).unwrap();

        let attached = r
            .resolve_from_cube_face(&mut index, &second, Vec3::new(-1.0, 0.0, 0.0), BLUE)
            .unwrap();
        assert_eq!(attached.column, GridColumn::new(-1, 0));
        assert_eq!(attached.height, second.height);
        assert_eq!(attached.color, BLUE);

        // Clicking the same face again targets the now-occupied cell.
        assert!(matches!(
            r.resolve_from_cube_face(&mut index, &second, Vec3::new(-1.0, 0.0, 0.0), BLUE),
            Err(PlacementRejection::Occupied { .. })
        ));
    }

    #[test]
    fn side_attach_past_grid_edge_is_out_of_bounds() {
        let mut index = SpatialIndex::default();
        let r = resolver();
        let edge = index.place_on_top(GridColumn::new(9, 0), RED).unwrap();
        assert_eq!(
            r.resolve_from_cube_face(&mut index, &edge, Vec3::new(1.0, 0.0, 0.0), RED),
            Err(PlacementRejection::OutOfBounds)
        );
    }

    #[test]
    fn grid_clicks_snap_and_stack() {
        let mut index = SpatialIndex::default();
        let r = resolver();
        let first = r
            .resolve_from_empty_grid(&mut index, Vec3::new(1.4, 0.0, -2.6), RED)
            .unwrap();
        assert_eq!(first.column, GridColumn::new(1, -3));
        assert_eq!(first.height, 0.5);

        // A different point in the same cell stacks instead of overwriting.
        let second = r
            .resolve_from_empty_grid(&mut index, Vec3::new(0.6, 0.0, -3.3), BLUE)
            .unwrap();
        assert_eq!(second.column, first.column);
        assert_eq!(second.height, 1.5);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn grid_click_with_non_finite_point_is_out_of_bounds() {
        let mut index = SpatialIndex::default();
        let r = resolver();
        assert_eq!(
            r.resolve_from_empty_grid(&mut index, Vec3::new(f32::NAN, 0.0, 0.0), RED),
            Err(PlacementRejection::OutOfBounds)
        );
        assert!(index.is_empty());
    }
}
