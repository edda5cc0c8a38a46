// Ray casting against placed cubes and the ground plane.
//
// The engine does not depend on any renderer's picking. Hosts that already
// have one can implement `RayCaster` themselves; everyone else uses
// `SlabRayCaster`, which tests each cube's axis-aligned box with the slab
// method and intersects the ground plane analytically.
//
// Conventions shared by every caster:
// - `Ray::direction` is unit length, so `distance` is in world units.
// - Cube hits come back nearest first. Equal distances keep the index's
//   insertion order.
// - A cube whose box contains the ray origin is not reported (the camera
//   is inside it, there is no face to click).
// - The hit normal is the outward normal of the face the ray entered
//   through, axis-aligned and unit length.
// - The ground plane is y = 0, limited to the grid square
//   `|x|, |z| <= grid_size/2`, and can be hit from either side.
//
// `pick()` applies the click priority: any cube hit beats the ground.
//
// See also: `placement.rs` which consumes hits, `sandbox.rs` for
// `primary_action()`/`secondary_action()`.

use crate::config::SandboxConfig;
use crate::spatial_index::SpatialIndex;
use crate::types::{Cube, CubeId, Vec3};
use serde::{Deserialize, Serialize};

/// Direction components smaller than this are treated as parallel to a slab.
const PARALLEL_EPSILON: f32 = 1e-6;

/// A half-line in world space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    /// Build a ray, normalizing `direction`. `None` for a zero or non-finite
    /// direction, or a non-finite origin.
    pub fn new(origin: Vec3, direction: Vec3) -> Option<Self> {
        if !origin.is_finite() {
            return None;
        }
        let direction = direction.normalized()?;
        Some(Self { origin, direction })
    }

    /// The point at distance `t` along the ray.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// A ray intersection with a placed cube.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CubeHit {
    pub cube: CubeId,
    pub point: Vec3,
    pub normal: Vec3,
    pub distance: f32,
}

/// A ray intersection with the ground plane.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundHit {
    pub point: Vec3,
    pub distance: f32,
}

/// What a click landed on.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum RayHit {
    Cube(CubeHit),
    Ground(GroundHit),
}

/// Intersection queries the sandbox needs from a picking backend.
pub trait RayCaster {
    /// Every cube the ray enters, nearest first.
    fn intersect_cubes(&self, ray: &Ray, index: &SpatialIndex) -> Vec<CubeHit>;

    /// The ground-plane hit, if the ray reaches the grid square.
    fn intersect_ground(&self, ray: &Ray) -> Option<GroundHit>;

    /// Nearest cube hit, falling back to the ground.
    fn pick(&self, ray: &Ray, index: &SpatialIndex) -> Option<RayHit> {
        if let Some(hit) = self.intersect_cubes(ray, index).into_iter().next() {
            return Some(RayHit::Cube(hit));
        }
        self.intersect_ground(ray).map(RayHit::Ground)
    }
}

// ---------------------------------------------------------------------------
// Slab-method caster
// ---------------------------------------------------------------------------

/// Pure-geometry `RayCaster` over the index's cube boxes.
#[derive(Clone, Copy, Debug)]
pub struct SlabRayCaster {
    half_extent: f32,
    unit_size: f32,
}

impl SlabRayCaster {
    pub fn new(config: &SandboxConfig) -> Self {
        Self {
            half_extent: config.half_extent() as f32,
            unit_size: config.unit_size,
        }
    }

    /// Entry distance and entry normal for one cube, or `None` on a miss or
    /// when the origin is inside the box.
    fn intersect_cube(&self, ray: &Ray, cube: &Cube) -> Option<(f32, Vec3)> {
        let half = self.unit_size / 2.0;
        let origins = ray.origin.to_array();
        let directions = ray.direction.to_array();
        let centers = cube.center().to_array();
        let mut t_near = f32::NEG_INFINITY;
        let mut t_far = f32::INFINITY;
        let mut entry_axis = None;

        let slabs = origins.into_iter().zip(directions).zip(centers);
        for (axis, ((origin, dir), center)) in slabs.enumerate() {
            let min = center - half;
            let max = center + half;

            if dir.abs() < PARALLEL_EPSILON {
                if origin < min || origin > max {
                    return None;
                }
                continue;
            }

            let t1 = (min - origin) / dir;
            let t2 = (max - origin) / dir;
            let (near, far) = if t1 < t2 { (t1, t2) } else { (t2, t1) };
            if near > t_near {
                t_near = near;
                entry_axis = Some(axis);
            }
            t_far = t_far.min(far);
            if t_near > t_far {
                return None;
            }
        }

        if t_near < 0.0 {
            // Box is behind the ray, or the origin is inside it.
            return None;
        }
        let axis = entry_axis?;
        let mut normal = [0.0; 3];
        normal[axis] = -directions[axis].signum();
        Some((t_near, Vec3::from(normal)))
    }
}

impl RayCaster for SlabRayCaster {
    fn intersect_cubes(&self, ray: &Ray, index: &SpatialIndex) -> Vec<CubeHit> {
        let mut hits: Vec<CubeHit> = index
            .all_placed()
            .filter_map(|cube| {
                let (distance, normal) = self.intersect_cube(ray, cube)?;
                Some(CubeHit {
                    cube: cube.id,
                    point: ray.at(distance),
                    normal,
                    distance,
                })
            })
            .collect();
        // Stable sort: equal distances keep insertion order.
        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    fn intersect_ground(&self, ray: &Ray) -> Option<GroundHit> {
        let dy = ray.direction.y;
        if dy.abs() < PARALLEL_EPSILON {
            return None;
        }
        let distance = -ray.origin.y / dy;
        if distance < 0.0 {
            return None;
        }
        let point = ray.at(distance);
        if point.x.abs() > self.half_extent || point.z.abs() > self.half_extent {
            return None;
        }
        Some(GroundHit {
            point: Vec3::new(point.x, 0.0, point.z),
            distance,
        })
    }
}
