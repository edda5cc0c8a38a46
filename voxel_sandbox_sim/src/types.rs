// Core types shared across the sandbox.
//
// Defines the grid column key (`GridColumn`), the placed-cube record
// (`Cube`) and its compact handle (`CubeId`), the opaque display color
// (`Color`), and a minimal `Vec3` for world-space points, face normals and
// rays. All types derive `Serialize` and `Deserialize` so they can cross the
// host boundary inside commands and events.
//
// `GridColumn` is a genuine composite key (two integers), never a formatted
// string: `(-1, 12)` and `(-11, 2)` must not collide, and ordering must be
// total so columns can live in a `BTreeMap`.
//
// See also: `spatial_index.rs` which owns all `Cube` records,
// `placement.rs` which snaps world points to `GridColumn`s.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// An integer column coordinate on the ground grid.
///
/// The coordinate system matches the host renderer:
/// - X: east  (positive) / west  (negative)
/// - Y: up    (not part of the column key)
/// - Z: south (positive) / north (negative)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridColumn {
    pub x: i32,
    pub z: i32,
}

impl GridColumn {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Snap a world-space (x, z) pair to the nearest column.
    ///
    /// Halfway values round toward positive infinity (`-2.5 -> -2`,
    /// `2.5 -> 3`), matching the host renderer's rounding. Returns `None`
    /// for non-finite input or values that cannot be represented as `i32`.
    pub fn snap(x: f32, z: f32) -> Option<Self> {
        Some(Self::new(snap_axis(x)?, snap_axis(z)?))
    }

    /// The column offset by `(dx, dz)`. Saturates instead of overflowing so
    /// an offset from an extreme column simply lands out of bounds.
    pub fn offset(self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
    }
}

fn snap_axis(v: f32) -> Option<i32> {
    if !v.is_finite() {
        return None;
    }
    let rounded = (f64::from(v) + 0.5).floor();
    if rounded < f64::from(i32::MIN) || rounded > f64::from(i32::MAX) {
        return None;
    }
    Some(rounded as i32)
}

impl fmt::Display for GridColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.z)
    }
}

/// A world-space vector: points, directions, and face normals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0);
    pub const UP: Self = Self::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Components in axis order `[x, y, z]`.
    pub fn to_array(self) -> [f32; 3] {
        [self.x, self.y, self.z]
    }

    pub fn dot(self, other: Self) -> f32 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    pub fn cross(self, other: Self) -> Self {
        Self::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    pub fn length(self) -> f32 {
        self.dot(self).sqrt()
    }

    /// Unit-length copy, or `None` for a zero/non-finite vector.
    pub fn normalized(self) -> Option<Self> {
        let len = self.length();
        if len > f32::EPSILON && len.is_finite() {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl From<[f32; 3]> for Vec3 {
    fn from([x, y, z]: [f32; 3]) -> Self {
        Self::new(x, y, z)
    }
}

impl Add for Vec3 {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Self;
    fn mul(self, rhs: f32) -> Self {
        Self::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Neg for Vec3 {
    type Output = Self;
    fn neg(self) -> Self {
        Self::new(-self.x, -self.y, -self.z)
    }
}

// ---------------------------------------------------------------------------
// Color (opaque display attribute)
// ---------------------------------------------------------------------------

/// A 24-bit RGB color. Has no effect on placement logic; the index only
/// stores it so the host can build a material for the cube.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self(((r as u32) << 16) | ((g as u32) << 8) | b as u32)
    }

    /// Parse `#rrggbb` (the leading `#` is optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.strip_prefix('#').unwrap_or(s);
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        u32::from_str_radix(hex, 16).ok().map(Self)
    }
}

// Serialize as the `#rrggbb` string the palette and scripts use.
impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Color::from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid #rrggbb color"))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0 & 0x00ff_ffff)
    }
}

impl fmt::Debug for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Color({})", self)
    }
}

// ---------------------------------------------------------------------------
// Placed cubes
// ---------------------------------------------------------------------------

/// Compact handle for a placed cube. Allocated monotonically by the
/// `SpatialIndex`, so ordering by id is insertion order. Never reused within
/// one index, even across `clear()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CubeId(pub u64);

impl fmt::Display for CubeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Cube#{}", self.0)
    }
}

/// A unit-sized placed block.
///
/// Identity in the world is `(column, height)`: the index never holds two
/// cubes whose centers in the same column are within the occupancy
/// tolerance. `id` is only a handle for the host.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cube {
    pub id: CubeId,
    pub column: GridColumn,
    /// Elevation of the cube's center above the ground plane.
    pub height: f32,
    /// Position in the column's stack at insertion time (0-based, bottom to
    /// top). Informational only; not kept contiguous after removals.
    pub stack_index: u32,
    pub color: Color,
}

impl Cube {
    /// Elevation of the cube's bottom face.
    pub fn bottom(&self, unit_size: f32) -> f32 {
        self.height - unit_size / 2.0
    }

    /// Elevation of the cube's top face.
    pub fn top(&self, unit_size: f32) -> f32 {
        self.height + unit_size / 2.0
    }

    /// World-space center of the cube.
    pub fn center(&self) -> Vec3 {
        Vec3::new(self.column.x as f32, self.height, self.column.z as f32)
    }
}
