//! Scene-relative points and rectangles.

use serde::{Deserialize, Serialize};

/// A point in chart-area scene space.
///
/// Before projection X/Y are relative chart-area coordinates and Z is the
/// depth position (0 at the scene front, growing toward the back wall).
/// After projection X/Y are screen positions and Z is the rotated depth.
///
/// We use a custom type instead of nalgebra::Point3 to enable serde
/// serialization without requiring nalgebra's serde feature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    /// X coordinate.
    pub x: f32,
    /// Y coordinate.
    pub y: f32,
    /// Z coordinate.
    pub z: f32,
}

impl Point3D {
    /// Create a new point.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Origin point (0, 0, 0).
    pub const ORIGIN: Self = Self::new(0.0, 0.0, 0.0);

    /// A point with every component set to NaN.
    ///
    /// Used by the center-of-projection solver to mean "no crossing point
    /// on any axis".
    pub const NAN: Self = Self::new(f32::NAN, f32::NAN, f32::NAN);

    /// Check that every component is a finite number.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Default for Point3D {
    fn default() -> Self {
        Self::ORIGIN
    }
}

/// An axis-aligned rectangle in relative chart-area coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RectF {
    /// Left edge.
    pub x: f32,
    /// Top edge (Y grows downward).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl RectF {
    /// Create a new rectangle from its top-left corner and size.
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Right edge.
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Bottom edge.
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Center point of the rectangle.
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Shrink the rectangle by `margin` on every side.
    ///
    /// A margin larger than half the size yields a degenerate (zero or
    /// negative sized) rectangle; callers guard against that.
    pub fn inflate(&self, margin: f32) -> Self {
        Self {
            x: self.x - margin,
            y: self.y - margin,
            width: self.width + 2.0 * margin,
            height: self.height + 2.0 * margin,
        }
    }

    /// Check whether the rectangle has positive area.
    pub fn is_valid(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}
