//! 3D style configuration for one chart area.

use serde::{Deserialize, Serialize};
use vchart_math::LightStyle;

use crate::error::{Result, SceneError};

/// 3D scene settings of a chart area.
///
/// All mutation goes through validated setters; an out-of-range value is
/// rejected and the previous value is kept. Every accepted mutation bumps
/// an internal generation counter, which the scene caches use to decide
/// when clusters and depth need recomputing.
///
/// Perspective and right-angle axes are mutually exclusive: enabling one
/// resets the other.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene3DStyle {
    enable: bool,
    right_angle_axes: bool,
    clustered: bool,
    light_style: LightStyle,
    perspective: f32,
    inclination: f32,
    rotation: f32,
    wall_width: f32,
    point_depth: f32,
    point_gap_depth: f32,
    #[serde(skip)]
    generation: u64,
}

impl Default for Scene3DStyle {
    fn default() -> Self {
        Self {
            enable: false,
            right_angle_axes: true,
            clustered: false,
            light_style: LightStyle::Simplistic,
            perspective: 0.0,
            inclination: 30.0,
            rotation: 30.0,
            wall_width: 5.0,
            point_depth: 100.0,
            point_gap_depth: 100.0,
            generation: 0,
        }
    }
}

impl Scene3DStyle {
    /// Create the default style.
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }

    fn check_range(name: &'static str, value: f32, min: f32, max: f32) -> Result<f32> {
        if value.is_finite() && (min..=max).contains(&value) {
            Ok(value)
        } else {
            Err(SceneError::OutOfRange {
                name,
                value,
                min,
                max,
            })
        }
    }

    /// Generation counter; changes on every accepted mutation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether 3D rendering is enabled for the area.
    pub fn enable(&self) -> bool {
        self.enable
    }

    /// Enable or disable 3D rendering.
    pub fn set_enable(&mut self, enable: bool) {
        self.enable = enable;
        self.bump();
    }

    /// Whether axes stay at right angles (orthographic mode).
    pub fn right_angle_axes(&self) -> bool {
        self.right_angle_axes
    }

    /// Switch right-angle mode. Enabling it resets perspective to 0.
    pub fn set_right_angle_axes(&mut self, right_angle: bool) {
        self.right_angle_axes = right_angle;
        if right_angle {
            self.perspective = 0.0;
        }
        self.bump();
    }

    /// Whether series of one chart type share a single depth slot.
    pub fn clustered(&self) -> bool {
        self.clustered
    }

    /// Set whether series share a depth slot.
    pub fn set_clustered(&mut self, clustered: bool) {
        self.clustered = clustered;
        self.bump();
    }

    /// Surface lighting style.
    pub fn light_style(&self) -> LightStyle {
        self.light_style
    }

    /// Set the surface lighting style.
    pub fn set_light_style(&mut self, style: LightStyle) {
        self.light_style = style;
        self.bump();
    }

    /// Perspective percentage, 0 to 100.
    pub fn perspective(&self) -> f32 {
        self.perspective
    }

    /// Set the perspective percentage (0–100).
    ///
    /// A non-zero value disables right-angle axes.
    pub fn set_perspective(&mut self, perspective: f32) -> Result<()> {
        self.perspective = Self::check_range("Perspective", perspective, 0.0, 100.0)?;
        if self.perspective != 0.0 {
            self.right_angle_axes = false;
        }
        self.bump();
        Ok(())
    }

    /// Inclination in degrees, −90 to 90.
    pub fn inclination(&self) -> f32 {
        self.inclination
    }

    /// Set the inclination angle (−90 to 90 degrees).
    pub fn set_inclination(&mut self, inclination: f32) -> Result<()> {
        self.inclination = Self::check_range("Inclination", inclination, -90.0, 90.0)?;
        self.bump();
        Ok(())
    }

    /// Rotation in degrees, −180 to 180.
    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Set the rotation angle (−180 to 180 degrees).
    pub fn set_rotation(&mut self, rotation: f32) -> Result<()> {
        self.rotation = Self::check_range("Rotation", rotation, -180.0, 180.0)?;
        self.bump();
        Ok(())
    }

    /// Scene wall width in relative units, 0 to 30.
    pub fn wall_width(&self) -> f32 {
        self.wall_width
    }

    /// Set the scene wall width (0–30).
    pub fn set_wall_width(&mut self, wall_width: f32) -> Result<()> {
        self.wall_width = Self::check_range("WallWidth", wall_width, 0.0, 30.0)?;
        self.bump();
        Ok(())
    }

    /// Point depth percentage, 0 to 1000.
    pub fn point_depth(&self) -> f32 {
        self.point_depth
    }

    /// Set the point depth percentage (0–1000).
    pub fn set_point_depth(&mut self, point_depth: f32) -> Result<()> {
        self.point_depth = Self::check_range("PointDepth", point_depth, 0.0, 1000.0)?;
        self.bump();
        Ok(())
    }

    /// Point gap depth percentage, 0 to 1000.
    pub fn point_gap_depth(&self) -> f32 {
        self.point_gap_depth
    }

    /// Set the point gap depth percentage (0–1000).
    pub fn set_point_gap_depth(&mut self, point_gap_depth: f32) -> Result<()> {
        self.point_gap_depth =
            Self::check_range("PointGapDepth", point_gap_depth, 0.0, 1000.0)?;
        self.bump();
        Ok(())
    }
}
