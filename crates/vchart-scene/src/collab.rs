//! Collaborator interfaces of the scene kernel.
//!
//! The kernel computes projection and ordering; everything it needs from
//! the host chart (rasterization, chart-type rules, axis scaling) comes
//! in through the traits defined here.

use serde::{Deserialize, Serialize};
use vchart_math::{LightStyle, Matrix3D, Point3D, RectF};

use crate::error::{Result, SceneError};

/// An RGBA color with components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    /// Red component.
    pub r: f32,
    /// Green component.
    pub g: f32,
    /// Blue component.
    pub b: f32,
    /// Alpha component.
    pub a: f32,
}

impl Color {
    /// Create a color from red, green, blue and alpha.
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque color.
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Scale the color channels by a lighting intensity, leaving alpha.
    pub fn shaded(self, intensity: f32) -> Self {
        Self {
            r: self.r * intensity,
            g: self.g * intensity,
            b: self.b * intensity,
            a: self.a,
        }
    }
}

/// Per-series resolution of side-by-side drawing.
///
/// The custom property overrides the chart-type default; `Auto` defers
/// to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SideBySide {
    /// Use the chart-type default.
    #[default]
    Auto,
    /// Force side-by-side layout.
    True,
    /// Force a dedicated slot.
    False,
}

impl SideBySide {
    /// Parse the `DrawSideBySide` custom property (case-insensitive).
    ///
    /// `None` means the property is absent and resolves to `Auto`; an
    /// unrecognized value is a configuration error.
    pub fn parse(series: &str, raw: Option<&str>) -> Result<Self> {
        match raw {
            None => Ok(Self::Auto),
            Some(v) => match v.trim().to_ascii_lowercase().as_str() {
                "auto" => Ok(Self::Auto),
                "true" => Ok(Self::True),
                "false" => Ok(Self::False),
                _ => Err(SceneError::InvalidSideBySide {
                    series: series.to_owned(),
                    value: v.to_owned(),
                }),
            },
        }
    }

    /// Resolve against the chart-type default.
    pub fn resolve(self, type_default: bool) -> bool {
        match self {
            Self::Auto => type_default,
            Self::True => true,
            Self::False => false,
        }
    }
}

/// Metadata of one data series attached to the chart area.
///
/// The kernel never reads Y values directly; it asks the
/// [`ChartTypeRegistry`] so that stacked chart types can substitute
/// accumulated values.
#[derive(Debug, Clone, Default)]
pub struct SeriesInfo {
    /// Unique series name within the chart area.
    pub name: String,
    /// Name of the chart type rendering this series.
    pub chart_type: String,
    /// Stack group name for stacked chart types that support groups.
    pub stack_group: Option<String>,
    /// Raw `DrawSideBySide` custom property, if set.
    pub draw_side_by_side: Option<String>,
    /// Number of data points.
    pub point_count: usize,
    /// X values; empty when the series is indexed.
    pub x_values: Vec<f64>,
    /// Whether X positions are point indices rather than values.
    pub indexed_x: bool,
}

impl SeriesInfo {
    /// X value of a point: the stored value, or the 1-based index when
    /// indexed. A value-X series with fewer stored values than points
    /// (a transient state while data is rebound) falls back to the index
    /// rather than failing.
    pub fn x_value(&self, point: usize) -> f64 {
        if self.indexed_x {
            (point + 1) as f64
        } else {
            self.x_values
                .get(point)
                .copied()
                .unwrap_or((point + 1) as f64)
        }
    }
}

/// Behavior flags of a chart type.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartTypeTraits {
    /// Series of this type stack on top of each other.
    pub stacked: bool,
    /// Series of this type draw side by side within one interval.
    pub side_by_side: bool,
    /// Stacked type that honors stack group names.
    pub supports_stacked_groups: bool,
    /// Z encodes actual data; the series computes its own depth.
    pub real_z_depth: bool,
}

/// Read-only chart-type and value queries supplied by the host.
pub trait ChartTypeRegistry {
    /// Behavior flags for a chart type name.
    fn type_traits(&self, chart_type: &str) -> ChartTypeTraits;

    /// Width of one point in axis-relative units for the given interval.
    fn point_width(&self, _chart_type: &str, interval: f32) -> f32 {
        interval * 0.8
    }

    /// Point depth and gap depth in relative units for the given interval,
    /// before the style percentages are applied.
    fn point_depth_and_gap(&self, chart_type: &str, interval: f32) -> (f32, f32) {
        (self.point_width(chart_type, interval), interval * 0.3)
    }

    /// Y value of a point, through the chart type's accessor.
    ///
    /// `y_value_index` selects among multiple Y values (e.g. 0 for the
    /// top of a bar, 1 for its base).
    fn y_value(&self, series: &SeriesInfo, point: usize, y_value_index: usize) -> f64;

    /// Base value a point grows from (stacked base, or the axis zero).
    fn y_base_value(&self, _series: &SeriesInfo, _point: usize) -> f64 {
        0.0
    }

    /// (depth, Z position) pair computed by a real-Z-depth series from its
    /// Z values and marker sizing. The default is the silent zero-depth
    /// fallback used when no entry exists.
    fn real_z_position_and_depth(&self, _series: &SeriesInfo) -> (f32, f32) {
        (0.0, 0.0)
    }
}

/// Axis scaling queries supplied by the host.
///
/// The kernel itself only reads [`AxisView::position`]; the view bounds
/// and pixel interval complete the surface for the axis and grid
/// painters the host layers on top of the kernel's draw order.
pub trait AxisView {
    /// Relative chart-area position of an axis value.
    fn position(&self, value: f64) -> f32;

    /// Lower bound of the current axis view.
    fn view_minimum(&self) -> f64;

    /// Upper bound of the current axis view.
    fn view_maximum(&self) -> f64;

    /// Size of one device pixel in axis-relative units.
    fn pixel_interval(&self) -> f32;
}

/// 2D drawing surface the scene paints through.
///
/// The kernel sequences what gets drawn and in which order; the surface
/// owns rasterization.
pub trait DrawingSurface {
    /// Fill a 3D rectangle (a wall slab) located at `z_position` with the
    /// given depth, projected through `matrix` and shaded per `light`.
    fn fill_3d_rectangle(
        &mut self,
        rect: RectF,
        z_position: f32,
        depth: f32,
        matrix: &Matrix3D,
        light: LightStyle,
        color: Color,
        border_width: f32,
    );

    /// Draw a grid line between two scene-space points.
    ///
    /// Called by the host's axis and grid painters; the kernel itself
    /// only issues wall fills.
    fn draw_3d_grid_line(
        &mut self,
        start: Point3D,
        end: Point3D,
        matrix: &Matrix3D,
        color: Color,
        width: f32,
    );

    /// Relative size of one device pixel, as (width, height).
    fn pixel_size(&self) -> (f32, f32);

    /// Orientation test over projected points; the default forwards to
    /// the kernel's own predicate.
    fn is_surface_visible(&self, p0: Point3D, p1: Point3D, p2: Point3D) -> bool {
        vchart_math::is_surface_visible(p0, p1, p2)
    }
}
