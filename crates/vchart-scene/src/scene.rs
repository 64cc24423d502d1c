//! Chart-area scene orchestration.
//!
//! [`ChartScene3D`] owns the per-area 3D state and sequences the
//! subsystems once per layout/paint pass: wall width, scene depth,
//! matrix initialization, lighting, visible surfaces, center of
//! projection, then wall painting and draw-order resolution.

use std::cmp::Ordering;

use tracing::{debug, trace};
use vchart_math::{Matrix3D, Point3D, RectF};

use crate::collab::{AxisView, ChartTypeRegistry, Color, DrawingSurface, SeriesInfo};
use crate::depth::{self, SceneGeometry};
use crate::error::Result;
use crate::order::{self, DataPoint3D, PointsDrawingOrderComparer};
use crate::style::Scene3DStyle;
use crate::surfaces::{CoordAxes, ProjectionCenterSolver, SurfaceSet};

/// Lower clamp of the interval correction factor.
const MIN_INTERVAL_FACTOR: f32 = 0.15;
/// Change threshold above which a second customize/resize pass is
/// requested.
const INTERVAL_ADJUST_EPSILON: f32 = 0.01;

/// The 3D scene of one chart area.
///
/// Single-threaded and host-driven: the enclosing widget guarantees the
/// layout/paint sequence is never re-entered concurrently for the same
/// area. All cached state (scene geometry, visible surfaces, projection
/// center) is rebuilt by [`ChartScene3D::layout`].
#[derive(Debug)]
pub struct ChartScene3D {
    style: Scene3DStyle,
    matrix: Matrix3D,
    geometry: Option<SceneGeometry>,
    geometry_generation: u64,
    visible: SurfaceSet,
    projection_center: Point3D,
    inner_rect: RectF,
    reverse_series_order: bool,
    last_interval_factor: f32,
    resize_after_interval_adjusting: bool,
}

impl ChartScene3D {
    /// Create a scene with the given style.
    pub fn new(style: Scene3DStyle) -> Self {
        Self {
            style,
            matrix: Matrix3D::new(),
            geometry: None,
            geometry_generation: 0,
            visible: SurfaceSet::empty(),
            projection_center: Point3D::NAN,
            inner_rect: RectF::default(),
            reverse_series_order: false,
            last_interval_factor: 1.0,
            resize_after_interval_adjusting: false,
        }
    }

    /// The area's 3D style.
    pub fn style(&self) -> &Scene3DStyle {
        &self.style
    }

    /// Mutable access to the style; its setters validate ranges and bump
    /// the generation the cached geometry is checked against.
    pub fn style_mut(&mut self) -> &mut Scene3DStyle {
        &mut self.style
    }

    /// Whether series painting order is mirrored.
    pub fn reverse_series_order(&self) -> bool {
        self.reverse_series_order
    }

    /// Mirror the series painting order.
    pub fn set_reverse_series_order(&mut self, reverse: bool) {
        self.reverse_series_order = reverse;
        self.geometry = None;
    }

    /// The transform of the last layout pass.
    pub fn matrix(&self) -> &Matrix3D {
        &self.matrix
    }

    /// Camera-facing bounding planes of the last layout pass.
    pub fn visible_surfaces(&self) -> SurfaceSet {
        self.visible
    }

    /// Center of projection of the last layout pass (NaN per axis when
    /// there is no crossing).
    pub fn projection_center(&self) -> Point3D {
        self.projection_center
    }

    /// Scene geometry of the last layout pass.
    pub fn geometry(&self) -> Option<&SceneGeometry> {
        self.geometry.as_ref()
    }

    /// Plot rectangle after the wall margin was taken.
    pub fn inner_rect(&self) -> RectF {
        self.inner_rect
    }

    /// Shrink the plot rectangle by the wall width: one side wall (the
    /// far side by rotation sign) and the floor.
    fn take_wall_margin(&self, plot_rect: RectF) -> RectF {
        let ww = self.style.wall_width();
        let mut inner = plot_rect;
        if ww > 0.0 && plot_rect.width > 2.0 * ww && plot_rect.height > 2.0 * ww {
            if self.style.rotation() >= 0.0 {
                inner.x += ww;
            }
            inner.width -= ww;
            inner.height -= ww;
        }
        inner
    }

    fn rebuild_geometry(
        &mut self,
        series: &[SeriesInfo],
        registry: &dyn ChartTypeRegistry,
    ) -> Result<()> {
        let generation = self.style.generation();
        if self.geometry.is_none() || self.geometry_generation != generation {
            self.geometry = Some(depth::calculate(
                series,
                registry,
                &self.style,
                self.reverse_series_order,
            )?);
            self.geometry_generation = generation;
        }
        Ok(())
    }

    /// Run one layout pass: wall width, scene depth, transform,
    /// lighting, visible surfaces and center of projection.
    ///
    /// `pixel_size` is the relative size of one device pixel and bounds
    /// the center-of-projection bisection.
    pub fn layout(
        &mut self,
        plot_rect: RectF,
        series: &[SeriesInfo],
        registry: &dyn ChartTypeRegistry,
        pixel_size: (f32, f32),
    ) -> Result<()> {
        self.inner_rect = self.take_wall_margin(plot_rect);
        self.rebuild_geometry(series, registry)?;
        let scene_depth = self
            .geometry
            .as_ref()
            .map(|g| g.scene_depth)
            .unwrap_or_default();

        self.matrix.initialize(
            self.inner_rect,
            scene_depth,
            self.style.inclination(),
            self.style.rotation(),
            self.style.perspective(),
            self.style.right_angle_axes(),
        );
        self.matrix.init_light(self.style.light_style());

        self.visible =
            crate::surfaces::visible_surfaces(self.inner_rect, 0.0, scene_depth, &self.matrix);
        let solver = ProjectionCenterSolver::new(
            self.inner_rect,
            0.0,
            scene_depth,
            &self.matrix,
            pixel_size,
        );
        self.projection_center = solver.center_of_projection(CoordAxes::all());

        debug!(
            scene_depth,
            visible = ?self.visible,
            center = ?self.projection_center,
            "3D scene layout"
        );
        Ok(())
    }

    /// Whether data points should be painted from the sides toward the
    /// X center of projection.
    pub fn points_to_center(&self) -> bool {
        self.style.perspective() > 0.0
            && !self.style.right_angle_axes()
            && !self.projection_center.x.is_nan()
    }

    /// Whether series should be painted from the outside toward the Z
    /// center of projection.
    pub fn series_to_center(&self) -> bool {
        self.style.perspective() > 0.0
            && !self.style.right_angle_axes()
            && !self.projection_center.z.is_nan()
    }

    /// Whether the series list is walked in reverse: the Y rotation
    /// crossed ±90° and the viewer looks at the scene from behind.
    pub fn series_order_reversed(&self) -> bool {
        self.style.rotation().abs() > 90.0
    }

    /// The comparator configured for the current view.
    pub fn point_comparer(&self, selection: bool) -> PointsDrawingOrderComparer {
        PointsDrawingOrderComparer {
            projection_center: self.projection_center,
            selection,
            bottom_visible: self.visible.contains(SurfaceSet::BOTTOM),
            reversed_x: self.style.rotation() < 0.0,
            view_from_bottom: self.style.inclination() < 0.0,
        }
    }

    /// Series painting order for the current view. Empty before the
    /// first layout pass.
    pub fn series_drawing_order(&self) -> Vec<String> {
        let Some(geometry) = &self.geometry else {
            return Vec::new();
        };
        let z_center = if self.series_to_center() {
            self.projection_center.z
        } else {
            f32::NAN
        };
        order::series_drawing_order(
            &geometry.clusters,
            self.series_order_reversed(),
            z_center,
            |name| geometry.series_z_position_and_depth(name).1,
        )
    }

    /// Depth-sorted point list for a group of series. Empty before the
    /// first layout pass.
    #[allow(clippy::too_many_arguments)]
    pub fn data_point_drawing_order(
        &self,
        names: &[String],
        series: &[SeriesInfo],
        registry: &dyn ChartTypeRegistry,
        x_axis: &dyn AxisView,
        y_axis: &dyn AxisView,
        y_value_index: usize,
        selection: bool,
        custom: Option<&dyn Fn(&DataPoint3D, &DataPoint3D) -> Ordering>,
    ) -> Vec<DataPoint3D> {
        let Some(geometry) = &self.geometry else {
            return Vec::new();
        };
        let comparer = self.point_comparer(selection);
        order::data_point_drawing_order(
            names,
            series,
            registry,
            geometry,
            x_axis,
            y_axis,
            y_value_index,
            &comparer,
            custom,
        )
    }

    /// Paint the scene walls: back wall, the far side wall and the
    /// floor. A wall is skipped when its surface faces the camera (the
    /// viewer would be looking at its inside) or when the wall width is
    /// zero.
    pub fn paint_walls(
        &self,
        surface: &mut dyn DrawingSurface,
        wall_color: Color,
        border_width: f32,
    ) {
        let ww = self.style.wall_width();
        if ww <= 0.0 || !self.matrix.is_initialized() {
            return;
        }
        let rect = self.inner_rect;
        let scene_depth = self
            .geometry
            .as_ref()
            .map(|g| g.scene_depth)
            .unwrap_or_default();
        let light = self.style.light_style();

        if !self.visible.contains(SurfaceSet::BACK) {
            trace!("painting back wall");
            surface.fill_3d_rectangle(
                rect,
                scene_depth,
                ww,
                &self.matrix,
                light,
                wall_color,
                border_width,
            );
        }

        let side_rect = if self.style.rotation() >= 0.0 {
            (!self.visible.contains(SurfaceSet::LEFT))
                .then(|| RectF::new(rect.x - ww, rect.y, ww, rect.height))
        } else {
            (!self.visible.contains(SurfaceSet::RIGHT))
                .then(|| RectF::new(rect.right(), rect.y, ww, rect.height))
        };
        if let Some(side) = side_rect {
            trace!("painting side wall");
            surface.fill_3d_rectangle(
                side,
                0.0,
                scene_depth + ww,
                &self.matrix,
                light,
                wall_color,
                border_width,
            );
        }

        if !self.visible.contains(SurfaceSet::BOTTOM) {
            trace!("painting floor wall");
            surface.fill_3d_rectangle(
                RectF::new(rect.x, rect.bottom(), rect.width, ww),
                0.0,
                scene_depth + ww,
                &self.matrix,
                light,
                wall_color,
                border_width,
            );
        }
    }

    /// Whether the last interval estimation changed the correction
    /// factor enough to require a second customize/resize pass.
    pub fn resize_after_interval_adjusting(&self) -> bool {
        self.resize_after_interval_adjusting
    }

    /// Estimate the axis-interval correction factor under the current
    /// rotation.
    ///
    /// Temporarily lays the scene out in `plot_rect`, transforms the 8
    /// corners of the plot cuboid and compares the projected extent with
    /// the flat extent. The factor shrinks axis label density when the
    /// rotated scene projects smaller than its 2D footprint; it is a
    /// heuristic stabilization, clamped to `[0.15, 1.0]`, and may flag a
    /// follow-up resize pass.
    pub fn estimate_interval(
        &mut self,
        plot_rect: RectF,
        series: &[SeriesInfo],
        registry: &dyn ChartTypeRegistry,
        pixel_size: (f32, f32),
    ) -> Result<f32> {
        // Estimation reruns the depth calculator from scratch.
        self.geometry = None;
        self.layout(plot_rect, series, registry, pixel_size)?;

        let rect = self.inner_rect;
        if !rect.is_valid() {
            return Ok(1.0);
        }
        let scene_depth = self
            .geometry
            .as_ref()
            .map(|g| g.scene_depth)
            .unwrap_or_default();

        let mut corners = [Point3D::ORIGIN; 8];
        let mut i = 0;
        for &z in &[0.0, scene_depth] {
            for &y in &[rect.y, rect.bottom()] {
                for &x in &[rect.x, rect.right()] {
                    corners[i] = Point3D::new(x, y, z);
                    i += 1;
                }
            }
        }
        self.matrix.transform_points(&mut corners);

        let (mut min_x, mut max_x) = (f32::INFINITY, f32::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f32::INFINITY, f32::NEG_INFINITY);
        for c in &corners {
            min_x = min_x.min(c.x);
            max_x = max_x.max(c.x);
            min_y = min_y.min(c.y);
            max_y = max_y.max(c.y);
        }

        // How much the rotated scene projects smaller than its flat
        // footprint; shrinks label density accordingly.
        let factor_x = (max_x - min_x) / rect.width.max(f32::EPSILON);
        let factor_y = (max_y - min_y) / rect.height.max(f32::EPSILON);
        let factor = factor_x.min(factor_y).clamp(MIN_INTERVAL_FACTOR, 1.0);

        if (factor - self.last_interval_factor).abs() > INTERVAL_ADJUST_EPSILON {
            self.resize_after_interval_adjusting = true;
        }
        self.last_interval_factor = factor;

        debug!(factor, "estimated 3D interval correction");
        Ok(factor)
    }
}
