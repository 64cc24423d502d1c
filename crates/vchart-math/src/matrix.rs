//! Chart-area 3D transform matrix and lighting model.

use nalgebra::{Matrix4, Vector3, Vector4};
use serde::{Deserialize, Serialize};

use crate::point::{Point3D, RectF};

/// Lighting style applied to scene surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LightStyle {
    /// No lighting; surfaces keep their base color.
    None,
    /// Banded intensity by surface orientation. The default.
    #[default]
    Simplistic,
    /// Intensity proportional to the angle between surface normal and the
    /// light direction.
    Realistic,
}

/// Denominator floor for the perspective divide on degenerate input.
const MIN_PERSPECTIVE_DENOM: f64 = 1e-6;

/// The 3D-to-2D projection transform of one chart area.
///
/// Created once per chart area and re-initialized on every layout pass
/// with the current style values; queried many times per paint pass.
///
/// Positive rotation brings the right scene wall toward the viewer,
/// positive inclination the top wall. In right-angle mode the projection
/// is orthographic and the perspective percentage is ignored.
#[derive(Debug, Clone)]
pub struct Matrix3D {
    initialized: bool,
    /// Scene center in (x, y, z) relative coordinates.
    center: Vector3<f64>,
    /// Composed rotation (inclination then rotation), no translation.
    rotation: Matrix4<f64>,
    right_angle: bool,
    /// Camera distance from the scene center along +Z; infinite for
    /// parallel projection.
    view_distance: f64,
    inclination: f32,
    rotation_deg: f32,
    light: LightStyle,
    /// Light direction in rotated view space, pointing into the scene.
    light_vector: Vector3<f64>,
}

impl Default for Matrix3D {
    fn default() -> Self {
        Self::new()
    }
}

impl Matrix3D {
    /// Create an uninitialized matrix. [`Matrix3D::transform_points`] is a
    /// no-op until [`Matrix3D::initialize`] has been called.
    pub fn new() -> Self {
        Self {
            initialized: false,
            center: Vector3::zeros(),
            rotation: Matrix4::identity(),
            right_angle: true,
            view_distance: f64::INFINITY,
            inclination: 0.0,
            rotation_deg: 0.0,
            light: LightStyle::None,
            light_vector: Vector3::new(0.0, 0.0, -1.0),
        }
    }

    /// Configure the transform for one layout pass.
    ///
    /// `plot_rect` is the inner plot area in relative coordinates,
    /// `scene_depth` the Z extent of the plotting volume,
    /// `inclination_deg`/`rotation_deg` the X/Y rotation angles in degrees
    /// and `perspective_pct` the perspective percentage (0 = parallel,
    /// 100 = maximum convergence). `right_angle` selects the orthographic
    /// degenerate mode.
    ///
    /// A zero-size rectangle yields degenerate but non-panicking output.
    pub fn initialize(
        &mut self,
        plot_rect: RectF,
        scene_depth: f32,
        inclination_deg: f32,
        rotation_deg: f32,
        perspective_pct: f32,
        right_angle: bool,
    ) {
        let (cx, cy) = plot_rect.center();
        self.center = Vector3::new(cx as f64, cy as f64, scene_depth as f64 / 2.0);

        // Rx(-inclination) tilts the top wall toward the viewer for
        // positive inclination; Ry(-rotation) brings the right wall
        // forward for positive rotation. Y grows downward on screen.
        let incl = (inclination_deg as f64).to_radians();
        let rot = (rotation_deg as f64).to_radians();
        let (si, ci) = incl.sin_cos();
        let (sr, cr) = rot.sin_cos();

        let mut rx = Matrix4::identity();
        rx[(1, 1)] = ci;
        rx[(1, 2)] = si;
        rx[(2, 1)] = -si;
        rx[(2, 2)] = ci;

        let mut ry = Matrix4::identity();
        ry[(0, 0)] = cr;
        ry[(0, 2)] = -sr;
        ry[(2, 0)] = sr;
        ry[(2, 2)] = cr;

        self.rotation = rx * ry;
        self.right_angle = right_angle;
        self.inclination = inclination_deg;
        self.rotation_deg = rotation_deg;

        self.view_distance = if right_angle || perspective_pct <= 0.0 {
            f64::INFINITY
        } else {
            // Camera distance shrinks as the percentage grows; at 100 the
            // camera sits three half-extents from the scene center, which
            // keeps the divide denominator positive for any scene point.
            let half = (plot_rect.width.max(plot_rect.height).max(scene_depth) as f64) / 2.0;
            half * (1.0 + 200.0 / perspective_pct as f64)
        };

        self.initialized = true;
    }

    /// Whether [`Matrix3D::initialize`] has been called.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Precompute lighting parameters for the given style.
    pub fn init_light(&mut self, style: LightStyle) {
        self.light = style;
        self.light_vector = Vector3::new(0.0, 0.0, -1.0);
    }

    /// The lighting style the matrix was initialized with.
    pub fn light_style(&self) -> LightStyle {
        self.light
    }

    /// Map scene-space points to projected screen positions in place.
    ///
    /// After the call X/Y hold screen coordinates and Z the rotated depth
    /// (larger Z is nearer the viewer). No-op if uninitialized.
    pub fn transform_points(&self, points: &mut [Point3D]) {
        if !self.initialized {
            return;
        }
        for p in points.iter_mut() {
            *p = self.transform_point(*p);
        }
    }

    /// Transform a single point. See [`Matrix3D::transform_points`].
    pub fn transform_point(&self, p: Point3D) -> Point3D {
        if !self.initialized {
            return p;
        }
        // Scene Z grows away from the viewer (0 = front, depth = back);
        // view space wants the opposite, so Z is flipped while centering.
        let v = Vector4::new(
            p.x as f64 - self.center.x,
            p.y as f64 - self.center.y,
            self.center.z - p.z as f64,
            1.0,
        );
        let r = self.rotation * v;

        let (x, y) = if self.view_distance.is_finite() {
            let denom = (self.view_distance - r.z).max(MIN_PERSPECTIVE_DENOM);
            let f = self.view_distance / denom;
            (r.x * f, r.y * f)
        } else {
            (r.x, r.y)
        };

        Point3D::new(
            (self.center.x + x) as f32,
            (self.center.y + y) as f32,
            r.z as f32,
        )
    }

    /// Rotate a scene-space direction without projecting it.
    ///
    /// Used for surface normals, which must not go through the
    /// perspective divide.
    pub fn rotate_vector(&self, v: Point3D) -> Point3D {
        // Same Z flip as transform_point, so normals stay consistent.
        let r = self.rotation * Vector4::new(v.x as f64, v.y as f64, -v.z as f64, 0.0);
        Point3D::new(r.x as f32, r.y as f32, r.z as f32)
    }

    /// Shading intensity in `[0, 1]` for the surface spanned by three
    /// scene-space points, under the initialized light style.
    ///
    /// The points must be untransformed; the surface normal is rotated
    /// into view space and compared against the light direction.
    pub fn surface_intensity(&self, p0: Point3D, p1: Point3D, p2: Point3D) -> f32 {
        if self.light == LightStyle::None {
            return 1.0;
        }
        // Z flipped into view space, matching transform_point.
        let e1 = Vector3::new(
            (p1.x - p0.x) as f64,
            (p1.y - p0.y) as f64,
            (p0.z - p1.z) as f64,
        );
        let e2 = Vector3::new(
            (p2.x - p0.x) as f64,
            (p2.y - p0.y) as f64,
            (p0.z - p2.z) as f64,
        );
        let m3 = self.rotation.fixed_view::<3, 3>(0, 0);
        let n = (m3 * e1).cross(&(m3 * e2));
        let len = n.norm();
        if len < MIN_PERSPECTIVE_DENOM {
            // Degenerate surface, leave unshaded.
            return 1.0;
        }
        let cos = (n.dot(&self.light_vector) / len).abs();

        match self.light {
            LightStyle::None => 1.0,
            LightStyle::Simplistic => {
                if cos > 0.75 {
                    1.0
                } else if cos > 0.35 {
                    0.75
                } else {
                    0.55
                }
            }
            LightStyle::Realistic => (0.25 + 0.75 * cos) as f32,
        }
    }
}

/// Orientation predicate over projected points.
///
/// A surface is camera-facing when its corners, ordered as seen from
/// outside the scene cuboid, project clockwise on screen (Y grows
/// downward). Returns `false` for edge-on (zero signed area) surfaces.
pub fn is_surface_visible(p0: Point3D, p1: Point3D, p2: Point3D) -> bool {
    let signed = (p1.x - p0.x) as f64 * (p2.y - p0.y) as f64
        - (p2.x - p0.x) as f64 * (p1.y - p0.y) as f64;
    signed > 0.0
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const RECT: RectF = RectF::new(10.0, 10.0, 80.0, 60.0);
    const DEPTH: f32 = 40.0;

    fn matrix(incl: f32, rot: f32, persp: f32, right_angle: bool) -> Matrix3D {
        let mut m = Matrix3D::new();
        m.initialize(RECT, DEPTH, incl, rot, persp, right_angle);
        m
    }

    /// The 8 corners of the scene cuboid, front face first.
    fn corners() -> [Point3D; 8] {
        [
            Point3D::new(RECT.x, RECT.y, 0.0),
            Point3D::new(RECT.right(), RECT.y, 0.0),
            Point3D::new(RECT.right(), RECT.bottom(), 0.0),
            Point3D::new(RECT.x, RECT.bottom(), 0.0),
            Point3D::new(RECT.x, RECT.y, DEPTH),
            Point3D::new(RECT.right(), RECT.y, DEPTH),
            Point3D::new(RECT.right(), RECT.bottom(), DEPTH),
            Point3D::new(RECT.x, RECT.bottom(), DEPTH),
        ]
    }

    #[test]
    fn test_uninitialized_is_noop() {
        let m = Matrix3D::new();
        assert!(!m.is_initialized());
        let p = Point3D::new(1.0, 2.0, 3.0);
        assert_eq!(m.transform_point(p), p);
    }

    #[test]
    fn test_head_on_projection_keeps_xy() {
        let m = matrix(0.0, 0.0, 0.0, true);
        let p = m.transform_point(Point3D::new(30.0, 25.0, DEPTH / 2.0));
        assert_abs_diff_eq!(p.x, 30.0, epsilon = 1e-4);
        assert_abs_diff_eq!(p.y, 25.0, epsilon = 1e-4);
        assert_abs_diff_eq!(p.z, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_front_corners_nearer_than_back() {
        let m = matrix(30.0, 30.0, 0.0, false);
        let mut pts = corners();
        m.transform_points(&mut pts);
        // Averaged over the face, the front (z=0) corners must come out
        // nearer the viewer than the back ones.
        let front: f32 = pts[..4].iter().map(|p| p.z).sum();
        let back: f32 = pts[4..].iter().map(|p| p.z).sum();
        assert!(front > back);
    }

    #[test]
    fn test_positive_rotation_brings_right_side_forward() {
        let m = matrix(0.0, 30.0, 0.0, false);
        let left = m.transform_point(Point3D::new(RECT.x, RECT.y, DEPTH / 2.0));
        let right = m.transform_point(Point3D::new(RECT.right(), RECT.y, DEPTH / 2.0));
        assert!(right.z > left.z);
    }

    #[test]
    fn test_positive_inclination_brings_top_forward() {
        let m = matrix(30.0, 0.0, 0.0, false);
        let top = m.transform_point(Point3D::new(RECT.x, RECT.y, DEPTH / 2.0));
        let bottom = m.transform_point(Point3D::new(RECT.x, RECT.bottom(), DEPTH / 2.0));
        assert!(top.z > bottom.z);
    }

    #[test]
    fn test_perspective_shrinks_far_points() {
        let parallel = matrix(0.0, 0.0, 0.0, false);
        let persp = matrix(0.0, 0.0, 50.0, false);
        let far = Point3D::new(RECT.right(), RECT.y, DEPTH);
        let p0 = parallel.transform_point(far);
        let p1 = persp.transform_point(far);
        let (cx, _) = RECT.center();
        // The far corner converges toward the center under perspective.
        assert!((p1.x - cx).abs() < (p0.x - cx).abs());
    }

    #[test]
    fn test_right_angle_ignores_perspective() {
        let ortho = matrix(20.0, 20.0, 0.0, true);
        let forced = matrix(20.0, 20.0, 80.0, true);
        for c in corners() {
            let a = ortho.transform_point(c);
            let b = forced.transform_point(c);
            assert!((a.x - b.x).abs() < 1e-6 && (a.y - b.y).abs() < 1e-6);
        }
    }

    #[test]
    fn test_zero_rect_does_not_panic() {
        let mut m = Matrix3D::new();
        m.initialize(RectF::new(0.0, 0.0, 0.0, 0.0), 0.0, 45.0, 45.0, 100.0, false);
        let p = m.transform_point(Point3D::new(0.0, 0.0, 0.0));
        assert!(p.x.is_finite() && p.y.is_finite());
    }

    #[test]
    fn test_surface_visibility_winding() {
        // Clockwise on screen (Y down): top-left, top-right, bottom-right.
        let a = Point3D::new(0.0, 0.0, 0.0);
        let b = Point3D::new(1.0, 0.0, 0.0);
        let c = Point3D::new(1.0, 1.0, 0.0);
        assert!(is_surface_visible(a, b, c));
        assert!(!is_surface_visible(b, a, c));
        // Edge-on is not visible.
        assert!(!is_surface_visible(a, b, Point3D::new(2.0, 0.0, 0.0)));
    }

    #[test]
    fn test_lighting_intensity_ranges() {
        let mut m = matrix(30.0, 30.0, 0.0, false);
        let p0 = Point3D::new(0.0, 0.0, 0.0);
        let p1 = Point3D::new(1.0, 0.0, 0.0);
        let p2 = Point3D::new(1.0, 1.0, 0.0);

        m.init_light(LightStyle::None);
        assert_eq!(m.surface_intensity(p0, p1, p2), 1.0);

        m.init_light(LightStyle::Realistic);
        let i = m.surface_intensity(p0, p1, p2);
        assert!((0.25..=1.0).contains(&i));

        m.init_light(LightStyle::Simplistic);
        let i = m.surface_intensity(p0, p1, p2);
        assert!(i == 1.0 || i == 0.75 || i == 0.55);
    }

    #[test]
    fn test_degenerate_surface_unshaded() {
        let mut m = matrix(0.0, 0.0, 0.0, false);
        m.init_light(LightStyle::Realistic);
        let p = Point3D::new(1.0, 1.0, 1.0);
        assert_eq!(m.surface_intensity(p, p, p), 1.0);
    }
}
