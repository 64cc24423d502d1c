//! Visible-surface determination and the center-of-projection solver.
//!
//! The scene cuboid has six bounding planes; which of them face the
//! camera decides wall drawing and draw direction. Under perspective the
//! camera-facing orientation of a pair of opposing planes can flip
//! somewhere inside the scene; the solver finds that screen-space
//! crossing point per axis by bisection.

use bitflags::bitflags;
use vchart_math::{is_surface_visible, Matrix3D, Point3D, RectF};

bitflags! {
    /// The camera-facing bounding planes of the scene cuboid.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SurfaceSet: u8 {
        /// Plane at the left plot edge.
        const LEFT = 1;
        /// Plane at the right plot edge.
        const RIGHT = 2;
        /// Plane at the top plot edge.
        const TOP = 4;
        /// Plane at the bottom plot edge.
        const BOTTOM = 8;
        /// Plane at Z = 0 (scene front).
        const FRONT = 16;
        /// Plane at Z = scene depth (back wall).
        const BACK = 32;
    }
}

bitflags! {
    /// Axes requested from the center-of-projection solver.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct CoordAxes: u8 {
        /// Solve along X.
        const X = 1;
        /// Solve along Y.
        const Y = 2;
        /// Solve along Z.
        const Z = 4;
    }
}

/// One scene axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    /// Horizontal screen axis.
    X,
    /// Vertical screen axis.
    Y,
    /// Depth axis.
    Z,
}

/// Cap on bisection steps; the pixel tolerance converges far earlier for
/// any sane plot size.
const MAX_BISECTION_STEPS: u32 = 64;

/// Corner sample of one bounding plane, wound clockwise as seen from
/// outside the cuboid so that [`is_surface_visible`] reports
/// camera-facing orientation.
fn plane_sample(axis: Axis, at: f32, rect: RectF, z_front: f32, z_back: f32) -> [Point3D; 3] {
    match axis {
        Axis::X => [
            Point3D::new(at, rect.y, z_back),
            Point3D::new(at, rect.y, z_front),
            Point3D::new(at, rect.bottom(), z_front),
        ],
        Axis::Y => [
            Point3D::new(rect.x, at, z_back),
            Point3D::new(rect.right(), at, z_back),
            Point3D::new(rect.right(), at, z_front),
        ],
        Axis::Z => [
            Point3D::new(rect.x, rect.y, at),
            Point3D::new(rect.right(), rect.y, at),
            Point3D::new(rect.right(), rect.bottom(), at),
        ],
    }
}

fn sample_visible(matrix: &Matrix3D, sample: [Point3D; 3]) -> bool {
    let mut pts = sample;
    matrix.transform_points(&mut pts);
    is_surface_visible(pts[0], pts[1], pts[2])
}

/// Determine which bounding planes of the plot cuboid face the camera.
///
/// Each plane is tested by transforming three representative corners and
/// checking the projected winding. Edge-on planes are reported hidden.
pub fn visible_surfaces(
    rect: RectF,
    z_front: f32,
    z_back: f32,
    matrix: &Matrix3D,
) -> SurfaceSet {
    let l = rect.x;
    let r = rect.right();
    let t = rect.y;
    let b = rect.bottom();
    let zf = z_front;
    let zb = z_back;

    let planes: [(SurfaceSet, [Point3D; 3]); 6] = [
        (SurfaceSet::FRONT, plane_sample(Axis::Z, zf, rect, zf, zb)),
        (
            SurfaceSet::BACK,
            [
                Point3D::new(r, t, zb),
                Point3D::new(l, t, zb),
                Point3D::new(l, b, zb),
            ],
        ),
        (SurfaceSet::LEFT, plane_sample(Axis::X, l, rect, zf, zb)),
        (
            SurfaceSet::RIGHT,
            [
                Point3D::new(r, t, zf),
                Point3D::new(r, t, zb),
                Point3D::new(r, b, zb),
            ],
        ),
        (SurfaceSet::TOP, plane_sample(Axis::Y, t, rect, zf, zb)),
        (
            SurfaceSet::BOTTOM,
            [
                Point3D::new(l, b, zf),
                Point3D::new(r, b, zf),
                Point3D::new(r, b, zb),
            ],
        ),
    ];

    let mut set = SurfaceSet::empty();
    for (flag, sample) in planes {
        if sample_visible(matrix, sample) {
            set |= flag;
        }
    }
    set
}

/// Finds the screen-space point at which surface orientation flips, per
/// axis, for the current transform.
#[derive(Debug)]
pub struct ProjectionCenterSolver<'a> {
    rect: RectF,
    z_front: f32,
    z_back: f32,
    matrix: &'a Matrix3D,
    /// Relative size of one device pixel (width, height).
    pixel_size: (f32, f32),
}

impl<'a> ProjectionCenterSolver<'a> {
    /// Create a solver over the plot cuboid `rect` × `[z_front, z_back]`.
    pub fn new(
        rect: RectF,
        z_front: f32,
        z_back: f32,
        matrix: &'a Matrix3D,
        pixel_size: (f32, f32),
    ) -> Self {
        Self {
            rect,
            z_front,
            z_back,
            matrix,
            pixel_size,
        }
    }

    /// Camera-facing orientation of the bounding-plane sample at `at`
    /// along `axis`.
    pub fn surface_orientation(&self, axis: Axis, at: f32) -> bool {
        sample_visible(
            self.matrix,
            plane_sample(axis, at, self.rect, self.z_front, self.z_back),
        )
    }

    /// Whether two parallel plane samples along `axis` share the same
    /// camera-facing orientation.
    pub fn check_surface_orientation(&self, axis: Axis, a: f32, b: f32) -> bool {
        self.surface_orientation(axis, a) == self.surface_orientation(axis, b)
    }

    fn axis_range(&self, axis: Axis) -> (f32, f32) {
        match axis {
            Axis::X => (self.rect.x, self.rect.right()),
            Axis::Y => (self.rect.y, self.rect.bottom()),
            Axis::Z => (self.z_front, self.z_back),
        }
    }

    /// Half a device pixel in relative units, the bisection termination
    /// threshold for `axis`.
    fn tolerance(&self, axis: Axis) -> f32 {
        let (pw, ph) = self.pixel_size;
        let px = match axis {
            Axis::X => pw,
            Axis::Y => ph,
            Axis::Z => pw.min(ph),
        };
        (px / 2.0).max(f32::EPSILON)
    }

    /// Bisect one axis for the orientation flip point.
    ///
    /// Returns NaN when both extremes share the same orientation (the
    /// camera sees both opposing surfaces uniformly, so there is no
    /// interior crossing).
    pub fn solve_axis(&self, axis: Axis) -> f32 {
        let (mut lo, mut hi) = self.axis_range(axis);
        let lo_orientation = self.surface_orientation(axis, lo);
        if lo_orientation == self.surface_orientation(axis, hi) {
            return f32::NAN;
        }

        let tol = self.tolerance(axis);
        let mut steps = 0;
        while hi - lo > tol && steps < MAX_BISECTION_STEPS {
            let mid = (lo + hi) / 2.0;
            if self.surface_orientation(axis, mid) == lo_orientation {
                lo = mid;
            } else {
                hi = mid;
            }
            steps += 1;
        }
        (lo + hi) / 2.0
    }

    /// Solve the requested axes; unrequested or crossing-free axes come
    /// back as NaN.
    pub fn center_of_projection(&self, axes: CoordAxes) -> Point3D {
        let mut center = Point3D::NAN;
        if axes.contains(CoordAxes::X) {
            center.x = self.solve_axis(Axis::X);
        }
        if axes.contains(CoordAxes::Y) {
            center.y = self.solve_axis(Axis::Y);
        }
        if axes.contains(CoordAxes::Z) {
            center.z = self.solve_axis(Axis::Z);
        }
        center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECT: RectF = RectF::new(10.0, 10.0, 80.0, 60.0);
    const DEPTH: f32 = 40.0;
    const PIXEL: (f32, f32) = (0.1, 0.1);

    fn matrix(incl: f32, rot: f32, persp: f32) -> Matrix3D {
        let mut m = Matrix3D::new();
        m.initialize(RECT, DEPTH, incl, rot, persp, false);
        m
    }

    #[test]
    fn test_head_on_shows_front_only() {
        let m = matrix(0.0, 0.0, 0.0);
        let set = visible_surfaces(RECT, 0.0, DEPTH, &m);
        assert_eq!(set, SurfaceSet::FRONT);
    }

    #[test]
    fn test_positive_angles_show_right_and_top() {
        let m = matrix(30.0, 30.0, 0.0);
        let set = visible_surfaces(RECT, 0.0, DEPTH, &m);
        assert_eq!(set, SurfaceSet::FRONT | SurfaceSet::RIGHT | SurfaceSet::TOP);
    }

    #[test]
    fn test_negative_angles_show_left_and_bottom() {
        let m = matrix(-30.0, -30.0, 0.0);
        let set = visible_surfaces(RECT, 0.0, DEPTH, &m);
        assert_eq!(
            set,
            SurfaceSet::FRONT | SurfaceSet::LEFT | SurfaceSet::BOTTOM
        );
    }

    #[test]
    fn test_visible_surfaces_agree_with_corner_depth() {
        // A surface reported visible must be nearer (averaged over its
        // corners) than its opposing surface.
        for (incl, rot) in [(20.0, 40.0), (-35.0, 15.0), (45.0, -60.0), (10.0, 170.0)] {
            let m = matrix(incl, rot, 0.0);
            let set = visible_surfaces(RECT, 0.0, DEPTH, &m);

            let avg_z = |xs: [f32; 2], ys: [f32; 2], zs: [f32; 2]| -> f32 {
                let mut sum = 0.0;
                for &x in &xs {
                    for &y in &ys {
                        for &z in &zs {
                            sum += m.transform_point(Point3D::new(x, y, z)).z;
                        }
                    }
                }
                sum / 8.0
            };

            let lr = [RECT.x, RECT.right()];
            let tb = [RECT.y, RECT.bottom()];
            let fb = [0.0, DEPTH];
            let pairs = [
                (SurfaceSet::LEFT, SurfaceSet::RIGHT, {
                    let a = avg_z([RECT.x; 2], tb, fb);
                    let b = avg_z([RECT.right(); 2], tb, fb);
                    (a, b)
                }),
                (SurfaceSet::TOP, SurfaceSet::BOTTOM, {
                    let a = avg_z(lr, [RECT.y; 2], fb);
                    let b = avg_z(lr, [RECT.bottom(); 2], fb);
                    (a, b)
                }),
                (SurfaceSet::FRONT, SurfaceSet::BACK, {
                    let a = avg_z(lr, tb, [0.0; 2]);
                    let b = avg_z(lr, tb, [DEPTH; 2]);
                    (a, b)
                }),
            ];
            for (first, second, (za, zb)) in pairs {
                assert!(
                    !(set.contains(first) && set.contains(second)),
                    "opposing surfaces both visible at incl={incl} rot={rot}"
                );
                if set.contains(first) {
                    assert!(za > zb, "{first:?} visible but farther at incl={incl} rot={rot}");
                }
                if set.contains(second) {
                    assert!(zb > za, "{second:?} visible but farther at incl={incl} rot={rot}");
                }
            }
        }
    }

    #[test]
    fn test_parallel_projection_has_no_center() {
        let m = matrix(30.0, 30.0, 0.0);
        let solver = ProjectionCenterSolver::new(RECT, 0.0, DEPTH, &m, PIXEL);
        let c = solver.center_of_projection(CoordAxes::all());
        assert!(c.x.is_nan() && c.y.is_nan() && c.z.is_nan());
    }

    #[test]
    fn test_centered_perspective_crossing_near_middle() {
        let m = matrix(0.0, 0.0, 50.0);
        let solver = ProjectionCenterSolver::new(RECT, 0.0, DEPTH, &m, PIXEL);
        let (cx, cy) = RECT.center();
        let c = solver.center_of_projection(CoordAxes::X | CoordAxes::Y);
        assert!((c.x - cx).abs() <= PIXEL.0);
        assert!((c.y - cy).abs() <= PIXEL.1);
    }

    #[test]
    fn test_bisection_result_brackets_orientation_flip() {
        let m = matrix(20.0, 35.0, 60.0);
        let solver = ProjectionCenterSolver::new(RECT, 0.0, DEPTH, &m, PIXEL);
        let cx = solver.solve_axis(Axis::X);
        if cx.is_nan() {
            // No crossing: extremes must agree.
            assert!(solver.check_surface_orientation(Axis::X, RECT.x, RECT.right()));
        } else {
            assert!(cx > RECT.x && cx < RECT.right());
            // Points one pixel either side disagree with each other and
            // agree with their respective corner.
            let before = cx - PIXEL.0;
            let after = cx + PIXEL.0;
            assert!(!solver.check_surface_orientation(Axis::X, before, after));
            assert!(solver.check_surface_orientation(Axis::X, RECT.x, before));
            assert!(solver.check_surface_orientation(Axis::X, RECT.right(), after));
        }
    }

    #[test]
    fn test_unrequested_axes_stay_nan() {
        let m = matrix(0.0, 0.0, 50.0);
        let solver = ProjectionCenterSolver::new(RECT, 0.0, DEPTH, &m, PIXEL);
        let c = solver.center_of_projection(CoordAxes::X);
        assert!(!c.x.is_nan());
        assert!(c.y.is_nan() && c.z.is_nan());
    }
}
