//! Painter's-algorithm draw-order resolution.
//!
//! Produces the ordered list of series and data points for painting.
//! Ordering is approximate: it composes independent rules (X sweep,
//! Y tie-break, center-of-projection flips) rather than sorting by an
//! exact distance-to-camera metric, which keeps the comparator cheap and
//! consistent for the camera angles a chart allows.

use std::cmp::Ordering;

use vchart_math::Point3D;

use crate::collab::{AxisView, ChartTypeRegistry, SeriesInfo};
use crate::depth::{SceneGeometry, SeriesPlacement};

/// A data point prepared for depth-ordered painting.
///
/// Created transiently per paint pass and discarded after drawing.
#[derive(Debug, Clone)]
pub struct DataPoint3D {
    /// Owning series name.
    pub series: String,
    /// Index of the point within its series.
    pub index: usize,
    /// Screen X position before projection.
    pub x_position: f32,
    /// Screen Y position before projection.
    pub y_position: f32,
    /// Point width in relative units.
    pub width: f32,
    /// Point height in relative units (positive grows downward).
    pub height: f32,
    /// Z depth of the point slot.
    pub depth: f32,
    /// Z position of the point slot front.
    pub z_position: f32,
}

/// The painter's-algorithm comparator for [`DataPoint3D`] records.
///
/// NaN center-of-projection components mean "no center" and fall back to
/// the simpler rotation-sign rules. With `selection` set the result is
/// negated: hit-testing wants reverse Z order versus painting.
#[derive(Debug, Clone)]
pub struct PointsDrawingOrderComparer {
    /// Center of projection; per-axis NaN disables that axis' rule.
    pub projection_center: Point3D,
    /// Reverse the order for hit-testing.
    pub selection: bool,
    /// Whether the bottom scene wall is camera-facing.
    pub bottom_visible: bool,
    /// Rotation-sign fallback: near side is on the left, sweep right to
    /// left.
    pub reversed_x: bool,
    /// Scene viewed from below; reverses the Y tie-break.
    pub view_from_bottom: bool,
}

impl Default for PointsDrawingOrderComparer {
    /// Plain left-to-right painting order with no center of projection.
    fn default() -> Self {
        Self {
            projection_center: Point3D::NAN,
            selection: false,
            bottom_visible: false,
            reversed_x: false,
            view_from_bottom: false,
        }
    }
}

impl PointsDrawingOrderComparer {
    /// Compare two points for drawing order (back-to-front).
    pub fn compare(&self, a: &DataPoint3D, b: &DataPoint3D) -> Ordering {
        let center = self.projection_center;

        let mut result = if a.x_position < b.x_position {
            -1
        } else if a.x_position > b.x_position {
            1
        } else {
            0
        };

        if a.x_position == b.x_position {
            // X tie: lower points (larger screen Y) paint first.
            result = if a.y_position > b.y_position {
                -1
            } else if a.y_position < b.y_position {
                1
            } else {
                0
            };

            if !center.y.is_nan() {
                let (a_min, a_max) = y_extent(a);
                let (b_min, b_max) = y_extent(b);
                if self.bottom_visible {
                    if a_min <= center.y && b_min <= center.y {
                        result = -result;
                    }
                } else if a_max >= center.y && b_max >= center.y {
                    result = -result;
                }
            } else if self.view_from_bottom {
                result = -result;
            }
        }

        if a.x_position != b.x_position {
            if !center.x.is_nan() {
                let a_max = a.x_position.max(a.x_position + a.width);
                let b_max = b.x_position.max(b.x_position + b.width);
                // Both points beyond the crossing: the sweep direction
                // flips on the far side.
                if a_max >= center.x && b_max >= center.x {
                    result = -result;
                }
            } else if self.reversed_x {
                result = -result;
            }
        }

        let result = if self.selection { -result } else { result };
        result.cmp(&0)
    }
}

fn y_extent(p: &DataPoint3D) -> (f32, f32) {
    let other = p.y_position + p.height;
    (p.y_position.min(other), p.y_position.max(other))
}

/// Resolve the series painting order.
///
/// Takes the first series of each cluster (clusters are built
/// stacking-aware, so the head stands for the slot), optionally reverses
/// the whole list, then, when `z_center` is set, reverses the tail
/// from the point where series Z positions cross the center of
/// projection. A single-pivot partial reversal, not a re-sort.
pub fn series_drawing_order(
    clusters: &[Vec<String>],
    reverse: bool,
    z_center: f32,
    z_position_of: impl Fn(&str) -> f32,
) -> Vec<String> {
    let mut order: Vec<String> = clusters.iter().filter_map(|c| c.first().cloned()).collect();
    if reverse {
        order.reverse();
    }
    if !z_center.is_nan() && !order.is_empty() {
        let first_side = z_position_of(&order[0]) < z_center;
        if let Some(split) = order
            .iter()
            .position(|name| (z_position_of(name) < z_center) != first_side)
        {
            order[split..].reverse();
        }
    }
    order
}

/// Build the flat, depth-sorted point list for one group of series.
///
/// Per point: X from the axis (indexed or value X, plus the side-by-side
/// or stack-group slot offset), Y and height from the chart type's value
/// accessors, depth and Z position from the scene geometry. The list is
/// sorted with
/// `comparer`, or with `custom` when a caller supplies one; the sort is
/// stable, so re-sorting an ordered list leaves it unchanged.
#[allow(clippy::too_many_arguments)]
pub fn data_point_drawing_order(
    names: &[String],
    series: &[SeriesInfo],
    registry: &dyn ChartTypeRegistry,
    geometry: &SceneGeometry,
    x_axis: &dyn AxisView,
    y_axis: &dyn AxisView,
    y_value_index: usize,
    comparer: &PointsDrawingOrderComparer,
    custom: Option<&dyn Fn(&DataPoint3D, &DataPoint3D) -> Ordering>,
) -> Vec<DataPoint3D> {
    let mut points = Vec::new();

    for name in names {
        let Some(s) = series.iter().find(|s| &s.name == name) else {
            continue;
        };
        let placement = geometry.placement(name);
        let (depth, z_position) = geometry.series_z_position_and_depth(name);
        let (slots, slot_index) = interval_slot(s, series, registry, geometry, placement);

        for i in 0..s.point_count {
            let x_value = s.x_value(i);
            let mut x_position = x_axis.position(x_value);

            // Relative width of one interval slot around this point.
            let slot = x_axis.position(x_value + geometry.interval as f64) - x_position;

            let width;
            if slots > 1 {
                let n = slots as f32;
                width = registry.point_width(&s.chart_type, slot / n);
                x_position += slot * ((slot_index as f32 + 0.5) / n - 0.5);
            } else {
                width = registry.point_width(&s.chart_type, slot);
            }

            let y_position = y_axis.position(registry.y_value(s, i, y_value_index));
            let y_base = y_axis.position(registry.y_base_value(s, i));

            points.push(DataPoint3D {
                series: s.name.clone(),
                index: i,
                x_position,
                y_position,
                width,
                height: y_base - y_position,
                depth,
                z_position,
            });
        }
    }

    match custom {
        Some(f) => points.sort_by(|a, b| f(a, b)),
        None => points.sort_by(|a, b| comparer.compare(a, b)),
    }
    points
}

/// Subdivision of one X interval slot for a series: side-by-side members
/// split it by cluster size, stacked types with multiple named stack
/// groups split it by group cluster count. Returns the slot count and
/// this series' slot.
fn interval_slot(
    s: &SeriesInfo,
    series: &[SeriesInfo],
    registry: &dyn ChartTypeRegistry,
    geometry: &SceneGeometry,
    placement: Option<SeriesPlacement>,
) -> (usize, usize) {
    let Some(p) = placement else {
        return (1, 0);
    };
    if p.side_by_side && p.cluster_size > 1 {
        return (p.cluster_size, p.index_in_cluster);
    }

    let traits = registry.type_traits(&s.chart_type);
    if traits.stacked && traits.supports_stacked_groups {
        // Stack groups of one chart type each own a cluster; cluster
        // build order gives the slot index within the shared interval.
        let chart_type_of = |name: &str| {
            series
                .iter()
                .find(|x| x.name == name)
                .map(|x| x.chart_type.as_str())
        };
        let group_clusters: Vec<usize> = geometry
            .clusters
            .iter()
            .enumerate()
            .filter(|(_, members)| {
                members
                    .first()
                    .and_then(|head| chart_type_of(head))
                    .is_some_and(|t| t == s.chart_type)
            })
            .map(|(i, _)| i)
            .collect();
        if group_clusters.len() > 1 {
            let slot = group_clusters
                .iter()
                .position(|&c| c == p.cluster)
                .unwrap_or(0);
            return (group_clusters.len(), slot);
        }
    }
    (1, 0)
}
