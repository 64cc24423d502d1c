//! Scene depth and series cluster calculation.
//!
//! A cluster is a group of series sharing one depth slot along Z. The
//! calculator decides how many clusters a chart area has, how deep each
//! point slot is, and where along Z every series sits.

use std::collections::HashMap;

use tracing::debug;

use crate::collab::{ChartTypeRegistry, SeriesInfo, SideBySide};
use crate::error::Result;
use crate::style::Scene3DStyle;

/// Scene depth fixed at 100% when series compute their own Z placement.
const REAL_DEPTH_SCENE: f32 = 100.0;

/// Placement of one series within the cluster layout.
#[derive(Debug, Clone, Copy)]
pub struct SeriesPlacement {
    /// Cluster the series belongs to, in build order.
    pub cluster: usize,
    /// Position of the series inside its cluster.
    pub index_in_cluster: usize,
    /// Number of series in the cluster.
    pub cluster_size: usize,
    /// Resolved side-by-side flag (custom property over type default).
    pub side_by_side: bool,
}

/// Result of one depth-calculation pass over a chart area.
///
/// Rebuilt whenever the style generation or the series set changes; all
/// queries on a built geometry are read-only and infallible, resolving
/// unknown series to safe defaults.
#[derive(Debug, Clone)]
pub struct SceneGeometry {
    /// Total Z extent of the plotting volume, in relative units.
    pub scene_depth: f32,
    /// Depth of one point slot.
    pub points_depth: f32,
    /// Gap between point slots.
    pub points_gap_depth: f32,
    /// Smallest X interval found, in axis value units (1 in real-depth
    /// mode and for indexed series).
    pub interval: f32,
    /// Series names grouped by depth slot, in build order.
    pub clusters: Vec<Vec<String>>,
    placements: HashMap<String, SeriesPlacement>,
    /// Per-series (depth, Z position) pairs in real-depth mode.
    real_depth: Option<HashMap<String, (f32, f32)>>,
    reverse_series_order: bool,
}

impl SceneGeometry {
    /// Number of depth slots in the scene.
    pub fn number_of_clusters(&self) -> usize {
        self.clusters.len()
    }

    /// Whether series compute their own Z placement from data.
    pub fn is_real_depth(&self) -> bool {
        self.real_depth.is_some()
    }

    /// Placement of a series, if it took part in the calculation.
    pub fn placement(&self, series: &str) -> Option<SeriesPlacement> {
        self.placements.get(series).copied()
    }

    /// Cluster index of a series, mirrored when the series order is
    /// reversed. An unknown series resolves to 0.
    pub fn series_cluster_index(&self, series: &str) -> usize {
        let index = self
            .clusters
            .iter()
            .position(|c| c.iter().any(|n| n == series))
            .unwrap_or(0);
        if self.reverse_series_order && !self.clusters.is_empty() {
            self.clusters.len() - 1 - index
        } else {
            index
        }
    }

    /// (depth, Z position) of a series.
    ///
    /// In real-depth mode the pair comes from the precomputed per-series
    /// map (position mirrored under reversed order, zero depth when
    /// missing); otherwise the position is derived from the cluster index.
    pub fn series_z_position_and_depth(&self, series: &str) -> (f32, f32) {
        if let Some(map) = &self.real_depth {
            let (depth, position) = map.get(series).copied().unwrap_or((0.0, 0.0));
            let position = if self.reverse_series_order {
                self.scene_depth - position
            } else {
                position
            };
            return (depth, position);
        }
        let index = self.series_cluster_index(series) as f32;
        let position =
            self.points_gap_depth / 2.0 + (self.points_depth + self.points_gap_depth) * index;
        (self.points_depth, position)
    }
}

/// Cluster assignment key: stacked and side-by-side types share a slot,
/// everything else gets its own.
#[derive(PartialEq, Eq, Hash)]
enum ClusterKey {
    Type(String),
    Group(String, String),
    Solo(usize),
}

/// Build the cluster list by iterating series in chart-area order.
///
/// First occurrence creates the cluster, so membership is order
/// dependent. Stacked types share a cluster per chart type (per stack
/// group when groups are supported and clustering is enabled);
/// side-by-side types share one only when clustering is enabled.
pub fn build_clusters(
    series: &[SeriesInfo],
    registry: &dyn ChartTypeRegistry,
    clustered: bool,
) -> Result<Vec<Vec<String>>> {
    let mut clusters: Vec<Vec<String>> = Vec::new();
    let mut by_key: HashMap<ClusterKey, usize> = HashMap::new();

    for (i, s) in series.iter().enumerate() {
        let traits = registry.type_traits(&s.chart_type);
        let side_by_side = SideBySide::parse(&s.name, s.draw_side_by_side.as_deref())?
            .resolve(traits.side_by_side);

        let key = if traits.stacked {
            if traits.supports_stacked_groups && clustered {
                ClusterKey::Group(
                    s.chart_type.clone(),
                    s.stack_group.clone().unwrap_or_default(),
                )
            } else {
                ClusterKey::Type(s.chart_type.clone())
            }
        } else if side_by_side && clustered {
            ClusterKey::Type(s.chart_type.clone())
        } else {
            ClusterKey::Solo(i)
        };

        let index = *by_key.entry(key).or_insert_with(|| {
            clusters.push(Vec::new());
            clusters.len() - 1
        });
        clusters[index].push(s.name.clone());
    }

    Ok(clusters)
}

/// Smallest X interval of one series: 1 for indexed X, otherwise the
/// minimum gap between consecutive sorted X values.
fn series_interval(s: &SeriesInfo) -> f32 {
    if s.indexed_x || s.x_values.len() < 2 {
        return 1.0;
    }
    let mut xs = s.x_values.clone();
    xs.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mut min = f64::INFINITY;
    for w in xs.windows(2) {
        let d = w[1] - w[0];
        if d > 0.0 && d < min {
            min = d;
        }
    }
    if min.is_finite() {
        min as f32
    } else {
        1.0
    }
}

/// Run one depth-calculation pass.
///
/// In real-depth mode (any attached chart type encodes Z as data) each
/// series supplies its own (depth, Z position) pair and the scene depth
/// is fixed at 100%. Otherwise the smallest X interval across series,
/// divided by the member count for side-by-side series, feeds the
/// chart-type point-width rules, scaled by the style percentages, and
/// the scene depth is `(points_depth + gap) * clusters`.
pub fn calculate(
    series: &[SeriesInfo],
    registry: &dyn ChartTypeRegistry,
    style: &Scene3DStyle,
    reverse_series_order: bool,
) -> Result<SceneGeometry> {
    let clusters = build_clusters(series, registry, style.clustered())?;

    let mut placements = HashMap::with_capacity(series.len());
    for s in series {
        let traits = registry.type_traits(&s.chart_type);
        let side_by_side = SideBySide::parse(&s.name, s.draw_side_by_side.as_deref())?
            .resolve(traits.side_by_side);
        let cluster = clusters
            .iter()
            .position(|c| c.iter().any(|n| n == &s.name))
            .unwrap_or(0);
        let members = &clusters[cluster];
        let index_in_cluster = members.iter().position(|n| n == &s.name).unwrap_or(0);
        placements.insert(
            s.name.clone(),
            SeriesPlacement {
                cluster,
                index_in_cluster,
                cluster_size: members.len(),
                side_by_side,
            },
        );
    }

    let real_mode = series
        .iter()
        .any(|s| registry.type_traits(&s.chart_type).real_z_depth);

    if real_mode {
        let map = series
            .iter()
            .map(|s| (s.name.clone(), registry.real_z_position_and_depth(s)))
            .collect();
        debug!(clusters = clusters.len(), "scene depth: real-depth mode");
        return Ok(SceneGeometry {
            scene_depth: REAL_DEPTH_SCENE,
            points_depth: 0.0,
            points_gap_depth: 0.0,
            interval: 1.0,
            clusters,
            placements,
            real_depth: Some(map),
            reverse_series_order,
        });
    }

    // Smallest interval across series, remembering which chart type
    // produced it; its point-width rule decides the slot depth.
    let mut interval = f32::INFINITY;
    let mut raw_interval = f32::INFINITY;
    let mut rule_type: &str = "";
    for s in series {
        let raw = series_interval(s);
        let placement = &placements[&s.name];
        let si = if placement.side_by_side && placement.cluster_size > 0 {
            raw / placement.cluster_size as f32
        } else {
            raw
        };
        raw_interval = raw_interval.min(raw);
        if si < interval {
            interval = si;
            rule_type = &s.chart_type;
        }
    }
    if !interval.is_finite() {
        interval = 1.0;
    }
    if !raw_interval.is_finite() {
        raw_interval = 1.0;
    }

    let (rule_depth, rule_gap) = registry.point_depth_and_gap(rule_type, interval);
    let points_depth = rule_depth * style.point_depth() / 100.0;
    let points_gap_depth = rule_gap * style.point_gap_depth() / 100.0;
    let scene_depth = (points_depth + points_gap_depth) * clusters.len() as f32;

    debug!(
        clusters = clusters.len(),
        points_depth, points_gap_depth, scene_depth, "scene depth: computed-cluster mode"
    );

    Ok(SceneGeometry {
        scene_depth,
        points_depth,
        points_gap_depth,
        interval: raw_interval,
        clusters,
        placements,
        real_depth: None,
        reverse_series_order,
    })
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::collab::ChartTypeTraits;

    /// Registry with column (side-by-side), stacked-column (stacked,
    /// grouped) and line (real Z) types.
    struct TestRegistry;

    impl ChartTypeRegistry for TestRegistry {
        fn type_traits(&self, chart_type: &str) -> ChartTypeTraits {
            match chart_type {
                "column" => ChartTypeTraits {
                    side_by_side: true,
                    ..Default::default()
                },
                "stacked-column" => ChartTypeTraits {
                    stacked: true,
                    supports_stacked_groups: true,
                    ..Default::default()
                },
                "line3d" => ChartTypeTraits {
                    real_z_depth: true,
                    ..Default::default()
                },
                _ => ChartTypeTraits::default(),
            }
        }

        fn y_value(&self, _series: &SeriesInfo, _point: usize, _y_value_index: usize) -> f64 {
            0.0
        }

        fn real_z_position_and_depth(&self, series: &SeriesInfo) -> (f32, f32) {
            if series.name == "known" {
                (8.0, 30.0)
            } else {
                (0.0, 0.0)
            }
        }
    }

    fn series(name: &str, chart_type: &str) -> SeriesInfo {
        SeriesInfo {
            name: name.into(),
            chart_type: chart_type.into(),
            indexed_x: true,
            point_count: 4,
            ..Default::default()
        }
    }

    #[test]
    fn test_stacked_series_share_one_cluster() {
        let s = [series("a", "stacked-column"), series("b", "stacked-column")];
        let style = Scene3DStyle::new(); // clustered = false
        let clusters = build_clusters(&s, &TestRegistry, style.clustered()).unwrap();
        assert_eq!(clusters, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn test_stack_groups_split_when_clustered() {
        let mut a = series("a", "stacked-column");
        a.stack_group = Some("g1".into());
        let mut b = series("b", "stacked-column");
        b.stack_group = Some("g2".into());
        let mut c = series("c", "stacked-column");
        c.stack_group = Some("g1".into());

        let clusters = build_clusters(&[a, b, c], &TestRegistry, true).unwrap();
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0], vec!["a".to_string(), "c".to_string()]);
        assert_eq!(clusters[1], vec!["b".to_string()]);
    }

    #[test]
    fn test_side_by_side_clustered_scenario() {
        // rotation=30, inclination=30, perspective=0, two column series,
        // clustered: one shared slot, positive depths, depth formula.
        let s = [series("a", "column"), series("b", "column")];
        let mut style = Scene3DStyle::new();
        style.set_clustered(true);
        style.set_rotation(30.0).unwrap();
        style.set_inclination(30.0).unwrap();

        let geom = calculate(&s, &TestRegistry, &style, false).unwrap();
        assert_eq!(geom.number_of_clusters(), 1);
        assert!(geom.points_depth > 0.0);
        assert!(geom.points_gap_depth > 0.0);
        let expected = (geom.points_depth + geom.points_gap_depth) * 1.0;
        assert!((geom.scene_depth - expected).abs() < 1e-6);
    }

    #[test]
    fn test_side_by_side_unclustered_gets_own_slots() {
        let s = [series("a", "column"), series("b", "column")];
        let style = Scene3DStyle::new();
        let geom = calculate(&s, &TestRegistry, &style, false).unwrap();
        assert_eq!(geom.number_of_clusters(), 2);
    }

    #[test]
    fn test_custom_property_overrides_type_default() {
        let mut b = series("b", "column");
        b.draw_side_by_side = Some("False".into());
        let s = [series("a", "column"), b];
        let clusters = build_clusters(&s, &TestRegistry, true).unwrap();
        // "b" opted out of the shared slot.
        assert_eq!(clusters.len(), 2);
    }

    #[test]
    fn test_invalid_side_by_side_property() {
        let mut a = series("a", "column");
        a.draw_side_by_side = Some("yes".into());
        let err = build_clusters(&[a], &TestRegistry, true).unwrap_err();
        assert!(matches!(
            err,
            crate::error::SceneError::InvalidSideBySide { .. }
        ));
    }

    #[test]
    fn test_cluster_build_is_idempotent() {
        let s = [
            series("a", "column"),
            series("b", "stacked-column"),
            series("c", "column"),
            series("d", "plain"),
        ];
        let first = build_clusters(&s, &TestRegistry, true).unwrap();
        let second = build_clusters(&s, &TestRegistry, true).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_z_position_formula() {
        let s = [series("a", "plain"), series("b", "plain")];
        let style = Scene3DStyle::new();
        let geom = calculate(&s, &TestRegistry, &style, false).unwrap();

        let (depth_a, pos_a) = geom.series_z_position_and_depth("a");
        let (_, pos_b) = geom.series_z_position_and_depth("b");
        assert_eq!(depth_a, geom.points_depth);
        assert_abs_diff_eq!(pos_a, geom.points_gap_depth / 2.0, epsilon = 1e-6);
        let step = geom.points_depth + geom.points_gap_depth;
        assert_abs_diff_eq!(pos_b - pos_a, step, epsilon = 1e-6);
    }

    #[test]
    fn test_reverse_series_order_mirrors_cluster_index() {
        let s = [series("a", "plain"), series("b", "plain")];
        let style = Scene3DStyle::new();
        let geom = calculate(&s, &TestRegistry, &style, true).unwrap();
        assert_eq!(geom.series_cluster_index("a"), 1);
        assert_eq!(geom.series_cluster_index("b"), 0);
    }

    #[test]
    fn test_unknown_series_falls_back_to_zero() {
        let s = [series("a", "plain")];
        let style = Scene3DStyle::new();
        let geom = calculate(&s, &TestRegistry, &style, false).unwrap();
        assert_eq!(geom.series_cluster_index("missing"), 0);
    }

    #[test]
    fn test_real_depth_mode() {
        let s = [series("known", "line3d"), series("other", "line3d")];
        let style = Scene3DStyle::new();
        let geom = calculate(&s, &TestRegistry, &style, false).unwrap();

        assert!(geom.is_real_depth());
        assert_eq!(geom.scene_depth, 100.0);
        assert_eq!(geom.series_z_position_and_depth("known"), (8.0, 30.0));
        // Missing entries resolve to zero depth, silently.
        assert_eq!(geom.series_z_position_and_depth("other"), (0.0, 0.0));
    }

    #[test]
    fn test_real_depth_reversed_mirrors_position() {
        let s = [series("known", "line3d")];
        let style = Scene3DStyle::new();
        let geom = calculate(&s, &TestRegistry, &style, true).unwrap();
        let (_, pos) = geom.series_z_position_and_depth("known");
        assert_eq!(pos, 70.0);
    }

    #[test]
    fn test_value_x_interval() {
        let mut a = series("a", "plain");
        a.indexed_x = false;
        a.x_values = vec![10.0, 2.0, 7.0];
        // Sorted gaps are 5 and 3; smallest is 3.
        assert_eq!(super::series_interval(&a), 3.0);
    }
}
