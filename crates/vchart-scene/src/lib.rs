//! 3D scene kernel for chart areas.
//!
//! Everything between a flat chart layout and its 3D rendering: scene
//! depth and series clustering, the projection transform with lighting,
//! visible-surface and center-of-projection determination, and the
//! painter's-algorithm draw order for series and data points.
//!
//! [`ChartScene3D`] ties the pieces together per chart area; the host
//! widget plugs in through the traits in [`collab`].

#![warn(missing_docs)]

pub mod collab;
pub mod depth;
pub mod error;
pub mod order;
pub mod scene;
pub mod style;
pub mod surfaces;

pub use collab::{
    AxisView, ChartTypeRegistry, ChartTypeTraits, Color, DrawingSurface, SeriesInfo, SideBySide,
};
pub use depth::{SceneGeometry, SeriesPlacement};
pub use error::{Result, SceneError};
pub use order::{DataPoint3D, PointsDrawingOrderComparer};
pub use scene::ChartScene3D;
pub use style::Scene3DStyle;
pub use surfaces::{CoordAxes, ProjectionCenterSolver, SurfaceSet};
