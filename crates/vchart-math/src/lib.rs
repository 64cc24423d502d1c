#![warn(missing_docs)]

//! 3D scene transform primitives for the vchart charting kernel.
//!
//! This crate provides the projection math used to render chart areas in
//! 3D: scene-relative points, the chart-area transform matrix with
//! rotation, inclination and optional perspective, and the directional
//! lighting model used to shade scene surfaces.
//!
//! Coordinates are screen-oriented: X grows to the right, Y grows
//! downward. Before projection, points live in chart-area percentage
//! space with Z running from 0 at the scene front to the scene depth at
//! the back wall; after [`Matrix3D::transform_points`] the X/Y components
//! hold projected screen positions and Z holds the rotated view-space
//! depth, where larger Z means nearer the viewer.

pub mod matrix;
pub mod point;

pub use matrix::{is_surface_visible, LightStyle, Matrix3D};
pub use point::{Point3D, RectF};
