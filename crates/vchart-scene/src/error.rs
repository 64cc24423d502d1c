//! Error types for the scene kernel.

use thiserror::Error;

/// Errors that can occur during style configuration or depth calculation.
#[derive(Error, Debug)]
pub enum SceneError {
    /// A style value outside its documented range.
    #[error("{name} must be between {min} and {max}, got {value}")]
    OutOfRange {
        /// Name of the rejected style property.
        name: &'static str,
        /// The rejected value.
        value: f32,
        /// Lower bound (inclusive).
        min: f32,
        /// Upper bound (inclusive).
        max: f32,
    },

    /// A series carries an unrecognized `DrawSideBySide` custom property.
    #[error("series {series:?}: DrawSideBySide must be \"true\", \"false\" or \"auto\", got {value:?}")]
    InvalidSideBySide {
        /// Name of the offending series.
        series: String,
        /// The raw property value.
        value: String,
    },
}

/// Result type for scene operations.
pub type Result<T> = std::result::Result<T, SceneError>;
