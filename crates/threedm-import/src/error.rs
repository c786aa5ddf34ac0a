//! Error taxonomy for geometry translation and document import.

use thiserror::Error;
use threedm_geom::SplineError;

/// Errors raised while translating a single geometry entity.
#[derive(Error, Debug)]
pub enum TranslateError {
    /// A homogeneous control point has weight zero and cannot be
    /// dehomogenized.
    #[error("degenerate control point weight (w = 0)")]
    DegenerateWeight,

    /// The raw knot vector is empty or decreasing.
    #[error("invalid knot vector: {0}")]
    InvalidKnotVector(String),

    /// A color value had the wrong number of channels.
    #[error("invalid color: expected 4 channels, got {got}")]
    InvalidColor {
        /// Number of channels actually supplied.
        got: usize,
    },

    /// Spline construction rejected the translated definition.
    #[error(transparent)]
    Spline(#[from] SplineError),
}

impl TranslateError {
    /// Invalid-knot-vector error with a formatted message.
    pub fn invalid_knots(message: impl Into<String>) -> Self {
        Self::InvalidKnotVector(message.into())
    }
}

/// Errors raised by the document import pipeline, tagged with the table
/// index they originated from.
#[derive(Error, Debug)]
pub enum ImportError {
    /// Translation of one object failed.
    #[error("object {index}: {source}")]
    Object {
        /// Index into the file's object table.
        index: usize,
        /// The underlying translation failure.
        source: TranslateError,
    },

    /// Styling of one layer failed.
    #[error("layer {index}: {source}")]
    Layer {
        /// Index into the file's layer table.
        index: usize,
        /// The underlying translation failure.
        source: TranslateError,
    },

    /// Conversion of one material failed.
    #[error("material {index}: {source}")]
    Material {
        /// Index into the file's material table.
        index: usize,
        /// The underlying translation failure.
        source: TranslateError,
    },
}

impl ImportError {
    /// Wrap a translation failure with its object index.
    pub fn object(index: usize, source: TranslateError) -> Self {
        Self::Object { index, source }
    }

    /// Wrap a styling failure with its layer index.
    pub fn layer(index: usize, source: TranslateError) -> Self {
        Self::Layer { index, source }
    }

    /// Wrap a conversion failure with its material index.
    pub fn material(index: usize, source: TranslateError) -> Self {
        Self::Material { index, source }
    }
}
