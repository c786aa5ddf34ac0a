#![warn(missing_docs)]

//! Translation of .3dm model entities into CAD document geometry.
//!
//! The crate has three layers:
//!
//! - [`translate`] — stateless geometry translation: homogeneous point
//!   splitting, knot-vector compaction with end-clamp restoration,
//!   periodicity inference, curve/surface construction, placements, and
//!   color conversion.
//! - [`dispatch`] — one translation path per geometry variant, exhaustive
//!   over the model's closed [`Geometry`](threedm_model::Geometry) enum.
//! - [`document`] — the import loop: layer styling, per-object error
//!   isolation, and the [`document::ImportReport`] summary.
//!
//! Translation failures are local to one object. The import loop records
//! them and continues; a bad entity never aborts the file.

/// Print an import diagnostic to stderr.
///
/// Compiled out unless the `debug-import` feature is enabled.
#[cfg(feature = "debug-import")]
#[macro_export]
macro_rules! debug_import {
    ($($arg:tt)*) => {
        eprintln!($($arg)*)
    };
}

/// Print an import diagnostic to stderr.
///
/// Compiled out unless the `debug-import` feature is enabled.
#[cfg(not(feature = "debug-import"))]
#[macro_export]
macro_rules! debug_import {
    ($($arg:tt)*) => {};
}

pub mod dispatch;
pub mod document;
pub mod error;
pub mod translate;

pub use dispatch::{translate_geometry, DocEntity};
pub use document::{
    import_model, import_model_parallel, layer_style, material_style, Document, ImportReport,
    LayerStyle, MaterialStyle,
};
pub use error::{ImportError, TranslateError};
