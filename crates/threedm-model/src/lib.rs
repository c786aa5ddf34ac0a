#![warn(missing_docs)]

//! In-memory object graph for Rhino .3dm model files.
//!
//! This crate defines the entity types a .3dm container reader produces:
//! the [`Geometry`] tagged enum covering every object kind the format
//! carries, the homogeneous control-point and raw knot data for NURBS
//! entities, and the layer / material / group tables. It deliberately knows
//! nothing about the target CAD document — translation lives downstream.
//!
//! Control points are stored in homogeneous (projective) form exactly as
//! the container delivers them: `(X, Y, Z, W)` with the Cartesian position
//! being `(X/W, Y/W, Z/W)`. Knot vectors are stored raw, in the openNURBS
//! convention that omits the two superfluous end knots.

mod geometry;
mod tables;

pub use geometry::{
    ArcCurve, BrepData, CircleData, Curve, Geometry, LineData, MeshData, MeshFace,
    NurbsCurveData, NurbsSurfaceData, Point4, PointCloudData, SurfaceData,
};
pub use tables::{Color, File3dm, Group, Layer, Material, ModelObject, ObjectAttributes};
