//! Entity dispatch: one translation path per geometry variant.

use threedm_geom::{BSplineCurve, BSplineSurface, Circle3d, Line3d, TriangleMesh};
use threedm_math::Point3;
use threedm_model::{BrepData, Curve, Geometry, MeshData};

use crate::debug_import;
use crate::error::TranslateError;
use crate::translate::{build_curve, build_surface};

/// A translated document entity ready for insertion into a layer group.
#[derive(Debug, Clone)]
pub enum DocEntity {
    /// A B-spline curve.
    Curve(BSplineCurve),
    /// A straight segment.
    Line(Line3d),
    /// A parametric circle.
    Circle(Circle3d),
    /// A B-spline surface.
    Surface(BSplineSurface),
    /// A single point.
    Point(Point3),
    /// A triangle mesh.
    Mesh(TriangleMesh),
    /// A compound of child entities (b-rep faces, point-cloud members).
    Compound(Vec<DocEntity>),
}

/// Translate one geometry entity into its document form.
///
/// The match is exhaustive over every variant the object table can carry.
/// Variants with no document counterpart return `Ok(None)`; translation
/// failures propagate untouched so the import loop can tag them with the
/// object index.
pub fn translate_geometry(geometry: &Geometry) -> Result<Option<DocEntity>, TranslateError> {
    match geometry {
        Geometry::Brep(brep) => Ok(Some(translate_brep(brep)?)),
        Geometry::Curve(Curve::Line(line)) => Ok(Some(DocEntity::Line(Line3d::from_points(
            line.from, line.to,
        )))),
        Geometry::Curve(Curve::Nurbs(data)) => {
            Ok(Some(DocEntity::Curve(build_curve(data)?)))
        }
        Geometry::Curve(Curve::Arc(arc)) => {
            // Rational quadratic approximation path; exact analytic arcs
            // are a known future improvement.
            Ok(Some(DocEntity::Curve(build_curve(&arc.to_nurbs_curve())?)))
        }
        Geometry::NurbsSurface(data) => Ok(Some(DocEntity::Surface(build_surface(data)?))),
        Geometry::Surface(surface) => Ok(Some(DocEntity::Surface(build_surface(
            &surface.nurbs_form,
        )?))),
        Geometry::Circle(circle) => Ok(Some(DocEntity::Circle(Circle3d::new(
            circle.center,
            circle.normal,
            circle.radius,
        )))),
        Geometry::Point(p) => Ok(Some(DocEntity::Point(*p))),
        Geometry::PointCloud(cloud) => Ok(Some(DocEntity::Compound(
            cloud.points.iter().map(|p| DocEntity::Point(*p)).collect(),
        ))),
        Geometry::Mesh(mesh) => Ok(Some(DocEntity::Mesh(translate_mesh(mesh)))),
        Geometry::Bitmap
        | Geometry::Box
        | Geometry::Cone
        | Geometry::Cylinder
        | Geometry::Ellipse
        | Geometry::BezierCurve => Ok(None),
    }
}

/// Translate a b-rep: one surface per face, collected into a compound.
fn translate_brep(brep: &BrepData) -> Result<DocEntity, TranslateError> {
    debug_import!(
        "brep: {} faces, {} edges, {} vertices",
        brep.surfaces.len(),
        brep.num_edges,
        brep.num_vertices
    );
    let mut faces = Vec::with_capacity(brep.surfaces.len());
    for surface in &brep.surfaces {
        faces.push(DocEntity::Surface(build_surface(surface)?));
    }
    Ok(DocEntity::Compound(faces))
}

/// Direct vertex/face copy; each quad becomes two triangles.
fn translate_mesh(mesh: &MeshData) -> TriangleMesh {
    debug_import!(
        "mesh: {} vertices, {} faces",
        mesh.vertices.len(),
        mesh.faces.len()
    );
    let mut out = TriangleMesh::new();
    out.vertices = mesh.vertices.clone();
    out.normals = mesh.normals.clone();
    for face in &mesh.faces {
        out.triangles.push([face.a, face.b, face.c]);
        if face.is_quad() {
            out.triangles.push([face.a, face.c, face.d]);
        }
    }
    out
}
