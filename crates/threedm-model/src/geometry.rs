//! Geometry entities read from a .3dm object table.

use std::f64::consts::FRAC_PI_2;

use threedm_math::{Point3, Vec3};

/// A homogeneous (projective) control point `(X, Y, Z, W)`.
///
/// The Cartesian position is `(X/W, Y/W, Z/W)` and `W` is the NURBS
/// weight. `W == 0` is representable here (the container may deliver it)
/// but is rejected downstream during translation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point4 {
    /// Weighted x coordinate.
    pub x: f64,
    /// Weighted y coordinate.
    pub y: f64,
    /// Weighted z coordinate.
    pub z: f64,
    /// Weight.
    pub w: f64,
}

impl Point4 {
    /// Create from already-homogeneous components.
    pub fn new(x: f64, y: f64, z: f64, w: f64) -> Self {
        Self { x, y, z, w }
    }

    /// Create from a Cartesian point and a weight, multiplying the
    /// coordinates through by the weight.
    pub fn from_cartesian(p: Point3, w: f64) -> Self {
        Self {
            x: p.x * w,
            y: p.y * w,
            z: p.z * w,
            w,
        }
    }
}

/// Raw NURBS curve data: degree, homogeneous control points, and the raw
/// knot vector in the openNURBS convention (two end knots omitted, so the
/// raw length is `points + degree - 1`).
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsCurveData {
    /// Polynomial degree.
    pub degree: usize,
    /// Homogeneous control points in parameter order.
    pub points: Vec<Point4>,
    /// Raw knot vector, non-decreasing.
    pub knots: Vec<f64>,
}

/// Raw NURBS surface data; the control grid is stored as rows indexed by
/// u, columns by v, with a raw openNURBS knot vector per direction.
#[derive(Debug, Clone, PartialEq)]
pub struct NurbsSurfaceData {
    /// Degree in the u direction.
    pub degree_u: usize,
    /// Degree in the v direction.
    pub degree_v: usize,
    /// Control grid: `points[u][v]`.
    pub points: Vec<Vec<Point4>>,
    /// Raw u knot vector.
    pub knots_u: Vec<f64>,
    /// Raw v knot vector.
    pub knots_v: Vec<f64>,
}

/// A straight line segment.
#[derive(Debug, Clone, PartialEq)]
pub struct LineData {
    /// Start point.
    pub from: Point3,
    /// End point.
    pub to: Point3,
}

/// A circular arc: a portion of a circle swept counter-clockwise about
/// the plane normal, starting on the plane x axis.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcCurve {
    /// Circle center.
    pub center: Point3,
    /// Unit vector from the center toward the arc start point.
    pub x_axis: Vec3,
    /// Unit plane normal (rotation axis).
    pub normal: Vec3,
    /// Circle radius.
    pub radius: f64,
    /// Swept angle in radians, in `(0, 2π]`.
    pub angle: f64,
}

impl ArcCurve {
    /// Point on the arc at angle `theta` from the x axis.
    pub fn point_at(&self, theta: f64) -> Point3 {
        let y_axis = self.normal.cross(&self.x_axis);
        let (s, c) = theta.sin_cos();
        self.center + self.radius * (c * self.x_axis + s * y_axis)
    }

    /// Exact rational quadratic NURBS form of the arc.
    ///
    /// The sweep is split into segments of at most 90°. Each segment
    /// contributes an on-arc end pole (weight 1) and a mid pole at the
    /// tangent intersection, pushed out to radius `r / cos(dθ/2)` with
    /// weight `cos(dθ/2)`. The knot vector uses the raw openNURBS
    /// convention (end multiplicities equal to the degree).
    pub fn to_nurbs_curve(&self) -> NurbsCurveData {
        let segs = (self.angle / FRAC_PI_2).ceil().max(1.0) as usize;
        let d_theta = self.angle / segs as f64;
        let w = (d_theta / 2.0).cos();
        let mid_radius = self.radius / w;
        let y_axis = self.normal.cross(&self.x_axis);

        let at = |theta: f64, radius: f64| -> Point3 {
            let (s, c) = theta.sin_cos();
            self.center + radius * (c * self.x_axis + s * y_axis)
        };

        let mut points = Vec::with_capacity(2 * segs + 1);
        points.push(Point4::from_cartesian(at(0.0, self.radius), 1.0));
        for i in 0..segs {
            let theta0 = i as f64 * d_theta;
            points.push(Point4::from_cartesian(
                at(theta0 + d_theta / 2.0, mid_radius),
                w,
            ));
            points.push(Point4::from_cartesian(at(theta0 + d_theta, self.radius), 1.0));
        }

        // Raw knots: each segment boundary with multiplicity 2, the two
        // implicit end knots left off. Length = poles + degree - 1.
        let mut knots = Vec::with_capacity(2 * (segs + 1));
        for i in 0..=segs {
            let t = i as f64 / segs as f64;
            knots.push(t);
            knots.push(t);
        }

        NurbsCurveData {
            degree: 2,
            points,
            knots,
        }
    }
}

/// The curve kinds a .3dm object table distinguishes.
#[derive(Debug, Clone, PartialEq)]
pub enum Curve {
    /// Straight segment.
    Line(LineData),
    /// Native NURBS curve.
    Nurbs(NurbsCurveData),
    /// Circular arc.
    Arc(ArcCurve),
}

/// A circle entity: center, plane normal, radius.
#[derive(Debug, Clone, PartialEq)]
pub struct CircleData {
    /// Circle center.
    pub center: Point3,
    /// Plane normal.
    pub normal: Vec3,
    /// Radius.
    pub radius: f64,
}

/// A point cloud: a bag of positions.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PointCloudData {
    /// Member positions.
    pub points: Vec<Point3>,
}

/// One mesh face. Quads carry four distinct corner indices; triangles
/// repeat the third index in the fourth slot (`d == c`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshFace {
    /// First corner.
    pub a: u32,
    /// Second corner.
    pub b: u32,
    /// Third corner.
    pub c: u32,
    /// Fourth corner; equals `c` for triangles.
    pub d: u32,
}

impl MeshFace {
    /// Whether this face is a quad.
    pub fn is_quad(&self) -> bool {
        self.d != self.c
    }
}

/// A polygon mesh with optional per-vertex normals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Faces (triangles and quads).
    pub faces: Vec<MeshFace>,
    /// Per-vertex normals; empty if the file carried none.
    pub normals: Vec<Vec3>,
}

/// A boundary representation: one underlying NURBS surface per face.
///
/// Trimming curves are not carried; each face contributes its full
/// underlying surface. Edge and vertex counts are retained as diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct BrepData {
    /// Underlying surface of each face.
    pub surfaces: Vec<NurbsSurfaceData>,
    /// Number of edges in the source b-rep.
    pub num_edges: usize,
    /// Number of vertices in the source b-rep.
    pub num_vertices: usize,
}

/// A non-NURBS analytic surface, delivered together with its NURBS
/// equivalent as computed by the container's geometry kernel.
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceData {
    /// NURBS form of the surface.
    pub nurbs_form: NurbsSurfaceData,
}

/// Every geometry kind a .3dm object table can carry.
///
/// The enum is closed: downstream dispatch matches exhaustively, so a new
/// kind added here is a compile-time-checked change everywhere.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Boundary representation.
    Brep(BrepData),
    /// Bezier curve (unhandled downstream).
    BezierCurve,
    /// Embedded bitmap (unhandled downstream).
    Bitmap,
    /// Axis-aligned box (unhandled downstream).
    Box,
    /// Circle.
    Circle(CircleData),
    /// Cone (unhandled downstream).
    Cone,
    /// Curve of any kind.
    Curve(Curve),
    /// Cylinder (unhandled downstream).
    Cylinder,
    /// Ellipse (unhandled downstream).
    Ellipse,
    /// Polygon mesh.
    Mesh(MeshData),
    /// Native NURBS surface.
    NurbsSurface(NurbsSurfaceData),
    /// Single point.
    Point(Point3),
    /// Point cloud.
    PointCloud(PointCloudData),
    /// Analytic surface with a NURBS form.
    Surface(SurfaceData),
}
