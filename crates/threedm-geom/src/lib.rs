#![warn(missing_docs)]

//! Rational B-spline curves and surfaces for the threedm import kernel.
//!
//! The types here are the *target* representation of the import pipeline:
//! curves and surfaces defined by Cartesian poles, per-pole weights, a
//! compact knot vector (distinct knots plus multiplicities), a degree, and
//! a periodicity flag. Constructors are fallible and validate the knot /
//! pole / degree invariants; evaluation uses De Boor's algorithm in
//! homogeneous coordinates.
//!
//! # Key types
//!
//! - [`KnotVector`] — distinct knots with multiplicities
//! - [`BSplineCurve`] — rational B-spline (NURBS) curve in 3D
//! - [`BSplineSurface`] — rational tensor-product NURBS surface
//! - [`Line3d`], [`Circle3d`], [`TriangleMesh`] — the simple document
//!   primitives emitted alongside splines

use thiserror::Error;
use threedm_math::{Placement, Point3, Vec3};

/// Errors raised when constructing spline geometry from inconsistent data.
#[derive(Error, Debug)]
pub enum SplineError {
    /// The knot vector itself is malformed (empty, decreasing, zero mult).
    #[error("invalid knot vector: {0}")]
    InvalidKnotVector(String),

    /// Curve data is inconsistent (pole count, weight count, knot count).
    #[error("invalid curve definition: {0}")]
    InvalidCurveDefinition(String),

    /// Surface data is inconsistent (grid shape, weight grid, knot counts).
    #[error("invalid surface definition: {0}")]
    InvalidSurfaceDefinition(String),
}

// =============================================================================
// Knot vector
// =============================================================================

/// A compact knot vector: strictly increasing distinct knots, each with a
/// positive multiplicity.
///
/// The expanded form (each knot repeated by its multiplicity) is what De
/// Boor evaluation consumes; for a clamped curve with `n` poles of degree
/// `p` the expanded length must be `n + p + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct KnotVector {
    knots: Vec<f64>,
    mults: Vec<usize>,
}

impl KnotVector {
    /// Create a knot vector from distinct knots and parallel multiplicities.
    pub fn new(knots: Vec<f64>, mults: Vec<usize>) -> Result<Self, SplineError> {
        if knots.is_empty() {
            return Err(SplineError::InvalidKnotVector("no knots".into()));
        }
        if knots.len() != mults.len() {
            return Err(SplineError::InvalidKnotVector(format!(
                "{} knots but {} multiplicities",
                knots.len(),
                mults.len()
            )));
        }
        for pair in knots.windows(2) {
            if pair[1] <= pair[0] {
                return Err(SplineError::InvalidKnotVector(format!(
                    "knots not strictly increasing at {} -> {}",
                    pair[0], pair[1]
                )));
            }
        }
        if mults.iter().any(|&m| m == 0) {
            return Err(SplineError::InvalidKnotVector(
                "zero multiplicity".into(),
            ));
        }
        Ok(Self { knots, mults })
    }

    /// Distinct knot values, strictly increasing.
    pub fn knots(&self) -> &[f64] {
        &self.knots
    }

    /// Multiplicities, parallel to [`Self::knots`].
    pub fn mults(&self) -> &[usize] {
        &self.mults
    }

    /// Multiplicity of the first knot.
    pub fn first_mult(&self) -> usize {
        self.mults[0]
    }

    /// Total length of the expanded knot vector.
    pub fn expanded_len(&self) -> usize {
        self.mults.iter().sum()
    }

    /// Expand into the flat knot sequence used by De Boor evaluation.
    pub fn expanded(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.expanded_len());
        for (&k, &m) in self.knots.iter().zip(&self.mults) {
            out.extend(std::iter::repeat(k).take(m));
        }
        out
    }
}

// =============================================================================
// De Boor machinery
// =============================================================================

/// Find the knot span index for parameter `t`.
///
/// Returns `i` such that `knots[i] <= t < knots[i+1]` with a positive
/// interval, clamped to the valid range. End multiplicities can exceed
/// `degree + 1` here (the import convention over-clamps in some cases),
/// which leaves zero-length spans at the ends; the final adjustment steps
/// off them so the basis recursion never divides by zero.
fn find_span(knots: &[f64], n: usize, degree: usize, t: f64) -> usize {
    // n = number of poles - 1 (last index)
    let mut span = if t >= knots[n + 1] {
        n
    } else if t <= knots[degree] {
        degree
    } else {
        let mut low = degree;
        let mut high = n + 1;
        let mut mid = (low + high) / 2;
        while t < knots[mid] || t >= knots[mid + 1] {
            if t < knots[mid] {
                high = mid;
            } else {
                low = mid;
            }
            mid = (low + high) / 2;
        }
        mid
    };
    while span < n && knots[span + 1] <= t {
        span += 1;
    }
    while span > degree && knots[span] == knots[span + 1] {
        span -= 1;
    }
    span
}

/// Compute the `degree + 1` non-zero basis function values at `t`.
fn basis_functions(knots: &[f64], span: usize, degree: usize, t: f64) -> Vec<f64> {
    let mut n = vec![0.0; degree + 1];
    let mut left = vec![0.0; degree + 1];
    let mut right = vec![0.0; degree + 1];
    n[0] = 1.0;

    for j in 1..=degree {
        left[j] = t - knots[span + 1 - j];
        right[j] = knots[span + j] - t;
        let mut saved = 0.0;
        for r in 0..j {
            let temp = n[r] / (right[r + 1] + left[j - r]);
            n[r] = saved + right[r + 1] * temp;
            saved = left[j - r] * temp;
        }
        n[j] = saved;
    }

    n
}

// =============================================================================
// Rational B-spline curve
// =============================================================================

/// A rational B-spline (NURBS) curve in 3D.
///
/// Defined by Cartesian poles, positive per-pole weights, a compact knot
/// vector, and a degree. The `periodic` flag records that the curve closes
/// smoothly onto itself (inferred from knot multiplicities at import time);
/// evaluation always runs over the expanded knot sequence.
#[derive(Debug, Clone)]
pub struct BSplineCurve {
    poles: Vec<Point3>,
    weights: Vec<f64>,
    knots: KnotVector,
    degree: usize,
    periodic: bool,
    expanded_knots: Vec<f64>,
}

impl BSplineCurve {
    /// Create a curve, validating the pole/weight/knot/degree invariants.
    pub fn new(
        poles: Vec<Point3>,
        weights: Vec<f64>,
        knots: KnotVector,
        degree: usize,
        periodic: bool,
    ) -> Result<Self, SplineError> {
        if degree == 0 {
            return Err(SplineError::InvalidCurveDefinition(
                "degree must be at least 1".into(),
            ));
        }
        if poles.len() < degree + 1 {
            return Err(SplineError::InvalidCurveDefinition(format!(
                "{} poles is too few for degree {} (need at least {})",
                poles.len(),
                degree,
                degree + 1
            )));
        }
        if weights.len() != poles.len() {
            return Err(SplineError::InvalidCurveDefinition(format!(
                "{} weights for {} poles",
                weights.len(),
                poles.len()
            )));
        }
        if weights.iter().any(|&w| w <= 0.0) {
            return Err(SplineError::InvalidCurveDefinition(
                "weights must be positive".into(),
            ));
        }
        let expected = poles.len() + degree + 1;
        if knots.expanded_len() != expected {
            return Err(SplineError::InvalidCurveDefinition(format!(
                "knot vector sums to {} but {} poles of degree {} require {}",
                knots.expanded_len(),
                poles.len(),
                degree,
                expected
            )));
        }
        let expanded_knots = knots.expanded();
        Ok(Self {
            poles,
            weights,
            knots,
            degree,
            periodic,
            expanded_knots,
        })
    }

    /// Control points (poles) in Cartesian coordinates.
    pub fn poles(&self) -> &[Point3] {
        &self.poles
    }

    /// Per-pole weights.
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Compact knot vector.
    pub fn knots(&self) -> &KnotVector {
        &self.knots
    }

    /// Polynomial degree.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Whether the curve closes smoothly onto itself.
    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    /// Parameter domain `(t_min, t_max)`.
    pub fn domain(&self) -> (f64, f64) {
        (
            self.expanded_knots[self.degree],
            self.expanded_knots[self.poles.len()],
        )
    }

    /// Evaluate at parameter `t` using rational De Boor.
    pub fn eval(&self, t: f64) -> Point3 {
        let n = self.poles.len() - 1;
        let knots = &self.expanded_knots;
        let t = t.clamp(knots[self.degree], knots[n + 1]);
        let span = find_span(knots, n, self.degree, t);
        let basis = basis_functions(knots, span, self.degree, t);

        let mut hx = 0.0;
        let mut hy = 0.0;
        let mut hz = 0.0;
        let mut hw = 0.0;
        for (i, &b) in basis.iter().enumerate() {
            let idx = span - self.degree + i;
            let w = self.weights[idx];
            let p = &self.poles[idx];
            hx += b * w * p.x;
            hy += b * w * p.y;
            hz += b * w * p.z;
            hw += b * w;
        }

        if hw.abs() < 1e-30 {
            Point3::origin()
        } else {
            Point3::new(hx / hw, hy / hw, hz / hw)
        }
    }
}

// =============================================================================
// Rational B-spline surface
// =============================================================================

/// A rational tensor-product NURBS surface.
///
/// Poles are stored row-major by u: `poles[u_idx * n_v + v_idx]`. Each
/// parametric direction carries its own compact knot vector, degree, and
/// periodicity flag.
#[derive(Debug, Clone)]
pub struct BSplineSurface {
    poles: Vec<Point3>,
    weights: Vec<f64>,
    n_u: usize,
    n_v: usize,
    knots_u: KnotVector,
    knots_v: KnotVector,
    degree_u: usize,
    degree_v: usize,
    periodic_u: bool,
    periodic_v: bool,
    expanded_u: Vec<f64>,
    expanded_v: Vec<f64>,
}

impl BSplineSurface {
    /// Create a surface from pole and weight grids (rows indexed by u).
    ///
    /// Validates grid shape consistency, weight positivity, and the knot
    /// count relation in both directions.
    #[allow(clippy::too_many_arguments)]
    pub fn from_grid(
        pole_grid: Vec<Vec<Point3>>,
        weight_grid: Vec<Vec<f64>>,
        knots_u: KnotVector,
        knots_v: KnotVector,
        degree_u: usize,
        degree_v: usize,
        periodic_u: bool,
        periodic_v: bool,
    ) -> Result<Self, SplineError> {
        if degree_u == 0 || degree_v == 0 {
            return Err(SplineError::InvalidSurfaceDefinition(
                "degrees must be at least 1".into(),
            ));
        }
        let n_u = pole_grid.len();
        if n_u == 0 {
            return Err(SplineError::InvalidSurfaceDefinition(
                "empty pole grid".into(),
            ));
        }
        let n_v = pole_grid[0].len();
        if pole_grid.iter().any(|row| row.len() != n_v) {
            return Err(SplineError::InvalidSurfaceDefinition(
                "pole grid rows have inconsistent lengths".into(),
            ));
        }
        if weight_grid.len() != n_u || weight_grid.iter().any(|row| row.len() != n_v) {
            return Err(SplineError::InvalidSurfaceDefinition(format!(
                "weight grid shape does not match {}x{} pole grid",
                n_u, n_v
            )));
        }
        if n_u < degree_u + 1 || n_v < degree_v + 1 {
            return Err(SplineError::InvalidSurfaceDefinition(format!(
                "{}x{} poles is too few for degrees ({}, {})",
                n_u, n_v, degree_u, degree_v
            )));
        }
        let expected_u = n_u + degree_u + 1;
        let expected_v = n_v + degree_v + 1;
        if knots_u.expanded_len() != expected_u {
            return Err(SplineError::InvalidSurfaceDefinition(format!(
                "u knot vector sums to {} but {} poles of degree {} require {}",
                knots_u.expanded_len(),
                n_u,
                degree_u,
                expected_u
            )));
        }
        if knots_v.expanded_len() != expected_v {
            return Err(SplineError::InvalidSurfaceDefinition(format!(
                "v knot vector sums to {} but {} poles of degree {} require {}",
                knots_v.expanded_len(),
                n_v,
                degree_v,
                expected_v
            )));
        }

        let mut poles = Vec::with_capacity(n_u * n_v);
        let mut weights = Vec::with_capacity(n_u * n_v);
        for (row, wrow) in pole_grid.into_iter().zip(weight_grid) {
            poles.extend(row);
            weights.extend(wrow);
        }
        if weights.iter().any(|&w| w <= 0.0) {
            return Err(SplineError::InvalidSurfaceDefinition(
                "weights must be positive".into(),
            ));
        }

        let expanded_u = knots_u.expanded();
        let expanded_v = knots_v.expanded();
        Ok(Self {
            poles,
            weights,
            n_u,
            n_v,
            knots_u,
            knots_v,
            degree_u,
            degree_v,
            periodic_u,
            periodic_v,
            expanded_u,
            expanded_v,
        })
    }

    /// Number of poles in the u direction.
    pub fn n_u(&self) -> usize {
        self.n_u
    }

    /// Number of poles in the v direction.
    pub fn n_v(&self) -> usize {
        self.n_v
    }

    /// Compact knot vector in u.
    pub fn knots_u(&self) -> &KnotVector {
        &self.knots_u
    }

    /// Compact knot vector in v.
    pub fn knots_v(&self) -> &KnotVector {
        &self.knots_v
    }

    /// Degree in u.
    pub fn degree_u(&self) -> usize {
        self.degree_u
    }

    /// Degree in v.
    pub fn degree_v(&self) -> usize {
        self.degree_v
    }

    /// Whether the surface is periodic in u.
    pub fn is_periodic_u(&self) -> bool {
        self.periodic_u
    }

    /// Whether the surface is periodic in v.
    pub fn is_periodic_v(&self) -> bool {
        self.periodic_v
    }

    /// Pole at `(u_idx, v_idx)`.
    pub fn pole(&self, u_idx: usize, v_idx: usize) -> &Point3 {
        &self.poles[u_idx * self.n_v + v_idx]
    }

    /// Weight at `(u_idx, v_idx)`.
    pub fn weight(&self, u_idx: usize, v_idx: usize) -> f64 {
        self.weights[u_idx * self.n_v + v_idx]
    }

    /// Parameter domain `((u_min, u_max), (v_min, v_max))`.
    pub fn domain(&self) -> ((f64, f64), (f64, f64)) {
        (
            (self.expanded_u[self.degree_u], self.expanded_u[self.n_u]),
            (self.expanded_v[self.degree_v], self.expanded_v[self.n_v]),
        )
    }

    /// Evaluate at `(u, v)` using rational tensor-product De Boor.
    pub fn eval(&self, u: f64, v: f64) -> Point3 {
        let nu = self.n_u - 1;
        let nv = self.n_v - 1;
        let u = u.clamp(self.expanded_u[self.degree_u], self.expanded_u[nu + 1]);
        let v = v.clamp(self.expanded_v[self.degree_v], self.expanded_v[nv + 1]);

        let span_u = find_span(&self.expanded_u, nu, self.degree_u, u);
        let span_v = find_span(&self.expanded_v, nv, self.degree_v, v);
        let basis_u = basis_functions(&self.expanded_u, span_u, self.degree_u, u);
        let basis_v = basis_functions(&self.expanded_v, span_v, self.degree_v, v);

        let mut hx = 0.0;
        let mut hy = 0.0;
        let mut hz = 0.0;
        let mut hw = 0.0;
        for (i, &bu) in basis_u.iter().enumerate() {
            let u_idx = span_u - self.degree_u + i;
            for (j, &bv) in basis_v.iter().enumerate() {
                let v_idx = span_v - self.degree_v + j;
                let b = bu * bv;
                let w = self.weight(u_idx, v_idx);
                let p = self.pole(u_idx, v_idx);
                hx += b * w * p.x;
                hy += b * w * p.y;
                hz += b * w * p.z;
                hw += b * w;
            }
        }

        if hw.abs() < 1e-30 {
            Point3::origin()
        } else {
            Point3::new(hx / hw, hy / hw, hz / hw)
        }
    }
}

// =============================================================================
// Simple document primitives
// =============================================================================

/// A 3D line segment between two endpoints.
#[derive(Debug, Clone, PartialEq)]
pub struct Line3d {
    /// Start point.
    pub start: Point3,
    /// End point.
    pub end: Point3,
}

impl Line3d {
    /// Create a segment from two endpoints.
    pub fn from_points(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    /// Evaluate at `t` in `[0, 1]`.
    pub fn eval(&self, t: f64) -> Point3 {
        self.start + t * (self.end - self.start)
    }
}

/// A parametric circle primitive: radius plus placement.
///
/// The circle lies in the placement's local XY plane; the placement
/// rotation carries the world +Z axis onto the circle normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Circle3d {
    /// Circle radius.
    pub radius: f64,
    /// Position and orientation.
    pub placement: Placement,
}

impl Circle3d {
    /// Create a circle from center, normal, and radius.
    pub fn new(center: Point3, normal: Vec3, radius: f64) -> Self {
        Self {
            radius,
            placement: Placement::from_center_normal(center, normal),
        }
    }

    /// Evaluate at angle `t` (radians).
    pub fn eval(&self, t: f64) -> Point3 {
        let (s, c) = t.sin_cos();
        let local = Point3::new(self.radius * c, self.radius * s, 0.0);
        self.placement.to_transform().apply_point(&local)
    }
}

/// A triangle mesh produced by direct vertex/face copy from mesh entities.
#[derive(Debug, Clone, Default)]
pub struct TriangleMesh {
    /// Vertex positions.
    pub vertices: Vec<Point3>,
    /// Triangle vertex indices.
    pub triangles: Vec<[u32; 3]>,
    /// Optional per-vertex normals (empty when the source had none).
    pub normals: Vec<Vec3>,
}

impl TriangleMesh {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of triangles.
    pub fn num_triangles(&self) -> usize {
        self.triangles.len()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }
}

// =============================================================================
// Tests
// =============================================================================
