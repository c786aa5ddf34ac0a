//! Geometry translation: .3dm NURBS data to the document spline types.
//!
//! The functions here are stateless. The interesting work is the knot
//! vector handling: the source format stores knot vectors without the two
//! superfluous end knots (raw length is `poles + degree - 1`), so after
//! counting multiplicities the first and last get incremented once each,
//! restoring the clamped relation `sum(mults) == poles + degree + 1` that
//! the spline constructors validate. Periodicity is not stored as a flag
//! in the raw data; it is inferred from the boosted end multiplicity.

use threedm_geom::{BSplineCurve, BSplineSurface, KnotVector};
use threedm_math::{Placement, Point3, Vec3};
use threedm_model::{NurbsCurveData, NurbsSurfaceData, Point4};

use crate::error::TranslateError;

/// Split a homogeneous control point into its Cartesian position and
/// weight. A zero weight is degenerate input, not an infinity.
pub fn dehomogenize(p: &Point4) -> Result<(Point3, f64), TranslateError> {
    if p.w == 0.0 {
        return Err(TranslateError::DegenerateWeight);
    }
    Ok((Point3::new(p.x / p.w, p.y / p.w, p.z / p.w), p.w))
}

/// Compact a raw knot vector into distinct knots plus multiplicities,
/// with the end-clamp restoration: the first and last multiplicity are
/// each incremented by one relative to their raw occurrence count.
///
/// A raw vector with a single distinct value gets both increments on that
/// one multiplicity. Empty or decreasing input is a caller contract
/// violation and fails with [`TranslateError::InvalidKnotVector`].
pub fn compact_knots(raw: &[f64]) -> Result<KnotVector, TranslateError> {
    if raw.is_empty() {
        return Err(TranslateError::invalid_knots("empty knot vector"));
    }

    let mut knots: Vec<f64> = Vec::new();
    let mut mults: Vec<usize> = Vec::new();
    for &k in raw {
        if let (Some(&last), Some(m)) = (knots.last(), mults.last_mut()) {
            if k == last {
                *m += 1;
                continue;
            }
            if k < last {
                return Err(TranslateError::invalid_knots(format!(
                    "decreasing knots: {} after {}",
                    k, last
                )));
            }
        }
        knots.push(k);
        mults.push(1);
    }

    mults[0] += 1;
    let last = mults.len() - 1;
    mults[last] += 1;

    Ok(KnotVector::new(knots, mults)?)
}

/// Periodicity rule: a direction is periodic iff its boosted first
/// multiplicity is strictly less than `degree + 1`.
pub fn infer_periodic(knots: &KnotVector, degree: usize) -> bool {
    knots.first_mult() < degree + 1
}

/// Build a document B-spline curve from raw .3dm curve data.
///
/// Dehomogenizes the control points in input order, compacts the knot
/// vector, infers periodicity, and hands the result to the spline
/// constructor, whose consistency validation propagates unmodified.
pub fn build_curve(data: &NurbsCurveData) -> Result<BSplineCurve, TranslateError> {
    let mut poles = Vec::with_capacity(data.points.len());
    let mut weights = Vec::with_capacity(data.points.len());
    for p in &data.points {
        let (pole, weight) = dehomogenize(p)?;
        poles.push(pole);
        weights.push(weight);
    }

    let knots = compact_knots(&data.knots)?;
    let periodic = infer_periodic(&knots, data.degree);

    Ok(BSplineCurve::new(poles, weights, knots, data.degree, periodic)?)
}

/// Build a document B-spline surface from raw .3dm surface data.
///
/// The u and v directions are processed independently: each gets its own
/// compacted knot vector and its own periodicity flag.
pub fn build_surface(data: &NurbsSurfaceData) -> Result<BSplineSurface, TranslateError> {
    let mut pole_grid = Vec::with_capacity(data.points.len());
    let mut weight_grid = Vec::with_capacity(data.points.len());
    for row in &data.points {
        let mut poles = Vec::with_capacity(row.len());
        let mut weights = Vec::with_capacity(row.len());
        for p in row {
            let (pole, weight) = dehomogenize(p)?;
            poles.push(pole);
            weights.push(weight);
        }
        pole_grid.push(poles);
        weight_grid.push(weights);
    }

    let knots_u = compact_knots(&data.knots_u)?;
    let knots_v = compact_knots(&data.knots_v)?;
    let periodic_u = infer_periodic(&knots_u, data.degree_u);
    let periodic_v = infer_periodic(&knots_v, data.degree_v);

    Ok(BSplineSurface::from_grid(
        pole_grid,
        weight_grid,
        knots_u,
        knots_v,
        data.degree_u,
        data.degree_v,
        periodic_u,
        periodic_v,
    )?)
}

/// Placement for plane-based primitives: axis = +Z × normal, angle =
/// ∠(+Z, normal) in degrees, position = center. A normal parallel to ±Z
/// leaves the axis zero without faulting.
pub fn placement_from_center_normal(center: Point3, normal: Vec3) -> Placement {
    Placement::from_center_normal(center, normal)
}

/// Convert 8-bit RGBA channels to unit floats.
pub fn color_to_unit(channels: &[u8]) -> Result<[f64; 4], TranslateError> {
    match channels {
        [r, g, b, a] => Ok([
            *r as f64 / 255.0,
            *g as f64 / 255.0,
            *b as f64 / 255.0,
            *a as f64 / 255.0,
        ]),
        _ => Err(TranslateError::InvalidColor {
            got: channels.len(),
        }),
    }
}

/// Convert 8-bit RGBA channels to a unit RGB triple plus an opacity
/// percentage, `round((1 - a/255) * 100)`.
pub fn color_and_opacity(channels: &[u8]) -> Result<([f64; 3], u8), TranslateError> {
    match channels {
        [r, g, b, a] => {
            let rgb = [
                *r as f64 / 255.0,
                *g as f64 / 255.0,
                *b as f64 / 255.0,
            ];
            let opacity = ((1.0 - *a as f64 / 255.0) * 100.0).round() as u8;
            Ok((rgb, opacity))
        }
        _ => Err(TranslateError::InvalidColor {
            got: channels.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;
    use threedm_model::ArcCurve;

    #[test]
    fn test_dehomogenize() {
        let (p, w) = dehomogenize(&Point4::new(2.0, 4.0, 6.0, 2.0)).unwrap();
        assert_eq!(p, Point3::new(1.0, 2.0, 3.0));
        assert_eq!(w, 2.0);
    }

    #[test]
    fn test_dehomogenize_zero_weight() {
        let err = dehomogenize(&Point4::new(1.0, 2.0, 3.0, 0.0));
        assert!(matches!(err, Err(TranslateError::DegenerateWeight)));
    }

    #[test]
    fn test_compact_knots_clamped() {
        // Degree 3 clamped vector in the raw convention: end mults 4
        // become 5 after the boost.
        let raw = [0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 4.0, 4.0, 4.0];
        let kv = compact_knots(&raw).unwrap();
        assert_eq!(kv.knots(), &[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(kv.mults(), &[5, 1, 1, 1, 5]);
        assert!(!infer_periodic(&kv, 3));
    }

    #[test]
    fn test_compact_knots_uniform_periodic() {
        // Uniform vector, every mult 1: boosted ends are 2, which for
        // degree 3 signals a periodic curve.
        let raw = [-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let kv = compact_knots(&raw).unwrap();
        assert_eq!(kv.mults(), &[2, 1, 1, 1, 1, 1, 1, 1, 2]);
        assert!(infer_periodic(&kv, 3));
        assert!(!infer_periodic(&kv, 1));
    }

    #[test]
    fn test_compact_knots_single_distinct() {
        // One distinct value takes both end increments.
        let raw = [1.5, 1.5, 1.5];
        let kv = compact_knots(&raw).unwrap();
        assert_eq!(kv.knots(), &[1.5]);
        assert_eq!(kv.mults(), &[5]);
    }

    #[test]
    fn test_compact_knots_rejects_empty_and_decreasing() {
        assert!(matches!(
            compact_knots(&[]),
            Err(TranslateError::InvalidKnotVector(_))
        ));
        assert!(matches!(
            compact_knots(&[0.0, 1.0, 0.5]),
            Err(TranslateError::InvalidKnotVector(_))
        ));
    }

    #[test]
    fn test_build_curve_clamped() {
        // 5 poles of degree 3: raw knot length is 5 + 3 - 1 = 7, with the
        // ends at multiplicity 3 in the raw convention. The boost brings
        // them to 4 = degree + 1, a standard clamped curve.
        let points: Vec<Point4> = (0..5)
            .map(|i| Point4::new(i as f64, 0.0, 0.0, 1.0))
            .collect();
        let data = NurbsCurveData {
            degree: 3,
            points,
            knots: vec![0.0, 0.0, 0.0, 1.0, 2.0, 2.0, 2.0],
        };
        let curve = build_curve(&data).unwrap();
        assert!(!curve.is_periodic());
        assert_eq!(curve.poles().len(), 5);
        assert_eq!(curve.knots().mults(), &[4, 1, 4]);
        // Clamped curve interpolates its end poles.
        assert!((curve.eval(0.0) - Point3::new(0.0, 0.0, 0.0)).norm() < 1e-10);
        assert!((curve.eval(2.0) - Point3::new(4.0, 0.0, 0.0)).norm() < 1e-10);
    }

    #[test]
    fn test_build_curve_periodic_flag() {
        // 7 poles of degree 3 with a uniform raw knot vector of length 9.
        let points: Vec<Point4> = (0..7)
            .map(|i| {
                let theta = 2.0 * PI * i as f64 / 7.0;
                Point4::new(theta.cos(), theta.sin(), 0.0, 1.0)
            })
            .collect();
        let data = NurbsCurveData {
            degree: 3,
            points,
            knots: vec![-3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0],
        };
        let curve = build_curve(&data).unwrap();
        assert!(curve.is_periodic());
    }

    #[test]
    fn test_build_curve_propagates_weight_error() {
        let data = NurbsCurveData {
            degree: 1,
            points: vec![Point4::new(0.0, 0.0, 0.0, 1.0), Point4::new(1.0, 0.0, 0.0, 0.0)],
            knots: vec![0.0, 1.0],
        };
        assert!(matches!(
            build_curve(&data),
            Err(TranslateError::DegenerateWeight)
        ));
    }

    #[test]
    fn test_build_curve_from_arc_preserves_circle() {
        // Full-circle arc through the rational quadratic conversion: the
        // evaluated curve must stay on the circle everywhere.
        let arc = ArcCurve {
            center: Point3::new(2.0, -1.0, 0.5),
            x_axis: Vec3::x(),
            normal: Vec3::z(),
            radius: 4.0,
            angle: 2.0 * PI,
        };
        let curve = build_curve(&arc.to_nurbs_curve()).unwrap();
        let (t0, t1) = curve.domain();
        for i in 0..=32 {
            let t = t0 + (t1 - t0) * i as f64 / 32.0;
            let p = curve.eval(t);
            let r = (p - arc.center).norm();
            assert!((r - 4.0).abs() < 1e-8, "radius at t={}: {}", t, r);
        }
    }

    #[test]
    fn test_build_surface_directions_independent() {
        // Bilinear patch in u, quadratic clamped in v; periodicity is
        // evaluated per direction.
        let row = |z: f64| {
            (0..4)
                .map(|i| Point4::new(i as f64, z, 0.0, 1.0))
                .collect::<Vec<_>>()
        };
        let data = NurbsSurfaceData {
            degree_u: 1,
            degree_v: 2,
            points: vec![row(0.0), row(1.0)],
            // u: 2 poles degree 1 -> raw length 2.
            knots_u: vec![0.0, 1.0],
            // v: 4 poles degree 2 -> raw length 5.
            knots_v: vec![0.0, 0.0, 0.5, 1.0, 1.0],
        };
        let surf = build_surface(&data).unwrap();
        assert!(!surf.is_periodic_u());
        assert!(!surf.is_periodic_v());
        assert_eq!(surf.n_u(), 2);
        assert_eq!(surf.n_v(), 4);
    }

    #[test]
    fn test_build_surface_ragged_grid_fails() {
        let data = NurbsSurfaceData {
            degree_u: 1,
            degree_v: 1,
            points: vec![
                vec![Point4::new(0.0, 0.0, 0.0, 1.0), Point4::new(1.0, 0.0, 0.0, 1.0)],
                vec![Point4::new(0.0, 1.0, 0.0, 1.0)],
            ],
            knots_u: vec![0.0, 1.0],
            knots_v: vec![0.0, 1.0],
        };
        assert!(matches!(
            build_surface(&data),
            Err(TranslateError::Spline(_))
        ));
    }

    #[test]
    fn test_placement_degenerate_normal() {
        let p = placement_from_center_normal(Point3::origin(), Vec3::z());
        assert!(p.axis.norm() < 1e-15);
        assert!(p.angle_deg.abs() < 1e-12);
    }

    #[test]
    fn test_color_to_unit() {
        let c = color_to_unit(&[255, 0, 127, 255]).unwrap();
        assert_relative_eq!(c[0], 1.0);
        assert_relative_eq!(c[1], 0.0);
        assert_relative_eq!(c[2], 127.0 / 255.0);
        assert_relative_eq!(c[3], 1.0);
    }

    #[test]
    fn test_color_and_opacity() {
        let (rgb, opacity) = color_and_opacity(&[255, 0, 0, 255]).unwrap();
        assert_eq!(rgb, [1.0, 0.0, 0.0]);
        assert_eq!(opacity, 0);

        let (rgb, opacity) = color_and_opacity(&[0, 0, 0, 0]).unwrap();
        assert_eq!(rgb, [0.0, 0.0, 0.0]);
        assert_eq!(opacity, 100);

        // Rounded, not truncated.
        let (_, opacity) = color_and_opacity(&[0, 0, 0, 128]).unwrap();
        assert_eq!(opacity, 50);
    }

    #[test]
    fn test_color_wrong_channel_count() {
        assert!(matches!(
            color_to_unit(&[1, 2, 3]),
            Err(TranslateError::InvalidColor { got: 3 })
        ));
        assert!(matches!(
            color_and_opacity(&[1, 2, 3, 4, 5]),
            Err(TranslateError::InvalidColor { got: 5 })
        ));
    }
}
