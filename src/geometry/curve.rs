use crate::error::{GeometryError, Result};
use crate::math::{Point2, Vector2, TOLERANCE};

use super::BoundingBox;

/// A parametric curve segment over `t ∈ [0, 1]`.
///
/// The four variants match the drawing verbs of a path: straight lines,
/// quadratic and cubic Bézier curves, and conics (rational quadratics
/// carrying a positive weight; a conic with weight 1 is an ordinary
/// quadratic).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CurveSegment {
    /// Straight line between two points.
    Line([Point2; 2]),
    /// Quadratic Bézier with one control point.
    Quad([Point2; 3]),
    /// Cubic Bézier with two control points.
    Cubic([Point2; 4]),
    /// Rational quadratic Bézier with weight `w > 0`.
    Conic { points: [Point2; 3], weight: f64 },
}

fn lerp(a: Point2, b: Point2, t: f64) -> Point2 {
    a + (b - a) * t
}

/// Evaluates quadratic coefficients `(c0 * t + c1) * t + c2`.
fn eval_quad_coeffs(c: &[Vector2; 3], t: f64) -> Vector2 {
    (c[0] * t + c[1]) * t + c[2]
}

impl CurveSegment {
    /// Creates a validated conic segment.
    ///
    /// # Errors
    ///
    /// Returns an error if the weight is not positive and finite.
    pub fn conic(p0: Point2, p1: Point2, p2: Point2, weight: f64) -> Result<Self> {
        if !weight.is_finite() || weight <= 0.0 {
            return Err(GeometryError::InvalidConicWeight(weight).into());
        }
        Ok(Self::Conic {
            points: [p0, p1, p2],
            weight,
        })
    }

    /// First point of the segment.
    #[must_use]
    pub fn start_point(&self) -> Point2 {
        match self {
            Self::Line(p) => p[0],
            Self::Quad(p) => p[0],
            Self::Cubic(p) => p[0],
            Self::Conic { points, .. } => points[0],
        }
    }

    /// Last point of the segment.
    #[must_use]
    pub fn end_point(&self) -> Point2 {
        match self {
            Self::Line(p) => p[1],
            Self::Quad(p) => p[2],
            Self::Cubic(p) => p[3],
            Self::Conic { points, .. } => points[2],
        }
    }

    /// Rational-quadratic numerator and denominator coefficients, each in
    /// `(quadratic, linear, constant)` order.
    fn conic_coefficients(points: &[Point2; 3], weight: f64) -> ([Vector2; 3], [f64; 3]) {
        let pw = points[1].coords * weight;
        let num = [
            points[2].coords - pw * 2.0 + points[0].coords,
            (pw - points[0].coords) * 2.0,
            points[0].coords,
        ];
        let denom = [-2.0 * (weight - 1.0), 2.0 * (weight - 1.0), 1.0];
        (num, denom)
    }

    /// Evaluates the segment at parameter `t`.
    #[must_use]
    pub fn point_at(&self, t: f64) -> Point2 {
        match self {
            Self::Line(p) => lerp(p[0], p[1], t),
            Self::Quad(p) => {
                let a = lerp(p[0], p[1], t);
                let b = lerp(p[1], p[2], t);
                lerp(a, b, t)
            }
            Self::Cubic(p) => {
                let a = lerp(p[0], p[1], t);
                let b = lerp(p[1], p[2], t);
                let c = lerp(p[2], p[3], t);
                lerp(lerp(a, b, t), lerp(b, c, t), t)
            }
            Self::Conic { points, weight } => {
                let (num, denom) = Self::conic_coefficients(points, *weight);
                let n = eval_quad_coeffs(&num, t);
                let d = (denom[0] * t + denom[1]) * t + denom[2];
                Point2::new(n.x / d, n.y / d)
            }
        }
    }

    /// Unnormalized derivative direction at parameter `t`.
    ///
    /// Falls back to the chord when the control polygon is degenerate at
    /// an endpoint.
    fn derivative_at(&self, t: f64) -> Vector2 {
        match self {
            Self::Line(p) => p[1] - p[0],
            Self::Quad(p) => {
                let d = (p[1] - p[0]) * (1.0 - t) + (p[2] - p[1]) * t;
                if d.norm() > 0.0 {
                    d
                } else {
                    p[2] - p[0]
                }
            }
            Self::Cubic(p) => {
                let u = 1.0 - t;
                let d = (p[1] - p[0]) * (u * u)
                    + (p[2] - p[1]) * (2.0 * u * t)
                    + (p[3] - p[2]) * (t * t);
                if d.norm() > 0.0 {
                    d
                } else {
                    p[3] - p[0]
                }
            }
            Self::Conic { points, weight } => {
                // Derivative of a rational Bézier curve, after Floater.
                let w = *weight;
                if (t <= 0.0 && points[0] == points[1]) || (t >= 1.0 && points[1] == points[2]) {
                    return points[2] - points[0];
                }
                let w10 = (1.0 - t) + t * w;
                let w11 = (1.0 - t) * w + t;
                let q0 = (points[0].coords * (1.0 - t) + points[1].coords * (t * w)) / w10;
                let q1 = (points[1].coords * ((1.0 - t) * w) + points[2].coords * t) / w11;
                q1 - q0
            }
        }
    }

    /// Normalized tangent at parameter `t`.
    ///
    /// Degenerate segments (all points coincident) yield the +x direction.
    #[must_use]
    pub fn tangent_at(&self, t: f64) -> Vector2 {
        normalize_or_x(self.derivative_at(t))
    }

    /// Tangent direction leaving the start point, taken from the control
    /// polygon (first pair of distinct points).
    #[must_use]
    pub fn start_tangent(&self) -> Vector2 {
        let pts = self.control_points();
        for p in &pts[1..] {
            let d = p - pts[0];
            if d.norm() > 0.0 {
                return normalize_or_x(d);
            }
        }
        Vector2::x()
    }

    /// Tangent direction arriving at the end point, taken from the control
    /// polygon (last pair of distinct points).
    #[must_use]
    pub fn end_tangent(&self) -> Vector2 {
        let pts = self.control_points();
        let last = pts[pts.len() - 1];
        for p in pts[..pts.len() - 1].iter().rev() {
            let d = last - p;
            if d.norm() > 0.0 {
                return normalize_or_x(d);
            }
        }
        Vector2::x()
    }

    fn control_points(&self) -> Vec<Point2> {
        match self {
            Self::Line(p) => p.to_vec(),
            Self::Quad(p) => p.to_vec(),
            Self::Cubic(p) => p.to_vec(),
            Self::Conic { points, .. } => points.to_vec(),
        }
    }

    /// Splits the segment at parameter `t`, returning the two halves.
    #[must_use]
    pub fn split(&self, t: f64) -> (Self, Self) {
        match self {
            Self::Line(p) => {
                let m = lerp(p[0], p[1], t);
                (Self::Line([p[0], m]), Self::Line([m, p[1]]))
            }
            Self::Quad(p) => {
                let a = lerp(p[0], p[1], t);
                let b = lerp(p[1], p[2], t);
                let m = lerp(a, b, t);
                (Self::Quad([p[0], a, m]), Self::Quad([m, b, p[2]]))
            }
            Self::Cubic(p) => {
                let a = lerp(p[0], p[1], t);
                let b = lerp(p[1], p[2], t);
                let c = lerp(p[2], p[3], t);
                let ab = lerp(a, b, t);
                let bc = lerp(b, c, t);
                let m = lerp(ab, bc, t);
                (Self::Cubic([p[0], a, ab, m]), Self::Cubic([m, bc, c, p[3]]))
            }
            Self::Conic { points, weight } => split_conic(points, *weight, t),
        }
    }

    /// Returns the segment with reversed direction of travel.
    #[must_use]
    pub fn reverse(&self) -> Self {
        match self {
            Self::Line(p) => Self::Line([p[1], p[0]]),
            Self::Quad(p) => Self::Quad([p[2], p[1], p[0]]),
            Self::Cubic(p) => Self::Cubic([p[3], p[2], p[1], p[0]]),
            Self::Conic { points, weight } => Self::Conic {
                points: [points[2], points[1], points[0]],
                weight: *weight,
            },
        }
    }

    /// Bounding box of the control polygon.
    ///
    /// Conservative: the curve is contained, but the box may be larger than
    /// the tight bounds.
    #[must_use]
    pub fn bounds(&self) -> BoundingBox {
        BoundingBox::from_points(&self.control_points())
    }

    /// Returns whether the segment is negligibly small in both axes.
    #[must_use]
    pub fn is_tiny(&self) -> bool {
        let b = self.bounds();
        b.width() < TOLERANCE && b.height() < TOLERANCE
    }
}

fn normalize_or_x(v: Vector2) -> Vector2 {
    let n = v.norm();
    if n > 0.0 {
        v / n
    } else {
        Vector2::x()
    }
}

/// Splits a conic by de Casteljau in homogeneous coordinates, then
/// projects down and renormalizes the weights so the endpoint weights
/// are 1 again.
fn split_conic(points: &[Point2; 3], weight: f64, t: f64) -> (CurveSegment, CurveSegment) {
    // Homogeneous control points (x*w, y*w, w).
    let h = [
        nalgebra::Vector3::new(points[0].x, points[0].y, 1.0),
        nalgebra::Vector3::new(points[1].x * weight, points[1].y * weight, weight),
        nalgebra::Vector3::new(points[2].x, points[2].y, 1.0),
    ];
    let a = h[0].lerp(&h[1], t);
    let b = h[1].lerp(&h[2], t);
    let m = a.lerp(&b, t);

    let project = |v: &nalgebra::Vector3<f64>| Point2::new(v.x / v.z, v.y / v.z);

    // w0 * w2 / w1^2 is invariant under common scaling, so the inner
    // weight of each half can be normalized against its outer weights.
    let left = CurveSegment::Conic {
        points: [project(&h[0]), project(&a), project(&m)],
        weight: a.z / (h[0].z * m.z).sqrt(),
    };
    let right = CurveSegment::Conic {
        points: [project(&m), project(&b), project(&h[2])],
        weight: b.z / (m.z * h[2].z).sqrt(),
    };
    (left, right)
}
