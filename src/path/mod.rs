mod builder;
mod fill;

pub use builder::PathBuilder;

use crate::geometry::CurveSegment;
use crate::math::Point2;

/// Determines which regions count as "inside" a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillRule {
    /// Winding-number test: inside where the winding number is nonzero.
    NonZero,
    /// Parity test: inside where the winding number is odd.
    EvenOdd,
}

/// One drawing instruction of a contour.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathVerb {
    /// Begins a contour at the given point.
    Move(Point2),
    /// Straight line to the given point.
    Line(Point2),
    /// Quadratic Bézier via one control point.
    Quad(Point2, Point2),
    /// Cubic Bézier via two control points.
    Cubic(Point2, Point2, Point2),
    /// Conic (rational quadratic) via one control point and a weight.
    Conic {
        ctrl: Point2,
        end: Point2,
        weight: f64,
    },
    /// Closes the contour back to its starting point.
    Close,
}

/// One sub-path: a `Move` followed by drawing verbs, optionally
/// terminated by `Close`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Contour {
    verbs: Vec<PathVerb>,
}

impl Contour {
    pub(crate) fn new(verbs: Vec<PathVerb>) -> Self {
        Self { verbs }
    }

    /// The verbs of this contour.
    #[must_use]
    pub fn verbs(&self) -> &[PathVerb] {
        &self.verbs
    }

    /// Whether the contour is explicitly closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        matches!(self.verbs.last(), Some(PathVerb::Close))
    }

    /// Starting point of the contour, if it has one.
    #[must_use]
    pub fn start_point(&self) -> Option<Point2> {
        match self.verbs.first() {
            Some(PathVerb::Move(p)) => Some(*p),
            _ => None,
        }
    }

    /// Curve segments of this contour, with an implicit closing chord
    /// appended when the endpoints do not already coincide.
    ///
    /// Used for fill and area queries, which always treat a contour as a
    /// closed region.
    #[must_use]
    pub fn curves_for_fill(&self) -> Vec<CurveSegment> {
        let mut curves = Vec::new();
        let Some(start) = self.start_point() else {
            return curves;
        };
        let mut current = start;
        for verb in &self.verbs {
            match *verb {
                PathVerb::Move(p) => current = p,
                PathVerb::Line(p) => {
                    curves.push(CurveSegment::Line([current, p]));
                    current = p;
                }
                PathVerb::Quad(c, p) => {
                    curves.push(CurveSegment::Quad([current, c, p]));
                    current = p;
                }
                PathVerb::Cubic(c1, c2, p) => {
                    curves.push(CurveSegment::Cubic([current, c1, c2, p]));
                    current = p;
                }
                PathVerb::Conic { ctrl, end, weight } => {
                    curves.push(CurveSegment::Conic {
                        points: [current, ctrl, end],
                        weight,
                    });
                    current = end;
                }
                PathVerb::Close => {}
            }
        }
        if (current - start).norm() > 0.0 {
            curves.push(CurveSegment::Line([current, start]));
        }
        curves
    }
}

/// An immutable sequence of contours.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    contours: Vec<Contour>,
}

impl Path {
    pub(crate) fn new(contours: Vec<Contour>) -> Self {
        Self { contours }
    }

    /// The contours of this path.
    #[must_use]
    pub fn contours(&self) -> &[Contour] {
        &self.contours
    }

    /// Whether the path has no contours at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Returns a copy of this path with all open contours dropped.
    ///
    /// Boolean operations only see closed contours; open sub-paths do not
    /// enclose area.
    #[must_use]
    pub fn without_open_contours(&self) -> Self {
        Self {
            contours: self
                .contours
                .iter()
                .filter(|c| c.is_closed())
                .cloned()
                .collect(),
        }
    }

    /// Tests whether a point is inside the filled region of this path
    /// under the given fill rule.
    ///
    /// Boundary points belong to the filled region, but the crossing
    /// count cannot be evaluated reliably for a point exactly on the
    /// boundary; callers that need a definite answer probe slightly off
    /// the boundary.
    #[must_use]
    pub fn in_fill(&self, point: &Point2, fill_rule: FillRule) -> bool {
        let winding = fill::winding_number(self, point);
        match fill_rule {
            FillRule::NonZero => winding != 0,
            FillRule::EvenOdd => winding % 2 != 0,
        }
    }

    /// Signed enclosed area, approximated by flattening curved segments.
    ///
    /// The sign depends on the orientation of the contours; overlapping
    /// contours of opposite orientation cancel.
    #[must_use]
    pub fn area(&self) -> f64 {
        const SAMPLES: usize = 32;

        let mut total = 0.0;
        for contour in &self.contours {
            let mut points: Vec<Point2> = Vec::new();
            for curve in contour.curves_for_fill() {
                match curve {
                    CurveSegment::Line(p) => points.push(p[0]),
                    _ => {
                        for i in 0..SAMPLES {
                            #[allow(clippy::cast_precision_loss)]
                            let t = i as f64 / SAMPLES as f64;
                            points.push(curve.point_at(t));
                        }
                    }
                }
            }
            total += polygon_area(&points);
        }
        total
    }
}

/// Shoelace formula over a closed polygon.
fn polygon_area(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}
