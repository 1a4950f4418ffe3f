use crate::error::Result;
use crate::geometry::CurveSegment;
use crate::math::Point2;

use super::{Contour, Path, PathVerb};

/// Incrementally assembles a [`Path`] from drawing commands.
///
/// A drawing command issued without a current point implicitly starts a
/// new contour at its first point. `close` ends the current contour;
/// further commands start a fresh one.
#[derive(Debug, Default)]
pub struct PathBuilder {
    contours: Vec<Contour>,
    verbs: Vec<PathVerb>,
    current_point: Option<Point2>,
}

impl PathBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new contour at `p`.
    pub fn move_to(&mut self, p: Point2) {
        self.flush_contour();
        self.verbs.push(PathVerb::Move(p));
        self.current_point = Some(p);
    }

    /// Adds a straight line to `p`.
    pub fn line_to(&mut self, p: Point2) {
        self.ensure_current(p);
        self.verbs.push(PathVerb::Line(p));
        self.current_point = Some(p);
    }

    /// Adds a quadratic Bézier through control point `ctrl` to `end`.
    pub fn quad_to(&mut self, ctrl: Point2, end: Point2) {
        self.ensure_current(ctrl);
        self.verbs.push(PathVerb::Quad(ctrl, end));
        self.current_point = Some(end);
    }

    /// Adds a cubic Bézier through `ctrl1` and `ctrl2` to `end`.
    pub fn cubic_to(&mut self, ctrl1: Point2, ctrl2: Point2, end: Point2) {
        self.ensure_current(ctrl1);
        self.verbs.push(PathVerb::Cubic(ctrl1, ctrl2, end));
        self.current_point = Some(end);
    }

    /// Adds a conic segment through `ctrl` to `end` with the given weight.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::InvalidConicWeight`] when `weight` is not
    /// finite and positive.
    ///
    /// [`GeometryError::InvalidConicWeight`]: crate::error::GeometryError::InvalidConicWeight
    pub fn conic_to(&mut self, ctrl: Point2, end: Point2, weight: f64) -> Result<()> {
        let start = self.current_or_start(ctrl);
        // Validation only; the verb stores the raw points.
        CurveSegment::conic(start, ctrl, end, weight)?;
        self.verbs.push(PathVerb::Conic { ctrl, end, weight });
        self.current_point = Some(end);
        Ok(())
    }

    /// Closes the current contour.
    ///
    /// Does nothing when no contour is in progress.
    pub fn close(&mut self) {
        if self.current_point.is_none() {
            return;
        }
        self.verbs.push(PathVerb::Close);
        self.flush_contour();
    }

    /// Appends a curve segment whose start point must equal the current
    /// point.
    ///
    /// The caller guarantees the segment carries a valid weight when it is
    /// a conic.
    pub(crate) fn segment_to(&mut self, segment: &CurveSegment) {
        match *segment {
            CurveSegment::Line(p) => self.line_to(p[1]),
            CurveSegment::Quad(p) => self.quad_to(p[1], p[2]),
            CurveSegment::Cubic(p) => self.cubic_to(p[1], p[2], p[3]),
            CurveSegment::Conic { points, weight } => {
                self.ensure_current(points[0]);
                self.verbs.push(PathVerb::Conic {
                    ctrl: points[1],
                    end: points[2],
                    weight,
                });
                self.current_point = Some(points[2]);
            }
        }
    }

    /// Adds an axis-aligned rectangle as a closed contour, wound from `a`
    /// towards `(b.x, a.y)` first.
    pub fn add_rect(&mut self, a: Point2, b: Point2) {
        self.move_to(a);
        self.line_to(Point2::new(b.x, a.y));
        self.line_to(b);
        self.line_to(Point2::new(a.x, b.y));
        self.close();
    }

    /// Adds a circle as a closed contour of four conic quarter-arcs.
    pub fn add_circle(&mut self, center: Point2, radius: f64) {
        let w = std::f64::consts::FRAC_1_SQRT_2;
        let (cx, cy) = (center.x, center.y);
        let r = radius;

        self.move_to(Point2::new(cx + r, cy));
        for quarter in [
            (Point2::new(cx + r, cy + r), Point2::new(cx, cy + r)),
            (Point2::new(cx - r, cy + r), Point2::new(cx - r, cy)),
            (Point2::new(cx - r, cy - r), Point2::new(cx, cy - r)),
            (Point2::new(cx + r, cy - r), Point2::new(cx + r, cy)),
        ] {
            self.verbs.push(PathVerb::Conic {
                ctrl: quarter.0,
                end: quarter.1,
                weight: w,
            });
            self.current_point = Some(quarter.1);
        }
        self.close();
    }

    /// Finishes building and returns the path.
    #[must_use]
    pub fn build(mut self) -> Path {
        self.flush_contour();
        Path::new(self.contours)
    }

    fn flush_contour(&mut self) {
        if !self.verbs.is_empty() {
            self.contours.push(Contour::new(std::mem::take(&mut self.verbs)));
        }
        self.current_point = None;
    }

    fn ensure_current(&mut self, fallback: Point2) {
        if self.current_point.is_none() {
            self.move_to(fallback);
        }
    }

    fn current_or_start(&mut self, fallback: Point2) -> Point2 {
        self.ensure_current(fallback);
        match self.current_point {
            Some(p) => p,
            None => fallback,
        }
    }
}
