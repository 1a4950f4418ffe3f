mod bounds;
mod curve;
mod intersect;

pub use bounds::BoundingBox;
pub use curve::CurveSegment;
pub use intersect::{curve_intersect, Intersection, MAX_INTERSECTIONS};
