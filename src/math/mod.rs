/// 2D point type.
pub type Point2 = nalgebra::Point2<f64>;

/// 2D vector type.
pub type Vector2 = nalgebra::Vector2<f64>;

/// Distance below which two points are considered coincident.
pub const TOLERANCE: f64 = 0.01;

/// Snap tolerance for curve parameters: an intersection parameter closer
/// than this to 0 or 1 is treated as hitting the segment endpoint.
pub const NEAR_PARAM: f64 = 0.005;

/// Returns whether two points lie within `epsilon` of each other.
#[must_use]
pub fn points_near(a: &Point2, b: &Point2, epsilon: f64) -> bool {
    nalgebra::distance(a, b) < epsilon
}

/// Returns whether a curve parameter is within [`NEAR_PARAM`] of a target.
#[must_use]
pub fn param_near(t: f64, target: f64) -> bool {
    (t - target).abs() < NEAR_PARAM
}
