//! Boolean operations on 2D vector paths.
//!
//! Paths are sequences of closed contours built from line, quadratic,
//! cubic, and conic segments. [`path_op`] computes the union,
//! intersection, difference, symmetric difference, or simplification of
//! one or two paths under a [`FillRule`], returning a new path whose
//! contours trace the boundary of the combined region.
//!
//! ```
//! use pathops::{path_op, FillRule, PathBuilder, PathOp};
//! use nalgebra::Point2;
//!
//! let mut a = PathBuilder::new();
//! a.add_rect(Point2::new(0.0, 0.0), Point2::new(10.0, 10.0));
//! let a = a.build();
//!
//! let mut b = PathBuilder::new();
//! b.add_rect(Point2::new(5.0, 5.0), Point2::new(15.0, 15.0));
//! let b = b.build();
//!
//! let union = path_op(PathOp::Union, FillRule::NonZero, &a, Some(&b));
//! assert_eq!(union.contours().len(), 1);
//! ```

pub mod error;
pub mod geometry;
pub mod math;
pub mod ops;
pub mod path;

pub use error::{PathOpsError, Result};
pub use ops::{path_op, PathOp};
pub use path::{FillRule, Path, PathBuilder};
