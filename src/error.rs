use thiserror::Error;

/// Top-level error type for the pathops crate.
///
/// Boolean operations themselves never fail — [`crate::ops::path_op`]
/// always returns a best-effort path. Errors only arise when constructing
/// geometry from invalid data.
#[derive(Debug, Error)]
pub enum PathOpsError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Errors related to geometric construction.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("conic weight {0} is not positive and finite")]
    InvalidConicWeight(f64),
}

/// Convenience type alias for results using [`PathOpsError`].
pub type Result<T> = std::result::Result<T, PathOpsError>;
