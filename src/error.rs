//! Error type for graph construction and classification.

use thiserror::Error;

/// Errors produced by graph construction and classification.
#[derive(Debug, Error)]
pub enum GraphError {
  /// A configuration parameter was outside its valid domain.
  #[error("invalid parameter: {0}")]
  InvalidParameter(String),

  /// The input point cloud had no rows.
  #[error("input point cloud is empty")]
  EmptyInput,

  /// The derived bandwidth resolved to zero while off-diagonal edges exist
  /// (coincident duplicate points).
  #[error("bandwidth resolved to zero with coincident points")]
  DegenerateBandwidth,

  /// The assembled weight matrix was not square.
  #[error("weight matrix is not square: {rows} rows, {cols} cols")]
  NotSquare {
    /// Number of rows in the assembled matrix.
    rows: usize,
    /// Number of columns in the assembled matrix.
    cols: usize,
  },

  /// A `GraphKind` string did not match a known variant.
  #[error("unknown graph kind: {0}")]
  UnknownGraphKind(String),

  /// An input to classification did not match the graph's vertex count.
  #[error("dimension mismatch: expected {expected}, found {found}")]
  DimensionMismatch {
    /// Expected size, derived from the graph.
    expected: usize,
    /// Actual size of the mismatched input.
    found: usize,
  },
}

/// Convenience alias for results produced by this crate.
pub type Result<T> = std::result::Result<T, GraphError>;
