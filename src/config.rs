use crate::error::GraphError;
use crate::error::Result;
use crate::metric::DistanceKind;
use serde::Deserialize;
use serde::Serialize;
use std::str::FromStr;

/// Neighborhood rule used to connect vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GraphKind {
  /// Connect each point to its `k` closest others.
  #[default]
  Knn,
  /// Connect each point to every other point within a fixed distance.
  Radius,
}

impl FromStr for GraphKind {
  type Err = GraphError;

  fn from_str(s: &str) -> Result<Self> {
    match s {
      "knn" => Ok(GraphKind::Knn),
      "radius" => Ok(GraphKind::Radius),
      other => Err(GraphError::UnknownGraphKind(other.to_string())),
    }
  }
}

/// How an asymmetric raw weight matrix is forced into a symmetric one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SymmetrizeMode {
  /// Replace both directions of every edge with their mean: `(W + W^T) / 2`.
  #[default]
  Average,
  /// Keep the union of both directions, taking the larger weight for each.
  Full,
}

/// Configuration for nearest-neighbor graph construction.
///
/// Every field has an explicit default; `validate` is called once on entry to
/// the builder so the algorithm itself never re-checks parameter domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NnGraphConfig {
  /// Neighbor-search mode.
  ///
  /// Default: `GraphKind::Knn`
  pub kind: GraphKind,

  /// Number of neighbors per point in knn mode.
  ///
  /// Must be >= 1. If `k >= N - 1` the graph degrades to the complete graph.
  ///
  /// Default: 10
  pub k: usize,

  /// Connection radius in radius mode, measured in the (possibly centered and
  /// rescaled) search space.
  ///
  /// Must be positive and finite.
  ///
  /// Default: 0.01
  pub epsilon: f32,

  /// Kernel bandwidth. If `None`, the bandwidth is derived from the data:
  /// knn mode uses the mean of all returned distances (squared for the
  /// Euclidean kernel), radius mode uses half the effective radius (squared
  /// for the Euclidean kernel).
  ///
  /// Must be positive and finite when set.
  ///
  /// Default: None (derive from data)
  pub sigma: Option<f32>,

  /// Distance and kernel family. `Manhattan` selects L1 distance with the
  /// linear-exponential kernel.
  ///
  /// Default: `DistanceKind::Euclidean`
  pub metric: DistanceKind,

  /// Recenter the cloud on its per-dimension mean before searching.
  ///
  /// Default: false
  pub center: bool,

  /// Rescale the cloud into the unit ball before searching (divides all
  /// coordinates by half the bounding-box diagonal).
  ///
  /// Default: false
  pub rescale: bool,

  /// Compute the full pairwise distance matrix before selecting neighbors,
  /// instead of searching incrementally. Faster for small dense clouds,
  /// O(N^2) memory.
  ///
  /// Default: false
  pub use_full: bool,

  /// Accelerate the search with a ball tree. Results are exact and identical
  /// to the other strategies.
  ///
  /// Default: false
  pub use_tree: bool,

  /// Radius mode only: when > 0, ignore `epsilon` and derive the radius so
  /// that the average vertex degree lands near this value.
  ///
  /// Default: 0 (disabled)
  pub target_degree: usize,

  /// Symmetrization applied when the raw weight matrix is asymmetric.
  ///
  /// Default: `SymmetrizeMode::Average`
  pub symmetrize: SymmetrizeMode,

  /// Skip the expensive decoration (Laplacian, spectral-radius estimate,
  /// coordinate limits) and only fill degrees and the edge count.
  ///
  /// Default: false
  pub light: bool,
}

impl Default for NnGraphConfig {
  fn default() -> Self {
    Self {
      kind: GraphKind::Knn,
      k: 10,
      epsilon: 0.01,
      sigma: None,
      metric: DistanceKind::Euclidean,
      center: false,
      rescale: false,
      use_full: false,
      use_tree: false,
      target_degree: 0,
      symmetrize: SymmetrizeMode::Average,
      light: false,
    }
  }
}

impl NnGraphConfig {
  /// Check every parameter domain once, before construction starts.
  pub fn validate(&self) -> Result<()> {
    if self.k == 0 {
      return Err(GraphError::InvalidParameter(
        "k must be >= 1".to_string(),
      ));
    }
    if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
      return Err(GraphError::InvalidParameter(format!(
        "epsilon must be positive and finite, got {}",
        self.epsilon
      )));
    }
    if let Some(sigma) = self.sigma {
      if !(sigma > 0.0 && sigma.is_finite()) {
        return Err(GraphError::InvalidParameter(format!(
          "sigma must be positive and finite, got {sigma}"
        )));
      }
    }
    Ok(())
  }
}
