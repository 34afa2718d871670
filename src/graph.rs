use crate::config::GraphKind;
use crate::metric::DistanceKind;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView2;
use serde::Deserialize;
use serde::Serialize;
use sprs::CsMat;

/// Sparse weight matrix storage shared across the crate.
pub type SparseMat = CsMat<f32>;

/// A weighted undirected similarity graph built from point-cloud data.
///
/// The weight matrix is square with a zero diagonal and is symmetric after
/// construction. Coordinates are the search-space copy of the input points,
/// so any centering or rescaling applied before the search is reflected here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Graph {
  /// Sparse affinity matrix; `weights[i, j]` is the kernel weight of the
  /// edge between vertices i and j.
  pub(crate) weights: SparseMat,

  /// Output coordinates, one row per vertex.
  pub(crate) coords: Array2<f32>,

  /// Number of vertices.
  pub(crate) n_vertices: usize,

  /// Neighborhood rule the graph was built with.
  pub(crate) kind: GraphKind,

  /// Distance/kernel family the weights were computed with.
  pub(crate) metric: DistanceKind,

  /// Kernel bandwidth actually used (explicit or derived). Zero only for
  /// graphs without any edge.
  pub(crate) sigma: f32,

  /// Weighted vertex degrees (row sums of the weight matrix).
  pub(crate) degrees: Array1<f32>,

  /// Number of undirected edges.
  pub(crate) n_edges: usize,

  /// Combinatorial Laplacian `D - W`. Filled by full decoration only.
  pub(crate) laplacian: Option<SparseMat>,

  /// Estimated largest Laplacian eigenvalue. Filled by full decoration only.
  pub(crate) lmax: Option<f32>,

  /// Per-dimension coordinate limits with a small margin, for plotting.
  /// Filled by full decoration only.
  pub(crate) coord_limits: Option<(Array1<f32>, Array1<f32>)>,
}

impl Graph {
  /// Number of vertices.
  pub fn n_vertices(&self) -> usize {
    self.n_vertices
  }

  /// The sparse weight matrix.
  pub fn weights(&self) -> &SparseMat {
    &self.weights
  }

  /// Output coordinates (one row per vertex).
  pub fn coords(&self) -> ArrayView2<'_, f32> {
    self.coords.view()
  }

  /// Neighborhood rule the graph was built with.
  pub fn kind(&self) -> GraphKind {
    self.kind
  }

  /// Distance/kernel family the weights were computed with.
  pub fn metric(&self) -> DistanceKind {
    self.metric
  }

  /// Kernel bandwidth actually used.
  pub fn sigma(&self) -> f32 {
    self.sigma
  }

  /// Weighted vertex degrees.
  pub fn degrees(&self) -> &Array1<f32> {
    &self.degrees
  }

  /// Number of undirected edges.
  pub fn n_edges(&self) -> usize {
    self.n_edges
  }

  /// Combinatorial Laplacian, if full decoration ran.
  pub fn laplacian(&self) -> Option<&SparseMat> {
    self.laplacian.as_ref()
  }

  /// Estimated largest Laplacian eigenvalue, if full decoration ran.
  pub fn lmax(&self) -> Option<f32> {
    self.lmax
  }

  /// Per-dimension coordinate limits, if full decoration ran.
  pub fn coord_limits(&self) -> Option<(&Array1<f32>, &Array1<f32>)> {
    self.coord_limits.as_ref().map(|(lo, hi)| (lo, hi))
  }

  /// Human-readable graph type tag.
  pub fn type_tag(&self) -> &'static str {
    match self.metric {
      DistanceKind::Euclidean => "nearest neighbors",
      DistanceKind::Manhattan => "nearest neighbors l1",
    }
  }
}
