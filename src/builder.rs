use crate::config::GraphKind;
use crate::config::NnGraphConfig;
use crate::error::GraphError;
use crate::error::Result;
use crate::graph::Graph;
use crate::nn::decorate::decorate;
use crate::nn::search::NeighborSearch;
use crate::nn::symmetrize::is_symmetric;
use crate::nn::symmetrize::symmetrize;
use crate::nn::weights::resolve_sigma;
use crate::nn::weights::AssembleWeights;
use ndarray::Array1;
use ndarray::ArrayView2;
use std::time::Instant;
use tracing::info;

/// Builds nearest-neighbor similarity graphs from point clouds.
///
/// Holds a validated-on-use configuration and can be reused across clouds.
///
/// # Example
///
/// ```ignore
/// use nngraph::{NnGraphBuilder, NnGraphConfig};
///
/// let mut config = NnGraphConfig::default();
/// config.k = 6;
///
/// let graph = NnGraphBuilder::new(config).build(points.view())?;
/// assert_eq!(graph.n_vertices(), points.nrows());
/// ```
pub struct NnGraphBuilder {
  config: NnGraphConfig,
}

impl NnGraphBuilder {
  pub fn new(config: NnGraphConfig) -> Self {
    Self { config }
  }

  /// Build the similarity graph for `points` (one row per point).
  ///
  /// The pipeline: neighbor search over the (optionally centered and
  /// rescaled) cloud with one extra neighbor to absorb the self-match,
  /// bandwidth resolution, kernel-weighted sparse scatter with a zero
  /// diagonal, symmetrization when the raw matrix is asymmetric, and
  /// decoration of the result.
  ///
  /// # Errors
  ///
  /// - [`GraphError::InvalidParameter`] for out-of-domain configuration.
  /// - [`GraphError::EmptyInput`] when `points` has no rows.
  /// - [`GraphError::DegenerateBandwidth`] when the derived bandwidth is
  ///   zero while edges exist (coincident duplicate points).
  /// - [`GraphError::NotSquare`] when the assembled matrix is not square.
  pub fn build(&self, points: ArrayView2<f32>) -> Result<Graph> {
    self.config.validate()?;

    let n = points.nrows();
    if n == 0 {
      return Err(GraphError::EmptyInput);
    }
    info!(
      n,
      kind = ?self.config.kind,
      metric = ?self.config.metric,
      "building nearest-neighbor graph"
    );

    // One extra neighbor so the self-match leaves k true neighbors
    let started = Instant::now();
    let found = NeighborSearch::builder()
      .points(points)
      .kind(self.config.kind)
      .metric(self.config.metric)
      .k(self.config.k.saturating_add(1))
      .epsilon(self.config.epsilon)
      .target_degree(self.config.target_degree)
      .center(self.config.center)
      .rescale(self.config.rescale)
      .use_full(self.config.use_full)
      .use_tree(self.config.use_tree)
      .build()
      .exec();
    info!(
      duration_ms = started.elapsed().as_millis(),
      pairs = found.dists.len(),
      "neighbor search complete"
    );

    let sigma = resolve_sigma(
      self.config.sigma,
      self.config.kind,
      self.config.metric,
      &found.rows,
      &found.cols,
      &found.dists,
      found.epsilon,
    )?;

    let started = Instant::now();
    let weights = AssembleWeights::builder()
      .n_vertices(n)
      .rows(&found.rows)
      .cols(&found.cols)
      .dists(&found.dists)
      .metric(self.config.metric)
      .sigma(sigma)
      .build()
      .exec();
    info!(
      duration_ms = started.elapsed().as_millis(),
      nnz = weights.nnz(),
      sigma,
      "weight matrix assembled"
    );

    if self.config.kind == GraphKind::Radius {
      info!(
        avg_degree = weights.nnz() as f32 / n as f32,
        epsilon = found.epsilon,
        "radius graph density"
      );
    }

    if weights.rows() != weights.cols() {
      return Err(GraphError::NotSquare {
        rows: weights.rows(),
        cols: weights.cols(),
      });
    }

    let weights = if is_symmetric(&weights) {
      weights
    } else {
      let started = Instant::now();
      let result = symmetrize(&weights, self.config.symmetrize);
      info!(
        duration_ms = started.elapsed().as_millis(),
        mode = ?self.config.symmetrize,
        "symmetrization complete"
      );
      result
    };

    let mut graph = Graph {
      weights,
      coords: found.points,
      n_vertices: n,
      kind: self.config.kind,
      metric: self.config.metric,
      sigma,
      degrees: Array1::zeros(n),
      n_edges: 0,
      laplacian: None,
      lmax: None,
      coord_limits: None,
    };
    decorate(&mut graph, self.config.light);
    Ok(graph)
  }
}

/// Convenience wrapper: build a graph with a one-off configuration.
pub fn nn_graph(points: ArrayView2<f32>, config: NnGraphConfig) -> Result<Graph> {
  NnGraphBuilder::new(config).build(points)
}
