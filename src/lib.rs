//! Nearest-neighbor similarity graphs for graph signal processing.
//!
//! This library builds sparse, symmetric, kernel-weighted graphs from
//! point-cloud data and runs graph-based k-NN classification on top of them.
//!
//! # Example
//!
//! ```ignore
//! use nngraph::{nn_graph, NnGraphConfig};
//! use ndarray::Array2;
//!
//! let points: Array2<f32> = load_cloud();
//!
//! let mut config = NnGraphConfig::default();
//! config.k = 6;
//!
//! let graph = nn_graph(points.view(), config)?;
//! println!("{} vertices, {} edges", graph.n_vertices(), graph.n_edges());
//! ```
//!
//! # Features
//!
//! - **knn and radius neighborhoods**: connect each point to its k closest
//!   others, or to everything within a radius (optionally derived from a
//!   target degree)
//! - **Exact search strategies**: rayon-parallel per-point scan, full
//!   pairwise matrix, or ball-tree acceleration, all returning identical
//!   results
//! - **Kernel weights**: quadratic-exponential (Euclidean) or
//!   linear-exponential (Manhattan) similarity with a data-derived or
//!   explicit bandwidth
//! - **Symmetrization policies**: averaged or union/max edge reconciliation
//! - **Graph decoration**: degrees, edge count, combinatorial Laplacian and
//!   spectral-radius estimate
//!
//! # Limitations
//!
//! - Dense `f32` input points only
//! - Construction is synchronous and deterministic; no incremental updates
//! - Coincident duplicate points make a derived bandwidth degenerate and are
//!   rejected rather than clamped
//!
//! # Public API
//!
//! * [`NnGraphBuilder`] / [`nn_graph`] - graph construction
//! * [`NnGraphConfig`] - configuration parameters
//! * [`Graph`] - the built graph record
//! * [`classify_knn`] - semi-supervised classification over a graph
//! * [`DistanceKind`] - distance/kernel selection

// Public modules
pub mod classify;
pub mod config;
pub mod error;
pub mod graph;
pub mod metric;

// Internal modules (not exposed)
mod builder;
mod nn;

// Public re-exports (primary API)
pub use builder::nn_graph;
pub use builder::NnGraphBuilder;
pub use classify::classify_knn;
pub use config::GraphKind;
pub use config::NnGraphConfig;
pub use config::SymmetrizeMode;
pub use error::GraphError;
pub use error::Result;
pub use graph::Graph;
pub use graph::SparseMat;
pub use metric::DistanceKind;

// Tests
#[cfg(test)]
mod tests;
