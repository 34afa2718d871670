use crate::graph::Graph;
use crate::graph::SparseMat;
use ndarray::Array1;
use ndarray::Axis;
use sprs::TriMat;
use tracing::debug;

/// Number of power-iteration rounds for the spectral-radius estimate.
const LMAX_ITERATIONS: usize = 50;

/// Fill the graph's derived fields.
///
/// Lightweight decoration computes the degree vector and the undirected edge
/// count. Full decoration additionally builds the combinatorial Laplacian
/// `D - W`, estimates its largest eigenvalue, and records per-dimension
/// coordinate limits for plotting.
pub fn decorate(graph: &mut Graph, light: bool) {
  let degrees: Vec<f32> = graph
    .weights
    .outer_iterator()
    .map(|row| row.data().iter().sum())
    .collect();
  graph.degrees = Array1::from(degrees);
  graph.n_edges = graph.weights.nnz() / 2;

  if light {
    debug!(n_edges = graph.n_edges, "lightweight decoration complete");
    return;
  }

  let laplacian = combinatorial_laplacian(&graph.weights, &graph.degrees);
  graph.lmax = Some(estimate_lmax(&laplacian));
  graph.laplacian = Some(laplacian);

  if graph.coords.ncols() > 0 {
    let lo = graph
      .coords
      .fold_axis(Axis(0), f32::INFINITY, |acc, &v| acc.min(v));
    let hi = graph
      .coords
      .fold_axis(Axis(0), f32::NEG_INFINITY, |acc, &v| acc.max(v));
    let margin = (&hi - &lo) * 0.01;
    graph.coord_limits = Some((&lo - &margin, &hi + &margin));
  }
  debug!(
    n_edges = graph.n_edges,
    lmax = graph.lmax,
    "full decoration complete"
  );
}

/// Combinatorial Laplacian `L = D - W`.
fn combinatorial_laplacian(weights: &SparseMat, degrees: &Array1<f32>) -> SparseMat {
  let mut tri = TriMat::new(weights.shape());
  for (i, &degree) in degrees.iter().enumerate() {
    if degree != 0.0 {
      tri.add_triplet(i, i, degree);
    }
  }
  for (&val, (row, col)) in weights.iter() {
    tri.add_triplet(row, col, -val);
  }
  tri.to_csr::<usize>()
}

/// Largest-eigenvalue estimate by power iteration, padded by 1% so the
/// estimate bounds the spectrum from above.
fn estimate_lmax(laplacian: &SparseMat) -> f32 {
  let n = laplacian.rows();
  // Non-constant start vector; the constant vector is the Laplacian nullspace
  let mut v = Array1::from_shape_fn(n, |i| (i as f32).cos() + 0.5);
  let norm = v.dot(&v).sqrt();
  if norm == 0.0 {
    return 0.0;
  }
  v /= norm;

  let mut lmax = 0.0f32;
  for _ in 0..LMAX_ITERATIONS {
    let w = spmv(laplacian, &v);
    let norm = w.dot(&w).sqrt();
    if norm <= f32::EPSILON {
      return 0.0;
    }
    lmax = v.dot(&w);
    v = w / norm;
  }
  lmax * 1.01
}

fn spmv(mat: &SparseMat, v: &Array1<f32>) -> Array1<f32> {
  let mut out = Array1::<f32>::zeros(v.len());
  for (i, row) in mat.outer_iterator().enumerate() {
    let mut acc = 0.0;
    for (j, &val) in row.iter() {
      acc += val * v[j];
    }
    out[i] = acc;
  }
  out
}
