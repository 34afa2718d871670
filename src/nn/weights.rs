use crate::config::GraphKind;
use crate::error::GraphError;
use crate::error::Result;
use crate::graph::SparseMat;
use crate::metric::DistanceKind;
use itertools::izip;
use sprs::TriMat;
use typed_builder::TypedBuilder;

/// Resolve the kernel bandwidth for a batch of neighbor pairs.
///
/// An explicitly configured bandwidth wins. Otherwise knn mode derives it
/// from the mean of all returned distances (self-matches included, squared
/// for the Euclidean kernel) and radius mode from half the effective radius
/// (squared for the Euclidean kernel).
///
/// A derived bandwidth of zero means every returned distance was zero. That
/// is harmless when no off-diagonal pair exists (a single point, or a pure
/// self-match set) but fatal otherwise: the cloud contains coincident
/// duplicate points and the kernel would divide by zero.
pub fn resolve_sigma(
  explicit: Option<f32>,
  kind: GraphKind,
  metric: DistanceKind,
  rows: &[usize],
  cols: &[usize],
  dists: &[f32],
  epsilon: f32,
) -> Result<f32> {
  if let Some(sigma) = explicit {
    return Ok(sigma);
  }

  let sigma = match kind {
    GraphKind::Knn => {
      let mean = if dists.is_empty() {
        0.0
      } else {
        dists.iter().sum::<f32>() / dists.len() as f32
      };
      match metric {
        DistanceKind::Euclidean => mean * mean,
        DistanceKind::Manhattan => mean,
      }
    }
    GraphKind::Radius => match metric {
      DistanceKind::Euclidean => epsilon * epsilon / 2.0,
      DistanceKind::Manhattan => epsilon / 2.0,
    },
  };

  if sigma <= 0.0 {
    let has_edges = rows.iter().zip(cols.iter()).any(|(r, c)| r != c);
    if has_edges {
      return Err(GraphError::DegenerateBandwidth);
    }
  }
  Ok(sigma)
}

/*
  Scatter kernel-transformed neighbor pairs into a sparse weight matrix.

  Every (row, col, dist) triple contributes exp(-dist^2 / sigma) (Euclidean)
  or exp(-dist / sigma) (Manhattan) at its slot; duplicate slots sum, which
  is the standard coordinate-list accumulation. Diagonal pairs are dropped
  here rather than zeroed afterwards, so self-loops never appear and the
  stored-entry count stays meaningful for density diagnostics.
*/
#[derive(TypedBuilder)]
pub struct AssembleWeights<'a> {
  n_vertices: usize,
  rows: &'a [usize],
  cols: &'a [usize],
  dists: &'a [f32],
  metric: DistanceKind,
  sigma: f32,
}

impl AssembleWeights<'_> {
  pub fn exec(self) -> SparseMat {
    let Self {
      n_vertices,
      rows,
      cols,
      dists,
      metric,
      sigma,
    } = self;

    let mut mat = TriMat::new((n_vertices, n_vertices));
    for (&r, &c, &d) in izip!(rows, cols, dists) {
      if r == c {
        continue;
      }
      mat.add_triplet(r, c, metric.kernel(d, sigma));
    }
    mat.to_csr::<usize>()
  }
}
