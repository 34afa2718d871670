use crate::config::GraphKind;
use crate::metric::DistanceKind;
use crate::nn::tree::BallTree;
use ndarray::Array2;
use ndarray::ArrayView2;
use ndarray::Axis;
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::debug;
use typed_builder::TypedBuilder;

/// Neighbor pairs found by the search, as parallel triple sequences, plus the
/// transformed copy of the input points and the effective radius.
pub struct SearchResult {
  pub rows: Vec<usize>,
  pub cols: Vec<usize>,
  pub dists: Vec<f32>,
  /// Points after centering/rescaling; becomes the graph's coordinates.
  pub points: Array2<f32>,
  /// Radius actually applied in radius mode (equals the configured epsilon
  /// unless a target degree overrode it). Unchanged in knn mode.
  pub epsilon: f32,
}

/*
  Pairwise nearest-neighbor search of a point cloud against itself.

  knn mode returns, for every point, the `k` closest rows under the chosen
  metric. The request count includes the self-match: the pair (i, i, 0.0) is
  always emitted first for each point, so a caller wanting k true neighbors
  asks for k + 1. Requests larger than the cloud degrade to all points.

  radius mode returns every pair within the effective radius, self-matches
  included. When `target_degree` is positive the radius is derived from the
  data instead of taken from `epsilon`: the mean distance to each point's
  target_degree-th closest other point.

  All three strategies (per-point scan, full pairwise matrix, ball tree) are
  exact and produce the same pair set; ties are broken by index so the choice
  of strategy never changes the result.
*/
#[derive(TypedBuilder)]
pub struct NeighborSearch<'a> {
  points: ArrayView2<'a, f32>,
  kind: GraphKind,
  metric: DistanceKind,
  /// Neighbors requested per point, self-match included.
  #[builder(default = 11)]
  k: usize,
  #[builder(default = 0.01)]
  epsilon: f32,
  #[builder(default = 0)]
  target_degree: usize,
  #[builder(default = false)]
  center: bool,
  #[builder(default = false)]
  rescale: bool,
  #[builder(default = false)]
  use_full: bool,
  #[builder(default = false)]
  use_tree: bool,
}

impl NeighborSearch<'_> {
  pub fn exec(self) -> SearchResult {
    let Self {
      points,
      kind,
      metric,
      k,
      epsilon,
      target_degree,
      center,
      rescale,
      use_full,
      use_tree,
    } = self;

    let n = points.nrows();
    let mut out_points = points.to_owned();

    if center {
      if let Some(means) = out_points.mean_axis(Axis(0)) {
        out_points -= &means;
      }
    }
    if rescale {
      let lo = out_points.fold_axis(Axis(0), f32::INFINITY, |acc, &v| acc.min(v));
      let hi = out_points.fold_axis(Axis(0), f32::NEG_INFINITY, |acc, &v| acc.max(v));
      let diagonal: f32 = lo
        .iter()
        .zip(hi.iter())
        .map(|(a, b)| {
          let span = b - a;
          span * span
        })
        .sum::<f32>()
        .sqrt();
      if diagonal > 0.0 {
        out_points *= 2.0 / diagonal;
      }
    }

    let view = out_points.view();
    let full = if use_full {
      Some(pairwise_matrix(view, metric))
    } else {
      None
    };
    let tree = if use_tree && !use_full {
      Some(BallTree::build(view, metric))
    } else {
      None
    };
    debug!(
      n,
      strategy = match (&full, &tree) {
        (Some(_), _) => "full-matrix",
        (_, Some(_)) => "ball-tree",
        _ => "per-point",
      },
      "neighbor search"
    );

    let (pairs, effective_epsilon) = match kind {
      GraphKind::Knn => {
        let requested = k.min(n);
        let per_point: Vec<Vec<(usize, usize, f32)>> = (0..n)
          .into_par_iter()
          .map(|i| {
            let mut edges = Vec::with_capacity(requested);
            // Self-match first; a point is its own nearest neighbor
            edges.push((i, i, 0.0));
            let wanted = requested.saturating_sub(1);
            let neighbors = match (&full, &tree) {
              (Some(matrix), _) => {
                let row = matrix.row(i);
                let candidates = (0..n)
                  .filter(|&j| j != i)
                  .map(|j| (row[j], j))
                  .collect();
                select_smallest(candidates, wanted)
              }
              (_, Some(tree)) => tree
                .knn(view.row(i), wanted, Some(i))
                .into_iter()
                .map(|(j, d)| (d, j))
                .collect(),
              _ => {
                let candidates = (0..n)
                  .filter(|&j| j != i)
                  .map(|j| (metric.distance(view.row(i), view.row(j)), j))
                  .collect();
                select_smallest(candidates, wanted)
              }
            };
            for (d, j) in neighbors {
              edges.push((i, j, d));
            }
            edges
          })
          .collect();
        (per_point, epsilon)
      }
      GraphKind::Radius => {
        let eps = if target_degree > 0 {
          estimate_epsilon(view, metric, target_degree, full.as_ref()).unwrap_or(epsilon)
        } else {
          epsilon
        };
        let per_point: Vec<Vec<(usize, usize, f32)>> = (0..n)
          .into_par_iter()
          .map(|i| match (&full, &tree) {
            (Some(matrix), _) => {
              let row = matrix.row(i);
              (0..n)
                .filter(|&j| row[j] <= eps)
                .map(|j| (i, j, row[j]))
                .collect()
            }
            (_, Some(tree)) => tree
              .within(view.row(i), eps, None)
              .into_iter()
              .map(|(j, d)| (i, j, d))
              .collect(),
            _ => (0..n)
              .filter_map(|j| {
                let d = metric.distance(view.row(i), view.row(j));
                (d <= eps).then_some((i, j, d))
              })
              .collect(),
          })
          .collect();
        (per_point, eps)
      }
    };

    let total: usize = pairs.iter().map(Vec::len).sum();
    let mut rows = Vec::with_capacity(total);
    let mut cols = Vec::with_capacity(total);
    let mut dists = Vec::with_capacity(total);
    for (row, col, dist) in pairs.into_iter().flatten() {
      rows.push(row);
      cols.push(col);
      dists.push(dist);
    }

    SearchResult {
      rows,
      cols,
      dists,
      points: out_points,
      epsilon: effective_epsilon,
    }
  }
}

fn cmp_dist_index(a: &(f32, usize), b: &(f32, usize)) -> Ordering {
  a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1))
}

/// The `m` smallest candidates, ascending by (distance, index).
fn select_smallest(mut candidates: Vec<(f32, usize)>, m: usize) -> Vec<(f32, usize)> {
  if m == 0 {
    return Vec::new();
  }
  if candidates.len() > m {
    candidates.select_nth_unstable_by(m - 1, cmp_dist_index);
    candidates.truncate(m);
  }
  candidates.sort_unstable_by(cmp_dist_index);
  candidates
}

/// Full pairwise distance matrix, one rayon task per row.
fn pairwise_matrix(points: ArrayView2<f32>, metric: DistanceKind) -> Array2<f32> {
  let n = points.nrows();
  let data: Vec<f32> = (0..n)
    .into_par_iter()
    .flat_map_iter(|i| {
      (0..n)
        .map(|j| metric.distance(points.row(i), points.row(j)))
        .collect::<Vec<_>>()
    })
    .collect();
  Array2::from_shape_vec((n, n), data).expect("pairwise matrix is n*n by construction")
}

/// Radius giving roughly `target_degree` neighbors per point: the mean
/// distance to every point's target_degree-th closest other point.
/// `None` when the cloud has a single point.
fn estimate_epsilon(
  points: ArrayView2<f32>,
  metric: DistanceKind,
  target_degree: usize,
  full: Option<&Array2<f32>>,
) -> Option<f32> {
  let n = points.nrows();
  if n < 2 {
    return None;
  }
  let rank = target_degree.min(n - 1);
  let sum: f32 = (0..n)
    .into_par_iter()
    .map(|i| {
      let candidates: Vec<(f32, usize)> = match full {
        Some(matrix) => {
          let row = matrix.row(i);
          (0..n).filter(|&j| j != i).map(|j| (row[j], j)).collect()
        }
        None => (0..n)
          .filter(|&j| j != i)
          .map(|j| (metric.distance(points.row(i), points.row(j)), j))
          .collect(),
      };
      let picked = select_smallest(candidates, rank);
      picked.last().map(|&(d, _)| d).unwrap_or(0.0)
    })
    .sum();
  Some(sum / n as f32)
}
