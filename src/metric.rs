use ndarray::ArrayView1;
use serde::Deserialize;
use serde::Serialize;

/// Distance used for neighbor search, together with the matching kernel.
///
/// The kernel maps an edge distance to a similarity weight in (0, 1]:
/// Euclidean pairs with a quadratic exponential, Manhattan with a linear one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DistanceKind {
  /// Euclidean (L2) distance, kernel `exp(-d^2 / sigma)`.
  #[default]
  Euclidean,
  /// Manhattan (L1) distance, kernel `exp(-d / sigma)`.
  Manhattan,
}

impl DistanceKind {
  /// Compute the distance between two points.
  #[inline]
  pub fn distance(self, a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    match self {
      DistanceKind::Euclidean => l2_distance(a, b),
      DistanceKind::Manhattan => l1_distance(a, b),
    }
  }

  /// Kernel weight for an edge at `dist` under bandwidth `sigma`.
  ///
  /// Callers must ensure `sigma > 0` whenever `dist > 0`.
  #[inline]
  pub fn kernel(self, dist: f32, sigma: f32) -> f32 {
    match self {
      DistanceKind::Euclidean => f32::exp(-dist * dist / sigma),
      DistanceKind::Manhattan => f32::exp(-dist / sigma),
    }
  }
}

/// Euclidean (L2) distance: sqrt(sum((a_i - b_i)^2)).
#[inline]
pub fn l2_distance(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
  // Iterator form auto-vectorizes well
  let sum_sq: f32 = a
    .iter()
    .zip(b.iter())
    .map(|(x, y)| {
      let diff = x - y;
      diff * diff
    })
    .sum();
  sum_sq.sqrt()
}

/// Manhattan (L1) distance: sum(|a_i - b_i|).
#[inline]
pub fn l1_distance(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
  a.iter().zip(b.iter()).map(|(x, y)| (x - y).abs()).sum()
}
