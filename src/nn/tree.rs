use crate::metric::DistanceKind;
use ndarray::Array1;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Leaf capacity. Small enough to keep pruning effective, large enough to
/// amortize the per-node bookkeeping.
const MAX_LEAF_SIZE: usize = 16;

/// Exact ball-tree index over the rows of a point matrix.
///
/// Each node covers a ball (center + radius) containing its points, computed
/// with the same metric that queries use, so the triangle-inequality pruning
/// bound `dist(q, center) - radius` is valid for both the Euclidean and the
/// Manhattan metric.
pub struct BallTree<'a> {
  points: ArrayView2<'a, f32>,
  metric: DistanceKind,
  root: Node,
}

enum Node {
  Internal {
    center: Array1<f32>,
    radius: f32,
    left: Box<Node>,
    right: Box<Node>,
  },
  Leaf {
    center: Array1<f32>,
    radius: f32,
    indices: Vec<usize>,
  },
}

impl Node {
  fn center(&self) -> ArrayView1<'_, f32> {
    match self {
      Node::Internal { center, .. } => center.view(),
      Node::Leaf { center, .. } => center.view(),
    }
  }

  fn radius(&self) -> f32 {
    match self {
      Node::Internal { radius, .. } => *radius,
      Node::Leaf { radius, .. } => *radius,
    }
  }
}

/// Candidate ordered by distance, then index, so heap decisions are
/// deterministic for a fixed input.
struct Candidate {
  dist: f32,
  index: usize,
}

impl PartialEq for Candidate {
  fn eq(&self, other: &Self) -> bool {
    self.cmp(other) == Ordering::Equal
  }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Ord for Candidate {
  fn cmp(&self, other: &Self) -> Ordering {
    self
      .dist
      .total_cmp(&other.dist)
      .then_with(|| self.index.cmp(&other.index))
  }
}

impl<'a> BallTree<'a> {
  /// Build the tree over all rows of `points`.
  pub fn build(points: ArrayView2<'a, f32>, metric: DistanceKind) -> Self {
    let indices: Vec<usize> = (0..points.nrows()).collect();
    let root = build_node(points, metric, indices);
    Self {
      points,
      metric,
      root,
    }
  }

  /// The `k` nearest rows to `query`, ascending by distance.
  ///
  /// `exclude` removes one row index from consideration (the query point
  /// itself when searching a cloud against itself).
  pub fn knn(&self, query: ArrayView1<f32>, k: usize, exclude: Option<usize>) -> Vec<(usize, f32)> {
    if k == 0 {
      return Vec::new();
    }
    let mut heap: BinaryHeap<Candidate> = BinaryHeap::with_capacity(k + 1);
    self.knn_node(&self.root, query, k, exclude, &mut heap);
    let mut out: Vec<(usize, f32)> = heap
      .into_sorted_vec()
      .into_iter()
      .map(|c| (c.index, c.dist))
      .collect();
    out.truncate(k);
    out
  }

  fn knn_node(
    &self,
    node: &Node,
    query: ArrayView1<f32>,
    k: usize,
    exclude: Option<usize>,
    heap: &mut BinaryHeap<Candidate>,
  ) {
    let center_dist = self.metric.distance(query, node.center());
    let bound = if heap.len() < k {
      f32::INFINITY
    } else {
      heap.peek().map(|c| c.dist).unwrap_or(f32::INFINITY)
    };
    if center_dist - node.radius() > bound {
      return;
    }

    match node {
      Node::Leaf { indices, .. } => {
        for &i in indices {
          if exclude == Some(i) {
            continue;
          }
          let dist = self.metric.distance(query, self.points.row(i));
          let candidate = Candidate { dist, index: i };
          if heap.len() < k {
            heap.push(candidate);
          } else if let Some(worst) = heap.peek() {
            if candidate.cmp(worst) == Ordering::Less {
              heap.pop();
              heap.push(candidate);
            }
          }
        }
      }
      Node::Internal { left, right, .. } => {
        // Nearer child first so the bound tightens before the far child
        let left_dist = self.metric.distance(query, left.center());
        let right_dist = self.metric.distance(query, right.center());
        if left_dist <= right_dist {
          self.knn_node(left, query, k, exclude, heap);
          self.knn_node(right, query, k, exclude, heap);
        } else {
          self.knn_node(right, query, k, exclude, heap);
          self.knn_node(left, query, k, exclude, heap);
        }
      }
    }
  }

  /// All rows within `radius` of `query` (inclusive), in tree order.
  pub fn within(
    &self,
    query: ArrayView1<f32>,
    radius: f32,
    exclude: Option<usize>,
  ) -> Vec<(usize, f32)> {
    let mut out = Vec::new();
    self.within_node(&self.root, query, radius, exclude, &mut out);
    out
  }

  fn within_node(
    &self,
    node: &Node,
    query: ArrayView1<f32>,
    radius: f32,
    exclude: Option<usize>,
    out: &mut Vec<(usize, f32)>,
  ) {
    let center_dist = self.metric.distance(query, node.center());
    if center_dist - node.radius() > radius {
      return;
    }

    match node {
      Node::Leaf { indices, .. } => {
        for &i in indices {
          if exclude == Some(i) {
            continue;
          }
          let dist = self.metric.distance(query, self.points.row(i));
          if dist <= radius {
            out.push((i, dist));
          }
        }
      }
      Node::Internal { left, right, .. } => {
        self.within_node(left, query, radius, exclude, out);
        self.within_node(right, query, radius, exclude, out);
      }
    }
  }
}

fn build_node(points: ArrayView2<f32>, metric: DistanceKind, indices: Vec<usize>) -> Node {
  let center = centroid(points, &indices);
  let radius = indices
    .iter()
    .map(|&i| metric.distance(points.row(i), center.view()))
    .fold(0.0f32, f32::max);

  if indices.len() <= MAX_LEAF_SIZE {
    return Node::Leaf {
      center,
      radius,
      indices,
    };
  }

  // Split seeds: the point farthest from the center, then the point farthest
  // from that one
  let seed1 = farthest_from(points, metric, &indices, center.view());
  let seed2 = farthest_from(points, metric, &indices, points.row(seed1));

  let mut left_indices = Vec::new();
  let mut right_indices = Vec::new();
  for &i in &indices {
    let d1 = metric.distance(points.row(i), points.row(seed1));
    let d2 = metric.distance(points.row(i), points.row(seed2));
    if d1 <= d2 {
      left_indices.push(i);
    } else {
      right_indices.push(i);
    }
  }

  // Coincident points can defeat the split; stop there
  if left_indices.is_empty() || right_indices.is_empty() {
    return Node::Leaf {
      center,
      radius,
      indices,
    };
  }

  Node::Internal {
    center,
    radius,
    left: Box::new(build_node(points, metric, left_indices)),
    right: Box::new(build_node(points, metric, right_indices)),
  }
}

fn centroid(points: ArrayView2<f32>, indices: &[usize]) -> Array1<f32> {
  let dim = points.ncols();
  let mut center = Array1::<f32>::zeros(dim);
  if indices.is_empty() {
    return center;
  }
  for &i in indices {
    center += &points.row(i);
  }
  center /= indices.len() as f32;
  center
}

fn farthest_from(
  points: ArrayView2<f32>,
  metric: DistanceKind,
  indices: &[usize],
  target: ArrayView1<f32>,
) -> usize {
  let mut best = indices[0];
  let mut best_dist = f32::NEG_INFINITY;
  for &i in indices {
    let d = metric.distance(points.row(i), target);
    if d > best_dist {
      best_dist = d;
      best = i;
    }
  }
  best
}
