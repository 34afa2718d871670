use crate::error::GraphError;
use crate::error::Result;
use crate::graph::Graph;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;
use ndarray::ArrayView2;
use tracing::info;

/// One-hot indicator matrix for a label vector.
///
/// Columns span the observed label range; the returned offset is the
/// smallest label, so column `c` stands for label `offset + c`.
pub fn classification_matrix(labels: ArrayView1<u32>) -> (Array2<f32>, u32) {
  let offset = labels.iter().copied().min().unwrap_or(0);
  let n_classes = labels
    .iter()
    .copied()
    .max()
    .map(|max| (max - offset) as usize + 1)
    .unwrap_or(0);

  let mut matrix = Array2::<f32>::zeros((labels.len(), n_classes));
  for (i, &label) in labels.iter().enumerate() {
    matrix[(i, (label - offset) as usize)] = 1.0;
  }
  (matrix, offset)
}

/// Propagate known rows of `b` to unknown vertices over the graph.
///
/// `mask[i]` marks vertex i as observed. Observed rows pass through
/// unchanged; every other row becomes the weight-normalized average of its
/// observed neighbors' rows. A vertex with no observed neighbor keeps a zero
/// row.
pub fn regression_knn(graph: &Graph, mask: &[bool], b: ArrayView2<f32>) -> Result<Array2<f32>> {
  let n = graph.n_vertices();
  if mask.len() != n {
    return Err(GraphError::DimensionMismatch {
      expected: n,
      found: mask.len(),
    });
  }
  if b.nrows() != n {
    return Err(GraphError::DimensionMismatch {
      expected: n,
      found: b.nrows(),
    });
  }

  let mut solution = Array2::<f32>::zeros(b.raw_dim());
  for (i, row) in graph.weights().outer_iterator().enumerate() {
    if mask[i] {
      solution.row_mut(i).assign(&b.row(i));
      continue;
    }
    let mut weight_sum = 0.0f32;
    for (j, &w) in row.iter() {
      if !mask[j] {
        continue;
      }
      weight_sum += w;
      let source = b.row(j);
      let mut target = solution.row_mut(i);
      target += &source.mapv(|v| v * w);
    }
    if weight_sum > 0.0 {
      let mut target = solution.row_mut(i);
      target /= weight_sum;
    }
  }
  Ok(solution)
}

/// Decode a score matrix into hard labels: per-row argmax plus the offset.
pub fn matrix2label(solution: ArrayView2<f32>, offset: u32) -> Array1<u32> {
  let labels: Vec<u32> = solution
    .outer_iter()
    .map(|row| {
      let mut best = 0usize;
      let mut best_score = f32::NEG_INFINITY;
      for (c, &score) in row.iter().enumerate() {
        if score > best_score {
          best_score = score;
          best = c;
        }
      }
      offset + best as u32
    })
    .collect();
  Array1::from(labels)
}

/// Semi-supervised k-NN classification over a similarity graph.
///
/// Three steps: one-hot encode the labels, propagate the indicator columns to
/// unlabeled vertices with [`regression_knn`], and decode per-vertex scores
/// back into labels. `labels[i]` is only read where `mask[i]` is true, but
/// the vector must cover every vertex.
pub fn classify_knn(graph: &Graph, mask: &[bool], labels: ArrayView1<u32>) -> Result<Array1<u32>> {
  let n = graph.n_vertices();
  if labels.len() != n {
    return Err(GraphError::DimensionMismatch {
      expected: n,
      found: labels.len(),
    });
  }

  let (matrix, offset) = classification_matrix(labels);
  let solution = regression_knn(graph, mask, matrix.view())?;
  let decoded = matrix2label(solution.view(), offset);
  info!(
    n,
    observed = mask.iter().filter(|&&m| m).count(),
    "knn classification complete"
  );
  Ok(decoded)
}
