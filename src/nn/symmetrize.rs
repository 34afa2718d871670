use crate::config::SymmetrizeMode;
use crate::graph::SparseMat;
use sprs::TriMat;

/// Exact symmetry test: identical sparsity pattern and identical stored
/// values, no floating tolerance.
pub fn is_symmetric(w: &SparseMat) -> bool {
  let transpose = w.transpose_view().to_csr();
  *w == transpose
}

/// Force a weight matrix symmetric.
///
/// `Average` replaces both directions of every edge with their mean, so
/// one-directional edges survive at half weight. `Full` keeps the union of
/// both directions and takes the larger weight for each pair, so every edge
/// found in either direction survives at full strength.
pub fn symmetrize(w: &SparseMat, mode: SymmetrizeMode) -> SparseMat {
  let mut tri = TriMat::new(w.shape());

  match mode {
    SymmetrizeMode::Average => {
      // (W + W^T) / 2 via duplicate-summing accumulation: each unordered
      // pair collects half of both directed weights in both slots
      for (&val, (row, col)) in w.iter() {
        tri.add_triplet(row, col, 0.5 * val);
        tri.add_triplet(col, row, 0.5 * val);
      }
    }
    SymmetrizeMode::Full => {
      // Elementwise max(W, W^T); each unordered pair is written exactly once
      for (&val, (row, col)) in w.iter() {
        let mirror = w.get(col, row).copied();
        match mirror {
          None => {
            tri.add_triplet(row, col, val);
            tri.add_triplet(col, row, val);
          }
          // The (col, row) entry handles the pair when row > col
          Some(other) if row < col => {
            let larger = val.max(other);
            tri.add_triplet(row, col, larger);
            tri.add_triplet(col, row, larger);
          }
          Some(_) => {}
        }
      }
    }
  }

  tri.to_csr::<usize>()
}
