#[cfg(test)]
mod tests {
  use crate::classify::classification_matrix;
  use crate::classify::classify_knn;
  use crate::classify::matrix2label;
  use crate::classify::regression_knn;
  use crate::config::GraphKind;
  use crate::config::NnGraphConfig;
  use crate::config::SymmetrizeMode;
  use crate::error::GraphError;
  use crate::graph::Graph;
  use crate::metric::DistanceKind;
  use crate::nn::symmetrize::is_symmetric;
  use crate::nn::symmetrize::symmetrize;
  use crate::nn_graph;
  use crate::NnGraphBuilder;
  use ndarray::Array1;
  use ndarray::Array2;
  use rand::rngs::StdRng;
  use rand::Rng;
  use rand::SeedableRng;
  use sprs::TriMat;

  /// The four corners of the unit square.
  fn unit_square() -> Array2<f32> {
    Array2::from_shape_vec((4, 2), vec![0.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0, 1.0]).unwrap()
  }

  fn random_cloud(n: usize, dim: usize, seed: u64) -> Array2<f32> {
    let mut rng = StdRng::seed_from_u64(seed);
    Array2::from_shape_fn((n, dim), |_| rng.random::<f32>())
  }

  fn close(a: f32, b: f32, tol: f32) -> bool {
    (a - b).abs() <= tol
  }

  fn pattern(graph: &Graph) -> Vec<(usize, usize)> {
    graph.weights().iter().map(|(_, (r, c))| (r, c)).collect()
  }

  #[test]
  fn knn_square_derives_bandwidth_from_returned_distances() {
    let mut config = NnGraphConfig::default();
    config.k = 1;

    let graph = nn_graph(unit_square().view(), config).unwrap();

    assert_eq!(graph.n_vertices(), 4);
    assert_eq!(graph.weights().rows(), 4);
    assert_eq!(graph.weights().cols(), 4);
    // Eight returned distances: four self zeros and four unit edges, so the
    // mean is 0.5 and the squared-mean bandwidth is 0.25
    assert!(close(graph.sigma(), 0.25, 1e-6));

    let expected = f32::exp(-4.0);
    for (&w, (row, col)) in graph.weights().iter() {
      assert_ne!(row, col, "diagonal must stay empty");
      assert!(
        close(w, expected, 1e-6) || close(w, expected / 2.0, 1e-6),
        "unexpected weight {w}"
      );
    }
    for row in graph.weights().outer_iterator() {
      assert!(row.nnz() >= 1 && row.nnz() <= 2);
    }
    assert!(is_symmetric(graph.weights()));
    assert_eq!(graph.type_tag(), "nearest neighbors");
  }

  #[test]
  fn knn_square_full_symmetrization_keeps_larger_weight() {
    let mut config = NnGraphConfig::default();
    config.k = 1;
    config.symmetrize = SymmetrizeMode::Full;

    let graph = nn_graph(unit_square().view(), config).unwrap();

    let expected = f32::exp(-4.0);
    for (&w, (_, _)) in graph.weights().iter() {
      assert!(close(w, expected, 1e-6));
    }
    assert!(is_symmetric(graph.weights()));
  }

  #[test]
  fn radius_square_connects_all_pairs() {
    let mut config = NnGraphConfig::default();
    config.kind = GraphKind::Radius;
    config.epsilon = 2.0;

    let graph = nn_graph(unit_square().view(), config).unwrap();

    // Every ordered off-diagonal pair, so the average degree is 3
    assert_eq!(graph.weights().nnz(), 12);
    assert!(close(graph.sigma(), 2.0, 1e-6));
    assert!(close(
      *graph.weights().get(0, 1).unwrap(),
      f32::exp(-0.5),
      1e-6
    ));
    assert!(close(
      *graph.weights().get(0, 3).unwrap(),
      f32::exp(-1.0),
      1e-6
    ));
    for (&w, _) in graph.weights().iter() {
      assert!(w > 0.0 && w <= 1.0);
    }
  }

  #[test]
  fn single_point_graph_is_empty() {
    let points = Array2::from_shape_vec((1, 2), vec![0.5, 0.5]).unwrap();

    let graph = nn_graph(points.view(), NnGraphConfig::default()).unwrap();

    assert_eq!(graph.n_vertices(), 1);
    assert_eq!(graph.weights().rows(), 1);
    assert_eq!(graph.weights().cols(), 1);
    assert_eq!(graph.weights().nnz(), 0);
    assert_eq!(graph.sigma(), 0.0);
    assert_eq!(graph.degrees()[0], 0.0);
  }

  #[test]
  fn knn_request_larger_than_cloud_degrades_to_complete_graph() {
    let mut config = NnGraphConfig::default();
    config.k = 10;

    let graph = nn_graph(unit_square().view(), config).unwrap();

    assert_eq!(graph.weights().nnz(), 12);
    for row in graph.weights().outer_iterator() {
      assert_eq!(row.nnz(), 3);
    }
    assert!(is_symmetric(graph.weights()));
  }

  #[test]
  fn radius_outlier_becomes_isolated_vertex() {
    let points = Array2::from_shape_vec(
      (4, 2),
      vec![0.0, 0.0, 0.1, 0.0, 0.0, 0.1, 10.0, 10.0],
    )
    .unwrap();
    let mut config = NnGraphConfig::default();
    config.kind = GraphKind::Radius;
    config.epsilon = 0.5;

    let graph = nn_graph(points.view(), config).unwrap();

    assert_eq!(graph.degrees()[3], 0.0);
    assert!(graph.degrees()[0] > 0.0);
  }

  #[test]
  fn knn_rows_have_at_least_k_neighbors() {
    let points = random_cloud(40, 3, 1);
    let mut config = NnGraphConfig::default();
    config.k = 5;

    let graph = nn_graph(points.view(), config).unwrap();

    for row in graph.weights().outer_iterator() {
      assert!(row.nnz() >= 5);
    }
    assert!(is_symmetric(graph.weights()));
  }

  #[test]
  fn radius_edges_stay_within_epsilon() {
    let points = random_cloud(30, 3, 2);
    let mut config = NnGraphConfig::default();
    config.kind = GraphKind::Radius;
    config.epsilon = 0.4;

    let graph = nn_graph(points.view(), config).unwrap();

    let sigma = graph.sigma();
    for (&w, (row, col)) in graph.weights().iter() {
      assert_ne!(row, col);
      assert!(w > 0.0 && w <= 1.0);
      let dist = (-sigma * w.ln()).sqrt();
      assert!(dist <= 0.4 * 1.0001, "edge at distance {dist} exceeds radius");
    }
  }

  #[test]
  fn construction_is_deterministic() {
    let points = random_cloud(50, 4, 3);
    let mut config = NnGraphConfig::default();
    config.k = 6;

    let builder = NnGraphBuilder::new(config);
    let first = builder.build(points.view()).unwrap();
    let second = builder.build(points.view()).unwrap();

    assert_eq!(first.weights(), second.weights());
    assert_eq!(first.coords(), second.coords());
    assert_eq!(first.sigma(), second.sigma());
  }

  #[test]
  fn search_strategies_agree() {
    let points = random_cloud(50, 4, 4);

    let mut base = NnGraphConfig::default();
    base.k = 6;
    let mut full = base.clone();
    full.use_full = true;
    let mut tree = base.clone();
    tree.use_tree = true;

    let a = nn_graph(points.view(), base).unwrap();
    let b = nn_graph(points.view(), full).unwrap();
    let c = nn_graph(points.view(), tree).unwrap();

    assert_eq!(a.weights(), b.weights());
    assert_eq!(a.weights(), c.weights());

    let mut base = NnGraphConfig::default();
    base.kind = GraphKind::Radius;
    base.epsilon = 0.5;
    let mut full = base.clone();
    full.use_full = true;
    let mut tree = base.clone();
    tree.use_tree = true;

    let a = nn_graph(points.view(), base).unwrap();
    let b = nn_graph(points.view(), full).unwrap();
    let c = nn_graph(points.view(), tree).unwrap();

    assert_eq!(a.weights(), b.weights());
    assert_eq!(a.weights(), c.weights());
  }

  #[test]
  fn manhattan_metric_switches_kernel_and_tag() {
    let mut config = NnGraphConfig::default();
    config.k = 1;
    config.metric = DistanceKind::Manhattan;

    let graph = nn_graph(unit_square().view(), config).unwrap();

    // Linear mean instead of squared mean
    assert!(close(graph.sigma(), 0.5, 1e-6));
    let expected = f32::exp(-2.0);
    for (&w, _) in graph.weights().iter() {
      assert!(close(w, expected, 1e-6) || close(w, expected / 2.0, 1e-6));
    }
    assert_eq!(graph.type_tag(), "nearest neighbors l1");

    let mut euclidean = NnGraphConfig::default();
    euclidean.k = 1;
    let reference = nn_graph(unit_square().view(), euclidean).unwrap();
    let manhattan_max = graph.weights().data().iter().cloned().fold(0.0, f32::max);
    let euclidean_max = reference
      .weights()
      .data()
      .iter()
      .cloned()
      .fold(0.0, f32::max);
    assert!(!close(manhattan_max, euclidean_max, 1e-6));
  }

  #[test]
  fn explicit_sigma_overrides_derivation() {
    let mut config = NnGraphConfig::default();
    config.k = 1;
    config.sigma = Some(2.0);

    let graph = nn_graph(unit_square().view(), config).unwrap();

    assert_eq!(graph.sigma(), 2.0);
    let expected = f32::exp(-0.5);
    for (&w, _) in graph.weights().iter() {
      assert!(close(w, expected, 1e-6) || close(w, expected / 2.0, 1e-6));
    }
  }

  #[test]
  fn coincident_points_reject_degenerate_bandwidth() {
    let points = Array2::from_shape_vec((3, 2), vec![0.5; 6]).unwrap();
    let mut config = NnGraphConfig::default();
    config.k = 1;

    let result = nn_graph(points.view(), config);

    assert!(matches!(result, Err(GraphError::DegenerateBandwidth)));
  }

  #[test]
  fn config_validation_rejects_bad_parameters() {
    let points = unit_square();

    let mut config = NnGraphConfig::default();
    config.k = 0;
    assert!(matches!(
      nn_graph(points.view(), config),
      Err(GraphError::InvalidParameter(_))
    ));

    let mut config = NnGraphConfig::default();
    config.epsilon = -1.0;
    assert!(matches!(
      nn_graph(points.view(), config),
      Err(GraphError::InvalidParameter(_))
    ));

    let mut config = NnGraphConfig::default();
    config.sigma = Some(0.0);
    assert!(matches!(
      nn_graph(points.view(), config),
      Err(GraphError::InvalidParameter(_))
    ));

    let empty = Array2::<f32>::zeros((0, 3));
    assert!(matches!(
      nn_graph(empty.view(), NnGraphConfig::default()),
      Err(GraphError::EmptyInput)
    ));
  }

  #[test]
  fn graph_kind_parses_known_names_only() {
    assert_eq!("knn".parse::<GraphKind>().unwrap(), GraphKind::Knn);
    assert_eq!("radius".parse::<GraphKind>().unwrap(), GraphKind::Radius);
    assert!(matches!(
      "butterfly".parse::<GraphKind>(),
      Err(GraphError::UnknownGraphKind(name)) if name == "butterfly"
    ));
  }

  #[test]
  fn centered_rescaled_cloud_shrinks_coordinates() {
    let points = random_cloud(40, 3, 5) + 100.0;

    let mut base = NnGraphConfig::default();
    base.k = 6;
    let mut transformed = base.clone();
    transformed.center = true;
    transformed.rescale = true;

    let reference = nn_graph(points.view(), base).unwrap();
    let graph = nn_graph(points.view(), transformed).unwrap();

    // Distances are translation-invariant and scaling is monotone, so the
    // edge pattern survives the transform
    assert_eq!(pattern(&reference), pattern(&graph));

    for mean in graph.coords().mean_axis(ndarray::Axis(0)).unwrap().iter() {
      assert!(mean.abs() < 1e-2);
    }
    let max_norm = graph
      .coords()
      .outer_iter()
      .map(|row| row.dot(&row).sqrt())
      .fold(0.0, f32::max);
    assert!(max_norm <= 1.25, "cloud not rescaled, max norm {max_norm}");
  }

  #[test]
  fn symmetrize_average_and_full_modes() {
    let mut tri = TriMat::new((3, 3));
    tri.add_triplet(0, 1, 0.8f32);
    tri.add_triplet(1, 0, 0.4);
    tri.add_triplet(0, 2, 0.6);
    let raw = tri.to_csr::<usize>();
    assert!(!is_symmetric(&raw));

    let averaged = symmetrize(&raw, SymmetrizeMode::Average);
    assert!(is_symmetric(&averaged));
    assert!(close(*averaged.get(0, 1).unwrap(), 0.6, 1e-6));
    assert!(close(*averaged.get(1, 0).unwrap(), 0.6, 1e-6));
    assert!(close(*averaged.get(0, 2).unwrap(), 0.3, 1e-6));
    assert!(close(*averaged.get(2, 0).unwrap(), 0.3, 1e-6));

    let unioned = symmetrize(&raw, SymmetrizeMode::Full);
    assert!(is_symmetric(&unioned));
    assert!(close(*unioned.get(0, 1).unwrap(), 0.8, 1e-6));
    assert!(close(*unioned.get(1, 0).unwrap(), 0.8, 1e-6));
    assert!(close(*unioned.get(0, 2).unwrap(), 0.6, 1e-6));
    assert!(close(*unioned.get(2, 0).unwrap(), 0.6, 1e-6));
  }

  #[test]
  fn radius_target_degree_derives_epsilon() {
    let mut config = NnGraphConfig::default();
    config.kind = GraphKind::Radius;
    config.target_degree = 3;

    let graph = nn_graph(unit_square().view(), config).unwrap();

    // The third-closest other corner sits at sqrt(2), so the derived radius
    // captures every pair
    assert_eq!(graph.weights().nnz(), 12);
    assert!(close(graph.sigma(), 1.0, 1e-5));
    assert!(close(
      *graph.weights().get(0, 3).unwrap(),
      f32::exp(-2.0),
      1e-5
    ));
  }

  #[test]
  fn classification_matrix_is_one_hot() {
    let labels = Array1::from(vec![2u32, 4, 3]);

    let (matrix, offset) = classification_matrix(labels.view());

    assert_eq!(offset, 2);
    assert_eq!(matrix.shape(), &[3, 3]);
    assert_eq!(matrix[(0, 0)], 1.0);
    assert_eq!(matrix[(1, 2)], 1.0);
    assert_eq!(matrix[(2, 1)], 1.0);
    assert_eq!(matrix.sum(), 3.0);
  }

  #[test]
  fn matrix2label_takes_argmax_with_offset() {
    let scores =
      Array2::from_shape_vec((2, 2), vec![0.1f32, 0.9, 0.8, 0.2]).unwrap();

    let labels = matrix2label(scores.view(), 5);

    assert_eq!(labels[0], 6);
    assert_eq!(labels[1], 5);
  }

  #[test]
  fn regression_knn_rejects_bad_shapes() {
    let mut config = NnGraphConfig::default();
    config.k = 1;
    let graph = nn_graph(unit_square().view(), config).unwrap();

    let short_mask = vec![true; 3];
    let b = Array2::<f32>::zeros((4, 2));
    assert!(matches!(
      regression_knn(&graph, &short_mask, b.view()),
      Err(GraphError::DimensionMismatch { expected: 4, found: 3 })
    ));

    let mask = vec![true; 4];
    let short_b = Array2::<f32>::zeros((3, 2));
    assert!(matches!(
      regression_knn(&graph, &mask, short_b.view()),
      Err(GraphError::DimensionMismatch { expected: 4, found: 3 })
    ));
  }

  #[test]
  fn classification_recovers_cluster_labels() {
    let mut rng = StdRng::seed_from_u64(7);
    let n_per = 8;
    let mut data = Vec::with_capacity(2 * n_per * 2);
    for i in 0..2 * n_per {
      let (cx, cy) = if i < n_per { (0.0, 0.0) } else { (10.0, 10.0) };
      data.push(cx + rng.random::<f32>());
      data.push(cy + rng.random::<f32>());
    }
    let points = Array2::from_shape_vec((2 * n_per, 2), data).unwrap();
    let labels =
      Array1::from_iter((0..2 * n_per).map(|i| if i < n_per { 1u32 } else { 2 }));
    let mask: Vec<bool> = (0..2 * n_per).map(|i| i % 2 == 0).collect();

    let mut config = NnGraphConfig::default();
    config.k = 5;
    let graph = nn_graph(points.view(), config).unwrap();

    let decoded = classify_knn(&graph, &mask, labels.view()).unwrap();

    for i in 0..2 * n_per {
      assert_eq!(decoded[i], labels[i], "vertex {i} misclassified");
    }
  }

  #[test]
  fn graph_serialization_roundtrip() {
    let points = random_cloud(20, 3, 8);
    let mut config = NnGraphConfig::default();
    config.k = 4;
    let graph = nn_graph(points.view(), config).unwrap();

    let serialized = bincode::serialize(&graph).expect("serialization failed");
    let restored: Graph = bincode::deserialize(&serialized).expect("deserialization failed");

    assert_eq!(restored.n_vertices(), graph.n_vertices());
    assert_eq!(restored.weights(), graph.weights());
    assert_eq!(restored.sigma(), graph.sigma());
    assert_eq!(restored.type_tag(), graph.type_tag());
  }

  #[test]
  fn decoration_tiers() {
    let mut light = NnGraphConfig::default();
    light.kind = GraphKind::Radius;
    light.epsilon = 2.0;
    light.light = true;

    let graph = nn_graph(unit_square().view(), light).unwrap();
    assert_eq!(graph.degrees().len(), 4);
    assert_eq!(graph.n_edges(), 6);
    assert!(graph.laplacian().is_none());
    assert!(graph.lmax().is_none());
    assert!(graph.coord_limits().is_none());

    let mut full = NnGraphConfig::default();
    full.kind = GraphKind::Radius;
    full.epsilon = 2.0;

    let graph = nn_graph(unit_square().view(), full).unwrap();
    let laplacian = graph.laplacian().expect("full decoration builds L");
    for row in laplacian.outer_iterator() {
      let sum: f32 = row.data().iter().sum();
      assert!(sum.abs() < 1e-4, "Laplacian row sum {sum} not ~0");
    }

    let max_degree = graph.degrees().iter().cloned().fold(0.0, f32::max);
    let lmax = graph.lmax().expect("full decoration estimates lmax");
    assert!(lmax >= 0.95 * max_degree);
    assert!(lmax <= 2.1 * max_degree);

    let (lo, hi) = graph.coord_limits().expect("full decoration sets limits");
    assert!(lo[0] <= 0.0 && lo[1] <= 0.0);
    assert!(hi[0] >= 1.0 && hi[1] >= 1.0);
  }
}
