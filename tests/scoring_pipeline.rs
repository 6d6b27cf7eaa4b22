//! Integration tests for scoring, normalization and combination through the public API.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use blend::combiner::{CombineError, HybridCombiner, WeightConfig};
use blend::model::Context;
use blend::scoring::{
    ContentBasedScorer, ContextualAdjuster, MatrixFactorizationScorer, PopularityScorer,
    SignalScorer, normalize,
};

use common::fixtures::{WINTER, numbered_items, user_with_tags};

fn popularity_of(items: &[blend::model::Item]) -> HashMap<String, u64> {
    items.iter().map(|i| (i.id.clone(), i.popularity)).collect()
}

#[test]
fn test_pipeline_returns_min_of_k_and_union() {
    let items = numbered_items(12);
    let user = user_with_tags("u", &["tag-1", "tag-3"]);
    let context = Context::default().with_season(WINTER);

    let scorers: Vec<Box<dyn SignalScorer>> = vec![
        Box::new(ContentBasedScorer::new()),
        Box::new(PopularityScorer::new()),
        Box::new(ContextualAdjuster::default()),
    ];
    let vectors: Vec<_> = scorers
        .iter()
        .map(|s| normalize(s.score(&user, &items, &context)))
        .collect();

    for vector in &vectors {
        assert!(vector.iter().all(|(_, s)| (0.0..=1.0).contains(s)));
    }

    let combiner = HybridCombiner::new(&WeightConfig::default()).unwrap();
    let counts = popularity_of(&items);

    for k in [1, 5, 12, 50] {
        let list = combiner.combine(&vectors, &counts, k).unwrap();
        assert_eq!(list.len(), k.min(items.len()));
    }
}

#[test]
fn test_matrix_factorization_only_ranks_by_dot_product() {
    let items = numbered_items(3);
    let factors: HashMap<String, Vec<f32>> = [
        ("item-000".to_string(), vec![0.1, 0.0]),
        ("item-001".to_string(), vec![0.9, 0.0]),
        ("item-002".to_string(), vec![0.5, 0.0]),
    ]
    .into_iter()
    .collect();

    let scorer = MatrixFactorizationScorer::new(Arc::new(factors), Some(vec![1.0, 0.0]));
    let user = user_with_tags("u", &[]);
    let vector = normalize(scorer.score(&user, &items, &Context::default()));

    let combiner = HybridCombiner::new(&WeightConfig::new(1.0, 0.0, 0.0, 0.0)).unwrap();
    let list = combiner
        .combine(&[vector], &popularity_of(&items), 10)
        .unwrap();

    assert_eq!(list.item_ids(), vec!["item-001", "item-002", "item-000"]);
}

#[test]
fn test_no_candidates_is_insufficient_signal() {
    let user = user_with_tags("u", &["tag-1"]);
    let vectors: Vec<_> = [
        Box::new(PopularityScorer::new()) as Box<dyn SignalScorer>,
        Box::new(ContentBasedScorer::new()),
    ]
    .iter()
    .map(|s| normalize(s.score(&user, &[], &Context::default())))
    .collect();

    let combiner = HybridCombiner::new(&WeightConfig::default()).unwrap();
    assert_eq!(
        combiner.combine(&vectors, &HashMap::new(), 10),
        Err(CombineError::InsufficientSignal)
    );
}

#[test]
fn test_all_zero_weights_rejected() {
    assert!(matches!(
        HybridCombiner::new(&WeightConfig::new(0.0, 0.0, 0.0, 0.0)),
        Err(CombineError::InvalidWeightConfig { .. })
    ));
}
