//! Integration tests for records, the long-term store and the working set
//!
//! Checks the invariants that hold across many operations: decay
//! composition, bounded capacity, deduplicating consolidation and query
//! ordering.

use salience::SalienceError;
use salience::memory::{DecayingRecord, cosine_similarity};
use salience::providers::Embedder;
use salience::storage::{LongTermStore, SharedStore};
use salience::testing::{MockEmbedder, angled, unit_vector};
use salience::working_set::WorkingSet;

fn embedded(content: &str, embedding: Vec<f32>) -> DecayingRecord {
    DecayingRecord::new(content)
        .with_embedding(embedding)
        .with_significance(0.5)
}

mod decay_tests {
    use super::*;

    #[test]
    fn test_decay_composes() {
        for rate in [0.0, 0.05, 0.1, 0.5, 1.0] {
            for (t1, t2) in [(0.0, 1.0), (0.5, 0.25), (3.0, 7.0), (10.0, 0.001)] {
                let mut split = DecayingRecord::new("x")
                    .with_significance(0.9)
                    .with_decay_rate(rate);
                let mut whole = split.clone();

                split.apply_decay(t1).unwrap();
                split.apply_decay(t2).unwrap();
                whole.apply_decay(t1 + t2).unwrap();

                assert!(
                    (split.significance() - whole.significance()).abs() < 1e-9,
                    "rate {rate}, t1 {t1}, t2 {t2}"
                );
            }
        }
    }

    #[test]
    fn test_decay_never_increases_significance() {
        let mut record = DecayingRecord::new("x")
            .with_significance(0.8)
            .with_decay_rate(0.3);
        let mut previous = record.significance();
        for _ in 0..20 {
            record.apply_decay(0.7).unwrap();
            assert!(record.significance() <= previous);
            assert!(record.significance() >= 0.0);
            previous = record.significance();
        }
    }

    #[test]
    fn test_invalid_elapsed_rejected() {
        let mut record = DecayingRecord::new("x").with_significance(0.8);
        for elapsed in [-0.1, f64::NAN] {
            assert!(matches!(
                record.apply_decay(elapsed),
                Err(SalienceError::InvalidArgument(_))
            ));
        }
        assert_eq!(record.significance(), 0.8);
    }
}

mod store_tests {
    use super::*;

    #[test]
    fn test_consolidating_duplicates_never_grows_store() {
        let mut store = LongTermStore::new();
        let embedder = MockEmbedder::new(32);
        let e = embedder.embed("same event").unwrap();

        for i in 0..10 {
            store
                .consolidate(embedded(&format!("copy {i}"), e.clone()), 0.7)
                .unwrap();
        }

        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].content(), "copy 0");
        assert_eq!(store.records()[0].significance(), 1.0);
    }

    #[test]
    fn test_distinct_events_are_all_kept() {
        let mut store = LongTermStore::new();
        for axis in 0..8 {
            store
                .consolidate(embedded(&format!("axis {axis}"), unit_vector(8, axis)), 0.7)
                .unwrap();
        }
        assert_eq!(store.len(), 8);
    }

    #[test]
    fn test_query_sorted_and_truncated() {
        let mut store = LongTermStore::new();
        for degrees in [80.0, 10.0, 45.0, 30.0, 60.0] {
            store
                .consolidate(embedded(&format!("{degrees}"), angled(degrees)), 0.999)
                .unwrap();
        }

        let results = store.query_similar(&angled(0.0), 3, -1.0).unwrap();
        let names: Vec<&str> = results.iter().map(|r| r.record.content()).collect();
        assert_eq!(names, vec!["10", "30", "45"]);
        assert!(
            results
                .windows(2)
                .all(|w| w[0].similarity >= w[1].similarity)
        );
    }

    #[test]
    fn test_query_ties_prefer_latest_insert() {
        let mut store = LongTermStore::new();
        // symmetric around the query, identical similarity
        store.consolidate(embedded("left", angled(30.0)), 0.999).unwrap();
        store.consolidate(embedded("right", angled(-30.0)), 0.999).unwrap();

        let results = store.query_similar(&angled(0.0), 2, 0.0).unwrap();
        assert_eq!(results[0].record.content(), "right");
        assert_eq!(results[1].record.content(), "left");
    }

    #[test]
    fn test_similarity_bounds_hold_for_mock_vectors() {
        let embedder = MockEmbedder::new(48);
        let texts = ["alpha", "beta", "gamma", "delta"];
        for a in texts {
            let va = embedder.embed(a).unwrap();
            assert!((cosine_similarity(&va, &va) - 1.0).abs() < 1e-9);
            for b in texts {
                let vb = embedder.embed(b).unwrap();
                let s = cosine_similarity(&va, &vb);
                assert!((-1.0..=1.0).contains(&s));
                assert_eq!(s, cosine_similarity(&vb, &va));
            }
        }
    }

    #[test]
    fn test_prune_then_decay_cycle() {
        let mut store = LongTermStore::new();
        store
            .consolidate(embedded("fast", unit_vector(2, 0)).with_decay_rate(1.0), 0.7)
            .unwrap();
        store
            .consolidate(embedded("slow", unit_vector(2, 1)).with_decay_rate(0.01), 0.7)
            .unwrap();

        store.apply_decay(2.0).unwrap();
        assert_eq!(store.prune(0.2), 1);
        assert_eq!(store.records()[0].content(), "slow");
    }

    #[test]
    fn test_shared_store_concurrent_writers() {
        let store = SharedStore::default();
        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let store = store.clone();
                std::thread::spawn(move || {
                    for axis in 0..4 {
                        store
                            .consolidate(
                                embedded(&format!("w{worker}-{axis}"), unit_vector(4, axis)),
                                0.7,
                            )
                            .unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // one record per axis regardless of interleaving
        assert_eq!(store.len(), 4);
    }
}

mod working_set_tests {
    use super::*;

    #[test]
    fn test_capacity_never_exceeded() {
        let embedder = MockEmbedder::new(8);
        for capacity in [1, 2, 7] {
            let mut set = WorkingSet::new(capacity).unwrap();
            for i in 0..25 {
                let text = format!("event {i}");
                // pseudo-random significance from the mock vector
                let level = f64::from(embedder.embed(&text).unwrap()[0].abs());
                set.add(
                    DecayingRecord::new(text)
                        .with_significance(level)
                        .with_novelty(level),
                );
                assert!(set.len() <= capacity);
            }
            assert_eq!(set.len(), capacity);
        }
    }

    #[test]
    fn test_retained_records_outrank_evicted() {
        let mut set = WorkingSet::new(3).unwrap();
        let mut evicted = Vec::new();
        for (i, level) in [0.4, 0.9, 0.1, 0.7, 0.3, 0.8, 0.2].into_iter().enumerate() {
            evicted.extend(set.add(
                DecayingRecord::new(format!("r{i}"))
                    .with_significance(level)
                    .with_novelty(level),
            ));
        }

        let weakest_kept = set
            .iter()
            .map(|r| r.compute_salience())
            .fold(f64::INFINITY, f64::min);
        assert!(evicted.iter().all(|r| r.compute_salience() <= weakest_kept));
        let kept: Vec<&str> = set.iter().map(|r| r.content()).collect();
        assert_eq!(kept, vec!["r1", "r3", "r5"]);
    }

    #[test]
    fn test_equal_salience_evicts_in_insertion_order() {
        let mut set = WorkingSet::new(2).unwrap();
        let mut order = Vec::new();
        for i in 0..5 {
            for r in set.add(DecayingRecord::new(format!("r{i}")).with_significance(0.5)) {
                order.push(r.content().to_string());
            }
        }
        assert_eq!(order, vec!["r0", "r1", "r2"]);
    }
}
