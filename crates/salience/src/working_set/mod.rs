//! Capacity-bounded working set
//!
//! Holds scored records awaiting a consolidation decision. When an insert
//! pushes the set over capacity, the lowest-salience records are evicted;
//! among equal salience the earliest inserted goes first.

use crate::error::{Result, SalienceError};
use crate::memory::DecayingRecord;

#[derive(Debug, Clone)]
pub struct WorkingSet {
    records: Vec<DecayingRecord>,
    capacity: usize,
}

impl WorkingSet {
    /// Fails with `InvalidArgument` for a zero capacity
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(SalienceError::InvalidArgument(
                "working set capacity must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            records: Vec::with_capacity(capacity + 1),
            capacity,
        })
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &DecayingRecord> {
        self.records.iter()
    }

    /// Append a record, then evict down to capacity.
    ///
    /// Returns the evicted records, lowest salience first.
    pub fn add(&mut self, record: DecayingRecord) -> Vec<DecayingRecord> {
        self.records.push(record);
        self.enforce_capacity()
    }

    /// Records whose salience meets `threshold`, in insertion order
    pub fn consolidation_candidates(&self, threshold: f64) -> Vec<&DecayingRecord> {
        self.records
            .iter()
            .filter(|r| r.should_consolidate(threshold))
            .collect()
    }

    /// Remove and return the records whose salience meets `threshold`,
    /// preserving insertion order on both sides.
    pub fn take_consolidation_candidates(&mut self, threshold: f64) -> Vec<DecayingRecord> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| r.should_consolidate(threshold));
        self.records = kept;
        taken
    }

    /// Remove every record with `significance < min_significance`
    pub fn prune_decayed(&mut self, min_significance: f64) -> usize {
        let before = self.records.len();
        self.records.retain(|r| r.significance() >= min_significance);
        let removed = before - self.records.len();
        if removed > 0 {
            tracing::debug!(removed, min_significance, "Pruned decayed working memory");
        }
        removed
    }

    /// Decay every held record by `elapsed`
    pub fn apply_decay(&mut self, elapsed: f64) -> Result<()> {
        if !elapsed.is_finite() || elapsed < 0.0 {
            return Err(SalienceError::InvalidArgument(format!(
                "elapsed time must be finite and non-negative, got {elapsed}"
            )));
        }
        for record in &mut self.records {
            record.apply_decay(elapsed)?;
        }
        Ok(())
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Evict the globally lowest-salience record until within capacity.
    ///
    /// Saliences are snapshotted once before any removal; the earliest
    /// inserted wins the eviction among ties because the scan keeps the
    /// first minimum it sees.
    fn enforce_capacity(&mut self) -> Vec<DecayingRecord> {
        if self.records.len() <= self.capacity {
            return Vec::new();
        }

        let mut saliences: Vec<f64> = self.records.iter().map(|r| r.compute_salience()).collect();
        let mut evicted = Vec::new();

        while self.records.len() > self.capacity {
            let mut lowest = 0;
            for (idx, salience) in saliences.iter().enumerate().skip(1) {
                if *salience < saliences[lowest] {
                    lowest = idx;
                }
            }
            saliences.remove(lowest);
            let record = self.records.remove(lowest);
            tracing::debug!(
                id = %record.id(),
                salience = record.compute_salience(),
                "Evicted record from working set"
            );
            evicted.push(record);
        }

        evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Record whose salience is exactly `0.8 * level` (valence 0)
    fn record_at(content: &str, level: f64) -> DecayingRecord {
        DecayingRecord::new(content)
            .with_significance(level)
            .with_novelty(level)
    }

    fn contents(set: &WorkingSet) -> Vec<&str> {
        set.iter().map(|r| r.content()).collect()
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            WorkingSet::new(0),
            Err(SalienceError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_add_within_capacity_keeps_order() {
        let mut set = WorkingSet::new(3).unwrap();
        assert!(set.add(record_at("a", 0.9)).is_empty());
        assert!(set.add(record_at("b", 0.1)).is_empty());
        assert!(set.add(record_at("c", 0.5)).is_empty());
        assert_eq!(contents(&set), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_add_evicts_lowest_salience() {
        let mut set = WorkingSet::new(2).unwrap();
        set.add(record_at("high", 0.9));
        set.add(record_at("low", 0.1));
        let evicted = set.add(record_at("mid", 0.5));

        assert_eq!(evicted.len(), 1);
        assert_eq!(evicted[0].content(), "low");
        assert_eq!(contents(&set), vec!["high", "mid"]);
    }

    #[test]
    fn test_incoming_record_can_be_evicted() {
        let mut set = WorkingSet::new(2).unwrap();
        set.add(record_at("a", 0.9));
        set.add(record_at("b", 0.8));
        let evicted = set.add(record_at("weak", 0.1));
        assert_eq!(evicted[0].content(), "weak");
        assert_eq!(contents(&set), vec!["a", "b"]);
    }

    #[test]
    fn test_ties_evict_earliest_inserted() {
        let mut set = WorkingSet::new(2).unwrap();
        set.add(record_at("first", 0.5));
        set.add(record_at("second", 0.5));
        let evicted = set.add(record_at("third", 0.5));

        assert_eq!(evicted[0].content(), "first");
        assert_eq!(contents(&set), vec!["second", "third"]);
    }

    #[test]
    fn test_ties_after_reordering_by_removal() {
        let mut set = WorkingSet::new(3).unwrap();
        set.add(record_at("a", 0.5));
        set.add(record_at("b", 0.9));
        set.add(record_at("c", 0.5));
        set.add(record_at("d", 0.5));
        assert_eq!(contents(&set), vec!["b", "c", "d"]);

        set.add(record_at("e", 0.5));
        assert_eq!(contents(&set), vec!["b", "d", "e"]);
    }

    #[test]
    fn test_consolidation_candidates_do_not_mutate() {
        let mut set = WorkingSet::new(5).unwrap();
        set.add(record_at("a", 0.9));
        set.add(record_at("b", 0.2));
        set.add(record_at("c", 0.95));

        let candidates = set.consolidation_candidates(0.7);
        let names: Vec<_> = candidates.iter().map(|r| r.content()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_take_consolidation_candidates_removes_them() {
        let mut set = WorkingSet::new(5).unwrap();
        set.add(record_at("a", 0.9));
        set.add(record_at("b", 0.2));
        set.add(record_at("c", 0.95));
        set.add(record_at("d", 0.3));

        let taken = set.take_consolidation_candidates(0.7);
        let names: Vec<_> = taken.iter().map(|r| r.content()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert_eq!(contents(&set), vec!["b", "d"]);
    }

    #[test]
    fn test_prune_decayed_keeps_floor() {
        let mut set = WorkingSet::new(5).unwrap();
        set.add(DecayingRecord::new("gone").with_significance(0.05));
        set.add(DecayingRecord::new("floor").with_significance(0.1));
        set.add(DecayingRecord::new("kept").with_significance(0.6));

        assert_eq!(set.prune_decayed(0.1), 1);
        assert_eq!(contents(&set), vec!["floor", "kept"]);
    }

    #[test]
    fn test_decay_then_prune() {
        let mut set = WorkingSet::new(5).unwrap();
        set.add(
            DecayingRecord::new("fast")
                .with_significance(0.5)
                .with_decay_rate(1.0),
        );
        set.add(
            DecayingRecord::new("slow")
                .with_significance(0.5)
                .with_decay_rate(0.0),
        );

        set.apply_decay(3.0).unwrap();
        assert_eq!(set.prune_decayed(0.1), 1);
        assert_eq!(contents(&set), vec!["slow"]);
    }

    #[test]
    fn test_negative_decay_rejected_without_change() {
        let mut set = WorkingSet::new(5).unwrap();
        set.add(DecayingRecord::new("a").with_significance(0.5));
        assert!(set.apply_decay(-0.5).is_err());
        assert_eq!(set.iter().next().unwrap().significance(), 0.5);
    }

    #[test]
    fn test_infinite_decay_rejected_without_change() {
        let mut set = WorkingSet::new(5).unwrap();
        set.add(
            DecayingRecord::new("steady")
                .with_significance(0.5)
                .with_decay_rate(0.0),
        );
        assert!(matches!(
            set.apply_decay(f64::INFINITY),
            Err(SalienceError::InvalidArgument(_))
        ));
        assert_eq!(set.iter().next().unwrap().significance(), 0.5);
    }

    #[test]
    fn test_clear() {
        let mut set = WorkingSet::new(2).unwrap();
        set.add(record_at("a", 0.5));
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.capacity(), 2);
    }
}
