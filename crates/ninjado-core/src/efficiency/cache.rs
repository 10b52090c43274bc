//! Optional memoization in front of the calculators.
//!
//! Entries are keyed by a SHA-256 digest of the input. The cache only ever
//! returns what the wrapped function would have computed, so callers can drop
//! it without changing any result.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::grace::{calculate_overall_efficiency, OverallEfficiencyResult};
use super::routine::{calculate_routine_efficiency, RoutineEfficiencyResult, TaskCompletion, TaskKind};
use crate::error::ValidationError;

/// Hit/miss counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

#[derive(Debug, Clone, Copy)]
enum CachedValue {
    Routine(RoutineEfficiencyResult),
    Overall(OverallEfficiencyResult),
}

#[derive(Debug, Default)]
struct CacheInner {
    entries: HashMap<String, CachedValue>,
    order: VecDeque<String>,
    hits: u64,
    misses: u64,
}

/// Bounded, thread-safe memo with FIFO eviction.
#[derive(Debug)]
pub struct EfficiencyCache {
    capacity: usize,
    inner: Mutex<CacheInner>,
}

impl EfficiencyCache {
    /// A capacity of 0 disables storage; every call computes.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Memoized [`calculate_routine_efficiency`].
    pub fn routine_efficiency(&self, tasks: &[TaskCompletion]) -> RoutineEfficiencyResult {
        let key = routine_key(tasks);
        if let Some(CachedValue::Routine(hit)) = self.lookup(&key) {
            return hit;
        }
        let result = calculate_routine_efficiency(tasks);
        self.store(key, CachedValue::Routine(result));
        result
    }

    /// Memoized [`calculate_overall_efficiency`]. Errors are not cached.
    pub fn overall_efficiency(
        &self,
        efficiencies: &[f64],
    ) -> Result<OverallEfficiencyResult, ValidationError> {
        let key = overall_key(efficiencies);
        if let Some(CachedValue::Overall(hit)) = self.lookup(&key) {
            return Ok(hit);
        }
        let result = calculate_overall_efficiency(efficiencies)?;
        self.store(key, CachedValue::Overall(result));
        Ok(result)
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock();
        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            entries: inner.entries.len(),
        }
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.order.clear();
    }

    fn lock(&self) -> MutexGuard<'_, CacheInner> {
        // A panic while holding the lock cannot leave a half-written entry.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lookup(&self, key: &str) -> Option<CachedValue> {
        let mut inner = self.lock();
        match inner.entries.get(key).copied() {
            Some(value) => {
                inner.hits += 1;
                Some(value)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    fn store(&self, key: String, value: CachedValue) {
        if self.capacity == 0 {
            return;
        }
        let mut inner = self.lock();
        if inner.entries.insert(key.clone(), value).is_none() {
            inner.order.push_back(key);
        }
        while inner.entries.len() > self.capacity {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                }
                None => break,
            }
        }
    }
}

fn routine_key(tasks: &[TaskCompletion]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"routine");
    for task in tasks {
        let kind: u8 = match task.kind() {
            TaskKind::Regular => 0,
            TaskKind::Focus => 1,
        };
        hasher.update([kind]);
        hasher.update(task.planned_duration().to_le_bytes());
        hasher.update(task.actual_duration().to_le_bytes());
    }
    hex::encode(hasher.finalize())
}

fn overall_key(efficiencies: &[f64]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"overall");
    for value in efficiencies {
        hasher.update(value.to_bits().to_le_bytes());
    }
    hex::encode(hasher.finalize())
}
