//! Identity-keyed memoization of [`clean`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::{Frame, FrameId};

use super::clean::clean;

/// Hit/miss counters of a [`CleaningCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

/// Cleaned frames keyed by the [`FrameId`] of their input.
///
/// Asking twice for the same frame instance returns the same `Arc` without re-cleaning. A
/// clone, or any other frame with equal content, is a different instance and is cleaned again.
/// Entries are never evicted.
#[derive(Debug, Default)]
pub struct CleaningCache {
    entries: HashMap<FrameId, Arc<Frame>>,
    stats: CacheStats,
}

impl CleaningCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cleaned form of `frame`, computed on first request.
    pub fn clean(&mut self, frame: &Frame) -> Arc<Frame> {
        let id = frame.id();
        if let Some(hit) = self.entries.get(&id) {
            self.stats.hits += 1;
            log::debug!("cleaning cache hit for {id:?}");
            return Arc::clone(hit);
        }

        self.stats.misses += 1;
        log::debug!("cleaning cache miss for {id:?}");
        let cleaned = Arc::new(clean(frame));
        self.entries.insert(id, Arc::clone(&cleaned));
        cleaned
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn counts_hits_and_misses() {
        let f = Frame::from_columns(vec![("a", vec![Value::Int64(1)])]).unwrap();
        let mut cache = CleaningCache::new();
        assert!(cache.is_empty());

        cache.clean(&f);
        cache.clean(&f);
        cache.clean(&f.clone());

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 2 });
    }
}
