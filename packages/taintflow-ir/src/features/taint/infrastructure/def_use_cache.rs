//! Shared def-use index cache
//!
//! Every propagation walks def-use edges of the functions it touches, and
//! seeds running on the worker pool touch the same hot functions; the index
//! is built once per function and shared behind an LRU cache.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::features::ir::domain::{CanonicalFunction, DefUseIndex};
use crate::features::linker::domain::FunctionId;

#[derive(Debug)]
pub struct DefUseCache {
    cache: Mutex<LruCache<FunctionId, Arc<DefUseIndex>>>,
}

impl DefUseCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Fetch the index for `id`, building it from `body` on a miss
    pub fn get(&self, id: FunctionId, body: &CanonicalFunction) -> Arc<DefUseIndex> {
        let mut cache = self.cache.lock();
        if let Some(index) = cache.get(&id) {
            return Arc::clone(index);
        }
        let index = Arc::new(DefUseIndex::build(body));
        cache.put(id, Arc::clone(&index));
        index
    }
}
