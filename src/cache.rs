use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::models::Project;

/// Bounded cache of embeddings results keyed by normalized keyword string.
///
/// Eviction is by insertion age: once `max_entries` keys are held, adding a
/// new key drops the oldest one. Overwriting an existing key keeps its age.
pub struct ResultCache {
    max_entries: usize,
    inner: Mutex<CacheInner>,
}

#[derive(Default)]
struct CacheInner {
    entries: HashMap<String, Vec<Project>>,
    order: VecDeque<String>,
}

impl ResultCache {
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            inner: Mutex::new(CacheInner::default()),
        }
    }

    pub fn normalize_key(key: &str) -> String {
        key.trim().to_lowercase()
    }

    pub fn get(&self, key: &str) -> Option<Vec<Project>> {
        if self.max_entries == 0 {
            return None;
        }
        let key = Self::normalize_key(key);
        self.inner.lock().entries.get(&key).cloned()
    }

    pub fn insert(&self, key: &str, projects: Vec<Project>) {
        if self.max_entries == 0 {
            return;
        }
        let key = Self::normalize_key(key);
        let mut inner = self.inner.lock();

        if let Some(existing) = inner.entries.get_mut(&key) {
            *existing = projects;
            return;
        }

        while inner.entries.len() >= self.max_entries {
            match inner.order.pop_front() {
                Some(oldest) => {
                    inner.entries.remove(&oldest);
                    tracing::debug!("Evicted cached results for '{oldest}'");
                }
                None => break,
            }
        }

        inner.order.push_back(key.clone());
        inner.entries.insert(key, projects);
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
