// SPDX-License-Identifier: MIT OR Apache-2.0
//! `evaluator_id -> EvaluatorContext` registry (`spec.md` §4.3).

use crate::context::EvaluatorContext;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// A locked map of live evaluator contexts, keyed by the id the server
/// allocated for them. Ids are unique for the registry's lifetime; they are
/// never reused, even after the evaluator that held them is removed.
pub struct EvaluatorRegistry {
    next_id: AtomicI64,
    contexts: Mutex<BTreeMap<i64, Arc<EvaluatorContext>>>,
}

impl EvaluatorRegistry {
    /// Build an empty registry. Ids are allocated starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            contexts: Mutex::new(BTreeMap::new()),
        }
    }

    /// Allocate a fresh id and register `context` under it.
    pub async fn insert(&self, context: EvaluatorContext) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.contexts.lock().await.insert(id, Arc::new(context));
        id
    }

    /// Look up a context by id.
    pub async fn get(&self, id: i64) -> Option<Arc<EvaluatorContext>> {
        self.contexts.lock().await.get(&id).cloned()
    }

    /// Remove a context by id. Returns `true` if it existed.
    pub async fn remove(&self, id: i64) -> bool {
        self.contexts.lock().await.remove(&id).is_some()
    }

    /// Ids of all currently registered evaluators, in ascending order.
    pub async fn ids(&self) -> Vec<i64> {
        self.contexts.lock().await.keys().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::EvaluatorContext;
    use esp_core::CreateEvaluatorRequest;

    fn sample_context() -> EvaluatorContext {
        EvaluatorContext::new(&CreateEvaluatorRequest::default(), None)
    }

    #[tokio::test]
    async fn allocates_unique_ascending_ids() {
        let registry = EvaluatorRegistry::new();
        let first = registry.insert(sample_context()).await;
        let second = registry.insert(sample_context()).await;
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn get_and_remove_round_trip() {
        let registry = EvaluatorRegistry::new();
        let id = registry.insert(sample_context()).await;
        assert!(registry.get(id).await.is_some());
        assert!(registry.remove(id).await);
        assert!(registry.get(id).await.is_none());
        assert!(!registry.remove(id).await);
    }

    #[tokio::test]
    async fn removed_ids_are_never_reissued() {
        let registry = EvaluatorRegistry::new();
        let first = registry.insert(sample_context()).await;
        registry.remove(first).await;
        let second = registry.insert(sample_context()).await;
        assert_ne!(first, second);
    }
}
