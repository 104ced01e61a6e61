//! In-flight request registry
//!
//! A newer request from the same client session and task supersedes the
//! older one: the older request's token is cancelled, which abandons its
//! upstream call.

use dashmap::DashMap;
use simplify_ai::Task;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio_util::sync::CancellationToken;

type Key = (String, Task);

#[derive(Clone, Default)]
pub struct InflightRegistry {
    entries: Arc<DashMap<Key, (u64, CancellationToken)>>,
    next_id: Arc<AtomicU64>,
}

impl InflightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request, cancelling the one it supersedes
    pub fn begin(&self, session: &str, task: Task) -> InflightGuard {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let key = (session.to_string(), task);

        if let Some((_, previous)) = self.entries.insert(key.clone(), (id, token.clone())) {
            tracing::debug!(task = %task, "Superseding in-flight request");
            previous.cancel();
        }

        InflightGuard {
            registry: self.clone(),
            key,
            id,
            token,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Deregisters its request on drop, unless a newer one already replaced it
pub struct InflightGuard {
    registry: InflightRegistry,
    key: Key,
    id: u64,
    token: CancellationToken,
}

impl InflightGuard {
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        let id = self.id;
        self.registry
            .entries
            .remove_if(&self.key, |_, (current, _)| *current == id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_request_cancels_older() {
        let registry = InflightRegistry::new();
        let first = registry.begin("tab-1", Task::Simplify);
        let second = registry.begin("tab-1", Task::Simplify);

        assert!(first.token().is_cancelled());
        assert!(!second.token().is_cancelled());

        // The superseded guard must not deregister its successor
        drop(first);
        assert_eq!(registry.len(), 1);
        drop(second);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_sessions_and_tasks_are_independent() {
        let registry = InflightRegistry::new();
        let a = registry.begin("tab-1", Task::Simplify);
        let b = registry.begin("tab-2", Task::Simplify);
        let c = registry.begin("tab-1", Task::Bundle);

        assert!(!a.token().is_cancelled());
        assert!(!b.token().is_cancelled());
        assert!(!c.token().is_cancelled());
        assert_eq!(registry.len(), 3);
    }
}
