//! Resource subscription manager (C6, spec.md §4.7).
//!
//! Tracks which sessions are subscribed to which resource URIs and
//! hands back the subscriber set to notify on a `publish`. Built on
//! `dashmap` rather than a single `Mutex<HashMap<..>>` so subscribe/
//! unsubscribe/publish on different URIs never contend with each other
//! — each URI's bucket is independently locked, which is what "serialize
//! per-uri" means in practice here.

use std::collections::HashSet;

use dashmap::DashMap;

/// Tracks `uri -> {sessionId}` subscriptions.
#[derive(Default)]
pub struct SubscriptionManager {
    subscribers: DashMap<String, HashSet<String>>,
}

impl SubscriptionManager {
    /// An empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe `session_id` to `uri`. Idempotent: subscribing twice
    /// has the same effect as once. Returns `true` if this call added a
    /// new subscription.
    pub fn subscribe(&self, uri: &str, session_id: &str) -> bool {
        self.subscribers
            .entry(uri.to_string())
            .or_default()
            .insert(session_id.to_string())
    }

    /// Unsubscribe `session_id` from `uri`. Idempotent: unsubscribing a
    /// session that was never subscribed is a no-op. Returns `true` if
    /// this call removed an existing subscription.
    pub fn unsubscribe(&self, uri: &str, session_id: &str) -> bool {
        let Some(mut entry) = self.subscribers.get_mut(uri) else {
            return false;
        };
        let removed = entry.remove(session_id);
        if entry.is_empty() {
            drop(entry);
            self.subscribers.remove(uri);
        }
        removed
    }

    /// Drop every subscription held by `session_id`, across all URIs —
    /// called when a session closes.
    pub fn remove_session(&self, session_id: &str) {
        self.subscribers.retain(|_, subscribers| {
            subscribers.remove(session_id);
            !subscribers.is_empty()
        });
    }

    /// `true` if `session_id` is currently subscribed to `uri`.
    pub fn is_subscribed(&self, uri: &str, session_id: &str) -> bool {
        self.subscribers
            .get(uri)
            .map(|s| s.contains(session_id))
            .unwrap_or(false)
    }

    /// Snapshot the sessions subscribed to `uri` at the moment of the
    /// call, for `resources/updated` delivery. A session appears at
    /// most once, so `publish` notifies each subscribed session exactly
    /// once per change event (spec.md §4.7 invariant).
    pub fn subscribers_of(&self, uri: &str) -> Vec<String> {
        self.subscribers
            .get(uri)
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_is_idempotent() {
        let mgr = SubscriptionManager::new();
        assert!(mgr.subscribe("file:///a", "s1"));
        assert!(!mgr.subscribe("file:///a", "s1"));
        assert_eq!(mgr.subscribers_of("file:///a"), vec!["s1".to_string()]);
    }

    #[test]
    fn unsubscribe_is_idempotent_and_cleans_up_empty_uris() {
        let mgr = SubscriptionManager::new();
        mgr.subscribe("file:///a", "s1");
        assert!(mgr.unsubscribe("file:///a", "s1"));
        assert!(!mgr.unsubscribe("file:///a", "s1"));
        assert!(mgr.subscribers_of("file:///a").is_empty());
    }

    #[test]
    fn each_session_notified_once_per_publish() {
        let mgr = SubscriptionManager::new();
        mgr.subscribe("file:///a", "s1");
        mgr.subscribe("file:///a", "s2");
        mgr.subscribe("file:///a", "s1");
        let mut subscribers = mgr.subscribers_of("file:///a");
        subscribers.sort();
        assert_eq!(subscribers, vec!["s1".to_string(), "s2".to_string()]);
    }

    #[test]
    fn remove_session_drops_all_its_subscriptions() {
        let mgr = SubscriptionManager::new();
        mgr.subscribe("file:///a", "s1");
        mgr.subscribe("file:///b", "s1");
        mgr.subscribe("file:///b", "s2");
        mgr.remove_session("s1");
        assert!(mgr.subscribers_of("file:///a").is_empty());
        assert_eq!(mgr.subscribers_of("file:///b"), vec!["s2".to_string()]);
    }

    #[test]
    fn unrelated_uris_do_not_affect_each_other() {
        let mgr = SubscriptionManager::new();
        mgr.subscribe("file:///a", "s1");
        assert!(!mgr.is_subscribed("file:///b", "s1"));
        assert!(mgr.is_subscribed("file:///a", "s1"));
    }
}
