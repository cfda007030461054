use crate::cookies::draft::{ContextId, CookieDraft, CookieKey};
use dashmap::DashMap;
use std::sync::Arc;
use time::OffsetDateTime;

/// Destination for committed cookies.
pub trait CookieStore: Send + Sync {
    /// Insert a cookie, replacing any cookie with the same identity.
    fn upsert(&self, cookie: CookieDraft);

    /// Remove the cookie with this identity. Returns whether one existed.
    fn remove(&self, key: &CookieKey) -> bool;
}

/// In-memory cookie jar, partitioned by context and domain.
///
/// No eviction: limits are the caller's concern.
#[derive(Debug, Clone, Default)]
pub struct CookieMonster {
    // Store: Map<(Context, Domain), List<Cookie>>
    store: Arc<DashMap<(ContextId, String), Vec<CookieDraft>>>,
}

impl CookieMonster {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(context_id: ContextId, domain: &str) -> (ContextId, String) {
        (context_id, domain.to_ascii_lowercase())
    }

    pub fn get(&self, key: &CookieKey) -> Option<CookieDraft> {
        let entry = self.store.get(&Self::slot(key.context_id, &key.domain))?;
        entry.iter().find(|c| key.matches(&c.key())).cloned()
    }

    /// Cookies stored for exactly this domain.
    pub fn cookies_for_domain(&self, context_id: ContextId, domain: &str) -> Vec<CookieDraft> {
        self.store
            .get(&Self::slot(context_id, domain))
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Drop expired cookies. Returns how many were removed.
    pub fn purge_expired(&self, now: OffsetDateTime) -> usize {
        let mut removed = 0;
        for mut entry in self.store.iter_mut() {
            let before = entry.len();
            entry.retain(|c| !c.is_expired(now));
            removed += before - entry.len();
        }
        self.store.retain(|_, cookies| !cookies.is_empty());
        removed
    }

    /// Drop cookies that must not outlive the session.
    pub fn end_session(&self) -> usize {
        let mut removed = 0;
        for mut entry in self.store.iter_mut() {
            let before = entry.len();
            entry.retain(|c| !c.is_session() && !c.discard_at_exit);
            removed += before - entry.len();
        }
        self.store.retain(|_, cookies| !cookies.is_empty());
        removed
    }

    /// Get total cookie count.
    pub fn total_cookie_count(&self) -> usize {
        self.store.iter().map(|e| e.value().len()).sum()
    }

    /// Clear all cookies.
    pub fn clear(&self) {
        self.store.clear();
    }

    pub fn iter_all_cookies(&self) -> impl Iterator<Item = CookieDraft> + '_ {
        self.store.iter().flat_map(|entry| entry.value().clone())
    }
}

impl CookieStore for CookieMonster {
    fn upsert(&self, cookie: CookieDraft) {
        let mut entry = self
            .store
            .entry(Self::slot(cookie.context_id, &cookie.domain))
            .or_default();

        match entry.iter().position(|c| c.same_identity(&cookie)) {
            Some(idx) => entry[idx] = cookie,
            None => entry.push(cookie),
        }
    }

    fn remove(&self, key: &CookieKey) -> bool {
        let slot = Self::slot(key.context_id, &key.domain);
        let Some(mut entry) = self.store.get_mut(&slot) else {
            return false;
        };

        let before = entry.len();
        entry.retain(|c| !key.matches(&c.key()));
        let removed = entry.len() != before;
        let empty = entry.is_empty();
        drop(entry); // Release lock before removing the slot

        if empty {
            self.store.remove_if(&slot, |_, cookies| cookies.is_empty());
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_cookie(name: &str, domain: &str) -> CookieDraft {
        let mut cookie = CookieDraft::new(name, "test_value", 0);
        cookie.domain = domain.to_string();
        cookie.expires_at = Some(OffsetDateTime::now_utc() + time::Duration::days(30));
        cookie
    }

    #[test]
    fn test_upsert_replaces_same_identity() {
        let jar = CookieMonster::new();
        jar.upsert(make_test_cookie("session", "example.com"));
        let mut newer = make_test_cookie("session", "EXAMPLE.com");
        newer.value = "newer".to_string();
        jar.upsert(newer);

        assert_eq!(jar.total_cookie_count(), 1);
        let key = make_test_cookie("session", "example.com").key();
        assert_eq!(jar.get(&key).unwrap().value, "newer");
    }

    #[test]
    fn test_contexts_are_partitioned() {
        let jar = CookieMonster::new();
        let mut private = make_test_cookie("session", "example.com");
        private.context_id = ContextId(1);
        jar.upsert(make_test_cookie("session", "example.com"));
        jar.upsert(private);

        assert_eq!(jar.total_cookie_count(), 2);
        assert_eq!(jar.cookies_for_domain(ContextId(1), "example.com").len(), 1);
    }

    #[test]
    fn test_remove() {
        let jar = CookieMonster::new();
        let cookie = make_test_cookie("a", "example.com");
        let key = cookie.key();
        jar.upsert(cookie);

        assert!(jar.remove(&key));
        assert!(!jar.remove(&key));
        assert_eq!(jar.total_cookie_count(), 0);
        assert!(jar.get(&key).is_none());
    }

    #[test]
    fn test_purge_expired() {
        let jar = CookieMonster::new();
        let mut old = make_test_cookie("old", "example.com");
        old.expires_at = Some(OffsetDateTime::now_utc() - time::Duration::days(1));
        jar.upsert(old);
        jar.upsert(make_test_cookie("fresh", "example.com"));

        assert_eq!(jar.purge_expired(OffsetDateTime::now_utc()), 1);
        assert_eq!(jar.total_cookie_count(), 1);
    }

    #[test]
    fn test_end_session() {
        let jar = CookieMonster::new();
        let mut session = make_test_cookie("session", "example.com");
        session.expires_at = None;
        let mut discard = make_test_cookie("discard", "example.com");
        discard.discard_at_exit = true;
        jar.upsert(session);
        jar.upsert(discard);
        jar.upsert(make_test_cookie("persistent", "other.com"));

        assert_eq!(jar.end_session(), 2);
        let names: Vec<_> = jar.iter_all_cookies().map(|c| c.name).collect();
        assert_eq!(names, vec!["persistent"]);
    }
}
