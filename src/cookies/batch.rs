//! Per-response batch of accepted cookies and conflict resolution.

use crate::base::context::reserve;
use crate::base::neterror::NetError;
use crate::cookies::draft::{CookieDraft, CookieKey};
use crate::cookies::outcome::CookieOutcome;

/// Cookies accepted from one response, in header order.
///
/// Holds at most one cookie per (domain, name, path) identity; a later cookie
/// with the same identity replaces the earlier one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingBatch {
    cookies: Vec<CookieDraft>,
}

impl PendingBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a fully validated cookie into the batch.
    ///
    /// Delete requests remove any matching entry and come back as
    /// [`CookieOutcome::Deleted`] so the caller can forward a tombstone.
    pub(crate) fn resolve(&mut self, draft: CookieDraft) -> Result<CookieOutcome, NetError> {
        let existing = self.cookies.iter().position(|c| c.same_identity(&draft));
        let key = draft.key();

        if draft.delete_requested {
            if let Some(idx) = existing {
                self.cookies.remove(idx);
            }
            return Ok(CookieOutcome::Deleted(key));
        }

        match existing {
            Some(idx) => {
                let old = &self.cookies[idx];
                tracing::trace!(
                    domain = %key.domain,
                    name = %key.name,
                    old_version = old.version,
                    new_version = draft.version,
                    "cookie superseded within response"
                );
                self.cookies[idx] = draft;
            }
            None => {
                reserve(&mut self.cookies, 1, "pending cookie batch")?;
                self.cookies.push(draft);
            }
        }

        Ok(CookieOutcome::Accepted(key))
    }

    pub fn get(&self, key: &CookieKey) -> Option<&CookieDraft> {
        self.cookies.iter().find(|c| key.matches(&c.key()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CookieDraft> {
        self.cookies.iter()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn into_vec(self) -> Vec<CookieDraft> {
        self.cookies
    }
}
