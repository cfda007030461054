//! All cookie outcomes of a single response.

use crate::base::context::reserve;
use crate::base::loadstate::LoadState;
use crate::base::neterror::NetError;
use crate::cookies::batch::PendingBatch;
use crate::cookies::draft::CookieKey;
use crate::cookies::engine::CookieEngine;
use crate::cookies::monster::CookieStore;
use crate::cookies::outcome::{CookieOutcome, DeferReason, DeferredCookie, DeferralId, Resolution};
use crate::cookies::request::CookieRequest;

/// Accepted cookies, delete requests and parked cookies of one response,
/// waiting to be committed to a [`CookieStore`].
#[derive(Debug)]
pub struct ResponseCookies {
    request: CookieRequest,
    batch: PendingBatch,
    deferred: Vec<DeferredCookie>,
    tombstones: Vec<CookieKey>,
    rejected: usize,
    failures: Vec<NetError>,
}

impl ResponseCookies {
    pub(crate) fn new(request: CookieRequest) -> Self {
        Self {
            request,
            batch: PendingBatch::new(),
            deferred: Vec::new(),
            tombstones: Vec::new(),
            rejected: 0,
            failures: Vec::new(),
        }
    }

    pub(crate) fn batch_mut(&mut self) -> &mut PendingBatch {
        &mut self.batch
    }

    pub(crate) fn record(&mut self, outcome: CookieOutcome) -> Result<(), NetError> {
        match outcome {
            CookieOutcome::Accepted(_) => {}
            CookieOutcome::Deleted(key) => {
                reserve(&mut self.tombstones, 1, "cookie tombstones")?;
                self.tombstones.push(key);
            }
            CookieOutcome::Deferred(cookie) => {
                reserve(&mut self.deferred, 1, "deferred cookies")?;
                self.deferred.push(cookie);
            }
            CookieOutcome::Rejected(_) => self.rejected += 1,
        }
        Ok(())
    }

    /// A header that could not be processed at all. Cookies from other
    /// headers are kept.
    pub(crate) fn record_failure(&mut self, err: NetError) {
        self.failures.push(err);
    }

    pub fn request(&self) -> &CookieRequest {
        &self.request
    }

    pub fn batch(&self) -> &PendingBatch {
        &self.batch
    }

    pub fn deferred(&self) -> &[DeferredCookie] {
        &self.deferred
    }

    pub fn tombstones(&self) -> &[CookieKey] {
        &self.tombstones
    }

    pub fn rejected(&self) -> usize {
        self.rejected
    }

    /// Hard errors of headers that were abandoned, in header order.
    pub fn failures(&self) -> &[NetError] {
        &self.failures
    }

    /// DNS checks take precedence since they are the slower wait.
    pub fn load_state(&self) -> LoadState {
        if self
            .deferred
            .iter()
            .any(|d| d.reason() == DeferReason::DnsCheck)
        {
            LoadState::WaitingForCookiesDns
        } else if !self.deferred.is_empty() {
            LoadState::WaitingForCookies
        } else {
            LoadState::Idle
        }
    }

    /// Deliver the answer for one parked cookie.
    ///
    /// On error the cookie stays parked and can be resumed again.
    pub fn resume(
        &mut self,
        engine: &CookieEngine,
        id: DeferralId,
        resolution: Resolution,
    ) -> Result<CookieOutcome, NetError> {
        let idx = self
            .deferred
            .iter()
            .position(|d| d.id() == id)
            .ok_or(NetError::UnknownDeferredCookie)?;

        let outcome = engine.resume(self.deferred[idx].clone(), resolution, &mut self.batch)?;
        self.deferred.remove(idx);
        self.record(outcome.clone())?;
        Ok(outcome)
    }

    /// Drop a parked cookie. Returns false if the id is unknown.
    pub fn cancel(&mut self, id: DeferralId) -> bool {
        let before = self.deferred.len();
        self.deferred.retain(|d| d.id() != id);
        self.deferred.len() != before
    }

    /// Apply deletions, then store every accepted cookie.
    ///
    /// Cookies still parked are dropped. Returns the number of cookies stored.
    pub fn commit(self, store: &dyn CookieStore) -> usize {
        if !self.deferred.is_empty() {
            tracing::debug!(
                host = %self.request.host,
                dropped = self.deferred.len(),
                "committing with unresolved cookies"
            );
        }

        for key in &self.tombstones {
            store.remove(key);
        }

        let stored = self.batch.len();
        for cookie in self.batch.into_vec() {
            store.upsert(cookie);
        }
        stored
    }
}
