//! Results of validating one cookie header.

use crate::base::neterror::NetError;
use crate::cookies::attributes::PortAttr;
use crate::cookies::draft::{CookieDraft, CookieKey};
use crate::cookies::registry::{DomainClass, DomainNode};
use crate::cookies::request::CookieRequest;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Why a single cookie was refused.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum RejectReason {
    #[error("Cookie header exceeds the maximum length")]
    HeaderTooLong,
    #[error("Cookie has no name")]
    EmptyName,
    #[error("Versioned cookie name starts with '$'")]
    ReservedName,
    #[error("Max-Age is not an integer")]
    InvalidMaxAge,
    #[error("Port attribute is not a list of port numbers")]
    InvalidPort,
    #[error("Request port is not in the cookie's port list")]
    PortMismatch,
    #[error("Domain attribute is empty")]
    EmptyDomain,
    #[error("Domain attribute is not a valid server name")]
    InvalidServerName,
    #[error("Domain attribute does not match the requesting host")]
    DomainMismatch,
    #[error("Domain attribute has fewer than two labels")]
    DomainTooShort,
    #[error("Domain attribute is a public suffix")]
    PublicSuffix,
    #[error("Domain attribute could not be verified")]
    UnverifiedDomain,
    #[error("Path attribute is not a prefix of the request path")]
    IllegalPath,
    #[error("Cookie prefix validation failed")]
    InvalidPrefix,
    #[error("Cookies are disabled")]
    CookiesDisabled,
    #[error("Third-party cookies are not accepted")]
    ThirdPartyBlocked,
    #[error("Set-Cookie2 cookies are disabled")]
    VersionedCookiesDisabled,
}

impl RejectReason {
    /// Silent rejections are treated as "no cookie was set" and are not
    /// reported anywhere.
    pub fn is_silent(&self) -> bool {
        matches!(self, RejectReason::InvalidServerName)
    }
}

/// What an asynchronous domain check has to answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferReason {
    /// Public-suffix classification of the cookie domain is not known yet.
    Classification,
    /// The cookie domain must be checked for DNS resolvability.
    DnsCheck,
}

/// Answer delivered to [`CookieEngine::resume`](crate::cookies::engine::CookieEngine::resume).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Classified(DomainClass),
    DnsResolved(bool),
}

/// Identifies a parked cookie within the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeferralId(u64);

impl DeferralId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A cookie parked until its domain check resolves.
///
/// Dropping the token drops the cookie without any side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeferredCookie {
    pub(crate) id: DeferralId,
    pub(crate) draft: CookieDraft,
    pub(crate) request: CookieRequest,
    pub(crate) stage: DomainStage,
    pub(crate) rest: PendingAttrs,
}

impl DeferredCookie {
    pub(crate) fn new(
        draft: CookieDraft,
        request: CookieRequest,
        stage: DomainStage,
        rest: PendingAttrs,
    ) -> Self {
        Self {
            id: DeferralId::next(),
            draft,
            request,
            stage,
            rest,
        }
    }

    pub fn id(&self) -> DeferralId {
        self.id
    }

    pub fn reason(&self) -> DeferReason {
        self.stage.reason
    }

    /// The domain whose classification or resolvability is awaited.
    pub fn domain(&self) -> &str {
        self.stage.node.name()
    }

    pub fn draft(&self) -> &CookieDraft {
        &self.draft
    }
}

/// Domain validation state captured when a cookie is parked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DomainStage {
    pub node: DomainNode,
    /// Cookie domain equals the requesting host.
    pub tied_to_host: bool,
    /// Domain attribute text after stripping dots and quotes.
    pub stripped: String,
    pub reason: DeferReason,
}

/// Attributes validated after the domain, owned so they outlive the header.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PendingAttrs {
    pub path: Option<String>,
    pub port: Option<PortAttr>,
}

/// Terminal (or terminal-for-now) state of one cookie header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieOutcome {
    /// Stored in the response batch.
    Accepted(CookieKey),
    /// Delete request to forward to the store as a tombstone.
    Deleted(CookieKey),
    /// Parked pending an asynchronous domain check.
    Deferred(DeferredCookie),
    Rejected(RejectReason),
}

impl CookieOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CookieOutcome::Accepted(_))
    }

    pub fn rejection(&self) -> Option<RejectReason> {
        match self {
            CookieOutcome::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Why a pipeline stage stopped early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Halt {
    Reject(RejectReason),
    Fatal(NetError),
}

impl From<RejectReason> for Halt {
    fn from(reason: RejectReason) -> Self {
        Halt::Reject(reason)
    }
}

impl From<NetError> for Halt {
    fn from(err: NetError) -> Self {
        Halt::Fatal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_invalid_server_name_is_silent() {
        assert!(RejectReason::InvalidServerName.is_silent());
        assert!(!RejectReason::DomainMismatch.is_silent());
    }

    #[test]
    fn test_deferral_ids_are_unique() {
        assert_ne!(DeferralId::next(), DeferralId::next());
    }
}
