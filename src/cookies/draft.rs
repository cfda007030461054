use crate::cookies::outcome::RejectReason;
use percent_encoding::percent_decode_str;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use time::OffsetDateTime;

/// Identifies an isolated cookie storage partition (e.g. a private window).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ContextId(pub u32);

/// Cookie protocol version of a `Set-Cookie` (Netscape) header.
pub const NETSCAPE_VERSION: u32 = 0;

/// A cookie while (and after) it is validated for one response.
///
/// Created from a single header value and mutated only during the parse
/// pass. Once accepted it is the record handed to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CookieDraft {
    pub name: String,
    pub value: String,
    /// Resolved domain, without leading dots.
    pub domain: String,
    /// Domain attribute text exactly as sent.
    pub received_domain: Option<String>,
    /// Resolved path, stored without the leading slash (root is `""`).
    pub path: String,
    /// Path attribute text exactly as sent.
    pub received_path: Option<String>,
    /// Ascending, deduplicated. Empty when the cookie is not port-restricted.
    pub port_list: Vec<u16>,
    pub only_this_server: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub expires_at: Option<OffsetDateTime>,
    pub version: u32,
    pub secure: bool,
    pub http_only: bool,
    pub discard_at_exit: bool,
    pub full_path_only: bool,
    pub illegal_path: bool,
    pub third_party_accepted: bool,
    pub needs_dns_check: bool,
    pub delete_requested: bool,
    pub comment: Option<String>,
    pub comment_url: Option<String>,
    pub context_id: ContextId,
}

impl CookieDraft {
    pub fn new(name: impl Into<String>, value: impl Into<String>, version: u32) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: String::new(),
            received_domain: None,
            path: String::new(),
            received_path: None,
            port_list: Vec::new(),
            only_this_server: false,
            expires_at: None,
            version,
            secure: false,
            http_only: false,
            discard_at_exit: false,
            full_path_only: false,
            illegal_path: false,
            third_party_accepted: false,
            needs_dns_check: false,
            delete_requested: false,
            comment: None,
            comment_url: None,
            context_id: ContextId::default(),
        }
    }

    /// True for `Set-Cookie2` (RFC 2965) cookies.
    pub fn is_versioned(&self) -> bool {
        self.version > NETSCAPE_VERSION
    }

    /// Session cookies have no expiry and die with the browsing session.
    pub fn is_session(&self) -> bool {
        self.expires_at.is_none()
    }

    pub fn is_expired(&self, current_time: OffsetDateTime) -> bool {
        self.expires_at.is_some_and(|expiry| expiry < current_time)
    }

    /// The path as it appears in a request, e.g. `"/app"` (root is `"/"`).
    pub fn served_path(&self) -> String {
        format!("/{}", self.path)
    }

    /// Validate `__Secure-` and `__Host-` cookie name prefixes.
    /// - `__Secure-` cookies MUST have the Secure attribute
    /// - `__Host-` cookies MUST have Secure, a root path and no Domain attribute
    pub fn validate_prefix(&self, secure_origin: bool) -> Result<(), RejectReason> {
        if self.name.starts_with("__Secure-") && (!self.secure || !secure_origin) {
            return Err(RejectReason::InvalidPrefix);
        }

        if self.name.starts_with("__Host-")
            && (!self.secure
                || !self.path.is_empty()
                || self.received_domain.is_some()
                || !secure_origin)
        {
            return Err(RejectReason::InvalidPrefix);
        }

        Ok(())
    }

    /// Same (domain, name, path) identity within the same partition.
    pub fn same_identity(&self, other: &CookieDraft) -> bool {
        identity_eq(
            (self.domain.as_str(), self.name.as_str(), self.path.as_str(), self.context_id),
            (other.domain.as_str(), other.name.as_str(), other.path.as_str(), other.context_id),
        )
    }

    pub fn key(&self) -> CookieKey {
        CookieKey {
            domain: self.domain.clone(),
            name: self.name.clone(),
            path: self.path.clone(),
            context_id: self.context_id,
        }
    }
}

/// Identity of a cookie for conflict resolution and deletion.
#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct CookieKey {
    pub domain: String,
    pub name: String,
    pub path: String,
    pub context_id: ContextId,
}

impl CookieKey {
    /// Domain compares ASCII case-insensitively, the name case-sensitively
    /// after percent-decoding, the path exactly.
    pub fn matches(&self, other: &CookieKey) -> bool {
        identity_eq(
            (self.domain.as_str(), self.name.as_str(), self.path.as_str(), self.context_id),
            (other.domain.as_str(), other.name.as_str(), other.path.as_str(), other.context_id),
        )
    }
}

impl PartialEq for CookieKey {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

type Identity<'a> = (&'a str, &'a str, &'a str, ContextId);

fn identity_eq(a: Identity<'_>, b: Identity<'_>) -> bool {
    a.3 == b.3 && a.0.eq_ignore_ascii_case(b.0) && a.2 == b.2 && decoded(a.1) == decoded(b.1)
}

fn decoded(s: &str) -> Cow<'_, [u8]> {
    percent_decode_str(s).into()
}
