//! User-facing diagnostics for suspicious cookies.
//!
//! Warnings never change whether a cookie is accepted.

use std::sync::Mutex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieWarning {
    /// Path attribute is not a prefix of the request path.
    IllegalPath {
        host: String,
        name: String,
        path: String,
    },
    /// Domain attribute does not cover the requesting host.
    IllegalDomain {
        host: String,
        name: String,
        domain: String,
    },
    /// Two-label domain under an unknown top-level name, accepted unverified.
    UnverifiedDomain {
        host: String,
        name: String,
        domain: String,
    },
    /// Cookie set by a third-party resource.
    ThirdParty { host: String, name: String },
}

pub trait WarningSink: Send + Sync {
    fn warn(&self, warning: CookieWarning);
}

/// Emits warnings as `tracing` events.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingWarningSink;

impl WarningSink for TracingWarningSink {
    fn warn(&self, warning: CookieWarning) {
        match warning {
            CookieWarning::IllegalPath { host, name, path } => {
                tracing::warn!(host = %host, name = %name, path = %path, "cookie path is not a prefix of the request path");
            }
            CookieWarning::IllegalDomain { host, name, domain } => {
                tracing::warn!(host = %host, name = %name, domain = %domain, "cookie domain does not match host");
            }
            CookieWarning::UnverifiedDomain { host, name, domain } => {
                tracing::warn!(host = %host, name = %name, domain = %domain, "cookie domain accepted without verification");
            }
            CookieWarning::ThirdParty { host, name } => {
                tracing::warn!(host = %host, name = %name, "third-party cookie accepted");
            }
        }
    }
}

/// Collects warnings in memory.
#[derive(Debug, Default)]
pub struct RecordingWarningSink {
    warnings: Mutex<Vec<CookieWarning>>,
}

impl RecordingWarningSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<CookieWarning> {
        match self.warnings.lock() {
            Ok(mut w) => std::mem::take(&mut *w),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl WarningSink for RecordingWarningSink {
    fn warn(&self, warning: CookieWarning) {
        match self.warnings.lock() {
            Ok(mut w) => w.push(warning),
            Err(poisoned) => poisoned.into_inner().push(warning),
        }
    }
}
