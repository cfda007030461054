//! Cookie acceptance preferences.

use serde::{Deserialize, Serialize};

/// Global cookie handling mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CookieMode {
    /// Accept no cookies at all.
    None,
    /// Accept all cookies, including third-party ones.
    All,
    /// Accept first-party cookies only.
    NoThirdParty,
    /// Third-party resources may send existing cookies but cannot set new ones.
    #[default]
    SendNotAcceptThirdParty,
    /// Accept third-party cookies and report them to the warning sink.
    WarnThirdParty,
}

/// Knobs consumed verbatim by the validators.
pub trait PreferencePolicy: Send + Sync {
    fn cookie_mode(&self) -> CookieMode;
    /// Reject (instead of accepting with a warning) paths that are not a
    /// prefix of the request path.
    fn reject_illegal_paths(&self) -> bool;
    /// Allow deferring a cookie until a DNS resolvability check completes.
    fn dns_check_enabled(&self) -> bool;
    fn versioned_cookies_enabled(&self) -> bool;
    /// Header values longer than this are dropped whole.
    fn max_header_len(&self) -> usize;
}

/// Default maximum length of a single cookie header value.
pub const DEFAULT_MAX_HEADER_LEN: usize = 8 * 1024;

/// Cookie acceptance configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookiePolicy {
    pub mode: CookieMode,
    pub reject_illegal_paths: bool,
    pub dns_check_enabled: bool,
    pub versioned_cookies_enabled: bool,
    pub max_header_len: usize,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            mode: CookieMode::default(),
            reject_illegal_paths: false,
            dns_check_enabled: true,
            versioned_cookies_enabled: true,
            max_header_len: DEFAULT_MAX_HEADER_LEN,
        }
    }
}

impl CookiePolicy {
    /// Create a new policy with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cookie mode.
    pub fn mode(mut self, mode: CookieMode) -> Self {
        self.mode = mode;
        self
    }

    /// Reject cookies whose path is not a prefix of the request path.
    pub fn reject_illegal_paths(mut self, reject: bool) -> Self {
        self.reject_illegal_paths = reject;
        self
    }

    /// Enable or disable deferred DNS checks.
    pub fn dns_check_enabled(mut self, enabled: bool) -> Self {
        self.dns_check_enabled = enabled;
        self
    }

    /// Enable or disable `Set-Cookie2` processing.
    pub fn versioned_cookies_enabled(mut self, enabled: bool) -> Self {
        self.versioned_cookies_enabled = enabled;
        self
    }

    /// Set the maximum header length.
    pub fn max_header_len(mut self, len: usize) -> Self {
        self.max_header_len = len;
        self
    }
}

impl PreferencePolicy for CookiePolicy {
    fn cookie_mode(&self) -> CookieMode {
        self.mode
    }

    fn reject_illegal_paths(&self) -> bool {
        self.reject_illegal_paths
    }

    fn dns_check_enabled(&self) -> bool {
        self.dns_check_enabled
    }

    fn versioned_cookies_enabled(&self) -> bool {
        self.versioned_cookies_enabled
    }

    fn max_header_len(&self) -> usize {
        self.max_header_len
    }
}
