//! Cookie acceptance pipeline.
//!
//! One header value runs through tokenizing, attribute extraction, expiry,
//! domain, path, port and prefix checks, and finally conflict resolution
//! against the response batch. The first failing stage decides the outcome.

use crate::base::neterror::NetError;
use crate::cookies::attributes::{extract, PortAttr};
use crate::cookies::batch::PendingBatch;
use crate::cookies::domain::{resume_domain, validate_domain, DomainVerdict};
use crate::cookies::draft::{CookieDraft, NETSCAPE_VERSION};
use crate::cookies::expiry::resolve_expiry;
use crate::cookies::outcome::{
    CookieOutcome, DeferredCookie, Halt, PendingAttrs, RejectReason, Resolution,
};
use crate::cookies::path::validate_path;
use crate::cookies::policy::{CookieMode, CookiePolicy, PreferencePolicy};
use crate::cookies::port::validate_port;
use crate::cookies::psl::PslRegistry;
use crate::cookies::registry::DomainRegistry;
use crate::cookies::request::CookieRequest;
use crate::cookies::response::ResponseCookies;
use crate::cookies::tokenizer::{tokenize, Separator};
use crate::cookies::warning::{CookieWarning, TracingWarningSink, WarningSink};
use http::header::{HeaderMap, HeaderName, HeaderValue, SET_COOKIE};
use std::sync::Arc;

/// `Set-Cookie2` (RFC 2965). Not among the `http` crate's constants.
pub static SET_COOKIE2: HeaderName = HeaderName::from_static("set-cookie2");

/// Borrowed view of the engine's collaborators for the validators.
pub(crate) struct Collaborators<'a> {
    pub registry: &'a dyn DomainRegistry,
    pub policy: &'a dyn PreferencePolicy,
    pub warnings: &'a dyn WarningSink,
}

/// Validates cookie headers against the request that produced them.
///
/// The engine is stateless apart from its collaborators; all per-response
/// state lives in [`PendingBatch`] / [`ResponseCookies`]. Cheap to clone.
#[derive(Clone)]
pub struct CookieEngine {
    registry: Arc<dyn DomainRegistry>,
    policy: Arc<dyn PreferencePolicy>,
    warnings: Arc<dyn WarningSink>,
}

impl Default for CookieEngine {
    fn default() -> Self {
        Self::new(PslRegistry)
    }
}

impl std::fmt::Debug for CookieEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CookieEngine")
            .field("mode", &self.policy.cookie_mode())
            .finish_non_exhaustive()
    }
}

impl CookieEngine {
    pub fn new(registry: impl DomainRegistry + 'static) -> Self {
        Self {
            registry: Arc::new(registry),
            policy: Arc::new(CookiePolicy::default()),
            warnings: Arc::new(TracingWarningSink),
        }
    }

    pub fn with_policy(mut self, policy: impl PreferencePolicy + 'static) -> Self {
        self.policy = Arc::new(policy);
        self
    }

    pub fn with_warning_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.warnings = sink;
        self
    }

    pub fn policy(&self) -> &dyn PreferencePolicy {
        self.policy.as_ref()
    }

    fn env(&self) -> Collaborators<'_> {
        Collaborators {
            registry: self.registry.as_ref(),
            policy: self.policy.as_ref(),
            warnings: self.warnings.as_ref(),
        }
    }

    /// Validate one header value and merge the result into `batch`.
    ///
    /// Rejections are ordinary outcomes; only resource exhaustion is an
    /// error.
    ///
    /// # Example
    /// ```rust
    /// use cookiegate::cookies::batch::PendingBatch;
    /// use cookiegate::cookies::engine::CookieEngine;
    /// use cookiegate::cookies::request::CookieRequest;
    ///
    /// let engine = CookieEngine::default();
    /// let req = CookieRequest::new("www.example.com", 443, "/app/cart");
    /// let mut batch = PendingBatch::new();
    ///
    /// let outcome = engine
    ///     .process("sid=abc123; Domain=.example.com; Path=/app", &req, &mut batch)
    ///     .unwrap();
    /// assert!(outcome.is_accepted());
    /// assert_eq!(batch.iter().next().unwrap().domain, "example.com");
    /// ```
    pub fn process(
        &self,
        header: &str,
        req: &CookieRequest,
        batch: &mut PendingBatch,
    ) -> Result<CookieOutcome, NetError> {
        let result = self.run(header, req, batch);
        self.settle(result, req)
    }

    /// Continue a cookie parked by [`process`](Self::process) once its
    /// domain check has been answered.
    pub fn resume(
        &self,
        deferred: DeferredCookie,
        resolution: Resolution,
        batch: &mut PendingBatch,
    ) -> Result<CookieOutcome, NetError> {
        let req = deferred.request.clone();
        let result = self.run_resumed(deferred, resolution, batch);
        self.settle(result, &req)
    }

    /// Validate every cookie header of a response.
    ///
    /// `Set-Cookie2` values are processed before `Set-Cookie` values, so a
    /// Netscape cookie with the same identity replaces the versioned one.
    /// A header that fails hard is abandoned on its own and listed in
    /// [`ResponseCookies::failures`]; the other headers still count.
    pub fn process_response(&self, headers: &HeaderMap, req: &CookieRequest) -> ResponseCookies {
        let mut cookies = ResponseCookies::new(req.clone());

        let versioned = req.clone().version(1);
        for value in headers.get_all(&SET_COOKIE2) {
            self.process_into(value, &versioned, &mut cookies);
        }

        let netscape = req.clone().version(NETSCAPE_VERSION);
        for value in headers.get_all(SET_COOKIE) {
            self.process_into(value, &netscape, &mut cookies);
        }

        tracing::debug!(
            host = %req.host,
            accepted = cookies.batch().len(),
            deferred = cookies.deferred().len(),
            rejected = cookies.rejected(),
            failed = cookies.failures().len(),
            "processed response cookies"
        );
        cookies
    }

    fn process_into(&self, value: &HeaderValue, req: &CookieRequest, cookies: &mut ResponseCookies) {
        let header = String::from_utf8_lossy(value.as_bytes());
        let result = self
            .process(&header, req, cookies.batch_mut())
            .and_then(|outcome| cookies.record(outcome));
        if let Err(err) = result {
            cookies.record_failure(err);
        }
    }

    fn settle(
        &self,
        result: Result<CookieOutcome, Halt>,
        req: &CookieRequest,
    ) -> Result<CookieOutcome, NetError> {
        match result {
            Ok(outcome) => Ok(outcome),
            Err(Halt::Reject(reason)) => {
                if !reason.is_silent() {
                    tracing::debug!(host = %req.host, reason = %reason, "cookie rejected");
                }
                Ok(CookieOutcome::Rejected(reason))
            }
            Err(Halt::Fatal(err)) => {
                tracing::error!(host = %req.host, error = %err, "cookie processing failed");
                Err(err)
            }
        }
    }

    fn run(
        &self,
        header: &str,
        req: &CookieRequest,
        batch: &mut PendingBatch,
    ) -> Result<CookieOutcome, Halt> {
        if header.len() > self.policy.max_header_len() {
            return Err(RejectReason::HeaderTooLong.into());
        }
        if self.policy.cookie_mode() == CookieMode::None {
            return Err(RejectReason::CookiesDisabled.into());
        }
        if req.version > NETSCAPE_VERSION && !self.policy.versioned_cookies_enabled() {
            return Err(RejectReason::VersionedCookiesDisabled.into());
        }

        let params = tokenize(header, Separator::Semicolon)?;
        let (mut draft, attrs) = extract(&params, req)?;

        if req.third_party {
            self.third_party_gate(&mut draft, req)?;
        }

        resolve_expiry(&mut draft, &attrs, req.received_at);

        let env = self.env();
        match validate_domain(&mut draft, attrs.domain, req, &env)? {
            DomainVerdict::Accepted => {}
            DomainVerdict::Deferred(stage) => {
                tracing::debug!(
                    host = %req.host,
                    name = %draft.name,
                    domain = %stage.node.name(),
                    reason = ?stage.reason,
                    "cookie deferred"
                );
                let rest = PendingAttrs {
                    path: attrs.path.map(str::to_string),
                    port: attrs.port,
                };
                let deferred = DeferredCookie::new(draft, req.clone(), stage, rest);
                return Ok(CookieOutcome::Deferred(deferred));
            }
        }

        self.finish(draft, attrs.path, attrs.port, req, batch)
    }

    fn run_resumed(
        &self,
        deferred: DeferredCookie,
        resolution: Resolution,
        batch: &mut PendingBatch,
    ) -> Result<CookieOutcome, Halt> {
        let DeferredCookie {
            id,
            mut draft,
            request,
            stage,
            rest,
        } = deferred;

        let env = self.env();
        match resume_domain(&mut draft, stage, resolution, &request, &env)? {
            DomainVerdict::Accepted => {}
            DomainVerdict::Deferred(stage) => {
                // Still unresolved, park it again under the same id
                return Ok(CookieOutcome::Deferred(DeferredCookie {
                    id,
                    draft,
                    request,
                    stage,
                    rest,
                }));
            }
        }

        self.finish(draft, rest.path.as_deref(), rest.port, &request, batch)
    }

    fn finish(
        &self,
        mut draft: CookieDraft,
        path: Option<&str>,
        port: Option<PortAttr>,
        req: &CookieRequest,
        batch: &mut PendingBatch,
    ) -> Result<CookieOutcome, Halt> {
        validate_path(&mut draft, path, req, &self.env())?;
        validate_port(&mut draft, port, req.port)?;
        draft.validate_prefix(req.secure_channel)?;
        Ok(batch.resolve(draft)?)
    }

    fn third_party_gate(&self, draft: &mut CookieDraft, req: &CookieRequest) -> Result<(), Halt> {
        match self.policy.cookie_mode() {
            CookieMode::NoThirdParty | CookieMode::SendNotAcceptThirdParty | CookieMode::None => {
                return Err(RejectReason::ThirdPartyBlocked.into());
            }
            CookieMode::WarnThirdParty => {
                self.warnings.warn(CookieWarning::ThirdParty {
                    host: req.host.clone(),
                    name: draft.name.clone(),
                });
            }
            CookieMode::All => {}
        }
        draft.third_party_accepted = true;
        Ok(())
    }
}
