//! Domain attribute validation.
//!
//! A cookie domain must be the requesting host or one of its ancestors, must
//! have at least two labels, and must not be a public suffix. Hosts outside
//! the domain hierarchy (address literals, single-label names) only get
//! cookies scoped to themselves.

use crate::cookies::draft::CookieDraft;
use crate::cookies::engine::Collaborators;
use crate::cookies::outcome::{DeferReason, DomainStage, RejectReason, Resolution};
use crate::cookies::registry::{DomainClass, DomainNode};
use crate::cookies::request::CookieRequest;
use crate::cookies::tokenizer::unquote;
use crate::cookies::warning::CookieWarning;

/// Top-level names under which a two-label domain is known to be registrable.
/// Used only when no public-suffix data is available.
pub const REGISTRABLE_TOP_LEVEL: [&str; 7] = ["com", "net", "org", "edu", "gov", "mil", "int"];

pub(crate) enum DomainVerdict {
    Accepted,
    Deferred(DomainStage),
}

pub(crate) fn validate_domain(
    draft: &mut CookieDraft,
    raw: Option<&str>,
    req: &CookieRequest,
    env: &Collaborators<'_>,
) -> Result<DomainVerdict, RejectReason> {
    let host_node = env
        .registry
        .node(&req.host)
        .filter(DomainNode::is_hierarchical);

    let Some(raw) = raw else {
        draft.domain = match host_node {
            Some(_) => req.host.clone(),
            None => format!("{}.local", req.host),
        };
        draft.only_this_server = true;
        return Ok(DomainVerdict::Accepted);
    };

    draft.received_domain = Some(raw.to_string());
    let stripped = unquote(raw).trim_start_matches('.').to_ascii_lowercase();
    if stripped.is_empty() {
        return Err(RejectReason::EmptyDomain);
    }

    let node = env
        .registry
        .node(&stripped)
        .ok_or(RejectReason::InvalidServerName)?;

    let Some(host_node) = host_node else {
        return bare_host(draft, &stripped, req, env);
    };

    if node.label_count() < 2 {
        illegal_domain(draft, &stripped, req, env);
        return Err(RejectReason::DomainTooShort);
    }
    if !node.is_ancestor_or_self_of(&host_node) {
        illegal_domain(draft, &stripped, req, env);
        return Err(RejectReason::DomainMismatch);
    }

    let stage = DomainStage {
        tied_to_host: node == host_node,
        node,
        stripped,
        reason: DeferReason::Classification,
    };
    let class = env.registry.classify(&stage.node);
    classify(draft, stage, class, req, env)
}

/// Continue validation of a parked cookie.
///
/// The answer must match the question the cookie was parked on. Any other
/// answer leaves it parked.
pub(crate) fn resume_domain(
    draft: &mut CookieDraft,
    stage: DomainStage,
    resolution: Resolution,
    req: &CookieRequest,
    env: &Collaborators<'_>,
) -> Result<DomainVerdict, RejectReason> {
    match (stage.reason, resolution) {
        (DeferReason::Classification, Resolution::Classified(class)) => {
            classify(draft, stage, Some(class), req, env)
        }
        (DeferReason::DnsCheck, Resolution::DnsResolved(true)) => Ok(accept(draft, &stage)),
        (DeferReason::DnsCheck, Resolution::DnsResolved(false)) => {
            unverified(draft, &stage, req, env)
        }
        (reason, resolution) => {
            tracing::debug!(
                host = %req.host,
                name = %draft.name,
                ?reason,
                ?resolution,
                "answer does not match deferral"
            );
            Ok(DomainVerdict::Deferred(stage))
        }
    }
}

fn classify(
    draft: &mut CookieDraft,
    mut stage: DomainStage,
    class: Option<DomainClass>,
    req: &CookieRequest,
    env: &Collaborators<'_>,
) -> Result<DomainVerdict, RejectReason> {
    match class {
        Some(DomainClass::Normal) => Ok(accept(draft, &stage)),
        Some(DomainClass::PendingClassification) => {
            draft.needs_dns_check = true;
            stage.reason = DeferReason::Classification;
            Ok(DomainVerdict::Deferred(stage))
        }
        Some(DomainClass::NotRegistrable) if stage.tied_to_host => Ok(accept(draft, &stage)),
        Some(DomainClass::NotRegistrable) if !draft.is_versioned() => {
            // Same-origin grant: keep the cookie, but only for this host
            draft.domain = req.host.clone();
            draft.only_this_server = true;
            draft.needs_dns_check = false;
            Ok(DomainVerdict::Accepted)
        }
        Some(DomainClass::NotRegistrable) => Err(RejectReason::PublicSuffix),
        None => allow_list(draft, stage, req, env),
    }
}

fn allow_list(
    draft: &mut CookieDraft,
    mut stage: DomainStage,
    req: &CookieRequest,
    env: &Collaborators<'_>,
) -> Result<DomainVerdict, RejectReason> {
    let node = &stage.node;
    if stage.tied_to_host
        || node.label_count() > 2
        || REGISTRABLE_TOP_LEVEL.contains(&node.top_label())
    {
        return Ok(accept(draft, &stage));
    }

    // Could be a public suffix like "co.uk"
    if env.policy.dns_check_enabled() {
        draft.needs_dns_check = true;
        stage.reason = DeferReason::DnsCheck;
        return Ok(DomainVerdict::Deferred(stage));
    }

    unverified(draft, &stage, req, env)
}

fn unverified(
    draft: &mut CookieDraft,
    stage: &DomainStage,
    req: &CookieRequest,
    env: &Collaborators<'_>,
) -> Result<DomainVerdict, RejectReason> {
    if !draft.is_versioned() {
        return Err(RejectReason::UnverifiedDomain);
    }

    env.warnings.warn(CookieWarning::UnverifiedDomain {
        host: req.host.clone(),
        name: draft.name.clone(),
        domain: stage.stripped.clone(),
    });
    Ok(accept(draft, stage))
}

fn accept(draft: &mut CookieDraft, stage: &DomainStage) -> DomainVerdict {
    draft.domain = stage.node.name().to_string();
    draft.only_this_server = false;
    draft.needs_dns_check = false;
    DomainVerdict::Accepted
}

fn bare_host(
    draft: &mut CookieDraft,
    stripped: &str,
    req: &CookieRequest,
    env: &Collaborators<'_>,
) -> Result<DomainVerdict, RejectReason> {
    let host = req.host.as_str();
    let matched = if draft.is_versioned() {
        stripped == "local"
            || stripped.strip_prefix("local.") == Some(host)
            || stripped.strip_suffix(".local") == Some(host)
    } else {
        stripped == host
    };

    if !matched {
        illegal_domain(draft, stripped, req, env);
        return Err(RejectReason::DomainMismatch);
    }

    draft.domain = if draft.is_versioned() {
        host.to_string()
    } else {
        format!("{host}.local")
    };
    draft.only_this_server = true;
    Ok(DomainVerdict::Accepted)
}

fn illegal_domain(draft: &CookieDraft, stripped: &str, req: &CookieRequest, env: &Collaborators<'_>) {
    env.warnings.warn(CookieWarning::IllegalDomain {
        host: req.host.clone(),
        name: draft.name.clone(),
        domain: stripped.to_string(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cookies::policy::CookiePolicy;
    use crate::cookies::psl::PslRegistry;
    use crate::cookies::registry::{DomainRegistry, NoSuffixData, SuffixCache};
    use crate::cookies::warning::RecordingWarningSink;

    struct Fixture<R> {
        registry: R,
        policy: CookiePolicy,
        warnings: RecordingWarningSink,
    }

    impl<R: DomainRegistry> Fixture<R> {
        fn new(registry: R) -> Self {
            Self {
                registry,
                policy: CookiePolicy::default(),
                warnings: RecordingWarningSink::new(),
            }
        }

        fn env(&self) -> Collaborators<'_> {
            Collaborators {
                registry: &self.registry,
                policy: &self.policy,
                warnings: &self.warnings,
            }
        }

        fn run(
            &self,
            host: &str,
            domain: Option<&str>,
            version: u32,
        ) -> (CookieDraft, Result<DomainVerdict, RejectReason>) {
            let req = CookieRequest::new(host, 80, "/").version(version);
            let mut draft = CookieDraft::new("id", "1", version);
            let verdict = validate_domain(&mut draft, domain, &req, &self.env());
            (draft, verdict)
        }
    }

    fn accepted(result: &Result<DomainVerdict, RejectReason>) -> bool {
        matches!(result, Ok(DomainVerdict::Accepted))
    }

    #[test]
    fn test_no_domain_attribute_is_host_only() {
        let f = Fixture::new(PslRegistry);
        let (draft, verdict) = f.run("www.example.com", None, 0);
        assert!(accepted(&verdict));
        assert_eq!(draft.domain, "www.example.com");
        assert!(draft.only_this_server);
        assert!(draft.received_domain.is_none());
    }

    #[test]
    fn test_no_domain_attribute_bare_host() {
        let f = Fixture::new(PslRegistry);
        let (draft, _) = f.run("127.0.0.1", None, 0);
        assert_eq!(draft.domain, "127.0.0.1.local");
        let (draft, _) = f.run("localhost", None, 1);
        assert_eq!(draft.domain, "localhost.local");
        assert!(draft.only_this_server);
    }

    #[test]
    fn test_exact_host_domain() {
        let f = Fixture::new(PslRegistry);
        let (draft, verdict) = f.run("example.com", Some("example.com"), 0);
        assert!(accepted(&verdict));
        assert_eq!(draft.domain, "example.com");
        assert!(!draft.only_this_server);
    }

    #[test]
    fn test_parent_domain_strips_leading_dot() {
        let f = Fixture::new(PslRegistry);
        let (draft, verdict) = f.run("www.example.com", Some(".example.com"), 0);
        assert!(accepted(&verdict));
        assert_eq!(draft.domain, "example.com");
        assert_eq!(draft.received_domain.as_deref(), Some(".example.com"));
    }

    #[test]
    fn test_quoted_domain() {
        let f = Fixture::new(PslRegistry);
        let (draft, verdict) = f.run("www.example.com", Some("\".Example.com\""), 1);
        assert!(accepted(&verdict));
        assert_eq!(draft.domain, "example.com");
    }

    #[test]
    fn test_unrelated_domain_rejected() {
        let f = Fixture::new(PslRegistry);
        let (_, verdict) = f.run("example.com", Some("evil.com"), 0);
        assert_eq!(verdict.err(), Some(RejectReason::DomainMismatch));
        assert_eq!(f.warnings.take().len(), 1);
    }

    #[test]
    fn test_subdomain_of_host_rejected() {
        let f = Fixture::new(PslRegistry);
        let (_, verdict) = f.run("example.com", Some("sub.example.com"), 0);
        assert_eq!(verdict.err(), Some(RejectReason::DomainMismatch));
    }

    #[test]
    fn test_label_boundary_respected() {
        let f = Fixture::new(PslRegistry);
        let (_, verdict) = f.run("myexample.com", Some("example.com"), 0);
        assert_eq!(verdict.err(), Some(RejectReason::DomainMismatch));
    }

    #[test]
    fn test_single_label_domain_rejected() {
        let f = Fixture::new(PslRegistry);
        let (_, verdict) = f.run("example.com", Some(".com"), 0);
        assert_eq!(verdict.err(), Some(RejectReason::DomainTooShort));
    }

    #[test]
    fn test_empty_and_invalid_domain() {
        let f = Fixture::new(PslRegistry);
        let (_, verdict) = f.run("example.com", Some("..."), 0);
        assert_eq!(verdict.err(), Some(RejectReason::EmptyDomain));
        let (_, verdict) = f.run("example.com", Some("exa mple.com"), 0);
        assert_eq!(verdict.err(), Some(RejectReason::InvalidServerName));
        assert!(f.warnings.take().is_empty());
    }

    #[test]
    fn test_public_suffix_versioned_rejected() {
        let f = Fixture::new(PslRegistry);
        let (_, verdict) = f.run("www.example.co.uk", Some(".co.uk"), 1);
        assert_eq!(verdict.err(), Some(RejectReason::PublicSuffix));
    }

    #[test]
    fn test_public_suffix_netscape_same_origin_grant() {
        let f = Fixture::new(PslRegistry);
        let (draft, verdict) = f.run("user.github.io", Some("github.io"), 0);
        assert!(accepted(&verdict));
        assert_eq!(draft.domain, "user.github.io");
        assert!(draft.only_this_server);
    }

    #[test]
    fn test_public_suffix_host_itself() {
        let f = Fixture::new(PslRegistry);
        let (draft, verdict) = f.run("github.io", Some("github.io"), 1);
        assert!(accepted(&verdict));
        assert_eq!(draft.domain, "github.io");
    }

    #[test]
    fn test_bare_ip_netscape() {
        let f = Fixture::new(PslRegistry);
        let (draft, verdict) = f.run("127.0.0.1", Some("127.0.0.1"), 0);
        assert!(accepted(&verdict));
        assert_eq!(draft.domain, "127.0.0.1.local");
        assert!(draft.only_this_server);

        for other in ["0.0.1", "127.0.0.2", "local", "localhost"] {
            let (_, verdict) = f.run("127.0.0.1", Some(other), 0);
            assert_eq!(verdict.err(), Some(RejectReason::DomainMismatch), "{other}");
        }
    }

    #[test]
    fn test_bare_host_versioned() {
        let f = Fixture::new(PslRegistry);
        for ok in [".local", "local.intranet", "intranet.local"] {
            let (draft, verdict) = f.run("intranet", Some(ok), 1);
            assert!(accepted(&verdict), "{ok}");
            assert_eq!(draft.domain, "intranet");
            assert!(draft.only_this_server);
        }
        let (_, verdict) = f.run("intranet", Some("intranet"), 1);
        assert_eq!(verdict.err(), Some(RejectReason::DomainMismatch));
    }

    #[test]
    fn test_pending_classification_defers() {
        let f = Fixture::new(SuffixCache::new());
        let (draft, verdict) = f.run("www.example.co.uk", Some("example.co.uk"), 0);
        match verdict {
            Ok(DomainVerdict::Deferred(stage)) => {
                assert_eq!(stage.reason, DeferReason::Classification);
                assert_eq!(stage.node.name(), "example.co.uk");
                assert!(!stage.tied_to_host);
            }
            _ => panic!("expected deferral"),
        }
        assert!(draft.needs_dns_check);
    }

    #[test]
    fn test_resume_with_classification() {
        let f = Fixture::new(SuffixCache::new());
        let req = CookieRequest::new("www.example.co.uk", 80, "/");
        let mut draft = CookieDraft::new("id", "1", 0);
        let Ok(DomainVerdict::Deferred(stage)) =
            validate_domain(&mut draft, Some("example.co.uk"), &req, &f.env())
        else {
            panic!("expected deferral");
        };

        let verdict = resume_domain(
            &mut draft,
            stage,
            Resolution::Classified(DomainClass::Normal),
            &req,
            &f.env(),
        );
        assert!(accepted(&verdict));
        assert_eq!(draft.domain, "example.co.uk");
        assert!(!draft.needs_dns_check);
    }

    #[test]
    fn test_resume_with_wrong_answer_stays_deferred() {
        let f = Fixture::new(SuffixCache::new());
        let req = CookieRequest::new("shop.co.uk", 80, "/").version(1);
        let mut draft = CookieDraft::new("a", "1", 1);
        let Ok(DomainVerdict::Deferred(stage)) =
            validate_domain(&mut draft, Some("co.uk"), &req, &f.env())
        else {
            panic!("expected deferral");
        };
        assert_eq!(stage.reason, DeferReason::Classification);

        for answer in [Resolution::DnsResolved(false), Resolution::DnsResolved(true)] {
            let verdict = resume_domain(&mut draft, stage.clone(), answer, &req, &f.env());
            match verdict {
                Ok(DomainVerdict::Deferred(again)) => assert_eq!(again, stage),
                _ => panic!("{answer:?} settled a classification deferral"),
            }
            assert_ne!(draft.domain, "co.uk");
        }
        assert!(f.warnings.take().is_empty());

        let verdict = resume_domain(
            &mut draft,
            stage,
            Resolution::Classified(DomainClass::NotRegistrable),
            &req,
            &f.env(),
        );
        assert_eq!(verdict.err(), Some(RejectReason::PublicSuffix));
    }

    #[test]
    fn test_classification_answer_ignored_for_dns_deferral() {
        let f = Fixture::new(NoSuffixData);
        let req = CookieRequest::new("www.example.co", 80, "/");
        let mut draft = CookieDraft::new("a", "1", 0);
        let Ok(DomainVerdict::Deferred(stage)) =
            validate_domain(&mut draft, Some("example.co"), &req, &f.env())
        else {
            panic!("expected deferral");
        };
        assert_eq!(stage.reason, DeferReason::DnsCheck);

        let verdict = resume_domain(
            &mut draft,
            stage,
            Resolution::Classified(DomainClass::Normal),
            &req,
            &f.env(),
        );
        assert!(matches!(verdict, Ok(DomainVerdict::Deferred(ref s)) if s.reason == DeferReason::DnsCheck));
        assert!(draft.needs_dns_check);
    }

    #[test]
    fn test_allow_list_without_suffix_data() {
        let f = Fixture::new(NoSuffixData);
        let (draft, verdict) = f.run("shop.example.com", Some(".example.com"), 0);
        assert!(accepted(&verdict));
        assert_eq!(draft.domain, "example.com");

        let (_, verdict) = f.run("a.b.example.co.uk", Some("example.co.uk"), 0);
        assert!(accepted(&verdict));
    }

    #[test]
    fn test_two_label_unknown_top_level_defers_for_dns() {
        let f = Fixture::new(NoSuffixData);
        let (_, verdict) = f.run("www.example.co.uk", Some("co.uk"), 0);
        match verdict {
            Ok(DomainVerdict::Deferred(stage)) => assert_eq!(stage.reason, DeferReason::DnsCheck),
            _ => panic!("expected DNS deferral"),
        }
    }

    #[test]
    fn test_two_label_unknown_top_level_without_dns() {
        let mut f = Fixture::new(NoSuffixData);
        f.policy = CookiePolicy::new().dns_check_enabled(false);

        let (_, verdict) = f.run("www.example.co.uk", Some("co.uk"), 0);
        assert_eq!(verdict.err(), Some(RejectReason::UnverifiedDomain));

        let (draft, verdict) = f.run("www.example.co.uk", Some("co.uk"), 1);
        assert!(accepted(&verdict));
        assert_eq!(draft.domain, "co.uk");
        assert!(matches!(
            f.warnings.take().as_slice(),
            [CookieWarning::UnverifiedDomain { .. }]
        ));
    }

    #[test]
    fn test_two_label_unknown_top_level_exact_host() {
        let f = Fixture::new(NoSuffixData);
        let (_, verdict) = f.run("opera.no", Some("opera.no"), 0);
        assert!(accepted(&verdict));
    }
}
