//! Public Suffix List (PSL) classification for cookie domain security.
//!
//! Prevents supercookie attacks by classifying public suffixes like `.com`
//! and `.co.uk` as not registrable.
//!
//! Uses Mozilla's Public Suffix List via the `psl` crate.

use crate::cookies::registry::{DomainClass, DomainNode, DomainRegistry};
use psl::{List, Psl};

/// Check if a domain is a public suffix (e.g., "com", "co.uk").
/// Returns true if the domain itself is a public suffix.
pub fn is_public_suffix(domain: &str) -> bool {
    let domain_lower = domain.to_lowercase();
    let domain_bytes = domain_lower.as_bytes();

    if let Some(suffix) = List.suffix(domain_bytes) {
        // The domain is a public suffix if it equals its own suffix
        suffix.as_bytes() == domain_bytes
    } else {
        false
    }
}

/// Registry backed by the compiled-in Public Suffix List.
///
/// Classification is always immediately available, so cookies validated
/// against this registry are never deferred.
#[derive(Debug, Default, Clone, Copy)]
pub struct PslRegistry;

impl DomainRegistry for PslRegistry {
    fn classify(&self, node: &DomainNode) -> Option<DomainClass> {
        if !node.is_ip_literal() && is_public_suffix(node.name()) {
            Some(DomainClass::NotRegistrable)
        } else {
            Some(DomainClass::Normal)
        }
    }
}
