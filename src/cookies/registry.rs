//! Domain tree handles and public-suffix classification.
//!
//! A [`DomainRegistry`] turns names into [`DomainNode`]s and says whether a
//! node is a public suffix. The registry is shared read-only between
//! responses; classification data is updated by its owner.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr};
use std::sync::Arc;

const MAX_NAME_LEN: usize = 253;
const MAX_LABEL_LEN: usize = 63;

/// Public-suffix classification of a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DomainClass {
    /// A name an individual party can register (or a name below one).
    Normal,
    /// Classification is being fetched; ask again later.
    PendingClassification,
    /// A public suffix such as `com` or `co.uk`.
    NotRegistrable,
}

/// A validated server name in the domain tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainNode {
    name: String,
    ip_literal: bool,
}

impl DomainNode {
    /// Parse a server name. Returns `None` for names that cannot be a server
    /// name (empty labels, illegal characters, too long).
    pub fn parse(name: &str) -> Option<Self> {
        let name = name.strip_suffix('.').unwrap_or(name).to_ascii_lowercase();
        if name.is_empty() || name.len() > MAX_NAME_LEN {
            return None;
        }

        let bare = name
            .strip_prefix('[')
            .and_then(|n| n.strip_suffix(']'))
            .unwrap_or(&name);
        if bare.parse::<Ipv4Addr>().is_ok() || bare.parse::<Ipv6Addr>().is_ok() {
            return Some(Self {
                name,
                ip_literal: true,
            });
        }

        let valid = name.split('.').all(|label| {
            !label.is_empty()
                && label.len() <= MAX_LABEL_LEN
                && label
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
        });
        valid.then_some(Self {
            name,
            ip_literal: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_ip_literal(&self) -> bool {
        self.ip_literal
    }

    /// Number of dot-separated labels. An address literal counts as one.
    pub fn label_count(&self) -> usize {
        if self.ip_literal {
            1
        } else {
            self.name.split('.').count()
        }
    }

    /// True when the node sits below some top-level name, i.e. it is neither
    /// an address literal nor a single-label host like `localhost`.
    pub fn is_hierarchical(&self) -> bool {
        !self.ip_literal && self.label_count() >= 2
    }

    pub fn top_label(&self) -> &str {
        if self.ip_literal {
            return &self.name;
        }
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    pub fn parent(&self) -> Option<DomainNode> {
        if self.ip_literal {
            return None;
        }
        self.name.split_once('.').map(|(_, rest)| Self {
            name: rest.to_string(),
            ip_literal: false,
        })
    }

    /// Longest domain suffix (in whole labels) shared with `other`.
    pub fn common_domain(&self, other: &DomainNode) -> Option<DomainNode> {
        if self.ip_literal || other.ip_literal {
            return (self == other).then(|| self.clone());
        }

        let shared = self
            .name
            .rsplit('.')
            .zip(other.name.rsplit('.'))
            .take_while(|(a, b)| a == b)
            .count();
        if shared == 0 {
            return None;
        }

        let labels: Vec<&str> = self.name.split('.').collect();
        Some(Self {
            name: labels[labels.len() - shared..].join("."),
            ip_literal: false,
        })
    }

    /// True when `self` is `other` or one of its ancestors.
    pub fn is_ancestor_or_self_of(&self, other: &DomainNode) -> bool {
        other.common_domain(self).as_ref() == Some(self)
    }
}

/// Read access to the domain tree and its public-suffix data.
pub trait DomainRegistry: Send + Sync {
    /// Resolve a node for `name`. `None` means the name is not a valid
    /// server name.
    fn node(&self, name: &str) -> Option<DomainNode> {
        DomainNode::parse(name)
    }

    /// Classify a node. `None` means no public-suffix data is configured and
    /// callers fall back to the built-in allow-list.
    fn classify(&self, node: &DomainNode) -> Option<DomainClass>;
}

impl<R: DomainRegistry + ?Sized> DomainRegistry for Arc<R> {
    fn node(&self, name: &str) -> Option<DomainNode> {
        (**self).node(name)
    }

    fn classify(&self, node: &DomainNode) -> Option<DomainClass> {
        (**self).classify(node)
    }
}

/// Registry without public-suffix data.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSuffixData;

impl DomainRegistry for NoSuffixData {
    fn classify(&self, _node: &DomainNode) -> Option<DomainClass> {
        None
    }
}

/// Registry whose classifications arrive asynchronously.
///
/// Unknown names report [`DomainClass::PendingClassification`] until the
/// owner records a result with [`SuffixCache::set_classification`].
#[derive(Debug, Clone, Default)]
pub struct SuffixCache {
    entries: Arc<DashMap<String, DomainClass>>,
}

impl SuffixCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_classification(&self, domain: &str, class: DomainClass) {
        self.entries.insert(domain.to_ascii_lowercase(), class);
    }

    pub fn forget(&self, domain: &str) {
        self.entries.remove(&domain.to_ascii_lowercase());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DomainRegistry for SuffixCache {
    fn classify(&self, node: &DomainNode) -> Option<DomainClass> {
        Some(
            self.entries
                .get(node.name())
                .map(|entry| *entry.value())
                .unwrap_or(DomainClass::PendingClassification),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> DomainNode {
        DomainNode::parse(name).unwrap()
    }

    #[test]
    fn test_parse_normalizes() {
        assert_eq!(node("WWW.Example.COM.").name(), "www.example.com");
    }

    #[test]
    fn test_parse_rejects_invalid_names() {
        assert!(DomainNode::parse("").is_none());
        assert!(DomainNode::parse("a..b").is_none());
        assert!(DomainNode::parse("exa mple.com").is_none());
        assert!(DomainNode::parse("ex!ample.com").is_none());
        assert!(DomainNode::parse(&"a".repeat(64)).is_none());
    }

    #[test]
    fn test_ip_literals() {
        let v4 = node("127.0.0.1");
        assert!(v4.is_ip_literal());
        assert_eq!(v4.label_count(), 1);
        assert!(!v4.is_hierarchical());
        assert!(v4.parent().is_none());
        assert!(node("[::1]").is_ip_literal());
    }

    #[test]
    fn test_single_label_not_hierarchical() {
        assert!(!node("localhost").is_hierarchical());
        assert!(node("example.com").is_hierarchical());
    }

    #[test]
    fn test_parent_chain() {
        let n = node("a.b.example.com");
        assert_eq!(n.parent().unwrap().name(), "b.example.com");
        assert!(node("com").parent().is_none());
    }

    #[test]
    fn test_common_domain() {
        let shop = node("shop.example.com");
        let www = node("www.example.com");
        assert_eq!(shop.common_domain(&www).unwrap().name(), "example.com");
        assert_eq!(
            shop.common_domain(&node("evil.com")).unwrap().name(),
            "com"
        );
        assert!(shop.common_domain(&node("example.org")).is_none());
        assert!(shop.common_domain(&node("127.0.0.1")).is_none());
    }

    #[test]
    fn test_common_domain_requires_whole_labels() {
        let a = node("myexample.com");
        let b = node("example.com");
        assert_eq!(a.common_domain(&b).unwrap().name(), "com");
        assert!(!b.is_ancestor_or_self_of(&a));
    }

    #[test]
    fn test_ancestor_or_self() {
        let domain = node("example.com");
        assert!(domain.is_ancestor_or_self_of(&node("a.example.com")));
        assert!(domain.is_ancestor_or_self_of(&domain));
        assert!(!node("a.example.com").is_ancestor_or_self_of(&domain));
    }

    #[test]
    fn test_suffix_cache_pending_until_set() {
        let cache = SuffixCache::new();
        let n = node("example.co.uk");
        assert_eq!(cache.classify(&n), Some(DomainClass::PendingClassification));
        cache.set_classification("Example.co.uk", DomainClass::Normal);
        assert_eq!(cache.classify(&n), Some(DomainClass::Normal));
        cache.forget("example.co.uk");
        assert!(cache.is_empty());
    }

    #[test]
    fn test_no_suffix_data() {
        assert_eq!(NoSuffixData.classify(&node("example.com")), None);
    }
}
