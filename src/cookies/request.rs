//! Request metadata a cookie header is validated against.

use crate::base::neterror::NetError;
use crate::cookies::draft::{ContextId, NETSCAPE_VERSION};
use time::OffsetDateTime;
use url::Url;

/// The request that produced a `Set-Cookie` / `Set-Cookie2` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieRequest {
    /// Lowercase host name (IPv6 literals keep their brackets).
    pub host: String,
    /// Resolved port (explicit or scheme default).
    pub port: u16,
    /// Request path, still percent-encoded, without query or fragment.
    pub path: String,
    pub third_party: bool,
    /// Whether the response arrived over TLS.
    pub secure_channel: bool,
    /// False for cookies set through a script API.
    pub set_from_http: bool,
    /// 0 for `Set-Cookie`, 1 or more for `Set-Cookie2`.
    pub version: u32,
    pub context_id: ContextId,
    /// Reference time for expiry computations.
    pub received_at: OffsetDateTime,
}

impl CookieRequest {
    pub fn new(host: impl Into<String>, port: u16, path: impl Into<String>) -> Self {
        Self {
            host: host.into().to_ascii_lowercase(),
            port,
            path: path.into(),
            third_party: false,
            secure_channel: false,
            set_from_http: true,
            version: NETSCAPE_VERSION,
            context_id: ContextId::default(),
            received_at: OffsetDateTime::now_utc(),
        }
    }

    /// Build the context from the request URL.
    ///
    /// # Example
    /// ```rust
    /// use cookiegate::cookies::request::CookieRequest;
    /// use url::Url;
    ///
    /// let url = Url::parse("https://shop.example.com/app/cart?id=1").unwrap();
    /// let req = CookieRequest::from_url(&url).unwrap();
    /// assert_eq!(req.host, "shop.example.com");
    /// assert_eq!(req.port, 443);
    /// assert_eq!(req.path, "/app/cart");
    /// assert!(req.secure_channel);
    /// ```
    pub fn from_url(url: &Url) -> Result<Self, NetError> {
        let host = url.host_str().ok_or(NetError::InvalidUrl)?;
        let port = url.port_or_known_default().ok_or(NetError::InvalidUrl)?;
        let mut req = Self::new(host, port, url.path());
        req.secure_channel = url.scheme() == "https" || url.scheme() == "wss";
        Ok(req)
    }

    pub fn third_party(mut self, third_party: bool) -> Self {
        self.third_party = third_party;
        self
    }

    pub fn secure_channel(mut self, secure: bool) -> Self {
        self.secure_channel = secure;
        self
    }

    pub fn set_from_http(mut self, from_http: bool) -> Self {
        self.set_from_http = from_http;
        self
    }

    /// Select the header protocol version (0 = `Set-Cookie`).
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn context_id(mut self, id: ContextId) -> Self {
        self.context_id = id;
        self
    }

    pub fn received_at(mut self, at: OffsetDateTime) -> Self {
        self.received_at = at;
        self
    }
}
