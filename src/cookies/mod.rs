//! Cookie acceptance and validation.
//!
//! Decides, for every `Set-Cookie` / `Set-Cookie2` header value of a
//! response, whether the cookie is accepted, rejected, or parked until an
//! asynchronous domain check completes.
//!
//! # Architecture
//!
//! | Stage | Module | Responsibility |
//! |-------|--------|----------------|
//! | Tokenize | [`tokenizer`] | Quote-aware `name=value` splitting |
//! | Extract | [`attributes`] | Map parameters onto a [`CookieDraft`](draft::CookieDraft) |
//! | Expiry | [`expiry`] | `Max-Age` / `Expires` to an absolute time |
//! | Domain | [`domain`] | Host match, public-suffix and bare-host rules |
//! | Path | [`path`] | Default path and prefix check |
//! | Port | [`port`] | `Port` list of versioned cookies |
//! | Conflict | [`batch`] | One cookie per identity within a response |
//!
//! [`CookieEngine`](engine::CookieEngine) drives the stages.
//! [`ResponseCookies`](response::ResponseCookies) collects the outcomes of a
//! whole response and commits them to a [`CookieStore`](monster::CookieStore)
//! such as [`CookieMonster`](monster::CookieMonster).
//!
//! # Collaborators
//!
//! - [`DomainRegistry`](registry::DomainRegistry): domain parsing and
//!   public-suffix classification ([`PslRegistry`](psl::PslRegistry),
//!   [`SuffixCache`](registry::SuffixCache), [`NoSuffixData`](registry::NoSuffixData))
//! - [`PreferencePolicy`](policy::PreferencePolicy): user preferences
//!   ([`CookiePolicy`](policy::CookiePolicy))
//! - [`WarningSink`](warning::WarningSink): diagnostics for suspicious cookies
//!
//! # Example
//!
//! ```rust
//! use cookiegate::cookies::engine::CookieEngine;
//! use cookiegate::cookies::monster::CookieMonster;
//! use cookiegate::cookies::request::CookieRequest;
//! use http::header::{HeaderMap, HeaderValue, SET_COOKIE};
//! use url::Url;
//!
//! let engine = CookieEngine::default();
//! let url = Url::parse("https://www.example.com/app/cart")?;
//! let req = CookieRequest::from_url(&url)?;
//!
//! let mut headers = HeaderMap::new();
//! headers.append(SET_COOKIE, HeaderValue::from_static("sid=abc123; Domain=.example.com; Path=/app"));
//! headers.append(SET_COOKIE, HeaderValue::from_static("bad=1; Domain=.com"));
//!
//! let cookies = engine.process_response(&headers, &req);
//! assert_eq!(cookies.rejected(), 1);
//!
//! let jar = CookieMonster::new();
//! assert_eq!(cookies.commit(&jar), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod attributes;
pub mod batch;
pub mod domain;
pub mod draft;
pub mod engine;
pub mod expiry;
pub mod monster;
pub mod outcome;
pub mod path;
pub mod policy;
pub mod port;
pub mod psl;
pub mod registry;
pub mod request;
pub mod response;
pub mod tokenizer;
pub mod warning;
