//! # cookiegate
//!
//! Browser-grade cookie acceptance for Rust.
//!
//! `cookiegate` decides which cookies a user agent keeps from an HTTP
//! response. It parses `Set-Cookie` (Netscape) and `Set-Cookie2` (RFC 2965)
//! headers and applies the domain, path, port and public-suffix rules a
//! browser applies before anything reaches the cookie jar.
//!
//! ## Features
//!
//! - **Parsing**: Quote-aware tokenizer, lenient cookie dates, `Max-Age` quirks
//! - **Domain Policy**: Public Suffix List classification, bare-host rules, DNS deferral
//! - **Path / Port Policy**: Default paths, illegal-path warnings, RFC 2965 port lists
//! - **Conflict Resolution**: One cookie per identity per response, delete tombstones
//! - **Cookie Modes**: Third-party blocking, `__Secure-` / `__Host-` prefixes
//!
//! ## Quick Start
//!
//! ```rust
//! use cookiegate::cookies::batch::PendingBatch;
//! use cookiegate::cookies::engine::CookieEngine;
//! use cookiegate::cookies::request::CookieRequest;
//!
//! let engine = CookieEngine::default();
//! let req = CookieRequest::new("www.example.com", 443, "/app/cart");
//! let mut batch = PendingBatch::new();
//!
//! let outcome = engine.process("sid=abc123; Domain=.com", &req, &mut batch).unwrap();
//! assert!(!outcome.is_accepted());
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Core types and error definitions
//! - [`cookies`] - Cookie parsing, validation and storage
//!
//! ## Security
//!
//! - Public Suffix List validation to prevent supercookie attacks
//! - Third-party cookie blocking by default
//! - Cookie name prefixes enforced against the channel security

pub mod base;
pub mod cookies;
