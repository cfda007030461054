//! Base types and error handling.
//!
//! Provides foundational types mirroring Chromium's `net/base/`:
//! - [`NetError`](neterror::NetError): hard error codes matching `net_error_list.h`
//! - [`LoadState`](loadstate::LoadState): cookie wait states of a response

pub mod context;
pub mod loadstate;
pub mod neterror;
