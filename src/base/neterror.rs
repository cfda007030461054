use thiserror::Error;

/// Hard failures surfaced by the cookie engine.
///
/// Policy rejections are not errors: they are reported through
/// [`CookieOutcome::Rejected`](crate::cookies::outcome::CookieOutcome::Rejected).
/// A `NetError` means the whole header (or response) could not be processed.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum NetError {
    #[error("Out of memory")]
    OutOfMemory,
    #[error("Invalid URL")]
    InvalidUrl,
    #[error("Unknown deferred cookie")]
    UnknownDeferredCookie,

    #[error("Unknown error: {0}")]
    Unknown(i32),
}

impl NetError {
    pub fn as_i32(&self) -> i32 {
        match self {
            NetError::OutOfMemory => -13,
            NetError::InvalidUrl => -300,
            // Custom codes start at -900
            NetError::UnknownDeferredCookie => -905,
            NetError::Unknown(code) => *code,
        }
    }
}

impl From<i32> for NetError {
    fn from(code: i32) -> Self {
        match code {
            -13 => NetError::OutOfMemory,
            -300 => NetError::InvalidUrl,
            -905 => NetError::UnknownDeferredCookie,
            _ => NetError::Unknown(code),
        }
    }
}
