/// What a response is waiting on before its cookies can be committed.
/// This roughly matches the cookie wait states of a browser load handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing is parked.
    #[default]
    Idle,

    /// Waiting for a public-suffix classification of a cookie domain.
    WaitingForCookies,

    /// Waiting for a DNS resolvability check of a cookie domain.
    WaitingForCookiesDns,
}
