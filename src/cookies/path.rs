//! Path attribute validation.

use crate::cookies::draft::CookieDraft;
use crate::cookies::engine::Collaborators;
use crate::cookies::outcome::RejectReason;
use crate::cookies::request::CookieRequest;
use crate::cookies::tokenizer::unquote;
use crate::cookies::warning::CookieWarning;
use percent_encoding::percent_decode_str;
use std::borrow::Cow;

pub(crate) fn validate_path(
    draft: &mut CookieDraft,
    raw: Option<&str>,
    req: &CookieRequest,
    env: &Collaborators<'_>,
) -> Result<(), RejectReason> {
    draft.received_path = raw.map(str::to_string);

    let explicit = raw
        .map(unquote)
        .map(strip_query)
        .filter(|p| p.starts_with('/'));

    let resolved = match explicit {
        Some(path) => {
            if !is_path_prefix(path, &req.path) {
                draft.illegal_path = true;
                if env.policy.reject_illegal_paths() {
                    return Err(RejectReason::IllegalPath);
                }
                env.warnings.warn(CookieWarning::IllegalPath {
                    host: req.host.clone(),
                    name: draft.name.clone(),
                    path: path.to_string(),
                });
            }
            path
        }
        None => default_path(&req.path),
    };

    let stored = &resolved[1..];
    draft.full_path_only = stored.ends_with('/');
    draft.path = stored.to_string();
    Ok(())
}

/// Directory of the request path, keeping the trailing slash.
/// `/app/cart` gives `/app/`, `/index.html` gives `/`.
pub fn default_path(request_path: &str) -> &str {
    let path = strip_query(request_path);
    if !path.starts_with('/') {
        return "/";
    }
    match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    }
}

/// Byte-wise prefix test on the percent-decoded paths. `/` always matches.
pub fn is_path_prefix(cookie_path: &str, request_path: &str) -> bool {
    if cookie_path == "/" {
        return true;
    }
    let cookie_path: Cow<'_, [u8]> = percent_decode_str(cookie_path).into();
    let request_path: Cow<'_, [u8]> = percent_decode_str(strip_query(request_path)).into();
    request_path.starts_with(&cookie_path)
}

fn strip_query(path: &str) -> &str {
    match path.find(['?', '#']) {
        Some(idx) => &path[..idx],
        None => path,
    }
}
