//! Maps tokenized parameters onto a [`CookieDraft`].

use crate::cookies::draft::CookieDraft;
use crate::cookies::outcome::{Halt, RejectReason};
use crate::cookies::request::CookieRequest;
use crate::cookies::tokenizer::{tokenize, unquote, Param, Separator};

/// Port attribute of a versioned cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortAttr {
    /// `Port` without a value (or `Port=""`): only the request port.
    RequestPort,
    /// Parsed list, in the order sent.
    List(Vec<u16>),
}

/// Attributes that later stages validate, kept as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes<'a> {
    pub domain: Option<&'a str>,
    pub path: Option<&'a str>,
    /// Saturated to the `i64` range.
    pub max_age: Option<i64>,
    pub expires: Option<&'a str>,
    pub port: Option<PortAttr>,
}

/// Build a draft from the header parameters.
///
/// The first parameter is the cookie's name/value pair; every later one is
/// an attribute. Unrecognized attributes are ignored.
pub(crate) fn extract<'a>(
    params: &[Param<'a>],
    req: &CookieRequest,
) -> Result<(CookieDraft, Attributes<'a>), Halt> {
    let (first, rest) = params.split_first().ok_or(RejectReason::EmptyName)?;
    let mut draft = CookieDraft::new(first.name, first.value.unwrap_or(""), req.version);
    draft.context_id = req.context_id;

    let mut attrs = Attributes::default();

    for param in rest {
        let value = param.value;
        match param.name.to_ascii_lowercase().as_str() {
            "domain" => attrs.domain = Some(value.unwrap_or("")),
            "path" => attrs.path = Some(value.unwrap_or("")),
            "expires" => attrs.expires = value,
            "max-age" => attrs.max_age = Some(parse_max_age(param.unquoted_value())?),
            "secure" => draft.secure = true,
            // Script-set cookies cannot mark themselves HttpOnly
            "httponly" => draft.http_only = req.set_from_http,
            "version" if req.version > 0 => {
                if let Some(v) = param
                    .unquoted_value()
                    .and_then(|v| v.trim().parse::<u32>().ok())
                {
                    draft.version = v.max(1);
                }
            }
            "comment" if req.version > 0 => {
                draft.comment = param.unquoted_value().map(str::to_string);
            }
            "commenturl" if req.version > 0 => {
                draft.comment_url = param.unquoted_value().map(str::to_string);
            }
            "discard" if req.version > 0 => draft.discard_at_exit = true,
            "port" if req.version > 0 => attrs.port = Some(parse_port_attr(param)?),
            _ => {}
        }
    }

    if draft.name.is_empty() {
        return Err(RejectReason::EmptyName.into());
    }
    if draft.is_versioned() && draft.name.starts_with('$') {
        return Err(RejectReason::ReservedName.into());
    }

    Ok((draft, attrs))
}

/// `^[+-]?[0-9]+$`, saturating on overflow.
fn parse_max_age(value: Option<&str>) -> Result<i64, RejectReason> {
    let value = value.map(str::trim).unwrap_or("");
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'+') => (false, &value[1..]),
        Some(b'-') => (true, &value[1..]),
        _ => (false, value),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(RejectReason::InvalidMaxAge);
    }

    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Ok(if negative { -magnitude } else { magnitude })
}

fn parse_port_attr(param: &Param<'_>) -> Result<PortAttr, Halt> {
    let raw = match param.value.map(unquote) {
        Some(raw) if !raw.trim().is_empty() => raw,
        _ => return Ok(PortAttr::RequestPort),
    };

    let entries = tokenize(raw, Separator::CommaNoAssign)?;
    let mut ports = Vec::with_capacity(entries.len());
    for entry in entries {
        let digits = entry.name.strip_prefix('+').unwrap_or(entry.name);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RejectReason::InvalidPort.into());
        }
        let port = digits
            .parse::<u16>()
            .map_err(|_| RejectReason::InvalidPort)?;
        ports.push(port);
    }

    Ok(PortAttr::List(ports))
}
