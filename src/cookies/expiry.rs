//! Absolute expiry from `Max-Age` / `Expires`.
//!
//! Time contract: `time::OffsetDateTime` (64-bit seconds, years up to 9999).
//! Anything that would land beyond that range becomes a session cookie.

use crate::cookies::attributes::Attributes;
use crate::cookies::draft::CookieDraft;
use time::format_description::well_known::Rfc2822;
use time::macros::format_description;
use time::parsing::Parsed;
use time::{Date, Duration, Month, OffsetDateTime, PrimitiveDateTime, Time, UtcOffset};

/// Legacy quirk: this exact Max-Age means "session cookie".
pub const SESSION_MAX_AGE: i64 = i32::MAX as i64;

pub(crate) fn resolve_expiry(draft: &mut CookieDraft, attrs: &Attributes<'_>, now: OffsetDateTime) {
    if let Some(max_age) = attrs.max_age {
        if max_age <= 0 {
            draft.delete_requested = true;
        } else if max_age == SESSION_MAX_AGE {
            draft.expires_at = None;
        } else if let Some(at) = now.checked_add(Duration::seconds(max_age)) {
            draft.delete_requested = at <= now;
            draft.expires_at = Some(at);
        } else {
            tracing::trace!(name = %draft.name, max_age, "max-age overflows, using session cookie");
            draft.expires_at = None;
        }
        return;
    }

    if draft.is_versioned() {
        return;
    }

    if let Some(at) = attrs.expires.and_then(parse_cookie_date) {
        draft.delete_requested = at < now;
        draft.expires_at = Some(at);
    }
}

/// Parse an `Expires` value.
///
/// The HTTP-date forms (IMF-fixdate, RFC 850, asctime) and RFC 2822 dates
/// are tried first. Anything else goes through the lenient cookie-date scan
/// of RFC 6265 section 5.1.1. Years before 1601 are refused.
pub fn parse_cookie_date(input: &str) -> Option<OffsetDateTime> {
    let input = input.trim().trim_matches('"');
    parse_http_date(input)
        .or_else(|| scan_cookie_date(input))
        .filter(|at| at.year() >= 1601)
}

fn parse_http_date(input: &str) -> Option<OffsetDateTime> {
    if let Ok(at) = PrimitiveDateTime::parse(
        input,
        format_description!(
            "[weekday repr:short case_sensitive:false], [day] [month repr:short case_sensitive:false] [year] [hour]:[minute]:[second] GMT"
        ),
    ) {
        return Some(at.assume_utc());
    }

    if let Some(at) = parse_rfc850(input) {
        return Some(at);
    }

    if let Ok(at) = PrimitiveDateTime::parse(
        input,
        format_description!(
            "[weekday repr:short case_sensitive:false] [month repr:short case_sensitive:false] [day padding:space] [hour]:[minute]:[second] [year]"
        ),
    ) {
        return Some(at.assume_utc());
    }

    // RFC 2822 maps two-digit years differently, leave those to the scan
    if !has_full_year(input) {
        return None;
    }
    OffsetDateTime::parse(input, &Rfc2822)
        .ok()
        .map(|at| at.to_offset(UtcOffset::UTC))
}

/// `Weekday, DD-Mon-YY HH:MM:SS GMT`
fn parse_rfc850(input: &str) -> Option<OffsetDateTime> {
    let mut parsed = Parsed::new();
    let rest = parsed
        .parse_items(
            input.as_bytes(),
            format_description!(
                "[weekday case_sensitive:false], [day]-[month repr:short case_sensitive:false]-[year repr:last_two] [hour]:[minute]:[second] GMT"
            ),
        )
        .ok()?;
    if !rest.is_empty() {
        return None;
    }

    let year = expand_year(i32::from(parsed.year_last_two()?));
    parsed.set_year(year)?;
    PrimitiveDateTime::try_from(parsed)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

fn has_full_year(input: &str) -> bool {
    input
        .split(is_delimiter)
        .any(|t| t.len() == 4 && t.bytes().all(|b| b.is_ascii_digit()))
}

/// Two-digit years: 70-99 are 19xx, 00-69 are 20xx.
fn expand_year(year: i32) -> i32 {
    match year {
        70..=99 => year + 1900,
        0..=69 => year + 2000,
        _ => year,
    }
}

/// Token scan for dates none of the fixed formats accept.
fn scan_cookie_date(input: &str) -> Option<OffsetDateTime> {
    let mut time: Option<(u8, u8, u8)> = None;
    let mut day: Option<u8> = None;
    let mut month: Option<Month> = None;
    let mut year: Option<i32> = None;

    for token in input.split(is_delimiter).filter(|t| !t.is_empty()) {
        if time.is_none() {
            if let Some(t) = parse_time(token) {
                time = Some(t);
                continue;
            }
        }
        if day.is_none() {
            if let Some(d) = leading_digits(token, 1, 2) {
                day = Some(d as u8);
                continue;
            }
        }
        if month.is_none() {
            if let Some(m) = parse_month(token) {
                month = Some(m);
                continue;
            }
        }
        if year.is_none() {
            if let Some(y) = leading_digits(token, 2, 4) {
                year = Some(y as i32);
            }
        }
    }

    let (hour, minute, second) = time?;
    let year = expand_year(year?);
    let day = day?;
    if !(1..=31).contains(&day) || hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    let date = Date::from_calendar_date(year, month?, day).ok()?;
    let time = Time::from_hms(hour, minute, second).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc())
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '\x09' | '\x20'..='\x2f' | '\x3b'..='\x40' | '\x5b'..='\x60' | '\x7b'..='\x7e')
}

/// `min..=max` leading digits, optionally followed by non-digits.
fn leading_digits(token: &str, min: usize, max: usize) -> Option<u32> {
    let len = token.bytes().take_while(u8::is_ascii_digit).count();
    if len < min || len > max {
        return None;
    }
    token[..len].parse().ok()
}

fn parse_time(token: &str) -> Option<(u8, u8, u8)> {
    let mut parts = token.splitn(3, ':');
    let hour = parts.next()?;
    let minute = parts.next()?;
    let second = parts.next()?;

    let field = |s: &str, trailing_ok: bool| -> Option<u8> {
        let len = s.bytes().take_while(u8::is_ascii_digit).count();
        if !(1..=2).contains(&len) || (!trailing_ok && len != s.len()) {
            return None;
        }
        s[..len].parse().ok()
    };

    Some((field(hour, false)?, field(minute, false)?, field(second, true)?))
}

fn parse_month(token: &str) -> Option<Month> {
    let prefix = token.get(..3)?.to_ascii_lowercase();
    Some(match prefix.as_str() {
        "jan" => Month::January,
        "feb" => Month::February,
        "mar" => Month::March,
        "apr" => Month::April,
        "may" => Month::May,
        "jun" => Month::June,
        "jul" => Month::July,
        "aug" => Month::August,
        "sep" => Month::September,
        "oct" => Month::October,
        "nov" => Month::November,
        "dec" => Month::December,
        _ => return None,
    })
}
