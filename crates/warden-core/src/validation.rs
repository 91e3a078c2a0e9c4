//! Input validation shared by the core boundary and the web layer
//!
//! Every function returns the normalised value on success and
//! `CoreError::ValidationFailed` otherwise.

use regex::Regex;
use std::net::IpAddr;
use std::sync::LazyLock;
use url::Url;

use crate::{CoreError, CoreResult};

/// Philippine mobile number, local (`09…`) or international (`+639…`)
static CONTACT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(09|\+639)\d{9}$").expect("contact number pattern"));

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9\-]+(\.[A-Za-z0-9\-]+)*\.[A-Za-z]{2,}$")
        .expect("email pattern")
});

pub const REFERENCE_MIN_LEN: usize = 6;
pub const REFERENCE_MAX_LEN: usize = 20;
pub const USERNAME_MIN_LEN: usize = 3;
pub const USERNAME_MAX_LEN: usize = 64;
pub const PASSWORD_MIN_LEN: usize = 8;

/// Validate a wallet contact number
pub fn validate_contact_number(contact: &str) -> CoreResult<String> {
    let contact = contact.trim();
    if CONTACT_NUMBER.is_match(contact) {
        Ok(contact.to_string())
    } else {
        Err(CoreError::validation(
            "contact number must look like 09XXXXXXXXX or +639XXXXXXXXX",
        ))
    }
}

/// Format a valid contact number as `+63 9XX XXX XXXX`
pub fn format_contact_number(contact: &str) -> CoreResult<String> {
    let contact = validate_contact_number(contact)?;
    let national = contact
        .strip_prefix("+63")
        .or_else(|| contact.strip_prefix('0'))
        .unwrap_or(&contact);
    Ok(format!(
        "+63 {} {} {}",
        &national[..3],
        &national[3..6],
        &national[6..]
    ))
}

/// Validate a payment reference number
pub fn validate_reference(reference: &str) -> CoreResult<String> {
    let reference = reference.trim();
    let len = reference.chars().count();
    if reference.is_empty() {
        return Err(CoreError::validation("reference number is required"));
    }
    if !(REFERENCE_MIN_LEN..=REFERENCE_MAX_LEN).contains(&len) {
        return Err(CoreError::validation(format!(
            "reference number must be {REFERENCE_MIN_LEN}-{REFERENCE_MAX_LEN} characters"
        )));
    }
    Ok(reference.to_string())
}

/// Validate a payment amount in minor units
pub fn validate_amount_cents(amount_cents: i64) -> CoreResult<i64> {
    if amount_cents > 0 {
        Ok(amount_cents)
    } else {
        Err(CoreError::validation("amount must be positive"))
    }
}

/// Parse a decimal amount such as `"249"` or `"249.50"` into minor units
pub fn parse_amount(amount: &str) -> CoreResult<i64> {
    let amount = amount.trim();
    let invalid = || CoreError::validation(format!("invalid amount: {amount}"));

    let (whole, frac) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty()
        || frac.len() > 2
        || !whole.chars().all(|c| c.is_ascii_digit())
        || !frac.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let whole: i64 = whole.parse().map_err(|_| invalid())?;
    let frac: i64 = match frac.len() {
        0 => 0,
        1 => frac.parse::<i64>().map_err(|_| invalid())? * 10,
        _ => frac.parse().map_err(|_| invalid())?,
    };
    let cents = whole
        .checked_mul(100)
        .and_then(|c| c.checked_add(frac))
        .ok_or_else(invalid)?;
    validate_amount_cents(cents)
}

/// Validate a username
pub fn validate_username(username: &str) -> CoreResult<String> {
    let username = username.trim();
    let len = username.chars().count();
    if !(USERNAME_MIN_LEN..=USERNAME_MAX_LEN).contains(&len) {
        return Err(CoreError::validation(format!(
            "username must be {USERNAME_MIN_LEN}-{USERNAME_MAX_LEN} characters"
        )));
    }
    Ok(username.to_string())
}

/// Validate and normalise an email address
pub fn validate_email(email: &str) -> CoreResult<String> {
    let email = email.trim();
    if email.len() <= 254 && EMAIL.is_match(email) {
        Ok(email.to_lowercase())
    } else {
        Err(CoreError::validation("invalid email address"))
    }
}

/// Validate a new password
pub fn validate_password(password: &str) -> CoreResult<()> {
    if password.chars().count() >= PASSWORD_MIN_LEN {
        Ok(())
    } else {
        Err(CoreError::validation(format!(
            "password must be at least {PASSWORD_MIN_LEN} characters"
        )))
    }
}

/// Parse an IPv4 or IPv6 address
pub fn validate_ip(ip: &str) -> CoreResult<IpAddr> {
    ip.trim()
        .parse()
        .map_err(|_| CoreError::validation(format!("invalid IP address: {}", ip.trim())))
}

/// Validate an absolute `http`/`https` URL with a host
pub fn validate_url(url: &str) -> CoreResult<String> {
    let url = url.trim();
    let parsed = Url::parse(url)
        .map_err(|e| CoreError::validation(format!("invalid URL: {e}")))?;

    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(CoreError::validation("URL scheme must be http or https"));
    }
    if parsed.host_str().map_or(true, str::is_empty) {
        return Err(CoreError::validation("URL must have a host"));
    }
    if url.chars().any(char::is_whitespace) {
        return Err(CoreError::validation("URL must not contain whitespace"));
    }
    Ok(url.to_string())
}

/// Reduce an uploaded file name to a safe basename.
///
/// Directory components are dropped and anything outside
/// `[A-Za-z0-9._-]` becomes `_`. Empty or dot-only names become `upload`.
pub fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned.to_string()
    }
}
