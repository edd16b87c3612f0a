//! Input format checks used by registration, profiles and addresses.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{AppError, AppResult};

/// Indian GSTIN: state code, PAN, entity number, `Z`, checksum.
static GST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9]{2}[A-Z]{5}[0-9]{4}[A-Z]{1}[1-9A-Z]{1}Z[0-9A-Z]{1}$")
        .expect("Invalid regex")
});

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("Invalid regex")
});

static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("Invalid regex"));

static PIN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("Invalid regex"));

pub const MIN_PASSWORD_LEN: usize = 6;

/// Trim and upper-case a GST number the way it is stored.
pub fn normalize_gst(raw: &str) -> String {
    raw.trim().to_uppercase()
}

pub fn is_valid_gst(raw: &str) -> bool {
    GST_RE.is_match(&normalize_gst(raw))
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

pub fn is_valid_email(raw: &str) -> bool {
    EMAIL_RE.is_match(raw.trim())
}

/// Strip spaces, dashes and an optional `+91`/`91` prefix from a mobile number.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect();
    let digits = digits.strip_prefix('+').unwrap_or(&digits);
    if digits.len() == 12 {
        if let Some(rest) = digits.strip_prefix("91") {
            return rest.to_string();
        }
    }
    digits.to_string()
}

pub fn is_valid_phone(raw: &str) -> bool {
    PHONE_RE.is_match(&normalize_phone(raw))
}

pub fn is_valid_pin_code(raw: &str) -> bool {
    PIN_RE.is_match(raw.trim())
}

pub fn ensure_gst(raw: &str) -> AppResult<String> {
    if !is_valid_gst(raw) {
        return Err(AppError::BadRequest("Invalid GST number".into()));
    }
    Ok(normalize_gst(raw))
}

pub fn ensure_email(raw: &str) -> AppResult<String> {
    if !is_valid_email(raw) {
        return Err(AppError::BadRequest("Invalid email address".into()));
    }
    Ok(normalize_email(raw))
}

pub fn ensure_phone(raw: &str) -> AppResult<String> {
    if !is_valid_phone(raw) {
        return Err(AppError::BadRequest("Invalid phone number".into()));
    }
    Ok(normalize_phone(raw))
}

pub fn ensure_pin_code(raw: &str) -> AppResult<String> {
    if !is_valid_pin_code(raw) {
        return Err(AppError::BadRequest("Invalid PIN code".into()));
    }
    Ok(raw.trim().to_string())
}

pub fn ensure_password(raw: &str) -> AppResult<()> {
    if raw.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::BadRequest(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Reject blank required text fields, returning the trimmed value.
pub fn ensure_present(field: &str, raw: &str) -> AppResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::BadRequest(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Lower-case, hyphen-separated slug built from a display name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            slug.push(ch.to_ascii_lowercase());
            pending_dash = false;
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// `%term%` for ILIKE with the term's own `%`, `_` and `\` matched literally.
pub fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}
