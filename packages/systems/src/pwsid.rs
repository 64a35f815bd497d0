//! PWS identifier normalization.
//!
//! Identifiers are human-entered strings like `"UTAH18005"`; the geometry
//! layer's `DWSYSNUM` field additionally carries a trailing `Z` on some
//! rows. Normalization strips the literal prefix token (and, for
//! `DWSYSNUM`, the suffix token) case-insensitively and requires everything
//! left over to be digits. Any residual non-digit marks the identifier
//! invalid; there is no fuzzy character stripping.

/// The literal prefix token embedded in human-entered identifiers.
pub const PREFIX_TOKEN: &str = "UTAH";

/// Suffix token seen on some `DWSYSNUM` values.
const SUFFIX_TOKEN: &str = "Z";

/// An identifier that could not be normalized to an integer PWSID.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid PWS identifier: {0:?}")]
pub struct InvalidPwsid(pub String);

/// Normalizes a human-entered identifier (`"Utah1234"` → `1234`).
///
/// # Errors
///
/// Returns [`InvalidPwsid`] when anything other than digits remains after
/// the prefix strip, including identifiers with no digits at all.
pub fn normalize(raw: &str) -> Result<i64, InvalidPwsid> {
    parse_digits(strip_token_prefix(raw.trim()), raw)
}

/// Normalizes a geometry layer `DWSYSNUM` (`"UTAH18005Z"` → `18005`).
///
/// # Errors
///
/// Returns [`InvalidPwsid`] when non-digits remain after stripping the
/// prefix and suffix tokens.
pub fn normalize_dwsysnum(raw: &str) -> Result<i64, InvalidPwsid> {
    let stripped = strip_token_prefix(raw.trim());
    let stripped = stripped
        .strip_suffix(SUFFIX_TOKEN)
        .or_else(|| stripped.strip_suffix(&SUFFIX_TOKEN.to_ascii_lowercase()))
        .unwrap_or(stripped);
    parse_digits(stripped, raw)
}

/// Whether a `DWSYSNUM` value is a placeholder (blank or whitespace-only)
/// rather than an identifier.
#[must_use]
pub fn is_placeholder(raw: &str) -> bool {
    raw.trim().is_empty()
}

fn strip_token_prefix(value: &str) -> &str {
    value
        .get(..PREFIX_TOKEN.len())
        .filter(|head| head.eq_ignore_ascii_case(PREFIX_TOKEN))
        .map_or(value, |_| &value[PREFIX_TOKEN.len()..])
}

fn parse_digits(digits: &str, raw: &str) -> Result<i64, InvalidPwsid> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(InvalidPwsid(raw.to_owned()));
    }
    digits
        .parse()
        .map_err(|_| InvalidPwsid(raw.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_the_prefix_token_case_insensitively() {
        assert_eq!(normalize("UTAH18005"), Ok(18005));
        assert_eq!(normalize("Utah1234"), Ok(1234));
        assert_eq!(normalize("utah1234"), Ok(1234));
    }

    #[test]
    fn accepts_bare_digits_and_leading_zeros() {
        assert_eq!(normalize("1234"), Ok(1234));
        assert_eq!(normalize("UTAH00027"), Ok(27));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(normalize("  Utah1234  "), Ok(1234));
    }

    #[test]
    fn rejects_identifiers_with_no_digits() {
        assert!(normalize("Valley Water System").is_err());
        assert!(normalize("UTAH").is_err());
        assert!(normalize("").is_err());
    }

    #[test]
    fn rejects_residual_non_digits() {
        // No fuzzy stripping: a stray letter invalidates the identifier
        // instead of being silently eaten.
        assert!(normalize("UTAH12A34").is_err());
        assert!(normalize("UTAH1234a").is_err());
    }

    #[test]
    fn dwsysnum_strips_the_trailing_suffix_token() {
        assert_eq!(normalize_dwsysnum("UTAH18005Z"), Ok(18005));
        assert_eq!(normalize_dwsysnum("utah18005z"), Ok(18005));
        assert_eq!(normalize_dwsysnum("UTAH18005"), Ok(18005));
    }

    #[test]
    fn dwsysnum_placeholders() {
        assert!(is_placeholder(" "));
        assert!(is_placeholder(""));
        assert!(!is_placeholder("UTAH18005"));
    }
}
