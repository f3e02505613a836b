use std::fmt;
use std::str::FromStr;

use regex::Regex;

/// Column width of `submissions.email`, in code points of the stored value
const MAX_LEN: usize = 200;

/// A validated, normalized email address.
///
/// Normalization is trim + lowercase, so uniqueness comparisons downstream
/// are case-insensitive.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct EmailAddress(String);

/// Validation failure for a submitted email address.
///
/// `Required` is distinct from the format errors so callers can report the
/// first applicable problem to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum EmailAddressError {
    #[error("Email address is required")]
    Required,
    #[error("Email address is too long")]
    TooLong,
    #[error("Email address of incorrect format")]
    InvalidFormat,
}

impl FromStr for EmailAddress {
    type Err = EmailAddressError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        lazy_static::lazy_static! {
            // local-part "@" domain, domain with at least one dot-separated label
            static ref EMAIL_REGEX: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
        }

        let value = value.trim();

        if value.is_empty() {
            return Err(EmailAddressError::Required);
        }

        // Normalize before measuring: lowercasing can lengthen the string,
        // and the column cap applies to what is stored
        let value = value.to_lowercase();

        if value.chars().count() > MAX_LEN {
            return Err(EmailAddressError::TooLong);
        }
        if !EMAIL_REGEX.is_match(&value) {
            return Err(EmailAddressError::InvalidFormat);
        }

        Ok(Self(value))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
