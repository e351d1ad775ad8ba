//! Version tokens and their ordinal values
//!
//! A version token is a string of the form `v<integer>` (`v1`, `v12`). Its
//! ordinal is the integer after the `v` marker. A token whose remainder is not
//! a number has a *not-a-number* ordinal that compares false against
//! everything, itself included.

use crate::error::{Result, VersioningError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::num::IntErrorKind;

/// Marker preceding the ordinal in a version token
pub const VERSION_MARKER: char = 'v';

/// A version identifier such as `v1` or `v12`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    /// Wrap a token, rejecting the empty string
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if token.is_empty() {
            return Err(VersioningError::invalid_argument("version token must not be empty"));
        }
        Ok(Self(token))
    }

    /// The token as given
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The ordinal value of this token
    pub fn number(&self) -> VersionNumber {
        parse_ordinal(&self.0)
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for VersionToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::borrow::Borrow<str> for VersionToken {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for VersionToken {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for VersionToken {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Ordinal value of a version token
///
/// Behaves like a float with a NaN state: a malformed token yields
/// [`VersionNumber::NAN`], which is neither equal to, less than, nor greater
/// than any other number.
#[derive(Debug, Clone, Copy)]
pub struct VersionNumber(Option<u64>);

impl VersionNumber {
    /// The not-a-number ordinal
    pub const NAN: VersionNumber = VersionNumber(None);

    /// An ordinal with a numeric value
    pub const fn new(value: u64) -> Self {
        Self(Some(value))
    }

    /// The numeric value, `None` for [`VersionNumber::NAN`]
    pub fn value(&self) -> Option<u64> {
        self.0
    }

    /// Whether this is the not-a-number ordinal
    pub fn is_nan(&self) -> bool {
        self.0.is_none()
    }
}

impl PartialEq for VersionNumber {
    fn eq(&self, other: &Self) -> bool {
        matches!((self.0, other.0), (Some(a), Some(b)) if a == b)
    }
}

impl PartialOrd for VersionNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self.0, other.0) {
            (Some(a), Some(b)) => Some(a.cmp(&b)),
            _ => None,
        }
    }
}

impl PartialEq<u64> for VersionNumber {
    fn eq(&self, other: &u64) -> bool {
        self.0 == Some(*other)
    }
}

impl fmt::Display for VersionNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{}", value),
            None => f.write_str("NaN"),
        }
    }
}

fn parse_ordinal(token: &str) -> VersionNumber {
    let digits = token.strip_prefix(VERSION_MARKER).unwrap_or(token);
    match digits.parse::<u64>() {
        Ok(value) => VersionNumber::new(value),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => VersionNumber::new(u64::MAX),
        Err(_) => VersionNumber::NAN,
    }
}

/// Return the ordinal of a version token
///
/// Strips the `v` marker and converts the rest to an integer. The remainder
/// is not validated: anything that is not a number yields
/// [`VersionNumber::NAN`]. Numbers above `u64::MAX` saturate to `u64::MAX`,
/// so all of them compare equal to each other.
///
/// # Errors
///
/// [`VersioningError::InvalidArgument`] if `token` is empty.
///
/// # Example
///
/// ```rust
/// use apiver::version_number;
///
/// assert_eq!(version_number("v15").unwrap(), 15);
/// assert!(version_number("vX").unwrap().is_nan());
/// ```
pub fn version_number(token: &str) -> Result<VersionNumber> {
    if token.is_empty() {
        return Err(VersioningError::invalid_argument("version token must not be empty"));
    }
    Ok(parse_ordinal(token))
}
