//! Strongly-typed identifiers for dashboard entities
//!
//! Entity identifiers arrive from an external load process as plain strings.
//! Newtype wrappers validate the format once at the boundary and prevent
//! accidental mixing of different identifier types further in.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum length of client and account identifiers
const ID_MAX_LEN: usize = 64;

/// Maximum length of fund names
const NAME_MAX_LEN: usize = 128;

/// Errors produced when validating an external identifier
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentifierError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },

    #[error("{kind} '{value}' is longer than {max} characters")]
    TooLong {
        kind: &'static str,
        value: String,
        max: usize,
    },

    #[error("{kind} '{value}' contains invalid characters")]
    InvalidCharacters { kind: &'static str, value: String },
}

impl IdentifierError {
    /// The kind of identifier that failed validation (e.g. "client id")
    pub fn kind(&self) -> &'static str {
        match self {
            IdentifierError::Empty { kind }
            | IdentifierError::TooLong { kind, .. }
            | IdentifierError::InvalidCharacters { kind, .. } => kind,
        }
    }

    /// The offending input, echoed back for error reporting
    pub fn value(&self) -> &str {
        match self {
            IdentifierError::Empty { .. } => "",
            IdentifierError::TooLong { value, .. }
            | IdentifierError::InvalidCharacters { value, .. } => value,
        }
    }
}

/// Validates a machine identifier: non-empty, bounded, `[A-Za-z0-9_-]` only.
fn validate_token(kind: &'static str, value: &str, max: usize) -> Result<(), IdentifierError> {
    if value.is_empty() {
        return Err(IdentifierError::Empty { kind });
    }
    if value.len() > max {
        return Err(IdentifierError::TooLong {
            kind,
            value: value.to_string(),
            max,
        });
    }
    if !value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(IdentifierError::InvalidCharacters {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Validates a display name key: non-empty, bounded, no control characters.
fn validate_label(kind: &'static str, value: &str, max: usize) -> Result<(), IdentifierError> {
    if value.trim().is_empty() {
        return Err(IdentifierError::Empty { kind });
    }
    if value.len() > max {
        return Err(IdentifierError::TooLong {
            kind,
            value: value.to_string(),
            max,
        });
    }
    if value.chars().any(|c| c.is_control()) {
        return Err(IdentifierError::InvalidCharacters {
            kind,
            value: value.to_string(),
        });
    }
    Ok(())
}

macro_rules! define_entity_id {
    ($name:ident, $kind:literal, $max:expr, $validate:path) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates an identifier, validating the external representation
            pub fn new(value: impl Into<String>) -> Result<Self, IdentifierError> {
                let value = value.into();
                $validate($kind, &value, $max)?;
                Ok(Self(value))
            }

            /// Returns the underlying string
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The identifier kind, as used in error messages
            pub fn kind() -> &'static str {
                $kind
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = IdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdentifierError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_entity_id!(ClientId, "client id", ID_MAX_LEN, validate_token);
define_entity_id!(AccountId, "account id", ID_MAX_LEN, validate_token);
define_entity_id!(FundName, "fund name", NAME_MAX_LEN, validate_label);
