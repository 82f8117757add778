//! Option identifiers.

use std::fmt;

use crate::error::DesignError;

/// Identifiers owned by the parser itself (help, version, export, ...).
pub const RESERVED_IDS: &[&str] = &[
    "h",
    "hh",
    "help",
    "advanced-help",
    "export-help",
    "version",
    "copyright",
];

/// Reserved only while the application keeps update notifications enabled.
pub const VERSION_CHECK_ID: &str = "version-check";

/// Short and/or long identifier of an option or flag.
///
/// Two identities are equal if either component matches; unset components never match.
#[derive(Debug, Clone, Default, Eq)]
pub struct OptionIdentity {
    pub short_id: Option<char>,
    pub long_id: Option<String>,
}

impl OptionIdentity {
    pub fn new(short_id: Option<char>, long_id: Option<String>) -> Self {
        Self {
            short_id,
            long_id: long_id.filter(|l| !l.is_empty()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.short_id.is_none() && self.long_id.is_none()
    }

    pub fn matches_short(&self, c: char) -> bool {
        self.short_id == Some(c)
    }

    pub fn matches_long(&self, name: &str) -> bool {
        self.long_id.as_deref() == Some(name)
    }

    /// Keys this identity occupies in the set of used identifiers.
    pub(crate) fn keys(&self) -> impl Iterator<Item = String> + '_ {
        self.short_id
            .map(String::from)
            .into_iter()
            .chain(self.long_id.iter().cloned())
    }

    /// Check the identifier shape. Runs before any collision check.
    pub fn sanitize(&self) -> Result<(), DesignError> {
        if self.is_empty() {
            return Err(DesignError::new("Option Identifiers cannot both be empty."));
        }
        if let Some(c) = self.short_id
            && !is_valid_short_char(c)
        {
            return Err(DesignError::new(
                "Option identifiers may only contain alphanumeric characters, '_', or '@'.",
            ));
        }
        if let Some(long) = &self.long_id {
            if long.chars().count() == 1 {
                return Err(DesignError::new(
                    "Long IDs must be either empty, or longer than one character.",
                ));
            }
            if long.starts_with('-') {
                return Err(DesignError::new("First character of long ID cannot be '-'."));
            }
            if !long.chars().all(|c| c == '-' || is_valid_short_char(c)) {
                return Err(DesignError::new(
                    "Long identifiers may only contain alphanumeric characters, '_', '-', or '@'.",
                ));
            }
        }
        Ok(())
    }
}

impl PartialEq for OptionIdentity {
    fn eq(&self, other: &Self) -> bool {
        (self.short_id.is_some() && self.short_id == other.short_id)
            || (self.long_id.is_some() && self.long_id == other.long_id)
    }
}

/// Renders as used in messages: `-i/--int`, `-i` or `--int`.
impl fmt::Display for OptionIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.short_id, &self.long_id) {
            (Some(s), Some(l)) => write!(f, "-{s}/--{l}"),
            (Some(s), None) => write!(f, "-{s}"),
            (None, Some(l)) => write!(f, "--{l}"),
            (None, None) => Ok(()),
        }
    }
}

pub(crate) fn is_valid_short_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '@'
}

/// A single identifier used for lookups such as `Parser::is_option_set`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionId {
    Short(char),
    Long(String),
}

impl OptionId {
    pub(crate) fn key(&self) -> String {
        match self {
            Self::Short(c) => c.to_string(),
            Self::Long(l) => l.clone(),
        }
    }
}

impl From<char> for OptionId {
    fn from(c: char) -> Self {
        Self::Short(c)
    }
}

impl From<&str> for OptionId {
    fn from(s: &str) -> Self {
        Self::Long(s.to_string())
    }
}

impl From<String> for OptionId {
    fn from(s: String) -> Self {
        Self::Long(s)
    }
}

impl fmt::Display for OptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Short(c) => write!(f, "-{c}"),
            Self::Long(l) => write!(f, "--{l}"),
        }
    }
}
