//! Error taxonomy.
//!
//! Two disjoint families:
//! - [`DesignError`]: the integrating application registered something wrong, or misused
//!   the parser lifecycle. These should surface during development and are not meant to be
//!   shown to end users.
//! - [`ParserError`]: the end user invoked the program incorrectly. Every variant carries
//!   a message that names the offending option or token.

use thiserror::Error;

/// A developer mistake detected at registration time or through lifecycle misuse.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct DesignError(String);

impl DesignError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    pub fn message(&self) -> &str {
        self.0.as_str()
    }
}

/// A bad invocation by the end user. One variant per failure mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParserError {
    #[error("{0}")]
    UnknownOption(String),
    #[error("{0}")]
    TooManyArguments(String),
    #[error("{0}")]
    TooFewArguments(String),
    #[error("{0}")]
    RequiredOptionMissing(String),
    #[error("{0}")]
    OptionDeclaredMultipleTimes(String),
    /// Type conversion failed, including unknown enumeration names.
    #[error("{0}")]
    UserInput(String),
    /// A validator rejected an otherwise well-typed value.
    #[error("{0}")]
    Validation(String),
    /// Subcommands were declared but none was given (or it was misspelled).
    #[error("{0}")]
    MissingSubcommand(String),
}

/// Category of a [`ParserError`] without its message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParserErrorKind {
    UnknownOption,
    TooManyArguments,
    TooFewArguments,
    RequiredOptionMissing,
    OptionDeclaredMultipleTimes,
    UserInput,
    Validation,
    MissingSubcommand,
}

impl ParserError {
    pub fn message(&self) -> &str {
        match self {
            Self::UnknownOption(msg)
            | Self::TooManyArguments(msg)
            | Self::TooFewArguments(msg)
            | Self::RequiredOptionMissing(msg)
            | Self::OptionDeclaredMultipleTimes(msg)
            | Self::UserInput(msg)
            | Self::Validation(msg)
            | Self::MissingSubcommand(msg) => msg.as_str(),
        }
    }

    pub fn kind(&self) -> ParserErrorKind {
        match self {
            Self::UnknownOption(_) => ParserErrorKind::UnknownOption,
            Self::TooManyArguments(_) => ParserErrorKind::TooManyArguments,
            Self::TooFewArguments(_) => ParserErrorKind::TooFewArguments,
            Self::RequiredOptionMissing(_) => ParserErrorKind::RequiredOptionMissing,
            Self::OptionDeclaredMultipleTimes(_) => ParserErrorKind::OptionDeclaredMultipleTimes,
            Self::UserInput(_) => ParserErrorKind::UserInput,
            Self::Validation(_) => ParserErrorKind::Validation,
            Self::MissingSubcommand(_) => ParserErrorKind::MissingSubcommand,
        }
    }
}

/// Anything `Parser::parse` can fail with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Design(#[from] DesignError),
    #[error(transparent)]
    Parser(#[from] ParserError),
}

impl Error {
    pub fn message(&self) -> &str {
        match self {
            Self::Design(e) => e.message(),
            Self::Parser(e) => e.message(),
        }
    }

    /// The user-error category, if this is a user error.
    pub fn parser_kind(&self) -> Option<ParserErrorKind> {
        match self {
            Self::Design(_) => None,
            Self::Parser(e) => Some(e.kind()),
        }
    }

    pub fn is_design_error(&self) -> bool {
        matches!(self, Self::Design(_))
    }
}

pub type ParseResult<T> = Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_match_variants() {
        let err = ParserError::TooFewArguments("Missing value for option -i.".to_string());
        assert_eq!(err.kind(), ParserErrorKind::TooFewArguments);
        assert_eq!(err.message(), "Missing value for option -i.");
        assert_eq!(err.to_string(), "Missing value for option -i.");
    }

    #[test]
    fn unified_error_keeps_family() {
        let design: Error = DesignError::new("The function parse() must only be called once!").into();
        assert!(design.is_design_error());
        assert_eq!(design.parser_kind(), None);

        let user: Error = ParserError::Validation("bad".to_string()).into();
        assert!(!user.is_design_error());
        assert_eq!(user.parser_kind(), Some(ParserErrorKind::Validation));
        assert_eq!(user.message(), "bad");
    }
}
