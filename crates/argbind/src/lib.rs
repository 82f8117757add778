//! Declarative command-line parsing that binds options, flags and positionals directly to
//! typed variables.
//!
//! - `identity`/`config`: how options are named and declared
//! - `value`/`enumeration`: token to value conversion
//! - `validators`: composable checks run after conversion
//! - [`Parser`]: registration, `parse`, subcommands

pub mod config;
pub mod enumeration;
pub mod error;
pub mod format;
pub mod identity;
mod parser;
mod registry;
mod scan;
pub mod validators;
pub mod value;
pub mod version_check;

pub use config::{Config, ParserMetaData, UpdateNotifications};
pub use enumeration::{
    EnumerationNames, NamedEnumeration, Registered, enumeration_values, register,
    registered_names,
};
pub use error::{DesignError, Error, ParseResult, ParserError, ParserErrorKind};
pub use format::{ExportFormat, Format};
pub use identity::{OptionId, OptionIdentity};
pub use parser::{ParseOutcome, Parser};
pub use validators::{
    ArithmeticRange, Chain, DefaultValidator, FileSystem, HelpMessage, InputDirectory, InputFile,
    OsFileSystem, OutputDirectory, OutputFile, OutputFileMode, RegexValidator, ValidationError,
    Validator, ValidatorExt, ValueList,
};
pub use value::{ConversionError, Value};
pub use version_check::NO_VERSION_CHECK_ENV;
