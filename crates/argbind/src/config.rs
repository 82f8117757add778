//! Per-option configuration and application meta data.

use serde::Serialize;

use crate::identity::OptionIdentity;
use crate::validators::DefaultValidator;

/// How an option, flag or positional is declared.
///
/// ```
/// use argbind::{ArithmeticRange, Config};
///
/// let config = Config::new()
///     .short('i')
///     .long("int")
///     .description("An integer.")
///     .validator(ArithmeticRange::new(1, 10));
/// assert_eq!(config.short_id, Some('i'));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config<V = DefaultValidator> {
    pub short_id: Option<char>,
    /// Empty means unset.
    pub long_id: String,
    pub description: String,
    /// Shown instead of the captured default value in help pages.
    pub default_message: String,
    /// Only listed by `-hh/--advanced-help`.
    pub advanced: bool,
    /// Never listed in help pages.
    pub hidden: bool,
    pub required: bool,
    pub validator: V,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<V> Config<V> {
    pub fn short(mut self, id: char) -> Self {
        self.short_id = Some(id);
        self
    }

    pub fn long(mut self, id: impl Into<String>) -> Self {
        self.long_id = id.into();
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = text.into();
        self
    }

    pub fn default_message(mut self, text: impl Into<String>) -> Self {
        self.default_message = text.into();
        self
    }

    pub fn advanced(mut self, advanced: bool) -> Self {
        self.advanced = advanced;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Replace the validator. The result may have a different validator type.
    pub fn validator<W>(self, validator: W) -> Config<W> {
        Config {
            short_id: self.short_id,
            long_id: self.long_id,
            description: self.description,
            default_message: self.default_message,
            advanced: self.advanced,
            hidden: self.hidden,
            required: self.required,
            validator,
        }
    }

    pub fn identity(&self) -> OptionIdentity {
        OptionIdentity::new(self.short_id, Some(self.long_id.clone()))
    }
}

/// Whether the application allows the update notification (`--version-check`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpdateNotifications {
    #[default]
    On,
    Off,
}

/// Application meta data shown by help, version, copyright and export output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ParserMetaData {
    pub app_name: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short_description: String,
    /// One entry per paragraph.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub synopsis: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub email: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub url: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub date: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub short_copyright: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub long_copyright: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub citation: String,
}
