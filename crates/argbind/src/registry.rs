//! Option registry: registration invariants and the deferred binding commands.
//!
//! Registration only records what to do. Conversion, validation and assignment happen when
//! `parse` replays the recorded [`BindCommand`]s against the scanned command line.

use indexmap::IndexSet;

use crate::config::{Config, UpdateNotifications};
use crate::error::{DesignError, ParserError};
use crate::identity::{OptionIdentity, RESERVED_IDS, VERSION_CHECK_ID};
use crate::scan::{Hits, ScanTarget};
use crate::validators::{HelpMessage, ValidationError, Validator};
use crate::value::{ConversionError, Value, list_to_arg};

pub(crate) enum BindFailure {
    Conversion(ConversionError),
    Validation(ValidationError),
}

type SingleBinder<'a> = Box<dyn FnMut(&str) -> Result<(), BindFailure> + 'a>;
type ListBinder<'a> = Box<dyn FnMut(&[String]) -> Result<(), BindFailure> + 'a>;

/// One deferred assignment into a caller-owned variable.
pub(crate) enum BindCommand<'a> {
    Flag(&'a mut bool),
    Single(SingleBinder<'a>),
    /// Replaces the previous contents when at least one token is given.
    List(ListBinder<'a>),
}

impl<'a> BindCommand<'a> {
    fn single<T, V>(target: &'a mut T, validator: V) -> Self
    where
        T: Value + 'a,
        V: Validator<T> + 'a,
    {
        Self::Single(Box::new(move |token: &str| {
            let value = T::parse_arg(token).map_err(BindFailure::Conversion)?;
            validator.validate(&value).map_err(BindFailure::Validation)?;
            *target = value;
            Ok(())
        }))
    }

    fn list<T, V>(target: &'a mut Vec<T>, validator: V) -> Self
    where
        T: Value + 'a,
        V: Validator<T> + 'a,
    {
        Self::List(Box::new(move |tokens: &[String]| {
            let mut values = Vec::with_capacity(tokens.len());
            for token in tokens {
                let value = T::parse_arg(token).map_err(BindFailure::Conversion)?;
                validator.validate(&value).map_err(BindFailure::Validation)?;
                values.push(value);
            }
            *target = values;
            Ok(())
        }))
    }

    pub(crate) fn takes_value(&self) -> bool {
        !matches!(self, Self::Flag(_))
    }

    pub(crate) fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

/// What help pages and the export need to know about an entry.
#[derive(Debug, Clone, Default)]
pub(crate) struct EntryInfo {
    pub description: String,
    pub required: bool,
    pub advanced: bool,
    pub hidden: bool,
    /// Text after `Default: `, if any.
    pub default_display: Option<String>,
    /// `None` for flags.
    pub type_name: Option<String>,
    pub list: bool,
    pub validator_help: String,
}

pub(crate) struct OptionEntry<'a> {
    pub identity: OptionIdentity,
    pub info: EntryInfo,
    pub command: BindCommand<'a>,
}

pub(crate) struct PositionalEntry<'a> {
    pub info: EntryInfo,
    pub command: BindCommand<'a>,
}

pub(crate) struct Registry<'a> {
    pub options: Vec<OptionEntry<'a>>,
    pub positionals: Vec<PositionalEntry<'a>>,
    pub subcommands: Vec<String>,
    used_ids: IndexSet<String>,
    reserved_ids: IndexSet<String>,
}

/// Application names and subcommand keywords: `^[A-Za-z0-9_-]+$`.
pub(crate) fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

impl<'a> Registry<'a> {
    pub fn new(update_notifications: UpdateNotifications) -> Self {
        let mut reserved_ids: IndexSet<String> =
            RESERVED_IDS.iter().map(|id| id.to_string()).collect();
        if update_notifications == UpdateNotifications::On {
            reserved_ids.insert(VERSION_CHECK_ID.to_string());
        }
        Self {
            options: Vec::new(),
            positionals: Vec::new(),
            subcommands: Vec::new(),
            used_ids: IndexSet::new(),
            reserved_ids,
        }
    }

    pub fn is_used(&self, key: &str) -> bool {
        self.used_ids.contains(key)
    }

    pub fn add_option<T, V>(&mut self, target: &'a mut T, config: Config<V>) -> Result<(), DesignError>
    where
        T: Value + 'a,
        V: Validator<T> + 'a,
    {
        self.check_no_subcommands()?;
        let identity = self.check_option_config(&config)?;
        let default_display = default_display(&config, || target.to_arg());
        let info = option_info(&config, default_display, Some(T::type_name()), false);
        self.push_option(identity, info, BindCommand::single(target, config.validator));
        Ok(())
    }

    pub fn add_list_option<T, V>(
        &mut self,
        target: &'a mut Vec<T>,
        config: Config<V>,
    ) -> Result<(), DesignError>
    where
        T: Value + 'a,
        V: Validator<T> + 'a,
    {
        self.check_no_subcommands()?;
        let identity = self.check_option_config(&config)?;
        let default_display = default_display(&config, || list_to_arg(target.as_slice()));
        let info = option_info(
            &config,
            default_display,
            Some(format!("List of {}", T::type_name())),
            true,
        );
        self.push_option(identity, info, BindCommand::list(target, config.validator));
        Ok(())
    }

    pub fn add_flag<V: HelpMessage>(
        &mut self,
        target: &'a mut bool,
        config: Config<V>,
    ) -> Result<(), DesignError> {
        let identity = self.check_option_config(&config)?;
        if !config.default_message.is_empty() {
            return Err(DesignError::new(
                "A flag may not have a default message because the default is always `false`.",
            ));
        }
        if *target {
            return Err(DesignError::new(
                "A flag's default value must be false.",
            ));
        }
        let info = option_info(&config, None, None, false);
        self.push_option(identity, info, BindCommand::Flag(target));
        Ok(())
    }

    pub fn add_positional<T, V>(&mut self, target: &'a mut T, config: Config<V>) -> Result<(), DesignError>
    where
        T: Value + 'a,
        V: Validator<T> + 'a,
    {
        self.check_no_subcommands()?;
        self.check_positional_config(&config)?;
        let info = EntryInfo {
            description: config.description.clone(),
            required: true,
            type_name: Some(T::type_name()),
            validator_help: config.validator.help_message(),
            ..EntryInfo::default()
        };
        self.positionals.push(PositionalEntry {
            info,
            command: BindCommand::single(target, config.validator),
        });
        Ok(())
    }

    pub fn add_list_positional<T, V>(
        &mut self,
        target: &'a mut Vec<T>,
        config: Config<V>,
    ) -> Result<(), DesignError>
    where
        T: Value + 'a,
        V: Validator<T> + 'a,
    {
        self.check_no_subcommands()?;
        self.check_positional_config(&config)?;
        let info = EntryInfo {
            description: config.description.clone(),
            required: config.required,
            default_display: (!config.required).then(|| list_to_arg(target.as_slice())),
            type_name: Some(format!("List of {}", T::type_name())),
            list: true,
            validator_help: config.validator.help_message(),
            ..EntryInfo::default()
        };
        self.positionals.push(PositionalEntry {
            info,
            command: BindCommand::list(target, config.validator),
        });
        Ok(())
    }

    pub fn add_subcommands<I, S>(&mut self, keywords: I) -> Result<(), DesignError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        if !self.positionals.is_empty() || self.options.iter().any(|o| o.command.takes_value()) {
            return Err(DesignError::new(
                "Subcommands can only be added to a parser without options or positional options. Flags are allowed.",
            ));
        }
        for keyword in keywords {
            let keyword = keyword.into();
            if !is_valid_name(&keyword) {
                return Err(DesignError::new(format!(
                    "The subcommand name '{keyword}' must only contain alphanumeric characters, '_' or '-' (regex: \"^[a-zA-Z0-9_-]+$\")."
                )));
            }
            if !self.subcommands.contains(&keyword) {
                self.subcommands.push(keyword);
            }
        }
        Ok(())
    }

    fn check_no_subcommands(&self) -> Result<(), DesignError> {
        if self.subcommands.is_empty() {
            Ok(())
        } else {
            Err(DesignError::new(
                "You may only specify flags for the top-level parser.",
            ))
        }
    }

    fn check_option_config<V>(&self, config: &Config<V>) -> Result<OptionIdentity, DesignError> {
        let identity = config.identity();
        identity.sanitize()?;
        for key in identity.keys() {
            if self.reserved_ids.contains(&key) {
                return Err(DesignError::new(format!(
                    "Option Identifier '{key}' is reserved for the parser."
                )));
            }
            if self.used_ids.contains(&key) {
                return Err(DesignError::new(format!(
                    "Option Identifier '{key}' was already used before."
                )));
            }
        }
        if config.required && !config.default_message.is_empty() {
            return Err(DesignError::new(
                "A required option cannot have a default message.",
            ));
        }
        Ok(identity)
    }

    fn check_positional_config<V>(&self, config: &Config<V>) -> Result<(), DesignError> {
        if config.short_id.is_some() || !config.long_id.is_empty() {
            return Err(DesignError::new(
                "Positional options are identified by their position on the command line. Do not set short or long ids.",
            ));
        }
        if config.advanced || config.hidden {
            return Err(DesignError::new(
                "Positional options are always required and therefore cannot be advanced nor hidden!",
            ));
        }
        if !config.default_message.is_empty() {
            return Err(DesignError::new(
                "Positional options cannot have a default message.",
            ));
        }
        if self.positionals.last().is_some_and(|p| p.command.is_list()) {
            return Err(DesignError::new(
                "You added a positional option with a list value before so you cannot add any other positional options.",
            ));
        }
        Ok(())
    }

    fn push_option(&mut self, identity: OptionIdentity, info: EntryInfo, command: BindCommand<'a>) {
        self.used_ids.extend(identity.keys());
        tracing::trace!(option = %identity, "registered");
        self.options.push(OptionEntry {
            identity,
            info,
            command,
        });
    }

    pub(crate) fn scan_targets(&self) -> Vec<ScanTarget<'_>> {
        self.options
            .iter()
            .map(|o| ScanTarget {
                identity: &o.identity,
                takes_value: o.command.takes_value(),
            })
            .collect()
    }

    /// Bind options and flags in registration order. `hits` is parallel to `options`.
    pub(crate) fn bind_options(&mut self, hits: &[Hits]) -> Result<(), ParserError> {
        for (entry, hit) in self.options.iter_mut().zip(hits) {
            if hit.is_empty() {
                continue;
            }
            if !entry.command.is_list() && hit.len() > 1 {
                return Err(ParserError::OptionDeclaredMultipleTimes(format!(
                    "Option {} is no list/container but declared multiple times.",
                    entry.identity
                )));
            }
            match &mut entry.command {
                BindCommand::Flag(target) => {
                    **target = true;
                    tracing::trace!(option = %entry.identity, "flag set");
                }
                BindCommand::Single(bind) => {
                    let (spelled, token) = &hit.occurrences[0];
                    bind(token.as_str()).map_err(|f| option_failure(f, spelled, &entry.identity))?;
                    tracing::trace!(option = %entry.identity, token = %token, "bound");
                }
                BindCommand::List(bind) => {
                    let tokens: Vec<String> =
                        hit.occurrences.iter().map(|(_, t)| t.clone()).collect();
                    let spelled = &hit.occurrences[0].0;
                    bind(&tokens).map_err(|f| option_failure(f, spelled, &entry.identity))?;
                    tracing::trace!(option = %entry.identity, count = tokens.len(), "bound list");
                }
            }
        }
        Ok(())
    }

    /// Assign the remaining tokens to positionals in registration order.
    pub(crate) fn bind_positionals(&mut self, tokens: &[String]) -> Result<(), ParserError> {
        let singles = self.positionals.iter().filter(|p| !p.command.is_list()).count();
        let list = self.positionals.last().filter(|p| p.command.is_list());
        let minimum = singles + usize::from(list.is_some_and(|p| p.info.required));

        if tokens.len() < minimum {
            return Err(ParserError::TooFewArguments(format!(
                "Not enough positional arguments provided (Need at least {minimum}). See -h/--help for more information."
            )));
        }
        if list.is_none() && tokens.len() > singles {
            return Err(ParserError::TooManyArguments(
                "Too many arguments provided. Please see -h/--help for more information.".to_string(),
            ));
        }

        let mut rest = tokens;
        for (index, entry) in self.positionals.iter_mut().enumerate() {
            let position = index + 1;
            match &mut entry.command {
                BindCommand::Single(bind) => {
                    let Some((token, tail)) = rest.split_first() else {
                        break;
                    };
                    bind(token.as_str()).map_err(|f| positional_failure(f, position))?;
                    tracing::trace!(position, token = %token, "bound positional");
                    rest = tail;
                }
                BindCommand::List(bind) => {
                    if !rest.is_empty() {
                        bind(rest).map_err(|f| positional_failure(f, position))?;
                        tracing::trace!(position, count = rest.len(), "bound positional list");
                    }
                    rest = &[];
                }
                BindCommand::Flag(_) => {}
            }
        }
        Ok(())
    }

    pub(crate) fn check_required(&self, hits: &[Hits]) -> Result<(), ParserError> {
        for (entry, hit) in self.options.iter().zip(hits) {
            if entry.info.required && hit.is_empty() {
                return Err(ParserError::RequiredOptionMissing(format!(
                    "Option {} is required but not set.",
                    entry.identity
                )));
            }
        }
        Ok(())
    }
}

fn default_display<V>(config: &Config<V>, current: impl FnOnce() -> String) -> Option<String> {
    if config.required {
        None
    } else if !config.default_message.is_empty() {
        Some(config.default_message.clone())
    } else {
        Some(current())
    }
}

fn option_info<V: HelpMessage>(
    config: &Config<V>,
    default_display: Option<String>,
    type_name: Option<String>,
    list: bool,
) -> EntryInfo {
    EntryInfo {
        description: config.description.clone(),
        required: config.required,
        advanced: config.advanced,
        hidden: config.hidden,
        default_display,
        type_name,
        list,
        validator_help: config.validator.help_message(),
    }
}

fn option_failure(failure: BindFailure, spelled: &str, identity: &OptionIdentity) -> ParserError {
    match failure {
        BindFailure::Conversion(err @ ConversionError::InvalidName { .. }) => {
            ParserError::UserInput(err.to_string())
        }
        BindFailure::Conversion(err) => {
            ParserError::UserInput(format!("Value parse failed for {spelled}: {err}"))
        }
        BindFailure::Validation(err) => {
            ParserError::Validation(format!("Validation failed for option {identity}: {err}"))
        }
    }
}

fn positional_failure(failure: BindFailure, position: usize) -> ParserError {
    match failure {
        BindFailure::Conversion(err @ ConversionError::InvalidName { .. }) => {
            ParserError::UserInput(err.to_string())
        }
        BindFailure::Conversion(err) => ParserError::UserInput(format!(
            "Value parse failed for positional option {position}: {err}"
        )),
        BindFailure::Validation(err) => ParserError::Validation(format!(
            "Validation failed for positional option {position}: {err}"
        )),
    }
}
