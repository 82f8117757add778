//! The parser facade and subcommand dispatch.

use std::io::Write;

use crate::config::{Config, ParserMetaData, UpdateNotifications};
use crate::error::{DesignError, ParseResult};
use crate::format::{self, Format, Page};
use crate::identity::{OptionId, OptionIdentity};
use crate::registry::{Registry, is_valid_name};
use crate::scan;
use crate::validators::{HelpMessage, Validator};
use crate::value::Value;
use crate::version_check;

/// Result of a successful [`Parser::parse`].
///
/// Every variant but `Parsed` carries text the application is expected to print before
/// exiting successfully.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// All variables are bound.
    Parsed,
    /// `-h/--help` or `-hh/--advanced-help`.
    Help(String),
    /// Invocation without any argument.
    ShortHelp(String),
    Version(String),
    Copyright(String),
    /// `--export-help <format>`.
    Export(String),
}

impl ParseOutcome {
    /// Wrap rendered `text` for a terminal `format`; `None` for [`Format::Parse`].
    pub(crate) fn terminal(format: Format, text: String) -> Option<Self> {
        match format {
            Format::Parse => None,
            Format::Help | Format::AdvancedHelp => Some(Self::Help(text)),
            Format::ShortHelp => Some(Self::ShortHelp(text)),
            Format::Version => Some(Self::Version(text)),
            Format::Copyright => Some(Self::Copyright(text)),
            Format::Export(_) => Some(Self::Export(text)),
        }
    }

    /// Text to print for the terminal outcomes.
    pub fn output(&self) -> Option<&str> {
        match self {
            Self::Parsed => None,
            Self::Help(text)
            | Self::ShortHelp(text)
            | Self::Version(text)
            | Self::Copyright(text)
            | Self::Export(text) => Some(text.as_str()),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Parsed)
    }
}

/// Binds a command line to caller-owned variables.
///
/// Register options, flags and positionals against `&mut` variables, then call
/// [`Parser::parse`] once. The variables are written during `parse` and are free again once
/// the parser is dropped.
///
/// ```
/// use argbind::{Config, Parser};
///
/// let mut count = 1u32;
/// let mut verbose = false;
/// let mut input = String::new();
///
/// let mut parser = Parser::new("demo", ["demo", "-v", "--count", "3", "in.txt"]).unwrap();
/// parser.add_option(&mut count, Config::new().short('c').long("count")).unwrap();
/// parser.add_flag(&mut verbose, Config::new().short('v')).unwrap();
/// parser.add_positional(&mut input, Config::new()).unwrap();
/// parser.parse().unwrap();
/// drop(parser);
///
/// assert_eq!((count, verbose, input.as_str()), (3, true, "in.txt"));
/// ```
pub struct Parser<'a> {
    pub info: ParserMetaData,
    registry: Registry<'a>,
    args: Vec<String>,
    executable_name: Vec<String>,
    update_notifications: UpdateNotifications,
    has_parsed: bool,
    /// This parser's own arguments (reserved ids and the subcommand part removed).
    parsed_args: Vec<String>,
    version_check: bool,
    selected_subcommand: Option<String>,
    pending_subcommand: Option<(String, Vec<String>)>,
}

impl<'a> Parser<'a> {
    /// `argv` includes the executable name at position 0.
    pub fn new<I, S>(app_name: &str, argv: I) -> Result<Self, DesignError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_update_notifications(app_name, argv, UpdateNotifications::On)
    }

    pub fn with_update_notifications<I, S>(
        app_name: &str,
        argv: I,
        update_notifications: UpdateNotifications,
    ) -> Result<Self, DesignError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut argv = argv.into_iter().map(Into::<String>::into);
        let executable = argv.next().unwrap_or_else(|| app_name.to_string());
        Self::build(
            app_name.to_string(),
            vec![executable],
            argv.collect(),
            update_notifications,
        )
    }

    fn build(
        app_name: String,
        executable_name: Vec<String>,
        args: Vec<String>,
        update_notifications: UpdateNotifications,
    ) -> Result<Self, DesignError> {
        if !is_valid_name(&app_name) {
            return Err(DesignError::new(format!(
                "The application name '{app_name}' must only contain alphanumeric characters, '_' or '-' (regex: \"^[a-zA-Z0-9_-]+$\")."
            )));
        }
        Ok(Self {
            info: ParserMetaData {
                app_name,
                ..ParserMetaData::default()
            },
            registry: Registry::new(update_notifications),
            args,
            executable_name,
            update_notifications,
            has_parsed: false,
            parsed_args: Vec::new(),
            version_check: false,
            selected_subcommand: None,
            pending_subcommand: None,
        })
    }

    fn check_not_parsed(&self) -> Result<(), DesignError> {
        if self.has_parsed {
            return Err(DesignError::new(
                "You can only add options, flags or positional options before calling parse().",
            ));
        }
        Ok(())
    }

    pub fn add_option<T, V>(&mut self, target: &'a mut T, config: Config<V>) -> Result<(), DesignError>
    where
        T: Value + 'a,
        V: Validator<T> + 'a,
    {
        self.check_not_parsed()?;
        self.registry.add_option(target, config)
    }

    /// Every occurrence on the command line appends one element.
    pub fn add_list_option<T, V>(
        &mut self,
        target: &'a mut Vec<T>,
        config: Config<V>,
    ) -> Result<(), DesignError>
    where
        T: Value + 'a,
        V: Validator<T> + 'a,
    {
        self.check_not_parsed()?;
        self.registry.add_list_option(target, config)
    }

    /// `target` must be `false`; presence on the command line sets it.
    pub fn add_flag<V: HelpMessage>(
        &mut self,
        target: &'a mut bool,
        config: Config<V>,
    ) -> Result<(), DesignError> {
        self.check_not_parsed()?;
        self.registry.add_flag(target, config)
    }

    pub fn add_positional<T, V>(&mut self, target: &'a mut T, config: Config<V>) -> Result<(), DesignError>
    where
        T: Value + 'a,
        V: Validator<T> + 'a,
    {
        self.check_not_parsed()?;
        self.registry.add_positional(target, config)
    }

    /// Takes every remaining positional token. Must be the last positional.
    pub fn add_list_positional<T, V>(
        &mut self,
        target: &'a mut Vec<T>,
        config: Config<V>,
    ) -> Result<(), DesignError>
    where
        T: Value + 'a,
        V: Validator<T> + 'a,
    {
        self.check_not_parsed()?;
        self.registry.add_list_positional(target, config)
    }

    /// Declare subcommand keywords. Afterwards only flags may be added to this parser.
    pub fn add_subcommands<I, S>(&mut self, keywords: I) -> Result<(), DesignError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.check_not_parsed()?;
        self.registry.add_subcommands(keywords)
    }

    /// Interpret the command line. May only be called once.
    pub fn parse(&mut self) -> ParseResult<ParseOutcome> {
        if self.has_parsed {
            return Err(DesignError::new("The function parse() must only be called once!").into());
        }
        self.has_parsed = true;

        let reserved = self.update_notifications == UpdateNotifications::On;
        let invocation = format::determine(&self.args, &self.registry.subcommands, reserved)?;
        self.version_check = version_check::decide(
            self.update_notifications,
            invocation.version_check,
            version_check::suppressed_by_env(),
        );
        self.parsed_args = invocation.args;

        if invocation.format.is_terminal() {
            let text = self.page().render(invocation.format)?;
            if let Some(outcome) = ParseOutcome::terminal(invocation.format, text) {
                return Ok(outcome);
            }
        }

        let scanned = scan::scan(&self.parsed_args, &self.registry.scan_targets())?;
        tracing::debug!(app = %self.info.app_name, "binding options and flags");
        self.registry.bind_options(&scanned.hits)?;
        tracing::debug!(app = %self.info.app_name, "binding positional options");
        self.registry.bind_positionals(&scanned.positionals)?;
        self.registry.check_required(&scanned.hits)?;

        if let Some((keyword, rest)) = invocation.subcommand {
            tracing::debug!(app = %self.info.app_name, subcommand = %keyword, "handing off to subcommand");
            self.selected_subcommand = Some(keyword.clone());
            self.pending_subcommand = Some((keyword, rest));
        }
        Ok(ParseOutcome::Parsed)
    }

    /// Like [`Parser::parse`], but print terminal output and exit. The exit status is 1 if
    /// stdout cannot be written, 0 otherwise.
    pub fn parse_or_exit(&mut self) -> ParseResult<()> {
        let outcome = self.parse()?;
        if let Some(text) = outcome.output() {
            if let Err(err) = write_output(&mut std::io::stdout().lock(), text) {
                tracing::error!(%err, "failed to write parser output");
                std::process::exit(1);
            }
            std::process::exit(0);
        }
        Ok(())
    }

    fn page(&self) -> Page<'_, 'a> {
        Page {
            meta: &self.info,
            executable: self.executable_name.join(" "),
            registry: &self.registry,
            version_check_reserved: self.update_notifications == UpdateNotifications::On,
        }
    }

    /// The keyword selected on the command line, after a successful `parse`.
    pub fn selected_subcommand(&self) -> Option<&str> {
        self.selected_subcommand.as_deref()
    }

    /// Build the parser for the selected subcommand from the remaining arguments.
    ///
    /// Its application name is `<app_name>-<keyword>`, and update notifications are off.
    pub fn take_sub_parser<'b>(&mut self) -> Result<Parser<'b>, DesignError> {
        let Some((keyword, args)) = self.pending_subcommand.take() else {
            return Err(DesignError::new(
                "No subcommand was selected. Call parse() first and only ask for a sub-parser if a subcommand was given.",
            ));
        };
        let mut executable_name = self.executable_name.clone();
        executable_name.push(keyword.clone());
        let mut child = Parser::build(
            format!("{}-{keyword}", self.info.app_name),
            executable_name,
            args,
            UpdateNotifications::Off,
        )?;
        child.info.version = self.info.version.clone();
        child.info.author = self.info.author.clone();
        child.info.email = self.info.email.clone();
        child.info.url = self.info.url.clone();
        child.info.date = self.info.date.clone();
        child.info.short_copyright = self.info.short_copyright.clone();
        child.info.long_copyright = self.info.long_copyright.clone();
        child.info.citation = self.info.citation.clone();
        Ok(child)
    }

    /// Whether `id` literally appears on the command line before `--`.
    pub fn is_option_set(&self, id: impl Into<OptionId>) -> Result<bool, DesignError> {
        if !self.has_parsed {
            return Err(DesignError::new(
                "You can only ask which options have been set after calling the function `parse()`.",
            ));
        }
        let id = id.into();
        let identity = match &id {
            OptionId::Long(long) if long.chars().count() == 1 => {
                return Err(DesignError::new(
                    "Long option identifiers must be longer than one character! If this is meant to be a short identifier, please pass a char.",
                ));
            }
            OptionId::Short(c) => OptionIdentity::new(Some(*c), None),
            OptionId::Long(long) => OptionIdentity::new(None, Some(long.clone())),
        };
        identity.sanitize()?;
        if !self.registry.is_used(&id.key()) {
            return Err(DesignError::new(format!(
                "You can only ask for option identifiers that you added with add_option() before. '{id}' was never added."
            )));
        }

        let present = self
            .parsed_args
            .iter()
            .take_while(|arg| arg.as_str() != "--")
            .any(|arg| match &id {
                OptionId::Short(c) => !arg.starts_with("--") && arg.starts_with(&format!("-{c}")),
                OptionId::Long(long) => {
                    let spelled = format!("--{long}");
                    *arg == spelled || arg.starts_with(&format!("{spelled}="))
                }
            });
        Ok(present)
    }

    /// `argv[0]` followed by the subcommand keywords that led to this parser.
    pub fn executable_name(&self) -> &[String] {
        &self.executable_name
    }

    /// Whether the update notification may run. Decided during `parse`.
    pub fn version_check_enabled(&self) -> bool {
        self.version_check
    }
}

fn write_output(out: &mut impl Write, text: &str) -> std::io::Result<()> {
    out.write_all(text.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_must_be_simple() {
        assert!(Parser::new("my app", ["my app"]).is_err());
        assert!(Parser::new("", Vec::<String>::new()).is_err());
        assert!(Parser::new("my_app-2", ["./my_app-2"]).is_ok());
    }

    #[test]
    fn parse_is_single_shot() {
        let mut late = 0;
        let mut parser = Parser::new("app", ["app", "-h"]).unwrap();
        assert!(parser.parse().is_ok());
        let Err(err) = parser.parse() else {
            panic!("second parse accepted");
        };
        assert!(err.is_design_error());

        assert!(parser.add_option(&mut late, Config::new().short('l')).is_err());
    }

    #[test]
    fn terminal_formats_carry_output() {
        let mut parser = Parser::new("app", ["app", "--version"]).unwrap();
        parser.info.version = "1.2.3".to_string();
        let Ok(ParseOutcome::Version(text)) = parser.parse() else {
            panic!("expected version output");
        };
        assert!(text.starts_with("app 1.2.3\n"));

        let mut parser = Parser::new("app", ["app"]).unwrap();
        let Ok(ParseOutcome::ShortHelp(text)) = parser.parse() else {
            panic!("expected short help");
        };
        assert!(text.contains("Try -h or --help for more information."));
    }

    #[test]
    fn help_and_version_pick_their_own_outcome() {
        let mut parser = Parser::new("app", ["app", "-h", "--version"]).unwrap();
        assert!(matches!(parser.parse(), Ok(ParseOutcome::Version(_))));

        let mut parser = Parser::new("app", ["app", "--copyright"]).unwrap();
        assert!(matches!(parser.parse(), Ok(ParseOutcome::Copyright(_))));

        let text = String::from("x");
        assert_eq!(ParseOutcome::terminal(Format::Parse, text.clone()), None);
        assert_eq!(
            ParseOutcome::terminal(Format::Export(format::ExportFormat::Json), text.clone()),
            Some(ParseOutcome::Export(text))
        );
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::ErrorKind::BrokenPipe.into())
        }
    }

    #[test]
    fn output_write_failures_surface() {
        let mut out: Vec<u8> = Vec::new();
        write_output(&mut out, "app 1.0\n").unwrap();
        assert_eq!(out, b"app 1.0\n");

        let err = write_output(&mut BrokenPipe, "app 1.0\n").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn sub_parser_requires_selection() {
        let mut parser = Parser::new("app", ["app", "-h"]).unwrap();
        parser.add_subcommands(["run"]).unwrap();
        parser.parse().unwrap();
        assert!(parser.take_sub_parser().is_err());
    }

    #[test]
    fn is_option_set_misuse() {
        let mut flag = false;
        let mut parser = Parser::new("app", ["app", "--verbose"]).unwrap();
        parser
            .add_flag(&mut flag, Config::new().short('v').long("verbose"))
            .unwrap();
        assert!(parser.is_option_set('v').is_err());
        parser.parse().unwrap();

        assert_eq!(parser.is_option_set("verbose"), Ok(true));
        assert_eq!(parser.is_option_set('v'), Ok(false));
        assert!(parser.is_option_set("v").is_err());
        assert!(parser.is_option_set("-verbose").is_err());
        assert!(parser.is_option_set("other").is_err());
    }
}
