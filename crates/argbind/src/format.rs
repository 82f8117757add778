//! Invocation mode selection and the terminal output formats.
//!
//! `parse` first decides which [`Format`] the invocation asks for. Only [`Format::Parse`]
//! binds anything; every other format renders text and ends the parse.

use serde::Serialize;

use crate::config::ParserMetaData;
use crate::error::{DesignError, ParserError};
use crate::identity::{OptionIdentity, VERSION_CHECK_ID};
use crate::registry::{EntryInfo, Registry};
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
}

impl ExportFormat {
    pub const NAMES: &'static [&'static str] = &["json"];

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Ordinary invocation: bind the command line.
    Parse,
    Help,
    AdvancedHelp,
    ShortHelp,
    Version,
    Copyright,
    Export(ExportFormat),
}

impl Format {
    pub fn is_terminal(self) -> bool {
        self != Self::Parse
    }
}

/// The command line split into what this parser handles and what a subcommand receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Invocation {
    pub format: Format,
    /// Arguments for this parser's own scan, reserved ids removed.
    pub args: Vec<String>,
    /// The selected keyword and every token after it.
    pub subcommand: Option<(String, Vec<String>)>,
    /// `--version-check <v>` as given by the user.
    pub version_check: Option<bool>,
}

fn missing_subcommand(subcommands: &[String]) -> ParserError {
    ParserError::MissingSubcommand(format!(
        "You either forgot or misspelled the subcommand! Please specify which sub-program you want to use: one of [{}]. Use -h/--help for more information.",
        subcommands.join(", ")
    ))
}

/// Value of a reserved `--name <v>` / `--name=<v>` token, advancing `i` past a separate value.
fn reserved_value<'s>(
    args: &'s [String],
    i: &mut usize,
    arg: &'s str,
    name: &str,
) -> Result<Option<&'s str>, ParserError> {
    let long = format!("--{name}");
    let value = if arg == long {
        let Some(next) = args.get(*i) else {
            return Err(ParserError::TooFewArguments(format!(
                "Missing value for option {long}."
            )));
        };
        *i += 1;
        next.as_str()
    } else if let Some(value) = arg.strip_prefix(&format!("{long}=")) {
        value
    } else {
        return Ok(None);
    };
    if value.is_empty() {
        return Err(ParserError::TooFewArguments(format!(
            "Missing value for option {long}."
        )));
    }
    Ok(Some(value))
}

/// Decide the format and split off a subcommand.
///
/// Reserved identifiers are recognised up to `--` and up to the first subcommand keyword.
/// With subcommands declared, the first token not starting with `-` must be a keyword.
pub(crate) fn determine(
    args: &[String],
    subcommands: &[String],
    version_check_reserved: bool,
) -> Result<Invocation, ParserError> {
    let mut format: Option<Format> = None;
    let mut own = Vec::new();
    let mut subcommand = None;
    let mut version_check = None;

    let mut i = 0usize;
    let mut after_separator = false;
    while i < args.len() {
        let arg = args[i].as_str();
        i += 1;

        if after_separator {
            own.push(arg.to_string());
            continue;
        }
        if arg == "--" {
            after_separator = true;
            own.push(arg.to_string());
            continue;
        }

        if version_check_reserved
            && let Some(value) = reserved_value(args, &mut i, arg, VERSION_CHECK_ID)?
        {
            let decision = bool::parse_arg(value).map_err(|_| {
                ParserError::Validation(format!(
                    "Validation failed for option --{VERSION_CHECK_ID}: Value {value} is not one of [1, true, 0, false]."
                ))
            })?;
            version_check = Some(decision);
            continue;
        }

        if let Some(value) = reserved_value(args, &mut i, arg, "export-help")? {
            let Some(export) = ExportFormat::from_name(value) else {
                return Err(ParserError::Validation(format!(
                    "Validation failed for option --export-help: Value {value} is not one of [{}].",
                    ExportFormat::NAMES.join(", ")
                )));
            };
            format = Some(Format::Export(export));
            continue;
        }

        let terminal = match arg {
            "-h" | "--help" => Some(Format::Help),
            "-hh" | "--advanced-help" => Some(Format::AdvancedHelp),
            "--version" => Some(Format::Version),
            "--copyright" => Some(Format::Copyright),
            _ => None,
        };
        if let Some(terminal) = terminal {
            format = Some(terminal);
            continue;
        }

        if !subcommands.is_empty() && !arg.starts_with('-') {
            if subcommands.iter().any(|k| k == arg) {
                subcommand = Some((arg.to_string(), args[i..].to_vec()));
                break;
            }
            return Err(missing_subcommand(subcommands));
        }

        own.push(arg.to_string());
    }

    let format = match format {
        Some(format) => format,
        None if own.is_empty() && subcommand.is_none() => Format::ShortHelp,
        None if !subcommands.is_empty() && subcommand.is_none() => {
            return Err(missing_subcommand(subcommands));
        }
        None => Format::Parse,
    };
    tracing::debug!(?format, subcommand = ?subcommand.as_ref().map(|(k, _)| k), "determined mode");

    Ok(Invocation {
        format,
        args: own,
        subcommand,
        version_check,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
enum ArgKind {
    Flag,
    Option,
    Positional,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
struct ArgSchema {
    kind: ArgKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    short: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    long: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    value_type: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    help: String,
    required: bool,
    list: bool,
    advanced: bool,
    hidden: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    default_value: Option<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    validation: String,
}

impl ArgSchema {
    fn new(kind: ArgKind, identity: Option<&OptionIdentity>, info: &EntryInfo) -> Self {
        Self {
            kind,
            short: identity.and_then(|id| id.short_id).map(|c| format!("-{c}")),
            long: identity
                .and_then(|id| id.long_id.as_deref())
                .map(|l| format!("--{l}")),
            value_type: info.type_name.clone(),
            help: info.description.clone(),
            required: info.required,
            list: info.list,
            advanced: info.advanced,
            hidden: info.hidden,
            default_value: info.default_display.clone(),
            validation: info.validator_help.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "kebab-case")]
struct CommandSchema<'r> {
    #[serde(flatten)]
    meta: &'r ParserMetaData,
    executable: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    subcommands: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    options: Vec<ArgSchema>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    positionals: Vec<ArgSchema>,
}

/// Read-only view of a parser used by the renderers.
pub(crate) struct Page<'r, 'a> {
    pub meta: &'r ParserMetaData,
    pub executable: String,
    pub registry: &'r Registry<'a>,
    pub version_check_reserved: bool,
}

impl Page<'_, '_> {
    pub fn render(&self, format: Format) -> Result<String, DesignError> {
        match format {
            Format::Parse => Ok(String::new()),
            Format::Help => Ok(self.help(false)),
            Format::AdvancedHelp => Ok(self.help(true)),
            Format::ShortHelp => Ok(self.short_help()),
            Format::Version => Ok(self.version()),
            Format::Copyright => Ok(self.copyright()),
            Format::Export(ExportFormat::Json) => self.export_json(),
        }
    }

    fn title(&self) -> String {
        let summary = self.meta.short_description.trim();
        if summary.is_empty() {
            format!("{}\n", self.meta.app_name)
        } else {
            format!("{} - {summary}\n", self.meta.app_name)
        }
    }

    fn usage_lines(&self) -> Vec<String> {
        if !self.meta.synopsis.is_empty() {
            return self.meta.synopsis.clone();
        }
        let mut usage = self.executable.clone();
        if !self.registry.subcommands.is_empty() {
            usage.push_str(" [FLAGS] <SUBCOMMAND>");
            return vec![usage];
        }
        if !self.registry.options.is_empty() {
            usage.push_str(" [OPTIONS]");
        }
        for (idx, p) in self.registry.positionals.iter().enumerate() {
            if p.info.list {
                usage.push_str(&format!(" [ARGUMENT-{}...]", idx + 1));
            } else {
                usage.push_str(&format!(" <ARGUMENT-{}>", idx + 1));
            }
        }
        vec![usage]
    }

    fn help(&self, advanced: bool) -> String {
        let mut out = self.title();

        out.push_str("\nUsage:\n");
        for line in self.usage_lines() {
            out.push_str(&format!("  {line}\n"));
        }

        if !self.meta.description.is_empty() {
            out.push('\n');
            for paragraph in &self.meta.description {
                out.push_str(paragraph.trim_end());
                out.push('\n');
            }
        }

        if !self.registry.subcommands.is_empty() {
            out.push_str("\nSubcommands:\n");
            for keyword in &self.registry.subcommands {
                out.push_str(&format!("  {keyword}\n"));
            }
            out.push_str(&format!(
                "  See `{} <SUBCOMMAND> -h` for help on a subcommand.\n",
                self.executable
            ));
        }

        let positionals: Vec<(String, String)> = self
            .registry
            .positionals
            .iter()
            .enumerate()
            .map(|(idx, p)| (positional_left(idx, &p.info), entry_help(&p.info)))
            .collect();
        push_rows(&mut out, "Arguments", &positionals);

        let mut options: Vec<(String, String)> = self
            .registry
            .options
            .iter()
            .filter(|o| !o.info.hidden && (advanced || !o.info.advanced))
            .map(|o| (option_left(&o.identity, &o.info), entry_help(&o.info)))
            .collect();
        options.extend(self.builtin_rows());
        push_rows(&mut out, "Options", &options);

        if !self.meta.examples.is_empty() {
            out.push_str("\nExamples:\n");
            for example in self.meta.examples.iter().filter(|e| !e.trim().is_empty()) {
                out.push_str(&format!("  {}\n", example.trim_end()));
            }
        }

        out.push('\n');
        out.push_str(&self.version());
        out
    }

    fn builtin_rows(&self) -> Vec<(String, String)> {
        let mut rows = vec![
            ("-h, --help".to_string(), "Prints the help page.".to_string()),
            (
                "-hh, --advanced-help".to_string(),
                "Prints the help page including advanced options.".to_string(),
            ),
            (
                "--version".to_string(),
                "Prints the version information.".to_string(),
            ),
            (
                "--copyright".to_string(),
                "Prints the copyright/license information.".to_string(),
            ),
            (
                "--export-help <format>".to_string(),
                format!(
                    "Export the help page information. Value must be one of [{}].",
                    ExportFormat::NAMES.join(", ")
                ),
            ),
        ];
        if self.version_check_reserved {
            rows.push((
                format!("--{VERSION_CHECK_ID} <bool>"),
                "Whether to check for the newest app version. Default: true.".to_string(),
            ));
        }
        rows
    }

    fn short_help(&self) -> String {
        let mut out = self.title();
        for line in self.usage_lines() {
            out.push_str(&format!("    {line}\n"));
        }
        out.push_str("    Try -h or --help for more information.\n");
        out
    }

    fn version(&self) -> String {
        let mut out = String::new();
        let version = self.meta.version.trim();
        if version.is_empty() {
            out.push_str(&format!("{}\n", self.meta.app_name));
        } else {
            out.push_str(&format!("{} {version}\n", self.meta.app_name));
        }
        if !self.meta.date.trim().is_empty() {
            out.push_str(&format!("Last update: {}\n", self.meta.date.trim()));
        }
        out.push_str(&format!("argbind {}\n", env!("CARGO_PKG_VERSION")));
        if !self.meta.url.trim().is_empty() {
            out.push_str(&format!("{}\n", self.meta.url.trim()));
        }
        out
    }

    fn copyright(&self) -> String {
        let mut out = format!("Copyright information for {}:\n", self.meta.app_name);
        if self.meta.short_copyright.trim().is_empty() && self.meta.long_copyright.trim().is_empty()
        {
            out.push_str(&format!(
                "{} copyright information not provided. Please contact the application's author.\n",
                self.meta.app_name
            ));
        }
        for text in [&self.meta.short_copyright, &self.meta.long_copyright] {
            if !text.trim().is_empty() {
                out.push_str(text.trim_end());
                out.push('\n');
            }
        }
        if !self.meta.author.trim().is_empty() {
            out.push_str(&format!("Author: {}\n", self.meta.author.trim()));
        }
        if !self.meta.citation.trim().is_empty() {
            out.push_str(&format!(
                "In your academic works please cite: {}\n",
                self.meta.citation.trim()
            ));
        }
        out
    }

    fn export_json(&self) -> Result<String, DesignError> {
        let schema = CommandSchema {
            meta: self.meta,
            executable: self.executable.clone(),
            subcommands: self.registry.subcommands.clone(),
            options: self
                .registry
                .options
                .iter()
                .map(|o| {
                    let kind = if o.info.type_name.is_some() {
                        ArgKind::Option
                    } else {
                        ArgKind::Flag
                    };
                    ArgSchema::new(kind, Some(&o.identity), &o.info)
                })
                .collect(),
            positionals: self
                .registry
                .positionals
                .iter()
                .map(|p| ArgSchema::new(ArgKind::Positional, None, &p.info))
                .collect(),
        };
        let mut json = serde_json::to_string_pretty(&schema)
            .map_err(|e| DesignError::new(format!("Failed to export the help page: {e}")))?;
        json.push('\n');
        Ok(json)
    }
}

fn option_left(identity: &OptionIdentity, info: &EntryInfo) -> String {
    let mut names: Vec<String> = Vec::new();
    if let Some(s) = identity.short_id {
        names.push(format!("-{s}"));
    }
    if let Some(l) = &identity.long_id {
        names.push(format!("--{l}"));
    }
    let mut out = names.join(", ");
    if let Some(type_name) = &info.type_name {
        out.push_str(&format!(" ({type_name})"));
    }
    out
}

fn positional_left(idx: usize, info: &EntryInfo) -> String {
    match &info.type_name {
        Some(type_name) => format!("ARGUMENT-{} ({type_name})", idx + 1),
        None => format!("ARGUMENT-{}", idx + 1),
    }
}

fn entry_help(info: &EntryInfo) -> String {
    let mut parts: Vec<String> = Vec::new();
    if !info.description.trim().is_empty() {
        parts.push(info.description.trim().to_string());
    }
    if info.required && info.type_name.is_some() && !info.list {
        parts.push("(required)".to_string());
    }
    if let Some(default) = &info.default_display {
        parts.push(format!("Default: {default}."));
    }
    if !info.validator_help.is_empty() {
        parts.push(info.validator_help.clone());
    }
    parts.join(" ")
}

fn push_rows(out: &mut String, heading: &str, rows: &[(String, String)]) {
    if rows.is_empty() {
        return;
    }
    out.push_str(&format!("\n{heading}:\n"));
    let width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    for (left, help) in rows {
        if help.is_empty() {
            out.push_str(&format!("  {left}\n"));
        } else {
            out.push_str(&format!("  {left:width$}  {help}\n"));
        }
    }
}
