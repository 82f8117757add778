//! Validators: composable predicates applied to a value after conversion.
//!
//! Every validator renders a help message and checks one value. Validators compose with
//! [`ValidatorExt::chain`] or `|`; the composed validator fails on the first failing
//! component and joins the component help messages in order.

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::ops::BitOr;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use regex::Regex;
use thiserror::Error;

use crate::error::DesignError;
use crate::value::Value;

/// Failure message of a validator, without option context.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(String);

impl ValidationError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    pub fn message(&self) -> &str {
        self.0.as_str()
    }
}

pub trait HelpMessage {
    /// Human-readable description of what the validator accepts. Empty if nothing to say.
    fn help_message(&self) -> String;
}

pub trait Validator<T: ?Sized>: HelpMessage {
    fn validate(&self, value: &T) -> Result<(), ValidationError>;
}

pub trait ValidatorExt: HelpMessage + Sized {
    fn chain<B: HelpMessage>(self, other: B) -> Chain<Self, B> {
        Chain::new(self, other)
    }
}

impl<V: HelpMessage> ValidatorExt for V {}

/// Accepts every value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DefaultValidator;

impl HelpMessage for DefaultValidator {
    fn help_message(&self) -> String {
        String::new()
    }
}

impl<T: ?Sized> Validator<T> for DefaultValidator {
    fn validate(&self, _value: &T) -> Result<(), ValidationError> {
        Ok(())
    }
}

/// Logical AND of two validators.
#[derive(Debug, Clone, Default)]
pub struct Chain<A, B> {
    first: A,
    second: B,
}

impl<A, B> Chain<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }
}

impl<A: HelpMessage, B: HelpMessage> HelpMessage for Chain<A, B> {
    fn help_message(&self) -> String {
        let first = self.first.help_message();
        let second = self.second.help_message();
        match (first.is_empty(), second.is_empty()) {
            (true, _) => second,
            (_, true) => first,
            _ => format!("{first} {second}"),
        }
    }
}

impl<T: ?Sized, A: Validator<T>, B: Validator<T>> Validator<T> for Chain<A, B> {
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        self.first.validate(value)?;
        self.second.validate(value)
    }
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArithmeticRange<N> {
    min: N,
    max: N,
}

impl<N> ArithmeticRange<N> {
    pub fn new(min: N, max: N) -> Self {
        Self { min, max }
    }
}

impl<N: fmt::Display> HelpMessage for ArithmeticRange<N> {
    fn help_message(&self) -> String {
        format!("Value must be in range [{},{}].", self.min, self.max)
    }
}

impl<N: PartialOrd + fmt::Display> Validator<N> for ArithmeticRange<N> {
    fn validate(&self, value: &N) -> Result<(), ValidationError> {
        if *value < self.min || *value > self.max {
            return Err(ValidationError::new(format!(
                "Value {value} is not in range [{},{}].",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Membership in a finite set of values.
#[derive(Debug, Clone, PartialEq)]
pub struct ValueList<V> {
    values: Vec<V>,
}

impl<V> ValueList<V> {
    pub fn new(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            values: values.into_iter().collect(),
        }
    }

    pub fn values(&self) -> &[V] {
        &self.values
    }
}

impl<V: Value> ValueList<V> {
    fn rendered(&self) -> String {
        let mut names: Vec<String> = Vec::with_capacity(self.values.len());
        for name in self.values.iter().map(Value::to_arg) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names.join(", ")
    }
}

impl<V: Value> HelpMessage for ValueList<V> {
    fn help_message(&self) -> String {
        format!("Value must be one of [{}].", self.rendered())
    }
}

impl<T, V> Validator<T> for ValueList<V>
where
    T: Value + PartialEq<V>,
    V: Value,
{
    fn validate(&self, value: &T) -> Result<(), ValidationError> {
        if self.values.iter().any(|allowed| value == allowed) {
            return Ok(());
        }
        Err(ValidationError::new(format!(
            "Value {} is not one of [{}].",
            value.to_arg(),
            self.rendered()
        )))
    }
}

/// Full match of the value's string form against a regular expression.
#[derive(Debug, Clone)]
pub struct RegexValidator {
    pattern: String,
    regex: Regex,
}

impl RegexValidator {
    pub fn new(pattern: impl Into<String>) -> Result<Self, DesignError> {
        let pattern = pattern.into();
        let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
            DesignError::new(format!("Invalid regular expression '{pattern}': {e}"))
        })?;
        Ok(Self { pattern, regex })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    fn check(&self, text: &str) -> Result<(), ValidationError> {
        if self.regex.is_match(text) {
            return Ok(());
        }
        Err(ValidationError::new(format!(
            "Value {text} did not match the pattern {}.",
            self.pattern
        )))
    }
}

impl HelpMessage for RegexValidator {
    fn help_message(&self) -> String {
        format!("Value must match the pattern '{}'.", self.pattern)
    }
}

impl Validator<String> for RegexValidator {
    fn validate(&self, value: &String) -> Result<(), ValidationError> {
        self.check(value)
    }
}

impl Validator<PathBuf> for RegexValidator {
    fn validate(&self, value: &PathBuf) -> Result<(), ValidationError> {
        self.check(&value.to_string_lossy())
    }
}

/// Probes the path validators consult.
pub trait FileSystem {
    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn is_readable(&self, path: &Path) -> bool;
    /// For a missing path: whether it could be created.
    fn is_writable(&self, path: &Path) -> bool;
}

/// Probes backed by the operating system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OsFileSystem;

impl FileSystem for OsFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_readable(&self, path: &Path) -> bool {
        if path.is_dir() {
            fs::read_dir(path).is_ok()
        } else {
            File::open(path).is_ok()
        }
    }

    fn is_writable(&self, path: &Path) -> bool {
        if path.is_dir() {
            return dir_accepts_files(path);
        }
        if path.exists() {
            return OpenOptions::new().append(true).open(path).is_ok();
        }
        let parent = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        parent.is_dir() && dir_accepts_files(parent)
    }
}

fn dir_accepts_files(dir: &Path) -> bool {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    let probe = dir.join(format!(".argbind-probe-{}-{nanos}", std::process::id()));
    match OpenOptions::new().write(true).create_new(true).open(&probe) {
        Ok(_) => {
            let _ = fs::remove_file(&probe);
            true
        }
        Err(_) => false,
    }
}

fn normalize_extensions(extensions: impl IntoIterator<Item = impl Into<String>>) -> Vec<String> {
    extensions
        .into_iter()
        .map(Into::into)
        .map(|ext| ext.trim_start_matches('.').to_string())
        .filter(|ext| !ext.is_empty())
        .collect()
}

fn extension_help(extensions: &[String]) -> String {
    if extensions.is_empty() {
        String::new()
    } else {
        format!(" Valid file extensions are: [{}].", extensions.join(", "))
    }
}

/// Extensions may span several dots (`fa.gz`); matching is on the file name suffix.
fn check_extension(path: &Path, extensions: &[String]) -> Result<(), ValidationError> {
    if extensions.is_empty() {
        return Ok(());
    }
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    if extensions
        .iter()
        .any(|ext| name.len() > ext.len() + 1 && name.ends_with(&format!(".{ext}")))
    {
        return Ok(());
    }
    let list = extensions.join(", ");
    match path.extension() {
        Some(ext) => Err(ValidationError::new(format!(
            "Expected one of the following valid extensions: [{list}]! Got {} instead!",
            ext.to_string_lossy()
        ))),
        None => Err(ValidationError::new(format!(
            "The given filename {name} has no extension. Expected one of the following valid extensions: [{list}]!"
        ))),
    }
}

macro_rules! impl_path_validator {
    ($name:ident) => {
        impl<F: FileSystem> Validator<PathBuf> for $name<F> {
            fn validate(&self, value: &PathBuf) -> Result<(), ValidationError> {
                self.check(value)
            }
        }

        impl<F: FileSystem> Validator<String> for $name<F> {
            fn validate(&self, value: &String) -> Result<(), ValidationError> {
                self.check(Path::new(value))
            }
        }
    };
}

/// An existing, readable regular file, optionally with one of the given extensions.
#[derive(Debug, Clone, Default)]
pub struct InputFile<F = OsFileSystem> {
    extensions: Vec<String>,
    fs: F,
}

impl InputFile {
    pub fn new(extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            extensions: normalize_extensions(extensions),
            fs: OsFileSystem,
        }
    }
}

impl<F: FileSystem> InputFile<F> {
    pub fn with_file_system<G: FileSystem>(self, fs: G) -> InputFile<G> {
        InputFile {
            extensions: self.extensions,
            fs,
        }
    }

    fn check(&self, path: &Path) -> Result<(), ValidationError> {
        check_extension(path, &self.extensions)?;
        if !self.fs.exists(path) {
            return Err(ValidationError::new(format!(
                "The file {} does not exist!",
                path.display()
            )));
        }
        if self.fs.is_dir(path) {
            return Err(ValidationError::new(format!(
                "The path {} is a directory, not a file!",
                path.display()
            )));
        }
        if !self.fs.is_readable(path) {
            return Err(ValidationError::new(format!(
                "Cannot read the file {}!",
                path.display()
            )));
        }
        Ok(())
    }
}

impl<F> HelpMessage for InputFile<F> {
    fn help_message(&self) -> String {
        format!(
            "The input file must exist and read permissions must be granted.{}",
            extension_help(&self.extensions)
        )
    }
}

impl_path_validator!(InputFile);

/// What an [`OutputFile`] does about an existing file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFileMode {
    /// The file must not exist yet.
    #[default]
    CreateNew,
    /// An existing file may be overwritten.
    OpenOrCreate,
}

/// A writable output file path, optionally with one of the given extensions.
#[derive(Debug, Clone, Default)]
pub struct OutputFile<F = OsFileSystem> {
    mode: OutputFileMode,
    extensions: Vec<String>,
    fs: F,
}

impl OutputFile {
    pub fn new(mode: OutputFileMode, extensions: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            mode,
            extensions: normalize_extensions(extensions),
            fs: OsFileSystem,
        }
    }
}

impl<F: FileSystem> OutputFile<F> {
    pub fn with_file_system<G: FileSystem>(self, fs: G) -> OutputFile<G> {
        OutputFile {
            mode: self.mode,
            extensions: self.extensions,
            fs,
        }
    }

    pub fn mode(&self) -> OutputFileMode {
        self.mode
    }

    fn check(&self, path: &Path) -> Result<(), ValidationError> {
        check_extension(path, &self.extensions)?;
        if self.fs.is_dir(path) {
            return Err(ValidationError::new(format!(
                "The path {} is a directory, not a file!",
                path.display()
            )));
        }
        if self.mode == OutputFileMode::CreateNew && self.fs.exists(path) {
            return Err(ValidationError::new(format!(
                "The file {} already exists!",
                path.display()
            )));
        }
        if !self.fs.is_writable(path) {
            return Err(ValidationError::new(format!(
                "Cannot write {}!",
                path.display()
            )));
        }
        Ok(())
    }
}

impl<F> HelpMessage for OutputFile<F> {
    fn help_message(&self) -> String {
        let base = match self.mode {
            OutputFileMode::CreateNew => {
                "The output file must not exist already and write permissions must be granted."
            }
            OutputFileMode::OpenOrCreate => "Write permissions must be granted.",
        };
        format!("{base}{}", extension_help(&self.extensions))
    }
}

impl_path_validator!(OutputFile);

/// An existing, readable directory.
#[derive(Debug, Clone, Default)]
pub struct InputDirectory<F = OsFileSystem> {
    fs: F,
}

impl InputDirectory {
    pub fn new() -> Self {
        Self { fs: OsFileSystem }
    }
}

impl<F: FileSystem> InputDirectory<F> {
    pub fn with_file_system<G: FileSystem>(self, fs: G) -> InputDirectory<G> {
        InputDirectory { fs }
    }

    fn check(&self, path: &Path) -> Result<(), ValidationError> {
        if !self.fs.exists(path) {
            return Err(ValidationError::new(format!(
                "The directory {} does not exist!",
                path.display()
            )));
        }
        if !self.fs.is_dir(path) {
            return Err(ValidationError::new(format!(
                "The path {} is not a directory!",
                path.display()
            )));
        }
        if !self.fs.is_readable(path) {
            return Err(ValidationError::new(format!(
                "Cannot read the directory {}!",
                path.display()
            )));
        }
        Ok(())
    }
}

impl<F> HelpMessage for InputDirectory<F> {
    fn help_message(&self) -> String {
        "An existing, readable path for the input directory.".to_string()
    }
}

impl_path_validator!(InputDirectory);

/// A directory that exists and is writable, or could be created.
#[derive(Debug, Clone, Default)]
pub struct OutputDirectory<F = OsFileSystem> {
    fs: F,
}

impl OutputDirectory {
    pub fn new() -> Self {
        Self { fs: OsFileSystem }
    }
}

impl<F: FileSystem> OutputDirectory<F> {
    pub fn with_file_system<G: FileSystem>(self, fs: G) -> OutputDirectory<G> {
        OutputDirectory { fs }
    }

    fn check(&self, path: &Path) -> Result<(), ValidationError> {
        if self.fs.exists(path) && !self.fs.is_dir(path) {
            return Err(ValidationError::new(format!(
                "The path {} is not a directory!",
                path.display()
            )));
        }
        if !self.fs.is_writable(path) {
            return Err(ValidationError::new(format!(
                "Cannot write to the directory {}!",
                path.display()
            )));
        }
        Ok(())
    }
}

impl<F> HelpMessage for OutputDirectory<F> {
    fn help_message(&self) -> String {
        "A valid path for the output directory.".to_string()
    }
}

impl_path_validator!(OutputDirectory);

macro_rules! impl_bitor {
    ($([$($g:ident),*] $ty:ty),* $(,)?) => {
        $(
            impl<$($g,)* Rhs: HelpMessage> BitOr<Rhs> for $ty {
                type Output = Chain<Self, Rhs>;

                fn bitor(self, rhs: Rhs) -> Self::Output {
                    Chain::new(self, rhs)
                }
            }
        )*
    };
}

impl_bitor!(
    [] DefaultValidator,
    [A, B] Chain<A, B>,
    [N] ArithmeticRange<N>,
    [V] ValueList<V>,
    [] RegexValidator,
    [F] InputFile<F>,
    [F] OutputFile<F>,
    [F] InputDirectory<F>,
    [F] OutputDirectory<F>,
);

#[cfg(test)]
mod tests {
    use super::*;

    struct ScratchDir(PathBuf);

    impl ScratchDir {
        fn new(label: &str) -> Self {
            let nanos = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .unwrap()
                .as_nanos();
            let dir = std::env::temp_dir().join(format!(
                "argbind-{label}-{}-{nanos}",
                std::process::id()
            ));
            fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for ScratchDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    /// Everything exists and nothing is readable or writable.
    struct LockedDown;

    impl FileSystem for LockedDown {
        fn exists(&self, _path: &Path) -> bool {
            true
        }

        fn is_dir(&self, path: &Path) -> bool {
            path.extension().is_none()
        }

        fn is_readable(&self, _path: &Path) -> bool {
            false
        }

        fn is_writable(&self, _path: &Path) -> bool {
            false
        }
    }

    #[test]
    fn range_is_inclusive() {
        let range = ArithmeticRange::new(1i32, 20);
        assert!(range.validate(&1).is_ok());
        assert!(range.validate(&20).is_ok());
        let err = range.validate(&21).unwrap_err();
        assert_eq!(err.message(), "Value 21 is not in range [1,20].");
        assert_eq!(range.help_message(), "Value must be in range [1,20].");

        let range = ArithmeticRange::new(-1.5, 2.5);
        assert!(range.validate(&-1.5).is_ok());
        assert!(range.validate(&2.6).is_err());
    }

    #[test]
    fn value_list_over_strings_and_numbers() {
        let list = ValueList::new(["ha".to_string(), "ba".to_string(), "ma".to_string()]);
        assert!(list.validate(&"ba".to_string()).is_ok());
        let err = list.validate(&"la".to_string()).unwrap_err();
        assert_eq!(err.message(), "Value la is not one of [ha, ba, ma].");
        assert_eq!(list.help_message(), "Value must be one of [ha, ba, ma].");

        let list = ValueList::new(vec![2, 4, 6, 8]);
        assert!(list.validate(&4i32).is_ok());
        assert!(list.validate(&3i32).is_err());
    }

    #[test]
    fn chain_runs_in_order_and_joins_help() {
        let chained = ArithmeticRange::new(0i32, 20) | ValueList::new(vec![2, 4, 6, 8]);
        assert!(chained.validate(&4).is_ok());
        assert!(chained.validate(&3).is_err());
        let err = chained.validate(&30).unwrap_err();
        assert_eq!(err.message(), "Value 30 is not in range [0,20].");
        assert_eq!(
            chained.help_message(),
            "Value must be in range [0,20]. Value must be one of [2, 4, 6, 8]."
        );
    }

    #[test]
    fn chain_is_associative_and_skips_empty_help() {
        let left = (ArithmeticRange::new(0i32, 20) | ValueList::new(vec![2, 4]))
            | ArithmeticRange::new(3, 5);
        let right = ArithmeticRange::new(0i32, 20)
            .chain(ValueList::new(vec![2, 4]).chain(ArithmeticRange::new(3, 5)));
        assert_eq!(left.help_message(), right.help_message());
        for v in [2, 3, 4, 30] {
            assert_eq!(left.validate(&v).is_ok(), right.validate(&v).is_ok(), "value {v}");
        }

        let with_default = DefaultValidator | ArithmeticRange::new(1i32, 2);
        assert_eq!(with_default.help_message(), "Value must be in range [1,2].");
    }

    #[test]
    fn regex_requires_full_match() {
        let re = RegexValidator::new("[a-z]+@[a-z]+\\.com").unwrap();
        assert!(re.validate(&"me@foo.com".to_string()).is_ok());
        let err = re.validate(&"me@foo.com.de".to_string()).unwrap_err();
        assert_eq!(
            err.message(),
            "Value me@foo.com.de did not match the pattern [a-z]+@[a-z]+\\.com."
        );
        assert!(re.validate(&PathBuf::from("a@b.com")).is_ok());
        assert!(RegexValidator::new("(unclosed").is_err());
    }

    #[test]
    fn input_file_checks_existence_and_extension() {
        let dir = ScratchDir::new("input-file");
        let file = dir.path().join("reads.fa");
        fs::write(&file, ">seq\nACGT\n").unwrap();

        let any = InputFile::new(Vec::<String>::new());
        assert!(any.validate(&file).is_ok());
        assert!(any.validate(&dir.path().join("missing.fa")).is_err());
        assert!(any.validate(&dir.path().to_path_buf()).is_err());

        let fasta = InputFile::new(["fa", ".fasta"]);
        assert!(fasta.validate(&file).is_ok());
        let err = fasta.validate(&dir.path().join("reads.sam")).unwrap_err();
        assert_eq!(
            err.message(),
            "Expected one of the following valid extensions: [fa, fasta]! Got sam instead!"
        );
        assert_eq!(
            fasta.help_message(),
            "The input file must exist and read permissions must be granted. Valid file extensions are: [fa, fasta]."
        );
    }

    #[test]
    fn compound_extension_matches_suffix() {
        let dir = ScratchDir::new("compound");
        let file = dir.path().join("reads.fa.gz");
        fs::write(&file, b"").unwrap();
        assert!(InputFile::new(["fa.gz"]).validate(&file).is_ok());
        assert!(InputFile::new(["fa"]).validate(&file).is_err());
    }

    #[test]
    fn output_file_modes() {
        let dir = ScratchDir::new("output-file");
        let existing = dir.path().join("out.txt");
        fs::write(&existing, b"old").unwrap();
        let fresh = dir.path().join("new.txt");

        let create = OutputFile::new(OutputFileMode::CreateNew, Vec::<String>::new());
        assert!(create.validate(&fresh).is_ok());
        assert!(!fresh.exists());
        let err = create.validate(&existing).unwrap_err();
        assert!(err.message().contains("already exists"));

        let overwrite = OutputFile::new(OutputFileMode::OpenOrCreate, ["txt"]);
        assert!(overwrite.validate(&existing).is_ok());
        assert_eq!(
            overwrite.help_message(),
            "Write permissions must be granted. Valid file extensions are: [txt]."
        );
        assert_eq!(
            create.help_message(),
            "The output file must not exist already and write permissions must be granted."
        );
    }

    #[test]
    fn directories() {
        let dir = ScratchDir::new("dirs");
        let file = dir.path().join("file.txt");
        fs::write(&file, b"").unwrap();

        assert!(InputDirectory::new().validate(&dir.path().to_path_buf()).is_ok());
        assert!(InputDirectory::new().validate(&file).is_err());
        assert!(OutputDirectory::new().validate(&dir.path().join("sub")).is_ok());
        assert!(OutputDirectory::new().validate(&file).is_err());
    }

    #[test]
    fn permission_failures_come_from_the_probe() {
        let input = InputFile::new(Vec::<String>::new()).with_file_system(LockedDown);
        let err = input.validate(&PathBuf::from("/data/in.txt")).unwrap_err();
        assert_eq!(err.message(), "Cannot read the file /data/in.txt!");

        let output =
            OutputFile::new(OutputFileMode::OpenOrCreate, Vec::<String>::new()).with_file_system(LockedDown);
        assert!(output.validate(&PathBuf::from("/data/out.txt")).is_err());

        let dir = InputDirectory::new().with_file_system(LockedDown);
        assert!(dir.validate(&PathBuf::from("/data")).is_err());
        let dir = OutputDirectory::new().with_file_system(LockedDown);
        assert!(dir.validate(&"/data".to_string()).is_err());
    }
}
