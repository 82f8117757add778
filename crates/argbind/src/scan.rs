//! Tokenizer and matcher for the ordinary (non-terminal) command line.
//!
//! The scanner only classifies tokens: every token becomes an option value, a flag
//! occurrence, a positional, or the `--` terminator. Conversion happens later.

use crate::error::ParserError;
use crate::identity::OptionIdentity;

/// What the scanner needs to know about a registered option or flag.
pub(crate) struct ScanTarget<'r> {
    pub identity: &'r OptionIdentity,
    pub takes_value: bool,
}

/// Occurrences of one option: the identifier as written and the value token
/// (empty for flags).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Hits {
    pub occurrences: Vec<(String, String)>,
}

impl Hits {
    pub fn push(&mut self, spelled: &str, value: Option<&str>) {
        self.occurrences
            .push((spelled.to_string(), value.unwrap_or_default().to_string()));
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

#[derive(Debug, Default)]
pub(crate) struct Scan {
    /// Parallel to the targets passed to [`scan`].
    pub hits: Vec<Hits>,
    pub positionals: Vec<String>,
}

const UNKNOWN_TAIL: &str = "In case this is meant to be a non-option/argument/parameter, please specify the start of non-options with '--'. See -h/--help for program information.";

fn unknown_option(token: &str) -> ParserError {
    ParserError::UnknownOption(format!("Unknown option {token}. {UNKNOWN_TAIL}"))
}

/// `-abc` becomes `-a, -b and -c`.
fn expand_cluster(cluster: &str) -> String {
    let letters: Vec<String> = cluster.chars().map(|c| format!("-{c}")).collect();
    match letters.split_last() {
        Some((last, init)) if !init.is_empty() => format!("{} and {last}", init.join(", ")),
        Some((last, _)) => last.clone(),
        None => String::new(),
    }
}

fn unknown_cluster(token: &str) -> ParserError {
    let cluster = &token[1..];
    if cluster.chars().count() > 1 {
        ParserError::UnknownOption(format!(
            "Unknown flags {}. {UNKNOWN_TAIL}",
            expand_cluster(cluster)
        ))
    } else {
        unknown_option(token)
    }
}

fn missing_value(spelled: &str) -> ParserError {
    ParserError::TooFewArguments(format!("Missing value for option {spelled}."))
}

/// Classify `args` against `targets`.
///
/// Long identifiers must match exactly. Within a short cluster every letter up to the first
/// value-taking option must be a flag; the rest of the token (after an optional `=`) is that
/// option's value, or the next token if nothing is left. An option value is taken verbatim
/// even when it starts with `-`.
pub(crate) fn scan(args: &[String], targets: &[ScanTarget<'_>]) -> Result<Scan, ParserError> {
    let mut out = Scan {
        hits: vec![Hits::default(); targets.len()],
        positionals: Vec::new(),
    };

    let mut i = 0usize;
    let mut after_separator = false;
    while i < args.len() {
        let arg = args[i].as_str();
        i += 1;

        if after_separator {
            out.positionals.push(arg.to_string());
            continue;
        }
        if arg == "--" {
            after_separator = true;
            continue;
        }

        if let Some(body) = arg.strip_prefix("--") {
            let (name, inline) = match body.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (body, None),
            };
            let Some(idx) = targets.iter().position(|t| t.identity.matches_long(name)) else {
                return Err(unknown_option(arg));
            };
            let spelled = format!("--{name}");
            if !targets[idx].takes_value {
                if inline.is_some() {
                    return Err(unknown_option(arg));
                }
                out.hits[idx].push(&spelled, None);
                continue;
            }
            let value = match inline {
                Some("") => return Err(missing_value(&spelled)),
                Some(value) => value,
                None => {
                    let Some(next) = args.get(i) else {
                        return Err(missing_value(&spelled));
                    };
                    i += 1;
                    next.as_str()
                }
            };
            out.hits[idx].push(&spelled, Some(value));
            continue;
        }

        if arg.len() > 1
            && let Some(cluster) = arg.strip_prefix('-')
        {
            for (offset, c) in cluster.char_indices() {
                let Some(idx) = targets.iter().position(|t| t.identity.matches_short(c)) else {
                    return Err(unknown_cluster(arg));
                };
                let spelled = format!("-{c}");
                if !targets[idx].takes_value {
                    out.hits[idx].push(&spelled, None);
                    continue;
                }
                let rest = &cluster[offset + c.len_utf8()..];
                let value = match rest.strip_prefix('=') {
                    Some("") => return Err(missing_value(&spelled)),
                    Some(value) => value,
                    None if !rest.is_empty() => rest,
                    None => {
                        let Some(next) = args.get(i) else {
                            return Err(missing_value(&spelled));
                        };
                        i += 1;
                        next.as_str()
                    }
                };
                out.hits[idx].push(&spelled, Some(value));
                break;
            }
            continue;
        }

        out.positionals.push(arg.to_string());
    }

    tracing::debug!(
        positionals = out.positionals.len(),
        options = out.hits.iter().filter(|h| !h.is_empty()).count(),
        "scanned command line"
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    struct Fixture {
        ids: Vec<(OptionIdentity, bool)>,
    }

    impl Fixture {
        /// `-i/--int` option, `-o/--opt` option, flags `-a`, `-b`, `-c/--cee`.
        fn new() -> Self {
            let id = |s: char, l: Option<&str>| OptionIdentity::new(Some(s), l.map(str::to_string));
            Self {
                ids: vec![
                    (id('i', Some("int")), true),
                    (id('o', Some("opt")), true),
                    (id('a', None), false),
                    (id('b', None), false),
                    (id('c', Some("cee")), false),
                ],
            }
        }

        fn scan(&self, list: &[&str]) -> Result<Scan, ParserError> {
            let targets: Vec<ScanTarget<'_>> = self
                .ids
                .iter()
                .map(|(identity, takes_value)| ScanTarget {
                    identity,
                    takes_value: *takes_value,
                })
                .collect();
            scan(&args(list), &targets)
        }
    }

    fn values(scan: &Scan, idx: usize) -> Vec<&str> {
        scan.hits[idx]
            .occurrences
            .iter()
            .map(|(_, v)| v.as_str())
            .collect()
    }

    #[test]
    fn value_spellings_are_equivalent() {
        let fixture = Fixture::new();
        for list in [
            &["--opt", "value"][..],
            &["--opt=value"],
            &["-o", "value"],
            &["-ovalue"],
            &["-o=value"],
        ] {
            let Ok(scan) = fixture.scan(list) else {
                panic!("scan failed for {list:?}");
            };
            assert_eq!(values(&scan, 1), vec!["value"], "{list:?}");
            assert!(scan.positionals.is_empty());
        }
    }

    #[test]
    fn flag_cluster_and_trailing_option() {
        let fixture = Fixture::new();
        let scan = fixture.scan(&["-abc"]).unwrap();
        assert_eq!(scan.hits[2].len(), 1);
        assert_eq!(scan.hits[3].len(), 1);
        assert_eq!(scan.hits[4].len(), 1);

        let scan = fixture.scan(&["-ab", "-i5"]).unwrap();
        assert_eq!(values(&scan, 0), vec!["5"]);

        let scan = fixture.scan(&["-abi", "7"]).unwrap();
        assert_eq!(values(&scan, 0), vec!["7"]);
        assert_eq!(scan.hits[3].len(), 1);
    }

    #[test]
    fn separator_and_dash_values() {
        let fixture = Fixture::new();
        let scan = fixture.scan(&["-i", "-5", "--", "-120", "--opt"]).unwrap();
        assert_eq!(values(&scan, 0), vec!["-5"]);
        assert_eq!(scan.positionals, args(&["-120", "--opt"]));

        let scan = fixture.scan(&["-", "x"]).unwrap();
        assert_eq!(scan.positionals, args(&["-", "x"]));
    }

    #[test]
    fn long_names_need_exact_match() {
        let fixture = Fixture::new();
        let Err(err) = fixture.scan(&["--in", "3"]) else {
            panic!("prefix of --int must not match");
        };
        assert_eq!(
            err.message(),
            "Unknown option --in. In case this is meant to be a non-option/argument/parameter, please specify the start of non-options with '--'. See -h/--help for program information."
        );
        assert!(fixture.scan(&["--integer", "3"]).is_err());
    }

    #[test]
    fn unknown_short_tokens() {
        let fixture = Fixture::new();
        let Err(err) = fixture.scan(&["-xyz"]) else {
            panic!("unknown cluster accepted");
        };
        assert!(err.message().starts_with("Unknown flags -x, -y and -z."));

        let Err(err) = fixture.scan(&["-5"]) else {
            panic!("negative number accepted as option");
        };
        assert!(err.message().starts_with("Unknown option -5."));

        assert!(fixture.scan(&["--cee=1"]).is_err());
    }

    #[test]
    fn missing_values() {
        let fixture = Fixture::new();
        for list in [&["-i"][..], &["--int"], &["-i="], &["--int="], &["-abi"]] {
            match fixture.scan(list) {
                Err(ParserError::TooFewArguments(msg)) => {
                    assert!(msg.starts_with("Missing value for option"), "{msg}")
                }
                other => panic!("unexpected result for {list:?}: {other:?}"),
            }
        }
    }

    #[test]
    fn repeated_occurrences_are_recorded_in_order() {
        let fixture = Fixture::new();
        let scan = fixture.scan(&["-i", "1", "--int=2", "-i3"]).unwrap();
        assert_eq!(values(&scan, 0), vec!["1", "2", "3"]);
        let spelled: Vec<&str> = scan.hits[0]
            .occurrences
            .iter()
            .map(|(s, _)| s.as_str())
            .collect();
        assert_eq!(spelled, vec!["-i", "--int", "-i"]);
    }

    #[test]
    fn expands_clusters_like_prose() {
        assert_eq!(expand_cluster("ab"), "-a and -b");
        assert_eq!(expand_cluster("a"), "-a");
    }
}
