use argbind::{
    ArithmeticRange, Config, EnumerationNames, NamedEnumeration, ParseResult, Parser,
    RegexValidator, Value,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushMode {
    Simple,
    Matching,
    Current,
}

impl NamedEnumeration for PushMode {
    fn enumeration_names() -> EnumerationNames<Self> {
        vec![
            ("simple".into(), PushMode::Simple),
            ("matching".into(), PushMode::Matching),
            ("current".into(), PushMode::Current),
            ("head".into(), PushMode::Current),
        ]
    }
}

pub fn pull(top: &mut Parser<'_>) -> ParseResult<String> {
    let mut remote = "origin".to_string();
    let mut depth = 0u32;
    let mut branches: Vec<String> = Vec::new();

    let mut sub = top.take_sub_parser()?;
    sub.info.short_description = "Fetch from and integrate with another repository.".to_string();
    sub.add_option(
        &mut remote,
        Config::new()
            .short('r')
            .long("remote")
            .description("Remote to pull from.")
            .validator(RegexValidator::new("[A-Za-z0-9_.-]+")?),
    )?;
    sub.add_option(
        &mut depth,
        Config::new()
            .long("depth")
            .description("Limit fetching to this many commits, 0 for everything.")
            .validator(ArithmeticRange::new(0, 1000)),
    )?;
    sub.add_list_positional(
        &mut branches,
        Config::new().description("Branches to pull.").required(true),
    )?;
    sub.parse_or_exit()?;
    drop(sub);

    Ok(format!(
        "pull remote={remote} depth={depth} branches=[{}]",
        branches.join(", ")
    ))
}

pub fn push(top: &mut Parser<'_>) -> ParseResult<String> {
    let mut force = false;
    let mut mode = PushMode::Simple;
    let mut tags: Vec<String> = Vec::new();
    let mut remote = String::new();
    let mut refs: Vec<String> = Vec::new();

    let mut sub = top.take_sub_parser()?;
    sub.info.short_description = "Update remote refs along with associated objects.".to_string();
    sub.add_flag(
        &mut force,
        Config::new().short('f').long("force").description("Overwrite remote refs."),
    )?;
    sub.add_option(
        &mut mode,
        Config::new().short('m').long("mode").description("Which refs to push."),
    )?;
    sub.add_list_option(
        &mut tags,
        Config::new().short('t').long("tag").description("Tag to push, repeatable."),
    )?;
    sub.add_positional(&mut remote, Config::new().description("Remote to push to."))?;
    sub.add_list_positional(&mut refs, Config::new().description("Refs to push."))?;
    sub.parse_or_exit()?;
    drop(sub);

    Ok(format!(
        "push remote={remote} refs=[{}] force={force} mode={} tags=[{}]",
        refs.join(", "),
        mode.to_arg(),
        tags.join(", ")
    ))
}
