use argbind::{
    Config, NO_VERSION_CHECK_ENV, ParseOutcome, Parser, ParserErrorKind, UpdateNotifications,
};

fn top_level<'a>(args: &[&str], flag: &'a mut bool) -> Parser<'a> {
    let argv = std::iter::once("./test_parser").chain(args.iter().copied());
    let mut top = Parser::new("test_parser", argv).unwrap();
    top.info.version = "1.1.2-rc.1".to_string();
    top.info.author = "Jane Doe".to_string();
    top.add_flag(flag, Config::new().short('f').long("flag")).unwrap();
    top.add_subcommands(["sub1", "sub2"]).unwrap();
    top
}

#[test]
fn top_level_flag_and_subcommand_positional() {
    let mut flag = false;
    let mut value = String::new();
    {
        let mut top = top_level(&["-f", "sub1", "foo"], &mut flag);
        assert_eq!(top.parse().unwrap(), ParseOutcome::Parsed);
        assert_eq!(top.selected_subcommand(), Some("sub1"));

        let mut sub = top.take_sub_parser().unwrap();
        assert_eq!(sub.info.app_name, "test_parser-sub1");
        assert_eq!(sub.info.version, "1.1.2-rc.1");
        assert_eq!(sub.info.author, "Jane Doe");
        assert_eq!(
            sub.executable_name(),
            &["./test_parser".to_string(), "sub1".to_string()][..]
        );
        sub.add_positional(&mut value, Config::new()).unwrap();
        assert_eq!(sub.parse().unwrap(), ParseOutcome::Parsed);
        assert!(!sub.version_check_enabled());
    }
    assert!(flag);
    assert_eq!(value, "foo");
}

#[test]
fn tokens_after_the_keyword_belong_to_the_child() {
    let mut flag = false;
    let mut child_flag = false;
    {
        let mut top = top_level(&["sub2", "-f"], &mut flag);
        top.parse().unwrap();
        let mut sub = top.take_sub_parser().unwrap();
        sub.add_flag(&mut child_flag, Config::new().short('f')).unwrap();
        sub.parse().unwrap();
    }
    assert!(!flag);
    assert!(child_flag);
}

#[test]
fn misspelled_or_missing_keyword_is_an_error() {
    for args in [&["-f", "sub3", "foo"][..], &["-f"]] {
        let mut flag = false;
        let mut top = top_level(args, &mut flag);
        let err = top.parse().unwrap_err();
        assert_eq!(err.parser_kind(), Some(ParserErrorKind::MissingSubcommand));
        assert_eq!(
            err.message(),
            "You either forgot or misspelled the subcommand! Please specify which sub-program you want to use: one of [sub1, sub2]. Use -h/--help for more information."
        );
    }
}

#[test]
fn help_before_the_keyword_is_for_the_top_level() {
    let mut flag = false;
    let mut top = top_level(&["-h", "sub1"], &mut flag);
    let Ok(ParseOutcome::Help(text)) = top.parse() else {
        panic!("expected help output");
    };
    assert!(text.contains("sub1"), "{text}");
    assert!(text.contains("sub2"), "{text}");
    assert!(top.selected_subcommand().is_none());
}

#[test]
fn help_after_the_keyword_is_for_the_child() {
    let mut flag = false;
    let mut depth = 0u32;
    let mut top = top_level(&["sub1", "--help"], &mut flag);
    assert_eq!(top.parse().unwrap(), ParseOutcome::Parsed);

    let mut sub = top.take_sub_parser().unwrap();
    sub.info.short_description = "The first subcommand.".to_string();
    sub.add_option(&mut depth, Config::new().long("depth")).unwrap();
    let Ok(ParseOutcome::Help(text)) = sub.parse() else {
        panic!("expected child help output");
    };
    assert!(text.starts_with("test_parser-sub1 - The first subcommand.\n"), "{text}");
    assert!(text.contains("--depth"), "{text}");
    assert!(!text.contains("--version-check"), "{text}");
}

#[test]
fn children_do_not_reserve_version_check() {
    let mut flag = false;
    let mut top = top_level(&["sub1", "--version-check", "0"], &mut flag);
    top.parse().unwrap();
    let mut sub = top.take_sub_parser().unwrap();
    let err = sub.parse().unwrap_err();
    assert_eq!(err.parser_kind(), Some(ParserErrorKind::UnknownOption));
}

#[test]
fn sub_parser_can_only_be_taken_once() {
    let mut flag = false;
    let mut top = top_level(&["sub1"], &mut flag);
    top.parse().unwrap();
    assert!(top.take_sub_parser().is_ok());
    assert!(top.take_sub_parser().is_err());
}

#[test]
fn version_check_follows_the_user_unless_suppressed() {
    let env_suppressed = std::env::var_os(NO_VERSION_CHECK_ENV).is_some();

    let mut flag = false;
    let mut top = top_level(&["--version-check", "0", "sub1"], &mut flag);
    top.parse().unwrap();
    assert!(!top.version_check_enabled());

    let mut flag = false;
    let mut top = top_level(&["sub1"], &mut flag);
    top.parse().unwrap();
    assert_eq!(top.version_check_enabled(), !env_suppressed);

    let argv = ["./test_parser", "--version-check", "1", "x"];
    let mut positional = String::new();
    let mut quiet = Parser::with_update_notifications("test_parser", argv, UpdateNotifications::Off)
        .unwrap();
    quiet.add_positional(&mut positional, Config::new()).unwrap();
    let err = quiet.parse().unwrap_err();
    assert_eq!(err.parser_kind(), Some(ParserErrorKind::UnknownOption));
    assert!(!quiet.version_check_enabled());
}

#[test]
fn subcommands_nest() {
    let mut flag = false;
    let mut verbose = false;
    let mut target = String::new();
    {
        let mut top = top_level(&["sub1", "-v", "deep", "here"], &mut flag);
        top.parse().unwrap();

        let mut sub = top.take_sub_parser().unwrap();
        sub.add_flag(&mut verbose, Config::new().short('v')).unwrap();
        sub.add_subcommands(["deep"]).unwrap();
        sub.parse().unwrap();
        assert_eq!(sub.selected_subcommand(), Some("deep"));

        let mut deep = sub.take_sub_parser().unwrap();
        assert_eq!(deep.info.app_name, "test_parser-sub1-deep");
        assert_eq!(
            deep.executable_name(),
            &[
                "./test_parser".to_string(),
                "sub1".to_string(),
                "deep".to_string()
            ][..]
        );
        deep.add_positional(&mut target, Config::new()).unwrap();
        deep.parse().unwrap();
    }
    assert!(!flag);
    assert!(verbose);
    assert_eq!(target, "here");
}
