mod commands;

use anyhow::Result;
use argbind::{Config, Error, ParseResult, Parser};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> Result<()> {
    init_tracing();
    match run(std::env::args().collect()) {
        Ok(lines) => {
            for line in lines {
                println!("{line}");
            }
            Ok(())
        }
        Err(Error::Parser(err)) => {
            eprintln!("[Error] {}", err.message());
            std::process::exit(255);
        }
        Err(err) => Err(err.into()),
    }
}

fn run(argv: Vec<String>) -> ParseResult<Vec<String>> {
    let mut verbose = false;

    let mut top = Parser::new("mygit", argv)?;
    top.info.version = env!("CARGO_PKG_VERSION").to_string();
    top.info.short_description = "A git-like demo built on argbind.".to_string();
    top.info.date = "2026-10-16".to_string();
    top.info.examples = vec![
        "mygit pull -r upstream main".to_string(),
        "mygit -v push --mode current origin HEAD".to_string(),
    ];
    top.add_flag(
        &mut verbose,
        Config::new()
            .short('v')
            .long("verbose")
            .description("Report which subcommand ran."),
    )?;
    top.add_subcommands(["pull", "push"])?;
    top.parse_or_exit()?;

    if top.version_check_enabled() {
        tracing::debug!("update notifications are enabled");
    }

    let selected = top.selected_subcommand().map(str::to_string);
    let mut lines = match selected.as_deref() {
        Some("pull") => vec![commands::pull(&mut top)?],
        Some("push") => vec![commands::push(&mut top)?],
        _ => Vec::new(),
    };
    drop(top);

    if verbose {
        lines.insert(0, "verbose".to_string());
    }
    Ok(lines)
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}
