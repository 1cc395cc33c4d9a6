//! Command-line interface for vbsimplifier
//!
//! Loads a VBScript file, runs the selected deobfuscation routines and writes
//! the simplified source.
//!
//! Usage:
//!   vbsimplify -i `<file>` --all                 - Run the default routines
//!   vbsimplify -i `<file>` --math -o `<out>`       - Fold arithmetic only
//!   vbsimplify -i `<file>` -s -f                 - Also report strings and function calls

use clap::{Arg, ArgAction, ArgMatches, Command};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;
use vbsimplifier::vbs::config::{Loader, SimplifierConfig};
use vbsimplifier::vbs::routines::{
    self, RoutineRegistry, COMMENTS, CONCATENATE, MATH, RESOLVE, STR_FUNCTIONS,
};
use vbsimplifier::vbs::{History, Phase, Result, Simplifier, TokenKind, VbsError};

fn main() {
    let matches = Command::new("vbsimplify")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Simplifies obfuscated VBScript/VBA source")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .help("Path to the script to simplify")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .help("Write the result here instead of stdout"),
        )
        .arg(flag("all", None, "Run every routine listed in the configuration"))
        .arg(flag("comments", None, "Remove comment lines"))
        .arg(flag("math", None, "Fold arithmetic on numeric literals"))
        .arg(flag("str-functions", None, "Evaluate string functions on literals"))
        .arg(flag("concatenate", None, "Merge concatenated string literals"))
        .arg(flag("resolve", None, "Substitute variables holding constants (experimental)"))
        .arg(flag("strings", Some('s'), "Report every string literal"))
        .arg(flag("functions", Some('f'), "Report every function call"))
        .arg(flag("line-numbers", Some('n'), "Prefix output lines with their index"))
        .arg(
            Arg::new("history")
                .long("history")
                .help("Write the transformation history (JSON, or YAML for .yaml/.yml)"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("User configuration file layered over the defaults"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Increase log verbosity (repeatable)"),
        )
        .arg(flag("quiet", Some('q'), "Only log errors"))
        .get_matches();

    setup_logging(matches.get_count("verbose"), matches.get_flag("quiet"));

    if let Err(e) = handle_run(&matches) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn flag(name: &'static str, short: Option<char>, help: &'static str) -> Arg {
    let arg = Arg::new(name)
        .long(name)
        .action(ArgAction::SetTrue)
        .help(help);
    match short {
        Some(short) => arg.short(short),
        None => arg,
    }
}

fn setup_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_target(false)
        .with_level(true);

    tracing_subscriber::registry()
        .with(formatter)
        .with(filter)
        .init();
}

fn load_config(matches: &ArgMatches) -> Result<SimplifierConfig> {
    let mut loader = Loader::new();
    if let Some(path) = matches.get_one::<String>("config") {
        loader = loader.with_file(path);
    }
    if matches.get_flag("line-numbers") {
        loader = loader.set_override("output.show_line_numbers", true)?;
    }
    loader.build()
}

/// Routine names to run, in order: the configured list under `--all`, then
/// any individually enabled ones not already included.
fn selected_routines(matches: &ArgMatches, config: &SimplifierConfig) -> Vec<String> {
    let mut names = if matches.get_flag("all") {
        config.pipeline.routines.clone()
    } else {
        Vec::new()
    };
    for (flag, name) in [
        ("comments", COMMENTS),
        ("math", MATH),
        ("str-functions", STR_FUNCTIONS),
        ("concatenate", CONCATENATE),
        ("resolve", RESOLVE),
    ] {
        if matches.get_flag(flag) && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

fn handle_run(matches: &ArgMatches) -> Result<()> {
    let config = load_config(matches)?;
    let input = matches
        .get_one::<String>("input")
        .ok_or_else(|| VbsError::InvalidInput("missing --input".to_string()))?;

    let history = History::from_path(input)?.with_indent(config.render.indent.clone());
    let mut simplifier = Simplifier::new(history);
    let registry = RoutineRegistry::with_defaults(config.pipeline.max_fixpoint_passes)?;

    for name in selected_routines(matches, &config) {
        let routine = registry
            .get(&name)
            .ok_or_else(|| VbsError::InvalidInput(format!("unknown routine '{}'", name)))?;
        simplifier.register(routine);
    }
    simplifier.run(Phase::LINES)?;
    simplifier.run(Phase::MULTILINE)?;

    let mut reports = Vec::new();
    for (flag, name, kind) in [
        ("strings", routines::STRINGS, TokenKind::String),
        ("functions", routines::FUNCTIONS, TokenKind::Function),
    ] {
        if !matches.get_flag(flag) {
            continue;
        }
        if let Some(routine) = registry.get(name) {
            simplifier.run_routine(&routine)?;
            reports.push((name, kind));
        }
    }

    let show_line_numbers = config.output.show_line_numbers;
    match matches.get_one::<String>("output") {
        Some(path) => {
            simplifier.dump_to_path(path, show_line_numbers)?;
            info!(path = %path, "wrote simplified source");
        }
        None => simplifier.dump(&mut io::stdout().lock(), show_line_numbers)?,
    }

    if !reports.is_empty() {
        let mut stdout = io::stdout().lock();
        for (name, kind) in reports {
            writeln!(stdout, "\n[{}]", name)?;
            for entry in registry.report().of_kind(kind) {
                writeln!(stdout, "{}", entry)?;
            }
        }
    }

    if let Some(path) = matches.get_one::<String>("history") {
        write_history(simplifier.history(), Path::new(path))?;
    }
    Ok(())
}

fn write_history(history: &History, path: &Path) -> Result<()> {
    let yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let text = if yaml {
        history.to_yaml()?
    } else {
        history.to_json()?
    };
    fs::write(path, text)?;
    Ok(())
}
