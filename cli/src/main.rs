mod config;
mod test_runner;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use flexverb::{Script, Sentence, Statement};
use flexverb_interpreter::{ActionRegistry, DiagnosticError, WriterActions};

const SUBCOMMANDS: &[&str] = &["run", "eval", "verbs", "test", "help"];

/// Options whose value is the following argument.
const VALUE_OPTIONS: &[&str] = &["-r", "--registry", "-c", "--category"];

#[derive(Parser)]
#[command(name = "flexverb", version, about = "Free word order command interpreter")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log more (-v for info, -vv for debug). RUST_LOG overrides.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// TOML file with a [verbs] table (defaults to the built-in `print`)
    #[arg(short, long, global = true)]
    registry: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a script of one sentence per line
    Run(RunArgs),

    /// Interpret a single sentence given on the command line
    Eval(EvalArgs),

    /// List the verbs in the action registry
    Verbs,

    /// Run .test.fv test files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RunArgs {
    /// Script file to execute
    file: String,

    /// Parse and resolve only, don't execute (exit 0 if valid)
    #[arg(long)]
    check: bool,

    /// Dump parsed terms
    #[arg(long)]
    ast: bool,

    /// Suppress action output (just check for errors)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(clap::Args)]
struct EvalArgs {
    /// The sentence, e.g. 'o("hi") v(print)'
    sentence: String,

    /// Dump parsed terms instead of executing
    #[arg(long)]
    ast: bool,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.fv file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let mut args: Vec<String> = std::env::args().collect();
    inject_default_subcommand(&mut args);

    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose, cli.no_color);

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    match cli.command {
        Command::Run(run_args) => do_run(run_args, cli.registry.as_deref(), color_choice),
        Command::Eval(eval_args) => do_eval(eval_args, cli.registry.as_deref(), color_choice),
        Command::Verbs => {
            let registry = load_registry_or_exit(cli.registry.as_deref());
            for (verb, action) in registry.verbs() {
                println!("{} -> {}", verb, action);
            }
        }
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

/// If the first positional arg is not a known subcommand, insert "run" before
/// it so `flexverb script.fv` works like `flexverb run script.fv`.
fn inject_default_subcommand(args: &mut Vec<String>) {
    let mut i = 1;
    while i < args.len() {
        let arg = args[i].as_str();
        if VALUE_OPTIONS.contains(&arg) {
            i += 2;
            continue;
        }
        if !arg.starts_with('-') {
            if !SUBCOMMANDS.contains(&arg) {
                args.insert(i, "run".to_string());
            }
            return;
        }
        i += 1;
    }
}

fn init_logging(verbose: u8, no_color: bool) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(!no_color)
                .with_target(false),
        )
        .init();
}

fn load_registry_or_exit(path: Option<&Path>) -> ActionRegistry {
    match config::load_registry(path) {
        Ok(registry) => registry,
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    }
}

fn do_run(args: RunArgs, registry_path: Option<&Path>, color_choice: ColorChoice) {
    let source = match std::fs::read_to_string(&args.file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            process::exit(1);
        }
    };

    let mut files = SimpleFiles::new();
    let file_id = files.add(args.file.clone(), source.clone());

    let script = match flexverb::Parser::new(source, file_id).parse_script() {
        Ok(s) => s,
        Err(errors) => {
            let diagnostics: Vec<_> = errors.iter().map(|e| e.to_diagnostic()).collect();
            emit(color_choice, &files, &diagnostics);
            process::exit(1);
        }
    };
    tracing::debug!(statements = script.statements.len(), "parsed script");

    if args.ast {
        println!("{:#?}", script);
        return;
    }

    let registry = load_registry_or_exit(registry_path);

    if args.check {
        match flexverb_interpreter::check_script(&script, &registry) {
            Ok(_) => eprintln!("ok: {} parsed successfully", args.file),
            Err(error) => fail(color_choice, &files, &error),
        }
        return;
    }

    execute(&script, &registry, args.quiet, color_choice, &files);
}

fn do_eval(args: EvalArgs, registry_path: Option<&Path>, color_choice: ColorChoice) {
    let mut files = SimpleFiles::new();
    let file_id = files.add("<eval>".to_string(), args.sentence.clone());

    let span = 0..args.sentence.len();
    let terms = match flexverb::Parser::new(args.sentence, file_id).parse_spanned() {
        Ok(t) => t,
        Err(error) => {
            emit(color_choice, &files, &[error.to_diagnostic()]);
            process::exit(1);
        }
    };

    if args.ast {
        println!("{:#?}", Sentence::from(terms));
        return;
    }

    let script = Script {
        statements: vec![Statement {
            terms,
            span,
            line: 1,
        }],
        source_id: file_id,
    };
    let registry = load_registry_or_exit(registry_path);
    execute(&script, &registry, false, color_choice, &files);
}

fn execute(
    script: &Script,
    registry: &ActionRegistry,
    quiet: bool,
    color_choice: ColorChoice,
    files: &SimpleFiles<String, String>,
) {
    let mut stdout = std::io::stdout();
    let mut sink = std::io::sink();
    let output: &mut dyn Write = if quiet { &mut sink } else { &mut stdout };

    let mut actions = WriterActions::new(output);
    match flexverb_interpreter::execute_script(script, registry, &mut actions) {
        Ok(count) => tracing::debug!(statements = count, "executed script"),
        Err(error) => fail(color_choice, files, &error),
    }
}

fn fail(
    color_choice: ColorChoice,
    files: &SimpleFiles<String, String>,
    error: &DiagnosticError,
) -> ! {
    emit(color_choice, files, &[error.to_diagnostic()]);
    process::exit(1);
}

fn emit(
    color_choice: ColorChoice,
    files: &SimpleFiles<String, String>,
    diagnostics: &[Diagnostic<usize>],
) {
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    for diagnostic in diagnostics {
        let _ = term::emit_to_write_style(&mut writer.lock(), &config, files, diagnostic);
    }
}
