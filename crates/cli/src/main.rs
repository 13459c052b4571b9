mod grammar;
mod report;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use cougar_args::Command;
use std::{
    fs,
    path::PathBuf,
    sync::{Arc, Mutex, PoisonError},
};
use tracing_subscriber::{EnvFilter, fmt};

use crate::grammar::{DEFAULT_GRAMMAR_NAME, LoadedGrammar};
use crate::report::EvalReport;

#[derive(Parser)]
#[command(name = "cougar")]
#[command(version, about = "Evaluate command lines against a declarative command tree", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write an example cougar.json grammar
    Init(InitArgs),

    /// Check every command in a grammar
    Check(CheckArgs),

    /// Evaluate a command line against a grammar
    Eval(EvalArgs),

    /// Print the help menu of a command in a grammar
    Describe(DescribeArgs),
}

#[derive(Parser)]
struct InitArgs {
    /// Project directory (default: current directory)
    #[arg(value_name = "DIR")]
    dir: Option<PathBuf>,
}

#[derive(Parser)]
struct CheckArgs {
    /// Path to the grammar file
    #[arg(short, long, value_name = "FILE")]
    grammar: Option<PathBuf>,
}

#[derive(Parser)]
struct EvalArgs {
    /// Path to the grammar file
    #[arg(short, long, value_name = "FILE")]
    grammar: Option<PathBuf>,

    /// Print the evaluation as JSON
    #[arg(long)]
    json: bool,

    /// Command line to evaluate, program name first (after `--`)
    #[arg(last = true, value_name = "ARGS")]
    argv: Vec<String>,
}

#[derive(Parser)]
struct DescribeArgs {
    /// Path to the grammar file
    #[arg(short, long, value_name = "FILE")]
    grammar: Option<PathBuf>,

    /// Sub-command names below the root, e.g. `package edit`
    #[arg(value_name = "PATH")]
    path: Vec<String>,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init(args) => init(args),
        Commands::Check(args) => check(args),
        Commands::Eval(args) => eval(args),
        Commands::Describe(args) => describe(args),
    }
}

fn init(args: InitArgs) -> Result<()> {
    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory: {}", dir.display()))?;

    let path = grammar::write_default_grammar(&dir)?;

    eprintln!("Created: {}", path.display());
    eprintln!("\nNext steps:");
    eprintln!("  1. Edit {DEFAULT_GRAMMAR_NAME} to describe your command tree");
    eprintln!("  2. Run: cougar check");
    eprintln!("  3. Run: cougar eval -- swift package --help");

    Ok(())
}

fn load_command(path: Option<PathBuf>) -> Result<(LoadedGrammar, Command)> {
    let loaded = grammar::load_grammar(path.as_deref())?;
    let command = loaded
        .grammar
        .to_command()
        .with_context(|| format!("invalid grammar: {}", loaded.path.display()))?;
    Ok((loaded, command))
}

fn check(args: CheckArgs) -> Result<()> {
    let (loaded, command) = load_command(args.grammar)?;
    command
        .validate_tree()
        .with_context(|| format!("grammar check failed: {}", loaded.path.display()))?;

    println!("ok: {} commands", count_commands(&command));
    Ok(())
}

fn eval(args: EvalArgs) -> Result<()> {
    if args.argv.is_empty() {
        bail!("no command line given; pass it after `--`, program name first");
    }

    let (_, mut command) = load_command(args.grammar)?;
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    attach_recorders(&mut command, &[], &dispatched);

    let evaluation = command.evaluate(args.argv.as_slice())?;
    if let Some(help) = evaluation.help_request() {
        print!("{help}");
        return Ok(());
    }

    evaluation.perform_callbacks()?;
    let dispatched = dispatched
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .clone();
    let report = EvalReport::new(&evaluation, dispatched);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to serialize evaluation")?
        );
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}

fn describe(args: DescribeArgs) -> Result<()> {
    let (_, command) = load_command(args.grammar)?;

    let mut ancestors: Vec<&Command> = Vec::new();
    let mut current = &command;
    for segment in &args.path {
        let Some(next) = current.subcommand(segment) else {
            bail!("'{}' has no sub-command '{segment}'", current.name);
        };
        ancestors.push(current);
        current = next;
    }

    print!("{}", current.help(&ancestors));
    Ok(())
}

/// Give every command a callback that logs the dispatch and records its path.
fn attach_recorders(command: &mut Command, parents: &[String], log: &Arc<Mutex<Vec<String>>>) {
    let mut path = parents.to_vec();
    path.push(command.name.clone());

    let joined = path.join(" ");
    let recorder = Arc::clone(log);
    command.set_callback(move |evaluation| {
        tracing::info!(
            command = %joined,
            options = evaluation.options.len(),
            parameters = evaluation.parameters.len(),
            "dispatch"
        );
        recorder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(joined.clone());
        Ok(())
    });

    for sub in &mut command.subcommands {
        attach_recorders(sub, &path, log);
    }
}

fn count_commands(command: &Command) -> usize {
    1 + command.subcommands.iter().map(count_commands).sum::<usize>()
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
