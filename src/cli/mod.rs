pub mod args;
pub mod commands;

pub use args::{ExplainArgs, ExplainFormat, LintArgs, SourceArgs, TranslateArgs};
use clap::{Parser, Subcommand};
use std::env;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
MIGRATION COMMANDS:\n{subcommands}\n";

#[derive(Parser)]
#[command(name = "flowport")]
#[command(version = crate::VERSION)]
#[command(about = "Translate Azure Data Factory pipelines into Databricks Jobs workflows")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: lint a pipeline, explain the generated job, then translate it into an output directory."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    #[command(
        about = "Translate a pipeline and write the job with its artifacts",
        long_about = "Translate loads a pipeline from a factory export, translates and prepares it, then writes job.json, notebooks, pipeline and secret instructions and the unsupported report.",
        after_help = "Example:\n    flowport translate daily_load --source ./adf --output ./out"
    )]
    Translate(TranslateArgs),
    #[command(
        about = "Print the prepared job and diagnostics without writing",
        long_about = "Explain runs the same translation as translate and prints the job payload with every diagnostic to stdout.",
        after_help = "Example:\n    flowport explain daily_load --format json"
    )]
    Explain(ExplainArgs),
    #[command(
        about = "Check a prepared job for problems",
        long_about = "Lint prepares the job and reports duplicate keys, broken or cyclic dependencies, placeholder tasks and secrets that need values. Exits non-zero on errors.",
        after_help = "Example:\n    flowport lint daily_load --source ./adf"
    )]
    Lint(LintArgs),
}

impl Command {
    pub fn source_args(&self) -> &SourceArgs {
        match self {
            Command::Translate(args) => &args.source,
            Command::Explain(args) => &args.source,
            Command::Lint(args) => &args.source,
        }
    }

    /// Directory holding `flowport.toml` and `.flowport/`: the parent of `--config`, else the
    /// current directory.
    pub fn workspace(&self) -> Option<PathBuf> {
        match &self.source_args().config {
            Some(config) => config
                .parent()
                .filter(|parent| !parent.as_os_str().is_empty())
                .map(PathBuf::from)
                .or_else(|| env::current_dir().ok()),
            None => env::current_dir().ok(),
        }
    }

    /// Whether stdout carries command output that logs must not interleave with.
    pub fn writes_to_stdout(&self) -> bool {
        matches!(self, Command::Explain(_))
    }
}

pub fn run(args: Args) -> crate::Result<()> {
    match args.command {
        Command::Translate(translate_args) => commands::translate(translate_args),
        Command::Explain(explain_args) => commands::explain(explain_args),
        Command::Lint(lint_args) => commands::lint(lint_args),
    }
}
