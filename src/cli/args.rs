use clap::Args;
use std::path::PathBuf;

/// Arguments shared by every command that loads a pipeline from a factory export.
#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    /// Name of the pipeline to translate
    #[arg(value_name = "PIPELINE")]
    pub pipeline: String,

    /// Root of the factory git-layout export (default: [source] export_dir, else current directory)
    #[arg(long, value_name = "DIR")]
    pub source: Option<PathBuf>,

    /// Force (true) or disable (false) declarative pipelines for file copies
    #[arg(long, value_name = "BOOL", help_heading = "Translation Overrides")]
    pub files_to_delta_sinks: Option<bool>,

    /// Path to custom config file (default: ./flowport.toml)
    #[arg(long, value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct TranslateArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Directory receiving the job, notebooks and instructions (default: [output] dir)
    #[arg(long, value_name = "DIR")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Clone, Debug)]
pub struct ExplainArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: ExplainFormat,
}

#[derive(Clone, clap::ValueEnum, Debug, PartialEq, Eq)]
pub enum ExplainFormat {
    /// Job JSON followed by a readable list of diagnostics
    Text,
    /// Single JSON document with the job, artifacts and diagnostics
    Json,
}

#[derive(Args, Clone, Debug)]
pub struct LintArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}
