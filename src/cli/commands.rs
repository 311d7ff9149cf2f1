use crate::cli::args::{ExplainArgs, ExplainFormat, LintArgs, SourceArgs, TranslateArgs};
use crate::core::config::{ConfigLoader, FlowportConfig};
use crate::core::error::AppError;
use crate::core::lint::LintRegistry;
use crate::core::store::{StoreBuilder, StoreKind};
use crate::core::translator::translate_pipeline_with;
use crate::core::workflow::{PreparedWorkflow, WorkflowPreparer};
use crate::Result;
use anyhow::anyhow;
use std::env;

/// Load configuration: `--config` when given, else `flowport.toml` in the current directory.
fn load_config(args: &SourceArgs) -> Result<FlowportConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let mut config = ConfigLoader::load_from_file(path)?
                .ok_or_else(|| anyhow!("Config file {} not found", path.display()))?;
            ConfigLoader::apply_env_overrides(&mut config);
            config
        }
        None => ConfigLoader::load_from_workspace(&env::current_dir()?)?,
    };
    if let Some(source) = &args.source {
        config.source.export_dir = source.clone();
    }
    if args.files_to_delta_sinks.is_some() {
        config.translation.files_to_delta_sinks = args.files_to_delta_sinks;
    }
    ConfigLoader::validate_config(&config)?;
    Ok(config)
}

/// Load, translate and prepare the requested pipeline.
fn prepare(args: &SourceArgs) -> Result<(FlowportConfig, PreparedWorkflow)> {
    let config = load_config(args)?;
    let store = StoreBuilder::new(StoreKind::Factory)
        .path(&config.source.export_dir)
        .build()
        .map_err(AppError::from)?;
    let payload = store.load(&args.pipeline).map_err(AppError::from)?;

    let pipeline = translate_pipeline_with(&payload, &config.translation.translation_options());
    let prepared = WorkflowPreparer::new(config.translation.prepare_options()).prepare(pipeline);
    Ok((config, prepared))
}

fn print_diagnostics(prepared: &PreparedWorkflow) {
    if prepared.unsupported.is_empty() {
        return;
    }
    println!("Diagnostics ({}):", prepared.unsupported.len());
    for entry in &prepared.unsupported {
        match &entry.activity_name {
            Some(activity) => println!("  - [{}] {}: {}", activity, entry.property, entry.message),
            None => println!("  - {}: {}", entry.property, entry.message),
        }
    }
}

pub fn translate(args: TranslateArgs) -> Result<()> {
    tracing::info!("Translating pipeline: {}", args.source.pipeline);
    let (config, prepared) = prepare(&args.source)?;

    let output_dir = args.output.unwrap_or(config.output.dir);
    let mut store = StoreBuilder::new(StoreKind::Output)
        .path(&output_dir)
        .build()
        .map_err(AppError::from)?;
    let identifier = store
        .dump(&prepared)
        .map_err(AppError::from)?
        .unwrap_or_else(|| prepared.job_settings.name.clone());

    println!(
        "Translated pipeline '{}' into {}",
        args.source.pipeline,
        output_dir.join(&identifier).display()
    );
    println!("  Tasks: {}", prepared.job_settings.tasks.len());
    println!("  Notebooks: {}", prepared.notebooks.len());
    println!("  Declarative pipelines: {}", prepared.pipelines.len());
    println!(
        "  Secrets: {} ({} need a value)",
        prepared.secrets.len(),
        prepared.secrets_requiring_input().count()
    );
    print_diagnostics(&prepared);
    Ok(())
}

pub fn explain(args: ExplainArgs) -> Result<()> {
    tracing::info!("Explaining pipeline: {}", args.source.pipeline);
    let (_, prepared) = prepare(&args.source)?;

    match args.format {
        ExplainFormat::Text => {
            println!("{}", serde_json::to_string_pretty(&prepared.job_settings)?);
            for notebook in &prepared.notebooks {
                println!("Notebook: {}", notebook.file_path);
            }
            for pipeline in &prepared.pipelines {
                println!("Declarative pipeline: {} ({})", pipeline.name, pipeline.file_path);
            }
            for secret in &prepared.secrets {
                let state = if secret.user_input_required {
                    "needs a value"
                } else {
                    "value provided"
                };
                println!("Secret: {}/{} ({})", secret.scope, secret.key, state);
            }
            print_diagnostics(&prepared);
        }
        ExplainFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&prepared)?);
        }
    }
    Ok(())
}

pub fn lint(args: LintArgs) -> Result<()> {
    tracing::info!("Linting pipeline: {}", args.source.pipeline);
    let (_, prepared) = prepare(&args.source)?;

    let results = LintRegistry::new().run(&prepared);
    if results.is_empty() {
        println!("No lint findings for '{}'", args.source.pipeline);
        return Ok(());
    }

    for result in &results {
        let location = result
            .location
            .as_deref()
            .map(|location| format!(" [{}]", location))
            .unwrap_or_default();
        println!(
            "{} {}{}: {}",
            result.severity, result.code, location, result.message
        );
        if let Some(suggestion) = &result.suggestion {
            println!("  Hint: {}", suggestion);
        }
    }

    if LintRegistry::has_errors(&results) {
        let errors = results
            .iter()
            .filter(|result| result.severity == crate::core::lint::LintSeverity::Error)
            .count();
        return Err(anyhow!("lint found {} error(s)", errors));
    }
    Ok(())
}
