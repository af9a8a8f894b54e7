use clap::Parser;
use intern_docs::config::toml_config::LogFormat;
use intern_docs::domain::workflow::RequiredInputs;
use intern_docs::utils::error::{DocsError, ErrorSeverity, Result};
use intern_docs::utils::{logger, validation::Validate};
use intern_docs::{
    AppConfig, CliConfig, GenerationRequest, Generator, InputFile, LocalStorage, Outcome,
    RunOptions, SofficeConverter, Workflow,
};
use std::path::Path;

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    if cli.list {
        print_catalogue();
        return Ok(());
    }

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            logger::init_cli_logger(cli.verbose, LogFormat::Compact);
            tracing::error!("❌ Configuration validation failed: {}", e);
            exit_on(&e);
            return Ok(());
        }
    };

    logger::init_cli_logger(cli.verbose, config.logging.format);
    tracing::info!("Starting intern-docs");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
        tracing::debug!("File config: {:?}", config);
    }

    match run(&cli, &config).await {
        Ok(Outcome::Delivered(delivery)) => {
            tracing::info!("✅ {} completed", delivery.file_name);
            println!("✅ Generated {}", delivery.file_name);
            println!(
                "📁 Saved to: {} ({}, {} bytes)",
                delivery.path, delivery.content_type, delivery.size
            );
        }
        Ok(Outcome::Preview(preview)) => {
            println!("{}", serde_json::to_string_pretty(&preview)?);
        }
        Err(e) => exit_on(&e),
    }

    Ok(())
}

fn load_config(cli: &CliConfig) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::default(),
    };
    if let Some(output) = &cli.output {
        config.output.directory = output.clone();
    }

    cli.validate()?;
    config.validate()?;
    Ok(config)
}

async fn run(cli: &CliConfig, config: &AppConfig) -> Result<Outcome> {
    let workflow = cli.workflow.ok_or_else(|| DocsError::MissingInputError {
        input: "--workflow".to_string(),
    })?;
    let issue_date = cli.issue_date(chrono::Local::now().date_naive())?;

    let mut request = GenerationRequest::new(workflow, issue_date);
    if let Some(path) = &cli.table {
        request = request.with_table(read_input(path).await?);
    }
    if let Some(path) = &cli.template {
        request = request.with_template(read_input(path).await?);
    }
    if let Some(path) = &cli.primary {
        request = request.with_primary(read_input(path).await?);
    }
    if let Some(path) = &cli.secondary {
        request = request.with_secondary(read_input(path).await?);
    }

    let generator = Generator::new(
        LocalStorage::new(config.output_directory().to_string()),
        SofficeConverter::new(config.conversion.command.clone(), config.conversion_timeout()),
        RunOptions {
            renditions_enabled: config.conversion.enabled && !cli.no_rendition,
            dry_run: cli.dry_run,
        },
    )?;

    tracing::info!("🚀 Running {} (issue date {})", workflow, issue_date.format("%d/%m/%Y"));
    generator.run(request).await
}

async fn read_input(path: &str) -> Result<InputFile> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DocsError::InputFormatError {
            file: path.to_string(),
            message: e.to_string(),
        })?;
    let name = Path::new(path)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(path);
    Ok(InputFile::new(name, bytes))
}

fn print_catalogue() {
    println!("Available workflows:");
    for workflow in Workflow::ALL {
        let inputs = match workflow.required_inputs() {
            RequiredInputs::TableAndTemplate => "--table <xlsx|csv> --template <docx>",
            RequiredInputs::TwoTables => "--primary <xlsx|csv> --secondary <xlsx|csv>",
        };
        println!("  {:<20} {:<36} {}", workflow.slug(), workflow.display_name(), inputs);
    }
}

/// Reports an error once and exits with a code matching its severity.
/// Warnings are printed but count as success.
fn exit_on(e: &DocsError) {
    if e.is_warning() {
        tracing::warn!("⚠️ {}", e);
        eprintln!("⚠️ {}", e.user_friendly_message());
        eprintln!("💡 {}", e.recovery_suggestion());
        return;
    }

    tracing::error!(
        "❌ Run failed: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    let exit_code = match e.severity() {
        ErrorSeverity::Low => 0,
        ErrorSeverity::Medium => 2, // conversion
        ErrorSeverity::High => 1,   // input or processing
        ErrorSeverity::Critical => 3,
    };
    if exit_code > 0 {
        std::process::exit(exit_code);
    }
}
