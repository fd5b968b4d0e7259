//! PII Redaction Tool - command-line interface
//!
//! Subcommands mirror the pipeline operations: analyze, anonymize, redact
//! and bundle.

use std::path::{Path, PathBuf};
use std::process;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use pii_redact::config::{AnonymizationMode, RedactorConfig};
use pii_redact::pipeline::{load_detections, Pipeline, RedactionTokens};
use pii_redact::types::Detections;
use pii_redact::utils::{init_logging, LogLevel};
use pii_redact::{Error, Result};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let log_level = matches.get_one::<LogLevel>("verbose").copied().unwrap_or_default();
    if let Err(e) = init_logging(log_level) {
        eprintln!("{}", e);
    }

    info!("🚀 PII Redaction Tool v{} - Starting...", env!("CARGO_PKG_VERSION"));

    let config = match load_config(matches.get_one::<PathBuf>("config")) {
        Ok(config) => config,
        Err(e) => {
            error!("❌ Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    let pipeline = Pipeline::new(config);
    let start_time = std::time::Instant::now();

    match run(&pipeline, &matches).await {
        Ok(()) => info!("✅ Completed in {:.2?}", start_time.elapsed()),
        Err(e) => {
            error!("❌ Pipeline execution failed: {}", e);
            process::exit(1);
        }
    }
}

fn build_cli() -> Command {
    let input = Arg::new("input")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Input PDF file path");

    let detections = Arg::new("detections")
        .short('d')
        .long("detections")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Entity/LLM detections (JSON) merged with the built-in patterns");

    let mode = Arg::new("mode")
        .short('m')
        .long("mode")
        .value_parser(["mask", "redact", "pseudo", "pseudonymize"])
        .help("Anonymization mode (defaults to the configured mode)");

    let output = Arg::new("output")
        .short('o')
        .long("output")
        .value_name("FILE")
        .value_parser(value_parser!(PathBuf))
        .help("Output PDF file path (defaults to a new file in the output directory)");

    Command::new("PII Redaction Tool")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Detects PII in PDFs, blacks it out in place or rewrites the text anonymized")
        .subcommand_required(true)
        .arg_required_else_help(true)

        // Global options
        .arg(Arg::new("config")
            .short('c')
            .long("config")
            .value_name("FILE")
            .value_parser(value_parser!(PathBuf))
            .global(true)
            .help("Configuration file (JSON/YAML)"))

        .arg(Arg::new("verbose")
            .short('v')
            .long("verbose")
            .value_parser(value_parser!(LogLevel))
            .default_value("info")
            .global(true)
            .help("Set logging verbosity"))

        .arg(Arg::new("force")
            .long("force")
            .action(ArgAction::SetTrue)
            .global(true)
            .help("Force overwrite existing output files"))

        .subcommand(Command::new("analyze")
            .about("Extract text and print detected PII as JSON")
            .arg(input.clone())
            .arg(detections.clone()))

        .subcommand(Command::new("anonymize")
            .about("Rewrite the text with PII replaced and rebuild it as a PDF")
            .arg(input.clone())
            .arg(output.clone())
            .arg(mode.clone())
            .arg(detections.clone()))

        .subcommand(Command::new("redact")
            .about("Black out PII on the original page layout")
            .arg(input.clone())
            .arg(output)
            .arg(Arg::new("tokens")
                .short('t')
                .long("tokens")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .required(true)
                .help("Word boxes (JSON) with `native` and/or `ocr` pages"))
            .arg(detections.clone()))

        .subcommand(Command::new("bundle")
            .about("Anonymize and write the PDF with a JSON and PDF privacy report")
            .arg(input)
            .arg(Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf))
                .help("Bundle ZIP path (defaults to a new archive in the output directory)"))
            .arg(mode)
            .arg(detections))
}

fn load_config(path: Option<&PathBuf>) -> Result<RedactorConfig> {
    let mut config = match path {
        Some(path) => RedactorConfig::from_file(path)?,
        None => RedactorConfig::default(),
    };
    config.apply_env()?;
    config.validate()?;
    Ok(config)
}

async fn run(pipeline: &Pipeline, matches: &ArgMatches) -> Result<()> {
    let force = matches.get_flag("force");

    match matches.subcommand() {
        Some(("analyze", sub)) => {
            let external = external_detections(sub).await?;
            let result = pipeline.analyze(input_path(sub)?, external.as_ref()).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        Some(("anonymize", sub)) => {
            let output = output_path(pipeline, sub, "sanitized", force)?;
            let external = external_detections(sub).await?;
            let outcome = pipeline
                .anonymize(input_path(sub)?, &output, mode(sub)?, external.as_ref())
                .await?;
            display_counts(&outcome.counts);
            info!("📋 Output: {}", outcome.output.display());
        }
        Some(("redact", sub)) => {
            let output = output_path(pipeline, sub, "redacted", force)?;
            let tokens_path = sub
                .get_one::<PathBuf>("tokens")
                .ok_or_else(|| Error::ValidationError("--tokens is required".into()))?;
            let tokens = RedactionTokens::load(tokens_path).await?;
            let external = external_detections(sub).await?;
            let outcome = pipeline
                .redact(input_path(sub)?, &output, &tokens, external.as_ref())
                .await?;
            info!(
                "📋 {} box(es) drawn using {:?} tokens: {}",
                outcome.boxes_per_page.iter().sum::<usize>(),
                outcome.source,
                outcome.output.display()
            );
        }
        Some(("bundle", sub)) => {
            let output = sub
                .get_one::<PathBuf>("output")
                .cloned()
                .unwrap_or_else(|| pipeline.default_bundle_path());
            if output.exists() && !force {
                return Err(Error::ValidationError(format!(
                    "Output file already exists: {} (use --force to overwrite)",
                    output.display()
                )));
            }
            let external = external_detections(sub).await?;
            let outcome = pipeline
                .bundle(input_path(sub)?, &output, mode(sub)?, external.as_ref())
                .await?;
            display_counts(&outcome.report.summary.counts);
            info!("📋 Bundle: {}", outcome.archive.path.display());
        }
        _ => return Err(Error::ValidationError("No subcommand given".into())),
    }
    Ok(())
}

fn input_path(sub: &ArgMatches) -> Result<&Path> {
    let input = sub
        .get_one::<PathBuf>("input")
        .ok_or_else(|| Error::ValidationError("Input file is required".into()))?;
    if !input.exists() {
        return Err(Error::ValidationError(format!("Input file does not exist: {}", input.display())));
    }
    Ok(input)
}

fn output_path(pipeline: &Pipeline, sub: &ArgMatches, prefix: &str, force: bool) -> Result<PathBuf> {
    let output = sub
        .get_one::<PathBuf>("output")
        .cloned()
        .unwrap_or_else(|| pipeline.default_output_path(prefix));
    if output.exists() && !force {
        return Err(Error::ValidationError(format!(
            "Output file already exists: {} (use --force to overwrite)",
            output.display()
        )));
    }
    Ok(output)
}

fn mode(sub: &ArgMatches) -> Result<Option<AnonymizationMode>> {
    sub.get_one::<String>("mode").map(|m| m.parse()).transpose()
}

async fn external_detections(sub: &ArgMatches) -> Result<Option<Detections>> {
    match sub.get_one::<PathBuf>("detections") {
        Some(path) => Ok(Some(load_detections(path).await?)),
        None => {
            warn!("⚠️ No external detections supplied, using built-in patterns only");
            Ok(None)
        }
    }
}

fn display_counts(counts: &pii_redact::CategoryCounts) {
    info!("📊 Replacement Summary:");
    if counts.is_empty() {
        info!("   No PII replaced");
    }
    for (category, count) in counts {
        info!("   {}: {}", category, count);
    }
}
