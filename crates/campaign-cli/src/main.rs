// crates/campaign-cli/src/main.rs
// ============================================================================
// Module: Campaign CLI Entry Point
// Description: Command dispatcher for campaign validation workflows.
// Purpose: Validate campaign documents and response uploads from the shell.
// Dependencies: clap, campaign-config, campaign-core, serde, serde_jcs, thiserror, time, uuid.
// ============================================================================

//! ## Overview
//! The `campaign` binary validates authored campaign documents, prints the
//! canonical document schema, and checks survey response uploads against a
//! compiled campaign. Results are written to stdout as canonical JSON;
//! failures are written to stderr with exit code 1.
//!
//! Security posture: every input file is untrusted and read under a size
//! limit before parsing.

// ============================================================================
// SECTION: Modules
// ============================================================================


// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use campaign_cli::audit::sink_from_config;
use campaign_cli::t;
use campaign_config::ValidatorConfig;
use campaign_config::campaign_document_schema;
use campaign_core::CampaignState;
use campaign_core::Configuration;
use campaign_core::MediaSet;
use campaign_core::PrivacyState;
use campaign_core::ResponseValidationEngine;
use campaign_core::RunningState;
use campaign_core::StructuralValidator;
use campaign_core::SurveyResponseMetadata;
use campaign_core::ValidationEventSink;
use campaign_core::ValidationLimits;
use campaign_core::ValidationWarning;
use campaign_core::compile_campaign;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an external schema document.
const MAX_SCHEMA_BYTES: usize = 1024 * 1024;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "campaign", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a campaign document and print a summary.
    Validate(ValidateCommand),
    /// Print the canonical campaign document JSON Schema.
    Schema,
    /// Validate a survey response upload against a campaign document.
    CheckResponses(CheckResponsesCommand),
}

/// Inputs shared by commands that compile a campaign document.
#[derive(Args, Debug)]
struct CampaignArgs {
    /// Campaign document (JSON).
    #[arg(value_name = "DOCUMENT")]
    document: PathBuf,
    /// External JSON Schema replacing the configured or canonical schema.
    #[arg(long, value_name = "PATH")]
    schema: Option<PathBuf>,
    /// Validator configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Running state recorded on the compiled campaign.
    #[arg(long, value_name = "STATE", default_value = "running")]
    running_state: RunningState,
    /// Privacy state recorded on the compiled campaign.
    #[arg(long, value_name = "STATE", default_value = "private")]
    privacy_state: PrivacyState,
}

/// Arguments for `validate`.
#[derive(Args, Debug)]
struct ValidateCommand {
    /// Campaign inputs.
    #[command(flatten)]
    campaign: CampaignArgs,
}

/// Arguments for `check-responses`.
#[derive(Args, Debug)]
struct CheckResponsesCommand {
    /// Campaign inputs.
    #[command(flatten)]
    campaign: CampaignArgs,
    /// Survey the upload answers.
    #[arg(long, value_name = "ID")]
    survey: String,
    /// Response upload (JSON with `metadata`, `responses`, and `media`).
    #[arg(long, value_name = "PATH")]
    upload: PathBuf,
}

// ============================================================================
// SECTION: Input and Output Types
// ============================================================================

/// A survey response upload.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ResponseUpload {
    /// Response envelope.
    metadata: SurveyResponseMetadata,
    /// Answers keyed by item id.
    responses: Map<String, Value>,
    /// Ids of uploaded media.
    #[serde(default)]
    media: Vec<String>,
}

/// Summary printed by `validate`.
#[derive(Debug, Serialize)]
struct ValidateOutput {
    /// Campaign URN.
    campaign_urn: String,
    /// Campaign name.
    campaign_name: String,
    /// Digest of the canonical document.
    source_digest: String,
    /// Per-survey counts.
    surveys: Vec<SurveySummary>,
    /// Non-fatal findings.
    warnings: Vec<ValidationWarning>,
}

/// Per-survey counts in the `validate` summary.
#[derive(Debug, Serialize)]
struct SurveySummary {
    /// Survey id.
    id: String,
    /// Survey title.
    title: String,
    /// Number of top-level items.
    items: usize,
    /// Number of prompts including nested prompts.
    prompts: usize,
}

/// Result printed by `check-responses`.
#[derive(Debug, Serialize)]
struct CheckResponsesOutput {
    /// Campaign URN.
    campaign_urn: String,
    /// Survey id.
    survey_id: String,
    /// Response key from the metadata.
    survey_key: String,
    /// Normalized answers.
    responses: Map<String, Value>,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for catalog messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a rendered message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    match command {
        Commands::Validate(command) => command_validate(&command),
        Commands::Schema => command_schema(),
        Commands::CheckResponses(command) => command_check_responses(&command),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `validate` command.
fn command_validate(command: &ValidateCommand) -> CliResult<ExitCode> {
    let loaded = load_campaign(&command.campaign)?;
    let configuration = &loaded.configuration;
    let output = ValidateOutput {
        campaign_urn: configuration.urn().to_string(),
        campaign_name: configuration.name().to_string(),
        source_digest: configuration.source_digest().value.clone(),
        surveys: configuration
            .surveys()
            .iter()
            .map(|survey| SurveySummary {
                id: survey.id().to_string(),
                title: survey.title().to_string(),
                items: survey.items().len(),
                prompts: survey.number_of_prompts(),
            })
            .collect(),
        warnings: loaded.warnings,
    };
    write_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `schema` command.
fn command_schema() -> CliResult<ExitCode> {
    let rendered = serde_json::to_string_pretty(&campaign_document_schema())
        .map_err(|err| CliError::new(t!("schema.render_failed", error = err)))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `check-responses` command.
fn command_check_responses(command: &CheckResponsesCommand) -> CliResult<ExitCode> {
    let loaded = load_campaign(&command.campaign)?;
    let bytes = read_input(&command.upload, "upload", loaded.config.limits.max_document_bytes)?;
    let upload: ResponseUpload = parse_json(&bytes, &command.upload, "upload")?;
    let media = parse_media(&upload.media)?;

    let campaign_urn = loaded.configuration.urn().to_string();
    let engine = ResponseValidationEngine::new(Arc::new(loaded.configuration))
        .with_sink(loaded.sink)
        .with_max_responses(loaded.config.limits.max_responses);
    let normalized = engine
        .validate(&command.survey, &upload.metadata, &upload.responses, &media)
        .map_err(|err| CliError::new(t!("responses.rejected", error = err)))?;

    let output = CheckResponsesOutput {
        campaign_urn,
        survey_id: command.survey.clone(),
        survey_key: upload.metadata.survey_key.clone(),
        responses: normalized.into_iter().map(|(id, value)| (id.to_string(), value)).collect(),
    };
    write_json(&output)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Campaign Loading
// ============================================================================

/// A compiled campaign with the settings used to compile it.
struct LoadedCampaign {
    /// Validator configuration.
    config: ValidatorConfig,
    /// Event sink selected by the configuration.
    sink: Arc<dyn ValidationEventSink>,
    /// Compiled configuration.
    configuration: Configuration,
    /// Non-fatal findings.
    warnings: Vec<ValidationWarning>,
}

/// Loads configuration, builds the validator, and compiles the document.
fn load_campaign(args: &CampaignArgs) -> CliResult<LoadedCampaign> {
    let config = ValidatorConfig::load(args.config.as_deref())
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    let sink = sink_from_config(&config.events).map_err(|err| {
        let path = config.events.path().map(|path| path.display().to_string());
        CliError::new(t!("events.open_failed", path = path.unwrap_or_default(), error = err))
    })?;
    let validator = build_validator(&config, args.schema.as_deref(), Arc::clone(&sink))?;

    let bytes = read_input(&args.document, "campaign document", config.limits.max_document_bytes)?;
    let text = String::from_utf8(bytes).map_err(|err| {
        CliError::new(t!(
            "input.parse_failed",
            kind = "campaign document",
            path = args.document.display(),
            error = err
        ))
    })?;
    let state =
        CampaignState::new(args.running_state, args.privacy_state, OffsetDateTime::now_utc());
    let compilation = compile_campaign(&validator, &text, state)
        .map_err(|err| CliError::new(t!("validate.rejected", error = err)))?;
    Ok(LoadedCampaign {
        config,
        sink,
        configuration: compilation.configuration,
        warnings: compilation.warnings,
    })
}

/// Builds the structural validator from the selected schema and limits.
fn build_validator(
    config: &ValidatorConfig,
    schema_override: Option<&Path>,
    sink: Arc<dyn ValidationEventSink>,
) -> CliResult<StructuralValidator> {
    let schema = match schema_override.or_else(|| config.schema.path()) {
        Some(path) => {
            let bytes = read_input(path, "schema", MAX_SCHEMA_BYTES)?;
            parse_json::<Value>(&bytes, path, "schema")?
        }
        None => campaign_document_schema(),
    };
    let limits = ValidationLimits {
        max_document_bytes: config.limits.max_document_bytes,
        max_condition_bytes: config.limits.max_condition_bytes,
    };
    let validator = StructuralValidator::new(&schema)
        .map_err(|err| CliError::new(t!("schema.compile_failed", error = err)))?;
    Ok(validator.with_limits(limits).with_sink(sink))
}

/// Parses uploaded media ids.
fn parse_media(ids: &[String]) -> CliResult<MediaSet> {
    ids.iter()
        .map(|id| {
            Uuid::parse_str(id.trim())
                .map_err(|_| CliError::new(t!("responses.media_invalid", value = id)))
        })
        .collect()
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Reads an input file, mapping failures to catalog messages.
fn read_input(path: &Path, kind: &str, max_bytes: usize) -> CliResult<Vec<u8>> {
    read_bytes_with_limit(path, max_bytes).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(t!("input.read_failed", kind = kind, path = path.display(), error = err))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })
}

/// Parses JSON input bytes.
fn parse_json<T: for<'de> Deserialize<'de>>(
    bytes: &[u8],
    path: &Path,
    kind: &str,
) -> CliResult<T> {
    serde_json::from_slice(bytes).map_err(|err| {
        CliError::new(t!("input.parse_failed", kind = kind, path = path.display(), error = err))
    })
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes canonical JSON to stdout followed by a newline.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_jcs::to_vec(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    bytes.push(b'\n');
    std::io::stdout()
        .write_all(&bytes)
        .map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats an output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
