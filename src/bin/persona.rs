//! Persona CLI - Command-line interface for Persona Flux
//!
//! Commands:
//! - score: Score an event log into a personality profile
//! - validate: Load and check the model configuration
//! - doctor: Diagnose configuration and environment
//! - schema: Print input/output schema information

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use persona_flux::encoder::{summarize, ProfileEncoder};
use persona_flux::model::{
    ModelLoader, BASE_PATH_ENV, DEFAULT_BASE_FILE, DEFAULT_TUNING_FILE, TUNING_PATH_ENV,
};
use persona_flux::{ComputeError, ProfileEngine, ProfileResult, PERSONA_VERSION, PRODUCER_NAME};

/// Persona - deterministic personality scoring from routine-action logs
#[derive(Parser)]
#[command(name = "persona")]
#[command(author = "Synheart AI Inc")]
#[command(version = PERSONA_VERSION)]
#[command(about = "Score routine-action logs into Big Five and type profiles", long_about = None)]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score an event log
    Score {
        /// Events file path (use - for stdin)
        #[arg(short, long)]
        events: PathBuf,

        /// Action catalog path (defaults to $SETTINGS_BASE or setting.base.json)
        #[arg(long)]
        base: Option<PathBuf>,

        /// Tuning path (defaults to $SETTINGS_TUNING or settings.tuning.json)
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,

        /// Wrap the profile in a report envelope with producer metadata
        #[arg(long)]
        envelope: bool,
    },

    /// Load and check the model configuration
    Validate {
        /// Action catalog path
        #[arg(long)]
        base: Option<PathBuf>,

        /// Tuning path
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and environment
    Doctor {
        /// Action catalog path
        #[arg(long)]
        base: Option<PathBuf>,

        /// Tuning path
        #[arg(long)]
        tuning: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print schema information
    Schema {
        /// Schema to print
        #[arg(value_enum)]
        schema_type: SchemaType,

        /// Output as JSON schema
        #[arg(long)]
        json_schema: bool,
    },
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Compact JSON
    Json,
    /// Pretty-printed JSON
    JsonPretty,
    /// Human-readable summary
    Text,
}

#[derive(Clone, ValueEnum)]
enum SchemaType {
    /// Event log input
    Events,
    /// Action catalog document
    Catalog,
    /// Tuning document
    Tuning,
    /// Profile output
    Output,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose { "persona_flux=debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), PersonaCliError> {
    match cli.command {
        Commands::Score {
            events,
            base,
            tuning,
            output_format,
            envelope,
        } => cmd_score(&events, base, tuning, output_format, envelope),

        Commands::Validate { base, tuning, json } => cmd_validate(base, tuning, json),

        Commands::Doctor { base, tuning, json } => cmd_doctor(base, tuning, json),

        Commands::Schema {
            schema_type,
            json_schema,
        } => cmd_schema(schema_type, json_schema),
    }
}

fn cmd_score(
    events_path: &Path,
    base: Option<PathBuf>,
    tuning: Option<PathBuf>,
    output_format: OutputFormat,
    envelope: bool,
) -> Result<(), PersonaCliError> {
    let input_data = read_input(events_path)?;
    let events: serde_json::Value = serde_json::from_str(&input_data)?;

    let engine = ProfileEngine::load(&ModelLoader::with_overrides(base, tuning))?;
    let profile = engine.score(&events)?;

    let output = match output_format {
        OutputFormat::Text => format_text(&profile),
        OutputFormat::Json if envelope => {
            serde_json::to_string(&ProfileEncoder::new().encode(&profile))?
        }
        OutputFormat::JsonPretty if envelope => ProfileEncoder::new().encode_to_json(&profile)?,
        OutputFormat::Json => serde_json::to_string(&profile)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&profile)?,
    };
    println!("{}", output);

    Ok(())
}

fn cmd_validate(
    base: Option<PathBuf>,
    tuning: Option<PathBuf>,
    json: bool,
) -> Result<(), PersonaCliError> {
    let loader = ModelLoader::with_overrides(base, tuning);
    let model = loader.load()?;

    let mut matrix_tags: Vec<String> = model.matrix.keys().cloned().collect();
    matrix_tags.sort();

    let report = ValidationReport {
        version: model.version.clone(),
        base_path: loader.base_path().display().to_string(),
        tuning_path: loader.tuning_path().display().to_string(),
        actions: model.catalog.len(),
        scenes: model.scenes.len(),
        matrix_tags,
        context_rules: model
            .context_rules
            .configured()
            .into_iter()
            .map(str::to_string)
            .collect(),
        scenarios: model.scenarios.len(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Model Validation Report");
        println!("=======================");
        println!("Version:        {}", report.version);
        println!("Catalog:        {}", report.base_path);
        println!("Tuning:         {}", report.tuning_path);
        println!("Actions:        {}", report.actions);
        println!("Scenes:         {}", report.scenes);
        println!("Matrix tags:    {}", report.matrix_tags.join(", "));
        println!("Context rules:  {}", report.context_rules.join(", "));
        println!("Scenarios:      {}", report.scenarios);
    }

    Ok(())
}

fn cmd_doctor(
    base: Option<PathBuf>,
    tuning: Option<PathBuf>,
    json: bool,
) -> Result<(), PersonaCliError> {
    let loader = ModelLoader::with_overrides(base, tuning);
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "persona_version".to_string(),
        status: CheckStatus::Ok,
        message: format!("Persona Flux version {}", PERSONA_VERSION),
    });

    for (name, env, path) in [
        ("catalog_path", BASE_PATH_ENV, loader.base_path()),
        ("tuning_path", TUNING_PATH_ENV, loader.tuning_path()),
    ] {
        let check = if path.exists() {
            DoctorCheck {
                name: name.to_string(),
                status: CheckStatus::Ok,
                message: format!("{} found", path.display()),
            }
        } else {
            DoctorCheck {
                name: name.to_string(),
                status: CheckStatus::Error,
                message: format!("{} does not exist (set ${} or pass a path)", path.display(), env),
            }
        };
        checks.push(check);
    }

    let model_check = match loader.load() {
        Ok(model) => DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Model {} loaded ({} actions, {} scenarios)",
                model.version,
                model.catalog.len(),
                model.scenarios.len()
            ),
        },
        Err(e) => DoctorCheck {
            name: "model".to_string(),
            status: CheckStatus::Error,
            message: e.to_string(),
        },
    };
    checks.push(model_check);

    // Check stdin is available (for `score --events -`)
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (interactive mode)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (ready for --events -)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: PERSONA_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Persona Doctor Report");
        println!("=====================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report
        .checks
        .iter()
        .any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(PersonaCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

fn cmd_schema(schema_type: SchemaType, json_schema: bool) -> Result<(), PersonaCliError> {
    match schema_type {
        SchemaType::Events => {
            if json_schema {
                println!("{}", events_json_schema());
            } else {
                println!("Events: JSON array of routine choices, in time order");
                println!();
                println!("  [{{ \"key\": \"<action id or alias>\", \"meta\": {{ ... }} }}, ...]");
                println!();
                println!("- key: looked up by alias first, then id; whitespace runs collapse to one space");
                println!("- meta: optional; \"gameDecision\": \"continue\" | \"stop\" feeds the game decision rule");
                println!("- events with a missing key or an unknown key are skipped");
            }
        }
        SchemaType::Catalog => {
            if json_schema {
                println!("{}", catalog_json_schema());
            } else {
                println!("Action catalog ({})", DEFAULT_BASE_FILE);
                println!();
                println!("- actions: [{{ id, alias?, scene, duration_min, tags[], break?, fixed_deltas? }}]");
                println!("- scenes: optional object, carried through untouched");
                println!();
                println!("duration_min is authoritative; input events cannot override it.");
            }
        }
        SchemaType::Tuning => {
            if json_schema {
                println!("{}", tuning_json_schema());
            } else {
                println!("Tuning ({})", DEFAULT_TUNING_FILE);
                println!();
                println!("- version: string (default 0.0.0)");
                println!("- time_base_min: positive number (minutes per unit of scale)");
                println!("- matrix: {{ <tag>: {{ O?, C?, E?, A?, N? }} }}");
                println!("- actions_fixed: [{{ id, fixed_deltas }}] (overrides catalog fixed_deltas)");
                println!("- context_rules: wake_delay, procrastination_chain, game_decision,");
                println!("  scene_switch, time_balance, consistency_entropy, instant_break");
                println!("- scenarios: [{{ type: \"regex\", expr, time_limits?: {{ total_minutes? }}, base_bonus }}]");
                println!();
                println!("Scenario expr uses Rust `regex` syntax: look-ahead and backreferences");
                println!("are not supported and fail the model load.");
            }
        }
        SchemaType::Output => {
            if json_schema {
                println!("{}", output_json_schema());
            } else {
                println!("Profile output");
                println!();
                println!("- modelVersion: tuning version used");
                println!("- raw: {{ O, C, E, A, N }} unbounded accumulator");
                println!("- scaled: {{ O, C, E, A, N }} each strictly inside (0, 100)");
                println!("- resolved: [{{ def, dur, start }}] timeline in minutes");
                println!("- mbti: {{ type, letters: {{ EI, SN, TF, JP }}, confidence: {{ EI, SN, TF, JP, overall }} }}");
            }
        }
    }

    Ok(())
}

// Helper functions

fn read_input(path: &Path) -> Result<String, PersonaCliError> {
    if path.to_string_lossy() == "-" {
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(path)?)
    }
}

fn format_vector(v: &persona_flux::TraitVector, precision: usize) -> String {
    v.iter()
        .map(|(t, value)| format!("{}={:.*}", t, precision, value))
        .collect::<Vec<_>>()
        .join("  ")
}

fn format_text(profile: &ProfileResult) -> String {
    let summary = summarize(profile);
    let confidence = &profile.mbti.confidence;

    let mut lines = vec![
        format!("Model : {}", profile.model_version),
        format!("Raw   : {}", format_vector(&profile.raw, 3)),
        format!("Scaled: {}", format_vector(&profile.scaled, 1)),
        format!(
            "Type  : {} (overall {:.2}, {}; EI {:.2} SN {:.2} TF {:.2} JP {:.2})",
            profile.mbti.type_code,
            confidence.overall,
            summary.confidence_band.as_str(),
            confidence.EI,
            confidence.SN,
            confidence.TF,
            confidence.JP
        ),
        "Resolved:".to_string(),
    ];
    lines.extend(
        profile
            .resolved
            .iter()
            .map(|s| format!("  {:>6.1}  {:<24} {} min", s.start, s.def.id, s.dur)),
    );
    lines.join("\n")
}

fn events_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "persona.events.v1",
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "key": { "type": "string" },
                "meta": {
                    "type": "object",
                    "properties": {
                        "gameDecision": { "type": "string", "enum": ["continue", "stop"] }
                    }
                }
            }
        }
    })
    .to_string()
}

fn trait_delta_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "O": { "type": "number" },
            "C": { "type": "number" },
            "E": { "type": "number" },
            "A": { "type": "number" },
            "N": { "type": "number" }
        }
    })
}

fn catalog_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "persona.catalog.v1",
        "type": "object",
        "required": ["actions"],
        "properties": {
            "actions": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id", "duration_min"],
                    "properties": {
                        "id": { "type": "string" },
                        "alias": { "type": "string" },
                        "scene": { "type": "string" },
                        "duration_min": { "type": "number", "minimum": 0 },
                        "tags": { "type": "array", "items": { "type": "string" } },
                        "break": { "type": "boolean" },
                        "fixed_deltas": trait_delta_schema()
                    }
                }
            },
            "scenes": { "type": "object" }
        }
    })
    .to_string()
}

fn tuning_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "persona.tuning.v1",
        "type": "object",
        "required": ["time_base_min", "matrix"],
        "properties": {
            "version": { "type": "string" },
            "time_base_min": { "type": "number", "exclusiveMinimum": 0 },
            "matrix": { "type": "object", "additionalProperties": trait_delta_schema() },
            "actions_fixed": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["id"],
                    "properties": {
                        "id": { "type": "string" },
                        "fixed_deltas": trait_delta_schema()
                    }
                }
            },
            "context_rules": { "type": "object" },
            "scenarios": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["type"],
                    "properties": {
                        "type": { "type": "string" },
                        "expr": { "type": "string" },
                        "time_limits": {
                            "type": "object",
                            "properties": { "total_minutes": { "type": "number" } }
                        },
                        "base_bonus": trait_delta_schema()
                    }
                }
            }
        }
    })
    .to_string()
}

fn output_json_schema() -> String {
    serde_json::json!({
        "$schema": "https://json-schema.org/draft/2020-12/schema",
        "title": "persona.profile.v1",
        "type": "object",
        "required": ["modelVersion", "raw", "scaled", "resolved", "mbti"],
        "properties": {
            "modelVersion": { "type": "string" },
            "raw": trait_delta_schema(),
            "scaled": trait_delta_schema(),
            "resolved": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "def": { "type": "object" },
                        "dur": { "type": "number" },
                        "start": { "type": "number" }
                    }
                }
            },
            "mbti": {
                "type": "object",
                "properties": {
                    "type": { "type": "string", "pattern": "^[EI][SN][TF][JP]$" },
                    "letters": { "type": "object" },
                    "confidence": { "type": "object" }
                }
            }
        }
    })
    .to_string()
}

// Error types

#[derive(Debug)]
enum PersonaCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    DoctorFailed,
}

impl From<io::Error> for PersonaCliError {
    fn from(e: io::Error) -> Self {
        PersonaCliError::Io(e)
    }
}

impl From<ComputeError> for PersonaCliError {
    fn from(e: ComputeError) -> Self {
        PersonaCliError::Compute(e)
    }
}

impl From<serde_json::Error> for PersonaCliError {
    fn from(e: serde_json::Error) -> Self {
        PersonaCliError::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<PersonaCliError> for CliError {
    fn from(e: PersonaCliError) -> Self {
        match e {
            PersonaCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            PersonaCliError::Compute(e) => {
                let (code, hint) = match &e {
                    ComputeError::Configuration(_) => (
                        "CONFIGURATION_ERROR",
                        "Run 'persona validate' or 'persona doctor' for details",
                    ),
                    ComputeError::Validation(_) => (
                        "VALIDATION_ERROR",
                        "Events must be a JSON array; see 'persona schema events'",
                    ),
                    ComputeError::Pattern { .. } => (
                        "PATTERN_ERROR",
                        "Scenario patterns use Rust regex syntax (no look-ahead or backreferences)",
                    ),
                    ComputeError::EncodingError(_) => (
                        "ENCODING_ERROR",
                        "The profile could not be serialized; report this as a bug",
                    ),
                    _ => ("COMPUTE_ERROR", "Check input format"),
                };
                CliError {
                    code: code.to_string(),
                    message: e.to_string(),
                    hint: Some(hint.to_string()),
                }
            }
            PersonaCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            PersonaCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    version: String,
    base_path: String,
    tuning_path: String,
    actions: usize,
    scenes: usize,
    matrix_tags: Vec<String>,
    context_rules: Vec<String>,
    scenarios: usize,
}

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
#[allow(dead_code)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
