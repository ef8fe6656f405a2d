mod wizard;

use clap::{Parser, Subcommand, ValueEnum};
use form_session::{FormSession, MemoryStore, SubmitOutcome};
use form_spec::{FormSchema, ValueMap, check_schema, resolve_states, validate_all, values_schema};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use wizard::{PromptContext, Verbosity, WizardPresenter, parse_answer, render_view_text};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Schema-driven form toolkit",
    long_about = "Validates value maps, inspects resolved form state, and fills forms in a text wizard backed by the form engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Validate a values file against a form schema.
    Validate {
        /// Path to the FormSchema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Path to the values JSON file.
        #[arg(long, value_name = "VALUES")]
        values: PathBuf,
    },
    /// Print the resolved view of a form for a given value map.
    Inspect {
        /// Path to the FormSchema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Optional JSON file containing current values.
        #[arg(long, value_name = "VALUES")]
        values: Option<PathBuf>,
        /// Render output mode.
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Print the JSON Schema the form accepts for its value map.
    Schema {
        /// Path to the FormSchema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Optional JSON file containing current values (drives visibility).
        #[arg(long, value_name = "VALUES")]
        values: Option<PathBuf>,
    },
    /// Fill a form interactively and submit it.
    Fill {
        /// Path to the FormSchema JSON.
        #[arg(long, value_name = "SCHEMA")]
        schema: PathBuf,
        /// Optional JSON file containing initial values.
        #[arg(long, value_name = "VALUES")]
        values: Option<PathBuf>,
        /// Show verbose output (progress, choices, error details).
        #[arg(long, alias = "debug")]
        verbose: bool,
    },
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Validate { schema, values } => run_validate(schema, values),
        Command::Inspect {
            schema,
            values,
            format,
        } => run_inspect(schema, values, format),
        Command::Schema { schema, values } => run_schema(schema, values),
        Command::Fill {
            schema,
            values,
            verbose,
        } => run_fill(schema, values, verbose),
    }
}

fn load_schema(path: &Path) -> CliResult<FormSchema> {
    let contents = fs::read_to_string(path)?;
    let schema: FormSchema = serde_json::from_str(&contents)?;
    if let Err(error) = check_schema(&schema) {
        tracing::warn!(%error, "schema failed invariant checks; continuing fail-open");
    }
    Ok(schema)
}

fn load_values(path: &Path) -> CliResult<ValueMap> {
    let contents = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

fn load_optional_values(path: Option<PathBuf>) -> CliResult<ValueMap> {
    match path {
        Some(path) => load_values(&path),
        None => Ok(ValueMap::new()),
    }
}

fn run_validate(schema_path: PathBuf, values_path: PathBuf) -> CliResult<()> {
    let schema = load_schema(&schema_path)?;
    let values = load_values(&values_path)?;
    let errors = validate_all(&schema, &values);
    if errors.is_empty() {
        println!("OK: {} values are valid for '{}'", values.len(), schema.id);
        return Ok(());
    }
    eprintln!("Validation errors:");
    for (field_id, message) in &errors {
        eprintln!("  {}: {}", field_id, message);
    }
    std::process::exit(1);
}

fn run_inspect(
    schema_path: PathBuf,
    values_path: Option<PathBuf>,
    format: OutputFormat,
) -> CliResult<()> {
    let schema = load_schema(&schema_path)?;
    let values = load_optional_values(values_path)?;
    let session = FormSession::with_values(schema, values);
    let view = session.view();
    match format {
        OutputFormat::Text => println!("{}", render_view_text(&view)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
    }
    Ok(())
}

fn run_schema(schema_path: PathBuf, values_path: Option<PathBuf>) -> CliResult<()> {
    let schema = load_schema(&schema_path)?;
    let values = load_optional_values(values_path)?;
    let states = resolve_states(&schema, &values);
    let generated = values_schema(&schema, &states);
    println!("{}", serde_json::to_string_pretty(&generated)?);
    Ok(())
}

fn run_fill(schema_path: PathBuf, values_path: Option<PathBuf>, verbose: bool) -> CliResult<()> {
    let schema = load_schema(&schema_path)?;
    let initial = load_optional_values(values_path)?;
    let mut session = FormSession::with_values(schema, initial);
    let mut store = MemoryStore::new();
    let mut presenter = WizardPresenter::new(Verbosity::from_verbose(verbose));
    presenter.show_header(&session.view());

    let stdin = io::stdin();
    loop {
        let view = session.view();
        presenter.show_progress(&view);

        let Some(prompt) = next_prompt(&session) else {
            match session.submit(&mut store) {
                SubmitOutcome::Accepted => {
                    presenter.show_completion(store.last());
                    return Ok(());
                }
                SubmitOutcome::Rejected => {
                    presenter.show_errors(session.errors());
                    if next_prompt(&session).is_none() {
                        eprintln!("The remaining errors cannot be fixed interactively.");
                        std::process::exit(1);
                    }
                    continue;
                }
                SubmitOutcome::StoreFailed(error) => return Err(Box::new(error)),
                SubmitOutcome::AlreadySubmitting => {
                    eprintln!("A submit is already in flight.");
                    std::process::exit(1);
                }
            }
        };

        presenter.show_prompt(&prompt);
        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            return Err("input ended before the form was completed".into());
        }
        let value = match parse_answer(prompt.kind, line.trim()) {
            Ok(value) => value,
            Err(error) => {
                presenter.show_parse_error(&error);
                continue;
            }
        };
        session.set_value(&prompt.id, value, Instant::now())?;
        if let Some(message) = session.errors().get(&prompt.id) {
            presenter.show_field_error(message);
        }
    }
}

/// Next field worth prompting: visible, enabled, and either unanswered or
/// currently failing validation.
fn next_prompt(session: &FormSession) -> Option<PromptContext> {
    let view = session.view();
    for section in &view.sections {
        if !section.visible {
            continue;
        }
        for field in &section.fields {
            if !field.visible || !field.enabled {
                continue;
            }
            let needs_input =
                !session.touched().contains(&field.id) || session.errors().contains_key(&field.id);
            if needs_input {
                return Some(PromptContext::new(field));
            }
        }
    }
    None
}
