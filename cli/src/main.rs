use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use copilot_core::{Bundle, PatientEntry, SummaryConfig};
use copilot_fhir::{filter_for_patient, find_patient, load_directory, require_patients, summarize_with};
use copilot_query::keywords::{extract_keywords, focus_context};
use copilot_query::{BackendKind, QueryAnswer, QueryRouter, RouterConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "copilot=info";

#[derive(Parser, Debug)]
#[command(
    name = "copilot",
    about = "Browse FHIR patient records and ask clinical questions about them."
)]
struct Cli {
    /// Directory of FHIR JSON files (bundles or single resources).
    #[arg(short, long, env = "COPILOT_DATA_DIR", default_value = "data", global = true)]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the patients found in the data directory.
    Patients {
        #[arg(long)]
        json: bool,
    },
    /// Print the summary of one patient.
    Summary {
        #[command(flatten)]
        selection: PatientSelection,
        /// Print the filtered bundle as JSON instead of the summary text.
        #[arg(long)]
        json: bool,
    },
    /// Ask a clinical question about one patient.
    Ask {
        #[command(flatten)]
        selection: PatientSelection,
        /// Backend to ask: hosted, local or qa.
        #[arg(short, long, default_value = "local")]
        backend: BackendKind,
        #[arg(short, long)]
        question: String,
        /// Only send the summary lines that match keywords in the question.
        #[arg(long)]
        focus: bool,
        #[arg(long)]
        json: bool,
    },
    /// Ask a backend for the top potential clinical risks of one patient.
    Risks {
        #[command(flatten)]
        selection: PatientSelection,
        #[arg(short, long, default_value = "local")]
        backend: BackendKind,
        #[arg(long)]
        json: bool,
    },
    /// Summarize free-text clinical notes with a generative backend.
    Summarize {
        #[command(flatten)]
        selection: PatientSelection,
        /// Text file of clinical notes, one note per line. Defaults to the patient's summary.
        #[arg(long)]
        notes: Option<PathBuf>,
        #[arg(short, long, default_value = "local")]
        backend: BackendKind,
        /// Only summarize the notes that match keywords in --query.
        #[arg(long, requires = "query")]
        focus: bool,
        #[arg(short, long)]
        query: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct PatientSelection {
    /// Patient id. Defaults to the first patient found.
    #[arg(short, long)]
    patient: Option<String>,
    /// Also summarize procedures, immunizations, allergies and encounters.
    #[arg(long)]
    extended: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Patients { json } => {
            let bundle = load_records(&cli.data_dir)?;
            let patients = require_patients(&bundle)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&patients)?);
            } else {
                for patient in patients {
                    println!("{}\t{}", patient.id, patient.label);
                }
            }
        }
        Command::Summary { selection, json } => {
            let bundle = load_records(&cli.data_dir)?;
            let patient = select_patient(&bundle, &selection)?;
            if json {
                let filtered = filter_for_patient(&bundle, &patient.id);
                println!("{}", serde_json::to_string_pretty(&filtered)?);
            } else {
                println!("{}", summarize_patient(&bundle, &patient, &selection));
            }
        }
        Command::Ask {
            selection,
            backend,
            question,
            focus,
            json,
        } => {
            let bundle = load_records(&cli.data_dir)?;
            let patient = select_patient(&bundle, &selection)?;
            let mut context = summarize_patient(&bundle, &patient, &selection);
            if focus {
                context = focus_on(&context, &question)?;
            }

            let router = build_router()?;
            eprintln!("Asking the {backend} about {}...", patient.label);
            let answer = router.ask(backend, &context, &question)?;
            print_answer(&answer, json)?;
        }
        Command::Risks {
            selection,
            backend,
            json,
        } => {
            let bundle = load_records(&cli.data_dir)?;
            let patient = select_patient(&bundle, &selection)?;
            let context = summarize_patient(&bundle, &patient, &selection);

            let router = build_router()?;
            eprintln!("Reviewing risks for {} with the {backend}...", patient.label);
            let answer = router.review_risks(backend, &context)?;
            print_answer(&answer, json)?;
        }
        Command::Summarize {
            selection,
            notes,
            backend,
            focus,
            query,
            json,
        } => {
            let mut text = match notes {
                Some(path) => fs::read_to_string(&path)
                    .with_context(|| format!("Cannot read notes from {path:?}"))?,
                None => {
                    let bundle = load_records(&cli.data_dir)?;
                    let patient = select_patient(&bundle, &selection)?;
                    summarize_patient(&bundle, &patient, &selection)
                }
            };
            if let (true, Some(query)) = (focus, query.as_deref()) {
                text = focus_on(&text, query)?;
            }

            let router = build_router()?;
            eprintln!("Summarizing notes with the {backend}...");
            let answer = router.summarize(backend, &text)?;
            print_answer(&answer, json)?;
        }
    }

    Ok(())
}

/// `RUST_LOG` when it is set and valid, otherwise `copilot=info`.
fn log_filter(rust_log: Option<&str>) -> EnvFilter {
    rust_log
        .filter(|directives| !directives.trim().is_empty())
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
}

fn load_records(data_dir: &Path) -> anyhow::Result<Bundle> {
    let report =
        load_directory(data_dir).with_context(|| format!("Cannot load records from {data_dir:?}"))?;
    Ok(report.bundle)
}

fn focus_on(text: &str, query: &str) -> anyhow::Result<String> {
    let keywords = extract_keywords(query);
    match focus_context(text, &keywords) {
        Some(focused) => Ok(focused),
        None => bail!("No relevant notes found for the given query."),
    }
}

fn select_patient<'a>(
    bundle: &'a Bundle,
    selection: &PatientSelection,
) -> anyhow::Result<PatientEntry<'a>> {
    let mut patients = require_patients(bundle)?;
    let patient = match &selection.patient {
        Some(id) => find_patient(bundle, id)?,
        None => patients.remove(0),
    };
    tracing::debug!(patient = %patient.id, "selected patient");
    Ok(patient)
}

fn summarize_patient(bundle: &Bundle, patient: &PatientEntry<'_>, selection: &PatientSelection) -> String {
    let config = SummaryConfig {
        extended_templates: selection.extended,
    };
    summarize_with(&filter_for_patient(bundle, &patient.id), &config)
}

fn build_router() -> anyhow::Result<QueryRouter> {
    let config = RouterConfig::from_env()?;
    Ok(QueryRouter::from_config(&config)?)
}

fn print_answer(answer: &QueryAnswer, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(answer)?);
    } else {
        println!("{}", answer.answer);
    }
    Ok(())
}
