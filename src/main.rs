//! Lead Insight - Command line entry point

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::Value;

use lead_insight::api::{to_json, CommandError, CommandResult};
use lead_insight::constants::{APP_NAME, APP_VERSION};
use lead_insight::logic::dataset::{self, LeadTable};
use lead_insight::{Config, InsightError, LeadService};

#[derive(Parser)]
#[command(name = "lead-insight")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lead scoring with SHAP explanations")]
struct Cli {
    /// Artifact bundle (overrides LEAD_MODEL_PATH)
    #[arg(long, global = true)]
    model: Option<PathBuf>,

    /// Expected artifact SHA-256 (overrides LEAD_MODEL_SHA256)
    #[arg(long, global = true)]
    sha256: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Explain the score of one lead
    Explain {
        /// Lead JSON file; reads stdin when omitted
        #[arg(short, long)]
        lead: Option<PathBuf>,

        /// Number of detailed explanations
        #[arg(long)]
        top_n: Option<usize>,

        /// Negligible-impact threshold in percentage points
        #[arg(long)]
        negligible_pct: Option<f64>,

        /// Also drop negligible impacts from the full list
        #[arg(long)]
        prune: bool,

        /// Cap the full impact list
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Score one lead
    Predict {
        /// Lead JSON file; reads stdin when omitted
        #[arg(short, long)]
        lead: Option<PathBuf>,
    },

    /// Score every row of a CSV export
    Score {
        /// Input CSV (`,` `;` or tab separated)
        #[arg(short, long)]
        data: PathBuf,

        /// Maximum number of rows to score
        #[arg(long)]
        limit: Option<usize>,

        /// Write scored rows here (.csv or .jsonl) instead of printing JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the loaded model and engine settings
    Status,

    /// Fit IQR clipping bounds from a CSV export
    FitIqr {
        /// Input CSV
        #[arg(short, long)]
        data: PathBuf,

        /// Write bounds JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn read_lead(path: Option<&Path>) -> Result<Value, InsightError> {
    let text = match path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    serde_json::from_str(&text)
        .map_err(|e| InsightError::MalformedInput(format!("lead is not valid JSON: {}", e)))
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => log::error!("Failed to render output: {}", e),
    }
}

/// Print a command outcome and map it to an exit code
fn finish<T: Serialize>(result: CommandResult<T>) -> ExitCode {
    print_json(&to_json(&result));
    if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn fail(e: InsightError) -> ExitCode {
    finish::<()>(Err(CommandError::from(e)))
}

fn start_service(config: &Config) -> Result<LeadService, CommandError> {
    let service = LeadService::new(config);
    let metadata = service.load_model()?;
    log::info!(
        "Model '{}' loaded from {} ({} features, explainer {})",
        metadata.name,
        metadata.source,
        metadata.feature_count,
        if metadata.explainer_available { "ready" } else { "unavailable" }
    );
    Ok(service)
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(model) = cli.model {
        config.model_path = model;
    }
    if cli.sha256.is_some() {
        config.model_sha256 = cli.sha256;
    }

    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    match cli.command {
        Commands::FitIqr { data, output } => {
            let table = match LeadTable::read(&data, None) {
                Ok(table) => table,
                Err(e) => return fail(e),
            };
            let bounds = dataset::fit_iqr_bounds(&table);
            log::info!("Fitted IQR bounds for {} columns from {} rows", bounds.len(), table.len());
            let value = match serde_json::to_value(&bounds) {
                Ok(value) => value,
                Err(e) => return fail(InsightError::MalformedInput(e.to_string())),
            };
            match output {
                Some(path) => {
                    let written = serde_json::to_vec_pretty(&value)
                        .map_err(std::io::Error::from)
                        .and_then(|bytes| fs::write(&path, bytes));
                    if let Err(e) = written {
                        return fail(e.into());
                    }
                    log::info!("Wrote bounds to {}", path.display());
                    ExitCode::SUCCESS
                }
                None => {
                    print_json(&value);
                    ExitCode::SUCCESS
                }
            }
        }

        Commands::Explain { lead, top_n, negligible_pct, prune, limit } => {
            if let Some(top_n) = top_n {
                config.narrative.top_n = top_n;
            }
            if let Some(threshold) = negligible_pct {
                config.narrative.negligible_threshold = threshold;
            }
            config.narrative.prune_all_impacts |= prune;
            if limit.is_some() {
                config.narrative.all_impacts_limit = limit;
            }

            let service = match start_service(&config) {
                Ok(service) => service,
                Err(e) => return finish::<()>(Err(e)),
            };
            match read_lead(lead.as_deref()) {
                Ok(lead) => finish(service.explain_lead(&lead)),
                Err(e) => fail(e),
            }
        }

        Commands::Predict { lead } => {
            let service = match start_service(&config) {
                Ok(service) => service,
                Err(e) => return finish::<()>(Err(e)),
            };
            match read_lead(lead.as_deref()) {
                Ok(lead) => finish(service.predict_lead(&lead)),
                Err(e) => fail(e),
            }
        }

        Commands::Score { data, limit, output } => {
            let service = match start_service(&config) {
                Ok(service) => service,
                Err(e) => return finish::<()>(Err(e)),
            };
            match output {
                None => finish(service.score_csv(&data, limit)),
                Some(path) => {
                    let written = service
                        .registry()
                        .current()
                        .and_then(|model| {
                            let table = LeadTable::read(&data, limit)?;
                            let report = dataset::score_table(&model, &table)?;
                            dataset::write_report(&report, table.delimiter, &path)?;
                            Ok(report.summary())
                        });
                    finish(written.map_err(CommandError::from))
                }
            }
        }

        Commands::Status => {
            let service = LeadService::new(&config);
            if let Err(e) = service.load_model() {
                log::warn!("No model available: {}", e.error);
            }
            finish::<_>(Ok::<_, CommandError>(service.engine_status()))
        }
    }
}
