//! Trellis - Adaptive Learning Pathway Engine
//!
//! CLI entry point.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use trellis::catalog::{CatalogSource, JsonCatalogSource};
use trellis::config::{project_catalog_path, Config};
use trellis::pathway::{Outcome, PathwayEngine};
use trellis::storage::FileProfileStore;

// =============================================================================
// CLI Definition
// =============================================================================

/// Trellis - Adaptive Learning Pathway Engine
#[derive(Parser)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the catalog file (defaults to .trellis/catalog.json)
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// [User] Initialize a project: default config and sample catalog
    Init {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Force overwrite existing files
        #[arg(long, short)]
        force: bool,
    },

    /// [User] Validate and summarize the curriculum catalog
    Catalog {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// [User] Generate the next pathway segment for a learner
    Generate {
        /// Learner id
        learner_id: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// Maximum objectives in the segment
        #[arg(long)]
        max_los: Option<usize>,
        /// Maximum content items per objective
        #[arg(long)]
        max_items: Option<usize>,
        /// Offer mastered objectives as enrichment
        #[arg(long)]
        enrichment: bool,
    },

    /// [User] Submit an activity outcome for a learner
    Outcome {
        /// Learner id
        learner_id: String,
        /// Objective the outcome applies to
        lo_id: String,
        /// Activity that produced the outcome
        activity_id: String,
        /// Normalized score in [0, 1]
        #[arg(long)]
        score: f64,
        /// Mark the activity as attempted but not finished
        #[arg(long)]
        incomplete: bool,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// [User] Re-open a mastered objective for re-teaching
    Reteach {
        /// Learner id
        learner_id: String,
        /// Objective to re-open
        lo_id: String,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// [User] Show a learner's mastery state
    Profile {
        /// Learner id
        learner_id: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
        /// History entries to show
        #[arg(long, default_value = "5")]
        history: usize,
    },
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("trellis error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cwd = std::env::current_dir()?;
    let catalog_path = cli
        .catalog
        .clone()
        .unwrap_or_else(|| project_catalog_path(&cwd));

    match cli.command {
        Commands::Init { json, quiet, force } => run_init(json, quiet, force, &cwd),
        Commands::Catalog { json, quiet } => run_catalog(json, quiet, &catalog_path),
        Commands::Generate {
            learner_id,
            json,
            quiet,
            max_los,
            max_items,
            enrichment,
        } => run_generate(
            &learner_id,
            json,
            quiet,
            max_los,
            max_items,
            enrichment,
            &catalog_path,
        ),
        Commands::Outcome {
            learner_id,
            lo_id,
            activity_id,
            score,
            incomplete,
            json,
            quiet,
        } => run_outcome(
            &learner_id,
            &lo_id,
            &activity_id,
            score,
            !incomplete,
            json,
            quiet,
            &catalog_path,
        ),
        Commands::Reteach {
            learner_id,
            lo_id,
            quiet,
        } => run_reteach(&learner_id, &lo_id, quiet, &catalog_path),
        Commands::Profile {
            learner_id,
            json,
            quiet,
            history,
        } => run_profile(&learner_id, json, quiet, history, &catalog_path),
    }
}

/// Build the engine from the catalog path and the default profile store.
///
/// Catalog validation failures are fatal here: an invalid prerequisite
/// graph must halt startup rather than serve pathways.
fn build_engine(
    catalog_path: &Path,
) -> Result<PathwayEngine<FileProfileStore>, Box<dyn std::error::Error>> {
    let config = Config::load();
    let catalog = JsonCatalogSource::new(catalog_path).load_catalog()?;
    let store = FileProfileStore::new()?;
    Ok(PathwayEngine::new(catalog, store, config))
}

/// Convert a success boolean to an exit code.
fn success_to_exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

// =============================================================================
// Command Implementations
// =============================================================================

fn run_init(
    json: bool,
    quiet: bool,
    force: bool,
    cwd: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trellis::cli::init::{InitCommand, InitOptions};

    let cmd = InitCommand::new(cwd);
    let options = InitOptions { json, quiet, force };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_catalog(
    json: bool,
    quiet: bool,
    catalog_path: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trellis::cli::catalog_cmd::{CatalogCommand, CatalogOptions};

    let cmd = CatalogCommand::new(JsonCatalogSource::new(catalog_path));
    let options = CatalogOptions { json, quiet };

    let output = cmd.run(&options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    learner_id: &str,
    json: bool,
    quiet: bool,
    max_los: Option<usize>,
    max_items: Option<usize>,
    enrichment: bool,
    catalog_path: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trellis::cli::generate::{GenerateCmdOptions, GenerateCommand};

    let engine = build_engine(catalog_path)?;
    let cmd = GenerateCommand::new(engine);
    let options = GenerateCmdOptions {
        json,
        quiet,
        max_los,
        max_items,
        enrichment,
    };

    let output = cmd.run(learner_id, &options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

#[allow(clippy::too_many_arguments)]
fn run_outcome(
    learner_id: &str,
    lo_id: &str,
    activity_id: &str,
    score: f64,
    completed: bool,
    json: bool,
    quiet: bool,
    catalog_path: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trellis::cli::outcome::{OutcomeCommand, OutcomeOptions};

    let engine = build_engine(catalog_path)?;
    let cmd = OutcomeCommand::new(engine);
    let options = OutcomeOptions { json, quiet };
    let outcome = Outcome::new(activity_id, lo_id, score, completed);

    let output = cmd.run(learner_id, &outcome, &options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

fn run_reteach(
    learner_id: &str,
    lo_id: &str,
    quiet: bool,
    catalog_path: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let engine = build_engine(catalog_path)?;

    match engine.reteach(learner_id, lo_id) {
        Ok(status) => {
            if !quiet {
                println!("{} is now {}", lo_id, status.display_name());
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("trellis error: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

fn run_profile(
    learner_id: &str,
    json: bool,
    quiet: bool,
    history: usize,
    catalog_path: &Path,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    use trellis::cli::profile_cmd::{ProfileCommand, ProfileOptions};

    let catalog = JsonCatalogSource::new(catalog_path).load_catalog()?;
    let store = FileProfileStore::new()?;

    let cmd = ProfileCommand::new(catalog, store);
    let options = ProfileOptions {
        json,
        quiet,
        history_limit: history,
    };

    let output = cmd.run(learner_id, &options);
    let formatted = cmd.format_output(&output, &options);

    if !formatted.is_empty() {
        println!("{}", formatted);
    }

    Ok(success_to_exit_code(output.success))
}

// =============================================================================
// Tests
// =============================================================================
