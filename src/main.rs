//! # Code Lens CLI (`lens`)
//!
//! The `lens` binary drives the analysis service. It provides commands
//! for database initialization, one-shot analysis from a file, history
//! listing, and starting the HTTP server.
//!
//! ## Usage
//!
//! ```bash
//! lens --config ./config/lens.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lens init` | Create the SQLite database and run schema migrations |
//! | `lens analyze <file> --user <id>` | Analyze a source file and print the result |
//! | `lens history --user <id>` | List a user's stored analyses |
//! | `lens serve` | Start the HTTP server |

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use code_lens::analyze::{run_analysis, AnalysisRequest};
use code_lens::config::load_config;
use code_lens::provider::GatewayProvider;
use code_lens::store::{AnalysisStore, SqliteStore};
use code_lens::{db, migrate, server};

/// Code Lens — AI-assisted code analysis with tiered prompting and
/// deterministic quality scoring.
#[derive(Parser)]
#[command(
    name = "lens",
    about = "Code Lens — AI-assisted code analysis with deterministic quality scoring",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true, default_value = "./config/lens.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Initialize the database schema.
    ///
    /// Creates the SQLite database file and the analyses table.
    /// Idempotent — running it multiple times is safe.
    Init,

    /// Analyze a source file and print the result.
    ///
    /// Runs the same pipeline as `POST /analyze`: classify, prompt the
    /// gateway, normalize, score, and store the record.
    Analyze {
        /// Path to the source file to analyze.
        file: PathBuf,

        /// Language hint passed to the model (e.g. `rust`, `python`).
        #[arg(long)]
        language: Option<String>,

        /// User identifier the stored analysis is keyed by.
        #[arg(long)]
        user: String,
    },

    /// List a user's stored analyses, newest first.
    History {
        /// User identifier.
        #[arg(long)]
        user: String,

        /// Maximum number of entries to print.
        #[arg(long, default_value_t = 20)]
        limit: i64,
    },

    /// Start the HTTP server.
    ///
    /// Exposes `POST /analyze`, `GET /history`, and `GET /health` on
    /// the configured bind address with permissive CORS.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&config).await?;
            println!("Database initialized at {}", config.db.path.display());
        }
        Commands::Analyze {
            file,
            language,
            user,
        } => {
            let code = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read source file: {}", file.display()))?;

            let provider = GatewayProvider::new(&config.provider)?;
            let pool = db::connect(&config.db.path).await?;
            migrate::apply_schema(&pool).await?;
            let store = SqliteStore::new(pool);

            let outcome = run_analysis(
                &provider,
                &store,
                AnalysisRequest {
                    code,
                    language,
                    user_id: Some(user),
                },
            )
            .await?;

            println!();
            println!("Analysis {}", outcome.id);
            println!(
                "Quality score: {}/100 (base {}, issues -{}, complexity -{}, readability {:+}, maintainability {:+})",
                outcome.quality.score,
                outcome.quality.breakdown.base_score,
                outcome.quality.breakdown.issues_penalty,
                outcome.quality.breakdown.complexity_penalty,
                outcome.quality.breakdown.readability_bonus,
                outcome.quality.breakdown.maintainability_score,
            );
            println!();
            println!("{}", outcome.analysis.explanation);

            if !outcome.analysis.issues.is_empty() {
                println!();
                println!("Issues:");
                for issue in &outcome.analysis.issues {
                    match issue.line {
                        Some(line) => println!(
                            "  [{}] line {}: {}",
                            issue.severity, line, issue.description
                        ),
                        None => println!("  [{}] {}", issue.severity, issue.description),
                    }
                }
            }

            if !outcome.analysis.improvements.is_empty() {
                println!();
                println!("Improvements:");
                for improvement in &outcome.analysis.improvements {
                    println!("  - {}: {}", improvement.title, improvement.description);
                }
            }
        }
        Commands::History { user, limit } => {
            let pool = db::connect(&config.db.path).await?;
            migrate::apply_schema(&pool).await?;
            let store = SqliteStore::new(pool);

            let entries = store.history(&user, limit).await?;
            if entries.is_empty() {
                println!("No analyses stored for user {user}");
            }
            for entry in entries {
                println!(
                    "{}  {}  {} lines  {}",
                    entry.created_at, entry.language, entry.line_count, entry.id
                );
            }
        }
        Commands::Serve => {
            server::run_server(&config).await?;
        }
    }

    Ok(())
}
