use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing_subscriber::EnvFilter;

mod compatibility;
mod config;
mod db;
mod error;
mod filter;
mod models;
mod report;
mod schedule;
mod tournament;

use config::Config;
use filter::{MatchFilter, SortMode};
use models::{CompatibilityMatch, Level, StudentRecord};
use schedule::ChannelScheduler;

#[derive(Parser)]
#[command(name = "sparring-matchmaker")]
#[command(about = "Sparring partner compatibility for combat-sports coaches", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug, Clone)]
struct FilterArgs {
    /// Only pairs that include this student id
    #[arg(long)]
    student: Option<String>,
    /// Only pairs where either student is at this level
    #[arg(long)]
    level: Option<Level>,
    /// Case-insensitive match on first or last name
    #[arg(long, default_value = "")]
    search: String,
    #[arg(long, value_enum, default_value_t = SortMode::Compatibility)]
    sort: SortMode,
}

impl From<FilterArgs> for MatchFilter {
    fn from(args: FilterArgs) -> Self {
        MatchFilter {
            student_id: args.student,
            level: args.level,
            search: args.search,
            sort: args.sort,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    InitDb,
    /// Load a realistic roster and session history
    Seed,
    /// Import or update students from a CSV file
    ImportStudents {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Import past sparring sessions from a CSV file
    ImportSessions {
        #[arg(long)]
        csv: PathBuf,
    },
    /// List candidate sparring pairs
    Matches {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value_t = 20)]
        limit: usize,
        /// Print the full verdicts as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        filter: FilterArgs,
        #[arg(long, default_value = "sparring-report.md")]
        out: PathBuf,
    },
    /// Schedule a session for a pair of students
    Schedule {
        #[arg(long)]
        student1: String,
        #[arg(long)]
        student2: String,
    },
}

async fn load_matches(
    pool: &PgPool,
) -> anyhow::Result<(Vec<StudentRecord>, Vec<CompatibilityMatch>)> {
    let roster = db::fetch_roster(pool).await?;
    let sessions = db::fetch_sessions(pool).await?;
    let matches = tournament::generate(&roster, &sessions);
    tracing::debug!(pairs = matches.len(), "tournament ready");
    Ok((roster, matches))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing::debug!(host = config.database_host(), "connecting to Postgres");
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;

    match cli.command {
        Commands::InitDb => {
            db::init_db(&pool).await?;
            println!("Schema ready.");
        }
        Commands::Seed => {
            db::seed(&pool).await?;
            println!("Seed data inserted.");
        }
        Commands::ImportStudents { csv } => {
            let imported = db::import_students_csv(&pool, &csv).await?;
            println!("Imported {imported} students from {}.", csv.display());
        }
        Commands::ImportSessions { csv } => {
            let inserted = db::import_sessions_csv(&pool, &csv).await?;
            println!("Inserted {inserted} sessions from {}.", csv.display());
        }
        Commands::Matches {
            filter,
            limit,
            json,
        } => {
            let (_, matches) = load_matches(&pool).await?;
            let selected = MatchFilter::from(filter).apply(&matches);

            if json {
                let shown: Vec<&CompatibilityMatch> = selected.iter().take(limit).collect();
                println!("{}", serde_json::to_string_pretty(&shown)?);
                return Ok(());
            }

            if selected.is_empty() {
                println!("No candidate pairs for this selection.");
                return Ok(());
            }

            println!("Candidate sparring pairs:");
            for candidate in selected.iter().take(limit) {
                println!(
                    "- {} vs {} score {} ({}), {} previous sessions, {} warnings",
                    candidate.student1.full_name(),
                    candidate.student2.full_name(),
                    candidate.compatibility_score,
                    candidate.recommendation,
                    candidate.previous_session_count,
                    candidate.warnings.len()
                );
            }
        }
        Commands::Report { filter, out } => {
            let (roster, matches) = load_matches(&pool).await?;
            let filter = MatchFilter::from(filter);
            let selected = filter.apply(&matches);
            let report = report::build_report(&filter.describe(), &roster, &selected);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Schedule { student1, student2 } => {
            let (_, matches) = load_matches(&pool).await?;
            let (scheduler, mut requests) = ChannelScheduler::new();
            let picked = schedule::schedule_pair(&matches, &student1, &student2, &scheduler)?;
            drop(scheduler);

            let today = Utc::now().date_naive();
            while let Some(request) = requests.recv().await {
                db::insert_session(&pool, &request, today).await?;
            }
            println!(
                "Scheduled {} vs {} for {} (score {}, {}).",
                picked.student1.full_name(),
                picked.student2.full_name(),
                today,
                picked.compatibility_score,
                picked.recommendation
            );
        }
    }

    Ok(())
}
