use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use ranking::{CriterionRecompute, CriterionRegistry, RankingEngine};
use storage::{Database, PgStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "recompute")]
#[command(about = "Competition ranking recompute tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 5)]
    max_connections: u32,

    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rebuild the rankings of one criterion
    Criterion {
        competition: Uuid,
        criterion: String,

        #[arg(long)]
        show: bool,
    },
    /// Rebuild the overall standing from the stored criterion rankings
    Overall {
        competition: Uuid,

        #[arg(long)]
        show: bool,
    },
    /// Rebuild every criterion, then the overall standing
    All {
        competition: Uuid,

        #[arg(long)]
        show: bool,
    },
    /// Verify a submitted report and rebuild its criterion
    Verify { competition: Uuid, report: Uuid },
    /// List the configured criteria
    Criteria,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("recompute={},ranking={}", log_level, log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Commands::Criteria = cli.command {
        list_criteria(&CriterionRegistry::standard());
        return Ok(());
    }

    let database_url = cli
        .database_url
        .as_deref()
        .context("DATABASE_URL is not set")?;
    let engine = connect(database_url, cli.max_connections).await?;

    match cli.command {
        Commands::Criterion {
            competition,
            criterion,
            show,
        } => {
            let summary = engine
                .recompute_criterion(competition, &criterion)
                .await
                .with_context(|| format!("Recompute of '{}' failed", criterion))?;
            report_criterion(&summary);
            if show {
                print_criterion(&engine, competition, &criterion).await?;
            }
        }
        Commands::Overall { competition, show } => {
            let summary = engine
                .recompute_overall(competition)
                .await
                .context("Overall recompute failed")?;
            tracing::info!(
                "Overall standing: {} solo, {} tandem",
                summary.solo_rows,
                summary.tandem_rows
            );
            if show {
                print_overall(&engine, competition).await?;
            }
        }
        Commands::All { competition, show } => {
            let summary = engine
                .recompute_all(competition)
                .await
                .context("Full recompute failed")?;
            for criterion in &summary.criteria {
                report_criterion(criterion);
            }
            for failure in &summary.failed {
                tracing::error!("✗ {}: {}", failure.criterion, failure.reason);
            }
            tracing::info!(
                "Overall standing: {} solo, {} tandem ({} of {} criteria recomputed)",
                summary.overall.solo_rows,
                summary.overall.tandem_rows,
                summary.criteria.len(),
                summary.criteria.len() + summary.failed.len()
            );
            if show {
                print_overall(&engine, competition).await?;
            }
        }
        Commands::Verify {
            competition,
            report,
        } => {
            let verification = engine
                .verify_report(competition, report)
                .await
                .with_context(|| format!("Verification of report {} failed", report))?;
            tracing::info!(
                "✓ Report {} verified with score {}",
                verification.report_id,
                verification.score
            );
            match &verification.recompute {
                Ok(summary) => report_criterion(summary),
                Err(failure) => tracing::error!(
                    "✗ {}: report verified but the rebuild failed: {}",
                    failure.criterion,
                    failure.reason
                ),
            }
        }
        Commands::Criteria => {}
    }

    Ok(())
}

async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<RankingEngine<PgStore>> {
    tracing::info!("Connecting to database...");
    let database = Database::with_max_connections(database_url, max_connections)
        .await
        .context("Failed to connect to database")?;
    database
        .run_migrations()
        .await
        .context("Failed to run migrations")?;

    Ok(RankingEngine::new(
        Arc::new(database.store()),
        CriterionRegistry::standard(),
    ))
}

fn report_criterion(summary: &CriterionRecompute) {
    tracing::info!(
        "✓ {}: {} solo, {} tandem",
        summary.criterion,
        summary.solo_rows,
        summary.tandem_rows
    );
    for failure in &summary.failures {
        tracing::warn!(
            "  unit {} (report {}): {}",
            failure.unit_id,
            failure.report_id,
            failure.reason
        );
    }
    for issue in &summary.skipped {
        tracing::warn!("  skipped: {}", issue);
    }
}

fn list_criteria(registry: &CriterionRegistry) {
    println!("{:<24} {:<6} {:<6} TITLE", "KEY", "SOLO", "TANDEM");
    for definition in registry.iter() {
        println!(
            "{:<24} {:<6} {:<6} {}",
            definition.key,
            definition.model.includes_solo(),
            definition.model.includes_tandem(),
            definition.title
        );
    }
}

async fn print_criterion(
    engine: &RankingEngine<PgStore>,
    competition: Uuid,
    criterion: &str,
) -> anyhow::Result<()> {
    let (solo, tandem) = engine.criterion_standing(competition, criterion).await?;

    println!("Solo");
    for row in solo {
        println!("{:>6}  {}", row.place, row.unit_id);
    }
    println!("Tandem");
    for row in tandem {
        println!("{:>6}  {} + {}", row.place, row.main_unit_id, row.junior_unit_id);
    }
    Ok(())
}

async fn print_overall(engine: &RankingEngine<PgStore>, competition: Uuid) -> anyhow::Result<()> {
    let standing = engine.overall_standing(competition).await?;

    println!("Solo");
    for row in standing.solo {
        println!("{:>4}  {:>8}  {}", row.place, row.places_sum, row.unit_id);
    }
    println!("Tandem");
    for row in standing.tandem {
        println!(
            "{:>4}  {:>8}  {} + {}",
            row.place, row.places_sum, row.main_unit_id, row.junior_unit_id
        );
    }
    Ok(())
}
