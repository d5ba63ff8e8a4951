//! CLI administration tool for link-tracker.
//!
//! Provides maintenance and reporting commands that work directly against
//! the database, without going through the HTTP API.
//!
//! # Usage
//!
//! ```bash
//! # Deactivate links whose expiry has passed
//! cargo run --bin admin -- links deactivate-expired
//!
//! # List links with click totals
//! cargo run --bin admin -- links list --page 2
//!
//! # Clicks recorded on a given day (defaults to today, UTC)
//! cargo run --bin admin -- stats daily --date 2025-01-15
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! Same database settings as the server: `DATABASE_URL`, or
//! `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`.

use link_tracker::application::services::{AnalyticsService, CodeGenerator, LinkService};
use link_tracker::config::{Config, load_from_env};
use link_tracker::infrastructure::persistence::{PgClickRepository, PgLinkRepository};
use link_tracker::server::connect_pool;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing link-tracker.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Links {
        #[command(subcommand)]
        action: LinksAction,
    },

    /// Show statistics
    Stats {
        #[command(subcommand)]
        action: StatsAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

#[derive(Subcommand)]
enum LinksAction {
    /// Deactivate every active link whose expiry has passed
    DeactivateExpired {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// List links, newest first, with click totals
    List {
        #[arg(long, default_value_t = 1)]
        page: i64,

        #[arg(long, default_value_t = 20)]
        page_size: i64,
    },
}

#[derive(Subcommand)]
enum StatsAction {
    /// Clicks and distinct clicked links for one UTC day
    Daily {
        /// Day as YYYY-MM-DD (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Overall link and click counts
    Summary,
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,

    /// Show database info
    Info,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = load_from_env().context("Failed to load configuration")?;
    let pool = connect_pool(&config).await?;

    match cli.command {
        Commands::Links { action } => handle_links_action(action, &config, &pool).await?,
        Commands::Stats { action } => handle_stats_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

fn link_service(config: &Config, pool: &PgPool) -> LinkService {
    let links = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let generator = Arc::new(CodeGenerator::new(config.code_generator_config(), links.clone()));
    LinkService::new(links, generator)
}

/// Dispatches link management commands.
async fn handle_links_action(action: LinksAction, config: &Config, pool: &PgPool) -> Result<()> {
    let service = link_service(config, pool);

    match action {
        LinksAction::DeactivateExpired { yes } => deactivate_expired(&service, yes).await?,
        LinksAction::List { page, page_size } => {
            list_links(&service, config, page, page_size).await?
        }
    }

    Ok(())
}

async fn deactivate_expired(service: &LinkService, skip_confirm: bool) -> Result<()> {
    println!("{}", "⏰ Deactivate expired links".bright_blue().bold());
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Deactivate all links past their expiry?")
            .default(true)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let count = service
        .deactivate_expired()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to deactivate links: {}", e))?;

    println!(
        "{} {}",
        "✅ Deactivated links:".green().bold(),
        count.to_string().bright_white().bold()
    );
    println!();

    Ok(())
}

/// Lists links with status indicators.
///
/// # Output Format
///
/// ```text
/// 📋 Links (page 1 of 3, 42 total)
///
///   ID    Token            Clicks   Status     Destination
///   ────────────────────────────────────────────────────────────────────
///   42    summer-sale      128      ACTIVE     https://example.com/sale
///   41    7xQ9pL           0        EXPIRED    https://example.com/old
/// ```
async fn list_links(
    service: &LinkService,
    config: &Config,
    page: i64,
    page_size: i64,
) -> Result<()> {
    let page_size = page_size.clamp(1, 100);
    let (items, total) = service
        .list_links(page, page_size)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to list links: {}", e))?;

    let total_pages = (total + page_size - 1) / page_size;
    println!(
        "{}",
        format!("📋 Links (page {} of {}, {} total)", page.max(1), total_pages.max(1), total)
            .bright_blue()
            .bold()
    );
    println!();

    if items.is_empty() {
        println!("{}", "  No links found".yellow());
        println!();
        return Ok(());
    }

    println!(
        "  {:<5} {:<16} {:<8} {:<10} {}",
        "ID".bright_white().bold(),
        "Token".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "Status".bright_white().bold(),
        "Destination".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    let now = Utc::now();
    for item in &items {
        let link = &item.link;
        let status = if link.is_expired_at(now) {
            "EXPIRED".yellow()
        } else if !link.is_active {
            "INACTIVE".red()
        } else {
            "ACTIVE".green()
        };

        println!(
            "  {:<5} {:<16} {:<8} {:<10} {}",
            link.id.to_string().bright_black(),
            link.public_token().cyan(),
            item.total_clicks,
            status,
            link.original_url
        );
    }

    println!();
    println!("  Short URLs: {}/<token>", config.base_url.bright_cyan());
    println!();

    Ok(())
}

/// Dispatches statistics commands.
async fn handle_stats_action(action: StatsAction, pool: &PgPool) -> Result<()> {
    match action {
        StatsAction::Daily { date } => {
            let day = date.unwrap_or_else(|| Utc::now().date_naive());

            let pool = Arc::new(pool.clone());
            let service = AnalyticsService::new(
                Arc::new(PgLinkRepository::new(pool.clone())),
                Arc::new(PgClickRepository::new(pool)),
            );

            let report = service
                .daily_report(day)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to build daily report: {}", e))?;

            println!("{}", format!("📊 Daily report for {day}").bright_blue().bold());
            println!();
            println!(
                "  Clicks:        {}",
                report.total_clicks.to_string().bright_green().bold()
            );
            println!(
                "  Clicked links: {}",
                report.unique_links.to_string().bright_green().bold()
            );
            println!();
        }
        StatsAction::Summary => {
            println!("{}", "📊 Statistics".bright_blue().bold());
            println!();

            let links_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
                .fetch_one(pool)
                .await?;

            let active_count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM links WHERE is_active")
                    .fetch_one(pool)
                    .await?;

            let clicks_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM clicks")
                .fetch_one(pool)
                .await?;

            println!(
                "  Links:         {}",
                links_count.to_string().bright_green().bold()
            );
            println!(
                "  Active links:  {}",
                active_count.to_string().bright_green().bold()
            );
            println!(
                "  Clicks:        {}",
                clicks_count.to_string().bright_green().bold()
            );
            println!();
        }
    }

    Ok(())
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
        DbAction::Info => {
            println!("{}", "ℹ️  Database Information".bright_blue().bold());
            println!();

            let version: String = sqlx::query_scalar("SELECT version()")
                .fetch_one(pool)
                .await?;

            println!("  PostgreSQL: {}", version.bright_white());
            println!();
        }
    }

    Ok(())
}
