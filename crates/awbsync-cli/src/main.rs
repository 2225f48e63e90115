mod scheduler;

use std::sync::Arc;

use anyhow::Context;
use awbsync_core::{AppConfig, Ticket};
use awbsync_courier::CourierClient;
use awbsync_reconcile::{classify_explained, extract_awb, reconcile, Driver};
use clap::{Parser, Subcommand};
use tokio::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "awbsync")]
#[command(about = "Reconcile courier shipment state into issue-tracker tickets")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one reconciliation pass over the candidate tickets.
    Run {
        /// Read and decide, but send no tracker mutations.
        #[arg(long)]
        dry_run: bool,
        /// Reconcile only this ticket key.
        #[arg(long)]
        ticket: Option<String>,
        /// Reconcile only tickets whose tracking number is this one.
        #[arg(long)]
        awb: Option<String>,
    },
    /// Fetch one tracking number and show how it classifies.
    Classify {
        /// Tracking number, or any text containing one (e.g. a tracking URL).
        awb: String,
    },
    /// Run reconciliation on a cron schedule until interrupted.
    Schedule {
        /// Six-field cron expression; defaults to `AWBSYNC_SCHEDULE`.
        #[arg(long)]
        cron: Option<String>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Print the effective configuration with secrets redacted.
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = awbsync_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Some(Commands::Run {
            dry_run,
            ticket,
            awb,
        }) => {
            if ticket.is_some() {
                config.debug_ticket = ticket;
            }
            if awb.is_some() {
                config.debug_awb = awb;
            }
            let summary = Driver::from_config(config)?.dry_run(dry_run).run().await?;
            println!("{summary}");
        }
        Some(Commands::Classify { awb }) => classify_one(&config, &awb).await?,
        Some(Commands::Schedule { cron, dry_run }) => {
            let cron = cron.unwrap_or_else(|| config.schedule.clone());
            run_scheduled(config, &cron, dry_run).await?;
        }
        Some(Commands::Config) => println!("{config:#?}"),
        None => println!("awbsync: no command given; try `awbsync --help`"),
    }

    Ok(())
}

async fn classify_one(config: &AppConfig, input: &str) -> anyhow::Result<()> {
    let awb = extract_awb(input).unwrap_or_else(|| input.trim().to_string());
    let courier = CourierClient::from_config(config)?;
    let record = courier
        .fetch_shipment(&awb)
        .await
        .with_context(|| format!("fetching tracking for {awb}"))?;

    let classification = classify_explained(&record);
    println!(
        "{awb}: {} (rule: {})",
        classification.phase, classification.rule
    );
    println!(
        "  courier status: {} [{}]",
        record.status, record.status_type
    );
    if let Some(instruction) = record.latest_instruction() {
        println!("  instruction: {instruction}");
    }

    let fields = reconcile(&Ticket::default(), &record, classification.phase);
    if !fields.is_empty() {
        println!("  derived fields:");
        for (field, value) in &fields {
            println!("    {field:?} = {value}");
        }
    }
    Ok(())
}

async fn run_scheduled(config: AppConfig, cron: &str, dry_run: bool) -> anyhow::Result<()> {
    let driver = Arc::new(Mutex::new(Driver::from_config(config)?.dry_run(dry_run)));
    let mut scheduler = scheduler::build_scheduler(driver, cron)
        .await
        .with_context(|| format!("starting scheduler with cron {cron:?}"))?;

    tracing::info!(cron, dry_run, "scheduler running; press ctrl-c to stop");
    tokio::signal::ctrl_c().await?;
    tracing::info!("received shutdown signal, stopping scheduler");
    scheduler.shutdown().await?;
    Ok(())
}
