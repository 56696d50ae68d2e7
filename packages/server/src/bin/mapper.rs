//! Command-line front end for the redirect pipeline
//!
//! Runs a whole batch (create, scrape, match, export) in one go, or single
//! stages against an existing batch. Logs go to stderr so exports can be
//! piped from stdout.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use redirect_core::common::BatchId;
use redirect_core::domains::batches::{read_url_file, CreateBatchInput};
use redirect_core::domains::extraction::ScrapeOptions;
use redirect_core::domains::redirects::ExportFormat;
use redirect_core::kernel::{MemoryUrlRepository, ServerDeps};
use redirect_core::{Config, RedirectPipeline};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "mapper")]
#[command(about = "Build 301 redirect maps from old and new URL lists")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a batch from two URL files, scrape, match and export it
    Run {
        #[arg(long)]
        name: String,
        /// File with the old URLs: text (one per line, or CSV cells) or a
        /// workbook (.xlsx, .xls, .ods), whose first sheet is read
        #[arg(long)]
        old: PathBuf,
        /// File with the new URLs
        #[arg(long)]
        new: PathBuf,
        /// Scrape only the first N old URLs
        #[arg(long)]
        max_rows: Option<usize>,
        #[arg(long, default_value = "htaccess")]
        format: ExportFormat,
        /// Write the export here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Keep everything in memory instead of Postgres (nothing survives the run)
        #[arg(long)]
        memory: bool,
    },

    /// Scrape the URLs of an existing batch
    Scrape {
        #[arg(long)]
        batch_id: BatchId,
        #[arg(long)]
        max_rows: Option<usize>,
        /// Skip URLs scraped by an earlier run
        #[arg(long)]
        resume: bool,
    },

    /// Match the old URLs of an existing batch
    Match {
        #[arg(long)]
        batch_id: BatchId,
    },

    /// Print the redirects of a batch in an export format
    Export {
        #[arg(long)]
        batch_id: BatchId,
        #[arg(long, default_value = "htaccess")]
        format: ExportFormat,
    },

    /// Extract one page and print the result as JSON
    ScrapeUrl {
        url: String,
        /// Skip connecting to Postgres
        #[arg(long)]
        memory: bool,
    },
}

impl Commands {
    /// Only self-contained commands may run without Postgres; the others
    /// address batches stored by an earlier run.
    fn in_memory(&self) -> bool {
        match self {
            Commands::Run { memory, .. } | Commands::ScrapeUrl { memory, .. } => *memory,
            _ => false,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,redirect_core=info,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().context("Failed to load configuration")?;
    let pipeline = build_pipeline(&config, cli.command.in_memory()).await?;

    match cli.command {
        Commands::Run {
            name,
            old,
            new,
            max_rows,
            format,
            out,
            ..
        } => {
            let input = CreateBatchInput {
                batch_name: Some(name),
                old_urls: Some(read_url_file(&old)?),
                new_urls: Some(read_url_file(&new)?),
            };
            let batch = pipeline.create_batch(input.validate()?).await?;
            tracing::info!(batch_id = %batch.id, "Batch created");
            cancel_on_ctrl_c(&pipeline, batch.id);

            let scrape = pipeline
                .scrape_batch(batch.id, ScrapeOptions { max_rows, resume: false })
                .await?;
            if scrape.cancelled {
                bail!("Scrape cancelled; continue with `mapper scrape --batch-id {} --resume`", batch.id);
            }

            let matched = pipeline.match_batch(batch.id).await?;
            eprintln!("{}", serde_json::to_string_pretty(&matched)?);

            let body = pipeline.export(batch.id, format).await?;
            match out {
                Some(path) => std::fs::write(&path, body)
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => print!("{}", body),
            }
        }
        Commands::Scrape {
            batch_id,
            max_rows,
            resume,
        } => {
            cancel_on_ctrl_c(&pipeline, batch_id);
            let summary = pipeline
                .scrape_batch(batch_id, ScrapeOptions { max_rows, resume })
                .await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Match { batch_id } => {
            cancel_on_ctrl_c(&pipeline, batch_id);
            let summary = pipeline.match_batch(batch_id).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Export { batch_id, format } => {
            print!("{}", pipeline.export(batch_id, format).await?);
        }
        Commands::ScrapeUrl { url, .. } => {
            let result = pipeline.scrape_url(&url).await;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
    }

    Ok(())
}

async fn build_pipeline(config: &Config, memory: bool) -> Result<RedirectPipeline> {
    let deps = if memory {
        ServerDeps::with_repository(Arc::new(MemoryUrlRepository::new()), config)?
    } else {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(config.require_database_url()?)
            .await
            .context("Failed to connect to database")?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run migrations")?;
        ServerDeps::production(pool, config)?
    };

    Ok(RedirectPipeline::new(deps, config.pipeline.clone()))
}

/// First Ctrl-C stops the batch's running job; finished rows are kept.
fn cancel_on_ctrl_c(pipeline: &RedirectPipeline, batch_id: BatchId) {
    let pipeline = pipeline.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!(batch_id = %batch_id, "Interrupted, cancelling");
            pipeline.cancel(batch_id);
        }
    });
}
