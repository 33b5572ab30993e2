//! Command-line front end for the reference crawler.
//!
//! Each subcommand runs one pipeline operation against the configured
//! SQLite database and content directory, so a full crawl is a sequence of
//! invocations: upload, extract, qualify, references, crawl, repeat.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;

use refcrawl::ai::OpenAi;
use refcrawl::pipeline::{crawl, extract, qualify, references, triplets, BatchReport};
use refcrawl::{
    compute_stats, ContentStore, CorpusExport, DocumentStatus, DocumentStore, FsContentStore,
    GoogleCseLocator, HttpPaperFetcher, LopdfTextExtractor, NewDocument, ReferenceStore,
    SqliteStore, TripletGroup,
};

#[derive(Parser)]
#[command(name = "refcrawl", about = "Crawl academic papers through their references")]
struct Cli {
    /// SQLite database URL
    #[arg(long, global = true, default_value = "sqlite://refcrawl.db?mode=rwc")]
    database_url: String,

    /// Directory for PDF and text blobs
    #[arg(long, global = true, default_value = "data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a PDF as a depth-1 seed document
    Upload {
        /// Path to the PDF file
        file: PathBuf,
    },

    /// Extract text for documents awaiting it
    Extract {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Qualify documents with text but no relevance verdict
    Qualify {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Mine references from qualified documents
    References {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Search and download candidate PDFs for new references
    Crawl {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Mine cause-effect triplets from document text
    Triplets {
        /// Which mining pass to run
        #[arg(value_enum)]
        group: GroupArg,

        #[arg(long, default_value_t = 10)]
        limit: usize,
    },

    /// Reset a document to a status, clearing its error
    Reset {
        /// Document record id
        id: uuid::Uuid,

        /// Target status (defaults to Initial)
        #[arg(long, default_value = "Initial")]
        status: String,
    },

    /// Print corpus statistics
    Stats,

    /// Export every record as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GroupArg {
    /// Open-form subject/predicate/object triples
    Basic,
    /// Controlled-vocabulary triples with frequency and context
    Contextual,
}

impl From<GroupArg> for TripletGroup {
    fn from(value: GroupArg) -> Self {
        match value {
            GroupArg::Basic => TripletGroup::Basic,
            GroupArg::Contextual => TripletGroup::Contextual,
        }
    }
}

fn print_report(name: &str, report: &BatchReport) {
    println!(
        "{name}: {} attempted, {} succeeded, {} failed",
        report.attempted,
        report.succeeded,
        report.failures.len()
    );
    for failure in &report.failures {
        println!("  {} failed: {}", failure.item, failure.error);
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "refcrawl=info,refcrawl_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    let records = Arc::new(
        SqliteStore::new(&cli.database_url)
            .await
            .context("failed to open database")?,
    );
    let content = FsContentStore::new(&cli.data_dir);

    match cli.command {
        Command::Upload { file } => {
            let file_name = file
                .file_name()
                .and_then(|n| n.to_str())
                .context("file path has no usable file name")?
                .to_string();
            let bytes = std::fs::read(&file).with_context(|| format!("reading {}", file.display()))?;

            content.put_pdf(&file_name, &bytes).await?;
            let doc = records
                .insert_document(NewDocument::seed(&file_name))
                .await?;
            println!("uploaded {} as seed document {}", file_name, doc.id);
        }

        Command::Extract { limit } => {
            let extractor = LopdfTextExtractor::new();
            let report =
                extract::run_extract_batch(limit, records.as_ref(), &content, &extractor).await?;
            print_report("extract", &report);
        }

        Command::Qualify { limit } => {
            let ai = OpenAi::from_env()?;
            let report =
                qualify::run_qualify_batch(limit, records.as_ref(), &content, &ai).await?;
            print_report("qualify", &report);
        }

        Command::References { limit } => {
            let ai = OpenAi::from_env()?;
            let report =
                references::run_reference_batch(limit, records.as_ref(), &content, &ai).await?;
            print_report("references", &report);
        }

        Command::Crawl { limit } => {
            let locator = GoogleCseLocator::from_env()?;
            let fetcher = HttpPaperFetcher::new();
            let report =
                crawl::run_crawl_batch(limit, records.as_ref(), &content, &locator, &fetcher)
                    .await?;
            print_report("crawl", &report);
        }

        Command::Triplets { group, limit } => {
            let ai = OpenAi::from_env()?;
            let report = triplets::run_triplet_batch(
                group.into(),
                limit,
                records.as_ref(),
                &content,
                &ai,
            )
            .await?;
            print_report("triplets", &report);
        }

        Command::Reset { id, status } => {
            let status: DocumentStatus = status
                .parse()
                .map_err(|e: String| anyhow::anyhow!(e))?;
            let doc = records
                .update_document(
                    id,
                    refcrawl::DocumentUpdate::new()
                        .with_status(status)
                        .clearing_error(),
                )
                .await?;
            println!("document {} reset to {}", doc.id, doc.status);
        }

        Command::Stats => {
            let documents = records.all_documents().await?;
            let reference_records = records.all_references().await?;
            let stats = compute_stats(&documents, &reference_records);

            println!("documents: {}", stats.total_documents);
            for (status, count) in &stats.documents_by_status {
                println!("  {status}: {count}");
            }
            println!("by depth (max {}):", stats.max_depth);
            for (depth, count) in &stats.documents_by_depth {
                println!("  depth {depth}: {count}");
            }
            println!(
                "qualified: {} accepted, {} rejected, {} pending",
                stats.qualified, stats.rejected, stats.qualification_pending
            );
            println!("references: {}", stats.total_references);
            for (status, count) in &stats.references_by_status {
                println!("  {status}: {count}");
            }
            println!("failed downloads: {}", stats.failed_downloads);
        }

        Command::Export { output } => {
            let documents = records.all_documents().await?;
            let reference_records = records.all_references().await?;
            let export = CorpusExport::new(documents, reference_records);
            let json = export.to_json()?;

            match output {
                Some(path) => {
                    std::fs::write(&path, json)
                        .with_context(|| format!("writing {}", path.display()))?;
                    println!("exported to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
    }

    Ok(())
}
