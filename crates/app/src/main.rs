use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use vault_search_core::{
    markdown, DocumentFilter, DocumentStore, EmbedWorkflow, FsVault, HttpDocumentStore, Searcher,
    Settings,
};

const SNIPPET_LEN: usize = 200;

#[derive(Parser)]
#[command(name = "vault-search", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to the settings file.
    #[arg(
        long,
        default_value = "vault-search.json",
        env = "VAULT_SEARCH_SETTINGS"
    )]
    settings: PathBuf,

    /// Collection name in the remote store.
    #[arg(long, default_value = "vault")]
    collection: String,
}

#[derive(Subcommand)]
enum Command {
    /// Embed vault files changed since the last successful run.
    Embed {
        /// Vault root directory.
        #[arg(long, default_value = ".")]
        vault: PathBuf,
    },
    /// Query the embedded vault. Reads queries from stdin when --query is
    /// omitted, one per line.
    Search {
        /// One-shot query text.
        #[arg(long)]
        query: Option<String>,
        /// Number of hits to return per query.
        #[arg(long, default_value = "10")]
        limit: usize,
    },
    /// List documents currently stored for a path.
    Documents {
        /// Vault-relative path to filter on.
        #[arg(long)]
        path: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();
    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "vault-search boot"
    );

    let mut settings = load_settings(&cli.settings).await?;

    if !settings.has_database() {
        bail!(
            "no database URL configured; set database_url in {}",
            cli.settings.display()
        );
    }

    let store = Arc::new(
        HttpDocumentStore::new(&settings.database_url, &cli.collection)
            .context("invalid database URL")?,
    );
    let pipeline = settings.pipeline.identity();

    // Registration is idempotent on the server; a transient failure here is
    // not fatal because embed and search surface their own store errors.
    match store.add_pipeline(&pipeline).await {
        Ok(()) => info!(pipeline, "pipeline registered"),
        Err(error) => warn!(%error, pipeline, "could not register pipeline"),
    }

    match cli.command {
        Command::Embed { vault } => {
            let vault = Arc::new(FsVault::new(vault));
            let workflow = EmbedWorkflow::new(vault, Arc::clone(&store), settings.clone());

            println!("Embedding changed files...");
            let report = workflow.run().await.context("embedding run failed")?;

            // The watermark only advances after a fully successful run.
            settings.last_run = report.watermark;
            save_settings(&cli.settings, &settings).await?;

            println!(
                "Embedded {} units from {} text files and {} PDF files",
                report.units_upserted, report.text_files, report.pdf_files
            );
        }
        Command::Search { query, limit } => {
            let searcher = Searcher::new(Arc::clone(&store), pipeline).with_limit(limit);

            match query {
                Some(text) => run_query(&searcher, &text).await,
                None => {
                    let stdin = std::io::stdin();
                    for line in stdin.lock().lines() {
                        let line = line?;
                        run_query(&searcher, line.trim()).await;
                    }
                }
            }
        }
        Command::Documents { path } => {
            let filter = DocumentFilter { path, kind: None };
            let documents = store
                .get_documents(&filter)
                .await
                .context("document lookup failed")?;

            for document in &documents {
                println!("{}", document.id);
            }
            println!("{} document(s)", documents.len());
        }
    }

    Ok(())
}

async fn run_query<S: DocumentStore + ?Sized>(searcher: &Searcher<S>, text: &str) {
    let hits = searcher.search(text).await;
    if hits.is_empty() {
        println!("no results");
        return;
    }

    for hit in hits {
        match hit.page {
            Some(page) => println!("{} (page {page}) ({:.3})", hit.path, hit.score),
            None => println!("{} ({:.3})", hit.path, hit.score),
        }
        println!(
            "  {}",
            markdown::truncate(&markdown::strip(&hit.content), SNIPPET_LEN)
        );
    }
}

async fn load_settings(path: &Path) -> anyhow::Result<Settings> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) => Settings::from_json(&raw)
            .with_context(|| format!("invalid settings in {}", path.display())),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "settings file not found, using defaults");
            Ok(Settings::default())
        }
        Err(error) => Err(error).with_context(|| format!("reading {}", path.display())),
    }
}

async fn save_settings(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    let raw = settings.to_json()?;
    tokio::fs::write(path, raw)
        .await
        .with_context(|| format!("writing {}", path.display()))
}
