use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};

use kbase_cli::{server, App};
use kbase_core::config::Config;
use kbase_core::loader::{has_allowed_extension, list_documents, read_document};
use kbase_core::logging;
use kbase_core::types::Query;
use kbase_hybrid::Answer;

#[derive(Parser)]
#[command(name = "kbase", version, about = "Local knowledge base question answering")]
struct Cli {
    /// Directory holding config.toml and its env overlays (default: cwd)
    #[arg(long)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Ingest .txt/.md files; directories are walked recursively
    Ingest {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Print the ranked passages for a query
    Search { query: String },
    /// Answer a question from the ingested documents
    Ask { question: String },
    /// Remove every chunk of a document
    Delete { doc_id: String },
    /// Run the HTTP API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config_dir {
        Some(dir) => {
            let env_name = std::env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());
            Config::load_from(dir, &env_name)?
        }
        None => Config::load()?,
    };
    let settings = config.settings().context("loading settings")?;
    logging::init(&settings.logging.filter);

    let app = App::build(settings).await.context("starting services")?;
    match cli.command {
        Command::Ingest { paths } => ingest(&app, &paths).await?,
        Command::Search { query } => {
            let passages = app.pipeline().retrieve(&Query::new(query)).await?;
            if passages.is_empty() {
                println!("No matching passages.");
            }
            for (rank, p) in passages.iter().enumerate() {
                println!("{}. [{:.4}] {} ({})", rank + 1, p.score, p.id, p.doc_id);
                println!("   {}", p.content.replace('\n', " "));
            }
        }
        Command::Ask { question } => match app.answers.answer(&question).await? {
            Answer::Generated { text, sources } => {
                println!("{text}\n\nSources:");
                for (i, s) in sources.iter().enumerate() {
                    println!("[{}] {}", i + 1, s.content.replace('\n', " "));
                }
            }
            Answer::NoRelevantDocuments => println!("{}", server::NO_ANSWER_MESSAGE),
        },
        Command::Delete { doc_id } => {
            app.ingestor.delete_document(&doc_id).await?;
            println!("Deleted document {doc_id}");
        }
        Command::Serve { host, port } => {
            let host = host.unwrap_or_else(|| app.settings.server.host.clone());
            let port = port.unwrap_or(app.settings.server.port);
            server::run(Arc::new(app), &format!("{host}:{port}")).await?;
        }
    }
    Ok(())
}

async fn ingest(app: &App, paths: &[PathBuf]) -> anyhow::Result<()> {
    let allowed = &app.settings.upload.allowed_extensions;
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(list_documents(path, allowed));
        } else if has_allowed_extension(path, allowed) {
            files.push(path.clone());
        } else {
            eprintln!("Skipping {} (allowed: {})", path.display(), allowed.join(", "));
        }
    }
    if files.is_empty() {
        println!("No documents to ingest.");
        return Ok(());
    }

    let pb = ProgressBar::new(files.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );
    let mut total_chunks = 0usize;
    for file in &files {
        pb.set_message(file.display().to_string());
        let text = read_document(file).with_context(|| format!("reading {}", file.display()))?;
        let report = app.ingestor.ingest_text(&text).await.with_context(|| format!("ingesting {}", file.display()))?;
        total_chunks += report.chunks;
        pb.println(format!("{} -> {} ({} chunks)", file.display(), report.doc_id, report.chunks));
        pb.inc(1);
    }
    pb.finish_with_message("done");
    println!("Ingested {} files, {} chunks", files.len(), total_chunks);
    Ok(())
}
