use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use quilldeck::store::{self, migrations, SqliteStore};
use quilldeck::{Config, DocumentService, DocumentType, SummaryLength, SummaryRequest};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

/// Upload text documents and summarize them, locally or through a chat completions backend.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TOML config file. Defaults to the per-user config when present.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database path; overrides config and DB_PATH.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create or upgrade the database schema
    Migrate,
    /// Store a .txt or .md file for a user
    Upload {
        #[arg(long)]
        user: Uuid,
        #[arg(long)]
        file: PathBuf,
        /// Defaults to the file name
        #[arg(long)]
        title: Option<String>,
    },
    /// Generate a new summary for a document
    Summarize {
        id: Uuid,
        /// short, medium or long
        #[arg(long)]
        length: Option<SummaryLength>,
        /// Bound for the remote call, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
    /// Print a document
    Show { id: Uuid },
    /// List a user's documents, newest first
    List {
        #[arg(long)]
        user: Uuid,
    },
    /// Print every summary of a document, oldest first
    Summaries { id: Uuid },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.database.path = db;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.filter))
        .context("invalid log filter")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(path = %config.database.path.display(), "opening database");
    let pool = store::open_pool(&config.database)
        .with_context(|| format!("failed to open database: {}", config.database.path.display()))?;
    let sqlite = Arc::new(SqliteStore::new(pool));
    sqlite.migrate().context("failed to migrate database")?;

    let service = DocumentService::new(sqlite.clone(), sqlite.clone(), &config)?;

    tracing::debug!(command = ?cli.command, remote = service.uses_remote_backend(), "running command");
    match cli.command {
        Commands::Migrate => {
            let conn = sqlite.pool().get()?;
            println!(
                "Database {} at schema version {}",
                config.database.path.display(),
                migrations::current_version(&conn)?
            );
        }
        Commands::Upload { user, file, title } => {
            let doc_type = DocumentType::from_path(&file)?;
            let content = fs::read_to_string(&file)
                .with_context(|| format!("failed to read file: {}", file.display()))?;
            let title = match title {
                Some(title) => title,
                None => file
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            };
            print_json(&service.upload_document(user, &title, &content, doc_type)?)?;
        }
        Commands::Summarize {
            id,
            length,
            timeout_secs,
        } => {
            let request = SummaryRequest {
                length,
                timeout: timeout_secs.map(Duration::from_secs),
            };
            print_json(&service.generate_summary_with(id, request)?)?;
        }
        Commands::Show { id } => print_json(&service.get_document(id)?)?,
        Commands::List { user } => print_json(&service.get_user_documents(user)?)?,
        Commands::Summaries { id } => print_json(&service.get_document_summaries(id)?)?,
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
