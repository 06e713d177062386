use anyhow::{Context, Result, anyhow};
use chrono::{Duration, Utc};
use clap::{Args, Parser, Subcommand};
use indexkeeper::connection::config::DEFAULT_RETENTION_DAYS;
use indexkeeper::{ConnectionConfig, Document, IndexError, IndexManager};
use serde_json::{Value as JsonValue, json};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "indexkeeper")]
#[command(about = "Timestamped index rotation, alias repointing and retention for search clusters")]
struct Cli {
    #[command(flatten)]
    connection: ConnectionArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct ConnectionArgs {
    /// Cluster URL, credentials may be embedded
    #[arg(long, env = "INDEXKEEPER_URL", default_value = "http://localhost:9200")]
    url: String,
    #[arg(long, env = "INDEXKEEPER_USERNAME")]
    username: Option<String>,
    #[arg(long, env = "INDEXKEEPER_PASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long, env = "INDEXKEEPER_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Whole-request timeout; unset lets force-merges run to completion
    #[arg(long, env = "INDEXKEEPER_REQUEST_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,
    #[arg(long, env = "INDEXKEEPER_RETENTION_DAYS", default_value_t = DEFAULT_RETENTION_DAYS)]
    retention_days: u32,
}

#[derive(Subcommand)]
enum Command {
    /// Check that the cluster answers
    Ping,
    /// Create an index; timestamped after the alias unless --name is given
    Create {
        alias: String,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        body: IndexBody,
    },
    /// Create a timestamped index and point the alias at it alone
    Rotate {
        alias: String,
        #[command(flatten)]
        body: IndexBody,
    },
    /// Point an alias at exactly one index
    Point { alias: String, index: String },
    /// List the indices an alias points at
    Aliases { alias: String },
    /// List indices of an alias older than N days, newest first
    OlderThan {
        alias: String,
        #[arg(long)]
        days: u32,
    },
    /// Delete aged indices the alias no longer points at
    Cleanup {
        alias: String,
        /// Overrides the configured retention window
        #[arg(long)]
        days: Option<u32>,
    },
    Delete { index: String },
    /// Force-merge an index down to one segment
    Optimize { index: String },
    Refresh { index: String },
    Exists { index: String },
    /// Bulk-index an NDJSON file of {"id": ..., "doc": {...}} lines
    Bulk { target: String, file: PathBuf },
}

#[derive(Args)]
struct IndexBody {
    /// JSON file with the index mappings
    #[arg(long)]
    mappings: Option<PathBuf>,
    /// JSON file with the index settings
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl IndexBody {
    fn load(&self) -> Result<(JsonValue, JsonValue)> {
        Ok((
            read_json_or_empty(self.mappings.as_deref())?,
            read_json_or_empty(self.settings.as_deref())?,
        ))
    }
}

pub struct App {
    cli: Cli,
}

impl App {
    pub fn new() -> Self {
        Self { cli: Cli::parse() }
    }

    pub async fn run(&self) -> Result<()> {
        let manager = self.connect()?;

        match &self.cli.command {
            Command::Ping => {
                manager.ping().await?;
                println!("ok");
            }
            Command::Create { alias, name, body } => {
                let (mappings, settings) = body.load()?;
                let index = match name {
                    Some(name) => {
                        manager.create_index(name, &mappings, &settings).await?;
                        name.clone()
                    }
                    None => {
                        manager
                            .create_timestamped_index(alias, &mappings, &settings)
                            .await?
                    }
                };
                println!("{}", index);
            }
            Command::Rotate { alias, body } => {
                let (mappings, settings) = body.load()?;
                println!("{}", manager.rotate(alias, &mappings, &settings).await?);
            }
            Command::Point { alias, index } => {
                manager.set_alias_to_single_index(alias, index).await?;
                println!("{} -> {}", alias, index);
            }
            Command::Aliases { alias } => {
                print_names(&manager.indices_for_alias(alias).await?);
            }
            Command::OlderThan { alias, days } => {
                let cutoff = days_ago(*days);
                print_names(&manager.indices_older_than(alias, cutoff).await?);
            }
            Command::Cleanup { alias, days } => {
                let cutoff = days.map(days_ago);
                match manager.cleanup_old_indices(alias, cutoff).await {
                    Ok(deleted) => print_names(&deleted),
                    Err(IndexError::Cleanup { deleted, failures }) => {
                        print_names(&deleted);
                        for (index, error) in &failures {
                            eprintln!("failed to delete {}: {}", index, error);
                        }
                        return Err(anyhow!("{} deletions failed", failures.len()));
                    }
                    Err(e) => return Err(e.into()),
                }
            }
            Command::Delete { index } => {
                manager.delete_index(index).await?;
            }
            Command::Optimize { index } => {
                let response = manager.optimize_index(index).await?;
                println!("{}", response.body);
            }
            Command::Refresh { index } => {
                manager.refresh_index(index).await?;
            }
            Command::Exists { index } => {
                println!("{}", manager.index_exists(index).await?);
            }
            Command::Bulk { target, file } => {
                let documents = read_documents(file)?;
                let reconciliation = manager.index_document_bulk(target, &documents).await?;
                let errors: Vec<JsonValue> = reconciliation
                    .errors
                    .iter()
                    .map(|failure| json!({"id": failure.id, "error": failure.error}))
                    .collect();
                println!(
                    "{}",
                    json!({
                        "created": reconciliation.created_ids,
                        "updated": reconciliation.updated_ids,
                        "errors": errors,
                    })
                );
            }
        }

        Ok(())
    }

    fn connect(&self) -> Result<IndexManager> {
        let args = &self.cli.connection;
        let mut config = ConnectionConfig::from_url(&args.url)
            .map_err(|e| anyhow!(e))?
            .retention_days(args.retention_days);

        if let Some(username) = &args.username {
            config.username = Some(username.clone());
        }
        if let Some(password) = &args.password {
            config.password = Some(password.clone());
        }
        if let Some(api_key) = &args.api_key {
            config = config.api_key(api_key);
        }
        if let Some(secs) = args.timeout_secs {
            config = config.request_timeout(std::time::Duration::from_secs(secs));
        }

        IndexManager::connect_with_config(config)
            .with_context(|| format!("Failed to set up client for '{}'", args.url))
    }
}

fn days_ago(days: u32) -> i64 {
    (Utc::now() - Duration::days(i64::from(days))).timestamp_millis()
}

fn print_names(names: &[String]) {
    for name in names {
        println!("{}", name);
    }
}

fn read_json_or_empty(path: Option<&Path>) -> Result<JsonValue> {
    let Some(path) = path else {
        return Ok(json!({}));
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in '{}'", path.display()))
}

fn read_documents(path: &Path) -> Result<Vec<Document>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(number, line)| -> Result<Document> {
            let entry: JsonValue = serde_json::from_str(line)
                .with_context(|| format!("Line {}: invalid JSON", number + 1))?;
            let id = match entry.get("id") {
                Some(JsonValue::String(id)) => id.clone(),
                Some(JsonValue::Number(id)) => id.to_string(),
                _ => return Err(anyhow!("Line {}: missing \"id\"", number + 1)),
            };
            let doc = entry
                .get("doc")
                .cloned()
                .ok_or_else(|| anyhow!("Line {}: missing \"doc\"", number + 1))?;
            Ok(Document::new(id, doc))
        })
        .collect()
}
