// src/main.rs
// Intake - conversational benefits intake

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use intake::config::{IntakeConfig, OracleCredentials, db_path_from_env};
use intake::intake::CollectedFields;
use intake::intake::urgency::assess;
use intake::oracle::HostedChatClient;
use intake::store::{ConversationStore, InMemoryConversationStore, SqliteConversationStore};
use intake::{IntakeError, IntakeOrchestrator};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "intake")]
#[command(about = "Conversational benefits intake")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an interactive intake session on stdin/stdout
    Chat {
        /// Resume or name a conversation (default: a new random id)
        #[arg(short, long)]
        conversation_id: Option<String>,

        /// SQLite database for conversations (default: INTAKE_DB_PATH, else in-memory)
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Print the urgency assessment of a collected-fields JSON file
    Score {
        /// Path to a JSON file shaped like the collected field set
        file: PathBuf,
    },
}

async fn open_store(db: Option<PathBuf>) -> Result<Arc<dyn ConversationStore>> {
    match db.or_else(db_path_from_env) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            info!(path = %path.display(), "Using SQLite conversation store");
            Ok(Arc::new(SqliteConversationStore::open(&path).await?))
        }
        None => Ok(Arc::new(InMemoryConversationStore::new())),
    }
}

async fn run_chat(
    config: &IntakeConfig,
    conversation_id: Option<String>,
    db: Option<PathBuf>,
) -> Result<()> {
    let creds = OracleCredentials::from_env()?;
    let oracle = Arc::new(HostedChatClient::new(&creds, &config.oracle));
    let store = open_store(db).await?;
    let orchestrator = IntakeOrchestrator::from_config(store, oracle, config);

    let id = conversation_id.unwrap_or_else(|| Uuid::new_v4().to_string());
    info!(conversation_id = %id, "Starting chat session");

    let welcome = orchestrator.start_conversation(&id).await?;
    println!("{}\n", welcome);

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if matches!(line, "/quit" | "/exit") {
            break;
        }

        let turn = match orchestrator.send_message(&id, line).await {
            Ok(turn) => turn,
            Err(IntakeError::InvalidInput(_)) => continue,
            Err(e) => return Err(e.into()),
        };
        println!("\n{}\n", turn.assistant_text);

        if let Some(case) = turn.submission {
            println!("Intake complete. Case submission:");
            println!("{}", serde_json::to_string_pretty(&case)?);
            break;
        }
    }

    Ok(())
}

fn run_score(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let fields: CollectedFields = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    let assessment = assess(&fields);
    println!("Urgency score: {}/10", assessment.score);
    println!("Reasoning: {}", assessment.reasoning());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    if let Some(home) = dirs::home_dir() {
        let _ = dotenvy::from_path(home.join(".intake/.env"));
    }
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config_path = IntakeConfig::config_path();
    let loaded = IntakeConfig::try_load_from(&config_path);
    let config = match &loaded {
        Ok(Some(config)) => config.clone(),
        _ => IntakeConfig::default(),
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.logging.tracing_level())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match loaded {
        Ok(Some(_)) => debug!(path = %config_path.display(), "Loaded config from file"),
        Ok(None) => debug!(path = %config_path.display(), "Config file not found, using defaults"),
        Err(e) => warn!(error = %e, "Failed to load config file, using defaults"),
    }

    match cli.command {
        Commands::Chat { conversation_id, db } => {
            run_chat(&config, conversation_id, db).await?;
        }
        Commands::Score { file } => {
            run_score(&file)?;
        }
    }

    Ok(())
}
