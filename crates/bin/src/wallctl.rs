//! Moderation CLI for the sticker wall admin API.

use clap::{Parser, Subcommand};
use protocol::admin::{ModerationAction, StickerRecord};
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use wall::admin::{AdminClient, AdminError};

#[derive(Parser)]
#[command(name = "wallctl", about = "Moderate the sticker wall", version)]
struct Cli {
    /// Admin API base URL.
    #[arg(long, env = "WALL_ADMIN_URL", default_value = "http://127.0.0.1:8000/")]
    url: url::Url,

    /// Bearer token. Takes precedence over --token-file.
    #[arg(long, env = "WALL_ADMIN_TOKEN")]
    token: Option<String>,

    /// File holding the bearer token; cleared automatically when the
    /// session expires.
    #[arg(long, env = "WALL_ADMIN_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    /// Skip confirmation prompts.
    #[arg(short, long)]
    yes: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every sticker the server knows about.
    List,
    /// Ban a sticker and its senders.
    Ban {
        sticker_id: String,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Lift a ban.
    Unban { sticker_id: String },
    /// Hide a sticker from the wall without deleting it.
    Hide { sticker_id: String },
    /// Put a hidden sticker back on the wall.
    Show { sticker_id: String },
    /// Permanently delete a sticker.
    Delete { sticker_id: String },
    /// Delete every sticker on the wall.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let token = resolve_token(&cli)?;
    let client = AdminClient::new(cli.url.clone(), token);

    let result = run_command(&cli, &client).await;
    if let Err(AdminError::SessionExpired) = &result {
        if let Some(path) = &cli.token_file {
            let _ = std::fs::remove_file(path);
            eprintln!("Session expired, cached token cleared");
        }
    }
    result?;
    Ok(())
}

async fn run_command(cli: &Cli, client: &AdminClient) -> Result<(), AdminError> {
    match &cli.command {
        Command::List => {
            let records = client.list().await?;
            print_records(&records);
        }
        Command::Ban { sticker_id, reason } => {
            if confirm(cli.yes, &format!("Ban sticker {sticker_id}?")) {
                client
                    .moderate(sticker_id, ModerationAction::Ban, reason.clone())
                    .await?;
                println!("Banned {sticker_id}");
            }
        }
        Command::Unban { sticker_id } => {
            client
                .moderate(sticker_id, ModerationAction::Unban, None)
                .await?;
            println!("Unbanned {sticker_id}");
        }
        Command::Hide { sticker_id } => {
            client
                .moderate(sticker_id, ModerationAction::Hide, None)
                .await?;
            println!("Hid {sticker_id}");
        }
        Command::Show { sticker_id } => {
            client
                .moderate(sticker_id, ModerationAction::Show, None)
                .await?;
            println!("Showing {sticker_id}");
        }
        Command::Delete { sticker_id } => {
            if confirm(cli.yes, &format!("Permanently delete {sticker_id}?")) {
                client.delete(sticker_id).await?;
                println!("Deleted {sticker_id}");
            }
        }
        Command::Clear => {
            let records = client.list().await?;
            if records.is_empty() {
                println!("Wall is already empty");
                return Ok(());
            }
            let prompt = format!("Permanently delete all {} stickers?", records.len());
            if confirm(cli.yes, &prompt) {
                for record in &records {
                    client.delete(&record.sticker_id).await?;
                    println!("Deleted {}", record.sticker_id);
                }
            }
        }
    }
    Ok(())
}

fn resolve_token(cli: &Cli) -> anyhow::Result<String> {
    if let Some(token) = &cli.token {
        return Ok(token.clone());
    }
    if let Some(path) = &cli.token_file {
        match std::fs::read_to_string(path) {
            Ok(contents) => return Ok(contents.trim().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    anyhow::bail!("no admin token: pass --token or --token-file")
}

fn confirm(skip: bool, prompt: &str) -> bool {
    if skip {
        return true;
    }
    print!("{prompt} [y/N] ");
    let _ = std::io::stdout().flush();
    let mut answer = String::new();
    if std::io::stdin().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim(), "y" | "Y" | "yes")
}

fn print_records(records: &[StickerRecord]) {
    if records.is_empty() {
        println!("No stickers");
        return;
    }
    for record in records {
        let state = if record.enabled { "enabled" } else { "hidden" };
        println!("{}  {}  {}", record.sticker_id, state, record.file_path);
        for submitter in &record.telegram {
            println!("    @{} ({})", submitter.user, submitter.id);
        }
    }
}
