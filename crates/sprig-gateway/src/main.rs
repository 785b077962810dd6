#![allow(clippy::print_stdout, clippy::print_stderr)] // CLI binary — stdout/stderr is the UI

mod cli;
mod config;
mod direct;
mod service;
mod tracker;
mod tracing_setup;

use anyhow::{Context, Result};
use clap::Parser;
use sprig_agent::AnthropicGenerator;
use sprig_coach::CoachEngine;
use sprig_core::traits::{HabitTracker, ProfileStore, TextGenerator};
use sprig_ipc::{
    ClientMessage, IpcClient, IpcConnection, IpcServer, PROTOCOL_VERSION, ServerMessage,
    SubmitPayload, socket_path,
};
use sprig_memory::SqliteProfileStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::cli::{Cli, Commands};
use crate::config::Config;
use crate::service::CoachService;
use crate::tracker::LocalTracker;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let _tracing_guard = tracing_setup::init();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        pid = std::process::id(),
        "sprig starting"
    );

    match cli.command {
        Commands::Start => cmd_start(cli.config.as_deref()).await,
        Commands::Chat { user } => cmd_chat(cli.config.as_deref(), &user).await,
        Commands::Check => cmd_check(cli.config.as_deref()),
        Commands::Version => {
            println!("🌱 sprig {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

// ---------------------------------------------------------------------------
// cmd_check — validate config without starting
// ---------------------------------------------------------------------------

fn cmd_check(config_path: Option<&str>) -> Result<()> {
    let config_file = Config::find_config_path(config_path);
    match Config::load(&config_file) {
        Ok(config) => {
            println!("config ok: {}", config_file.display());
            println!("  coach:     {} ({})", config.coach.id, config.coach.model);
            println!("  generator: {}", config.generator.name);
            println!("  store:     {}", config.store.db_path);
            Ok(())
        }
        Err(error) => {
            eprintln!("config error: {error:#}");
            std::process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// cmd_start — gateway daemon
// ---------------------------------------------------------------------------

async fn cmd_start(config_path: Option<&str>) -> Result<()> {
    let config_file = Config::find_config_path(config_path);
    let config = Config::load(&config_file)
        .with_context(|| format!("loading config from {}", config_file.display()))?;

    let config_dir = config_file
        .parent()
        .unwrap_or(&PathBuf::from("."))
        .to_path_buf();

    anyhow::ensure!(
        config.generator.name == "anthropic",
        "only the 'anthropic' generator is supported (got '{}')",
        config.generator.name
    );
    let generator: Arc<dyn TextGenerator> = Arc::new(
        AnthropicGenerator::from_env(&config.coach.model)
            .context("failed to initialize Anthropic generator")?,
    );

    let db_path = config.resolve_db_path(&config_dir);
    info!(path = %db_path.display(), "initializing profile store");
    let store: Arc<dyn ProfileStore> = Arc::new(
        SqliteProfileStore::open(&db_path)
            .with_context(|| format!("failed to open profile db at {}", db_path.display()))?,
    );

    let tracker: Arc<dyn HabitTracker> = Arc::new(LocalTracker::new());
    let engine = CoachEngine::new(generator);
    let service = Arc::new(CoachService::new(
        config.coach.id.clone(),
        engine,
        store,
        tracker,
    ));

    let socket = socket_path(&config.coach.id);
    let server = IpcServer::bind(&socket)?;

    info!(
        coach = %config.coach.id,
        model = %config.coach.model,
        socket = %server.socket_path().display(),
        "gateway started"
    );
    println!("gateway listening on {}", server.socket_path().display());

    loop {
        tokio::select! {
            accepted = server.accept() => {
                match accepted {
                    Ok(connection) => {
                        let service = Arc::clone(&service);
                        tokio::spawn(async move {
                            if let Err(error) = handle_client(connection, service).await {
                                warn!(error = %error, "ipc client disconnected with error");
                            }
                        });
                    }
                    Err(error) => {
                        warn!(error = %error, "failed to accept IPC client");
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("shutting down");
                break;
            }
        }
    }

    Ok(())
}

async fn handle_client(mut connection: IpcConnection, service: Arc<CoachService>) -> Result<()> {
    loop {
        let Ok(message) = connection.recv().await else {
            return Ok(());
        };

        match message {
            ClientMessage::Hello { version } => {
                if version != PROTOCOL_VERSION {
                    warn!(
                        client_version = version,
                        server_version = PROTOCOL_VERSION,
                        "ipc version mismatch"
                    );
                }
                connection
                    .send(ServerMessage::Hello {
                        version: PROTOCOL_VERSION,
                        coach_id: service.coach_id().to_owned(),
                    })
                    .await?;
            }
            ClientMessage::Health => {
                let (status, uptime_secs) = service.health();
                connection
                    .send(ServerMessage::Health {
                        status,
                        uptime_secs,
                    })
                    .await?;
            }
            ClientMessage::Submit { user_id, payload } => {
                match service.submit(&user_id, payload).await {
                    Ok(reply) => {
                        connection
                            .send(ServerMessage::Reply {
                                user_id,
                                text: reply.text,
                                streak: reply.streak,
                            })
                            .await?;
                    }
                    Err(error) => {
                        warn!(user = %user_id, error = %error, "turn failed");
                        connection
                            .send(ServerMessage::Error {
                                message: format!("{error:#}"),
                            })
                            .await?;
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// cmd_chat — terminal REPL over IPC
// ---------------------------------------------------------------------------

async fn cmd_chat(config_path: Option<&str>, user: &str) -> Result<()> {
    let config_file = Config::find_config_path(config_path);
    let config = Config::load(&config_file)
        .with_context(|| format!("loading config from {}", config_file.display()))?;

    let socket = socket_path(&config.coach.id);
    let mut client = IpcClient::connect(&socket).await.with_context(|| {
        format!(
            "is the gateway running? (sprig start)\nsocket: {}",
            socket.display()
        )
    })?;

    let hello = client
        .round_trip(ClientMessage::Hello {
            version: PROTOCOL_VERSION,
        })
        .await?;
    let coach_id = match hello {
        ServerMessage::Hello { version, coach_id } => {
            if version != PROTOCOL_VERSION {
                warn!(
                    server_version = version,
                    client_version = PROTOCOL_VERSION,
                    "protocol version mismatch"
                );
            }
            coach_id
        }
        other => anyhow::bail!("unexpected server response: {other:?}"),
    };

    println!("connected to {coach_id} as {user}");
    println!("plain text talks to the coach; !done <habit> / !missed <habit> report a day; ctrl-d quits");

    let stdin = BufReader::new(tokio::io::stdin());
    let mut lines = stdin.lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"you> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let payload = parse_chat_line(line);
        let response = client
            .round_trip(ClientMessage::Submit {
                user_id: user.to_owned(),
                payload,
            })
            .await?;

        match response {
            ServerMessage::Reply { text, streak, .. } => {
                if streak > 0 {
                    println!("coach> {text}\n       🔥 {streak}-day streak");
                } else {
                    println!("coach> {text}");
                }
            }
            ServerMessage::Error { message } => {
                println!("error> {message}");
            }
            other => {
                println!("unexpected response: {other:?}");
            }
        }
    }

    println!("👋 Goodbye!");
    Ok(())
}

/// `!done <habit>` and `!missed <habit>` become structured reports;
/// everything else is a plain coaching message.
fn parse_chat_line(line: &str) -> SubmitPayload {
    if let Some(habit) = line.strip_prefix("!done ") {
        return SubmitPayload::UserReport {
            habit_id: habit.trim().to_owned(),
            completed: Some(true),
            note: None,
        };
    }
    if let Some(habit) = line.strip_prefix("!missed ") {
        return SubmitPayload::UserReport {
            habit_id: habit.trim().to_owned(),
            completed: Some(false),
            note: None,
        };
    }
    SubmitPayload::HabitInput {
        habit: line.to_owned(),
    }
}
