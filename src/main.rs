//! Mynah — console chat client entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config
//!   3. Init logger at the configured level
//!   4. Build the chat backend and probe its health
//!   5. Run the console loop until Ctrl-C, EOF, or /quit

use std::io::Write as _;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use mynah::api;
use mynah::config;
use mynah::error::AppError;
use mynah::logger;
use mynah::session::ChatSession;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::parse_level(&config.log_level)?;
    logger::init(&config.log_level, config.log_file.as_deref())?;

    info!(
        name = %config.name,
        backend = %config.api.backend,
        base_url = %config.api.http.base_url,
        "config loaded"
    );

    let backend = api::build(&config.api)?;
    if !backend.health_check().await {
        warn!("chat backend unreachable — messages will fail until it comes up");
    }

    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                shutdown.cancel();
            }
        });
    }

    let session = ChatSession::new(backend.clone());
    run_console(session, backend, shutdown).await
}

/// Read-line loop: plain input is sent as a message; `/clear`, `/retry`,
/// `/history`, and `/quit` map to session and backend operations. Runs until
/// the `shutdown` token is cancelled (Ctrl-C) or stdin is closed.
async fn run_console(
    mut session: ChatSession,
    backend: api::ChatBackend,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    println!("─────────────────────────────────");
    println!(" Mynah console  (Ctrl-C to quit)");
    println!(" commands: /clear /retry /history /quit");
    println!("─────────────────────────────────");
    if let Some(greeting) = session.messages().first() {
        println!("{}", greeting.text);
    }

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        print!("> ");
        let _ = std::io::stdout().flush();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                println!("\nclosing console");
                info!("console shutting down");
                break;
            }

            line = lines.next_line() => {
                match line {
                    Err(e) => {
                        warn!("console read error: {e}");
                        break;
                    }
                    Ok(None) => {
                        info!("stdin closed");
                        break;
                    }
                    Ok(Some(input)) => {
                        let input = input.trim();
                        match input {
                            "" => continue,
                            "/quit" => break,
                            "/clear" => {
                                session.clear_messages().await;
                                println!("(conversation cleared)");
                            }
                            "/retry" => match session.retry_last_message().await {
                                Some(reply) => println!("{}", reply.text),
                                None => println!("(nothing to retry)"),
                            },
                            "/history" => match session.conversation_id() {
                                None => println!("(no conversation yet)"),
                                Some(id) => match backend.conversation_history(id).await {
                                    Ok(history) => println!("{history:#}"),
                                    Err(e) => eprintln!("! {e}"),
                                },
                            },
                            _ => {
                                if let Some(reply) = session.send_message(input).await {
                                    println!("{}", reply.text);
                                }
                                if let Some(err) = session.last_error() {
                                    eprintln!("! {err}");
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    Ok(())
}
