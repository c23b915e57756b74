//! `jarvis` command-line entry point.

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use jarvis_rs::JarvisClient;
use jarvis_rs::config::{JarvisConfig, LayeredConfigOptions};
use jarvis_rs::core::Orchestrator;
use jarvis_rs::protocol::AskResponse;
use jarvis_rs::server::{self, AppState};
use log::{info, warn};
use std::io::{self, BufRead, Write};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Command-line options for the Jarvis binary.
#[derive(Parser)]
#[command(name = "jarvis", version, about = "Assistant with memory, web search and reflection")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve {
        /// Extra jarvis.json5 applied after the user and cwd layers
        #[arg(long)]
        config: Option<PathBuf>,
        /// Address to listen on (overrides config and JARVIS_BIND)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Ask a running server; reads prompts from stdin when none is given
    Ask {
        /// Server base URL
        #[arg(long, default_value = "http://127.0.0.1:8000")]
        url: String,
        prompt: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    jarvis_rs::init_logging();
    let cli = Cli::parse();
    match cli.command {
        Command::Serve { config, bind } => serve(config, bind).await,
        Command::Ask { url, prompt } => ask(url, prompt).await,
    }
}

async fn serve(config_path: Option<PathBuf>, bind: Option<String>) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("resolve current directory")?;
    let mut options = LayeredConfigOptions::new(cwd);
    if let Some(path) = config_path.as_ref() {
        options = options.with_runtime_path(path);
    }
    let mut config = JarvisConfig::load_layered_with_options(options)
        .context("load config")?
        .config;
    config.apply_process_env().context("apply environment overrides")?;
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    let credentials = config
        .resolve_credentials(|name| std::env::var(name).ok())
        .context("resolve credentials")?;
    let addr: SocketAddr = config
        .server
        .bind
        .parse()
        .with_context(|| format!("invalid bind address {:?}", config.server.bind))?;

    info!("starting jarvis (model={}, bind={addr})", config.generator.model);
    let orchestrator = Orchestrator::from_config(&config, &credentials)
        .await
        .context("build orchestrator")?;
    server::serve(Arc::new(AppState::new(orchestrator)), addr)
        .await
        .context("serve")?;
    Ok(())
}

async fn ask(url: String, prompt: Option<String>) -> anyhow::Result<()> {
    let client = JarvisClient::new(url);
    if let Some(prompt) = prompt {
        if prompt.trim().is_empty() {
            bail!("please enter a question");
        }
        let response = client.ask(&prompt).await.context("ask")?;
        print_response(&response);
        return Ok(());
    }

    let mut history: Vec<(String, String)> = Vec::new();
    let stdin = io::stdin();
    prompt_marker()?;
    for line in stdin.lock().lines() {
        let line = line.context("read stdin")?;
        let prompt = line.trim();
        if prompt.is_empty() {
            eprintln!("please enter a question");
        } else {
            match client.ask(prompt).await {
                Ok(response) => {
                    print_response(&response);
                    history.push((prompt.to_string(), response.response));
                }
                Err(err) => warn!("ask failed (err={err})"),
            }
        }
        prompt_marker()?;
    }

    if !history.is_empty() {
        println!("\nConversation history");
        for (idx, (question, answer)) in history.iter().enumerate() {
            println!("{}. You: {question}", idx + 1);
            println!("   Jarvis: {answer}");
        }
    }
    Ok(())
}

fn prompt_marker() -> anyhow::Result<()> {
    print!("> ");
    io::stdout().flush().context("flush stdout")?;
    Ok(())
}

fn print_response(response: &AskResponse) {
    println!("{}", response.response);
    if response.cached {
        println!("(cached, {})", response.processing_time);
    } else {
        println!("({})", response.processing_time);
    }
    for memory in &response.related_memories {
        println!("related memory: {memory}");
    }
}
