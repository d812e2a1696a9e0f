//! QuizForge CLI — the main entry point.
//!
//! Commands:
//! - `flashcards` — Generate flashcards from study material
//! - `rate`       — Rate content quality on a 1-10 scale
//! - `hierarchy`  — Extract a concept hierarchy as an indented outline
//! - `solve`      — Solve a math problem iteratively with tools
//! - `config`     — Show the resolved configuration

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use quizforge_agent::{AgentLoop, Pipeline};
use quizforge_audit::AuditLog;
use quizforge_config::AppConfig;
use quizforge_core::output::RunOutput;
use quizforge_core::run::RunState;
use quizforge_providers::ProviderPool;

#[derive(Parser)]
#[command(
    name = "quizforge",
    about = "QuizForge — an iterative tool-calling study agent",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate flashcards from study material
    Flashcards {
        /// Study material; omit to read a file or stdin
        material: Option<String>,

        /// Read the material from a file
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Override the configured flashcard cap
        #[arg(long)]
        max_cards: Option<usize>,
    },

    /// Rate content quality on a 1-10 scale
    Rate {
        material: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Extract a concept hierarchy as an indented outline
    Hierarchy {
        material: Option<String>,

        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Solve a math problem iteratively with tools
    Solve {
        /// The problem statement
        problem: String,
    },

    /// Show the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Commands::Config = cli.command {
        println!("config file:    {}", AppConfig::config_dir().join("config.toml").display());
        println!("model:          {}", config.model);
        println!("max iterations: {}", config.max_iterations);
        println!("call timeout:   {}s", config.request_timeout_secs);
        println!("max flashcards: {}", config.max_flashcards);
        println!("audit log:      {}", config.audit.effective_path().display());
        println!("api key:        {}", if config.has_api_key() { "set" } else { "NOT SET" });
        return Ok(());
    }

    let Some(api_key) = config.api_key.clone() else {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    QUIZFORGE_API_KEY");
        eprintln!("    GEMINI_API_KEY");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    };

    let pool = ProviderPool::new(&config.model);
    let provider = pool.get(&api_key);
    let format = config.directives.to_format();

    let (pipeline, goal) = match &cli.command {
        Commands::Flashcards {
            material,
            file,
            max_cards,
        } => {
            let cards = (*max_cards).unwrap_or(config.max_flashcards);
            (
                Pipeline::flashcards(provider.clone(), cards),
                read_material(material.as_deref(), file.as_deref())?,
            )
        }
        Commands::Rate { material, file } => (
            Pipeline::content_rating(provider.clone()),
            read_material(material.as_deref(), file.as_deref())?,
        ),
        Commands::Hierarchy { material, file } => (
            Pipeline::concept_hierarchy(provider.clone()),
            read_material(material.as_deref(), file.as_deref())?,
        ),
        Commands::Solve { problem } => (Pipeline::arithmetic(), problem.clone()),
        Commands::Config => unreachable!("handled above"),
    };
    let pipeline = pipeline.with_format(format);

    let mut agent = AgentLoop::new(provider)
        .with_max_iterations(config.max_iterations as usize)
        .with_call_timeout(Duration::from_secs(config.request_timeout_secs));
    let audit = if config.audit.enabled {
        let log = AuditLog::open(config.audit.effective_path());
        agent = agent.with_audit(log.clone());
        Some(log)
    } else {
        None
    };

    let run = agent.run(&pipeline, &goal).await;
    if let Some(log) = &audit {
        log.flush().await;
    }

    match run.state {
        RunState::Succeeded(RunOutput::Flashcards(cards)) => {
            for (i, card) in cards.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                println!("Front: {}", card.front);
                println!("Back:  {}", card.back);
            }
            Ok(())
        }
        RunState::Succeeded(RunOutput::Score(score)) => {
            println!("Score: {score}/10");
            Ok(())
        }
        RunState::Succeeded(RunOutput::Text(text)) => {
            println!("{text}");
            Ok(())
        }
        RunState::Exhausted => Err(format!(
            "the model gave no final answer within {} iterations",
            run.iterations()
        )
        .into()),
        RunState::Failed(failure) => Err(failure.to_string().into()),
        RunState::Running => Err("run ended without a terminal state".into()),
    }
}

/// Resolve the study material from a positional argument, a file, or stdin.
fn read_material(
    material: Option<&str>,
    file: Option<&std::path::Path>,
) -> Result<String, Box<dyn std::error::Error>> {
    let text = match (material, file) {
        (Some(text), None) => text.to_string(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read {}: {e}", path.display()))?,
        (None, None) => std::io::read_to_string(std::io::stdin())?,
        (Some(_), Some(_)) => {
            return Err("pass the material inline or with --file, not both".into());
        }
    };
    let text = text.trim().to_string();
    if text.is_empty() {
        return Err("the study material is empty".into());
    }
    Ok(text)
}
