mod error;
mod llm;
mod repl;
mod services;

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::ErrorCode;
use crate::llm::config::{API_KEY_VAR, LlmConfig};
use crate::llm::types::{LlmError, Message};
use crate::llm::LlmClient;
use crate::services::session::{self, ChatSession};

const FALLBACK_ENV_FILE: &str = ".env.example";

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("startup failed: {0}")]
    Startup(#[from] LlmError),
    #[error("{0}")]
    Completion(LlmError),
    #[error("terminal I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl ErrorCode for CliError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Startup(e) | Self::Completion(e) => e.error_code(),
            Self::Io(_) => "E_IO",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Completion(e) if e.retryable())
    }
}

impl CliError {
    fn exit_code(&self) -> ExitCode {
        match self {
            Self::Startup(_) => ExitCode::from(2),
            Self::Completion(_) | Self::Io(_) => ExitCode::FAILURE,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "rds-assistant", version, about = "AWS RDS deployment assistant with brief general answers")]
struct Cli {
    /// Env file to load before reading configuration (default: .env, then .env.example).
    #[arg(long, env = "RDS_ASSISTANT_ENV_FILE")]
    env_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Interactive chat (default).
    Chat,
    /// Ask a single question and print the answer.
    Ask {
        #[arg(required = true, trailing_var_arg = true)]
        question: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    // Before the subscriber, so RUST_LOG may come from the env file.
    let env_file = load_env_file(cli.env_file.as_deref());
    init_tracing();
    env_file.log();

    match run(cli.command.unwrap_or(Command::Chat)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report(&e);
            e.exit_code()
        }
    }
}

async fn run(command: Command) -> Result<(), CliError> {
    let config = LlmConfig::from_env()?;
    let llm = LlmClient::from_config(config)?;
    info!(model = llm.model(), "LLM client initialized");

    match command {
        Command::Chat => {
            let mut stdout = std::io::stdout();
            repl::write_banner(&mut stdout, llm.model())?;
            let mut session = ChatSession::new(&llm);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            repl::run(&mut session, stdin, &mut stdout).await?;
        }
        Command::Ask { question } => {
            let question = question.join(" ");
            let answer = session::respond(&llm, &[Message::user(question)])
                .await
                .map_err(CliError::Completion)?;
            let mut stdout = std::io::stdout();
            writeln!(stdout, "{answer}")?;
        }
    }
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(EnvFilter::DEFAULT_ENV))
        .with_writer(std::io::stderr)
        .init();
}

/// Filter from `var`, or `warn` when unset or invalid.
fn log_filter(var: &str) -> EnvFilter {
    EnvFilter::try_from_env(var).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// What [`load_env_file`] did, logged once tracing is up.
enum EnvFileOutcome {
    Loaded(PathBuf),
    NotFound,
    Failed(PathBuf, dotenvy::Error),
}

impl EnvFileOutcome {
    fn log(&self) {
        match self {
            Self::Loaded(path) => info!(path = %path.display(), "env file loaded"),
            Self::NotFound => {}
            Self::Failed(path, e) => warn!(path = %path.display(), error = %e, "env file not loaded"),
        }
    }
}

/// Load `explicit`, or `.env` falling back to `.env.example`. Variables
/// already present in the process environment are kept.
fn load_env_file(explicit: Option<&Path>) -> EnvFileOutcome {
    if let Some(path) = explicit {
        return match dotenvy::from_path(path) {
            Ok(()) => EnvFileOutcome::Loaded(path.to_path_buf()),
            Err(e) => EnvFileOutcome::Failed(path.to_path_buf(), e),
        };
    }

    match dotenvy::dotenv() {
        Ok(path) => EnvFileOutcome::Loaded(path),
        Err(e) if e.not_found() => match dotenvy::from_path(FALLBACK_ENV_FILE) {
            Ok(()) => EnvFileOutcome::Loaded(PathBuf::from(FALLBACK_ENV_FILE)),
            Err(e) if e.not_found() => EnvFileOutcome::NotFound,
            Err(e) => EnvFileOutcome::Failed(PathBuf::from(FALLBACK_ENV_FILE), e),
        },
        Err(e) => EnvFileOutcome::Failed(PathBuf::from(".env"), e),
    }
}

fn report(error: &CliError) {
    eprintln!("error[{}]: {error}", error.error_code());
    if error.retryable() {
        eprintln!("(this failure is usually transient; try again)");
    }
    if matches!(error, CliError::Startup(LlmError::MissingApiKey { .. })) {
        eprintln!();
        eprintln!("Set your Together AI API key before starting:");
        eprintln!("  export {API_KEY_VAR}=your_api_key_here");
        eprintln!("Or add this line to a .env file:");
        eprintln!("  {API_KEY_VAR}=your_api_key_here");
    }
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
