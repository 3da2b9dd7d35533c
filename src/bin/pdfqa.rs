//! CLI binary for edgequake-pdfqa.
//!
//! A thin shim over the library crate that maps CLI flags to `QaConfig`,
//! wires stdin/stdout into the session loop and shows spinners while the
//! slow parts run.

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use edgequake_pdfqa::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use edgequake_pdfqa::{
    run_session, ApiKey, Completer, CompletionClient, PdfiumTextProvider, QaConfig, Reply,
    SessionOptions, TextProvider,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

fn spinner(prefix: &'static str, message: &'static str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(TICKS);
    bar.set_style(style);
    bar.set_prefix(prefix);
    bar.set_message(message);
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

// ── Spinner wrappers ─────────────────────────────────────────────────────────

/// Shows a spinner on stderr while the PDF text is extracted.
struct SpinnerTextProvider<P> {
    inner: P,
}

#[async_trait]
impl<P: TextProvider> TextProvider for SpinnerTextProvider<P> {
    async fn extract(&self, path: &Path) -> Option<String> {
        let bar = spinner("Reading", "Extracting PDF text…");
        let text = self.inner.extract(path).await;
        bar.finish_and_clear();
        text
    }
}

/// Shows a spinner on stderr while waiting for an answer (including backoff).
struct SpinnerCompleter<C> {
    inner: C,
}

#[async_trait]
impl<C: Completer> Completer for SpinnerCompleter<C> {
    async fn complete(&self, prompt: &str) -> Reply {
        let bar = spinner("Thinking", "Waiting for the model…");
        let reply = self.inner.complete(prompt).await;
        bar.finish_and_clear();
        reply
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Ask questions about the default document (knowledgeBase/self.pdf)
  pdfqa

  # Ask questions about another document
  pdfqa report.pdf

  # Use a different model, give up sooner when rate limited
  pdfqa --model gpt-4o-mini --max-attempts 3 report.pdf

  # Any OpenAI-compatible endpoint (Ollama, vLLM, LiteLLM, …)
  pdfqa --base-url http://localhost:11434/v1 --model llama3.2 report.pdf

Type a question and press Enter. Type q (or Q) to quit.

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          API key (required; may also live in ./.env)
  PDFQA_MODEL             Override model ID
  PDFQA_BASE_URL          Override the API root URL
  PDFIUM_LIB_PATH         Path to an existing libpdfium
  RUST_LOG                Override log filter (e.g. edgequake_pdfqa=debug)
"#;

/// Ask questions about a PDF document using a chat-completion LLM.
#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version,
    about = "Ask questions about a PDF document using a chat-completion LLM",
    long_about = "Extracts the text of a PDF once, then answers questions typed on stdin by \
sending the document text and the question to an OpenAI-compatible chat-completion endpoint. \
Rate-limited requests are retried with exponential backoff.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    #[arg(env = "PDFQA_PDF", default_value = "knowledgeBase/self.pdf")]
    pdf: PathBuf,

    /// Chat model ID.
    #[arg(long, env = "PDFQA_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// API root URL; `/chat/completions` is appended.
    #[arg(long, env = "PDFQA_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Max output tokens per answer.
    #[arg(long, env = "PDFQA_MAX_TOKENS", default_value_t = 150)]
    max_tokens: u32,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "PDFQA_TEMPERATURE", default_value_t = 0.7)]
    temperature: f32,

    /// Request attempts per question when rate limited (HTTP 429).
    #[arg(long, env = "PDFQA_MAX_ATTEMPTS", default_value_t = 5,
          value_parser = clap::value_parser!(u32).range(1..))]
    max_attempts: u32,

    /// Seconds to wait before the first retry; doubles on every 429.
    #[arg(long, env = "PDFQA_INITIAL_BACKOFF_SECS", default_value_t = 5)]
    initial_backoff_secs: u64,

    /// Per-request timeout in seconds.
    #[arg(long, env = "PDFQA_API_TIMEOUT", default_value_t = 60)]
    api_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDFQA_PASSWORD")]
    password: Option<String>,

    /// Reject questions whose prompt would exceed this many characters.
    #[arg(long, env = "PDFQA_MAX_PROMPT_CHARS")]
    max_prompt_chars: Option<usize>,

    /// Disable spinners.
    #[arg(long, env = "PDFQA_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFQA_VERBOSE")]
    verbose: bool,

    /// Suppress all logs except errors.
    #[arg(short, long, env = "PDFQA_QUIET", conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is fine; the key may come from the real environment.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Logs go to stderr so stdout carries only the conversation.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    // Fails before any input is read when the key is missing.
    let config = build_config(&cli)?;
    let client = CompletionClient::new(&config).context("Failed to create API client")?;
    let provider = PdfiumTextProvider::new().with_password(config.password.clone());
    let options = SessionOptions {
        max_prompt_chars: config.max_prompt_chars,
    };

    info!("Using model {} at {}", client.model(), config.endpoint());
    let retry = client.retry_policy();
    info!(
        "Rate-limit retry: {} attempts, waits {:?}",
        retry.max_attempts,
        retry.schedule()
    );

    // ── Run session ──────────────────────────────────────────────────────
    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();

    let show_progress = !cli.quiet && !cli.no_progress;
    let result = if show_progress {
        run_session(
            &SpinnerTextProvider { inner: provider },
            &SpinnerCompleter { inner: client },
            &cli.pdf,
            &options,
            stdin,
            &mut stdout,
        )
        .await
    } else {
        run_session(&provider, &client, &cli.pdf, &options, stdin, &mut stdout).await
    };
    let summary = result.context("Session failed")?;

    info!(
        "Session ended: {} questions, {} answered, {} failed, {} errors",
        summary.queries, summary.answered, summary.failed, summary.errors
    );

    Ok(())
}

/// Map CLI args to `QaConfig`.
fn build_config(cli: &Cli) -> Result<QaConfig> {
    let api_key = ApiKey::from_env().context("Cannot start without an API key")?;

    let mut builder = QaConfig::builder()
        .api_key(api_key)
        .model(cli.model.clone())
        .base_url(cli.base_url.clone())
        .max_tokens(cli.max_tokens)
        .temperature(cli.temperature)
        .max_attempts(cli.max_attempts)
        .initial_backoff(Duration::from_secs(cli.initial_backoff_secs))
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(n) = cli.max_prompt_chars {
        builder = builder.max_prompt_chars(n);
    }

    builder.build().context("Invalid configuration")
}
