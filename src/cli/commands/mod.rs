
use crate::boundary::{ErrorBoundary, Rendered};
use crate::config::{ConsoleConfig, load_config};
use crate::errors::classify::envelope_for;
use crate::errors::{AppError, AppResult, ErrorBand, ErrorCode, lookup, status_for};
use crate::http::{ApiClient, CookieJar, RequestConfig};
use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use reqwest::Response;
use serde_json::Value;
use std::fmt::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "stackdeck")]
#[command(about = "Console request client and error-code reference")]
pub struct Cli {
    /// Path to config.json (defaults to ~/.stackdeck/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get {
        url: String,
        #[command(flatten)]
        opts: CallOptions,
    },
    /// Send a POST request
    Post {
        url: String,
        /// JSON request body
        #[arg(long)]
        body: Option<String>,
        #[command(flatten)]
        opts: CallOptions,
    },
    /// Send a PUT request
    Put {
        url: String,
        #[arg(long)]
        body: Option<String>,
        #[command(flatten)]
        opts: CallOptions,
    },
    /// Send a PATCH request
    Patch {
        url: String,
        #[arg(long)]
        body: Option<String>,
        #[command(flatten)]
        opts: CallOptions,
    },
    /// Send a DELETE request
    Delete {
        url: String,
        #[command(flatten)]
        opts: CallOptions,
    },
    /// Describe an error code
    Explain { code: u32 },
    /// List error codes
    Codes {
        /// Only list one band (e.g. network, auth, docker)
        #[arg(long)]
        band: Option<String>,
    },
}

#[derive(Args, Default)]
struct CallOptions {
    /// Per-attempt timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,
    /// Retries after the first attempt
    #[arg(long)]
    max_retries: Option<u32>,
    /// Make a single attempt
    #[arg(long)]
    no_retry: bool,
}

impl CallOptions {
    fn request_config(&self, cancel: CancellationToken) -> RequestConfig {
        let mut config = RequestConfig::default().with_cancel(cancel);
        config.timeout_ms = self.timeout_ms;
        config.max_retries = self.max_retries;
        if self.no_retry {
            config.retry = Some(false);
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

pub async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Explain { code } => {
            println!("{}", explain(code));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Codes { band } => {
            let band = band.as_deref().map(parse_band).transpose()?;
            print!("{}", list_codes(band));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Get { url, opts } => call(cli.config, Verb::Get, &url, None, &opts).await,
        Commands::Delete { url, opts } => {
            call(cli.config, Verb::Delete, &url, None, &opts).await
        }
        Commands::Post { url, body, opts } => {
            call(cli.config, Verb::Post, &url, body.as_deref(), &opts).await
        }
        Commands::Put { url, body, opts } => {
            call(cli.config, Verb::Put, &url, body.as_deref(), &opts).await
        }
        Commands::Patch { url, body, opts } => {
            call(cli.config, Verb::Patch, &url, body.as_deref(), &opts).await
        }
    }
}

fn build_client(config: &ConsoleConfig) -> AppResult<ApiClient> {
    let mut client = ApiClient::from_config(&config.http)?;
    if let Some(raw) = config.cookies.as_deref() {
        let jar = CookieJar::parse(raw);
        debug!("Loaded {} cookie(s) from config", jar.len());
        client = client.with_cookies(Arc::new(jar));
    }
    Ok(client)
}

fn parse_body(body: Option<&str>) -> AppResult<Option<Value>> {
    body.map(|raw| {
        serde_json::from_str::<Value>(raw).map_err(|e| {
            AppError::with_message(
                ErrorCode::ValidationInvalidFormat,
                format!("--body is not valid JSON: {e}"),
            )
        })
    })
    .transpose()
}

async fn send(
    client: &ApiClient,
    verb: Verb,
    url: &str,
    body: Option<&str>,
    config: RequestConfig,
) -> AppResult<Response> {
    let body = parse_body(body)?;
    match verb {
        Verb::Get => client.get(url, config).await,
        Verb::Delete => client.delete(url, config).await,
        Verb::Post => client.post(url, body.as_ref(), config).await,
        Verb::Put => client.put(url, body.as_ref(), config).await,
        Verb::Patch => client.patch(url, body.as_ref(), config).await,
    }
}

async fn call(
    config_path: Option<PathBuf>,
    verb: Verb,
    url: &str,
    body: Option<&str>,
    opts: &CallOptions,
) -> Result<ExitCode> {
    let config = load_config(config_path.as_deref())?;
    let client = build_client(&config)?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupted, cancelling request");
            on_signal.cancel();
        }
    });

    let response = match send(&client, verb, url, body, opts.request_config(cancel)).await {
        Ok(response) => response,
        Err(err) => {
            println!("{}", render_failure(&err));
            return Ok(ExitCode::FAILURE);
        }
    };

    let status = response.status();
    let text = response
        .text()
        .await
        .map_err(|e| AppError::from_reqwest(&e))?;
    debug!("HTTP {} ({} bytes)", status, text.len());

    let mut boundary = ErrorBoundary::new(|| format_body(&text), config.environment);
    match boundary.render() {
        Rendered::View(out) => {
            println!("{out}");
            Ok(ExitCode::SUCCESS)
        }
        Rendered::Fallback(fallback) => {
            eprintln!("{fallback}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// The failure envelope as printed to stdout. Never carries a stack.
fn render_failure(err: &AppError) -> String {
    let envelope = envelope_for(err, false);
    serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| err.user_message().to_string())
}

/// Pretty-print JSON bodies; pass anything else through.
fn format_body(text: &str) -> Result<String> {
    if text.trim().is_empty() {
        return Ok(String::new());
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => serde_json::to_string_pretty(&value).context("Failed to format response"),
        Err(_) => Ok(text.to_string()),
    }
}

fn explain(code: u32) -> String {
    let descriptor = lookup(code);
    let name = ErrorCode::from_u32(code).map_or("(unmapped)", ErrorCode::name);
    let band = ErrorBand::of(code).map_or("none", ErrorBand::as_str);

    let mut out = String::new();
    let _ = writeln!(out, "{code} {name}");
    let _ = writeln!(out, "  band:      {band}");
    let _ = writeln!(out, "  status:    {}", status_for(code));
    let _ = writeln!(out, "  retryable: {}", descriptor.retryable);
    let _ = writeln!(out, "  message:   {}", descriptor.user_message);
    if let Some(action) = descriptor.action {
        let _ = writeln!(out, "  action:    {action}");
    }
    out.trim_end().to_string()
}

fn list_codes(band: Option<ErrorBand>) -> String {
    let mut out = String::new();
    for code in ErrorCode::ALL
        .iter()
        .filter(|c| band.is_none_or(|b| c.band() == b))
    {
        let _ = writeln!(
            out,
            "{:>5}  {:<28} {}",
            code.as_u32(),
            code.name(),
            code.descriptor().user_message
        );
    }
    out
}

fn parse_band(name: &str) -> Result<ErrorBand> {
    match ErrorBand::parse(name) {
        Some(band) => Ok(band),
        None => bail!(
            "unknown band '{}', expected one of: {}",
            name,
            ErrorBand::ALL
                .iter()
                .map(|b| b.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}
