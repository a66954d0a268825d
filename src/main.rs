// src/main.rs

use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, Result, WrapErr};
use serde::Serialize;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{error, info};

use threat_lens::core::models::UrlScanFailure;
use threat_lens::{logging, runtime};
use threat_lens::{EngineConfig, ReputationList, ThreatEngine, UrlScanResponse};

const STDIN_SOURCE: &str = "-";

#[derive(Parser, Debug)]
#[command(
    name = "threat-lens",
    version,
    about = "Heuristic phishing and scam assessment for URLs and screenshots"
)]
struct Cli {
    /// JSON file with "trusted" and "dangerous" host lists replacing the built-in ones
    #[arg(long, value_name = "FILE", global = true)]
    reputation: Option<PathBuf>,

    /// TLS probe timeout in seconds
    #[arg(long, value_name = "SECS", global = true)]
    probe_timeout: Option<u64>,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    /// Mirror debug logs to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scan one or more URLs
    Url {
        #[arg(required = true)]
        urls: Vec<String>,
    },
    /// Process a base64 image or data URI read from a file, or from stdin with "-"
    Image { source: String },
    /// Analyze a piece of text, or text read from stdin with "-"
    Text { text: String },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let log_path = logging::initialize_logging(cli.verbose)?;
    info!(log = %log_path.display(), "Logging initialized.");

    let engine = ThreatEngine::new(build_config(&cli)?);
    runtime::run_to_completion(run(cli, engine)).wrap_err("failed to start the async runtime")?
}

async fn run(cli: Cli, engine: ThreatEngine) -> Result<()> {
    match cli.command {
        Command::Url { urls } => {
            // One task per URL so a slow host does not hold up the others.
            let scans = urls
                .into_iter()
                .map(|url| {
                    let engine = engine.clone();
                    let task = tokio::spawn({
                        let url = url.clone();
                        async move { engine.scan_url(&url).await }
                    });
                    (url, task)
                })
                .collect();

            for response in collect_scans(scans).await {
                print_json(&response, cli.pretty)?;
            }
        }
        Command::Image { source } => {
            let data = read_source(&source)?;
            print_json(&engine.process_image_bytes(&data), cli.pretty)?;
        }
        Command::Text { text } => {
            let response = if text == STDIN_SOURCE {
                engine.analyze_text_bytes(&read_source(STDIN_SOURCE)?)
            } else {
                engine.analyze_text_bytes(text.as_bytes())
            };
            print_json(&response, cli.pretty)?;
        }
    }

    Ok(())
}

/// Awaits every scan in submission order. A task that dies before producing a
/// response still yields a failure response for its URL.
async fn collect_scans(scans: Vec<(String, JoinHandle<UrlScanResponse>)>) -> Vec<UrlScanResponse> {
    let mut responses = Vec::with_capacity(scans.len());
    for (url, task) in scans {
        let response = match task.await {
            Ok(response) => response,
            Err(e) => {
                error!(url = %url, error = %e, "URL scan task failed to complete.");
                let error = format!("URL scan failed: {}", e);
                UrlScanResponse::Failed(UrlScanFailure::new(&url, error))
            }
        };
        responses.push(response);
    }
    responses
}

fn build_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = EngineConfig::from_env();
    if let Some(path) = &cli.reputation {
        let list = ReputationList::from_json_file(path).wrap_err("failed to load reputation list")?;
        config = config.with_reputation(list);
    }
    if let Some(secs) = cli.probe_timeout {
        config = config.with_probe_timeout(Duration::from_secs(secs));
    }
    Ok(config)
}

/// Reads raw bytes from a file, or from stdin for "-". Decoding is left to the
/// engine so that bad encodings come back as structured failures.
fn read_source(source: &str) -> Result<Vec<u8>> {
    if source == STDIN_SOURCE {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf).wrap_err("failed to read from stdin")?;
        Ok(buf)
    } else {
        std::fs::read(source).map_err(|e| eyre!("failed to read {}: {}", source, e))
    }
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", rendered);
    Ok(())
}
