use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use contract_bridge::contract::{RequestContract, ResponseContract, StreamEventContract};
use contract_bridge::logging::{SharedSink, TracingSink};
use contract_bridge::translate::openai_types::{ChatCompletionRequest, ChatCompletionResponse};
use contract_bridge::translate::streaming::{decode_payload, encode_payload, sse_data};
use contract_bridge::translate::ChatStreamFrame;
use contract_bridge::{
    BridgeConfig, RequestTranslator, ResponseTranslator, SharedLogger, StreamTranslator,
};
use futures::executor::block_on;
use futures::{stream, StreamExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "contract-bridge",
    about = "Translate OpenAI Chat Completions payloads to and from the provider-neutral contract",
    version
)]
struct Cli {
    /// Path to config file (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSONL file for translator diagnostics (overrides config)
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Translate a chat completion request
    Request {
        #[arg(value_enum)]
        direction: Direction,
        /// Input file, stdin when omitted or `-`
        input: Option<PathBuf>,
    },
    /// Translate a chat completion response
    Response {
        #[arg(value_enum)]
        direction: Direction,
        input: Option<PathBuf>,
    },
    /// Translate a stream of chunks or contract events, one per line
    Stream {
        #[arg(value_enum)]
        direction: Direction,
        input: Option<PathBuf>,
    },
    /// Print config search paths and exit
    ShowConfigPaths,
}

#[derive(Clone, Copy, ValueEnum)]
enum Direction {
    /// Vendor wire format to contract
    ToContract,
    /// Contract to vendor wire format
    FromContract,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "contract_bridge=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if matches!(cli.command, Command::ShowConfigPaths) {
        println!("Config search paths:");
        for (i, path) in contract_bridge::config::config_search_paths().iter().enumerate() {
            println!("  {}. {}", i + 1, path.display());
        }
        return Ok(());
    }

    let config = BridgeConfig::find_and_load(cli.config.as_deref())?;
    let log = build_sink(cli.log_file.as_deref(), &config)?;

    match cli.command {
        Command::Request { direction, input } => {
            let translator = RequestTranslator::new()
                .with_config(config.request.clone())
                .with_logger(log);
            let raw = read_input(input.as_deref())?;
            let output = match direction {
                Direction::ToContract => translate_json::<ChatCompletionRequest, RequestContract>(
                    &raw,
                    |req| translator.to_contract(req),
                )?,
                Direction::FromContract => {
                    translate_json::<RequestContract, ChatCompletionRequest>(&raw, |contract| {
                        translator.from_contract(contract)
                    })?
                }
            };
            println!("{output}");
        }
        Command::Response { direction, input } => {
            let translator = ResponseTranslator::new()
                .with_config(config.response.clone())
                .with_logger(log);
            let raw = read_input(input.as_deref())?;
            let output = match direction {
                Direction::ToContract => {
                    translate_json::<ChatCompletionResponse, ResponseContract>(&raw, |resp| {
                        translator.to_contract(resp)
                    })?
                }
                Direction::FromContract => {
                    translate_json::<ResponseContract, ChatCompletionResponse>(&raw, |contract| {
                        translator.from_contract(contract)
                    })?
                }
            };
            println!("{output}");
        }
        Command::Stream { direction, input } => {
            let translator = StreamTranslator::new().with_logger(log);
            let reader = open_input(input.as_deref())?;
            match direction {
                Direction::ToContract => stream_to_contract(&translator, reader)?,
                Direction::FromContract => stream_from_contract(&translator, reader)?,
            }
        }
        Command::ShowConfigPaths => {}
    }

    Ok(())
}

fn build_sink(cli_log_file: Option<&Path>, config: &BridgeConfig) -> anyhow::Result<SharedSink> {
    let file = cli_log_file.or(config.logging.file.as_deref());
    match file {
        Some(path) => {
            let logger = SharedLogger::new(path)
                .with_context(|| format!("failed to open log file {}", path.display()))?;
            info!(path = %path.display(), "Writing diagnostics to log file");
            Ok(Arc::new(logger))
        }
        None => Ok(Arc::new(TracingSink)),
    }
}

fn open_input(path: Option<&Path>) -> anyhow::Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(BufReader::new(std::io::stdin()))),
    }
}

fn read_input(path: Option<&Path>) -> anyhow::Result<String> {
    let mut raw = String::new();
    open_input(path)?.read_to_string(&mut raw)?;
    Ok(raw)
}

/// Decode `I`, translate, encode `O`. A JSON `null` passes through as `null`.
fn translate_json<I, O>(
    raw: &str,
    translate: impl Fn(&I) -> contract_bridge::Result<O>,
) -> anyhow::Result<String>
where
    I: DeserializeOwned,
    O: Serialize,
{
    let input: Option<I> = serde_json::from_str(raw).context("failed to parse input JSON")?;
    let output = input.as_ref().map(translate).transpose()?;
    Ok(serde_json::to_string_pretty(&output)?)
}

fn stream_to_contract(
    translator: &StreamTranslator,
    reader: Box<dyn BufRead>,
) -> anyhow::Result<()> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line?);
    }

    let frames = stream::iter(
        lines
            .iter()
            .filter_map(|line| sse_data(line))
            .map(decode_payload)
            .collect::<Vec<_>>(),
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut events = Box::pin(translator.events(frames));
    let mut count = 0usize;
    while let Some(event) = block_on(events.next()) {
        let event = event?;
        writeln!(out, "{}", serde_json::to_string(&event)?)?;
        count += 1;
    }
    debug!(count, "Wrote stream events");
    Ok(())
}

fn stream_from_contract(
    translator: &StreamTranslator,
    reader: Box<dyn BufRead>,
) -> anyhow::Result<()> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let event: StreamEventContract =
            serde_json::from_str(&line).context("failed to parse stream event")?;

        if let Some(error) = translator.error_to_wire(&event) {
            writeln!(out, "data: {}\n", encode_payload(&ChatStreamFrame::Error(error))?)?;
            return Ok(());
        }

        let chunk = translator.from_contract(&event)?;
        writeln!(out, "data: {}\n", encode_payload(&ChatStreamFrame::Chunk(chunk))?)?;
    }

    writeln!(out, "data: {}\n", encode_payload(&ChatStreamFrame::Done)?)?;
    Ok(())
}
