use std::path::PathBuf;
use std::sync::Arc;
use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, LevelFilter};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use reposcribe::{host, logging, Config, Transcriber, Transcript};

mod cli;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// GitHub repository URL, optionally with /tree/<ref>/<path>
    url: String,

    /// Maximum directory depth to descend into (negative for unlimited)
    #[arg(short = 'd', long, allow_hyphen_values = true)]
    max_depth: Option<i32>,

    /// Proxy origin relaying GitHub API and raw content calls
    #[arg(short, long)]
    proxy: Option<String>,

    /// Upstream API origin
    #[arg(long)]
    api_base: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the transcript here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Omit files whose content looks binary
    #[arg(long)]
    detect_binary: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn", value_parser = logging::parse_log_level)]
    log_level: LevelFilter,
}

impl Cli {
    fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_file(path)?
                .with_overrides(reposcribe::config::EnvOverrides::from_env()?)?,
            None => Config::load()?,
        };
        if let Some(proxy) = &self.proxy {
            config.proxy_base = Some(proxy.clone());
        }
        if let Some(api_base) = &self.api_base {
            config.api_base = api_base.clone();
        }
        if self.detect_binary {
            config.detect_binary = true;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    logging::init(args.log_level);
    cli::print_banner();

    let config = args.load_config().context("loading configuration")?;
    let transcriber = Arc::new(Transcriber::new(config)?);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cli::print_warning("Interrupted, finishing the current request...");
            ctrl_c.cancel();
        }
    });

    let (tx, rx) = oneshot::channel();
    let pb = cli::create_spinner(&format!("Transcribing {}", args.url));
    let handle = host::generate_markdown_with_cancel(
        &transcriber,
        args.url.clone(),
        move |payload| {
            let _ = tx.send(payload);
        },
        args.max_depth,
        cancel,
    );

    let payload = rx.await.map_err(|_| anyhow!("transcription task ended without a result"))?;
    handle.await.context("transcription task failed")?;
    pb.finish_and_clear();

    let transcript: Transcript = serde_json::from_str(&payload)?;
    if transcript.repo_name.is_empty() {
        cli::print_error(&transcript.markdown);
        std::process::exit(2);
    }

    match &args.output {
        Some(path) => {
            tokio::fs::write(path, &transcript.markdown)
                .await
                .with_context(|| format!("writing {}", path.display()))?;
            info!("Wrote {} bytes to {}", transcript.markdown.len(), path.display());
            cli::print_info(&format!("✨ {} transcribed to {}", transcript.repo_name, path.display()));
        }
        None => println!("{}", transcript.markdown),
    }
    Ok(())
}
