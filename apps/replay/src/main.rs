use std::{
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use {
    anyhow::{Context, Result},
    clap::Parser,
    hostbridge_api::ApiSurface,
    hostbridge_config::{HostbridgeConfig, LoggingConfig},
    hostbridge_runtime::{BridgeContext, Diagnostics, MemoryDiagnostics, RecordingHost},
    tracing::info,
    tracing_subscriber::EnvFilter,
};

mod transcript;

/// Replay a host bridge transcript.
///
/// Each line of the transcript is one step: a call from script code, a
/// response or event from the host, or a listener subscription. Native
/// calls are recorded instead of executed; responses must be scripted.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// Transcript file, or `-` for stdin.
    transcript: PathBuf,

    /// Configuration file (TOML).
    #[arg(long, env = "HOSTBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Emit JSON log lines regardless of the configured format.
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config: HostbridgeConfig = hostbridge_config::load_or_default(args.config.as_deref())
        .context("failed to load configuration")?;
    init_tracing(&config.logging, args.json);

    let raw = read_transcript(&args.transcript)?;
    let steps = transcript::parse(&raw)?;
    info!(steps = steps.len(), path = %args.transcript.display(), "transcript loaded");

    let diagnostics = Arc::new(MemoryDiagnostics::new());
    let context = BridgeContext::builder()
        .options(config.runtime_options())
        .diagnostics(Arc::clone(&diagnostics) as Arc<dyn Diagnostics>)
        .build();
    let host = RecordingHost::new();
    let api = ApiSurface::new(Arc::new(context), Arc::new(host.clone()));

    let mut replayer = transcript::Replayer::new(api.clone(), host);
    replayer.run(steps);

    let summary = replayer.summary();
    info!(
        calls = summary.calls,
        rejected = summary.rejected,
        responses = summary.responses,
        events = summary.events,
        diagnostics = diagnostics.entries().len(),
        pending = api.context().pending_count(),
        "replay finished"
    );
    Ok(())
}

fn init_tracing(logging: &LoggingConfig, force_json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.json || force_json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn read_transcript(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut raw = String::new();
        std::io::stdin()
            .read_to_string(&mut raw)
            .context("failed to read transcript from stdin")?;
        return Ok(raw);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("failed to read transcript {}", path.display()))
}
