use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use webcast_decoder::{DecoderService, EventKind, FrameDecoder, StatsSnapshot, schema};

use crate::cli::OutputFormat;
use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::input::{FrameSource, feed_frames};
use crate::output::OutputManager;

/// Options of the `decode` subcommand.
pub struct DecodeOptions {
    pub inputs: Vec<PathBuf>,
    pub base64: bool,
    pub output: OutputFormat,
    pub stats: bool,
    pub probe: bool,
    pub ignore: Vec<String>,
}

pub struct CommandExecutor {
    config: AppConfig,
    output: OutputManager,
}

impl CommandExecutor {
    pub fn new(config: AppConfig) -> Self {
        let output = OutputManager::new(config.colored);
        Self { config, output }
    }

    pub async fn decode(&self, options: DecodeOptions) -> Result<StatsSnapshot> {
        let mut decoder_config = self.config.decoder.clone();
        decoder_config.probe_unknown_methods |= options.probe;
        for name in &options.ignore {
            let kind = parse_kind(name)?;
            if !decoder_config.ignored_kinds.contains(&kind) {
                decoder_config.ignored_kinds.push(kind);
            }
        }
        if decoder_config.probe_unknown_methods {
            warn!("probe mode enabled, unknown methods may yield false positives");
        }

        let decoder = Arc::new(FrameDecoder::new(decoder_config));
        let service = DecoderService::new(Arc::clone(&decoder));
        let capacity = self.config.channel_capacity;
        let (frame_tx, frame_rx) = mpsc::channel(capacity);
        let (event_tx, mut event_rx) = mpsc::channel(capacity);
        let cancel = CancellationToken::new();

        let service_handle = tokio::spawn(service.run(frame_rx, event_tx, cancel.clone()));

        let interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("interrupted, shutting down");
                interrupt.cancel();
            }
        });

        let sources = FrameSource::from_args(&options.inputs);
        let feeder = {
            let cancel = cancel.clone();
            tokio::spawn(async move { feed_frames(&sources, options.base64, frame_tx, cancel).await })
        };

        let mut stdout = std::io::stdout();
        let mut printed = 0usize;
        while let Some(event) = event_rx.recv().await {
            let line = self.output.format_event(&event, options.output)?;
            writeln!(stdout, "{line}").map_err(AppError::from_write)?;
            printed += 1;
        }
        stdout.flush().map_err(AppError::from_write)?;

        if cancel.is_cancelled() {
            // stdin reads do not observe the token
            feeder.abort();
        }
        let frames = match feeder.await {
            Ok(Ok(frames)) => frames,
            Ok(Err(e)) if cancel.is_cancelled() => {
                debug!(error = %e, "input stopped by interrupt");
                0
            }
            Ok(Err(e)) => return Err(e),
            Err(e) if e.is_cancelled() => 0,
            Err(e) => return Err(AppError::InvalidInput(format!("input task failed: {e}"))),
        };
        match service_handle.await {
            Ok(result) => result?,
            Err(e) => return Err(AppError::InvalidInput(format!("decoder task failed: {e}"))),
        }
        debug!(frames, events = printed, "decode finished");

        let stats = decoder.stats();
        if options.stats {
            eprintln!("{}", self.output.format_stats(&stats, options.output)?);
        }
        Ok(stats)
    }

    pub fn list_schemas(&self, format: OutputFormat) -> Result<()> {
        let schemas = schema::all();
        print!("{}", self.output.format_schemas(&schemas, format)?);
        if format != OutputFormat::Pretty {
            println!();
        }
        Ok(())
    }
}

fn parse_kind(name: &str) -> Result<EventKind> {
    EventKind::ALL
        .into_iter()
        .find(|k| k.as_str().eq_ignore_ascii_case(name.trim()))
        .ok_or_else(|| {
            let known: Vec<_> = EventKind::ALL.iter().map(|k| k.as_str()).collect();
            AppError::InvalidInput(format!(
                "unknown event kind '{name}', expected one of: {}",
                known.join(", ")
            ))
        })
}
