use anyhow::Context;
use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;
use tokio::sync::mpsc;

use doorscan_serial::{
    open_port, spawn_decoder, spawn_reader, MrzFramer, RawFrame, ReaderConfig, ScanEvent,
};

pub enum Source {
    Device(PathBuf),
    Stdin,
}

/// Explicit path, else the platform config file if present, else defaults.
/// Environment overrides apply in every case.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<ReaderConfig> {
    let config = match explicit {
        Some(path) => ReaderConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::info!("Using config {}", path.display());
                ReaderConfig::load(&path)?
            }
            None => ReaderConfig::default(),
        },
    };
    Ok(config.with_env_overrides())
}

fn default_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("com", "doorscan", "doorscan")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub async fn listen(config: &ReaderConfig, source: Source) -> anyhow::Result<()> {
    let (frame_tx, frame_rx) = mpsc::channel(config.channel_capacity);
    let (event_tx, mut event_rx) = mpsc::channel(config.channel_capacity);

    let reader = match source {
        Source::Device(path) => {
            let port_config = ReaderConfig { device: path, ..config.clone() };
            let port = open_port(&port_config)
                .with_context(|| format!("Failed to open scanner {}", port_config.device.display()))?;
            tracing::info!("Listening on {}", port_config.device.display());
            spawn_reader(port, config, frame_tx)
        }
        Source::Stdin => {
            tracing::info!("Listening on stdin");
            spawn_reader(tokio::io::stdin(), config, frame_tx)
        }
    };
    let decoder = spawn_decoder(frame_rx, config, event_tx);

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    let stopped_early = loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(event) => {
                    if !emit(&mut io::stdout().lock(), &event)? {
                        tracing::info!("Output closed, closing scanner");
                        break true;
                    }
                }
                None => break false,
            },
            _ = &mut shutdown => {
                tracing::info!("Interrupted, closing scanner");
                break true;
            }
        }
    };

    if stopped_early {
        reader.abort();
        return Ok(());
    }

    let frames = reader.await.context("Reader task failed")??;
    let events = decoder.await.context("Decoder task failed")?;
    tracing::info!(frames, events, "Scanner closed");
    Ok(())
}

pub async fn decode(file: Option<&Path>) -> anyhow::Result<()> {
    let bytes = match file {
        Some(path) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buf = Vec::new();
            tokio::io::stdin()
                .read_to_end(&mut buf)
                .await
                .context("Failed to read stdin")?;
            buf
        }
    };

    let events = decode_bytes(&bytes);
    if events.is_empty() {
        tracing::warn!("No MRZ text found in input");
    }
    let mut out = io::stdout().lock();
    for event in &events {
        if !emit(&mut out, event)? {
            break;
        }
    }
    Ok(())
}

/// Frame `bytes` exactly as the scanner stream would be framed, then decode
/// every frame.
pub fn decode_bytes(bytes: &[u8]) -> Vec<ScanEvent> {
    let mut framer = MrzFramer::new(bytes.len().max(1));
    let mut frames = framer.push(bytes);
    frames.extend(framer.flush());
    frames
        .into_iter()
        .map(|text| ScanEvent::from_frame(RawFrame::new(text)))
        .collect()
}

#[derive(Serialize)]
struct Status<'a> {
    #[serde(flatten)]
    config: &'a ReaderConfig,
    device_present: bool,
}

pub fn status(config: &ReaderConfig) -> anyhow::Result<()> {
    let status = Status { config, device_present: config.device.exists() };
    write_line(&mut io::stdout().lock(), &serde_json::to_string_pretty(&status)?)?;
    Ok(())
}

fn emit(out: &mut impl Write, event: &ScanEvent) -> anyhow::Result<bool> {
    write_line(out, &serde_json::to_string(event)?)
}

/// Write `line` and flush. Returns `false` when the consumer has closed the
/// pipe, which ends output without an error.
fn write_line(out: &mut impl Write, line: &str) -> anyhow::Result<bool> {
    match writeln!(out, "{line}").and_then(|()| out.flush()) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(e) => Err(e).context("Failed to write to stdout"),
    }
}
