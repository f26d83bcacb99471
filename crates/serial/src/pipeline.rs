use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use doorscan_core::{DecodeResult, DecodedDocument, MrzDecoder};

use crate::config::ReaderConfig;
use crate::framer::MrzFramer;
use crate::hash;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
    #[error("Invalid line setting: {0}")]
    LineSetting(String),
}

/// One framed scan as it came off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// SHA-256 hex digest of `text`.
    pub id: String,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl RawFrame {
    pub fn new(text: String) -> Self {
        Self::at(text, Utc::now())
    }

    pub fn at(text: String, received_at: DateTime<Utc>) -> Self {
        Self { id: hash::frame_id(&text), text, received_at }
    }
}

/// The decode result for one frame, ready for whoever correlates, stores or
/// broadcasts it.
#[derive(Debug, Clone)]
pub struct ScanEvent {
    pub frame_id: String,
    pub received_at: DateTime<Utc>,
    pub result: DecodeResult,
}

impl ScanEvent {
    pub fn from_frame(frame: RawFrame) -> Self {
        let result = MrzDecoder::decode(&frame.text);
        Self { frame_id: frame.id, received_at: frame.received_at, result }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanEventView<'a> {
    frame_id: &'a str,
    received_at: DateTime<Utc>,
    #[serde(flatten)]
    outcome: Outcome<'a>,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum Outcome<'a> {
    Decoded {
        document: &'a DecodedDocument,
    },
    Failed {
        reason: String,
        #[serde(rename = "rawData")]
        raw_data: &'a str,
    },
}

impl Serialize for ScanEvent {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let outcome = match &self.result {
            Ok(document) => Outcome::Decoded { document },
            Err(failure) => Outcome::Failed {
                reason: failure.reason.to_string(),
                raw_data: &failure.raw_data,
            },
        };
        ScanEventView { frame_id: &self.frame_id, received_at: self.received_at, outcome }
            .serialize(serializer)
    }
}

// ── Reader task ───────────────────────────────────────────────────────────────

/// Spawn a task that frames bytes from `reader` and sends each frame to `tx`.
///
/// Ends at EOF (after flushing a pending frame) or once the receiver is
/// dropped. Resolves to the number of frames sent.
pub fn spawn_reader<R>(
    mut reader: R,
    config: &ReaderConfig,
    tx: mpsc::Sender<RawFrame>,
) -> JoinHandle<Result<u64, PipelineError>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let idle = config.idle_flush();
    let mut framer = MrzFramer::new(config.max_frame_bytes);

    tokio::spawn(async move {
        let mut buf = [0u8; 256];
        let mut sent = 0u64;

        loop {
            let read = tokio::time::timeout(idle, reader.read(&mut buf)).await;
            let frames: Vec<String> = match read {
                // Idle gap on the line.
                Err(_) => framer.flush().into_iter().collect(),
                Ok(Ok(0)) => {
                    if let Some(text) = framer.flush() {
                        if tx.send(RawFrame::new(text)).await.is_ok() {
                            sent += 1;
                        }
                    }
                    tracing::info!(frames = sent, "scanner stream closed");
                    return Ok(sent);
                }
                Ok(Ok(n)) => framer.push(&buf[..n]),
                Ok(Err(e)) => {
                    tracing::error!("scanner read failed: {e}");
                    return Err(e.into());
                }
            };

            for text in frames {
                let frame = RawFrame::new(text);
                tracing::debug!(frame_id = %frame.id, "frame received");
                if tx.send(frame).await.is_err() {
                    tracing::debug!("frame receiver dropped, stopping reader");
                    return Ok(sent);
                }
                sent += 1;
            }
        }
    })
}

// ── Decoder task ──────────────────────────────────────────────────────────────

/// Remembers the last frame so a re-transmitted scan is reported once.
struct RepeatFilter {
    window_ms: u64,
    last: Option<(String, DateTime<Utc>)>,
}

impl RepeatFilter {
    fn new(window_ms: u64) -> Self {
        Self { window_ms, last: None }
    }

    fn is_repeat(&mut self, frame: &RawFrame) -> bool {
        let repeat = self.window_ms > 0
            && self.last.as_ref().is_some_and(|(id, at)| {
                let gap = (frame.received_at - *at).num_milliseconds();
                *id == frame.id && (0..self.window_ms as i64).contains(&gap)
            });
        if !repeat {
            self.last = Some((frame.id.clone(), frame.received_at));
        }
        repeat
    }
}

/// Spawn a task that decodes every frame from `rx` into a [`ScanEvent`] on `tx`.
///
/// Resolves to the number of events sent once `rx` is closed or the event
/// receiver is dropped.
pub fn spawn_decoder(
    mut rx: mpsc::Receiver<RawFrame>,
    config: &ReaderConfig,
    tx: mpsc::Sender<ScanEvent>,
) -> JoinHandle<u64> {
    let mut repeats = RepeatFilter::new(config.dedup_window_ms);

    tokio::spawn(async move {
        let mut sent = 0u64;
        while let Some(frame) = rx.recv().await {
            if repeats.is_repeat(&frame) {
                tracing::debug!(frame_id = %frame.id, "duplicate frame suppressed");
                continue;
            }

            let event = ScanEvent::from_frame(frame);
            match &event.result {
                Ok(doc) => tracing::info!(
                    format = %doc.format,
                    document_number = %doc.document_number,
                    "MRZ decoded"
                ),
                Err(failure) => tracing::warn!(frame_id = %event.frame_id, "scan rejected: {failure}"),
            }

            if tx.send(event).await.is_err() {
                break;
            }
            sent += 1;
        }
        sent
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
