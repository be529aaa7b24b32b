//! Frame sources.
//!
//! A raw input file holds exactly one frame. In base64 mode every non-empty
//! line is one frame, which matches what websocket capture tools export.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::{AppError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameSource {
    Stdin,
    File(PathBuf),
}

impl FrameSource {
    /// `-` and an empty input list both mean stdin.
    pub fn from_args(inputs: &[PathBuf]) -> Vec<Self> {
        if inputs.is_empty() {
            return vec![Self::Stdin];
        }
        inputs
            .iter()
            .map(|p| {
                if p == Path::new("-") {
                    Self::Stdin
                } else {
                    Self::File(p.clone())
                }
            })
            .collect()
    }

    fn label(&self) -> String {
        match self {
            Self::Stdin => "<stdin>".to_string(),
            Self::File(path) => path.display().to_string(),
        }
    }
}

/// Send every frame of `sources` to `frames`. Returns the number sent.
pub async fn feed_frames(
    sources: &[FrameSource],
    base64: bool,
    frames: mpsc::Sender<Bytes>,
    cancel: CancellationToken,
) -> Result<usize> {
    let mut sent = 0;
    for source in sources {
        if cancel.is_cancelled() {
            break;
        }
        let count = match source {
            FrameSource::Stdin => read_source(tokio::io::stdin(), base64, &frames, &cancel).await?,
            FrameSource::File(path) => {
                let file = tokio::fs::File::open(path).await?;
                read_source(file, base64, &frames, &cancel).await?
            }
        };
        debug!(source = %source.label(), frames = count, "input exhausted");
        sent += count;
    }
    Ok(sent)
}

async fn read_source<R>(
    reader: R,
    base64: bool,
    frames: &mpsc::Sender<Bytes>,
    cancel: &CancellationToken,
) -> Result<usize>
where
    R: AsyncRead + Unpin,
{
    if base64 {
        return read_base64_lines(BufReader::new(reader), frames, cancel).await;
    }

    let mut reader = reader;
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).await?;
    if buf.is_empty() {
        return Ok(0);
    }
    send(frames, Bytes::from(buf)).await?;
    Ok(1)
}

async fn read_base64_lines<R>(
    reader: R,
    frames: &mpsc::Sender<Bytes>,
    cancel: &CancellationToken,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut line_no = 0usize;
    let mut sent = 0;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        if cancel.is_cancelled() {
            break;
        }
        let Some(frame) = decode_line(&line, line_no) else {
            continue;
        };
        send(frames, frame).await?;
        sent += 1;
    }
    Ok(sent)
}

/// Decode one base64 line. Blank lines and `#` comments are skipped; bad
/// lines are logged and skipped.
pub fn decode_line(line: &str, line_no: usize) -> Option<Bytes> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    match STANDARD.decode(line) {
        Ok(raw) => Some(Bytes::from(raw)),
        Err(e) => {
            warn!(line = line_no, error = %e, "skipping line that is not valid base64");
            None
        }
    }
}

async fn send(frames: &mpsc::Sender<Bytes>, frame: Bytes) -> Result<()> {
    frames
        .send(frame)
        .await
        .map_err(|_| AppError::InvalidInput("decoder stopped before input was consumed".to_string()))
}
