//! JSONL trace reading and replay pacing.

use std::path::Path;
use std::time::Duration;

use contracts::{ContractError, Timestamp};
use serde::Deserialize;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader, Lines};

use crate::error::{CliError, Result};

/// One input message of a trace.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceRecord {
    pub stream: String,
    pub time: Timestamp,
    #[serde(default)]
    pub sub_id: usize,
    pub value: Vec<f64>,
}

/// Decode one trace line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<TraceRecord>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(line)
        .map(Some)
        .map_err(|e| ContractError::trace_parse(line_no, e.to_string()).into())
}

/// Line-numbered async reader over a trace file.
pub struct TraceSource {
    lines: Lines<BufReader<File>>,
    line_no: usize,
}

impl TraceSource {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CliError::trace_not_found(path.display().to_string()),
            _ => CliError::Io(e),
        })?;
        Ok(Self {
            lines: BufReader::new(file).lines(),
            line_no: 0,
        })
    }

    /// Next record, skipping blank and comment lines. `None` at end of file.
    pub async fn next_record(&mut self) -> Result<Option<TraceRecord>> {
        while let Some(line) = self.lines.next_line().await? {
            self.line_no += 1;
            if let Some(record) = parse_line(self.line_no, &line)? {
                return Ok(Some(record));
            }
        }
        Ok(None)
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }
}

/// Wall-clock delay between two consecutive records.
///
/// `None` when pacing is disabled (`speed <= 0`) or time does not advance.
pub fn pacing_delay(
    previous: Timestamp,
    next: Timestamp,
    tick_us: u64,
    speed: f64,
) -> Option<Duration> {
    if speed <= 0.0 || next <= previous {
        return None;
    }
    let micros = next.saturating_sub(previous) as f64 * tick_us as f64 / speed;
    (micros >= 1.0).then(|| Duration::from_micros(micros as u64))
}
