//! JSON Lines output.
//!
//! Every crawl writes a fresh file named after its start time, so repeated
//! runs never overwrite each other:
//!
//! ```text
//! output_dir/speeches_{YYYY-MM-DD_HHMMSS}.jsonl
//! ```
//!
//! Records are appended one per line as soon as they are extracted.

use crate::models::SpeechRecord;
use chrono::{DateTime, TimeZone};
use std::error::Error;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};

/// Path of the output file for a crawl started at `started`.
pub fn output_path<Tz>(output_dir: &str, started: &DateTime<Tz>) -> PathBuf
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    Path::new(output_dir).join(format!("speeches_{}.jsonl", started.format("%Y-%m-%d_%H%M%S")))
}

/// Appends [`SpeechRecord`]s to a JSON Lines file.
#[derive(Debug)]
pub struct JsonlWriter {
    path: PathBuf,
    file: BufWriter<File>,
    written: usize,
}

impl JsonlWriter {
    /// Create (or truncate) the file at `path`.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub async fn create(path: PathBuf) -> Result<Self, Box<dyn Error>> {
        let file = File::create(&path).await?;
        info!("Opened JSONL output");
        Ok(Self {
            path,
            file: BufWriter::new(file),
            written: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a single line.
    pub async fn write_record(&mut self, record: &SpeechRecord) -> Result<(), Box<dyn Error>> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        self.file.write_all(&line).await?;
        self.written += 1;
        debug!(url = %record.url, written = self.written, "Wrote record");
        Ok(())
    }

    /// Flush buffered output and return the number of records written.
    pub async fn finish(mut self) -> Result<usize, Box<dyn Error>> {
        self.file.flush().await?;
        info!(path = %self.path.display(), records = self.written, "Wrote JSONL output");
        Ok(self.written)
    }
}
