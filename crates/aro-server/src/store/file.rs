//! Durable backend: an append-only JSON-lines log.
//!
//! Every append is written, flushed and `fsync`ed before the record becomes
//! visible to readers. On open the whole log is replayed into memory. A torn
//! final line (crash mid-write) is truncated away; corruption anywhere else
//! refuses to open.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::{Mutex, RwLock};

use aro_core::clock::Clock;
use aro_core::error::{AroError, Result};
use aro_core::ledger::MetricLedger;
use aro_core::{Metric, NewMetric, Page, PageRequest};

use super::MetricRepository;

fn unavailable(path: &Path, e: std::io::Error) -> AroError {
    AroError::StoreUnavailable(format!("{}: {e}", path.display()))
}

struct LogWriter {
    file: File,
    /// Length of the log up to the last committed record.
    len: u64,
    /// Set when a rollback could not truncate; the tail is unknown so no
    /// further record may be appended behind it.
    failed: bool,
}

impl LogWriter {
    async fn write_record(&mut self, line: &[u8]) -> std::io::Result<()> {
        self.file.write_all(line).await?;
        self.file.flush().await?;
        self.file.sync_data().await?;
        self.len += line.len() as u64;
        Ok(())
    }

    /// Drop any bytes written past the last committed record.
    async fn rollback(&mut self) {
        if let Err(e) = self.file.set_len(self.len).await {
            tracing::error!(error = %e, len = self.len, "metric log rollback failed, disabling writes");
            self.failed = true;
        }
    }
}

struct Replay {
    records: Vec<Metric>,
    /// Byte length of the valid prefix.
    valid_len: u64,
    /// Last record is complete but lacks its trailing newline.
    needs_newline: bool,
}

fn replay(raw: &str, path: &Path) -> Result<Replay> {
    let mut records = Vec::new();
    let mut valid_len = 0usize;
    let mut needs_newline = false;

    for line in raw.split_inclusive('\n') {
        let complete = line.ends_with('\n');
        let body = line.trim_end();
        if body.is_empty() {
            valid_len += line.len();
            continue;
        }
        match serde_json::from_str::<Metric>(body) {
            Ok(m) => {
                records.push(m);
                valid_len += line.len();
                needs_newline = !complete;
            }
            Err(e) if !complete => {
                tracing::warn!(path = %path.display(), offset = valid_len, error = %e, "dropping torn tail of metric log");
                break;
            }
            Err(e) => {
                return Err(AroError::Internal(format!(
                    "corrupt metric log {} at byte {valid_len}: {e}",
                    path.display()
                )));
            }
        }
    }

    Ok(Replay {
        records,
        valid_len: valid_len as u64,
        needs_newline,
    })
}

pub struct FileMetricRepository {
    path: PathBuf,
    ledger: RwLock<MetricLedger>,
    writer: Mutex<LogWriter>,
}

impl FileMetricRepository {
    /// Open (or create) the log at `path` and replay it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| unavailable(&path, e))?;
            }
        }

        let raw = match fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) if e.kind() == ErrorKind::NotFound => String::new(),
            Err(e) => return Err(unavailable(&path, e)),
        };
        let replayed = replay(&raw, &path)?;
        let ledger = MetricLedger::from_records(replayed.records)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| unavailable(&path, e))?;
        let mut writer = LogWriter {
            file,
            len: replayed.valid_len,
            failed: false,
        };
        if replayed.valid_len < raw.len() as u64 {
            writer
                .file
                .set_len(replayed.valid_len)
                .await
                .map_err(|e| unavailable(&path, e))?;
        }
        if replayed.needs_newline {
            writer
                .write_record(b"\n")
                .await
                .map_err(|e| unavailable(&path, e))?;
        }

        tracing::info!(path = %path.display(), records = ledger.len(), next_id = ledger.next_id(), "metric log opened");

        Ok(Self {
            path,
            ledger: RwLock::new(ledger),
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MetricRepository for FileMetricRepository {
    fn backend(&self) -> &'static str {
        "file"
    }

    async fn append(&self, draft: NewMetric, clock: &dyn Clock) -> Result<Metric> {
        // The writer lock serializes appends; readers only wait on the commit.
        let mut writer = self.writer.lock().await;
        if writer.failed {
            return Err(AroError::StoreUnavailable(format!(
                "{}: log writer disabled after failed rollback; reopen the store",
                self.path.display()
            )));
        }
        let metric = self.ledger.read().await.stamp(draft, clock.now());

        let mut line = serde_json::to_vec(&metric)
            .map_err(|e| AroError::Internal(format!("encode metric failed: {e}")))?;
        line.push(b'\n');

        if let Err(e) = writer.write_record(&line).await {
            writer.rollback().await;
            return Err(unavailable(&self.path, e));
        }

        self.ledger.write().await.commit(metric.clone())?;
        Ok(metric)
    }

    async fn find_page(&self, req: &PageRequest) -> Result<Page<Metric>> {
        Ok(self.ledger.read().await.page(req))
    }
}
