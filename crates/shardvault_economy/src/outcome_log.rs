//! # Outcome Log
//!
//! **Durable append-only outcome ledger**
//!
//! Every draw attempt appends one record. `append()` returns only after the
//! record is flushed and synced, so a row the pipeline reports as written
//! survives a crash.
//!
//! ## Guarantees
//!
//! 1. **Durability**: once `append()` returns, the row is on disk
//! 2. **Integrity**: every record carries a CRC32; a torn tail is cut on open
//! 3. **Append-only**: rows are never rewritten
//!
//! ## Format
//!
//! ```text
//! [4 bytes: magic "SVOL"]
//! [4 bytes: version]
//!
//! Record format:
//! [8 bytes: sequence number]
//! [4 bytes: payload length]
//! [N bytes: payload (encoded outcome)]
//! [4 bytes: CRC32 of above]
//! ```

use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, UNIX_EPOCH};

use alloy_primitives::TxHash;
use parking_lot::Mutex;

use crate::error::{EconomyError, EconomyResult};
use crate::outcome::{DrawOutcome, OutcomeStatus, OutcomeStore};

/// Magic bytes identifying an outcome log file.
const LOG_MAGIC: &[u8; 4] = b"SVOL";

/// Current log format version.
const LOG_VERSION: u32 = 1;

/// Header length in bytes.
const HEADER_LEN: u64 = 8;

/// Record framing overhead: sequence + length + CRC.
const FRAME_OVERHEAD: u64 = 8 + 4 + 4;

fn header_bytes() -> [u8; 8] {
    let mut header = [0u8; 8];
    header[..4].copy_from_slice(LOG_MAGIC);
    header[4..].copy_from_slice(&LOG_VERSION.to_le_bytes());
    header
}

fn io_error(context: &str, e: &std::io::Error) -> EconomyError {
    EconomyError::StoreUnavailable(format!("outcome log {context}: {e}"))
}

// ============================================================================
// Payload encoding
// ============================================================================

fn put_str(buf: &mut Vec<u8>, value: &str) {
    let len = u32::try_from(value.len()).unwrap_or(u32::MAX);
    buf.extend_from_slice(&len.to_le_bytes());
    buf.extend_from_slice(&value.as_bytes()[..len as usize]);
}

fn put_opt_str(buf: &mut Vec<u8>, value: Option<&str>) {
    match value {
        Some(value) => {
            buf.push(1);
            put_str(buf, value);
        }
        None => buf.push(0),
    }
}

fn encode(outcome: &DrawOutcome) -> Vec<u8> {
    let mut buf = Vec::with_capacity(128);

    buf.push(outcome.status as u8);
    let millis = outcome
        .recorded_at
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
    buf.extend_from_slice(&millis.to_le_bytes());

    put_str(&mut buf, &outcome.wallet);
    put_opt_str(&mut buf, outcome.prize_slug.as_deref());
    put_opt_str(&mut buf, outcome.amount_or_id.as_deref());

    match outcome.tx_hash {
        Some(hash) => {
            buf.push(1);
            buf.extend_from_slice(hash.as_slice());
        }
        None => buf.push(0),
    }

    put_opt_str(&mut buf, outcome.error_message.as_deref());

    match outcome.xp_awarded {
        Some(xp) => {
            buf.push(1);
            buf.extend_from_slice(&xp.to_le_bytes());
        }
        None => buf.push(0),
    }

    buf
}

/// Cursor over an encoded payload.
struct Decoder<'a> {
    data: &'a [u8],
}

impl<'a> Decoder<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        if self.data.len() < n {
            return None;
        }
        let (head, rest) = self.data.split_at(n);
        self.data = rest;
        Some(head)
    }

    fn u8(&mut self) -> Option<u8> {
        self.take(1).map(|b| b[0])
    }

    fn u64(&mut self) -> Option<u64> {
        Some(u64::from_le_bytes(self.take(8)?.try_into().ok()?))
    }

    fn string(&mut self) -> Option<String> {
        let len = u32::from_le_bytes(self.take(4)?.try_into().ok()?) as usize;
        String::from_utf8(self.take(len)?.to_vec()).ok()
    }

    fn opt_string(&mut self) -> Option<Option<String>> {
        match self.u8()? {
            0 => Some(None),
            1 => Some(Some(self.string()?)),
            _ => None,
        }
    }
}

fn decode(payload: &[u8]) -> Option<DrawOutcome> {
    let mut d = Decoder { data: payload };

    let status = OutcomeStatus::from_u8(d.u8()?)?;
    let recorded_at = UNIX_EPOCH + Duration::from_millis(d.u64()?);
    let wallet = d.string()?;
    let prize_slug = d.opt_string()?;
    let amount_or_id = d.opt_string()?;
    let tx_hash = match d.u8()? {
        0 => None,
        1 => Some(TxHash::from_slice(d.take(32)?)),
        _ => return None,
    };
    let error_message = d.opt_string()?;
    let xp_awarded = match d.u8()? {
        0 => None,
        1 => Some(d.u64()?),
        _ => return None,
    };

    Some(DrawOutcome {
        wallet,
        prize_slug,
        amount_or_id,
        tx_hash,
        status,
        error_message,
        xp_awarded,
        recorded_at,
    })
}

// ============================================================================
// The log
// ============================================================================

/// Durable, append-only outcome ledger backed by a single file.
pub struct OutcomeLog {
    /// Path to the log file.
    path: PathBuf,
    /// Next record sequence number.
    next_seq: AtomicU64,
    /// File handle (protected by mutex for writes).
    file: Mutex<BufWriter<File>>,
}

impl OutcomeLog {
    /// Opens or creates an outcome log.
    ///
    /// An existing log is scanned; a torn or corrupt tail is cut off so new
    /// records stay readable.
    ///
    /// # Errors
    ///
    /// Returns `EconomyError::InvalidConfig` for a file that is not an outcome
    /// log, or `EconomyError::StoreUnavailable` on I/O failure.
    pub fn open(path: impl AsRef<Path>) -> EconomyResult<Self> {
        let path = path.as_ref().to_path_buf();

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&path)
            .map_err(|e| io_error("open", &e))?;

        let len = file.metadata().map_err(|e| io_error("metadata", &e))?.len();
        if len < HEADER_LEN {
            // Empty, or a crash cut the header short. Anything that is not a
            // prefix of our own header belongs to someone else.
            let header = header_bytes();
            let existing = std::fs::read(&path).map_err(|e| io_error("read header", &e))?;
            if !header.starts_with(&existing) {
                return Err(EconomyError::InvalidConfig(format!(
                    "{} is not an outcome log",
                    path.display()
                )));
            }
            if len > 0 {
                tracing::warn!(path = %path.display(), bytes = len, "outcome log: rewriting torn header");
                file.set_len(0).map_err(|e| io_error("truncate header", &e))?;
            }
            file.write_all(&header).map_err(|e| io_error("write header", &e))?;
            file.sync_all().map_err(|e| io_error("sync header", &e))?;
        }

        let scan = Self::scan(&path)?;
        if scan.valid_len < len.max(HEADER_LEN) {
            tracing::warn!(
                path = %path.display(),
                kept = scan.records.len(),
                cut_bytes = len - scan.valid_len,
                "outcome log: truncating torn tail"
            );
            file.set_len(scan.valid_len).map_err(|e| io_error("truncate", &e))?;
        }

        Ok(Self {
            path,
            next_seq: AtomicU64::new(scan.next_seq),
            file: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Path of the log file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of records written over the log's lifetime.
    #[must_use]
    pub fn record_count(&self) -> u64 {
        self.next_seq.load(Ordering::SeqCst)
    }

    /// Reads every intact record for operator review.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not an outcome log.
    pub fn read_all(path: impl AsRef<Path>) -> EconomyResult<Vec<DrawOutcome>> {
        Ok(Self::scan(path.as_ref())?.records)
    }

    fn scan(path: &Path) -> EconomyResult<Scan> {
        let file = File::open(path).map_err(|e| io_error("open for scan", &e))?;
        let mut reader = BufReader::new(file);

        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic).map_err(|e| io_error("read magic", &e))?;
        if &magic != LOG_MAGIC {
            return Err(EconomyError::InvalidConfig(format!(
                "{} is not an outcome log",
                path.display()
            )));
        }

        let mut version_bytes = [0u8; 4];
        reader.read_exact(&mut version_bytes).map_err(|e| io_error("read version", &e))?;
        let version = u32::from_le_bytes(version_bytes);
        if version != LOG_VERSION {
            return Err(EconomyError::InvalidConfig(format!(
                "unsupported outcome log version: {version}"
            )));
        }

        let mut scan = Scan {
            records: Vec::new(),
            next_seq: 0,
            valid_len: HEADER_LEN,
        };

        // Read until end of file or the first damaged record.
        while let Some((seq, payload)) = Self::read_record(&mut reader) {
            let Some(outcome) = decode(&payload) else {
                break;
            };
            scan.records.push(outcome);
            scan.next_seq = seq + 1;
            scan.valid_len += FRAME_OVERHEAD + payload.len() as u64;
        }

        Ok(scan)
    }

    fn read_record(reader: &mut BufReader<File>) -> Option<(u64, Vec<u8>)> {
        let mut seq_bytes = [0u8; 8];
        reader.read_exact(&mut seq_bytes).ok()?;

        let mut len_bytes = [0u8; 4];
        reader.read_exact(&mut len_bytes).ok()?;
        let payload_len = u32::from_le_bytes(len_bytes) as usize;

        let mut payload = vec![0u8; payload_len];
        reader.read_exact(&mut payload).ok()?;

        let mut crc_bytes = [0u8; 4];
        reader.read_exact(&mut crc_bytes).ok()?;

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&seq_bytes);
        hasher.update(&len_bytes);
        hasher.update(&payload);
        if hasher.finalize() != u32::from_le_bytes(crc_bytes) {
            return None;
        }

        Some((u64::from_le_bytes(seq_bytes), payload))
    }
}

/// Result of scanning an existing log.
struct Scan {
    records: Vec<DrawOutcome>,
    next_seq: u64,
    valid_len: u64,
}

impl OutcomeStore for OutcomeLog {
    fn append(&self, outcome: &DrawOutcome) -> EconomyResult<()> {
        let payload = encode(outcome);
        let len = u32::try_from(payload.len())
            .map_err(|_| EconomyError::StoreUnavailable("outcome record too large".to_string()))?;

        let mut file = self.file.lock();
        let seq = self.next_seq.load(Ordering::SeqCst);

        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&seq.to_le_bytes());
        hasher.update(&len.to_le_bytes());
        hasher.update(&payload);
        let crc = hasher.finalize();

        file.write_all(&seq.to_le_bytes()).map_err(|e| io_error("write", &e))?;
        file.write_all(&len.to_le_bytes()).map_err(|e| io_error("write", &e))?;
        file.write_all(&payload).map_err(|e| io_error("write", &e))?;
        file.write_all(&crc.to_le_bytes()).map_err(|e| io_error("write", &e))?;
        file.flush().map_err(|e| io_error("flush", &e))?;
        file.get_ref().sync_data().map_err(|e| io_error("sync", &e))?;

        self.next_seq.store(seq + 1, Ordering::SeqCst);
        Ok(())
    }
}
