//! JSONL payload staging.

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use rand::Rng;

use crate::batch::{partition, BatchLimits, Operation, OperationKind};
use crate::config::MAX_ITEMS_PER_CALL;
use crate::error_handling::BulkJobError;
use crate::remote::alias_variables;

/// A payload file on local disk, removed when dropped.
#[derive(Debug)]
pub struct StagedPayload {
    path: PathBuf,
    filename: String,
    lines: usize,
    items: usize,
}

impl StagedPayload {
    /// Serializes one JSONL line per mutation invocation into `dir`.
    ///
    /// Each line is one alias group of a partition with a single alias per
    /// batch, so it never carries more than the per-call item limit.
    pub fn write(dir: &Path, operations: Vec<Operation>) -> Result<Self, BulkJobError> {
        let kind = match operations.first() {
            Some(op) => op.kind(),
            None => return Err(BulkJobError::EmptyPayload),
        };
        if operations.iter().any(|op| op.kind() != kind) {
            return Err(BulkJobError::MixedKinds);
        }

        let items = operations.len();
        let batches = partition(operations, BatchLimits::new(MAX_ITEMS_PER_CALL, 1));

        fs::create_dir_all(dir)?;
        let filename = payload_filename(kind);
        let path = dir.join(&filename);
        // From here on the guard owns the file, so an error below removes it
        let mut payload = StagedPayload {
            path,
            filename,
            lines: 0,
            items,
        };

        let mut writer = BufWriter::new(fs::File::create(&payload.path)?);
        for batch in &batches {
            if payload.lines > 0 {
                writer.write_all(b"\n")?;
            }
            serde_json::to_writer(&mut writer, &alias_variables(batch.operations()))?;
            payload.lines += 1;
        }
        writer.flush()?;

        log::info!(
            "Generated {} with {} lines ({} {} items)",
            payload.filename,
            payload.lines,
            items,
            kind
        );
        Ok(payload)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Number of mutation invocations in the payload.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Number of operations serialized into the payload.
    pub fn items(&self) -> usize {
        self.items
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        fs::read(&self.path)
    }

    /// Deletes the file now. Dropping the guard does the same silently.
    pub fn remove(self) -> io::Result<()> {
        remove_if_present(&self.path)
    }
}

impl Drop for StagedPayload {
    fn drop(&mut self) {
        if let Err(e) = remove_if_present(&self.path) {
            log::warn!("Failed to remove staged payload {}: {}", self.path.display(), e);
        }
    }
}

fn remove_if_present(path: &Path) -> io::Result<()> {
    match fs::remove_file(path) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

fn payload_filename(kind: OperationKind) -> String {
    format!(
        "bulk_{}_{}_{:08x}.jsonl",
        kind.as_str().to_lowercase(),
        chrono::Utc::now().format("%Y%m%d%H%M%S%3f"),
        rand::rng().random::<u32>()
    )
}
