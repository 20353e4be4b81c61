//! Bulk job orchestrator.

use std::path::Path;

use serde::Serialize;

use super::payload::StagedPayload;
use crate::batch::Operation;
use crate::config::BULK_PAYLOAD_MIME_TYPE;
use crate::error_handling::BulkJobError;
use crate::remote::{BulkJob, RemoteApi};

/// Stages of a bulk submission, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkStage {
    BuildPayload,
    StageUpload,
    Upload,
    StartJob,
    Cleanup,
}

impl BulkStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            BulkStage::BuildPayload => "BUILD_PAYLOAD",
            BulkStage::StageUpload => "STAGE_UPLOAD",
            BulkStage::Upload => "UPLOAD",
            BulkStage::StartJob => "START_JOB",
            BulkStage::Cleanup => "CLEANUP",
        }
    }
}

/// A started bulk job plus what was submitted to it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkSubmission {
    pub job: BulkJob,
    /// Mutation invocations in the payload
    pub operation_count: usize,
    /// Operations covered by those invocations
    pub item_count: usize,
}

/// Hands `operations` to the remote's asynchronous bulk engine.
///
/// Returns as soon as the job is accepted; polling its status is up to the
/// caller. The local payload file is gone when this returns, whether the job
/// started or any setup step failed.
pub async fn run_bulk_job(
    remote: &dyn RemoteApi,
    operations: Vec<Operation>,
    mutation_template: &str,
    staging_dir: &Path,
) -> Result<BulkSubmission, BulkJobError> {
    log::info!("[BULK] {}", BulkStage::BuildPayload.as_str());
    let payload = StagedPayload::write(staging_dir, operations)?;
    let operation_count = payload.lines();
    let item_count = payload.items();

    let started = submit(remote, &payload, mutation_template).await;

    log::debug!("[BULK] {}: {}", BulkStage::Cleanup.as_str(), payload.path().display());
    if let Err(e) = payload.remove() {
        log::warn!("Failed to remove staged payload: {}", e);
    }

    let job = started?;
    log::info!(
        "Bulk operation started: {} ({:?}) for {} items in {} lines",
        job.id,
        job.status,
        item_count,
        operation_count
    );
    Ok(BulkSubmission {
        job,
        operation_count,
        item_count,
    })
}

async fn submit(
    remote: &dyn RemoteApi,
    payload: &StagedPayload,
    mutation_template: &str,
) -> Result<BulkJob, BulkJobError> {
    log::info!("[BULK] {}", BulkStage::StageUpload.as_str());
    let target = remote
        .create_staged_upload(payload.filename(), BULK_PAYLOAD_MIME_TYPE)
        .await
        .map_err(|e| BulkJobError::Staging(e.to_string()))?;
    let path_key = target
        .path_key()
        .ok_or_else(|| BulkJobError::Staging("upload target has no key parameter".to_string()))?
        .to_string();

    log::info!("[BULK] {}: {}", BulkStage::Upload.as_str(), target.url);
    let contents = payload.read()?;
    remote
        .upload_file(&target, payload.filename(), BULK_PAYLOAD_MIME_TYPE, contents)
        .await
        .map_err(|e| BulkJobError::Upload(e.to_string()))?;

    log::info!("[BULK] {}", BulkStage::StartJob.as_str());
    remote
        .start_bulk_job(mutation_template, &path_key)
        .await
        .map_err(|e| BulkJobError::JobStart(e.to_string()))
}
