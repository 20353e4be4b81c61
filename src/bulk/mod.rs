//! Remote asynchronous bulk jobs.
//!
//! For workloads too large for live rounds, the operations are written to a
//! JSONL payload, uploaded to a remote-provided target and run by the remote
//! itself:
//! `BUILD_PAYLOAD → STAGE_UPLOAD → UPLOAD → START_JOB → CLEANUP`.
//! Polling the job is left to the caller.

mod orchestrator;
mod payload;

pub use orchestrator::{run_bulk_job, BulkStage, BulkSubmission};
pub use payload::StagedPayload;
