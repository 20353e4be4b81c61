//! Remote API collaborator.
//!
//! The engine never talks HTTP directly. It drives a [`RemoteApi`], which the
//! production [`GraphQlClient`] implements over reqwest and tests implement
//! with scripted fakes.

mod client;
mod documents;
mod types;

use async_trait::async_trait;

use crate::batch::Batch;
use crate::error_handling::RemoteError;
use crate::throttle::ThrottleState;

pub use client::GraphQlClient;
pub use documents::{alias_variables, bulk_mutation_template};
pub use types::{
    BulkJob, BulkJobStatus, ExecuteResponse, ProductPage, StagedTarget, StagedUploadParameter,
    UserError,
};

/// Everything the engine, the bulk orchestrator and the snapshot refresh need
/// from the remote system.
#[async_trait]
pub trait RemoteApi: Send + Sync {
    /// Executes one batch as a single network call.
    ///
    /// An accepted call returns `Ok` even when specific items were rejected;
    /// those rejections are in `user_errors`.
    async fn execute(&self, batch: &Batch) -> Result<ExecuteResponse, RemoteError>;

    /// Issues a minimal-cost call and returns the throttle snapshot it carried.
    async fn probe_throttle(&self) -> Result<Option<ThrottleState>, RemoteError>;

    /// Requests an upload target for a bulk payload.
    async fn create_staged_upload(
        &self,
        filename: &str,
        mime_type: &str,
    ) -> Result<StagedTarget, RemoteError>;

    /// Transfers a payload to the target using exactly its parameters.
    async fn upload_file(
        &self,
        target: &StagedTarget,
        filename: &str,
        mime_type: &str,
        contents: Vec<u8>,
    ) -> Result<(), RemoteError>;

    /// Starts an asynchronous bulk job over an uploaded payload.
    async fn start_bulk_job(
        &self,
        mutation: &str,
        staged_upload_path: &str,
    ) -> Result<BulkJob, RemoteError>;

    /// Status of the current bulk job, if any.
    async fn bulk_job_status(&self) -> Result<Option<BulkJob>, RemoteError>;

    /// One page of products matching `query`, after the `after` cursor.
    async fn fetch_products_page(
        &self,
        query: &str,
        after: Option<&str>,
    ) -> Result<ProductPage, RemoteError>;

    /// Id of the first inventory location.
    async fn first_location_id(&self) -> Result<String, RemoteError>;
}
