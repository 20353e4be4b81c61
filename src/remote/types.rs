//! Remote call result types.

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::STAGED_UPLOAD_KEY_PARAM;
use crate::snapshot::Product;
use crate::throttle::ThrottleState;

/// An item-level rejection inside an otherwise accepted call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserError {
    /// Index of the aliased sub-mutation that reported it, if known
    pub alias: Option<usize>,
    #[serde(default)]
    pub field: Vec<String>,
    pub message: String,
}

/// Feedback from one executed batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecuteResponse {
    pub user_errors: Vec<UserError>,
    pub throttle: Option<ThrottleState>,
}

/// One name/value pair the upload target requires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StagedUploadParameter {
    pub name: String,
    pub value: String,
}

/// Remote-provided upload destination for a bulk payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StagedTarget {
    pub url: String,
    #[serde(default)]
    pub resource_url: Option<String>,
    /// Form parameters, in the order they must be sent
    pub parameters: Vec<StagedUploadParameter>,
}

impl StagedTarget {
    /// Path key the job-start call refers to the uploaded payload by.
    pub fn path_key(&self) -> Option<&str> {
        self.parameters
            .iter()
            .find(|p| p.name == STAGED_UPLOAD_KEY_PARAM)
            .map(|p| p.value.as_str())
    }
}

/// Lifecycle states of a remote bulk job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BulkJobStatus {
    Created,
    Running,
    Completed,
    Failed,
    Canceling,
    Canceled,
    Expired,
    #[serde(other)]
    Unknown,
}

impl BulkJobStatus {
    /// Whether the job will not change state anymore.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            BulkJobStatus::Completed
                | BulkJobStatus::Failed
                | BulkJobStatus::Canceled
                | BulkJobStatus::Expired
        )
    }
}

/// Handle on a remote asynchronous bulk job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkJob {
    pub id: String,
    pub status: BulkJobStatus,
    #[serde(default, deserialize_with = "count_from_string_or_number")]
    pub object_count: Option<u64>,
    /// Result file location once the job completed
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

/// One page of products from a paginated search.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

// Large counters come back as strings
fn count_from_string_or_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u64),
        Text(String),
    }

    match Option::<Count>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Count::Number(n)) => Ok(Some(n)),
        Some(Count::Text(s)) => s.parse().map(Some).map_err(serde::de::Error::custom),
    }
}
