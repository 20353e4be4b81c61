//! reqwest-backed GraphQL client.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::documents::{
    alias_index, batch_document, BULK_OPERATION_RUN_MUTATION, CURRENT_BULK_OPERATION_QUERY,
    FIRST_LOCATION_QUERY, PROBE_QUERY, PRODUCTS_PAGE_QUERY, STAGED_UPLOADS_CREATE,
};
use super::types::{BulkJob, ExecuteResponse, ProductPage, StagedTarget, UserError};
use super::RemoteApi;
use crate::batch::Batch;
use crate::config::{
    Config, ACCESS_TOKEN_HEADER, BULK_UPLOAD_RESOURCE, HTTP_STATUS_TOO_MANY_REQUESTS,
    MAX_ERROR_MESSAGE_LENGTH, SNAPSHOT_PAGE_SIZE, SNAPSHOT_VARIANTS_PER_PRODUCT,
};
use crate::error_handling::{InitializationError, RemoteError};
use crate::snapshot::{Product, Variant};
use crate::throttle::ThrottleState;

#[derive(Debug, Deserialize)]
struct RawResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<RawError>,
    extensions: Option<RawExtensions>,
}

#[derive(Debug, Deserialize)]
struct RawExtensions {
    cost: Option<RawCost>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawCost {
    throttle_status: Option<ThrottleState>,
}

#[derive(Debug, Deserialize)]
struct RawError {
    message: String,
    #[serde(default)]
    path: Vec<Value>,
    extensions: Option<Value>,
}

impl RawError {
    fn is_throttle(&self) -> bool {
        let coded = self
            .extensions
            .as_ref()
            .and_then(|e| e.get("code"))
            .and_then(Value::as_str)
            .is_some_and(|code| code == "THROTTLED");
        coded || self.message.to_lowercase().contains("throttle")
    }
}

#[derive(Debug, Deserialize)]
struct RawUserError {
    #[serde(default)]
    field: Option<Vec<String>>,
    message: String,
}

/// Parsed GraphQL response: data plus the throttle snapshot, if reported.
#[derive(Debug)]
struct Reply {
    data: Option<Value>,
    errors: Vec<RawError>,
    throttle: Option<ThrottleState>,
}

impl Reply {
    /// Returns `data`, or the top-level errors if there is none.
    fn into_data(self) -> Result<Value, RemoteError> {
        match self.data {
            Some(data) if !data.is_null() => Ok(data),
            _ => Err(RemoteError::GraphQl {
                messages: self.errors.into_iter().map(|e| e.message).collect(),
                throttle: self.throttle,
            }),
        }
    }
}

/// GraphQL admin API client.
///
/// Every call goes through [`GraphQlClient::graphql`], which interprets
/// throttle rejections and extracts the `extensions.cost.throttleStatus` block.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: Arc<reqwest::Client>,
    endpoint: Url,
    access_token: String,
}

impl GraphQlClient {
    pub fn new(http: Arc<reqwest::Client>, endpoint: Url, access_token: impl Into<String>) -> Self {
        Self {
            http,
            endpoint,
            access_token: access_token.into(),
        }
    }

    /// Builds a client for the endpoint described by `config`.
    pub fn from_config(config: &Config) -> Result<Self, InitializationError> {
        let http = crate::initialization::init_client(config)?;
        let endpoint = Url::parse(&config.graphql_url())?;
        Ok(Self::new(http, endpoint, config.access_token.clone()))
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn graphql(&self, query: &str, variables: Option<Value>) -> Result<Reply, RemoteError> {
        let mut payload = json!({ "query": query });
        if let Some(variables) = variables {
            payload["variables"] = variables;
        }

        let response = self
            .http
            .post(self.endpoint.clone())
            .header(ACCESS_TOKEN_HEADER, &self.access_token)
            .json(&payload)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        let parsed = serde_json::from_str::<RawResponse>(&body);

        if !status.is_success() {
            let raw = parsed.ok();
            let throttle = raw.as_ref().and_then(throttle_of);
            let throttled = status.as_u16() == HTTP_STATUS_TOO_MANY_REQUESTS
                || raw
                    .as_ref()
                    .is_some_and(|r| r.errors.iter().any(RawError::is_throttle));
            if throttled {
                return Err(RemoteError::Throttled { throttle });
            }
            return Err(RemoteError::Http {
                status: status.as_u16(),
                body: truncate(body),
                throttle,
            });
        }

        let raw = parsed.map_err(|e| RemoteError::Decode(e.to_string()))?;
        let throttle = throttle_of(&raw);
        if let Some(t) = throttle {
            log::debug!(
                "[THROTTLE] GRAPHQL max: {}, current: {}, restoreRate: {}",
                t.maximum_available,
                t.currently_available,
                t.restore_rate
            );
        }
        if raw.errors.iter().any(RawError::is_throttle) {
            return Err(RemoteError::Throttled { throttle });
        }

        Ok(Reply {
            data: raw.data,
            errors: raw.errors,
            throttle,
        })
    }
}

#[async_trait]
impl RemoteApi for GraphQlClient {
    async fn execute(&self, batch: &Batch) -> Result<ExecuteResponse, RemoteError> {
        let (document, variables) = batch_document(batch);
        let reply = self.graphql(&document, Some(variables)).await?;

        let Some(data) = reply.data.as_ref().filter(|d| !d.is_null()) else {
            return Err(RemoteError::GraphQl {
                messages: reply.errors.into_iter().map(|e| e.message).collect(),
                throttle: reply.throttle,
            });
        };

        let mut user_errors = Vec::new();
        // Errors next to data belong to the alias named first in their path
        for error in &reply.errors {
            let alias = error
                .path
                .first()
                .and_then(Value::as_str)
                .and_then(alias_index);
            user_errors.push(UserError {
                alias,
                field: Vec::new(),
                message: error.message.clone(),
            });
        }
        if let Some(fields) = data.as_object() {
            for (key, result) in fields {
                let Some(errors) = result.get("userErrors") else {
                    continue;
                };
                let errors: Vec<RawUserError> = serde_json::from_value(errors.clone())
                    .map_err(|e| RemoteError::Decode(e.to_string()))?;
                let alias = alias_index(key);
                user_errors.extend(errors.into_iter().map(|e| UserError {
                    alias,
                    field: e.field.unwrap_or_default(),
                    message: e.message,
                }));
            }
        }

        Ok(ExecuteResponse {
            user_errors,
            throttle: reply.throttle,
        })
    }

    async fn probe_throttle(&self) -> Result<Option<ThrottleState>, RemoteError> {
        Ok(self.graphql(PROBE_QUERY, None).await?.throttle)
    }

    async fn create_staged_upload(
        &self,
        filename: &str,
        mime_type: &str,
    ) -> Result<StagedTarget, RemoteError> {
        let variables = json!({
            "input": [{
                "resource": BULK_UPLOAD_RESOURCE,
                "filename": filename,
                "mimeType": mime_type,
                "httpMethod": "POST",
            }]
        });
        let reply = self.graphql(STAGED_UPLOADS_CREATE, Some(variables)).await?;
        let throttle = reply.throttle;
        let data = reply.into_data()?;
        let result = &data["stagedUploadsCreate"];
        reject_user_errors(result, throttle)?;

        let target = result["stagedTargets"]
            .get(0)
            .cloned()
            .ok_or_else(|| RemoteError::Decode("no staged upload target returned".into()))?;
        serde_json::from_value(target).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn upload_file(
        &self,
        target: &StagedTarget,
        filename: &str,
        mime_type: &str,
        contents: Vec<u8>,
    ) -> Result<(), RemoteError> {
        // Parameters first, in the order given, then the file
        let mut form = Form::new();
        for param in &target.parameters {
            form = form.text(param.name.clone(), param.value.clone());
        }
        let part = Part::bytes(contents)
            .file_name(filename.to_string())
            .mime_str(mime_type)?;
        form = form.part("file", part);

        let response = self.http.post(&target.url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RemoteError::Http {
                status: status.as_u16(),
                body: truncate(body),
                throttle: None,
            });
        }
        Ok(())
    }

    async fn start_bulk_job(
        &self,
        mutation: &str,
        staged_upload_path: &str,
    ) -> Result<BulkJob, RemoteError> {
        let variables = json!({
            "mutation": mutation,
            "stagedUploadPath": staged_upload_path,
        });
        let reply = self
            .graphql(BULK_OPERATION_RUN_MUTATION, Some(variables))
            .await?;
        let throttle = reply.throttle;
        let data = reply.into_data()?;
        let result = &data["bulkOperationRunMutation"];
        reject_user_errors(result, throttle)?;

        let job = result
            .get("bulkOperation")
            .filter(|job| !job.is_null())
            .cloned()
            .ok_or_else(|| RemoteError::Decode("no bulk operation returned".into()))?;
        serde_json::from_value(job).map_err(|e| RemoteError::Decode(e.to_string()))
    }

    async fn bulk_job_status(&self) -> Result<Option<BulkJob>, RemoteError> {
        let data = self
            .graphql(CURRENT_BULK_OPERATION_QUERY, None)
            .await?
            .into_data()?;
        match data.get("currentBulkOperation") {
            None | Some(Value::Null) => Ok(None),
            Some(job) => serde_json::from_value(job.clone())
                .map(Some)
                .map_err(|e| RemoteError::Decode(e.to_string())),
        }
    }

    async fn fetch_products_page(
        &self,
        query: &str,
        after: Option<&str>,
    ) -> Result<ProductPage, RemoteError> {
        let variables = json!({
            "first": SNAPSHOT_PAGE_SIZE,
            "query": query,
            "after": after,
            "variantsFirst": SNAPSHOT_VARIANTS_PER_PRODUCT,
        });
        let data = self
            .graphql(PRODUCTS_PAGE_QUERY, Some(variables))
            .await?
            .into_data()?;
        let connection: ProductConnection = serde_json::from_value(data["products"].clone())
            .map_err(|e| RemoteError::Decode(e.to_string()))?;
        Ok(connection.into())
    }

    async fn first_location_id(&self) -> Result<String, RemoteError> {
        let data = self.graphql(FIRST_LOCATION_QUERY, None).await?.into_data()?;
        let node = &data["locations"]["edges"][0]["node"];
        let id = node["id"]
            .as_str()
            .ok_or_else(|| RemoteError::Decode("No locations found".into()))?;
        log::info!(
            "Using location: {} ({})",
            node["name"].as_str().unwrap_or("unnamed"),
            id
        );
        Ok(id.to_string())
    }
}

fn throttle_of(raw: &RawResponse) -> Option<ThrottleState> {
    raw.extensions
        .as_ref()
        .and_then(|e| e.cost.as_ref())
        .and_then(|c| c.throttle_status)
}

fn reject_user_errors(result: &Value, throttle: Option<ThrottleState>) -> Result<(), RemoteError> {
    let messages: Vec<String> = result["userErrors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["message"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    if messages.is_empty() {
        Ok(())
    } else {
        Err(RemoteError::GraphQl { messages, throttle })
    }
}

fn truncate(mut body: String) -> String {
    if body.len() > MAX_ERROR_MESSAGE_LENGTH {
        let mut end = MAX_ERROR_MESSAGE_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
        body.push_str("...");
    }
    body
}

// Connection shapes of the products query
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProductConnection {
    page_info: PageInfo,
    edges: Vec<Edge<ProductNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageInfo {
    has_next_page: bool,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
struct Edge<T> {
    #[serde(default)]
    cursor: Option<String>,
    node: T,
}

#[derive(Deserialize)]
struct ProductNode {
    id: String,
    title: String,
    variants: VariantConnection,
}

#[derive(Deserialize)]
struct VariantConnection {
    edges: Vec<Edge<VariantNode>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct VariantNode {
    id: String,
    inventory_item: IdNode,
}

#[derive(Deserialize)]
struct IdNode {
    id: String,
}

impl From<ProductConnection> for ProductPage {
    fn from(connection: ProductConnection) -> Self {
        let last_cursor = connection.edges.last().and_then(|e| e.cursor.clone());
        let products = connection
            .edges
            .into_iter()
            .map(|edge| Product {
                id: edge.node.id,
                title: edge.node.title,
                variants: edge
                    .node
                    .variants
                    .edges
                    .into_iter()
                    .map(|v| Variant {
                        id: v.node.id,
                        inventory_item_id: v.node.inventory_item.id,
                    })
                    .collect(),
            })
            .collect();
        ProductPage {
            products,
            has_next_page: connection.page_info.has_next_page,
            end_cursor: connection.page_info.end_cursor.or(last_cursor),
        }
    }
}
