// Shared test helpers: a scripted in-memory remote and a scheduler that
// records waits instead of sleeping.

#![allow(dead_code)] // Each test file uses a different subset

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use bulk_mutator::batch::{Batch, Operation, OperationKind};
use bulk_mutator::bulk::BulkStage;
use bulk_mutator::engine::{Cancelled, Engine, Scheduler};
use bulk_mutator::remote::{
    BulkJob, BulkJobStatus, ExecuteResponse, ProductPage, RemoteApi, StagedTarget,
    StagedUploadParameter,
};
use bulk_mutator::snapshot::{Product, Variant};
use bulk_mutator::throttle::ThrottleState;
use bulk_mutator::{EngineConfig, RemoteError};

type Responder = Box<dyn Fn(&Batch) -> Result<ExecuteResponse, RemoteError> + Send + Sync>;

/// One executed call as seen by the remote.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedCall {
    pub index: usize,
    pub attempt: u32,
    pub items: usize,
}

/// In-memory remote whose answers are scripted per test.
pub struct ScriptedRemote {
    responder: Responder,
    probe: Mutex<Option<ThrottleState>>,
    fail_at: Option<BulkStage>,
    products: Vec<Product>,
    page_size: usize,
    current_job: Mutex<Option<BulkJob>>,
    pub executed: Mutex<Vec<ExecutedCall>>,
    pub executed_kinds: Mutex<Vec<OperationKind>>,
    pub probes: AtomicUsize,
    pub pages: AtomicUsize,
    pub uploads: Mutex<Vec<Vec<u8>>>,
    pub started_templates: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl ScriptedRemote {
    /// Every call answers `responder(batch)`; probes report `probe`.
    pub fn new(
        probe: Option<ThrottleState>,
        responder: impl Fn(&Batch) -> Result<ExecuteResponse, RemoteError> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            probe: Mutex::new(probe),
            fail_at: None,
            products: Vec::new(),
            page_size: 2,
            current_job: Mutex::new(None),
            executed: Mutex::new(Vec::new()),
            executed_kinds: Mutex::new(Vec::new()),
            probes: AtomicUsize::new(0),
            pages: AtomicUsize::new(0),
            uploads: Mutex::new(Vec::new()),
            started_templates: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Accepts everything and always reports `state`.
    pub fn steady(state: ThrottleState) -> Self {
        Self::new(Some(state), move |_| {
            Ok(ExecuteResponse {
                user_errors: Vec::new(),
                throttle: Some(state),
            })
        })
    }

    /// Answers calls from `script` in order, then falls back to success.
    pub fn scripted(
        probe: ThrottleState,
        script: Vec<Result<ExecuteResponse, RemoteError>>,
    ) -> Self {
        let script = Mutex::new(VecDeque::from(script));
        Self::new(Some(probe), move |_| {
            script.lock().unwrap().pop_front().unwrap_or_else(|| {
                Ok(ExecuteResponse {
                    user_errors: Vec::new(),
                    throttle: Some(probe),
                })
            })
        })
    }

    pub fn failing_at(mut self, stage: BulkStage) -> Self {
        self.fail_at = Some(stage);
        self
    }

    pub fn with_products(mut self, products: Vec<Product>) -> Self {
        self.products = products;
        self
    }

    pub fn calls(&self) -> Vec<ExecutedCall> {
        self.executed.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<OperationKind> {
        self.executed_kinds.lock().unwrap().clone()
    }

    fn fails_at(&self, stage: BulkStage) -> bool {
        self.fail_at == Some(stage)
    }
}

#[async_trait]
impl RemoteApi for ScriptedRemote {
    async fn execute(&self, batch: &Batch) -> Result<ExecuteResponse, RemoteError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        // Let the rest of the round start before answering
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.executed.lock().unwrap().push(ExecutedCall {
            index: batch.index(),
            attempt: batch.attempt(),
            items: batch.len(),
        });
        if let Some(kind) = batch.kind() {
            self.executed_kinds.lock().unwrap().push(kind);
        }
        (self.responder)(batch)
    }

    async fn probe_throttle(&self) -> Result<Option<ThrottleState>, RemoteError> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        Ok(*self.probe.lock().unwrap())
    }

    async fn create_staged_upload(
        &self,
        filename: &str,
        _mime_type: &str,
    ) -> Result<StagedTarget, RemoteError> {
        if self.fails_at(BulkStage::StageUpload) {
            return Err(RemoteError::GraphQl {
                messages: vec!["staging refused".to_string()],
                throttle: None,
            });
        }
        Ok(StagedTarget {
            url: "https://uploads.example.test/bucket".to_string(),
            resource_url: None,
            parameters: vec![
                StagedUploadParameter {
                    name: "key".to_string(),
                    value: format!("tmp/uploads/{}", filename),
                },
                StagedUploadParameter {
                    name: "policy".to_string(),
                    value: "opaque".to_string(),
                },
            ],
        })
    }

    async fn upload_file(
        &self,
        _target: &StagedTarget,
        _filename: &str,
        _mime_type: &str,
        contents: Vec<u8>,
    ) -> Result<(), RemoteError> {
        if self.fails_at(BulkStage::Upload) {
            return Err(RemoteError::Http {
                status: 403,
                body: "AccessDenied".to_string(),
                throttle: None,
            });
        }
        self.uploads.lock().unwrap().push(contents);
        Ok(())
    }

    async fn start_bulk_job(
        &self,
        mutation: &str,
        _staged_upload_path: &str,
    ) -> Result<BulkJob, RemoteError> {
        if self.fails_at(BulkStage::StartJob) {
            return Err(RemoteError::GraphQl {
                messages: vec!["A bulk mutation operation is already in progress".to_string()],
                throttle: None,
            });
        }
        self.started_templates
            .lock()
            .unwrap()
            .push(mutation.to_string());
        let job = BulkJob {
            id: "gid://shopify/BulkOperation/1".to_string(),
            status: BulkJobStatus::Created,
            object_count: None,
            url: None,
            error_code: None,
            created_at: None,
            completed_at: None,
        };
        *self.current_job.lock().unwrap() = Some(job.clone());
        Ok(job)
    }

    async fn bulk_job_status(&self) -> Result<Option<BulkJob>, RemoteError> {
        Ok(self.current_job.lock().unwrap().clone())
    }

    async fn fetch_products_page(
        &self,
        _query: &str,
        after: Option<&str>,
    ) -> Result<ProductPage, RemoteError> {
        self.pages.fetch_add(1, Ordering::SeqCst);
        let start: usize = after.map_or(0, |c| c.parse().unwrap());
        let end = (start + self.page_size).min(self.products.len());
        Ok(ProductPage {
            products: self.products[start..end].to_vec(),
            has_next_page: end < self.products.len(),
            end_cursor: Some(end.to_string()),
        })
    }

    async fn first_location_id(&self) -> Result<String, RemoteError> {
        Ok("gid://shopify/Location/1".to_string())
    }
}

/// Scheduler that returns immediately and remembers every requested wait.
#[derive(Default)]
pub struct RecordingScheduler {
    pub sleeps: Mutex<Vec<Duration>>,
}

impl RecordingScheduler {
    pub fn total(&self) -> Duration {
        self.sleeps.lock().unwrap().iter().sum()
    }

    pub fn count(&self) -> usize {
        self.sleeps.lock().unwrap().len()
    }
}

#[async_trait]
impl Scheduler for RecordingScheduler {
    async fn sleep(&self, duration: Duration) -> Result<(), Cancelled> {
        self.sleeps.lock().unwrap().push(duration);
        Ok(())
    }
}

/// A bucket with plenty of room for every scenario.
pub fn ample() -> ThrottleState {
    ThrottleState::new(20_000.0, 20_000.0, 0.0)
}

/// A bucket frozen at `available` points.
pub fn fixed(available: f64) -> ThrottleState {
    ThrottleState::new(2_000.0, available, 0.0)
}

pub fn set_quantity_ops(n: usize) -> Vec<Operation> {
    (0..n)
        .map(|i| Operation::SetQuantity {
            inventory_item_id: format!("gid://shopify/InventoryItem/{}", i),
            location_id: "gid://shopify/Location/1".to_string(),
            quantity: 5,
        })
        .collect()
}

pub fn tracking_ops(n: usize) -> Vec<Operation> {
    (0..n)
        .map(|i| Operation::EnableTracking {
            inventory_item_id: format!("gid://shopify/InventoryItem/{}", i),
        })
        .collect()
}

/// `count` products titled "Dummy Product <n>" with `variants` variants each.
pub fn dummy_products(count: usize, variants: usize) -> Vec<Product> {
    (1..=count)
        .map(|n| Product {
            id: format!("gid://shopify/Product/{}", n),
            title: format!("Dummy Product {}", n),
            variants: (0..variants)
                .map(|v| Variant {
                    id: format!("gid://shopify/ProductVariant/{}{:02}", n, v),
                    inventory_item_id: format!("gid://shopify/InventoryItem/{}{:02}", n, v),
                })
                .collect(),
        })
        .collect()
}

/// Engine over `remote` with a recording scheduler.
pub fn engine_with(
    remote: Arc<ScriptedRemote>,
    config: EngineConfig,
) -> (Engine, Arc<RecordingScheduler>) {
    let scheduler = Arc::new(RecordingScheduler::default());
    let engine = Engine::new(remote, config).with_scheduler(scheduler.clone());
    (engine, scheduler)
}

pub fn throttled() -> RemoteError {
    RemoteError::Throttled { throttle: None }
}
