//! Workload service: snapshot + engine + bulk jobs behind one handle.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio_util::sync::CancellationToken;

use super::builders::{
    next_product_number, on_hand_operations, price_operations, product_create_operations,
    quantity_operations, tracking_operations,
};
use crate::app::print_run_summary;
use crate::batch::{Operation, OperationKind};
use crate::bulk::{run_bulk_job, BulkSubmission};
use crate::config::Config;
use crate::engine::{Engine, RunReport, TokioScheduler};
use crate::error_handling::{InitializationError, WorkloadError};
use crate::remote::{bulk_mutation_template, BulkJob, GraphQlClient};
use crate::snapshot::{fetch_all_products, load_or_refresh, refresh_snapshot, SnapshotCache};

/// Result of a tracking run followed by a quantity run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullInventoryReport {
    pub enable_tracking: RunReport,
    pub update_quantities: RunReport,
    pub total_products: usize,
}

/// A product-creation bulk job and the numbers it covers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCreation {
    pub submission: BulkSubmission,
    pub start_num: u64,
    pub end_num: u64,
}

/// Runs the inventory, price and product workloads.
#[derive(Clone)]
pub struct Workloads {
    engine: Engine,
    cache: SnapshotCache,
    product_query: String,
    staging_dir: PathBuf,
}

impl Workloads {
    pub fn new(
        engine: Engine,
        cache: SnapshotCache,
        product_query: impl Into<String>,
        staging_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            engine,
            cache,
            product_query: product_query.into(),
            staging_dir: staging_dir.into(),
        }
    }

    /// Wires a GraphQL client, an engine and the snapshot cache from `config`.
    ///
    /// Cancelling `shutdown` stops runs at their next wait.
    pub fn from_config(
        config: &Config,
        shutdown: CancellationToken,
    ) -> Result<Self, InitializationError> {
        let remote = GraphQlClient::from_config(config)?;
        log::info!("GraphQL endpoint: {}", remote.endpoint());
        let engine = Engine::new(Arc::new(remote), config.engine.clone())
            .with_scheduler(Arc::new(TokioScheduler::with_cancellation(shutdown)));
        let cache = SnapshotCache::new(config.snapshot_path.clone(), config.snapshot_max_age);
        Ok(Self::new(
            engine,
            cache,
            config.product_query.clone(),
            config.staging_dir.clone(),
        ))
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Re-fetches the product universe into the cache. Returns the product count.
    pub async fn refresh_cache(&self) -> Result<usize, WorkloadError> {
        log::info!("Cache refresh requested");
        let products =
            refresh_snapshot(self.engine.remote().as_ref(), &self.cache, &self.product_query)
                .await?;
        Ok(products.len())
    }

    /// Turns on tracking for every cached inventory item.
    pub async fn enable_tracking(&self) -> Result<RunReport, WorkloadError> {
        log::info!("Enable tracking requested");
        let products = self.cache.load()?;
        self.run_live(tracking_operations(&products), OperationKind::EnableTracking)
            .await
    }

    /// Sets the on-hand quantity of every cached inventory item at the first location.
    pub async fn update_on_hand_quantities(
        &self,
        quantity: Option<i64>,
    ) -> Result<RunReport, WorkloadError> {
        log::info!("On-hand quantity update requested");
        let products = self.cache.load()?;
        let location_id = self.engine.remote().first_location_id().await?;
        self.run_live(
            on_hand_operations(&products, &location_id, quantity),
            OperationKind::SetOnHandQuantity,
        )
        .await
    }

    /// Sets the available quantity of every cached inventory item at the first location.
    pub async fn set_available_quantities(
        &self,
        quantity: Option<i64>,
    ) -> Result<RunReport, WorkloadError> {
        log::info!("Set available quantities requested");
        let products = self.cache.load()?;
        let location_id = self.engine.remote().first_location_id().await?;
        self.run_live(
            quantity_operations(&products, &location_id, quantity),
            OperationKind::SetQuantity,
        )
        .await
    }

    /// Loads (or refreshes a stale) snapshot, enables tracking, then sets
    /// on-hand quantities.
    pub async fn full_inventory_update(&self) -> Result<FullInventoryReport, WorkloadError> {
        log::info!("Full inventory update requested");
        let remote = self.engine.remote().as_ref();
        let products = load_or_refresh(remote, &self.cache, &self.product_query).await?;
        let location_id = remote.first_location_id().await?;

        let enable_tracking = self
            .run_live(tracking_operations(&products), OperationKind::EnableTracking)
            .await?;
        let update_quantities = self
            .run_live(
                on_hand_operations(&products, &location_id, None),
                OperationKind::SetOnHandQuantity,
            )
            .await?;

        Ok(FullInventoryReport {
            enable_tracking,
            update_quantities,
            total_products: products.len(),
        })
    }

    /// Sets every cached variant's price through live adaptive rounds.
    pub async fn update_prices(&self, price: &str) -> Result<RunReport, WorkloadError> {
        log::info!("Price update requested (live)");
        let products = self.cache.load()?;
        self.run_live(
            price_operations(&products, price),
            OperationKind::UpdateVariantPrice,
        )
        .await
    }

    /// Sets every cached variant's price through a remote bulk job.
    pub async fn update_prices_bulk(&self, price: &str) -> Result<BulkSubmission, WorkloadError> {
        log::info!("Price update requested (bulk)");
        let products = self.cache.load()?;
        let submission = run_bulk_job(
            self.engine.remote().as_ref(),
            price_operations(&products, price),
            bulk_mutation_template(OperationKind::UpdateVariantPrice),
            &self.staging_dir,
        )
        .await?;
        Ok(submission)
    }

    /// Creates `count` products numbered after the highest existing one.
    ///
    /// Numbering reads the cached snapshot when present, otherwise the remote.
    pub async fn create_products(&self, count: usize) -> Result<ProductCreation, WorkloadError> {
        log::info!("Product creation requested ({} products)", count);
        let remote = self.engine.remote().as_ref();
        let products = if self.cache.exists() {
            self.cache.load()?
        } else {
            fetch_all_products(remote, &self.product_query).await?
        };

        let start_num = next_product_number(&products);
        let end_num = start_num + count.saturating_sub(1) as u64;
        log::info!("Creating products from {} to {}", start_num, end_num);

        let submission = run_bulk_job(
            remote,
            product_create_operations(start_num, count),
            bulk_mutation_template(OperationKind::CreateProduct),
            &self.staging_dir,
        )
        .await?;
        Ok(ProductCreation {
            submission,
            start_num,
            end_num,
        })
    }

    /// Status of the remote's current bulk job, if one exists.
    pub async fn bulk_operation_status(&self) -> Result<Option<BulkJob>, WorkloadError> {
        Ok(self.engine.remote().bulk_job_status().await?)
    }

    async fn run_live(
        &self,
        operations: Vec<Operation>,
        kind: OperationKind,
    ) -> Result<RunReport, WorkloadError> {
        let limits = kind.default_limits();
        let report = self
            .engine
            .run_adaptive_batch(operations, limits, kind.per_call_cost(limits))
            .await?;
        print_run_summary(&report);
        Ok(report)
    }
}
