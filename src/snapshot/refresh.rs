//! Snapshot refresh from the remote.

use tokio_retry::RetryIf;

use super::cache::SnapshotCache;
use super::types::Product;
use crate::error_handling::{get_retry_strategy, is_retriable_read, RemoteError, SnapshotError};
use crate::remote::RemoteApi;

/// Fetches every product matching `query`, following cursors to the end.
///
/// Each page is retried with exponential backoff on transient failures, so a
/// single hiccup does not throw away a long pagination.
pub async fn fetch_all_products(
    remote: &dyn RemoteApi,
    query: &str,
) -> Result<Vec<Product>, RemoteError> {
    let mut products = Vec::new();
    let mut after: Option<String> = None;
    let mut pages = 0usize;

    loop {
        let cursor = after.as_deref();
        let page = RetryIf::spawn(
            get_retry_strategy(),
            || remote.fetch_products_page(query, cursor),
            |e: &RemoteError| {
                let retry = is_retriable_read(e);
                if retry {
                    log::warn!("Product page fetch failed, retrying: {}", e);
                }
                retry
            },
        )
        .await?;
        pages += 1;
        products.extend(page.products);
        log::debug!("Fetched page {} ({} products so far)", pages, products.len());

        if !page.has_next_page {
            break;
        }
        match page.end_cursor {
            Some(cursor) => after = Some(cursor),
            None => {
                return Err(RemoteError::Decode(
                    "page reported more results but no cursor".to_string(),
                ))
            }
        }
    }

    log::info!("Fetched {} products from remote in {} pages", products.len(), pages);
    Ok(products)
}

/// Re-fetches the product universe and replaces the cached snapshot.
pub async fn refresh_snapshot(
    remote: &dyn RemoteApi,
    cache: &SnapshotCache,
    query: &str,
) -> Result<Vec<Product>, SnapshotError> {
    let products = fetch_all_products(remote, query).await?;
    cache.save(&products)?;
    Ok(products)
}

/// Loads the cached snapshot while it is fresh, otherwise refreshes it.
pub async fn load_or_refresh(
    remote: &dyn RemoteApi,
    cache: &SnapshotCache,
    query: &str,
) -> Result<Vec<Product>, SnapshotError> {
    if let Some(products) = cache.load_fresh() {
        return Ok(products);
    }
    refresh_snapshot(remote, cache, query).await
}
