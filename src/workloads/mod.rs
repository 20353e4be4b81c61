//! Inventory, price and product workloads.
//!
//! Builders turn the product snapshot into operation lists; the service runs
//! them live through the adaptive engine or hands them to a remote bulk job.

mod builders;
mod service;

pub use builders::{
    next_product_number, on_hand_operations, price_operations, product_create_operations,
    quantity_operations, tracking_operations, PRODUCT_TITLE_PREFIX,
};
pub use service::{FullInventoryReport, ProductCreation, Workloads};
