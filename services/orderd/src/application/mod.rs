//! 应用层

mod metrics;
mod order_service;

pub use metrics::{OrderMetrics, Outcome};
pub use order_service::OrderService;
