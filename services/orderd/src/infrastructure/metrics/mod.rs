//! 订单结果计数器实现

mod in_memory;
mod prometheus;

pub use in_memory::InMemoryOrderMetrics;
pub use prometheus::{FETCHED_ORDERS_TOTAL, ORDERS_TOTAL, PrometheusOrderMetrics};
