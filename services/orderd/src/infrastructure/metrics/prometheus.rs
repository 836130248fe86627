//! 经 `metrics` facade 写入 Prometheus

use metrics::{counter, describe_counter};

use crate::application::{OrderMetrics, Outcome};

pub const ORDERS_TOTAL: &str = "orderd_service_total_orders";
pub const FETCHED_ORDERS_TOTAL: &str = "orderd_service_total_fetched_orders";

/// 进程级 recorder 上的订单计数器
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusOrderMetrics;

impl PrometheusOrderMetrics {
    pub fn new() -> Self {
        describe_counter!(ORDERS_TOTAL, "Total number of CreateOrder storage attempts");
        describe_counter!(FETCHED_ORDERS_TOTAL, "Total number of GetOrder lookups");
        Self
    }
}

impl OrderMetrics for PrometheusOrderMetrics {
    fn order_created(&self, outcome: Outcome) {
        counter!(ORDERS_TOTAL, "result" => outcome.as_str()).increment(1);
    }

    fn order_fetched(&self, outcome: Outcome, order_id: Option<&str>) {
        match order_id {
            Some(id) => counter!(
                FETCHED_ORDERS_TOTAL,
                "result" => outcome.as_str(),
                "order_id" => id.to_string()
            )
            .increment(1),
            None => counter!(FETCHED_ORDERS_TOTAL, "result" => outcome.as_str()).increment(1),
        }
    }
}
