//! Metrics 模块
//!
//! 通用的请求 / 数据库 / 下游调用指标，经 `metrics` facade 写入 Prometheus recorder

use metrics::{counter, gauge, histogram};
use orderd_adapter_postgres::{PoolStatus, pool_status};
use sqlx::PgPool;
use std::time::{Duration, Instant};
use tracing::debug;

/// 记录 gRPC 请求
pub fn record_grpc_request(service: &str, method: &str, status: &str, duration_ms: f64) {
    let labels = [
        ("service", service.to_string()),
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];

    counter!("grpc_requests_total", &labels).increment(1);
    histogram!("grpc_request_duration_ms", &labels).record(duration_ms);
}

/// 记录数据库查询
pub fn record_db_query(operation: &str, table: &str, duration_ms: f64, success: bool) {
    let labels = [
        ("operation", operation.to_string()),
        ("table", table.to_string()),
        ("success", success.to_string()),
    ];

    counter!("db_queries_total", &labels).increment(1);
    histogram!("db_query_duration_ms", &labels).record(duration_ms);
}

/// 记录对身份服务的调用
pub fn record_identity_request(status: &str, duration_ms: f64) {
    let labels = [("status", status.to_string())];

    counter!("identity_requests_total", &labels).increment(1);
    histogram!("identity_request_duration_ms", &labels).record(duration_ms);
}

/// gRPC 状态码标签，例如 `Ok`、`NotFound`
pub fn code_label(code: tonic::Code) -> String {
    format!("{:?}", code)
}

/// 请求计时器
pub struct RequestTimer {
    start: Instant,
    service: &'static str,
    method: &'static str,
}

impl RequestTimer {
    pub fn new(service: &'static str, method: &'static str) -> Self {
        Self {
            start: Instant::now(),
            service,
            method,
        }
    }

    pub fn finish(self, status: &str) {
        let duration = self.start.elapsed().as_secs_f64() * 1000.0;
        record_grpc_request(self.service, self.method, status, duration);
    }

    /// 按 handler 结果记录
    pub fn finish_with<T>(self, result: &Result<T, tonic::Status>) {
        let code = match result {
            Ok(_) => tonic::Code::Ok,
            Err(status) => status.code(),
        };
        self.finish(&code_label(code));
    }
}

/// 数据库查询计时器
pub struct DbQueryTimer {
    start: Instant,
    operation: &'static str,
    table: &'static str,
}

impl DbQueryTimer {
    pub fn new(operation: &'static str, table: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
            table,
        }
    }

    pub fn finish(self, success: bool) {
        let duration = self.start.elapsed().as_secs_f64() * 1000.0;
        record_db_query(self.operation, self.table, duration, success);
    }
}

/// 连接池 Metrics 采集器
///
/// 定期采集 PostgreSQL 连接池状态
pub struct PoolMetricsCollector {
    pool: PgPool,
    interval: Duration,
}

impl PoolMetricsCollector {
    pub fn new(pool: PgPool, interval: Duration) -> Self {
        Self { pool, interval }
    }

    /// 启动后台采集任务
    pub fn start(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            loop {
                ticker.tick().await;

                let status = pool_status(&self.pool);
                record_postgres_pool_metrics(&status);

                debug!(
                    postgres_size = status.size,
                    postgres_idle = status.idle,
                    postgres_active = status.active,
                    "Pool metrics collected"
                );
            }
        })
    }
}

/// 记录 PostgreSQL 连接池指标
pub fn record_postgres_pool_metrics(status: &PoolStatus) {
    gauge!("postgres_pool_size").set(status.size as f64);
    gauge!("postgres_pool_idle").set(status.idle as f64);
    gauge!("postgres_pool_active").set(status.active as f64);

    let utilization = if status.size > 0 {
        (status.active as f64 / status.size as f64) * 100.0
    } else {
        0.0
    };
    gauge!("postgres_pool_utilization").set(utilization);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_label() {
        assert_eq!(code_label(tonic::Code::Ok), "Ok");
        assert_eq!(code_label(tonic::Code::PermissionDenied), "PermissionDenied");
    }

    #[test]
    fn test_request_timer_records_status() {
        let recorder = orderd_telemetry::metrics_builder().unwrap().build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            let result: Result<(), tonic::Status> = Err(tonic::Status::not_found("order not found"));
            RequestTimer::new("order.v1.OrderService", "GetOrder").finish_with(&result);
        });

        let output = handle.render();
        assert!(output.contains("grpc_requests_total"));
        assert!(output.contains("status=\"NotFound\""));
        assert!(output.contains("method=\"GetOrder\""));
    }
}
