//! gRPC 追踪拦截器
//!
//! 从请求元数据中提取追踪 ID (Trace ID / Correlation ID)，
//! 写入请求扩展，供 handler 创建日志 span 并向下游透传。

use tonic::{Request, Status};
use tracing::info_span;
use uuid::Uuid;

/// 追踪 ID 元数据键
pub const TRACE_ID_HEADER: &str = "x-trace-id";

/// 追踪信息
#[derive(Debug, Clone)]
pub struct TraceInfo {
    pub trace_id: String,
}

/// gRPC 拦截器：提取或生成追踪 ID
#[allow(clippy::result_large_err)]
pub fn tracing_interceptor(mut req: Request<()>) -> Result<Request<()>, Status> {
    let metadata = req.metadata();

    let trace_id = [TRACE_ID_HEADER, "x-request-id", "x-correlation-id"]
        .iter()
        .find_map(|key| {
            metadata
                .get(*key)
                .and_then(|v| v.to_str().ok())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| Uuid::now_v7().to_string());

    req.extensions_mut().insert(TraceInfo { trace_id });

    Ok(req)
}

/// 读取拦截器写入的追踪 ID
pub fn trace_id<T>(req: &Request<T>) -> Option<&str> {
    req.extensions()
        .get::<TraceInfo>()
        .map(|t| t.trace_id.as_str())
}

/// 为一次 gRPC 请求创建 span
pub fn create_request_span<T>(req: &Request<T>, name: &'static str) -> tracing::Span {
    let trace_id = trace_id(req).unwrap_or("unknown");

    info_span!(
        "grpc_request",
        span_name = name,
        trace_id = %trace_id
    )
}
