//! 请求上下文

use std::future::Future;
use std::time::Duration;

use orderd_errors::{AppError, AppResult};
use tokio::time::Instant;
use tonic::metadata::MetadataMap;

/// gRPC 超时头
pub const GRPC_TIMEOUT_HEADER: &str = "grpc-timeout";

/// 单次请求的上下文：入站元数据、截止时间、追踪 ID
///
/// 核心逻辑只依赖它，不直接接触 `tonic::Request`。
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    metadata: Option<MetadataMap>,
    deadline: Option<Instant>,
    trace_id: Option<String>,
}

impl RequestContext {
    /// 从入站元数据构建，`grpc-timeout` 会被换算为截止时间
    pub fn new(metadata: MetadataMap) -> Self {
        let deadline = metadata
            .get(GRPC_TIMEOUT_HEADER)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_grpc_timeout)
            .map(|timeout| Instant::now() + timeout);

        Self {
            metadata: Some(metadata),
            deadline,
            trace_id: None,
        }
    }

    /// 没有任何元数据的上下文
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub fn with_trace_id(mut self, trace_id: impl Into<String>) -> Self {
        self.trace_id = Some(trace_id.into());
        self
    }

    pub fn metadata(&self) -> Option<&MetadataMap> {
        self.metadata.as_ref()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn trace_id(&self) -> Option<&str> {
        self.trace_id.as_deref()
    }

    /// 距离截止时间的剩余时长，已过期时为零
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// 在请求截止时间内执行远程调用
    ///
    /// 超时后内部 future 被丢弃，进行中的调用随之取消。
    pub async fn run<F, T>(&self, operation: &str, fut: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        match self.deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, fut)
                .await
                .map_err(|_| {
                    AppError::deadline_exceeded(format!("{} exceeded the request deadline", operation))
                })?,
            None => fut.await,
        }
    }
}

/// 解析 `grpc-timeout` 头，格式为最多 8 位数字加单位（H/M/S/m/u/n）
pub fn parse_grpc_timeout(value: &str) -> Option<Duration> {
    let value = value.trim();
    if value.len() < 2 || !value.is_ascii() {
        return None;
    }
    let (digits, unit) = value.split_at(value.len() - 1);
    if digits.len() > 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let amount: u64 = digits.parse().ok()?;

    let timeout = match unit {
        "H" => Duration::from_secs(amount * 3600),
        "M" => Duration::from_secs(amount * 60),
        "S" => Duration::from_secs(amount),
        "m" => Duration::from_millis(amount),
        "u" => Duration::from_micros(amount),
        "n" => Duration::from_nanos(amount),
        _ => return None,
    };
    Some(timeout)
}
