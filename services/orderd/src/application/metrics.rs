//! 业务结果计数接口

/// 调用结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failed,
}

impl Outcome {
    /// `result` 标签值
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => "success",
            Outcome::Failed => "failed",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 订单结果计数器
///
/// 由调用方注入，实现需保证并发递增不丢失。
pub trait OrderMetrics: Send + Sync {
    /// 创建订单的存储结果
    fn order_created(&self, outcome: Outcome);

    /// 查询订单的结果
    ///
    /// 只有已从存储读到的订单才带 `order_id`；存储失败（含不存在）时为
    /// `None`，调用方传入的任意 ID 不会产生新的标签组合。
    fn order_fetched(&self, outcome: Outcome, order_id: Option<&str>);
}
