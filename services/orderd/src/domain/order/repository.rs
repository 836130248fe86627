//! 订单仓储接口

use async_trait::async_trait;
use orderd_errors::AppResult;

use super::{NewOrder, Order};

/// 订单仓储接口
///
/// 实现需支持并发调用。
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// 持久化订单并分配唯一 ID
    async fn create_order(&self, order: NewOrder) -> AppResult<Order>;

    /// 按 ID 查询，不存在时返回 `NotFound`
    async fn get_order_by_id(&self, id: &str) -> AppResult<Order>;
}
