//! 内存订单仓储
//!
//! 不依赖数据库，用于测试和本地调试

use std::collections::HashMap;

use async_trait::async_trait;
use orderd_errors::{AppError, AppResult};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::order::{NewOrder, Order, OrderRepository};

#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: RwLock<HashMap<String, Order>>,
}

impl InMemoryOrderRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
    async fn create_order(&self, order: NewOrder) -> AppResult<Order> {
        let order = order.into_order(Uuid::now_v7().to_string());
        self.orders
            .write()
            .await
            .insert(order.id.clone(), order.clone());
        Ok(order)
    }

    async fn get_order_by_id(&self, id: &str) -> AppResult<Order> {
        self.orders
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| AppError::not_found("order not found"))
    }
}
