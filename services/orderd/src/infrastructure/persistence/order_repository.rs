//! PostgreSQL 订单仓储实现

use async_trait::async_trait;
use orderd_adapter_postgres::map_sqlx_error;
use orderd_bootstrap::DbQueryTimer;
use orderd_errors::{AppError, AppResult};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::domain::order::{NewOrder, Order, OrderRepository};

const TABLE: &str = "orders";

const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS orders (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    product     TEXT NOT NULL,
    quantity    INTEGER NOT NULL CHECK (quantity > 0),
    unit_price  DOUBLE PRECISION NOT NULL
)
"#;

const CREATE_INDEX_SQL: &str = "CREATE INDEX IF NOT EXISTS idx_orders_user_id ON orders (user_id)";

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: String,
    product: String,
    quantity: i32,
    unit_price: f64,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Order {
            id: row.id,
            user_id: row.user_id,
            product: row.product,
            quantity: row.quantity,
            unit_price: row.unit_price,
        }
    }
}

pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// 启动时建表（幂等）
    pub async fn ensure_schema(&self) -> AppResult<()> {
        for sql in [CREATE_TABLE_SQL, CREATE_INDEX_SQL] {
            sqlx::query(sql)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to prepare orders table: {}", e)))?;
        }
        info!("Orders table ready");
        Ok(())
    }
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    async fn create_order(&self, order: NewOrder) -> AppResult<Order> {
        let id = Uuid::now_v7().to_string();
        let timer = DbQueryTimer::new("insert", TABLE);

        let result = sqlx::query_as::<_, OrderRow>(
            r#"
            INSERT INTO orders (id, user_id, product, quantity, unit_price)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, product, quantity, unit_price
            "#,
        )
        .bind(&id)
        .bind(order.user_id())
        .bind(order.product())
        .bind(order.quantity())
        .bind(order.unit_price())
        .fetch_one(&self.pool)
        .await;

        timer.finish(result.is_ok());
        let row = result.map_err(|e| map_sqlx_error("order", e))?;

        Ok(row.into())
    }

    async fn get_order_by_id(&self, id: &str) -> AppResult<Order> {
        let timer = DbQueryTimer::new("select", TABLE);

        let result = sqlx::query_as::<_, OrderRow>(
            r#"
            SELECT id, user_id, product, quantity, unit_price
            FROM orders WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        timer.finish(result.is_ok());
        let row = result.map_err(|e| map_sqlx_error("order", e))?;

        row.map(Order::from)
            .ok_or_else(|| AppError::not_found("order not found"))
    }
}
