//! 订单实体

use orderd_errors::{AppError, AppResult};

/// 固定单价
pub const UNIT_PRICE: f64 = 10.5;

/// 已持久化的订单
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub product: String,
    pub quantity: i32,
    pub unit_price: f64,
}

impl Order {
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// 待创建的订单
///
/// 只能经 [`NewOrder::new`] 构造，存储层拿到的订单一定通过了校验：
/// 商品非空、数量大于 0、单价为 [`UNIT_PRICE`]。ID 由存储层分配。
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    user_id: String,
    product: String,
    quantity: i32,
    unit_price: f64,
}

impl NewOrder {
    pub fn new(
        user_id: impl Into<String>,
        product: impl Into<String>,
        quantity: i32,
    ) -> AppResult<Self> {
        let product = product.into();

        if product.is_empty() {
            return Err(AppError::validation("product is required"));
        }
        if quantity <= 0 {
            return Err(AppError::validation("quantity should be greater than 0"));
        }

        Ok(Self {
            user_id: user_id.into(),
            product,
            quantity,
            unit_price: UNIT_PRICE,
        })
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn unit_price(&self) -> f64 {
        self.unit_price
    }

    /// 分配 ID 后生成订单
    pub fn into_order(self, id: impl Into<String>) -> Order {
        Order {
            id: id.into(),
            user_id: self.user_id,
            product: self.product,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_order_uses_fixed_unit_price() {
        let order = NewOrder::new("u1", "book", 2).unwrap();
        assert_eq!(order.user_id(), "u1");
        assert_eq!(order.product(), "book");
        assert_eq!(order.quantity(), 2);
        assert_eq!(order.unit_price(), 10.5);
    }

    #[test]
    fn test_empty_product_rejected() {
        let err = NewOrder::new("u1", "", 1).unwrap_err();
        assert_eq!(err.grpc_code(), tonic::Code::InvalidArgument);
        assert_eq!(err.message(), "product is required");
    }

    #[test]
    fn test_non_positive_quantity_rejected() {
        for quantity in [0, -1, i32::MIN] {
            let err = NewOrder::new("u1", "book", quantity).unwrap_err();
            assert_eq!(err.grpc_code(), tonic::Code::InvalidArgument);
            assert_eq!(err.message(), "quantity should be greater than 0");
        }
    }

    #[test]
    fn test_product_checked_before_quantity() {
        let err = NewOrder::new("u1", "", 0).unwrap_err();
        assert_eq!(err.message(), "product is required");
    }

    #[test]
    fn test_into_order_keeps_fields() {
        let order = NewOrder::new("u1", "book", 3).unwrap().into_order("o-1");
        assert_eq!(order.id, "o-1");
        assert!(order.is_owned_by("u1"));
        assert!(!order.is_owned_by("u2"));
        assert_eq!(order.quantity, 3);
        assert_eq!(order.unit_price, UNIT_PRICE);
    }
}
