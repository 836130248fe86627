//! 领域模型与 proto 之间的转换

use crate::domain::order::Order;
use crate::proto::Order as ProtoOrder;

impl From<Order> for ProtoOrder {
    fn from(order: Order) -> Self {
        ProtoOrder {
            id: order.id,
            user_id: order.user_id,
            product: order.product,
            quantity: order.quantity,
            unit_price: order.unit_price,
        }
    }
}
