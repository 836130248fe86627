//! 订单聚合

mod order;
mod repository;

pub use order::{NewOrder, Order, UNIT_PRICE};
pub use repository::OrderRepository;
