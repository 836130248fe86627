//! 持久化层模块

mod in_memory_order_repository;
mod order_repository;

pub use in_memory_order_repository::InMemoryOrderRepository;
pub use order_repository::PostgresOrderRepository;
