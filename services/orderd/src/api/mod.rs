//! API 层模块

pub mod grpc;

pub use grpc::{OrderServiceImpl, order_service_server};
