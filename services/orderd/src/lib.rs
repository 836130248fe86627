//! orderd - 订单服务
//!
//! 创建与查询订单，调用方身份委托外部身份服务解析

pub mod api;
pub mod application;
pub mod domain;
pub mod infrastructure;

// Proto generated code modules
pub mod order {
    pub mod v1 {
        tonic::include_proto!("order.v1");
    }
}

pub mod user {
    pub mod v1 {
        tonic::include_proto!("user.v1");
    }
}

pub use order::v1 as proto;

/// 文件描述符集 (用于 gRPC 反射)
pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("orderd_descriptor");
