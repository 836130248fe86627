//! 身份服务客户端

mod grpc_identity_resolver;

pub use grpc_identity_resolver::GrpcIdentityResolver;
