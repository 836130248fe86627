//! gRPC 服务模块

mod conversions;
mod order_service;

use tonic::service::interceptor::InterceptedService;
use tonic::{Request, Status};

use orderd_bootstrap::tracing_interceptor;

use crate::domain::order::OrderRepository;
use crate::proto::order_service_server::OrderServiceServer;

pub use order_service::OrderServiceImpl;

/// 拦截器函数指针类型
pub type TracingInterceptor = fn(Request<()>) -> Result<Request<()>, Status>;

/// 带追踪拦截器的 OrderService 服务端
pub fn order_service_server<R>(
    service: OrderServiceImpl<R>,
) -> InterceptedService<OrderServiceServer<OrderServiceImpl<R>>, TracingInterceptor>
where
    R: OrderRepository + 'static,
{
    OrderServiceServer::with_interceptor(service, tracing_interceptor as TracingInterceptor)
}
