//! OrderService gRPC 服务实现

use std::sync::Arc;

use orderd_auth_core::RequestContext;
use orderd_bootstrap::{RequestTimer, create_request_span, trace_id};
use tonic::{Request, Response, Status};
use tracing::{Instrument, info};

use crate::application::OrderService;
use crate::domain::order::OrderRepository;
use crate::proto::{
    CreateOrderRequest, CreateOrderResponse, GetOrderRequest, GetOrderResponse,
    order_service_server::OrderService as GrpcOrderService,
};

const SERVICE_NAME: &str = "order.v1.OrderService";

/// OrderService gRPC 服务实现
pub struct OrderServiceImpl<R>
where
    R: OrderRepository + 'static,
{
    service: Arc<OrderService<R>>,
}

impl<R> OrderServiceImpl<R>
where
    R: OrderRepository + 'static,
{
    pub fn new(service: OrderService<R>) -> Self {
        Self {
            service: Arc::new(service),
        }
    }
}

/// 由入站请求构造上下文：元数据、截止时间和拦截器写入的追踪 ID
fn request_context<T>(request: &Request<T>) -> RequestContext {
    let ctx = RequestContext::new(request.metadata().clone());
    match trace_id(request) {
        Some(id) => ctx.with_trace_id(id),
        None => ctx,
    }
}

#[tonic::async_trait]
impl<R> GrpcOrderService for OrderServiceImpl<R>
where
    R: OrderRepository + 'static,
{
    async fn create_order(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> Result<Response<CreateOrderResponse>, Status> {
        let timer = RequestTimer::new(SERVICE_NAME, "CreateOrder");
        let span = create_request_span(&request, "CreateOrder");
        let ctx = request_context(&request);
        let req = request.into_inner();

        let result = async {
            info!(product = %req.product, quantity = req.quantity, "CreateOrder request");

            let order = self
                .service
                .create_order(&ctx, req.product, req.quantity)
                .await
                .map_err(Status::from)?;

            Ok::<_, Status>(Response::new(CreateOrderResponse {
                order: Some(order.into()),
            }))
        }
        .instrument(span)
        .await;

        timer.finish_with(&result);
        result
    }

    async fn get_order(
        &self,
        request: Request<GetOrderRequest>,
    ) -> Result<Response<GetOrderResponse>, Status> {
        let timer = RequestTimer::new(SERVICE_NAME, "GetOrder");
        let span = create_request_span(&request, "GetOrder");
        let ctx = request_context(&request);
        let req = request.into_inner();

        let result = async {
            info!(order_id = %req.id, "GetOrder request");

            let order = self
                .service
                .get_order(&ctx, &req.id)
                .await
                .map_err(Status::from)?;

            Ok::<_, Status>(Response::new(GetOrderResponse {
                order: Some(order.into()),
            }))
        }
        .instrument(span)
        .await;

        timer.finish_with(&result);
        result
    }
}
