//! orderd - 订单服务入口

use std::sync::Arc;

use orderd::FILE_DESCRIPTOR_SET;
use orderd::api::{OrderServiceImpl, order_service_server};
use orderd::application::OrderService;
use orderd::infrastructure::identity::GrpcIdentityResolver;
use orderd::infrastructure::metrics::PrometheusOrderMetrics;
use orderd::infrastructure::persistence::PostgresOrderRepository;
use orderd_auth_core::Authorizer;
use orderd_bootstrap::{Infrastructure, build_reflection, run_server};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_server("config", |infra: Infrastructure, mut server| async move {
        info!("Initializing orderd service...");

        // 初始化仓储
        let repo = Arc::new(PostgresOrderRepository::new(infra.postgres_pool()));
        repo.ensure_schema().await?;

        // 身份服务与授权
        let resolver = Arc::new(GrpcIdentityResolver::new(infra.identity_channel()));
        let authorizer = Authorizer::new(resolver);

        let metrics = Arc::new(PrometheusOrderMetrics::new());
        let service = OrderService::new(authorizer, repo, metrics);

        info!("gRPC services created");

        let reflection_service = build_reflection(&[FILE_DESCRIPTOR_SET])?;

        Ok(server
            .add_service(order_service_server(OrderServiceImpl::new(service)))
            .add_service(reflection_service))
    })
    .await
}
