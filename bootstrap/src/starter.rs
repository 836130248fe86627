//! 服务启动器
//!
//! 提供统一的服务启动模式

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use orderd_config::AppConfig;
use orderd_errors::AppResult;
use orderd_telemetry::init_metrics;
use tonic::transport::Server;
use tonic::transport::server::Router;
use tracing::{error, info};

use crate::health::{HealthChecker, HealthServer};
use crate::infrastructure::Infrastructure;
use crate::metrics::PoolMetricsCollector;
use crate::runtime::{init_runtime, load_dotenv, shutdown_signal};

/// 运行 gRPC 服务
///
/// 启动步骤：
/// 1. 加载 `.env` 与配置
/// 2. 初始化运行时（日志、追踪）与 Prometheus recorder
/// 3. 创建基础设施资源（数据库、身份服务通道，带重试）
/// 4. 启动健康检查 / metrics HTTP 服务器和连接池指标采集
/// 5. 调用闭包注册 gRPC 服务
/// 6. 启动服务器并处理 graceful shutdown
///
/// 任何一步失败都会直接返回错误，进程以非零状态退出。
///
/// # 示例
///
/// ```ignore
/// run_server("config", |infra, mut server| async move {
///     let service = MyServiceImpl::new(infra.postgres_pool());
///     Ok(server.add_service(MyServiceServer::new(service)))
/// })
/// .await
/// ```
pub async fn run_server<F, Fut>(
    config_dir: &str,
    server_builder: F,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: FnOnce(Infrastructure, Server) -> Fut,
    Fut: Future<Output = AppResult<Router>>,
{
    // 1. 加载配置
    let dotenv_loaded = load_dotenv();
    let config = AppConfig::load(config_dir)?;

    // 2. 初始化运行时
    init_runtime(&config);
    if !dotenv_loaded {
        info!(".env file not found, using environment variables");
    }
    info!("Starting {} service", config.app_name);

    let metrics_handle = init_metrics()?;

    // 3. 创建基础设施（带重试）
    let infra = Infrastructure::from_config(&config).await?;

    // 4. 连接池指标与健康检查 / metrics 端点
    let pool_metrics_handle =
        PoolMetricsCollector::new(infra.postgres_pool(), Duration::from_secs(15)).start();

    let health_checker = Arc::new(HealthChecker::new(infra.postgres_pool()));
    let health_server = HealthServer::new(health_checker, metrics_handle, config.metrics.port);
    let health_handle = tokio::spawn(async move {
        if let Err(e) = health_server.serve().await {
            error!("Health server error: {}", e);
        }
    });

    // 5. 注册 gRPC 服务
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    let router = server_builder(infra, Server::builder()).await?;

    info!(%addr, "gRPC server starting");

    // 6. 启动服务器
    router.serve_with_shutdown(addr, shutdown_signal()).await?;

    health_handle.abort();
    pool_metrics_handle.abort();

    info!("Service stopped");

    Ok(())
}
