//! 基础设施资源管理
//!
//! 统一创建服务依赖的外部资源：PostgreSQL 连接池和身份服务 gRPC 通道

use std::time::Duration;

use orderd_adapter_postgres::{PostgresConfig, create_pool};
use orderd_config::AppConfig;
use orderd_errors::{AppError, AppResult};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use tonic::transport::{Channel, Endpoint};
use tracing::info;

use crate::retry::{RetryConfig, with_retry};

/// 基础设施资源容器
///
/// 连接池与 gRPC 通道都可以廉价克隆，并发请求共享同一份
#[derive(Clone)]
pub struct Infrastructure {
    postgres_pool: PgPool,
    identity_channel: Channel,
}

impl Infrastructure {
    /// 从配置创建基础设施资源（带重试）
    pub async fn from_config(config: &AppConfig) -> AppResult<Self> {
        let retry_config = RetryConfig::default();

        // 1. PostgreSQL 连接池
        let pg_config = PostgresConfig::new(config.database.url.expose_secret())
            .with_max_connections(config.database.max_connections);
        let postgres_pool = with_retry(&retry_config, "PostgreSQL connection", || {
            let cfg = pg_config.clone();
            async move { create_pool(&cfg).await }
        })
        .await?;
        info!(
            max_connections = config.database.max_connections,
            "PostgreSQL connection pool created"
        );

        // 2. 身份服务通道
        let endpoint = identity_endpoint(config)?;
        let identity_channel = with_retry(&retry_config, "Identity service connection", || {
            let endpoint = endpoint.clone();
            async move {
                endpoint
                    .connect()
                    .await
                    .map_err(|e| AppError::external_service(format!("Failed to connect to identity service: {}", e)))
            }
        })
        .await?;
        info!(endpoint = %config.identity.endpoint, "Identity service channel created");

        Ok(Self {
            postgres_pool,
            identity_channel,
        })
    }

    /// 获取 PostgreSQL 连接池
    pub fn postgres_pool(&self) -> PgPool {
        self.postgres_pool.clone()
    }

    /// 获取身份服务 gRPC 通道
    pub fn identity_channel(&self) -> Channel {
        self.identity_channel.clone()
    }
}

fn identity_endpoint(config: &AppConfig) -> AppResult<Endpoint> {
    let endpoint = Endpoint::from_shared(config.identity.endpoint.clone())
        .map_err(|e| AppError::internal(format!("Invalid identity endpoint: {}", e)))?
        .connect_timeout(Duration::from_secs(config.identity.connect_timeout_secs));
    Ok(endpoint)
}
