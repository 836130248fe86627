//! 基于 gRPC 的身份解析
//!
//! 调用身份服务的 `Me`，凭证放在 `authorization` 元数据中原样转发。

use std::time::Instant;

use async_trait::async_trait;
use orderd_auth_core::{AUTHORIZATION_HEADER, Identity, IdentityResolver, RequestContext};
use orderd_bootstrap::{TRACE_ID_HEADER, code_label, record_identity_request};
use orderd_errors::{AppError, AppResult};
use tonic::Request;
use tonic::metadata::{Ascii, MetadataValue};
use tonic::transport::Channel;
use tracing::debug;

use crate::user::v1::MeRequest;
use crate::user::v1::user_service_client::UserServiceClient;

/// 身份服务客户端
///
/// 底层 `Channel` 可克隆，多个并发请求共享同一连接。
#[derive(Clone)]
pub struct GrpcIdentityResolver {
    client: UserServiceClient<Channel>,
}

impl GrpcIdentityResolver {
    pub fn new(channel: Channel) -> Self {
        Self {
            client: UserServiceClient::new(channel),
        }
    }

    fn build_request(credential: &str, ctx: &RequestContext) -> AppResult<Request<MeRequest>> {
        let mut request = Request::new(MeRequest {});

        let value: MetadataValue<Ascii> = credential
            .parse()
            .map_err(|_| AppError::unauthenticated("invalid authorization token"))?;
        request.metadata_mut().insert(AUTHORIZATION_HEADER, value);

        if let Some(trace_id) = ctx.trace_id() {
            if let Ok(value) = trace_id.parse::<MetadataValue<Ascii>>() {
                request.metadata_mut().insert(TRACE_ID_HEADER, value);
            }
        }

        // 下游调用不超过本请求剩余时间
        if let Some(remaining) = ctx.remaining() {
            request.set_timeout(remaining);
        }

        Ok(request)
    }
}

#[async_trait]
impl IdentityResolver for GrpcIdentityResolver {
    async fn resolve_identity(&self, credential: &str, ctx: &RequestContext) -> AppResult<Identity> {
        let request = Self::build_request(credential, ctx)?;

        let start = Instant::now();
        let mut client = self.client.clone();
        let result = client.me(request).await;

        let code = match &result {
            Ok(_) => tonic::Code::Ok,
            Err(status) => status.code(),
        };
        record_identity_request(&code_label(code), start.elapsed().as_secs_f64() * 1000.0);

        // 身份服务的状态码和消息原样返回给调用方
        let response = result.map_err(AppError::Grpc)?.into_inner();

        // 缺少 user 时得到空 ID，由授权器拒绝
        let user = response.user.unwrap_or_default();
        debug!(user_id = %user.id, "Identity resolved");

        Ok(Identity::new(user.id))
    }
}
