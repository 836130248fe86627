//! 委托式授权

use std::sync::Arc;

use orderd_errors::{AppError, AppResult};
use tracing::{debug, warn};

use crate::{IdentityResolver, RequestContext};

/// 授权元数据键
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// 授权器
///
/// 从入站元数据取出凭证，交给 [`IdentityResolver`] 解析出用户 ID。
#[derive(Clone)]
pub struct Authorizer {
    resolver: Arc<dyn IdentityResolver>,
}

impl Authorizer {
    pub fn new(resolver: Arc<dyn IdentityResolver>) -> Self {
        Self { resolver }
    }

    /// 解析当前请求的调用方，返回用户 ID
    pub async fn authorize(&self, ctx: &RequestContext) -> AppResult<String> {
        let credential = extract_credential(ctx)?;

        let identity = ctx
            .run(
                "identity lookup",
                self.resolver.resolve_identity(&credential, ctx),
            )
            .await
            .inspect_err(|e| {
                warn!(
                    trace_id = ctx.trace_id().unwrap_or("unknown"),
                    error = %e,
                    "Identity lookup failed"
                );
            })?;

        if identity.id.trim().is_empty() {
            warn!(
                trace_id = ctx.trace_id().unwrap_or("unknown"),
                "Identity service returned an empty identity"
            );
            return Err(AppError::unauthenticated(
                "identity service returned an empty identity",
            ));
        }

        debug!(user_id = %identity.id, "Caller authorized");
        Ok(identity.id)
    }
}

/// 取 `authorization` 的第一个值作为 bearer 凭证，原样返回
pub fn extract_credential(ctx: &RequestContext) -> AppResult<String> {
    let metadata = ctx
        .metadata()
        .ok_or_else(|| AppError::unauthenticated("missing metadata"))?;

    let value = metadata
        .get_all(AUTHORIZATION_HEADER)
        .iter()
        .next()
        .ok_or_else(|| AppError::unauthenticated("missing authorization token"))?;

    let credential = value
        .to_str()
        .map_err(|_| AppError::unauthenticated("invalid authorization token"))?;

    if credential.trim().is_empty() {
        return Err(AppError::unauthenticated("missing authorization token"));
    }

    Ok(credential.to_string())
}
