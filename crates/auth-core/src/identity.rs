//! 身份解析端口

use async_trait::async_trait;
use orderd_errors::AppResult;

use crate::RequestContext;

/// 外部身份服务解析出的调用方身份
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// 身份解析器
///
/// 给定 bearer 凭证返回其所有者身份。实现方必须遵守 `ctx` 中的截止时间，
/// 失败时返回身份服务自身的错误，不做转换也不重试。
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_identity(&self, credential: &str, ctx: &RequestContext) -> AppResult<Identity>;
}
