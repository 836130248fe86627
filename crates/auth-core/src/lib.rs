//! orderd-auth-core - 认证核心库
//!
//! 本服务不在本地校验凭证：请求中的 bearer 凭证被转发给外部身份服务，
//! 由其解析出调用方身份。

mod authorizer;
mod context;
mod identity;

pub use authorizer::*;
pub use context::*;
pub use identity::*;
