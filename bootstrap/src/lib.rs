//! orderd-bootstrap - 统一服务启动骨架
//!
//! 配置、日志、指标、基础设施与 gRPC 服务器的启动逻辑

mod health;
mod infrastructure;
mod interceptor;
mod metrics;
mod reflection;
mod retry;
mod runtime;
mod starter;

pub use health::*;
pub use infrastructure::*;
pub use interceptor::*;
pub use self::metrics::*;
pub use reflection::*;
pub use retry::*;
pub use runtime::*;
pub use starter::*;
