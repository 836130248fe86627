//! 基础设施层

pub mod identity;
pub mod metrics;
pub mod persistence;
