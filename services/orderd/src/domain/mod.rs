//! 领域层

pub mod order;
