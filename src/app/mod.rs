//! # 应用上下文

pub mod context;

pub use context::AppContext;
