//! # 中间件

pub mod auth;
pub mod request_id;

pub use auth::{auth, require_admin, require_super_admin};
pub use request_id::{RequestId, request_id_middleware};
