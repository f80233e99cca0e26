//! # 认证授权模块
//!
//! JWT 签发与校验、密码哈希以及角色分级。请求级身份以 [`AuthContext`]
//! 的形式作为请求扩展传递，不依赖任何全局状态。

pub mod jwt;
pub mod password;
pub mod permissions;
pub mod types;
pub mod utils;

pub use jwt::JwtManager;
pub use permissions::RoleGate;
pub use types::{AuthContext, JwtClaims};
