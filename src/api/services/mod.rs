//! # 服务层
//!
//! 各业务域的数据库逻辑，供 HTTP handler 与测试直接调用。

pub mod admin;
pub mod auth;
pub mod items;
pub mod matches;
pub mod views;

pub use admin::{AdminService, UpdateStatusRequest};
pub use auth::{AuthService, AuthSession, LoginRequest, RegisterRequest, UpdateRoleRequest};
pub use items::{ItemListQuery, ItemUpdate, ItemsService};
pub use matches::{CreateMatchRequest, MatchesService};
pub use views::{DashboardStats, ItemView, LogView, MatchView};
