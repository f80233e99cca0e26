//! # HTTP 接口层
//!
//! axum 路由、中间件、处理器与服务层

pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod services;

pub use server::{ApiServer, AppState, create_router};
