//! # 路由配置
//!
//! 定义所有API路由和路由组织。
//! `route_layer` 只作用于其之前声明的路由，公开路由放在认证层之后声明。

use axum::Router;
use axum::middleware::{from_fn, from_fn_with_state};
use axum::routing::{get, patch, post, put};

use super::handlers::{admin, auth, items};
use super::middleware::{self, require_admin, require_super_admin};
use super::server::AppState;

/// 创建所有路由
pub fn create_routes(state: AppState) -> Router {
    Router::new()
        .nest("/auth", auth_routes(&state))
        .nest("/items", item_routes(&state))
        .nest("/admin", admin_routes(&state))
        .with_state(state)
}

/// 注册、登录与当前用户
fn auth_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/me", get(auth::me))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth))
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
}

/// 物品：浏览公开，登记与修改需登录
fn item_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", post(items::create_item))
        .route("/user/my-items", get(items::my_items))
        .route("/{id}", put(items::update_item).delete(items::delete_item))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth))
        .route("/", get(items::list_items))
        .route("/{id}", get(items::get_item))
}

/// 管理后台，角色修改仅限 super_admin
fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/users/{id}/role", patch(auth::update_user_role))
        .route_layer(from_fn(require_super_admin))
        .route("/items", get(admin::list_items))
        .route("/items/{id}/status", patch(admin::update_item_status))
        .route("/items/{id}", axum::routing::delete(admin::delete_item))
        .route("/matches", post(admin::create_match).get(admin::list_matches))
        .route("/matches/{id}/returned", patch(admin::mark_returned))
        .route("/stats", get(admin::stats))
        .route("/logs", get(admin::logs))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), middleware::auth))
}
