//! # 管理后台处理器
//!
//! 路由层已挂载管理员等级校验。

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
    response::Response,
};

use super::{json_body, path_id};
use crate::api::middleware::RequestId;
use crate::api::response;
use crate::api::server::AppState;
use crate::api::services::{AdminService, CreateMatchRequest, MatchesService, UpdateStatusRequest};
use crate::auth::AuthContext;
use crate::logging::{LogComponent, LogStage, log_api_error};
use crate::linfo;

/// 全部物品
pub async fn list_items(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
) -> Response {
    match AdminService::new(&state.database).list_items(&auth).await {
        Ok(items) => response::success("items", items),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Admin,
                "list_items_fail",
                "获取物品列表失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 修改物品状态
pub async fn update_item_status(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
    path: Result<Path<i32>, PathRejection>,
    body: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Response {
    let result = match (path_id(path), json_body(body)) {
        (Ok(item_id), Ok(request)) => {
            AdminService::new(&state.database)
                .update_item_status(&auth, item_id, &request)
                .await
        }
        (Err(err), _) | (_, Err(err)) => Err(err),
    };

    match result {
        Ok(item) => {
            linfo!(
                request_id,
                LogStage::BusinessLogic,
                LogComponent::Admin,
                "update_status_ok",
                "物品状态已更新",
                item_id = item.item_id,
                status = item.status
            );
            response::success_with_message("item", item, "Item status updated successfully")
        }
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Admin,
                "update_status_fail",
                "修改物品状态失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 删除任意物品
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
    path: Result<Path<i32>, PathRejection>,
) -> Response {
    let result = match path_id(path) {
        Ok(item_id) => AdminService::new(&state.database).delete_item(&auth, item_id).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(item) => {
            if let Some(url) = item.image_url {
                state.uploads.remove(&url).await;
            }
            response::message("Item deleted successfully")
        }
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Admin,
                "delete_item_fail",
                "管理员删除物品失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 创建配对
pub async fn create_match(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
    body: Result<Json<CreateMatchRequest>, JsonRejection>,
) -> Response {
    let result = match json_body(body) {
        Ok(request) => MatchesService::new(&state.database).create(&auth, &request).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(record) => {
            linfo!(
                request_id,
                LogStage::BusinessLogic,
                LogComponent::Matches,
                "create_match_ok",
                "配对创建成功",
                match_id = record.match_id
            );
            response::created("match", record, "Match created successfully")
        }
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Matches,
                "create_match_fail",
                "创建配对失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 全部配对
pub async fn list_matches(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
) -> Response {
    match MatchesService::new(&state.database).list(&auth).await {
        Ok(matches) => response::success("matches", matches),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Matches,
                "list_matches_fail",
                "获取配对列表失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 标记已归还
pub async fn mark_returned(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
    path: Result<Path<i32>, PathRejection>,
) -> Response {
    let result = match path_id(path) {
        Ok(match_id) => MatchesService::new(&state.database).mark_returned(&auth, match_id).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(record) => response::success_with_message(
            "match",
            record,
            "Match marked as returned successfully",
        ),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Matches,
                "mark_returned_fail",
                "标记归还失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 统计数据
pub async fn stats(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
) -> Response {
    match AdminService::new(&state.database).stats(&auth).await {
        Ok(stats) => response::success("stats", stats),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Admin,
                "stats_fail",
                "获取统计失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 最近审计日志
pub async fn logs(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
) -> Response {
    match AdminService::new(&state.database).recent_logs(&auth).await {
        Ok(logs) => response::success("logs", logs),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::AuditLog,
                "logs_fail",
                "获取审计日志失败",
                &err,
            );
            response::app_error(err)
        }
    }
}
