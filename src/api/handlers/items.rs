//! # 物品处理器

use std::sync::Arc;

use axum::{
    Extension,
    extract::{Path, Query, State, rejection::PathRejection},
    response::Response,
};

use super::path_id;
use crate::api::extract::ItemForm;
use crate::api::middleware::RequestId;
use crate::api::response;
use crate::api::server::AppState;
use crate::api::services::{ItemListQuery, ItemsService};
use crate::auth::AuthContext;
use crate::error::Result;
use crate::logging::{LogComponent, LogStage, log_api_error};
use crate::uploads::UploadedImage;
use crate::linfo;

/// 保存请求中携带的图片
async fn store_image(state: &AppState, image: Option<&UploadedImage>) -> Result<Option<String>> {
    match image {
        Some(image) => state.uploads.save(image).await.map(Some),
        None => Ok(None),
    }
}

/// 登记物品
pub async fn create_item(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
    form: ItemForm,
) -> Response {
    let image_url = match store_image(&state, form.image.as_ref()).await {
        Ok(url) => url,
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Uploads,
                "image_save_fail",
                "图片保存失败",
                &err,
            );
            return response::app_error(err);
        }
    };

    let service = ItemsService::new(&state.database);
    match service.create(&auth, &form.fields, image_url.clone()).await {
        Ok(item) => {
            linfo!(
                request_id,
                LogStage::BusinessLogic,
                LogComponent::Items,
                "create_item_ok",
                "物品登记成功",
                item_id = item.item_id,
                user_id = auth.user_id
            );
            response::created("item", item, "Item reported successfully")
        }
        Err(err) => {
            if let Some(url) = image_url {
                state.uploads.remove(&url).await;
            }
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Items,
                "create_item_fail",
                "物品登记失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 公开列表
pub async fn list_items(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<ItemListQuery>,
) -> Response {
    match ItemsService::new(&state.database).list(&query).await {
        Ok(items) => response::success("items", items),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Items,
                "list_items_fail",
                "获取物品列表失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 物品详情
pub async fn get_item(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Response {
    let result = match path_id(path) {
        Ok(item_id) => ItemsService::new(&state.database).get(item_id).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(item) => response::success("item", item),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Items,
                "get_item_fail",
                "获取物品失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 当前用户的物品
pub async fn my_items(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
) -> Response {
    match ItemsService::new(&state.database).list_mine(&auth).await {
        Ok(items) => response::success("items", items),
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Items,
                "my_items_fail",
                "获取我的物品失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 创建者修改物品
pub async fn update_item(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
    path: std::result::Result<Path<i32>, PathRejection>,
    form: ItemForm,
) -> Response {
    let item_id = match path_id(path) {
        Ok(item_id) => item_id,
        Err(err) => return response::app_error(err),
    };

    let image_url = match store_image(&state, form.image.as_ref()).await {
        Ok(url) => url,
        Err(err) => {
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Uploads,
                "image_save_fail",
                "图片保存失败",
                &err,
            );
            return response::app_error(err);
        }
    };

    let service = ItemsService::new(&state.database);
    match service.update(&auth, item_id, &form.fields, image_url.clone()).await {
        Ok(update) => {
            if let Some(old) = update.replaced_image {
                state.uploads.remove(&old).await;
            }
            response::success_with_message("item", update.item, "Item updated successfully")
        }
        Err(err) => {
            if let Some(url) = image_url {
                state.uploads.remove(&url).await;
            }
            log_api_error(
                &request_id,
                LogStage::BusinessLogic,
                LogComponent::Items,
                "update_item_fail",
                "修改物品失败",
                &err,
            );
            response::app_error(err)
        }
    }
}

/// 创建者删除物品
pub async fn delete_item(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Extension(auth): Extension<Arc<AuthContext>>,
    path: std::result::Result<Path<i32>, PathRejection>,
) -> Response {
    let result = match path_id(path) {
        Ok(item_id) => ItemsService::new(&state.database).delete(&auth, item_id).await,
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
                LogComponent::Items,
                "delete_item_fail",
                "删除物品失败",
                &err,
            );
            response::app_error(err)
        }
    }
}
