//! # HTTP 处理器
//!
//! 处理器只负责提取参数、调用服务层并包装响应；失败时记录日志。

pub mod admin;
pub mod auth;
pub mod items;
pub mod system;

use axum::{
    Json,
    extract::{
        Path,
        rejection::{JsonRejection, PathRejection},
    },
};

use crate::error::RegistryError;

/// 路径中的数字ID
pub(crate) fn path_id(path: Result<Path<i32>, PathRejection>) -> Result<i32, RegistryError> {
    path.map(|Path(id)| id)
        .map_err(|_| RegistryError::validation_field("Invalid id", "id"))
}

/// JSON 请求体
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, RegistryError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| RegistryError::validation(rejection.body_text()))
}
