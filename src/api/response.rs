//! # API 响应结构
//!
//! 成功响应是带顶层数据键（`item`、`items`、`match` 等）和可选 `message`
//! 的 JSON 对象；失败响应统一为 `{message, error}`。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::RegistryError;

/// # 标准错误响应
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// 面向用户的错误消息
    pub message: String,
    /// 稳定的机器可读错误代码
    pub error: &'static str,
}

/// # API响应枚举
///
/// 统一所有API出口，方便转换为 `axum::response::Response`
#[derive(Debug)]
pub enum ApiResponse<T: Serialize> {
    /// 数据放在 `key` 下
    Keyed {
        status: StatusCode,
        key: &'static str,
        data: T,
        message: Option<String>,
    },
    /// 数据本身是对象，字段直接展开到顶层
    Fields {
        status: StatusCode,
        data: T,
        message: Option<String>,
    },
    /// 只有提示消息
    Message(String),
    /// 错误
    AppError(RegistryError),
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        match self {
            Self::Keyed {
                status,
                key,
                data,
                message,
            } => match serde_json::to_value(data) {
                Ok(value) => {
                    let mut body = envelope(message);
                    body.insert(key.to_string(), value);
                    (status, Json(Value::Object(body))).into_response()
                }
                Err(err) => error_response(&RegistryError::from(err)),
            },
            Self::Fields {
                status,
                data,
                message,
            } => match serde_json::to_value(data) {
                Ok(Value::Object(fields)) => {
                    let mut body = envelope(message);
                    body.extend(fields);
                    (status, Json(Value::Object(body))).into_response()
                }
                Ok(_) => error_response(&RegistryError::internal("响应数据必须是JSON对象")),
                Err(err) => error_response(&RegistryError::from(err)),
            },
            Self::Message(message) => {
                (StatusCode::OK, Json(Value::Object(envelope(Some(message))))).into_response()
            }
            Self::AppError(err) => error_response(&err),
        }
    }
}

fn envelope(message: Option<String>) -> Map<String, Value> {
    let mut body = Map::new();
    if let Some(message) = message {
        body.insert("message".to_string(), Value::String(message));
    }
    body
}

fn error_response(err: &RegistryError) -> Response {
    let (status, code) = err.to_http_response_parts();
    (
        status,
        Json(ErrorResponse {
            message: err.client_message(),
            error: code,
        }),
    )
        .into_response()
}

impl IntoResponse for RegistryError {
    fn into_response(self) -> Response {
        error_response(&self)
    }
}

/// # 便捷函数：成功响应
pub fn success<T: Serialize>(key: &'static str, data: T) -> Response {
    ApiResponse::Keyed {
        status: StatusCode::OK,
        key,
        data,
        message: None,
    }
    .into_response()
}

/// # 便捷函数：带消息的成功响应
pub fn success_with_message<T: Serialize>(key: &'static str, data: T, message: &str) -> Response {
    ApiResponse::Keyed {
        status: StatusCode::OK,
        key,
        data,
        message: Some(message.to_string()),
    }
    .into_response()
}

/// # 便捷函数：201 创建成功
pub fn created<T: Serialize>(key: &'static str, data: T, message: &str) -> Response {
    ApiResponse::Keyed {
        status: StatusCode::CREATED,
        key,
        data,
        message: Some(message.to_string()),
    }
    .into_response()
}

/// # 便捷函数：字段展开到顶层的成功响应
pub fn fields<T: Serialize>(status: StatusCode, data: T, message: &str) -> Response {
    ApiResponse::Fields {
        status,
        data,
        message: Some(message.to_string()),
    }
    .into_response()
}

/// # 便捷函数：只有消息的成功响应
pub fn message(message: &str) -> Response {
    ApiResponse::<()>::Message(message.to_string()).into_response()
}

/// # 便捷函数：应用错误响应
pub fn app_error(err: RegistryError) -> Response {
    ApiResponse::<()>::AppError(err).into_response()
}
