//! # 错误处理测试

use std::error::Error;

use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use sea_orm::DbErr;

use crate::error::{Context, ErrorCategory, RegistryError};

#[test]
fn test_config_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "文件不存在");
    let err = RegistryError::config_with_source("配置文件加载失败", io_err);

    assert!(matches!(err, RegistryError::Config { .. }));
    assert_eq!(err.to_string(), "配置错误: 配置文件加载失败");
    assert!(err.source().is_some());
}

#[test]
fn test_client_errors_map_to_4xx() {
    let cases = [
        (RegistryError::validation("bad"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
        (
            RegistryError::authentication("No token provided"),
            StatusCode::UNAUTHORIZED,
            "AUTH_ERROR",
        ),
        (RegistryError::permission("nope"), StatusCode::FORBIDDEN, "PERMISSION_ERROR"),
        (RegistryError::not_found("Item not found"), StatusCode::NOT_FOUND, "RESOURCE_NOT_FOUND"),
        (RegistryError::conflict("dup"), StatusCode::CONFLICT, "RESOURCE_CONFLICT"),
    ];

    for (err, status, code) in cases {
        assert_eq!(err.to_http_response_parts(), (status, code));
        assert_eq!(err.category(), ErrorCategory::Client);
    }
}

#[test]
fn test_context_keeps_client_message_of_root() {
    let result: Result<(), RegistryError> = Err(RegistryError::not_found("Item not found"));
    let err = result.context("Failed to fetch item").unwrap_err();

    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.client_message(), "Item not found");
}

#[test]
fn test_database_error_hides_driver_message() {
    let result: Result<(), DbErr> = Err(DbErr::Custom("no such table: items".into()));
    let err = result.context("Failed to create item").unwrap_err();

    assert_eq!(err.to_http_response_parts(), (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"));
    assert_eq!(err.category(), ErrorCategory::Server);
    assert_eq!(err.client_message(), "Failed to create item");
    assert!(format!("{err:?}").contains("no such table"));
}

#[test]
fn test_server_error_without_context_uses_generic_message() {
    let err = RegistryError::internal("boom");
    assert_eq!(err.client_message(), "Internal server error");
}

#[test]
fn test_auto_conversion_from_toml_error() {
    let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
    let err: RegistryError = toml_err.into();

    assert!(matches!(err, RegistryError::Config { .. }));
    assert!(err.to_string().contains("TOML解析失败"));
}

#[test]
fn test_jwt_error_reports_invalid_token() {
    let jwt_err = jsonwebtoken::errors::Error::from(jsonwebtoken::errors::ErrorKind::InvalidToken);
    let err: RegistryError = jwt_err.into();

    assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
    assert_eq!(err.client_message(), "Invalid token");
}

#[test]
fn test_ensure_valid_macro() {
    fn check(title: &str) -> crate::error::Result<()> {
        crate::ensure_valid!(!title.trim().is_empty(), "{} is required", "title");
        Ok(())
    }

    assert!(check("Blue Backpack").is_ok());
    let err = check("  ").unwrap_err();
    assert_eq!(err.client_message(), "title is required");
}
