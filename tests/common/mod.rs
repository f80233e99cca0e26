//! 集成测试公共工具
//!
//! 每个测试使用独立的内存数据库与临时上传目录，通过 `oneshot` 直接驱动路由。

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use chrono::Utc;
use entity::{UserRole, users};
use lost_found::api::{AppState, create_router};
use lost_found::app::AppContext;
use lost_found::auth::password::hash_password;
use lost_found::config::AppConfig;
use lost_found::database;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

pub const TEST_PASSWORD: &str = "password123";
const MULTIPART_BOUNDARY: &str = "lost-found-test-boundary";

/// 测试用应用实例
pub struct TestApp {
    pub router: Router,
    pub context: Arc<AppContext>,
    pub uploads: TempDir,
}

/// 已入库的测试用户及其令牌
pub struct TestUser {
    pub user: users::Model,
    pub token: String,
}

/// 测试配置：内存数据库、低 bcrypt 成本
pub fn test_config(uploads: &TempDir) -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.database.max_connections = 1;
    config.auth.jwt_secret = "integration-test-secret-0123456789".to_string();
    config.auth.bcrypt_cost = 4;
    config.uploads.dir = uploads.path().to_string_lossy().into_owned();
    config
}

impl TestApp {
    pub async fn new() -> Self {
        let uploads = tempfile::tempdir().unwrap();
        let config = Arc::new(test_config(&uploads));

        let db = database::init_database(&config.database).await.unwrap();
        database::run_migrations(&db).await.unwrap();

        let context = Arc::new(AppContext::new(Arc::clone(&config), db));
        let router = create_router(AppState::new(Arc::clone(&context)), &config);

        Self {
            router,
            context,
            uploads,
        }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.context.database
    }

    /// 直接入库一个用户
    pub async fn seed_user(&self, name: &str, email: &str, role: UserRole) -> TestUser {
        let user = users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.to_string()),
            password_hash: Set(hash_password(TEST_PASSWORD, 4).unwrap()),
            role: Set(role),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(self.db())
        .await
        .unwrap();

        let token = self
            .context
            .jwt_manager
            .generate_token(user.user_id, user.role)
            .unwrap();
        TestUser { user, token }
    }

    pub async fn student(&self, name: &str) -> TestUser {
        let email = format!("{}@campus.edu", name.to_lowercase());
        self.seed_user(name, &email, UserRole::Student).await
    }

    pub async fn admin(&self) -> TestUser {
        self.seed_user("Admin", "admin@campus.edu", UserRole::Admin).await
    }

    pub async fn super_admin(&self) -> TestUser {
        self.seed_user("Root", "root@campus.edu", UserRole::SuperAdmin)
            .await
    }

    /// 发送 JSON 请求，返回状态码与解析后的响应体
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.dispatch(request).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.send(Method::GET, uri, token, None).await
    }

    /// 发送 multipart 表单，`image` 为 (文件名, MIME, 内容)
    pub async fn send_multipart(
        &self,
        method: Method,
        uri: &str,
        token: &str,
        fields: &[(&str, &str)],
        image: Option<(&str, &str, &[u8])>,
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, content_type, bytes)) = image {
            body.extend_from_slice(
                format!(
                    "--{MULTIPART_BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.dispatch(request).await
    }

    /// 原样返回响应，供检查响应头或非 JSON 响应体
    pub async fn raw(&self, request: Request<Body>) -> axum::response::Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.raw(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// 以指定用户登记一件物品，返回物品ID
    pub async fn report_item(&self, token: &str, title: &str, status: &str) -> i32 {
        let (code, body) = self
            .send(
                Method::POST,
                "/api/items",
                Some(token),
                Some(serde_json::json!({
                    "title": title,
                    "description": format!("{title} description"),
                    "category": "Accessories",
                    "location": "Library",
                    "status": status,
                })),
            )
            .await;
        assert_eq!(code, StatusCode::CREATED, "{body}");
        i32::try_from(body["item"]["item_id"].as_i64().unwrap()).unwrap()
    }
}
