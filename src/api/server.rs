//! # HTTP 服务器
//!
//! 组装路由与中间件，监听端口并在收到 Ctrl-C 后优雅退出。

use std::net::SocketAddr;
use std::ops::Deref;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::get;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use super::handlers::system;
use super::middleware::request_id_middleware;
use crate::app::AppContext;
use crate::config::{AppConfig, ServerConfig};
use crate::error::{Context, RegistryError, Result};
use crate::logging::{LogComponent, LogStage};
use crate::{linfo, lwarn};

/// 处理器共享的应用状态
#[derive(Clone)]
pub struct AppState {
    context: Arc<AppContext>,
}

impl AppState {
    #[must_use]
    pub const fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }
}

impl Deref for AppState {
    type Target = AppContext;

    fn deref(&self) -> &Self::Target {
        &self.context
    }
}

/// API 服务器
pub struct ApiServer {
    config: ServerConfig,
    router: Router,
}

impl ApiServer {
    /// 根据应用上下文创建服务器
    #[must_use]
    pub fn new(context: Arc<AppContext>) -> Self {
        let config = context.config.server.clone();
        let router = create_router(AppState::new(Arc::clone(&context)), &context.config);
        Self { config, router }
    }

    /// 启动服务器，直到收到关闭信号
    pub async fn serve(self) -> Result<()> {
        let addr: SocketAddr = self.config.listen_addr().parse().map_err(|e| {
            RegistryError::config(format!(
                "Invalid bind address '{}': {e}",
                self.config.listen_addr()
            ))
        })?;

        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind {addr}"))?;

        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::ServerSetup,
            "server_start",
            "服务已启动",
            addr = addr
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .context("Server error")?;

        linfo!(
            "system",
            LogStage::Shutdown,
            LogComponent::ServerSetup,
            "server_stopped",
            "服务已停止"
        );
        Ok(())
    }
}

/// 创建完整路由，测试中可直接驱动
pub fn create_router(state: AppState, config: &AppConfig) -> Router {
    let api_routes = super::routes::create_routes(state);

    let mut app = Router::new()
        .nest(&config.server.api_prefix, api_routes)
        .route("/", get(system::root_handler))
        .route("/ping", get(system::ping_handler))
        .nest_service(
            &config.uploads.public_path,
            ServeDir::new(&config.uploads.dir),
        )
        .layer(DefaultBodyLimit::max(config.server.max_request_size));

    let service_builder = ServiceBuilder::new().layer(TraceLayer::new_for_http());

    if config.server.enable_cors {
        app = app.layer(service_builder.layer(cors_layer(&config.server)));
    } else {
        app = app.layer(service_builder);
    }

    app.layer(axum::middleware::from_fn(request_id_middleware))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let cors_layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
        ]);

    if config.cors_origins.iter().any(|origin| origin == "*") {
        return cors_layer.allow_origin(Any);
    }

    let origins = config
        .cors_origins
        .iter()
        .map(|origin| origin.parse::<HeaderValue>())
        .collect::<std::result::Result<Vec<_>, _>>();

    match origins {
        Ok(origins) => cors_layer.allow_origin(origins),
        Err(e) => {
            lwarn!(
                "system",
                LogStage::Startup,
                LogComponent::ServerSetup,
                "cors_config_fail",
                "CORS 源配置无效，允许所有来源",
                error = e
            );
            cors_layer.allow_origin(Any)
        }
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        lwarn!(
            "system",
            LogStage::Shutdown,
            LogComponent::ServerSetup,
            "signal_fail",
            "监听关闭信号失败",
            error = e
        );
        std::future::pending::<()>().await;
    }
}
