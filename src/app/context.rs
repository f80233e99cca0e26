//! 应用上下文
//!
//! 统一持有跨模块共享的服务实例，便于在测试中注入内存数据库与临时上传目录。

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::auth::JwtManager;
use crate::config::AppConfig;
use crate::uploads::UploadStore;

/// 跨请求共享的依赖
#[derive(Debug, Clone)]
pub struct AppContext {
    /// 应用配置
    pub config: Arc<AppConfig>,
    /// 数据库连接池
    pub database: Arc<DatabaseConnection>,
    /// JWT 签发与校验
    pub jwt_manager: Arc<JwtManager>,
    /// 图片存储
    pub uploads: Arc<UploadStore>,
}

impl AppContext {
    /// 根据配置与数据库连接组装上下文
    #[must_use]
    pub fn new(config: Arc<AppConfig>, database: DatabaseConnection) -> Self {
        let jwt_manager = Arc::new(JwtManager::new(&config.auth));
        let uploads = Arc::new(UploadStore::new(&config.uploads));
        Self {
            config,
            database: Arc::new(database),
            jwt_manager,
            uploads,
        }
    }
}
