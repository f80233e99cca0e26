//! # 数据库模块
//!
//! 数据库连接、迁移与初始数据

use std::time::Duration;

use chrono::Utc;
use entity::{UserRole, users};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;

use crate::auth::password::hash_password;
use crate::config::{AuthConfig, DatabaseConfig};
use crate::error::{Context, Result};
use crate::{audit, lerror, linfo, logging::{LogComponent, LogStage}};

/// 初始化数据库连接
///
/// SQLite 文件数据库会先创建所在目录与空文件。
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection> {
    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "connect",
        &format!("正在连接数据库: {}", config.url)
    );

    config.ensure_database_path()?;

    let mut options = ConnectOptions::new(config.url.clone());
    options
        .max_connections(if config.is_memory_database() { 1 } else { config.max_connections })
        .connect_timeout(Duration::from_secs(config.connect_timeout))
        .sqlx_logging(false);

    let db = Database::connect(options)
        .await
        .context("Failed to connect to database")?;

    linfo!("system", LogStage::Startup, LogComponent::Database, "connected", "数据库连接成功");
    Ok(db)
}

/// 运行数据库迁移
pub async fn run_migrations(db: &DatabaseConnection) -> Result<()> {
    linfo!("system", LogStage::Startup, LogComponent::Database, "migrate_start", "开始运行数据库迁移...");

    match ::migration::Migrator::up(db, None).await {
        Ok(()) => {
            linfo!("system", LogStage::Startup, LogComponent::Database, "migrate_done", "数据库迁移完成");
            Ok(())
        }
        Err(e) => {
            lerror!(
                "system",
                LogStage::Startup,
                LogComponent::Database,
                "migrate_fail",
                &format!("数据库迁移失败: {e}")
            );
            Err(e).context("Failed to run migrations")
        }
    }
}

/// 确保配置的初始超级管理员存在
///
/// 账号已存在时不做任何修改；返回新建的账号。
pub async fn ensure_bootstrap_admin(
    db: &DatabaseConnection,
    config: &AuthConfig,
) -> Result<Option<users::Model>> {
    let Some(admin) = &config.bootstrap_admin else {
        return Ok(None);
    };

    let email = admin.email.trim().to_lowercase();
    let existing = users::Entity::find()
        .filter(users::Column::Email.eq(email.as_str()))
        .one(db)
        .await
        .context("Failed to look up bootstrap admin")?;

    if existing.is_some() {
        linfo!(
            "system",
            LogStage::Startup,
            LogComponent::Database,
            "bootstrap_admin_exists",
            &format!("初始超级管理员已存在: {email}")
        );
        return Ok(None);
    }

    let user = users::ActiveModel {
        name: Set(admin.name.clone()),
        email: Set(email.clone()),
        password_hash: Set(hash_password(&admin.password, config.bcrypt_cost)?),
        role: Set(UserRole::SuperAdmin),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(db)
    .await
    .context("Failed to create bootstrap admin")?;

    audit::record(
        db,
        Some(user.user_id),
        "Super admin bootstrapped",
        Some(format!("Email: {email}")),
    )
    .await?;

    linfo!(
        "system",
        LogStage::Startup,
        LogComponent::Database,
        "bootstrap_admin_created",
        &format!("已创建初始超级管理员: {email}")
    );
    Ok(Some(user))
}
