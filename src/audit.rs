//! # 操作审计日志
//!
//! 所有写操作在同一连接（或事务）上追加一条 `logs` 记录

use chrono::Utc;
use entity::logs;
use sea_orm::{ActiveModelTrait, ConnectionTrait, Set};

use crate::error::Result;

/// 追加一条审计日志
///
/// `conn` 可以是连接池也可以是事务，事务回滚时日志一并撤销。
pub async fn record<C>(
    conn: &C,
    user_id: Option<i32>,
    action: impl Into<String>,
    details: Option<String>,
) -> Result<logs::Model>
where
    C: ConnectionTrait,
{
    let entry = logs::ActiveModel {
        action: Set(action.into()),
        user_id: Set(user_id),
        timestamp: Set(Utc::now().naive_utc()),
        details: Set(details),
        ..Default::default()
    };

    Ok(entry.insert(conn).await?)
}
