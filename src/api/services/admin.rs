//! # 管理后台服务
//!
//! 跨用户的物品管理、统计与审计日志查询。调用方需已通过管理员等级校验，
//! 服务内部再校验一次角色。

use chrono::Utc;
use entity::{
    ItemStatus, Items, Logs, Matches, Users, items, logs,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set,
};
use serde::Deserialize;

use super::items::{item_not_found, remove_item};
use super::views::{DashboardStats, ItemView, LogView};
use crate::{
    audit,
    auth::{AuthContext, RoleGate},
    error::{Context, RegistryError, Result},
};

/// 审计日志列表条数
pub const RECENT_LOG_LIMIT: u64 = 100;

/// 修改物品状态请求
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// 管理后台服务
pub struct AdminService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> AdminService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 全部物品，最新登记在前
    pub async fn list_items(&self, auth: &AuthContext) -> Result<Vec<ItemView>> {
        RoleGate::Admin.check(auth.role)?;

        let rows = Items::find()
            .find_also_related(Users)
            .order_by_desc(items::Column::DateReported)
            .order_by_desc(items::Column::ItemId)
            .all(self.db)
            .await
            .context("Failed to get items")?;

        Ok(rows.into_iter().map(ItemView::from).collect())
    }

    /// 直接设置物品状态，不校验状态流转
    pub async fn update_item_status(
        &self,
        auth: &AuthContext,
        item_id: i32,
        request: &UpdateStatusRequest,
    ) -> Result<items::Model> {
        RoleGate::Admin.check(auth.role)?;

        let status = ItemStatus::parse(request.status.trim()).ok_or_else(|| {
            RegistryError::validation_field(
                "Status must be one of: lost, found, matched, resolved",
                "status",
            )
        })?;

        let item = Items::find_by_id(item_id)
            .one(self.db)
            .await
            .context("Failed to update status")?
            .ok_or_else(item_not_found)?;

        let mut active: items::ActiveModel = item.into();
        active.status = Set(status);
        active.updated_at = Set(Utc::now().naive_utc());
        let item = active.update(self.db).await.context("Failed to update status")?;

        audit::record(
            self.db,
            Some(auth.user_id),
            format!("Item status updated to {status}"),
            Some(format!("Item ID: {}, Title: {}", item.item_id, item.title)),
        )
        .await
        .context("Failed to update status")?;

        Ok(item)
    }

    /// 删除任意物品
    pub async fn delete_item(&self, auth: &AuthContext, item_id: i32) -> Result<items::Model> {
        RoleGate::Admin.check(auth.role)?;

        let item = Items::find_by_id(item_id)
            .one(self.db)
            .await
            .context("Failed to delete item")?
            .ok_or_else(item_not_found)?;

        remove_item(self.db, &item, auth.user_id, "Admin deleted item").await?;
        Ok(item)
    }

    /// 每次请求实时统计
    pub async fn stats(&self, auth: &AuthContext) -> Result<DashboardStats> {
        RoleGate::Admin.check(auth.role)?;

        Ok(DashboardStats {
            total_lost: self.count_items(ItemStatus::Lost).await?,
            total_found: self.count_items(ItemStatus::Found).await?,
            total_matched: self.count_items(ItemStatus::Matched).await?,
            total_resolved: self.count_items(ItemStatus::Resolved).await?,
            total_users: Users::find()
                .count(self.db)
                .await
                .context("Failed to get stats")?,
            total_matches: Matches::find()
                .count(self.db)
                .await
                .context("Failed to get stats")?,
        })
    }

    async fn count_items(&self, status: ItemStatus) -> Result<u64> {
        Items::find()
            .filter(items::Column::Status.eq(status))
            .count(self.db)
            .await
            .context("Failed to get stats")
    }

    /// 最近的审计日志
    pub async fn recent_logs(&self, auth: &AuthContext) -> Result<Vec<LogView>> {
        RoleGate::Admin.check(auth.role)?;

        let rows = Logs::find()
            .find_also_related(Users)
            .order_by_desc(logs::Column::Timestamp)
            .order_by_desc(logs::Column::LogId)
            .limit(RECENT_LOG_LIMIT)
            .all(self.db)
            .await
            .context("Failed to get logs")?;

        Ok(rows.into_iter().map(LogView::from).collect())
    }
}
