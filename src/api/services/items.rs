//! # 物品服务
//!
//! 物品的登记、查询、修改与删除。修改与删除只允许创建者本人，
//! 管理员的跨用户操作见 [`super::admin`]。

use chrono::Utc;
use entity::{
    ItemStatus, items, items::Entity as Items, matches, matches::Entity as Matches,
    users::Entity as Users,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Deserialize;

use super::views::ItemView;
use crate::{
    api::extract::ItemFields,
    audit,
    auth::AuthContext,
    ensure_permitted,
    error::{Context, RegistryError, Result},
};

/// 文本字段的最大长度
const TITLE_MAX: usize = 200;
const CATEGORY_MAX: usize = 50;
const LOCATION_MAX: usize = 200;

/// 物品列表过滤条件，空字符串视为未提供
#[derive(Debug, Default, Deserialize)]
pub struct ItemListQuery {
    pub status: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
}

/// 修改结果，附带被替换掉的旧图片地址
#[derive(Debug)]
pub struct ItemUpdate {
    pub item: items::Model,
    pub replaced_image: Option<String>,
}

/// 物品服务
pub struct ItemsService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> ItemsService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 登记失物或招领
    pub async fn create(
        &self,
        auth: &AuthContext,
        fields: &ItemFields,
        image_url: Option<String>,
    ) -> Result<items::Model> {
        let title = required(fields.title.as_deref(), "title", TITLE_MAX)?;
        let description = required(fields.description.as_deref(), "description", usize::MAX)?;
        let category = required(fields.category.as_deref(), "category", CATEGORY_MAX)?;
        let location = required(fields.location.as_deref(), "location", LOCATION_MAX)?;
        let status = required(fields.status.as_deref(), "status", usize::MAX)?;
        let status = ItemStatus::parse(&status)
            .filter(ItemStatus::is_reportable)
            .ok_or_else(|| {
                RegistryError::validation_field("Status must be either 'lost' or 'found'", "status")
            })?;

        let now = Utc::now().naive_utc();
        let item = items::ActiveModel {
            title: Set(title.clone()),
            description: Set(description),
            category: Set(category),
            image_url: Set(image_url),
            location: Set(location),
            status: Set(status),
            created_by: Set(auth.user_id),
            date_reported: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .context("Failed to create item")?;

        audit::record(
            self.db,
            Some(auth.user_id),
            format!("Item {status} reported"),
            Some(format!("Item: {title}")),
        )
        .await
        .context("Failed to create item")?;

        Ok(item)
    }

    /// 公开列表，最新登记在前
    pub async fn list(&self, query: &ItemListQuery) -> Result<Vec<ItemView>> {
        let mut select = Items::find();

        if let Some(status) = non_blank(query.status.as_deref()) {
            let status = ItemStatus::parse(status).ok_or_else(|| {
                RegistryError::validation_field(
                    "Status must be one of: lost, found, matched, resolved",
                    "status",
                )
            })?;
            select = select.filter(items::Column::Status.eq(status));
        }

        if let Some(category) = non_blank(query.category.as_deref()) {
            select = select.filter(items::Column::Category.eq(category));
        }

        if let Some(search) = non_blank(query.search.as_deref()) {
            let pattern = format!("%{search}%");
            select = select.filter(
                Condition::any()
                    .add(items::Column::Title.like(pattern.as_str()))
                    .add(items::Column::Description.like(pattern.as_str())),
            );
        }

        let rows = select
            .find_also_related(Users)
            .order_by_desc(items::Column::DateReported)
            .order_by_desc(items::Column::ItemId)
            .all(self.db)
            .await
            .context("Failed to get items")?;

        Ok(rows.into_iter().map(ItemView::from).collect())
    }

    /// 单个物品及其创建者
    pub async fn get(&self, item_id: i32) -> Result<ItemView> {
        Items::find_by_id(item_id)
            .find_also_related(Users)
            .one(self.db)
            .await
            .context("Failed to get item")?
            .map(ItemView::from)
            .ok_or_else(item_not_found)
    }

    /// 当前用户登记的物品
    pub async fn list_mine(&self, auth: &AuthContext) -> Result<Vec<items::Model>> {
        Items::find()
            .filter(items::Column::CreatedBy.eq(auth.user_id))
            .order_by_desc(items::Column::DateReported)
            .order_by_desc(items::Column::ItemId)
            .all(self.db)
            .await
            .context("Failed to get items")
    }

    /// 创建者修改文本字段或图片，缺省与空白字段保持原值
    pub async fn update(
        &self,
        auth: &AuthContext,
        item_id: i32,
        fields: &ItemFields,
        image_url: Option<String>,
    ) -> Result<ItemUpdate> {
        let item = self.find(item_id, "Failed to update item").await?;
        ensure_permitted!(auth.owns(item.created_by), "Not authorized to update this item");

        let title = optional(fields.title.as_deref(), "title", TITLE_MAX)?;
        let description = optional(fields.description.as_deref(), "description", usize::MAX)?;
        let category = optional(fields.category.as_deref(), "category", CATEGORY_MAX)?;
        let location = optional(fields.location.as_deref(), "location", LOCATION_MAX)?;

        let replaced_image = if image_url.is_some() {
            item.image_url.clone()
        } else {
            None
        };

        let mut active: items::ActiveModel = item.into();
        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(description) = description {
            active.description = Set(description);
        }
        if let Some(category) = category {
            active.category = Set(category);
        }
        if let Some(location) = location {
            active.location = Set(location);
        }
        if let Some(image_url) = image_url {
            active.image_url = Set(Some(image_url));
        }
        active.updated_at = Set(Utc::now().naive_utc());

        let item = active.update(self.db).await.context("Failed to update item")?;

        audit::record(
            self.db,
            Some(auth.user_id),
            "Item updated",
            Some(format!("Item: {}", item.title)),
        )
        .await
        .context("Failed to update item")?;

        Ok(ItemUpdate {
            item,
            replaced_image,
        })
    }

    /// 创建者删除自己的物品
    pub async fn delete(&self, auth: &AuthContext, item_id: i32) -> Result<items::Model> {
        let item = self.find(item_id, "Failed to delete item").await?;
        ensure_permitted!(auth.owns(item.created_by), "Not authorized to delete this item");

        remove_item(self.db, &item, auth.user_id, "Item deleted").await?;
        Ok(item)
    }

    async fn find(&self, item_id: i32, context: &'static str) -> Result<items::Model> {
        Items::find_by_id(item_id)
            .one(self.db)
            .await
            .context(context)?
            .ok_or_else(item_not_found)
    }
}

/// 删除物品并写审计日志
///
/// 引用检查、删除与审计在同一事务内；仍被配对记录引用的物品不可删除。
pub(super) async fn remove_item(
    db: &DatabaseConnection,
    item: &items::Model,
    user_id: i32,
    action: &str,
) -> Result<()> {
    let txn = db.begin().await.context("Failed to delete item")?;

    let references = Matches::find()
        .filter(
            Condition::any()
                .add(matches::Column::LostItemId.eq(item.item_id))
                .add(matches::Column::FoundItemId.eq(item.item_id)),
        )
        .count(&txn)
        .await
        .context("Failed to delete item")?;
    if references > 0 {
        return Err(RegistryError::conflict(
            "Item is part of a match and cannot be deleted",
        ));
    }

    item.clone()
        .delete(&txn)
        .await
        .context("Failed to delete item")?;

    audit::record(
        &txn,
        Some(user_id),
        action,
        Some(format!("Deleted item: {}", item.title)),
    )
    .await
    .context("Failed to delete item")?;

    txn.commit().await.context("Failed to delete item")?;
    Ok(())
}

pub(super) fn item_not_found() -> RegistryError {
    RegistryError::not_found("Item not found")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// 必填文本字段
fn required(value: Option<&str>, field: &str, max_len: usize) -> Result<String> {
    optional(value, field, max_len)?
        .ok_or_else(|| RegistryError::validation_field(format!("{field} is required"), field))
}

/// 可选文本字段，空白视为未提供
fn optional(value: Option<&str>, field: &str, max_len: usize) -> Result<Option<String>> {
    let Some(value) = non_blank(value) else {
        return Ok(None);
    };
    if value.chars().count() > max_len {
        return Err(RegistryError::validation_field(
            format!("{field} must be at most {max_len} characters"),
            field,
        ));
    }
    Ok(Some(value.to_string()))
}
