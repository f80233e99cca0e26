//! # 配对服务
//!
//! 管理员把一条失物与一条招领配对，并在物品归还后结案。
//! 配对记录、两件物品的状态与审计日志在同一事务内写入。

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use entity::{
    ItemStatus, Items, MatchStatus, Matches, Users, items, matches, users,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use serde::Deserialize;

use super::views::{MatchView, MatchedItemView, UserSummary};
use crate::{
    audit,
    auth::{AuthContext, RoleGate},
    ensure_valid,
    error::{Context, RegistryError, Result},
};

/// 创建配对请求
#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub lost_item_id: i32,
    pub found_item_id: i32,
}

/// 配对服务
pub struct MatchesService<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> MatchesService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// 创建配对，两件物品变为 `matched`
    ///
    /// 失物必须处于 `lost`，招领必须处于 `found`。
    pub async fn create(
        &self,
        auth: &AuthContext,
        request: &CreateMatchRequest,
    ) -> Result<matches::Model> {
        RoleGate::Admin.check(auth.role)?;
        ensure_valid!(
            request.lost_item_id != request.found_item_id,
            "An item cannot be matched with itself"
        );

        let txn = self.db.begin().await.context("Failed to create match")?;

        let lost = Items::find_by_id(request.lost_item_id)
            .one(&txn)
            .await
            .context("Failed to create match")?;
        let found = Items::find_by_id(request.found_item_id)
            .one(&txn)
            .await
            .context("Failed to create match")?;
        let (Some(lost), Some(found)) = (lost, found) else {
            return Err(RegistryError::not_found("One or both items not found"));
        };

        ensure_valid!(
            lost.status == ItemStatus::Lost,
            "Lost item must have status 'lost' (currently '{}')",
            lost.status
        );
        ensure_valid!(
            found.status == ItemStatus::Found,
            "Found item must have status 'found' (currently '{}')",
            found.status
        );

        let record = matches::ActiveModel {
            lost_item_id: Set(lost.item_id),
            found_item_id: Set(found.item_id),
            verified_by: Set(auth.user_id),
            status: Set(MatchStatus::Matched),
            verified_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(&txn)
        .await
        .context("Failed to create match")?;

        set_items_status(&txn, &[lost.item_id, found.item_id], ItemStatus::Matched)
            .await
            .context("Failed to create match")?;

        audit::record(
            &txn,
            Some(auth.user_id),
            "Items matched",
            Some(format!("Lost: {}, Found: {}", lost.title, found.title)),
        )
        .await
        .context("Failed to create match")?;

        txn.commit().await.context("Failed to create match")?;
        Ok(record)
    }

    /// 全部配对，附带双方物品、物品创建者与核实人
    pub async fn list(&self, auth: &AuthContext) -> Result<Vec<MatchView>> {
        RoleGate::Admin.check(auth.role)?;

        let records = Matches::find()
            .order_by_desc(matches::Column::VerifiedAt)
            .order_by_desc(matches::Column::MatchId)
            .all(self.db)
            .await
            .context("Failed to get matches")?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let item_ids: HashSet<i32> = records
            .iter()
            .flat_map(|m| [m.lost_item_id, m.found_item_id])
            .collect();
        let items: HashMap<i32, MatchedItemView> = Items::find()
            .filter(items::Column::ItemId.is_in(item_ids))
            .find_also_related(Users)
            .all(self.db)
            .await
            .context("Failed to get matches")?
            .into_iter()
            .map(|(item, creator)| {
                (
                    item.item_id,
                    MatchedItemView {
                        creator: creator.as_ref().map(UserSummary::from),
                        item,
                    },
                )
            })
            .collect();

        let verifier_ids: HashSet<i32> = records.iter().map(|m| m.verified_by).collect();
        let verifiers: HashMap<i32, UserSummary> = Users::find()
            .filter(users::Column::UserId.is_in(verifier_ids))
            .all(self.db)
            .await
            .context("Failed to get matches")?
            .iter()
            .map(|user| (user.user_id, UserSummary::from(user)))
            .collect();

        Ok(records
            .into_iter()
            .map(|record| MatchView {
                lost_item: items.get(&record.lost_item_id).cloned(),
                found_item: items.get(&record.found_item_id).cloned(),
                verifier: verifiers.get(&record.verified_by).cloned(),
                record,
            })
            .collect())
    }

    /// 标记已归还，两件物品变为 `resolved`
    pub async fn mark_returned(&self, auth: &AuthContext, match_id: i32) -> Result<matches::Model> {
        RoleGate::Admin.check(auth.role)?;

        let txn = self.db.begin().await.context("Failed to mark as returned")?;

        let record = Matches::find_by_id(match_id)
            .one(&txn)
            .await
            .context("Failed to mark as returned")?
            .ok_or_else(|| RegistryError::not_found("Match not found"))?;

        if record.status == MatchStatus::Returned {
            return Err(RegistryError::conflict("Match already marked as returned"));
        }

        let item_ids = [record.lost_item_id, record.found_item_id];
        let mut active: matches::ActiveModel = record.into();
        active.status = Set(MatchStatus::Returned);
        let record = active
            .update(&txn)
            .await
            .context("Failed to mark as returned")?;

        set_items_status(&txn, &item_ids, ItemStatus::Resolved)
            .await
            .context("Failed to mark as returned")?;

        audit::record(
            &txn,
            Some(auth.user_id),
            "Match marked as returned",
            Some(format!("Match ID: {match_id}")),
        )
        .await
        .context("Failed to mark as returned")?;

        txn.commit().await.context("Failed to mark as returned")?;
        Ok(record)
    }
}

async fn set_items_status(
    txn: &DatabaseTransaction,
    item_ids: &[i32],
    status: ItemStatus,
) -> Result<()> {
    Items::update_many()
        .col_expr(items::Column::Status, Expr::value(status.as_str()))
        .col_expr(items::Column::UpdatedAt, Expr::value(Utc::now().naive_utc()))
        .filter(items::Column::ItemId.is_in(item_ids.iter().copied()))
        .exec(txn)
        .await?;
    Ok(())
}
