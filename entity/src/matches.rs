//! # 配对实体定义
//!
//! 管理员确认的失物/招领配对记录

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 配对状态，只会从 `matched` 前进到 `returned`
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, EnumIter, DeriveActiveEnum,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    #[sea_orm(string_value = "matched")]
    Matched,
    #[sea_orm(string_value = "returned")]
    Returned,
}

impl MatchStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Matched => "matched",
            Self::Returned => "returned",
        }
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 配对实体
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "matches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub match_id: i32,
    pub lost_item_id: i32,
    pub found_item_id: i32,
    pub verified_by: i32,
    pub status: MatchStatus,
    pub verified_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::LostItemId",
        to = "super::items::Column::ItemId",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    LostItem,
    #[sea_orm(
        belongs_to = "super::items::Entity",
        from = "Column::FoundItemId",
        to = "super::items::Column::ItemId",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    FoundItem,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::VerifiedBy",
        to = "super::users::Column::UserId",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    Verifier,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Verifier.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
