//! # 响应视图
//!
//! 在实体模型外附带关联用户信息的序列化结构。

use entity::{items, logs, matches, users};
use serde::Serialize;

/// 物品创建者信息
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CreatorInfo {
    pub user_id: i32,
    pub name: String,
    pub email: String,
}

impl From<&users::Model> for CreatorInfo {
    fn from(user: &users::Model) -> Self {
        Self {
            user_id: user.user_id,
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// 只含姓名与邮箱的用户摘要
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserSummary {
    pub name: String,
    pub email: String,
}

impl From<&users::Model> for UserSummary {
    fn from(user: &users::Model) -> Self {
        Self {
            name: user.name.clone(),
            email: user.email.clone(),
        }
    }
}

/// 带创建者的物品
#[derive(Debug, Clone, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: items::Model,
    pub creator: Option<CreatorInfo>,
}

impl From<(items::Model, Option<users::Model>)> for ItemView {
    fn from((item, creator): (items::Model, Option<users::Model>)) -> Self {
        Self {
            item,
            creator: creator.as_ref().map(CreatorInfo::from),
        }
    }
}

/// 配对记录中的物品，创建者只含姓名与邮箱
#[derive(Debug, Clone, Serialize)]
pub struct MatchedItemView {
    #[serde(flatten)]
    pub item: items::Model,
    pub creator: Option<UserSummary>,
}

/// 带双方物品与核实人的配对记录
#[derive(Debug, Clone, Serialize)]
pub struct MatchView {
    #[serde(flatten)]
    pub record: matches::Model,
    #[serde(rename = "lostItem")]
    pub lost_item: Option<MatchedItemView>,
    #[serde(rename = "foundItem")]
    pub found_item: Option<MatchedItemView>,
    pub verifier: Option<UserSummary>,
}

/// 带操作人的审计日志
#[derive(Debug, Clone, Serialize)]
pub struct LogView {
    #[serde(flatten)]
    pub log: logs::Model,
    pub user: Option<UserSummary>,
}

impl From<(logs::Model, Option<users::Model>)> for LogView {
    fn from((log, user): (logs::Model, Option<users::Model>)) -> Self {
        Self {
            log,
            user: user.as_ref().map(UserSummary::from),
        }
    }
}

/// 管理后台统计
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_lost: u64,
    pub total_found: u64,
    pub total_matched: u64,
    pub total_resolved: u64,
    pub total_users: u64,
    pub total_matches: u64,
}
