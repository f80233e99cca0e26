//! # Entity 模块
//!
//! 包含失物招领登记系统的全部 Sea-ORM 实体定义

pub mod items;
pub mod logs;
pub mod matches;
pub mod users;

pub use items::Entity as Items;
pub use logs::Entity as Logs;
pub use matches::Entity as Matches;
pub use users::Entity as Users;

pub use items::ItemStatus;
pub use matches::MatchStatus;
pub use users::UserRole;
