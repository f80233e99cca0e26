//! # 角色分级
//!
//! 接口按两个等级设卡：管理员（admin、super_admin）与超级管理员。

use entity::UserRole;

use crate::error::{RegistryError, Result};

/// 路由等级
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleGate {
    /// admin 或 super_admin
    Admin,
    /// 仅 super_admin
    SuperAdmin,
}

impl RoleGate {
    /// 角色是否满足该等级
    #[must_use]
    pub const fn allows(self, role: UserRole) -> bool {
        match self {
            Self::Admin => role.is_admin(),
            Self::SuperAdmin => role.is_super_admin(),
        }
    }

    /// 拒绝时返回给客户端的消息
    #[must_use]
    pub const fn denial_message(self) -> &'static str {
        match self {
            Self::Admin => "Access denied. Admin privileges required.",
            Self::SuperAdmin => "Access denied. Super Admin privileges required.",
        }
    }

    /// 校验角色，不满足时返回权限错误
    pub fn check(self, role: UserRole) -> Result<()> {
        if self.allows(role) {
            Ok(())
        } else {
            Err(RegistryError::permission(self.denial_message()))
        }
    }
}
