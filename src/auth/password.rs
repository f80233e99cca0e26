//! # 密码哈希

use crate::error::{Context, Result};

/// 使用 bcrypt 计算密码哈希
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    bcrypt::hash(password, cost).context("Failed to hash password")
}

/// 校验密码，哈希格式损坏时返回错误
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash).context("Failed to verify password")
}
