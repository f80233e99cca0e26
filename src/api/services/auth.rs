//! # 账号服务
//!
//! 注册、登录、当前用户查询，以及超级管理员调整角色。

use chrono::Utc;
use entity::{UserRole, users, users::Entity as Users};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::{
    audit,
    auth::{
        AuthContext, JwtManager, RoleGate,
        password::{hash_password, verify_password},
    },
    ensure_valid,
    error::{Context, RegistryError, Result},
};

/// 密码最小长度
pub const MIN_PASSWORD_LEN: usize = 6;

/// 注册请求
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// 登录请求
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 修改角色请求
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// 登录成功后返回的会话
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub token: String,
    pub user: users::Model,
}

/// 账号服务
pub struct AuthService<'a> {
    db: &'a DatabaseConnection,
    jwt: &'a JwtManager,
    bcrypt_cost: u32,
}

impl<'a> AuthService<'a> {
    #[must_use]
    pub const fn new(db: &'a DatabaseConnection, jwt: &'a JwtManager, bcrypt_cost: u32) -> Self {
        Self {
            db,
            jwt,
            bcrypt_cost,
        }
    }

    /// 注册学生账号并签发令牌
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthSession> {
        let name = request.name.trim();
        let email = normalize_email(&request.email);

        ensure_valid!(!name.is_empty(), "Name is required");
        ensure_valid!(name.chars().count() <= 100, "Name must be at most 100 characters");
        ensure_valid!(is_plausible_email(&email), "A valid email is required");
        ensure_valid!(email.len() <= 100, "Email must be at most 100 characters");
        ensure_valid!(
            request.password.chars().count() >= MIN_PASSWORD_LEN,
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        );

        let existing = Users::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(self.db)
            .await
            .context("Failed to register user")?;
        if existing.is_some() {
            return Err(RegistryError::conflict("Email already registered"));
        }

        let password_hash = hash_password(&request.password, self.bcrypt_cost)?;
        let user = users::ActiveModel {
            name: Set(name.to_string()),
            email: Set(email.clone()),
            password_hash: Set(password_hash),
            role: Set(UserRole::Student),
            created_at: Set(Utc::now().naive_utc()),
            ..Default::default()
        }
        .insert(self.db)
        .await
        .context("Failed to register user")?;

        audit::record(
            self.db,
            Some(user.user_id),
            "User registered",
            Some(format!("Email: {email}")),
        )
        .await
        .context("Failed to register user")?;

        self.session_for(user)
    }

    /// 校验邮箱与密码并签发令牌
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthSession> {
        let email = normalize_email(&request.email);
        let user = Users::find()
            .filter(users::Column::Email.eq(email.as_str()))
            .one(self.db)
            .await
            .context("Failed to log in")?
            .ok_or_else(invalid_credentials)?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(invalid_credentials());
        }

        self.session_for(user)
    }

    /// 当前登录用户
    pub async fn me(&self, auth: &AuthContext) -> Result<users::Model> {
        Users::find_by_id(auth.user_id)
            .one(self.db)
            .await
            .context("Failed to fetch user")?
            .ok_or_else(|| RegistryError::not_found("User not found"))
    }

    /// 调整用户角色，仅超级管理员可用且不能修改自己
    pub async fn update_role(
        &self,
        auth: &AuthContext,
        user_id: i32,
        request: &UpdateRoleRequest,
    ) -> Result<users::Model> {
        RoleGate::SuperAdmin.check(auth.role)?;

        let role = UserRole::parse(request.role.trim()).ok_or_else(|| {
            RegistryError::validation_field(
                "Role must be one of: student, admin, super_admin",
                "role",
            )
        })?;
        ensure_valid!(user_id != auth.user_id, "Cannot change your own role");

        let user = Users::find_by_id(user_id)
            .one(self.db)
            .await
            .context("Failed to update role")?
            .ok_or_else(|| RegistryError::not_found("User not found"))?;

        let mut active: users::ActiveModel = user.into();
        active.role = Set(role);
        let user = active.update(self.db).await.context("Failed to update role")?;

        audit::record(
            self.db,
            Some(auth.user_id),
            format!("User role updated to {role}"),
            Some(format!("User ID: {}, Email: {}", user.user_id, user.email)),
        )
        .await
        .context("Failed to update role")?;

        Ok(user)
    }

    fn session_for(&self, user: users::Model) -> Result<AuthSession> {
        let token = self.jwt.generate_token(user.user_id, user.role)?;
        Ok(AuthSession { token, user })
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn is_plausible_email(email: &str) -> bool {
    email
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !email.contains(' ')
        })
}

fn invalid_credentials() -> RegistryError {
    RegistryError::authentication("Invalid email or password")
}
