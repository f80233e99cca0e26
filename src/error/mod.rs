//! 统一的错误处理

use std::fmt::Display;

pub use types::RegistryError;

/// 全局 `Result` 类型
///
/// 所有可能失败的函数都应返回该类型。
pub type Result<T> = std::result::Result<T, RegistryError>;

pub mod conversion;
pub mod macros;
pub mod types;

/// 为错误附加上下文信息
pub trait Context<T, E> {
    #[track_caller]
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display;

    #[track_caller]
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display;
}

impl<T, E> Context<T, E> for std::result::Result<T, E>
where
    E: Into<RegistryError>,
{
    #[track_caller]
    fn context<C>(self, context: C) -> Result<T>
    where
        C: Display,
    {
        self.with_context(|| context)
    }

    #[track_caller]
    fn with_context<C, F>(self, context: F) -> Result<T>
    where
        F: FnOnce() -> C,
        C: Display,
    {
        match self {
            Ok(value) => Ok(value),
            Err(error) => Err(RegistryError::Context {
                context: context().to_string(),
                source: Box::new(error.into()),
            }),
        }
    }
}

/// 错误归属，用于日志分级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// 客户端导致的错误，对应 4xx
    Client,
    /// 服务端或依赖导致的错误，对应 5xx
    Server,
}

#[cfg(test)]
mod tests;
