//! # 错误处理宏

/// 快速创建校验错误的宏
#[macro_export]
macro_rules! validation_error {
    ($msg:expr) => {
        $crate::error::RegistryError::validation($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::error::RegistryError::validation(format!($fmt, $($arg)*))
    };
}

/// 确保条件成立，否则返回校验错误
#[macro_export]
macro_rules! ensure_valid {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::validation_error!($msg));
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::validation_error!($fmt, $($arg)*));
        }
    };
}

/// 确保条件成立，否则返回权限错误
#[macro_export]
macro_rules! ensure_permitted {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::error::RegistryError::permission($msg));
        }
    };
}
