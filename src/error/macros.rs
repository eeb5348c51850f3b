//! # 错误处理宏

/// 快速创建指定类型错误的宏，例如 `error!(Validation, "...")`
#[macro_export]
macro_rules! error {
    (Validation, $($arg:tt)*) => {
        $crate::error::HealthError::validation(format!($($arg)*))
    };
    (Config, $($arg:tt)*) => {
        $crate::error::HealthError::config(format!($($arg)*))
    };
    (Database, $($arg:tt)*) => {
        $crate::error::HealthError::database(format!($($arg)*))
    };
    (Internal, $($arg:tt)*) => {
        $crate::error::HealthError::internal(format!($($arg)*))
    };
}

/// 立即返回校验错误
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::error!(Validation, $($arg)*))
    };
}

/// 确保条件成立，否则返回校验错误
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($($arg)*);
        }
    };
}

/// 确保条件成立，否则返回配置错误
#[macro_export]
macro_rules! ensure_config {
    ($cond:expr, $($arg:tt)*) => {
        if !($cond) {
            return Err($crate::error!(Config, $($arg)*));
        }
    };
}
