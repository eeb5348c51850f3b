//! # 错误类型定义

use thiserror::Error;

use super::ErrorCategory;

/// 健康状态子系统的主要错误类型
#[derive(Debug, Error)]
pub enum HealthError {
    /// 配置相关错误
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 数据库相关错误（查询、连接、迁移）
    #[error("数据库错误: {message}")]
    Database {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 持久化写入/删除失败，缓存已回滚到写入前的状态
    #[error("持久化失败: {operation} {key}")]
    Persistence {
        operation: &'static str,
        key: String,
        #[source]
        source: anyhow::Error,
    },

    /// 启动阶段加载健康状态失败
    #[error("启动加载失败: {message}")]
    Startup {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 参数或状态校验失败
    #[error("校验错误: {message}")]
    Validation { message: String },

    /// 系统内部错误
    #[error("内部错误: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO相关错误
    #[error("IO错误: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// 序列化/反序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        message: String,
        #[source]
        source: anyhow::Error,
    },

    /// 附加了上下文的错误
    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<HealthError>,
    },
}

impl HealthError {
    /// 将错误转换为HTTP状态码和错误代码
    #[must_use]
    pub fn to_response_parts(&self) -> (u16, &'static str) {
        match self {
            Self::Config { .. } => (500, "CONFIG_ERROR"),
            Self::Database { .. } => (500, "DATABASE_ERROR"),
            Self::Persistence { .. } => (500, "PERSISTENCE_ERROR"),
            Self::Startup { .. } => (500, "STARTUP_ERROR"),
            Self::Validation { .. } => (400, "VALIDATION_ERROR"),
            Self::Internal { .. } => (500, "INTERNAL_ERROR"),
            Self::Io { .. } => (500, "IO_ERROR"),
            Self::Serialization { .. } => (400, "SERIALIZATION_ERROR"),
            Self::Context { source, .. } => source.to_response_parts(),
        }
    }

    /// 错误归类，用于日志告警
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        if self.to_response_parts().0 < 500 {
            ErrorCategory::Client
        } else {
            ErrorCategory::Server
        }
    }

    /// 剥离上下文包装，返回最内层的错误
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::Context { source, .. } => source.root(),
            other => other,
        }
    }

    /// 创建配置错误
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的配置错误
    pub fn config_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建数据库错误
    pub fn database<T: Into<String>>(message: T) -> Self {
        Self::Database {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的数据库错误
    pub fn database_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Database {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建持久化错误
    pub fn persistence<K: ToString, E: Into<anyhow::Error>>(
        operation: &'static str,
        key: K,
        source: E,
    ) -> Self {
        Self::Persistence {
            operation,
            key: key.to_string(),
            source: source.into(),
        }
    }

    /// 创建带来源的启动错误
    pub fn startup_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Startup {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建校验错误
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// 创建内部错误
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }
}

// 自动转换常见错误类型
impl From<std::io::Error> for HealthError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: "文件操作失败".to_string(),
            source: err,
        }
    }
}

impl From<toml::de::Error> for HealthError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML解析失败", err)
    }
}

impl From<serde_json::Error> for HealthError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            message: "JSON处理失败".to_string(),
            source: err.into(),
        }
    }
}

impl From<sea_orm::error::DbErr> for HealthError {
    fn from(err: sea_orm::error::DbErr) -> Self {
        Self::database_with_source("数据库操作失败", err)
    }
}
