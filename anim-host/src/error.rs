//! # Error 模块
//!
//! 参考宿主的错误类型。

use thiserror::Error;

use anim_runtime::{AnimError, SchemaError};

/// 宿主错误
#[derive(Debug, Error)]
pub enum HostError {
    /// 实体不存在
    #[error("实体不存在: {0}")]
    UnknownEntity(String),

    /// 实体标签重复
    #[error("实体标签重复: {0}")]
    DuplicateEntity(String),

    /// 动画实例不存在
    #[error("实体 {entity} 上没有动画实例 '{name}'")]
    UnknownAnimation { entity: String, name: String },

    /// 动画实例名不合法
    #[error("动画实例名必须是 'animation' 或 'animation__<id>': '{0}'")]
    InvalidInstanceName(String),

    /// 属性初始值无效
    #[error("属性 '{path}' 的初始值无效: {source}")]
    InvalidProperty {
        path: String,
        #[source]
        source: AnimError,
    },

    /// 动画属性解析失败
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// 值解析失败
    #[error(transparent)]
    Anim(#[from] AnimError),

    /// 场景文件读取失败
    #[error("无法读取场景文件 {path}: {message}")]
    Io { path: String, message: String },

    /// 场景文件格式错误
    #[error("场景文件格式错误: {0}")]
    SceneFormat(String),
}

/// 宿主操作结果类型
pub type HostResult<T> = Result<T, HostError>;
