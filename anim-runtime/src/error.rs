//! # Error 模块
//!
//! 定义 anim-runtime 中使用的错误类型。
//!
//! 动画组件本身不向 Host 报告错误（空属性、无法解析的值都会静默回退），
//! 这里的错误只出现在 Host 侧的属性校验与坐标解析中。

use thiserror::Error;

/// 坐标字符串解析错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoordsError {
    /// 空字符串
    #[error("坐标字符串为空")]
    Empty,

    /// 分量不是数字
    #[error("坐标分量 '{component}' 不是有效数字")]
    InvalidComponent { component: String },

    /// 分量数量超过 4
    #[error("坐标分量过多：最多 4 个，实际 {count} 个")]
    TooManyComponents { count: usize },
}

/// 动画属性（schema）校验错误
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    /// 未知属性名
    #[error("未知的动画属性 '{key}'")]
    UnknownAttribute { key: String },

    /// 属性值无效
    #[error("属性 '{key}' 的值无效 - {message}")]
    InvalidValue { key: String, message: String },

    /// 声明片段缺少 `:`
    #[error("无效的属性声明 '{segment}'，应为 'key: value'")]
    MalformedDeclaration { segment: String },

    /// JSON 格式错误
    #[error("JSON 解析失败 - {message}")]
    Json { message: String },
}

/// anim-runtime 统一错误类型
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimError {
    /// 坐标解析错误
    #[error("坐标解析错误: {0}")]
    Coords(#[from] CoordsError),

    /// 属性校验错误
    #[error("属性校验错误: {0}")]
    Schema(#[from] SchemaError),
}

/// Result 类型别名
pub type AnimResult<T> = Result<T, AnimError>;
