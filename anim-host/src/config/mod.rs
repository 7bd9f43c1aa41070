//! # Config 模块
//!
//! 参考宿主的运行配置。
//!
//! ## 配置优先级
//!
//! 1. 命令行参数（最高）
//! 2. 配置文件 (anim-host.json)
//! 3. 默认值（最低）

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// 默认配置文件名
pub const DEFAULT_CONFIG_FILE: &str = "anim-host.json";

/// 宿主配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    /// 每帧时长（毫秒）
    #[serde(default = "default_frame_ms")]
    pub frame_ms: f64,

    /// 单帧内事件分发的最大轮数
    ///
    /// 动画的通知可能触发其它动画（甚至自身）的重启，
    /// 超过该轮数后剩余事件留到下一帧。
    #[serde(default = "default_max_dispatch_rounds")]
    pub max_dispatch_rounds: u32,

    /// 日志级别（trace/debug/info/warn/error）
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// `run` 未指定帧数时运行的帧数
    #[serde(default = "default_frames")]
    pub default_frames: u32,
}

// 默认值函数
fn default_frame_ms() -> f64 {
    16.0
}

fn default_max_dispatch_rounds() -> u32 {
    8
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_frames() -> u32 {
    120
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            frame_ms: default_frame_ms(),
            max_dispatch_rounds: default_max_dispatch_rounds(),
            log_level: default_log_level(),
            default_frames: default_frames(),
        }
    }
}

impl HostConfig {
    /// 加载配置文件
    ///
    /// 如果文件不存在或解析失败，返回默认配置并记录警告。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        if !path.exists() {
            warn!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => {
                    info!(path = %path.display(), "配置文件加载成功");
                    config
                }
                Err(e) => {
                    warn!(error = %e, "配置文件解析失败，使用默认配置");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(error = %e, "配置文件读取失败，使用默认配置");
                Self::default()
            }
        }
    }

    /// 保存配置到文件
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ConfigError::SerializationFailed(e.to_string()))?;

        fs::write(path, json).map_err(|e| ConfigError::IoError(e.to_string()))?;

        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.frame_ms.is_finite() || self.frame_ms <= 0.0 {
            return Err(ConfigError::ValidationFailed(format!(
                "frame_ms 必须是正数: {}",
                self.frame_ms
            )));
        }

        if self.max_dispatch_rounds == 0 {
            return Err(ConfigError::ValidationFailed(
                "max_dispatch_rounds 至少为 1".to_string(),
            ));
        }

        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::ValidationFailed(format!(
                "未知日志级别: {}",
                self.log_level
            )));
        }

        Ok(())
    }
}

/// 配置错误
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// 序列化失败
    #[error("配置序列化失败: {0}")]
    SerializationFailed(String),
    /// IO 错误
    #[error("配置 IO 错误: {0}")]
    IoError(String),
    /// 验证失败
    #[error("配置验证失败: {0}")]
    ValidationFailed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HostConfig::default();
        assert_eq!(config.frame_ms, 16.0);
        assert_eq!(config.max_dispatch_rounds, 8);
        assert_eq!(config.log_level, "info");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: HostConfig = serde_json::from_str(r#"{ "frame_ms": 10 }"#).unwrap();
        assert_eq!(config.frame_ms, 10.0);
        assert_eq!(config.default_frames, 120);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = HostConfig {
            frame_ms: 0.0,
            ..HostConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationFailed(_))
        ));

        let config = HostConfig {
            log_level: "loud".to_string(),
            ..HostConfig::default()
        };
        assert!(config.validate().is_err());

        let config = HostConfig {
            max_dispatch_rounds: 0,
            ..HostConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let config = HostConfig::load("/nonexistent/anim-host.json");
        assert_eq!(config, HostConfig::default());
    }
}
