//! # Events 模块
//!
//! 组件在实体上发出的通知。

use serde::Serialize;

use crate::host::EntityEvent;

/// 动画开始事件名
pub const ANIMATION_BEGIN: &str = "animationbegin";

/// 动画完成事件名
pub const ANIMATION_COMPLETE: &str = "animationcomplete";

/// 动画通知
///
/// `name` 是产生通知的属性实例名（如 `animation`、`animation__spin`）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnimationNotification {
    /// 动画开始
    Begin { name: String },
    /// 动画完成
    Complete { name: String },
}

impl AnimationNotification {
    /// 事件名
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::Begin { .. } => ANIMATION_BEGIN,
            Self::Complete { .. } => ANIMATION_COMPLETE,
        }
    }

    /// 属性实例名
    pub fn name(&self) -> &str {
        match self {
            Self::Begin { name } | Self::Complete { name } => name,
        }
    }

    /// 从实体事件还原（非动画通知返回 `None`）
    pub fn from_event(event: &EntityEvent) -> Option<Self> {
        let name = event.detail.clone()?;
        match event.name.as_str() {
            ANIMATION_BEGIN => Some(Self::Begin { name }),
            ANIMATION_COMPLETE => Some(Self::Complete { name }),
            _ => None,
        }
    }
}

impl From<AnimationNotification> for EntityEvent {
    fn from(value: AnimationNotification) -> Self {
        let name = value.event_name();
        match value {
            AnimationNotification::Begin { name: detail }
            | AnimationNotification::Complete { name: detail } => {
                EntityEvent::with_detail(name, detail)
            }
        }
    }
}
