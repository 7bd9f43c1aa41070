//! # Anim Runtime
//!
//! 场景图实体的声明式属性动画组件。
//!
//! ## 架构概述
//!
//! `anim-runtime` 是纯逻辑核心，不持有场景、事件循环或时钟。
//! 它通过 [`HostServices`] 中的一组能力接口与宿主层（Host）协作：
//!
//! ```text
//! Host                                   Runtime
//!   │                                       │
//!   │── attach / update / pause / play ───►│ AnimationComponent
//!   │── tick(time, delta) ────────────────►│   ├─ builder  ─► TweenParams
//!   │                                       │   ├─ wiring   ─► 触发事件订阅
//!   │◄── PropertyReflection::set ──────────│   └─ tween    ─► Timeline
//!   │◄── EventTarget::emit(animationbegin) ─│
//! ```
//!
//! ## 使用示例
//!
//! ```ignore
//! use anim_runtime::{AnimationComponent, AnimationConfig};
//!
//! let config = AnimationConfig::parse_attributes("property: position; to: 1 2 3; dur: 1000")?;
//! let mut component = AnimationComponent::attach(entity, "animation", config, services);
//!
//! loop {
//!     // Host 分发事件、推进计时器后
//!     component.flush_triggers();
//!     component.tick(time, delta);
//! }
//! ```
//!
//! ## 模块结构
//!
//! - [`coords`]：空格分隔的坐标解析
//! - [`value`]：属性类型与属性值
//! - [`schema`]：动画配置（属性字符串 / JSON）
//! - [`easing`]：缓动函数
//! - [`tween`]：补间引擎接口与时间轴实现
//! - [`host`]：宿主能力接口
//! - [`events`]：开始 / 完成通知
//! - [`wiring`]：触发事件订阅与信号收件箱
//! - [`builder`]：补间配置构造
//! - [`component`]：组件生命周期

pub mod builder;
pub mod component;
pub mod coords;
pub mod easing;
pub mod error;
pub mod events;
pub mod host;
pub mod schema;
pub mod tween;
pub mod value;
pub mod wiring;

#[cfg(test)]
mod test_support;

// 重导出核心类型
pub use builder::{BuiltTween, build};
pub use component::{AnimationComponent, AnimationState, PlayState};
pub use coords::Coords;
pub use easing::{EasingCurve, EasingFunction};
pub use error::{AnimError, AnimResult, CoordsError, SchemaError};
pub use events::{ANIMATION_BEGIN, ANIMATION_COMPLETE, AnimationNotification};
pub use host::{
    EntityEvent, EntityId, EventTarget, HostServices, Listener, PropertyReflection,
    SchemaIntrospection, SubscriptionId, TimerCallback, TimerScheduler,
};
pub use schema::{AnimationConfig, Direction, LoopMode};
pub use tween::{Timeline, TimelineEngine, TweenEngine, TweenHandle, TweenKey, TweenParams};
pub use value::{PropertyKind, PropertyValue, Rgb, TransformChannel};
pub use wiring::{Generation, Signal, SignalInbox, TriggerKind, TriggerSubscriptions};
