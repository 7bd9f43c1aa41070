//! # Tween 模块
//!
//! 补间引擎接口与参考实现。
//!
//! 组件只通过 `TweenEngine` / `TweenHandle` 与补间引擎交互：
//!
//! ```text
//! TweenParams ──create──► Box<dyn TweenHandle>
//!                            │ advance(time_ms)
//!                            ├─► on_update(&[f32])   每次推进都同步调用
//!                            └─► on_complete()       只调用一次
//! ```
//!
//! `Timeline` 是内置的参考引擎；Host 可以注入任何实现了 `TweenEngine` 的引擎。

mod timeline;

use std::fmt;

use crate::easing::EasingFunction;
use crate::schema::{Direction, LoopMode};

pub use timeline::{Timeline, TimelineEngine, TimelineState};

/// 插值回调：按键顺序给出当前值
pub type UpdateCallback = Box<dyn FnMut(&[f32])>;

/// 完成回调
pub type CompleteCallback = Box<dyn FnMut()>;

/// 单个插值键
#[derive(Debug, Clone, PartialEq)]
pub struct TweenKey {
    /// 键名（如 `x`、`opacity`、`r`）
    pub name: String,
    /// 起始值
    pub from: f32,
    /// 结束值
    pub to: f32,
}

impl TweenKey {
    /// 创建插值键
    pub fn new(name: impl Into<String>, from: f32, to: f32) -> Self {
        Self {
            name: name.into(),
            from,
            to,
        }
    }
}

/// 补间引擎配置
pub struct TweenParams {
    /// 插值键
    pub keys: Vec<TweenKey>,
    /// 单轮时长（毫秒）
    pub duration_ms: f64,
    /// 缓动函数
    pub easing: EasingFunction,
    /// 弹性参数
    pub elasticity: f32,
    /// 播放方向
    pub direction: Direction,
    /// 循环模式
    pub loop_mode: LoopMode,
    /// 是否创建后自动播放（组件总是传 `false`，由 `advance` 驱动）
    pub autoplay: bool,
    /// 插值回调
    pub on_update: Option<UpdateCallback>,
    /// 完成回调
    pub on_complete: Option<CompleteCallback>,
}

impl TweenParams {
    /// 创建配置（其余参数取默认值）
    pub fn new(keys: Vec<TweenKey>, duration_ms: f64) -> Self {
        Self {
            keys,
            duration_ms,
            easing: EasingFunction::default(),
            elasticity: 400.0,
            direction: Direction::default(),
            loop_mode: LoopMode::default(),
            autoplay: false,
            on_update: None,
            on_complete: None,
        }
    }

    /// 设置缓动函数与弹性
    pub fn with_easing(mut self, easing: EasingFunction, elasticity: f32) -> Self {
        self.easing = easing;
        self.elasticity = elasticity;
        self
    }

    /// 设置方向与循环
    pub fn with_playback(mut self, direction: Direction, loop_mode: LoopMode) -> Self {
        self.direction = direction;
        self.loop_mode = loop_mode;
        self
    }

    /// 设置插值回调
    pub fn on_update(mut self, callback: impl FnMut(&[f32]) + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    /// 设置完成回调
    pub fn on_complete(mut self, callback: impl FnMut() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    /// 起始值（按键顺序）
    pub fn start_values(&self) -> Vec<f32> {
        self.keys.iter().map(|k| k.from).collect()
    }

    /// 结束值（按键顺序）
    pub fn end_values(&self) -> Vec<f32> {
        self.keys.iter().map(|k| k.to).collect()
    }
}

impl fmt::Debug for TweenParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweenParams")
            .field("keys", &self.keys)
            .field("duration_ms", &self.duration_ms)
            .field("easing", &self.easing)
            .field("elasticity", &self.elasticity)
            .field("direction", &self.direction)
            .field("loop_mode", &self.loop_mode)
            .field("autoplay", &self.autoplay)
            .field("on_update", &self.on_update.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

/// 进行中的补间句柄
///
/// 由组件独占；丢弃句柄即取消补间。
pub trait TweenHandle {
    /// 推进到绝对时间（毫秒，从本次播放开始计）
    ///
    /// 同步调用插值回调；到达终点时调用一次完成回调。
    fn advance(&mut self, time_ms: f64);

    /// 是否已完成
    fn is_completed(&self) -> bool;

    /// 当前值（按键顺序）
    fn current_values(&self) -> Vec<f32>;
}

/// 补间引擎
pub trait TweenEngine {
    /// 根据配置创建补间
    fn create(&self, params: TweenParams) -> Box<dyn TweenHandle>;
}
