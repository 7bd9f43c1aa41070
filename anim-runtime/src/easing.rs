//! # Easing 模块
//!
//! 缓动函数库，用于补间的时间插值。
//!
//! 命名沿用 `easeIn` / `easeOut` / `easeInOut` + 曲线名的约定
//! （例如 `easeInQuad`、`easeOutElastic`），外加 `linear`。
//! `Out` 与 `InOut` 都由 `In` 曲线推导。

use std::f32::consts::PI;
use std::fmt;

/// 缓动曲线族
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EasingCurve {
    Quad,
    Cubic,
    Quart,
    Quint,
    Sine,
    Expo,
    Circ,
    Back,
    /// 弹性曲线，形状受 `elasticity` 影响
    Elastic,
}

impl EasingCurve {
    const ALL: [EasingCurve; 9] = [
        Self::Quad,
        Self::Cubic,
        Self::Quart,
        Self::Quint,
        Self::Sine,
        Self::Expo,
        Self::Circ,
        Self::Back,
        Self::Elastic,
    ];

    /// 曲线名
    pub fn name(&self) -> &'static str {
        match self {
            Self::Quad => "Quad",
            Self::Cubic => "Cubic",
            Self::Quart => "Quart",
            Self::Quint => "Quint",
            Self::Sine => "Sine",
            Self::Expo => "Expo",
            Self::Circ => "Circ",
            Self::Back => "Back",
            Self::Elastic => "Elastic",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.name() == name)
    }

    /// In 方向的曲线
    fn ease_in(&self, t: f32, elasticity: f32) -> f32 {
        match self {
            Self::Quad => t * t,
            Self::Cubic => t * t * t,
            Self::Quart => t.powi(4),
            Self::Quint => t.powi(5),
            Self::Sine => 1.0 - (t * PI / 2.0).cos(),
            Self::Expo => {
                if t == 0.0 {
                    0.0
                } else {
                    2.0_f32.powf(10.0 * t - 10.0)
                }
            }
            Self::Circ => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Self::Back => {
                let c1 = 1.70158;
                let c3 = c1 + 1.0;
                c3 * t * t * t - c1 * t * t
            }
            Self::Elastic => ease_in_elastic(t, elasticity_period(elasticity)),
        }
    }
}

/// 缓动函数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EasingFunction {
    /// 线性（匀速）
    Linear,
    /// 缓入（先慢后快）
    In(EasingCurve),
    /// 缓出（先快后慢）
    Out(EasingCurve),
    /// 缓入缓出（两头慢中间快）
    InOut(EasingCurve),
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::In(EasingCurve::Quad)
    }
}

impl EasingFunction {
    /// 默认缓动名
    pub const DEFAULT_NAME: &'static str = "easeInQuad";

    /// 按名称查找缓动函数
    ///
    /// # 返回
    /// - `Some(easing)`: 名称合法
    /// - `None`: 未知名称
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name == "linear" {
            return Some(Self::Linear);
        }
        // InOut 必须先于 In 匹配
        if let Some(curve) = name.strip_prefix("easeInOut") {
            return EasingCurve::from_name(curve).map(Self::InOut);
        }
        if let Some(curve) = name.strip_prefix("easeIn") {
            return EasingCurve::from_name(curve).map(Self::In);
        }
        if let Some(curve) = name.strip_prefix("easeOut") {
            return EasingCurve::from_name(curve).map(Self::Out);
        }
        None
    }

    /// 缓动名
    pub fn name(&self) -> String {
        match self {
            Self::Linear => "linear".to_string(),
            Self::In(c) => format!("easeIn{}", c.name()),
            Self::Out(c) => format!("easeOut{}", c.name()),
            Self::InOut(c) => format!("easeInOut{}", c.name()),
        }
    }

    /// 计算缓动值
    ///
    /// # 参数
    /// - `t`: 时间进度 (0.0 - 1.0)
    /// - `elasticity`: 弹性参数，只影响 `Elastic` 曲线
    ///
    /// # 返回
    /// - 缓动后的进度值（`Back` / `Elastic` 可能略微越界）
    pub fn apply(&self, t: f32, elasticity: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Self::Linear => t,
            Self::In(c) => c.ease_in(t, elasticity),
            Self::Out(c) => 1.0 - c.ease_in(1.0 - t, elasticity),
            Self::InOut(c) => {
                if t < 0.5 {
                    c.ease_in(t * 2.0, elasticity) / 2.0
                } else {
                    1.0 - c.ease_in(t * -2.0 + 2.0, elasticity) / 2.0
                }
            }
        }
    }
}

impl fmt::Display for EasingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// elasticity (0..=999) → 弹性周期
fn elasticity_period(elasticity: f32) -> f32 {
    let e = elasticity.clamp(0.0, 999.0);
    1.0 - e / 1000.0
}

/// 弹性缓入
fn ease_in_elastic(t: f32, period: f32) -> f32 {
    if t == 0.0 || t == 1.0 {
        return t;
    }
    let shift = period / 4.0;
    -(2.0_f32.powf(10.0 * (t - 1.0))) * (((t - 1.0) - shift) * (2.0 * PI) / period).sin()
}
