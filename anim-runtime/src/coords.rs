//! # Coords 模块
//!
//! 坐标字符串解析：`"1 2 3"` → `{x, y, z}`，`"1 2 3 4"` → `{x, y, z, w}`。
//!
//! 缺失的分量补 0；`w` 只有在输入给出时才保留。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoordsError;

/// 分量名称（按下标）
pub const AXES: [&str; 4] = ["x", "y", "z", "w"];

/// 坐标记录
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Coords {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f32>,
}

impl Coords {
    /// 创建三维坐标
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: None }
    }

    /// 创建四维坐标
    pub const fn with_w(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w: Some(w) }
    }

    /// 零向量
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// 单位向量 (1, 1, 1)
    pub const fn one() -> Self {
        Self::new(1.0, 1.0, 1.0)
    }

    /// 按下标取分量，越界或缺失的 `w` 返回 0
    pub fn component(&self, index: usize) -> f32 {
        match index {
            0 => self.x,
            1 => self.y,
            2 => self.z,
            3 => self.w.unwrap_or(0.0),
            _ => 0.0,
        }
    }

    /// 从分量切片构造（长度为 4 时保留 `w`）
    pub fn from_components(values: &[f32]) -> Self {
        let get = |i: usize| values.get(i).copied().unwrap_or(0.0);
        Self {
            x: get(0),
            y: get(1),
            z: get(2),
            w: values.get(3).copied(),
        }
    }

    /// 前 `len` 个分量
    pub fn components(&self, len: usize) -> Vec<f32> {
        (0..len.min(4)).map(|i| self.component(i)).collect()
    }

    /// 对每个分量应用同一个函数
    pub fn map(self, f: impl Fn(f32) -> f32) -> Self {
        Self {
            x: f(self.x),
            y: f(self.y),
            z: f(self.z),
            w: self.w.map(&f),
        }
    }

    /// 角度 → 弧度
    pub fn to_radians(self) -> Self {
        self.map(f32::to_radians)
    }

    /// 弧度 → 角度
    pub fn to_degrees(self) -> Self {
        self.map(f32::to_degrees)
    }
}

/// 解析坐标字符串
///
/// 以空白分隔，1 到 4 个分量。
pub fn parse(input: &str) -> Result<Coords, CoordsError> {
    let parts: Vec<&str> = input.split_whitespace().collect();
    if parts.is_empty() {
        return Err(CoordsError::Empty);
    }
    if parts.len() > 4 {
        return Err(CoordsError::TooManyComponents { count: parts.len() });
    }

    let mut values = Vec::with_capacity(parts.len());
    for part in parts {
        let value = part
            .parse::<f32>()
            .map_err(|_| CoordsError::InvalidComponent {
                component: part.to_string(),
            })?;
        values.push(value);
    }

    Ok(Coords::from_components(&values))
}

/// 序列化为坐标字符串
pub fn stringify(coords: &Coords) -> String {
    match coords.w {
        Some(w) => format!("{} {} {} {}", coords.x, coords.y, coords.z, w),
        None => format!("{} {} {}", coords.x, coords.y, coords.z),
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&stringify(self))
    }
}

impl FromStr for Coords {
    type Err = CoordsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl From<(f32, f32, f32)> for Coords {
    fn from((x, y, z): (f32, f32, f32)) -> Self {
        Self::new(x, y, z)
    }
}
