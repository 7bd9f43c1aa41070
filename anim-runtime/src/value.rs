//! # Value 模块
//!
//! 属性值与属性类型。
//!
//! - `PropertyKind`: schema 声明的属性类型，每次重建配置时解析一次
//! - `PropertyValue`: 属性反射 API 读写的值
//! - `TransformChannel`: 三个规范变换通道（position / rotation / scale）

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::coords::{self, AXES, Coords};
use crate::error::{AnimResult, CoordsError};

/// 属性类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// 单个数值（也是未知类型的回退）
    #[default]
    Scalar,
    /// 二维向量
    Vector2,
    /// 三维向量
    Vector3,
    /// 四维向量
    Vector4,
    /// 颜色（按 r/g/b 三个通道插值）
    Color,
}

impl PropertyKind {
    /// 向量分量数（非向量返回 `None`）
    pub fn vector_len(&self) -> Option<usize> {
        match self {
            Self::Vector2 => Some(2),
            Self::Vector3 => Some(3),
            Self::Vector4 => Some(4),
            Self::Scalar | Self::Color => None,
        }
    }

    /// 是否为向量类型
    pub fn is_vector(&self) -> bool {
        self.vector_len().is_some()
    }

    /// 向量类型的分量名
    pub fn axis_names(&self) -> &'static [&'static str] {
        match self.vector_len() {
            Some(len) => &AXES[..len],
            None => &[],
        }
    }
}

/// 8 位 RGB 颜色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// 创建颜色
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// 解析 `#rrggbb` 或 `#rgb`
    pub fn parse_hex(input: &str) -> Option<Self> {
        let hex = input.trim().strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |s: &str| u8::from_str_radix(s, 16).ok();
        match hex.len() {
            6 => Some(Self::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            3 => {
                let expand = |i: usize| channel(&hex[i..i + 1]).map(|v| v * 17);
                Some(Self::new(expand(0)?, expand(1)?, expand(2)?))
            }
            _ => None,
        }
    }

    /// 输出 `#rrggbb`
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// 三个通道（0-255 浮点）
    pub fn channels(&self) -> [f32; 3] {
        [self.r as f32, self.g as f32, self.b as f32]
    }

    /// 从插值后的通道值构造（四舍五入并截断到 0-255）
    pub fn from_channels(values: &[f32]) -> Self {
        let get = |i: usize| {
            let v = values.get(i).copied().unwrap_or(0.0);
            v.round().clamp(0.0, 255.0) as u8
        };
        Self::new(get(0), get(1), get(2))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// 属性值
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// 数值
    Number(f32),
    /// 向量
    Vector(Coords),
    /// 颜色
    Color(Rgb),
    /// 字符串
    Text(String),
    /// 布尔值
    Bool(bool),
}

impl PropertyValue {
    /// 按指定类型解析字符串
    pub fn parse_as(kind: PropertyKind, text: &str) -> AnimResult<Self> {
        let value = match kind {
            PropertyKind::Scalar => {
                let trimmed = text.trim();
                match trimmed.parse::<f32>() {
                    Ok(n) => Self::Number(n),
                    Err(_) => match trimmed {
                        "true" => Self::Bool(true),
                        "false" => Self::Bool(false),
                        _ => Self::Text(trimmed.to_string()),
                    },
                }
            }
            PropertyKind::Vector2 | PropertyKind::Vector3 | PropertyKind::Vector4 => {
                Self::Vector(coords::parse(text)?)
            }
            PropertyKind::Color => match Rgb::parse_hex(text) {
                Some(rgb) => Self::Color(rgb),
                None => {
                    return Err(CoordsError::InvalidComponent {
                        component: text.to_string(),
                    }
                    .into());
                }
            },
        };
        Ok(value)
    }

    /// 数值视图
    pub fn as_number(&self) -> Option<f32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Self::Text(s) => s.trim().parse().ok(),
            Self::Vector(_) | Self::Color(_) => None,
        }
    }

    /// 向量视图
    pub fn as_coords(&self) -> Option<Coords> {
        match self {
            Self::Vector(c) => Some(*c),
            Self::Text(s) => coords::parse(s).ok(),
            _ => None,
        }
    }

    /// 颜色视图
    pub fn as_color(&self) -> Option<Rgb> {
        match self {
            Self::Color(c) => Some(*c),
            Self::Text(s) => Rgb::parse_hex(s),
            _ => None,
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Vector(c) => write!(f, "{}", c),
            Self::Color(c) => write!(f, "{}", c),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{}", b),
        }
    }
}

/// 规范变换通道
///
/// 这三个属性走快速路径：直接写入实体变换，不经过属性反射。
/// `Rotation` 在变换中以弧度存储。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformChannel {
    Position,
    Rotation,
    Scale,
}

impl TransformChannel {
    /// 从属性路径识别（只匹配完整的 `position` / `rotation` / `scale`）
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "position" => Some(Self::Position),
            "rotation" => Some(Self::Rotation),
            "scale" => Some(Self::Scale),
            _ => None,
        }
    }

    /// 属性名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Rotation => "rotation",
            Self::Scale => "scale",
        }
    }
}
