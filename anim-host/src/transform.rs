//! # Transform 模块
//!
//! 实体变换状态：位置、旋转、缩放。

use anim_runtime::{Coords, TransformChannel};

/// 变换状态
///
/// 旋转以弧度存储；场景文件与报告中使用角度。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    /// 位置
    pub position: Coords,
    /// 旋转（弧度）
    pub rotation: Coords,
    /// 缩放因子
    pub scale: Coords,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Coords::zero(),
            rotation: Coords::zero(),
            scale: Coords::one(),
        }
    }
}

impl Transform {
    /// 创建默认变换（原点、无旋转、单位缩放）
    pub fn identity() -> Self {
        Self::default()
    }

    /// 创建只有位置的变换
    pub fn with_position(position: Coords) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// 创建只有旋转的变换（角度）
    pub fn with_rotation_degrees(degrees: Coords) -> Self {
        Self {
            rotation: degrees.to_radians(),
            ..Self::default()
        }
    }

    /// 读取通道
    pub fn channel(&self, channel: TransformChannel) -> Coords {
        match channel {
            TransformChannel::Position => self.position,
            TransformChannel::Rotation => self.rotation,
            TransformChannel::Scale => self.scale,
        }
    }

    /// 写入通道
    pub fn set_channel(&mut self, channel: TransformChannel, value: Coords) {
        match channel {
            TransformChannel::Position => self.position = value,
            TransformChannel::Rotation => self.rotation = value,
            TransformChannel::Scale => self.scale = value,
        }
    }

    /// 旋转（角度）
    pub fn rotation_degrees(&self) -> Coords {
        self.rotation.to_degrees()
    }
}
