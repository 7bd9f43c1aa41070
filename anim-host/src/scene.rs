//! # Scene 模块
//!
//! 内存场景图：实体、变换、组件属性。
//!
//! 实现组件需要的 `PropertyReflection` 与 `SchemaIntrospection`。
//! 所有方法接收 `&self`，组件的补间回调与 World 共享同一个 `Rc<Scene>`。

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use anim_runtime::{
    Coords, EntityId, PropertyKind, PropertyReflection, PropertyValue, SchemaIntrospection,
    TransformChannel,
};

use crate::error::{HostError, HostResult};
use crate::transform::Transform;

/// 已声明的属性
#[derive(Debug, Clone, PartialEq)]
struct DeclaredProperty {
    kind: PropertyKind,
    value: PropertyValue,
}

/// 场景中的实体
#[derive(Debug, Clone, Default)]
struct EntityNode {
    label: String,
    transform: Transform,
    properties: BTreeMap<String, DeclaredProperty>,
}

/// 实体状态快照（用于报告）
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    /// 实体标签
    pub id: String,
    /// 位置
    pub position: String,
    /// 旋转（角度）
    pub rotation: String,
    /// 缩放
    pub scale: String,
    /// 其它属性
    pub properties: BTreeMap<String, String>,
}

/// 内存场景
#[derive(Debug, Default)]
pub struct Scene {
    entities: RefCell<BTreeMap<EntityId, EntityNode>>,
    next_id: Cell<u64>,
}

impl Scene {
    /// 创建空场景
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建实体
    ///
    /// # 参数
    /// - `label`: 场景内唯一的实体标签
    pub fn spawn(&self, label: impl Into<String>) -> HostResult<EntityId> {
        let label = label.into();
        if self.find(&label).is_some() {
            return Err(HostError::DuplicateEntity(label));
        }

        let id = EntityId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.entities.borrow_mut().insert(
            id,
            EntityNode {
                label,
                ..EntityNode::default()
            },
        );
        Ok(id)
    }

    /// 按标签查找实体
    pub fn find(&self, label: &str) -> Option<EntityId> {
        self.entities
            .borrow()
            .iter()
            .find(|(_, node)| node.label == label)
            .map(|(id, _)| *id)
    }

    /// 按标签查找实体，不存在时返回错误
    pub fn require(&self, label: &str) -> HostResult<EntityId> {
        self.find(label)
            .ok_or_else(|| HostError::UnknownEntity(label.to_string()))
    }

    /// 实体标签
    pub fn label(&self, entity: EntityId) -> Option<String> {
        self.entities
            .borrow()
            .get(&entity)
            .map(|node| node.label.clone())
    }

    /// 实体数量
    pub fn len(&self) -> usize {
        self.entities.borrow().len()
    }

    /// 是否没有实体
    pub fn is_empty(&self) -> bool {
        self.entities.borrow().is_empty()
    }

    /// 声明组件属性及其初始值
    ///
    /// # 参数
    /// - `path`: 属性路径（如 `material.opacity`）
    /// - `kind`: 声明类型
    /// - `text`: 初始值字符串
    pub fn declare(
        &self,
        entity: EntityId,
        path: &str,
        kind: PropertyKind,
        text: &str,
    ) -> HostResult<()> {
        let value =
            PropertyValue::parse_as(kind, text).map_err(|source| HostError::InvalidProperty {
                path: path.to_string(),
                source,
            })?;

        let mut entities = self.entities.borrow_mut();
        let node = entities
            .get_mut(&entity)
            .ok_or_else(|| HostError::UnknownEntity(entity.to_string()))?;
        node.properties
            .insert(path.to_string(), DeclaredProperty { kind, value });
        Ok(())
    }

    /// 读取变换
    pub fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.entities.borrow().get(&entity).map(|node| node.transform)
    }

    /// 替换变换
    pub fn set_transform(&self, entity: EntityId, transform: Transform) -> bool {
        match self.entities.borrow_mut().get_mut(&entity) {
            Some(node) => {
                node.transform = transform;
                true
            }
            None => false,
        }
    }

    /// 当前全部实体的快照（按创建顺序）
    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        self.entities
            .borrow()
            .values()
            .map(|node| EntitySnapshot {
                id: node.label.clone(),
                position: format_coords(node.transform.position),
                rotation: format_coords(node.transform.rotation_degrees()),
                scale: format_coords(node.transform.scale),
                properties: node
                    .properties
                    .iter()
                    .map(|(path, prop)| (path.clone(), prop.value.to_string()))
                    .collect(),
            })
            .collect()
    }
}

/// 报告中的坐标：保留 3 位小数并去掉多余的 0
fn format_coords(coords: Coords) -> String {
    coords
        .components(if coords.w.is_some() { 4 } else { 3 })
        .iter()
        .map(|v| {
            let rounded = (v * 1000.0).round() / 1000.0;
            // 避免输出 -0
            if rounded == 0.0 {
                "0".to_string()
            } else {
                rounded.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// 按写入值推断未声明属性的类型
fn infer_kind(value: &PropertyValue) -> PropertyKind {
    match value {
        PropertyValue::Vector(c) if c.w.is_some() => PropertyKind::Vector4,
        PropertyValue::Vector(_) => PropertyKind::Vector3,
        PropertyValue::Color(_) => PropertyKind::Color,
        PropertyValue::Number(_) | PropertyValue::Text(_) | PropertyValue::Bool(_) => {
            PropertyKind::Scalar
        }
    }
}

impl PropertyReflection for Scene {
    fn get(&self, entity: EntityId, path: &str) -> Option<PropertyValue> {
        let entities = self.entities.borrow();
        let node = entities.get(&entity)?;

        if let Some(channel) = TransformChannel::from_path(path) {
            let value = match channel {
                TransformChannel::Rotation => node.transform.rotation_degrees(),
                other => node.transform.channel(other),
            };
            return Some(PropertyValue::Vector(value));
        }

        node.properties.get(path).map(|prop| prop.value.clone())
    }

    fn set(&self, entity: EntityId, path: &str, value: PropertyValue) -> bool {
        let mut entities = self.entities.borrow_mut();
        let Some(node) = entities.get_mut(&entity) else {
            return false;
        };

        if let Some(channel) = TransformChannel::from_path(path) {
            let Some(coords) = value.as_coords() else {
                return false;
            };
            let coords = if channel == TransformChannel::Rotation {
                coords.to_radians()
            } else {
                coords
            };
            node.transform.set_channel(channel, coords);
            return true;
        }

        trace!(entity = %entity, path = %path, value = %value, "属性写入");
        match node.properties.get_mut(path) {
            Some(prop) => prop.value = value,
            None => {
                let kind = infer_kind(&value);
                node.properties
                    .insert(path.to_string(), DeclaredProperty { kind, value });
            }
        }
        true
    }

    fn transform_channel(&self, entity: EntityId, channel: TransformChannel) -> Option<Coords> {
        self.entities
            .borrow()
            .get(&entity)
            .map(|node| node.transform.channel(channel))
    }

    fn set_transform_channel(
        &self,
        entity: EntityId,
        channel: TransformChannel,
        value: Coords,
    ) -> bool {
        match self.entities.borrow_mut().get_mut(&entity) {
            Some(node) => {
                node.transform.set_channel(channel, value);
                true
            }
            None => false,
        }
    }
}

impl SchemaIntrospection for Scene {
    fn property_kind(&self, entity: EntityId, path: &str) -> PropertyKind {
        if TransformChannel::from_path(path).is_some() {
            return PropertyKind::Vector3;
        }
        self.entities
            .borrow()
            .get(&entity)
            .and_then(|node| node.properties.get(path))
            .map(|prop| prop.kind)
            .unwrap_or_default()
    }
}
