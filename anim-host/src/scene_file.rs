//! # Scene File 模块
//!
//! JSON 场景描述：实体、属性声明、动画属性与时间脚本。
//!
//! ```json
//! {
//!   "entities": [
//!     {
//!       "id": "box",
//!       "position": "0 0 0",
//!       "properties": { "material.opacity": { "kind": "scalar", "value": "1" } },
//!       "animations": {
//!         "animation": "property: position; to: 1 2 3; dur: 1000",
//!         "animation__fade": { "property": "material.opacity", "to": "0", "startEvents": "fade" }
//!       }
//!     }
//!   ],
//!   "script": [
//!     { "at_ms": 500, "action": "emit", "entity": "box", "event": "fade" }
//!   ]
//! }
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use anim_runtime::{AnimationConfig, Coords, PropertyKind, PropertyValue, SchemaError, coords};

use crate::error::{HostError, HostResult};
use crate::transform::Transform;
use crate::world::{World, validate_instance_name};

/// 场景文件
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SceneFile {
    /// 场景名（仅用于日志）
    #[serde(default)]
    pub name: String,
    /// 实体列表
    #[serde(default)]
    pub entities: Vec<EntitySpec>,
    /// 时间脚本
    #[serde(default)]
    pub script: Vec<ScriptStep>,
}

/// 实体描述
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntitySpec {
    /// 实体标签
    pub id: String,
    /// 初始位置
    #[serde(default)]
    pub position: Option<String>,
    /// 初始旋转（角度）
    #[serde(default)]
    pub rotation: Option<String>,
    /// 初始缩放
    #[serde(default)]
    pub scale: Option<String>,
    /// 组件属性声明
    #[serde(default)]
    pub properties: BTreeMap<String, PropertySpec>,
    /// 动画属性（实例名 → 参数）
    #[serde(default)]
    pub animations: BTreeMap<String, AnimationSpec>,
}

/// 属性声明
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySpec {
    /// 声明类型
    #[serde(default)]
    pub kind: PropertyKind,
    /// 初始值
    pub value: String,
}

/// 动画参数：属性字符串或 JSON 对象
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnimationSpec {
    /// `"property: position; to: 1 2 3"`
    Attributes(String),
    /// `{ "property": "position", "to": "1 2 3" }`
    Config(AnimationConfig),
}

impl AnimationSpec {
    /// 解析为动画配置
    pub fn to_config(&self) -> Result<AnimationConfig, SchemaError> {
        match self {
            Self::Attributes(text) => AnimationConfig::parse_attributes(text),
            Self::Config(config) => Ok(config.clone()),
        }
    }
}

/// 时间脚本条目
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptStep {
    /// 执行时间（毫秒，世界时间）
    pub at_ms: f64,
    /// 动作
    #[serde(flatten)]
    pub action: ScriptAction,
}

/// 脚本动作
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ScriptAction {
    /// 在实体上发送事件
    Emit { entity: String, event: String },
    /// Host 级暂停（不指定实体时暂停整个场景）
    Pause {
        #[serde(default)]
        entity: Option<String>,
    },
    /// Host 级恢复（不指定实体时恢复整个场景）
    Play {
        #[serde(default)]
        entity: Option<String>,
    },
    /// 移除动画实例
    Remove { entity: String, animation: String },
    /// 设置动画实例参数（不存在时挂载）
    Set {
        entity: String,
        animation: String,
        attributes: AnimationSpec,
    },
}

impl ScriptAction {
    /// 动作引用的实体
    pub fn entity(&self) -> Option<&str> {
        match self {
            Self::Emit { entity, .. }
            | Self::Remove { entity, .. }
            | Self::Set { entity, .. } => Some(entity.as_str()),
            Self::Pause { entity } | Self::Play { entity } => entity.as_deref(),
        }
    }

    /// 在世界中执行
    pub fn apply(&self, world: &mut World) -> HostResult<()> {
        match self {
            Self::Emit { entity, event } => {
                let id = world.scene().require(entity)?;
                world.emit(id, event)
            }
            Self::Pause { entity: Some(entity) } => {
                let id = world.scene().require(entity)?;
                world.pause_entity(id)
            }
            Self::Pause { entity: None } => {
                world.pause_all();
                Ok(())
            }
            Self::Play { entity: Some(entity) } => {
                let id = world.scene().require(entity)?;
                world.play_entity(id)
            }
            Self::Play { entity: None } => {
                world.play_all();
                Ok(())
            }
            Self::Remove { entity, animation } => {
                let id = world.scene().require(entity)?;
                world.remove_animation(id, animation)
            }
            Self::Set {
                entity,
                animation,
                attributes,
            } => {
                let id = world.scene().require(entity)?;
                world.attach_animation(id, animation, attributes.to_config()?)
            }
        }
    }
}

impl SceneFile {
    /// 从文件加载
    pub fn load(path: impl AsRef<Path>) -> HostResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| HostError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&content)
    }

    /// 从 JSON 字符串解析
    pub fn parse(content: &str) -> HostResult<Self> {
        serde_json::from_str(content).map_err(|e| HostError::SceneFormat(e.to_string()))
    }

    /// 不创建世界的静态检查
    ///
    /// 检查实体标签唯一、属性初始值、动画实例名与参数、脚本引用的实体。
    pub fn validate(&self) -> HostResult<()> {
        let mut labels: Vec<&str> = Vec::with_capacity(self.entities.len());

        for entity in &self.entities {
            if labels.contains(&entity.id.as_str()) {
                return Err(HostError::DuplicateEntity(entity.id.clone()));
            }
            labels.push(&entity.id);

            entity.initial_transform()?;
            for (path, prop) in &entity.properties {
                PropertyValue::parse_as(prop.kind, &prop.value).map_err(|source| {
                    HostError::InvalidProperty {
                        path: path.clone(),
                        source,
                    }
                })?;
            }
            for (name, spec) in &entity.animations {
                validate_instance_name(name)?;
                spec.to_config()?;
            }
        }

        for step in &self.script {
            if let Some(entity) = step.action.entity()
                && !labels.contains(&entity)
            {
                return Err(HostError::UnknownEntity(entity.to_string()));
            }
            if let ScriptAction::Set {
                animation,
                attributes,
                ..
            } = &step.action
            {
                validate_instance_name(animation)?;
                attributes.to_config()?;
            }
        }

        Ok(())
    }

    /// 在世界中创建实体、声明属性并挂载动画
    pub fn instantiate(&self, world: &mut World) -> HostResult<()> {
        for spec in &self.entities {
            let id = world.spawn(spec.id.as_str())?;
            world.scene().set_transform(id, spec.initial_transform()?);
            for (path, prop) in &spec.properties {
                world.scene().declare(id, path, prop.kind, &prop.value)?;
            }
        }

        // 属性全部声明后再挂载，动画构造时能读到声明类型与初始值
        for spec in &self.entities {
            let id = world.scene().require(&spec.id)?;
            for (name, animation) in &spec.animations {
                world.attach_animation(id, name, animation.to_config()?)?;
            }
        }

        Ok(())
    }

    /// 按执行时间排序的脚本（同一时间保持文件顺序）
    pub fn sorted_script(&self) -> Vec<ScriptStep> {
        let mut steps = self.script.clone();
        steps.sort_by(|a, b| a.at_ms.total_cmp(&b.at_ms));
        steps
    }
}

impl EntitySpec {
    /// 初始变换
    pub fn initial_transform(&self) -> HostResult<Transform> {
        let parse = |text: &Option<String>, default: Coords| -> HostResult<Coords> {
            match text {
                Some(text) => Ok(coords::parse(text).map_err(anim_runtime::AnimError::from)?),
                None => Ok(default),
            }
        };

        Ok(Transform {
            position: parse(&self.position, Coords::zero())?,
            rotation: parse(&self.rotation, Coords::zero())?.to_radians(),
            scale: parse(&self.scale, Coords::one())?,
        })
    }
}
