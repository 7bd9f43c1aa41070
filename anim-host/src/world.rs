//! # World 模块
//!
//! 参考宿主的主循环：持有场景、事件总线、时钟和所有动画组件。
//!
//! ## 每帧流程
//!
//! ```text
//! step(delta)
//!   ├─ clock.advance(delta)     到期的启动延时入组件收件箱
//!   ├─ settle()                 flush → dispatch，直到没有新信号/事件
//!   ├─ component.tick(t, delta) 推进补间、写回属性
//!   └─ settle()                 分发开始/完成通知
//! ```
//!
//! `settle` 的轮数受 `HostConfig::max_dispatch_rounds` 限制，
//! 互相（或自我）触发的动画不会在一帧内无限循环。

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use tracing::{debug, info, warn};

use anim_runtime::{
    AnimationComponent, AnimationConfig, AnimationNotification, EntityEvent, EntityId,
    EventTarget, HostServices, TimelineEngine,
};

use crate::clock::SimClock;
use crate::config::HostConfig;
use crate::error::{HostError, HostResult};
use crate::events::EventBus;
use crate::scene::Scene;

/// 动画属性名前缀
pub const ANIMATION_ATTRIBUTE: &str = "animation";

/// 多实例分隔符（`animation__spin`）
const INSTANCE_SEPARATOR: &str = "__";

/// 通知日志条目
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NotificationRecord {
    /// 分发时的世界时间（毫秒）
    pub time_ms: f64,
    /// 实体标签
    pub entity: String,
    /// 通知
    #[serde(flatten)]
    pub notification: AnimationNotification,
}

impl fmt::Display for NotificationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}ms {} {} {}",
            self.time_ms,
            self.entity,
            self.notification.event_name(),
            self.notification.name()
        )
    }
}

/// 校验动画实例名：`animation` 或 `animation__<id>`
pub fn validate_instance_name(name: &str) -> HostResult<()> {
    if name == ANIMATION_ATTRIBUTE {
        return Ok(());
    }
    match name
        .strip_prefix(ANIMATION_ATTRIBUTE)
        .and_then(|rest| rest.strip_prefix(INSTANCE_SEPARATOR))
    {
        Some(id) if !id.is_empty() => Ok(()),
        _ => Err(HostError::InvalidInstanceName(name.to_string())),
    }
}

/// 参考宿主世界
pub struct World {
    scene: Rc<Scene>,
    bus: Rc<EventBus>,
    clock: Rc<SimClock>,
    tweens: Rc<TimelineEngine>,
    /// (实体, 实例名) → 组件
    components: BTreeMap<(EntityId, String), AnimationComponent>,
    /// 处于 Host 级暂停的实体
    paused: BTreeSet<EntityId>,
    time_ms: f64,
    max_dispatch_rounds: u32,
    notifications: Vec<NotificationRecord>,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("time_ms", &self.time_ms)
            .field("entities", &self.scene.len())
            .field("components", &self.components.len())
            .finish()
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(&HostConfig::default())
    }
}

impl World {
    /// 创建空世界
    pub fn new(config: &HostConfig) -> Self {
        Self {
            scene: Rc::new(Scene::new()),
            bus: Rc::new(EventBus::new()),
            clock: Rc::new(SimClock::new()),
            tweens: Rc::new(TimelineEngine),
            components: BTreeMap::new(),
            paused: BTreeSet::new(),
            time_ms: 0.0,
            max_dispatch_rounds: config.max_dispatch_rounds.max(1),
            notifications: Vec::new(),
        }
    }

    /// 注入给组件的宿主能力
    pub fn services(&self) -> HostServices {
        HostServices {
            reflection: self.scene.clone(),
            schema: self.scene.clone(),
            events: self.bus.clone(),
            timers: self.clock.clone(),
            tweens: self.tweens.clone(),
        }
    }

    // ========== 场景 ==========

    /// 场景
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// 事件总线
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// 创建实体
    pub fn spawn(&mut self, label: impl Into<String>) -> HostResult<EntityId> {
        self.scene.spawn(label)
    }

    /// 当前世界时间（毫秒）
    pub fn time_ms(&self) -> f64 {
        self.time_ms
    }

    fn label_of(&self, entity: EntityId) -> HostResult<String> {
        self.scene
            .label(entity)
            .ok_or_else(|| HostError::UnknownEntity(entity.to_string()))
    }

    // ========== 动画组件 ==========

    /// 设置动画属性
    ///
    /// 实例不存在时挂载新组件，存在时视为参数变化。
    pub fn attach_animation(
        &mut self,
        entity: EntityId,
        name: &str,
        config: AnimationConfig,
    ) -> HostResult<()> {
        validate_instance_name(name)?;
        let label = self.label_of(entity)?;

        let key = (entity, name.to_string());
        if let Some(component) = self.components.get_mut(&key) {
            component.update(config);
        } else {
            info!(entity = %label, name = %name, property = %config.property, "挂载动画");
            let component = if self.paused.contains(&entity) {
                AnimationComponent::attach_paused(entity, name, config, self.services())
            } else {
                AnimationComponent::attach(entity, name, config, self.services())
            };
            self.components.insert(key, component);
        }

        self.settle();
        Ok(())
    }

    /// 以属性字符串设置动画属性
    pub fn attach_animation_str(
        &mut self,
        entity: EntityId,
        name: &str,
        attributes: &str,
    ) -> HostResult<()> {
        let config = AnimationConfig::parse_attributes(attributes)?;
        self.attach_animation(entity, name, config)
    }

    /// 更新已挂载的动画
    pub fn update_animation(
        &mut self,
        entity: EntityId,
        name: &str,
        config: AnimationConfig,
    ) -> HostResult<()> {
        let label = self.label_of(entity)?;
        let component = self
            .components
            .get_mut(&(entity, name.to_string()))
            .ok_or_else(|| HostError::UnknownAnimation {
                entity: label,
                name: name.to_string(),
            })?;
        component.update(config);
        self.settle();
        Ok(())
    }

    /// 移除动画
    pub fn remove_animation(&mut self, entity: EntityId, name: &str) -> HostResult<()> {
        let label = self.label_of(entity)?;
        let mut component = self
            .components
            .remove(&(entity, name.to_string()))
            .ok_or_else(|| HostError::UnknownAnimation {
                entity: label.clone(),
                name: name.to_string(),
            })?;
        component.remove();
        info!(entity = %label, name = %name, "移除动画");
        Ok(())
    }

    /// 查询组件
    pub fn component(&self, entity: EntityId, name: &str) -> Option<&AnimationComponent> {
        self.components.get(&(entity, name.to_string()))
    }

    /// 实体上的全部动画实例名
    pub fn animation_names(&self, entity: EntityId) -> Vec<String> {
        self.components
            .keys()
            .filter(|(e, _)| *e == entity)
            .map(|(_, name)| name.clone())
            .collect()
    }

    // ========== 事件与生命周期 ==========

    /// 在实体上发送事件并立即分发
    pub fn emit(&mut self, entity: EntityId, event: &str) -> HostResult<()> {
        self.label_of(entity)?;
        self.bus.emit(entity, EntityEvent::new(event));
        self.settle();
        Ok(())
    }

    /// Host 级暂停实体上的全部动画
    pub fn pause_entity(&mut self, entity: EntityId) -> HostResult<()> {
        self.label_of(entity)?;
        if self.paused.insert(entity) {
            for component in self.components_of(entity) {
                component.pause();
            }
        }
        Ok(())
    }

    /// Host 级恢复实体上的全部动画
    pub fn play_entity(&mut self, entity: EntityId) -> HostResult<()> {
        self.label_of(entity)?;
        if self.paused.remove(&entity) {
            for component in self.components_of(entity) {
                component.play();
            }
            self.settle();
        }
        Ok(())
    }

    /// 暂停整个场景
    pub fn pause_all(&mut self) {
        for entity in self.entities_with_components() {
            if self.paused.insert(entity) {
                for component in self.components_of(entity) {
                    component.pause();
                }
            }
        }
    }

    /// 恢复整个场景
    pub fn play_all(&mut self) {
        let paused = std::mem::take(&mut self.paused);
        for entity in paused {
            for component in self.components_of(entity) {
                component.play();
            }
        }
        self.settle();
    }

    /// 实体是否处于 Host 级暂停
    pub fn is_paused(&self, entity: EntityId) -> bool {
        self.paused.contains(&entity)
    }

    fn components_of(
        &mut self,
        entity: EntityId,
    ) -> impl Iterator<Item = &mut AnimationComponent> {
        self.components
            .iter_mut()
            .filter(move |((e, _), _)| *e == entity)
            .map(|(_, component)| component)
    }

    fn entities_with_components(&self) -> Vec<EntityId> {
        let mut entities: Vec<EntityId> = self.components.keys().map(|(e, _)| *e).collect();
        entities.dedup();
        entities
    }

    /// 推进一帧
    ///
    /// 启动延时在本帧内到期的动画，只计入到期之后的时间。
    pub fn step(&mut self, delta_ms: f64) {
        let delta_ms = delta_ms.max(0.0);
        self.time_ms += delta_ms;

        self.clock.advance(delta_ms);
        self.settle();

        for component in self.components.values_mut() {
            component.tick(self.time_ms, delta_ms);
        }
        self.settle();
    }

    /// 处理组件信号并分发事件，直到没有新活动或达到轮数上限
    ///
    /// # 返回
    /// 实际执行的轮数
    pub fn settle(&mut self) -> u32 {
        let mut rounds = 0;
        loop {
            let handled: usize = self
                .components
                .values_mut()
                .map(|c| c.flush_triggers())
                .sum();
            let delivered = self.bus.dispatch_pending();
            self.record(&delivered);

            if handled == 0 && delivered.is_empty() {
                break;
            }
            rounds += 1;
            if rounds >= self.max_dispatch_rounds {
                let pending_signals: usize =
                    self.components.values().map(|c| c.pending_signals()).sum();
                if pending_signals > 0 || self.bus.pending() > 0 {
                    warn!(
                        rounds,
                        pending_signals,
                        pending_events = self.bus.pending(),
                        "事件分发达到轮数上限，剩余事件留到下一帧"
                    );
                }
                break;
            }
        }
        rounds
    }

    fn record(&mut self, delivered: &[(EntityId, EntityEvent)]) {
        for (entity, event) in delivered {
            let Some(notification) = AnimationNotification::from_event(event) else {
                continue;
            };
            let entity = self
                .scene
                .label(*entity)
                .unwrap_or_else(|| entity.to_string());
            debug!(time_ms = self.time_ms, entity = %entity, event = %event.name, "动画通知");
            self.notifications.push(NotificationRecord {
                time_ms: self.time_ms,
                entity,
                notification,
            });
        }
    }

    // ========== 报告 ==========

    /// 已分发的动画通知
    pub fn notifications(&self) -> &[NotificationRecord] {
        &self.notifications
    }

    /// 通知日志（每行一条）
    pub fn notification_log(&self) -> String {
        self.notifications
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
