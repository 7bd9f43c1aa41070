//! 单元测试用的内存宿主。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::coords::Coords;
use crate::events::AnimationNotification;
use crate::host::{
    EntityEvent, EntityId, EventTarget, HostServices, Listener, PropertyReflection,
    SchemaIntrospection, SubscriptionId, TimerCallback, TimerScheduler,
};
use crate::tween::{TimelineEngine, TweenEngine, TweenHandle, TweenParams};
use crate::value::{PropertyKind, PropertyValue, TransformChannel};

#[derive(Default)]
struct MockEntity {
    position: Coords,
    rotation: Coords,
    scale: Coords,
    properties: HashMap<String, (PropertyKind, PropertyValue)>,
}

struct PendingTimer {
    due: f64,
    callback: TimerCallback,
}

/// 内存宿主：实体、事件、计时器、计数补间引擎
#[derive(Default)]
pub struct MockHost {
    entities: RefCell<HashMap<EntityId, MockEntity>>,
    next_entity: Cell<u64>,
    listeners: RefCell<Vec<(SubscriptionId, EntityId, String, Listener)>>,
    next_subscription: Cell<u64>,
    emitted: RefCell<Vec<(EntityId, EntityEvent)>>,
    now: Cell<f64>,
    timers: RefCell<Vec<PendingTimer>>,
    reflection_writes: Cell<usize>,
    live_handles: Rc<Cell<usize>>,
    created_handles: Cell<usize>,
    last_params: RefCell<Option<String>>,
}

impl MockHost {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn services(self: &Rc<Self>) -> HostServices {
        HostServices {
            reflection: self.clone(),
            schema: self.clone(),
            events: self.clone(),
            timers: self.clone(),
            tweens: self.clone(),
        }
    }

    pub fn spawn(&self) -> EntityId {
        let id = EntityId(self.next_entity.get() + 1);
        self.next_entity.set(id.0);
        self.entities.borrow_mut().insert(
            id,
            MockEntity {
                scale: Coords::one(),
                ..MockEntity::default()
            },
        );
        id
    }

    pub fn declare(&self, entity: EntityId, path: &str, kind: PropertyKind, text: &str) {
        let value = PropertyValue::parse_as(kind, text).unwrap();
        self.entities
            .borrow_mut()
            .get_mut(&entity)
            .unwrap()
            .properties
            .insert(path.to_string(), (kind, value));
    }

    pub fn value(&self, entity: EntityId, path: &str) -> Option<PropertyValue> {
        self.get(entity, path)
    }

    pub fn set_transform(&self, entity: EntityId, channel: TransformChannel, value: Coords) {
        self.set_transform_channel(entity, channel, value);
    }

    pub fn transform(&self, entity: EntityId, channel: TransformChannel) -> Coords {
        self.transform_channel(entity, channel).unwrap()
    }

    pub fn reflection_writes(&self) -> usize {
        self.reflection_writes.get()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    /// 同步分发一个外部事件
    pub fn fire(&self, entity: EntityId, name: &str) {
        let event = EntityEvent::new(name);
        let targets: Vec<Listener> = self
            .listeners
            .borrow()
            .iter()
            .filter(|(_, e, n, _)| *e == entity && n == name)
            .map(|(_, _, _, l)| l.clone())
            .collect();
        for listener in targets {
            listener(&event);
        }
    }

    pub fn notifications(&self) -> Vec<AnimationNotification> {
        self.emitted
            .borrow()
            .iter()
            .filter_map(|(_, e)| AnimationNotification::from_event(e))
            .collect()
    }

    /// 推进虚拟时钟并触发到期的计时器
    pub fn advance_clock(&self, delta_ms: f64) {
        let now = self.now.get() + delta_ms;
        self.now.set(now);

        let due: Vec<PendingTimer> = {
            let mut timers = self.timers.borrow_mut();
            let (due, pending) = timers.drain(..).partition(|t| t.due <= now);
            *timers = pending;
            due
        };
        for timer in due {
            (timer.callback)(now - timer.due);
        }
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.borrow().len()
    }

    pub fn live_handles(&self) -> usize {
        self.live_handles.get()
    }

    pub fn created_handles(&self) -> usize {
        self.created_handles.get()
    }

    pub fn last_params(&self) -> Option<String> {
        self.last_params.borrow().clone()
    }

    fn with_channel<R>(
        &self,
        entity: EntityId,
        channel: TransformChannel,
        f: impl FnOnce(&mut Coords) -> R,
    ) -> Option<R> {
        let mut entities = self.entities.borrow_mut();
        let e = entities.get_mut(&entity)?;
        let slot = match channel {
            TransformChannel::Position => &mut e.position,
            TransformChannel::Rotation => &mut e.rotation,
            TransformChannel::Scale => &mut e.scale,
        };
        Some(f(slot))
    }
}

impl PropertyReflection for MockHost {
    fn get(&self, entity: EntityId, path: &str) -> Option<PropertyValue> {
        if let Some(channel) = TransformChannel::from_path(path) {
            let raw = self.transform_channel(entity, channel)?;
            let value = if channel == TransformChannel::Rotation {
                raw.to_degrees()
            } else {
                raw
            };
            return Some(PropertyValue::Vector(value));
        }
        let entities = self.entities.borrow();
        entities
            .get(&entity)?
            .properties
            .get(path)
            .map(|(_, v)| v.clone())
    }

    fn set(&self, entity: EntityId, path: &str, value: PropertyValue) -> bool {
        self.reflection_writes.set(self.reflection_writes.get() + 1);
        let mut entities = self.entities.borrow_mut();
        let Some(e) = entities.get_mut(&entity) else {
            return false;
        };
        let kind = e
            .properties
            .get(path)
            .map(|(k, _)| *k)
            .unwrap_or_default();
        e.properties.insert(path.to_string(), (kind, value));
        true
    }

    fn transform_channel(&self, entity: EntityId, channel: TransformChannel) -> Option<Coords> {
        self.with_channel(entity, channel, |slot| *slot)
    }

    fn set_transform_channel(
        &self,
        entity: EntityId,
        channel: TransformChannel,
        value: Coords,
    ) -> bool {
        self.with_channel(entity, channel, |slot| *slot = value)
            .is_some()
    }
}

impl SchemaIntrospection for MockHost {
    fn property_kind(&self, entity: EntityId, path: &str) -> PropertyKind {
        if TransformChannel::from_path(path).is_some() {
            return PropertyKind::Vector3;
        }
        self.entities
            .borrow()
            .get(&entity)
            .and_then(|e| e.properties.get(path).map(|(k, _)| *k))
            .unwrap_or_default()
    }
}

impl EventTarget for MockHost {
    fn subscribe(&self, entity: EntityId, event: &str, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.get() + 1);
        self.next_subscription.set(id.0);
        self.listeners
            .borrow_mut()
            .push((id, entity, event.to_string(), listener));
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|(sid, _, _, _)| *sid != id);
        listeners.len() != before
    }

    fn emit(&self, entity: EntityId, event: EntityEvent) {
        self.emitted.borrow_mut().push((entity, event));
    }
}

impl TimerScheduler for MockHost {
    fn schedule_once(&self, delay_ms: f64, callback: TimerCallback) {
        self.timers.borrow_mut().push(PendingTimer {
            due: self.now.get() + delay_ms,
            callback,
        });
    }
}

/// 记录存活数的补间句柄
struct CountedHandle {
    inner: Box<dyn TweenHandle>,
    live: Rc<Cell<usize>>,
}

impl TweenHandle for CountedHandle {
    fn advance(&mut self, time_ms: f64) {
        self.inner.advance(time_ms);
    }

    fn is_completed(&self) -> bool {
        self.inner.is_completed()
    }

    fn current_values(&self) -> Vec<f32> {
        self.inner.current_values()
    }
}

impl Drop for CountedHandle {
    fn drop(&mut self) {
        self.live.set(self.live.get() - 1);
    }
}

impl TweenEngine for MockHost {
    fn create(&self, params: TweenParams) -> Box<dyn TweenHandle> {
        *self.last_params.borrow_mut() = Some(format!("{:?}", params.keys));
        self.created_handles.set(self.created_handles.get() + 1);
        self.live_handles.set(self.live_handles.get() + 1);
        Box::new(CountedHandle {
            inner: TimelineEngine.create(params),
            live: self.live_handles.clone(),
        })
    }
}
