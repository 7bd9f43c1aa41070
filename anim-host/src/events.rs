//! # Events 模块
//!
//! 延迟分发的实体事件总线。
//!
//! `emit` 只入队；`dispatch_pending` 把当前队列中的事件依次交给监听器。
//! 分发过程中新产生的事件留到下一轮，由 World 循环分发直到没有新事件。

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use tracing::trace;

use anim_runtime::{EntityEvent, EntityId, EventTarget, Listener, SubscriptionId};

struct Subscription {
    id: SubscriptionId,
    entity: EntityId,
    event: String,
    listener: Listener,
}

/// 事件总线
#[derive(Default)]
pub struct EventBus {
    subscriptions: RefCell<Vec<Subscription>>,
    next_id: Cell<u64>,
    queue: RefCell<VecDeque<(EntityId, EntityEvent)>>,
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.borrow().len())
            .field("queued", &self.queue.borrow().len())
            .finish()
    }
}

impl EventBus {
    /// 创建空总线
    pub fn new() -> Self {
        Self::default()
    }

    /// 分发当前队列中的全部事件
    ///
    /// # 返回
    /// 本轮分发的事件（按发送顺序）
    pub fn dispatch_pending(&self) -> Vec<(EntityId, EntityEvent)> {
        let batch: Vec<(EntityId, EntityEvent)> = self.queue.borrow_mut().drain(..).collect();

        for (entity, event) in &batch {
            // 先收集监听器再调用，监听器内可以继续 emit / subscribe
            let listeners: Vec<Listener> = self
                .subscriptions
                .borrow()
                .iter()
                .filter(|s| s.entity == *entity && s.event == event.name)
                .map(|s| s.listener.clone())
                .collect();

            trace!(entity = %entity, event = %event.name, listeners = listeners.len(), "分发事件");
            for listener in listeners {
                listener(event);
            }
        }

        batch
    }

    /// 队列中待分发的事件数
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// 当前订阅总数
    pub fn listener_count(&self) -> usize {
        self.subscriptions.borrow().len()
    }

    /// 实体上某事件的订阅数
    pub fn listeners_for(&self, entity: EntityId, event: &str) -> usize {
        self.subscriptions
            .borrow()
            .iter()
            .filter(|s| s.entity == entity && s.event == event)
            .count()
    }
}

impl EventTarget for EventBus {
    fn subscribe(&self, entity: EntityId, event: &str, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.subscriptions.borrow_mut().push(Subscription {
            id,
            entity,
            event: event.to_string(),
            listener,
        });
        id
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.borrow_mut();
        let before = subscriptions.len();
        subscriptions.retain(|s| s.id != id);
        subscriptions.len() != before
    }

    fn emit(&self, entity: EntityId, event: EntityEvent) {
        self.queue.borrow_mut().push_back((entity, event));
    }
}
