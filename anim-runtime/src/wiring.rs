//! # Wiring 模块
//!
//! 触发事件订阅与组件信号收件箱。
//!
//! 监听器从不直接调用组件：它们只把信号压入组件的收件箱，
//! 由 Host 在分发完事件/计时器后调用 `AnimationComponent::flush_triggers` 统一处理。
//! 这样即使组件在发送通知时，同一通知又触发了它自己的重启，也不会重入。

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::host::{EntityEvent, EntityId, EventTarget, SubscriptionId};
use crate::schema::AnimationConfig;

/// 重建代号
///
/// 每次重建配置加一；延时回调捕获登记时的代号，触发时必须仍然匹配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Generation(pub u64);

impl Generation {
    /// 下一代
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// 触发类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Start,
    Pause,
    Resume,
    Restart,
}

impl TriggerKind {
    /// 全部触发类型
    pub const ALL: [TriggerKind; 4] = [Self::Start, Self::Pause, Self::Resume, Self::Restart];

    /// 配置中对应的事件名列表
    pub fn event_names<'a>(&self, config: &'a AnimationConfig) -> &'a [String] {
        match self {
            Self::Start => &config.start_events,
            Self::Pause => &config.pause_events,
            Self::Resume => &config.resume_events,
            Self::Restart => &config.restart_events,
        }
    }
}

/// 组件信号
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// 命名触发事件
    Trigger(TriggerKind),
    /// 启动延时到期（`overdue_ms` 为触发时超过到期时间的毫秒数）
    DelayElapsed {
        generation: Generation,
        overdue_ms: f64,
    },
    /// 补间完成
    Completed(Generation),
}

/// 信号收件箱
#[derive(Debug, Clone, Default)]
pub struct SignalInbox {
    queue: Rc<RefCell<VecDeque<Signal>>>,
}

impl SignalInbox {
    /// 创建空收件箱
    pub fn new() -> Self {
        Self::default()
    }

    /// 压入信号
    pub fn push(&self, signal: Signal) {
        self.queue.borrow_mut().push_back(signal);
    }

    /// 取出最早的信号
    pub fn pop(&self) -> Option<Signal> {
        self.queue.borrow_mut().pop_front()
    }

    /// 待处理信号数
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// 清空
    pub fn clear(&self) {
        self.queue.borrow_mut().clear();
    }
}

/// 一组触发事件订阅
///
/// 持有 `EventTarget::subscribe` 返回的句柄，重建、Host 暂停和移除时整体退订。
#[derive(Debug, Default)]
pub struct TriggerSubscriptions {
    ids: Vec<SubscriptionId>,
}

impl TriggerSubscriptions {
    /// 订阅配置中的四组触发事件
    pub fn attach(
        events: &dyn EventTarget,
        entity: EntityId,
        config: &AnimationConfig,
        inbox: &SignalInbox,
    ) -> Self {
        let mut ids = Vec::new();

        for kind in TriggerKind::ALL {
            for name in kind.event_names(config) {
                let inbox = inbox.clone();
                let id = events.subscribe(
                    entity,
                    name,
                    Rc::new(move |_: &EntityEvent| inbox.push(Signal::Trigger(kind))),
                );
                ids.push(id);
            }
        }

        Self { ids }
    }

    /// 退订全部
    ///
    /// # 返回
    /// 实际移除的订阅数
    pub fn detach(&mut self, events: &dyn EventTarget) -> usize {
        self.ids
            .drain(..)
            .filter(|id| events.unsubscribe(*id))
            .count()
    }

    /// 当前订阅数
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// 是否没有订阅
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
