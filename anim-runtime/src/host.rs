//! # Host 模块
//!
//! 组件依赖的宿主能力接口。
//!
//! 组件不拥有场景图、事件分发和计时器，只通过这些 trait 访问：
//!
//! - `PropertyReflection`: 按属性路径读写实体属性（含变换快速路径）
//! - `SchemaIntrospection`: 查询属性路径声明的类型
//! - `EventTarget`: 订阅/退订/发送实体事件
//! - `TimerScheduler`: 单次延时回调
//!
//! 所有方法都接收 `&self`；实现方使用 `RefCell` 等内部可变性，
//! 这样组件和补间回调可以同时持有同一个宿主的 `Rc`。

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::coords::Coords;
use crate::tween::TweenEngine;
use crate::value::{PropertyKind, PropertyValue, TransformChannel};

/// 实体唯一标识符
///
/// 由 Host 分配。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u64);

impl EntityId {
    /// 获取内部 ID 值
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

/// 属性反射接口
pub trait PropertyReflection {
    /// 读取属性当前值
    ///
    /// `rotation` 以角度返回。
    fn get(&self, entity: EntityId, path: &str) -> Option<PropertyValue>;

    /// 写入属性
    ///
    /// # 返回
    /// - `true`: 写入成功
    /// - `false`: 实体或属性不存在
    fn set(&self, entity: EntityId, path: &str, value: PropertyValue) -> bool;

    /// 读取变换通道的原始值（`Rotation` 为弧度）
    fn transform_channel(&self, entity: EntityId, channel: TransformChannel) -> Option<Coords>;

    /// 直接写入变换通道（`Rotation` 为弧度）
    fn set_transform_channel(
        &self,
        entity: EntityId,
        channel: TransformChannel,
        value: Coords,
    ) -> bool;
}

/// Schema 查询接口
pub trait SchemaIntrospection {
    /// 属性路径声明的类型；未知路径返回 `PropertyKind::Scalar`
    fn property_kind(&self, entity: EntityId, path: &str) -> PropertyKind;
}

/// 订阅句柄
///
/// `EventTarget::subscribe` 返回，退订时原样交回。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

/// 实体事件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEvent {
    /// 事件名
    pub name: String,
    /// 附带信息（动画通知携带属性实例名）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl EntityEvent {
    /// 创建不带附加信息的事件
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: None,
        }
    }

    /// 创建带附加信息的事件
    pub fn with_detail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            detail: Some(detail.into()),
        }
    }
}

/// 事件监听器
pub type Listener = Rc<dyn Fn(&EntityEvent)>;

/// 事件接口
pub trait EventTarget {
    /// 订阅实体上的命名事件
    fn subscribe(&self, entity: EntityId, event: &str, listener: Listener) -> SubscriptionId;

    /// 退订
    ///
    /// # 返回
    /// - `true`: 订阅存在并已移除
    /// - `false`: 订阅不存在
    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// 在实体上发送事件
    fn emit(&self, entity: EntityId, event: EntityEvent);
}

/// 单次延时回调
///
/// 参数为触发时已超过到期时间的毫秒数。
pub type TimerCallback = Box<dyn FnOnce(f64)>;

/// 计时器接口
///
/// 回调一旦登记就不能取消；调用方需自行判断回调是否过期。
///
/// Host 在一帧内先触发到期的计时器，再调用组件的 `tick`；
/// 超出到期时间的部分已计入动画的累计时间。
pub trait TimerScheduler {
    /// `delay_ms` 毫秒后调用一次 `callback`
    fn schedule_once(&self, delay_ms: f64, callback: TimerCallback);
}

/// 注入给组件的宿主能力集合
#[derive(Clone)]
pub struct HostServices {
    /// 属性反射
    pub reflection: Rc<dyn PropertyReflection>,
    /// Schema 查询
    pub schema: Rc<dyn SchemaIntrospection>,
    /// 事件
    pub events: Rc<dyn EventTarget>,
    /// 计时器
    pub timers: Rc<dyn TimerScheduler>,
    /// 补间引擎
    pub tweens: Rc<dyn TweenEngine>,
}

impl fmt::Debug for HostServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}
