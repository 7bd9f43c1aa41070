//! # Builder 模块
//!
//! 根据 `AnimationConfig` 与目标属性的声明类型构造补间配置。
//!
//! ## 路径选择
//!
//! ```text
//! property_kind(path)
//!   ├─ Vector2/3/4 ─┬─ position/rotation/scale ─► 快速路径：直接写变换（rotation 转弧度）
//!   │               └─ 其它                   ─► 经属性反射写回向量
//!   ├─ Color        ─► r/g/b 三键，写回颜色
//!   └─ Scalar       ─► 单键，写回数值（未知类型也走这里）
//! ```
//!
//! `from` 缺省、`to` 为空、或值无法解析时，都取实体当前值。

use std::rc::Rc;

use tracing::{debug, warn};

use crate::coords::{self, Coords};
use crate::host::{EntityId, HostServices, PropertyReflection};
use crate::schema::AnimationConfig;
use crate::tween::{TweenKey, TweenParams};
use crate::value::{PropertyKind, PropertyValue, Rgb, TransformChannel};

/// 颜色通道键名
const COLOR_KEYS: [&str; 3] = ["r", "g", "b"];

/// 构造结果
#[derive(Debug)]
pub struct BuiltTween {
    /// 目标属性的声明类型
    pub kind: PropertyKind,
    /// 是否走变换快速路径
    pub channel: Option<TransformChannel>,
    /// 补间配置（`autoplay = false`）
    pub params: TweenParams,
}

/// 构造补间配置
///
/// # 返回
/// - `Some(built)`: 配置已就绪
/// - `None`: 目标属性为空，不创建动画
pub fn build(
    entity: EntityId,
    services: &HostServices,
    config: &AnimationConfig,
    on_complete: impl FnMut() + 'static,
) -> Option<BuiltTween> {
    if !config.is_enabled() {
        return None;
    }

    let path = config.property.trim().to_string();
    let kind = services.schema.property_kind(entity, &path);
    let reflection = services.reflection.clone();

    let (keys, channel, params) = if kind.is_vector() {
        build_vector(entity, reflection, &path, kind, config)
    } else if kind == PropertyKind::Color {
        build_color(entity, reflection, &path, config)
    } else {
        build_scalar(entity, reflection, &path, config)
    };
    debug!(entity = %entity, property = %path, keys = keys, "补间配置已构造");

    let params = params
        .with_easing(config.easing_function(), config.elasticity)
        .with_playback(config.dir, config.loop_mode)
        .on_complete(on_complete);

    Some(BuiltTween {
        kind,
        channel,
        params,
    })
}

/// 解析用户给出的值；为空返回 `None`，解析失败记录警告并返回 `None`
fn parse_user_value<T>(
    raw: Option<&str>,
    property: &str,
    parse: impl FnOnce(&str) -> Option<T>,
) -> Option<T> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let parsed = parse(raw);
    if parsed.is_none() {
        warn!(property = %property, value = %raw, "无法解析动画值，使用当前值");
    }
    parsed
}

fn build_vector(
    entity: EntityId,
    reflection: Rc<dyn PropertyReflection>,
    path: &str,
    kind: PropertyKind,
    config: &AnimationConfig,
) -> (usize, Option<TransformChannel>, TweenParams) {
    let current = reflection
        .get(entity, path)
        .and_then(|v| v.as_coords())
        .unwrap_or_default();

    let mut from = parse_user_value(config.from.as_deref(), path, |s| coords::parse(s).ok())
        .unwrap_or(current);
    let mut to =
        parse_user_value(Some(config.to.as_str()), path, |s| coords::parse(s).ok()).unwrap_or(current);

    let channel = TransformChannel::from_path(path);
    if channel == Some(TransformChannel::Rotation) {
        from = from.to_radians();
        to = to.to_radians();
    }

    let keys: Vec<TweenKey> = kind
        .axis_names()
        .iter()
        .enumerate()
        .map(|(i, axis)| TweenKey::new(*axis, from.component(i), to.component(i)))
        .collect();
    let len = keys.len();
    let params = TweenParams::new(keys, config.dur);

    let params = match channel {
        Some(channel) => params.on_update(move |values| {
            reflection.set_transform_channel(entity, channel, Coords::from_components(values));
        }),
        None => {
            let path = path.to_string();
            params.on_update(move |values| {
                reflection.set(
                    entity,
                    &path,
                    PropertyValue::Vector(Coords::from_components(values)),
                );
            })
        }
    };

    (len, channel, params)
}

fn build_color(
    entity: EntityId,
    reflection: Rc<dyn PropertyReflection>,
    path: &str,
    config: &AnimationConfig,
) -> (usize, Option<TransformChannel>, TweenParams) {
    let current = reflection
        .get(entity, path)
        .and_then(|v| v.as_color())
        .unwrap_or_default();

    let from = parse_user_value(config.from.as_deref(), path, Rgb::parse_hex).unwrap_or(current);
    let to = parse_user_value(Some(config.to.as_str()), path, Rgb::parse_hex).unwrap_or(current);

    let keys: Vec<TweenKey> = COLOR_KEYS
        .iter()
        .zip(from.channels().into_iter().zip(to.channels()))
        .map(|(name, (a, b))| TweenKey::new(*name, a, b))
        .collect();

    let path = path.to_string();
    let params = TweenParams::new(keys, config.dur).on_update(move |values| {
        reflection.set(entity, &path, PropertyValue::Color(Rgb::from_channels(values)));
    });

    (COLOR_KEYS.len(), None, params)
}

fn build_scalar(
    entity: EntityId,
    reflection: Rc<dyn PropertyReflection>,
    path: &str,
    config: &AnimationConfig,
) -> (usize, Option<TransformChannel>, TweenParams) {
    let current = reflection
        .get(entity, path)
        .and_then(|v| v.as_number())
        .unwrap_or(0.0);

    let parse_number = |s: &str| s.parse::<f32>().ok();
    let from = parse_user_value(config.from.as_deref(), path, parse_number).unwrap_or(current);
    let to = parse_user_value(Some(config.to.as_str()), path, parse_number).unwrap_or(current);

    // 单键容器，键名取属性路径最后一段
    let key = path.rsplit('.').next().unwrap_or(path);
    let keys = vec![TweenKey::new(key, from, to)];

    let path = path.to_string();
    let params = TweenParams::new(keys, config.dur).on_update(move |values| {
        if let Some(value) = values.first() {
            reflection.set(entity, &path, PropertyValue::Number(*value));
        }
    });

    (1, None, params)
}
