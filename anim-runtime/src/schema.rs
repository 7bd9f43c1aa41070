//! # Schema 模块
//!
//! 动画组件可识别的参数及其默认值。
//!
//! 参数既可以用属性字符串声明：
//!
//! ```text
//! property: position; from: 0 0 0; to: 1 2 3; dur: 500; startEvents: go, click
//! ```
//!
//! 也可以用 JSON 对象声明（字段名相同）。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::warn;

use crate::easing::EasingFunction;
use crate::error::SchemaError;

/// 播放方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Direction {
    /// 正向（`dir` 为空时也是正向）
    #[default]
    Normal,
    /// 反向
    Reverse,
    /// 每轮交替
    Alternate,
}

impl Direction {
    /// 属性值
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Reverse => "reverse",
            Self::Alternate => "alternate",
        }
    }
}

impl FromStr for Direction {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "normal" => Ok(Self::Normal),
            "reverse" => Ok(Self::Reverse),
            "alternate" => Ok(Self::Alternate),
            other => Err(SchemaError::InvalidValue {
                key: "dir".to_string(),
                message: format!("未知方向 '{}'", other),
            }),
        }
    }
}

impl TryFrom<String> for Direction {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Direction> for String {
    fn from(value: Direction) -> Self {
        value.as_str().to_string()
    }
}

/// 循环模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "LoopRepr", into = "LoopRepr")]
pub enum LoopMode {
    /// 不循环（播放一轮）
    #[default]
    Off,
    /// 总共播放 n 轮
    Count(u32),
    /// 无限循环
    Infinite,
}

impl LoopMode {
    /// 总轮数（无限循环返回 `None`）
    pub fn iterations(&self) -> Option<u32> {
        match self {
            Self::Off => Some(1),
            Self::Count(n) => Some((*n).max(1)),
            Self::Infinite => None,
        }
    }
}

impl FromStr for LoopMode {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "false" | "0" => Ok(Self::Off),
            "true" => Ok(Self::Infinite),
            other => other
                .parse::<u32>()
                .map(Self::Count)
                .map_err(|_| SchemaError::InvalidValue {
                    key: "loop".to_string(),
                    message: format!("应为布尔值或非负整数，实际 '{}'", other),
                }),
        }
    }
}

impl fmt::Display for LoopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Off => f.write_str("false"),
            Self::Count(n) => write!(f, "{}", n),
            Self::Infinite => f.write_str("true"),
        }
    }
}

/// `loop` 在 JSON 中的表示：布尔值或整数
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
enum LoopRepr {
    Flag(bool),
    Count(u32),
}

impl TryFrom<LoopRepr> for LoopMode {
    type Error = SchemaError;

    fn try_from(value: LoopRepr) -> Result<Self, Self::Error> {
        Ok(match value {
            LoopRepr::Flag(true) => Self::Infinite,
            LoopRepr::Flag(false) | LoopRepr::Count(0) => Self::Off,
            LoopRepr::Count(n) => Self::Count(n),
        })
    }
}

impl From<LoopMode> for LoopRepr {
    fn from(value: LoopMode) -> Self {
        match value {
            LoopMode::Off => Self::Flag(false),
            LoopMode::Count(n) => Self::Count(n),
            LoopMode::Infinite => Self::Flag(true),
        }
    }
}

/// 事件名列表：JSON 中可以是数组，也可以是逗号分隔的字符串
fn deserialize_event_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum EventList {
        Joined(String),
        Many(Vec<String>),
    }

    Ok(match EventList::deserialize(deserializer)? {
        EventList::Joined(s) => split_event_list(&s),
        EventList::Many(v) => v
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect(),
    })
}

/// 拆分逗号分隔的事件名
pub fn split_event_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// 动画配置
///
/// 每个组件实例一份；任何参数变化都整体替换。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AnimationConfig {
    /// 启动延迟（毫秒）
    #[serde(default)]
    pub delay: f64,

    /// 播放方向
    #[serde(default)]
    pub dir: Direction,

    /// 时长（毫秒）
    #[serde(default = "default_dur")]
    pub dur: f64,

    /// 缓动名
    #[serde(default = "default_easing")]
    pub easing: String,

    /// 弹性参数（只影响 Elastic 曲线）
    #[serde(default = "default_elasticity")]
    pub elasticity: f32,

    /// 起始值（缺省时读取实体当前值）
    #[serde(default)]
    pub from: Option<String>,

    /// 循环模式
    #[serde(default, rename = "loop")]
    pub loop_mode: LoopMode,

    /// 目标属性路径（为空时不创建动画）
    #[serde(default)]
    pub property: String,

    /// 目标值（为空时等于实体当前值）
    #[serde(default)]
    pub to: String,

    /// 开始触发事件
    #[serde(default, deserialize_with = "deserialize_event_list")]
    pub start_events: Vec<String>,

    /// 暂停触发事件
    #[serde(default, deserialize_with = "deserialize_event_list")]
    pub pause_events: Vec<String>,

    /// 恢复触发事件
    #[serde(default, deserialize_with = "deserialize_event_list")]
    pub resume_events: Vec<String>,

    /// 重新开始触发事件
    #[serde(default, deserialize_with = "deserialize_event_list")]
    pub restart_events: Vec<String>,
}

fn default_dur() -> f64 {
    1000.0
}

fn default_easing() -> String {
    EasingFunction::DEFAULT_NAME.to_string()
}

fn default_elasticity() -> f32 {
    400.0
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            delay: 0.0,
            dir: Direction::default(),
            dur: default_dur(),
            easing: default_easing(),
            elasticity: default_elasticity(),
            from: None,
            loop_mode: LoopMode::default(),
            property: String::new(),
            to: String::new(),
            start_events: Vec::new(),
            pause_events: Vec::new(),
            resume_events: Vec::new(),
            restart_events: Vec::new(),
        }
    }
}

impl AnimationConfig {
    /// 创建指定属性的配置（其余参数取默认值）
    pub fn for_property(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            ..Self::default()
        }
    }

    /// 设置起始值
    pub fn with_from(mut self, from: impl Into<String>) -> Self {
        self.from = Some(from.into());
        self
    }

    /// 设置目标值
    pub fn with_to(mut self, to: impl Into<String>) -> Self {
        self.to = to.into();
        self
    }

    /// 设置时长（毫秒）
    pub fn with_dur(mut self, dur: f64) -> Self {
        self.dur = dur;
        self
    }

    /// 设置启动延迟（毫秒）
    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    /// 设置缓动名
    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = easing.into();
        self
    }

    /// 设置循环模式
    pub fn with_loop(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    /// 设置播放方向
    pub fn with_dir(mut self, dir: Direction) -> Self {
        self.dir = dir;
        self
    }

    /// 设置开始触发事件
    pub fn with_start_events(mut self, events: &[&str]) -> Self {
        self.start_events = events.iter().map(|s| s.to_string()).collect();
        self
    }

    /// 设置暂停触发事件
    pub fn with_pause_events(mut self, events: &[&str]) -> Self {
        self.pause_events = events.iter().map(|s| s.to_string()).collect();
        self
    }

    /// 设置恢复触发事件
    pub fn with_resume_events(mut self, events: &[&str]) -> Self {
        self.resume_events = events.iter().map(|s| s.to_string()).collect();
        self
    }

    /// 设置重新开始触发事件
    pub fn with_restart_events(mut self, events: &[&str]) -> Self {
        self.restart_events = events.iter().map(|s| s.to_string()).collect();
        self
    }

    /// 是否声明了目标属性
    pub fn is_enabled(&self) -> bool {
        !self.property.trim().is_empty()
    }

    /// 解析缓动函数，未知名称回退到默认值
    pub fn easing_function(&self) -> EasingFunction {
        EasingFunction::from_name(&self.easing).unwrap_or_else(|| {
            warn!(easing = %self.easing, "未知缓动函数，使用默认值");
            EasingFunction::default()
        })
    }

    /// 解析属性字符串
    ///
    /// 格式：`key: value; key: value`，未出现的参数取默认值。
    pub fn parse_attributes(input: &str) -> Result<Self, SchemaError> {
        let mut config = Self::default();

        for segment in input.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let (key, value) =
                segment
                    .split_once(':')
                    .ok_or_else(|| SchemaError::MalformedDeclaration {
                        segment: segment.to_string(),
                    })?;
            config.set_attribute(key.trim(), value.trim())?;
        }

        Ok(config)
    }

    /// 解析 JSON 对象
    pub fn from_json(input: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(input).map_err(|e| SchemaError::Json {
            message: e.to_string(),
        })
    }

    /// 设置单个参数
    pub fn set_attribute(&mut self, key: &str, value: &str) -> Result<(), SchemaError> {
        match key {
            "delay" => self.delay = parse_millis(key, value)?,
            "dir" => self.dir = value.parse()?,
            "dur" => self.dur = parse_millis(key, value)?,
            "easing" => self.easing = value.to_string(),
            "elasticity" => {
                self.elasticity = value.parse().map_err(|_| invalid_number(key, value))?
            }
            "from" => self.from = (!value.is_empty()).then(|| value.to_string()),
            "loop" => self.loop_mode = value.parse()?,
            "property" => self.property = value.to_string(),
            "to" => self.to = value.to_string(),
            "startEvents" => self.start_events = split_event_list(value),
            "pauseEvents" => self.pause_events = split_event_list(value),
            "resumeEvents" => self.resume_events = split_event_list(value),
            "restartEvents" => self.restart_events = split_event_list(value),
            other => {
                return Err(SchemaError::UnknownAttribute {
                    key: other.to_string(),
                });
            }
        }
        Ok(())
    }
}

fn invalid_number(key: &str, value: &str) -> SchemaError {
    SchemaError::InvalidValue {
        key: key.to_string(),
        message: format!("'{}' 不是有效数字", value),
    }
}

fn parse_millis(key: &str, value: &str) -> Result<f64, SchemaError> {
    let ms: f64 = value.parse().map_err(|_| invalid_number(key, value))?;
    if !ms.is_finite() || ms < 0.0 {
        return Err(SchemaError::InvalidValue {
            key: key.to_string(),
            message: "必须是非负数".to_string(),
        });
    }
    Ok(ms)
}

impl fmt::Display for AnimationConfig {
    /// 输出属性字符串（只包含非默认参数，`property` 总是输出）
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let defaults = Self::default();
        let mut parts = vec![format!("property: {}", self.property)];

        if let Some(from) = &self.from {
            parts.push(format!("from: {}", from));
        }
        if !self.to.is_empty() {
            parts.push(format!("to: {}", self.to));
        }
        if self.dur != defaults.dur {
            parts.push(format!("dur: {}", self.dur));
        }
        if self.delay != defaults.delay {
            parts.push(format!("delay: {}", self.delay));
        }
        if self.easing != defaults.easing {
            parts.push(format!("easing: {}", self.easing));
        }
        if self.elasticity != defaults.elasticity {
            parts.push(format!("elasticity: {}", self.elasticity));
        }
        if self.dir != defaults.dir {
            parts.push(format!("dir: {}", self.dir.as_str()));
        }
        if self.loop_mode != defaults.loop_mode {
            parts.push(format!("loop: {}", self.loop_mode));
        }
        for (key, events) in [
            ("startEvents", &self.start_events),
            ("pauseEvents", &self.pause_events),
            ("resumeEvents", &self.resume_events),
            ("restartEvents", &self.restart_events),
        ] {
            if !events.is_empty() {
                parts.push(format!("{}: {}", key, events.join(", ")));
            }
        }

        f.write_str(&parts.join("; "))
    }
}
