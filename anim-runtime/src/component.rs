//! # Component 模块
//!
//! 动画组件：把宿主生命周期调用翻译为动画状态迁移。
//!
//! ## 状态机
//!
//! ```text
//!            update(config)
//!   任意 ─────────────────────► Armed ──(无延时且无 startEvents)──► Playing
//!                                 │ delay 到期 / start 触发            │  ▲
//!                                 └──────────────────────────────────►│  │ resume 触发
//!                                                                     ▼  │
//!                                          pause 触发 / Host pause   Paused
//!
//!   Playing ──补间完成──► Idle（可被 start / restart 触发重新播放）
//!   remove() ──► 终止，之后所有调用被忽略
//! ```
//!
//! ## 信号处理
//!
//! 触发事件、延时到期和补间完成都经由 `SignalInbox` 投递，
//! 组件在 `flush_triggers` / `tick` 中统一处理。

use tracing::debug;

use crate::builder;
use crate::events::AnimationNotification;
use crate::host::{EntityId, HostServices};
use crate::schema::AnimationConfig;
use crate::tween::TweenHandle;
use crate::wiring::{Generation, Signal, SignalInbox, TriggerKind, TriggerSubscriptions};

/// 组件状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    /// 没有动画（属性为空、已完成或已移除）
    #[default]
    Idle,
    /// 补间已构造，尚未开始
    Armed,
    /// 正在播放
    Playing,
    /// 已暂停
    Paused,
}

/// 播放状态
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PlayState {
    /// 是否正在播放
    pub is_playing: bool,
    /// 本次播放累计时间（毫秒）
    pub elapsed_ms: f64,
}

/// 动画组件
///
/// 每个实体上的每个动画属性实例对应一个组件。
/// 组件独占至多一个补间句柄。
pub struct AnimationComponent {
    entity: EntityId,
    /// 属性实例名（如 `animation`、`animation__spin`）
    name: String,
    services: HostServices,
    config: AnimationConfig,
    state: AnimationState,
    play: PlayState,
    handle: Option<Box<dyn TweenHandle>>,
    subscriptions: TriggerSubscriptions,
    inbox: SignalInbox,
    generation: Generation,
    /// 处于 Host 级暂停
    host_paused: bool,
    /// Host 暂停时正在播放，恢复后继续
    resume_on_play: bool,
    /// Host 暂停期间满足开始条件，恢复后开始
    start_on_play: bool,
    /// 延时到期后超出的时间已计入，下一次 tick 不再累加本帧时长
    frame_credited: bool,
    detached: bool,
}

impl std::fmt::Debug for AnimationComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationComponent")
            .field("entity", &self.entity)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("play", &self.play)
            .field("generation", &self.generation)
            .field("subscriptions", &self.subscriptions.len())
            .finish()
    }
}

impl AnimationComponent {
    /// 挂载组件并应用初始配置
    pub fn attach(
        entity: EntityId,
        name: impl Into<String>,
        config: AnimationConfig,
        services: HostServices,
    ) -> Self {
        Self::attach_with(entity, name.into(), config, services, false)
    }

    /// 挂载到处于 Host 级暂停的实体
    ///
    /// 不订阅触发事件，也不开始播放；`play` 之后再按门控开始。
    pub fn attach_paused(
        entity: EntityId,
        name: impl Into<String>,
        config: AnimationConfig,
        services: HostServices,
    ) -> Self {
        Self::attach_with(entity, name.into(), config, services, true)
    }

    fn attach_with(
        entity: EntityId,
        name: String,
        config: AnimationConfig,
        services: HostServices,
        host_paused: bool,
    ) -> Self {
        let mut component = Self {
            entity,
            name,
            services,
            config: AnimationConfig::default(),
            state: AnimationState::Idle,
            play: PlayState::default(),
            handle: None,
            subscriptions: TriggerSubscriptions::default(),
            inbox: SignalInbox::new(),
            generation: Generation::default(),
            host_paused,
            resume_on_play: false,
            start_on_play: false,
            frame_credited: false,
            detached: false,
        };
        debug!(
            entity = %component.entity,
            name = %component.name,
            host_paused,
            "动画组件挂载"
        );
        component.update(config);
        component
    }

    // ========== 生命周期 ==========

    /// 参数变化：丢弃当前补间，重建配置并按门控决定何时开始
    pub fn update(&mut self, config: AnimationConfig) {
        if self.detached {
            return;
        }
        self.config = config;
        self.resume_on_play = false;
        self.start_on_play = false;
        self.rebuild();
        self.rewire();
        self.arm();
    }

    /// 每帧推进
    ///
    /// 只在 Playing 时累加时间并推进补间；补间回调同步写回实体。
    pub fn tick(&mut self, _time_ms: f64, delta_ms: f64) {
        if self.detached {
            return;
        }
        let credited = std::mem::take(&mut self.frame_credited);
        if self.state == AnimationState::Playing && self.play.is_playing {
            if !credited {
                self.play.elapsed_ms += delta_ms.max(0.0);
            }
            if let Some(handle) = self.handle.as_mut() {
                handle.advance(self.play.elapsed_ms);
            }
        }
        self.flush_triggers();
    }

    /// Host 级暂停：暂停播放并退订全部触发事件
    pub fn pause(&mut self) {
        if self.detached || self.host_paused {
            return;
        }
        self.host_paused = true;
        self.resume_on_play = self.state == AnimationState::Playing;
        self.pause_playback();
        self.subscriptions.detach(&*self.services.events);
        debug!(name = %self.name, resume = self.resume_on_play, "Host 暂停");
    }

    /// Host 级恢复：重新订阅触发事件；暂停前在播放则继续播放
    pub fn play(&mut self) {
        if self.detached || !self.host_paused {
            return;
        }
        self.host_paused = false;
        self.rewire();

        if std::mem::take(&mut self.resume_on_play) {
            self.resume_playback();
        }
        if std::mem::take(&mut self.start_on_play) && self.state == AnimationState::Armed {
            self.begin();
        }
        debug!(name = %self.name, state = ?self.state, "Host 恢复");
    }

    /// 移除：丢弃补间、退订全部触发事件；之后所有调用被忽略
    pub fn remove(&mut self) {
        if self.detached {
            return;
        }
        self.detached = true;
        self.handle = None;
        self.subscriptions.detach(&*self.services.events);
        self.inbox.clear();
        self.state = AnimationState::Idle;
        self.play = PlayState::default();
        debug!(entity = %self.entity, name = %self.name, "动画组件移除");
    }

    /// 处理收件箱中的全部信号
    ///
    /// # 返回
    /// 处理的信号数
    pub fn flush_triggers(&mut self) -> usize {
        let mut handled = 0;
        while let Some(signal) = self.inbox.pop() {
            if self.detached {
                self.inbox.clear();
                break;
            }
            handled += 1;
            self.handle_signal(signal);
        }
        handled
    }

    /// 直接处理一个触发（等价于对应事件到达）
    pub fn trigger(&mut self, kind: TriggerKind) {
        if self.detached || self.host_paused {
            return;
        }
        match kind {
            TriggerKind::Start => self.on_start(),
            TriggerKind::Pause => self.pause_playback(),
            TriggerKind::Resume => self.resume_playback(),
            TriggerKind::Restart => self.on_restart(),
        }
    }

    // ========== 查询 ==========

    /// 所属实体
    pub fn entity(&self) -> EntityId {
        self.entity
    }

    /// 属性实例名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 当前配置
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// 当前状态
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// 播放状态
    pub fn play_state(&self) -> PlayState {
        self.play
    }

    /// 是否正在播放
    pub fn is_playing(&self) -> bool {
        self.play.is_playing
    }

    /// 本次播放累计时间（毫秒）
    pub fn elapsed_ms(&self) -> f64 {
        self.play.elapsed_ms
    }

    /// 当前重建代号
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// 是否持有补间句柄
    pub fn has_animation(&self) -> bool {
        self.handle.is_some()
    }

    /// 当前触发事件订阅数
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// 待处理信号数
    pub fn pending_signals(&self) -> usize {
        self.inbox.len()
    }

    /// 是否处于 Host 级暂停
    pub fn is_host_paused(&self) -> bool {
        self.host_paused
    }

    /// 是否已移除
    pub fn is_detached(&self) -> bool {
        self.detached
    }

    // ========== 内部 ==========

    /// 丢弃旧补间并按当前配置构造新补间
    fn rebuild(&mut self) {
        self.generation = self.generation.next();
        self.handle = None;
        self.play = PlayState::default();

        let inbox = self.inbox.clone();
        let generation = self.generation;
        let built = builder::build(self.entity, &self.services, &self.config, move || {
            inbox.push(Signal::Completed(generation))
        });

        match built {
            Some(builder::BuiltTween {
                kind,
                channel,
                params,
            }) => {
                debug!(
                    name = %self.name,
                    ?kind,
                    ?channel,
                    generation = self.generation.0,
                    "补间已重建"
                );
                self.handle = Some(self.services.tweens.create(params));
                self.state = AnimationState::Armed;
            }
            None => {
                self.state = AnimationState::Idle;
                debug!(name = %self.name, "目标属性为空，不创建动画");
            }
        }
    }

    /// 按门控决定何时开始：启动延时、开始事件，或立即开始
    ///
    /// Host 暂停期间不立即开始，改为 `play` 时开始。
    fn arm(&mut self) {
        if self.state != AnimationState::Armed {
            return;
        }

        if self.config.delay > 0.0 {
            let inbox = self.inbox.clone();
            let generation = self.generation;
            self.services.timers.schedule_once(
                self.config.delay,
                Box::new(move |overdue_ms| {
                    inbox.push(Signal::DelayElapsed {
                        generation,
                        overdue_ms,
                    })
                }),
            );
            debug!(name = %self.name, delay = self.config.delay, "等待启动延时");
        } else if !self.config.start_events.is_empty() {
            debug!(name = %self.name, events = ?self.config.start_events, "等待开始事件");
        } else if self.host_paused {
            self.start_on_play = true;
            debug!(name = %self.name, "Host 暂停中，恢复后开始");
        } else {
            self.begin();
        }
    }

    /// 退订旧的触发事件，Host 未暂停时按当前配置重新订阅
    fn rewire(&mut self) {
        self.subscriptions.detach(&*self.services.events);
        if !self.host_paused {
            self.subscriptions = TriggerSubscriptions::attach(
                &*self.services.events,
                self.entity,
                &self.config,
                &self.inbox,
            );
        }
    }

    fn handle_signal(&mut self, signal: Signal) {
        match signal {
            Signal::Trigger(kind) => self.trigger(kind),
            Signal::DelayElapsed {
                generation,
                overdue_ms,
            } => {
                if generation != self.generation || self.state != AnimationState::Armed {
                    debug!(name = %self.name, ?generation, "忽略过期的启动延时");
                    return;
                }
                if self.host_paused {
                    self.start_on_play = true;
                    return;
                }
                self.begin();
                if self.state == AnimationState::Playing {
                    self.play.elapsed_ms = overdue_ms.max(0.0);
                    self.frame_credited = true;
                }
            }
            Signal::Completed(generation) => {
                if generation != self.generation {
                    return;
                }
                self.state = AnimationState::Idle;
                self.play.is_playing = false;
                self.notify(AnimationNotification::Complete {
                    name: self.name.clone(),
                });
            }
        }
    }

    /// 开始播放（从 0 开始计时）并发出开始通知
    fn begin(&mut self) {
        if self.handle.is_none() {
            return;
        }
        self.state = AnimationState::Playing;
        self.play = PlayState {
            is_playing: true,
            elapsed_ms: 0.0,
        };
        self.frame_credited = false;
        debug!(entity = %self.entity, name = %self.name, "动画开始");
        self.notify(AnimationNotification::Begin {
            name: self.name.clone(),
        });
    }

    /// 开始触发：Armed / Paused / Idle → Playing；播放中忽略
    fn on_start(&mut self) {
        if self.state == AnimationState::Playing {
            return;
        }
        // 从实体当前状态重新构造，使暂停或完成后的开始从头播放
        if self.state != AnimationState::Armed {
            self.rebuild();
        }
        self.begin();
    }

    /// 重启触发：从实体当前状态重建
    ///
    /// 已开始过的动画忽略延时与开始事件门控，立即从头播放；
    /// 尚未开始（Armed）时重新按门控等待。
    fn on_restart(&mut self) {
        let started = self.state != AnimationState::Armed;
        self.rebuild();
        if started {
            self.begin();
        } else {
            self.arm();
        }
    }

    fn pause_playback(&mut self) {
        if self.state == AnimationState::Playing {
            self.state = AnimationState::Paused;
            self.play.is_playing = false;
        }
    }

    /// 恢复：不发开始通知，不重置累计时间
    fn resume_playback(&mut self) {
        if self.state == AnimationState::Paused && self.handle.is_some() {
            self.state = AnimationState::Playing;
            self.play.is_playing = true;
        }
    }

    fn notify(&self, notification: AnimationNotification) {
        self.services.events.emit(self.entity, notification.into());
    }
}

impl Drop for AnimationComponent {
    fn drop(&mut self) {
        self.subscriptions.detach(&*self.services.events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Coords;
    use crate::test_support::MockHost;
    use crate::value::TransformChannel;
    use std::rc::Rc;

    fn begin(name: &str) -> AnimationNotification {
        AnimationNotification::Begin {
            name: name.to_string(),
        }
    }

    fn complete(name: &str) -> AnimationNotification {
        AnimationNotification::Complete {
            name: name.to_string(),
        }
    }

    fn setup() -> (Rc<MockHost>, EntityId) {
        let host = MockHost::new();
        let entity = host.spawn();
        (host, entity)
    }

    fn linear(property: &str) -> AnimationConfig {
        AnimationConfig::for_property(property).with_easing("linear")
    }

    #[test]
    fn test_position_example_reaches_target() {
        let (host, entity) = setup();
        let config = AnimationConfig::for_property("position")
            .with_from("0 0 0")
            .with_to("1 2 3")
            .with_dur(1000.0);

        let mut c = AnimationComponent::attach(entity, "animation", config, host.services());
        assert_eq!(c.state(), AnimationState::Playing);

        c.tick(0.0, 1000.0);

        assert_eq!(
            host.transform(entity, TransformChannel::Position),
            Coords::new(1.0, 2.0, 3.0)
        );
        assert_eq!(
            host.notifications(),
            vec![begin("animation"), complete("animation")]
        );
        assert_eq!(c.state(), AnimationState::Idle);
        assert!(!c.is_playing());
    }

    #[test]
    fn test_empty_property_stays_idle() {
        let (host, entity) = setup();
        let c = AnimationComponent::attach(
            entity,
            "animation",
            AnimationConfig::default(),
            host.services(),
        );
        assert_eq!(c.state(), AnimationState::Idle);
        assert!(!c.has_animation());
        assert_eq!(host.created_handles(), 0);
        assert!(host.notifications().is_empty());
    }

    #[test]
    fn test_start_events_hold_in_armed() {
        let (host, entity) = setup();
        let config = linear("position").with_to("1 1 1").with_start_events(&["go"]);
        let mut c = AnimationComponent::attach(entity, "animation", config, host.services());

        assert_eq!(c.state(), AnimationState::Armed);
        c.tick(0.0, 500.0);
        assert_eq!(c.elapsed_ms(), 0.0);
        assert!(host.notifications().is_empty());

        host.fire(entity, "go");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Playing);
        assert_eq!(host.notifications(), vec![begin("animation")]);
    }

    #[test]
    fn test_delay_begins_exactly_once() {
        let (host, entity) = setup();
        let config = linear("position").with_to("1 1 1").with_delay(300.0);
        let mut c = AnimationComponent::attach(entity, "animation", config, host.services());

        assert_eq!(c.state(), AnimationState::Armed);
        assert_eq!(host.pending_timers(), 1);

        host.advance_clock(200.0);
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Armed);

        host.advance_clock(100.0);
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Playing);

        host.advance_clock(1000.0);
        c.flush_triggers();
        assert_eq!(host.notifications(), vec![begin("animation")]);
    }

    #[test]
    fn test_start_event_preempts_delay() {
        let (host, entity) = setup();
        let config = linear("position")
            .with_to("1 1 1")
            .with_delay(300.0)
            .with_start_events(&["go"]);
        let mut c = AnimationComponent::attach(entity, "animation", config, host.services());

        host.fire(entity, "go");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Playing);

        host.advance_clock(300.0);
        c.flush_triggers();
        assert_eq!(host.notifications(), vec![begin("animation")]);
    }

    #[test]
    fn test_stale_delay_timer_is_ignored() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach(
            entity,
            "animation",
            linear("position").with_to("1 1 1").with_delay(100.0),
            host.services(),
        );
        let first = c.generation();

        // 重建后旧计时器仍会触发，但代号不再匹配
        c.update(
            linear("position")
                .with_to("2 2 2")
                .with_delay(500.0),
        );
        assert_ne!(c.generation(), first);

        host.advance_clock(100.0);
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Armed);
        assert!(host.notifications().is_empty());

        host.advance_clock(400.0);
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Playing);
        assert_eq!(host.notifications(), vec![begin("animation")]);
    }

    #[test]
    fn test_at_most_one_live_handle() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach(
            entity,
            "animation",
            linear("position").with_to("1 1 1"),
            host.services(),
        );
        for i in 0..5 {
            c.update(linear("position").with_to(format!("{i} 0 0")));
            assert_eq!(host.live_handles(), 1);
        }
        c.trigger(TriggerKind::Restart);
        assert_eq!(host.live_handles(), 1);
        assert_eq!(host.created_handles(), 7);

        c.remove();
        assert_eq!(host.live_handles(), 0);
    }

    #[test]
    fn test_pause_and_resume_triggers_preserve_elapsed() {
        let (host, entity) = setup();
        let config = linear("position")
            .with_from("0 0 0")
            .with_to("10 0 0")
            .with_pause_events(&["stop"])
            .with_resume_events(&["go"]);
        let mut c = AnimationComponent::attach(entity, "animation", config, host.services());

        c.tick(0.0, 400.0);
        host.fire(entity, "stop");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Paused);
        assert!(!c.is_playing());

        // 暂停期间时间冻结
        c.tick(400.0, 300.0);
        assert_eq!(c.elapsed_ms(), 400.0);
        assert_eq!(host.transform(entity, TransformChannel::Position).x, 4.0);

        host.fire(entity, "go");
        c.flush_triggers();
        assert!(c.is_playing());
        c.tick(700.0, 100.0);
        assert_eq!(c.elapsed_ms(), 500.0);
        assert_eq!(host.transform(entity, TransformChannel::Position).x, 5.0);

        // 恢复不发开始通知
        assert_eq!(host.notifications(), vec![begin("animation")]);
    }

    #[test]
    fn test_host_pause_detaches_listeners_and_resumes() {
        let (host, entity) = setup();
        let config = linear("position")
            .with_to("1 0 0")
            .with_pause_events(&["stop"]);
        let mut c = AnimationComponent::attach(entity, "animation", config, host.services());
        c.tick(0.0, 250.0);
        assert_eq!(host.listener_count(), 1);

        c.pause();
        assert_eq!(c.state(), AnimationState::Paused);
        assert_eq!(host.listener_count(), 0);
        assert_eq!(c.subscription_count(), 0);

        c.play();
        assert_eq!(host.listener_count(), 1);
        assert!(c.is_playing());
        assert_eq!(c.state(), AnimationState::Playing);
        assert_eq!(c.elapsed_ms(), 250.0);
        assert_eq!(host.notifications(), vec![begin("animation")]);
    }

    #[test]
    fn test_host_play_without_pause_is_noop() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach(
            entity,
            "animation",
            linear("position").with_to("1 0 0").with_start_events(&["go"]),
            host.services(),
        );
        c.play();
        assert_eq!(c.state(), AnimationState::Armed);
        assert_eq!(host.listener_count(), 1);
    }

    #[test]
    fn test_host_pause_while_armed_stays_armed() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach(
            entity,
            "animation",
            linear("position").with_to("1 0 0").with_start_events(&["go"]),
            host.services(),
        );
        c.pause();
        host.fire(entity, "go");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Armed);

        c.play();
        assert_eq!(c.state(), AnimationState::Armed);
        host.fire(entity, "go");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Playing);
    }

    #[test]
    fn test_delay_elapsing_during_host_pause_starts_on_play() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach(
            entity,
            "animation",
            linear("position").with_to("1 0 0").with_delay(100.0),
            host.services(),
        );
        c.pause();
        host.advance_clock(100.0);
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Armed);

        c.play();
        assert_eq!(c.state(), AnimationState::Playing);
        assert_eq!(host.notifications(), vec![begin("animation")]);
    }

    #[test]
    fn test_restart_reevaluates_current_state() {
        let (host, entity) = setup();
        let config = linear("position")
            .with_to("10 0 0")
            .with_restart_events(&["again"]);
        let mut c = AnimationComponent::attach(entity, "animation", config, host.services());

        c.tick(0.0, 500.0);
        assert_eq!(host.transform(entity, TransformChannel::Position).x, 5.0);

        host.fire(entity, "again");
        c.flush_triggers();
        assert_eq!(c.elapsed_ms(), 0.0);
        assert_eq!(
            host.last_params().as_deref(),
            Some(
                r#"[TweenKey { name: "x", from: 5.0, to: 10.0 }, TweenKey { name: "y", from: 0.0, to: 0.0 }, TweenKey { name: "z", from: 0.0, to: 0.0 }]"#
            )
        );

        c.tick(500.0, 500.0);
        assert_eq!(host.transform(entity, TransformChannel::Position).x, 7.5);
        assert_eq!(
            host.notifications(),
            vec![begin("animation"), begin("animation")]
        );
    }

    #[test]
    fn test_restart_while_playing_ignores_gating() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach(
            entity,
            "animation",
            linear("position")
                .with_to("1 0 0")
                .with_delay(1000.0)
                .with_start_events(&["go"])
                .with_restart_events(&["again"]),
            host.services(),
        );
        host.fire(entity, "go");
        c.flush_triggers();
        c.tick(0.0, 200.0);

        host.fire(entity, "again");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Playing);
        assert_eq!(c.elapsed_ms(), 0.0);

        // 旧的延时回调属于上一代
        host.advance_clock(1000.0);
        c.flush_triggers();
        assert_eq!(
            host.notifications(),
            vec![begin("animation"), begin("animation")]
        );
    }

    #[test]
    fn test_restart_before_start_keeps_start_gating() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach(
            entity,
            "animation",
            linear("position")
                .with_to("1 0 0")
                .with_start_events(&["go"])
                .with_restart_events(&["again"]),
            host.services(),
        );

        host.fire(entity, "again");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Armed);
        assert!(host.notifications().is_empty());

        host.fire(entity, "go");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Playing);
        assert_eq!(host.notifications(), vec![begin("animation")]);
    }

    #[test]
    fn test_restart_before_start_reschedules_delay() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach(
            entity,
            "animation",
            linear("position").with_to("1 0 0").with_delay(300.0),
            host.services(),
        );
        let first = c.generation();

        host.advance_clock(100.0);
        c.trigger(TriggerKind::Restart);
        assert_eq!(c.state(), AnimationState::Armed);
        assert_ne!(c.generation(), first);
        assert_eq!(host.pending_timers(), 2);

        // 旧计时器在 300ms 到期但已过期，新计时器从 100ms 起算
        host.advance_clock(200.0);
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Armed);

        host.advance_clock(200.0);
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Playing);
        assert_eq!(host.notifications(), vec![begin("animation")]);
    }

    #[test]
    fn test_delay_credits_only_time_after_due() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach(
            entity,
            "animation",
            linear("position")
                .with_from("0 0 0")
                .with_to("10 0 0")
                .with_delay(250.0),
            host.services(),
        );

        host.advance_clock(300.0);
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Playing);
        assert_eq!(c.elapsed_ms(), 50.0);

        // 同一帧的 tick 不再累加本帧时长
        c.tick(300.0, 300.0);
        assert_eq!(c.elapsed_ms(), 50.0);
        assert!((host.transform(entity, TransformChannel::Position).x - 0.5).abs() < 1e-5);

        c.tick(400.0, 100.0);
        assert_eq!(c.elapsed_ms(), 150.0);
    }

    #[test]
    fn test_update_during_host_pause_waits_for_play() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach(
            entity,
            "animation",
            linear("position").with_to("1 0 0"),
            host.services(),
        );
        c.tick(0.0, 200.0);
        c.pause();

        c.update(linear("position").with_to("10 0 0"));
        assert_eq!(c.state(), AnimationState::Armed);
        assert!(!c.is_playing());
        for i in 1..=5 {
            c.tick(200.0 + 100.0 * i as f64, 100.0);
        }
        assert_eq!(c.elapsed_ms(), 0.0);
        assert_eq!(host.listener_count(), 0);
        assert_eq!(host.notifications(), vec![begin("animation")]);

        c.play();
        assert_eq!(c.state(), AnimationState::Playing);
        assert_eq!(
            host.notifications(),
            vec![begin("animation"), begin("animation")]
        );
    }

    #[test]
    fn test_attach_paused_defers_begin() {
        let (host, entity) = setup();
        let mut c = AnimationComponent::attach_paused(
            entity,
            "animation",
            linear("position").with_to("1 0 0").with_pause_events(&["stop"]),
            host.services(),
        );
        assert!(c.is_host_paused());
        assert_eq!(c.state(), AnimationState::Armed);
        assert_eq!(host.listener_count(), 0);

        c.tick(0.0, 500.0);
        assert_eq!(c.elapsed_ms(), 0.0);
        assert!(host.notifications().is_empty());

        c.play();
        assert_eq!(c.state(), AnimationState::Playing);
        assert_eq!(host.listener_count(), 1);
        assert_eq!(host.notifications(), vec![begin("animation")]);
    }

    #[test]
    fn test_resume_after_rebuild_is_ignored() {
        let (host, entity) = setup();
        let config = linear("position")
            .with_to("1 0 0")
            .with_start_events(&["go"])
            .with_pause_events(&["stop"])
            .with_resume_events(&["resume"]);
        let mut c = AnimationComponent::attach(entity, "animation", config.clone(), host.services());

        host.fire(entity, "go");
        host.fire(entity, "stop");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Paused);

        c.update(config);
        host.fire(entity, "resume");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Armed);
        assert!(!c.is_playing());
    }

    #[test]
    fn test_start_after_completion_replays() {
        let (host, entity) = setup();
        let config = linear("position")
            .with_from("0 0 0")
            .with_to("1 0 0")
            .with_dur(100.0)
            .with_start_events(&["go"]);
        let mut c = AnimationComponent::attach(entity, "animation", config, host.services());

        host.fire(entity, "go");
        c.flush_triggers();
        c.tick(0.0, 100.0);
        assert_eq!(c.state(), AnimationState::Idle);

        host.fire(entity, "go");
        c.flush_triggers();
        assert_eq!(c.state(), AnimationState::Playing);
        c.tick(100.0, 50.0);
        assert_eq!(host.transform(entity, TransformChannel::Position).x, 0.5);
    }

    #[test]
    fn test_update_rewires_without_duplicates() {
        let (host, entity) = setup();
        let config = linear("position")
            .with_to("1 0 0")
            .with_start_events(&["a", "b"]);
        let mut c = AnimationComponent::attach(entity, "animation", config.clone(), host.services());
        c.update(config.clone());
        c.update(config);
        assert_eq!(host.listener_count(), 2);
        assert_eq!(c.subscription_count(), 2);
    }

    #[test]
    fn test_remove_is_terminal() {
        let (host, entity) = setup();
        let config = linear("position")
            .with_to("1 0 0")
            .with_start_events(&["go"]);
        let mut c = AnimationComponent::attach(entity, "animation", config.clone(), host.services());
        c.remove();

        assert_eq!(host.listener_count(), 0);
        assert!(!c.has_animation());
        assert!(c.is_detached());

        c.update(config);
        c.play();
        c.tick(0.0, 100.0);
        assert_eq!(c.state(), AnimationState::Idle);
        assert_eq!(host.listener_count(), 0);
    }

    #[test]
    fn test_notifications_carry_instance_name() {
        let (host, entity) = setup();
        let _c = AnimationComponent::attach(
            entity,
            "animation__spin",
            linear("rotation").with_to("0 360 0"),
            host.services(),
        );
        assert_eq!(host.notifications(), vec![begin("animation__spin")]);
    }
}
