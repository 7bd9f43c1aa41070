//! # Timeline 模块
//!
//! 参考补间引擎：多键线性插值 + 缓动 + 方向 + 循环。
//!
//! 时间由调用方给出（绝对时间，毫秒），引擎自身不计时。

use super::{CompleteCallback, TweenEngine, TweenHandle, TweenKey, TweenParams, UpdateCallback};
use crate::easing::EasingFunction;
use crate::schema::{Direction, LoopMode};

/// 时间轴状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimelineState {
    /// 尚未推进
    #[default]
    Ready,
    /// 播放中
    Running,
    /// 已完成
    Completed,
}

/// 单个补间时间轴
pub struct Timeline {
    keys: Vec<TweenKey>,
    duration_ms: f64,
    easing: EasingFunction,
    elasticity: f32,
    direction: Direction,
    loop_mode: LoopMode,
    on_update: Option<UpdateCallback>,
    on_complete: Option<CompleteCallback>,
    /// 当前状态
    state: TimelineState,
    /// 当前值
    values: Vec<f32>,
    /// 当前轮次（从 0 开始）
    iteration: u64,
}

impl Timeline {
    /// 从配置创建时间轴
    pub fn new(params: TweenParams) -> Self {
        let values = params.start_values();
        let mut timeline = Self {
            keys: params.keys,
            duration_ms: params.duration_ms.max(0.0),
            easing: params.easing,
            elasticity: params.elasticity,
            direction: params.direction,
            loop_mode: params.loop_mode,
            on_update: params.on_update,
            on_complete: params.on_complete,
            state: TimelineState::Ready,
            values,
            iteration: 0,
        };
        if params.autoplay {
            timeline.advance(0.0);
        }
        timeline
    }

    /// 当前状态
    pub fn state(&self) -> TimelineState {
        self.state
    }

    /// 当前轮次
    pub fn iteration(&self) -> u64 {
        self.iteration
    }

    /// 该轮是否反向播放
    fn is_reversed(&self, iteration: u64) -> bool {
        match self.direction {
            Direction::Normal => false,
            Direction::Reverse => true,
            Direction::Alternate => iteration % 2 == 1,
        }
    }

    /// 计算给定时间的轮次与轮内进度，以及是否已经走完
    fn locate(&self, time_ms: f64) -> (u64, f32, bool) {
        let total = self.loop_mode.iterations();

        if self.duration_ms <= 0.0 {
            let last = total.map(|n| n as u64 - 1).unwrap_or(0);
            return (last, 1.0, total.is_some());
        }

        let iteration = (time_ms / self.duration_ms).floor() as u64;
        if let Some(n) = total
            && iteration >= n as u64
        {
            return (n as u64 - 1, 1.0, true);
        }

        let local = (time_ms - iteration as f64 * self.duration_ms) / self.duration_ms;
        (iteration, local as f32, false)
    }
}

impl TweenHandle for Timeline {
    fn advance(&mut self, time_ms: f64) {
        if self.state == TimelineState::Completed {
            return;
        }
        self.state = TimelineState::Running;

        let (iteration, local, finished) = self.locate(time_ms.max(0.0));
        self.iteration = iteration;

        let t = if self.is_reversed(iteration) {
            1.0 - local
        } else {
            local
        };
        let eased = self.easing.apply(t, self.elasticity);

        self.values = self
            .keys
            .iter()
            .map(|k| k.from + (k.to - k.from) * eased)
            .collect();

        if let Some(update) = self.on_update.as_mut() {
            update(&self.values);
        }

        if finished {
            self.state = TimelineState::Completed;
            if let Some(complete) = self.on_complete.as_mut() {
                complete();
            }
        }
    }

    fn is_completed(&self) -> bool {
        self.state == TimelineState::Completed
    }

    fn current_values(&self) -> Vec<f32> {
        self.values.clone()
    }
}

/// 内置补间引擎
#[derive(Debug, Clone, Copy, Default)]
pub struct TimelineEngine;

impl TweenEngine for TimelineEngine {
    fn create(&self, params: TweenParams) -> Box<dyn TweenHandle> {
        Box::new(Timeline::new(params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn linear(keys: Vec<TweenKey>, duration: f64) -> TweenParams {
        TweenParams::new(keys, duration).with_easing(EasingFunction::Linear, 400.0)
    }

    #[test]
    fn test_timeline_interpolates() {
        let mut timeline = Timeline::new(linear(vec![TweenKey::new("x", 0.0, 10.0)], 1000.0));
        assert_eq!(timeline.state(), TimelineState::Ready);

        timeline.advance(250.0);
        assert_eq!(timeline.state(), TimelineState::Running);
        assert_eq!(timeline.current_values(), vec![2.5]);

        timeline.advance(1000.0);
        assert!(timeline.is_completed());
        assert_eq!(timeline.current_values(), vec![10.0]);
    }

    #[test]
    fn test_callbacks_fire() {
        let updates = Rc::new(RefCell::new(Vec::new()));
        let completions = Rc::new(RefCell::new(0));

        let u = updates.clone();
        let c = completions.clone();
        let params = linear(
            vec![TweenKey::new("x", 0.0, 1.0), TweenKey::new("y", 10.0, 20.0)],
            100.0,
        )
        .on_update(move |values| u.borrow_mut().push(values.to_vec()))
        .on_complete(move || *c.borrow_mut() += 1);

        let mut handle = TimelineEngine.create(params);
        handle.advance(50.0);
        handle.advance(150.0);
        // 完成后不再回调
        handle.advance(200.0);

        assert_eq!(
            *updates.borrow(),
            vec![vec![0.5, 15.0], vec![1.0, 20.0]]
        );
        assert_eq!(*completions.borrow(), 1);
    }

    #[test]
    fn test_reverse_direction() {
        let params = linear(vec![TweenKey::new("x", 0.0, 4.0)], 100.0)
            .with_playback(Direction::Reverse, LoopMode::Off);
        let mut timeline = Timeline::new(params);

        timeline.advance(25.0);
        assert_eq!(timeline.current_values(), vec![3.0]);
        timeline.advance(100.0);
        assert_eq!(timeline.current_values(), vec![0.0]);
    }

    #[test]
    fn test_alternate_two_loops_ends_at_start() {
        let params = linear(vec![TweenKey::new("x", 0.0, 1.0)], 100.0)
            .with_playback(Direction::Alternate, LoopMode::Count(2));
        let mut timeline = Timeline::new(params);

        timeline.advance(100.0);
        assert_eq!(timeline.iteration(), 1);
        assert_eq!(timeline.current_values(), vec![1.0]);
        assert!(!timeline.is_completed());

        timeline.advance(150.0);
        assert_eq!(timeline.current_values(), vec![0.5]);

        timeline.advance(200.0);
        assert!(timeline.is_completed());
        assert_eq!(timeline.current_values(), vec![0.0]);
    }

    #[test]
    fn test_infinite_loop_never_completes() {
        let params = linear(vec![TweenKey::new("x", 0.0, 1.0)], 100.0)
            .with_playback(Direction::Normal, LoopMode::Infinite);
        let mut timeline = Timeline::new(params);

        timeline.advance(10_050.0);
        assert!(!timeline.is_completed());
        assert_eq!(timeline.iteration(), 100);
        assert!((timeline.current_values()[0] - 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_zero_duration_completes_immediately() {
        let mut timeline = Timeline::new(linear(vec![TweenKey::new("x", 3.0, 7.0)], 0.0));
        timeline.advance(0.0);
        assert!(timeline.is_completed());
        assert_eq!(timeline.current_values(), vec![7.0]);
    }
}
