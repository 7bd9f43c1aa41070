//! # Clock 模块
//!
//! 模拟时钟与单次计时器。
//!
//! 时间只随 `advance` 前进；到期的计时器按 (到期时间, 登记顺序) 触发。

use std::cell::{Cell, RefCell};

use tracing::trace;

use anim_runtime::{TimerCallback, TimerScheduler};

struct PendingTimer {
    due_ms: f64,
    seq: u64,
    callback: TimerCallback,
}

/// 模拟时钟
#[derive(Default)]
pub struct SimClock {
    now_ms: Cell<f64>,
    next_seq: Cell<u64>,
    timers: RefCell<Vec<PendingTimer>>,
}

impl std::fmt::Debug for SimClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimClock")
            .field("now_ms", &self.now_ms.get())
            .field("pending", &self.timers.borrow().len())
            .finish()
    }
}

impl SimClock {
    /// 创建时钟（时间为 0）
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前时间（毫秒）
    pub fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    /// 未触发的计时器数
    pub fn pending(&self) -> usize {
        self.timers.borrow().len()
    }

    /// 推进时间并触发到期的计时器
    ///
    /// # 返回
    /// 触发的计时器数
    pub fn advance(&self, delta_ms: f64) -> usize {
        let now = self.now_ms.get() + delta_ms.max(0.0);
        self.now_ms.set(now);

        let mut due: Vec<PendingTimer> = {
            let mut timers = self.timers.borrow_mut();
            let (due, pending): (Vec<_>, Vec<_>) =
                timers.drain(..).partition(|t| t.due_ms <= now);
            *timers = pending;
            due
        };
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.seq.cmp(&b.seq)));

        let fired = due.len();
        for timer in due {
            trace!(due_ms = timer.due_ms, now_ms = now, "计时器到期");
            (timer.callback)(now - timer.due_ms);
        }
        fired
    }
}

impl TimerScheduler for SimClock {
    fn schedule_once(&self, delay_ms: f64, callback: TimerCallback) {
        let seq = self.next_seq.get();
        self.next_seq.set(seq + 1);
        self.timers.borrow_mut().push(PendingTimer {
            due_ms: self.now_ms.get() + delay_ms.max(0.0),
            seq,
            callback,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_timers_fire_when_due() {
        let clock = SimClock::new();
        let fired = Rc::new(Cell::new(false));
        let f = fired.clone();
        clock.schedule_once(100.0, Box::new(move |_| f.set(true)));

        assert_eq!(clock.advance(99.0), 0);
        assert!(!fired.get());
        assert_eq!(clock.advance(1.0), 1);
        assert!(fired.get());
        assert_eq!(clock.pending(), 0);
        assert_eq!(clock.now_ms(), 100.0);
    }

    #[test]
    fn test_callback_receives_overdue_time() {
        let clock = SimClock::new();
        let overdue = Rc::new(Cell::new(-1.0));
        let o = overdue.clone();
        clock.schedule_once(250.0, Box::new(move |late| o.set(late)));

        clock.advance(100.0);
        clock.advance(200.0);
        assert_eq!(overdue.get(), 50.0);
    }

    #[test]
    fn test_timers_fire_in_due_order() {
        let clock = SimClock::new();
        let order = Rc::new(RefCell::new(Vec::new()));
        for (delay, tag) in [(30.0, "c"), (10.0, "a"), (20.0, "b"), (10.0, "a2")] {
            let o = order.clone();
            clock.schedule_once(delay, Box::new(move |_| o.borrow_mut().push(tag)));
        }

        clock.advance(50.0);
        assert_eq!(*order.borrow(), vec!["a", "a2", "b", "c"]);
    }

    #[test]
    fn test_timer_scheduled_from_callback_waits() {
        let clock = Rc::new(SimClock::new());
        let fired = Rc::new(Cell::new(0));
        let inner_clock = clock.clone();
        let f = fired.clone();
        clock.schedule_once(
            0.0,
            Box::new(move |_| {
                let f2 = f.clone();
                inner_clock.schedule_once(0.0, Box::new(move |_| f2.set(f2.get() + 1)));
                f.set(f.get() + 1);
            }),
        );

        assert_eq!(clock.advance(0.0), 1);
        assert_eq!(fired.get(), 1);
        assert_eq!(clock.advance(0.0), 1);
        assert_eq!(fired.get(), 2);
    }
}
