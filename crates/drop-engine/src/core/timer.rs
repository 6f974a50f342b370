//! Scheduled callbacks driven by the fixed timestep.
//!
//! Timers never call back directly; `tick` reports which ones fired and the
//! owner dispatches. Destroying a timer is the only way to cancel it.

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u32);

/// Whether a timer fires once or keeps repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerMode {
    Once,
    Repeating,
}

#[derive(Debug, Clone)]
struct Timer {
    id: TimerId,
    mode: TimerMode,
    /// Delay for one-shot timers, period for repeating ones.
    interval: f32,
    elapsed: f32,
    done: bool,
}

/// A set of pending timers, advanced by [`Timers::tick`].
#[derive(Debug, Default)]
pub struct Timers {
    timers: Vec<Timer>,
    next_id: u32,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a one-shot timer firing after `delay` seconds.
    pub fn add_once(&mut self, delay: f32) -> TimerId {
        self.add(TimerMode::Once, delay.max(0.0))
    }

    /// Schedule a timer firing every `interval` seconds.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is not positive.
    pub fn add_repeating(&mut self, interval: f32) -> TimerId {
        assert!(interval > 0.0, "repeating timer needs a positive interval");
        self.add(TimerMode::Repeating, interval)
    }

    fn add(&mut self, mode: TimerMode, interval: f32) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            id,
            mode,
            interval,
            elapsed: 0.0,
            done: false,
        });
        id
    }

    /// Advance every timer by `dt` and append the ids that fired to `fired`.
    ///
    /// A repeating timer fires once per elapsed interval, so a long frame can
    /// report it several times. One-shot timers are removed after firing.
    pub fn tick(&mut self, dt: f32, fired: &mut Vec<TimerId>) {
        for timer in self.timers.iter_mut() {
            timer.elapsed += dt;
            match timer.mode {
                TimerMode::Once => {
                    if timer.elapsed >= timer.interval {
                        fired.push(timer.id);
                        timer.done = true;
                    }
                }
                TimerMode::Repeating => {
                    while timer.elapsed >= timer.interval {
                        timer.elapsed -= timer.interval;
                        fired.push(timer.id);
                    }
                }
            }
        }
        self.timers.retain(|t| !t.done);
    }

    /// Cancel a timer. Returns false if it had already fired or been destroyed.
    pub fn destroy(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.timers.iter().any(|t| t.id == id)
    }

    /// Seconds until the timer next fires.
    pub fn remaining(&self, id: TimerId) -> Option<f32> {
        self.timers
            .iter()
            .find(|t| t.id == id)
            .map(|t| (t.interval - t.elapsed).max(0.0))
    }

    pub fn mode(&self, id: TimerId) -> Option<TimerMode> {
        self.timers.iter().find(|t| t.id == id).map(|t| t.mode)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
