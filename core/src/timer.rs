use std::time::Duration;

use crate::constants::TIMER_PERIOD;

/// # Timer clock
///
/// Turns elapsed wall-clock time into 60Hz timer ticks.
///
/// The host feeds in however much time passed since it last asked; whole periods
/// come back out as ticks and any remainder is carried into the next call. This keeps
/// the delay and sound timers on real time however many instructions run per frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TimerClock {
    period: Duration,
    pending: Duration,
}

impl TimerClock {
    pub fn new(period: Duration) -> Self {
        TimerClock {
            period,
            pending: Duration::from_secs(0),
        }
    }

    /// Adds `elapsed` and returns how many whole periods have now passed
    pub fn advance(&mut self, elapsed: Duration) -> u32 {
        self.pending += elapsed;
        let mut ticks = 0;
        while self.period > Duration::from_secs(0) && self.pending >= self.period {
            self.pending -= self.period;
            ticks += 1;
        }
        ticks
    }

    /// Drops any partially elapsed period
    pub fn reset(&mut self) {
        self.pending = Duration::from_secs(0);
    }
}

impl Default for TimerClock {
    fn default() -> Self {
        TimerClock::new(TIMER_PERIOD)
    }
}
