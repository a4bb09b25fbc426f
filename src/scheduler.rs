use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Stopped,
    Running,
    Paused,
}

/// Fixed-interval step timer owned by a game.
///
/// The shell feeds frame time through [`Scheduler::advance`]; the timer
/// reports at most one due step per call and never tries to catch up on
/// missed steps, so a slow frame just slows the game down.
#[derive(Clone, Debug)]
pub struct Scheduler {
    interval: Duration,
    elapsed: Duration,
    state: TimerState,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            elapsed: Duration::ZERO,
            state: TimerState::Stopped,
        }
    }

    pub fn start(&mut self) {
        self.elapsed = Duration::ZERO;
        self.state = TimerState::Running;
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.state = TimerState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == TimerState::Paused {
            self.state = TimerState::Running;
        }
    }

    pub fn cancel(&mut self) {
        self.elapsed = Duration::ZERO;
        self.state = TimerState::Stopped;
    }

    /// Changes the cadence, keeping whatever time has already accumulated.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    #[cfg(test)]
    pub fn state(&self) -> TimerState {
        self.state
    }

    /// Returns true when a step is due.
    pub fn advance(&mut self, dt: Duration) -> bool {
        if self.state != TimerState::Running {
            return false;
        }
        self.elapsed += dt;
        if self.elapsed >= self.interval {
            // Drop any backlog beyond one step
            if self.elapsed >= self.interval * 2 {
                self.elapsed = Duration::ZERO;
            } else {
                self.elapsed -= self.interval;
            }
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn stopped_timer_never_fires() {
        let mut s = Scheduler::new(150 * MS);
        assert!(!s.advance(1000 * MS));
        assert_eq!(s.state(), TimerState::Stopped);
    }

    #[test]
    fn fires_once_interval_has_elapsed() {
        let mut s = Scheduler::new(150 * MS);
        s.start();
        assert!(!s.advance(100 * MS));
        assert!(s.advance(60 * MS));
        assert!(!s.advance(16 * MS));
    }

    #[test]
    fn at_most_one_step_per_advance() {
        let mut s = Scheduler::new(16 * MS);
        s.start();
        assert!(s.advance(500 * MS));
        // Backlog was dropped down to less than one interval
        assert!(!s.advance(Duration::ZERO));
    }

    #[test]
    fn pause_freezes_and_resume_continues() {
        let mut s = Scheduler::new(100 * MS);
        s.start();
        assert!(!s.advance(60 * MS));
        s.pause();
        assert!(!s.advance(200 * MS));
        s.resume();
        assert!(s.advance(40 * MS));
    }

    #[test]
    fn cancel_clears_accumulated_time() {
        let mut s = Scheduler::new(100 * MS);
        s.start();
        s.advance(90 * MS);
        s.cancel();
        s.resume();
        assert_eq!(s.state(), TimerState::Stopped);
        s.start();
        assert!(!s.advance(50 * MS));
    }

    #[test]
    fn shorter_interval_applies_to_accumulated_time() {
        let mut s = Scheduler::new(1000 * MS);
        s.start();
        assert!(!s.advance(60 * MS));
        s.set_interval(50 * MS);
        assert!(s.advance(Duration::ZERO));
    }
}
