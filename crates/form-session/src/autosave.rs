use std::time::{Duration, Instant};

/// Debounced deadline for draft saves.
///
/// At most one deadline is outstanding per session; re-arming supersedes the
/// previous one. The owning event loop polls [`AutosaveTimer::take_due`];
/// no task is spawned, so the session stays single-threaded.
#[derive(Debug, Clone, Copy)]
pub struct AutosaveTimer {
    interval: Duration,
    due_at: Option<Instant>,
}

impl AutosaveTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            due_at: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Starts (or restarts) the countdown from `now`.
    pub fn rearm(&mut self, now: Instant) {
        self.due_at = Some(now + self.interval);
    }

    pub fn cancel(&mut self) {
        self.due_at = None;
    }

    pub fn is_armed(&self) -> bool {
        self.due_at.is_some()
    }

    /// Disarms and reports true when the deadline has elapsed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.due_at {
            Some(due) if now >= due => {
                self.due_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_once_after_the_interval() {
        let mut timer = AutosaveTimer::new(Duration::from_secs(30));
        let start = Instant::now();
        timer.rearm(start);
        assert!(!timer.take_due(start + Duration::from_secs(29)));
        assert!(timer.take_due(start + Duration::from_secs(30)));
        assert!(!timer.take_due(start + Duration::from_secs(60)), "disarmed after firing");
    }

    #[test]
    fn rearming_supersedes_the_pending_deadline() {
        let mut timer = AutosaveTimer::new(Duration::from_secs(30));
        let start = Instant::now();
        timer.rearm(start);
        timer.rearm(start + Duration::from_secs(20));
        assert!(!timer.take_due(start + Duration::from_secs(30)));
        assert!(timer.take_due(start + Duration::from_secs(50)));
    }

    #[test]
    fn cancel_clears_the_deadline() {
        let mut timer = AutosaveTimer::new(Duration::from_secs(30));
        let start = Instant::now();
        timer.rearm(start);
        timer.cancel();
        assert!(!timer.is_armed());
        assert!(!timer.take_due(start + Duration::from_secs(60)));
    }
}
