use std::fmt;
use std::time::Duration;

/// Ring buffer of recent frame durations.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    history: Vec<Duration>,
    next: usize,
    filled: bool,
}

/// Summary of the frames a `FrameTimer` currently holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    pub count: usize,
    pub average: Duration,
    pub min: Duration,
    pub max: Duration,
}

impl fmt::Display for FrameStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} frames, avg {:.2?}, min {:.2?}, max {:.2?}",
            self.count, self.average, self.min, self.max
        )
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(120)
    }
}

impl FrameTimer {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: vec![Duration::ZERO; capacity.max(1)],
            next: 0,
            filled: false,
        }
    }

    pub fn record(&mut self, elapsed: Duration) {
        self.history[self.next] = elapsed;
        self.next = (self.next + 1) % self.history.len();
        if self.next == 0 {
            self.filled = true;
        }
    }

    fn samples(&self) -> &[Duration] {
        if self.filled {
            &self.history
        } else {
            &self.history[..self.next]
        }
    }

    pub fn count(&self) -> usize {
        self.samples().len()
    }

    pub fn stats(&self) -> FrameStats {
        let samples = self.samples();
        if samples.is_empty() {
            return FrameStats::default();
        }
        let total: Duration = samples.iter().sum();
        FrameStats {
            count: samples.len(),
            average: total / samples.len() as u32,
            min: samples.iter().copied().min().unwrap_or_default(),
            max: samples.iter().copied().max().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_timer_reports_zero() {
        assert_eq!(FrameTimer::new(4).stats(), FrameStats::default());
    }

    #[test]
    fn tracks_history() {
        let mut timer = FrameTimer::new(3);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));

        let stats = timer.stats();
        assert_eq!(stats.count, 3);
        assert_eq!(stats.average, Duration::from_millis(20));
        assert_eq!(stats.min, Duration::from_millis(10));
        assert_eq!(stats.max, Duration::from_millis(30));
    }

    #[test]
    fn oldest_sample_is_overwritten() {
        let mut timer = FrameTimer::new(2);
        timer.record(Duration::from_millis(10));
        timer.record(Duration::from_millis(20));
        timer.record(Duration::from_millis(30));
        assert_eq!(timer.count(), 2);
        assert_eq!(timer.stats().average, Duration::from_millis(25));
    }
}
