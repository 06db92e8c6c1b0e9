use std::time::Duration;

/// Accumulates per-stage durations across runs.
#[derive(Debug, Default, Clone)]
pub struct TimeCalc {
    runs: usize,
    duration: Vec<Duration>,
}

impl TimeCalc {
    pub fn total(&self) -> Duration {
        self.duration.iter().sum::<Duration>()
    }

    /// Number of completed runs.
    pub fn runs(&self) -> usize {
        self.runs
    }

    /// Average wall time of one run across all stages.
    pub fn avg(&self) -> Option<Duration> {
        (self.runs > 0).then(|| self.total() / self.runs as u32)
    }

    /// Average time of stage `i`.
    pub fn avg_i(&self, i: usize) -> Option<Duration> {
        if self.runs == 0 {
            return None;
        }
        self.duration.get(i).map(|d| *d / self.runs as u32)
    }

    pub fn ts(&self) -> &[Duration] {
        &self.duration
    }

    pub fn add_or_push(&mut self, i: usize, x: Duration) {
        match self.duration.get_mut(i) {
            Some(elem) => *elem += x,
            None => {
                self.duration.resize(i, Duration::ZERO);
                self.duration.push(x);
            }
        }
    }

    /// Marks the end of one run.
    pub fn finish_run(&mut self) {
        self.runs += 1;
    }

    pub fn clear(&mut self) {
        self.runs = Default::default();
        self.duration = Default::default();
    }
}
