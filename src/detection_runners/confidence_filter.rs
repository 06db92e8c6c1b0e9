use crate::common::DEFAULT_CONF_THRESHOLD;
use crate::detection_runners::nms::Nms;

/// Drops candidates whose primary confidence is not strictly above the threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceFilter {
    threshold: f32,
}

impl Default for ConfidenceFilter {
    fn default() -> Self {
        Self::new(DEFAULT_CONF_THRESHOLD)
    }
}

impl ConfidenceFilter {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn accepts(&self, confidence: f32) -> bool {
        confidence > self.threshold
    }

    /// Order of the survivors is the input order. NaN never passes.
    pub fn apply<T: Nms>(&self, candidates: Vec<T>) -> Vec<T> {
        candidates
            .into_iter()
            .filter(|c| self.accepts(c.confidence()))
            .collect()
    }
}
