use std::cmp::Ordering;
use crate::common::DEFAULT_IOU_THRESHOLD;

/// Anything that can take part in non-maximum suppression.
pub trait Nms {
    fn iou(&self, other: &Self) -> f32;
    fn confidence(&self) -> f32;
    /// Slot the candidate was decoded from, used to break confidence ties.
    fn slot(&self) -> usize;
}

/// Descending confidence, then ascending slot.
pub fn rank<T: Nms>(a: &T, b: &T) -> Ordering {
    b.confidence()
        .total_cmp(&a.confidence())
        .then_with(|| a.slot().cmp(&b.slot()))
}

/// Greedy, class-agnostic non-maximum suppression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NonMaxSuppressor {
    iou_threshold: f32,
}

impl Default for NonMaxSuppressor {
    fn default() -> Self {
        Self::new(DEFAULT_IOU_THRESHOLD)
    }
}

impl NonMaxSuppressor {
    pub fn new(iou_threshold: f32) -> Self {
        Self { iou_threshold }
    }

    pub fn iou_threshold(&self) -> f32 {
        self.iou_threshold
    }

    /// Keeps the best candidate of every overlapping cluster.
    ///
    /// Candidates are visited in [`rank`] order; a kept candidate suppresses every
    /// remaining one whose IoU with it exceeds the threshold. Bookkeeping is a
    /// boolean array indexed by input position, so the pass is O(n²) with no hashing.
    /// Output is in descending confidence order.
    pub fn suppress<T: Nms>(&self, candidates: Vec<T>) -> Vec<T> {
        let n = candidates.len();
        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&a, &b| rank(&candidates[a], &candidates[b]).then(a.cmp(&b)));

        let mut suppressed = vec![false; n];
        let mut keep = Vec::new();

        for (pos, &i) in order.iter().enumerate() {
            if suppressed[i] {
                continue;
            }
            suppressed[i] = true;
            keep.push(i);

            for &j in &order[pos + 1..] {
                if suppressed[j] {
                    continue;
                }
                if candidates[i].iou(&candidates[j]) > self.iou_threshold {
                    suppressed[j] = true;
                }
            }
        }

        let mut arena: Vec<Option<T>> = candidates.into_iter().map(Some).collect();
        keep.into_iter().filter_map(|i| arena[i].take()).collect()
    }
}
