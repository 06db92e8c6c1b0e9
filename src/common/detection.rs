use serde::{Deserialize, Serialize};
use crate::common::CardBox;
use crate::detection_runners::nms::Nms;

/// Final, pixel-space detection handed to the overlay renderer.
#[derive(Default, Debug, Clone, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Detection {
    pub slot: usize,
    pub class_id: usize,
    pub bbox: CardBox,
    pub label: Option<String>,
    pub confidence: f32,
}

impl Nms for Detection {
    /// Computes the intersection over union (IoU) between this bounding box and another.
    fn iou(&self, other: &Self) -> f32 {
        let union = self.union(other);
        if union > 0. {
            self.intersect(other) / union
        } else {
            0.
        }
    }

    /// Returns the confidence score of the bounding box.
    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn slot(&self) -> usize {
        self.slot
    }
}

impl Detection {
    pub fn new(class_id: usize, bbox: CardBox, label: Option<String>, confidence: f32) -> Self {
        Self {
            slot: 0,
            class_id,
            bbox,
            label,
            confidence,
        }
    }

    /// Sets the slot the detection was decoded from.
    pub fn with_slot(mut self, slot: usize) -> Self {
        self.slot = slot;
        self
    }

    /// Sets the optional label of the detection.
    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn get_label(&self) -> String {
        self.label.clone().unwrap_or("Unknown".to_string())
    }

    /// Computes the intersection area between this detection and another.
    pub fn intersect(&self, other: &Detection) -> f32 {
        self.bbox.intersect(&other.bbox)
    }

    /// Computes the union area between this bounding box and another.
    pub fn union(&self, other: &Detection) -> f32 {
        self.bbox.union(&other.bbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlabelled_detection_reads_unknown() {
        let det = Detection::new(3, CardBox::default(), None, 0.7);
        assert_eq!(det.get_label(), "Unknown");
        assert_eq!(det.with_label("10S").get_label(), "10S");
    }

    #[test]
    fn degenerate_boxes_have_zero_iou() {
        let a = Detection::new(0, CardBox::default(), None, 0.9);
        assert_eq!(a.iou(&a.clone().with_slot(1)), 0.0);

        let b = Detection::new(0, CardBox::new(0., 0., 10., 10.), None, 0.9);
        let c = Detection::new(0, CardBox::new(5., 0., 15., 10.), None, 0.8);
        assert!((b.iou(&c) - 1.0 / 3.0).abs() < 1e-6);
    }
}
