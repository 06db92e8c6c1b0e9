use crate::common::CardBox;
use crate::detection_runners::iou::iou_cxcywh;
use crate::detection_runners::nms::Nms;

/// One decoded candidate slot, still in normalized model coordinates.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RawDetection {
    pub slot: usize,
    pub xc: f32,
    pub yc: f32,
    pub w: f32,
    pub h: f32,
    /// Objectness or max class score, depending on the configured export.
    pub confidence: f32,
    pub class_scores: Vec<f32>,
}

impl Nms for RawDetection {
    /// Computes the intersection over union (IoU) between this slot's box and another.
    fn iou(&self, other: &Self) -> f32 {
        iou_cxcywh(self.cxcywh(), other.cxcywh())
    }

    /// Returns the confidence score of the slot.
    fn confidence(&self) -> f32 {
        self.confidence
    }

    fn slot(&self) -> usize {
        self.slot
    }
}

impl RawDetection {
    pub fn new(slot: usize, xc: f32, yc: f32, w: f32, h: f32, confidence: f32, class_scores: Vec<f32>) -> Self {
        Self {
            slot,
            xc,
            yc,
            w,
            h,
            confidence,
            class_scores,
        }
    }

    /// Returns the normalized box as `(cx, cy, w, h)`.
    pub fn cxcywh(&self) -> (f32, f32, f32, f32) {
        (self.xc, self.yc, self.w, self.h)
    }

    /// Normalized corner box.
    pub fn normalized_box(&self) -> CardBox {
        CardBox::default().with_cxcy_wh(self.xc, self.yc, self.w, self.h)
    }
}
