use crate::common::{CardBox, Detection, LabelTable, PipelineConfig, RawDetection};

/// Index of the highest class score, lowest index on ties. `None` if no score is comparable.
pub fn resolve_class(scores: &[f32]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (class_id, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((class_id, score)),
        }
    }
    best.map(|(class_id, _)| class_id)
}

/// Maps normalized `(cx, cy, w, h)` geometry onto the model's input resolution
/// and attaches the winning class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    width: f32,
    height: f32,
}

impl CoordinateMapper {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width as f32,
            height: height as f32,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.width, config.height)
    }

    /// `x = (xc ± w/2) * width`, `y = (yc ± h/2) * height`.
    pub fn to_pixels(&self, raw: &RawDetection) -> CardBox {
        raw.normalized_box().scale_to(self.width, self.height)
    }

    /// Builds the final detection. Confidence is carried over untouched from decoding.
    pub fn map(&self, raw: &RawDetection, labels: &LabelTable) -> Option<Detection> {
        let class_id = resolve_class(&raw.class_scores)?;
        let mut detection = Detection::new(class_id, self.to_pixels(raw), None, raw.confidence)
            .with_slot(raw.slot);
        if let Some(label) = labels.get(class_id) {
            detection = detection.with_label(label);
        }
        Some(detection)
    }
}
