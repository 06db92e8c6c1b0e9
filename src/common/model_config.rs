use std::fmt;
use std::path::Path;
use std::sync::Arc;
use serde::Deserialize;
use crate::common::{ConfidenceSource, LabelTable, ModelExport, TensorLayout};
use crate::data::PipelineError;

pub const DEFAULT_NUM_DETECTIONS: usize = 8400;
pub const DEFAULT_NUM_CHANNELS: usize = 56;
pub const DEFAULT_CONF_THRESHOLD: f32 = 0.5;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.4;
pub const DEFAULT_INPUT_SIZE: u32 = 640;

/// Everything the post-processing pipeline needs to know about one model export.
///
/// Defaults describe the card-deck export: `[1, 56, 8400]` plane-major output
/// without an objectness channel, 640x640 input.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub num_detections: usize,
    pub num_channels: usize,
    pub layout: TensorLayout,
    pub confidence_source: ConfidenceSource,
    pub conf_threshold: f32,
    pub iou_threshold: f32,
    pub width: u32,
    pub height: u32,
    /// Which output of a multi-output model holds the detection tensor.
    pub output_index: usize,
    pub labels_path: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_detections: DEFAULT_NUM_DETECTIONS,
            num_channels: DEFAULT_NUM_CHANNELS,
            layout: TensorLayout::PlaneMajor,
            confidence_source: ConfidenceSource::MaxClassScore,
            conf_threshold: DEFAULT_CONF_THRESHOLD,
            iou_threshold: DEFAULT_IOU_THRESHOLD,
            width: DEFAULT_INPUT_SIZE,
            height: DEFAULT_INPUT_SIZE,
            output_index: 0,
            labels_path: None,
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn from_json_str(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&raw)?;
        log::info!("Loaded pipeline config from {}", path.as_ref().display());
        Ok(config)
    }

    pub fn with_num_detections(mut self, num_detections: usize) -> Self {
        self.num_detections = num_detections;
        self
    }

    pub fn with_num_channels(mut self, num_channels: usize) -> Self {
        self.num_channels = num_channels;
        self
    }

    pub fn with_layout(mut self, layout: TensorLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_confidence_source(mut self, source: ConfidenceSource) -> Self {
        self.confidence_source = source;
        self
    }

    pub fn with_export(self, export: ModelExport) -> Self {
        self.with_layout(export.layout)
            .with_confidence_source(export.confidence)
    }

    pub fn with_conf_threshold(mut self, threshold: f32) -> Self {
        self.conf_threshold = threshold;
        self
    }

    pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
        self.iou_threshold = threshold;
        self
    }

    pub fn with_input_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    pub fn with_output_index(mut self, index: usize) -> Self {
        self.output_index = index;
        self
    }

    pub fn with_labels_path(mut self, path: &str) -> Self {
        self.labels_path = Some(path.to_string());
        self
    }

    pub fn export(&self) -> ModelExport {
        ModelExport::new(self.layout, self.confidence_source)
    }

    /// Expected length of the raw output buffer, `None` if it does not fit in `usize`.
    pub fn buffer_len(&self) -> Option<usize> {
        self.num_detections.checked_mul(self.num_channels)
    }

    /// Length of the class-score vector derived from `num_channels` and the confidence source.
    pub fn num_classes(&self) -> Option<usize> {
        self.confidence_source.num_classes(self.num_channels)
    }

    /// Loads the label table named by `labels_path`, or shares the built-in card deck.
    pub fn load_labels(&self) -> anyhow::Result<Arc<LabelTable>> {
        match &self.labels_path {
            Some(path) => Ok(Arc::new(LabelTable::from_file(path)?)),
            None => Ok(LabelTable::shared_cards()),
        }
    }

    /// Checks dimensions and thresholds, and that the class count matches `labels`.
    pub fn validate(&self, labels: &LabelTable) -> Result<(), PipelineError> {
        if self.num_detections == 0 {
            return Err(PipelineError::InvalidConfig("num_detections must be positive".to_string()));
        }
        if self.buffer_len().is_none() {
            return Err(PipelineError::InvalidConfig(format!(
                "{} slots x {} channels overflows the output buffer length",
                self.num_detections, self.num_channels
            )));
        }
        if self.width == 0 || self.height == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "input resolution must be positive, got {}x{}", self.width, self.height
            )));
        }
        for (name, value) in [("conf_threshold", self.conf_threshold), ("iou_threshold", self.iou_threshold)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PipelineError::InvalidConfig(format!("{} must be within [0, 1], got {}", name, value)));
            }
        }
        let classes = match self.num_classes() {
            Some(n) if n > 0 => n,
            _ => return Err(PipelineError::InvalidConfig(format!(
                "{} channels leave no class scores for a {} export",
                self.num_channels,
                self.confidence_source.name()
            ))),
        };
        if classes != labels.len() {
            return Err(PipelineError::LabelMismatch { classes, labels: labels.len() });
        }
        Ok(())
    }
}

impl fmt::Display for PipelineConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Output Tensor: {} slots x {} channels ({})\n\
        Confidence Source: {}\n\
        Labels Path: {}\n\
        Model Input Resolution: {}x{}\n\
        Output Index: {}\n\
        Confidence Threshold: {}\n\
        IoU Threshold: {}",
               self.num_detections, self.num_channels, self.layout.name(),
               self.confidence_source.name(),
               self.labels_path.as_deref().unwrap_or("<built-in card deck>"),
               self.width, self.height, self.output_index,
               self.conf_threshold, self.iou_threshold)
    }
}
