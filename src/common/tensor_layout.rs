use std::str::FromStr;
use serde::{Deserialize, Serialize};
use crate::data::PipelineError;

/// Number of leading box channels (`xc, yc, w, h`) in every export.
pub const BOX_CHANNELS: usize = 4;

/// Offset of the objectness channel when the export has one.
pub const OBJECTNESS_CHANNEL: usize = 4;

/// How slots and channels are addressed in the flat output buffer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TensorLayout {
    /// `[numDetections, numChannels]`: channel `c` of slot `i` at `i * numChannels + c`.
    RowMajor,
    /// `[numChannels, numDetections]`: channel `c` of slot `i` at `c * numDetections + i`.
    #[default]
    PlaneMajor,
}

impl TensorLayout {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RowMajor => "row_major",
            Self::PlaneMajor => "plane_major",
        }
    }
}

impl FromStr for TensorLayout {
    type Err = PipelineError;

    fn from_str(layout: &str) -> Result<Self, Self::Err> {
        match layout.to_lowercase().replace('-', "_").as_str() {
            "row_major" | "rows" | "nac" => Ok(Self::RowMajor),
            "plane_major" | "planes" | "nca" => Ok(Self::PlaneMajor),
            _ => Err(PipelineError::InvalidConfig(format!("unknown tensor layout '{}'", layout))),
        }
    }
}

/// Where a slot's primary confidence comes from.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfidenceSource {
    /// Explicit objectness channel at [`OBJECTNESS_CHANNEL`], class scores follow it.
    Objectness,
    /// No objectness channel; the maximum class score is the confidence.
    #[default]
    MaxClassScore,
}

impl ConfidenceSource {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Objectness => "objectness",
            Self::MaxClassScore => "max_class_score",
        }
    }

    /// Channels that precede the class-score vector.
    pub fn header_channels(&self) -> usize {
        match self {
            Self::Objectness => BOX_CHANNELS + 1,
            Self::MaxClassScore => BOX_CHANNELS,
        }
    }

    /// Derives the class-vector length for a given channel count.
    pub fn num_classes(&self, num_channels: usize) -> Option<usize> {
        num_channels.checked_sub(self.header_channels())
    }
}

impl FromStr for ConfidenceSource {
    type Err = PipelineError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        match source.to_lowercase().replace('-', "_").as_str() {
            "objectness" | "obj" | "conf" => Ok(Self::Objectness),
            "max_class_score" | "max_class" | "clss" => Ok(Self::MaxClassScore),
            _ => Err(PipelineError::InvalidConfig(format!("unknown confidence source '{}'", source))),
        }
    }
}

/// Layout and confidence semantics of one model export.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelExport {
    pub layout: TensorLayout,
    pub confidence: ConfidenceSource,
}

impl ModelExport {
    pub fn new(layout: TensorLayout, confidence: ConfidenceSource) -> Self {
        Self { layout, confidence }
    }

    /// Card-deck export: `[1, 4 + nc, 8400]`, no objectness channel.
    pub fn card_deck() -> Self {
        Self::new(TensorLayout::PlaneMajor, ConfidenceSource::MaxClassScore)
    }

    /// Anchor-first export with objectness: `[1, 8400, 5 + nc]`.
    pub fn objectness_rows() -> Self {
        Self::new(TensorLayout::RowMajor, ConfidenceSource::Objectness)
    }
}

impl FromStr for ModelExport {
    type Err = PipelineError;

    fn from_str(export: &str) -> Result<Self, Self::Err> {
        match export.to_lowercase().as_str() {
            "card_deck" | "yolov8" | "yolov11" => Ok(Self::card_deck()),
            "objectness_rows" | "yolov5" => Ok(Self::objectness_rows()),
            _ => Err(PipelineError::InvalidConfig(format!("unknown model export '{}'", export))),
        }
    }
}
