use ndarray::{s, ArrayView1, ArrayView2, ShapeError};
use crate::common::{ConfidenceSource, PipelineConfig, RawDetection, TensorLayout, OBJECTNESS_CHANNEL};
use crate::data::{PipelineError, PipelineResult};

/// Splits the flat output buffer into one [`RawDetection`] per slot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TensorDecoder {
    num_detections: usize,
    num_channels: usize,
    buffer_len: usize,
    layout: TensorLayout,
    confidence: ConfidenceSource,
}

impl TensorDecoder {
    pub fn new(
        num_detections: usize,
        num_channels: usize,
        layout: TensorLayout,
        confidence: ConfidenceSource,
    ) -> PipelineResult<Self> {
        if num_channels <= confidence.header_channels() {
            return Err(PipelineError::InvalidConfig(format!(
                "{} channels leave no class scores for a {} export",
                num_channels,
                confidence.name()
            )));
        }
        let buffer_len = num_detections.checked_mul(num_channels).ok_or_else(|| {
            PipelineError::InvalidConfig(format!(
                "{} slots x {} channels overflows the output buffer length",
                num_detections, num_channels
            ))
        })?;
        Ok(Self {
            num_detections,
            num_channels,
            buffer_len,
            layout,
            confidence,
        })
    }

    pub fn from_config(config: &PipelineConfig) -> PipelineResult<Self> {
        Self::new(config.num_detections, config.num_channels, config.layout, config.confidence_source)
    }

    pub fn num_classes(&self) -> usize {
        self.num_channels - self.confidence.header_channels()
    }

    pub fn buffer_len(&self) -> usize {
        self.buffer_len
    }

    /// Decodes every slot in order. The buffer length is checked before any slot is read.
    pub fn decode(&self, buffer: &[f32]) -> PipelineResult<Vec<RawDetection>> {
        let slots = self.slot_view(buffer)?;
        Ok(slots
            .outer_iter()
            .enumerate()
            .map(|(slot, channels)| self.decode_slot(slot, channels))
            .collect())
    }

    /// `[slot, channel]` view over the buffer regardless of the export's addressing.
    fn slot_view<'a>(&self, buffer: &'a [f32]) -> PipelineResult<ArrayView2<'a, f32>> {
        let expected = self.buffer_len;
        if buffer.len() != expected {
            return Err(PipelineError::InvalidBuffer { expected, got: buffer.len() });
        }
        let invalid = |_: ShapeError| PipelineError::InvalidBuffer { expected, got: buffer.len() };
        match self.layout {
            TensorLayout::RowMajor => {
                ArrayView2::from_shape((self.num_detections, self.num_channels), buffer).map_err(invalid)
            }
            TensorLayout::PlaneMajor => ArrayView2::from_shape((self.num_channels, self.num_detections), buffer)
                .map(|planes| planes.reversed_axes())
                .map_err(invalid),
        }
    }

    fn decode_slot(&self, slot: usize, channels: ArrayView1<f32>) -> RawDetection {
        let class_scores = channels.slice(s![self.confidence.header_channels()..]).to_vec();
        let confidence = match self.confidence {
            ConfidenceSource::Objectness => channels[OBJECTNESS_CHANNEL],
            ConfidenceSource::MaxClassScore => class_scores.iter().copied().fold(f32::NEG_INFINITY, f32::max),
        };

        RawDetection::new(slot, channels[0], channels[1], channels[2], channels[3], confidence, class_scores)
    }
}
