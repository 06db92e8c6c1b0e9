use std::sync::Arc;
use std::time::{Duration, Instant};
use rayon::prelude::*;
use crate::common::{Detection, LabelTable, PipelineConfig, RawDetection};
use crate::data::{PipelineError, PipelineResult};
use crate::detection_runners::{ConfidenceFilter, CoordinateMapper, NonMaxSuppressor, TensorDecoder};
use crate::utils;

/// Decode → filter → NMS → map, for one model export.
///
/// Holds only immutable configuration, so one instance can be shared across threads
/// and every call starts from scratch.
#[derive(Debug, Clone)]
pub struct DetectionPipeline {
    config: PipelineConfig,
    labels: Arc<LabelTable>,
    decoder: TensorDecoder,
    filter: ConfidenceFilter,
    suppressor: NonMaxSuppressor,
    mapper: CoordinateMapper,
}

impl DetectionPipeline {
    /// Validates `config` against `labels` before building the stages.
    pub fn new(config: PipelineConfig, labels: Arc<LabelTable>) -> PipelineResult<Self> {
        config.validate(&labels)?;
        let decoder = TensorDecoder::from_config(&config)?;
        Ok(Self {
            filter: ConfidenceFilter::new(config.conf_threshold),
            suppressor: NonMaxSuppressor::new(config.iou_threshold),
            mapper: CoordinateMapper::from_config(&config),
            decoder,
            labels,
            config,
        })
    }

    /// Default card-deck export with the built-in 52-card table.
    pub fn card_deck() -> PipelineResult<Self> {
        Self::new(PipelineConfig::default(), LabelTable::shared_cards())
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn decode(&self, buffer: &[f32]) -> PipelineResult<Vec<RawDetection>> {
        self.decoder.decode(buffer)
    }

    /// Runs the whole post-processing chain over one raw output buffer.
    pub fn process(&self, buffer: &[f32]) -> PipelineResult<Vec<Detection>> {
        let start = Instant::now();
        let decoded = self.decoder.decode(buffer)?;
        let decoded_count = decoded.len();
        let elapsed = utils::trace("POST", "Decode", start, Duration::ZERO);

        let filtered = self.filter.apply(decoded);
        let filtered_count = filtered.len();
        let elapsed = utils::trace("POST", "Confidence filter", start, elapsed);

        let kept = self.suppressor.suppress(filtered);
        let elapsed = utils::trace("POST", "NMS", start, elapsed);

        let detections: Vec<Detection> = kept
            .iter()
            .filter_map(|raw| {
                let detection = self.mapper.map(raw, &self.labels);
                if detection.is_none() {
                    log::debug!("Slot {} has no comparable class score, dropping it", raw.slot);
                }
                detection
            })
            .collect();
        utils::trace("POST", "Map", start, elapsed);

        log::debug!(
            "Decoded {} slots, {} above {}, {} after NMS",
            decoded_count, filtered_count, self.filter.threshold(), detections.len()
        );
        Ok(detections)
    }

    /// Picks `config.output_index` out of a multi-output inference result and processes it.
    pub fn process_outputs(&self, outputs: &[Vec<f32>]) -> PipelineResult<Vec<Detection>> {
        let buffer = outputs.get(self.config.output_index).ok_or_else(|| {
            PipelineError::ModelUnavailable(format!(
                "inference returned {} outputs, expected one at index {}",
                outputs.len(),
                self.config.output_index
            ))
        })?;
        self.process(buffer)
    }

    /// Processes independent buffers in parallel; each buffer's result is independent.
    pub fn process_batch(&self, buffers: &[Vec<f32>]) -> Vec<PipelineResult<Vec<Detection>>> {
        buffers
            .par_iter()
            .map(|buffer| self.process(buffer))
            .collect()
    }
}
