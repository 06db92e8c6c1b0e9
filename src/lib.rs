mod utils;
pub mod common;
pub mod data;
pub mod detection_runners;
pub mod detectors;

use std::time::Instant;
use image::DynamicImage;
use crate::common::{Detection, PipelineConfig};
use crate::data::PipelineResult;
use crate::detection_runners::{CardDetector, DetectionPipeline, InferenceBackend, InferenceProcess};

pub use crate::data::{PipelineError, PipelineResult as Result};

/// Builds a detector around `backend` once the config has been checked against its label table.
pub fn init_detector<B: InferenceBackend>(config: PipelineConfig, backend: B) -> anyhow::Result<CardDetector<B>> {
    let labels = config.load_labels()?;
    log::info!("Initializing card detector with {} labels\n{}", labels.len(), config);
    let pipeline = DetectionPipeline::new(config, labels)?;

    if !backend.is_loaded() {
        log::warn!("Card detector created before a model was loaded");
    }
    Ok(CardDetector::new(backend, pipeline))
}

pub fn run_detection<B: InferenceBackend>(detector: &mut CardDetector<B>, image: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
    let now = Instant::now();

    let detections = detector.forward(image, false)?;

    log::debug!("Processing time: {:?}", now.elapsed());

    Ok(detections)
}

/// Post-processes one raw buffer from the default card-deck export.
pub fn parse_detections(buffer: &[f32], conf_threshold: f32, iou_threshold: f32) -> PipelineResult<Vec<Detection>> {
    let config = PipelineConfig::default()
        .with_conf_threshold(conf_threshold)
        .with_iou_threshold(iou_threshold);
    DetectionPipeline::new(config, common::LabelTable::shared_cards())?.process(buffer)
}
