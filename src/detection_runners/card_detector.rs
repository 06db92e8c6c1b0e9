use std::time::Duration;
use image::DynamicImage;
use crate::common::Detection;
use crate::data::{PipelineError, PipelineResult, PixelLayout, PixelTensor, TimeCalc};
use crate::detection_runners::image_ops;
use crate::detection_runners::inference_process::{InferenceBackend, InferenceProcess};
use crate::detection_runners::DetectionPipeline;

/// Photo in, overlay-ready card detections out.
#[derive(Debug)]
pub struct CardDetector<B> {
    backend: B,
    pipeline: DetectionPipeline,
    pixel_layout: PixelLayout,
    timings: TimeCalc,
}

impl<B: InferenceBackend> CardDetector<B> {
    pub fn new(backend: B, pipeline: DetectionPipeline) -> Self {
        Self {
            backend,
            pipeline,
            pixel_layout: PixelLayout::default(),
            timings: TimeCalc::default(),
        }
    }

    pub fn with_pixel_layout(mut self, layout: PixelLayout) -> Self {
        self.pixel_layout = layout;
        self
    }

    pub fn pipeline(&self) -> &DetectionPipeline {
        &self.pipeline
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn timings(&self) -> &TimeCalc {
        &self.timings
    }
}

impl<B: InferenceBackend> InferenceProcess for CardDetector<B> {
    type Input = DynamicImage;

    fn preprocess(&self, xs: &Self::Input) -> PipelineResult<PixelTensor> {
        let config = self.pipeline.config();
        image_ops::to_pixel_tensor(xs, config.width, config.height, self.pixel_layout)
            .map_err(|err| PipelineError::Preprocess(format!("{err:#}")))
    }

    fn inference(&mut self, xs: &PixelTensor) -> PipelineResult<Vec<Vec<f32>>> {
        if !self.backend.is_loaded() {
            return Err(PipelineError::ModelUnavailable("no model loaded".to_string()));
        }
        let outputs = self
            .backend
            .run(xs)
            .map_err(|err| PipelineError::ModelUnavailable(format!("inference failed: {err:#}")))?;
        if outputs.is_empty() {
            return Err(PipelineError::ModelUnavailable("inference returned no output buffer".to_string()));
        }
        Ok(outputs)
    }

    fn postprocess(&self, ys: &[Vec<f32>]) -> PipelineResult<Vec<Detection>> {
        self.pipeline.process_outputs(ys)
    }

    fn record(&mut self, stage: usize, elapsed: Duration) {
        self.timings.add_or_push(stage, elapsed);
    }

    fn finish_run(&mut self) {
        self.timings.finish_run();
    }
}
