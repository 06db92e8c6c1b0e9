use std::time::{Duration, Instant};
use crate::common::Detection;
use crate::data::{PipelineResult, PixelTensor};
use crate::utils;

/// On-device model runner supplied by the platform.
pub trait InferenceBackend {
    /// False until a model has been loaded.
    fn is_loaded(&self) -> bool;

    /// Runs the model once and returns every output buffer it produced.
    fn run(&mut self, input: &PixelTensor) -> anyhow::Result<Vec<Vec<f32>>>;
}

impl<B: InferenceBackend + ?Sized> InferenceBackend for Box<B> {
    fn is_loaded(&self) -> bool {
        (**self).is_loaded()
    }

    fn run(&mut self, input: &PixelTensor) -> anyhow::Result<Vec<Vec<f32>>> {
        (**self).run(input)
    }
}

/// Stage indices used when recording timings.
pub const STAGE_PREPROCESS: usize = 0;
pub const STAGE_INFERENCE: usize = 1;
pub const STAGE_POSTPROCESS: usize = 2;

pub trait InferenceProcess: Sized {
    type Input;

    /// Pre-process the input data.
    fn preprocess(&self, xs: &Self::Input) -> PipelineResult<PixelTensor>;

    /// Executes the model on the preprocessed data.
    fn inference(&mut self, xs: &PixelTensor) -> PipelineResult<Vec<Vec<f32>>>;

    /// Post-process the model's output.
    fn postprocess(&self, ys: &[Vec<f32>]) -> PipelineResult<Vec<Detection>>;

    /// Records how long one stage took.
    fn record(&mut self, stage: usize, elapsed: Duration);

    /// Marks a profiled run as complete.
    fn finish_run(&mut self);

    /// Executes the full pipeline.
    fn run(&mut self, xs: &Self::Input) -> PipelineResult<Vec<Detection>> {
        let ys = self.preprocess(xs)?;
        let ys = self.inference(&ys)?;
        self.postprocess(&ys)
    }

    /// Executes the full pipeline, optionally recording per-stage timings.
    fn forward(&mut self, xs: &Self::Input, profile: bool) -> PipelineResult<Vec<Detection>> {
        let detect_time = Instant::now();

        let t_pre = Instant::now();
        let ys = self.preprocess(xs)?;
        let t_pre = t_pre.elapsed();
        let elapsed = utils::trace("TIME", "Preprocessing input", detect_time, Duration::ZERO);

        let t_exe = Instant::now();
        let ys = self.inference(&ys)?;
        let t_exe = t_exe.elapsed();
        let elapsed = utils::trace("TIME", "Detection run", detect_time, elapsed);

        let t_post = Instant::now();
        let detections = self.postprocess(&ys)?;
        let t_post = t_post.elapsed();
        utils::trace("TIME", "Postprocessing", detect_time, elapsed);

        if profile {
            self.record(STAGE_PREPROCESS, t_pre);
            self.record(STAGE_INFERENCE, t_exe);
            self.record(STAGE_POSTPROCESS, t_post);
            self.finish_run();
            log::info!("> Preprocess: {t_pre:?} | Inference: {t_exe:?} | Postprocess: {t_post:?}");
        }

        Ok(detections)
    }
}
