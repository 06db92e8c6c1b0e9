use image::DynamicImage;
use crate::common::Detection;
use crate::data::PipelineResult;

/// A captured photo tagged with a monotonically increasing sequence number.
#[derive(Debug, Clone)]
pub struct CaptureFrame {
    pub seq: u64,
    pub image: DynamicImage,
}

/// Result of running the detector over one [`CaptureFrame`].
#[derive(Debug, Clone, PartialEq)]
pub struct DetectionFrame {
    pub seq: u64,
    pub result: PipelineResult<Vec<Detection>>,
}

/// Worker side of the detector channels.
#[derive(Debug)]
pub struct DetectionState {
    pub opt_rx: crossbeam_channel::Receiver<Box<CaptureFrame>>,
    pub det_tx: crossbeam_channel::Sender<Box<DetectionFrame>>,
}

/// Screen side of the detector channels.
#[derive(Debug)]
pub struct SendState {
    pub opt_tx: crossbeam_channel::Sender<Box<CaptureFrame>>,
    pub det_rx: crossbeam_channel::Receiver<Box<DetectionFrame>>,
}

pub fn detection_channels() -> (SendState, DetectionState) {
    let (opt_tx, opt_rx) = crossbeam_channel::unbounded();
    let (det_tx, det_rx) = crossbeam_channel::unbounded();
    (SendState { opt_tx, det_rx }, DetectionState { opt_rx, det_tx })
}

/// What the overlay currently shows.
///
/// Each applied frame replaces the previous detections wholesale; frames older
/// than the one on screen are discarded.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OverlayState {
    seq: Option<u64>,
    detections: Vec<Detection>,
}

impl OverlayState {
    pub fn seq(&self) -> Option<u64> {
        self.seq
    }

    pub fn detections(&self) -> &[Detection] {
        &self.detections
    }

    /// Returns false when the frame was stale and ignored.
    ///
    /// A failed frame still advances the sequence and clears the overlay.
    pub fn apply(&mut self, frame: DetectionFrame) -> bool {
        if matches!(self.seq, Some(current) if frame.seq < current) {
            log::debug!("Discarding stale detections for frame {}", frame.seq);
            return false;
        }
        self.seq = Some(frame.seq);
        self.detections = match frame.result {
            Ok(detections) => detections,
            Err(err) => {
                log::warn!("Frame {} failed: {}", frame.seq, err);
                Vec::new()
            }
        };
        true
    }
}
