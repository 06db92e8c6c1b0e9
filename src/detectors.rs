use std::thread::{self, JoinHandle};
use crate::data::{detection_channels, DetectionFrame, DetectionState, SendState};
use crate::detection_runners::{CardDetector, InferenceBackend, InferenceProcess};

/// Serves frames until the capture side hangs up.
///
/// When several frames are queued only the newest is processed; the rest are
/// already stale for the overlay.
pub fn detector_loop<B: InferenceBackend>(detector: &mut CardDetector<B>, state: DetectionState) -> anyhow::Result<()> {
    loop {
        let mut frame = match state.opt_rx.recv() {
            Ok(frame) => frame,
            Err(_) => {
                log::info!("card_detect: capture channel closed, stopping detector");
                return Ok(());
            }
        };
        while let Ok(newer) = state.opt_rx.try_recv() {
            log::warn!("card_detect: dropping stale frame {}", frame.seq);
            frame = newer;
        }

        let result = detector.forward(&frame.image, log::log_enabled!(log::Level::Debug));
        if let Err(err) = &result {
            log::error!("card_detect: frame {} failed: {}", frame.seq, err);
        }

        if state.det_tx.send(Box::new(DetectionFrame { seq: frame.seq, result })).is_err() {
            log::info!("card_detect: overlay channel closed, stopping detector");
            return Ok(());
        }
    }
}

/// Moves `detector` onto its own thread and returns the screen's ends of the channels.
pub fn spawn_detector<B>(mut detector: CardDetector<B>) -> anyhow::Result<(SendState, JoinHandle<anyhow::Result<()>>)>
where
    B: InferenceBackend + Send + 'static,
{
    let (send_state, detection_state) = detection_channels();
    let handle = thread::Builder::new()
        .name("card-detector".to_string())
        .spawn(move || detector_loop(&mut detector, detection_state))?;
    Ok((send_state, handle))
}
