mod error;
mod pixel_tensor;
mod send_channels;
mod time_calc;

pub use error::{PipelineError, PipelineResult};
pub use pixel_tensor::{PixelLayout, PixelTensor};
pub use send_channels::*;
pub use time_calc::TimeCalc;
