use anyhow::Result;
use ndarray::{Array, Ix4};
use serde::{Deserialize, Serialize};

/// Memory order of the model's image input.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelLayout {
    /// `[1, H, W, 3]`, interleaved RGB.
    #[default]
    Nhwc,
    /// `[1, 3, H, W]`, one plane per channel.
    Nchw,
}

/// Normalized RGB float32 model input, wrapper over [`Array<f32, Ix4>`].
#[derive(Debug, Clone, PartialEq)]
pub struct PixelTensor {
    data: Array<f32, Ix4>,
    layout: PixelLayout,
}

impl std::ops::Deref for PixelTensor {
    type Target = Array<f32, Ix4>;

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl PixelTensor {
    /// Wraps a flat buffer produced for a `width` x `height` RGB image.
    pub fn from_vec(values: Vec<f32>, width: u32, height: u32, layout: PixelLayout) -> Result<Self> {
        let (w, h) = (width as usize, height as usize);
        let data = match layout {
            PixelLayout::Nhwc => Array::from_shape_vec((1, h, w, 3), values)?,
            PixelLayout::Nchw => Array::from_shape_vec((1, 3, h, w), values)?,
        };
        Ok(Self { data, layout })
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn width(&self) -> usize {
        match self.layout {
            PixelLayout::Nhwc => self.data.shape()[2],
            PixelLayout::Nchw => self.data.shape()[3],
        }
    }

    pub fn height(&self) -> usize {
        match self.layout {
            PixelLayout::Nhwc => self.data.shape()[1],
            PixelLayout::Nchw => self.data.shape()[2],
        }
    }

    /// Contiguous view handed to the inference backend.
    pub fn as_slice(&self) -> Option<&[f32]> {
        self.data.as_slice()
    }
}
