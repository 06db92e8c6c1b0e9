//! Image to model-input conversion.

use anyhow::{bail, Result};
use fast_image_resize::{FilterType, ResizeAlg, ResizeOptions, Resizer};
use image::imageops::FilterType as ImageFilter;
use image::{DynamicImage, RgbImage};
use crate::data::{PixelLayout, PixelTensor};

/// Stretches `image` to exactly `width` x `height` RGB, ignoring aspect ratio.
pub fn resize_exact(image: &DynamicImage, width: u32, height: u32) -> RgbImage {
    let src = DynamicImage::ImageRgb8(image.to_rgb8());
    if src.width() == width && src.height() == height {
        return src.into_rgb8();
    }

    let mut resizer = Resizer::new();
    let options = ResizeOptions::new().resize_alg(ResizeAlg::Convolution(FilterType::Bilinear));

    let mut dst = DynamicImage::new_rgb8(width, height);
    if let Err(err) = resizer.resize(&src, &mut dst, &options) {
        log::warn!("Failed to use `fast_image_resize` ({}). Falling back.", err);
        return image::imageops::resize(&src.to_rgb8(), width, height, ImageFilter::Triangle);
    }
    dst.into_rgb8()
}

/// Scales every byte to `[0, 1]` and lays the pixels out as `layout`.
pub fn normalize_rgb(img: &RgbImage, layout: PixelLayout) -> Result<PixelTensor> {
    let buf = img.as_raw();
    let (w, h) = (img.width() as usize, img.height() as usize);
    if buf.len() != w * h * 3 {
        bail!("Unexpected buffer size: got {}, expected {}", buf.len(), w * h * 3);
    }

    let values = match layout {
        PixelLayout::Nhwc => buf.iter().map(|&v| v as f32 / 255.0).collect(),
        PixelLayout::Nchw => {
            let hw = w * h;
            let mut out = vec![0.0f32; buf.len()];
            for i in 0..hw {
                out[i] = buf[3 * i] as f32 / 255.0;
                out[i + hw] = buf[3 * i + 1] as f32 / 255.0;
                out[i + 2 * hw] = buf[3 * i + 2] as f32 / 255.0;
            }
            out
        }
    };

    PixelTensor::from_vec(values, img.width(), img.height(), layout)
}

/// Resize + normalize in one go.
pub fn to_pixel_tensor(image: &DynamicImage, width: u32, height: u32, layout: PixelLayout) -> Result<PixelTensor> {
    if image.width() == 0 || image.height() == 0 {
        bail!("Cannot convert an empty {}x{} image", image.width(), image.height());
    }
    let resized = resize_exact(image, width, height);
    normalize_rgb(&resized, layout)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    fn two_pixels() -> RgbImage {
        RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([255, 0, 51]) } else { Rgb([0, 255, 102]) })
    }

    #[test]
    fn nhwc_keeps_pixels_interleaved() {
        let t = normalize_rgb(&two_pixels(), PixelLayout::Nhwc).unwrap();
        assert_eq!(t.shape(), &[1, 1, 2, 3]);
        assert_eq!(t.as_slice().unwrap(), &[1.0, 0.0, 0.2, 0.0, 1.0, 0.4]);
    }

    #[test]
    fn nchw_splits_planes() {
        let t = normalize_rgb(&two_pixels(), PixelLayout::Nchw).unwrap();
        assert_eq!(t.shape(), &[1, 3, 1, 2]);
        assert_eq!(t.as_slice().unwrap(), &[1.0, 0.0, 0.0, 1.0, 0.2, 0.4]);
        assert_eq!((t.width(), t.height()), (2, 1));
    }

    #[test]
    fn resizes_to_model_input() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(30, 20, Rgb([10, 20, 30])));
        let t = to_pixel_tensor(&img, 16, 16, PixelLayout::Nhwc).unwrap();
        assert_eq!(t.shape(), &[1, 16, 16, 3]);
        assert_eq!(t.len(), 16 * 16 * 3);
    }

    #[test]
    fn empty_image_is_rejected() {
        assert!(to_pixel_tensor(&DynamicImage::new_rgb8(0, 0), 16, 16, PixelLayout::Nhwc).is_err());
    }
}
