// Conversions between decoder tensors and pixel images.
//
// Decoded images arrive as channel-major floats in [-1, 1]. A value `v` maps
// to the byte `clamp_byte((v + 1) / 2)`, which scales by 255 and truncates,
// so 0.0 lands on 127 and 1.0 on 255. Out-of-range values clamp rather than
// wrap. The reverse direction (`rgba_to_tensor`) is provided for feeding an
// image back into the pipeline and for tests.
//
// `bilinear_upscale` works on plain `f32` grids (score maps, single
// channels). It aligns corners: the four source corners land exactly on the
// four destination corners, and it is equally valid for shrinking.
// `resize_rgba` resizes pixel buffers through `image::imageops` and is used
// by the overlay compositor, independent of tensor resizing.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};

use crate::error::{DiffusionError, Result};
use crate::tensor::Tensor;

/// Map a unit-range float to a byte: `v * 255`, truncated, clamped.
pub fn clamp_byte(v: f32) -> u8 {
    if v.is_nan() || v <= 0.0 {
        return 0;
    }
    if v >= 1.0 {
        return 255;
    }
    (v * 255.0) as u8
}

/// Clamp a 0..255-scale float to a byte, rounding to nearest.
pub fn clamp8(v: f32) -> u8 {
    if v.is_nan() {
        return 0;
    }
    v.round().clamp(0.0, 255.0) as u8
}

/// Interleave a planar `[3, height, width]` buffer in [-1, 1] into an
/// opaque RGBA image.
pub fn float32_to_rgba(data: &[f32], width: u32, height: u32) -> Result<RgbaImage> {
    let plane = width as usize * height as usize;
    if data.len() < 3 * plane {
        return Err(DiffusionError::Shape(format!(
            "{} values cannot hold 3 planes of {width}x{height}",
            data.len()
        )));
    }
    let (r, rest) = data.split_at(plane);
    let (g, rest) = rest.split_at(plane);
    let b = &rest[..plane];
    let to_byte = |v: f32| clamp_byte((v + 1.0) / 2.0);

    Ok(RgbaImage::from_fn(width, height, |x, y| {
        let i = y as usize * width as usize + x as usize;
        Rgba([to_byte(r[i]), to_byte(g[i]), to_byte(b[i]), 255])
    }))
}

/// Convert a decoded `[1, 3, H, W]` or `[3, H, W]` tensor to RGBA.
pub fn tensor_to_rgba(tensor: &Tensor) -> Result<RgbaImage> {
    let (c, h, w) = match tensor.shape() {
        &[1, c, h, w] => (c, h, w),
        &[c, h, w] => (c, h, w),
        other => {
            return Err(DiffusionError::Shape(format!(
                "expected [1, 3, H, W] or [3, H, W], got {other:?}"
            )));
        }
    };
    if c != 3 {
        return Err(DiffusionError::Shape(format!("expected 3 channels, got {c}")));
    }
    let width = u32::try_from(w).map_err(|_| DiffusionError::Shape(format!("width {w} too large")))?;
    let height =
        u32::try_from(h).map_err(|_| DiffusionError::Shape(format!("height {h} too large")))?;
    float32_to_rgba(&tensor.data, width, height)
}

/// Planar `[1, 3, H, W]` tensor in [-1, 1] from the RGB channels of `image`.
pub fn rgba_to_tensor(image: &RgbaImage) -> Tensor {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let plane = w * h;
    let mut data = vec![0.0f32; 3 * plane];
    for (i, px) in image.pixels().enumerate() {
        for c in 0..3 {
            data[c * plane + i] = f32::from(px[c]) / 255.0 * 2.0 - 1.0;
        }
    }
    Tensor {
        data,
        shape: [1, 3, h, w].into_iter().collect(),
    }
}

/// Corner-aligned bilinear resample of a row-major `src_w x src_h` grid.
pub fn bilinear_upscale(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
) -> Vec<f32> {
    let mut out = vec![0.0f32; dst_w * dst_h];
    if src_w == 0 || src_h == 0 || src.len() < src_w * src_h {
        return out;
    }
    let scale = |dst: usize, src: usize| {
        if dst > 1 {
            (src - 1) as f32 / (dst - 1) as f32
        } else {
            0.0
        }
    };
    let (sx, sy) = (scale(dst_w, src_w), scale(dst_h, src_h));

    for y in 0..dst_h {
        let fy = y as f32 * sy;
        let y0 = (fy.floor() as usize).min(src_h - 1);
        let y1 = (y0 + 1).min(src_h - 1);
        let ty = fy - y0 as f32;
        for x in 0..dst_w {
            let fx = x as f32 * sx;
            let x0 = (fx.floor() as usize).min(src_w - 1);
            let x1 = (x0 + 1).min(src_w - 1);
            let tx = fx - x0 as f32;

            let top = src[y0 * src_w + x0] * (1.0 - tx) + src[y0 * src_w + x1] * tx;
            let bottom = src[y1 * src_w + x0] * (1.0 - tx) + src[y1 * src_w + x1] * tx;
            out[y * dst_w + x] = top * (1.0 - ty) + bottom * ty;
        }
    }
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeFilter {
    Nearest,
    #[default]
    Bilinear,
}

impl From<ResizeFilter> for FilterType {
    fn from(filter: ResizeFilter) -> Self {
        match filter {
            ResizeFilter::Nearest => FilterType::Nearest,
            ResizeFilter::Bilinear => FilterType::Triangle,
        }
    }
}

/// Resize an RGBA buffer to `width x height`.
pub fn resize_rgba(image: &RgbaImage, width: u32, height: u32, filter: ResizeFilter) -> RgbaImage {
    if width == 0 || height == 0 || image.width() == 0 || image.height() == 0 {
        return RgbaImage::new(width, height);
    }
    if (width, height) == image.dimensions() {
        return image.clone();
    }
    imageops::resize(image, width, height, filter.into())
}
