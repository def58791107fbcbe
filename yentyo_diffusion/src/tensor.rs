// Minimal dense tensor: a flat `f32` buffer plus a shape.
//
// Layout is row-major over the shape, which for images and latents means
// channel-major NCHW (batch, channel, height, width). The shape is a
// `SmallVec` because it is almost always rank 4 and tensors are created once
// per diffusion step.
//
// A tensor is owned by whichever pipeline stage holds it; stages hand it on
// by value rather than sharing it.

use smallvec::SmallVec;

use crate::error::{DiffusionError, Result};

pub type Shape = SmallVec<[usize; 4]>;

#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    pub data: Vec<f32>,
    pub shape: Shape,
}

impl Tensor {
    /// Wrap `data`, checking its length matches the shape.
    pub fn new(data: Vec<f32>, shape: &[usize]) -> Result<Self> {
        let expected: usize = shape.iter().product();
        if data.len() != expected {
            return Err(DiffusionError::Shape(format!(
                "{} values do not fill shape {:?} ({} values)",
                data.len(),
                shape,
                expected
            )));
        }
        Ok(Self {
            data,
            shape: Shape::from_slice(shape),
        })
    }

    pub fn zeros(shape: &[usize]) -> Self {
        Self {
            data: vec![0.0; shape.iter().product()],
            shape: Shape::from_slice(shape),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// (batch, channels, height, width) of a rank-4 tensor.
    pub fn dims4(&self) -> Result<(usize, usize, usize, usize)> {
        match self.shape.as_slice() {
            &[n, c, h, w] => Ok((n, c, h, w)),
            other => Err(DiffusionError::Shape(format!(
                "expected NCHW, got shape {other:?}"
            ))),
        }
    }

    /// Smallest element; 0 for an empty tensor.
    pub fn min(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().copied().fold(f32::INFINITY, f32::min)
    }

    /// Largest element; 0 for an empty tensor.
    pub fn max(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().copied().fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn mean(&self) -> f32 {
        if self.data.is_empty() {
            return 0.0;
        }
        (self.data.iter().map(|&v| f64::from(v)).sum::<f64>() / self.data.len() as f64) as f32
    }

    pub fn scale(&mut self, k: f32) {
        for v in &mut self.data {
            *v *= k;
        }
    }

    /// Elementwise `a * self + b * other`. Shapes must match.
    pub fn axpby(&self, a: f32, other: &Tensor, b: f32) -> Result<Tensor> {
        if self.shape != other.shape {
            return Err(DiffusionError::Shape(format!(
                "cannot combine {:?} with {:?}",
                self.shape.as_slice(),
                other.shape.as_slice()
            )));
        }
        let data = self
            .data
            .iter()
            .zip(&other.data)
            .map(|(&x, &y)| a * x + b * y)
            .collect();
        Ok(Tensor {
            data,
            shape: self.shape.clone(),
        })
    }
}
