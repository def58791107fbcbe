// DDIM noise schedule.
//
// At construction the scheduler builds a linear beta schedule over the
// training timesteps and caches the cumulative products
// `alpha_bar[t] = prod_{i <= t} (1 - beta[i])`. That table is the only state
// and is immutable afterwards, so one scheduler can sit behind an `Arc` and
// serve concurrent synthesis requests.
//
// `set_timesteps(n)` subsamples the training range to n evenly spaced,
// strictly decreasing timesteps from `T - 1` down to 0. `plan(n)` turns
// those into per-step `StepCoefficients`. The scheduler never calls the
// denoiser; a step is the deterministic recombination
//
//     x_prev = sample_coeff * x_t + noise_coeff * eps
//
// with (eta = 0)
//
//     sample_coeff = sqrt(alpha_bar_prev / alpha_bar_t)
//     noise_coeff  = sqrt(1 - alpha_bar_prev)
//                    - sqrt(alpha_bar_prev) * sqrt(1 - alpha_bar_t) / sqrt(alpha_bar_t)
//
// which is the usual "predict x0, then re-noise to the previous level"
// update folded into two scalars.

use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::error::{DiffusionError, Result};
use crate::tensor::Tensor;

/// Everything needed to take one denoising step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepCoefficients {
    pub timestep: usize,
    /// Next (lower) timestep, `None` on the final step.
    pub prev_timestep: Option<usize>,
    pub alpha_bar: f64,
    pub alpha_bar_prev: f64,
    pub sample_coeff: f32,
    pub noise_coeff: f32,
}

impl StepCoefficients {
    /// Combine the current latent with the predicted noise.
    pub fn apply(&self, sample: &Tensor, noise_pred: &Tensor) -> Result<Tensor> {
        sample.axpby(self.sample_coeff, noise_pred, self.noise_coeff)
    }

    /// Estimate of the clean latent implied by `noise_pred`.
    pub fn predict_original(&self, sample: &Tensor, noise_pred: &Tensor) -> Result<Tensor> {
        let inv = 1.0 / self.alpha_bar.sqrt();
        let noise = -(1.0 - self.alpha_bar).sqrt() * inv;
        sample.axpby(inv as f32, noise_pred, noise as f32)
    }
}

#[derive(Clone, Debug)]
pub struct DdimScheduler {
    config: SchedulerConfig,
    alphas_cumprod: Vec<f64>,
    final_alpha_cumprod: f64,
}

impl DdimScheduler {
    pub fn new(config: SchedulerConfig) -> Result<Self> {
        let t = config.num_train_timesteps;
        if t == 0 {
            return Err(DiffusionError::Config("num_train_timesteps must be > 0".into()));
        }
        let (start, end) = (config.beta_start, config.beta_end);
        if !(start > 0.0 && start <= end && end < 1.0) {
            return Err(DiffusionError::Config(format!(
                "beta schedule must satisfy 0 < start <= end < 1, got {start}..{end}"
            )));
        }

        let mut alphas_cumprod = Vec::with_capacity(t);
        let mut running = 1.0f64;
        for i in 0..t {
            let frac = if t == 1 { 0.0 } else { i as f64 / (t - 1) as f64 };
            let beta = start + (end - start) * frac;
            running *= 1.0 - beta;
            alphas_cumprod.push(running);
        }
        let final_alpha_cumprod = if config.set_alpha_to_one {
            1.0
        } else {
            alphas_cumprod[0]
        };

        Ok(Self {
            config,
            alphas_cumprod,
            final_alpha_cumprod,
        })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn num_train_timesteps(&self) -> usize {
        self.alphas_cumprod.len()
    }

    pub fn alphas_cumprod(&self) -> &[f64] {
        &self.alphas_cumprod
    }

    /// Starting noise scale. DDIM samples from unit-variance noise.
    pub fn init_noise_sigma(&self) -> f32 {
        1.0
    }

    /// `n` evenly spaced timesteps from `T - 1` down to 0.
    pub fn set_timesteps(&self, n: usize) -> Result<Vec<usize>> {
        let t = self.num_train_timesteps();
        if n == 0 || n > t {
            return Err(DiffusionError::InvalidSteps {
                requested: n,
                available: t,
            });
        }
        if n == 1 {
            return Ok(vec![t - 1]);
        }
        let last = (t - 1) as f64;
        Ok((0..n)
            .map(|i| (last * (n - 1 - i) as f64 / (n - 1) as f64).round() as usize)
            .collect())
    }

    /// Coefficients for stepping from `timestep` to `prev_timestep`.
    pub fn coefficients(&self, timestep: usize, prev_timestep: Option<usize>) -> StepCoefficients {
        let last = self.alphas_cumprod.len() - 1;
        let alpha_bar = self.alphas_cumprod[timestep.min(last)];
        let alpha_bar_prev =
            prev_timestep.map_or(self.final_alpha_cumprod, |p| self.alphas_cumprod[p.min(last)]);

        let sample_coeff = (alpha_bar_prev / alpha_bar).sqrt();
        let noise_coeff =
            (1.0 - alpha_bar_prev).sqrt() - alpha_bar_prev.sqrt() * (1.0 - alpha_bar).sqrt() / alpha_bar.sqrt();

        StepCoefficients {
            timestep,
            prev_timestep,
            alpha_bar,
            alpha_bar_prev,
            sample_coeff: sample_coeff as f32,
            noise_coeff: noise_coeff as f32,
        }
    }

    /// Per-step coefficients for an `n`-step run.
    pub fn plan(&self, n: usize) -> Result<Vec<StepCoefficients>> {
        let timesteps = self.set_timesteps(n)?;
        Ok(timesteps
            .iter()
            .enumerate()
            .map(|(i, &t)| self.coefficients(t, timesteps.get(i + 1).copied()))
            .collect())
    }
}
