//! Renderer configuration.
//!
//! # Example
//!
//! ```rust
//! use vfx_grading::{ExecutionStrategy, RenderOptions};
//!
//! let opts = RenderOptions::default()
//!     .with_strategy(ExecutionStrategy::Scalar)
//!     .with_parallel(false);
//! assert_eq!(opts.strategy, ExecutionStrategy::Scalar);
//! ```

use crate::lanes::BATCH;

/// How the per-pixel work is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExecutionStrategy {
    /// One pixel at a time.
    Scalar,
    /// Eight pixels at a time in SIMD lanes, scalar for the tail.
    #[default]
    Vectorized,
}

/// Options for [`GradingToneCpu`](crate::GradingToneCpu).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RenderOptions {
    /// Per-pixel layout.
    pub strategy: ExecutionStrategy,
    /// Split large buffers over the rayon pool. Ignored without the
    /// `parallel` feature.
    pub parallel: bool,
    /// Smallest pixel count that is split.
    pub parallel_threshold: usize,
    /// Pixels per work item.
    pub chunk_pixels: usize,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            strategy: ExecutionStrategy::Vectorized,
            parallel: true,
            parallel_threshold: 16384,
            chunk_pixels: 4096,
        }
    }
}

impl RenderOptions {
    /// Set the per-pixel layout.
    pub fn with_strategy(mut self, strategy: ExecutionStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Enable or disable splitting.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Set the smallest pixel count that is split.
    pub fn with_parallel_threshold(mut self, pixels: usize) -> Self {
        self.parallel_threshold = pixels;
        self
    }

    /// Set the pixels per work item.
    pub fn with_chunk_pixels(mut self, pixels: usize) -> Self {
        self.chunk_pixels = pixels;
        self
    }

    /// Work item size in pixels, at least one batch and a multiple of it.
    pub(crate) fn chunk_len(&self) -> usize {
        self.chunk_pixels.max(1).div_ceil(BATCH) * BATCH
    }

    /// Whether a buffer of `num_pixels` is split.
    pub(crate) fn splits(&self, num_pixels: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && num_pixels >= self.parallel_threshold
    }
}
