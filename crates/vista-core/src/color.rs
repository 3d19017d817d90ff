//! Average-color sampling for the modal background.
//!
//! The sampler downsamples the decoded thumbnail to a small grid, drops
//! pixels that are not opaque enough, and averages each channel. Any failure
//! (restricted pixel access, undecodable bytes, fully transparent image,
//! timeout) degrades to the configured fallback color.

use image::imageops::{self, FilterType};
use image::{DynamicImage, RgbaImage};
use std::borrow::Cow;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::ColorConfig;
use crate::error::SampleError;
use crate::types::Rgb;

/// Something whose pixels may (or may not) be readable.
pub trait PixelSource: Send + Sync {
    fn read_pixels(&self) -> Result<Cow<'_, RgbaImage>, SampleError>;
}

impl PixelSource for RgbaImage {
    fn read_pixels(&self) -> Result<Cow<'_, RgbaImage>, SampleError> {
        Ok(Cow::Borrowed(self))
    }
}

impl PixelSource for DynamicImage {
    fn read_pixels(&self) -> Result<Cow<'_, RgbaImage>, SampleError> {
        match self {
            DynamicImage::ImageRgba8(rgba) => Ok(Cow::Borrowed(rgba)),
            other => Ok(Cow::Owned(other.to_rgba8())),
        }
    }
}

/// A decoded image whose pixels the host refuses to expose, such as a
/// cross-origin image drawn without CORS approval.
#[derive(Debug, Clone)]
pub struct RestrictedImage {
    pub origin: String,
}

impl PixelSource for RestrictedImage {
    fn read_pixels(&self) -> Result<Cow<'_, RgbaImage>, SampleError> {
        Err(SampleError::AccessDenied(format!(
            "cross-origin image from {}",
            self.origin
        )))
    }
}

/// Computes the mean color of an image.
#[derive(Debug, Clone)]
pub struct ColorSampler {
    grid_size: u32,
    alpha_threshold: u8,
    fallback: Rgb,
    timeout: Duration,
}

impl Default for ColorSampler {
    fn default() -> Self {
        Self::new(&ColorConfig::default())
    }
}

impl ColorSampler {
    pub fn new(config: &ColorConfig) -> Self {
        Self {
            grid_size: config.grid_size.max(1),
            alpha_threshold: config.alpha_threshold,
            fallback: config.fallback,
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Color returned whenever sampling fails.
    pub fn fallback(&self) -> Rgb {
        self.fallback
    }

    /// Average color of `image`, or the fallback if it cannot be sampled.
    pub fn sample(&self, image: &dyn PixelSource) -> Rgb {
        self.try_sample(image).unwrap_or_else(|e| {
            tracing::warn!("Color sampling failed, using {}: {}", self.fallback, e);
            self.fallback
        })
    }

    /// Decode `bytes` and sample them, falling back on any failure.
    pub fn sample_bytes(&self, bytes: &[u8]) -> Rgb {
        match image::load_from_memory(bytes) {
            Ok(image) => self.sample(&image),
            Err(e) => {
                tracing::warn!("Cannot decode image for sampling, using {}: {}", self.fallback, e);
                self.fallback
            }
        }
    }

    /// Sample on the blocking pool with the configured timeout.
    pub async fn sample_async(&self, image: Arc<dyn PixelSource>) -> Rgb {
        let sampler = self.clone();
        let result = timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || sampler.try_sample(image.as_ref())),
        )
        .await;

        let outcome = match result {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => Err(SampleError::Decode(format!("Task join error: {e}"))),
            Err(_) => Err(SampleError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }),
        };
        outcome.unwrap_or_else(|e| {
            tracing::warn!("Color sampling failed, using {}: {}", self.fallback, e);
            self.fallback
        })
    }

    /// Average color of `image`, reporting why sampling failed.
    pub fn try_sample(&self, image: &dyn PixelSource) -> Result<Rgb, SampleError> {
        let pixels = image.read_pixels()?;
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(SampleError::Decode("image has no pixels".to_string()));
        }

        let grid = self.downsample(&pixels);
        let mut sums = [0u64; 3];
        let mut count = 0u64;
        for pixel in grid.pixels() {
            let [r, g, b, a] = pixel.0;
            if a < self.alpha_threshold {
                continue;
            }
            sums[0] += u64::from(r);
            sums[1] += u64::from(g);
            sums[2] += u64::from(b);
            count += 1;
        }
        if count == 0 {
            return Err(SampleError::NoOpaquePixels);
        }

        let mean = |sum: u64| ((sum + count / 2) / count) as u8;
        Ok(Rgb::new(mean(sums[0]), mean(sums[1]), mean(sums[2])))
    }

    /// Shrink so the longest edge is at most `grid_size`, keeping the aspect ratio.
    ///
    /// Nearest-neighbour keeps every sampled value an actual source pixel, so
    /// alpha is never blended across the opacity threshold.
    fn downsample<'a>(&self, pixels: &'a RgbaImage) -> Cow<'a, RgbaImage> {
        let (width, height) = pixels.dimensions();
        let longest = width.max(height);
        if longest <= self.grid_size {
            return Cow::Borrowed(pixels);
        }
        let scale = |edge: u32| {
            ((u64::from(edge) * u64::from(self.grid_size)) / u64::from(longest)).max(1) as u32
        };
        Cow::Owned(imageops::resize(
            pixels,
            scale(width),
            scale(height),
            FilterType::Nearest,
        ))
    }
}
