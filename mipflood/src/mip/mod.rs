//! Coverage-aware mip chains.
//!
//! A [`MipChain`] holds levels 1..=N of an image. Each [`MipLevel`] stores its
//! color as interleaved `f32` next to a per-texel coverage weight in [0, 1].
//! [`pyramid`] builds the chain and [`composite`] fills its holes.

pub(crate) mod composite;
pub(crate) mod pyramid;


use crate::error::Result;
use crate::image::{validate_resolution, Image};

/// Number of levels below level 0: `floor(log2(min(width, height)))`, or 0
/// when either dimension is 0.
pub fn mip_count(width: u32, height: u32) -> Result<u32> {
    validate_resolution(width, height)?;

    let min = width.min(height);
    if min == 0 {
        return Ok(0);
    }
    Ok(min.ilog2())
}

#[derive(Clone, Debug, PartialEq)]
pub struct MipLevel {
    index: u32,
    width: usize,
    height: usize,
    channel_count: usize,
    color: Vec<f32>,
    coverage: Vec<f32>,
}

impl MipLevel {
    pub(crate) fn new(index: u32, width: usize, height: usize, channel_count: usize) -> Self {
        let texels = width * height;
        Self {
            index,
            width,
            height,
            channel_count,
            color: vec![0.0; texels * channel_count],
            coverage: vec![0.0; texels],
        }
    }

    /// Level index, 1 for the first level below the source.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn channel_count(&self) -> usize {
        self.channel_count
    }

    pub fn row_len(&self) -> usize {
        self.width * self.channel_count
    }

    /// Interleaved color, linear when sRGB conversion is active.
    pub fn color(&self) -> &[f32] {
        &self.color
    }

    /// Per-texel coverage weight.
    pub fn coverage(&self) -> &[f32] {
        &self.coverage
    }

    pub(crate) fn color_mut(&mut self) -> &mut [f32] {
        &mut self.color
    }

    pub(crate) fn buffers_mut(&mut self) -> (&mut [f32], &mut [f32]) {
        (&mut self.color, &mut self.coverage)
    }

    /// Fraction of texels holding any coverage.
    pub fn covered_fraction(&self) -> f32 {
        if self.coverage.is_empty() {
            return 0.0;
        }
        let covered = self.coverage.iter().filter(|&&c| c > 0.0).count();
        covered as f32 / self.coverage.len() as f32
    }

    pub fn into_image(self) -> Result<Image> {
        Image::from_vec(
            self.width as u32,
            self.height as u32,
            self.channel_count as u8,
            self.color,
        )
    }
}

/// Levels ordered from finest (index 1) to coarsest.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MipChain {
    levels: Vec<MipLevel>,
}

impl MipChain {
    pub(crate) fn new(levels: Vec<MipLevel>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[MipLevel] {
        &self.levels
    }

    pub(crate) fn levels_mut(&mut self) -> &mut [MipLevel] {
        &mut self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn first(&self) -> Option<&MipLevel> {
        self.levels.first()
    }

    /// Hands the color buffers off as `f32` images, finest first.
    pub fn into_images(self) -> Result<Vec<Image>> {
        self.levels.into_iter().map(MipLevel::into_image).collect()
    }
}
