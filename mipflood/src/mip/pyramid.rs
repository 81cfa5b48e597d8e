//! Coverage-weighted downsampling.
//!
//! Every output texel reduces a 2x2 footprint of the previous level. When a
//! level has an odd width or height, the last output column or row also
//! absorbs the trailing source column or row, so every source texel
//! contributes to exactly one output texel.

use common::parallel::ParZipMut;
use rayon::prelude::*;

use super::{MipChain, MipLevel};
use crate::channel_mask::{ChannelSet, MAX_CHANNELS};
use crate::color_space::srgb_to_linear;
use crate::image::Channel;
use crate::normal::normalize_texel;

/// How channels are reduced.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FilterParams {
    /// Channels averaged by coverage weight. The rest use a box filter.
    pub weighted: ChannelSet,
    /// Renormalize the weighted channels as a vector.
    pub normalize: bool,
}

/// Read access to one level of the pyramid.
pub(crate) trait LevelSource: Sync {
    fn width(&self) -> usize;
    fn height(&self) -> usize;
    fn channel_count(&self) -> usize;
    /// Linear value of `channel` in texel `texel`.
    fn sample(&self, texel: usize, channel: usize) -> f32;
    fn coverage(&self, texel: usize) -> f32;
}

/// Level 0 read straight from the caller's pixels.
pub(crate) struct SourceLevel<'a, T: Channel> {
    pub data: &'a [T],
    pub width: usize,
    pub height: usize,
    pub channel_count: usize,
    /// Binarized coverage, one value per texel.
    pub coverage: &'a [f32],
    /// Channels decoded from sRGB on read.
    pub linearize: ChannelSet,
}

impl<T: Channel> LevelSource for SourceLevel<'_, T> {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn channel_count(&self) -> usize {
        self.channel_count
    }

    #[inline]
    fn sample(&self, texel: usize, channel: usize) -> f32 {
        let v = self.data[texel * self.channel_count + channel].to_unit();
        if self.linearize.contains(channel) {
            srgb_to_linear(v)
        } else {
            v
        }
    }

    #[inline]
    fn coverage(&self, texel: usize) -> f32 {
        self.coverage[texel]
    }
}

impl LevelSource for MipLevel {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn channel_count(&self) -> usize {
        self.channel_count
    }

    #[inline]
    fn sample(&self, texel: usize, channel: usize) -> f32 {
        self.color[texel * self.channel_count + channel]
    }

    #[inline]
    fn coverage(&self, texel: usize) -> f32 {
        self.coverage[texel]
    }
}

/// Builds levels 1..=`levels` from `source`, strictly in order.
pub(crate) fn build_pyramid<S: LevelSource>(
    source: &S,
    levels: u32,
    params: FilterParams,
) -> MipChain {
    let mut chain: Vec<MipLevel> = Vec::with_capacity(levels as usize);

    for index in 1..=levels {
        let level = match chain.last() {
            None => downsample(source, index, params),
            Some(previous) => downsample(previous, index, params),
        };

        tracing::debug!(
            "Built mip {} ({}x{}), {:.1}% covered",
            index,
            level.width,
            level.height,
            level.covered_fraction() * 100.0
        );

        chain.push(level);
    }

    MipChain::new(chain)
}

/// Source coordinate range reduced into output coordinate `out`.
///
/// Unlike a strict 2x2 kernel, which drops a trailing odd column or row, the
/// last output texel reads a 3-wide range along that axis.
#[inline]
fn footprint(out: usize, out_len: usize, src_len: usize) -> std::ops::Range<usize> {
    let start = out * 2;
    let end = if out + 1 == out_len { src_len } else { start + 2 };
    start..end
}

pub(crate) fn downsample<S: LevelSource>(src: &S, index: u32, params: FilterParams) -> MipLevel {
    let channel_count = src.channel_count();
    debug_assert!(channel_count <= MAX_CHANNELS);

    let src_width = src.width();
    let width = src_width / 2;
    let height = src.height() / 2;
    let mut level = MipLevel::new(index, width, height, channel_count);
    if width == 0 || height == 0 {
        return level;
    }

    let src_height = src.height();
    let (color, coverage) = level.buffers_mut();

    color
        .par_zip(coverage)
        .par_rows_mut_auto(width * channel_count, width)
        .for_each(|(start_row, (color_rows, coverage_rows))| {
            let rows = color_rows
                .chunks_exact_mut(width * channel_count)
                .zip(coverage_rows.chunks_exact_mut(width));

            for (row_offset, (color_row, coverage_row)) in rows.enumerate() {
                let y = start_row + row_offset;
                let ys = footprint(y, height, src_height);

                for (x, (texel, cov_out)) in color_row
                    .chunks_exact_mut(channel_count)
                    .zip(coverage_row.iter_mut())
                    .enumerate()
                {
                    let xs = footprint(x, width, src_width);

                    let mut weighted_sum = [0.0f32; MAX_CHANNELS];
                    let mut box_sum = [0.0f32; MAX_CHANNELS];
                    let mut coverage_sum = 0.0f32;
                    let mut count = 0usize;

                    for sy in ys.clone() {
                        for sx in xs.clone() {
                            let t = sy * src_width + sx;
                            let cov = src.coverage(t);
                            coverage_sum += cov;
                            count += 1;
                            for c in 0..channel_count {
                                let v = src.sample(t, c);
                                box_sum[c] += v;
                                weighted_sum[c] += cov * v;
                            }
                        }
                    }

                    let inv_count = 1.0 / count as f32;
                    for c in 0..channel_count {
                        texel[c] = if !params.weighted.contains(c) {
                            box_sum[c] * inv_count
                        } else if coverage_sum > 0.0 {
                            weighted_sum[c] / coverage_sum
                        } else {
                            0.0
                        };
                    }

                    if params.normalize && coverage_sum > 0.0 {
                        normalize_texel(texel, params.weighted);
                    }

                    *cov_out = (coverage_sum * inv_count).clamp(0.0, 1.0);
                }
            }
        });

    level
}
