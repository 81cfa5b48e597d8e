//! Mip generation and flooding entry points.
//!
//! Both operations run the same linear pipeline: validate, binarize coverage,
//! build the pyramid, composite it. [`flood_image`] then merges level 1 back
//! over the uncovered texels of the source.

#[cfg(test)]
mod tests;

use std::time::Instant;

use common::parallel::ParRowsMutAuto;
use rayon::prelude::*;

use crate::channel_mask::ChannelSet;
use crate::color_space::{self, linear_to_srgb};
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::image::{dispatch_pixels, Channel, Image};
use crate::mip::composite::composite_chain;
use crate::mip::pyramid::{build_pyramid, FilterParams, SourceLevel};
use crate::mip::{mip_count, MipChain, MipLevel};
use crate::options::FloodOptions;

/// Builds the mip chain of `image` above level 0.
///
/// Coverage comes from `mask` when given, otherwise from the image's last
/// channel. Levels are composited when `options.composite_mips` is set and
/// re-encoded to sRGB when `options.convert_srgb` is set.
pub fn generate_mip_chain(
    image: &Image,
    mask: Option<&Image>,
    options: &FloodOptions,
) -> Result<MipChain> {
    let levels = validate(image, mask, options)?;
    let channel_count = image.channel_count() as usize;
    let channels = options.channel_mask.resolve(image.channel_count());

    tracing::info!(
        "Generating {} mips for {} image, channels {}",
        levels,
        image.desc(),
        channels
    );
    let start = Instant::now();

    let executor = Executor::new(options.max_threads, image.desc().size_in_bytes())?;
    let chain = executor.install(|| {
        let coverage = binarize_coverage(image, mask, options.coverage_threshold);
        let mut chain = build_chain(image, &coverage, levels, channels, options);

        if options.composite_mips {
            composite(&mut chain, channel_count, channels, options);
        }

        if options.convert_srgb {
            for level in chain.levels_mut() {
                let (width, channel_count) = (level.width(), level.channel_count());
                color_space::encode(level.color_mut(), width, channel_count, channels);
            }
        }

        chain
    });

    tracing::info!(
        "Generated {} mips in {:.2?}",
        chain.len(),
        start.elapsed()
    );

    Ok(chain)
}

/// Returns one `f32` image per mip level, finest first, excluding level 0.
pub fn generate_mips(
    image: &Image,
    mask: Option<&Image>,
    options: &FloodOptions,
) -> Result<Vec<Image>> {
    generate_mip_chain(image, mask, options)?.into_images()
}

/// Fills the uncovered texels of `image` with data flooded down the mip
/// chain. Covered texels and unselected channels keep their original values
/// exactly. The result has the shape and element kind of `image`.
pub fn flood_image(image: &Image, mask: Option<&Image>, options: &FloodOptions) -> Result<Image> {
    let levels = validate(image, mask, options)?;

    let channel_count = image.channel_count() as usize;
    let mut channels = options.channel_mask.resolve(image.channel_count());
    if mask.is_none() && options.preserve_mask_channel {
        channels = channels.without(channel_count - 1);
    }

    if levels == 0 || channels.is_empty() {
        tracing::debug!(
            "Nothing to flood for {} image (levels={}, channels={})",
            image.desc(),
            levels,
            channels
        );
        return Ok(image.clone());
    }

    tracing::info!(
        "Flooding {} image over {} mips, channels {}",
        image.desc(),
        levels,
        channels
    );
    let start = Instant::now();

    let executor = Executor::new(options.max_threads, image.desc().size_in_bytes())?;
    let output = executor.install(|| {
        let coverage = binarize_coverage(image, mask, options.coverage_threshold);
        let mut chain = build_chain(image, &coverage, levels, channels, options);

        if !composite(&mut chain, channel_count, channels, options) {
            return image.clone();
        }

        let Some(fill) = chain.first() else {
            return image.clone();
        };

        let mut output = image.clone();
        merge(&mut output, &coverage, fill, channels, options.convert_srgb);
        output
    });

    tracing::info!("Flooded {} image in {:.2?}", image.desc(), start.elapsed());

    Ok(output)
}

/// Checks everything a call depends on before any buffer is allocated.
/// Returns the number of mip levels.
fn validate(image: &Image, mask: Option<&Image>, options: &FloodOptions) -> Result<u32> {
    options.validate()?;
    image.desc().validate()?;

    if let Some(mask) = mask {
        let expected = (image.width(), image.height());
        let actual = (mask.width(), mask.height());
        if actual != expected || mask.channel_count() != 1 {
            return Err(Error::MaskDimensionMismatch {
                expected,
                actual,
                channels: mask.channel_count(),
            });
        }
    }

    mip_count(image.width(), image.height())
}

/// Per-texel 0/1 coverage of level 0.
fn binarize_coverage(image: &Image, mask: Option<&Image>, threshold: f32) -> Vec<f32> {
    let (source, stride, offset) = match mask {
        Some(mask) => (mask.data(), 1, 0),
        None => {
            let channel_count = image.channel_count() as usize;
            (image.data(), channel_count, channel_count - 1)
        }
    };

    let width = image.width() as usize;
    let mut coverage = vec![0.0f32; image.desc().texel_count()];
    if coverage.is_empty() {
        return coverage;
    }

    dispatch_pixels!(source, values => {
        coverage
            .par_rows_mut_auto(width)
            .for_each(|(start_row, rows)| {
                let first = start_row * width;
                for (i, cov) in rows.iter_mut().enumerate() {
                    let v = values[(first + i) * stride + offset].to_unit();
                    *cov = if v >= threshold { 1.0 } else { 0.0 };
                }
            })
    });

    coverage
}

fn build_chain(
    image: &Image,
    coverage: &[f32],
    levels: u32,
    channels: ChannelSet,
    options: &FloodOptions,
) -> MipChain {
    let channel_count = image.channel_count() as usize;
    let params = FilterParams {
        weighted: weighted_channels(channels, channel_count, options),
        normalize: options.is_normal_map,
    };
    let linearize = if options.convert_srgb {
        channels
    } else {
        ChannelSet::EMPTY
    };

    dispatch_pixels!(image.data(), data => {
        let source = SourceLevel {
            data: data.as_slice(),
            width: image.width() as usize,
            height: image.height() as usize,
            channel_count,
            coverage,
            linearize,
        };
        build_pyramid(&source, levels, params)
    })
}

/// Channels reduced by coverage weight, which are also the vector channels
/// of a normal map.
fn weighted_channels(channels: ChannelSet, channel_count: usize, options: &FloodOptions) -> ChannelSet {
    if options.scale_alpha_unweighted {
        channels.without(channel_count - 1)
    } else {
        channels
    }
}

fn composite(
    chain: &mut MipChain,
    channel_count: usize,
    channels: ChannelSet,
    options: &FloodOptions,
) -> bool {
    if chain.is_empty() {
        return true;
    }

    let vector = options
        .is_normal_map
        .then(|| weighted_channels(channels, channel_count, options));
    let filled = composite_chain(chain, channels, vector);
    if !filled {
        tracing::warn!("Source has no covered texels, mip chain left unfilled");
    }
    filled
}

/// Writes the nearest level 1 texel into every uncovered texel of `output`.
fn merge(
    output: &mut Image,
    coverage: &[f32],
    fill: &MipLevel,
    channels: ChannelSet,
    encode_srgb: bool,
) {
    let width = output.width() as usize;
    let channel_count = output.channel_count() as usize;

    dispatch_pixels!(output.data_mut(), data => {
        merge_typed(data, width, channel_count, coverage, fill, channels, encode_srgb)
    });
}

fn merge_typed<T: Channel>(
    data: &mut [T],
    width: usize,
    channel_count: usize,
    coverage: &[f32],
    fill: &MipLevel,
    channels: ChannelSet,
    encode_srgb: bool,
) {
    let fill_width = fill.width();
    let fill_height = fill.height();
    let fill_color = fill.color();

    data.par_rows_mut_auto(width * channel_count)
        .for_each(|(start_row, rows)| {
            for (row_offset, row) in rows.chunks_exact_mut(width * channel_count).enumerate() {
                let y = start_row + row_offset;
                let fy = (y / 2).min(fill_height - 1);

                for (x, texel) in row.chunks_exact_mut(channel_count).enumerate() {
                    if coverage[y * width + x] > 0.0 {
                        continue;
                    }

                    let fx = (x / 2).min(fill_width - 1);
                    let base = (fy * fill_width + fx) * channel_count;
                    for c in channels.iter() {
                        let mut v = fill_color[base + c];
                        if encode_srgb {
                            v = linear_to_srgb(v);
                        }
                        texel[c] = T::from_unit(v);
                    }
                }
            }
        });
}
