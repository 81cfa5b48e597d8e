//! Bottom-up hole filling.

use common::parallel::ParZipMut;
use rayon::prelude::*;

use super::{MipChain, MipLevel};
use crate::channel_mask::{ChannelSet, MAX_CHANNELS};
use crate::normal::normalize_texel;

/// Fills every partially or fully uncovered texel of `chain` from the next
/// coarser level, coarsest first, leaving coverage at 1 everywhere.
///
/// Blended texels are renormalized over `vector` when given. Returns `false`
/// without touching the chain when it carries no coverage at all, which only
/// happens for a fully uncovered source.
pub(crate) fn composite_chain(
    chain: &mut MipChain,
    channels: ChannelSet,
    vector: Option<ChannelSet>,
) -> bool {
    let levels = chain.levels_mut();
    let Some(coarsest) = levels.last_mut() else {
        return true;
    };

    if !fill_coarsest(coarsest, channels, vector) {
        return false;
    }

    for i in (0..levels.len() - 1).rev() {
        let (fine, coarse) = levels.split_at_mut(i + 1);
        let level = &mut fine[i];
        blend_from_coarser(level, &coarse[0], channels, vector);

        tracing::debug!(
            "Composited mip {} ({}x{})",
            level.index,
            level.width,
            level.height
        );
    }

    true
}

/// The coarsest level has nothing below it. Texels without coverage take the
/// coverage-weighted mean of the level.
fn fill_coarsest(level: &mut MipLevel, channels: ChannelSet, vector: Option<ChannelSet>) -> bool {
    let channel_count = level.channel_count;
    let (color, coverage) = level.buffers_mut();

    let mut mean = [0.0f32; MAX_CHANNELS];
    let mut total = 0.0f32;
    for (texel, &cov) in color.chunks_exact(channel_count).zip(coverage.iter()) {
        total += cov;
        for c in channels.iter() {
            mean[c] += cov * texel[c];
        }
    }

    if total <= 0.0 {
        return false;
    }

    for c in channels.iter() {
        mean[c] /= total;
    }

    for (texel, cov) in color.chunks_exact_mut(channel_count).zip(coverage.iter_mut()) {
        if *cov <= 0.0 {
            for c in channels.iter() {
                texel[c] = mean[c];
            }
            if let Some(vector) = vector {
                normalize_texel(texel, vector);
            }
        }
        *cov = 1.0;
    }

    true
}

fn blend_from_coarser(
    level: &mut MipLevel,
    coarse: &MipLevel,
    channels: ChannelSet,
    vector: Option<ChannelSet>,
) {
    let channel_count = level.channel_count;
    let width = level.width;
    let coarse_width = coarse.width;
    let coarse_height = coarse.height;
    let (color, coverage) = level.buffers_mut();

    color
        .par_zip(coverage)
        .par_rows_mut_auto(width * channel_count, width)
        .for_each(|(start_row, (color_rows, coverage_rows))| {
            let rows = color_rows
                .chunks_exact_mut(width * channel_count)
                .zip(coverage_rows.chunks_exact_mut(width));

            for (row_offset, (color_row, coverage_row)) in rows.enumerate() {
                let cy = ((start_row + row_offset) / 2).min(coarse_height - 1);

                for (x, (texel, cov)) in color_row
                    .chunks_exact_mut(channel_count)
                    .zip(coverage_row.iter_mut())
                    .enumerate()
                {
                    let weight = *cov;
                    if weight < 1.0 {
                        let cx = (x / 2).min(coarse_width - 1);
                        let base = (cy * coarse_width + cx) * channel_count;
                        let fill = &coarse.color[base..base + channel_count];

                        for c in channels.iter() {
                            texel[c] = weight * texel[c] + (1.0 - weight) * fill[c];
                        }
                        if let Some(vector) = vector {
                            normalize_texel(texel, vector);
                        }
                    }
                    *cov = 1.0;
                }
            }
        });
}
