//! sRGB transfer functions.
//!
//! Scalar conversions are applied on the fly when source texels are read or
//! final texels written. The in-place variants convert whole interleaved
//! float levels and only touch the selected channels.

use common::parallel::ParRowsMutAuto;
use rayon::prelude::*;

use crate::channel_mask::ChannelSet;

/// Decodes an sRGB-encoded value to linear light.
#[inline]
pub fn srgb_to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Encodes a linear value with the sRGB transfer curve.
#[inline]
pub fn linear_to_srgb(v: f32) -> f32 {
    if v <= 0.003_130_8 {
        v * 12.92
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

/// Converts the selected channels of an interleaved level to linear light.
pub fn linearize(buffer: &mut [f32], width: usize, channel_count: usize, channels: ChannelSet) {
    apply(buffer, width, channel_count, channels, srgb_to_linear);
}

/// Converts the selected channels of an interleaved level back to sRGB.
pub fn encode(buffer: &mut [f32], width: usize, channel_count: usize, channels: ChannelSet) {
    apply(buffer, width, channel_count, channels, linear_to_srgb);
}

fn apply(
    buffer: &mut [f32],
    width: usize,
    channel_count: usize,
    channels: ChannelSet,
    f: fn(f32) -> f32,
) {
    if buffer.is_empty() || channels.is_empty() {
        return;
    }

    buffer
        .par_rows_mut_auto(width * channel_count)
        .for_each(|(_, chunk)| {
            for texel in chunk.chunks_exact_mut(channel_count) {
                for c in channels.iter().filter(|&c| c < channel_count) {
                    texel[c] = f(texel[c]);
                }
            }
        });
}
