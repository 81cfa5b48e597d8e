//! Renormalization of tangent-space normal vectors stored in [0, 1].

use common::parallel::ParRowsMutAuto;
use rayon::prelude::*;

use crate::channel_mask::ChannelSet;

/// Squared lengths below this are left untouched.
const MIN_LENGTH_SQUARED: f32 = 1e-8;

/// Renormalizes the vector made of the `channels` components of one texel.
///
/// Components are remapped to [-1, 1], scaled to unit length and mapped back.
/// Near-zero vectors keep their value.
#[inline]
pub fn normalize_texel(texel: &mut [f32], channels: ChannelSet) {
    let len_sq: f32 = channels
        .iter()
        .filter(|&c| c < texel.len())
        .map(|c| {
            let v = texel[c] * 2.0 - 1.0;
            v * v
        })
        .sum();

    if len_sq < MIN_LENGTH_SQUARED {
        return;
    }

    let inv_len = len_sq.sqrt().recip();
    let texel_len = texel.len();
    for c in channels.iter().filter(|&c| c < texel_len) {
        let v = (texel[c] * 2.0 - 1.0) * inv_len;
        texel[c] = v * 0.5 + 0.5;
    }
}

/// Renormalizes every texel of an interleaved level.
pub fn normalize(buffer: &mut [f32], width: usize, channel_count: usize, channels: ChannelSet) {
    if buffer.is_empty() || channels.is_empty() {
        return;
    }

    buffer
        .par_rows_mut_auto(width * channel_count)
        .for_each(|(_, chunk)| {
            for texel in chunk.chunks_exact_mut(channel_count) {
                normalize_texel(texel, channels);
            }
        });
}
