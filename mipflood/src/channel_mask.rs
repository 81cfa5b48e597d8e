//! Channel selection.
//!
//! [`ChannelMask`] is the caller-facing bitmask where `0` means "every channel".
//! Before any pixel work it is resolved against the image's channel count into
//! a [`ChannelSet`], which is always explicit and may legitimately be empty.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Maximum number of interleaved channels per texel.
pub const MAX_CHANNELS: usize = 8;

/// Largest channel stride accepted by [`ChannelMask::from_flags`].
pub const MAX_FLAG_STRIDE: usize = 255;

/// Bit `c` set means channel `c` participates. `0` selects all channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChannelMask(u8);

impl ChannelMask {
    pub const ALL: ChannelMask = ChannelMask(0);

    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    pub const fn is_all(self) -> bool {
        self.0 == 0
    }

    /// Builds a mask from per-channel flags, flag `i` selecting channel `i`.
    ///
    /// Fails when more than 8 flags are given, when there are more flags than
    /// channels in `stride`, or when `stride` exceeds 255.
    pub fn from_flags(flags: &[bool], stride: usize) -> Result<Self> {
        if flags.len() > MAX_CHANNELS {
            return Err(Error::channels(format!(
                "{} flags exceed the {} channel limit",
                flags.len(),
                MAX_CHANNELS
            )));
        }
        if stride > MAX_FLAG_STRIDE {
            return Err(Error::channels(format!(
                "stride {} exceeds {}",
                stride, MAX_FLAG_STRIDE
            )));
        }
        if flags.len() > stride {
            return Err(Error::channels(format!(
                "{} flags given for a stride of {}",
                flags.len(),
                stride
            )));
        }

        let bits = flags
            .iter()
            .enumerate()
            .filter(|&(_, &flag)| flag)
            .fold(0u8, |bits, (i, _)| bits | (1 << i));

        Ok(Self(bits))
    }

    /// Resolves the mask for an image with `channel_count` channels.
    /// Bits at or above `channel_count` are ignored.
    pub fn resolve(self, channel_count: u8) -> ChannelSet {
        let all = ChannelSet::all(channel_count);
        if self.is_all() {
            all
        } else {
            ChannelSet(self.0 & all.0)
        }
    }
}

impl From<u8> for ChannelMask {
    fn from(bits: u8) -> Self {
        Self(bits)
    }
}

/// Explicit set of channel indices, bit `c` set when channel `c` is included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ChannelSet(u8);

impl ChannelSet {
    pub const EMPTY: ChannelSet = ChannelSet(0);

    /// Every channel of a `channel_count`-channel texel.
    pub fn all(channel_count: u8) -> Self {
        debug_assert!(channel_count as usize <= MAX_CHANNELS);
        if channel_count as usize >= MAX_CHANNELS {
            Self(u8::MAX)
        } else {
            Self((1u8 << channel_count) - 1)
        }
    }

    pub const fn bits(self) -> u8 {
        self.0
    }

    #[inline]
    pub fn contains(self, channel: usize) -> bool {
        channel < MAX_CHANNELS && self.0 & (1 << channel) != 0
    }

    pub fn without(self, channel: usize) -> Self {
        if channel < MAX_CHANNELS {
            Self(self.0 & !(1 << channel))
        } else {
            self
        }
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Channel indices in ascending order.
    pub fn iter(self) -> impl Iterator<Item = usize> {
        (0..MAX_CHANNELS).filter(move |&c| self.contains(c))
    }
}

impl std::fmt::Display for ChannelSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{}", c)?;
        }
        write!(f, "]")
    }
}
