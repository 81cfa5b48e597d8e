use bytemuck::Pod;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Element kind of an image channel.
#[derive(Debug, Hash, PartialEq, Eq, Copy, Clone, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ChannelType {
    /// 8-bit unsigned, normalized to [0, 1] by 255.
    #[default]
    U8 = 0,
    /// 16-bit unsigned, normalized to [0, 1] by 65535.
    U16 = 1,
    /// 32-bit float, already in [0, 1].
    F32 = 2,
}

impl ChannelType {
    /// Decodes the numeric element kind tag used across the binding boundary.
    pub fn from_tag(tag: u8) -> Result<ChannelType> {
        match tag {
            0 => Ok(ChannelType::U8),
            1 => Ok(ChannelType::U16),
            2 => Ok(ChannelType::F32),
            _ => Err(Error::UnsupportedFormat { tag }),
        }
    }

    pub fn tag(&self) -> u8 {
        *self as u8
    }

    pub fn byte_count(&self) -> usize {
        match self {
            ChannelType::U8 => 1,
            ChannelType::U16 => 2,
            ChannelType::F32 => 4,
        }
    }
}

impl std::fmt::Display for ChannelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelType::U8 => write!(f, "u8"),
            ChannelType::U16 => write!(f, "u16"),
            ChannelType::F32 => write!(f, "f32"),
        }
    }
}

/// A storable channel element with conversions to and from the normalized
/// [0, 1] float range used by all engine math.
pub trait Channel: Pod + Send + Sync + 'static {
    const TYPE: ChannelType;

    fn to_unit(self) -> f32;

    /// Quantizes a normalized value. Integers round to nearest and saturate.
    fn from_unit(value: f32) -> Self;
}

macro_rules! impl_channel_unorm {
    ($int:ty, $kind:ident) => {
        impl Channel for $int {
            const TYPE: ChannelType = ChannelType::$kind;

            #[inline]
            fn to_unit(self) -> f32 {
                self as f32 / <$int>::MAX as f32
            }

            #[inline]
            fn from_unit(value: f32) -> Self {
                // `as` saturates and maps NaN to 0
                (value * <$int>::MAX as f32 + 0.5) as $int
            }
        }
    };
}

impl_channel_unorm!(u8, U8);
impl_channel_unorm!(u16, U16);

impl Channel for f32 {
    const TYPE: ChannelType = ChannelType::F32;

    #[inline]
    fn to_unit(self) -> f32 {
        self
    }

    #[inline]
    fn from_unit(value: f32) -> Self {
        value
    }
}
