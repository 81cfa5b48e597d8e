mod channel;


pub use channel::{Channel, ChannelType};

use crate::channel_mask::MAX_CHANNELS;
use crate::error::{Error, Result};

/// Both dimensions must stay strictly below this value.
pub const MAX_DIMENSION: u32 = 65535;

/// Runs `$body` with `$slice` bound to the typed pixel vector of a [`PixelData`].
macro_rules! dispatch_pixels {
    ($data:expr, $slice:ident => $body:expr) => {
        match $data {
            $crate::image::PixelData::U8($slice) => $body,
            $crate::image::PixelData::U16($slice) => $body,
            $crate::image::PixelData::F32($slice) => $body,
        }
    };
}
pub(crate) use dispatch_pixels;

#[derive(Clone, Copy, Eq, PartialEq, Debug, Hash)]
pub struct ImageDesc {
    pub width: u32,
    pub height: u32,
    /// Interleaved channels per texel (the channel stride).
    pub channel_count: u8,
    pub channel_type: ChannelType,
}

/// Densely packed, row-major, interleaved pixel storage.
#[derive(Clone, Debug, PartialEq)]
pub enum PixelData {
    U8(Vec<u8>),
    U16(Vec<u16>),
    F32(Vec<f32>),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    desc: ImageDesc,
    data: PixelData,
}

impl ImageDesc {
    pub fn new(width: u32, height: u32, channel_count: u8, channel_type: ChannelType) -> Self {
        Self {
            width,
            height,
            channel_count,
            channel_type,
        }
    }

    pub fn texel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Number of channel elements (texels times channels).
    pub fn element_count(&self) -> usize {
        self.texel_count() * self.channel_count as usize
    }

    pub fn size_in_bytes(&self) -> usize {
        self.element_count() * self.channel_type.byte_count()
    }

    /// Elements per row.
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channel_count as usize
    }

    pub fn validate(&self) -> Result<()> {
        validate_resolution(self.width, self.height)?;
        if self.channel_count == 0 || self.channel_count as usize > MAX_CHANNELS {
            return Err(Error::channels(format!(
                "channel stride {} outside 1..={}",
                self.channel_count, MAX_CHANNELS
            )));
        }
        Ok(())
    }
}

pub(crate) fn validate_resolution(width: u32, height: u32) -> Result<()> {
    if width >= MAX_DIMENSION || height >= MAX_DIMENSION {
        return Err(Error::ResolutionOutOfRange { width, height });
    }
    Ok(())
}

impl std::fmt::Display for ImageDesc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{}x{} {}",
            self.width, self.height, self.channel_count, self.channel_type
        )
    }
}

impl PixelData {
    pub fn channel_type(&self) -> ChannelType {
        match self {
            PixelData::U8(_) => ChannelType::U8,
            PixelData::U16(_) => ChannelType::U16,
            PixelData::F32(_) => ChannelType::F32,
        }
    }

    pub fn len(&self) -> usize {
        dispatch_pixels!(self, v => v.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn zeroed(channel_type: ChannelType, len: usize) -> Self {
        match channel_type {
            ChannelType::U8 => PixelData::U8(vec![0; len]),
            ChannelType::U16 => PixelData::U16(vec![0; len]),
            ChannelType::F32 => PixelData::F32(vec![0.0; len]),
        }
    }

    /// Normalized value of element `idx`.
    #[inline]
    pub fn unit(&self, idx: usize) -> f32 {
        dispatch_pixels!(self, v => v[idx].to_unit())
    }
}

impl<T: Channel> From<Vec<T>> for PixelData {
    fn from(values: Vec<T>) -> Self {
        match T::TYPE {
            ChannelType::U8 => PixelData::U8(bytemuck::allocation::cast_vec(values)),
            ChannelType::U16 => PixelData::U16(bytemuck::allocation::cast_vec(values)),
            ChannelType::F32 => PixelData::F32(bytemuck::allocation::cast_vec(values)),
        }
    }
}

impl Image {
    /// Returns the image descriptor.
    pub fn desc(&self) -> &ImageDesc {
        &self.desc
    }

    pub fn data(&self) -> &PixelData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut PixelData {
        &mut self.data
    }

    pub fn take_data(self) -> PixelData {
        self.data
    }

    pub fn width(&self) -> u32 {
        self.desc.width
    }

    pub fn height(&self) -> u32 {
        self.desc.height
    }

    pub fn channel_count(&self) -> u8 {
        self.desc.channel_count
    }

    pub fn new_empty(desc: ImageDesc) -> Result<Image> {
        desc.validate()?;

        let data = PixelData::zeroed(desc.channel_type, desc.element_count());

        Ok(Image { desc, data })
    }

    pub fn new_with_data(desc: ImageDesc, data: PixelData) -> Result<Image> {
        desc.validate()?;

        if data.channel_type() != desc.channel_type {
            return Err(Error::UnsupportedFormat {
                tag: data.channel_type().tag(),
            });
        }
        if data.len() != desc.element_count() {
            return Err(Error::BufferSizeMismatch {
                expected: desc.element_count(),
                actual: data.len(),
            });
        }

        Ok(Image { desc, data })
    }

    /// Wraps a typed vector, deriving the element kind from `T`.
    pub fn from_vec<T: Channel>(
        width: u32,
        height: u32,
        channel_count: u8,
        values: Vec<T>,
    ) -> Result<Image> {
        let desc = ImageDesc::new(width, height, channel_count, T::TYPE);
        Image::new_with_data(desc, PixelData::from(values))
    }

    /// Copies raw native-endian bytes into a new image. `bytes` needs no
    /// particular alignment.
    pub fn from_bytes(desc: ImageDesc, bytes: &[u8]) -> Result<Image> {
        desc.validate()?;

        if bytes.len() != desc.size_in_bytes() {
            return Err(Error::BufferSizeMismatch {
                expected: desc.size_in_bytes(),
                actual: bytes.len(),
            });
        }

        let data = match desc.channel_type {
            ChannelType::U8 => PixelData::U8(bytes.to_vec()),
            ChannelType::U16 => PixelData::U16(bytemuck::pod_collect_to_vec(bytes)),
            ChannelType::F32 => PixelData::F32(bytemuck::pod_collect_to_vec(bytes)),
        };

        Ok(Image { desc, data })
    }

    /// Returns the pixel data as native-endian bytes.
    pub fn as_bytes(&self) -> &[u8] {
        dispatch_pixels!(&self.data, v => bytemuck::cast_slice(v.as_slice()))
    }

    /// Typed view of the pixels, `None` when `T` is not the element kind.
    pub fn as_slice<T: Channel>(&self) -> Option<&[T]> {
        dispatch_pixels!(&self.data, v => bytemuck::try_cast_slice(v.as_slice()).ok())
            .filter(|_| self.desc.channel_type == T::TYPE)
    }

    /// Normalized value of channel `c` at texel (`x`, `y`).
    pub fn unit_at(&self, x: u32, y: u32, c: u8) -> f32 {
        debug_assert!(x < self.desc.width && y < self.desc.height);
        debug_assert!(c < self.desc.channel_count);
        let idx = (y as usize * self.desc.width as usize + x as usize)
            * self.desc.channel_count as usize
            + c as usize;
        self.data.unit(idx)
    }
}
