//! Mip flooding for sparsely covered textures.
//!
//! Texels outside a texture's coverage (UV islands, cutout alpha) are filled
//! with colors pulled from coarser, coverage-weighted mip levels so that
//! downsampled levels never bleed undefined data into covered regions.
//!
//! ```no_run
//! use mipflood::{flood_image, FloodOptions, Image};
//!
//! # fn main() -> mipflood::Result<()> {
//! let rgba = Image::from_vec(4, 4, 4, vec![0u8; 4 * 4 * 4])?;
//! let flooded = flood_image(&rgba, None, &FloodOptions::albedo())?;
//! assert_eq!(flooded.desc(), rgba.desc());
//! # Ok(())
//! # }
//! ```

mod channel_mask;
pub mod color_space;
mod error;
mod executor;
mod flood;
mod image;
mod mip;
pub mod normal;
mod options;

#[cfg(feature = "bench")]
pub mod bench;
#[cfg(any(test, feature = "bench"))]
pub mod test_utils;

pub use channel_mask::{ChannelMask, ChannelSet, MAX_CHANNELS};
pub use color_space::{linear_to_srgb, srgb_to_linear};
pub use error::{Error, Result};
pub use executor::resolve_thread_count;
pub use flood::{flood_image, generate_mip_chain, generate_mips};
pub use image::{Channel, ChannelType, Image, ImageDesc, PixelData, MAX_DIMENSION};
pub use mip::{mip_count, MipChain, MipLevel};
pub use normal::normalize_texel;
pub use options::FloodOptions;

/// Packs per-channel flags into a [`ChannelMask`] for a texel of `stride`
/// channels. See [`ChannelMask::from_flags`].
pub fn channel_bitmask(flags: &[bool], stride: usize) -> Result<ChannelMask> {
    ChannelMask::from_flags(flags, stride)
}
