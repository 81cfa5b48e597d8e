//! Options shared by [`generate_mips`](crate::generate_mips) and
//! [`flood_image`](crate::flood_image).

use serde::{Deserialize, Serialize};

use crate::channel_mask::ChannelMask;
use crate::error::{Error, Result};

/// Tuning for mip generation and flooding.
///
/// Every field has a default and can be toggled on its own. Missing fields
/// fall back to their defaults when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloodOptions {
    // -- Coverage --
    /// Mask samples at or above this value count as covered. Must be in [0, 1].
    pub coverage_threshold: f32,

    // -- Channel processing --
    /// Treat selected channels as sRGB-encoded and filter them in linear light.
    pub convert_srgb: bool,
    /// Renormalize the selected channels as a tangent-space vector after
    /// every weighted average.
    pub is_normal_map: bool,
    /// Channels that are weighted, converted and flooded. `0` selects all.
    pub channel_mask: ChannelMask,
    /// Downsample the last channel with a plain box filter instead of the
    /// coverage-weighted one.
    pub scale_alpha_unweighted: bool,

    // -- Outputs --
    /// Fill holes in the chain returned by `generate_mips`.
    pub composite_mips: bool,
    /// Without an explicit mask, never overwrite the last (mask) channel
    /// when flooding.
    pub preserve_mask_channel: bool,

    // -- Execution --
    /// Worker count for the call. `0` uses half of the hardware threads.
    pub max_threads: usize,
}

impl Default for FloodOptions {
    fn default() -> Self {
        Self {
            coverage_threshold: 0.999,
            convert_srgb: false,
            is_normal_map: false,
            channel_mask: ChannelMask::ALL,
            scale_alpha_unweighted: false,
            composite_mips: true,
            preserve_mask_channel: true,
            max_threads: 0,
        }
    }
}

impl FloodOptions {
    /// sRGB color textures: filtering happens in linear light.
    pub fn albedo() -> Self {
        Self {
            convert_srgb: true,
            ..Self::default()
        }
    }

    /// Tangent-space normal maps stored in the first three channels.
    pub fn normal_map() -> Self {
        Self {
            is_normal_map: true,
            channel_mask: ChannelMask::from_bits(0b0111),
            ..Self::default()
        }
    }

    /// Linear data textures (roughness, masks, heights).
    pub fn data() -> Self {
        Self::default()
    }

    pub fn with_coverage_threshold(mut self, threshold: f32) -> Self {
        self.coverage_threshold = threshold;
        self
    }

    pub fn with_convert_srgb(mut self, convert: bool) -> Self {
        self.convert_srgb = convert;
        self
    }

    pub fn with_normal_map(mut self, is_normal_map: bool) -> Self {
        self.is_normal_map = is_normal_map;
        self
    }

    pub fn with_channel_mask(mut self, mask: impl Into<ChannelMask>) -> Self {
        self.channel_mask = mask.into();
        self
    }

    pub fn with_scale_alpha_unweighted(mut self, unweighted: bool) -> Self {
        self.scale_alpha_unweighted = unweighted;
        self
    }

    pub fn with_composite_mips(mut self, composite: bool) -> Self {
        self.composite_mips = composite;
        self
    }

    pub fn with_preserve_mask_channel(mut self, preserve: bool) -> Self {
        self.preserve_mask_channel = preserve;
        self
    }

    pub fn with_max_threads(mut self, max_threads: usize) -> Self {
        self.max_threads = max_threads;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.coverage_threshold) {
            return Err(Error::InvalidThreshold {
                value: self.coverage_threshold,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = FloodOptions::default();
        assert_eq!(options.coverage_threshold, 0.999);
        assert!(!options.convert_srgb);
        assert!(!options.is_normal_map);
        assert!(options.channel_mask.is_all());
        assert!(!options.scale_alpha_unweighted);
        assert!(options.composite_mips);
        assert!(options.preserve_mask_channel);
        assert_eq!(options.max_threads, 0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn threshold_outside_unit_range_is_rejected() {
        for value in [-0.1, 1.5, f32::NAN] {
            let options = FloodOptions::default().with_coverage_threshold(value);
            assert!(matches!(
                options.validate(),
                Err(Error::InvalidThreshold { .. })
            ));
        }
        assert!(FloodOptions::default()
            .with_coverage_threshold(0.0)
            .validate()
            .is_ok());
    }

    #[test]
    fn presets() {
        assert!(FloodOptions::albedo().convert_srgb);
        let normal = FloodOptions::normal_map();
        assert!(normal.is_normal_map);
        assert_eq!(normal.channel_mask.bits(), 0b0111);
        assert_eq!(FloodOptions::data(), FloodOptions::default());
    }

    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let options: FloodOptions =
            serde_json::from_str(r#"{ "convert_srgb": true, "channel_mask": 7 }"#).unwrap();
        assert!(options.convert_srgb);
        assert_eq!(options.channel_mask.bits(), 7);
        assert_eq!(options.coverage_threshold, 0.999);
        assert!(options.preserve_mask_channel);
    }

    #[test]
    fn yaml_round_trip() {
        let options = FloodOptions::normal_map()
            .with_max_threads(2)
            .with_scale_alpha_unweighted(true);
        let text = serde_yml::to_string(&options).unwrap();
        let parsed: FloodOptions = serde_yml::from_str(&text).unwrap();
        assert_eq!(parsed, options);
    }
}
