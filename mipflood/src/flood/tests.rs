use super::*;
use crate::image::{ChannelType, ImageDesc};
use crate::test_utils::{
    circular_mask, full_mask, gradient_with_circular_alpha, inside_circle, normal_field,
};

// =============================================================================
// Identity and preservation
// =============================================================================

#[test]
fn full_mask_is_identity_for_every_kind() {
    let options = FloodOptions::default();

    let img = gradient_with_circular_alpha::<u8>(16, 8, 4);
    let out = flood_image(&img, Some(&full_mask::<u8>(16, 8)), &options).unwrap();
    assert_eq!(out, img);

    let img = gradient_with_circular_alpha::<u16>(16, 8, 3);
    let out = flood_image(&img, Some(&full_mask::<f32>(16, 8)), &options).unwrap();
    assert_eq!(out, img);

    let img = gradient_with_circular_alpha::<f32>(9, 13, 2);
    let out = flood_image(&img, Some(&full_mask::<u16>(9, 13)), &options).unwrap();
    assert_eq!(out, img);
}

#[test]
fn covered_texels_keep_exact_values() {
    let img = gradient_with_circular_alpha::<u8>(8, 8, 4);
    let mask = circular_mask::<u8>(8, 8);

    let out = flood_image(&img, Some(&mask), &FloodOptions::default()).unwrap();

    for y in 0..8 {
        for x in 0..8 {
            if inside_circle(x, y, 8, 8) {
                for c in 0..4 {
                    assert_eq!(out.unit_at(x, y, c), img.unit_at(x, y, c));
                }
            }
        }
    }
    assert_ne!(out, img);
}

#[test]
fn preserve_mask_channel_keeps_alpha() {
    let img = gradient_with_circular_alpha::<u8>(8, 8, 4);

    let out = flood_image(&img, None, &FloodOptions::default()).unwrap();

    let src = img.as_slice::<u8>().unwrap();
    let dst = out.as_slice::<u8>().unwrap();
    for (a, b) in src.chunks_exact(4).zip(dst.chunks_exact(4)) {
        assert_eq!(a[3], b[3]);
    }
    assert_ne!(src, dst);
}

#[test]
fn alpha_is_flooded_when_not_preserved() {
    let img = gradient_with_circular_alpha::<u8>(8, 8, 4);
    let options = FloodOptions::default().with_preserve_mask_channel(false);

    let out = flood_image(&img, None, &options).unwrap();

    let dst = out.as_slice::<u8>().unwrap();
    assert!(dst.chunks_exact(4).all(|texel| texel[3] == 255));
}

#[test]
fn channel_mask_limits_overwritten_channels() {
    let img = gradient_with_circular_alpha::<f32>(8, 8, 4);
    let options = FloodOptions::default().with_channel_mask(0b0001u8);

    let out = flood_image(&img, None, &options).unwrap();

    let src = img.as_slice::<f32>().unwrap();
    let dst = out.as_slice::<f32>().unwrap();
    for (a, b) in src.chunks_exact(4).zip(dst.chunks_exact(4)) {
        assert_eq!(a[1..], b[1..]);
    }
}

#[test]
fn constant_covered_color_floods_everywhere() {
    let (w, h) = (16u32, 16u32);
    let mut values = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let covered = inside_circle(x, y, w, h);
            values.extend_from_slice(&[64u8, 200, 0, if covered { 255 } else { 0 }]);
        }
    }
    let img = Image::from_vec(w, h, 4, values).unwrap();

    let out = flood_image(&img, None, &FloodOptions::default()).unwrap();

    for texel in out.as_slice::<u8>().unwrap().chunks_exact(4) {
        assert_eq!(&texel[..3], &[64, 200, 0]);
    }
}

#[test]
fn srgb_flood_of_constant_color_round_trips() {
    let (w, h) = (8u32, 8u32);
    let mut values = Vec::new();
    for y in 0..h {
        for x in 0..w {
            let covered = inside_circle(x, y, w, h);
            values.extend_from_slice(&[0.5f32, if covered { 1.0 } else { 0.0 }]);
        }
    }
    let img = Image::from_vec(w, h, 2, values).unwrap();

    let out = flood_image(&img, None, &FloodOptions::albedo()).unwrap();

    for texel in out.as_slice::<f32>().unwrap().chunks_exact(2) {
        assert!((texel[0] - 0.5).abs() < 1e-3);
    }
}

#[test]
fn normal_map_flood_writes_unit_vectors() {
    let img = normal_field(16, 16);
    let options = FloodOptions::normal_map();

    let out = flood_image(&img, None, &options).unwrap();

    for (i, texel) in out.as_slice::<f32>().unwrap().chunks_exact(4).enumerate() {
        let (x, y) = ((i % 16) as u32, (i / 16) as u32);
        if inside_circle(x, y, 16, 16) {
            continue;
        }
        let len = texel[..3]
            .iter()
            .map(|v| (v * 2.0 - 1.0).powi(2))
            .sum::<f32>()
            .sqrt();
        assert!((len - 1.0).abs() < 1e-4, "texel {i} has length {len}");
    }
}

// =============================================================================
// Degenerate inputs
// =============================================================================

#[test]
fn single_texel_image_is_returned_unchanged() {
    let img = Image::from_vec(1, 1, 4, vec![10u8, 20, 30, 0]).unwrap();
    let out = flood_image(&img, None, &FloodOptions::default()).unwrap();
    assert_eq!(out, img);
}

#[test]
fn zero_coverage_source_is_returned_unchanged() {
    let img = Image::from_vec(4, 4, 2, vec![0.3f32; 32]).unwrap();
    let mask = Image::from_vec(4, 4, 1, vec![0u8; 16]).unwrap();

    let out = flood_image(&img, Some(&mask), &FloodOptions::default()).unwrap();

    assert_eq!(out, img);
}

#[test]
fn empty_channel_selection_is_identity() {
    let values = (0..64u8).map(|i| if i % 3 == 0 { 255 } else { i }).collect();
    let img = Image::from_vec(8, 8, 1, values).unwrap();
    let out = flood_image(&img, None, &FloodOptions::default()).unwrap();
    assert_eq!(out, img);
}

#[test]
fn threshold_binarizes_mask() {
    let img = Image::from_vec(2, 2, 1, vec![0.2f32, 0.4, 0.6, 0.8]).unwrap();
    let mask = Image::from_vec(2, 2, 1, vec![0.5f32, 0.49, 0.49, 0.49]).unwrap();
    let options = FloodOptions::default().with_coverage_threshold(0.5);

    let out = flood_image(&img, Some(&mask), &options).unwrap();

    assert_eq!(out.as_slice::<f32>().unwrap(), &[0.2, 0.2, 0.2, 0.2]);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn mask_must_match_image() {
    let img = gradient_with_circular_alpha::<u8>(8, 8, 4);

    let wrong_size = circular_mask::<u8>(8, 4);
    assert!(matches!(
        flood_image(&img, Some(&wrong_size), &FloodOptions::default()),
        Err(Error::MaskDimensionMismatch {
            expected: (8, 8),
            actual: (8, 4),
            channels: 1
        })
    ));

    let wrong_channels = Image::new_empty(ImageDesc::new(8, 8, 2, ChannelType::U8)).unwrap();
    assert!(matches!(
        generate_mips(&img, Some(&wrong_channels), &FloodOptions::default()),
        Err(Error::MaskDimensionMismatch { channels: 2, .. })
    ));
}

#[test]
fn invalid_threshold_is_rejected() {
    let img = gradient_with_circular_alpha::<u8>(4, 4, 4);
    let options = FloodOptions::default().with_coverage_threshold(2.0);
    assert!(matches!(
        flood_image(&img, None, &options),
        Err(Error::InvalidThreshold { .. })
    ));
}

// =============================================================================
// generate_mips
// =============================================================================

#[test]
fn generated_mips_follow_dimension_law() {
    let img = gradient_with_circular_alpha::<u16>(40, 24, 4);

    let mips = generate_mips(&img, None, &FloodOptions::default()).unwrap();

    assert_eq!(mips.len(), mip_count(40, 24).unwrap() as usize);
    for (i, mip) in mips.iter().enumerate() {
        let shift = i + 1;
        assert_eq!(mip.width(), 40 >> shift);
        assert_eq!(mip.height(), 24 >> shift);
        assert_eq!(mip.channel_count(), 4);
        assert_eq!(mip.desc().channel_type, ChannelType::F32);
    }
}

#[test]
fn composited_chain_has_full_coverage() {
    let img = gradient_with_circular_alpha::<u8>(32, 32, 4);
    let mask = circular_mask::<u8>(32, 32);

    let chain = generate_mip_chain(&img, Some(&mask), &FloodOptions::default()).unwrap();
    assert!(chain
        .levels()
        .iter()
        .all(|level| level.coverage().iter().all(|&c| c == 1.0)));

    let options = FloodOptions::default().with_composite_mips(false);
    let chain = generate_mip_chain(&img, Some(&mask), &options).unwrap();
    assert!(chain.levels()[0].coverage().iter().any(|&c| c < 1.0));
}

#[test]
fn srgb_mips_are_reencoded() {
    let img = Image::from_vec(8, 8, 3, vec![0.5f32; 8 * 8 * 3]).unwrap();
    let mask = full_mask::<u8>(8, 8);

    let mips = generate_mips(&img, Some(&mask), &FloodOptions::albedo()).unwrap();

    for mip in &mips {
        for &v in mip.as_slice::<f32>().unwrap() {
            assert!((v - 0.5).abs() < 1e-3);
        }
    }
}

#[test]
fn thread_count_does_not_change_result() {
    let img = gradient_with_circular_alpha::<f32>(64, 48, 4);

    let single = flood_image(&img, None, &FloodOptions::default().with_max_threads(1)).unwrap();
    let many = flood_image(&img, None, &FloodOptions::default().with_max_threads(4)).unwrap();

    assert_eq!(single, many);
}

// =============================================================================
// scale_alpha_unweighted
// =============================================================================

/// 2x2 RGBA where only the first texel is covered.
fn single_covered_texel() -> Image {
    #[rustfmt::skip]
    let values = vec![
        0.8f32, 0.2, 0.4, 1.0,
        0.1, 0.1, 0.1, 0.0,
        0.1, 0.1, 0.1, 0.0,
        0.1, 0.1, 0.1, 0.0,
    ];
    Image::from_vec(2, 2, 4, values).unwrap()
}

#[test]
fn one_texel_wide_image_with_unweighted_alpha_normal_map() {
    let img = Image::from_vec(1, 8, 4, vec![0.5f32; 32]).unwrap();
    let options = FloodOptions::normal_map()
        .with_channel_mask(0u8)
        .with_scale_alpha_unweighted(true);

    let mips = generate_mips(&img, None, &options).unwrap();
    assert!(mips.is_empty());

    let out = flood_image(&img, None, &options.with_preserve_mask_channel(false)).unwrap();
    assert_eq!(out, img);
}

#[test]
fn unweighted_alpha_is_box_filtered_in_mips() {
    let img = single_covered_texel();
    let options = FloodOptions::default().with_composite_mips(false);

    let weighted = generate_mips(&img, None, &options).unwrap();
    assert_eq!(weighted[0].as_slice::<f32>().unwrap(), &[0.8, 0.2, 0.4, 1.0]);

    let unweighted =
        generate_mips(&img, None, &options.with_scale_alpha_unweighted(true)).unwrap();
    assert_eq!(unweighted[0].as_slice::<f32>().unwrap(), &[0.8, 0.2, 0.4, 0.25]);
}

#[test]
fn unweighted_alpha_outside_channel_mask_is_still_box_filtered() {
    let img = single_covered_texel();
    let options = FloodOptions::default()
        .with_composite_mips(false)
        .with_channel_mask(0b0011u8)
        .with_scale_alpha_unweighted(true);

    let mips = generate_mips(&img, None, &options).unwrap();

    let level = mips[0].as_slice::<f32>().unwrap();
    assert_eq!(level[0], 0.8);
    assert_eq!(level[1], 0.2);
    // unselected color channel and alpha both use the box filter
    assert!((level[2] - 0.175).abs() < 1e-6);
    assert_eq!(level[3], 0.25);
}

#[test]
fn unweighted_alpha_keeps_alpha_when_mask_channel_preserved() {
    let img = gradient_with_circular_alpha::<u8>(8, 8, 4);
    let options = FloodOptions::default().with_scale_alpha_unweighted(true);

    let out = flood_image(&img, None, &options).unwrap();

    let src = img.as_slice::<u8>().unwrap();
    let dst = out.as_slice::<u8>().unwrap();
    for (a, b) in src.chunks_exact(4).zip(dst.chunks_exact(4)) {
        assert_eq!(a[3], b[3]);
    }
    assert_ne!(src, dst);
}

#[test]
fn unweighted_alpha_is_flooded_when_not_preserved() {
    let img = single_covered_texel();
    let options = FloodOptions::default()
        .with_preserve_mask_channel(false)
        .with_scale_alpha_unweighted(true);

    let out = flood_image(&img, None, &options).unwrap();

    let texels: Vec<&[f32]> = out.as_slice::<f32>().unwrap().chunks_exact(4).collect();
    assert_eq!(texels[0], &[0.8, 0.2, 0.4, 1.0]);
    for texel in &texels[1..] {
        assert_eq!(*texel, &[0.8, 0.2, 0.4, 0.25]);
    }
}

#[test]
fn unweighted_alpha_stays_out_of_normal_vector() {
    let img = normal_field(16, 16);
    let options = FloodOptions::normal_map()
        .with_channel_mask(0u8)
        .with_scale_alpha_unweighted(true)
        .with_preserve_mask_channel(false);

    let out = flood_image(&img, None, &options).unwrap();

    for (i, texel) in out.as_slice::<f32>().unwrap().chunks_exact(4).enumerate() {
        let (x, y) = ((i % 16) as u32, (i / 16) as u32);
        if inside_circle(x, y, 16, 16) {
            continue;
        }
        let len = texel[..3]
            .iter()
            .map(|v| (v * 2.0 - 1.0).powi(2))
            .sum::<f32>()
            .sqrt();
        assert!((len - 1.0).abs() < 1e-4, "texel {i} has length {len}");
        assert!((0.0..=1.0).contains(&texel[3]));
    }
}
