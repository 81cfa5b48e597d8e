//! Synthetic images for tests and benchmarks.

use crate::image::{Channel, Image};

/// Whether texel (`x`, `y`) lies inside the circle inscribed in a
/// `width` x `height` image.
pub fn inside_circle(x: u32, y: u32, width: u32, height: u32) -> bool {
    let cx = width as f32 * 0.5;
    let cy = height as f32 * 0.5;
    let radius = width.min(height) as f32 * 0.4;
    let dx = x as f32 + 0.5 - cx;
    let dy = y as f32 + 0.5 - cy;
    dx * dx + dy * dy <= radius * radius
}

/// Single-channel mask, 1 inside the inscribed circle and 0 outside.
pub fn circular_mask<T: Channel>(width: u32, height: u32) -> Image {
    let values = (0..height)
        .flat_map(|y| (0..width).map(move |x| (x, y)))
        .map(|(x, y)| T::from_unit(if inside_circle(x, y, width, height) { 1.0 } else { 0.0 }))
        .collect();
    Image::from_vec(width, height, 1, values).expect("valid mask dimensions")
}

/// Horizontal and vertical gradients in the first two channels, a constant
/// 0.25 in the remaining color channels and a circular coverage in the last.
pub fn gradient_with_circular_alpha<T: Channel>(width: u32, height: u32, channels: u8) -> Image {
    assert!(channels >= 2, "need at least one color channel and alpha");
    let last = channels - 1;

    let mut values = Vec::with_capacity((width * height * channels as u32) as usize);
    for y in 0..height {
        for x in 0..width {
            for c in 0..channels {
                let v = match c {
                    c if c == last => {
                        if inside_circle(x, y, width, height) {
                            1.0
                        } else {
                            0.0
                        }
                    }
                    0 => x as f32 / width.max(2).saturating_sub(1) as f32,
                    1 => y as f32 / height.max(2).saturating_sub(1) as f32,
                    _ => 0.25,
                };
                values.push(T::from_unit(v));
            }
        }
    }
    Image::from_vec(width, height, channels, values).expect("valid image dimensions")
}

/// Tangent-space normals tilting outward from the center, encoded in [0, 1],
/// with a fourth channel holding circular coverage.
pub fn normal_field(width: u32, height: u32) -> Image {
    let mut values = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let nx = (x as f32 + 0.5) / width as f32 - 0.5;
            let ny = (y as f32 + 0.5) / height as f32 - 0.5;
            let nz = (1.0 - nx * nx - ny * ny).max(0.0).sqrt();
            let covered = inside_circle(x, y, width, height);
            values.extend_from_slice(&[
                nx * 0.5 + 0.5,
                ny * 0.5 + 0.5,
                nz * 0.5 + 0.5,
                if covered { 1.0 } else { 0.0 },
            ]);
        }
    }
    Image::from_vec(width, height, 4, values).expect("valid image dimensions")
}

/// Fully covered single-channel mask.
pub fn full_mask<T: Channel>(width: u32, height: u32) -> Image {
    let values = vec![T::from_unit(1.0); (width * height) as usize];
    Image::from_vec(width, height, 1, values).expect("valid mask dimensions")
}
