//! Tray icon rendering.
//!
//! Both icon variants are drawn at startup into RGBA images: a coloured disc with
//! a microphone glyph, struck through when muted.

use super::IconVariant;
use image::{Rgba, RgbaImage};

/// Icon size in pixels.
pub const ICON_SIZE: u32 = 32;

const MUTED_FILL: [u8; 3] = [220, 60, 60];
const UNMUTED_FILL: [u8; 3] = [60, 180, 60];

/// Render the icon for `variant`.
pub fn render(variant: IconVariant) -> RgbaImage {
    let muted = variant == IconVariant::Muted;
    let [r, g, b] = if muted { MUTED_FILL } else { UNMUTED_FILL };

    let center = ICON_SIZE as f32 / 2.0;
    let radius = center - 3.0;

    let mut img = RgbaImage::from_fn(ICON_SIZE, ICON_SIZE, |x, y| {
        let dx = x as f32 - center;
        let dy = y as f32 - center;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist < radius {
            Rgba([r, g, b, 255])
        } else if dist < radius + 1.0 {
            // Anti-aliased edge
            Rgba([r, g, b, ((radius + 1.0 - dist) * 255.0) as u8])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });

    draw_microphone(&mut img, if muted { 40 } else { 255 });

    if muted {
        draw_strike_through(&mut img);
    }

    img
}

/// Microphone body plus a short stand, only over opaque pixels.
fn draw_microphone(img: &mut RgbaImage, shade: u8) {
    let center_x = ICON_SIZE / 2;
    let body_width = ICON_SIZE / 4;
    let body_top = ICON_SIZE / 4;
    let body_bottom = body_top + ICON_SIZE / 2;

    let body = (body_top..body_bottom).flat_map(|y| {
        (center_x - body_width / 2..center_x + body_width / 2).map(move |x| (x, y))
    });
    let stand = (body_bottom..body_bottom + 3).map(|y| (center_x, y));

    for (x, y) in body.chain(stand) {
        let px = img.get_pixel_mut(x, y);
        if px[3] > 0 {
            *px = Rgba([shade, shade, shade, px[3]]);
        }
    }
}

/// Two-pixel diagonal from top-left to bottom-right.
fn draw_strike_through(img: &mut RgbaImage) {
    for i in 4..ICON_SIZE - 4 {
        for y in [i, i + 1] {
            img.put_pixel(i, y, Rgba([255, 255, 255, 255]));
        }
    }
}
