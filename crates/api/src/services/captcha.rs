//! Image-code generation.
//!
//! Renders a short random text into a noisy PNG. Glyphs come from a built-in
//! 5x7 bitmap table scaled and jittered per character; the background is
//! filled with random arcs so the text does not sit on a clean canvas.

use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::drawing::{draw_antialiased_line_segment_mut, draw_filled_rect_mut};
use imageproc::pixelops::interpolate;
use imageproc::rect::Rect;
use rand::Rng;
use thiserror::Error;

/// Character set excluding easily-confused glyphs (0/O, 1/I, 8/B).
const CHARSET: &[u8] = b"ACDEFGHJKLMNPQRSTUVWXYZ2345679";
const CODE_LENGTH: usize = 4;

const WIDTH: u32 = 180;
const HEIGHT: u32 = 60;
const BACKGROUND: Rgb<u8> = Rgb([26, 30, 35]);
const ARC_COUNT: usize = 12;

/// Errors that can occur while rendering an image code.
#[derive(Debug, Error)]
pub enum CaptchaError {
    /// The rendered image could not be encoded as PNG.
    #[error("failed to encode captcha image: {0}")]
    Encode(#[from] image::ImageError),
}

struct ArcParams {
    cx: i32,
    cy: i32,
    radius: i32,
    start_deg: f32,
    sweep_deg: f32,
    color: Rgb<u8>,
}

/// Generates image verification codes.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptchaGenerator;

impl CaptchaGenerator {
    /// Create a new generator.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Generate a new image code.
    ///
    /// Returns the code text and the rendered PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the image cannot be encoded as PNG.
    pub fn generate(&self) -> Result<(String, Vec<u8>), CaptchaError> {
        let mut rng = rand::rng();

        let text: String = (0..CODE_LENGTH)
            .map(|_| CHARSET[rng.random_range(0..CHARSET.len())] as char)
            .collect();

        let mut img: RgbImage = ImageBuffer::from_pixel(WIDTH, HEIGHT, BACKGROUND);

        let colors = generate_colors(&mut rng);
        draw_background(&mut img, &mut rng, &colors);

        // Evenly spaced columns with per-character jitter.
        let step = (WIDTH - 20) / CODE_LENGTH as u32;
        for (i, ch) in text.bytes().enumerate() {
            let scale = rng.random_range(5..=7);
            let x0 = 10 + i as i32 * step as i32 + rng.random_range(-4..=4);
            let y0 = rng.random_range(2..=(HEIGHT as i32 - 7 * scale).max(3));
            let shear = rng.random_range(-2..=2);
            let color = colors[rng.random_range(0..colors.len())];

            draw_glyph(&mut img, ch, x0, y0, scale, shear, color);
        }

        let mut png = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;

        Ok((text, png))
    }
}

/// Pick a small palette of bright colors that stand out on the background.
fn generate_colors(rng: &mut impl Rng) -> Vec<Rgb<u8>> {
    let mut colors: Vec<Rgb<u8>> = Vec::new();
    for _ in 0..4 {
        let mut c = [
            rng.random_range(90..=255),
            rng.random_range(90..=255),
            rng.random_range(90..=255),
        ];
        c[rng.random_range(0..3)] = rng.random_range(180..=255);
        colors.push(Rgb(c));
    }
    colors
}

/// Scatter random arcs across the canvas as visual noise.
fn draw_background(img: &mut RgbImage, rng: &mut impl Rng, colors: &[Rgb<u8>]) {
    let (width, height) = img.dimensions();
    let width_i32 = i32::try_from(width).unwrap_or(180);
    let height_i32 = i32::try_from(height).unwrap_or(60);

    for _ in 0..ARC_COUNT {
        let arc = ArcParams {
            cx: rng.random_range(0..width_i32),
            cy: rng.random_range(0..height_i32),
            radius: rng.random_range(8..50),
            start_deg: rng.random_range(0.0..360.0_f32),
            sweep_deg: rng.random_range(30.0..180.0_f32),
            color: colors[rng.random_range(0..colors.len())],
        };
        draw_arc(img, &arc);
    }
}

/// Approximate an arc with short anti-aliased line segments.
fn draw_arc(img: &mut RgbImage, params: &ArcParams) {
    let steps: i16 = 40;
    let start_rad = params.start_deg.to_radians();
    let sweep_rad = params.sweep_deg.to_radians();

    let radius = f32::from(i16::try_from(params.radius).unwrap_or(0));
    let mut prev_x = params.cx + (radius * start_rad.cos()).round() as i32;
    let mut prev_y = params.cy + (radius * start_rad.sin()).round() as i32;

    for i in 1..=steps {
        let angle = start_rad + sweep_rad * f32::from(i) / f32::from(steps);
        let curr_x = params.cx + (radius * angle.cos()).round() as i32;
        let curr_y = params.cy + (radius * angle.sin()).round() as i32;

        if prev_x >= 0 && prev_y >= 0 && curr_x >= 0 && curr_y >= 0 {
            draw_antialiased_line_segment_mut(
                img,
                (prev_x, prev_y),
                (curr_x, curr_y),
                params.color,
                interpolate,
            );
        }

        prev_x = curr_x;
        prev_y = curr_y;
    }
}

/// Draw one character from the bitmap table, scaled with a horizontal shear.
fn draw_glyph(
    img: &mut RgbImage,
    ch: u8,
    x0: i32,
    y0: i32,
    scale: i32,
    shear: i32,
    color: Rgb<u8>,
) {
    let rows = glyph(ch);
    let (width, height) = img.dimensions();
    let width_i32 = i32::try_from(width).unwrap_or(0);
    let height_i32 = i32::try_from(height).unwrap_or(0);

    for (gy, &row) in rows.iter().enumerate() {
        let gy = i32::try_from(gy).unwrap_or(0);
        // Lean the glyph left or right as the rows descend.
        let row_offset = x0 + gy * shear / 7;

        for gx in 0..5_u8 {
            if row & (0b1_0000 >> gx) == 0 {
                continue;
            }

            let px = row_offset + i32::from(gx) * scale;
            let py = y0 + gy * scale;
            if px < 0 || py < 0 || px + scale > width_i32 || py + scale > height_i32 {
                continue;
            }

            #[allow(clippy::cast_sign_loss)] // bounds checked above
            let rect = Rect::at(px, py).of_size(scale as u32, scale as u32);
            draw_filled_rect_mut(img, rect, color);
        }
    }
}

/// 5x7 bitmap rows (top to bottom, MSB on the left) for the charset.
#[allow(clippy::too_many_lines)]
const fn glyph(ch: u8) -> [u8; 7] {
    match ch {
        b'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        b'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        b'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        b'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        b'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        b'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        b'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        b'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        b'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        b'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        b'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        b'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        b'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        b'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        b'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        b'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        b'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        b'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        b'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        b'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        b'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        b'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        b'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        b'2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        b'3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        b'4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        b'5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        b'6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        b'7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        b'9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        _ => [0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111, 0b11111],
    }
}
