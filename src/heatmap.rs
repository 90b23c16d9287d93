//! Confusion matrix heatmap rendering.
//!
//! Cells are shaded on a yellow-orange-brown ramp scaled to the largest count,
//! annotated with their counts, and framed by the class labels and a colour bar.

use image::{Rgb, RgbImage};

use crate::metrics::ConfusionMatrix;

pub mod colors {
    use image::Rgb;

    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const INK: Rgb<u8> = Rgb([38, 38, 38]);

    /// Yellow-orange-brown ramp, low to high.
    pub const YLORBR: [Rgb<u8>; 5] = [
        Rgb([255, 255, 229]),
        Rgb([254, 227, 145]),
        Rgb([254, 153, 41]),
        Rgb([204, 76, 2]),
        Rgb([102, 37, 6]),
    ];
}

const PAD: u32 = 16;
const MIN_CELL: u32 = 64;
const BAR_WIDTH: u32 = 16;
const SCALE: u32 = 2;
const GLYPH_WIDTH: u32 = 5;
const GLYPH_HEIGHT: u32 = 7;

pub fn interpolate_color(c1: Rgb<u8>, c2: Rgb<u8>, t: f64) -> Rgb<u8> {
    let t = t.clamp(0.0, 1.0);
    Rgb([
        ((1.0 - t) * c1.0[0] as f64 + t * c2.0[0] as f64) as u8,
        ((1.0 - t) * c1.0[1] as f64 + t * c2.0[1] as f64) as u8,
        ((1.0 - t) * c1.0[2] as f64 + t * c2.0[2] as f64) as u8,
    ])
}

/// Maps `value` in `[0, 1]` onto [`colors::YLORBR`].
pub fn ylorbr(value: f64) -> Rgb<u8> {
    let stops = colors::YLORBR;
    let scaled = value.clamp(0.0, 1.0) * (stops.len() - 1) as f64;
    let i = (scaled.floor() as usize).min(stops.len() - 2);
    interpolate_color(stops[i], stops[i + 1], scaled - i as f64)
}

pub fn draw_filled_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    let (img_width, img_height) = img.dimensions();
    for py in y..(y + height).min(img_height) {
        for px in x..(x + width).min(img_width) {
            img.put_pixel(px, py, color);
        }
    }
}

// 5x7 glyphs, one byte per row, bit 4 is the leftmost column.
fn glyph(c: char) -> [u8; 7] {
    match c.to_ascii_uppercase() {
        'A' => [0x0E, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'B' => [0x1E, 0x11, 0x11, 0x1E, 0x11, 0x11, 0x1E],
        'C' => [0x0E, 0x11, 0x10, 0x10, 0x10, 0x11, 0x0E],
        'D' => [0x1E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x1E],
        'E' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F],
        'F' => [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10],
        'G' => [0x0E, 0x11, 0x10, 0x17, 0x11, 0x11, 0x0F],
        'H' => [0x11, 0x11, 0x11, 0x1F, 0x11, 0x11, 0x11],
        'I' => [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E],
        'J' => [0x07, 0x02, 0x02, 0x02, 0x02, 0x12, 0x0C],
        'K' => [0x11, 0x12, 0x14, 0x18, 0x14, 0x12, 0x11],
        'L' => [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F],
        'M' => [0x11, 0x1B, 0x15, 0x15, 0x11, 0x11, 0x11],
        'N' => [0x11, 0x11, 0x19, 0x15, 0x13, 0x11, 0x11],
        'O' => [0x0E, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'P' => [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10],
        'Q' => [0x0E, 0x11, 0x11, 0x11, 0x15, 0x12, 0x0D],
        'R' => [0x1E, 0x11, 0x11, 0x1E, 0x14, 0x12, 0x11],
        'S' => [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E],
        'T' => [0x1F, 0x04, 0x04, 0x04, 0x04, 0x04, 0x04],
        'U' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x11, 0x0E],
        'V' => [0x11, 0x11, 0x11, 0x11, 0x11, 0x0A, 0x04],
        'W' => [0x11, 0x11, 0x11, 0x15, 0x15, 0x15, 0x0A],
        'X' => [0x11, 0x11, 0x0A, 0x04, 0x0A, 0x11, 0x11],
        'Y' => [0x11, 0x11, 0x11, 0x0A, 0x04, 0x04, 0x04],
        'Z' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x10, 0x1F],
        '0' => [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E],
        '1' => [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E],
        '2' => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F],
        '3' => [0x1F, 0x02, 0x04, 0x02, 0x01, 0x11, 0x0E],
        '4' => [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02],
        '5' => [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E],
        '6' => [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E],
        '7' => [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08],
        '8' => [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E],
        '9' => [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C],
        ' ' => [0x00; 7],
        ':' => [0x00, 0x0C, 0x0C, 0x00, 0x0C, 0x0C, 0x00],
        '/' => [0x00, 0x01, 0x02, 0x04, 0x08, 0x10, 0x00],
        '_' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x1F],
        '-' => [0x00, 0x00, 0x00, 0x1F, 0x00, 0x00, 0x00],
        '.' => [0x00, 0x00, 0x00, 0x00, 0x00, 0x0C, 0x0C],
        _ => [0x0E, 0x11, 0x01, 0x02, 0x04, 0x00, 0x04],
    }
}

fn text_width(text: &str) -> u32 {
    match text.chars().count() as u32 {
        0 => 0,
        n => n * (GLYPH_WIDTH + 1) * SCALE - SCALE,
    }
}

const TEXT_HEIGHT: u32 = GLYPH_HEIGHT * SCALE;

fn draw_text(img: &mut RgbImage, x: u32, y: u32, text: &str, color: Rgb<u8>) {
    for (i, c) in text.chars().enumerate() {
        let left = x + i as u32 * (GLYPH_WIDTH + 1) * SCALE;
        for (row, bits) in glyph(c).iter().enumerate() {
            for col in 0..GLYPH_WIDTH {
                if bits & (0x10 >> col) != 0 {
                    draw_filled_rect(img, left + col * SCALE, y + row as u32 * SCALE, SCALE, SCALE, color);
                }
            }
        }
    }
}

fn draw_text_centered(img: &mut RgbImage, center_x: u32, y: u32, text: &str, color: Rgb<u8>) {
    draw_text(img, center_x.saturating_sub(text_width(text) / 2), y, text, color);
}

/// Pixel geometry of a rendered confusion matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeatmapLayout {
    pub width: u32,
    pub height: u32,
    /// Top-left corner of the cell grid.
    pub grid_x: u32,
    pub grid_y: u32,
    pub cell: u32,
}

impl HeatmapLayout {
    pub fn new(title: &str, matrix: &ConfusionMatrix) -> Self {
        let n = matrix.labels.len() as u32;
        let label_width = matrix.labels.iter().map(|l| text_width(l)).max().unwrap_or(0);
        let cell = MIN_CELL.max(label_width + PAD / 2);
        let max_count = matrix.counts.iter().flatten().copied().max().unwrap_or(0);

        let grid_x = PAD + label_width.max(text_width(TRUE_HEADING)) + PAD;
        let grid_y = 3 * PAD + 2 * TEXT_HEIGHT;
        let bar_end = grid_x + n * cell + PAD + BAR_WIDTH + PAD / 4 + text_width(&max_count.to_string()) + PAD;
        let width = bar_end.max(2 * PAD + text_width(title));
        let height = grid_y + n * cell + PAD / 2 + TEXT_HEIGHT + PAD + TEXT_HEIGHT + PAD;

        Self {
            width,
            height,
            grid_x,
            grid_y,
            cell,
        }
    }
}

const TRUE_HEADING: &str = "True label";
const PREDICTED_HEADING: &str = "Predicted label";

/// Renders `matrix` as an annotated heatmap: rows are true labels, columns predicted labels.
pub fn render_confusion_matrix(title: &str, matrix: &ConfusionMatrix) -> RgbImage {
    let layout = HeatmapLayout::new(title, matrix);
    let HeatmapLayout { grid_x, grid_y, cell, .. } = layout;
    let n = matrix.labels.len() as u32;
    let mut img = RgbImage::from_pixel(layout.width, layout.height, colors::WHITE);

    draw_text_centered(&mut img, layout.width / 2, PAD, title, colors::INK);
    draw_text(&mut img, PAD, grid_y - PAD / 2 - TEXT_HEIGHT, TRUE_HEADING, colors::INK);

    let max_count = matrix.counts.iter().flatten().copied().max().unwrap_or(0);
    let intensity = |count: usize| if max_count == 0 { 0.0 } else { count as f64 / max_count as f64 };

    for (i, row) in matrix.counts.iter().enumerate() {
        let y = grid_y + i as u32 * cell;
        for (j, &count) in row.iter().enumerate() {
            let x = grid_x + j as u32 * cell;
            let value = intensity(count);
            draw_filled_rect(&mut img, x, y, cell, cell, ylorbr(value));
            let ink = if value > 0.5 { colors::WHITE } else { colors::INK };
            draw_text_centered(&mut img, x + cell / 2, y + (cell - TEXT_HEIGHT) / 2, &count.to_string(), ink);
        }
    }

    for (k, label) in matrix.labels.iter().enumerate() {
        let offset = k as u32 * cell;
        draw_text(&mut img, PAD, grid_y + offset + (cell - TEXT_HEIGHT) / 2, label, colors::INK);
        draw_text_centered(&mut img, grid_x + offset + cell / 2, grid_y + n * cell + PAD / 2, label, colors::INK);
    }
    draw_text_centered(
        &mut img,
        grid_x + n * cell / 2,
        grid_y + n * cell + PAD / 2 + TEXT_HEIGHT + PAD,
        PREDICTED_HEADING,
        colors::INK,
    );

    // colour bar, high at the top
    let bar_x = grid_x + n * cell + PAD;
    let bar_height = n * cell;
    for dy in 0..bar_height {
        let value = 1.0 - dy as f64 / (bar_height.max(2) - 1) as f64;
        draw_filled_rect(&mut img, bar_x, grid_y + dy, BAR_WIDTH, 1, ylorbr(value));
    }
    if n > 0 {
        let label_x = bar_x + BAR_WIDTH + PAD / 4;
        draw_text(&mut img, label_x, grid_y, &max_count.to_string(), colors::INK);
        draw_text(&mut img, label_x, grid_y + bar_height - TEXT_HEIGHT, "0", colors::INK);
    }

    img
}
