use crate::error::{AgriVisError, Result};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use font_kit::{family_name::FamilyName, properties::Properties, source::SystemSource};
use image::{ImageBuffer, Rgb, RgbImage};
use imageproc::{
    drawing::{
        draw_filled_circle_mut, draw_filled_rect_mut, draw_hollow_rect_mut,
        draw_line_segment_mut, draw_polygon_mut, draw_text_mut,
    },
    point::Point,
    rect::Rect,
};
use std::path::Path;

/// Drawing context: one RGB image plus a system font.
pub struct Renderer {
    pub image: RgbImage,
    pub width: u32,
    pub height: u32,
    font: FontVec,
}

impl Renderer {
    pub fn new(width: u32, height: u32, background: Rgb<u8>) -> Result<Self> {
        let image = ImageBuffer::from_pixel(width, height, background);
        let font = load_system_font()?;

        Ok(Self {
            image,
            width,
            height,
            font,
        })
    }

    pub fn draw_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb<u8>) {
        if width < 1.0 || height < 1.0 {
            return;
        }
        let rect = Rect::at(x as i32, y as i32).of_size(width as u32, height as u32);
        draw_filled_rect_mut(&mut self.image, rect, color);
    }

    pub fn draw_rect_outline(&mut self, x: f64, y: f64, width: f64, height: f64, color: Rgb<u8>) {
        if width < 1.0 || height < 1.0 {
            return;
        }
        let rect = Rect::at(x as i32, y as i32).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(&mut self.image, rect, color);
    }

    pub fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, color: Rgb<u8>) {
        draw_line_segment_mut(
            &mut self.image,
            (x0 as f32, y0 as f32),
            (x1 as f32, y1 as f32),
            color,
        );
    }

    pub fn draw_circle(&mut self, cx: f64, cy: f64, radius: f64, color: Rgb<u8>) {
        draw_filled_circle_mut(
            &mut self.image,
            (cx as i32, cy as i32),
            radius.max(1.0) as i32,
            color,
        );
    }

    /// Filled polygon; the path is open (first point not repeated).
    pub fn draw_polygon(&mut self, points: &[(f64, f64)], color: Rgb<u8>) {
        let mut poly: Vec<Point<i32>> = points
            .iter()
            .map(|&(x, y)| Point::new(x as i32, y as i32))
            .collect();
        poly.dedup();
        // draw_polygon_mut rejects a closed or degenerate path
        if poly.len() >= 3 && poly.first() != poly.last() {
            draw_polygon_mut(&mut self.image, &poly, color);
        }
    }

    pub fn draw_text(&mut self, x: f64, y: f64, text: &str, font_size: f64, color: Rgb<u8>) {
        let scale = PxScale::from(font_size as f32);
        draw_text_mut(
            &mut self.image,
            color,
            x as i32,
            y as i32,
            scale,
            &self.font,
            text,
        );
    }

    /// Text centered horizontally on `cx`
    pub fn draw_text_centered(
        &mut self,
        cx: f64,
        y: f64,
        text: &str,
        font_size: f64,
        color: Rgb<u8>,
    ) {
        let width = self.text_width(text, font_size);
        self.draw_text(cx - width / 2.0, y, text, font_size, color);
    }

    /// Pixel advance width of `text` at `font_size`
    pub fn text_width(&self, text: &str, font_size: f64) -> f64 {
        let scaled = self.font.as_scaled(PxScale::from(font_size as f32));
        text.chars()
            .map(|c| scaled.h_advance(scaled.glyph_id(c)) as f64)
            .sum()
    }

    /// Text rotated 90 degrees counter-clockwise so it reads bottom-to-top,
    /// anchored at its bottom-left corner. The scratch tile is filled with
    /// `background`, so this is only safe over a uniform region.
    pub fn draw_text_rotated(
        &mut self,
        x: f64,
        y: f64,
        text: &str,
        font_size: f64,
        color: Rgb<u8>,
        background: Rgb<u8>,
    ) {
        let tile_w = self.text_width(text, font_size).ceil() as u32 + 2;
        let tile_h = font_size.ceil() as u32 + 4;
        if tile_w == 0 {
            return;
        }

        let mut tile: RgbImage = ImageBuffer::from_pixel(tile_w, tile_h, background);
        draw_text_mut(
            &mut tile,
            color,
            0,
            0,
            PxScale::from(font_size as f32),
            &self.font,
            text,
        );

        for (sx, sy, pixel) in tile.enumerate_pixels() {
            let dx = x as i64 + i64::from(sy);
            let dy = y as i64 - i64::from(sx);
            if dx >= 0 && dy >= 0 && (dx as u32) < self.width && (dy as u32) < self.height {
                self.image.put_pixel(dx as u32, dy as u32, *pixel);
            }
        }
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.image.save(path)?;
        Ok(())
    }
}

fn load_system_font() -> Result<FontVec> {
    let source = SystemSource::new();

    let font_families = vec![
        FamilyName::Title("DejaVu Sans".to_string()),
        FamilyName::Title("Arial".to_string()),
        FamilyName::SansSerif,
        FamilyName::Title("Helvetica".to_string()),
        FamilyName::Title("Liberation Sans".to_string()),
    ];

    for family in font_families {
        if let Ok(handle) = source.select_best_match(&[family], &Properties::new())
            && let Ok(font_kit_font) = handle.load()
            && let Some(font_bytes) = font_kit_font.copy_font_data()
            && let Ok(font) = FontVec::try_from_vec(font_bytes.to_vec())
        {
            return Ok(font);
        }
    }

    Err(AgriVisError::Font(
        "no usable system font found".to_string(),
    ))
}

/// Fixed colors of the figure
pub struct Colors;

impl Colors {
    pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
    pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
    pub const LIGHT_BLUE: Rgb<u8> = Rgb([173, 216, 230]); // figure facecolor
    pub const DARK_GRAY: Rgb<u8> = Rgb([90, 90, 90]);
    pub const GRID_GRAY: Rgb<u8> = Rgb([215, 215, 215]);

    /// Default per-series cycle for the line and point charts
    pub const SERIES_CYCLE: [Rgb<u8>; 5] = [
        Rgb([31, 119, 180]),  // blue
        Rgb([255, 127, 14]),  // orange
        Rgb([44, 160, 44]),   // green
        Rgb([214, 39, 40]),   // red
        Rgb([148, 103, 189]), // purple
    ];
}
