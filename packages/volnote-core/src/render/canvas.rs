//! Glyph rasterization and RGBA compositing for the status icon.
//!
//! Glyphs are drawn at the monospaced font's native resolution into a binary
//! coverage map, then sampled bilinearly while compositing onto the final
//! canvas. The upsampling is what anti-aliases the edges.

use core::convert::Infallible;

use embedded_graphics::{
    draw_target::DrawTarget,
    geometry::{OriginDimensions, Point, Size},
    mono_font::{ascii::FONT_10X20, MonoTextStyle},
    pixelcolor::BinaryColor,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
    Drawable, Pixel,
};

use super::Rgb;

/// Binary coverage map holding rasterized glyphs at native font resolution.
pub(super) struct GlyphMap {
    width: u32,
    height: u32,
    cover: Vec<bool>,
}

impl GlyphMap {
    /// Native glyph cell height in pixels.
    pub(super) fn glyph_height() -> u32 {
        FONT_10X20.character_size.height
    }

    /// Rasterizes `text` centered in a map sized to fit it, with `margin`
    /// clear pixels on every side so a later dilation cannot clip.
    pub(super) fn render(text: &str, margin: u32) -> Self {
        let cell = FONT_10X20.character_size.width + FONT_10X20.character_spacing;
        let cols = text.chars().count() as u32;
        let width = cols * cell + margin * 2;
        let height = FONT_10X20.character_size.height + margin * 2;

        let mut map = Self {
            width,
            height,
            cover: vec![false; (width * height) as usize],
        };

        let glyph_style = MonoTextStyle::new(&FONT_10X20, BinaryColor::On);
        let text_style = TextStyleBuilder::new()
            .alignment(Alignment::Center)
            .baseline(Baseline::Middle)
            .build();
        let anchor = Point::new(width as i32 / 2, height as i32 / 2);
        // Drawing into an in-memory map is infallible.
        let _ = Text::with_text_style(text, anchor, glyph_style, text_style).draw(&mut map);
        map
    }

    /// Returns a copy with coverage grown by `radius` pixels in every
    /// direction (8-neighborhood). This is the stroke layer.
    pub(super) fn dilated(&self, radius: u32) -> Self {
        let r = radius as i32;
        let mut cover = vec![false; self.cover.len()];
        for y in 0..self.height as i32 {
            for x in 0..self.width as i32 {
                'grow: for dy in -r..=r {
                    for dx in -r..=r {
                        if self.is_set(x + dx, y + dy) {
                            cover[(y as u32 * self.width + x as u32) as usize] = true;
                            break 'grow;
                        }
                    }
                }
            }
        }
        Self {
            width: self.width,
            height: self.height,
            cover,
        }
    }

    fn is_set(&self, x: i32, y: i32) -> bool {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return false;
        }
        self.cover[(y as u32 * self.width + x as u32) as usize]
    }

    fn coverage(&self, x: i32, y: i32) -> f32 {
        if self.is_set(x, y) {
            1.0
        } else {
            0.0
        }
    }

    /// Bilinearly samples coverage at a fractional position. Out-of-bounds
    /// samples read as empty.
    fn sample(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor();
        let y0 = y.floor();
        let fx = x - x0;
        let fy = y - y0;
        let (x0, y0) = (x0 as i32, y0 as i32);

        let top = self.coverage(x0, y0) * (1.0 - fx) + self.coverage(x0 + 1, y0) * fx;
        let bottom = self.coverage(x0, y0 + 1) * (1.0 - fx) + self.coverage(x0 + 1, y0 + 1) * fx;
        top * (1.0 - fy) + bottom * fy
    }
}

impl OriginDimensions for GlyphMap {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for GlyphMap {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if point.x >= 0
                && point.y >= 0
                && (point.x as u32) < self.width
                && (point.y as u32) < self.height
            {
                self.cover[(point.y as u32 * self.width + point.x as u32) as usize] =
                    color.is_on();
            }
        }
        Ok(())
    }
}

/// RGBA8 canvas the icon is composed on. Starts fully transparent.
pub(super) struct Canvas {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Canvas {
    pub(super) fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; (width * height * 4) as usize],
        }
    }

    /// Composites a glyph map onto the canvas, scaled by `scale` and centered
    /// both horizontally and vertically. Every pass through this method uses
    /// the same centering transform, so repeated passes overlap exactly.
    ///
    /// Coverage is sampled bilinearly and blended by keeping the strongest
    /// alpha seen per pixel; content wider than the canvas is clipped at the
    /// edges.
    pub(super) fn composite_centered(&mut self, map: &GlyphMap, scale: f32, color: Rgb) {
        let dst_w = map.width as f32 * scale;
        let dst_h = map.height as f32 * scale;
        let x0 = (self.width as f32 - dst_w) / 2.0;
        let y0 = (self.height as f32 - dst_h) / 2.0;

        for y in 0..self.height {
            for x in 0..self.width {
                // Map the destination pixel center back into glyph space.
                let sx = (x as f32 + 0.5 - x0) / scale - 0.5;
                let sy = (y as f32 + 0.5 - y0) / scale - 0.5;
                let coverage = map.sample(sx, sy);
                if coverage <= 0.0 {
                    continue;
                }
                let alpha = (coverage * 255.0).round().clamp(0.0, 255.0) as u8;
                let i = ((y * self.width + x) * 4) as usize;
                if alpha > self.rgba[i + 3] {
                    self.rgba[i] = color.r;
                    self.rgba[i + 1] = color.g;
                    self.rgba[i + 2] = color.b;
                    self.rgba[i + 3] = alpha;
                }
            }
        }
    }

    pub(super) fn into_bitmap(self) -> super::IconBitmap {
        super::IconBitmap {
            width: self.width,
            height: self.height,
            rgba: self.rgba,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set_count(map: &GlyphMap) -> usize {
        map.cover.iter().filter(|c| **c).count()
    }

    #[test]
    fn rendering_digits_sets_coverage() {
        let map = GlyphMap::render("42", 1);
        assert!(set_count(&map) > 0);
    }

    #[test]
    fn margin_rows_stay_clear_before_dilation() {
        let map = GlyphMap::render("00", 2);
        for x in 0..map.width as i32 {
            assert!(!map.is_set(x, 0));
            assert!(!map.is_set(x, map.height as i32 - 1));
        }
    }

    #[test]
    fn dilation_is_a_superset() {
        let map = GlyphMap::render("07", 2);
        let fat = map.dilated(2);
        assert!(set_count(&fat) > set_count(&map));
        for y in 0..map.height as i32 {
            for x in 0..map.width as i32 {
                if map.is_set(x, y) {
                    assert!(fat.is_set(x, y));
                }
            }
        }
    }

    #[test]
    fn sampling_outside_the_map_reads_empty() {
        let map = GlyphMap::render("42", 1);
        assert_eq!(map.sample(-10.0, -10.0), 0.0);
        assert_eq!(map.sample(map.width as f32 + 10.0, 1.0), 0.0);
    }

    #[test]
    fn composite_clips_at_canvas_edges() {
        // A map much wider than the canvas must not panic and must leave
        // the untouched rows transparent.
        let map = GlyphMap::render("100", 1);
        let mut canvas = Canvas::new(16, 16);
        canvas.composite_centered(&map, 4.0, Rgb::new(255, 0, 0));
        let bitmap = canvas.into_bitmap();
        assert_eq!(bitmap.width, 16);
        assert_eq!(bitmap.pixel(0, 0)[3], 0);
    }
}
