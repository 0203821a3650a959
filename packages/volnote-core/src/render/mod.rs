//! Volume-to-icon rendering.
//!
//! This module is the heart of volnote: a pure function from a
//! [`VolumeReading`] to a [`RenderedStatus`] containing the percentage, the
//! square RGBA icon and the notification strings. It holds no state, performs
//! no I/O, and produces bit-identical output for identical input.
//!
//! The icon is the percentage drawn as zero-padded digits, centered on a
//! transparent square canvas. The glyphs are laid down twice at the same
//! position, first a stroke (dilated) pass and then a fill pass, which gives
//! the heavier visual weight of a bold face. Rasterization happens at the
//! monospaced font's native resolution and is bilinearly upsampled onto the
//! canvas, so the edges come out anti-aliased.

mod canvas;

use serde::{Deserialize, Serialize};

use crate::error::RenderError;
use canvas::{Canvas, GlyphMap};

/// A snapshot of a stream's volume, as reported by the mixer.
///
/// `current <= maximum` is the backend's responsibility and is not
/// re-validated here; out-of-range values are absorbed by the percentage
/// clamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VolumeReading {
    /// Current level in backend steps.
    pub current: u32,
    /// Maximum level in backend steps. Zero is an error condition.
    pub maximum: u32,
}

/// An RGBA8 color used for the icon foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Creates a color from its components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parses a `#RRGGBB` hex string (leading `#` optional).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
        Some(Self { r, g, b })
    }
}

/// Cosmetic parameters of the rendered status.
///
/// Colors and sizing are configuration, not correctness: changing them never
/// affects the percentage math or the label format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusStyle {
    /// Notification title.
    pub title: String,
    /// Icon edge length in pixels (square canvas).
    pub edge: u32,
    /// Text height as a fraction of the icon edge.
    pub text_ratio: f32,
    /// Stroke width as a fraction of the icon edge.
    pub stroke_ratio: f32,
    /// Foreground color when the percentage is exactly zero.
    pub zero_color: Rgb,
    /// Foreground color for any non-zero percentage.
    pub level_color: Rgb,
}

impl Default for StatusStyle {
    fn default() -> Self {
        Self {
            title: "Media Volume".to_string(),
            edge: 128,
            text_ratio: 0.85,
            stroke_ratio: 0.1,
            zero_color: Rgb::new(135, 206, 235),
            level_color: Rgb::new(255, 182, 193),
        }
    }
}

/// A rendered square RGBA8 icon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconBitmap {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA8 pixel data, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
}

impl IconBitmap {
    /// Returns the RGBA components of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        assert!(x < self.width && y < self.height);
        let i = ((y * self.width + x) * 4) as usize;
        [
            self.rgba[i],
            self.rgba[i + 1],
            self.rgba[i + 2],
            self.rgba[i + 3],
        ]
    }
}

/// Everything the status sink needs to display one volume state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedStatus {
    /// Volume percentage, always in `0..=100`.
    pub percentage: u8,
    /// The rendered icon.
    pub icon: IconBitmap,
    /// Notification title (fixed per style).
    pub title: String,
    /// Notification body interpolating the percentage.
    pub body: String,
}

/// Computes the volume percentage for a reading.
///
/// Truncates toward zero rather than rounding (7/15 is 46, not 47); the
/// result is clamped to `0..=100` so a reading with `current > maximum`
/// still produces a displayable value.
///
/// # Errors
///
/// Returns [`RenderError::ZeroMaximum`] when `maximum` is zero.
pub fn percentage(reading: &VolumeReading) -> Result<u8, RenderError> {
    if reading.maximum == 0 {
        return Err(RenderError::ZeroMaximum);
    }
    let pct = ((reading.current as f32 / reading.maximum as f32) * 100.0) as i32;
    Ok(pct.clamp(0, 100) as u8)
}

/// Formats a percentage as the icon label: zero-padded to at least two
/// digits, so three-digit values intentionally render wider.
pub fn label(pct: u8) -> String {
    format!("{pct:02}")
}

/// Renders a reading into a complete [`RenderedStatus`].
///
/// Pure and stateless: no side effects, no hidden inputs.
///
/// # Errors
///
/// Returns [`RenderError::ZeroMaximum`] when the reading's maximum is zero.
pub fn render_status(
    reading: &VolumeReading,
    style: &StatusStyle,
) -> Result<RenderedStatus, RenderError> {
    let pct = percentage(reading)?;
    Ok(RenderedStatus {
        percentage: pct,
        icon: render_icon(pct, style),
        title: style.title.clone(),
        body: format!("Current volume: {pct}%"),
    })
}

/// Renders the icon for an already-computed percentage.
fn render_icon(pct: u8, style: &StatusStyle) -> IconBitmap {
    let edge = style.edge.max(16);
    let text = label(pct);

    let native_height = GlyphMap::glyph_height() as f32;
    let scale = (edge as f32 * style.text_ratio) / native_height;
    // Stroke radius expressed in native glyph pixels, at least one.
    let radius = ((edge as f32 * style.stroke_ratio / 2.0) / scale)
        .round()
        .max(1.0) as u32;

    let glyphs = GlyphMap::render(&text, radius);
    let stroke = glyphs.dilated(radius);

    let color = if pct == 0 {
        style.zero_color
    } else {
        style.level_color
    };

    let mut canvas = Canvas::new(edge, edge);
    // Two passes at the same placement: stroke first, fill on top. They
    // overlap exactly, simulating a heavier font weight.
    canvas.composite_centered(&stroke, scale, color);
    canvas.composite_centered(&glyphs, scale, color);
    canvas.into_bitmap()
}
