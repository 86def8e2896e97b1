//! Placeholder rasterization.
//!
//! Two text renderers sit behind [`TextRenderer`]: a TrueType renderer used
//! when one of the configured fonts loads, and a built-in bitmap renderer
//! that needs no resources. The choice is made once, in
//! [`Rasterizer::from_config`].

use crate::glyphs::{glyph, lit, GLYPH_HEIGHT, GLYPH_WIDTH};
use ab_glyph::{point, Font, FontVec, Glyph, PxScale, ScaleFont};
use image::codecs::jpeg::JpegEncoder;
use image::{ColorType, Rgb, RgbImage};
use skuforge_core::{CatalogError, PlaceholderRequest, RenderConfig, Result, Swatch};
use std::fs;
use std::path::Path;

/// Share of the canvas width text may occupy before it is scaled down.
const MAX_TEXT_FRACTION: f32 = 0.9;

/// Draws a line of text centred on a canvas.
pub trait TextRenderer {
    fn name(&self) -> &'static str;
    fn draw_centered(&self, canvas: &mut RgbImage, text: &str, ink: Swatch);
}

// ============================================================================
// TrueType
// ============================================================================

pub struct FontRenderer {
    font: FontVec,
    size: f32,
}

impl FontRenderer {
    pub fn load(path: &Path, size: f32) -> Option<Self> {
        let bytes = fs::read(path).ok()?;
        let font = FontVec::try_from_vec(bytes).ok()?;
        Some(Self { font, size })
    }

    fn layout(&self, text: &str, scale: PxScale) -> (Vec<Glyph>, f32) {
        let scaled = self.font.as_scaled(scale);
        let mut glyphs = Vec::with_capacity(text.len());
        let mut caret = 0.0f32;
        let mut previous = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                caret += scaled.kern(prev, id);
            }
            glyphs.push(id.with_scale_and_position(scale, point(caret, scaled.ascent())));
            caret += scaled.h_advance(id);
            previous = Some(id);
        }
        (glyphs, caret)
    }
}

impl TextRenderer for FontRenderer {
    fn name(&self) -> &'static str {
        "truetype"
    }

    fn draw_centered(&self, canvas: &mut RgbImage, text: &str, ink: Swatch) {
        let max_width = canvas.width() as f32 * MAX_TEXT_FRACTION;
        let mut scale = PxScale::from(self.size);
        let (mut glyphs, mut width) = self.layout(text, scale);
        if width > max_width && width > 0.0 {
            scale = PxScale::from(self.size * max_width / width);
            (glyphs, width) = self.layout(text, scale);
        }
        let scaled = self.font.as_scaled(scale);
        let height = scaled.ascent() - scaled.descent();
        let left = (canvas.width() as f32 - width) / 2.0;
        let top = (canvas.height() as f32 - height) / 2.0;

        for g in glyphs {
            let Some(outlined) = self.font.outline_glyph(g) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|x, y, coverage| {
                let px = left + bounds.min.x + x as f32;
                let py = top + bounds.min.y + y as f32;
                blend(canvas, px as i64, py as i64, ink, coverage);
            });
        }
    }
}

// ============================================================================
// Built-in bitmap
// ============================================================================

/// 5x7 bitmap font scaled up to roughly the configured size.
pub struct BitmapRenderer {
    scale: u32,
}

impl BitmapRenderer {
    pub fn new(size: f32) -> Self {
        let scale = (size / GLYPH_HEIGHT as f32).round().max(1.0) as u32;
        Self { scale }
    }

    fn text_width(chars: u32, scale: u32) -> u32 {
        // One blank column between glyphs.
        (chars * (GLYPH_WIDTH + 1)).saturating_sub(1) * scale
    }
}

impl TextRenderer for BitmapRenderer {
    fn name(&self) -> &'static str {
        "bitmap"
    }

    fn draw_centered(&self, canvas: &mut RgbImage, text: &str, ink: Swatch) {
        let chars = text.chars().count() as u32;
        let max_width = (canvas.width() as f32 * MAX_TEXT_FRACTION) as u32;
        let mut scale = self.scale;
        while scale > 1 && Self::text_width(chars, scale) > max_width {
            scale -= 1;
        }
        let width = Self::text_width(chars, scale) as i64;
        let height = (GLYPH_HEIGHT * scale) as i64;
        let left = (canvas.width() as i64 - width) / 2;
        let top = (canvas.height() as i64 - height) / 2;

        for (i, c) in text.chars().enumerate() {
            let origin_x = left + (i as i64) * ((GLYPH_WIDTH + 1) * scale) as i64;
            for (row_idx, row) in glyph(c).iter().enumerate() {
                for col in 0..GLYPH_WIDTH {
                    if !lit(*row, col) {
                        continue;
                    }
                    let x0 = origin_x + (col * scale) as i64;
                    let y0 = top + (row_idx as u32 * scale) as i64;
                    for dy in 0..scale as i64 {
                        for dx in 0..scale as i64 {
                            blend(canvas, x0 + dx, y0 + dy, ink, 1.0);
                        }
                    }
                }
            }
        }
    }
}

fn blend(canvas: &mut RgbImage, x: i64, y: i64, ink: Swatch, coverage: f32) {
    if x < 0 || y < 0 || x >= canvas.width() as i64 || y >= canvas.height() as i64 {
        return;
    }
    let c = coverage.clamp(0.0, 1.0);
    let pixel = canvas.get_pixel_mut(x as u32, y as u32);
    for (channel, target) in pixel.0.iter_mut().zip(ink.0) {
        *channel = (*channel as f32 * (1.0 - c) + target as f32 * c).round() as u8;
    }
}

// ============================================================================
// Rasterizer
// ============================================================================

/// Fixed-size solid-background placeholder images with a centred label.
pub struct Rasterizer {
    width: u32,
    height: u32,
    jpeg_quality: u8,
    text: Box<dyn TextRenderer>,
}

impl Rasterizer {
    /// Use the first configured font that loads; otherwise the bitmap
    /// renderer.
    pub fn from_config(config: &RenderConfig) -> Self {
        let primary = config
            .font_candidates
            .iter()
            .find_map(|path| FontRenderer::load(path, config.font_size).map(|r| (path, r)));
        let text: Box<dyn TextRenderer> = match primary {
            Some((path, renderer)) => {
                tracing::debug!(font = %path.display(), "using truetype renderer");
                Box::new(renderer)
            }
            None => {
                tracing::warn!("no configured font could be loaded; using built-in bitmap renderer");
                Box::new(BitmapRenderer::new(config.font_size))
            }
        };
        Self::with_renderer(config, text)
    }

    pub fn with_renderer(config: &RenderConfig, text: Box<dyn TextRenderer>) -> Self {
        Self {
            width: config.width,
            height: config.height,
            jpeg_quality: config.jpeg_quality,
            text,
        }
    }

    pub fn renderer_name(&self) -> &'static str {
        self.text.name()
    }

    pub fn render(&self, request: &PlaceholderRequest) -> RgbImage {
        let mut canvas = RgbImage::from_pixel(self.width, self.height, Rgb(request.background.0));
        self.text
            .draw_centered(&mut canvas, &request.label, request.background.ink());
        canvas
    }

    pub fn encode_jpeg(&self, request: &PlaceholderRequest) -> Result<Vec<u8>> {
        let canvas = self.render(request);
        let mut bytes = Vec::new();
        JpegEncoder::new_with_quality(&mut bytes, self.jpeg_quality)
            .encode(canvas.as_raw(), canvas.width(), canvas.height(), ColorType::Rgb8)
            .map_err(|e| CatalogError::Render(format!("{}: {e}", request.slug)))?;
        Ok(bytes)
    }
}
