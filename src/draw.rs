// filepath: src/draw.rs
//! Surface drawing utilities for lintel
//!
//! A `Surface` is a software-rendered pixel buffer the bar composes frames
//! into before presenting them through wl_shm. Fills and copies use SOURCE
//! semantics: color and alpha are written as-is rather than blended, so
//! opacity configured by the user survives unchanged to the compositor.
//!
//! Two backends are selected at build time by the `vector` cargo feature.
//! The default backend writes ARGB8888 pixels directly; the vector backend
//! keeps a tiny-skia pixmap bound 1:1 to the surface and routes fills and
//! copies through it. Both produce the same pixels for the operations below.
//! Text is rasterized straight into the pixel storage on either backend.

use crate::color::Color;
use crate::font::Font;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DrawError {
    #[error("cannot allocate a {0}x{1} surface")]
    BadDimensions(u32, u32),
}

/// An addressable drawable region plus its pixel storage.
///
/// Surfaces have a single owner and release their storage on drop.
pub struct Surface {
    width: u32,
    height: u32,
    #[cfg(feature = "vector")]
    pixmap: tiny_skia::Pixmap,
    #[cfg(not(feature = "vector"))]
    pixels: Vec<u8>,
}

impl Surface {
    /// Allocates a transparent surface of the given size.
    pub fn new(width: u32, height: u32) -> Result<Self, DrawError> {
        #[cfg(feature = "vector")]
        {
            let pixmap = tiny_skia::Pixmap::new(width, height)
                .ok_or(DrawError::BadDimensions(width, height))?;
            Ok(Self {
                width,
                height,
                pixmap,
            })
        }
        #[cfg(not(feature = "vector"))]
        {
            if width == 0 || height == 0 {
                return Err(DrawError::BadDimensions(width, height));
            }
            let len = width as usize * height as usize * 4;
            Ok(Self {
                width,
                height,
                pixels: vec![0; len],
            })
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocates the storage for a new size. Previous contents are lost.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), DrawError> {
        *self = Self::new(width, height)?;
        Ok(())
    }

    /// Clears the whole surface with the given color.
    pub fn clear(&mut self, color: Color) {
        #[cfg(feature = "vector")]
        self.pixmap.fill(to_skia_color(color));
        #[cfg(not(feature = "vector"))]
        {
            let bytes = encode(color);
            for pixel in self.pixels.chunks_exact_mut(4) {
                pixel.copy_from_slice(&bytes);
            }
        }
    }

    /// Draws a filled rectangle, clamped to the surface bounds.
    pub fn rectangle(&mut self, color: Color, x: i32, y: i32, width: u32, height: u32) {
        let Some((x0, y0, w, h)) = clamp_rect(self.width, self.height, x, y, width, height) else {
            return;
        };

        #[cfg(feature = "vector")]
        {
            let Some(rect) = tiny_skia::Rect::from_xywh(x0 as f32, y0 as f32, w as f32, h as f32)
            else {
                return;
            };
            let mut paint = tiny_skia::Paint::default();
            paint.set_color(to_skia_color(color));
            paint.blend_mode = tiny_skia::BlendMode::Source;
            paint.anti_alias = false;
            self.pixmap
                .fill_rect(rect, &paint, tiny_skia::Transform::identity(), None);
        }
        #[cfg(not(feature = "vector"))]
        {
            let bytes = encode(color);
            let stride = self.width as usize * 4;
            let row_len = w as usize * 4;
            for row in y0..y0 + h {
                let start = row as usize * stride + x0 as usize * 4;
                for pixel in self.pixels[start..start + row_len].chunks_exact_mut(4) {
                    pixel.copy_from_slice(&bytes);
                }
            }
        }
    }

    /// Copies a region of another surface onto this one. The region is
    /// clamped against both surfaces and never wraps.
    pub fn copy_from(
        &mut self,
        src: &Surface,
        src_x: i32,
        src_y: i32,
        dest_x: i32,
        dest_y: i32,
        width: u32,
        height: u32,
    ) {
        let Some((sx, sy, w, h)) = clamp_rect(src.width, src.height, src_x, src_y, width, height)
        else {
            return;
        };
        // Keep source and destination aligned when clamping moved an origin.
        let dest_x = dest_x + (sx as i32 - src_x);
        let dest_y = dest_y + (sy as i32 - src_y);
        let Some((dx, dy, w, h)) = clamp_rect(self.width, self.height, dest_x, dest_y, w, h) else {
            return;
        };
        let sx = sx + (dx as i32 - dest_x) as u32;
        let sy = sy + (dy as i32 - dest_y) as u32;

        #[cfg(feature = "vector")]
        {
            let Some(rect) = tiny_skia::IntRect::from_xywh(sx as i32, sy as i32, w, h) else {
                return;
            };
            let Some(region) = src.pixmap.as_ref().clone_rect(rect) else {
                return;
            };
            let paint = tiny_skia::PixmapPaint {
                blend_mode: tiny_skia::BlendMode::Source,
                ..tiny_skia::PixmapPaint::default()
            };
            self.pixmap.draw_pixmap(
                dx as i32,
                dy as i32,
                region.as_ref(),
                &paint,
                tiny_skia::Transform::identity(),
                None,
            );
        }
        #[cfg(not(feature = "vector"))]
        {
            let src_stride = src.width as usize * 4;
            let dest_stride = self.width as usize * 4;
            let row_len = w as usize * 4;
            for row in 0..h as usize {
                let s = (sy as usize + row) * src_stride + sx as usize * 4;
                let d = (dy as usize + row) * dest_stride + dx as usize * 4;
                self.pixels[d..d + row_len].copy_from_slice(&src.pixels[s..s + row_len]);
            }
        }
    }

    /// Draws one line of text with the baseline placed `ascent` pixels below
    /// `y`. Glyph coverage interpolates from `bg` to `fg`; pixels past
    /// `x + max_width` and outside the surface are clipped.
    pub fn text(
        &mut self,
        font: &Font,
        text: &str,
        fg: Color,
        bg: Color,
        x: i32,
        y: i32,
        max_width: u32,
    ) {
        let clip_right = (x as i64 + max_width as i64).min(self.width as i64);
        let baseline = y + font.ascent();
        let mut pen_x = x as f32;

        for c in text.chars() {
            if pen_x.round() as i64 >= clip_right {
                break;
            }
            let (metrics, coverage) = font.rasterize(c);
            let glyph_x = pen_x.round() as i32 + metrics.xmin;
            let glyph_y = baseline - metrics.ymin - metrics.height as i32;
            self.blit_glyph(
                &coverage,
                metrics.width,
                glyph_x,
                glyph_y,
                fg,
                bg,
                clip_right,
            );
            pen_x += metrics.advance_width;
        }
    }

    fn blit_glyph(
        &mut self,
        coverage: &[u8],
        glyph_width: usize,
        x: i32,
        y: i32,
        fg: Color,
        bg: Color,
        clip_right: i64,
    ) {
        if glyph_width == 0 {
            return;
        }
        let rows = coverage.len() / glyph_width;
        let stride = self.width as usize * 4;
        let surface_w = self.width as i64;
        let surface_h = self.height as i64;
        let data = self.data_mut();

        for row in 0..rows {
            let py = y as i64 + row as i64;
            if py < 0 || py >= surface_h {
                continue;
            }
            for col in 0..glyph_width {
                let px = x as i64 + col as i64;
                if px < 0 || px >= surface_w || px >= clip_right {
                    continue;
                }
                let cov = coverage[row * glyph_width + col];
                if cov == 0 {
                    continue;
                }
                let bytes = encode(mix(bg, fg, cov));
                let idx = py as usize * stride + px as usize * 4;
                data[idx..idx + 4].copy_from_slice(&bytes);
            }
        }
    }

    /// Encodes the surface into a wl_shm Argb8888 canvas.
    pub fn write_argb8888(&self, canvas: &mut [u8]) {
        #[cfg(feature = "vector")]
        {
            for (out, px) in canvas
                .chunks_exact_mut(4)
                .zip(self.pixmap.data().chunks_exact(4))
            {
                out.copy_from_slice(&[px[2], px[1], px[0], px[3]]);
            }
        }
        #[cfg(not(feature = "vector"))]
        {
            let len = self.pixels.len().min(canvas.len());
            canvas[..len].copy_from_slice(&self.pixels[..len]);
        }
    }

    /// Reads back one pixel as premultiplied 8-bit channels (r, g, b, a).
    pub fn pixel_at(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.data()[idx..idx + 4];
        #[cfg(feature = "vector")]
        {
            Some((px[0], px[1], px[2], px[3]))
        }
        #[cfg(not(feature = "vector"))]
        {
            Some((px[2], px[1], px[0], px[3]))
        }
    }

    fn data(&self) -> &[u8] {
        #[cfg(feature = "vector")]
        {
            self.pixmap.data()
        }
        #[cfg(not(feature = "vector"))]
        {
            &self.pixels
        }
    }

    fn data_mut(&mut self) -> &mut [u8] {
        #[cfg(feature = "vector")]
        {
            self.pixmap.data_mut()
        }
        #[cfg(not(feature = "vector"))]
        {
            &mut self.pixels
        }
    }
}

/// Packs a color in the active backend's byte order: tiny-skia stores
/// premultiplied RGBA, the direct backend little-endian ARGB (BGRA bytes).
fn encode(color: Color) -> [u8; 4] {
    let [b, g, r, a] = color.pixel.to_le_bytes();
    #[cfg(feature = "vector")]
    {
        [r, g, b, a]
    }
    #[cfg(not(feature = "vector"))]
    {
        [b, g, r, a]
    }
}

/// Interpolates between two colors by 8-bit glyph coverage.
fn mix(bg: Color, fg: Color, coverage: u8) -> Color {
    let t = coverage as f64 / 255.0;
    Color::new(
        bg.red + (fg.red - bg.red) * t,
        bg.green + (fg.green - bg.green) * t,
        bg.blue + (fg.blue - bg.blue) * t,
        bg.alpha + (fg.alpha - bg.alpha) * t,
    )
}

#[cfg(feature = "vector")]
fn to_skia_color(color: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba(
        color.red as f32,
        color.green as f32,
        color.blue as f32,
        color.alpha as f32,
    )
    .unwrap_or(tiny_skia::Color::TRANSPARENT)
}

/// Clamps a rectangle to a surface, returning the visible part or `None`.
fn clamp_rect(
    surface_w: u32,
    surface_h: u32,
    x: i32,
    y: i32,
    width: u32,
    height: u32,
) -> Option<(u32, u32, u32, u32)> {
    let x0 = x.max(0) as i64;
    let y0 = y.max(0) as i64;
    let x1 = (x as i64 + width as i64).min(surface_w as i64);
    let y1 = (y as i64 + height as i64).min(surface_h as i64);
    if x1 <= x0 || y1 <= y0 {
        return None;
    }
    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(hex: &str) -> Color {
        Color::from_hex(hex).unwrap()
    }

    fn pixels(surface: &Surface) -> Vec<(u8, u8, u8, u8)> {
        let mut out = Vec::new();
        for y in 0..surface.height() {
            for x in 0..surface.width() {
                out.push(surface.pixel_at(x, y).unwrap());
            }
        }
        out
    }

    #[test]
    fn zero_dimensions_are_rejected() {
        assert!(Surface::new(0, 10).is_err());
        assert!(Surface::new(10, 0).is_err());
    }

    #[test]
    fn new_surface_is_transparent() {
        let surface = Surface::new(3, 3).unwrap();
        assert_eq!(surface.pixel_at(1, 1), Some((0, 0, 0, 0)));
    }

    #[test]
    fn clear_fills_every_pixel() {
        let mut surface = Surface::new(4, 3).unwrap();
        surface.clear(color("#ff0000"));
        for px in pixels(&surface) {
            assert_eq!(px, (255, 0, 0, 255));
        }
    }

    #[test]
    fn rectangle_fills_the_requested_region_only() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.rectangle(color("#00ff00"), 1, 1, 2, 2);
        assert_eq!(surface.pixel_at(1, 1), Some((0, 255, 0, 255)));
        assert_eq!(surface.pixel_at(2, 2), Some((0, 255, 0, 255)));
        assert_eq!(surface.pixel_at(0, 0), Some((0, 0, 0, 0)));
        assert_eq!(surface.pixel_at(3, 3), Some((0, 0, 0, 0)));
    }

    #[test]
    fn rectangle_is_clamped_to_bounds() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.rectangle(color("#0000ff"), -2, -2, 4, 4);
        assert_eq!(surface.pixel_at(0, 0), Some((0, 0, 255, 255)));
        assert_eq!(surface.pixel_at(1, 1), Some((0, 0, 255, 255)));
        assert_eq!(surface.pixel_at(2, 2), Some((0, 0, 0, 0)));
    }

    #[test]
    fn offscreen_rectangle_is_a_noop() {
        let mut surface = Surface::new(4, 4).unwrap();
        surface.rectangle(color("#ffffff"), 10, 10, 2, 2);
        surface.rectangle(color("#ffffff"), 0, 0, 0, 5);
        for px in pixels(&surface) {
            assert_eq!(px, (0, 0, 0, 0));
        }
    }

    #[test]
    fn rectangle_writes_alpha_without_blending() {
        let mut surface = Surface::new(2, 2).unwrap();
        surface.clear(color("#ffffff"));
        // SOURCE semantics: the translucent fill replaces the opaque white.
        surface.rectangle(color("#00000080"), 0, 0, 2, 2);
        let (_, _, _, a) = surface.pixel_at(0, 0).unwrap();
        assert_eq!(a, 0x80);
    }

    #[test]
    fn copy_matches_source_region() {
        let mut src = Surface::new(8, 8).unwrap();
        src.clear(color("#112233"));
        src.rectangle(color("#ffffff"), 2, 2, 2, 2);

        let mut dest = Surface::new(8, 8).unwrap();
        dest.copy_from(&src, 2, 2, 5, 5, 2, 2);
        assert_eq!(dest.pixel_at(5, 5), Some((255, 255, 255, 255)));
        assert_eq!(dest.pixel_at(6, 6), Some((255, 255, 255, 255)));
        assert_eq!(dest.pixel_at(4, 4), Some((0, 0, 0, 0)));
        assert_eq!(dest.pixel_at(7, 7), Some((0, 0, 0, 0)));
    }

    #[test]
    fn copy_clamps_against_both_surfaces() {
        let mut src = Surface::new(4, 4).unwrap();
        src.clear(color("#ff0000"));

        let mut dest = Surface::new(4, 4).unwrap();
        dest.copy_from(&src, 2, 2, 3, 3, 4, 4);
        assert_eq!(dest.pixel_at(3, 3), Some((255, 0, 0, 255)));
        assert_eq!(dest.pixel_at(2, 3), Some((0, 0, 0, 0)));
        assert_eq!(dest.pixel_at(3, 2), Some((0, 0, 0, 0)));
    }

    #[test]
    fn copy_with_negative_origin_stays_aligned() {
        let mut src = Surface::new(4, 4).unwrap();
        src.rectangle(color("#00ff00"), 0, 0, 1, 1);

        let mut dest = Surface::new(4, 4).unwrap();
        dest.copy_from(&src, -1, -1, -1, -1, 3, 3);
        // Source pixel (0, 0) must land on destination pixel (0, 0).
        assert_eq!(dest.pixel_at(0, 0), Some((0, 255, 0, 255)));
        assert_eq!(dest.pixel_at(1, 1), Some((0, 0, 0, 0)));
    }

    #[test]
    fn copy_then_clear_equals_single_clear() {
        let bg = color("#3fbc59");

        let mut src = Surface::new(8, 8).unwrap();
        src.clear(color("#ffffff"));
        src.rectangle(color("#123456"), 1, 1, 5, 5);

        let mut copied = Surface::new(8, 8).unwrap();
        copied.copy_from(&src, 0, 0, 0, 0, 8, 8);
        copied.clear(bg);

        let mut cleared = Surface::new(8, 8).unwrap();
        cleared.clear(bg);

        assert_eq!(pixels(&copied), pixels(&cleared));
    }

    #[test]
    fn glyphs_are_clipped_at_the_text_limit() {
        let mut surface = Surface::new(4, 4).unwrap();
        // 3x3 solid glyph at x=2 with the clip boundary at x=3: only
        // column 2 may land.
        let coverage = [255u8; 9];
        surface.blit_glyph(&coverage, 3, 2, 0, color("#ffffff"), color("#000000"), 3);
        assert_eq!(surface.pixel_at(2, 0), Some((255, 255, 255, 255)));
        assert_eq!(surface.pixel_at(2, 2), Some((255, 255, 255, 255)));
        assert_eq!(surface.pixel_at(1, 0), Some((0, 0, 0, 0)));
        assert_eq!(surface.pixel_at(3, 0), Some((0, 0, 0, 0)));
    }

    #[test]
    fn glyphs_are_clipped_at_surface_bounds() {
        let mut surface = Surface::new(4, 4).unwrap();
        let coverage = [255u8; 9];

        // Hanging off the top-left corner: only the overlap is written.
        surface.blit_glyph(&coverage, 3, -1, -1, color("#ffffff"), color("#000000"), 4);
        assert_eq!(surface.pixel_at(0, 0), Some((255, 255, 255, 255)));
        assert_eq!(surface.pixel_at(1, 1), Some((255, 255, 255, 255)));
        assert_eq!(surface.pixel_at(2, 2), Some((0, 0, 0, 0)));

        // Hanging off the bottom-right corner: no out-of-range writes.
        surface.blit_glyph(&coverage, 3, 3, 3, color("#ffffff"), color("#000000"), 4);
        assert_eq!(surface.pixel_at(3, 3), Some((255, 255, 255, 255)));
        assert_eq!(surface.pixel_at(2, 3), Some((0, 0, 0, 0)));
    }

    #[test]
    fn zero_coverage_leaves_pixels_untouched() {
        let mut surface = Surface::new(3, 1).unwrap();
        surface.clear(color("#ff0000"));
        surface.blit_glyph(&[0, 255, 0], 3, 0, 0, color("#ffffff"), color("#000000"), 3);
        assert_eq!(surface.pixel_at(0, 0), Some((255, 0, 0, 255)));
        assert_eq!(surface.pixel_at(1, 0), Some((255, 255, 255, 255)));
        assert_eq!(surface.pixel_at(2, 0), Some((255, 0, 0, 255)));
    }

    #[test]
    fn glyph_coverage_interpolates_between_colors() {
        let mut surface = Surface::new(1, 1).unwrap();
        surface.blit_glyph(&[128], 1, 0, 0, color("#ffffff"), color("#000000"), 1);
        assert_eq!(surface.pixel_at(0, 0), Some((128, 128, 128, 255)));
    }

    #[test]
    fn empty_glyph_is_a_noop() {
        let mut surface = Surface::new(2, 2).unwrap();
        surface.blit_glyph(&[], 0, 0, 0, color("#ffffff"), color("#000000"), 2);
        for px in pixels(&surface) {
            assert_eq!(px, (0, 0, 0, 0));
        }
    }

    #[test]
    fn resize_reallocates_storage() {
        let mut surface = Surface::new(2, 2).unwrap();
        surface.clear(color("#ffffff"));
        surface.resize(5, 3).unwrap();
        assert_eq!(surface.width(), 5);
        assert_eq!(surface.height(), 3);
        assert_eq!(surface.pixel_at(4, 2), Some((0, 0, 0, 0)));
    }

    #[test]
    fn write_argb8888_encodes_little_endian_argb() {
        let mut surface = Surface::new(1, 1).unwrap();
        surface.clear(color("#ff8000"));
        let mut canvas = [0u8; 4];
        surface.write_argb8888(&mut canvas);
        assert_eq!(canvas, [0x00, 0x80, 0xff, 0xff]);
    }
}
