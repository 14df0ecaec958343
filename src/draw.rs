// Window + software drawing utilities.
// The window shows the current painting; overlays (crosshair, HUD text) are
// drawn straight into the window buffer after the painting is blitted.

use crate::error::Error;
use crate::types::{Colour, FrameBuffer, PixelBuffer};
use minifb::{Key, KeyRepeat, MouseButton, MouseMode, Window, WindowOptions};

const PALETTE_KEYS: [Key; 9] = [
    Key::Key1, Key::Key2, Key::Key3, Key::Key4, Key::Key5,
    Key::Key6, Key::Key7, Key::Key8, Key::Key9,
];

pub struct Drawer {
    window: Window,
}

impl Drawer {
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self, Error> {
        let mut window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        window.set_target_fps(60);
        Ok(Self { window })
    }

    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<(), Error> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    pub fn is_open(&self) -> bool {
        self.window.is_open()
    }

    pub fn esc_pressed(&self) -> bool {
        self.window.is_key_down(Key::Escape)
    }

    /// Mouse position in buffer pixels, clamped to the window.
    pub fn mouse_pos(&self) -> Option<(usize, usize)> {
        self.window
            .get_mouse_pos(MouseMode::Clamp)
            .map(|(x, y)| (x.max(0.0) as usize, y.max(0.0) as usize))
    }

    pub fn left_mouse_down(&self) -> bool {
        self.window.get_mouse_down(MouseButton::Left)
    }

    /// Index 0..9 of a digit key 1..9 pressed this frame.
    pub fn palette_key(&self) -> Option<usize> {
        PALETTE_KEYS
            .iter()
            .position(|&k| self.window.is_key_pressed(k, KeyRepeat::No))
    }

    pub fn r_pressed_once(&self) -> bool {
        self.window.is_key_pressed(Key::R, KeyRepeat::No)
    }
}

/* ---------- RGBA -> window ---------- */

/// Copy an RGBA painting into the window buffer, showing transparency as white.
pub fn blit(src: &PixelBuffer, fb: &mut FrameBuffer) -> Result<(), Error> {
    if src.width() != fb.width || src.height() != fb.height {
        return Err(Error::SizeMismatch(format!(
            "blit {}x{} into {}x{} window",
            src.width(),
            src.height(),
            fb.width,
            fb.height
        )));
    }
    for (i, out) in fb.pixels.iter_mut().enumerate() {
        let c = src.get_index(i);
        *out = if c.a == 255 {
            c.to_xrgb()
        } else {
            let a = c.a as u32;
            let over_white = |v: u8| ((v as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
            Colour::rgb(over_white(c.r), over_white(c.g), over_white(c.b)).to_xrgb()
        };
    }
    Ok(())
}

/* ---------- Primitives shared by the overlay and the line-art generator ---------- */

#[inline]
fn put_pixel(fb: &mut FrameBuffer, x: i32, y: i32, color: u32) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as usize, y as usize);
    if x >= fb.width || y >= fb.height {
        return;
    }
    fb.pixels[y * fb.width + x] = color;
}

/// Bresenham from (x0,y0) to (x1,y1); `plot` decides what a pixel means.
fn draw_line(x0: i32, y0: i32, x1: i32, y1: i32, mut plot: impl FnMut(i32, i32)) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        plot(x0, y0);
        if x0 == x1 && y0 == y1 { break; }
        let e2 = 2 * err;
        if e2 >= dy { err += dy; x0 += sx; }
        if e2 <= dx { err += dx; y0 += sy; }
    }
}

/// Midpoint circle outline.
fn draw_circle(cx: i32, cy: i32, r: i32, mut plot: impl FnMut(i32, i32)) {
    let (mut x, mut y, mut d) = (r, 0, 1 - r);
    while x >= y {
        for (px, py) in [(x, y), (y, x), (-y, x), (-x, y), (-x, -y), (-y, -x), (y, -x), (x, -y)] {
            plot(cx + px, cy + py);
        }
        y += 1;
        if d < 0 {
            d += 2 * y + 1;
        } else {
            x -= 1;
            d += 2 * (y - x) + 1;
        }
    }
}

/// A "+" with a small gap at the centre, following the pointer.
pub fn draw_crosshair(fb: &mut FrameBuffer, cx: i32, cy: i32, size: i32, color: u32) {
    draw_line(cx - size, cy, cx - 2, cy, |x, y| put_pixel(fb, x, y, color));
    draw_line(cx + 2, cy, cx + size, cy, |x, y| put_pixel(fb, x, y, color));
    draw_line(cx, cy - size, cx, cy - 2, |x, y| put_pixel(fb, x, y, color));
    draw_line(cx, cy + 2, cx, cy + size, |x, y| put_pixel(fb, x, y, color));
    put_pixel(fb, cx, cy, color);
}

/* ---------- Generated source: black outlines on white ---------- */

/// Colouring-book style picture so the app has something to fill without an image file.
pub fn line_art(width: usize, height: usize) -> PixelBuffer {
    let mut buf = PixelBuffer::filled(width, height, Colour::WHITE);
    let (w, h) = (width as i32, height as i32);
    let ink = Colour::BLACK;
    // 1px grey halo, like anti-aliased ink; it normalizes to white when matching
    let halo = Colour::rgb(200, 200, 200);

    let mut plot = |x: i32, y: i32, c: Colour| {
        if x >= 0 && y >= 0 && x < w && y < h {
            let (ux, uy) = (x as usize, y as usize);
            if c == ink || buf.get(ux, uy) == Colour::WHITE {
                buf.set(ux, uy, c);
            }
        }
    };
    let mut thick = |x: i32, y: i32| {
        for (dx, dy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            plot(x + dx, y + dy, ink);
        }
        plot(x - 1, y, halo);
        plot(x + 2, y + 1, halo);
    };

    let m = w.min(h);
    draw_line(0, h / 2, w - 1, h / 3, &mut thick);
    draw_line(w / 2, 0, w / 3, h - 1, &mut thick);
    draw_circle(w / 3, h / 3, m / 5, &mut thick);
    draw_circle(2 * w / 3, 2 * h / 3, m / 4, &mut thick);
    draw_circle(2 * w / 3, 2 * h / 3, m / 8, &mut thick);
    draw_circle(w / 5, 4 * h / 5, m / 10, &mut thick);
    buf
}

/* ---------- 5x7 bitmap font: just enough for "FILL | FPS: 59.9" / "IDLE" ---------- */

// Each row is 5 bits, bit 4 = leftmost column.
const GLYPHS: &[(char, [u8; 7])] = &[
    ('0', [0x0E, 0x11, 0x13, 0x15, 0x19, 0x11, 0x0E]),
    ('1', [0x04, 0x0C, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('2', [0x0E, 0x11, 0x01, 0x02, 0x04, 0x08, 0x1F]),
    ('3', [0x1E, 0x01, 0x01, 0x0E, 0x01, 0x01, 0x1E]),
    ('4', [0x02, 0x06, 0x0A, 0x12, 0x1F, 0x02, 0x02]),
    ('5', [0x1F, 0x10, 0x1E, 0x01, 0x01, 0x11, 0x0E]),
    ('6', [0x06, 0x08, 0x10, 0x1E, 0x11, 0x11, 0x0E]),
    ('7', [0x1F, 0x01, 0x02, 0x04, 0x08, 0x08, 0x08]),
    ('8', [0x0E, 0x11, 0x11, 0x0E, 0x11, 0x11, 0x0E]),
    ('9', [0x0E, 0x11, 0x11, 0x0F, 0x01, 0x02, 0x0C]),
    ('I', [0x0E, 0x04, 0x04, 0x04, 0x04, 0x04, 0x0E]),
    ('D', [0x1C, 0x12, 0x11, 0x11, 0x11, 0x12, 0x1C]),
    ('L', [0x10, 0x10, 0x10, 0x10, 0x10, 0x10, 0x1F]),
    ('E', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x1F]),
    ('F', [0x1F, 0x10, 0x10, 0x1E, 0x10, 0x10, 0x10]),
    ('P', [0x1E, 0x11, 0x11, 0x1E, 0x10, 0x10, 0x10]),
    ('S', [0x0F, 0x10, 0x10, 0x0E, 0x01, 0x01, 0x1E]),
    (' ', [0x00; 7]),
    ('|', [0x04; 7]),
    (':', [0x00, 0x04, 0x00, 0x00, 0x04, 0x00, 0x00]),
    ('.', [0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00]),
];

fn glyph5x7(ch: char) -> Option<&'static [u8; 7]> {
    GLYPHS.iter().find(|(c, _)| *c == ch).map(|(_, rows)| rows)
}

/// Draw one glyph with a 1px black drop shadow. Unknown characters are skipped.
fn draw_char_5x7(fb: &mut FrameBuffer, x: i32, y: i32, ch: char, color: u32) {
    let Some(rows) = glyph5x7(ch) else { return };
    for (offset, c) in [(1, 0x0000_0000), (0, color)] {
        for (ry, bits) in rows.iter().enumerate() {
            for rx in 0..5 {
                if bits & (1 << (4 - rx)) != 0 {
                    put_pixel(fb, x + rx + offset, y + ry as i32 + offset, c);
                }
            }
        }
    }
}

/// 5x7 glyphs with 1px spacing.
pub fn draw_text_5x7(fb: &mut FrameBuffer, mut x: i32, y: i32, text: &str, color: u32) {
    for ch in text.chars() {
        draw_char_5x7(fb, x, y, ch, color);
        x += 6;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blit_shows_transparency_as_white() {
        let mut src = PixelBuffer::new(2, 1);
        src.set(1, 0, Colour::rgb(0x12, 0x34, 0x56));
        let mut fb = FrameBuffer::new(2, 1);
        blit(&src, &mut fb).unwrap();
        assert_eq!(fb.pixels, vec![0x00FF_FFFF, 0x0012_3456]);
        assert!(blit(&src, &mut FrameBuffer::new(1, 1)).is_err());
    }

    #[test]
    fn circle_outline_is_symmetric() {
        let mut pts = Vec::new();
        draw_circle(0, 0, 5, |x, y| pts.push((x, y)));
        for &(x, y) in &pts {
            assert!(pts.contains(&(-x, y)) && pts.contains(&(x, -y)));
            let r2 = x * x + y * y;
            assert!((16..=36).contains(&r2), "({x}, {y})");
        }
    }

    #[test]
    fn line_art_has_ink_and_paper() {
        let art = line_art(120, 90);
        let bytes = art.as_bytes();
        assert!(bytes.chunks_exact(4).any(|p| p == [0, 0, 0, 255]));
        assert_eq!(art.get(0, 0), Colour::WHITE);
    }

    #[test]
    fn hud_text_draws_inside_bounds() {
        let mut fb = FrameBuffer::new(40, 10);
        draw_text_5x7(&mut fb, 1, 1, "FILL|?", 0x00FF_FFFF);
        assert!(fb.pixels.contains(&0x00FF_FFFF));
        draw_crosshair(&mut fb, 0, 0, 12, 0x00FF_CC33);
        assert_eq!(fb.pixels[0], 0x00FF_CC33);
    }
}
