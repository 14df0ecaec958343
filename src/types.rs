// Core value types shared by the fill engine, the gradient compositor and the window.

use crate::error::Error;

/// Window-ready pixels. Each entry is 0x00RRGGBB for minifb.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl FrameBuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, pixels: vec![0u32; width * height] }
    }
}

/// One RGBA colour, 0..=255 per channel. Alpha is 255 unless given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Colour {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Colour {
    pub const BLACK: Colour = Colour::rgb(0, 0, 0);
    pub const WHITE: Colour = Colour::rgb(255, 255, 255);
    pub const TRANSPARENT: Colour = Colour::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Pack as 0x00RRGGBB, dropping alpha.
    #[inline]
    pub fn to_xrgb(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }
}

/// A pixel coordinate in buffer space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: usize,
    pub y: usize,
}

impl Point {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle. Integer-aligned for a fill's bounding box,
/// fractional once enlarged for gradient drawing.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Fixed-size RGBA raster, row-major, 4 bytes per pixel.
///
/// Coordinates outside `0..width` / `0..height` are a caller bug: the
/// accessors panic instead of clamping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// Fully transparent buffer.
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height, data: vec![0u8; width * height * 4] }
    }

    pub fn filled(width: usize, height: usize, colour: Colour) -> Self {
        let mut buf = Self::new(width, height);
        buf.clear(colour);
        buf
    }

    /// Wrap existing RGBA bytes; the length must be exactly `width*height*4`.
    pub fn from_rgba(width: usize, height: usize, data: Vec<u8>) -> Result<Self, Error> {
        let expected = width * height * 4;
        if data.len() != expected {
            return Err(Error::BufferLength { expected, actual: data.len() });
        }
        Ok(Self { width, height, data })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn same_size(&self, other: &PixelBuffer) -> bool {
        self.width == other.width && self.height == other.height
    }

    #[inline]
    pub fn contains(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height
    }

    /// Byte offset of pixel (x, y).
    #[inline]
    pub fn offset(&self, x: usize, y: usize) -> usize {
        assert!(
            self.contains(x, y),
            "pixel ({x}, {y}) outside {}x{} buffer",
            self.width,
            self.height
        );
        (y * self.width + x) * 4
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Colour {
        let o = self.offset(x, y);
        Colour::rgba(self.data[o], self.data[o + 1], self.data[o + 2], self.data[o + 3])
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, c: Colour) {
        let o = self.offset(x, y);
        self.data[o..o + 4].copy_from_slice(&[c.r, c.g, c.b, c.a]);
    }

    /// Read by linear pixel index (`y*width + x`).
    #[inline]
    pub fn get_index(&self, i: usize) -> Colour {
        let px = &self.data[i * 4..i * 4 + 4];
        Colour::rgba(px[0], px[1], px[2], px[3])
    }

    #[inline]
    pub fn set_index(&mut self, i: usize, c: Colour) {
        self.data[i * 4..i * 4 + 4].copy_from_slice(&[c.r, c.g, c.b, c.a]);
    }

    pub fn clear(&mut self, c: Colour) {
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&[c.r, c.g, c.b, c.a]);
        }
    }

    /// Overwrite every byte from another buffer of the same size.
    pub fn copy_from(&mut self, other: &PixelBuffer) -> Result<(), Error> {
        if !self.same_size(other) {
            return Err(Error::SizeMismatch(format!(
                "copy {}x{} into {}x{}",
                other.width, other.height, self.width, self.height
            )));
        }
        self.data.copy_from_slice(&other.data);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offset_is_row_major() {
        let buf = PixelBuffer::new(5, 3);
        assert_eq!(buf.offset(0, 0), 0);
        assert_eq!(buf.offset(4, 0), 16);
        assert_eq!(buf.offset(2, 1), (5 + 2) * 4);
    }

    #[test]
    fn set_then_get() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(1, 1, Colour::rgba(1, 2, 3, 4));
        assert_eq!(buf.get(1, 1), Colour::rgba(1, 2, 3, 4));
        assert_eq!(buf.get(0, 1), Colour::TRANSPARENT);
        assert_eq!(&buf.as_bytes()[12..16], &[1, 2, 3, 4]);
    }

    #[test]
    #[should_panic]
    fn out_of_range_is_not_clamped() {
        let mut buf = PixelBuffer::new(2, 2);
        buf.set(2, 0, Colour::BLACK);
    }

    #[test]
    fn from_rgba_checks_length() {
        assert_eq!(
            PixelBuffer::from_rgba(2, 2, vec![0; 15]),
            Err(Error::BufferLength { expected: 16, actual: 15 })
        );
        assert!(PixelBuffer::from_rgba(2, 2, vec![0; 16]).is_ok());
    }
}
