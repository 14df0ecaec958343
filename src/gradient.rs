// Multi-stop linear gradients composited onto an existing layer.
//
// The gradient only lands on pixels that are already non-transparent on the
// destination ("source-in"), so painting a box larger than the filled region
// still colours exactly the filled pixels.

use crate::error::Error;
use crate::types::{Colour, PixelBuffer, Rect};

/// A destination that may or may not be able to hand out its pixels right now.
pub trait Surface {
    fn context(&mut self) -> Option<&mut PixelBuffer>;
}

impl Surface for PixelBuffer {
    fn context(&mut self) -> Option<&mut PixelBuffer> {
        Some(self)
    }
}

/// Colours evenly spread over `[0, 1]`: stop `i` of `n` sits at `i/(n-1)`.
#[derive(Clone, Debug, PartialEq)]
pub struct GradientStops {
    colours: Vec<Colour>,
}

impl GradientStops {
    pub fn new(colours: &[Colour]) -> Result<Self, Error> {
        if colours.len() < 2 {
            return Err(Error::InsufficientColours(colours.len()));
        }
        Ok(Self { colours: colours.to_vec() })
    }

    pub fn positions(&self) -> impl Iterator<Item = (f64, Colour)> + '_ {
        let last = (self.colours.len() - 1) as f64;
        self.colours.iter().enumerate().map(move |(i, &c)| (i as f64 / last, c))
    }

    /// Colour at `t`, padded outside `[0, 1]`.
    pub fn sample(&self, t: f64) -> Colour {
        let segments = self.colours.len() - 1;
        let scaled = t.clamp(0.0, 1.0) * segments as f64;
        let i = (scaled.floor() as usize).min(segments - 1);
        lerp(self.colours[i], self.colours[i + 1], scaled - i as f64)
    }
}

#[inline]
fn lerp(a: Colour, b: Colour, f: f64) -> Colour {
    let ch = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * f).round() as u8;
    Colour::rgba(ch(a.r, b.r), ch(a.g, b.g), ch(a.b, b.b), ch(a.a, b.a))
}

/// Start and end of the gradient line for `angle_deg` across `rect`.
pub fn gradient_line(angle_deg: f64, rect: Rect) -> ((f64, f64), (f64, f64)) {
    let (sin, cos) = angle_deg.to_radians().sin_cos();
    let dx = (rect.width / 2.0) * cos;
    let dy = (rect.height / 2.0) * sin;
    let (cx, cy) = rect.center();
    ((cx - dx, cy - dy), (cx + dx, cy + dy))
}

/// Paint a linear gradient over `rect`, only onto non-transparent pixels.
///
/// Covers columns `floor(x) ..= ceil(x + width)` (and likewise for rows),
/// clipped to the surface, so the max column of a `maxX - minX` bounding box
/// is included. Returns the number of pixels written.
pub fn render_gradient<S: Surface + ?Sized>(
    surface: &mut S,
    colours: &[Colour],
    angle_deg: f64,
    rect: Rect,
) -> Result<usize, Error> {
    let stops = GradientStops::new(colours)?;
    let buf = surface.context().ok_or(Error::MissingSurfaceContext)?;
    if buf.is_empty() {
        return Ok(0);
    }

    let ((x0, y0), (x1, y1)) = gradient_line(angle_deg, rect);
    let (vx, vy) = (x1 - x0, y1 - y0);
    let len2 = vx * vx + vy * vy;

    let Some((col_start, col_end)) = span(rect.x, rect.width, buf.width()) else {
        return Ok(0);
    };
    let Some((row_start, row_end)) = span(rect.y, rect.height, buf.height()) else {
        return Ok(0);
    };

    let width = buf.width();
    let mut written = 0;
    for y in row_start..=row_end {
        let py = y as f64 + 0.5;
        for x in col_start..=col_end {
            let i = y * width + x;
            let dst = buf.get_index(i);
            if dst.a == 0 {
                continue;
            }
            let px = x as f64 + 0.5;
            // degenerate line: the first stop wins
            let t = if len2 < 1e-12 { 0.0 } else { ((px - x0) * vx + (py - y0) * vy) / len2 };
            let c = stops.sample(t);
            let a = ((c.a as u32 * dst.a as u32 + 127) / 255) as u8;
            buf.set_index(i, Colour::rgba(c.r, c.g, c.b, a));
            written += 1;
        }
    }
    Ok(written)
}

/// Pixel indices `floor(start) ..= ceil(start + len)` clipped to `0..limit`.
fn span(start: f64, len: f64, limit: usize) -> Option<(usize, usize)> {
    let lo = start.floor().max(0.0);
    let hi = (start + len).ceil().min(limit as f64 - 1.0);
    if hi < lo || !lo.is_finite() || !hi.is_finite() {
        return None;
    }
    Some((lo as usize, hi as usize))
}

/// Straight-alpha "source-over": draw `src` on top of `dst`.
pub fn composite_over(dst: &mut PixelBuffer, src: &PixelBuffer) -> Result<(), Error> {
    if !dst.same_size(src) {
        return Err(Error::SizeMismatch(format!(
            "composite {}x{} over {}x{}",
            src.width(),
            src.height(),
            dst.width(),
            dst.height()
        )));
    }
    for i in 0..src.len() {
        let s = src.get_index(i);
        match s.a {
            0 => continue,
            255 => dst.set_index(i, s),
            _ => {
                let d = dst.get_index(i);
                let sa = s.a as f32 / 255.0;
                let da = d.a as f32 / 255.0 * (1.0 - sa);
                let out_a = sa + da;
                let mix = |sc: u8, dc: u8| ((sc as f32 * sa + dc as f32 * da) / out_a).round() as u8;
                let a = (out_a * 255.0).round() as u8;
                dst.set_index(i, Colour::rgba(mix(s.r, d.r), mix(s.g, d.g), mix(s.b, d.b), a));
            }
        }
    }
    Ok(())
}
