// Tolerance-aware scanline flood fill.
//
// The fill runs in two phases. A first pass over the whole read buffer marks
// every pixel that does *not* match the seed colour as already visited, so
// they can never be filled. The span phase then only has to look at the
// visited mask: pop a point, grow it left and right into a horizontal run,
// paint the run, and queue the unvisited pixels directly above and below.
//
// The read buffer is never touched, so a frozen snapshot can be read while a
// separate (usually transparent) layer receives the fill.

use crate::colour::MatchConfig;
use crate::error::Error;
use crate::types::{Colour, PixelBuffer, Point, Rect};

/// Outcome of one fill.
#[derive(Clone, Debug, PartialEq)]
pub struct FillResult {
    /// Tight box around every filled pixel, `width = maxX - minX`.
    pub bounds: Rect,
    /// Number of pixels written.
    pub filled: usize,
    /// One byte per pixel; nonzero for filled and for excluded pixels alike.
    pub visited: Vec<u8>,
}

/// Fill the region connected to `seed` in `read`, writing `colour` into `write`.
///
/// `on_filled` runs once per filled pixel, synchronously, in fill order.
/// Every check happens before the first write, so an error leaves `write`
/// untouched.
pub fn flood_fill(
    read: &PixelBuffer,
    write: &mut PixelBuffer,
    seed: Point,
    colour: Colour,
    config: &MatchConfig,
    mut on_filled: Option<&mut dyn FnMut(usize, usize)>,
) -> Result<FillResult, Error> {
    let (width, height) = (read.width(), read.height());
    if !read.contains(seed.x, seed.y) {
        return Err(Error::OutOfBoundsSeed { x: seed.x, y: seed.y, width, height });
    }
    if !read.same_size(write) {
        return Err(Error::SizeMismatch(format!(
            "fill reads {width}x{height} but writes {}x{}",
            write.width(),
            write.height()
        )));
    }

    // Phase 1: exclude everything that does not look like the seed.
    let reference = config.normalize(read.get(seed.x, seed.y));
    let mut visited: Vec<u8> = (0..width * height)
        .map(|i| u8::from(!config.matches_normalized(read.get_index(i), reference)))
        .collect();

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (seed.x, seed.x, seed.y, seed.y);
    let mut filled = 0usize;

    // Phase 2: span scan from the seed.
    let mut stack: Vec<(usize, usize)> = Vec::with_capacity(width.max(height));
    visited[seed.y * width + seed.x] = 1;
    stack.push((seed.x, seed.y));

    while let Some((cx, cy)) = stack.pop() {
        let row = cy * width;

        let mut x1 = cx;
        while x1 > 0 && visited[row + x1 - 1] == 0 {
            x1 -= 1;
        }
        let mut x2 = cx;
        while x2 + 1 < width && visited[row + x2 + 1] == 0 {
            x2 += 1;
        }

        for x in x1..=x2 {
            visited[row + x] = 1;
            write.set_index(row + x, colour);
            if let Some(cb) = on_filled.as_mut() {
                cb(x, cy);
            }
        }
        filled += x2 - x1 + 1;
        min_x = min_x.min(x1);
        max_x = max_x.max(x2);
        min_y = min_y.min(cy);
        max_y = max_y.max(cy);

        // Queue neighbours above and below the run.
        let neighbours = [cy.checked_sub(1), Some(cy + 1).filter(|&y| y < height)];
        for ny in neighbours.into_iter().flatten() {
            let nrow = ny * width;
            for x in x1..=x2 {
                if visited[nrow + x] == 0 {
                    visited[nrow + x] = 1;
                    stack.push((x, ny));
                }
            }
        }
    }

    let bounds = Rect::new(
        min_x as f64,
        min_y as f64,
        (max_x - min_x) as f64,
        (max_y - min_y) as f64,
    );
    log::debug!("flood fill from ({}, {}): {filled} px, bounds {bounds:?}", seed.x, seed.y);

    Ok(FillResult { bounds, filled, visited })
}
