// Click a region of an image, drag, and paint it with a multi-stop gradient.
//
// The raster core is `fill` (tolerance-aware scanline flood fill) and
// `gradient` (mask-limited linear gradients), tied together per gesture
// by `session`. `worker` runs that core on a background thread; the
// window, camera and generated artwork live in `draw` and `camera`.

pub mod camera;
pub mod colour;
pub mod config;
pub mod draw;
pub mod error;
pub mod fill;
pub mod geometry;
pub mod gradient;
pub mod logging;
pub mod session;
pub mod types;
pub mod worker;

pub use colour::{MatchConfig, parse_colour, parse_colours};
pub use error::Error;
pub use fill::{FillResult, flood_fill};
pub use geometry::DragGeometry;
pub use gradient::{Surface, render_gradient};
pub use session::{FillOptions, FillSession, Painter};
pub use types::{Colour, PixelBuffer, Point, Rect};
