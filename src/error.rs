// One error type for the whole crate.
// Every variant states *where* things went wrong; the first four are the
// validation failures a gesture can hit before any pixel is written.
use std::fmt::{self, Display};

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    OutOfBoundsSeed { x: usize, y: usize, width: usize, height: usize },
    InsufficientColours(usize),   // a gradient needs at least two stops
    UnparseableColour(String),    // the offending colour string
    MissingSurfaceContext,        // destination surface has no drawable pixels
    SizeMismatch(String),         // two buffers that must agree on size do not
    BufferLength { expected: usize, actual: usize },
    ImageLoad(String),            // decoding the source image failed
    Config(String),               // bad command-line flag or value
    WindowInit(String),           // Creating the window failed
    WindowUpdate(String),         // Updating the window buffer failed
    CameraInit(String),           // Opening/starting the camera failed
    CameraFrame(String),          // Grabbing/decoding a frame failed
    WorkerSpawn(String),          // starting the painter thread failed
    WorkerGone,                   // background painter thread hung up
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::OutOfBoundsSeed { x, y, width, height } => write!(
                f,
                "Seed ({x}, {y}) is out of bounds for a {width}x{height} buffer"
            ),
            Error::InsufficientColours(n) => {
                write!(f, "At least two colours are required for a gradient, got {n}")
            }
            Error::UnparseableColour(s) => write!(f, "Unparseable colour: {s:?}"),
            Error::MissingSurfaceContext => write!(f, "Surface has no drawable context"),
            Error::SizeMismatch(s) => write!(f, "Size mismatch: {s}"),
            Error::BufferLength { expected, actual } => {
                write!(f, "Pixel data has {actual} bytes, expected {expected}")
            }
            Error::ImageLoad(s) => write!(f, "Image load error: {s}"),
            Error::Config(s) => write!(f, "Config error: {s}"),
            Error::WindowInit(s) => write!(f, "Window init error: {s}"),
            Error::WindowUpdate(s) => write!(f, "Window update error: {s}"),
            Error::CameraInit(s) => write!(f, "Camera init error: {s}"),
            Error::CameraFrame(s) => write!(f, "Camera frame error: {s}"),
            Error::WorkerSpawn(s) => write!(f, "Paint worker spawn error: {s}"),
            Error::WorkerGone => write!(f, "Paint worker stopped unexpectedly"),
        }
    }
}

impl std::error::Error for Error {}

impl From<image::ImageError> for Error {
    fn from(e: image::ImageError) -> Self {
        Error::ImageLoad(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_failure_keeps_the_cause() {
        let e = Error::WorkerSpawn("could not start paint worker: out of threads".into());
        assert_eq!(e.to_string(), "Paint worker spawn error: could not start paint worker: out of threads");
    }
}
