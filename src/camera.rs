// Optional image source: open a webcam and freeze one frame as the fill source.

use crate::error::Error;
use crate::types::PixelBuffer;

use image::DynamicImage;
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

// Frames to throw away while auto-exposure settles.
const WARMUP_FRAMES: usize = 10;

pub struct CameraCapture {
    cam: Camera,
}

impl CameraCapture {
    /// Open camera `index`, asking for the format closest to `width`x`height`.
    pub fn new(index: u32, width: u32, height: u32) -> Result<Self, Error> {
        let fmt = CameraFormat::new(Resolution::new(width, height), FrameFormat::YUYV, 30);
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        let mut cam = Camera::new(CameraIndex::Index(index), req)
            .map_err(|e| Error::CameraInit(format!("Create camera: {e}")))?;
        cam.open_stream()
            .map_err(|e| Error::CameraInit(format!("Open stream: {e}")))?;

        let actual = cam.resolution();
        log::info!("camera {index} streaming at {}x{}", actual.width(), actual.height());
        Ok(Self { cam })
    }

    /// Grab one decoded frame as RGBA.
    pub fn snapshot(&mut self) -> Result<PixelBuffer, Error> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("Fetch frame: {e}")))?;
        let rgb = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("Decode RGB: {e}")))?;

        let rgba = DynamicImage::ImageRgb8(rgb).to_rgba8();
        let (w, h) = rgba.dimensions();
        PixelBuffer::from_rgba(w as usize, h as usize, rgba.into_raw())
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            log::warn!("closing camera stream: {e}");
        }
    }
}

/// Open the camera, let it settle, and keep a single frame.
pub fn capture_still(index: u32, width: u32, height: u32) -> Result<PixelBuffer, Error> {
    let mut cam = CameraCapture::new(index, width, height)?;
    for _ in 0..WARMUP_FRAMES {
        cam.snapshot()?;
    }
    cam.snapshot()
}
