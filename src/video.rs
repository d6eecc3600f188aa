// src/video.rs - Webcam capture via nokhwa with mirrored RGB output
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
};
use nokhwa::Camera;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Fatal: the camera could not be acquired at startup.
    #[error("failed to open camera {index}: {source}")]
    Open {
        index: u32,
        source: nokhwa::NokhwaError,
    },
    /// Fatal: the stream could not be started.
    #[error("failed to start camera stream: {0}")]
    Stream(nokhwa::NokhwaError),
    /// Normal termination: the capture source stopped producing frames.
    #[error("camera stream ended: {0}")]
    StreamEnded(nokhwa::NokhwaError),
    #[error("failed to decode camera frame: {0}")]
    Decode(nokhwa::NokhwaError),
}

/// Camera frame source. Frames come out RGB8, mirrored horizontally so
/// on-screen motion matches the user's.
pub struct VideoSource {
    camera: Camera,
}

impl VideoSource {
    pub fn new_camera(index: u32) -> Result<Self, CaptureError> {
        let format = CameraFormat::new(Resolution::new(640, 480), FrameFormat::MJPEG, 30);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Exact(format));

        let camera = Camera::new(CameraIndex::Index(index), requested)
            .map_err(|source| CaptureError::Open { index, source })?;

        tracing::info!(
            camera = %camera.info().human_name(),
            "camera opened at 640x480 MJPEG"
        );
        Ok(Self { camera })
    }

    /// Blocking read of the next frame. A read failure after startup is
    /// treated by the caller as end of stream, not an error to retry.
    pub fn read_frame(&mut self) -> Result<RgbImage, CaptureError> {
        if !self.camera.is_stream_open() {
            self.camera.open_stream().map_err(CaptureError::Stream)?;
        }

        let frame = self.camera.frame().map_err(CaptureError::StreamEnded)?;
        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(CaptureError::Decode)?;

        Ok(image::imageops::flip_horizontal(&decoded))
    }

    pub fn resolution(&self) -> (u32, u32) {
        let r = self.camera.resolution();
        (r.width(), r.height())
    }
}

impl Drop for VideoSource {
    fn drop(&mut self) {
        let _ = self.camera.stop_stream();
    }
}
