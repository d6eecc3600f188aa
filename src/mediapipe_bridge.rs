// src/mediapipe_bridge.rs - Stub bridge to the external hand landmark model
use anyhow::Result;
use image::RgbImage;

use crate::tracking::{DetectedHand, HandLandmarkProvider};

const MODEL_FILENAME: &str = "hand_landmarker.task";

/// Bridge to the side-loaded MediaPipe Hands runtime. The model bundle is
/// not shipped with the repo; without it the tracker runs in simulation
/// mode and the rest of the pipeline behaves identically.
pub struct MediaPipeWrapper;

impl MediaPipeWrapper {
    pub fn new() -> Result<Self> {
        let model_path = std::path::Path::new("models").join(MODEL_FILENAME);
        if !model_path.exists() {
            anyhow::bail!("hand landmark model not found at {}", model_path.display());
        }
        Ok(Self)
    }

    pub fn process_image(&mut self, _frame: &RgbImage) -> Result<Vec<DetectedHand>> {
        // FFI to the landmark runtime goes here; until it lands the bridge
        // reports no detections and the frame passes through.
        Ok(Vec::new())
    }
}

impl HandLandmarkProvider for MediaPipeWrapper {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<DetectedHand>> {
        self.process_image(frame)
    }
}
