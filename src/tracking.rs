// src/tracking.rs - Hand landmark acquisition with simulation fallback
use std::collections::VecDeque;
use std::time::Instant;

use anyhow::Result;
use image::RgbImage;
use nalgebra::Point2;

use crate::mediapipe_bridge::MediaPipeWrapper;

/// MediaPipe hand landmark indices for the two fingertips the pipeline
/// consumes (of the 21 per hand).
pub const THUMB_TIP: usize = 4;
pub const INDEX_TIP: usize = 8;

pub const LANDMARKS_PER_HAND: usize = 21;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handedness {
    Left,
    Right,
}

/// Integer pixel coordinates, produced by scaling a normalized landmark
/// by the frame dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelPoint {
    pub x: i32,
    pub y: i32,
}

/// Everything the per-frame pipeline needs from one detected hand.
/// Rebuilt every frame, never persisted.
#[derive(Debug, Clone, Copy)]
pub struct Hand {
    pub handedness: Handedness,
    pub thumb_tip: PixelPoint,
    pub index_tip: PixelPoint,
}

/// Raw provider output: a labeled hand with normalized landmark points.
#[derive(Debug, Clone)]
pub struct DetectedHand {
    pub handedness: Handedness,
    pub landmarks: Vec<Point2<f64>>,
}

/// The opaque landmark backend. Any implementation that can label hands
/// and report 21 normalized points per hand slots in here.
pub trait HandLandmarkProvider {
    fn detect(&mut self, frame: &RgbImage) -> Result<Vec<DetectedHand>>;
}

#[derive(Clone)]
pub struct PerformanceMetrics {
    pub avg_fps: f32,
    pub avg_processing_time: f32,
    frame_times: VecDeque<f32>,
}

impl PerformanceMetrics {
    pub fn new() -> Self {
        Self {
            avg_fps: 0.0,
            avg_processing_time: 0.0,
            frame_times: VecDeque::with_capacity(30),
        }
    }

    fn record(&mut self, elapsed: f32) {
        self.frame_times.push_front(elapsed);
        if self.frame_times.len() > 30 {
            self.frame_times.pop_back();
        }
        self.avg_processing_time =
            self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32;
        self.avg_fps = if self.avg_processing_time > 0.0 {
            1.0 / self.avg_processing_time
        } else {
            0.0
        };
    }
}

pub fn to_pixel(p: Point2<f64>, width: u32, height: u32) -> PixelPoint {
    PixelPoint {
        x: (p.x * width as f64) as i32,
        y: (p.y * height as f64) as i32,
    }
}

/// Scale a detection to pixel space, keeping only the two fingertips.
/// Returns None when the provider reported a short landmark list.
pub fn extract_hand(detection: &DetectedHand, width: u32, height: u32) -> Option<Hand> {
    if detection.landmarks.len() < LANDMARKS_PER_HAND {
        return None;
    }
    Some(Hand {
        handedness: detection.handedness,
        thumb_tip: to_pixel(detection.landmarks[THUMB_TIP], width, height),
        index_tip: to_pixel(detection.landmarks[INDEX_TIP], width, height),
    })
}

/// Select the (left, right) pair when exactly two hands were detected,
/// one per label. Anything else is detection ambiguity: the frame passes
/// through unfiltered and no state transition happens.
pub fn labeled_pair(hands: &[Hand]) -> Option<(Hand, Hand)> {
    if hands.len() != 2 {
        return None;
    }
    match (hands[0].handedness, hands[1].handedness) {
        (Handedness::Left, Handedness::Right) => Some((hands[0], hands[1])),
        (Handedness::Right, Handedness::Left) => Some((hands[1], hands[0])),
        _ => None,
    }
}

/// Owns the landmark backend and turns frames into per-frame `Hand`
/// records. Falls back to simulated hands when the backend is not
/// available, so the rest of the pipeline stays exercisable.
pub struct HandTracker {
    provider: Option<Box<dyn HandLandmarkProvider>>,
    backend_initialized: bool,
    sim_time: f64,
    metrics: PerformanceMetrics,
}

impl HandTracker {
    pub fn new() -> Self {
        Self {
            provider: None,
            backend_initialized: false,
            sim_time: 0.0,
            metrics: PerformanceMetrics::new(),
        }
    }

    pub fn initialize_backend(&mut self) {
        if self.backend_initialized {
            return;
        }
        match MediaPipeWrapper::new() {
            Ok(mp) => {
                tracing::info!("hand landmark backend initialized");
                self.provider = Some(Box::new(mp));
                self.backend_initialized = true;
            }
            Err(e) => {
                tracing::warn!("hand landmark backend unavailable: {e}; using simulation mode");
            }
        }
    }

    pub fn is_using_backend(&self) -> bool {
        self.provider.is_some()
    }

    pub fn process_frame(&mut self, frame: &RgbImage) -> Result<Vec<Hand>> {
        let (width, height) = frame.dimensions();
        self.sim_time += 0.033;

        let hands = if let Some(provider) = self.provider.as_mut() {
            match provider.detect(frame) {
                Ok(detections) => detections
                    .iter()
                    .filter_map(|d| extract_hand(d, width, height))
                    .collect(),
                Err(e) => {
                    // per-frame detection errors degrade to passthrough
                    tracing::warn!("landmark detection failed: {e}");
                    Vec::new()
                }
            }
        } else {
            self.simulated_hands(width, height)
        };

        Ok(hands)
    }

    pub fn process_frame_with_metrics(
        &mut self,
        frame: &RgbImage,
    ) -> Result<(Vec<Hand>, PerformanceMetrics)> {
        let start = Instant::now();
        let hands = self.process_frame(frame)?;
        self.metrics.record(start.elapsed().as_secs_f32());
        Ok((hands, self.metrics.clone()))
    }

    /// Two hands drifting around their screen halves; the right hand
    /// closes into a pinch on a slow cycle so the filter toggling is
    /// visible without a real backend.
    fn simulated_hands(&self, width: u32, height: u32) -> Vec<Hand> {
        let t = self.sim_time;
        let (w, h) = (width as f64, height as f64);

        let left_index = PixelPoint {
            x: (w * (0.30 + 0.04 * (t * 0.7).cos())) as i32,
            y: (h * (0.45 + 0.05 * (t * 0.5).sin())) as i32,
        };
        let left_thumb = PixelPoint {
            x: left_index.x - 55,
            y: left_index.y + 40,
        };

        let right_index = PixelPoint {
            x: (w * (0.70 + 0.04 * (t * 0.7).sin())) as i32,
            y: (h * (0.45 + 0.05 * (t * 0.5).cos())) as i32,
        };
        // thumb-to-index gap oscillates through the pinch threshold
        let gap = 45.0 + 35.0 * (t * 0.6).sin();
        let right_thumb = PixelPoint {
            x: right_index.x + gap as i32,
            y: right_index.y + 40,
        };

        vec![
            Hand {
                handedness: Handedness::Left,
                thumb_tip: left_thumb,
                index_tip: left_index,
            },
            Hand {
                handedness: Handedness::Right,
                thumb_tip: right_thumb,
                index_tip: right_index,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(handedness: Handedness) -> Hand {
        Hand {
            handedness,
            thumb_tip: PixelPoint { x: 0, y: 0 },
            index_tip: PixelPoint { x: 0, y: 0 },
        }
    }

    #[test]
    fn normalized_landmarks_scale_by_frame_dimensions() {
        let p = to_pixel(Point2::new(0.5, 0.25), 640, 480);
        assert_eq!(p, PixelPoint { x: 320, y: 120 });
        let p = to_pixel(Point2::new(0.0, 1.0), 640, 480);
        assert_eq!(p, PixelPoint { x: 0, y: 480 });
    }

    #[test]
    fn extract_hand_picks_the_fingertip_landmarks() {
        let mut landmarks = vec![Point2::new(0.0, 0.0); LANDMARKS_PER_HAND];
        landmarks[THUMB_TIP] = Point2::new(0.25, 0.5);
        landmarks[INDEX_TIP] = Point2::new(0.5, 0.5);
        let detection = DetectedHand {
            handedness: Handedness::Left,
            landmarks,
        };
        let hand = extract_hand(&detection, 400, 200).unwrap();
        assert_eq!(hand.thumb_tip, PixelPoint { x: 100, y: 100 });
        assert_eq!(hand.index_tip, PixelPoint { x: 200, y: 100 });
    }

    #[test]
    fn extract_hand_rejects_short_landmark_lists() {
        let detection = DetectedHand {
            handedness: Handedness::Right,
            landmarks: vec![Point2::new(0.5, 0.5); 10],
        };
        assert!(extract_hand(&detection, 640, 480).is_none());
    }

    #[test]
    fn pair_requires_exactly_one_hand_per_label() {
        assert!(labeled_pair(&[]).is_none());
        assert!(labeled_pair(&[hand(Handedness::Left)]).is_none());
        assert!(labeled_pair(&[hand(Handedness::Left), hand(Handedness::Left)]).is_none());
        assert!(labeled_pair(&[hand(Handedness::Right), hand(Handedness::Right)]).is_none());

        let (l, r) = labeled_pair(&[hand(Handedness::Right), hand(Handedness::Left)]).unwrap();
        assert_eq!(l.handedness, Handedness::Left);
        assert_eq!(r.handedness, Handedness::Right);
    }

    #[test]
    fn simulation_produces_a_valid_pair() {
        let mut tracker = HandTracker::new();
        let frame = RgbImage::new(640, 480);
        let hands = tracker.process_frame(&frame).unwrap();
        assert!(labeled_pair(&hands).is_some());
    }
}
