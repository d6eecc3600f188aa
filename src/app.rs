// src/app.rs - Frame loop driver: capture, track, classify, composite, paint
use std::time::{Duration, Instant};

use eframe::egui;
use image::RgbImage;

use crate::compositor::{composite, draw_roi_outline, RoiQuad};
use crate::filters::FilterBank;
use crate::gesture::{is_pinch, FilterCycle, DEBOUNCE_INTERVAL, PINCH_THRESHOLD_PX};
use crate::tracking::{labeled_pair, Hand, HandTracker, PerformanceMetrics};
use crate::ui::{pinch_badge, FrameView, Theme};
use crate::video::VideoSource;

/// Startup constants for the gesture pipeline. Tunable from the settings
/// window at runtime, never persisted.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub camera_index: u32,
    pub pinch_threshold_px: f64,
    pub debounce: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            pinch_threshold_px: PINCH_THRESHOLD_PX,
            debounce: DEBOUNCE_INTERVAL,
        }
    }
}

/// What one frame's gesture pass observed, for the status panel.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameReadout {
    pub left_pinch: bool,
    pub right_pinch: bool,
    pub roi_active: bool,
    pub filter_changed: bool,
}

/// The per-frame update: classify pinches, composite the active filter
/// into the ROI, and apply the debounced transition. Pure over its inputs
/// (state goes in and comes back out through `cycle`), so it is testable
/// without a camera. With no valid labeled pair the frame is returned
/// untouched.
pub fn render_frame(
    frame: RgbImage,
    hands: &[Hand],
    cycle: &mut FilterCycle,
    filter_bank: &FilterBank,
    pinch_threshold_px: f64,
    now: Instant,
) -> (RgbImage, FrameReadout) {
    let mut readout = FrameReadout::default();

    let (left, right) = match labeled_pair(hands) {
        Some(pair) => pair,
        // fewer than two correctly-labeled hands: raw frame untouched
        None => return (frame, readout),
    };

    readout.left_pinch = is_pinch(left.thumb_tip, left.index_tip, pinch_threshold_px);
    readout.right_pinch = is_pinch(right.thumb_tip, right.index_tip, pinch_threshold_px);
    readout.roi_active = true;

    let quad = RoiQuad::from_pair(&left, &right);
    let active = filter_bank.get(cycle.active_index());
    let mut output = composite(&frame, &quad, active);
    draw_roi_outline(&mut output, &quad);

    // the transition applies to the next frame; this one was rendered
    // with the filter that was active when the pinch happened
    readout.filter_changed = cycle.on_frame(readout.left_pinch || readout.right_pinch, now);

    (output, readout)
}

pub struct GestureFilterApp {
    // Core components
    video_source: VideoSource,
    tracker: HandTracker,
    filter_bank: FilterBank,
    cycle: FilterCycle,
    config: PipelineConfig,

    // UI state
    theme: Theme,
    frame_view: FrameView,
    show_settings: bool,

    // Per-frame readouts
    left_pinch: bool,
    right_pinch: bool,
    roi_active: bool,
    metrics: PerformanceMetrics,
}

impl GestureFilterApp {
    pub fn new(_cc: &eframe::CreationContext<'_>) -> Self {
        let config = PipelineConfig::default();

        // Camera and tracker failures at startup are fatal; per-frame
        // anomalies later degrade to passthrough instead.
        let video_source =
            VideoSource::new_camera(config.camera_index).expect("Failed to open camera");
        let (width, height) = video_source.resolution();
        tracing::info!(width, height, "capture ready");

        let mut tracker = HandTracker::new();
        tracker.initialize_backend();

        let filter_bank = FilterBank::builtin();
        let cycle = FilterCycle::new(filter_bank.len()).with_debounce(config.debounce);

        Self {
            video_source,
            tracker,
            filter_bank,
            cycle,
            config,
            theme: Theme::default(),
            frame_view: FrameView::new(),
            show_settings: false,
            left_pinch: false,
            right_pinch: false,
            roi_active: false,
            metrics: PerformanceMetrics::new(),
        }
    }

    /// One iteration of the frame loop. Capture failure is stream end and
    /// closes the window; everything else degrades to a passthrough frame.
    fn process_next_frame(&mut self, ctx: &egui::Context) {
        let frame = match self.video_source.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                tracing::info!("capture stopped: {e}");
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                return;
            }
        };

        let hands = match self.tracker.process_frame_with_metrics(&frame) {
            Ok((hands, metrics)) => {
                self.metrics = metrics;
                hands
            }
            Err(e) => {
                tracing::warn!("tracking failed this frame: {e}");
                Vec::new()
            }
        };

        let (output, readout) = render_frame(
            frame,
            &hands,
            &mut self.cycle,
            &self.filter_bank,
            self.config.pinch_threshold_px,
            Instant::now(),
        );
        if readout.filter_changed {
            tracing::info!(
                filter = self.filter_bank.name(self.cycle.active_index()),
                "pinch: filter changed"
            );
        }
        self.left_pinch = readout.left_pinch;
        self.right_pinch = readout.right_pinch;
        self.roi_active = readout.roi_active;

        self.frame_view.update(ctx, &output);
    }

    fn render_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(8.0);
            ui.horizontal(|ui| {
                ui.heading("Hand Gesture Filter");
                ui.separator();

                let active = self.cycle.active_index();
                for (i, name) in self.filter_bank.names().enumerate() {
                    if i == active {
                        ui.colored_label(self.theme.primary, name);
                    } else {
                        ui.colored_label(self.theme.text_secondary, name);
                    }
                }

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙ Settings").clicked() {
                        self.show_settings = !self.show_settings;
                    }
                });
            });
            ui.add_space(8.0);
        });
    }

    fn render_status_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.horizontal(|ui| {
                pinch_badge(ui, &self.theme, "Left", self.left_pinch);
                pinch_badge(ui, &self.theme, "Right", self.right_pinch);
                ui.separator();

                if self.roi_active {
                    ui.colored_label(self.theme.success, "ROI active");
                } else {
                    ui.colored_label(self.theme.text_secondary, "Show both hands");
                }
                ui.separator();

                let backend = if self.tracker.is_using_backend() {
                    "MediaPipe"
                } else {
                    "Simulation"
                };
                ui.label(format!("Backend: {backend}"));
                ui.label(format!(
                    "{:.1} fps · {:.1} ms",
                    self.metrics.avg_fps,
                    self.metrics.avg_processing_time * 1000.0
                ));

                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.colored_label(self.theme.text_secondary, "pinch to cycle · Q to quit");
                });
            });
            ui.add_space(6.0);
        });
    }

    fn render_video_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let rect = self.frame_view.show(ui);

            // filter name overlay only when a composite was produced
            if self.roi_active {
                if let Some(rect) = rect {
                    ui.painter().text(
                        rect.min + egui::vec2(10.0, 30.0),
                        egui::Align2::LEFT_CENTER,
                        self.filter_bank.name(self.cycle.active_index()),
                        egui::FontId::proportional(24.0),
                        self.theme.primary,
                    );
                }
            }

            if rect.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.label("Waiting for camera...");
                });
            }
        });
    }

    fn render_settings_window(&mut self, ctx: &egui::Context) {
        let mut open = self.show_settings;
        egui::Window::new("Settings")
            .open(&mut open)
            .resizable(false)
            .default_size([320.0, 180.0])
            .show(ctx, |ui| {
                ui.heading("Gesture Settings");
                ui.add_space(8.0);

                ui.label("Pinch threshold (px):");
                ui.add(
                    egui::Slider::new(&mut self.config.pinch_threshold_px, 5.0..=100.0)
                        .step_by(1.0),
                );

                ui.label("Debounce interval (s):");
                let mut debounce_secs = self.config.debounce.as_secs_f64();
                if ui
                    .add(egui::Slider::new(&mut debounce_secs, 0.1..=2.0).step_by(0.05))
                    .changed()
                {
                    self.config.debounce = Duration::from_secs_f64(debounce_secs);
                    self.cycle.set_debounce(self.config.debounce);
                }
            });
        self.show_settings = open;
    }
}

impl eframe::App for GestureFilterApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if ctx.input(|i| i.key_pressed(egui::Key::Q)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            return;
        }

        self.process_next_frame(ctx);

        self.render_header(ctx);
        self.render_status_panel(ctx);
        self.render_video_panel(ctx);

        if self.show_settings {
            self.render_settings_window(ctx);
        }

        // continuous frame loop
        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracking::{Handedness, PixelPoint};
    use image::Rgb;

    fn pt(x: i32, y: i32) -> PixelPoint {
        PixelPoint { x, y }
    }

    fn hand(handedness: Handedness, thumb: (i32, i32), index: (i32, i32)) -> Hand {
        Hand {
            handedness,
            thumb_tip: pt(thumb.0, thumb.1),
            index_tip: pt(index.0, index.1),
        }
    }

    fn gradient_frame(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x * y) % 256) as u8])
        })
    }

    #[test]
    fn single_hand_frame_passes_through_bit_identical() {
        let frame = gradient_frame(64, 48);
        let original = frame.clone();
        let hands = [hand(Handedness::Left, (10, 10), (20, 10))];
        let mut cycle = FilterCycle::new(4);
        let bank = FilterBank::builtin();

        let (output, readout) =
            render_frame(frame, &hands, &mut cycle, &bank, 30.0, Instant::now());

        assert_eq!(output, original);
        assert!(!readout.roi_active);
        assert!(!readout.filter_changed);
        assert_eq!(cycle.active_index(), 0);
    }

    #[test]
    fn two_same_label_hands_pass_through() {
        let frame = gradient_frame(64, 48);
        let original = frame.clone();
        let hands = [
            hand(Handedness::Left, (10, 10), (20, 10)),
            hand(Handedness::Left, (40, 10), (50, 10)),
        ];
        let mut cycle = FilterCycle::new(4);
        let bank = FilterBank::builtin();

        let (output, readout) =
            render_frame(frame, &hands, &mut cycle, &bank, 30.0, Instant::now());

        assert_eq!(output, original);
        assert!(!readout.roi_active);
    }

    #[test]
    fn open_hands_render_roi_without_changing_the_filter() {
        // both thumb-to-index distances are > 30, so no pinch fires, but
        // the ROI between the fingertips still shows the current filter
        let frame = gradient_frame(400, 200);
        let hands = [
            hand(Handedness::Left, (100, 100), (120, 140)),
            hand(Handedness::Right, (300, 100), (280, 140)),
        ];
        let mut cycle = FilterCycle::new(4);
        let bank = FilterBank::builtin();

        let (output, readout) =
            render_frame(frame.clone(), &hands, &mut cycle, &bank, 30.0, Instant::now());

        assert!(readout.roi_active);
        assert!(!readout.left_pinch && !readout.right_pinch);
        assert!(!readout.filter_changed);
        assert_eq!(cycle.active_index(), 0);

        // interior of the quad carries the Black & White output
        let bw = (bank.get(0).apply)(&frame);
        assert_eq!(output.get_pixel(200, 120), bw.get_pixel(200, 120));
        // well outside the quad the frame is untouched
        assert_eq!(output.get_pixel(10, 10), frame.get_pixel(10, 10));
    }

    #[test]
    fn pinch_advances_the_filter_once() {
        let frame = gradient_frame(400, 200);
        // right hand pinched (distance 20 < 30)
        let hands = [
            hand(Handedness::Left, (100, 100), (120, 140)),
            hand(Handedness::Right, (300, 120), (280, 120)),
        ];
        let mut cycle = FilterCycle::new(4);
        let bank = FilterBank::builtin();
        let t0 = Instant::now();

        let (_, readout) = render_frame(frame.clone(), &hands, &mut cycle, &bank, 30.0, t0);
        assert!(readout.right_pinch);
        assert!(readout.filter_changed);
        assert_eq!(cycle.active_index(), 1);

        // held pinch on the very next frame is debounced away
        let (_, readout) = render_frame(
            frame,
            &hands,
            &mut cycle,
            &bank,
            30.0,
            t0 + Duration::from_millis(33),
        );
        assert!(!readout.filter_changed);
        assert_eq!(cycle.active_index(), 1);
    }
}
