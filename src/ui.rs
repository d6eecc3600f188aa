// src/ui.rs - Theme palette and frame texture plumbing
use eframe::egui::{self, Color32};
use image::RgbImage;

#[derive(Debug, Clone)]
pub struct Theme {
    pub primary: Color32,
    pub background: Color32,
    pub surface: Color32,
    pub error: Color32,
    pub warning: Color32,
    pub success: Color32,
    pub text_primary: Color32,
    pub text_secondary: Color32,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            primary: Color32::from_rgb(70, 130, 240),
            background: Color32::from_rgb(20, 20, 25),
            surface: Color32::from_rgb(30, 30, 35),
            error: Color32::from_rgb(244, 67, 54),
            warning: Color32::from_rgb(255, 152, 0),
            success: Color32::from_rgb(76, 175, 80),
            text_primary: Color32::WHITE,
            text_secondary: Color32::from_rgb(200, 200, 200),
        }
    }
}

/// Keeps the camera frame uploaded as an egui texture, reusing the
/// texture handle across frames.
pub struct FrameView {
    texture: Option<egui::TextureHandle>,
}

impl FrameView {
    pub fn new() -> Self {
        Self { texture: None }
    }

    pub fn update(&mut self, ctx: &egui::Context, frame: &RgbImage) {
        let size = [frame.width() as usize, frame.height() as usize];
        let color_image = egui::ColorImage::from_rgb(size, frame.as_raw());
        match self.texture.as_mut() {
            Some(texture) => texture.set(color_image, Default::default()),
            None => {
                self.texture = Some(ctx.load_texture("camera_frame", color_image, Default::default()))
            }
        }
    }

    /// Draw the frame scaled to the available space, preserving aspect
    /// ratio. Returns the on-screen rect for overlay painting.
    pub fn show(&self, ui: &mut egui::Ui) -> Option<egui::Rect> {
        let texture = self.texture.as_ref()?;
        let tex_size = texture.size_vec2();
        let available = ui.available_size();
        let scale = (available.x / tex_size.x)
            .min(available.y / tex_size.y)
            .max(0.0);
        let size = tex_size * scale;

        let mut rect = None;
        ui.vertical_centered(|ui| {
            let response = ui.image((texture.id(), size));
            rect = Some(response.rect);
        });
        rect
    }
}

/// Colored pinch indicator for one hand.
pub fn pinch_badge(ui: &mut egui::Ui, theme: &Theme, label: &str, pinched: bool) {
    let (color, text) = if pinched {
        (theme.success, format!("{label}: pinch"))
    } else {
        (theme.text_secondary, format!("{label}: open"))
    };
    ui.colored_label(color, text);
}
