// src/filters.rs - Ordered registry of full-frame pixel transforms
use image::{Rgb, RgbImage};
use once_cell::sync::Lazy;

pub type FilterFn = fn(&RgbImage) -> RgbImage;

/// A named, stateless `frame -> frame` transform. Filters are ROI-blind;
/// cropping to the gesture region happens in the compositor via masking.
pub struct Filter {
    pub name: &'static str,
    pub apply: FilterFn,
}

/// The filter registry. Cycling order is registration order and wraps
/// modulo the filter count.
pub struct FilterBank {
    filters: Vec<Filter>,
}

impl FilterBank {
    pub fn builtin() -> Self {
        Self {
            filters: vec![
                Filter { name: "Black & White", apply: filter_bw },
                Filter { name: "Invert", apply: filter_invert },
                Filter { name: "Thermal", apply: filter_thermal },
                Filter { name: "Depth", apply: filter_depth },
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn get(&self, index: usize) -> &Filter {
        &self.filters[index]
    }

    pub fn name(&self, index: usize) -> &'static str {
        self.filters[index].name
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.filters.iter().map(|f| f.name)
    }
}

/// Rec.601 luma, integer arithmetic.
fn luma(px: &Rgb<u8>) -> u8 {
    let Rgb([r, g, b]) = *px;
    ((r as u32 * 299 + g as u32 * 587 + b as u32 * 114) / 1000) as u8
}

fn map_pixels(frame: &RgbImage, f: impl Fn(&Rgb<u8>) -> Rgb<u8>) -> RgbImage {
    let mut out = RgbImage::new(frame.width(), frame.height());
    for (src, dst) in frame.pixels().zip(out.pixels_mut()) {
        *dst = f(src);
    }
    out
}

fn filter_bw(frame: &RgbImage) -> RgbImage {
    map_pixels(frame, |px| {
        let l = luma(px);
        Rgb([l, l, l])
    })
}

fn filter_invert(frame: &RgbImage) -> RgbImage {
    map_pixels(frame, |px| {
        let Rgb([r, g, b]) = *px;
        Rgb([255 - r, 255 - g, 255 - b])
    })
}

fn filter_thermal(frame: &RgbImage) -> RgbImage {
    map_pixels(frame, |px| JET_LUT[luma(px) as usize])
}

fn filter_depth(frame: &RgbImage) -> RgbImage {
    map_pixels(frame, |px| BONE_LUT[luma(px) as usize])
}

fn ramp_to_u8(v: f64) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Classic jet ramp: blue through green and yellow to red.
static JET_LUT: Lazy<[Rgb<u8>; 256]> = Lazy::new(|| {
    let mut lut = [Rgb([0u8; 3]); 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let x = i as f64 / 255.0;
        let r = 1.5 - (4.0 * x - 3.0).abs();
        let g = 1.5 - (4.0 * x - 2.0).abs();
        let b = 1.5 - (4.0 * x - 1.0).abs();
        *entry = Rgb([ramp_to_u8(r), ramp_to_u8(g), ramp_to_u8(b)]);
    }
    lut
});

/// Bone ramp: grayscale with a cool blue cast, white at full intensity.
/// Blend of a 7/8 gray ramp with the reversed channels of the hot ramp.
static BONE_LUT: Lazy<[Rgb<u8>; 256]> = Lazy::new(|| {
    let mut lut = [Rgb([0u8; 3]); 256];
    for (i, entry) in lut.iter_mut().enumerate() {
        let x = i as f64 / 255.0;
        let r = (7.0 * x + (3.0 * x - 2.0).clamp(0.0, 1.0)) / 8.0;
        let g = (7.0 * x + (3.0 * x - 1.0).clamp(0.0, 1.0)) / 8.0;
        let b = (7.0 * x + (3.0 * x).clamp(0.0, 1.0)) / 8.0;
        *entry = Rgb([ramp_to_u8(r), ramp_to_u8(g), ramp_to_u8(b)]);
    }
    lut
});
