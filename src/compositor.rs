// src/compositor.rs - ROI mask rasterization and masked compositing
use image::{GrayImage, Luma, Rgb, RgbImage};

use crate::filters::Filter;
use crate::tracking::{Hand, PixelPoint};

const ROI_OUTLINE_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// The quadrilateral between both hands' thumb and index fingertips.
///
/// Vertex order is fixed: [left.index, right.index, right.thumb,
/// left.thumb], a closed, non-self-intersecting boundary under normal
/// pinch geometry. Crossed hands produce a self-intersecting quad that is
/// rasterized as-is under the even-odd rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoiQuad {
    pub points: [PixelPoint; 4],
}

impl RoiQuad {
    pub fn from_pair(left: &Hand, right: &Hand) -> Self {
        Self {
            points: [left.index_tip, right.index_tip, right.thumb_tip, left.thumb_tip],
        }
    }
}

/// Rasterize the quad into a frame-sized binary mask: 255 for pixels
/// inside or on the boundary, 0 outside. Interior comes from an even-odd
/// scanline fill; the stroked edges guarantee boundary pixels (and fully
/// collinear quads) are covered.
pub fn rasterize_mask(quad: &RoiQuad, width: u32, height: u32) -> GrayImage {
    let mut mask = GrayImage::new(width, height);
    let pts = &quad.points;

    for y in 0..height as i32 {
        // x-coordinates where polygon edges cross this scanline
        let mut crossings: Vec<f64> = Vec::with_capacity(4);
        let mut j = 3;
        for i in 0..4 {
            let (pi, pj) = (pts[i], pts[j]);
            if (pi.y > y) != (pj.y > y) {
                let x = pi.x as f64
                    + (y - pi.y) as f64 * (pj.x - pi.x) as f64 / (pj.y - pi.y) as f64;
                crossings.push(x);
            }
            j = i;
        }
        crossings.sort_by(|a, b| a.total_cmp(b));

        for span in crossings.chunks_exact(2) {
            let x0 = span[0].ceil().max(0.0) as i64;
            let x1 = span[1].floor().min(width as f64 - 1.0) as i64;
            for x in x0..=x1 {
                mask.put_pixel(x as u32, y as u32, Luma([255]));
            }
        }
    }

    for i in 0..4 {
        plot_line(pts[i], pts[(i + 1) % 4], |x, y| {
            if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                mask.put_pixel(x as u32, y as u32, Luma([255]));
            }
        });
    }

    mask
}

/// Composite the filtered frame into the masked region over the original.
///
/// Exact boolean blend: every pixel inside the mask equals the filter's
/// output at that location, every pixel outside is bit-identical to the
/// input. The filter sees the whole frame and knows nothing about the ROI.
pub fn composite(frame: &RgbImage, quad: &RoiQuad, filter: &Filter) -> RgbImage {
    let mask = rasterize_mask(quad, frame.width(), frame.height());
    let filtered = (filter.apply)(frame);
    let mut output = frame.clone();
    for (x, y, px) in output.enumerate_pixels_mut() {
        if mask.get_pixel(x, y)[0] != 0 {
            *px = *filtered.get_pixel(x, y);
        }
    }
    output
}

/// Stroke the quad boundary onto the frame for visual feedback. Applied
/// after compositing so the blend itself stays exact.
pub fn draw_roi_outline(frame: &mut RgbImage, quad: &RoiQuad) {
    let (width, height) = frame.dimensions();
    let pts = &quad.points;
    for i in 0..4 {
        plot_line(pts[i], pts[(i + 1) % 4], |x, y| {
            if x >= 0 && y >= 0 && (x as u32) < width && (y as u32) < height {
                frame.put_pixel(x as u32, y as u32, ROI_OUTLINE_COLOR);
            }
        });
    }
}

/// Bresenham line walk, calling `plot` for every pixel on the segment.
fn plot_line(a: PixelPoint, b: PixelPoint, mut plot: impl FnMut(i32, i32)) {
    let (mut x, mut y) = (a.x, a.y);
    let dx = (b.x - a.x).abs();
    let dy = -(b.y - a.y).abs();
    let sx = if a.x < b.x { 1 } else { -1 };
    let sy = if a.y < b.y { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        plot(x, y);
        if x == b.x && y == b.y {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}
